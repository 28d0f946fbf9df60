//! Privileged user administration
//!
//! Creating and deleting users touches two systems: the external auth
//! provider that owns credentials and the local profile table. Only callers
//! whose own profile has the admin role may do either.

use super::service::Service;
use super::validation::{require_text, validate_email};
use crate::contract::{AgreementsError, Profile, ProfileRole};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Minimum password length accepted by the auth provider
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Failures of the user-administration operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdminError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("invalid token")]
    InvalidToken,
    #[error("caller is not an administrator")]
    NotAdmin,
    #[error("{0}")]
    BadRequest(String),
    #[error("auth provider error: {0}")]
    Provider(String),
    #[error("internal error")]
    Internal,
}

impl From<AgreementsError> for AdminError {
    fn from(error: AgreementsError) -> Self {
        match error {
            AgreementsError::Internal => Self::Internal,
            other => Self::BadRequest(other.to_string()),
        }
    }
}

/// Resolves a bearer token to the id of the calling user
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Uuid, AdminError>;
}

/// Admin API of the external auth provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create a confirmed account and return its id
    async fn create_user(&self, email: &str, password: &str) -> anyhow::Result<Uuid>;

    /// Remove an account
    async fn delete_user(&self, user_id: Uuid) -> anyhow::Result<()>;
}

/// Request to create a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: ProfileRole,
    pub area_id: Option<Uuid>,
}

/// User administration backed by the domain service
pub struct UserAdministration {
    service: Arc<Service>,
    verifier: Arc<dyn TokenVerifier>,
    identity: Arc<dyn IdentityProvider>,
}

impl UserAdministration {
    pub fn new(
        service: Arc<Service>,
        verifier: Arc<dyn TokenVerifier>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            service,
            verifier,
            identity,
        }
    }

    /// Verify the token and require the caller to be an admin
    pub async fn authorize_admin(&self, token: Option<&str>) -> Result<Profile, AdminError> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AdminError::MissingToken)?;
        let caller_id = self.verifier.verify(token).await?;

        let caller = match self.service.get_profile(caller_id).await {
            Ok(profile) => profile,
            Err(AgreementsError::NotFound { .. }) => return Err(AdminError::NotAdmin),
            Err(e) => return Err(e.into()),
        };
        if !caller.is_admin() {
            tracing::warn!(caller_id = %caller.id, "non-admin attempted user administration");
            return Err(AdminError::NotAdmin);
        }
        Ok(caller)
    }

    /// Create the auth account, then the profile.
    ///
    /// If the profile cannot be stored the auth account is removed again.
    pub async fn create_user(&self, caller: &Profile, request: NewUser) -> Result<Profile, AdminError> {
        validate_new_user(&request)?;
        if self
            .service
            .find_profile_by_email(request.email.trim())
            .await?
            .is_some()
        {
            return Err(AdminError::BadRequest(format!(
                "a user with email {} already exists",
                request.email.trim()
            )));
        }

        let email = request.email.trim().to_string();
        let user_id = self
            .identity
            .create_user(&email, &request.password)
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, %email, "auth provider rejected user creation");
                AdminError::Provider(e.to_string())
            })?;

        let profile = Profile {
            id: user_id,
            full_name: request.full_name.trim().to_string(),
            email,
            role: request.role,
            area_id: request.area_id,
            created_at: Utc::now(),
        };

        match self.service.create_profile(profile).await {
            Ok(created) => {
                tracing::info!(
                    user_id = %created.id,
                    caller_id = %caller.id,
                    role = created.role.as_str(),
                    "user created"
                );
                Ok(created)
            }
            Err(e) => {
                tracing::error!(%user_id, error = %e, "profile insert failed, removing auth account");
                if let Err(cleanup) = self.identity.delete_user(user_id).await {
                    tracing::error!(%user_id, error = ?cleanup, "failed to remove orphaned auth account");
                }
                Err(e.into())
            }
        }
    }

    /// Delete the auth account, then the profile
    pub async fn delete_user(&self, caller: &Profile, user_id: Uuid) -> Result<(), AdminError> {
        self.service.ensure_profile_removable(user_id).await?;

        self.identity.delete_user(user_id).await.map_err(|e| {
            tracing::error!(error = ?e, %user_id, "auth provider rejected user deletion");
            AdminError::Provider(e.to_string())
        })?;
        self.service.delete_profile(user_id).await?;

        tracing::info!(%user_id, caller_id = %caller.id, "user deleted");
        Ok(())
    }
}

fn validate_new_user(request: &NewUser) -> Result<(), AdminError> {
    validate_email(&request.email)?;
    require_text("full_name", &request.full_name)?;
    if request.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AdminError::BadRequest(format!(
            "password must have at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}
