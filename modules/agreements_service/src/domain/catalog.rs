//! Reference data: institutions, areas and profiles

use super::service::{internal, Service};
use super::validation::{require_text, validate_email, validate_public_url};
use crate::contract::{AgreementsError, Area, Institution, Profile, ProfileRole};
use chrono::Utc;
use uuid::Uuid;

/// Editable fields of an institution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstitutionDraft {
    pub name: String,
    pub country: Option<String>,
    pub website: Option<String>,
}

/// Editable fields of a profile; email is owned by the auth provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub full_name: String,
    pub role: ProfileRole,
    pub area_id: Option<Uuid>,
}

impl Service {
    // ===== Institutions =====

    pub async fn create_institution(
        &self,
        draft: InstitutionDraft,
    ) -> Result<Institution, AgreementsError> {
        validate_institution(&draft)?;

        let now = Utc::now();
        let institution = Institution {
            id: Uuid::new_v4(),
            name: draft.name.trim().to_string(),
            country: draft.country,
            website: draft.website,
            created_at: now,
            updated_at: now,
        };
        self.catalog
            .create_institution(&institution)
            .await
            .map_err(internal)
    }

    pub async fn get_institution(&self, id: Uuid) -> Result<Institution, AgreementsError> {
        self.catalog
            .find_institution(id)
            .await
            .map_err(internal)?
            .ok_or_else(|| AgreementsError::not_found("institution", id))
    }

    pub async fn list_institutions(&self) -> Result<Vec<Institution>, AgreementsError> {
        self.catalog.list_institutions().await.map_err(internal)
    }

    pub async fn update_institution(
        &self,
        id: Uuid,
        draft: InstitutionDraft,
    ) -> Result<Institution, AgreementsError> {
        validate_institution(&draft)?;
        let current = self.get_institution(id).await?;

        let institution = Institution {
            name: draft.name.trim().to_string(),
            country: draft.country,
            website: draft.website,
            updated_at: Utc::now(),
            ..current
        };
        self.catalog
            .update_institution(&institution)
            .await
            .map_err(internal)
    }

    /// Delete an institution no live agreement points at
    pub async fn delete_institution(&self, id: Uuid) -> Result<(), AgreementsError> {
        self.get_institution(id).await?;

        let references = self
            .agreements
            .count_by_institution(id)
            .await
            .map_err(internal)?;
        if references > 0 {
            return Err(AgreementsError::conflict(format!(
                "institution {} is the counterpart of {} agreement(s)",
                id, references
            )));
        }

        self.catalog.delete_institution(id).await.map_err(internal)
    }

    // ===== Areas =====

    pub async fn create_area(
        &self,
        name: String,
        description: Option<String>,
    ) -> Result<Area, AgreementsError> {
        require_text("name", &name)?;

        let area = Area {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            description,
            created_at: Utc::now(),
        };
        self.catalog.create_area(&area).await.map_err(internal)
    }

    pub async fn get_area(&self, id: Uuid) -> Result<Area, AgreementsError> {
        self.catalog
            .find_area(id)
            .await
            .map_err(internal)?
            .ok_or_else(|| AgreementsError::not_found("area", id))
    }

    pub async fn list_areas(&self) -> Result<Vec<Area>, AgreementsError> {
        self.catalog.list_areas().await.map_err(internal)
    }

    pub async fn update_area(
        &self,
        id: Uuid,
        name: String,
        description: Option<String>,
    ) -> Result<Area, AgreementsError> {
        require_text("name", &name)?;
        let current = self.get_area(id).await?;

        let area = Area {
            name: name.trim().to_string(),
            description,
            ..current
        };
        self.catalog.update_area(&area).await.map_err(internal)
    }

    pub async fn delete_area(&self, id: Uuid) -> Result<(), AgreementsError> {
        self.get_area(id).await?;

        let references = self.agreements.count_by_area(id).await.map_err(internal)?;
        if references > 0 {
            return Err(AgreementsError::conflict(format!(
                "area {} is linked to {} agreement(s)",
                id, references
            )));
        }

        self.catalog.delete_area(id).await.map_err(internal)
    }

    // ===== Profiles =====

    /// Insert a profile for an account that already exists at the auth provider
    pub async fn create_profile(&self, profile: Profile) -> Result<Profile, AgreementsError> {
        require_text("full_name", &profile.full_name)?;
        validate_email(&profile.email)?;
        if let Some(area_id) = profile.area_id {
            self.get_area(area_id).await?;
        }

        if self
            .catalog
            .find_profile_by_email(&profile.email)
            .await
            .map_err(internal)?
            .is_some()
        {
            return Err(AgreementsError::conflict(format!(
                "a profile with email {} already exists",
                profile.email
            )));
        }

        self.catalog.create_profile(&profile).await.map_err(internal)
    }

    pub async fn get_profile(&self, id: Uuid) -> Result<Profile, AgreementsError> {
        self.catalog
            .find_profile(id)
            .await
            .map_err(internal)?
            .ok_or_else(|| AgreementsError::not_found("profile", id))
    }

    pub async fn find_profile_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Profile>, AgreementsError> {
        self.catalog
            .find_profile_by_email(email)
            .await
            .map_err(internal)
    }

    pub async fn list_profiles(&self) -> Result<Vec<Profile>, AgreementsError> {
        self.catalog.list_profiles().await.map_err(internal)
    }

    pub async fn update_profile(
        &self,
        id: Uuid,
        update: ProfileUpdate,
    ) -> Result<Profile, AgreementsError> {
        require_text("full_name", &update.full_name)?;
        let current = self.get_profile(id).await?;
        if let Some(area_id) = update.area_id {
            self.get_area(area_id).await?;
        }

        let profile = Profile {
            full_name: update.full_name.trim().to_string(),
            role: update.role,
            area_id: update.area_id,
            ..current
        };
        self.catalog.update_profile(&profile).await.map_err(internal)
    }

    /// Fail when the profile is still accountable for something
    pub async fn ensure_profile_removable(&self, id: Uuid) -> Result<Profile, AgreementsError> {
        let profile = self.get_profile(id).await?;

        let links = self
            .agreements
            .count_responsible_links(id)
            .await
            .map_err(internal)?;
        let mobility = self
            .compliance
            .count_mobility_by_responsible(id)
            .await
            .map_err(internal)?;
        if links > 0 || mobility > 0 {
            return Err(AgreementsError::conflict(format!(
                "profile {} is responsible for {} agreement link(s) and {} mobility record(s)",
                id, links, mobility
            )));
        }
        Ok(profile)
    }

    pub async fn delete_profile(&self, id: Uuid) -> Result<(), AgreementsError> {
        self.ensure_profile_removable(id).await?;
        self.catalog.delete_profile(id).await.map_err(internal)
    }
}

fn validate_institution(draft: &InstitutionDraft) -> Result<(), AgreementsError> {
    require_text("name", &draft.name)?;
    if let Some(website) = &draft.website {
        validate_public_url("website", website)?;
    }
    Ok(())
}
