//! Auth provider admin API client
//!
//! Talks to a GoTrue-compatible admin endpoint with the service-role key.

use crate::config::IdentityConfig;
use crate::domain::users::IdentityProvider;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use std::time::Duration;
use url::Url;
use uuid::Uuid;

pub struct HttpIdentityProvider {
    client: Client,
    users_url: Url,
    service_key: String,
}

impl HttpIdentityProvider {
    pub fn new(config: &IdentityConfig) -> Result<Self> {
        let base = Url::parse(&config.base_url)
            .with_context(|| format!("invalid identity base_url {:?}", config.base_url))?;
        let users_url = base
            .join("auth/v1/admin/users/")
            .context("cannot build admin users URL")?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("cannot build HTTP client")?;

        Ok(Self {
            client,
            users_url,
            service_key: config.service_key.clone(),
        })
    }

    fn user_url(&self, user_id: Uuid) -> Result<Url> {
        self.users_url
            .join(&user_id.to_string())
            .context("cannot build user URL")
    }
}

/// Turn a non-2xx answer into an error carrying the provider's message
async fn ensure_success(response: Response, action: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body: serde_json::Value = response.json().await.unwrap_or_default();
    let message = ["msg", "message", "error_description", "error"]
        .iter()
        .find_map(|key| body[key].as_str())
        .unwrap_or("no details");
    Err(anyhow!("{action} failed with {status}: {message}"))
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn create_user(&self, email: &str, password: &str) -> Result<Uuid> {
        let url = self.users_url.as_str().trim_end_matches('/');
        let response = self
            .client
            .post(url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "email_confirm": true,
            }))
            .send()
            .await
            .context("create user request")?;
        let user = ensure_success(response, "create user")
            .await?
            .json::<serde_json::Value>()
            .await
            .context("parse create user response")?;

        let id = user["id"]
            .as_str()
            .ok_or_else(|| anyhow!("create user response missing 'id'"))?;
        Uuid::parse_str(id).with_context(|| format!("provider returned invalid user id {id:?}"))
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<()> {
        let response = self
            .client
            .delete(self.user_url(user_id)?)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .send()
            .await
            .context("delete user request")?;
        ensure_success(response, "delete user").await?;
        Ok(())
    }
}
