//! Configuration for agreements service module

use serde::{Deserialize, Serialize};

/// Agreements service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgreementsConfig {
    /// Upper bound accepted for `duration_years`
    #[serde(default = "default_max_duration_years")]
    pub max_duration_years: f64,

    /// Window used by the dashboard to flag agreements about to expire (days)
    #[serde(default = "default_expiring_soon_days")]
    pub expiring_soon_days: u32,

    /// Maximum length of a semi-annual report summary (characters)
    #[serde(default = "default_max_summary_length")]
    pub max_summary_length: usize,

    /// Log agreement events to the `audit` tracing target
    #[serde(default = "default_audit_events")]
    pub audit_events: bool,
}

impl Default for AgreementsConfig {
    fn default() -> Self {
        Self {
            max_duration_years: default_max_duration_years(),
            expiring_soon_days: default_expiring_soon_days(),
            max_summary_length: default_max_summary_length(),
            audit_events: default_audit_events(),
        }
    }
}

fn default_max_duration_years() -> f64 {
    100.0
}

fn default_expiring_soon_days() -> u32 {
    90
}

fn default_max_summary_length() -> usize {
    10_000
}

fn default_audit_events() -> bool {
    true
}

/// Bearer token verification for the user-administration functions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// HS256 secret shared with the auth provider
    pub jwt_secret: String,

    /// Expected `aud` claim; not checked when absent
    #[serde(default)]
    pub audience: Option<String>,
}

/// Admin API of the external auth provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityConfig {
    /// Base URL of the provider, e.g. `https://project.example.com`
    pub base_url: String,

    /// Service-role key sent as `apikey` and bearer token
    pub service_key: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    10
}
