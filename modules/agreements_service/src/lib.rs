//! Agreements Service Module
//!
//! Institutional cooperation agreements ("convenios"): counterpart
//! institutions, contractual years, renewals, deliverables and their
//! tracking, student and faculty mobility, semi-annual reports and the
//! privileged user-administration functions.

// Public exports
pub mod contract;
pub use contract::{
    error::AgreementsError, Agreement, AgreementDetail, AgreementDraft, AgreementFilter,
    AgreementStatus, AgreementYear, Renewal,
};

pub mod module;
pub use module::AgreementsServiceModule;

pub mod config;
pub use config::{AgreementsConfig, AuthConfig, IdentityConfig};

// Internal modules (hidden from public API)
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
