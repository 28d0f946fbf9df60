//! Domain layer - business logic and services

pub mod catalog;
pub mod compliance;
pub mod events;
pub mod mobility;
pub mod reporting;
pub mod repository;
pub mod service;
pub mod users;
pub mod validation;
pub mod years;

pub use catalog::{InstitutionDraft, ProfileUpdate};
pub use compliance::{ContraprestacionDraft, SeguimientoDraft};
pub use events::{AgreementEvent, EventPublisher, NoOpEventPublisher, TracingEventPublisher};
pub use reporting::{DashboardSummary, ExpiringAgreement};
pub use repository::{AgreementRepository, CatalogRepository, ComplianceRepository};
pub use service::Service;
pub use users::{AdminError, IdentityProvider, NewUser, TokenVerifier, UserAdministration};
pub use years::{SkipReason, YearPlan, YearSpan, YearSync};
