//! Contract layer - public models and errors
//!
//! This layer contains transport-agnostic models shared by every other layer.
//! NO serde derives on models - these are pure domain types.

pub mod error;
pub mod model;

pub use error::AgreementsError;
pub use model::{
    Agreement, AgreementDetail, AgreementDraft, AgreementFilter, AgreementStatus,
    AgreementSubtype, AgreementYear, Area, ComplianceStatus, Contraprestacion, Institution,
    MobilityDirection, MobilityDraft, MobilityRecord, ParticipantKind, Profile, ProfileRole,
    Renewal, ResponsibleAssignment, ResponsibleKind, ResponsibleLink, ResponsibleTarget,
    Seguimiento, SemiannualReport,
};
