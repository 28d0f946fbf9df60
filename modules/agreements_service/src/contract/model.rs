//! Contract models for agreements service
//!
//! These models are transport-agnostic and shared by the domain, storage and
//! REST layers. NO serde derives - these are pure domain models.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

// ===== Agreements =====

/// Cooperation agreement ("convenio") with a counterpart institution
#[derive(Debug, Clone, PartialEq)]
pub struct Agreement {
    pub id: Uuid,
    /// Display name of the agreement
    pub name: String,
    /// Counterpart institution
    pub institution_id: Uuid,
    /// Date the agreement was signed; years are counted from here
    pub signature_date: Option<NaiveDate>,
    /// Contract duration in years, possibly fractional
    pub duration_years: f64,
    /// Current expiration date (moved by renewals)
    pub expiration_date: Option<NaiveDate>,
    pub country: Option<String>,
    /// Free-form type tags (e.g. "mobility", "research")
    pub agreement_types: Vec<String>,
    pub objectives: Option<String>,
    pub status: AgreementStatus,
    /// Public URL of the signed document
    pub document_url: Option<String>,
    /// Advisory revision counter, bumped on every write
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft delete timestamp
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Lifecycle status of an agreement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AgreementStatus {
    Draft,
    Active,
    Expired,
    Terminated,
}

impl AgreementStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Terminated => "terminated",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "active" => Some(Self::Active),
            "expired" => Some(Self::Expired),
            "terminated" => Some(Self::Terminated),
            _ => None,
        }
    }
}

/// Editable fields of an agreement, used for both create and update
#[derive(Debug, Clone, PartialEq)]
pub struct AgreementDraft {
    pub name: String,
    pub institution_id: Uuid,
    pub signature_date: Option<NaiveDate>,
    pub duration_years: f64,
    pub country: Option<String>,
    pub agreement_types: Vec<String>,
    pub objectives: Option<String>,
    pub status: AgreementStatus,
    pub document_url: Option<String>,
    pub area_ids: Vec<Uuid>,
    pub responsibles: Vec<ResponsibleAssignment>,
}

/// Filters for listing agreements
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgreementFilter {
    pub status: Option<AgreementStatus>,
    pub institution_id: Option<Uuid>,
    pub country: Option<String>,
    /// Case-insensitive substring match on the name
    pub search: Option<String>,
    pub include_deleted: bool,
}

/// Agreement with everything joined to it
#[derive(Debug, Clone, PartialEq)]
pub struct AgreementDetail {
    pub agreement: Agreement,
    pub responsibles: Vec<ResponsibleLink>,
    pub area_ids: Vec<Uuid>,
    pub subtypes: Vec<AgreementSubtype>,
    pub years: Vec<AgreementYear>,
}

/// Named subdivision of an agreement with its own responsible parties
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgreementSubtype {
    pub id: Uuid,
    pub agreement_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ===== Responsible parties =====

/// Whether a responsible party belongs to the owning institution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponsibleKind {
    Internal,
    External,
}

impl ResponsibleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::External => "external",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "internal" => Some(Self::Internal),
            "external" => Some(Self::External),
            _ => None,
        }
    }
}

/// What a responsible link is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponsibleTarget {
    Agreement(Uuid),
    Subtype(Uuid),
}

/// Profile designated as accountable for an agreement or subtype
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponsibleLink {
    pub id: Uuid,
    pub target: ResponsibleTarget,
    pub profile_id: Uuid,
    pub kind: ResponsibleKind,
}

/// Requested responsible party, before it is stored as a link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponsibleAssignment {
    pub profile_id: Uuid,
    pub kind: ResponsibleKind,
}

// ===== Years and renewals =====

/// One contractual year of an agreement; both bounds inclusive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgreementYear {
    pub id: Uuid,
    pub agreement_id: Uuid,
    /// 1-based position of the year
    pub year_number: i32,
    pub year_start: NaiveDate,
    pub year_end: NaiveDate,
}

/// Append-only record of an expiration date change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Renewal {
    pub id: Uuid,
    pub agreement_id: Uuid,
    pub old_expiration_date: Option<NaiveDate>,
    pub new_expiration_date: NaiveDate,
    pub changed_at: DateTime<Utc>,
}

// ===== Compliance =====

/// Deliverable owed under an agreement (e.g. scholarship slots)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contraprestacion {
    pub id: Uuid,
    pub agreement_id: Uuid,
    pub kind: String,
    pub description: String,
    pub units_per_year: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fulfillment state of a deliverable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComplianceStatus {
    Pending,
    Fulfilled,
    NotFulfilled,
}

impl ComplianceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fulfilled => "fulfilled",
            Self::NotFulfilled => "not_fulfilled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "fulfilled" => Some(Self::Fulfilled),
            "not_fulfilled" => Some(Self::NotFulfilled),
            _ => None,
        }
    }
}

/// Tracking record for a contraprestación
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seguimiento {
    pub id: Uuid,
    pub contraprestacion_id: Uuid,
    /// Contractual year the tracking refers to
    pub year_id: Option<Uuid>,
    pub status: ComplianceStatus,
    /// Public URL of the evidence PDF
    pub evidence_url: Option<String>,
    pub notes: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

// ===== Mobility =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParticipantKind {
    Student,
    Faculty,
}

impl ParticipantKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Faculty => "faculty",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "student" => Some(Self::Student),
            "faculty" => Some(Self::Faculty),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MobilityDirection {
    Incoming,
    Outgoing,
}

impl MobilityDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Incoming => "incoming",
            Self::Outgoing => "outgoing",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "incoming" => Some(Self::Incoming),
            "outgoing" => Some(Self::Outgoing),
            _ => None,
        }
    }
}

/// Student or faculty exchange under an agreement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MobilityRecord {
    pub id: Uuid,
    pub agreement_id: Uuid,
    /// Profile accountable for the exchange
    pub responsible_id: Uuid,
    pub participant_name: String,
    pub participant_kind: ParticipantKind,
    pub direction: MobilityDirection,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    /// Once set the record is frozen
    pub report_submitted: bool,
    pub report_submitted_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable fields of a mobility record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MobilityDraft {
    pub agreement_id: Uuid,
    pub responsible_id: Uuid,
    pub participant_name: String,
    pub participant_kind: ParticipantKind,
    pub direction: MobilityDirection,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

// ===== Reporting =====

/// Narrative report for one half of a calendar year
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemiannualReport {
    pub id: Uuid,
    pub agreement_id: Uuid,
    pub year: i32,
    /// 1 (January-June) or 2 (July-December)
    pub semester: u8,
    pub summary: String,
    pub author_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

// ===== Catalog =====

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Institution {
    pub id: Uuid,
    pub name: String,
    pub country: Option<String>,
    pub website: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Organisational unit of the owning institution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Area {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileRole {
    Admin,
    User,
}

impl ProfileRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Self::Admin),
            "user" => Some(Self::User),
            _ => None,
        }
    }
}

/// Application user; the id is shared with the auth provider account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub role: ProfileRole,
    pub area_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn is_admin(&self) -> bool {
        self.role == ProfileRole::Admin
    }
}
