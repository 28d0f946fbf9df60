//! REST DTOs with serde derives for HTTP API

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// List envelope
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> ListResponse<T> {
    pub fn from_models<M>(models: Vec<M>) -> Self
    where
        T: From<M>,
    {
        let items: Vec<T> = models.into_iter().map(T::from).collect();
        let total = items.len();
        Self { items, total }
    }
}

// ===== Agreement DTOs =====

/// Agreement response DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AgreementDto {
    pub id: Uuid,
    #[schema(example = "Convenio marco de cooperación académica")]
    pub name: String,
    pub institution_id: Uuid,
    pub signature_date: Option<NaiveDate>,
    /// Contract duration in years, possibly fractional
    #[schema(example = 2.5)]
    pub duration_years: f64,
    pub expiration_date: Option<NaiveDate>,
    pub country: Option<String>,
    pub agreement_types: Vec<String>,
    pub objectives: Option<String>,
    /// draft | active | expired | terminated
    #[schema(example = "active")]
    pub status: String,
    pub document_url: Option<String>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Agreement with responsibles, areas, subtypes and years
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AgreementDetailDto {
    pub agreement: AgreementDto,
    pub responsibles: Vec<ResponsibleDto>,
    pub area_ids: Vec<Uuid>,
    pub subtypes: Vec<SubtypeDto>,
    pub years: Vec<YearDto>,
}

/// Agreement create/update request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AgreementRequest {
    pub name: String,
    pub institution_id: Uuid,
    #[serde(default)]
    pub signature_date: Option<NaiveDate>,
    #[serde(default)]
    pub duration_years: f64,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub agreement_types: Vec<String>,
    #[serde(default)]
    pub objectives: Option<String>,
    /// Defaults to "draft"
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub document_url: Option<String>,
    #[serde(default)]
    pub area_ids: Vec<Uuid>,
    #[serde(default)]
    pub responsibles: Vec<ResponsibleAssignmentDto>,
}

/// Query parameters for listing agreements
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ListAgreementsQuery {
    pub status: Option<String>,
    pub institution_id: Option<Uuid>,
    pub country: Option<String>,
    /// Substring of the agreement name
    pub search: Option<String>,
    #[serde(default)]
    pub include_deleted: bool,
}

/// Responsible party assignment
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResponsibleAssignmentDto {
    pub profile_id: Uuid,
    /// internal | external
    #[schema(example = "internal")]
    pub kind: String,
}

/// Responsible party link
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResponsibleDto {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agreement_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtype_id: Option<Uuid>,
    pub profile_id: Uuid,
    pub kind: String,
}

/// Replace the responsible parties of an agreement or subtype
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SetResponsiblesRequest {
    pub responsibles: Vec<ResponsibleAssignmentDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubtypeDto {
    pub id: Uuid,
    pub agreement_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateSubtypeRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

// ===== Year and Renewal DTOs =====

/// Contractual year; both bounds inclusive
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct YearDto {
    pub id: Uuid,
    pub agreement_id: Uuid,
    pub year_number: i32,
    pub year_start: NaiveDate,
    pub year_end: NaiveDate,
}

/// Outcome of a year recalculation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct YearSyncDto {
    /// skipped | unchanged | applied
    pub outcome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RenewalDto {
    pub id: Uuid,
    pub agreement_id: Uuid,
    pub old_expiration_date: Option<NaiveDate>,
    pub new_expiration_date: NaiveDate,
    pub changed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RenewAgreementRequest {
    #[schema(example = "2028-03-15")]
    pub new_expiration_date: NaiveDate,
}

// ===== Catalog DTOs =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InstitutionDto {
    pub id: Uuid,
    pub name: String,
    pub country: Option<String>,
    pub website: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct InstitutionRequest {
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AreaDto {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AreaRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileDto {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    /// admin | user
    pub role: String,
    pub area_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub full_name: String,
    pub role: String,
    #[serde(default)]
    pub area_id: Option<Uuid>,
}

// ===== Compliance DTOs =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContraprestacionDto {
    pub id: Uuid,
    pub agreement_id: Uuid,
    #[schema(example = "scholarship")]
    pub kind: String,
    pub description: String,
    pub units_per_year: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ContraprestacionRequest {
    pub kind: String,
    pub description: String,
    #[serde(default)]
    pub units_per_year: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SeguimientoDto {
    pub id: Uuid,
    pub contraprestacion_id: Uuid,
    pub year_id: Option<Uuid>,
    /// pending | fulfilled | not_fulfilled
    pub status: String,
    pub evidence_url: Option<String>,
    pub notes: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SeguimientoRequest {
    #[serde(default)]
    pub year_id: Option<Uuid>,
    pub status: String,
    #[serde(default)]
    pub evidence_url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

// ===== Mobility DTOs =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MobilityDto {
    pub id: Uuid,
    pub agreement_id: Uuid,
    pub responsible_id: Uuid,
    pub participant_name: String,
    /// student | faculty
    pub participant_kind: String,
    /// incoming | outgoing
    pub direction: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub report_submitted: bool,
    pub report_submitted_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MobilityRequest {
    pub agreement_id: Uuid,
    pub responsible_id: Uuid,
    pub participant_name: String,
    pub participant_kind: String,
    pub direction: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ListMobilityQuery {
    pub agreement_id: Option<Uuid>,
}

// ===== Reporting DTOs =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportDto {
    pub id: Uuid,
    pub agreement_id: Uuid,
    pub year: i32,
    pub semester: u8,
    pub summary: String,
    pub author_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateReportRequest {
    #[schema(example = 2025)]
    pub year: i32,
    #[schema(example = 1)]
    pub semester: u8,
    pub summary: String,
    #[serde(default)]
    pub author_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExpiringAgreementDto {
    pub agreement_id: Uuid,
    pub name: String,
    pub expiration_date: NaiveDate,
    pub days_left: i64,
}

/// Aggregates for the reporting screen
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardDto {
    pub total_agreements: usize,
    pub agreements_by_status: std::collections::BTreeMap<String, usize>,
    pub agreements_by_country: std::collections::BTreeMap<String, usize>,
    pub agreements_by_type: std::collections::BTreeMap<String, usize>,
    pub expiring_soon: Vec<ExpiringAgreementDto>,
    pub mobility_by_kind: std::collections::BTreeMap<String, usize>,
    pub mobility_by_direction: std::collections::BTreeMap<String, usize>,
    pub pending_mobility_reports: usize,
    pub seguimientos_by_status: std::collections::BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct DashboardQuery {
    /// Reference date; defaults to the current UTC date
    pub today: Option<NaiveDate>,
}

// ===== User administration DTOs =====

/// Body of `POST /functions/create-user`
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    /// admin | user; defaults to "user"
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub area_id: Option<Uuid>,
}

/// Body of `POST /functions/delete-user`
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DeleteUserRequest {
    pub user_id: Uuid,
}
