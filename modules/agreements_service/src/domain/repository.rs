//! Repository traits for data access
//!
//! These traits define the interface for data access operations.
//! Implementations are in infra/storage/repositories.rs

use super::years::YearPlan;
use crate::contract::{
    Agreement, AgreementFilter, AgreementSubtype, AgreementYear, Area, Contraprestacion,
    Institution, MobilityRecord, Profile, Renewal, ResponsibleLink, ResponsibleTarget,
    Seguimiento, SemiannualReport,
};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Repository for agreements and the rows hanging off them
#[async_trait]
pub trait AgreementRepository: Send + Sync {
    /// Insert an agreement together with its area and responsible links
    async fn create_agreement(
        &self,
        agreement: &Agreement,
        area_ids: &[Uuid],
        responsibles: &[ResponsibleLink],
    ) -> Result<Agreement>;

    /// Overwrite an agreement and replace its area and responsible links
    async fn update_agreement(
        &self,
        agreement: &Agreement,
        area_ids: &[Uuid],
        responsibles: &[ResponsibleLink],
    ) -> Result<Agreement>;

    /// Find an agreement by id, soft-deleted ones included
    async fn find_agreement(&self, id: Uuid) -> Result<Option<Agreement>>;

    /// List agreements ordered by name
    async fn list_agreements(&self, filter: &AgreementFilter) -> Result<Vec<Agreement>>;

    /// Mark an agreement as deleted
    async fn soft_delete_agreement(&self, id: Uuid, deleted_at: DateTime<Utc>) -> Result<()>;

    /// Count agreements (soft-deleted included) whose counterpart is the institution
    async fn count_by_institution(&self, institution_id: Uuid) -> Result<u64>;

    /// Count agreements linked to an area
    async fn count_by_area(&self, area_id: Uuid) -> Result<u64>;

    /// Area ids linked to an agreement
    async fn list_area_ids(&self, agreement_id: Uuid) -> Result<Vec<Uuid>>;

    // ===== Responsible parties =====

    async fn list_responsibles(&self, target: ResponsibleTarget) -> Result<Vec<ResponsibleLink>>;

    /// Replace every link of the target with the given ones
    async fn replace_responsibles(
        &self,
        target: ResponsibleTarget,
        links: &[ResponsibleLink],
    ) -> Result<()>;

    /// Count links (agreement or subtype) pointing at a profile
    async fn count_responsible_links(&self, profile_id: Uuid) -> Result<u64>;

    // ===== Subtypes =====

    async fn create_subtype(&self, subtype: &AgreementSubtype) -> Result<AgreementSubtype>;

    async fn find_subtype(&self, id: Uuid) -> Result<Option<AgreementSubtype>>;

    async fn list_subtypes(&self, agreement_id: Uuid) -> Result<Vec<AgreementSubtype>>;

    /// Delete a subtype and its responsible links
    async fn delete_subtype(&self, id: Uuid) -> Result<()>;

    // ===== Years =====

    /// Year rows of an agreement ordered by year number
    async fn list_years(&self, agreement_id: Uuid) -> Result<Vec<AgreementYear>>;

    /// Apply inserts, updates and deletes of a year plan atomically
    async fn apply_year_plan(&self, agreement_id: Uuid, plan: &YearPlan) -> Result<()>;

    // ===== Renewals =====

    /// Append the renewal and move the agreement's expiration date atomically
    async fn record_renewal(&self, renewal: &Renewal, version: i32) -> Result<Agreement>;

    /// Renewal history ordered newest first
    async fn list_renewals(&self, agreement_id: Uuid) -> Result<Vec<Renewal>>;
}

/// Repository for reference data
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn create_institution(&self, institution: &Institution) -> Result<Institution>;
    async fn find_institution(&self, id: Uuid) -> Result<Option<Institution>>;
    async fn list_institutions(&self) -> Result<Vec<Institution>>;
    async fn update_institution(&self, institution: &Institution) -> Result<Institution>;
    async fn delete_institution(&self, id: Uuid) -> Result<()>;

    async fn create_area(&self, area: &Area) -> Result<Area>;
    async fn find_area(&self, id: Uuid) -> Result<Option<Area>>;
    async fn list_areas(&self) -> Result<Vec<Area>>;
    async fn update_area(&self, area: &Area) -> Result<Area>;
    async fn delete_area(&self, id: Uuid) -> Result<()>;

    async fn create_profile(&self, profile: &Profile) -> Result<Profile>;
    async fn find_profile(&self, id: Uuid) -> Result<Option<Profile>>;
    async fn find_profile_by_email(&self, email: &str) -> Result<Option<Profile>>;
    async fn list_profiles(&self) -> Result<Vec<Profile>>;
    async fn update_profile(&self, profile: &Profile) -> Result<Profile>;
    async fn delete_profile(&self, id: Uuid) -> Result<()>;
}

/// Repository for deliverables, mobility and reports
#[async_trait]
pub trait ComplianceRepository: Send + Sync {
    async fn create_contraprestacion(&self, item: &Contraprestacion) -> Result<Contraprestacion>;
    async fn find_contraprestacion(&self, id: Uuid) -> Result<Option<Contraprestacion>>;
    async fn list_contraprestaciones(&self, agreement_id: Uuid) -> Result<Vec<Contraprestacion>>;
    async fn list_all_contraprestaciones(&self) -> Result<Vec<Contraprestacion>>;
    async fn update_contraprestacion(&self, item: &Contraprestacion) -> Result<Contraprestacion>;
    /// Delete a contraprestación and all of its seguimientos
    async fn delete_contraprestacion(&self, id: Uuid) -> Result<()>;

    async fn create_seguimiento(&self, item: &Seguimiento) -> Result<Seguimiento>;
    async fn find_seguimiento(&self, id: Uuid) -> Result<Option<Seguimiento>>;
    async fn list_seguimientos(&self, contraprestacion_id: Uuid) -> Result<Vec<Seguimiento>>;
    async fn list_all_seguimientos(&self) -> Result<Vec<Seguimiento>>;
    async fn update_seguimiento(&self, item: &Seguimiento) -> Result<Seguimiento>;
    async fn delete_seguimiento(&self, id: Uuid) -> Result<()>;

    async fn create_mobility(&self, record: &MobilityRecord) -> Result<MobilityRecord>;
    async fn find_mobility(&self, id: Uuid) -> Result<Option<MobilityRecord>>;
    async fn list_mobility(&self, agreement_id: Option<Uuid>) -> Result<Vec<MobilityRecord>>;
    async fn update_mobility(&self, record: &MobilityRecord) -> Result<MobilityRecord>;
    async fn delete_mobility(&self, id: Uuid) -> Result<()>;
    async fn count_mobility_by_responsible(&self, profile_id: Uuid) -> Result<u64>;

    async fn create_report(&self, report: &SemiannualReport) -> Result<SemiannualReport>;
    async fn find_report(&self, id: Uuid) -> Result<Option<SemiannualReport>>;
    async fn find_report_by_period(
        &self,
        agreement_id: Uuid,
        year: i32,
        semester: u8,
    ) -> Result<Option<SemiannualReport>>;
    async fn list_reports(&self, agreement_id: Uuid) -> Result<Vec<SemiannualReport>>;
    async fn delete_report(&self, id: Uuid) -> Result<()>;
}
