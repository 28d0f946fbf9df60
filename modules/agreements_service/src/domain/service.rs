//! Domain service - business logic orchestration
//!
//! Agreements, their contractual years and renewals live here. Catalog,
//! compliance, mobility and reporting operations extend [`Service`] from
//! their own modules.

use super::events::{AgreementEvent, EventPublisher};
use super::repository::{AgreementRepository, CatalogRepository, ComplianceRepository};
use super::validation::{require_text, validate_agreement_draft};
use super::years::{
    compute_year_spans, expiration_date_for, plan_reconciliation, year_count, SkipReason,
    YearSync,
};
use crate::config::AgreementsConfig;
use crate::contract::{
    Agreement, AgreementDetail, AgreementDraft, AgreementFilter, AgreementSubtype,
    AgreementYear, AgreementsError, Renewal, ResponsibleAssignment, ResponsibleLink,
    ResponsibleTarget,
};
use chrono::{NaiveDate, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// Log a storage failure and hide it behind [`AgreementsError::Internal`]
pub(crate) fn internal(error: anyhow::Error) -> AgreementsError {
    tracing::error!(error = ?error, "storage operation failed");
    AgreementsError::Internal
}

/// Domain service for agreements management
pub struct Service {
    pub(crate) agreements: Arc<dyn AgreementRepository>,
    pub(crate) catalog: Arc<dyn CatalogRepository>,
    pub(crate) compliance: Arc<dyn ComplianceRepository>,
    pub(crate) event_publisher: Arc<dyn EventPublisher>,
    pub(crate) config: AgreementsConfig,
}

impl Service {
    /// Create a new service instance
    pub fn new(
        agreements: Arc<dyn AgreementRepository>,
        catalog: Arc<dyn CatalogRepository>,
        compliance: Arc<dyn ComplianceRepository>,
        event_publisher: Arc<dyn EventPublisher>,
        config: AgreementsConfig,
    ) -> Self {
        Self {
            agreements,
            catalog,
            compliance,
            event_publisher,
            config,
        }
    }

    pub fn config(&self) -> &AgreementsConfig {
        &self.config
    }

    // ===== Agreement Operations =====

    /// Create an agreement, its links and its contractual years
    pub async fn create_agreement(
        &self,
        draft: AgreementDraft,
    ) -> Result<AgreementDetail, AgreementsError> {
        validate_agreement_draft(&draft, &self.config)?;
        self.ensure_institution_exists(draft.institution_id).await?;
        let area_ids = self.ensure_areas_exist(&draft.area_ids).await?;
        self.ensure_profiles_exist(&draft.responsibles).await?;

        let now = Utc::now();
        let id = Uuid::new_v4();
        let agreement = Agreement {
            id,
            name: draft.name.trim().to_string(),
            institution_id: draft.institution_id,
            signature_date: draft.signature_date,
            duration_years: draft.duration_years,
            expiration_date: draft
                .signature_date
                .and_then(|date| expiration_date_for(date, draft.duration_years)),
            country: draft.country,
            agreement_types: draft.agreement_types,
            objectives: draft.objectives,
            status: draft.status,
            document_url: draft.document_url,
            version: 1,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let links = build_links(ResponsibleTarget::Agreement(id), &draft.responsibles);

        let created = self
            .agreements
            .create_agreement(&agreement, &area_ids, &links)
            .await
            .map_err(internal)?;
        tracing::info!(agreement_id = %created.id, name = %created.name, "agreement created");
        self.publish(AgreementEvent::created(created.id, created.version))
            .await;

        self.generate_years_if_needed(created.id).await?;
        self.get_agreement(created.id).await
    }

    /// Get a live agreement with its responsibles, areas, subtypes and years
    pub async fn get_agreement(&self, id: Uuid) -> Result<AgreementDetail, AgreementsError> {
        let agreement = self.load_agreement(id).await?;

        let responsibles = self
            .agreements
            .list_responsibles(ResponsibleTarget::Agreement(id))
            .await
            .map_err(internal)?;
        let area_ids = self.agreements.list_area_ids(id).await.map_err(internal)?;
        let subtypes = self.agreements.list_subtypes(id).await.map_err(internal)?;
        let years = self.agreements.list_years(id).await.map_err(internal)?;

        Ok(AgreementDetail {
            agreement,
            responsibles,
            area_ids,
            subtypes,
            years,
        })
    }

    /// List agreements matching a filter
    pub async fn list_agreements(
        &self,
        filter: &AgreementFilter,
    ) -> Result<Vec<Agreement>, AgreementsError> {
        self.agreements
            .list_agreements(filter)
            .await
            .map_err(internal)
    }

    /// Replace the editable fields of an agreement.
    ///
    /// The expiration date is recomputed only when the signature date or the
    /// duration changed, so a renewed expiration survives unrelated edits.
    /// Concurrent edits are not reconciled: the last write wins.
    pub async fn update_agreement(
        &self,
        id: Uuid,
        draft: AgreementDraft,
    ) -> Result<AgreementDetail, AgreementsError> {
        validate_agreement_draft(&draft, &self.config)?;
        let current = self.load_agreement(id).await?;
        self.ensure_institution_exists(draft.institution_id).await?;
        let area_ids = self.ensure_areas_exist(&draft.area_ids).await?;
        self.ensure_profiles_exist(&draft.responsibles).await?;

        let dates_changed = current.signature_date != draft.signature_date
            || current.duration_years != draft.duration_years;
        let expiration_date = if dates_changed {
            draft
                .signature_date
                .and_then(|date| expiration_date_for(date, draft.duration_years))
        } else {
            current.expiration_date
        };

        let agreement = Agreement {
            id,
            name: draft.name.trim().to_string(),
            institution_id: draft.institution_id,
            signature_date: draft.signature_date,
            duration_years: draft.duration_years,
            expiration_date,
            country: draft.country,
            agreement_types: draft.agreement_types,
            objectives: draft.objectives,
            status: draft.status,
            document_url: draft.document_url,
            version: current.version + 1,
            created_at: current.created_at,
            updated_at: Utc::now(),
            deleted_at: None,
        };
        let links = build_links(ResponsibleTarget::Agreement(id), &draft.responsibles);

        let updated = self
            .agreements
            .update_agreement(&agreement, &area_ids, &links)
            .await
            .map_err(internal)?;
        tracing::info!(agreement_id = %id, version = updated.version, "agreement updated");
        self.publish(AgreementEvent::updated(id, updated.version))
            .await;

        if dates_changed {
            self.recalculate_agreement_years(id).await?;
        }
        self.get_agreement(id).await
    }

    /// Soft delete an agreement; renewal history is kept
    pub async fn delete_agreement(&self, id: Uuid) -> Result<(), AgreementsError> {
        let agreement = self.load_agreement(id).await?;

        self.agreements
            .soft_delete_agreement(id, Utc::now())
            .await
            .map_err(internal)?;
        tracing::info!(agreement_id = %id, "agreement deleted");
        self.publish(AgreementEvent::deleted(id, agreement.version))
            .await;
        Ok(())
    }

    // ===== Year Operations =====

    /// Generate contractual years when the agreement has none yet
    pub async fn generate_years_if_needed(
        &self,
        agreement_id: Uuid,
    ) -> Result<YearSync, AgreementsError> {
        let agreement = self.load_agreement(agreement_id).await?;
        let existing = self
            .agreements
            .list_years(agreement_id)
            .await
            .map_err(internal)?;

        if !existing.is_empty() {
            tracing::debug!(%agreement_id, years = existing.len(), "years already generated");
            return Ok(YearSync::Unchanged);
        }
        self.sync_years(&agreement, &existing).await
    }

    /// Reconcile stored years with the current signature date and duration
    pub async fn recalculate_agreement_years(
        &self,
        agreement_id: Uuid,
    ) -> Result<YearSync, AgreementsError> {
        let agreement = self.load_agreement(agreement_id).await?;
        let existing = self
            .agreements
            .list_years(agreement_id)
            .await
            .map_err(internal)?;
        self.sync_years(&agreement, &existing).await
    }

    /// Contractual years of a live agreement
    pub async fn list_years(&self, agreement_id: Uuid) -> Result<Vec<AgreementYear>, AgreementsError> {
        self.load_agreement(agreement_id).await?;
        self.agreements
            .list_years(agreement_id)
            .await
            .map_err(internal)
    }

    async fn sync_years(
        &self,
        agreement: &Agreement,
        existing: &[AgreementYear],
    ) -> Result<YearSync, AgreementsError> {
        let Some(signature_date) = agreement.signature_date else {
            tracing::warn!(
                agreement_id = %agreement.id,
                "agreement has no signature date, skipping year generation"
            );
            return Ok(YearSync::Skipped(SkipReason::MissingSignatureDate));
        };
        if year_count(agreement.duration_years).is_none() {
            tracing::warn!(
                agreement_id = %agreement.id,
                duration_years = agreement.duration_years,
                "agreement duration is not positive, skipping year generation"
            );
            return Ok(YearSync::Skipped(SkipReason::NonPositiveDuration));
        }

        let spans = compute_year_spans(signature_date, agreement.duration_years);
        let plan = plan_reconciliation(existing, &spans);
        let outcome = plan.outcome();

        if let YearSync::Applied {
            inserted,
            updated,
            deleted,
        } = outcome
        {
            self.agreements
                .apply_year_plan(agreement.id, &plan)
                .await
                .map_err(internal)?;
            tracing::info!(
                agreement_id = %agreement.id,
                inserted,
                updated,
                deleted,
                "agreement years reconciled"
            );
            self.publish(AgreementEvent::years_reconciled(
                agreement.id,
                inserted,
                updated,
                deleted,
            ))
            .await;
        }
        Ok(outcome)
    }

    // ===== Renewal Operations =====

    /// Move the expiration date of an agreement and record the change
    pub async fn renew_agreement(
        &self,
        agreement_id: Uuid,
        new_expiration_date: NaiveDate,
    ) -> Result<Renewal, AgreementsError> {
        let agreement = self.load_agreement(agreement_id).await?;

        if let Some(signature_date) = agreement.signature_date {
            if new_expiration_date <= signature_date {
                return Err(AgreementsError::validation(format!(
                    "new expiration date {} must be after the signature date {}",
                    new_expiration_date, signature_date
                )));
            }
        }
        if let Some(current) = agreement.expiration_date {
            if new_expiration_date <= current {
                return Err(AgreementsError::validation(format!(
                    "new expiration date {} must be after the current expiration date {}",
                    new_expiration_date, current
                )));
            }
        }

        let renewal = Renewal {
            id: Uuid::new_v4(),
            agreement_id,
            old_expiration_date: agreement.expiration_date,
            new_expiration_date,
            changed_at: Utc::now(),
        };
        self.agreements
            .record_renewal(&renewal, agreement.version + 1)
            .await
            .map_err(internal)?;

        tracing::info!(
            %agreement_id,
            old = ?renewal.old_expiration_date,
            new = %new_expiration_date,
            "agreement renewed"
        );
        self.publish(AgreementEvent::renewed(
            agreement_id,
            renewal.id,
            renewal.old_expiration_date,
            new_expiration_date,
        ))
        .await;
        Ok(renewal)
    }

    /// Renewal history, newest first; kept for deleted agreements too
    pub async fn list_renewals(&self, agreement_id: Uuid) -> Result<Vec<Renewal>, AgreementsError> {
        self.agreements
            .find_agreement(agreement_id)
            .await
            .map_err(internal)?
            .ok_or_else(|| AgreementsError::not_found("agreement", agreement_id))?;

        self.agreements
            .list_renewals(agreement_id)
            .await
            .map_err(internal)
    }

    // ===== Responsible Operations =====

    /// Replace the responsible parties of an agreement
    pub async fn set_agreement_responsibles(
        &self,
        agreement_id: Uuid,
        assignments: Vec<ResponsibleAssignment>,
    ) -> Result<Vec<ResponsibleLink>, AgreementsError> {
        self.load_agreement(agreement_id).await?;
        self.ensure_profiles_exist(&assignments).await?;

        let target = ResponsibleTarget::Agreement(agreement_id);
        let links = build_links(target, &assignments);
        self.agreements
            .replace_responsibles(target, &links)
            .await
            .map_err(internal)?;
        Ok(links)
    }

    // ===== Subtype Operations =====

    pub async fn create_subtype(
        &self,
        agreement_id: Uuid,
        name: String,
        description: Option<String>,
    ) -> Result<AgreementSubtype, AgreementsError> {
        require_text("name", &name)?;
        self.load_agreement(agreement_id).await?;

        let subtype = AgreementSubtype {
            id: Uuid::new_v4(),
            agreement_id,
            name: name.trim().to_string(),
            description,
            created_at: Utc::now(),
        };
        self.agreements
            .create_subtype(&subtype)
            .await
            .map_err(internal)
    }

    pub async fn list_subtypes(
        &self,
        agreement_id: Uuid,
    ) -> Result<Vec<AgreementSubtype>, AgreementsError> {
        self.load_agreement(agreement_id).await?;
        self.agreements
            .list_subtypes(agreement_id)
            .await
            .map_err(internal)
    }

    pub async fn delete_subtype(&self, subtype_id: Uuid) -> Result<(), AgreementsError> {
        self.load_subtype(subtype_id).await?;
        self.agreements
            .delete_subtype(subtype_id)
            .await
            .map_err(internal)
    }

    /// Replace the responsible parties of a subtype
    pub async fn set_subtype_responsibles(
        &self,
        subtype_id: Uuid,
        assignments: Vec<ResponsibleAssignment>,
    ) -> Result<Vec<ResponsibleLink>, AgreementsError> {
        self.load_subtype(subtype_id).await?;
        self.ensure_profiles_exist(&assignments).await?;

        let target = ResponsibleTarget::Subtype(subtype_id);
        let links = build_links(target, &assignments);
        self.agreements
            .replace_responsibles(target, &links)
            .await
            .map_err(internal)?;
        Ok(links)
    }

    pub async fn list_subtype_responsibles(
        &self,
        subtype_id: Uuid,
    ) -> Result<Vec<ResponsibleLink>, AgreementsError> {
        self.load_subtype(subtype_id).await?;
        self.agreements
            .list_responsibles(ResponsibleTarget::Subtype(subtype_id))
            .await
            .map_err(internal)
    }

    // ===== Helper Methods =====

    /// Load an agreement that has not been soft-deleted
    pub(crate) async fn load_agreement(&self, id: Uuid) -> Result<Agreement, AgreementsError> {
        self.agreements
            .find_agreement(id)
            .await
            .map_err(internal)?
            .filter(|agreement| agreement.deleted_at.is_none())
            .ok_or_else(|| AgreementsError::not_found("agreement", id))
    }

    async fn load_subtype(&self, id: Uuid) -> Result<AgreementSubtype, AgreementsError> {
        self.agreements
            .find_subtype(id)
            .await
            .map_err(internal)?
            .ok_or_else(|| AgreementsError::not_found("subtype", id))
    }

    async fn ensure_institution_exists(&self, id: Uuid) -> Result<(), AgreementsError> {
        match self.catalog.find_institution(id).await.map_err(internal)? {
            Some(_) => Ok(()),
            None => Err(AgreementsError::validation(format!(
                "institution {} does not exist",
                id
            ))),
        }
    }

    /// Check every area exists; returns the ids without duplicates
    async fn ensure_areas_exist(&self, area_ids: &[Uuid]) -> Result<Vec<Uuid>, AgreementsError> {
        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(area_ids.len());
        for &area_id in area_ids {
            if !seen.insert(area_id) {
                continue;
            }
            if self
                .catalog
                .find_area(area_id)
                .await
                .map_err(internal)?
                .is_none()
            {
                return Err(AgreementsError::validation(format!(
                    "area {} does not exist",
                    area_id
                )));
            }
            unique.push(area_id);
        }
        Ok(unique)
    }

    pub(crate) async fn ensure_profiles_exist(
        &self,
        assignments: &[ResponsibleAssignment],
    ) -> Result<(), AgreementsError> {
        for assignment in assignments {
            if self
                .catalog
                .find_profile(assignment.profile_id)
                .await
                .map_err(internal)?
                .is_none()
            {
                return Err(AgreementsError::validation(format!(
                    "profile {} does not exist",
                    assignment.profile_id
                )));
            }
        }
        Ok(())
    }

    /// Publish an event; failures are logged and swallowed
    pub(crate) async fn publish(&self, event: AgreementEvent) {
        let agreement_id = event.agreement_id();
        if let Err(e) = self.event_publisher.publish(event).await {
            tracing::warn!(%agreement_id, error = %e, "failed to publish agreement event");
        }
    }
}

/// Turn assignments into links, dropping repeated (profile, kind) pairs
fn build_links(
    target: ResponsibleTarget,
    assignments: &[ResponsibleAssignment],
) -> Vec<ResponsibleLink> {
    let mut seen = HashSet::new();
    assignments
        .iter()
        .filter(|a| seen.insert((a.profile_id, a.kind)))
        .map(|a| ResponsibleLink {
            id: Uuid::new_v4(),
            target,
            profile_id: a.profile_id,
            kind: a.kind,
        })
        .collect()
}
