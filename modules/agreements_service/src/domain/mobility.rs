//! Student and faculty mobility records
//!
//! Submitting the mobility report is one-way: afterwards the record is frozen
//! and every further write is rejected with [`AgreementsError::Frozen`].

use super::service::{internal, Service};
use super::validation::validate_mobility_draft;
use crate::contract::{AgreementsError, MobilityDraft, MobilityRecord};
use chrono::Utc;
use uuid::Uuid;

impl Service {
    pub async fn create_mobility(
        &self,
        draft: MobilityDraft,
    ) -> Result<MobilityRecord, AgreementsError> {
        validate_mobility_draft(&draft)?;
        self.load_agreement(draft.agreement_id).await?;
        self.ensure_responsible(draft.responsible_id).await?;

        let now = Utc::now();
        let record = MobilityRecord {
            id: Uuid::new_v4(),
            agreement_id: draft.agreement_id,
            responsible_id: draft.responsible_id,
            participant_name: draft.participant_name.trim().to_string(),
            participant_kind: draft.participant_kind,
            direction: draft.direction,
            start_date: draft.start_date,
            end_date: draft.end_date,
            report_submitted: false,
            report_submitted_at: None,
            notes: draft.notes,
            created_at: now,
            updated_at: now,
        };
        self.compliance
            .create_mobility(&record)
            .await
            .map_err(internal)
    }

    pub async fn get_mobility(&self, id: Uuid) -> Result<MobilityRecord, AgreementsError> {
        self.compliance
            .find_mobility(id)
            .await
            .map_err(internal)?
            .ok_or_else(|| AgreementsError::not_found("mobility record", id))
    }

    pub async fn list_mobility(
        &self,
        agreement_id: Option<Uuid>,
    ) -> Result<Vec<MobilityRecord>, AgreementsError> {
        self.compliance
            .list_mobility(agreement_id)
            .await
            .map_err(internal)
    }

    pub async fn update_mobility(
        &self,
        id: Uuid,
        draft: MobilityDraft,
    ) -> Result<MobilityRecord, AgreementsError> {
        validate_mobility_draft(&draft)?;
        let current = self.load_editable_mobility(id).await?;
        if draft.agreement_id != current.agreement_id {
            self.load_agreement(draft.agreement_id).await?;
        }
        self.ensure_responsible(draft.responsible_id).await?;

        let record = MobilityRecord {
            agreement_id: draft.agreement_id,
            responsible_id: draft.responsible_id,
            participant_name: draft.participant_name.trim().to_string(),
            participant_kind: draft.participant_kind,
            direction: draft.direction,
            start_date: draft.start_date,
            end_date: draft.end_date,
            notes: draft.notes,
            updated_at: Utc::now(),
            ..current
        };
        self.compliance
            .update_mobility(&record)
            .await
            .map_err(internal)
    }

    /// Mark the mobility report as submitted and freeze the record
    pub async fn submit_mobility_report(
        &self,
        id: Uuid,
    ) -> Result<MobilityRecord, AgreementsError> {
        let current = self.load_editable_mobility(id).await?;

        let now = Utc::now();
        let record = MobilityRecord {
            report_submitted: true,
            report_submitted_at: Some(now),
            updated_at: now,
            ..current
        };
        let saved = self
            .compliance
            .update_mobility(&record)
            .await
            .map_err(internal)?;
        tracing::info!(mobility_id = %id, "mobility report submitted");
        Ok(saved)
    }

    pub async fn delete_mobility(&self, id: Uuid) -> Result<(), AgreementsError> {
        self.load_editable_mobility(id).await?;
        self.compliance.delete_mobility(id).await.map_err(internal)
    }

    async fn load_editable_mobility(&self, id: Uuid) -> Result<MobilityRecord, AgreementsError> {
        let record = self.get_mobility(id).await?;
        if record.report_submitted {
            return Err(AgreementsError::Frozen { id: id.to_string() });
        }
        Ok(record)
    }

    async fn ensure_responsible(&self, profile_id: Uuid) -> Result<(), AgreementsError> {
        match self.catalog.find_profile(profile_id).await.map_err(internal)? {
            Some(_) => Ok(()),
            None => Err(AgreementsError::validation(format!(
                "responsible profile {} does not exist",
                profile_id
            ))),
        }
    }
}
