//! Contraprestaciones (deliverables) and their seguimientos (tracking)

use super::service::{internal, Service};
use super::validation::{require_text, validate_public_url};
use crate::contract::{AgreementsError, ComplianceStatus, Contraprestacion, Seguimiento};
use chrono::Utc;
use uuid::Uuid;

/// Editable fields of a contraprestación
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContraprestacionDraft {
    pub kind: String,
    pub description: String,
    pub units_per_year: Option<i32>,
}

/// Editable fields of a seguimiento
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeguimientoDraft {
    pub year_id: Option<Uuid>,
    pub status: ComplianceStatus,
    pub evidence_url: Option<String>,
    pub notes: Option<String>,
}

impl Service {
    // ===== Contraprestaciones =====

    pub async fn create_contraprestacion(
        &self,
        agreement_id: Uuid,
        draft: ContraprestacionDraft,
    ) -> Result<Contraprestacion, AgreementsError> {
        validate_contraprestacion(&draft)?;
        self.load_agreement(agreement_id).await?;

        let now = Utc::now();
        let item = Contraprestacion {
            id: Uuid::new_v4(),
            agreement_id,
            kind: draft.kind.trim().to_string(),
            description: draft.description.trim().to_string(),
            units_per_year: draft.units_per_year,
            created_at: now,
            updated_at: now,
        };
        self.compliance
            .create_contraprestacion(&item)
            .await
            .map_err(internal)
    }

    /// Deliverables of a soft-deleted agreement are treated as gone
    pub async fn get_contraprestacion(&self, id: Uuid) -> Result<Contraprestacion, AgreementsError> {
        let item = self
            .compliance
            .find_contraprestacion(id)
            .await
            .map_err(internal)?
            .ok_or_else(|| AgreementsError::not_found("contraprestacion", id))?;
        self.load_agreement(item.agreement_id)
            .await
            .map_err(|err| orphaned(err, "contraprestacion", id))?;
        Ok(item)
    }

    pub async fn list_contraprestaciones(
        &self,
        agreement_id: Uuid,
    ) -> Result<Vec<Contraprestacion>, AgreementsError> {
        self.load_agreement(agreement_id).await?;
        self.compliance
            .list_contraprestaciones(agreement_id)
            .await
            .map_err(internal)
    }

    pub async fn update_contraprestacion(
        &self,
        id: Uuid,
        draft: ContraprestacionDraft,
    ) -> Result<Contraprestacion, AgreementsError> {
        validate_contraprestacion(&draft)?;
        let current = self.get_contraprestacion(id).await?;

        let item = Contraprestacion {
            kind: draft.kind.trim().to_string(),
            description: draft.description.trim().to_string(),
            units_per_year: draft.units_per_year,
            updated_at: Utc::now(),
            ..current
        };
        self.compliance
            .update_contraprestacion(&item)
            .await
            .map_err(internal)
    }

    /// Delete a contraprestación together with its tracking rows
    pub async fn delete_contraprestacion(&self, id: Uuid) -> Result<(), AgreementsError> {
        self.get_contraprestacion(id).await?;
        self.compliance
            .delete_contraprestacion(id)
            .await
            .map_err(internal)
    }

    // ===== Seguimientos =====

    pub async fn record_seguimiento(
        &self,
        contraprestacion_id: Uuid,
        draft: SeguimientoDraft,
    ) -> Result<Seguimiento, AgreementsError> {
        let contraprestacion = self.get_contraprestacion(contraprestacion_id).await?;
        self.validate_seguimiento(&contraprestacion, &draft).await?;

        let item = Seguimiento {
            id: Uuid::new_v4(),
            contraprestacion_id,
            year_id: draft.year_id,
            status: draft.status,
            evidence_url: draft.evidence_url,
            notes: draft.notes,
            recorded_at: Utc::now(),
        };
        let created = self
            .compliance
            .create_seguimiento(&item)
            .await
            .map_err(internal)?;
        tracing::info!(
            %contraprestacion_id,
            status = created.status.as_str(),
            "seguimiento recorded"
        );
        Ok(created)
    }

    pub async fn get_seguimiento(&self, id: Uuid) -> Result<Seguimiento, AgreementsError> {
        self.load_seguimiento(id).await.map(|(item, _)| item)
    }

    pub async fn list_seguimientos(
        &self,
        contraprestacion_id: Uuid,
    ) -> Result<Vec<Seguimiento>, AgreementsError> {
        self.get_contraprestacion(contraprestacion_id).await?;
        self.compliance
            .list_seguimientos(contraprestacion_id)
            .await
            .map_err(internal)
    }

    pub async fn update_seguimiento(
        &self,
        id: Uuid,
        draft: SeguimientoDraft,
    ) -> Result<Seguimiento, AgreementsError> {
        let (current, contraprestacion) = self.load_seguimiento(id).await?;
        self.validate_seguimiento(&contraprestacion, &draft).await?;

        let item = Seguimiento {
            year_id: draft.year_id,
            status: draft.status,
            evidence_url: draft.evidence_url,
            notes: draft.notes,
            recorded_at: Utc::now(),
            ..current
        };
        self.compliance
            .update_seguimiento(&item)
            .await
            .map_err(internal)
    }

    pub async fn delete_seguimiento(&self, id: Uuid) -> Result<(), AgreementsError> {
        self.get_seguimiento(id).await?;
        self.compliance
            .delete_seguimiento(id)
            .await
            .map_err(internal)
    }

    async fn load_seguimiento(
        &self,
        id: Uuid,
    ) -> Result<(Seguimiento, Contraprestacion), AgreementsError> {
        let item = self
            .compliance
            .find_seguimiento(id)
            .await
            .map_err(internal)?
            .ok_or_else(|| AgreementsError::not_found("seguimiento", id))?;
        let parent = self
            .get_contraprestacion(item.contraprestacion_id)
            .await
            .map_err(|err| orphaned(err, "seguimiento", id))?;
        Ok((item, parent))
    }

    /// The referenced year, if any, must belong to the deliverable's agreement
    async fn validate_seguimiento(
        &self,
        contraprestacion: &Contraprestacion,
        draft: &SeguimientoDraft,
    ) -> Result<(), AgreementsError> {
        if let Some(url) = &draft.evidence_url {
            validate_public_url("evidence_url", url)?;
        }

        if let Some(year_id) = draft.year_id {
            let years = self
                .agreements
                .list_years(contraprestacion.agreement_id)
                .await
                .map_err(internal)?;
            if !years.iter().any(|year| year.id == year_id) {
                return Err(AgreementsError::validation(format!(
                    "year {} does not belong to agreement {}",
                    year_id, contraprestacion.agreement_id
                )));
            }
        }
        Ok(())
    }
}

/// A missing parent reads as the child itself being missing
fn orphaned(err: AgreementsError, resource: &str, id: Uuid) -> AgreementsError {
    match err {
        AgreementsError::NotFound { .. } => AgreementsError::not_found(resource, id),
        other => other,
    }
}

fn validate_contraprestacion(draft: &ContraprestacionDraft) -> Result<(), AgreementsError> {
    require_text("kind", &draft.kind)?;
    require_text("description", &draft.description)?;
    if matches!(draft.units_per_year, Some(units) if units < 0) {
        return Err(AgreementsError::validation(
            "units_per_year must not be negative",
        ));
    }
    Ok(())
}
