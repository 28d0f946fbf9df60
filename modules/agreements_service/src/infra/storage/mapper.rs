//! Entity to model mappers
//!
//! Conversions between SeaORM entities and contract models

use super::entity;
use crate::contract::{
    Agreement, AgreementStatus, AgreementSubtype, AgreementYear, Area, ComplianceStatus,
    Contraprestacion, Institution, MobilityDirection, MobilityRecord, ParticipantKind, Profile,
    ProfileRole, Renewal, ResponsibleKind, ResponsibleLink, ResponsibleTarget, Seguimiento,
    SemiannualReport,
};
use anyhow::{anyhow, Context};
use sea_orm::ActiveValue::Set;

fn parse_column<T>(column: &str, raw: &str, parse: fn(&str) -> Option<T>) -> anyhow::Result<T> {
    parse(raw).ok_or_else(|| anyhow!("unknown {} value in database: {:?}", column, raw))
}

// ===== Agreement Conversions =====

impl TryFrom<entity::agreement::Model> for Agreement {
    type Error = anyhow::Error;

    fn try_from(entity: entity::agreement::Model) -> Result<Self, Self::Error> {
        let agreement_types: Vec<String> = serde_json::from_value(entity.agreement_types)
            .context("agreement_types is not a JSON array of strings")?;

        Ok(Self {
            id: entity.id,
            name: entity.name,
            institution_id: entity.institution_id,
            signature_date: entity.signature_date,
            duration_years: entity.duration_years,
            expiration_date: entity.expiration_date,
            country: entity.country,
            agreement_types,
            objectives: entity.objectives,
            status: parse_column("status", &entity.status, AgreementStatus::parse)?,
            document_url: entity.document_url,
            version: entity.version,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            deleted_at: entity.deleted_at,
        })
    }
}

impl From<&Agreement> for entity::agreement::ActiveModel {
    fn from(model: &Agreement) -> Self {
        Self {
            id: Set(model.id),
            name: Set(model.name.clone()),
            institution_id: Set(model.institution_id),
            signature_date: Set(model.signature_date),
            duration_years: Set(model.duration_years),
            expiration_date: Set(model.expiration_date),
            country: Set(model.country.clone()),
            agreement_types: Set(serde_json::Value::from(model.agreement_types.clone())),
            objectives: Set(model.objectives.clone()),
            status: Set(model.status.as_str().to_string()),
            document_url: Set(model.document_url.clone()),
            version: Set(model.version),
            created_at: Set(model.created_at),
            updated_at: Set(model.updated_at),
            deleted_at: Set(model.deleted_at),
        }
    }
}

impl From<entity::agreement_subtype::Model> for AgreementSubtype {
    fn from(entity: entity::agreement_subtype::Model) -> Self {
        Self {
            id: entity.id,
            agreement_id: entity.agreement_id,
            name: entity.name,
            description: entity.description,
            created_at: entity.created_at,
        }
    }
}

impl From<&AgreementSubtype> for entity::agreement_subtype::ActiveModel {
    fn from(model: &AgreementSubtype) -> Self {
        Self {
            id: Set(model.id),
            agreement_id: Set(model.agreement_id),
            name: Set(model.name.clone()),
            description: Set(model.description.clone()),
            created_at: Set(model.created_at),
        }
    }
}

// ===== Responsible Conversions =====

impl TryFrom<entity::responsible::Model> for ResponsibleLink {
    type Error = anyhow::Error;

    fn try_from(entity: entity::responsible::Model) -> Result<Self, Self::Error> {
        let target = match (entity.agreement_id, entity.subtype_id) {
            (Some(agreement_id), None) => ResponsibleTarget::Agreement(agreement_id),
            (None, Some(subtype_id)) => ResponsibleTarget::Subtype(subtype_id),
            _ => {
                return Err(anyhow!(
                    "responsible {} must reference exactly one of agreement or subtype",
                    entity.id
                ))
            }
        };

        Ok(Self {
            id: entity.id,
            target,
            profile_id: entity.profile_id,
            kind: parse_column("kind", &entity.kind, ResponsibleKind::parse)?,
        })
    }
}

impl From<&ResponsibleLink> for entity::responsible::ActiveModel {
    fn from(model: &ResponsibleLink) -> Self {
        let (agreement_id, subtype_id) = match model.target {
            ResponsibleTarget::Agreement(id) => (Some(id), None),
            ResponsibleTarget::Subtype(id) => (None, Some(id)),
        };
        Self {
            id: Set(model.id),
            agreement_id: Set(agreement_id),
            subtype_id: Set(subtype_id),
            profile_id: Set(model.profile_id),
            kind: Set(model.kind.as_str().to_string()),
        }
    }
}

// ===== Year and Renewal Conversions =====

impl From<entity::agreement_year::Model> for AgreementYear {
    fn from(entity: entity::agreement_year::Model) -> Self {
        Self {
            id: entity.id,
            agreement_id: entity.agreement_id,
            year_number: entity.year_number,
            year_start: entity.year_start,
            year_end: entity.year_end,
        }
    }
}

impl From<&AgreementYear> for entity::agreement_year::ActiveModel {
    fn from(model: &AgreementYear) -> Self {
        Self {
            id: Set(model.id),
            agreement_id: Set(model.agreement_id),
            year_number: Set(model.year_number),
            year_start: Set(model.year_start),
            year_end: Set(model.year_end),
        }
    }
}

impl From<entity::renewal::Model> for Renewal {
    fn from(entity: entity::renewal::Model) -> Self {
        Self {
            id: entity.id,
            agreement_id: entity.agreement_id,
            old_expiration_date: entity.old_expiration_date,
            new_expiration_date: entity.new_expiration_date,
            changed_at: entity.changed_at,
        }
    }
}

impl From<&Renewal> for entity::renewal::ActiveModel {
    fn from(model: &Renewal) -> Self {
        Self {
            id: Set(model.id),
            agreement_id: Set(model.agreement_id),
            old_expiration_date: Set(model.old_expiration_date),
            new_expiration_date: Set(model.new_expiration_date),
            changed_at: Set(model.changed_at),
        }
    }
}

// ===== Compliance Conversions =====

impl From<entity::contraprestacion::Model> for Contraprestacion {
    fn from(entity: entity::contraprestacion::Model) -> Self {
        Self {
            id: entity.id,
            agreement_id: entity.agreement_id,
            kind: entity.kind,
            description: entity.description,
            units_per_year: entity.units_per_year,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

impl From<&Contraprestacion> for entity::contraprestacion::ActiveModel {
    fn from(model: &Contraprestacion) -> Self {
        Self {
            id: Set(model.id),
            agreement_id: Set(model.agreement_id),
            kind: Set(model.kind.clone()),
            description: Set(model.description.clone()),
            units_per_year: Set(model.units_per_year),
            created_at: Set(model.created_at),
            updated_at: Set(model.updated_at),
        }
    }
}

impl TryFrom<entity::seguimiento::Model> for Seguimiento {
    type Error = anyhow::Error;

    fn try_from(entity: entity::seguimiento::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: entity.id,
            contraprestacion_id: entity.contraprestacion_id,
            year_id: entity.year_id,
            status: parse_column("status", &entity.status, ComplianceStatus::parse)?,
            evidence_url: entity.evidence_url,
            notes: entity.notes,
            recorded_at: entity.recorded_at,
        })
    }
}

impl From<&Seguimiento> for entity::seguimiento::ActiveModel {
    fn from(model: &Seguimiento) -> Self {
        Self {
            id: Set(model.id),
            contraprestacion_id: Set(model.contraprestacion_id),
            year_id: Set(model.year_id),
            status: Set(model.status.as_str().to_string()),
            evidence_url: Set(model.evidence_url.clone()),
            notes: Set(model.notes.clone()),
            recorded_at: Set(model.recorded_at),
        }
    }
}

impl TryFrom<entity::mobility::Model> for MobilityRecord {
    type Error = anyhow::Error;

    fn try_from(entity: entity::mobility::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: entity.id,
            agreement_id: entity.agreement_id,
            responsible_id: entity.responsible_id,
            participant_name: entity.participant_name,
            participant_kind: parse_column(
                "participant_kind",
                &entity.participant_kind,
                ParticipantKind::parse,
            )?,
            direction: parse_column("direction", &entity.direction, MobilityDirection::parse)?,
            start_date: entity.start_date,
            end_date: entity.end_date,
            report_submitted: entity.report_submitted,
            report_submitted_at: entity.report_submitted_at,
            notes: entity.notes,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}

impl From<&MobilityRecord> for entity::mobility::ActiveModel {
    fn from(model: &MobilityRecord) -> Self {
        Self {
            id: Set(model.id),
            agreement_id: Set(model.agreement_id),
            responsible_id: Set(model.responsible_id),
            participant_name: Set(model.participant_name.clone()),
            participant_kind: Set(model.participant_kind.as_str().to_string()),
            direction: Set(model.direction.as_str().to_string()),
            start_date: Set(model.start_date),
            end_date: Set(model.end_date),
            report_submitted: Set(model.report_submitted),
            report_submitted_at: Set(model.report_submitted_at),
            notes: Set(model.notes.clone()),
            created_at: Set(model.created_at),
            updated_at: Set(model.updated_at),
        }
    }
}

impl TryFrom<entity::report::Model> for SemiannualReport {
    type Error = anyhow::Error;

    fn try_from(entity: entity::report::Model) -> Result<Self, Self::Error> {
        let semester = u8::try_from(entity.semester)
            .with_context(|| format!("invalid semester {} on report {}", entity.semester, entity.id))?;
        Ok(Self {
            id: entity.id,
            agreement_id: entity.agreement_id,
            year: entity.year,
            semester,
            summary: entity.summary,
            author_id: entity.author_id,
            created_at: entity.created_at,
        })
    }
}

impl From<&SemiannualReport> for entity::report::ActiveModel {
    fn from(model: &SemiannualReport) -> Self {
        Self {
            id: Set(model.id),
            agreement_id: Set(model.agreement_id),
            year: Set(model.year),
            semester: Set(i16::from(model.semester)),
            summary: Set(model.summary.clone()),
            author_id: Set(model.author_id),
            created_at: Set(model.created_at),
        }
    }
}

// ===== Catalog Conversions =====

impl From<entity::institution::Model> for Institution {
    fn from(entity: entity::institution::Model) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            country: entity.country,
            website: entity.website,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

impl From<&Institution> for entity::institution::ActiveModel {
    fn from(model: &Institution) -> Self {
        Self {
            id: Set(model.id),
            name: Set(model.name.clone()),
            country: Set(model.country.clone()),
            website: Set(model.website.clone()),
            created_at: Set(model.created_at),
            updated_at: Set(model.updated_at),
        }
    }
}

impl From<entity::area::Model> for Area {
    fn from(entity: entity::area::Model) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            description: entity.description,
            created_at: entity.created_at,
        }
    }
}

impl From<&Area> for entity::area::ActiveModel {
    fn from(model: &Area) -> Self {
        Self {
            id: Set(model.id),
            name: Set(model.name.clone()),
            description: Set(model.description.clone()),
            created_at: Set(model.created_at),
        }
    }
}

impl TryFrom<entity::profile::Model> for Profile {
    type Error = anyhow::Error;

    fn try_from(entity: entity::profile::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: entity.id,
            full_name: entity.full_name,
            email: entity.email,
            role: parse_column("role", &entity.role, ProfileRole::parse)?,
            area_id: entity.area_id,
            created_at: entity.created_at,
        })
    }
}

impl From<&Profile> for entity::profile::ActiveModel {
    fn from(model: &Profile) -> Self {
        Self {
            id: Set(model.id),
            full_name: Set(model.full_name.clone()),
            email: Set(model.email.clone()),
            role: Set(model.role.as_str().to_string()),
            area_id: Set(model.area_id),
            created_at: Set(model.created_at),
        }
    }
}
