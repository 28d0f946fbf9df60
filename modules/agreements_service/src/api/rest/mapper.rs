//! Mapper implementations for converting between DTOs and contract models
//!
//! Responses convert infallibly. Requests carry enumerations as strings, so
//! their conversions fail with [`AgreementsError::Validation`] on unknown values.

use super::dto::*;
use crate::contract::{
    self, AgreementStatus, AgreementsError, ComplianceStatus, MobilityDirection, ParticipantKind,
    ProfileRole, ResponsibleKind, ResponsibleTarget,
};
use crate::domain::{
    ContraprestacionDraft, DashboardSummary, ExpiringAgreement, InstitutionDraft, ProfileUpdate,
    SeguimientoDraft, SkipReason, YearSync,
};

fn parse_field<T>(field: &str, raw: &str, parse: fn(&str) -> Option<T>) -> Result<T, AgreementsError> {
    parse(raw.trim())
        .ok_or_else(|| AgreementsError::validation(format!("invalid {}: {:?}", field, raw)))
}

// ===== Agreement conversions =====

impl From<contract::Agreement> for AgreementDto {
    fn from(agreement: contract::Agreement) -> Self {
        Self {
            id: agreement.id,
            name: agreement.name,
            institution_id: agreement.institution_id,
            signature_date: agreement.signature_date,
            duration_years: agreement.duration_years,
            expiration_date: agreement.expiration_date,
            country: agreement.country,
            agreement_types: agreement.agreement_types,
            objectives: agreement.objectives,
            status: agreement.status.as_str().to_string(),
            document_url: agreement.document_url,
            version: agreement.version,
            created_at: agreement.created_at,
            updated_at: agreement.updated_at,
            deleted_at: agreement.deleted_at,
        }
    }
}

impl From<contract::AgreementDetail> for AgreementDetailDto {
    fn from(detail: contract::AgreementDetail) -> Self {
        Self {
            agreement: detail.agreement.into(),
            responsibles: detail.responsibles.into_iter().map(Into::into).collect(),
            area_ids: detail.area_ids,
            subtypes: detail.subtypes.into_iter().map(Into::into).collect(),
            years: detail.years.into_iter().map(Into::into).collect(),
        }
    }
}

impl TryFrom<AgreementRequest> for contract::AgreementDraft {
    type Error = AgreementsError;

    fn try_from(req: AgreementRequest) -> Result<Self, Self::Error> {
        let status = match req.status.as_deref() {
            Some(raw) => parse_field("status", raw, AgreementStatus::parse)?,
            None => AgreementStatus::Draft,
        };
        let responsibles = req
            .responsibles
            .into_iter()
            .map(contract::ResponsibleAssignment::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: req.name,
            institution_id: req.institution_id,
            signature_date: req.signature_date,
            duration_years: req.duration_years,
            country: req.country,
            agreement_types: req.agreement_types,
            objectives: req.objectives,
            status,
            document_url: req.document_url,
            area_ids: req.area_ids,
            responsibles,
        })
    }
}

impl TryFrom<ListAgreementsQuery> for contract::AgreementFilter {
    type Error = AgreementsError;

    fn try_from(query: ListAgreementsQuery) -> Result<Self, Self::Error> {
        let status = query
            .status
            .as_deref()
            .map(|raw| parse_field("status", raw, AgreementStatus::parse))
            .transpose()?;
        Ok(Self {
            status,
            institution_id: query.institution_id,
            country: query.country,
            search: query.search,
            include_deleted: query.include_deleted,
        })
    }
}

impl TryFrom<ResponsibleAssignmentDto> for contract::ResponsibleAssignment {
    type Error = AgreementsError;

    fn try_from(dto: ResponsibleAssignmentDto) -> Result<Self, Self::Error> {
        Ok(Self {
            profile_id: dto.profile_id,
            kind: parse_field("kind", &dto.kind, ResponsibleKind::parse)?,
        })
    }
}

impl From<contract::ResponsibleLink> for ResponsibleDto {
    fn from(link: contract::ResponsibleLink) -> Self {
        let (agreement_id, subtype_id) = match link.target {
            ResponsibleTarget::Agreement(id) => (Some(id), None),
            ResponsibleTarget::Subtype(id) => (None, Some(id)),
        };
        Self {
            id: link.id,
            agreement_id,
            subtype_id,
            profile_id: link.profile_id,
            kind: link.kind.as_str().to_string(),
        }
    }
}

impl From<contract::AgreementSubtype> for SubtypeDto {
    fn from(subtype: contract::AgreementSubtype) -> Self {
        Self {
            id: subtype.id,
            agreement_id: subtype.agreement_id,
            name: subtype.name,
            description: subtype.description,
            created_at: subtype.created_at,
        }
    }
}

// ===== Year and renewal conversions =====

impl From<contract::AgreementYear> for YearDto {
    fn from(year: contract::AgreementYear) -> Self {
        Self {
            id: year.id,
            agreement_id: year.agreement_id,
            year_number: year.year_number,
            year_start: year.year_start,
            year_end: year.year_end,
        }
    }
}

impl From<YearSync> for YearSyncDto {
    fn from(sync: YearSync) -> Self {
        match sync {
            YearSync::Skipped(reason) => Self {
                outcome: "skipped".to_string(),
                reason: Some(
                    match reason {
                        SkipReason::MissingSignatureDate => "missing_signature_date",
                        SkipReason::NonPositiveDuration => "non_positive_duration",
                    }
                    .to_string(),
                ),
                inserted: 0,
                updated: 0,
                deleted: 0,
            },
            YearSync::Unchanged => Self {
                outcome: "unchanged".to_string(),
                reason: None,
                inserted: 0,
                updated: 0,
                deleted: 0,
            },
            YearSync::Applied {
                inserted,
                updated,
                deleted,
            } => Self {
                outcome: "applied".to_string(),
                reason: None,
                inserted,
                updated,
                deleted,
            },
        }
    }
}

impl From<contract::Renewal> for RenewalDto {
    fn from(renewal: contract::Renewal) -> Self {
        Self {
            id: renewal.id,
            agreement_id: renewal.agreement_id,
            old_expiration_date: renewal.old_expiration_date,
            new_expiration_date: renewal.new_expiration_date,
            changed_at: renewal.changed_at,
        }
    }
}

// ===== Catalog conversions =====

impl From<contract::Institution> for InstitutionDto {
    fn from(institution: contract::Institution) -> Self {
        Self {
            id: institution.id,
            name: institution.name,
            country: institution.country,
            website: institution.website,
            created_at: institution.created_at,
            updated_at: institution.updated_at,
        }
    }
}

impl From<InstitutionRequest> for InstitutionDraft {
    fn from(req: InstitutionRequest) -> Self {
        Self {
            name: req.name,
            country: req.country,
            website: req.website,
        }
    }
}

impl From<contract::Area> for AreaDto {
    fn from(area: contract::Area) -> Self {
        Self {
            id: area.id,
            name: area.name,
            description: area.description,
            created_at: area.created_at,
        }
    }
}

impl From<contract::Profile> for ProfileDto {
    fn from(profile: contract::Profile) -> Self {
        Self {
            id: profile.id,
            full_name: profile.full_name,
            email: profile.email,
            role: profile.role.as_str().to_string(),
            area_id: profile.area_id,
            created_at: profile.created_at,
        }
    }
}

impl TryFrom<UpdateProfileRequest> for ProfileUpdate {
    type Error = AgreementsError;

    fn try_from(req: UpdateProfileRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            full_name: req.full_name,
            role: parse_field("role", &req.role, ProfileRole::parse)?,
            area_id: req.area_id,
        })
    }
}

// ===== Compliance conversions =====

impl From<contract::Contraprestacion> for ContraprestacionDto {
    fn from(item: contract::Contraprestacion) -> Self {
        Self {
            id: item.id,
            agreement_id: item.agreement_id,
            kind: item.kind,
            description: item.description,
            units_per_year: item.units_per_year,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

impl From<ContraprestacionRequest> for ContraprestacionDraft {
    fn from(req: ContraprestacionRequest) -> Self {
        Self {
            kind: req.kind,
            description: req.description,
            units_per_year: req.units_per_year,
        }
    }
}

impl From<contract::Seguimiento> for SeguimientoDto {
    fn from(item: contract::Seguimiento) -> Self {
        Self {
            id: item.id,
            contraprestacion_id: item.contraprestacion_id,
            year_id: item.year_id,
            status: item.status.as_str().to_string(),
            evidence_url: item.evidence_url,
            notes: item.notes,
            recorded_at: item.recorded_at,
        }
    }
}

impl TryFrom<SeguimientoRequest> for SeguimientoDraft {
    type Error = AgreementsError;

    fn try_from(req: SeguimientoRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            year_id: req.year_id,
            status: parse_field("status", &req.status, ComplianceStatus::parse)?,
            evidence_url: req.evidence_url,
            notes: req.notes,
        })
    }
}

// ===== Mobility conversions =====

impl From<contract::MobilityRecord> for MobilityDto {
    fn from(record: contract::MobilityRecord) -> Self {
        Self {
            id: record.id,
            agreement_id: record.agreement_id,
            responsible_id: record.responsible_id,
            participant_name: record.participant_name,
            participant_kind: record.participant_kind.as_str().to_string(),
            direction: record.direction.as_str().to_string(),
            start_date: record.start_date,
            end_date: record.end_date,
            report_submitted: record.report_submitted,
            report_submitted_at: record.report_submitted_at,
            notes: record.notes,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl TryFrom<MobilityRequest> for contract::MobilityDraft {
    type Error = AgreementsError;

    fn try_from(req: MobilityRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            agreement_id: req.agreement_id,
            responsible_id: req.responsible_id,
            participant_name: req.participant_name,
            participant_kind: parse_field(
                "participant_kind",
                &req.participant_kind,
                ParticipantKind::parse,
            )?,
            direction: parse_field("direction", &req.direction, MobilityDirection::parse)?,
            start_date: req.start_date,
            end_date: req.end_date,
            notes: req.notes,
        })
    }
}

// ===== Reporting conversions =====

impl From<contract::SemiannualReport> for ReportDto {
    fn from(report: contract::SemiannualReport) -> Self {
        Self {
            id: report.id,
            agreement_id: report.agreement_id,
            year: report.year,
            semester: report.semester,
            summary: report.summary,
            author_id: report.author_id,
            created_at: report.created_at,
        }
    }
}

impl From<ExpiringAgreement> for ExpiringAgreementDto {
    fn from(item: ExpiringAgreement) -> Self {
        Self {
            agreement_id: item.agreement_id,
            name: item.name,
            expiration_date: item.expiration_date,
            days_left: item.days_left,
        }
    }
}

impl From<DashboardSummary> for DashboardDto {
    fn from(summary: DashboardSummary) -> Self {
        Self {
            total_agreements: summary.total_agreements,
            agreements_by_status: summary.agreements_by_status,
            agreements_by_country: summary.agreements_by_country,
            agreements_by_type: summary.agreements_by_type,
            expiring_soon: summary.expiring_soon.into_iter().map(Into::into).collect(),
            mobility_by_kind: summary.mobility_by_kind,
            mobility_by_direction: summary.mobility_by_direction,
            pending_mobility_reports: summary.pending_mobility_reports,
            seguimientos_by_status: summary.seguimientos_by_status,
        }
    }
}
