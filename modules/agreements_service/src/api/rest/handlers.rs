//! HTTP request handlers - thin layer that delegates to domain service

use super::{dto::*, error::Problem};
use crate::contract::{AgreementDraft, AgreementFilter, MobilityDraft, ResponsibleAssignment};
use crate::domain::{ProfileUpdate, SeguimientoDraft, Service};
use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

type Svc = Extension<Arc<Service>>;

fn assignments(
    dtos: Vec<ResponsibleAssignmentDto>,
) -> Result<Vec<ResponsibleAssignment>, Problem> {
    dtos.into_iter()
        .map(ResponsibleAssignment::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(Problem::from)
}

// ===== Agreement Handlers =====

/// List agreements with optional filters
pub async fn list_agreements(
    Extension(service): Svc,
    Query(query): Query<ListAgreementsQuery>,
) -> Result<Json<ListResponse<AgreementDto>>, Problem> {
    let filter = AgreementFilter::try_from(query)?;
    let agreements = service.list_agreements(&filter).await?;
    Ok(Json(ListResponse::from_models(agreements)))
}

pub async fn create_agreement(
    Extension(service): Svc,
    Json(req): Json<AgreementRequest>,
) -> Result<(StatusCode, Json<AgreementDetailDto>), Problem> {
    let draft = AgreementDraft::try_from(req)?;
    let detail = service.create_agreement(draft).await?;
    Ok((StatusCode::CREATED, Json(detail.into())))
}

pub async fn get_agreement(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
) -> Result<Json<AgreementDetailDto>, Problem> {
    let detail = service.get_agreement(id).await?;
    Ok(Json(detail.into()))
}

pub async fn update_agreement(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
    Json(req): Json<AgreementRequest>,
) -> Result<Json<AgreementDetailDto>, Problem> {
    let draft = AgreementDraft::try_from(req)?;
    let detail = service.update_agreement(id, draft).await?;
    Ok(Json(detail.into()))
}

pub async fn delete_agreement(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, Problem> {
    service.delete_agreement(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_agreement_responsibles(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
    Json(req): Json<SetResponsiblesRequest>,
) -> Result<Json<ListResponse<ResponsibleDto>>, Problem> {
    let links = service
        .set_agreement_responsibles(id, assignments(req.responsibles)?)
        .await?;
    Ok(Json(ListResponse::from_models(links)))
}

// ===== Year Handlers =====

pub async fn list_years(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
) -> Result<Json<ListResponse<YearDto>>, Problem> {
    let years = service.list_years(id).await?;
    Ok(Json(ListResponse::from_models(years)))
}

/// Generate years only if the agreement has none
pub async fn generate_years(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
) -> Result<Json<YearSyncDto>, Problem> {
    let outcome = service.generate_years_if_needed(id).await?;
    Ok(Json(outcome.into()))
}

/// Reconcile stored years with the current dates
pub async fn recalculate_years(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
) -> Result<Json<YearSyncDto>, Problem> {
    let outcome = service.recalculate_agreement_years(id).await?;
    Ok(Json(outcome.into()))
}

// ===== Renewal Handlers =====

pub async fn renew_agreement(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
    Json(req): Json<RenewAgreementRequest>,
) -> Result<(StatusCode, Json<RenewalDto>), Problem> {
    let renewal = service.renew_agreement(id, req.new_expiration_date).await?;
    Ok((StatusCode::CREATED, Json(renewal.into())))
}

pub async fn list_renewals(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
) -> Result<Json<ListResponse<RenewalDto>>, Problem> {
    let renewals = service.list_renewals(id).await?;
    Ok(Json(ListResponse::from_models(renewals)))
}

// ===== Subtype Handlers =====

pub async fn list_subtypes(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
) -> Result<Json<ListResponse<SubtypeDto>>, Problem> {
    let subtypes = service.list_subtypes(id).await?;
    Ok(Json(ListResponse::from_models(subtypes)))
}

pub async fn create_subtype(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateSubtypeRequest>,
) -> Result<(StatusCode, Json<SubtypeDto>), Problem> {
    let subtype = service.create_subtype(id, req.name, req.description).await?;
    Ok((StatusCode::CREATED, Json(subtype.into())))
}

pub async fn delete_subtype(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, Problem> {
    service.delete_subtype(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_subtype_responsibles(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
) -> Result<Json<ListResponse<ResponsibleDto>>, Problem> {
    let links = service.list_subtype_responsibles(id).await?;
    Ok(Json(ListResponse::from_models(links)))
}

pub async fn set_subtype_responsibles(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
    Json(req): Json<SetResponsiblesRequest>,
) -> Result<Json<ListResponse<ResponsibleDto>>, Problem> {
    let links = service
        .set_subtype_responsibles(id, assignments(req.responsibles)?)
        .await?;
    Ok(Json(ListResponse::from_models(links)))
}

// ===== Catalog Handlers =====

pub async fn list_institutions(
    Extension(service): Svc,
) -> Result<Json<ListResponse<InstitutionDto>>, Problem> {
    let institutions = service.list_institutions().await?;
    Ok(Json(ListResponse::from_models(institutions)))
}

pub async fn create_institution(
    Extension(service): Svc,
    Json(req): Json<InstitutionRequest>,
) -> Result<(StatusCode, Json<InstitutionDto>), Problem> {
    let institution = service.create_institution(req.into()).await?;
    Ok((StatusCode::CREATED, Json(institution.into())))
}

pub async fn get_institution(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
) -> Result<Json<InstitutionDto>, Problem> {
    Ok(Json(service.get_institution(id).await?.into()))
}

pub async fn update_institution(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
    Json(req): Json<InstitutionRequest>,
) -> Result<Json<InstitutionDto>, Problem> {
    Ok(Json(service.update_institution(id, req.into()).await?.into()))
}

pub async fn delete_institution(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, Problem> {
    service.delete_institution(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_areas(Extension(service): Svc) -> Result<Json<ListResponse<AreaDto>>, Problem> {
    let areas = service.list_areas().await?;
    Ok(Json(ListResponse::from_models(areas)))
}

pub async fn create_area(
    Extension(service): Svc,
    Json(req): Json<AreaRequest>,
) -> Result<(StatusCode, Json<AreaDto>), Problem> {
    let area = service.create_area(req.name, req.description).await?;
    Ok((StatusCode::CREATED, Json(area.into())))
}

pub async fn get_area(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
) -> Result<Json<AreaDto>, Problem> {
    Ok(Json(service.get_area(id).await?.into()))
}

pub async fn update_area(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
    Json(req): Json<AreaRequest>,
) -> Result<Json<AreaDto>, Problem> {
    Ok(Json(
        service
            .update_area(id, req.name, req.description)
            .await?
            .into(),
    ))
}

pub async fn delete_area(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, Problem> {
    service.delete_area(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_profiles(
    Extension(service): Svc,
) -> Result<Json<ListResponse<ProfileDto>>, Problem> {
    let profiles = service.list_profiles().await?;
    Ok(Json(ListResponse::from_models(profiles)))
}

pub async fn get_profile(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
) -> Result<Json<ProfileDto>, Problem> {
    Ok(Json(service.get_profile(id).await?.into()))
}

pub async fn update_profile(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileDto>, Problem> {
    let update = ProfileUpdate::try_from(req)?;
    Ok(Json(service.update_profile(id, update).await?.into()))
}

// ===== Compliance Handlers =====

pub async fn list_contraprestaciones(
    Extension(service): Svc,
    Path(agreement_id): Path<Uuid>,
) -> Result<Json<ListResponse<ContraprestacionDto>>, Problem> {
    let items = service.list_contraprestaciones(agreement_id).await?;
    Ok(Json(ListResponse::from_models(items)))
}

pub async fn create_contraprestacion(
    Extension(service): Svc,
    Path(agreement_id): Path<Uuid>,
    Json(req): Json<ContraprestacionRequest>,
) -> Result<(StatusCode, Json<ContraprestacionDto>), Problem> {
    let item = service
        .create_contraprestacion(agreement_id, req.into())
        .await?;
    Ok((StatusCode::CREATED, Json(item.into())))
}

pub async fn get_contraprestacion(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
) -> Result<Json<ContraprestacionDto>, Problem> {
    Ok(Json(service.get_contraprestacion(id).await?.into()))
}

pub async fn update_contraprestacion(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
    Json(req): Json<ContraprestacionRequest>,
) -> Result<Json<ContraprestacionDto>, Problem> {
    Ok(Json(
        service
            .update_contraprestacion(id, req.into())
            .await?
            .into(),
    ))
}

pub async fn delete_contraprestacion(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, Problem> {
    service.delete_contraprestacion(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_seguimientos(
    Extension(service): Svc,
    Path(contraprestacion_id): Path<Uuid>,
) -> Result<Json<ListResponse<SeguimientoDto>>, Problem> {
    let items = service.list_seguimientos(contraprestacion_id).await?;
    Ok(Json(ListResponse::from_models(items)))
}

pub async fn record_seguimiento(
    Extension(service): Svc,
    Path(contraprestacion_id): Path<Uuid>,
    Json(req): Json<SeguimientoRequest>,
) -> Result<(StatusCode, Json<SeguimientoDto>), Problem> {
    let draft = SeguimientoDraft::try_from(req)?;
    let item = service
        .record_seguimiento(contraprestacion_id, draft)
        .await?;
    Ok((StatusCode::CREATED, Json(item.into())))
}

pub async fn get_seguimiento(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
) -> Result<Json<SeguimientoDto>, Problem> {
    Ok(Json(service.get_seguimiento(id).await?.into()))
}

pub async fn update_seguimiento(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
    Json(req): Json<SeguimientoRequest>,
) -> Result<Json<SeguimientoDto>, Problem> {
    let draft = SeguimientoDraft::try_from(req)?;
    Ok(Json(service.update_seguimiento(id, draft).await?.into()))
}

pub async fn delete_seguimiento(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, Problem> {
    service.delete_seguimiento(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ===== Mobility Handlers =====

pub async fn list_mobility(
    Extension(service): Svc,
    Query(query): Query<ListMobilityQuery>,
) -> Result<Json<ListResponse<MobilityDto>>, Problem> {
    let records = service.list_mobility(query.agreement_id).await?;
    Ok(Json(ListResponse::from_models(records)))
}

pub async fn create_mobility(
    Extension(service): Svc,
    Json(req): Json<MobilityRequest>,
) -> Result<(StatusCode, Json<MobilityDto>), Problem> {
    let draft = MobilityDraft::try_from(req)?;
    let record = service.create_mobility(draft).await?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

pub async fn get_mobility(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
) -> Result<Json<MobilityDto>, Problem> {
    Ok(Json(service.get_mobility(id).await?.into()))
}

pub async fn update_mobility(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
    Json(req): Json<MobilityRequest>,
) -> Result<Json<MobilityDto>, Problem> {
    let draft = MobilityDraft::try_from(req)?;
    Ok(Json(service.update_mobility(id, draft).await?.into()))
}

/// Submit the mobility report; the record is frozen afterwards
pub async fn submit_mobility_report(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
) -> Result<Json<MobilityDto>, Problem> {
    Ok(Json(service.submit_mobility_report(id).await?.into()))
}

pub async fn delete_mobility(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, Problem> {
    service.delete_mobility(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ===== Reporting Handlers =====

pub async fn list_reports(
    Extension(service): Svc,
    Path(agreement_id): Path<Uuid>,
) -> Result<Json<ListResponse<ReportDto>>, Problem> {
    let reports = service.list_reports(agreement_id).await?;
    Ok(Json(ListResponse::from_models(reports)))
}

pub async fn create_report(
    Extension(service): Svc,
    Path(agreement_id): Path<Uuid>,
    Json(req): Json<CreateReportRequest>,
) -> Result<(StatusCode, Json<ReportDto>), Problem> {
    let report = service
        .create_report(agreement_id, req.year, req.semester, req.summary, req.author_id)
        .await?;
    Ok((StatusCode::CREATED, Json(report.into())))
}

pub async fn delete_report(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, Problem> {
    service.delete_report(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn dashboard(
    Extension(service): Svc,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardDto>, Problem> {
    let today = query.today.unwrap_or_else(|| Utc::now().date_naive());
    Ok(Json(service.dashboard(today).await?.into()))
}
