//! Route registration and OpenAPI component document

use super::{dto::*, error::Problem, functions, handlers};
use crate::domain::{Service, UserAdministration};
use axum::{
    routing::{any, get, post, put},
    Extension, Json, Router,
};
use std::sync::Arc;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "Convenios API", description = "Cooperation agreements management"),
    components(schemas(
        Problem,
        AgreementDto,
        AgreementDetailDto,
        AgreementRequest,
        ResponsibleAssignmentDto,
        ResponsibleDto,
        SetResponsiblesRequest,
        SubtypeDto,
        CreateSubtypeRequest,
        YearDto,
        YearSyncDto,
        RenewalDto,
        RenewAgreementRequest,
        InstitutionDto,
        InstitutionRequest,
        AreaDto,
        AreaRequest,
        ProfileDto,
        UpdateProfileRequest,
        ContraprestacionDto,
        ContraprestacionRequest,
        SeguimientoDto,
        SeguimientoRequest,
        MobilityDto,
        MobilityRequest,
        ReportDto,
        CreateReportRequest,
        ExpiringAgreementDto,
        DashboardDto,
        CreateUserRequest,
        DeleteUserRequest,
    ))
)]
pub struct ApiDoc;

async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Register all REST routes
pub fn register_routes(
    router: Router,
    service: Arc<Service>,
    admin: Arc<UserAdministration>,
) -> Router {
    router
        // Agreements
        .route(
            "/agreements",
            get(handlers::list_agreements).post(handlers::create_agreement),
        )
        .route(
            "/agreements/{id}",
            get(handlers::get_agreement)
                .put(handlers::update_agreement)
                .delete(handlers::delete_agreement),
        )
        .route(
            "/agreements/{id}/responsibles",
            put(handlers::set_agreement_responsibles),
        )
        .route("/agreements/{id}/years", get(handlers::list_years))
        .route("/agreements/{id}/years/generate", post(handlers::generate_years))
        .route(
            "/agreements/{id}/years/recalculate",
            post(handlers::recalculate_years),
        )
        .route(
            "/agreements/{id}/renewals",
            get(handlers::list_renewals).post(handlers::renew_agreement),
        )
        .route(
            "/agreements/{id}/subtypes",
            get(handlers::list_subtypes).post(handlers::create_subtype),
        )
        .route(
            "/agreements/{id}/contraprestaciones",
            get(handlers::list_contraprestaciones).post(handlers::create_contraprestacion),
        )
        .route(
            "/agreements/{id}/reports",
            get(handlers::list_reports).post(handlers::create_report),
        )
        // Subtypes
        .route("/subtypes/{id}", axum::routing::delete(handlers::delete_subtype))
        .route(
            "/subtypes/{id}/responsibles",
            get(handlers::list_subtype_responsibles).put(handlers::set_subtype_responsibles),
        )
        // Compliance
        .route(
            "/contraprestaciones/{id}",
            get(handlers::get_contraprestacion)
                .put(handlers::update_contraprestacion)
                .delete(handlers::delete_contraprestacion),
        )
        .route(
            "/contraprestaciones/{id}/seguimientos",
            get(handlers::list_seguimientos).post(handlers::record_seguimiento),
        )
        .route(
            "/seguimientos/{id}",
            get(handlers::get_seguimiento)
                .put(handlers::update_seguimiento)
                .delete(handlers::delete_seguimiento),
        )
        // Mobility
        .route(
            "/mobility",
            get(handlers::list_mobility).post(handlers::create_mobility),
        )
        .route(
            "/mobility/{id}",
            get(handlers::get_mobility)
                .put(handlers::update_mobility)
                .delete(handlers::delete_mobility),
        )
        .route("/mobility/{id}/report", post(handlers::submit_mobility_report))
        // Reporting
        .route("/reports/{id}", axum::routing::delete(handlers::delete_report))
        .route("/dashboard", get(handlers::dashboard))
        // Catalog
        .route(
            "/institutions",
            get(handlers::list_institutions).post(handlers::create_institution),
        )
        .route(
            "/institutions/{id}",
            get(handlers::get_institution)
                .put(handlers::update_institution)
                .delete(handlers::delete_institution),
        )
        .route("/areas", get(handlers::list_areas).post(handlers::create_area))
        .route(
            "/areas/{id}",
            get(handlers::get_area)
                .put(handlers::update_area)
                .delete(handlers::delete_area),
        )
        .route("/profiles", get(handlers::list_profiles))
        .route(
            "/profiles/{id}",
            get(handlers::get_profile).put(handlers::update_profile),
        )
        // User administration; any() so other methods reach the handler's 405
        .route("/functions/create-user", any(functions::create_user))
        .route("/functions/delete-user", any(functions::delete_user))
        .route("/openapi.json", get(openapi_handler))
        .layer(Extension(service))
        .layer(Extension(admin))
}
