use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query};
use axum::{Extension, Json};
use http::StatusCode;
use medrx_errors::{ApiResult, Problem};
use medrx_security::{Identity, SecurityContext};
use tracing::field::Empty;
use utoipa::OpenApi;

use crate::api::rest::dto::{
    ApiResponse, CreatePrescriptionReq, DailyCountDto, EditPrescriptionReq, InteractionsEnvelope,
    ListQuery, PrescriptionDto, PrescriptionEnvelope, PrescriptionPageDto, PrivilegeDto, RoleDto,
    privileges_to_dto,
};
use crate::api::rest::error::{ProblemContext, domain_error_to_problem};
use crate::api::rest::openapi::ApiDoc;
use crate::domain::catalog::AccessCatalog;
use crate::domain::error::DomainError;
use crate::domain::model::{NewPrescription, PrescriptionEdit};
use crate::module::ConcreteService;

fn subject(ctx: &SecurityContext) -> &str {
    ctx.identity().map_or("anonymous", Identity::subject)
}

fn problem(pc: &ProblemContext) -> impl Fn(DomainError) -> Problem + '_ {
    move |e| domain_error_to_problem(&e, pc)
}

fn rejected(pc: &ProblemContext, detail: String) -> Problem {
    pc.decorate(Problem::bad_request(detail))
}

/// List prescriptions, optionally restricted to a date range
#[utoipa::path(
    get,
    path = "/prescription",
    tag = "prescriptions",
    params(ListQuery),
    responses(
        (status = 200, body = PrescriptionPageDto),
        (status = 400, body = Problem, content_type = "application/problem+json"),
        (status = 401, body = Problem, content_type = "application/problem+json"),
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip_all, fields(request_id = Empty, user.subject = %subject(&ctx)))]
pub(crate) async fn list_prescriptions(
    Extension(ctx): Extension<SecurityContext>,
    Extension(svc): Extension<Arc<ConcreteService>>,
    pc: ProblemContext,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<PrescriptionPageDto>> {
    let Query(query) = query.map_err(|e| rejected(&pc, e.body_text()))?;
    let (page, range) = query.to_domain().map_err(problem(&pc))?;

    let found = svc.list(page, range).await.map_err(problem(&pc))?;
    Ok(Json(found.into()))
}

/// Fetch a single prescription
#[utoipa::path(
    get,
    path = "/prescription/{id}",
    tag = "prescriptions",
    params(("id" = i64, Path, description = "Prescription id")),
    responses(
        (status = 200, body = PrescriptionEnvelope),
        (status = 404, body = Problem, content_type = "application/problem+json"),
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip(ctx, svc, pc, id), fields(request_id = Empty, user.subject = %subject(&ctx)))]
pub(crate) async fn get_prescription(
    Extension(ctx): Extension<SecurityContext>,
    Extension(svc): Extension<Arc<ConcreteService>>,
    pc: ProblemContext,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<PrescriptionEnvelope>> {
    let Path(id) = id.map_err(|e| rejected(&pc, e.body_text()))?;
    let found = svc.get(id).await.map_err(problem(&pc))?;
    Ok(Json(PrescriptionEnvelope {
        status: StatusCode::OK.as_u16(),
        message: "Prescription Found".to_owned(),
        data: PrescriptionDto::from(found),
    }))
}

/// Create a prescription
#[utoipa::path(
    post,
    path = "/prescriptions",
    tag = "prescriptions",
    request_body = CreatePrescriptionReq,
    responses(
        (status = 201, body = ApiResponse),
        (status = 400, body = Problem, content_type = "application/problem+json"),
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip_all, fields(request_id = Empty, user.subject = %subject(&ctx)))]
pub(crate) async fn create_prescription(
    Extension(ctx): Extension<SecurityContext>,
    Extension(svc): Extension<Arc<ConcreteService>>,
    pc: ProblemContext,
    payload: Result<Json<CreatePrescriptionReq>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ApiResponse>)> {
    let Json(req) = payload.map_err(|e| rejected(&pc, e.body_text()))?;
    let new = NewPrescription::try_from(req).map_err(problem(&pc))?;

    svc.create(new).await.map_err(problem(&pc))?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StatusCode::CREATED, "Prescription Created")),
    ))
}

/// Replace the editable fields of a prescription
#[utoipa::path(
    patch,
    path = "/prescriptions/{id}",
    tag = "prescriptions",
    params(("id" = i64, Path, description = "Prescription id")),
    request_body = EditPrescriptionReq,
    responses(
        (status = 200, body = ApiResponse),
        (status = 400, body = Problem, content_type = "application/problem+json"),
        (status = 404, body = Problem, content_type = "application/problem+json"),
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip(ctx, svc, pc, id, payload), fields(request_id = Empty, user.subject = %subject(&ctx)))]
pub(crate) async fn update_prescription(
    Extension(ctx): Extension<SecurityContext>,
    Extension(svc): Extension<Arc<ConcreteService>>,
    pc: ProblemContext,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<EditPrescriptionReq>, JsonRejection>,
) -> ApiResult<Json<ApiResponse>> {
    let Path(id) = id.map_err(|e| rejected(&pc, e.body_text()))?;
    let Json(req) = payload.map_err(|e| rejected(&pc, e.body_text()))?;
    let edit = PrescriptionEdit::try_from(req).map_err(problem(&pc))?;

    svc.update(id, edit).await.map_err(problem(&pc))?;
    Ok(Json(ApiResponse::new(StatusCode::OK, "Prescription Updated")))
}

/// Delete a prescription
#[utoipa::path(
    delete,
    path = "/prescriptions/{id}",
    tag = "prescriptions",
    params(("id" = i64, Path, description = "Prescription id")),
    responses(
        (status = 200, body = ApiResponse),
        (status = 404, body = Problem, content_type = "application/problem+json"),
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip(ctx, svc, pc, id), fields(request_id = Empty, user.subject = %subject(&ctx)))]
pub(crate) async fn delete_prescription(
    Extension(ctx): Extension<SecurityContext>,
    Extension(svc): Extension<Arc<ConcreteService>>,
    pc: ProblemContext,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<ApiResponse>> {
    let Path(id) = id.map_err(|e| rejected(&pc, e.body_text()))?;
    svc.delete(id).await.map_err(problem(&pc))?;
    Ok(Json(ApiResponse::new(StatusCode::OK, "Prescription Deleted")))
}

/// Day-wise prescription counts
#[utoipa::path(
    get,
    path = "/report",
    tag = "prescriptions",
    responses((status = 200, body = [DailyCountDto])),
    security(("bearer" = []))
)]
#[tracing::instrument(skip_all, fields(request_id = Empty, user.subject = %subject(&ctx)))]
pub(crate) async fn daily_report(
    Extension(ctx): Extension<SecurityContext>,
    Extension(svc): Extension<Arc<ConcreteService>>,
    pc: ProblemContext,
) -> ApiResult<Json<Vec<DailyCountDto>>> {
    let counts = svc.daily_report().await.map_err(problem(&pc))?;
    Ok(Json(counts.into_iter().map(Into::into).collect()))
}

/// Drug-interaction data from the external service
#[utoipa::path(
    get,
    path = "/posts",
    tag = "interactions",
    responses(
        (status = 200, body = InteractionsEnvelope),
        (status = 502, body = Problem, content_type = "application/problem+json"),
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip_all, fields(request_id = Empty, user.subject = %subject(&ctx)))]
pub(crate) async fn drug_interactions(
    Extension(ctx): Extension<SecurityContext>,
    Extension(svc): Extension<Arc<ConcreteService>>,
    pc: ProblemContext,
) -> ApiResult<Json<InteractionsEnvelope>> {
    let data = svc.drug_interactions().await.map_err(problem(&pc))?;
    Ok(Json(InteractionsEnvelope {
        status: StatusCode::OK.as_u16(),
        message: "Success".to_owned(),
        data,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/welcome",
    tag = "public",
    responses((status = 200, body = ApiResponse))
)]
pub(crate) async fn welcome() -> Json<ApiResponse> {
    Json(ApiResponse::new(StatusCode::OK, "Welcome to medrx"))
}

#[utoipa::path(
    get,
    path = "/api/v1/roles",
    tag = "public",
    responses((status = 200, body = [RoleDto]))
)]
pub(crate) async fn list_roles(
    Extension(catalog): Extension<Arc<AccessCatalog>>,
) -> Json<Vec<RoleDto>> {
    Json(catalog.roles().iter().map(RoleDto::from).collect())
}

#[utoipa::path(
    get,
    path = "/api/v1/permission",
    tag = "public",
    responses((status = 200, body = [String]))
)]
pub(crate) async fn list_permissions(
    Extension(catalog): Extension<Arc<AccessCatalog>>,
) -> Json<Vec<String>> {
    Json(catalog.permissions().into_iter().map(str::to_owned).collect())
}

/// Permissions with the roles that grant them
#[utoipa::path(
    get,
    path = "/api/v1/privileges",
    tag = "public",
    responses((status = 200, body = [PrivilegeDto]))
)]
pub(crate) async fn list_privileges(
    Extension(catalog): Extension<Arc<AccessCatalog>>,
) -> Json<Vec<PrivilegeDto>> {
    Json(privileges_to_dto(catalog.privileges()))
}

pub(crate) async fn api_docs() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
