use medrx_errors::Problem;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::rest::dto::{
    ApiResponse, CreatePrescriptionReq, DailyCountDto, EditPrescriptionReq, InteractionsEnvelope,
    PrescriptionDto, PrescriptionEnvelope, PrescriptionPageDto, PrivilegeDto, RoleDto,
};
use crate::api::rest::handlers;

#[derive(OpenApi)]
#[openapi(
    info(title = "medrx", description = "Prescription records API"),
    paths(
        handlers::list_prescriptions,
        handlers::get_prescription,
        handlers::create_prescription,
        handlers::update_prescription,
        handlers::delete_prescription,
        handlers::daily_report,
        handlers::drug_interactions,
        handlers::welcome,
        handlers::list_roles,
        handlers::list_permissions,
        handlers::list_privileges,
    ),
    components(schemas(
        ApiResponse,
        CreatePrescriptionReq,
        DailyCountDto,
        EditPrescriptionReq,
        InteractionsEnvelope,
        PrescriptionDto,
        PrescriptionEnvelope,
        PrescriptionPageDto,
        PrivilegeDto,
        Problem,
        RoleDto,
    )),
    modifiers(&BearerAuth)
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
