use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{param::Query, payload::Json, OpenApi, Tags};
use uuid::Uuid;

use crate::{
    core::security::{get_user_from_token, BearerAuthorization},
    repository::staff::get_staff,
    schema::{
        common::{ForbiddenResponse, InternalServerErrorResponse, UnauthorizedResponse},
        staff::{StaffListResponses, StaffResponse},
    },
    AppState,
};

#[derive(Tags)]
enum ApiStaffTags {
    Staff,
}

pub struct ApiStaff;

#[OpenApi]
impl ApiStaff {
    /// Active collection staff, optionally limited to one service area. Admin only.
    #[oai(path = "/staff/", method = "get", tag = "ApiStaffTags::Staff")]
    async fn staff_list_api(
        &self,
        Query(service_area_id): Query<Option<Uuid>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> StaffListResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return StaffListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.staff",
                        "staff_list_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return StaffListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.staff",
                        "staff_list_api",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate user token
        let jwt_token = auth.0.token;
        let user = match get_user_from_token(&mut tx, &mut redis_conn, jwt_token.clone()).await {
            Ok(val) => val,
            Err(err) => {
                return StaffListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.staff",
                        "staff_list_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return StaffListResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };
        if !user.is_admin() {
            return StaffListResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        match get_staff(&mut tx, service_area_id).await {
            Ok(val) => {
                StaffListResponses::Ok(Json(val.into_iter().map(StaffResponse::from).collect()))
            }
            Err(err) => StaffListResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.staff",
                    "staff_list_api",
                    "get_staff",
                    &err.to_string(),
                ),
            )),
        }
    }
}
