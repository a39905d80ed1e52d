use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{param::Query, payload::Json, OpenApi, Tags};

use crate::{
    core::{
        points::{calculate_points, rate_for, WeightUnit},
        security::{get_user_from_token, BearerAuthorization},
        validation::normalize_time,
    },
    repository::{
        profile::add_points,
        waste_log::{create_waste_log, get_waste_logs, NewWasteLog},
    },
    schema::{
        common::{BadRequestResponse, InternalServerErrorResponse, UnauthorizedResponse},
        waste_log::{
            PointsPreviewResponse, PointsPreviewResponses, WasteLogCreateRequest,
            WasteLogCreateResponse, WasteLogCreateResponses, WasteLogListResponses,
            WasteLogResponse,
        },
    },
    AppState,
};

#[derive(Tags)]
enum ApiWasteLogTags {
    WasteLog,
}

pub struct ApiWasteLog;

#[OpenApi]
impl ApiWasteLog {
    #[oai(path = "/waste-log/", method = "get", tag = "ApiWasteLogTags::WasteLog")]
    async fn waste_log_list_api(
        &self,
        Query(limit): Query<Option<u32>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> WasteLogListResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return WasteLogListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.waste_log",
                        "waste_log_list_api",
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
                return WasteLogListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.waste_log",
                        "waste_log_list_api",
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
                return WasteLogListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.waste_log",
                        "waste_log_list_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return WasteLogListResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        match get_waste_logs(&mut tx, &user.id, limit).await {
            Ok(val) => WasteLogListResponses::Ok(Json(
                val.into_iter().map(WasteLogResponse::from).collect(),
            )),
            Err(err) => WasteLogListResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.waste_log",
                    "waste_log_list_api",
                    "get_waste_logs",
                    &err.to_string(),
                ),
            )),
        }
    }

    /// Stores the log and credits its points to the caller's profile.
    #[oai(path = "/waste-log/", method = "post", tag = "ApiWasteLogTags::WasteLog")]
    async fn waste_log_create_api(
        &self,
        Json(json): Json<WasteLogCreateRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> WasteLogCreateResponses {
        let waste_type = json.waste_type.trim().to_lowercase();
        if waste_type.is_empty() {
            return WasteLogCreateResponses::BadRequest(Json(BadRequestResponse::new(
                "Waste type is required",
            )));
        }
        let amount_kg = json.unit.unwrap_or_default().to_kg(json.amount);
        let points = match calculate_points(&waste_type, amount_kg) {
            Ok(val) => val,
            Err(message) => {
                return WasteLogCreateResponses::BadRequest(Json(BadRequestResponse { message }))
            }
        };
        let collection_time = match json.collection_time.as_deref().map(normalize_time) {
            Some(Err(message)) => {
                return WasteLogCreateResponses::BadRequest(Json(BadRequestResponse { message }))
            }
            Some(Ok(val)) => Some(val),
            None => None,
        };

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return WasteLogCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.waste_log",
                        "waste_log_create_api",
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
                return WasteLogCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.waste_log",
                        "waste_log_create_api",
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
                return WasteLogCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.waste_log",
                        "waste_log_create_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return WasteLogCreateResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        let new_log = NewWasteLog {
            user_id: user.id,
            waste_type,
            amount: amount_kg,
            points_earned: points,
            notes: json.notes,
            photo_url: json.photo_url,
            collection_date: json.collection_date,
            collection_time,
        };
        let waste_log = match create_waste_log(&mut tx, new_log, None).await {
            Ok(val) => val,
            Err(err) => {
                return WasteLogCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.waste_log",
                        "waste_log_create_api",
                        "create_waste_log",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let profile = match add_points(&mut tx, &user.id, points, None).await {
            Ok(Some(val)) => val,
            Ok(None) => {
                return WasteLogCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.waste_log",
                        "waste_log_create_api",
                        "add_points",
                        "profile not found",
                    ),
                ))
            }
            Err(err) => {
                return WasteLogCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.waste_log",
                        "waste_log_create_api",
                        "add_points",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if let Err(err) = tx.commit().await {
            return WasteLogCreateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.waste_log",
                    "waste_log_create_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        state.profile_feed.publish(&profile);
        tracing::info!(
            "user {} logged {:.2} kg of {}, earned {} points",
            user.id,
            waste_log.amount,
            waste_log.waste_type,
            points
        );

        WasteLogCreateResponses::Created(Json(WasteLogCreateResponse {
            waste_log: WasteLogResponse::from(waste_log),
            total_points: profile.total_points,
        }))
    }

    #[oai(
        path = "/waste-log/points",
        method = "get",
        tag = "ApiWasteLogTags::WasteLog"
    )]
    async fn waste_log_points_api(
        &self,
        Query(waste_type): Query<String>,
        Query(amount): Query<f64>,
        Query(unit): Query<Option<WeightUnit>>,
    ) -> PointsPreviewResponses {
        let amount_kg = unit.unwrap_or_default().to_kg(amount);
        match calculate_points(&waste_type, amount_kg) {
            Ok(points) => PointsPreviewResponses::Ok(Json(PointsPreviewResponse {
                rate: rate_for(&waste_type),
                waste_type,
                amount_kg,
                points,
            })),
            Err(message) => PointsPreviewResponses::BadRequest(Json(BadRequestResponse { message })),
        }
    }
}
