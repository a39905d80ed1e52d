use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{param::Path, payload::Json, OpenApi, Tags};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::{
        pickup::{classify_pickups, PickupStatus},
        security::{get_user_from_token, BearerAuthorization},
        utils::{date_to_string, today},
        validation::validate_pickup,
    },
    model::pickup::Pickup,
    repository::{
        notification::create_notification,
        pickup::{create_pickup, get_pickup_by_id, get_pickups, update_pickup_status, NewPickup},
        staff::get_staff_by_id,
    },
    schema::{
        common::{
            BadRequestResponse, ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
            UnauthorizedResponse,
        },
        pickup::{
            PickupCreateRequest, PickupCreateResponses, PickupDetailResponses,
            PickupListResponse, PickupListResponses, PickupResponse, PickupStatusUpdateRequest,
            PickupStatusUpdateResponses,
        },
    },
    AppState,
};

#[derive(Tags)]
enum ApiPickupTags {
    Pickup,
}

pub struct ApiPickup;

/// Moves the pickup to `status` and notifies its owner.
async fn change_pickup_status(
    tx: &mut Transaction<'_, Postgres>,
    pickup: &mut Pickup,
    status: PickupStatus,
    staff_id: Option<Uuid>,
) -> anyhow::Result<()> {
    update_pickup_status(tx, pickup, status, staff_id, None).await?;
    let message = format!(
        "Your pickup on {} is now {}",
        date_to_string(pickup.pickup_date),
        status
    );
    create_notification(tx, &pickup.user_id, message, None).await?;
    Ok(())
}

#[OpenApi]
impl ApiPickup {
    #[oai(path = "/pickup/", method = "get", tag = "ApiPickupTags::Pickup")]
    async fn pickup_list_api(
        &self,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> PickupListResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return PickupListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.pickup",
                        "pickup_list_api",
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
                return PickupListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.pickup",
                        "pickup_list_api",
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
                return PickupListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.pickup",
                        "pickup_list_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return PickupListResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        let pickups = match get_pickups(&mut tx, &user.id).await {
            Ok(val) => val,
            Err(err) => {
                return PickupListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.pickup",
                        "pickup_list_api",
                        "get_pickups",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let today = today();
        let (upcoming, completed) = classify_pickups(pickups, today);
        PickupListResponses::Ok(Json(PickupListResponse {
            upcoming: upcoming
                .into_iter()
                .map(|item| PickupResponse::new(item, today))
                .collect(),
            completed: completed
                .into_iter()
                .map(|item| PickupResponse::new(item, today))
                .collect(),
        }))
    }

    #[oai(path = "/pickup/", method = "post", tag = "ApiPickupTags::Pickup")]
    async fn pickup_create_api(
        &self,
        Json(json): Json<PickupCreateRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> PickupCreateResponses {
        let today = today();
        let (time_start, time_end) = match validate_pickup(
            json.pickup_date,
            &json.pickup_time_start,
            &json.pickup_time_end,
            &json.waste_types,
            today,
        ) {
            Ok(val) => val,
            Err(message) => {
                return PickupCreateResponses::BadRequest(Json(BadRequestResponse { message }))
            }
        };

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return PickupCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.pickup",
                        "pickup_create_api",
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
                return PickupCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.pickup",
                        "pickup_create_api",
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
                return PickupCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.pickup",
                        "pickup_create_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return PickupCreateResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        let new_pickup = NewPickup {
            user_id: user.id,
            pickup_date: json.pickup_date,
            pickup_time_start: time_start,
            pickup_time_end: time_end,
            waste_types: json
                .waste_types
                .iter()
                .map(|item| item.trim().to_lowercase())
                .filter(|item| !item.is_empty())
                .collect(),
            location: json.location,
            notes: json.notes,
        };
        let pickup = match create_pickup(&mut tx, new_pickup, None).await {
            Ok(val) => val,
            Err(err) => {
                return PickupCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.pickup",
                        "pickup_create_api",
                        "create_pickup",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if let Err(err) = tx.commit().await {
            return PickupCreateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.pickup",
                    "pickup_create_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        PickupCreateResponses::Created(Json(PickupResponse::new(pickup, today)))
    }

    #[oai(path = "/pickup/:id", method = "get", tag = "ApiPickupTags::Pickup")]
    async fn pickup_detail_api(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> PickupDetailResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return PickupDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.pickup",
                        "pickup_detail_api",
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
                return PickupDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.pickup",
                        "pickup_detail_api",
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
                return PickupDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.pickup",
                        "pickup_detail_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return PickupDetailResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        let not_found = NotFoundResponse {
            message: format!("pickup with id = {} not found", id),
        };
        let Ok(id) = Uuid::parse_str(&id) else {
            return PickupDetailResponses::NotFound(Json(not_found));
        };
        let pickup = match get_pickup_by_id(&mut tx, &id).await {
            Ok(val) => val,
            Err(err) => {
                return PickupDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.pickup",
                        "pickup_detail_api",
                        "get_pickup_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        match pickup {
            Some(pickup) if pickup.user_id == user.id || user.is_admin() => {
                PickupDetailResponses::Ok(Json(PickupResponse::new(pickup, today())))
            }
            _ => PickupDetailResponses::NotFound(Json(not_found)),
        }
    }

    #[oai(
        path = "/pickup/:id/cancel",
        method = "post",
        tag = "ApiPickupTags::Pickup"
    )]
    async fn pickup_cancel_api(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> PickupStatusUpdateResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return PickupStatusUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.pickup",
                        "pickup_cancel_api",
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
                return PickupStatusUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.pickup",
                        "pickup_cancel_api",
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
                return PickupStatusUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.pickup",
                        "pickup_cancel_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return PickupStatusUpdateResponses::Unauthorized(Json(
                UnauthorizedResponse::default(),
            ));
        };

        let not_found = NotFoundResponse {
            message: format!("pickup with id = {} not found", id),
        };
        let Ok(id) = Uuid::parse_str(&id) else {
            return PickupStatusUpdateResponses::NotFound(Json(not_found));
        };
        let pickup = match get_pickup_by_id(&mut tx, &id).await {
            Ok(val) => val,
            Err(err) => {
                return PickupStatusUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.pickup",
                        "pickup_cancel_api",
                        "get_pickup_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(mut pickup) = pickup.filter(|item| item.user_id == user.id) else {
            return PickupStatusUpdateResponses::NotFound(Json(not_found));
        };

        let can_cancel = pickup
            .status
            .parse::<PickupStatus>()
            .map(|status| status.can_transition_to(PickupStatus::Cancelled))
            .unwrap_or(false);
        if !can_cancel {
            return PickupStatusUpdateResponses::BadRequest(Json(BadRequestResponse {
                message: format!("Pickup is already {}", pickup.status),
            }));
        }

        if let Err(err) =
            change_pickup_status(&mut tx, &mut pickup, PickupStatus::Cancelled, None).await
        {
            return PickupStatusUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.pickup",
                    "pickup_cancel_api",
                    "change_pickup_status",
                    &err.to_string(),
                ),
            ));
        }
        if let Err(err) = tx.commit().await {
            return PickupStatusUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.pickup",
                    "pickup_cancel_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        PickupStatusUpdateResponses::Ok(Json(PickupResponse::new(pickup, today())))
    }

    #[oai(
        path = "/pickup/:id/status",
        method = "put",
        tag = "ApiPickupTags::Pickup"
    )]
    async fn pickup_status_update_api(
        &self,
        Path(id): Path<String>,
        Json(json): Json<PickupStatusUpdateRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> PickupStatusUpdateResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return PickupStatusUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.pickup",
                        "pickup_status_update_api",
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
                return PickupStatusUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.pickup",
                        "pickup_status_update_api",
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
                return PickupStatusUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.pickup",
                        "pickup_status_update_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return PickupStatusUpdateResponses::Unauthorized(Json(
                UnauthorizedResponse::default(),
            ));
        };
        if !user.is_admin() {
            return PickupStatusUpdateResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        let not_found = NotFoundResponse {
            message: format!("pickup with id = {} not found", id),
        };
        let Ok(id) = Uuid::parse_str(&id) else {
            return PickupStatusUpdateResponses::NotFound(Json(not_found));
        };
        let pickup = match get_pickup_by_id(&mut tx, &id).await {
            Ok(val) => val,
            Err(err) => {
                return PickupStatusUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.pickup",
                        "pickup_status_update_api",
                        "get_pickup_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(mut pickup) = pickup else {
            return PickupStatusUpdateResponses::NotFound(Json(not_found));
        };

        let allowed = pickup
            .status
            .parse::<PickupStatus>()
            .map(|status| status.can_transition_to(json.status))
            .unwrap_or(false);
        if !allowed {
            return PickupStatusUpdateResponses::BadRequest(Json(BadRequestResponse {
                message: format!(
                    "Cannot change pickup status from {} to {}",
                    pickup.status, json.status
                ),
            }));
        }

        if let Some(staff_id) = json.staff_id {
            let staff = match get_staff_by_id(&mut tx, &staff_id).await {
                Ok(val) => val,
                Err(err) => {
                    return PickupStatusUpdateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.pickup",
                            "pickup_status_update_api",
                            "get_staff_by_id",
                            &err.to_string(),
                        ),
                    ))
                }
            };
            if staff.is_none() {
                return PickupStatusUpdateResponses::BadRequest(Json(BadRequestResponse {
                    message: format!("staff with id = {} not found", staff_id),
                }));
            }
        }

        if let Err(err) =
            change_pickup_status(&mut tx, &mut pickup, json.status, json.staff_id).await
        {
            return PickupStatusUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.pickup",
                    "pickup_status_update_api",
                    "change_pickup_status",
                    &err.to_string(),
                ),
            ));
        }
        if let Err(err) = tx.commit().await {
            return PickupStatusUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.pickup",
                    "pickup_status_update_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        tracing::info!(
            "pickup {} moved to {} by {}",
            pickup.id,
            pickup.status,
            user.id
        );
        PickupStatusUpdateResponses::Ok(Json(PickupResponse::new(pickup, today())))
    }
}
