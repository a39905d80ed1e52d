use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{
    param::{Path, Query},
    payload::Json,
    OpenApi, Tags,
};
use uuid::Uuid;

use crate::{
    core::security::{get_user_from_token, BearerAuthorization},
    repository::notification::{
        get_notification_by_id, get_notifications, mark_notification_read,
    },
    schema::{
        common::{InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse},
        notification::{
            NotificationListResponse, NotificationListResponses, NotificationReadResponses,
            NotificationResponse,
        },
    },
    AppState,
};

#[derive(Tags)]
enum ApiNotificationTags {
    Notification,
}

pub struct ApiNotification;

#[OpenApi]
impl ApiNotification {
    #[oai(
        path = "/notification/",
        method = "get",
        tag = "ApiNotificationTags::Notification"
    )]
    async fn notification_list_api(
        &self,
        Query(unread_only): Query<Option<bool>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> NotificationListResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return NotificationListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.notification",
                        "notification_list_api",
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
                return NotificationListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.notification",
                        "notification_list_api",
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
                return NotificationListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.notification",
                        "notification_list_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return NotificationListResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        let data = match get_notifications(&mut tx, &user.id, unread_only.unwrap_or(false)).await
        {
            Ok(val) => val,
            Err(err) => {
                return NotificationListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.notification",
                        "notification_list_api",
                        "get_notifications",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let unread_count = data.iter().filter(|item| !item.is_read).count() as u32;
        NotificationListResponses::Ok(Json(NotificationListResponse {
            unread_count,
            results: data.into_iter().map(NotificationResponse::from).collect(),
        }))
    }

    #[oai(
        path = "/notification/:id/read",
        method = "post",
        tag = "ApiNotificationTags::Notification"
    )]
    async fn notification_read_api(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> NotificationReadResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return NotificationReadResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.notification",
                        "notification_read_api",
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
                return NotificationReadResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.notification",
                        "notification_read_api",
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
                return NotificationReadResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.notification",
                        "notification_read_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return NotificationReadResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        let not_found = NotFoundResponse {
            message: format!("notification with id = {} not found", id),
        };
        let Ok(id) = Uuid::parse_str(&id) else {
            return NotificationReadResponses::NotFound(Json(not_found));
        };
        let notification = match get_notification_by_id(&mut tx, &id).await {
            Ok(val) => val,
            Err(err) => {
                return NotificationReadResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.notification",
                        "notification_read_api",
                        "get_notification_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(mut notification) = notification.filter(|item| item.user_id == user.id) else {
            return NotificationReadResponses::NotFound(Json(not_found));
        };

        if let Err(err) = mark_notification_read(&mut tx, &mut notification, None).await {
            return NotificationReadResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.notification",
                    "notification_read_api",
                    "mark_notification_read",
                    &err.to_string(),
                ),
            ));
        }
        if let Err(err) = tx.commit().await {
            return NotificationReadResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.notification",
                    "notification_read_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        NotificationReadResponses::Ok(Json(NotificationResponse::from(notification)))
    }
}
