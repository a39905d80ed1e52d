use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use crate::{
    core::utils::{datetime_to_string, datetime_to_string_opt},
    model::notification::Notification,
    schema::common::{InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse},
};

#[derive(Object, Deserialize, Serialize)]
pub struct NotificationResponse {
    pub id: String,
    pub message: String,
    pub is_read: bool,
    pub sent_at: String,
    pub read_at: Option<String>,
}

impl From<Notification> for NotificationResponse {
    fn from(item: Notification) -> Self {
        Self {
            id: item.id.to_string(),
            message: item.message,
            is_read: item.is_read,
            sent_at: datetime_to_string(item.sent_at),
            read_at: datetime_to_string_opt(item.read_at),
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct NotificationListResponse {
    pub unread_count: u32,
    pub results: Vec<NotificationResponse>,
}

#[derive(ApiResponse)]
pub enum NotificationListResponses {
    #[oai(status = 200)]
    Ok(Json<NotificationListResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum NotificationReadResponses {
    #[oai(status = 200)]
    Ok(Json<NotificationResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}
