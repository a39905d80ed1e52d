use chrono::NaiveDate;
use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    core::{
        pickup::{is_upcoming, PickupStatus},
        utils::{date_to_string, datetime_to_string},
    },
    model::pickup::Pickup,
    schema::common::{
        BadRequestResponse, ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
        UnauthorizedResponse,
    },
};

#[derive(Object, Deserialize)]
pub struct PickupCreateRequest {
    pub pickup_date: NaiveDate,
    pub pickup_time_start: String,
    pub pickup_time_end: String,
    pub waste_types: Vec<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

#[derive(Object, Deserialize, Serialize, Debug)]
pub struct PickupResponse {
    pub id: String,
    pub pickup_date: String,
    pub pickup_time_start: String,
    pub pickup_time_end: String,
    pub waste_types: Vec<String>,
    pub status: String,
    pub is_upcoming: bool,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub staff_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl PickupResponse {
    pub fn new(pickup: Pickup, today: NaiveDate) -> Self {
        Self {
            id: pickup.id.to_string(),
            is_upcoming: is_upcoming(&pickup.status, pickup.pickup_date, today),
            pickup_date: date_to_string(pickup.pickup_date),
            pickup_time_start: pickup.pickup_time_start,
            pickup_time_end: pickup.pickup_time_end,
            waste_types: pickup.waste_types,
            status: pickup.status,
            location: pickup.location,
            notes: pickup.notes,
            staff_id: pickup.staff_id.map(|val| val.to_string()),
            created_at: datetime_to_string(pickup.created_at),
            updated_at: datetime_to_string(pickup.updated_at),
        }
    }
}

#[derive(ApiResponse)]
pub enum PickupCreateResponses {
    #[oai(status = 201)]
    Created(Json<PickupResponse>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize, Serialize)]
pub struct PickupListResponse {
    pub upcoming: Vec<PickupResponse>,
    pub completed: Vec<PickupResponse>,
}

#[derive(ApiResponse)]
pub enum PickupListResponses {
    #[oai(status = 200)]
    Ok(Json<PickupListResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum PickupDetailResponses {
    #[oai(status = 200)]
    Ok(Json<PickupResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize)]
pub struct PickupStatusUpdateRequest {
    pub status: PickupStatus,
    pub staff_id: Option<Uuid>,
}

#[derive(ApiResponse)]
pub enum PickupStatusUpdateResponses {
    #[oai(status = 200)]
    Ok(Json<PickupResponse>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 403)]
    Forbidden(Json<ForbiddenResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}
