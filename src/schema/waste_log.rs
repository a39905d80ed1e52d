use chrono::NaiveDate;
use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use crate::{
    core::{
        points::WeightUnit,
        utils::{date_to_string, datetime_to_string},
    },
    model::waste_log::{WasteLog, WasteLogWithType},
    schema::common::{BadRequestResponse, InternalServerErrorResponse, UnauthorizedResponse},
};

#[derive(Object, Deserialize)]
pub struct WasteLogCreateRequest {
    pub waste_type: String,
    pub amount: f64,
    pub unit: Option<WeightUnit>,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
    pub collection_date: Option<NaiveDate>,
    pub collection_time: Option<String>,
}

#[derive(Object, Deserialize, Serialize, Debug)]
pub struct WasteLogResponse {
    pub id: String,
    pub waste_type: String,
    pub waste_type_name: Option<String>,
    pub points_per_kg: Option<i32>,
    pub amount: f64,
    pub points_earned: i32,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
    pub collection_date: Option<String>,
    pub collection_time: Option<String>,
    pub created_at: String,
}

impl From<WasteLog> for WasteLogResponse {
    fn from(log: WasteLog) -> Self {
        Self {
            id: log.id.to_string(),
            waste_type: log.waste_type,
            waste_type_name: None,
            points_per_kg: None,
            amount: log.amount,
            points_earned: log.points_earned,
            notes: log.notes,
            photo_url: log.photo_url,
            collection_date: log.collection_date.map(date_to_string),
            collection_time: log.collection_time,
            created_at: datetime_to_string(log.created_at),
        }
    }
}

impl From<WasteLogWithType> for WasteLogResponse {
    fn from(item: WasteLogWithType) -> Self {
        let mut res = WasteLogResponse::from(item.log);
        res.waste_type_name = item.waste_type_name;
        res.points_per_kg = item.points_per_kg;
        res
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct WasteLogCreateResponse {
    pub waste_log: WasteLogResponse,
    pub total_points: i32,
}

#[derive(ApiResponse)]
pub enum WasteLogCreateResponses {
    #[oai(status = 201)]
    Created(Json<WasteLogCreateResponse>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum WasteLogListResponses {
    #[oai(status = 200)]
    Ok(Json<Vec<WasteLogResponse>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize, Serialize)]
pub struct PointsPreviewResponse {
    pub waste_type: String,
    pub amount_kg: f64,
    pub rate: i32,
    pub points: i32,
}

#[derive(ApiResponse)]
pub enum PointsPreviewResponses {
    #[oai(status = 200)]
    Ok(Json<PointsPreviewResponse>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),
}
