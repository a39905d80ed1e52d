use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use crate::{
    core::history::MonthlyTotal,
    schema::{
        common::{InternalServerErrorResponse, UnauthorizedResponse},
        pickup::PickupResponse,
        waste_log::WasteLogResponse,
    },
};

#[derive(Object, Deserialize, Serialize)]
pub struct DashboardResponse {
    pub total_points: i32,
    pub total_waste: f64,
    pub pickups_completed: i64,
    pub rewards_redeemed: i64,
    pub recent_waste_logs: Vec<WasteLogResponse>,
    pub upcoming_pickups: Vec<PickupResponse>,
}

#[derive(ApiResponse)]
pub enum DashboardResponses {
    #[oai(status = 200)]
    Ok(Json<DashboardResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize, Serialize, Debug, PartialEq)]
pub struct MonthlyWasteResponse {
    pub year: i32,
    pub month: u32,
    pub label: String,
    pub weight: f64,
}

impl From<MonthlyTotal> for MonthlyWasteResponse {
    fn from(item: MonthlyTotal) -> Self {
        Self {
            year: item.year,
            month: item.month,
            label: item.label,
            weight: item.weight,
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct HistoryResponse {
    pub months: Vec<MonthlyWasteResponse>,
    pub total_waste: f64,
    pub pickups_completed: i64,
    pub points_earned: i64,
}

#[derive(ApiResponse)]
pub enum HistoryResponses {
    #[oai(status = 200)]
    Ok(Json<HistoryResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}
