use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use crate::{
    model::staff::Staff,
    schema::common::{ForbiddenResponse, InternalServerErrorResponse, UnauthorizedResponse},
};

#[derive(Object, Deserialize, Serialize)]
pub struct StaffResponse {
    pub id: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub service_area_id: Option<String>,
}

impl From<Staff> for StaffResponse {
    fn from(item: Staff) -> Self {
        Self {
            id: item.id.to_string(),
            full_name: item.full_name,
            phone: item.phone,
            service_area_id: item.service_area_id.map(|val| val.to_string()),
        }
    }
}

#[derive(ApiResponse)]
pub enum StaffListResponses {
    #[oai(status = 200)]
    Ok(Json<Vec<StaffResponse>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 403)]
    Forbidden(Json<ForbiddenResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}
