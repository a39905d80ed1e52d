use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use crate::{model::waste_type::WasteType, schema::common::InternalServerErrorResponse};

#[derive(Object, Deserialize, Serialize)]
pub struct WasteTypeResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub points_per_kg: i32,
}

impl From<WasteType> for WasteTypeResponse {
    fn from(item: WasteType) -> Self {
        Self {
            id: item.id.to_string(),
            name: item.name,
            description: item.description,
            points_per_kg: item.points_per_kg,
        }
    }
}

#[derive(ApiResponse)]
pub enum WasteTypeListResponses {
    #[oai(status = 200)]
    Ok(Json<Vec<WasteTypeResponse>>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}
