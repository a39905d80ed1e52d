use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use crate::{model::service_area::ServiceArea, schema::common::InternalServerErrorResponse};

#[derive(Object, Deserialize, Serialize)]
pub struct ServiceAreaResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

impl From<ServiceArea> for ServiceAreaResponse {
    fn from(item: ServiceArea) -> Self {
        Self {
            id: item.id.to_string(),
            name: item.name,
            description: item.description,
        }
    }
}

#[derive(ApiResponse)]
pub enum ServiceAreaListResponses {
    #[oai(status = 200)]
    Ok(Json<Vec<ServiceAreaResponse>>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}
