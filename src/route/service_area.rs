use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{payload::Json, OpenApi, Tags};

use crate::{
    repository::service_area::get_service_areas,
    schema::{
        common::InternalServerErrorResponse,
        service_area::{ServiceAreaListResponses, ServiceAreaResponse},
    },
    AppState,
};

#[derive(Tags)]
enum ApiServiceAreaTags {
    ServiceArea,
}

pub struct ApiServiceArea;

#[OpenApi]
impl ApiServiceArea {
    #[oai(
        path = "/service-area/",
        method = "get",
        tag = "ApiServiceAreaTags::ServiceArea"
    )]
    async fn service_area_list_api(
        &self,
        state: Data<&Arc<AppState>>,
    ) -> ServiceAreaListResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return ServiceAreaListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.service_area",
                        "service_area_list_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        match get_service_areas(&mut tx).await {
            Ok(val) => ServiceAreaListResponses::Ok(Json(
                val.into_iter().map(ServiceAreaResponse::from).collect(),
            )),
            Err(err) => ServiceAreaListResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.service_area",
                    "service_area_list_api",
                    "get_service_areas",
                    &err.to_string(),
                ),
            )),
        }
    }
}
