use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{payload::Json, OpenApi, Tags};

use crate::{
    repository::waste_type::get_waste_types,
    schema::{
        common::InternalServerErrorResponse,
        waste_type::{WasteTypeListResponses, WasteTypeResponse},
    },
    AppState,
};

#[derive(Tags)]
enum ApiWasteTypeTags {
    WasteType,
}

pub struct ApiWasteType;

#[OpenApi]
impl ApiWasteType {
    #[oai(
        path = "/waste-type/",
        method = "get",
        tag = "ApiWasteTypeTags::WasteType"
    )]
    async fn waste_type_list_api(&self, state: Data<&Arc<AppState>>) -> WasteTypeListResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return WasteTypeListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.waste_type",
                        "waste_type_list_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        match get_waste_types(&mut tx).await {
            Ok(val) => WasteTypeListResponses::Ok(Json(
                val.into_iter().map(WasteTypeResponse::from).collect(),
            )),
            Err(err) => WasteTypeListResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.waste_type",
                    "waste_type_list_api",
                    "get_waste_types",
                    &err.to_string(),
                ),
            )),
        }
    }
}
