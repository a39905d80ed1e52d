use std::sync::Arc;

use poem::{
    endpoint::StaticFilesEndpoint,
    middleware::{AddData, AddDataEndpoint, Cors, CorsEndpoint},
    EndpointExt, Route,
};
use poem_openapi::OpenApiService;
use r2d2::Pool as r2d2Pool;
use redis::Client;
use route::{
    auth::ApiAuth, contact::ApiContact, dashboard::ApiDashboard, notification::ApiNotification,
    pickup::ApiPickup, profile::ApiProfile, reward::ApiReward, service_area::ApiServiceArea,
    staff::ApiStaff, waste_log::ApiWasteLog, waste_type::ApiWasteType,
};
use settings::Config;
use sqlx::{Pool, Postgres};

use crate::core::{realtime::ProfileFeed, storage::ObjectStorage};

pub mod cli;
pub mod core;
pub mod factory;
pub mod model;
pub mod repository;
pub mod route;
pub mod schema;
pub mod settings;

pub struct AppState {
    pub db: Pool<Postgres>,
    pub redis_conn: r2d2Pool<Client>,
    pub storage: ObjectStorage,
    pub profile_feed: ProfileFeed,
    pub config: Config,
}

pub fn init_openapi_route(
    app_state: Arc<AppState>,
    config: &Config,
) -> CorsEndpoint<AddDataEndpoint<Route, Arc<AppState>>> {
    let prefix = config.prefix.clone().unwrap_or("/".to_string());
    let openapi_route = OpenApiService::new(
        (
            ApiAuth,
            ApiProfile,
            ApiWasteLog,
            ApiWasteType,
            ApiPickup,
            ApiReward,
            ApiNotification,
            ApiDashboard,
            ApiServiceArea,
            ApiStaff,
            ApiContact,
        ),
        "Bioloop Hub",
        "1.0",
    )
    .server(prefix.clone());
    let openapi_json_endpoint = openapi_route.spec_endpoint();
    let ui = openapi_route.swagger_ui();
    let storage_files = StaticFilesEndpoint::new(app_state.storage.root());
    Route::new()
        .nest(prefix, openapi_route)
        .nest("/docs", ui)
        .nest("/storage", storage_files)
        .at("openapi.json", openapi_json_endpoint)
        .with(AddData::new(app_state))
        .with(Cors::new())
}
