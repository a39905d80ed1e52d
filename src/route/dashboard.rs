use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{payload::Json, OpenApi, Tags};

use crate::{
    core::{
        history::{monthly_totals, round_one_decimal},
        pickup::{classify_pickups, PickupStatus},
        security::{get_user_from_token, BearerAuthorization},
        utils::today,
    },
    repository::{
        pickup::{count_pickups_by_status, get_pickups},
        profile::get_profile,
        reward::count_user_rewards,
        waste_log::{get_all_waste_logs, get_waste_logs, sum_waste_amount},
    },
    schema::{
        common::{InternalServerErrorResponse, UnauthorizedResponse},
        dashboard::{
            DashboardResponse, DashboardResponses, HistoryResponse, HistoryResponses,
            MonthlyWasteResponse,
        },
        pickup::PickupResponse,
        waste_log::WasteLogResponse,
    },
    AppState,
};

#[derive(Tags)]
enum ApiDashboardTags {
    Dashboard,
}

pub struct ApiDashboard;

const RECENT_WASTE_LOGS: u32 = 5;
const UPCOMING_PICKUPS: usize = 3;
const HISTORY_MONTHS: u32 = 6;

#[OpenApi]
impl ApiDashboard {
    #[oai(
        path = "/dashboard/",
        method = "get",
        tag = "ApiDashboardTags::Dashboard"
    )]
    async fn dashboard_api(
        &self,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> DashboardResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return DashboardResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.dashboard",
                        "dashboard_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return DashboardResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.dashboard",
                        "dashboard_api",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate user token
        let jwt_token = auth.0.token;
        let user = match get_user_from_token(&mut tx, &mut redis_conn, jwt_token.clone()).await {
            Ok(val) => val,
            Err(err) => {
                return DashboardResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.dashboard",
                        "dashboard_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return DashboardResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        let total_points = match get_profile(&mut tx, &user.id).await {
            Ok(val) => val.map(|item| item.total_points).unwrap_or(0),
            Err(err) => {
                return DashboardResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.dashboard",
                        "dashboard_api",
                        "get_profile",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let (total_waste, _) = match sum_waste_amount(&mut tx, &user.id).await {
            Ok(val) => val,
            Err(err) => {
                return DashboardResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.dashboard",
                        "dashboard_api",
                        "sum_waste_amount",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let pickups_completed =
            match count_pickups_by_status(&mut tx, &user.id, PickupStatus::Completed).await {
                Ok(val) => val,
                Err(err) => {
                    return DashboardResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.dashboard",
                            "dashboard_api",
                            "count_pickups_by_status",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        let rewards_redeemed = match count_user_rewards(&mut tx, &user.id).await {
            Ok(val) => val,
            Err(err) => {
                return DashboardResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.dashboard",
                        "dashboard_api",
                        "count_user_rewards",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let recent_waste_logs =
            match get_waste_logs(&mut tx, &user.id, Some(RECENT_WASTE_LOGS)).await {
                Ok(val) => val,
                Err(err) => {
                    return DashboardResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.dashboard",
                            "dashboard_api",
                            "get_waste_logs",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        let pickups = match get_pickups(&mut tx, &user.id).await {
            Ok(val) => val,
            Err(err) => {
                return DashboardResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.dashboard",
                        "dashboard_api",
                        "get_pickups",
                        &err.to_string(),
                    ),
                ))
            }
        };

        let today = today();
        let (upcoming, _) = classify_pickups(pickups, today);
        DashboardResponses::Ok(Json(DashboardResponse {
            total_points,
            total_waste: round_one_decimal(total_waste),
            pickups_completed,
            rewards_redeemed,
            recent_waste_logs: recent_waste_logs
                .into_iter()
                .map(WasteLogResponse::from)
                .collect(),
            upcoming_pickups: upcoming
                .into_iter()
                .take(UPCOMING_PICKUPS)
                .map(|item| PickupResponse::new(item, today))
                .collect(),
        }))
    }

    #[oai(
        path = "/dashboard/history",
        method = "get",
        tag = "ApiDashboardTags::Dashboard"
    )]
    async fn dashboard_history_api(
        &self,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> HistoryResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return HistoryResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.dashboard",
                        "dashboard_history_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return HistoryResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.dashboard",
                        "dashboard_history_api",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate user token
        let jwt_token = auth.0.token;
        let user = match get_user_from_token(&mut tx, &mut redis_conn, jwt_token.clone()).await {
            Ok(val) => val,
            Err(err) => {
                return HistoryResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.dashboard",
                        "dashboard_history_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return HistoryResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        let logs = match get_all_waste_logs(&mut tx, &user.id).await {
            Ok(val) => val,
            Err(err) => {
                return HistoryResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.dashboard",
                        "dashboard_history_api",
                        "get_all_waste_logs",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let pickups_completed =
            match count_pickups_by_status(&mut tx, &user.id, PickupStatus::Completed).await {
                Ok(val) => val,
                Err(err) => {
                    return HistoryResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.dashboard",
                            "dashboard_history_api",
                            "count_pickups_by_status",
                            &err.to_string(),
                        ),
                    ))
                }
            };

        let total_waste: f64 = logs.iter().map(|item| item.amount).sum();
        let points_earned: i64 = logs.iter().map(|item| item.points_earned as i64).sum();
        let months = monthly_totals(&logs, today(), HISTORY_MONTHS);
        HistoryResponses::Ok(Json(HistoryResponse {
            months: months.into_iter().map(MonthlyWasteResponse::from).collect(),
            total_waste: round_one_decimal(total_waste),
            pickups_completed,
            points_earned,
        }))
    }
}
