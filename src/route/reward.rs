use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{param::Path, payload::Json, OpenApi, Tags};
use uuid::Uuid;

use crate::{
    core::security::{get_user_from_token, BearerAuthorization},
    repository::{
        profile::{get_profile, spend_points},
        reward::{get_reward_by_id, get_rewards, get_user_rewards, redeem_reward},
    },
    schema::{
        common::{
            BadRequestResponse, InternalServerErrorResponse, NotFoundResponse,
            UnauthorizedResponse,
        },
        reward::{
            RedeemRewardResponse, RedeemRewardResponses, RewardHistoryResponses,
            RewardListResponse, RewardListResponses, RewardResponse, UserRewardResponse,
        },
    },
    AppState,
};

#[derive(Tags)]
enum ApiRewardTags {
    Reward,
}

pub struct ApiReward;

#[OpenApi]
impl ApiReward {
    #[oai(path = "/reward/", method = "get", tag = "ApiRewardTags::Reward")]
    async fn reward_list_api(
        &self,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> RewardListResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return RewardListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.reward",
                        "reward_list_api",
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
                return RewardListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.reward",
                        "reward_list_api",
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
                return RewardListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.reward",
                        "reward_list_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return RewardListResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        let total_points = match get_profile(&mut tx, &user.id).await {
            Ok(val) => val.map(|item| item.total_points).unwrap_or(0),
            Err(err) => {
                return RewardListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.reward",
                        "reward_list_api",
                        "get_profile",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let rewards = match get_rewards(&mut tx).await {
            Ok(val) => val,
            Err(err) => {
                return RewardListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.reward",
                        "reward_list_api",
                        "get_rewards",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let min_points_required = rewards.iter().map(|item| item.points_required).min();
        RewardListResponses::Ok(Json(RewardListResponse {
            total_points,
            min_points_required,
            rewards: rewards
                .into_iter()
                .map(|item| RewardResponse::new(item, total_points))
                .collect(),
        }))
    }

    /// Debits the reward's points from the caller's balance.
    #[oai(
        path = "/reward/:id/redeem",
        method = "post",
        tag = "ApiRewardTags::Reward"
    )]
    async fn reward_redeem_api(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> RedeemRewardResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return RedeemRewardResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.reward",
                        "reward_redeem_api",
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
                return RedeemRewardResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.reward",
                        "reward_redeem_api",
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
                return RedeemRewardResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.reward",
                        "reward_redeem_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return RedeemRewardResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        let not_found = NotFoundResponse {
            message: format!("reward with id = {} not found", id),
        };
        let Ok(id) = Uuid::parse_str(&id) else {
            return RedeemRewardResponses::NotFound(Json(not_found));
        };
        let reward = match get_reward_by_id(&mut tx, &id).await {
            Ok(val) => val,
            Err(err) => {
                return RedeemRewardResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.reward",
                        "reward_redeem_api",
                        "get_reward_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(reward) = reward.filter(|item| item.available) else {
            return RedeemRewardResponses::NotFound(Json(not_found));
        };

        // The conditional debit holds the profile row lock until commit, so a
        // concurrent redemption sees the reduced balance.
        let profile = match spend_points(&mut tx, &user.id, reward.points_required, None).await {
            Ok(val) => val,
            Err(err) => {
                return RedeemRewardResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.reward",
                        "reward_redeem_api",
                        "spend_points",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(profile) = profile else {
            let total_points = match get_profile(&mut tx, &user.id).await {
                Ok(val) => val.map(|item| item.total_points).unwrap_or(0),
                Err(err) => {
                    return RedeemRewardResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.reward",
                            "reward_redeem_api",
                            "get_profile",
                            &err.to_string(),
                        ),
                    ))
                }
            };
            return RedeemRewardResponses::BadRequest(Json(BadRequestResponse {
                message: format!(
                    "Not enough points: {} required, {} available",
                    reward.points_required, total_points
                ),
            }));
        };

        let redemption =
            match redeem_reward(&mut tx, &user.id, &reward.id, reward.points_required, None).await
            {
                Ok(val) => val,
                Err(err) => {
                    return RedeemRewardResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.reward",
                            "reward_redeem_api",
                            "redeem_reward",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if let Err(err) = tx.commit().await {
            return RedeemRewardResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.reward",
                    "reward_redeem_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        state.profile_feed.publish(&profile);
        tracing::info!(
            "user {} redeemed {} for {} points",
            user.id,
            reward.reward_type,
            reward.points_required
        );

        RedeemRewardResponses::Created(Json(RedeemRewardResponse {
            redemption: UserRewardResponse::from(redemption),
            remaining_points: profile.total_points,
        }))
    }

    #[oai(path = "/reward/history", method = "get", tag = "ApiRewardTags::Reward")]
    async fn reward_history_api(
        &self,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> RewardHistoryResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return RewardHistoryResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.reward",
                        "reward_history_api",
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
                return RewardHistoryResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.reward",
                        "reward_history_api",
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
                return RewardHistoryResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.reward",
                        "reward_history_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return RewardHistoryResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        match get_user_rewards(&mut tx, &user.id).await {
            Ok(val) => RewardHistoryResponses::Ok(Json(
                val.into_iter().map(UserRewardResponse::from).collect(),
            )),
            Err(err) => RewardHistoryResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.reward",
                    "reward_history_api",
                    "get_user_rewards",
                    &err.to_string(),
                ),
            )),
        }
    }
}
