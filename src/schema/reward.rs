use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use crate::{
    core::utils::datetime_to_string,
    model::{reward::Reward, user_reward::UserReward},
    schema::common::{
        BadRequestResponse, InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
};

#[derive(Object, Deserialize, Serialize)]
pub struct RewardResponse {
    pub id: String,
    pub reward_type: String,
    pub description: Option<String>,
    pub value_label: String,
    pub points_required: i32,
    pub can_redeem: bool,
}

impl RewardResponse {
    pub fn new(reward: Reward, total_points: i32) -> Self {
        Self {
            id: reward.id.to_string(),
            can_redeem: total_points >= reward.points_required,
            reward_type: reward.reward_type,
            description: reward.description,
            value_label: reward.value_label,
            points_required: reward.points_required,
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct RewardListResponse {
    pub total_points: i32,
    pub min_points_required: Option<i32>,
    pub rewards: Vec<RewardResponse>,
}

#[derive(ApiResponse)]
pub enum RewardListResponses {
    #[oai(status = 200)]
    Ok(Json<RewardListResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize, Serialize)]
pub struct UserRewardResponse {
    pub id: String,
    pub reward_id: String,
    pub points_spent: i32,
    pub created_at: String,
}

impl From<UserReward> for UserRewardResponse {
    fn from(item: UserReward) -> Self {
        Self {
            id: item.id.to_string(),
            reward_id: item.reward_id.to_string(),
            points_spent: item.points_spent,
            created_at: datetime_to_string(item.created_at),
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct RedeemRewardResponse {
    pub redemption: UserRewardResponse,
    pub remaining_points: i32,
}

#[derive(ApiResponse)]
pub enum RedeemRewardResponses {
    #[oai(status = 201)]
    Created(Json<RedeemRewardResponse>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum RewardHistoryResponses {
    #[oai(status = 200)]
    Ok(Json<Vec<UserRewardResponse>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}
