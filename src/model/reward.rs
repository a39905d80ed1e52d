use serde::Deserialize;
use sqlx::FromRow;
use uuid::Uuid;

pub const TABLE_NAME: &str = "public.rewards";

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct Reward {
    pub id: Uuid,
    pub reward_type: String,
    pub description: Option<String>,
    pub value_label: String,
    pub points_required: i32,
    pub available: bool,
}
