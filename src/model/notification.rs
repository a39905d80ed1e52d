use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use sqlx::FromRow;
use uuid::Uuid;

pub const TABLE_NAME: &str = "public.notifications";

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    pub is_read: bool,
    pub sent_at: DateTime<FixedOffset>,
    pub read_at: Option<DateTime<FixedOffset>>,
}
