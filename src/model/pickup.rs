use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Deserialize;
use sqlx::FromRow;
use uuid::Uuid;

pub const TABLE_NAME: &str = "public.pickups";

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct Pickup {
    pub id: Uuid,
    pub user_id: Uuid,
    pub pickup_date: NaiveDate,
    pub pickup_time_start: String,
    pub pickup_time_end: String,
    pub waste_types: Vec<String>,
    pub status: String,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub staff_id: Option<Uuid>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}
