use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Deserialize;
use sqlx::FromRow;
use uuid::Uuid;

pub const TABLE_NAME: &str = "public.waste_logs";

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct WasteLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub waste_type: String,
    pub amount: f64,
    pub points_earned: i32,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
    pub collection_date: Option<NaiveDate>,
    pub collection_time: Option<String>,
    pub created_at: DateTime<FixedOffset>,
}

/// Waste log joined with its catalog entry, when the category exists there.
#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct WasteLogWithType {
    #[sqlx(flatten)]
    pub log: WasteLog,
    pub waste_type_name: Option<String>,
    pub points_per_kg: Option<i32>,
}
