use serde::Deserialize;
use sqlx::FromRow;
use uuid::Uuid;

pub const TABLE_NAME: &str = "public.waste_types";

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct WasteType {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub points_per_kg: i32,
}
