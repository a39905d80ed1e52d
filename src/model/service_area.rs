use serde::Deserialize;
use sqlx::FromRow;
use uuid::Uuid;

pub const TABLE_NAME: &str = "public.service_areas";

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct ServiceArea {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
}
