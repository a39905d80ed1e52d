use serde::Deserialize;
use sqlx::FromRow;
use uuid::Uuid;

pub const TABLE_NAME: &str = "public.staff";

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct Staff {
    pub id: Uuid,
    pub full_name: String,
    pub phone: Option<String>,
    pub service_area_id: Option<Uuid>,
    pub is_active: bool,
}
