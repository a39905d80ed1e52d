use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const TABLE_NAME: &str = "public.profiles";

#[derive(Clone, Debug, Deserialize, Serialize, FromRow, PartialEq)]
pub struct Profile {
    pub id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub nickname: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub profile_pic: Option<String>,
    pub total_points: i32,
    pub created_date: Option<DateTime<FixedOffset>>,
    pub updated_date: Option<DateTime<FixedOffset>>,
}

impl Profile {
    /// Empty profile row for a freshly signed up user.
    pub fn new(id: Uuid, now: DateTime<FixedOffset>) -> Self {
        Self {
            id,
            first_name: None,
            last_name: None,
            nickname: None,
            address: None,
            phone: None,
            avatar_url: None,
            profile_pic: None,
            total_points: 0,
            created_date: Some(now),
            updated_date: Some(now),
        }
    }
}
