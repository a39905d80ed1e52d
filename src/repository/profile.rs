use chrono::{DateTime, FixedOffset, Local};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::sqlx_utils::{binds_query_as, query_builder, SqlxBinds},
    model::profile::{Profile, TABLE_NAME},
};

pub async fn get_profile(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &Uuid,
) -> anyhow::Result<Option<Profile>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::Uuid(*user_id)];
    let filters: Vec<String> = vec!["id = $1".to_string()];
    let stmt = query_builder(None, TABLE_NAME, &filters, vec![], None, None);
    let q = binds_query_as::<Profile>(&stmt, binds);
    let data = q.fetch_optional(&mut **tx).await?;
    Ok(data)
}

/// Field changes applied by [`update_profile`]; `None` keeps the stored value.
#[derive(Clone, Debug, Default)]
pub struct ProfileChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub nickname: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<Option<String>>,
    pub profile_pic: Option<Option<String>>,
}

impl ProfileChanges {
    pub fn apply(self, profile: &mut Profile) {
        if let Some(val) = self.first_name {
            profile.first_name = Some(val);
        }
        if let Some(val) = self.last_name {
            profile.last_name = Some(val);
        }
        if let Some(val) = self.nickname {
            profile.nickname = Some(val);
        }
        if let Some(val) = self.address {
            profile.address = Some(val);
        }
        if let Some(val) = self.phone {
            profile.phone = Some(val);
        }
        if let Some(val) = self.avatar_url {
            profile.avatar_url = val;
        }
        if let Some(val) = self.profile_pic {
            profile.profile_pic = val;
        }
    }
}

pub async fn update_profile(
    tx: &mut Transaction<'_, Postgres>,
    profile: &mut Profile,
    changes: ProfileChanges,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<()> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    changes.apply(profile);
    profile.updated_date = Some(now);
    sqlx::query(
        format!(
            r#"
        UPDATE {}
        SET first_name = $1, last_name = $2, nickname = $3, address = $4, phone = $5,
        avatar_url = $6, profile_pic = $7, updated_date = $8
        WHERE id = $9"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&profile.first_name)
    .bind(&profile.last_name)
    .bind(&profile.nickname)
    .bind(&profile.address)
    .bind(&profile.phone)
    .bind(&profile.avatar_url)
    .bind(&profile.profile_pic)
    .bind(profile.updated_date)
    .bind(profile.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Insert or overwrite the editable columns of a profile; points are kept.
pub async fn upsert_profile(
    tx: &mut Transaction<'_, Postgres>,
    profile: &Profile,
) -> anyhow::Result<Profile> {
    let data = sqlx::query_as::<_, Profile>(
        format!(
            r#"
    INSERT INTO {} AS existing (id, first_name, last_name, nickname, address, phone, avatar_url,
    profile_pic, total_points, created_date, updated_date)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
    ON CONFLICT (id) DO UPDATE
    SET first_name = EXCLUDED.first_name, last_name = EXCLUDED.last_name,
    nickname = COALESCE(EXCLUDED.nickname, existing.nickname),
    address = EXCLUDED.address, phone = EXCLUDED.phone,
    avatar_url = COALESCE(EXCLUDED.avatar_url, existing.avatar_url),
    updated_date = EXCLUDED.updated_date
    RETURNING *"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(profile.id)
    .bind(&profile.first_name)
    .bind(&profile.last_name)
    .bind(&profile.nickname)
    .bind(&profile.address)
    .bind(&profile.phone)
    .bind(&profile.avatar_url)
    .bind(&profile.profile_pic)
    .bind(profile.total_points)
    .bind(profile.created_date)
    .bind(profile.updated_date)
    .fetch_one(&mut **tx)
    .await?;
    Ok(data)
}

/// Adds `points` (negative to spend) and returns the updated row.
pub async fn add_points(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &Uuid,
    points: i32,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<Option<Profile>> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    let data = sqlx::query_as::<_, Profile>(
        format!(
            r#"
        UPDATE {}
        SET total_points = total_points + $1, updated_date = $2
        WHERE id = $3
        RETURNING *"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(points)
    .bind(now)
    .bind(user_id)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(data)
}

/// Deducts `points` only while the balance covers them. `None` means the
/// balance was short (or no profile exists) and nothing changed.
pub async fn spend_points(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &Uuid,
    points: i32,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<Option<Profile>> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    let data = sqlx::query_as::<_, Profile>(
        format!(
            r#"
        UPDATE {}
        SET total_points = total_points - $1, updated_date = $2
        WHERE id = $3 AND total_points >= $1
        RETURNING *"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(points)
    .bind(now)
    .bind(user_id)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(data)
}
