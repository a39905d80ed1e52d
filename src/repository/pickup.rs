use chrono::{DateTime, FixedOffset, Local, NaiveDate};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::{
        pickup::PickupStatus,
        sqlx_utils::{binds_query_as, query_builder, SqlxBinds},
    },
    model::pickup::{Pickup, TABLE_NAME},
};

pub struct NewPickup {
    pub user_id: Uuid,
    pub pickup_date: NaiveDate,
    pub pickup_time_start: String,
    pub pickup_time_end: String,
    pub waste_types: Vec<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

pub async fn create_pickup(
    tx: &mut Transaction<'_, Postgres>,
    new_pickup: NewPickup,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<Pickup> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    let pickup = Pickup {
        id: Uuid::now_v7(),
        user_id: new_pickup.user_id,
        pickup_date: new_pickup.pickup_date,
        pickup_time_start: new_pickup.pickup_time_start,
        pickup_time_end: new_pickup.pickup_time_end,
        waste_types: new_pickup.waste_types,
        status: PickupStatus::Scheduled.to_string(),
        location: new_pickup.location,
        notes: new_pickup.notes,
        staff_id: None,
        created_at: now,
        updated_at: now,
    };
    sqlx::query(
        format!(
            r#"
    INSERT INTO {} (id, user_id, pickup_date, pickup_time_start, pickup_time_end,
    waste_types, status, location, notes, staff_id, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(pickup.id)
    .bind(pickup.user_id)
    .bind(pickup.pickup_date)
    .bind(&pickup.pickup_time_start)
    .bind(&pickup.pickup_time_end)
    .bind(&pickup.waste_types)
    .bind(&pickup.status)
    .bind(&pickup.location)
    .bind(&pickup.notes)
    .bind(pickup.staff_id)
    .bind(pickup.created_at)
    .bind(pickup.updated_at)
    .execute(&mut **tx)
    .await?;
    Ok(pickup)
}

/// All pickups of a user, earliest date first.
pub async fn get_pickups(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &Uuid,
) -> anyhow::Result<Vec<Pickup>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::Uuid(*user_id)];
    let filters: Vec<String> = vec!["user_id = $1".to_string()];
    let stmt = query_builder(
        None,
        TABLE_NAME,
        &filters,
        vec![
            "pickup_date ASC".to_string(),
            "pickup_time_start ASC".to_string(),
        ],
        None,
        None,
    );
    let q = binds_query_as::<Pickup>(&stmt, binds);
    let data = q.fetch_all(&mut **tx).await?;
    Ok(data)
}

pub async fn get_pickup_by_id(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
) -> anyhow::Result<Option<Pickup>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::Uuid(*id)];
    let stmt = query_builder(
        None,
        TABLE_NAME,
        &["id = $1".to_string()],
        vec![],
        None,
        None,
    );
    let q = binds_query_as::<Pickup>(&stmt, binds);
    let data = q.fetch_optional(&mut **tx).await?;
    Ok(data)
}

pub async fn update_pickup_status(
    tx: &mut Transaction<'_, Postgres>,
    pickup: &mut Pickup,
    status: PickupStatus,
    staff_id: Option<Uuid>,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<()> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    pickup.status = status.to_string();
    if staff_id.is_some() {
        pickup.staff_id = staff_id;
    }
    pickup.updated_at = now;
    sqlx::query(
        format!(
            r#"
        UPDATE {}
        SET status = $1, staff_id = $2, updated_at = $3
        WHERE id = $4"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&pickup.status)
    .bind(pickup.staff_id)
    .bind(pickup.updated_at)
    .bind(pickup.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn count_pickups_by_status(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &Uuid,
    status: PickupStatus,
) -> anyhow::Result<i64> {
    let binds: Vec<SqlxBinds> = vec![
        SqlxBinds::Uuid(*user_id),
        SqlxBinds::String(status.to_string()),
    ];
    let stmt = query_builder(
        Some("count(id)".to_string()),
        TABLE_NAME,
        &["user_id = $1".to_string(), "status = $2".to_string()],
        vec![],
        None,
        None,
    );
    let q = binds_query_as::<(i64,)>(&stmt, binds);
    let data = q.fetch_one(&mut **tx).await?;
    Ok(data.0)
}
