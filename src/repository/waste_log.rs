use chrono::{DateTime, FixedOffset, Local, NaiveDate};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::sqlx_utils::{binds_query_as, query_builder, SqlxBinds},
    model::{
        waste_log::{WasteLog, WasteLogWithType, TABLE_NAME},
        waste_type::TABLE_NAME as WASTE_TYPE_TABLE_NAME,
    },
};

pub struct NewWasteLog {
    pub user_id: Uuid,
    pub waste_type: String,
    pub amount: f64,
    pub points_earned: i32,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
    pub collection_date: Option<NaiveDate>,
    pub collection_time: Option<String>,
}

pub async fn create_waste_log(
    tx: &mut Transaction<'_, Postgres>,
    new_log: NewWasteLog,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<WasteLog> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    let log = WasteLog {
        id: Uuid::now_v7(),
        user_id: new_log.user_id,
        waste_type: new_log.waste_type,
        amount: new_log.amount,
        points_earned: new_log.points_earned,
        notes: new_log.notes,
        photo_url: new_log.photo_url,
        collection_date: new_log.collection_date,
        collection_time: new_log.collection_time,
        created_at: now,
    };
    sqlx::query(
        format!(
            r#"
    INSERT INTO {} (id, user_id, waste_type, amount, points_earned, notes, photo_url,
    collection_date, collection_time, created_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(log.id)
    .bind(log.user_id)
    .bind(&log.waste_type)
    .bind(log.amount)
    .bind(log.points_earned)
    .bind(&log.notes)
    .bind(&log.photo_url)
    .bind(log.collection_date)
    .bind(&log.collection_time)
    .bind(log.created_at)
    .execute(&mut **tx)
    .await?;
    Ok(log)
}

/// Newest first, joined with the waste type catalog by name.
pub async fn get_waste_logs(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &Uuid,
    limit: Option<u32>,
) -> anyhow::Result<Vec<WasteLogWithType>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::Uuid(*user_id)];
    let filters: Vec<String> = vec!["l.user_id = $1".to_string()];
    let stmt = query_builder(
        Some("l.*, t.name AS waste_type_name, t.points_per_kg".to_string()),
        format!(
            "{TABLE_NAME} l LEFT JOIN {WASTE_TYPE_TABLE_NAME} t ON lower(t.name) = lower(l.waste_type)"
        )
        .as_str(),
        &filters,
        vec!["l.created_at DESC".to_string()],
        limit,
        None,
    );
    let q = binds_query_as::<WasteLogWithType>(&stmt, binds);
    let data = q.fetch_all(&mut **tx).await?;
    Ok(data)
}

/// Raw rows for reporting; no join.
pub async fn get_all_waste_logs(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &Uuid,
) -> anyhow::Result<Vec<WasteLog>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::Uuid(*user_id)];
    let filters: Vec<String> = vec!["user_id = $1".to_string()];
    let stmt = query_builder(
        None,
        TABLE_NAME,
        &filters,
        vec!["created_at ASC".to_string()],
        None,
        None,
    );
    let q = binds_query_as::<WasteLog>(&stmt, binds);
    let data = q.fetch_all(&mut **tx).await?;
    Ok(data)
}

/// (total amount in kg, total points earned)
pub async fn sum_waste_amount(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &Uuid,
) -> anyhow::Result<(f64, i64)> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::Uuid(*user_id)];
    let stmt = query_builder(
        Some("COALESCE(SUM(amount), 0)::float8, COALESCE(SUM(points_earned), 0)::int8".to_string()),
        TABLE_NAME,
        &["user_id = $1".to_string()],
        vec![],
        None,
        None,
    );
    let q = binds_query_as::<(f64, i64)>(&stmt, binds);
    let data = q.fetch_one(&mut **tx).await?;
    Ok(data)
}
