use chrono::{DateTime, FixedOffset, Local};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::sqlx_utils::{binds_query_as, query_builder, SqlxBinds},
    model::user::{User, TABLE_NAME},
};

pub async fn get_user_by_id(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
) -> anyhow::Result<Option<User>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::Uuid(*id)];
    let filters: Vec<String> = vec!["id = $1".to_string(), "deleted_date IS NULL".to_string()];
    let stmt = query_builder(None, TABLE_NAME, &filters, vec![], None, None);
    let q = binds_query_as::<User>(&stmt, binds);
    let data = q.fetch_optional(&mut **tx).await?;
    Ok(data)
}

/// Emails are matched case-insensitively.
pub async fn get_user_by_email(
    tx: &mut Transaction<'_, Postgres>,
    email: &str,
) -> anyhow::Result<Option<User>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::String(email.trim().to_lowercase())];
    let filters: Vec<String> = vec![
        "email = $1".to_string(),
        "deleted_date IS NULL".to_string(),
    ];
    let stmt = query_builder(None, TABLE_NAME, &filters, vec![], None, None);
    let q = binds_query_as::<User>(&stmt, binds);
    let data = q.fetch_optional(&mut **tx).await?;
    Ok(data)
}

pub async fn create_user(
    tx: &mut Transaction<'_, Postgres>,
    email: &str,
    hashed_password: String,
    role: &str,
    is_verified: bool,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<User> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    let user = User {
        id: Uuid::now_v7(),
        email: email.trim().to_lowercase(),
        password: hashed_password,
        role: role.to_string(),
        is_verified,
        created_date: Some(now),
        updated_date: Some(now),
        deleted_date: None,
    };
    sqlx::query(
        format!(
            r#"
    INSERT INTO {} (id, email, password, role, is_verified, created_date, updated_date)
    VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(user.id)
    .bind(&user.email)
    .bind(&user.password)
    .bind(&user.role)
    .bind(user.is_verified)
    .bind(user.created_date)
    .bind(user.updated_date)
    .execute(&mut **tx)
    .await?;
    Ok(user)
}

pub async fn mark_user_verified(
    tx: &mut Transaction<'_, Postgres>,
    user: &mut User,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<()> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    user.is_verified = true;
    user.updated_date = Some(now);
    sqlx::query(
        format!(
            r#"UPDATE {} SET is_verified = TRUE, updated_date = $1 WHERE id = $2"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(user.updated_date)
    .bind(user.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
