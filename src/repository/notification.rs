use chrono::{DateTime, FixedOffset, Local};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::sqlx_utils::{binds_query, binds_query_as, query_builder, SqlxBinds},
    model::notification::{Notification, TABLE_NAME},
};

pub async fn create_notification(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &Uuid,
    message: String,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<Notification> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    let notification = Notification {
        id: Uuid::now_v7(),
        user_id: *user_id,
        message,
        is_read: false,
        sent_at: now,
        read_at: None,
    };
    let stmt = format!(
        r#"INSERT INTO {} (id, user_id, message, is_read, sent_at)
    VALUES ($1, $2, $3, $4, $5)"#,
        TABLE_NAME
    );
    binds_query(
        &stmt,
        vec![
            SqlxBinds::Uuid(notification.id),
            SqlxBinds::Uuid(notification.user_id),
            SqlxBinds::String(notification.message.clone()),
            SqlxBinds::Bool(notification.is_read),
            SqlxBinds::DateTimeFixedOffset(notification.sent_at),
        ],
    )
    .execute(&mut **tx)
    .await?;
    Ok(notification)
}

/// Newest first; `unread_only` drops read notifications.
pub async fn get_notifications(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &Uuid,
    unread_only: bool,
) -> anyhow::Result<Vec<Notification>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::Uuid(*user_id)];
    let mut filters: Vec<String> = vec!["user_id = $1".to_string()];
    if unread_only {
        filters.push("is_read = FALSE".to_string());
    }
    let stmt = query_builder(
        None,
        TABLE_NAME,
        &filters,
        vec!["sent_at DESC".to_string()],
        None,
        None,
    );
    let q = binds_query_as::<Notification>(&stmt, binds);
    let data = q.fetch_all(&mut **tx).await?;
    Ok(data)
}

pub async fn get_notification_by_id(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
) -> anyhow::Result<Option<Notification>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::Uuid(*id)];
    let stmt = query_builder(
        None,
        TABLE_NAME,
        &["id = $1".to_string()],
        vec![],
        None,
        None,
    );
    let q = binds_query_as::<Notification>(&stmt, binds);
    let data = q.fetch_optional(&mut **tx).await?;
    Ok(data)
}

/// Keeps the first read timestamp when called again.
pub async fn mark_notification_read(
    tx: &mut Transaction<'_, Postgres>,
    notification: &mut Notification,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<()> {
    if notification.is_read {
        return Ok(());
    }
    let now = now.unwrap_or(Local::now().fixed_offset());
    notification.is_read = true;
    notification.read_at = Some(now);
    let stmt = format!(
        r#"UPDATE {} SET is_read = TRUE, read_at = $1 WHERE id = $2"#,
        TABLE_NAME
    );
    binds_query(
        &stmt,
        vec![
            SqlxBinds::DateTimeFixedOffset(now),
            SqlxBinds::Uuid(notification.id),
        ],
    )
    .execute(&mut **tx)
    .await?;
    Ok(())
}
