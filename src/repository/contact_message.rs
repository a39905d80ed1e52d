use chrono::{DateTime, FixedOffset, Local};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::model::contact_message::{ContactMessage, TABLE_NAME};

pub async fn create_contact_message(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
    email: &str,
    message: &str,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<ContactMessage> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    let contact_message = ContactMessage {
        id: Uuid::now_v7(),
        name: name.trim().to_string(),
        email: email.trim().to_string(),
        message: message.trim().to_string(),
        created_at: now,
    };
    sqlx::query(
        format!(
            r#"
    INSERT INTO {} (id, name, email, message, created_at)
    VALUES ($1, $2, $3, $4, $5)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(contact_message.id)
    .bind(&contact_message.name)
    .bind(&contact_message.email)
    .bind(&contact_message.message)
    .bind(contact_message.created_at)
    .execute(&mut **tx)
    .await?;
    Ok(contact_message)
}
