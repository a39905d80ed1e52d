use chrono::Local;
use sqlx::PgPool;

use crate::{
    core::{security::hash_password, validation::validate_email},
    model::{
        profile::Profile,
        user::{User, ROLE_ADMIN, ROLE_USER},
    },
    repository::{
        profile::upsert_profile,
        user::{create_user as insert_user, get_user_by_email},
    },
};

/// Creates a verified account with an empty profile.
pub async fn create_user(
    pool: &PgPool,
    email: &str,
    password: &str,
    admin: bool,
) -> anyhow::Result<User> {
    validate_email(email).map_err(anyhow::Error::msg)?;
    let mut tx = pool.begin().await?;
    if get_user_by_email(&mut tx, email).await?.is_some() {
        anyhow::bail!("user {email} already exists");
    }

    let hashed_password = hash_password(password).map_err(|err| anyhow::anyhow!("{err}"))?;
    let now = Local::now().fixed_offset();
    let role = if admin { ROLE_ADMIN } else { ROLE_USER };
    let user = insert_user(&mut tx, email, hashed_password, role, true, Some(now)).await?;
    upsert_profile(&mut tx, &Profile::new(user.id, now)).await?;
    tx.commit().await?;
    Ok(user)
}
