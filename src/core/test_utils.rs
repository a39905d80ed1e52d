use std::{path::Path, sync::Arc};

use chrono::Local;
use redis::ConnectionLike;
use sqlx::{pool::PoolConnection, PgPool, Postgres};
use uuid::Uuid;

use super::security::{generate_refresh_token_from_user, generate_token_from_user};
use crate::{
    core::{
        realtime::ProfileFeed, security::hash_password, session::add_session,
        storage::ObjectStorage,
    },
    model::{
        profile::Profile,
        user::{User, ROLE_ADMIN, ROLE_USER},
    },
    settings::{get_config, Config},
    AppState,
};

/// Config with the `/api` prefix the route tests call.
pub fn test_config() -> Config {
    let mut config = get_config();
    config.prefix = Some("/api".to_string());
    config
}

/// Application state over the test database, with object storage under `storage_root`.
pub fn test_app_state(
    pool: PgPool,
    config: &Config,
    storage_root: &Path,
) -> anyhow::Result<Arc<AppState>> {
    let client = redis::Client::open(config.redis_url.clone())?;
    let redis_pool = r2d2::Pool::builder().build(client)?;
    Ok(Arc::new(AppState {
        db: pool,
        redis_conn: redis_pool,
        storage: ObjectStorage::new(storage_root, &config.storage_public_url),
        profile_feed: ProfileFeed::new(),
        config: config.clone(),
    }))
}

pub struct TestUser {
    pub user: User,
    pub profile: Profile,
    pub token: String,
    pub refresh_token: String,
}

/// Verified user with an empty profile and a live session.
pub async fn generate_test_user<C: ConnectionLike>(
    db: &mut PoolConnection<Postgres>,
    redis_conn: &mut C,
    config: &Config,
    email: &str,
    password: &str,
) -> anyhow::Result<TestUser> {
    insert_test_user(db, redis_conn, config, email, password, ROLE_USER).await
}

pub async fn generate_test_admin<C: ConnectionLike>(
    db: &mut PoolConnection<Postgres>,
    redis_conn: &mut C,
    config: &Config,
    email: &str,
    password: &str,
) -> anyhow::Result<TestUser> {
    insert_test_user(db, redis_conn, config, email, password, ROLE_ADMIN).await
}

async fn insert_test_user<C: ConnectionLike>(
    db: &mut PoolConnection<Postgres>,
    redis_conn: &mut C,
    config: &Config,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<TestUser> {
    // Prepare user
    let hashed_password = hash_password(password).map_err(|err| anyhow::anyhow!("{err}"))?;
    let now = Local::now().fixed_offset();
    let user = User {
        id: Uuid::now_v7(),
        email: email.to_lowercase(),
        password: hashed_password,
        role: role.to_string(),
        is_verified: true,
        created_date: Some(now),
        updated_date: Some(now),
        deleted_date: None,
    };
    let profile = Profile::new(user.id, now);

    // create user on db
    sqlx::query(
        r#"
        INSERT INTO public.user (id, email, password, role, is_verified, created_date, updated_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(user.id)
    .bind(&user.email)
    .bind(&user.password)
    .bind(&user.role)
    .bind(user.is_verified)
    .bind(user.created_date)
    .bind(user.updated_date)
    .execute(&mut **db)
    .await?;
    sqlx::query(
        r#"
        INSERT INTO public.profiles (id, total_points, created_date, updated_date)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(profile.id)
    .bind(profile.total_points)
    .bind(profile.created_date)
    .bind(profile.updated_date)
    .execute(&mut **db)
    .await?;

    // Generate token
    let token = generate_token_from_user(&user, config)?;
    let refresh_token = generate_refresh_token_from_user(&user, config)?;
    add_session(redis_conn, &user, config, &token, &refresh_token)?;

    Ok(TestUser {
        user,
        profile,
        token,
        refresh_token,
    })
}

#[cfg(test)]
mod tests {
    use sqlx::{Acquire, PgPool};
    use uuid::Uuid;

    use crate::core::{
        security::get_user_from_token,
        session::get_session,
        test_utils::{generate_test_admin, generate_test_user, test_config},
    };

    #[sqlx::test]
    async fn test_generate_test_user(pool: PgPool) -> anyhow::Result<()> {
        // Given
        let config = test_config();
        let client = redis::Client::open(config.redis_url.clone()).unwrap();
        let mut redis_conn = client.get_connection().unwrap();

        // When
        let mut db = pool.acquire().await?;
        let res = generate_test_user(
            &mut db,
            &mut redis_conn,
            &config,
            "Tester@Example.com",
            "testpassword",
        )
        .await?;

        // Expect
        // is user exists on db
        let user: Option<(Uuid, String, bool)> =
            sqlx::query_as("SELECT id, email, is_verified FROM public.user WHERE id = $1")
                .bind(res.user.id)
                .fetch_optional(&mut *db)
                .await?;
        assert_eq!(
            user,
            Some((res.user.id, "tester@example.com".to_string(), true))
        );
        let profile: Option<(Uuid, i32)> =
            sqlx::query_as("SELECT id, total_points FROM public.profiles WHERE id = $1")
                .bind(res.user.id)
                .fetch_optional(&mut *db)
                .await?;
        assert_eq!(profile, Some((res.user.id, 0)));

        // is jwt token valid
        let mut tx = db.begin().await?;
        let user_token =
            get_user_from_token(&mut tx, &mut redis_conn, Some(res.token.clone())).await?;
        assert_eq!(user_token.map(|item| item.id), Some(res.user.id));

        // is user exists on redis
        let session = get_session(&mut redis_conn, res.token)?;
        assert!(session.is_some());
        Ok(())
    }

    #[sqlx::test]
    async fn test_generate_test_admin(pool: PgPool) -> anyhow::Result<()> {
        let config = test_config();
        let client = redis::Client::open(config.redis_url.clone()).unwrap();
        let mut redis_conn = client.get_connection().unwrap();
        let mut db = pool.acquire().await?;

        let res =
            generate_test_admin(&mut db, &mut redis_conn, &config, "admin@example.com", "pw")
                .await?;

        assert!(res.user.is_admin());
        Ok(())
    }
}
