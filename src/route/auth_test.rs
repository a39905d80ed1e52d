use poem::{http::StatusCode, test::TestClient};
use serde_json::json;
use sqlx::PgPool;
use tempfile::TempDir;

use crate::{
    core::{
        otp::{get_code, MAX_ATTEMPTS},
        security::get_user_from_token,
        session::{get_refresh_owner, get_session},
        test_utils::{generate_test_user, test_app_state, test_config},
    },
    init_openapi_route,
    repository::user::get_user_by_email,
};

async fn signup(cli: &TestClient<impl poem::Endpoint>, email: &str) {
    cli.post("/api/auth/signup")
        .body_json(&json!({
            "first_name": "Ada",
            "last_name": "Okafor",
            "email": email,
            "password": "secret1",
            "confirm_password": "secret1"
        }))
        .send()
        .await
        .assert_status(StatusCode::CREATED);
}

fn other_code(code: &str) -> &'static str {
    if code == "000000" {
        "111111"
    } else {
        "000000"
    }
}

async fn is_verified(pool: &PgPool, email: &str) -> anyhow::Result<bool> {
    let mut tx = pool.begin().await?;
    let user = get_user_by_email(&mut tx, email).await?;
    Ok(user.map(|item| item.is_verified).unwrap_or(false))
}

#[sqlx::test]
async fn test_signup_verify_then_login(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let storage = TempDir::new()?;
    let app_state = test_app_state(pool, &config, storage.path())?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When signup
    let resp = cli
        .post("/api/auth/signup")
        .body_json(&json!({
            "first_name": "Ada",
            "last_name": "Okafor",
            "email": "Ada@Example.com",
            "password": "secret1",
            "confirm_password": "secret1"
        }))
        .send()
        .await;

    // Expect signup
    resp.assert_status(StatusCode::CREATED);
    let json = resp.json().await;
    json.value().object().get("email").assert_string("ada@example.com");
    let profile: (Option<String>, i32) =
        sqlx::query_as("SELECT first_name, total_points FROM public.profiles")
            .fetch_one(&app_state.db)
            .await?;
    assert_eq!(profile, (Some("Ada".to_string()), 0));

    // When login before verification
    let login_payload = json!({"email": "ada@example.com", "password": "secret1"});
    let resp = cli
        .post("/api/auth/login")
        .body_json(&login_payload)
        .send()
        .await;

    // Expect refused
    resp.assert_status(StatusCode::FORBIDDEN);

    // When verify with a wrong code then the issued one
    let mut redis_conn = app_state.redis_conn.get()?;
    let code = get_code(&mut redis_conn, "ada@example.com")?;
    assert!(code.is_some());
    let code = code.unwrap_or_default();
    let wrong_code = if code == "000000" { "111111" } else { "000000" };
    let resp = cli
        .post("/api/auth/verify")
        .body_json(&json!({"email": "ada@example.com", "code": wrong_code}))
        .send()
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    let resp = cli
        .post("/api/auth/verify")
        .body_json(&json!({"email": "ada@example.com", "code": code}))
        .send()
        .await;
    resp.assert_status_is_ok();
    assert!(get_code(&mut redis_conn, "ada@example.com")?.is_none());

    // When login
    let resp = cli
        .post("/api/auth/login")
        .body_json(&login_payload)
        .send()
        .await;

    // Expect login
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let token: String = json.value().object().get("token").deserialize();
    json.value().object().get("role").assert_string("user");
    let mut tx = app_state.db.begin().await?;
    let user_in_token = get_user_from_token(&mut tx, &mut redis_conn, Some(token)).await?;
    assert_eq!(
        user_in_token.map(|item| item.email),
        Some("ada@example.com".to_string())
    );
    Ok(())
}

#[sqlx::test]
async fn test_signup_rejects_mismatched_passwords(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let storage = TempDir::new()?;
    let app_state = test_app_state(pool, &config, storage.path())?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .post("/api/auth/signup")
        .body_json(&json!({
            "email": "mismatch@example.com",
            "password": "secret1",
            "confirm_password": "secret2"
        }))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);
    resp.assert_json(json!({"message": "Passwords do not match"}))
        .await;
    let mut tx = app_state.db.begin().await?;
    assert!(get_user_by_email(&mut tx, "mismatch@example.com")
        .await?
        .is_none());
    Ok(())
}

#[sqlx::test]
async fn test_signup_short_password_and_duplicate(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let storage = TempDir::new()?;
    let app_state = test_app_state(pool, &config, storage.path())?;
    let mut db = app_state.db.acquire().await?;
    let mut redis_conn = app_state.redis_conn.get()?;
    generate_test_user(
        &mut db,
        &mut redis_conn,
        &config,
        "taken@example.com",
        "password",
    )
    .await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When password too short
    let resp = cli
        .post("/api/auth/signup")
        .body_json(&json!({
            "email": "short@example.com",
            "password": "abc",
            "confirm_password": "abc"
        }))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);
    resp.assert_json(json!({"message": "Password must be at least 6 characters long"}))
        .await;

    // When email already registered
    let resp = cli
        .post("/api/auth/signup")
        .body_json(&json!({
            "email": "taken@example.com",
            "password": "secret1",
            "confirm_password": "secret1"
        }))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);
    Ok(())
}

#[sqlx::test]
async fn test_login_wrong_password(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let storage = TempDir::new()?;
    let app_state = test_app_state(pool, &config, storage.path())?;
    let mut db = app_state.db.acquire().await?;
    let mut redis_conn = app_state.redis_conn.get()?;
    generate_test_user(&mut db, &mut redis_conn, &config, "a@example.com", "password").await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .post("/api/auth/login")
        .body_json(&json!({"email": "a@example.com", "password": "wrong-password"}))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);
    resp.assert_json(json!({"message": "Invalid credentials"}))
        .await;
    Ok(())
}

#[sqlx::test]
async fn test_refresh_rotates_token(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let storage = TempDir::new()?;
    let app_state = test_app_state(pool, &config, storage.path())?;
    let mut db = app_state.db.acquire().await?;
    let mut redis_conn = app_state.redis_conn.get()?;
    let test_user = generate_test_user(
        &mut db,
        &mut redis_conn,
        &config,
        "refresh@example.com",
        "password",
    )
    .await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When refresh
    let payload = json!({"refresh_token": test_user.refresh_token});
    let resp = cli
        .post("/api/auth/refresh-token")
        .body_json(&payload)
        .send()
        .await;

    // Expect new pair, old refresh token revoked
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let new_refresh_token: String = json.value().object().get("refresh_token").deserialize();
    assert_ne!(new_refresh_token, test_user.refresh_token);
    assert!(get_refresh_owner(&mut redis_conn, &test_user.refresh_token)?.is_none());
    assert_eq!(
        get_refresh_owner(&mut redis_conn, &new_refresh_token)?,
        Some(test_user.user.id.to_string())
    );

    // When the old refresh token is replayed
    let resp = cli
        .post("/api/auth/refresh-token")
        .body_json(&payload)
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::UNAUTHORIZED);

    // When garbage
    let resp = cli
        .post("/api/auth/refresh-token")
        .body_json(&json!({"refresh_token": "not-a-token"}))
        .send()
        .await;
    resp.assert_status(StatusCode::UNAUTHORIZED);
    Ok(())
}

#[sqlx::test]
async fn test_logout(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let storage = TempDir::new()?;
    let app_state = test_app_state(pool, &config, storage.path())?;
    let mut db = app_state.db.acquire().await?;
    let mut redis_conn = app_state.redis_conn.get()?;
    let test_user = generate_test_user(
        &mut db,
        &mut redis_conn,
        &config,
        "logout@example.com",
        "password",
    )
    .await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When logout
    let resp = cli
        .post("/api/auth/logout")
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect logout
    resp.assert_status(StatusCode::NO_CONTENT);
    assert!(get_session(&mut redis_conn, test_user.token.clone())?.is_none());
    assert!(get_refresh_owner(&mut redis_conn, &test_user.refresh_token)?.is_none());

    // When second logout
    let resp = cli
        .post("/api/auth/logout")
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect second logout
    resp.assert_status(StatusCode::UNAUTHORIZED);
    Ok(())
}

#[sqlx::test]
async fn test_verify_wrong_or_expired_code(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let storage = TempDir::new()?;
    let app_state = test_app_state(pool, &config, storage.path())?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);
    signup(&cli, "late@example.com").await;
    let mut redis_conn = app_state.redis_conn.get()?;
    let code = get_code(&mut redis_conn, "late@example.com")?.unwrap_or_default();

    // When wrong code
    let resp = cli
        .post("/api/auth/verify")
        .body_json(&json!({"email": "late@example.com", "code": other_code(&code)}))
        .send()
        .await;

    // Expect rejected, code kept
    resp.assert_status(StatusCode::BAD_REQUEST);
    resp.assert_json(json!({"message": "Invalid or expired verification code"}))
        .await;
    assert!(!is_verified(&app_state.db, "late@example.com").await?);
    assert_eq!(get_code(&mut redis_conn, "late@example.com")?, Some(code.clone()));

    // When the code has expired
    redis::cmd("del")
        .arg("otp:late@example.com")
        .exec(&mut *redis_conn)?;
    let resp = cli
        .post("/api/auth/verify")
        .body_json(&json!({"email": "late@example.com", "code": code}))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);
    assert!(!is_verified(&app_state.db, "late@example.com").await?);
    Ok(())
}

#[sqlx::test]
async fn test_verify_discards_code_after_too_many_attempts(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let storage = TempDir::new()?;
    let app_state = test_app_state(pool, &config, storage.path())?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);
    signup(&cli, "guess@example.com").await;
    let mut redis_conn = app_state.redis_conn.get()?;
    let code = get_code(&mut redis_conn, "guess@example.com")?.unwrap_or_default();

    // When guessing repeatedly
    for _ in 0..MAX_ATTEMPTS {
        cli.post("/api/auth/verify")
            .body_json(&json!({"email": "guess@example.com", "code": other_code(&code)}))
            .send()
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    // Expect the real code no longer works
    assert!(get_code(&mut redis_conn, "guess@example.com")?.is_none());
    let resp = cli
        .post("/api/auth/verify")
        .body_json(&json!({"email": "guess@example.com", "code": code}))
        .send()
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    assert!(!is_verified(&app_state.db, "guess@example.com").await?);

    // When a new code is requested
    cli.post("/api/auth/resend")
        .body_json(&json!({"email": "guess@example.com"}))
        .send()
        .await
        .assert_status_is_ok();
    let new_code = get_code(&mut redis_conn, "guess@example.com")?.unwrap_or_default();
    let resp = cli
        .post("/api/auth/verify")
        .body_json(&json!({"email": "guess@example.com", "code": new_code}))
        .send()
        .await;

    // Expect attempts reset and verification succeeds
    resp.assert_status_is_ok();
    assert!(is_verified(&app_state.db, "guess@example.com").await?);
    Ok(())
}

#[sqlx::test]
async fn test_resend_code(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let storage = TempDir::new()?;
    let app_state = test_app_state(pool, &config, storage.path())?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);
    signup(&cli, "again@example.com").await;
    let mut redis_conn = app_state.redis_conn.get()?;
    let old_code = get_code(&mut redis_conn, "again@example.com")?.unwrap_or_default();

    // When
    let resp = cli
        .post("/api/auth/resend")
        .body_json(&json!({"email": "again@example.com"}))
        .send()
        .await;

    // Expect a new code replaces the old one
    resp.assert_status_is_ok();
    let new_code = get_code(&mut redis_conn, "again@example.com")?.unwrap_or_default();
    assert_ne!(new_code, old_code);
    cli.post("/api/auth/verify")
        .body_json(&json!({"email": "again@example.com", "code": old_code}))
        .send()
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    cli.post("/api/auth/verify")
        .body_json(&json!({"email": "again@example.com", "code": new_code}))
        .send()
        .await
        .assert_status_is_ok();

    // When already verified
    let resp = cli
        .post("/api/auth/resend")
        .body_json(&json!({"email": "again@example.com"}))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);
    resp.assert_json(json!({"message": "Email already verified"}))
        .await;
    assert!(get_code(&mut redis_conn, "again@example.com")?.is_none());

    // When unknown email
    let resp = cli
        .post("/api/auth/resend")
        .body_json(&json!({"email": "nobody@example.com"}))
        .send()
        .await;

    // Expect same answer as a known account
    resp.assert_status_is_ok();
    assert!(get_code(&mut redis_conn, "nobody@example.com")?.is_none());
    Ok(())
}
