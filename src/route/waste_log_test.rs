use poem::{http::StatusCode, test::TestClient};
use serde_json::json;
use sqlx::PgPool;
use tempfile::TempDir;
use uuid::Uuid;

use crate::{
    core::test_utils::{generate_test_user, test_app_state, test_config},
    factory::waste_log::WasteLogFactory,
    init_openapi_route,
    model::waste_log::WasteLog,
};

#[sqlx::test]
async fn test_create_waste_log_credits_points(pool: PgPool) -> anyhow::Result<()> {
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
        "logger@example.com",
        "password",
    )
    .await?;
    let mut feed = app_state.profile_feed.subscribe();
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .post("/api/waste-log/")
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({
            "waste_type": "Metal",
            "amount": 5.2,
            "notes": "cans",
            "collection_date": "2025-06-01",
            "collection_time": "10:30"
        }))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::CREATED);
    let json = resp.json().await;
    json.value().object().get("total_points").assert_i64(78);
    let waste_log = json.value().object().get("waste_log").object();
    waste_log.get("waste_type").assert_string("metal");
    waste_log.get("points_earned").assert_i64(78);
    let points: (i32,) = sqlx::query_as("SELECT total_points FROM public.profiles WHERE id = $1")
        .bind(test_user.user.id)
        .fetch_one(&app_state.db)
        .await?;
    assert_eq!(points.0, 78);
    let published = feed.try_recv()?;
    assert_eq!(published.id, test_user.user.id);
    assert_eq!(published.total_points, 78);
    Ok(())
}

#[sqlx::test]
async fn test_create_waste_log_in_pounds(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let storage = TempDir::new()?;
    let app_state = test_app_state(pool, &config, storage.path())?;
    let mut db = app_state.db.acquire().await?;
    let mut redis_conn = app_state.redis_conn.get()?;
    let test_user =
        generate_test_user(&mut db, &mut redis_conn, &config, "lb@example.com", "password")
            .await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When 10 lb of plastic, about 4.54 kg
    let resp = cli
        .post("/api/waste-log/")
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({"waste_type": "plastic", "amount": 10.0, "unit": "lb"}))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::CREATED);
    let json = resp.json().await;
    json.value().object().get("total_points").assert_i64(45);
    Ok(())
}

#[sqlx::test]
async fn test_create_waste_log_rejects_bad_amount(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let storage = TempDir::new()?;
    let app_state = test_app_state(pool, &config, storage.path())?;
    let mut db = app_state.db.acquire().await?;
    let mut redis_conn = app_state.redis_conn.get()?;
    let test_user =
        generate_test_user(&mut db, &mut redis_conn, &config, "zero@example.com", "password")
            .await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    for payload in [
        json!({"waste_type": "paper", "amount": 0.0}),
        json!({"waste_type": "paper", "amount": -2.0}),
        json!({"waste_type": "  ", "amount": 2.0}),
        json!({"waste_type": "paper", "amount": 2.0, "collection_time": "noon"}),
    ] {
        // When
        let resp = cli
            .post("/api/waste-log/")
            .header("authorization", format!("Bearer {}", test_user.token))
            .body_json(&payload)
            .send()
            .await;

        // Expect
        resp.assert_status(StatusCode::BAD_REQUEST);
    }
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM public.waste_logs")
        .fetch_one(&app_state.db)
        .await?;
    assert_eq!(count.0, 0);
    let points: (i32,) = sqlx::query_as("SELECT total_points FROM public.profiles WHERE id = $1")
        .bind(test_user.user.id)
        .fetch_one(&app_state.db)
        .await?;
    assert_eq!(points.0, 0);
    Ok(())
}

#[sqlx::test]
async fn test_create_waste_log_unauthorized(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let storage = TempDir::new()?;
    let app_state = test_app_state(pool, &config, storage.path())?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .post("/api/waste-log/")
        .header("authorization", "Bearer not-a-token")
        .body_json(&json!({"waste_type": "paper", "amount": 2.0}))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::UNAUTHORIZED);
    Ok(())
}

#[sqlx::test]
async fn test_list_waste_logs_only_own(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let storage = TempDir::new()?;
    let app_state = test_app_state(pool, &config, storage.path())?;
    let mut db = app_state.db.acquire().await?;
    let mut redis_conn = app_state.redis_conn.get()?;
    let test_user =
        generate_test_user(&mut db, &mut redis_conn, &config, "mine@example.com", "password")
            .await?;
    let other_user =
        generate_test_user(&mut db, &mut redis_conn, &config, "other@example.com", "password")
            .await?;
    let mut factory = WasteLogFactory::<Uuid>::new();
    factory.modified_many(|data, _, user_id| WasteLog {
        user_id,
        ..data.clone()
    });
    factory
        .generate_many(&app_state.db, 7, test_user.user.id)
        .await?;
    factory
        .generate_many(&app_state.db, 3, other_user.user.id)
        .await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .get("/api/waste-log/")
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    let json = resp.json().await;
    assert_eq!(json.value().array().len(), 7);

    // When limited
    let resp = cli
        .get("/api/waste-log/")
        .query("limit", &5)
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect limited
    resp.assert_status_is_ok();
    let json = resp.json().await;
    assert_eq!(json.value().array().len(), 5);
    Ok(())
}

#[sqlx::test]
async fn test_points_preview(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let storage = TempDir::new()?;
    let app_state = test_app_state(pool, &config, storage.path())?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .get("/api/waste-log/points")
        .query("waste_type", &"glass")
        .query("amount", &2.5)
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    resp.assert_json(json!({
        "waste_type": "glass",
        "amount_kg": 2.5,
        "rate": 12,
        "points": 30
    }))
    .await;

    // When unknown category
    let resp = cli
        .get("/api/waste-log/points")
        .query("waste_type", &"textile")
        .query("amount", &3.0)
        .send()
        .await;

    // Expect default rate
    resp.assert_status_is_ok();
    let json = resp.json().await;
    json.value().object().get("points").assert_i64(15);

    // When zero
    let resp = cli
        .get("/api/waste-log/points")
        .query("waste_type", &"glass")
        .query("amount", &0.0)
        .send()
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    Ok(())
}

#[sqlx::test]
async fn test_list_waste_types(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let storage = TempDir::new()?;
    let app_state = test_app_state(pool, &config, storage.path())?;
    crate::cli::seed::seed(&app_state.db).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli.get("/api/waste-type/").send().await;

    // Expect
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let rates: Vec<(String, i64)> = json
        .value()
        .array()
        .iter()
        .map(|item| {
            let item = item.object();
            (
                item.get("name").string().to_string(),
                item.get("points_per_kg").i64(),
            )
        })
        .collect();
    assert_eq!(rates.len(), 6);
    assert_eq!(rates[0], ("electronic".to_string(), 20));
    assert!(rates.contains(&("metal".to_string(), 15)));
    Ok(())
}
