use poem::{http::StatusCode, test::TestClient};
use sqlx::PgPool;
use tempfile::TempDir;
use uuid::Uuid;

use crate::{
    core::test_utils::{generate_test_user, test_app_state, test_config},
    factory::notification::NotificationFactory,
    init_openapi_route,
    model::notification::Notification,
};

#[sqlx::test]
async fn test_list_notifications(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let storage = TempDir::new()?;
    let app_state = test_app_state(pool, &config, storage.path())?;
    let mut db = app_state.db.acquire().await?;
    let mut redis_conn = app_state.redis_conn.get()?;
    let test_user =
        generate_test_user(&mut db, &mut redis_conn, &config, "inbox@example.com", "password")
            .await?;
    let other_user =
        generate_test_user(&mut db, &mut redis_conn, &config, "other@example.com", "password")
            .await?;
    let mut factory = NotificationFactory::<Uuid>::new();
    factory.modified_many(|data, idx, user_id| Notification {
        user_id,
        is_read: idx % 2 == 0,
        ..data.clone()
    });
    factory
        .generate_many(&app_state.db, 5, test_user.user.id)
        .await?;
    factory
        .generate_many(&app_state.db, 4, other_user.user.id)
        .await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When all
    let resp = cli
        .get("/api/notification/")
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect all
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let body = json.value().object();
    body.get("unread_count").assert_i64(2);
    assert_eq!(body.get("results").array().len(), 5);

    // When unread only
    let resp = cli
        .get("/api/notification/")
        .query("unread_only", &true)
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect unread only
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let body = json.value().object();
    body.get("unread_count").assert_i64(2);
    let results = body.get("results").array();
    assert_eq!(results.len(), 2);
    for item in results.iter() {
        item.object().get("is_read").assert_bool(false);
    }
    Ok(())
}

#[sqlx::test]
async fn test_mark_notification_read(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let storage = TempDir::new()?;
    let app_state = test_app_state(pool, &config, storage.path())?;
    let mut db = app_state.db.acquire().await?;
    let mut redis_conn = app_state.redis_conn.get()?;
    let test_user =
        generate_test_user(&mut db, &mut redis_conn, &config, "read@example.com", "password")
            .await?;
    let other_user =
        generate_test_user(&mut db, &mut redis_conn, &config, "nosy@example.com", "password")
            .await?;
    let mut factory = NotificationFactory::<Uuid>::new();
    factory.modified_one(|data, user_id| Notification {
        user_id,
        ..data.clone()
    });
    let notification = factory.generate_one(&app_state.db, test_user.user.id).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When someone else marks it
    let resp = cli
        .post(format!("/api/notification/{}/read", notification.id))
        .header("authorization", format!("Bearer {}", other_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::NOT_FOUND);

    // When the owner marks it
    let resp = cli
        .post(format!("/api/notification/{}/read", notification.id))
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    let json = resp.json().await;
    json.value().object().get("is_read").assert_bool(true);
    let read_at: Option<String> = json.value().object().get("read_at").deserialize();
    assert!(read_at.is_some());

    // When marked again
    let resp = cli
        .post(format!("/api/notification/{}/read", notification.id))
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect first read time kept
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let read_again: Option<String> = json.value().object().get("read_at").deserialize();
    assert_eq!(read_again, read_at);
    Ok(())
}
