use poem::{http::StatusCode, test::TestClient};
use serde_json::json;
use sqlx::PgPool;
use tempfile::TempDir;

use crate::{
    core::test_utils::{test_app_state, test_config},
    init_openapi_route,
};

#[sqlx::test]
async fn test_contact_message(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let storage = TempDir::new()?;
    let app_state = test_app_state(pool, &config, storage.path())?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .post("/api/contact/")
        .body_json(&json!({
            "name": " Jo Park ",
            "email": "jo@example.com",
            "message": "Do you collect batteries?"
        }))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::CREATED);
    resp.assert_json(json!({"message": "Thanks for reaching out, we will get back to you soon"}))
        .await;
    let stored: (String, String) = sqlx::query_as("SELECT name, message FROM public.contact_messages")
        .fetch_one(&app_state.db)
        .await?;
    assert_eq!(
        stored,
        ("Jo Park".to_string(), "Do you collect batteries?".to_string())
    );
    Ok(())
}

#[sqlx::test]
async fn test_contact_message_incomplete(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let storage = TempDir::new()?;
    let app_state = test_app_state(pool, &config, storage.path())?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    for payload in [
        json!({"name": "", "email": "jo@example.com", "message": "hi"}),
        json!({"name": "Jo", "email": "not-an-email", "message": "hi"}),
        json!({"name": "Jo", "email": "jo@example.com", "message": "   "}),
    ] {
        // When
        let resp = cli.post("/api/contact/").body_json(&payload).send().await;

        // Expect
        resp.assert_status(StatusCode::BAD_REQUEST);
    }
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM public.contact_messages")
        .fetch_one(&app_state.db)
        .await?;
    assert_eq!(count.0, 0);
    Ok(())
}
