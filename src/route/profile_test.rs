use std::time::Duration;

use futures_util::StreamExt;
use poem::{
    http::StatusCode,
    test::{TestClient, TestForm, TestFormField},
};
use serde_json::json;
use sqlx::PgPool;
use tempfile::TempDir;

use crate::{
    core::{
        storage::Bucket,
        test_utils::{generate_test_user, test_app_state, test_config},
    },
    init_openapi_route,
};

const PNG_BYTES: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

#[sqlx::test]
async fn test_get_profile(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let storage = TempDir::new()?;
    let app_state = test_app_state(pool, &config, storage.path())?;
    let mut db = app_state.db.acquire().await?;
    let mut redis_conn = app_state.redis_conn.get()?;
    let test_user =
        generate_test_user(&mut db, &mut redis_conn, &config, "me@example.com", "password")
            .await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .get("/api/profile/")
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let body = json.value().object();
    body.get("id").assert_string(&test_user.user.id.to_string());
    body.get("email").assert_string("me@example.com");
    body.get("total_points").assert_i64(0);
    Ok(())
}

#[sqlx::test]
async fn test_update_profile_reaches_own_feed_only(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let storage = TempDir::new()?;
    let app_state = test_app_state(pool, &config, storage.path())?;
    let mut db = app_state.db.acquire().await?;
    let mut redis_conn = app_state.redis_conn.get()?;
    let test_user =
        generate_test_user(&mut db, &mut redis_conn, &config, "upd@example.com", "password")
            .await?;
    let other_user =
        generate_test_user(&mut db, &mut redis_conn, &config, "quiet@example.com", "password")
            .await?;
    let mut own_changes = Box::pin(app_state.profile_feed.watch(test_user.user.id));
    let mut other_changes = Box::pin(app_state.profile_feed.watch(other_user.user.id));
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .put("/api/profile/")
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({
            "first_name": " Ada ",
            "nickname": "",
            "phone": "+233 20 000 0000"
        }))
        .send()
        .await;

    // Expect blanks leave fields untouched
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let body = json.value().object();
    body.get("first_name").assert_string("Ada");
    body.get("nickname").assert_null();
    body.get("phone").assert_string("+233 20 000 0000");
    let stored: (Option<String>, Option<String>) =
        sqlx::query_as("SELECT first_name, nickname FROM public.profiles WHERE id = $1")
            .bind(test_user.user.id)
            .fetch_one(&app_state.db)
            .await?;
    assert_eq!(stored, (Some("Ada".to_string()), None));

    // Expect change on own feed only
    let change = tokio::time::timeout(Duration::from_secs(1), own_changes.next()).await?;
    assert_eq!(change.and_then(|item| item.first_name), Some("Ada".to_string()));
    let silent = tokio::time::timeout(Duration::from_millis(100), other_changes.next()).await;
    assert!(silent.is_err());
    Ok(())
}

#[sqlx::test]
async fn test_onboarding(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let storage = TempDir::new()?;
    let app_state = test_app_state(pool, &config, storage.path())?;
    let mut db = app_state.db.acquire().await?;
    let mut redis_conn = app_state.redis_conn.get()?;
    let test_user =
        generate_test_user(&mut db, &mut redis_conn, &config, "new@example.com", "password")
            .await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When names missing
    let resp = cli
        .post("/api/profile/onboarding")
        .header("authorization", format!("Bearer {}", test_user.token))
        .multipart(TestForm::new().text("first_name", "Ada").text("last_name", "  "))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);

    // When complete with an avatar
    let resp = cli
        .post("/api/profile/onboarding")
        .header("authorization", format!("Bearer {}", test_user.token))
        .multipart(
            TestForm::new()
                .text("first_name", "Ada")
                .text("last_name", "Okafor")
                .text("address", "12 Green Street")
                .field(
                    TestFormField::bytes(PNG_BYTES.to_vec())
                        .name("avatar")
                        .filename("my avatar.png")
                        .content_type("image/png"),
                ),
        )
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let body = json.value().object();
    body.get("last_name").assert_string("Okafor");
    body.get("address").assert_string("12 Green Street");
    let avatar_url = body.get("avatar_url").string().to_string();
    let path = app_state
        .storage
        .path_from_public_url(Bucket::Avatars, &avatar_url);
    let Some(path) = path else {
        panic!("avatar url outside of the avatars bucket: {avatar_url}");
    };
    assert!(path.starts_with("public/"));
    assert!(path.ends_with("_my_avatar.png"));
    let stored = tokio::fs::read(storage.path().join("avatars").join(&path)).await?;
    assert_eq!(stored, PNG_BYTES.to_vec());
    Ok(())
}

#[sqlx::test]
async fn test_profile_picture_upload_and_delete(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let storage = TempDir::new()?;
    let app_state = test_app_state(pool, &config, storage.path())?;
    let mut db = app_state.db.acquire().await?;
    let mut redis_conn = app_state.redis_conn.get()?;
    let test_user =
        generate_test_user(&mut db, &mut redis_conn, &config, "pic@example.com", "password")
            .await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);
    let bucket_dir = storage.path().join("profile_pics");
    let user_id = test_user.user.id;

    // When not an image
    let resp = cli
        .post("/api/profile/picture")
        .header("authorization", format!("Bearer {}", test_user.token))
        .multipart(
            TestForm::new().field(
                TestFormField::bytes(b"hello".to_vec())
                    .name("file")
                    .filename("notes.txt")
                    .content_type("text/plain"),
            ),
        )
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);

    // When png
    let resp = cli
        .post("/api/profile/picture")
        .header("authorization", format!("Bearer {}", test_user.token))
        .multipart(
            TestForm::new().field(
                TestFormField::bytes(PNG_BYTES.to_vec())
                    .name("file")
                    .filename("me.png")
                    .content_type("image/png"),
            ),
        )
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    let json = resp.json().await;
    json.value()
        .object()
        .get("profile_pic")
        .assert_string(&app_state.storage.public_url(Bucket::ProfilePics, &format!("{user_id}.png")));
    assert!(bucket_dir.join(format!("{user_id}.png")).exists());

    // When replaced by a jpeg
    let resp = cli
        .post("/api/profile/picture")
        .header("authorization", format!("Bearer {}", test_user.token))
        .multipart(
            TestForm::new().field(
                TestFormField::bytes(vec![0xFF, 0xD8, 0xFF])
                    .name("file")
                    .filename("me.jpg")
                    .content_type("image/jpeg"),
            ),
        )
        .send()
        .await;

    // Expect old file gone
    resp.assert_status_is_ok();
    assert!(bucket_dir.join(format!("{user_id}.jpg")).exists());
    assert!(!bucket_dir.join(format!("{user_id}.png")).exists());

    // When deleted
    let resp = cli
        .delete("/api/profile/picture")
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    let json = resp.json().await;
    json.value().object().get("profile_pic").assert_null();
    assert!(!bucket_dir.join(format!("{user_id}.jpg")).exists());

    // When deleted twice
    let resp = cli
        .delete("/api/profile/picture")
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::NOT_FOUND);
    Ok(())
}

#[sqlx::test]
async fn test_profile_picture_kept_when_update_fails(pool: PgPool) -> anyhow::Result<()> {
    // Given a stored png
    let config = test_config();
    let storage = TempDir::new()?;
    let app_state = test_app_state(pool, &config, storage.path())?;
    let mut db = app_state.db.acquire().await?;
    let mut redis_conn = app_state.redis_conn.get()?;
    let test_user =
        generate_test_user(&mut db, &mut redis_conn, &config, "keep@example.com", "password")
            .await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);
    let user_id = test_user.user.id;
    let png_path = storage.path().join("profile_pics").join(format!("{user_id}.png"));
    let png_url = app_state
        .storage
        .public_url(Bucket::ProfilePics, &format!("{user_id}.png"));
    cli.post("/api/profile/picture")
        .header("authorization", format!("Bearer {}", test_user.token))
        .multipart(
            TestForm::new().field(
                TestFormField::bytes(PNG_BYTES.to_vec())
                    .name("file")
                    .filename("me.png")
                    .content_type("image/png"),
            ),
        )
        .send()
        .await
        .assert_status_is_ok();

    // Given profile writes now fail
    sqlx::query(
        r#"CREATE FUNCTION reject_profile_update() RETURNS trigger AS $$
        BEGIN
            RAISE EXCEPTION 'profile updates disabled';
        END;
        $$ LANGUAGE plpgsql"#,
    )
    .execute(&app_state.db)
    .await?;
    sqlx::query(
        "CREATE TRIGGER reject_profile_update BEFORE UPDATE ON public.profiles \
         FOR EACH ROW EXECUTE FUNCTION reject_profile_update()",
    )
    .execute(&app_state.db)
    .await?;

    // When replaced by a jpeg
    let resp = cli
        .post("/api/profile/picture")
        .header("authorization", format!("Bearer {}", test_user.token))
        .multipart(
            TestForm::new().field(
                TestFormField::bytes(vec![0xFF, 0xD8, 0xFF])
                    .name("file")
                    .filename("me.jpg")
                    .content_type("image/jpeg"),
            ),
        )
        .send()
        .await;

    // Expect the old picture still in place
    resp.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert!(png_path.exists());

    // When deleted
    let resp = cli
        .delete("/api/profile/picture")
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect the row and the file still agree
    resp.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert!(png_path.exists());
    let (profile_pic,): (Option<String>,) =
        sqlx::query_as("SELECT profile_pic FROM public.profiles WHERE id = $1")
            .bind(user_id)
            .fetch_one(&app_state.db)
            .await?;
    assert_eq!(profile_pic, Some(png_url));
    Ok(())
}
