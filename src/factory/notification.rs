use chrono::{DateTime, FixedOffset};
use fake::{Dummy, Fake, Faker};
use serde::Deserialize;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::model::notification::Notification;

/// Inserts fake notifications. `user_id` must be set to an existing user.
pub struct NotificationFactory<T: Clone> {
    modifier_one: fn(x: &Notification, ext: T) -> Notification,
    modifier_many: fn(x: &Notification, idx: usize, ext: T) -> Notification,
}

impl<T: Clone> Default for NotificationFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

async fn insert(conn: &mut PgConnection, item: &Notification) -> anyhow::Result<()> {
    sqlx::query(
        r#"
    INSERT INTO public.notifications (id, user_id, message, is_read, sent_at, read_at)
    VALUES ($1, $2, $3, $4, $5, $6)"#,
    )
    .bind(item.id)
    .bind(item.user_id)
    .bind(&item.message)
    .bind(item.is_read)
    .bind(item.sent_at)
    .bind(item.read_at)
    .execute(conn)
    .await?;
    Ok(())
}

impl<T: Clone> NotificationFactory<T> {
    pub fn new() -> Self {
        Self {
            modifier_one: |x, _| x.clone(),
            modifier_many: |x, _, _| x.clone(),
        }
    }

    pub fn modified_one(&mut self, modifier: fn(x: &Notification, ext: T) -> Notification) {
        self.modifier_one = modifier
    }

    pub fn modified_many(
        &mut self,
        modifier: fn(x: &Notification, idx: usize, ext: T) -> Notification,
    ) {
        self.modifier_many = modifier
    }

    pub async fn generate_one(&mut self, db: &PgPool, ext: T) -> anyhow::Result<Notification> {
        let data = NotificationDummy::generate_one();
        let data = (self.modifier_one)(&data, ext);
        let mut conn = db.acquire().await?;
        insert(&mut *conn, &data).await?;
        Ok(data)
    }

    pub async fn generate_many(
        &mut self,
        db: &PgPool,
        num: u32,
        ext: T,
    ) -> anyhow::Result<Vec<Notification>> {
        let mut result: Vec<Notification> = vec![];
        for (idx, item) in NotificationDummy::generate_many(num).iter().enumerate() {
            result.push((self.modifier_many)(item, idx, ext.clone()));
        }
        let mut tx = db.begin().await?;
        for item in result.iter() {
            insert(&mut *tx, item).await?;
        }
        tx.commit().await?;
        Ok(result)
    }
}

#[derive(Debug, Deserialize, Dummy, Clone)]
struct NotificationDummy {
    pub id: Uuid,
    pub user_id: Uuid,
    #[dummy(faker = "fake::faker::lorem::en::Sentence(3..8)")]
    pub message: String,
    pub sent_at: DateTime<FixedOffset>,
}

impl NotificationDummy {
    pub fn generate_one() -> Notification {
        let dummy = Faker.fake::<Self>();
        Notification {
            id: dummy.id,
            user_id: dummy.user_id,
            message: dummy.message,
            is_read: false,
            sent_at: dummy.sent_at,
            read_at: None,
        }
    }

    pub fn generate_many(num: u32) -> Vec<Notification> {
        (0..num).map(|_| Self::generate_one()).collect()
    }
}
