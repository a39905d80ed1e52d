use chrono::{DateTime, FixedOffset, NaiveDate};
use fake::{Dummy, Fake, Faker};
use serde::Deserialize;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::model::waste_log::WasteLog;

/// Inserts fake waste logs. Rows reference `public.user`, so the modifier
/// has to point `user_id` at an existing user.
pub struct WasteLogFactory<T: Clone> {
    modifier_one: fn(x: &WasteLog, ext: T) -> WasteLog,
    modifier_many: fn(x: &WasteLog, idx: usize, ext: T) -> WasteLog,
}

impl<T: Clone> Default for WasteLogFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

async fn insert(conn: &mut PgConnection, item: &WasteLog) -> anyhow::Result<()> {
    sqlx::query(
        r#"
    INSERT INTO public.waste_logs (id, user_id, waste_type, amount, points_earned, notes,
    photo_url, collection_date, collection_time, created_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"#,
    )
    .bind(item.id)
    .bind(item.user_id)
    .bind(&item.waste_type)
    .bind(item.amount)
    .bind(item.points_earned)
    .bind(&item.notes)
    .bind(&item.photo_url)
    .bind(item.collection_date)
    .bind(&item.collection_time)
    .bind(item.created_at)
    .execute(conn)
    .await?;
    Ok(())
}

impl<T: Clone> WasteLogFactory<T> {
    pub fn new() -> Self {
        Self {
            modifier_one: |x, _| x.clone(),
            modifier_many: |x, _, _| x.clone(),
        }
    }

    pub fn modified_one(&mut self, modifier: fn(x: &WasteLog, ext: T) -> WasteLog) {
        self.modifier_one = modifier
    }

    pub fn modified_many(&mut self, modifier: fn(x: &WasteLog, idx: usize, ext: T) -> WasteLog) {
        self.modifier_many = modifier
    }

    pub async fn generate_one(&mut self, db: &PgPool, ext: T) -> anyhow::Result<WasteLog> {
        let data = WasteLogDummy::generate_one();
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
    ) -> anyhow::Result<Vec<WasteLog>> {
        let mut result: Vec<WasteLog> = vec![];
        for (idx, item) in WasteLogDummy::generate_many(num).iter().enumerate() {
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
struct WasteLogDummy {
    pub id: Uuid,
    pub user_id: Uuid,
    #[dummy(faker = "fake::faker::lorem::en::Word()")]
    pub waste_type: String,
    #[dummy(faker = "0.1..50.0")]
    pub amount: f64,
    #[dummy(faker = "1..500")]
    pub points_earned: i32,
    pub notes: Option<String>,
    pub collection_date: Option<NaiveDate>,
    pub created_at: DateTime<FixedOffset>,
}

impl WasteLogDummy {
    fn into_model(self) -> WasteLog {
        WasteLog {
            id: self.id,
            user_id: self.user_id,
            waste_type: self.waste_type,
            amount: self.amount,
            points_earned: self.points_earned,
            notes: self.notes,
            photo_url: None,
            collection_date: self.collection_date,
            collection_time: None,
            created_at: self.created_at,
        }
    }

    pub fn generate_one() -> WasteLog {
        Faker.fake::<Self>().into_model()
    }

    pub fn generate_many(num: u32) -> Vec<WasteLog> {
        (0..num).map(|_| Self::generate_one()).collect()
    }
}
