use chrono::{DateTime, FixedOffset, NaiveDate};
use fake::{Dummy, Fake, Faker};
use serde::Deserialize;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::model::pickup::Pickup;

/// Inserts fake pickups. `user_id` must be set to an existing user.
pub struct PickupFactory<T: Clone> {
    modifier_one: fn(x: &Pickup, ext: T) -> Pickup,
    modifier_many: fn(x: &Pickup, idx: usize, ext: T) -> Pickup,
}

impl<T: Clone> Default for PickupFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

async fn insert(conn: &mut PgConnection, item: &Pickup) -> anyhow::Result<()> {
    sqlx::query(
        r#"
    INSERT INTO public.pickups (id, user_id, pickup_date, pickup_time_start, pickup_time_end,
    waste_types, status, location, notes, staff_id, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"#,
    )
    .bind(item.id)
    .bind(item.user_id)
    .bind(item.pickup_date)
    .bind(&item.pickup_time_start)
    .bind(&item.pickup_time_end)
    .bind(&item.waste_types)
    .bind(&item.status)
    .bind(&item.location)
    .bind(&item.notes)
    .bind(item.staff_id)
    .bind(item.created_at)
    .bind(item.updated_at)
    .execute(conn)
    .await?;
    Ok(())
}

impl<T: Clone> PickupFactory<T> {
    pub fn new() -> Self {
        Self {
            modifier_one: |x, _| x.clone(),
            modifier_many: |x, _, _| x.clone(),
        }
    }

    pub fn modified_one(&mut self, modifier: fn(x: &Pickup, ext: T) -> Pickup) {
        self.modifier_one = modifier
    }

    pub fn modified_many(&mut self, modifier: fn(x: &Pickup, idx: usize, ext: T) -> Pickup) {
        self.modifier_many = modifier
    }

    pub async fn generate_one(&mut self, db: &PgPool, ext: T) -> anyhow::Result<Pickup> {
        let data = PickupDummy::generate_one();
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
    ) -> anyhow::Result<Vec<Pickup>> {
        let mut result: Vec<Pickup> = vec![];
        for (idx, item) in PickupDummy::generate_many(num).iter().enumerate() {
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
struct PickupDummy {
    pub id: Uuid,
    pub user_id: Uuid,
    pub pickup_date: NaiveDate,
    #[dummy(faker = "fake::faker::address::en::StreetName()")]
    pub location: String,
    pub notes: Option<String>,
    pub created_at: DateTime<FixedOffset>,
}

impl PickupDummy {
    fn into_model(self) -> Pickup {
        Pickup {
            id: self.id,
            user_id: self.user_id,
            pickup_date: self.pickup_date,
            pickup_time_start: "09:00".to_string(),
            pickup_time_end: "11:00".to_string(),
            waste_types: vec!["plastic".to_string(), "paper".to_string()],
            status: "scheduled".to_string(),
            location: Some(self.location),
            notes: self.notes,
            staff_id: None,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }

    pub fn generate_one() -> Pickup {
        Faker.fake::<Self>().into_model()
    }

    pub fn generate_many(num: u32) -> Vec<Pickup> {
        (0..num).map(|_| Self::generate_one()).collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Days;
    use sqlx::PgPool;

    use crate::{
        core::{
            test_utils::{generate_test_user, test_config},
            utils::today,
        },
        factory::pickup::PickupFactory,
        model::pickup::Pickup,
    };

    #[sqlx::test]
    async fn test_generate_one_modified(pool: PgPool) -> anyhow::Result<()> {
        // Given
        let config = test_config();
        let client = redis::Client::open(config.redis_url.clone())?;
        let mut redis_conn = client.get_connection()?;
        let mut db = pool.acquire().await?;
        let test_user =
            generate_test_user(&mut db, &mut redis_conn, &config, "pickup@example.com", "pw")
                .await?;

        // When
        let mut factory = PickupFactory::new();
        factory.modified_one(|data, ext| Pickup {
            user_id: ext,
            pickup_date: today() + Days::new(2),
            status: "confirmed".to_string(),
            ..data.clone()
        });
        let pickup = factory.generate_one(&pool, test_user.user.id).await?;

        // Expect
        let res: (String, Vec<String>) =
            sqlx::query_as(r#"SELECT status, waste_types FROM public.pickups WHERE id = $1"#)
                .bind(pickup.id)
                .fetch_one(&pool)
                .await?;
        assert_eq!(res.0, "confirmed");
        assert_eq!(res.1, vec!["plastic".to_string(), "paper".to_string()]);
        Ok(())
    }
}
