use fake::{Dummy, Fake, Faker};
use serde::Deserialize;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::model::reward::Reward;

pub struct RewardFactory<T: Clone> {
    modifier_one: fn(x: &Reward, ext: T) -> Reward,
    modifier_many: fn(x: &Reward, idx: usize, ext: T) -> Reward,
}

impl<T: Clone> Default for RewardFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

async fn insert(conn: &mut PgConnection, item: &Reward) -> anyhow::Result<()> {
    sqlx::query(
        r#"
    INSERT INTO public.rewards (id, reward_type, description, value_label, points_required, available)
    VALUES ($1, $2, $3, $4, $5, $6)"#,
    )
    .bind(item.id)
    .bind(&item.reward_type)
    .bind(&item.description)
    .bind(&item.value_label)
    .bind(item.points_required)
    .bind(item.available)
    .execute(conn)
    .await?;
    Ok(())
}

impl<T: Clone> RewardFactory<T> {
    pub fn new() -> Self {
        Self {
            modifier_one: |x, _| x.clone(),
            modifier_many: |x, _, _| x.clone(),
        }
    }

    pub fn modified_one(&mut self, modifier: fn(x: &Reward, ext: T) -> Reward) {
        self.modifier_one = modifier
    }

    pub fn modified_many(&mut self, modifier: fn(x: &Reward, idx: usize, ext: T) -> Reward) {
        self.modifier_many = modifier
    }

    pub async fn generate_one(&mut self, db: &PgPool, ext: T) -> anyhow::Result<Reward> {
        let data = RewardDummy::generate_one();
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
    ) -> anyhow::Result<Vec<Reward>> {
        let mut result: Vec<Reward> = vec![];
        for (idx, item) in RewardDummy::generate_many(num).iter().enumerate() {
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
struct RewardDummy {
    pub id: Uuid,
    #[dummy(faker = "fake::faker::lorem::en::Word()")]
    pub reward_type: String,
    pub description: Option<String>,
    #[dummy(faker = "fake::faker::lorem::en::Word()")]
    pub value_label: String,
    #[dummy(faker = "100..20000")]
    pub points_required: i32,
}

impl RewardDummy {
    pub fn generate_one() -> Reward {
        let dummy = Faker.fake::<Self>();
        Reward {
            id: dummy.id,
            reward_type: dummy.reward_type,
            description: dummy.description,
            value_label: dummy.value_label,
            points_required: dummy.points_required,
            available: true,
        }
    }

    pub fn generate_many(num: u32) -> Vec<Reward> {
        (0..num).map(|_| Self::generate_one()).collect()
    }
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;

    use crate::{factory::reward::RewardFactory, model::reward::Reward};

    #[sqlx::test]
    async fn test_generate_many(pool: PgPool) -> anyhow::Result<()> {
        // When
        let mut factory = RewardFactory::new();
        factory.generate_many(&pool, 3, ()).await?;

        // Expect
        let num_data: (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM public.rewards"#)
            .fetch_one(&pool)
            .await?;
        assert_eq!(num_data.0, 3);
        Ok(())
    }

    #[sqlx::test]
    async fn test_generate_one_modified(pool: PgPool) -> anyhow::Result<()> {
        // When
        let mut factory = RewardFactory::<i32>::new();
        factory.modified_one(|data, ext| Reward {
            reward_type: "Airtime".to_string(),
            points_required: ext,
            ..data.clone()
        });
        let reward = factory.generate_one(&pool, 10000).await?;

        // Expect
        let res: (String, i32, bool) = sqlx::query_as(
            r#"SELECT reward_type, points_required, available FROM public.rewards WHERE id = $1"#,
        )
        .bind(reward.id)
        .fetch_one(&pool)
        .await?;
        assert_eq!(res, ("Airtime".to_string(), 10000, true));
        Ok(())
    }
}
