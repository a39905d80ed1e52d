use fake::{Dummy, Fake, Faker};
use serde::Deserialize;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::model::waste_type::WasteType;

pub struct WasteTypeFactory<T: Clone> {
    modifier_one: fn(x: &WasteType, ext: T) -> WasteType,
    modifier_many: fn(x: &WasteType, idx: usize, ext: T) -> WasteType,
}

impl<T: Clone> Default for WasteTypeFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

async fn insert(conn: &mut PgConnection, item: &WasteType) -> anyhow::Result<()> {
    sqlx::query(
        r#"
    INSERT INTO public.waste_types (id, name, description, points_per_kg)
    VALUES ($1, $2, $3, $4)"#,
    )
    .bind(item.id)
    .bind(&item.name)
    .bind(&item.description)
    .bind(item.points_per_kg)
    .execute(conn)
    .await?;
    Ok(())
}

impl<T: Clone> WasteTypeFactory<T> {
    pub fn new() -> Self {
        Self {
            modifier_one: |x, _| x.clone(),
            modifier_many: |x, _, _| x.clone(),
        }
    }

    pub fn modified_one(&mut self, modifier: fn(x: &WasteType, ext: T) -> WasteType) {
        self.modifier_one = modifier
    }

    pub fn modified_many(&mut self, modifier: fn(x: &WasteType, idx: usize, ext: T) -> WasteType) {
        self.modifier_many = modifier
    }

    pub async fn generate_one(&mut self, db: &PgPool, ext: T) -> anyhow::Result<WasteType> {
        let data = WasteTypeDummy::generate_one();
        let data = (self.modifier_one)(&data, ext);
        let mut conn = db.acquire().await?;
        insert(&mut *conn, &data).await?;
        Ok(data)
    }

    /// Names are unique, so the modifier should keep the generated ones distinct.
    pub async fn generate_many(
        &mut self,
        db: &PgPool,
        num: u32,
        ext: T,
    ) -> anyhow::Result<Vec<WasteType>> {
        let mut result: Vec<WasteType> = vec![];
        for (idx, item) in WasteTypeDummy::generate_many(num).iter().enumerate() {
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
struct WasteTypeDummy {
    pub id: Uuid,
    pub description: Option<String>,
    #[dummy(faker = "1..30")]
    pub points_per_kg: i32,
}

impl WasteTypeDummy {
    pub fn generate_one() -> WasteType {
        let dummy = Faker.fake::<Self>();
        WasteType {
            id: dummy.id,
            // uuid suffix keeps the unique name constraint happy
            name: format!("type_{}", dummy.id.simple()),
            description: dummy.description,
            points_per_kg: dummy.points_per_kg,
        }
    }

    pub fn generate_many(num: u32) -> Vec<WasteType> {
        (0..num).map(|_| Self::generate_one()).collect()
    }
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;

    use crate::factory::waste_type::WasteTypeFactory;

    #[sqlx::test]
    async fn test_generate_many(pool: PgPool) -> anyhow::Result<()> {
        // When
        let mut factory = WasteTypeFactory::new();
        factory.generate_many(&pool, 5, ()).await?;

        // Expect
        let num_data: (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM public.waste_types"#)
            .fetch_one(&pool)
            .await?;
        assert_eq!(num_data.0, 5);
        Ok(())
    }
}
