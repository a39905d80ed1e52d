use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::sqlx_utils::{binds_query_as, query_builder},
    model::waste_type::{WasteType, TABLE_NAME},
};

pub async fn get_waste_types(tx: &mut Transaction<'_, Postgres>) -> anyhow::Result<Vec<WasteType>> {
    let stmt = query_builder(None, TABLE_NAME, &[], vec!["name ASC".to_string()], None, None);
    let q = binds_query_as::<WasteType>(&stmt, vec![]);
    let data = q.fetch_all(&mut **tx).await?;
    Ok(data)
}

/// Inserts the entry unless a waste type with the same name exists.
pub async fn create_waste_type(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
    description: Option<String>,
    points_per_kg: i32,
) -> anyhow::Result<bool> {
    let res = sqlx::query(
        format!(
            r#"
    INSERT INTO {} (id, name, description, points_per_kg)
    VALUES ($1, $2, $3, $4)
    ON CONFLICT (name) DO NOTHING"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(Uuid::now_v7())
    .bind(name)
    .bind(description)
    .bind(points_per_kg)
    .execute(&mut **tx)
    .await?;
    Ok(res.rows_affected() == 1)
}
