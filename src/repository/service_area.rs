use sqlx::{Postgres, Transaction};

use crate::{
    core::sqlx_utils::{binds_query_as, query_builder},
    model::service_area::{ServiceArea, TABLE_NAME},
};

pub async fn get_service_areas(
    tx: &mut Transaction<'_, Postgres>,
) -> anyhow::Result<Vec<ServiceArea>> {
    let stmt = query_builder(
        None,
        TABLE_NAME,
        &["is_active = TRUE".to_string()],
        vec!["name ASC".to_string()],
        None,
        None,
    );
    let q = binds_query_as::<ServiceArea>(&stmt, vec![]);
    let data = q.fetch_all(&mut **tx).await?;
    Ok(data)
}
