use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::sqlx_utils::{binds_query_as, query_builder, SqlxBinds},
    model::staff::{Staff, TABLE_NAME},
};

pub async fn get_staff(
    tx: &mut Transaction<'_, Postgres>,
    service_area_id: Option<Uuid>,
) -> anyhow::Result<Vec<Staff>> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec!["is_active = TRUE".to_string()];
    if let Some(service_area_id) = service_area_id {
        binds.push(SqlxBinds::Uuid(service_area_id));
        filters.push(format!("service_area_id = ${}", binds.len()));
    }
    let stmt = query_builder(
        None,
        TABLE_NAME,
        &filters,
        vec!["full_name ASC".to_string()],
        None,
        None,
    );
    let q = binds_query_as::<Staff>(&stmt, binds);
    let data = q.fetch_all(&mut **tx).await?;
    Ok(data)
}

pub async fn get_staff_by_id(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
) -> anyhow::Result<Option<Staff>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::Uuid(*id)];
    let stmt = query_builder(
        None,
        TABLE_NAME,
        &["id = $1".to_string()],
        vec![],
        None,
        None,
    );
    let q = binds_query_as::<Staff>(&stmt, binds);
    let data = q.fetch_optional(&mut **tx).await?;
    Ok(data)
}
