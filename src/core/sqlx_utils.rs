use chrono::{DateTime, FixedOffset};
use sqlx::{
    postgres::{PgArguments, PgRow},
    query::{Query, QueryAs},
    Postgres,
};
use uuid::Uuid;

#[derive(Clone, Debug)]
pub enum SqlxBinds {
    String(String),
    Bool(bool),
    Uuid(Uuid),
    DateTimeFixedOffset(DateTime<FixedOffset>),
}

macro_rules! bind_all {
    ($q:expr, $binds:expr) => {{
        let mut q = $q;
        for bind in $binds.iter() {
            q = match bind {
                SqlxBinds::String(val) => q.bind(val.clone()),
                SqlxBinds::Bool(val) => q.bind(*val),
                SqlxBinds::Uuid(val) => q.bind(*val),
                SqlxBinds::DateTimeFixedOffset(val) => q.bind(*val),
            };
        }
        q
    }};
}

pub fn binds_query(stmt: &str, binds: Vec<SqlxBinds>) -> Query<'_, Postgres, PgArguments> {
    bind_all!(sqlx::query(stmt), binds)
}

pub fn binds_query_as<'a, T: for<'r> sqlx::FromRow<'r, PgRow>>(
    stmt: &'a str,
    binds: Vec<SqlxBinds>,
) -> QueryAs<'a, Postgres, T, PgArguments> {
    bind_all!(sqlx::query_as(stmt), binds)
}

/// Builds `SELECT .. FROM .. [WHERE a AND b] [ORDER BY ..] [LIMIT n] [OFFSET n]`.
/// Filters reference their binds positionally (`$1`, `$2`, ..).
pub fn query_builder(
    select: Option<String>,
    table_name: &str,
    wheres: &[String],
    order_by: Vec<String>,
    limit: Option<u32>,
    offset: Option<u32>,
) -> String {
    let mut stmt = format!(
        "SELECT {} FROM {}",
        select.unwrap_or("*".to_string()),
        table_name
    );
    if !wheres.is_empty() {
        stmt.push_str(" WHERE ");
        stmt.push_str(&wheres.join(" AND "));
    }
    if !order_by.is_empty() {
        stmt.push_str(" ORDER BY ");
        stmt.push_str(&order_by.join(", "));
    }
    if let Some(limit) = limit {
        stmt.push_str(&format!(" LIMIT {limit}"));
    }
    if let Some(offset) = offset {
        stmt.push_str(&format!(" OFFSET {offset}"));
    }
    stmt
}
