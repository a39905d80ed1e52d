use chrono::{DateTime, FixedOffset, Local};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::sqlx_utils::{binds_query_as, query_builder, SqlxBinds},
    model::{
        reward::{Reward, TABLE_NAME},
        user_reward::{UserReward, TABLE_NAME as USER_REWARD_TABLE_NAME},
    },
};

/// Available rewards, cheapest first.
pub async fn get_rewards(tx: &mut Transaction<'_, Postgres>) -> anyhow::Result<Vec<Reward>> {
    let stmt = query_builder(
        None,
        TABLE_NAME,
        &["available = TRUE".to_string()],
        vec!["points_required ASC".to_string()],
        None,
        None,
    );
    let q = binds_query_as::<Reward>(&stmt, vec![]);
    let data = q.fetch_all(&mut **tx).await?;
    Ok(data)
}

pub async fn get_reward_by_id(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
) -> anyhow::Result<Option<Reward>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::Uuid(*id)];
    let stmt = query_builder(
        None,
        TABLE_NAME,
        &["id = $1".to_string()],
        vec![],
        None,
        None,
    );
    let q = binds_query_as::<Reward>(&stmt, binds);
    let data = q.fetch_optional(&mut **tx).await?;
    Ok(data)
}

pub async fn create_reward(
    tx: &mut Transaction<'_, Postgres>,
    reward_type: &str,
    description: Option<String>,
    value_label: &str,
    points_required: i32,
) -> anyhow::Result<Reward> {
    let reward = Reward {
        id: Uuid::now_v7(),
        reward_type: reward_type.to_string(),
        description,
        value_label: value_label.to_string(),
        points_required,
        available: true,
    };
    sqlx::query(
        format!(
            r#"
    INSERT INTO {} (id, reward_type, description, value_label, points_required, available)
    VALUES ($1, $2, $3, $4, $5, $6)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(reward.id)
    .bind(&reward.reward_type)
    .bind(&reward.description)
    .bind(&reward.value_label)
    .bind(reward.points_required)
    .bind(reward.available)
    .execute(&mut **tx)
    .await?;
    Ok(reward)
}

pub async fn redeem_reward(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &Uuid,
    reward_id: &Uuid,
    points_spent: i32,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<UserReward> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    let user_reward = UserReward {
        id: Uuid::now_v7(),
        user_id: *user_id,
        reward_id: *reward_id,
        points_spent,
        created_at: now,
    };
    sqlx::query(
        format!(
            r#"
    INSERT INTO {} (id, user_id, reward_id, points_spent, created_at)
    VALUES ($1, $2, $3, $4, $5)"#,
            USER_REWARD_TABLE_NAME
        )
        .as_str(),
    )
    .bind(user_reward.id)
    .bind(user_reward.user_id)
    .bind(user_reward.reward_id)
    .bind(user_reward.points_spent)
    .bind(user_reward.created_at)
    .execute(&mut **tx)
    .await?;
    Ok(user_reward)
}

/// Redemptions of a user, newest first.
pub async fn get_user_rewards(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &Uuid,
) -> anyhow::Result<Vec<UserReward>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::Uuid(*user_id)];
    let stmt = query_builder(
        None,
        USER_REWARD_TABLE_NAME,
        &["user_id = $1".to_string()],
        vec!["created_at DESC".to_string()],
        None,
        None,
    );
    let q = binds_query_as::<UserReward>(&stmt, binds);
    let data = q.fetch_all(&mut **tx).await?;
    Ok(data)
}

pub async fn count_user_rewards(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &Uuid,
) -> anyhow::Result<i64> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::Uuid(*user_id)];
    let stmt = query_builder(
        Some("count(id)".to_string()),
        USER_REWARD_TABLE_NAME,
        &["user_id = $1".to_string()],
        vec![],
        None,
        None,
    );
    let q = binds_query_as::<(i64,)>(&stmt, binds);
    let data = q.fetch_one(&mut **tx).await?;
    Ok(data.0)
}
