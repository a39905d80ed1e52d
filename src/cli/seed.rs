use sqlx::PgPool;

use crate::{
    core::points::RATES,
    repository::{
        reward::{create_reward, get_rewards},
        waste_type::create_waste_type,
    },
};

/// (reward type, value label, points required)
const REWARDS: [(&str, &str, i32); 3] = [
    ("Airtime", "$10", 10000),
    ("Data", "5GB", 15000),
    ("Cash", "$20", 20000),
];

fn waste_type_description(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => format!("{}{} waste", first.to_uppercase(), chars.as_str()),
        None => String::new(),
    }
}

/// Fills the waste type and reward catalogs. Safe to run more than once;
/// returns how many waste types and rewards were inserted.
pub async fn seed(pool: &PgPool) -> anyhow::Result<(usize, usize)> {
    let mut tx = pool.begin().await?;

    let mut waste_types = 0;
    for (name, rate) in RATES {
        if create_waste_type(&mut tx, name, Some(waste_type_description(name)), rate).await? {
            waste_types += 1;
        }
    }

    let mut rewards = 0;
    if get_rewards(&mut tx).await?.is_empty() {
        for (reward_type, value_label, points_required) in REWARDS {
            let description = format!("{value_label} {reward_type}");
            create_reward(
                &mut tx,
                reward_type,
                Some(description),
                value_label,
                points_required,
            )
            .await?;
            rewards += 1;
        }
    }

    tx.commit().await?;
    tracing::info!("seeded {waste_types} waste types and {rewards} rewards");
    Ok((waste_types, rewards))
}
