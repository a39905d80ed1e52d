use poem_openapi::Enum;
use serde::{Deserialize, Serialize};

/// Points per kilogram for categories without an entry in [`RATES`].
pub const DEFAULT_RATE: i32 = 5;

pub const POUND_IN_KG: f64 = 0.45359237;

/// Points per kilogram by waste category.
pub const RATES: [(&str, i32); 6] = [
    ("plastic", 10),
    ("paper", 8),
    ("metal", 15),
    ("glass", 12),
    ("organic", 5),
    ("electronic", 20),
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Enum, Serialize, Deserialize)]
#[oai(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lb,
}

impl WeightUnit {
    pub fn to_kg(&self, amount: f64) -> f64 {
        match self {
            WeightUnit::Kg => amount,
            WeightUnit::Lb => amount * POUND_IN_KG,
        }
    }
}

/// Case-insensitive rate lookup.
pub fn rate_for(category: &str) -> i32 {
    let category = category.trim();
    RATES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(category))
        .map(|(_, rate)| *rate)
        .unwrap_or(DEFAULT_RATE)
}

/// `floor(weight_kg * rate)`. Weight must be a positive finite number.
pub fn calculate_points(category: &str, weight_kg: f64) -> Result<i32, String> {
    if !weight_kg.is_finite() || weight_kg <= 0.0 {
        return Err("Amount must be greater than zero".to_string());
    }
    let points = (weight_kg * rate_for(category) as f64).floor();
    if points > i32::MAX as f64 {
        return Err("Amount is too large".to_string());
    }
    Ok(points as i32)
}
