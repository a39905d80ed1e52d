use chrono::{Datelike, Months, NaiveDate};

use crate::model::waste_log::WasteLog;

#[derive(Clone, Debug, PartialEq)]
pub struct MonthlyTotal {
    pub year: i32,
    pub month: u32,
    pub label: String,
    pub weight: f64,
}

pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Date a log counts for: the collection date when given, else its creation date.
pub fn log_date(log: &WasteLog) -> NaiveDate {
    log.collection_date
        .unwrap_or_else(|| log.created_at.date_naive())
}

/// Waste weight per month for the `months` months ending with the month of
/// `today`, oldest first. Months without logs are reported as zero.
pub fn monthly_totals(logs: &[WasteLog], today: NaiveDate, months: u32) -> Vec<MonthlyTotal> {
    let first_of_month = today.with_day(1).unwrap_or(today);
    let mut results: Vec<MonthlyTotal> = vec![];
    for back in (0..months).rev() {
        let Some(start) = first_of_month.checked_sub_months(Months::new(back)) else {
            continue;
        };
        let weight: f64 = logs
            .iter()
            .map(|log| (log_date(log), log.amount))
            .filter(|(date, _)| date.year() == start.year() && date.month() == start.month())
            .map(|(_, amount)| amount)
            .sum();
        results.push(MonthlyTotal {
            year: start.year(),
            month: start.month(),
            label: start.format("%b").to_string(),
            weight: round_one_decimal(weight),
        });
    }
    results
}
