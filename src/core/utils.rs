use chrono::{DateTime, FixedOffset, Local, NaiveDate, SecondsFormat};

pub fn datetime_to_string(datetime: DateTime<FixedOffset>) -> String {
    datetime.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn datetime_to_string_opt(datetime: Option<DateTime<FixedOffset>>) -> Option<String> {
    datetime.map(datetime_to_string)
}

pub fn date_to_string(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Calendar date pickups are compared against.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_datetime_to_string() {
        let offset = FixedOffset::east_opt(7 * 60 * 60).unwrap();
        let datetime = offset.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).unwrap();
        assert_eq!(datetime_to_string(datetime), "2025-06-01T09:30:00+07:00");
        assert_eq!(datetime_to_string_opt(None), None);
    }

    #[test]
    fn test_date_to_string() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        assert_eq!(date_to_string(date), "2025-01-05");
    }
}
