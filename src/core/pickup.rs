use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use poem_openapi::Enum;
use serde::{Deserialize, Serialize};

use crate::model::pickup::Pickup;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Enum, Serialize, Deserialize)]
#[oai(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PickupStatus {
    Scheduled,
    Confirmed,
    Pending,
    Completed,
    Cancelled,
}

impl PickupStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PickupStatus::Scheduled => "scheduled",
            PickupStatus::Confirmed => "confirmed",
            PickupStatus::Pending => "pending",
            PickupStatus::Completed => "completed",
            PickupStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PickupStatus::Completed | PickupStatus::Cancelled)
    }

    /// Terminal statuses never move; anything else may move to any other status.
    pub fn can_transition_to(&self, next: PickupStatus) -> bool {
        !self.is_terminal() && *self != next && next != PickupStatus::Scheduled
    }
}

impl fmt::Display for PickupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PickupStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scheduled" => Ok(PickupStatus::Scheduled),
            "confirmed" => Ok(PickupStatus::Confirmed),
            "pending" => Ok(PickupStatus::Pending),
            "completed" => Ok(PickupStatus::Completed),
            "cancelled" => Ok(PickupStatus::Cancelled),
            other => Err(anyhow::anyhow!("unknown pickup status: {other}")),
        }
    }
}

/// Upcoming when the status is still open and the date is today or later.
/// Unrecognized statuses count as open.
pub fn is_upcoming(status: &str, pickup_date: NaiveDate, today: NaiveDate) -> bool {
    let open = match status.parse::<PickupStatus>() {
        Ok(status) => !status.is_terminal(),
        Err(_) => true,
    };
    open && pickup_date >= today
}

/// Splits pickups into (upcoming, completed/past), keeping input order.
pub fn classify_pickups(pickups: Vec<Pickup>, today: NaiveDate) -> (Vec<Pickup>, Vec<Pickup>) {
    pickups
        .into_iter()
        .partition(|item| is_upcoming(&item.status, item.pickup_date, today))
}

#[cfg(test)]
mod tests {
    use chrono::{Days, Local};
    use uuid::Uuid;

    use super::*;

    fn pickup(status: &str, pickup_date: NaiveDate) -> Pickup {
        let now = Local::now().fixed_offset();
        Pickup {
            id: Uuid::now_v7(),
            user_id: Uuid::now_v7(),
            pickup_date,
            pickup_time_start: "08:00".to_string(),
            pickup_time_end: "10:00".to_string(),
            waste_types: vec!["plastic".to_string()],
            status: status.to_string(),
            location: None,
            notes: None,
            staff_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    #[test]
    fn test_completed_is_never_upcoming() {
        let future = today().checked_add_days(Days::new(30)).unwrap();
        assert!(!is_upcoming("completed", future, today()));
        assert!(!is_upcoming("completed", today(), today()));
        assert!(!is_upcoming("cancelled", future, today()));
    }

    #[test]
    fn test_future_scheduled_is_upcoming() {
        let future = today().checked_add_days(Days::new(1)).unwrap();
        assert!(is_upcoming("scheduled", future, today()));
        assert!(is_upcoming("confirmed", future, today()));
        assert!(is_upcoming("pending", future, today()));
    }

    #[test]
    fn test_today_is_upcoming() {
        assert!(is_upcoming("scheduled", today(), today()));
    }

    #[test]
    fn test_yesterday_scheduled_is_past() {
        let yesterday = today().checked_sub_days(Days::new(1)).unwrap();
        assert!(!is_upcoming("scheduled", yesterday, today()));
    }

    #[test]
    fn test_classify_pickups() {
        let yesterday = today().checked_sub_days(Days::new(1)).unwrap();
        let tomorrow = today().checked_add_days(Days::new(1)).unwrap();
        let pickups = vec![
            pickup("scheduled", yesterday),
            pickup("scheduled", tomorrow),
            pickup("completed", tomorrow),
            pickup("pending", today()),
        ];
        let ids: Vec<Uuid> = pickups.iter().map(|item| item.id).collect();
        let (upcoming, past) = classify_pickups(pickups, today());
        assert_eq!(
            upcoming.iter().map(|item| item.id).collect::<Vec<Uuid>>(),
            vec![ids[1], ids[3]]
        );
        assert_eq!(
            past.iter().map(|item| item.id).collect::<Vec<Uuid>>(),
            vec![ids[0], ids[2]]
        );
    }

    #[test]
    fn test_status_transition() {
        assert!(PickupStatus::Scheduled.can_transition_to(PickupStatus::Confirmed));
        assert!(PickupStatus::Pending.can_transition_to(PickupStatus::Completed));
        assert!(PickupStatus::Confirmed.can_transition_to(PickupStatus::Cancelled));
        assert!(!PickupStatus::Completed.can_transition_to(PickupStatus::Scheduled));
        assert!(!PickupStatus::Cancelled.can_transition_to(PickupStatus::Confirmed));
        assert!(!PickupStatus::Confirmed.can_transition_to(PickupStatus::Confirmed));
        assert!(!PickupStatus::Pending.can_transition_to(PickupStatus::Scheduled));
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(
            "Completed".parse::<PickupStatus>().unwrap(),
            PickupStatus::Completed
        );
        assert!("lost".parse::<PickupStatus>().is_err());
        assert_eq!(PickupStatus::Pending.to_string(), "pending");
    }

    #[test]
    fn test_relative_to_local_today() {
        let today = Local::now().date_naive();
        let yesterday = today.checked_sub_days(Days::new(1)).unwrap();
        assert!(!is_upcoming("scheduled", yesterday, today));
    }
}
