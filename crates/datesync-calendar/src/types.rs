//! Calendar API request and response types.

use datesync_core::model::{REMINDER_MINUTES, YEARLY_RRULE};
use datesync_core::CalendarEvent;
use serde::{Deserialize, Serialize};

/// Google's event type for yearly birthday-style events.
///
/// Both birthdays and anniversaries are created with this type: it is the only
/// one that carries yearly recurrence plus custom reminders without manual
/// recurrence management. The distinction survives only in the title.
pub const BIRTHDAY_EVENT_TYPE: &str = "birthday";

// API Response Types

/// Google Calendar API event response (fields a sync reads).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEvent {
    pub id: String,
    pub summary: Option<String>,
    pub html_link: Option<String>,
}

/// API response for event list.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListResponse {
    #[serde(default)]
    pub items: Vec<ApiEvent>,
    pub next_page_token: Option<String>,
}

// API Request Types

/// Body of an events.insert call for an all-day yearly birthday event.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewBirthdayEvent {
    pub summary: String,
    pub start: EventDate,
    pub end: EventDate,
    pub event_type: String,
    pub birthday_properties: BirthdayProperties,
    pub recurrence: Vec<String>,
    pub transparency: String,
    pub visibility: String,
    pub reminders: Reminders,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EventDate {
    pub date: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BirthdayProperties {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reminders {
    pub use_default: bool,
    pub overrides: Vec<ReminderOverride>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReminderOverride {
    pub method: String,
    pub minutes: u32,
}

impl From<&CalendarEvent> for NewBirthdayEvent {
    fn from(event: &CalendarEvent) -> Self {
        Self {
            summary: event.title.clone(),
            start: EventDate {
                date: event.start_date(),
            },
            end: EventDate {
                date: event.end_date(),
            },
            event_type: BIRTHDAY_EVENT_TYPE.to_string(),
            birthday_properties: BirthdayProperties {
                kind: BIRTHDAY_EVENT_TYPE.to_string(),
            },
            recurrence: vec![YEARLY_RRULE.to_string()],
            transparency: "transparent".to_string(),
            visibility: "private".to_string(),
            reminders: Reminders {
                use_default: false,
                overrides: REMINDER_MINUTES
                    .iter()
                    .map(|&minutes| ReminderOverride {
                        method: "popup".to_string(),
                        minutes,
                    })
                    .collect(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_anniversary_serializes_as_birthday_type() {
        let event = CalendarEvent {
            title: "Alice and Bob's anniversary".into(),
            start: NaiveDate::from_ymd_opt(2025, 6, 14).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
        };

        let body = serde_json::to_value(NewBirthdayEvent::from(&event)).unwrap();

        assert_eq!(
            body,
            serde_json::json!({
                "summary": "Alice and Bob's anniversary",
                "start": {"date": "2025-06-14"},
                "end": {"date": "2025-06-15"},
                "eventType": "birthday",
                "birthdayProperties": {"type": "birthday"},
                "recurrence": ["RRULE:FREQ=YEARLY"],
                "transparency": "transparent",
                "visibility": "private",
                "reminders": {
                    "useDefault": false,
                    "overrides": [
                        {"method": "popup", "minutes": 1440},
                        {"method": "popup", "minutes": 10080}
                    ]
                }
            })
        );
    }

    #[test]
    fn test_event_list_tolerates_missing_fields() {
        let json = r#"{
            "items": [
                {"id": "a", "summary": "Alice's birthday", "eventType": "birthday",
                 "start": {"date": "2025-12-05"}},
                {"id": "b"}
            ],
            "nextPageToken": "page2"
        }"#;

        let resp: EventListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.items.len(), 2);
        assert_eq!(resp.items[0].summary.as_deref(), Some("Alice's birthday"));
        assert!(resp.items[1].summary.is_none());
        assert_eq!(resp.next_page_token.as_deref(), Some("page2"));
    }
}
