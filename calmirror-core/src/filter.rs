//! Filter evaluation.
//!
//! All clauses are AND-combined. Text comparisons are case-sensitive exact
//! substring containment; an empty list matches vacuously.

use crate::config::EventFilter;
use crate::event::Event;

fn contains_all(haystack: &str, needles: &[String]) -> bool {
    needles.iter().all(|n| haystack.contains(n.as_str()))
}

fn contains_none(haystack: &str, needles: &[String]) -> bool {
    needles.iter().all(|n| !haystack.contains(n.as_str()))
}

/// Whether `event` satisfies every clause of `filter`.
pub fn matches(event: &Event, filter: &EventFilter) -> bool {
    if let Some(name) = &filter.calendar_name {
        if &event.collection != name {
            return false;
        }
    }
    if let Some(name) = &filter.not_calendar_name {
        if &event.collection == name {
            return false;
        }
    }

    let location = event.location.as_deref().unwrap_or("");

    contains_all(&event.summary, &filter.event_name_contains)
        && contains_none(&event.summary, &filter.event_name_not_contains)
        && contains_all(location, &filter.location_contains)
        && contains_none(location, &filter.location_not_contains)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventTime;
    use chrono::{TimeZone, Utc};

    fn event(collection: &str, summary: &str, location: &str) -> Event {
        Event {
            collection: collection.to_string(),
            uid: Some("uid1".to_string()),
            origin_uid: None,
            summary: summary.to_string(),
            location: if location.is_empty() {
                None
            } else {
                Some(location.to_string())
            },
            start: EventTime::DateTime(Utc.with_ymd_and_hms(2025, 9, 14, 10, 0, 0).unwrap()),
            end: None,
            partstat: None,
            recurrence: None,
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(matches(
            &event("Work", "Team Meeting", "Conference Room"),
            &EventFilter::default()
        ));
    }

    #[test]
    fn test_calendar_name_constraints() {
        let mut filter = EventFilter {
            calendar_name: Some("Work".to_string()),
            ..Default::default()
        };
        assert!(matches(&event("Work", "Team Meeting", ""), &filter));
        assert!(!matches(&event("Personal", "Team Meeting", ""), &filter));

        filter.calendar_name = None;
        filter.not_calendar_name = Some("Personal".to_string());
        assert!(matches(&event("Work", "Team Meeting", ""), &filter));
        assert!(!matches(&event("Personal", "Team Meeting", ""), &filter));
    }

    #[test]
    fn test_summary_contains_requires_every_entry() {
        let filter = EventFilter {
            event_name_contains: vec!["Team".to_string(), "Meeting".to_string()],
            ..Default::default()
        };
        assert!(matches(&event("Work", "Team Meeting", ""), &filter));
        assert!(!matches(&event("Work", "Team Lunch", ""), &filter));
    }

    #[test]
    fn test_summary_not_contains_rejects_any_entry() {
        let filter = EventFilter {
            event_name_not_contains: vec!["Private".to_string(), "Secret".to_string()],
            ..Default::default()
        };
        assert!(matches(&event("Events", "Company Party", ""), &filter));
        assert!(!matches(&event("Events", "Secret Event", ""), &filter));
    }

    #[test]
    fn test_location_clauses_use_empty_string_when_absent() {
        let filter = EventFilter {
            location_not_contains: vec!["Hidden".to_string()],
            ..Default::default()
        };
        assert!(matches(&event("Events", "Party", ""), &filter));
        assert!(!matches(&event("Events", "Party", "Hidden Bar"), &filter));

        let requires = EventFilter {
            location_contains: vec!["HQ".to_string()],
            ..Default::default()
        };
        assert!(!matches(&event("Events", "Party", ""), &requires));
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let filter = EventFilter {
            event_name_contains: vec!["meeting".to_string()],
            ..Default::default()
        };
        assert!(!matches(&event("Work", "Team Meeting", ""), &filter));
    }
}
