//! Stable identity keys for idempotence and orphan detection.

use std::collections::HashSet;

use crate::event::{Event, EventTime};

/// Identity key deciding whether two records denote the same logical item
/// across runs: the captured origin identity, else the source-native uid,
/// else a summary+start composite.
pub fn identity_key(event: &Event) -> String {
    if let Some(origin) = &event.origin_uid {
        return origin.clone();
    }
    if let Some(uid) = &event.uid {
        return uid.clone();
    }
    fallback_key(&event.summary, &event.start)
}

/// Composite key for documents that carry no uid.
pub fn fallback_key(summary: &str, start: &EventTime) -> String {
    format!("{}_{}", summary, start.to_ics_string())
}

/// Identity set over a batch of events.
pub fn identity_set<'a, I>(events: I) -> HashSet<String>
where
    I: IntoIterator<Item = &'a Event>,
{
    events.into_iter().map(identity_key).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn event(uid: Option<&str>, origin: Option<&str>) -> Event {
        Event {
            collection: "Work".to_string(),
            uid: uid.map(str::to_string),
            origin_uid: origin.map(str::to_string),
            summary: "Team Meeting".to_string(),
            location: None,
            start: EventTime::DateTime(Utc.with_ymd_and_hms(2025, 9, 14, 10, 0, 0).unwrap()),
            end: None,
            partstat: None,
            recurrence: None,
        }
    }

    #[test]
    fn test_origin_uid_wins_over_uid() {
        assert_eq!(identity_key(&event(Some("uid1"), Some("origin1"))), "origin1");
    }

    #[test]
    fn test_uid_when_no_origin() {
        assert_eq!(identity_key(&event(Some("uid1"), None)), "uid1");
    }

    #[test]
    fn test_fallback_composite_when_no_uid() {
        assert_eq!(
            identity_key(&event(None, None)),
            "Team Meeting_20250914T100000Z"
        );
    }

    #[test]
    fn test_identity_set_dedups() {
        let events = vec![event(Some("uid1"), None), event(Some("uid1"), None)];
        assert_eq!(identity_set(events.iter()).len(), 1);
    }
}
