//! Destination record generation.
//!
//! Records are rendered by hand so the output stays under this crate's
//! control: fresh uid, generation timestamp, whole-day vs timed branching,
//! TEXT escaping, and the origin extension property.

use chrono::Utc;
use uuid::Uuid;

use crate::error::{MirrorError, MirrorResult};
use crate::event::{Event, EventTime};
use crate::ics::ORIGIN_UID_PROP;
use crate::store::SerializedRecord;

const PRODID: &str = "-//calmirror//EN";

/// Escape a TEXT property value per RFC 5545: backslash, semicolon, comma
/// and newline.
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}

/// Render a DTSTART/DTEND line for the given value.
fn datetime_property(name: &str, time: &EventTime) -> String {
    match time {
        EventTime::Date(d) => format!("{};VALUE=DATE:{}", name, d.format("%Y%m%d")),
        EventTime::DateTime(dt) => format!("{}:{}", name, dt.format("%Y%m%dT%H%M%SZ")),
    }
}

/// Render an event into the destination wire format.
///
/// The record gets a freshly generated uid, a DTSTAMP, and a defaulted end
/// when the source had none. The source uid is never reused; the origin
/// identity travels in the extension property instead.
pub fn serialize_record(event: &Event) -> MirrorResult<SerializedRecord> {
    let origin = event.origin_uid.clone().ok_or_else(|| {
        MirrorError::Generate(format!("record '{}' has no origin identity", event.summary))
    })?;

    let uid = format!("{}@calmirror", Uuid::new_v4());
    let end = event.effective_end();

    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{}", PRODID),
        "BEGIN:VEVENT".to_string(),
        format!("UID:{}", uid),
        format!("DTSTAMP:{}", Utc::now().format("%Y%m%dT%H%M%SZ")),
        format!("SUMMARY:{}", escape_text(&event.summary)),
        datetime_property("DTSTART", &event.start),
        datetime_property("DTEND", &end),
        format!("{}:{}", ORIGIN_UID_PROP, escape_text(&origin)),
    ];

    if let Some(location) = &event.location {
        lines.push(format!("LOCATION:{}", escape_text(location)));
    }
    if let Some(partstat) = &event.partstat {
        lines.push(format!("PARTSTAT:{}", partstat));
    }

    lines.push("END:VEVENT".to_string());
    lines.push("END:VCALENDAR".to_string());

    Ok(SerializedRecord {
        uid,
        ics: lines.join("\r\n") + "\r\n",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ics::parse_event;
    use chrono::{NaiveDate, TimeZone};

    fn make_event() -> Event {
        Event {
            collection: "Work".to_string(),
            uid: Some("uid1".to_string()),
            origin_uid: Some("uid1".to_string()),
            summary: "Busy".to_string(),
            location: Some(String::new()),
            start: EventTime::DateTime(Utc.with_ymd_and_hms(2025, 9, 14, 10, 0, 0).unwrap()),
            end: None,
            partstat: None,
            recurrence: None,
        }
    }

    #[test]
    fn test_timed_event_defaults_end_one_hour_out() {
        let record = serialize_record(&make_event()).unwrap();
        assert!(record.ics.contains("DTSTART:20250914T100000Z"));
        assert!(record.ics.contains("DTEND:20250914T110000Z"));
        assert!(record.ics.contains("SUMMARY:Busy"));
        // Stripped location still renders as an empty value.
        assert!(record.ics.contains("\r\nLOCATION:\r\n"));
    }

    #[test]
    fn test_all_day_event_uses_value_date_and_next_day_end() {
        let mut event = make_event();
        event.start = EventTime::Date(NaiveDate::from_ymd_opt(2025, 9, 14).unwrap());
        event.end = None;

        let record = serialize_record(&event).unwrap();
        assert!(record.ics.contains("DTSTART;VALUE=DATE:20250914"));
        assert!(record.ics.contains("DTEND;VALUE=DATE:20250915"));
    }

    #[test]
    fn test_uid_is_fresh_and_never_the_source_uid() {
        let event = make_event();
        let first = serialize_record(&event).unwrap();
        let second = serialize_record(&event).unwrap();

        assert_ne!(first.uid, second.uid);
        assert!(first.uid.ends_with("@calmirror"));
        assert_ne!(first.uid, "uid1");
        assert!(first.ics.contains(&format!("UID:{}", first.uid)));
    }

    #[test]
    fn test_origin_identity_is_embedded() {
        let record = serialize_record(&make_event()).unwrap();
        assert!(record.ics.contains("X-CALMIRROR-ORIGIN-UID:uid1"));
    }

    #[test]
    fn test_missing_origin_identity_is_an_error() {
        let mut event = make_event();
        event.origin_uid = None;
        assert!(serialize_record(&event).is_err());
    }

    #[test]
    fn test_text_escaping() {
        assert_eq!(escape_text(r"a\b"), r"a\\b");
        assert_eq!(escape_text("a;b,c"), r"a\;b\,c");
        assert_eq!(escape_text("line one\nline two"), r"line one\nline two");

        let mut event = make_event();
        event.summary = "Drinks; bring snacks, maybe".to_string();
        event.location = Some("Bar\nBasement".to_string());
        let record = serialize_record(&event).unwrap();
        assert!(record.ics.contains(r"SUMMARY:Drinks\; bring snacks\, maybe"));
        assert!(record.ics.contains(r"LOCATION:Bar\nBasement"));
    }

    #[test]
    fn test_partstat_round_trips_through_parse() {
        let mut event = make_event();
        event.partstat = Some("TENTATIVE".to_string());

        let record = serialize_record(&event).unwrap();
        let parsed = parse_event(&record.ics, "Mirror").expect("should parse back");

        assert_eq!(parsed.partstat.as_deref(), Some("TENTATIVE"));
        assert_eq!(parsed.origin_uid.as_deref(), Some("uid1"));
        assert_eq!(parsed.uid.as_deref(), Some(record.uid.as_str()));
    }
}
