//! Document parsing using the icalendar crate's parser.

use chrono::{DateTime, Local, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use icalendar::{
    DatePerhapsTime,
    parser::{Property, read_calendar, unfold},
};

use crate::event::{Event, EventTime, Recurrence};
use crate::ics::ORIGIN_UID_PROP;

/// Parse a raw document into an [`Event`] belonging to `collection`.
///
/// Returns `None` when the document has no usable VEVENT; the caller counts
/// and skips it.
pub fn parse_event(content: &str, collection: &str) -> Option<Event> {
    let unfolded = unfold(content);
    let calendar = read_calendar(&unfolded).ok()?;
    let vevent = calendar.components.iter().find(|c| c.name == "VEVENT")?;

    let uid = vevent.find_prop("UID").map(|p| p.val.to_string());
    let summary = vevent
        .find_prop("SUMMARY")
        .map(|p| unescape_text(p.val.as_ref()))
        .unwrap_or_default();

    let start = to_event_time(DatePerhapsTime::try_from(vevent.find_prop("DTSTART")?).ok()?);

    // End from DTEND, else DTSTART + DURATION, else left empty for the
    // serializer's default.
    let end = match vevent.find_prop("DTEND") {
        Some(prop) => DatePerhapsTime::try_from(prop).ok().map(to_event_time),
        None => vevent
            .find_prop("DURATION")
            .and_then(|p| parse_duration(p.val.as_ref()))
            .map(|duration| match &start {
                EventTime::Date(d) => EventTime::Date(*d + chrono::Duration::days(duration.num_days())),
                EventTime::DateTime(dt) => EventTime::DateTime(*dt + duration),
            }),
    };

    let location = vevent
        .find_prop("LOCATION")
        .map(|p| unescape_text(p.val.as_ref()));

    let partstat = vevent.find_prop("PARTSTAT").map(|p| p.val.to_string());

    let origin_uid = vevent.find_prop(ORIGIN_UID_PROP).map(|p| p.val.to_string());

    // Recurrence (RRULE, EXDATE) for master events
    let rrule = vevent.find_prop("RRULE").map(|p| p.val.to_string());
    let exdates: Vec<EventTime> = vevent
        .properties
        .iter()
        .filter(|p| p.name == "EXDATE")
        .flat_map(parse_exdate_property)
        .collect();
    let recurrence = rrule.map(|rrule| Recurrence { rrule, exdates });

    Some(Event {
        collection: collection.to_string(),
        uid,
        origin_uid,
        summary,
        location,
        start,
        end,
        partstat,
        recurrence,
    })
}

/// Convert icalendar's DatePerhapsTime to our EventTime, normalizing
/// everything with a time component to UTC. Naive timestamps are assumed
/// local system time.
fn to_event_time(dpt: DatePerhapsTime) -> EventTime {
    match dpt {
        DatePerhapsTime::Date(d) => EventTime::Date(d),
        DatePerhapsTime::DateTime(cal_dt) => match cal_dt {
            icalendar::CalendarDateTime::Utc(dt) => EventTime::DateTime(dt),
            icalendar::CalendarDateTime::Floating(naive) => {
                EventTime::DateTime(naive_local_to_utc(naive))
            }
            icalendar::CalendarDateTime::WithTimezone { date_time, tzid } => {
                EventTime::DateTime(zoned_to_utc(date_time, &tzid))
            }
        },
    }
}

fn naive_local_to_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => Utc.from_utc_datetime(&naive),
    }
}

fn zoned_to_utc(naive: NaiveDateTime, tzid: &str) -> DateTime<Utc> {
    match tzid.parse::<chrono_tz::Tz>() {
        Ok(tz) => match tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) => dt.with_timezone(&Utc),
            LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
            LocalResult::None => Utc.from_utc_datetime(&naive),
        },
        // Unknown TZID: treat as local system time.
        Err(_) => naive_local_to_utc(naive),
    }
}

/// Parse an EXDATE property into EventTime values.
///
/// Handles VALUE=DATE, TZID parameters, UTC and floating timestamps, and
/// comma-separated value lists.
fn parse_exdate_property(prop: &Property) -> Vec<EventTime> {
    let tzid = prop
        .params
        .iter()
        .find(|p| p.key == "TZID")
        .and_then(|p| p.val.as_ref().map(|v| v.to_string()));

    let is_date = prop
        .params
        .iter()
        .any(|p| p.key == "VALUE" && p.val.as_ref().map(|v| v.as_ref()) == Some("DATE"));

    prop.val
        .as_ref()
        .split(',')
        .filter_map(|s| {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            if is_date {
                NaiveDate::parse_from_str(s, "%Y%m%d")
                    .ok()
                    .map(EventTime::Date)
            } else if let Some(stripped) = s.strip_suffix('Z') {
                NaiveDateTime::parse_from_str(stripped, "%Y%m%dT%H%M%S")
                    .ok()
                    .map(|dt| EventTime::DateTime(dt.and_utc()))
            } else if let Some(tz) = &tzid {
                NaiveDateTime::parse_from_str(s, "%Y%m%dT%H%M%S")
                    .ok()
                    .map(|dt| EventTime::DateTime(zoned_to_utc(dt, tz)))
            } else {
                NaiveDateTime::parse_from_str(s, "%Y%m%dT%H%M%S")
                    .ok()
                    .map(|dt| EventTime::DateTime(naive_local_to_utc(dt)))
            }
        })
        .collect()
}

/// Parse an ISO 8601 DURATION value (PT1H30M, P1D, ...).
fn parse_duration(value: &str) -> Option<chrono::Duration> {
    let duration = iso8601::duration(value).ok()?;
    let std_duration: std::time::Duration = duration.into();
    chrono::Duration::from_std(std_duration).ok()
}

/// Reverse of the serializer's TEXT escaping.
fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
