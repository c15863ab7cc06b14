//! Provider-neutral event types.
//!
//! One fixed record type flows through the whole pipeline; providers parse
//! their documents into it and the merge executor works exclusively with it.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A calendar event flowing through the mirror pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Name of the collection the event came from.
    pub collection: String,
    /// Source-native unique id, when the document carried one.
    pub uid: Option<String>,
    /// Identity captured when the event entered the transform stage.
    /// Never overwritten afterwards; serialized into destination records
    /// for idempotence and orphan detection.
    pub origin_uid: Option<String>,
    pub summary: String,
    pub location: Option<String>,
    pub start: EventTime,
    pub end: Option<EventTime>,
    /// Participation status (e.g. "ACCEPTED", "DECLINED").
    pub partstat: Option<String>,
    /// Recurrence rule of a master event. Present only between parsing and
    /// expansion; expanded instances and destination records never carry it.
    pub recurrence: Option<Recurrence>,
}

/// Recurrence data of a master event (RRULE plus exception dates).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recurrence {
    pub rrule: String,
    pub exdates: Vec<EventTime>,
}

/// An instant (UTC) or a whole calendar date.
///
/// Naive timestamps are normalized to UTC at parse time, so only these two
/// variants exist past the parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventTime {
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
}

impl EventTime {
    /// UTC instant for comparisons. Whole dates map to midnight UTC.
    pub fn to_utc(&self) -> DateTime<Utc> {
        match self {
            EventTime::Date(d) => d.and_hms_opt(0, 0, 0).unwrap().and_utc(),
            EventTime::DateTime(dt) => *dt,
        }
    }

    pub fn is_all_day(&self) -> bool {
        matches!(self, EventTime::Date(_))
    }

    /// The ICS value part (no parameters): `YYYYMMDD` or `YYYYMMDDTHHMMSSZ`.
    pub fn to_ics_string(&self) -> String {
        match self {
            EventTime::Date(d) => d.format("%Y%m%d").to_string(),
            EventTime::DateTime(dt) => dt.format("%Y%m%dT%H%M%SZ").to_string(),
        }
    }
}

impl Event {
    /// End with the serializer defaults applied: the explicit end when
    /// present, else one hour after a timed start, else the day after an
    /// all-day start.
    pub fn effective_end(&self) -> EventTime {
        match &self.end {
            Some(end) => end.clone(),
            None => match &self.start {
                EventTime::Date(d) => EventTime::Date(*d + Duration::days(1)),
                EventTime::DateTime(dt) => EventTime::DateTime(*dt + Duration::hours(1)),
            },
        }
    }
}
