//! Recurrence expansion, delegated to the rrule crate.
//!
//! Expands a recurring master into individual instances within the sync
//! window, respecting EXDATEs. Each instance becomes an independent mirror
//! item with its own identity.

use chrono::{Duration, Utc};
use rrule::RRuleSet;

use crate::error::{MirrorError, MirrorResult};
use crate::event::{Event, EventTime, Recurrence};
use crate::window::SyncWindow;

/// Upper bound on generated instances per master.
const MAX_INSTANCES: u16 = 365;

/// Build an iCalendar-format rule block for the rrule crate parser.
fn build_rrule_string(start: &EventTime, recurrence: &Recurrence) -> String {
    let mut lines = Vec::new();

    // The rrule crate needs a datetime, so all-day dates become midnight UTC
    let dtstart = match start {
        EventTime::Date(d) => format!("DTSTART:{}T000000Z", d.format("%Y%m%d")),
        EventTime::DateTime(dt) => format!("DTSTART:{}", dt.format("%Y%m%dT%H%M%SZ")),
    };
    lines.push(dtstart);

    lines.push(format!("RRULE:{}", recurrence.rrule));

    for exdate in &recurrence.exdates {
        let exdate_str = match exdate {
            EventTime::Date(d) => format!("EXDATE:{}T000000Z", d.format("%Y%m%d")),
            EventTime::DateTime(dt) => format!("EXDATE:{}", dt.format("%Y%m%dT%H%M%SZ")),
        };
        lines.push(exdate_str);
    }

    lines.join("\n")
}

fn occurrence_to_event_time(
    dt: &chrono::DateTime<rrule::Tz>,
    master_start: &EventTime,
) -> EventTime {
    match master_start {
        EventTime::Date(_) => EventTime::Date(dt.date_naive()),
        EventTime::DateTime(_) => EventTime::DateTime(dt.with_timezone(&Utc)),
    }
}

/// Expand a recurring master into instances intersecting `window`.
///
/// Instances carry a `<master-uid>-<occurrence-start>` uid so every
/// occurrence is a distinct identity, and no recurrence rule of their own.
/// The master itself is not part of the result.
pub fn expand(master: &Event, window: &SyncWindow) -> MirrorResult<Vec<Event>> {
    let Some(recurrence) = &master.recurrence else {
        return Ok(Vec::new());
    };

    let rrule_str = build_rrule_string(&master.start, recurrence);
    let rrule_set: RRuleSet = rrule_str.parse().map_err(|e| {
        MirrorError::Parse(format!("Bad RRULE on '{}': {}", master.summary, e))
    })?;

    // after/before are exclusive; widen by a second to keep the window
    // boundaries inclusive.
    let tz: rrule::Tz = Utc.into();
    let after = (window.from_or_epoch() - Duration::seconds(1)).with_timezone(&tz);
    let before = (window.to_or_horizon() + Duration::seconds(1)).with_timezone(&tz);
    let result = rrule_set.after(after).before(before).all(MAX_INSTANCES);

    let mut instances = Vec::new();
    for occurrence in &result.dates {
        let start = occurrence_to_event_time(occurrence, &master.start);

        let end = match (&master.start, master.end.as_ref()) {
            (EventTime::Date(d_start), Some(EventTime::Date(d_end))) => {
                let day_diff = (*d_end - *d_start).num_days();
                Some(EventTime::Date(occurrence.date_naive() + Duration::days(day_diff)))
            }
            (EventTime::DateTime(s), Some(e)) => {
                Some(EventTime::DateTime(occurrence.with_timezone(&Utc) + (e.to_utc() - *s)))
            }
            // No explicit end on the master: the instance gets the default
            _ => None,
        };

        let uid = master
            .uid
            .as_ref()
            .map(|uid| format!("{}-{}", uid, start.to_ics_string()));

        instances.push(Event {
            collection: master.collection.clone(),
            uid,
            origin_uid: None,
            summary: master.summary.clone(),
            location: master.location.clone(),
            start,
            end,
            partstat: master.partstat.clone(),
            recurrence: None,
        });
    }

    Ok(instances)
}
