//! Source fetching and normalization.

use crate::error::MirrorResult;
use crate::event::Event;
use crate::ics;
use crate::recurrence;
use crate::store::Collection;
use crate::window::SyncWindow;

/// Events fetched from one source, plus the number of documents skipped
/// because they could not be parsed.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub events: Vec<Event>,
    pub parse_failures: usize,
}

/// Fetch all events from `source` intersecting `window`, recurring masters
/// expanded to instances.
///
/// A document that fails to parse (including one with a broken RRULE) is
/// counted and skipped; the fetch continues with the rest.
pub async fn fetch_events<C: Collection>(
    source: &C,
    window: &SyncWindow,
) -> MirrorResult<FetchOutcome> {
    let mut outcome = FetchOutcome::default();

    for doc in source.list(window).await? {
        let Some(event) = ics::parse_event(&doc.data, source.name()) else {
            outcome.parse_failures += 1;
            continue;
        };

        if event.recurrence.is_some() {
            match recurrence::expand(&event, window) {
                Ok(instances) => outcome.events.extend(instances),
                Err(_) => outcome.parse_failures += 1,
            }
        } else if in_window(&event, window) {
            outcome.events.push(event);
        }
    }

    Ok(outcome)
}

/// Whether the event's [start, effective end] span intersects the window.
/// Servers already filter on their side; this also covers sources that
/// return everything.
fn in_window(event: &Event, window: &SyncWindow) -> bool {
    window.intersects(event.start.to_utc(), event.effective_end().to_utc())
}
