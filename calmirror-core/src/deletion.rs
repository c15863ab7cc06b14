//! Deletion triggers over destination records.
//!
//! Three independent triggers, each individually sufficient: retention
//! expiry, an explicit decline/cancel marker, and origin disappearance.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};

use crate::config::RetentionPolicy;
use crate::event::Event;

/// Summary prefix marking an event as cancelled by the user.
pub const CANCELLATION_GLYPH: &str = "❌";

/// Why a destination record is being removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionReason {
    /// Past the retention window.
    Expired,
    /// Declined or carrying the cancellation glyph.
    MarkedRemoved,
    /// Origin identity no longer present in any source.
    Orphaned,
}

impl fmt::Display for DeletionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeletionReason::Expired => write!(f, "expired"),
            DeletionReason::MarkedRemoved => write!(f, "declined or cancelled"),
            DeletionReason::Orphaned => write!(f, "gone from source"),
        }
    }
}

/// Whether a record is declined or explicitly cancelled. Used both to
/// suppress source records before transform and to remove destination
/// records.
pub fn marked_for_removal(event: &Event) -> bool {
    if let Some(partstat) = &event.partstat {
        if partstat.eq_ignore_ascii_case("DECLINED") {
            return true;
        }
    }
    event.summary.starts_with(CANCELLATION_GLYPH)
}

/// Whether a record's effective end predates the retention cutoff.
/// The keep boundary is inclusive: a record ending exactly at the cutoff
/// stays.
pub fn expired(event: &Event, policy: &RetentionPolicy, now: DateTime<Utc>) -> bool {
    match policy.cutoff(now) {
        Some(cutoff) => event.effective_end().to_utc() < cutoff,
        None => false,
    }
}

/// Evaluate the deletion triggers against one destination record.
///
/// `live_identities` is the identity set of the current run's transformed
/// records. Only records carrying an origin identity participate in orphan
/// detection; anything placed in the destination by hand is left alone.
pub fn deletion_reason(
    event: &Event,
    live_identities: &HashSet<String>,
    policy: &RetentionPolicy,
    now: DateTime<Utc>,
) -> Option<DeletionReason> {
    if expired(event, policy, now) {
        return Some(DeletionReason::Expired);
    }
    if marked_for_removal(event) {
        return Some(DeletionReason::MarkedRemoved);
    }
    if let Some(origin) = &event.origin_uid {
        if !live_identities.contains(origin) {
            return Some(DeletionReason::Orphaned);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventTime;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 14, 12, 0, 0).unwrap()
    }

    fn event(summary: &str) -> Event {
        Event {
            collection: "Mirror".to_string(),
            uid: Some("dest-uid".to_string()),
            origin_uid: None,
            summary: summary.to_string(),
            location: None,
            start: EventTime::DateTime(now() + Duration::hours(1)),
            end: None,
            partstat: None,
            recurrence: None,
        }
    }

    fn keep_days(days: i64) -> RetentionPolicy {
        RetentionPolicy {
            keep_past_days: Some(days),
            ..Default::default()
        }
    }

    #[test]
    fn test_declined_matches_any_case() {
        for status in ["DECLINED", "declined", "Declined"] {
            let mut e = event("Lunch Meeting");
            e.partstat = Some(status.to_string());
            assert!(marked_for_removal(&e), "partstat {status} should match");
        }

        let mut accepted = event("Lunch Meeting");
        accepted.partstat = Some("ACCEPTED".to_string());
        assert!(!marked_for_removal(&accepted));
    }

    #[test]
    fn test_cancellation_glyph_must_lead_the_summary() {
        assert!(marked_for_removal(&event("❌ Cancelled")));
        assert!(!marked_for_removal(&event("Party ❌")));
    }

    #[test]
    fn test_retention_keep_boundary_is_inclusive() {
        let policy = keep_days(7);

        // Ends exactly at the cutoff: kept.
        let mut at_cutoff = event("Old Meeting");
        at_cutoff.start = EventTime::DateTime(now() - Duration::days(7) - Duration::hours(1));
        at_cutoff.end = Some(EventTime::DateTime(now() - Duration::days(7)));
        assert!(!expired(&at_cutoff, &policy, now()));

        // One day further in the past: expired.
        let mut past_cutoff = at_cutoff.clone();
        past_cutoff.start = EventTime::DateTime(now() - Duration::days(8) - Duration::hours(1));
        past_cutoff.end = Some(EventTime::DateTime(now() - Duration::days(8)));
        assert!(expired(&past_cutoff, &policy, now()));
    }

    #[test]
    fn test_retention_zero_expires_everything_over() {
        let policy = keep_days(0);

        let mut over = event("Just Finished");
        over.start = EventTime::DateTime(now() - Duration::hours(2));
        over.end = Some(EventTime::DateTime(now() - Duration::minutes(5)));
        assert!(expired(&over, &policy, now()));

        let upcoming = event("Later Today");
        assert!(!expired(&upcoming, &policy, now()));
    }

    #[test]
    fn test_retention_disabled_never_expires() {
        let mut ancient = event("Ancient");
        ancient.start = EventTime::DateTime(now() - Duration::days(4000));
        ancient.end = Some(EventTime::DateTime(now() - Duration::days(4000)));

        assert!(!expired(&ancient, &RetentionPolicy::default(), now()));
        assert!(!expired(&ancient, &keep_days(-1), now()));
    }

    #[test]
    fn test_retention_uses_effective_end_not_start() {
        let policy = keep_days(0);

        // Started in the past, still running: kept.
        let mut ongoing = event("All Hands");
        ongoing.start = EventTime::DateTime(now() - Duration::hours(1));
        ongoing.end = Some(EventTime::DateTime(now() + Duration::hours(1)));
        assert!(!expired(&ongoing, &policy, now()));
    }

    #[test]
    fn test_orphan_requires_origin_identity() {
        let live = HashSet::from(["known".to_string()]);
        let policy = RetentionPolicy::default();

        let mut orphan = event("Mirrored");
        orphan.origin_uid = Some("forgotten".to_string());
        assert_eq!(
            deletion_reason(&orphan, &live, &policy, now()),
            Some(DeletionReason::Orphaned)
        );

        let mut alive = event("Mirrored");
        alive.origin_uid = Some("known".to_string());
        assert_eq!(deletion_reason(&alive, &live, &policy, now()), None);

        // Hand-placed record with no origin identity: never an orphan.
        let manual = event("Dentist");
        assert_eq!(deletion_reason(&manual, &live, &policy, now()), None);
    }
}
