//! Sync window computation.

use chrono::{DateTime, Duration, Utc};

use crate::config::RetentionPolicy;

/// Time window a mirror pass operates on.
/// `None` bounds mean unbounded in that direction.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncWindow {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl SyncWindow {
    /// Window for source scans: past bound at the retention cutoff
    /// (unbounded when expiry is disabled), future bound `scan_future_days`
    /// ahead of `now`.
    pub fn from_policy(policy: &RetentionPolicy, now: DateTime<Utc>) -> Self {
        SyncWindow {
            from: policy.cutoff(now),
            to: Some(now + Duration::days(policy.scan_future_days)),
        }
    }

    /// Unbounded window, used to snapshot the destination collection.
    pub fn unbounded() -> Self {
        SyncWindow {
            from: None,
            to: None,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// Whether the span [start, end] intersects this window.
    pub fn intersects(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        if let Some(to) = self.to {
            if start >= to {
                return false;
            }
        }
        if let Some(from) = self.from {
            if end < from {
                return false;
            }
        }
        true
    }

    /// `from` with a far-past fallback when unbounded.
    pub fn from_or_epoch(&self) -> DateTime<Utc> {
        self.from
            .unwrap_or_else(|| DateTime::parse_from_rfc3339("1970-01-01T00:00:00Z").unwrap().into())
    }

    /// `to` with a far-future fallback when unbounded.
    pub fn to_or_horizon(&self) -> DateTime<Utc> {
        self.to
            .unwrap_or_else(|| DateTime::parse_from_rfc3339("2100-01-01T00:00:00Z").unwrap().into())
    }
}
