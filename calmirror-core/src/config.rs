//! Mirror rule configuration types.
//!
//! These deserialize straight from the user's TOML configuration. Field
//! names match the configuration surface: each `[[filter_sets]]` entry pairs
//! a `filters` selector table with a `transformations` table.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

/// Everything the merge executor needs to know about a deployment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MirrorConfig {
    /// Name of the destination calendar. Unresolvable at run time is fatal.
    pub dest_calendar: String,

    #[serde(default)]
    pub retention: RetentionPolicy,

    #[serde(default)]
    pub filter_sets: Vec<FilterSet>,
}

impl MirrorConfig {
    /// Distinct source collection names selected by the filter sets,
    /// excluding the destination itself.
    pub fn source_calendars(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for set in &self.filter_sets {
            if let Some(name) = &set.filters.calendar_name {
                if name != &self.dest_calendar && !names.contains(name) {
                    names.push(name.clone());
                }
            }
        }
        names
    }
}

/// A selector paired with the transform applied to records it matches.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterSet {
    #[serde(default)]
    pub filters: EventFilter,
    #[serde(default)]
    pub transformations: Transform,
}

/// Inclusion/exclusion predicates, AND-combined at match time.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventFilter {
    pub calendar_name: Option<String>,
    pub not_calendar_name: Option<String>,
    #[serde(default)]
    pub event_name_contains: Vec<String>,
    #[serde(default)]
    pub event_name_not_contains: Vec<String>,
    #[serde(default)]
    pub location_contains: Vec<String>,
    #[serde(default)]
    pub location_not_contains: Vec<String>,
}

/// Field rewrites applied to a matched record, in declaration order:
/// overrides first, then strip evaluation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Transform {
    pub set_event_name: Option<String>,
    pub set_location: Option<String>,
    pub set_rsvp_status: Option<String>,

    #[serde(default)]
    pub strip_name: bool,
    #[serde(default)]
    pub strip_location: bool,

    #[serde(default)]
    pub strip_name_if_contains: Vec<String>,
    #[serde(default)]
    pub strip_name_if_not_contains: Vec<String>,
    #[serde(default)]
    pub strip_location_if_contains: Vec<String>,
    #[serde(default)]
    pub strip_location_if_not_contains: Vec<String>,
}

fn default_scan_future_days() -> i64 {
    90
}

/// Retention window for the mirror.
///
/// The canonical pair is `{keep_past_days, scan_future_days}`; the aliases
/// accepted on `keep_past_days` and `scan_future_days` are deprecated names
/// from earlier configuration formats, not separate behaviors.
#[derive(Debug, Clone, Deserialize)]
pub struct RetentionPolicy {
    /// Keep destination records whose end is at most this many days in the
    /// past. Absent or negative disables expiry; `0` expires every record
    /// that is already over.
    #[serde(default, alias = "max_age_days", alias = "history_days")]
    pub keep_past_days: Option<i64>,

    /// How far ahead source collections are scanned.
    #[serde(
        default = "default_scan_future_days",
        alias = "future_days",
        alias = "days_ahead"
    )]
    pub scan_future_days: i64,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        RetentionPolicy {
            keep_past_days: None,
            scan_future_days: default_scan_future_days(),
        }
    }
}

impl RetentionPolicy {
    /// Expiry cutoff relative to `now`, or `None` when expiry is disabled.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.keep_past_days
            .filter(|days| *days >= 0)
            .map(|days| now - Duration::days(days))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_source_calendars_skip_dest_and_duplicates() {
        let config: MirrorConfig = toml::from_str(
            r#"
            dest_calendar = "Mirror"

            [[filter_sets]]
            filters = { calendar_name = "Work" }

            [[filter_sets]]
            filters = { calendar_name = "Personal" }

            [[filter_sets]]
            filters = { calendar_name = "Work", event_name_contains = ["1:1"] }

            [[filter_sets]]
            filters = { calendar_name = "Mirror" }
            "#,
        )
        .unwrap();

        assert_eq!(config.source_calendars(), vec!["Work", "Personal"]);
    }

    #[test]
    fn test_retention_aliases_collapse_to_canonical_fields() {
        let policy: RetentionPolicy = toml::from_str(
            r#"
            max_age_days = 14
            days_ahead = 30
            "#,
        )
        .unwrap();

        assert_eq!(policy.keep_past_days, Some(14));
        assert_eq!(policy.scan_future_days, 30);
    }

    #[test]
    fn test_retention_cutoff() {
        let now = Utc.with_ymd_and_hms(2025, 9, 14, 12, 0, 0).unwrap();

        let policy = RetentionPolicy {
            keep_past_days: Some(7),
            ..Default::default()
        };
        assert_eq!(
            policy.cutoff(now),
            Some(Utc.with_ymd_and_hms(2025, 9, 7, 12, 0, 0).unwrap())
        );

        // 0 keeps nothing that is already over
        let zero = RetentionPolicy {
            keep_past_days: Some(0),
            ..Default::default()
        };
        assert_eq!(zero.cutoff(now), Some(now));

        // negative or absent disables expiry
        let negative = RetentionPolicy {
            keep_past_days: Some(-1),
            ..Default::default()
        };
        assert_eq!(negative.cutoff(now), None);
        assert_eq!(RetentionPolicy::default().cutoff(now), None);
    }

    #[test]
    fn test_transform_defaults_are_inert() {
        let transform: Transform = toml::from_str("").unwrap();
        assert!(transform.set_event_name.is_none());
        assert!(!transform.strip_name);
        assert!(transform.strip_location_if_not_contains.is_empty());
    }
}
