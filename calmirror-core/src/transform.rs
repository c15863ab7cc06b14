//! Field transformation for matched records.
//!
//! Steps run in order: unconditional overrides, strip evaluation for the
//! summary, strip evaluation for the location, strip application. The origin
//! identity is captured from the pre-transform record so later overrides
//! cannot change what the record is keyed on.

use crate::config::Transform;
use crate::event::Event;
use crate::identity;

/// Collapse newlines to spaces and trim, so strip triggers match across
/// line-folded values.
fn normalize(text: &str) -> String {
    text.replace("\r\n", " ")
        .replace(['\r', '\n'], " ")
        .trim()
        .to_string()
}

/// Strip decision for one field.
///
/// Starts from the unconditional flag; any `if_contains` hit turns the strip
/// on; any `if_not_contains` entry missing from the value turns it off
/// again. The negated check runs last and wins.
fn should_strip(
    value: &str,
    unconditional: bool,
    if_contains: &[String],
    if_not_contains: &[String],
) -> bool {
    let value = normalize(value);
    let mut strip = unconditional;
    if if_contains
        .iter()
        .any(|needle| value.contains(normalize(needle).as_str()))
    {
        strip = true;
    }
    if if_not_contains
        .iter()
        .any(|needle| !value.contains(normalize(needle).as_str()))
    {
        strip = false;
    }
    strip
}

/// Apply a transform rule to a matched record.
pub fn apply(event: &Event, rule: &Transform) -> Event {
    let mut out = event.clone();

    if out.origin_uid.is_none() {
        out.origin_uid = Some(identity::identity_key(event));
    }

    if let Some(name) = &rule.set_event_name {
        out.summary = name.clone();
    }
    if let Some(location) = &rule.set_location {
        out.location = Some(location.clone());
    }
    if let Some(rsvp) = &rule.set_rsvp_status {
        out.partstat = Some(rsvp.clone());
    }

    if should_strip(
        &out.summary,
        rule.strip_name,
        &rule.strip_name_if_contains,
        &rule.strip_name_if_not_contains,
    ) {
        out.summary = String::new();
    }

    let location = out.location.clone().unwrap_or_default();
    if should_strip(
        &location,
        rule.strip_location,
        &rule.strip_location_if_contains,
        &rule.strip_location_if_not_contains,
    ) {
        out.location = Some(String::new());
    }

    out
}
