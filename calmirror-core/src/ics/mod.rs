//! Calendar document parsing and destination record generation.

mod generate;
mod parse;

pub use generate::{escape_text, serialize_record};
pub use parse::parse_event;

/// Extension property carrying the origin identity of a mirrored record.
pub const ORIGIN_UID_PROP: &str = "X-CALMIRROR-ORIGIN-UID";
