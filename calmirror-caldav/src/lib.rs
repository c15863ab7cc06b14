//! CalDAV implementation of the calmirror store contracts.
//!
//! Built on libdav over a rustls HTTP stack with basic authentication and
//! redirect following. Collection discovery walks
//! principal → calendar-home-set → calendars and matches collections by
//! display name, the way the account's web UI names them.

mod client;
mod directory;
mod requests;

pub use directory::{CalDavCollection, CalDavDirectory};
