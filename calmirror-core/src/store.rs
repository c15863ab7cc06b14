//! Collaborator contracts for collection access.
//!
//! The engine never talks to a server directly; it goes through these
//! traits. `calmirror-caldav` provides the CalDAV implementation, and the
//! integration tests provide an in-memory one.

use crate::error::MirrorResult;
use crate::window::SyncWindow;

/// A raw calendar document fetched from a collection, paired with the
/// resource reference needed to delete it later.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub doc_ref: String,
    pub data: String,
}

/// A destination record rendered to the wire format, addressed by its
/// freshly generated uid.
#[derive(Debug, Clone, PartialEq)]
pub struct SerializedRecord {
    pub uid: String,
    pub ics: String,
}

/// One named calendar collection.
pub trait Collection {
    fn name(&self) -> &str;

    /// List documents intersecting the window. The destination snapshot is
    /// taken with an unbounded window.
    async fn list(&self, window: &SyncWindow) -> MirrorResult<Vec<RawDocument>>;

    /// Append a record. The sink must not overwrite an existing resource
    /// with the same uid.
    async fn append(&self, record: &SerializedRecord) -> MirrorResult<()>;

    /// Delete the document behind `doc_ref`. Deleting a document that is
    /// already gone is not an error.
    async fn delete(&self, doc_ref: &str) -> MirrorResult<()>;
}

/// Resolves named collections on the account.
pub trait Directory {
    type Collection: Collection;

    async fn find(&self, name: &str) -> MirrorResult<Option<Self::Collection>>;
}
