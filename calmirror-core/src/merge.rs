//! The mirror pass: fetch, filter, transform, delete, insert.
//!
//! One invocation is one strictly sequential pass over fresh reads of the
//! source and destination collections. Nothing persists between passes; the
//! destination collection itself is the only durable store, and the origin
//! identity embedded in each record makes repeated passes idempotent.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::config::MirrorConfig;
use crate::deletion::{self, DeletionReason};
use crate::error::{MirrorError, MirrorResult};
use crate::event::Event;
use crate::fetch;
use crate::filter;
use crate::identity;
use crate::ics;
use crate::store::{Collection, Directory};
use crate::transform;
use crate::window::SyncWindow;

/// A destination record paired with its resource reference.
#[derive(Debug, Clone)]
pub struct DestEntry {
    pub doc_ref: String,
    pub event: Event,
}

/// A removal the pass has decided on.
#[derive(Debug, Clone)]
pub struct PlannedDeletion {
    pub entry: DestEntry,
    pub reason: DeletionReason,
}

/// What a pass would do to the destination, computed without mutating it.
#[derive(Debug)]
pub struct MirrorPlan {
    pub deletions: Vec<PlannedDeletion>,
    pub insertions: Vec<Event>,
    pub report: RunReport,
}

/// Counters for one mirror pass. Per-record failures are counted here and
/// never abort the pass.
#[derive(Debug, Default, Clone)]
pub struct RunReport {
    pub sources: usize,
    pub fetched: usize,
    pub parse_failures: usize,
    pub suppressed: usize,
    pub deleted: usize,
    pub delete_failures: usize,
    pub inserted: usize,
    pub skipped: usize,
    pub insert_failures: usize,
    /// Human-readable per-source warnings (missing calendar, failed query).
    pub warnings: Vec<String>,
}

impl RunReport {
    pub fn has_changes(&self) -> bool {
        self.deleted > 0 || self.inserted > 0
    }

    pub fn has_failures(&self) -> bool {
        self.parse_failures > 0 || self.delete_failures > 0 || self.insert_failures > 0
    }
}

/// Executes mirror passes against a collection directory.
pub struct Mirror {
    config: MirrorConfig,
}

impl Mirror {
    pub fn new(config: MirrorConfig) -> Self {
        Mirror { config }
    }

    /// Run one mirror pass: deletions first, then inserts gated on a freshly
    /// rebuilt destination index. Individual mutation failures are counted
    /// and do not abort the pass; only an unresolvable destination is fatal.
    pub async fn run<D: Directory>(&self, directory: &D) -> MirrorResult<RunReport> {
        let now = Utc::now();
        let mut report = RunReport::default();

        let dest = self.resolve_dest(directory).await?;
        let transformed = self.collect_transformed(directory, now, &mut report).await?;
        let snapshot = dest_snapshot(&dest).await?;

        let live = identity::identity_set(transformed.iter());
        let deletions = plan_deletions(snapshot, &live, &self.config, now);
        for deletion in &deletions {
            match dest.delete(&deletion.entry.doc_ref).await {
                Ok(()) => report.deleted += 1,
                Err(e) => {
                    report.delete_failures += 1;
                    report
                        .warnings
                        .push(format!("Failed to delete '{}': {}", deletion.entry.event.summary, e));
                }
            }
        }

        // Fresh read after the deletions so re-qualifying records are not
        // mistaken for already-present duplicates.
        let mut index: HashSet<String> = dest_snapshot(&dest)
            .await?
            .iter()
            .map(|entry| identity::identity_key(&entry.event))
            .collect();

        for event in &transformed {
            let key = identity::identity_key(event);
            if index.contains(&key) {
                report.skipped += 1;
                continue;
            }
            match ics::serialize_record(event) {
                Ok(record) => match dest.append(&record).await {
                    Ok(()) => {
                        index.insert(key);
                        report.inserted += 1;
                    }
                    Err(e) => {
                        report.insert_failures += 1;
                        report
                            .warnings
                            .push(format!("Failed to insert '{}': {}", event.summary, e));
                    }
                },
                Err(e) => {
                    report.insert_failures += 1;
                    report
                        .warnings
                        .push(format!("Failed to serialize '{}': {}", event.summary, e));
                }
            }
        }

        Ok(report)
    }

    /// Compute what a pass would do, without mutating the destination.
    /// The post-deletion index is derived from the snapshot instead of a
    /// second read.
    pub async fn preview<D: Directory>(&self, directory: &D) -> MirrorResult<MirrorPlan> {
        let now = Utc::now();
        let mut report = RunReport::default();

        let dest = self.resolve_dest(directory).await?;
        let transformed = self.collect_transformed(directory, now, &mut report).await?;
        let snapshot = dest_snapshot(&dest).await?;

        let mut index: HashSet<String> = snapshot
            .iter()
            .map(|entry| identity::identity_key(&entry.event))
            .collect();

        let live = identity::identity_set(transformed.iter());
        let deletions = plan_deletions(snapshot, &live, &self.config, now);
        for deletion in &deletions {
            index.remove(&identity::identity_key(&deletion.entry.event));
        }

        let mut insertions = Vec::new();
        for event in transformed {
            let key = identity::identity_key(&event);
            if index.contains(&key) {
                report.skipped += 1;
                continue;
            }
            index.insert(key);
            insertions.push(event);
        }

        Ok(MirrorPlan {
            deletions,
            insertions,
            report,
        })
    }

    async fn resolve_dest<D: Directory>(&self, directory: &D) -> MirrorResult<D::Collection> {
        directory
            .find(&self.config.dest_calendar)
            .await?
            .ok_or_else(|| {
                MirrorError::Config(format!(
                    "Destination calendar '{}' not found",
                    self.config.dest_calendar
                ))
            })
    }

    /// Fetch every configured source, then run each event through the filter
    /// sets. A record matching several sets yields one transformed record
    /// per set; the insert stage dedups on identity. Declined/cancelled
    /// records are suppressed here, which also removes their identities from
    /// the live set and lets existing mirrors fall to the orphan trigger.
    async fn collect_transformed<D: Directory>(
        &self,
        directory: &D,
        now: DateTime<Utc>,
        report: &mut RunReport,
    ) -> MirrorResult<Vec<Event>> {
        let window = SyncWindow::from_policy(&self.config.retention, now);

        let mut all_events = Vec::new();
        for name in self.config.source_calendars() {
            let Some(source) = directory.find(&name).await? else {
                report
                    .warnings
                    .push(format!("Source calendar '{}' not found", name));
                continue;
            };
            match fetch::fetch_events(&source, &window).await {
                Ok(outcome) => {
                    report.sources += 1;
                    report.fetched += outcome.events.len();
                    report.parse_failures += outcome.parse_failures;
                    all_events.extend(outcome.events);
                }
                Err(e) => {
                    report
                        .warnings
                        .push(format!("Source calendar '{}' query failed: {}", name, e));
                }
            }
        }

        let mut transformed = Vec::new();
        for set in &self.config.filter_sets {
            for event in all_events.iter().filter(|e| filter::matches(e, &set.filters)) {
                if deletion::marked_for_removal(event) {
                    report.suppressed += 1;
                    continue;
                }
                transformed.push(transform::apply(event, &set.transformations));
            }
        }

        Ok(transformed)
    }
}

/// Parse the destination's current contents. Documents that do not parse are
/// left alone; the pass only ever deletes records it understands.
async fn dest_snapshot<C: Collection>(dest: &C) -> MirrorResult<Vec<DestEntry>> {
    let mut entries = Vec::new();
    for doc in dest.list(&SyncWindow::unbounded()).await? {
        if let Some(event) = ics::parse_event(&doc.data, dest.name()) {
            entries.push(DestEntry {
                doc_ref: doc.doc_ref,
                event,
            });
        }
    }
    Ok(entries)
}

fn plan_deletions(
    snapshot: Vec<DestEntry>,
    live_identities: &HashSet<String>,
    config: &MirrorConfig,
    now: DateTime<Utc>,
) -> Vec<PlannedDeletion> {
    snapshot
        .into_iter()
        .filter_map(|entry| {
            deletion::deletion_reason(&entry.event, live_identities, &config.retention, now)
                .map(|reason| PlannedDeletion { entry, reason })
        })
        .collect()
}
