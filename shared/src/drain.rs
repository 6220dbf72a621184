//! Sequential upsert of a batch of keyed documents.
//!
//! Every document is first inserted. When the store reports a duplicate key
//! a replace of that key is queued behind the remaining work, so the queue
//! can grow while it is drained. Any other store error stops the batch;
//! documents already written stay written.

use std::collections::VecDeque;
use tracing::{debug, info};

use crate::store::{Collection, Document, StoreError};
use crate::Result;

/// Kind of write performed for one unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Insert,
    Replace,
}

/// Progress event emitted after each completed unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrainProgress {
    pub completed: usize,
    /// Grows by one for every queued replace
    pub total: usize,
    pub key: String,
    pub operation: Operation,
}

/// Counts of a fully drained batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainSummary {
    pub inserted: usize,
    pub replaced: usize,
}

struct WorkItem<D> {
    doc: D,
    operation: Operation,
}

/// Render drain progress as log lines.
pub fn log_progress(progress: &DrainProgress) {
    info!(
        "Saved {} ({}/{}, {:?})",
        progress.key, progress.completed, progress.total, progress.operation
    );
}

/// Persist `documents`, turning duplicate-key inserts into replaces.
pub async fn drain<D, C, P>(collection: &C, documents: Vec<D>, mut progress: P) -> Result<DrainSummary>
where
    D: Document,
    C: Collection<D> + ?Sized,
    P: FnMut(&DrainProgress) + Send,
{
    let mut queue: VecDeque<WorkItem<D>> = documents
        .into_iter()
        .map(|doc| WorkItem {
            doc,
            operation: Operation::Insert,
        })
        .collect();

    let mut total = queue.len();
    let mut completed = 0;
    let mut summary = DrainSummary::default();

    info!("Saving {} {} documents", total, D::COLLECTION);

    while let Some(item) = queue.pop_front() {
        let key = item.doc.natural_key().to_string();

        match item.operation {
            Operation::Insert => {
                let inserted = collection.insert_one(&item.doc).await;
                match inserted {
                    Ok(()) => summary.inserted += 1,
                    Err(StoreError::DuplicateKey { .. }) => {
                        debug!("{} already exists in {}, queueing replace", key, D::COLLECTION);
                        total += 1;
                        queue.push_back(WorkItem {
                            doc: item.doc,
                            operation: Operation::Replace,
                        });
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            Operation::Replace => {
                collection.find_one_and_replace(&key, &item.doc).await?;
                summary.replaced += 1;
            }
        }

        completed += 1;
        progress(&DrainProgress {
            completed,
            total,
            key,
            operation: item.operation,
        });
    }

    info!(
        "Saved {} {} documents ({} new, {} replaced)",
        summary.inserted + summary.replaced,
        D::COLLECTION,
        summary.inserted,
        summary.replaced
    );

    Ok(summary)
}
