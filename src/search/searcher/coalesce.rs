//! Buffer that orders and merges matches sharing a document id.

use crate::error::{PhalanxError, Result};
use crate::search::document_match::DocumentMatch;
use crate::search::pool::SearchContext;

/// Batches the matches of one join group and hands them out in id order.
///
/// Entries are appended with [`enqueue`](Self::enqueue) in any order, sorted
/// once by [`finalize`](Self::finalize), then drained with
/// [`dequeue`](Self::dequeue), which folds entries with equal ids into one.
/// Once drained the buffer accepts a new batch.
#[derive(Debug, Default)]
pub struct CoalesceBuffer {
    // descending by id once finalized, so the smallest sits at the tail
    items: Vec<DocumentMatch>,
    finalized: bool,
}

impl CoalesceBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        CoalesceBuffer {
            items: Vec::with_capacity(capacity),
            finalized: false,
        }
    }

    /// Append a match to the current batch.
    pub fn enqueue(&mut self, dm: DocumentMatch) -> Result<()> {
        if self.finalized {
            if !self.items.is_empty() {
                return Err(PhalanxError::invalid_operation(
                    "enqueue on a finalized coalesce buffer that is not drained",
                ));
            }
            self.finalized = false;
        }
        self.items.push(dm);
        Ok(())
    }

    /// Sort the batch. Must be called once after the last enqueue.
    pub fn finalize(&mut self) -> Result<()> {
        if self.finalized {
            return Err(PhalanxError::invalid_operation(
                "coalesce buffer finalized twice",
            ));
        }
        // the tail keeps the earliest enqueued entry of each id
        self.items.reverse();
        self.items.sort_by(|a, b| b.id.cmp(&a.id));
        self.finalized = true;
        Ok(())
    }

    /// Pop the smallest id, merging every other entry with the same id into it.
    ///
    /// Merged-away entries go back to the pool.
    pub fn dequeue(&mut self, ctx: &mut SearchContext) -> Result<Option<DocumentMatch>> {
        if self.items.is_empty() {
            return Ok(None);
        }
        if !self.finalized {
            return Err(PhalanxError::invalid_operation(
                "dequeue from a coalesce buffer before finalize",
            ));
        }

        let Some(mut rv) = self.items.pop() else {
            return Ok(None);
        };
        while self.items.last().is_some_and(|next| next.id == rv.id) {
            if let Some(mut dup) = self.items.pop() {
                rv.absorb(&mut dup);
                ctx.pool.put(dup);
            }
        }
        if self.items.is_empty() {
            self.finalized = false;
        }
        Ok(Some(rv))
    }

    /// Number of buffered entries, duplicates included.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Return every buffered entry to the pool.
    pub fn clear(&mut self, ctx: &mut SearchContext) {
        for dm in self.items.drain(..) {
            ctx.pool.put(dm);
        }
        self.finalized = false;
    }
}
