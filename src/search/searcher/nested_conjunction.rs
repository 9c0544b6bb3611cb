//! Conjunction joined on a shared ancestor rather than a shared document.

use std::sync::Arc;

use log::{trace, warn};

use crate::error::{PhalanxError, Result};
use crate::index::{IndexReader, NestedReader};
use crate::search::doc_id::{AncestorId, DocId};
use crate::search::document_match::DocumentMatch;
use crate::search::pool::SearchContext;
use crate::search::searcher::coalesce::CoalesceBuffer;
use crate::search::searcher::{
    BoxedSearcher, Searcher, SearcherOptions, close_all, compute_query_norm,
};

/// Ancestor of a chain at `join_idx` levels below the root.
///
/// Chains shorter than the join depth yield their first entry, the document
/// itself.
fn group_key(chain: &[AncestorId], join_idx: usize) -> Option<AncestorId> {
    let last = chain.len().checked_sub(1)?;
    chain.get(last - join_idx.min(last)).copied()
}

/// Joins children that match at different nesting depths on the ancestor at
/// depth `join_idx` (0 is the root).
///
/// Once every child is positioned inside the same group, each child's whole
/// run of matches in that group is buffered, and the buffer is drained in id
/// order with matches on the same document merged. Document ids must be
/// assigned in pre-order so that each group covers one contiguous id range
/// starting at its ancestor.
#[derive(Debug)]
pub struct NestedConjunctionSearcher {
    nested: Arc<dyn NestedReader>,
    searchers: Vec<BoxedSearcher>,
    currs: Vec<Option<DocumentMatch>>,
    curr_ancestors: Vec<Vec<AncestorId>>,
    curr_keys: Vec<AncestorId>,
    target_ancestors: Vec<AncestorId>,
    join_idx: usize,
    buffer: CoalesceBuffer,
    query_norm: f64,
    initialized: bool,
    exhausted: bool,
}

impl NestedConjunctionSearcher {
    /// Create a nested join. Fails with
    /// [`Unsupported`](PhalanxError::Unsupported) when `index` has no nested
    /// documents; `searchers` are closed in that case.
    pub fn new(
        index: &dyn IndexReader,
        mut searchers: Vec<BoxedSearcher>,
        join_idx: usize,
        _options: &SearcherOptions,
    ) -> Result<Self> {
        let Some(nested) = index.nested_reader() else {
            let _ = close_all(searchers.iter_mut());
            return Err(PhalanxError::unsupported(
                "index reader does not support nested documents",
            ));
        };

        let n = searchers.len();
        trace!("nested conjunction of {n} children joined at depth {join_idx}");
        let pool_hint: usize = searchers.iter().map(|s| s.document_match_pool_size()).sum();
        let mut rv = NestedConjunctionSearcher {
            nested,
            searchers,
            currs: (0..n).map(|_| None).collect(),
            curr_ancestors: vec![Vec::new(); n],
            curr_keys: vec![AncestorId::default(); n],
            target_ancestors: Vec::new(),
            join_idx,
            buffer: CoalesceBuffer::with_capacity(pool_hint),
            query_norm: 1.0,
            initialized: false,
            exhausted: false,
        };
        rv.query_norm = compute_query_norm(&mut rv.searchers);
        Ok(rv)
    }

    /// Join depth in effect, after any clamping.
    pub fn join_idx(&self) -> usize {
        self.join_idx
    }

    fn init_searchers(&mut self, ctx: &mut SearchContext) -> Result<()> {
        self.initialized = true;
        if self.searchers.is_empty() {
            self.exhausted = true;
            return Ok(());
        }

        for i in 0..self.searchers.len() {
            if let Some(dm) = self.currs[i].take() {
                ctx.pool.put(dm);
            }
            self.currs[i] = self.searchers[i].next(ctx)?;
            let Some(id) = self.currs[i].as_ref().map(|dm| dm.id) else {
                self.exhausted = true;
                return Ok(());
            };
            self.load_ancestors(i, id)?;

            let deepest = self.curr_ancestors[i].len() - 1;
            if self.join_idx > deepest {
                warn!(
                    "nested join depth {} exceeds the depth of document {id}, clamping to {deepest}",
                    self.join_idx
                );
                self.join_idx = deepest;
            }
        }

        for i in 0..self.searchers.len() {
            self.refresh_key(i)?;
        }
        Ok(())
    }

    fn load_ancestors(&mut self, i: usize, id: DocId) -> Result<()> {
        self.nested.ancestors(id, &mut self.curr_ancestors[i])?;
        if self.curr_ancestors[i].is_empty() {
            return Err(PhalanxError::index(format!(
                "no ancestor chain for matched document {id}"
            )));
        }
        Ok(())
    }

    fn refresh_key(&mut self, i: usize) -> Result<()> {
        self.curr_keys[i] = group_key(&self.curr_ancestors[i], self.join_idx)
            .ok_or_else(|| PhalanxError::index("empty ancestor chain"))?;
        Ok(())
    }

    /// Reposition child `i`; marks the join exhausted when the child runs out.
    fn step_child(&mut self, ctx: &mut SearchContext, i: usize, target: Option<DocId>) -> Result<bool> {
        if let Some(dm) = self.currs[i].take() {
            ctx.pool.put(dm);
        }
        self.currs[i] = match target {
            Some(target) => self.searchers[i].advance(ctx, target)?,
            None => self.searchers[i].next(ctx)?,
        };
        let Some(id) = self.currs[i].as_ref().map(|dm| dm.id) else {
            self.exhausted = true;
            return Ok(false);
        };
        self.load_ancestors(i, id)?;
        self.refresh_key(i)?;
        Ok(true)
    }

    /// Align every child on one group and buffer all of its matches.
    ///
    /// Returns `false` once some child is exhausted.
    fn fill_group(&mut self, ctx: &mut SearchContext) -> Result<bool> {
        let n = self.searchers.len();
        let max_key = 'align: loop {
            if self.exhausted || self.currs.iter().any(Option::is_none) {
                self.exhausted = true;
                return Ok(false);
            }
            let Some(max_key) = self.curr_keys.iter().copied().max() else {
                return Ok(false);
            };

            for i in 0..n {
                if self.curr_keys[i] < max_key
                    && !self.step_child(ctx, i, Some(max_key.to_doc_id()))?
                {
                    return Ok(false);
                }
            }
            // an advance may have landed in a later group
            if self.curr_keys.iter().all(|key| *key == max_key) {
                break 'align max_key;
            }
        };

        for i in 0..n {
            while let Some(dm) = self.currs[i].take() {
                self.buffer.enqueue(dm)?;
                self.currs[i] = self.searchers[i].next(ctx)?;
                let Some(id) = self.currs[i].as_ref().map(|dm| dm.id) else {
                    break;
                };
                self.load_ancestors(i, id)?;
                self.refresh_key(i)?;
                if self.curr_keys[i] != max_key {
                    break;
                }
            }
        }
        self.buffer.finalize()?;
        Ok(true)
    }
}

impl Searcher for NestedConjunctionSearcher {
    fn next(&mut self, ctx: &mut SearchContext) -> Result<Option<DocumentMatch>> {
        if !self.initialized {
            self.init_searchers(ctx)?;
        }
        if !self.buffer.is_empty() {
            return self.buffer.dequeue(ctx);
        }
        if self.exhausted || !self.fill_group(ctx)? {
            return Ok(None);
        }
        self.buffer.dequeue(ctx)
    }

    fn advance(
        &mut self,
        ctx: &mut SearchContext,
        target: DocId,
    ) -> Result<Option<DocumentMatch>> {
        if !self.initialized {
            self.init_searchers(ctx)?;
        }
        while let Some(dm) = self.buffer.dequeue(ctx)? {
            if dm.id >= target {
                return Ok(Some(dm));
            }
            ctx.pool.put(dm);
        }
        if self.exhausted {
            return Ok(None);
        }

        // skip to the start of the group holding the target; matches before
        // it belong to groups that end before the target
        self.nested.ancestors(target, &mut self.target_ancestors)?;
        let group_start = group_key(&self.target_ancestors, self.join_idx)
            .map(AncestorId::to_doc_id)
            .unwrap_or(target);
        for i in 0..self.searchers.len() {
            let behind = self.currs[i].as_ref().is_some_and(|dm| dm.id < group_start);
            if behind && !self.step_child(ctx, i, Some(group_start))? {
                return Ok(None);
            }
        }

        while let Some(dm) = self.next(ctx)? {
            if dm.id >= target {
                return Ok(Some(dm));
            }
            ctx.pool.put(dm);
        }
        Ok(None)
    }

    fn close(&mut self) -> Result<()> {
        close_all(self.searchers.iter_mut())
    }

    fn weight(&self) -> f64 {
        self.searchers.iter().map(|s| s.weight()).sum()
    }

    fn set_query_norm(&mut self, query_norm: f64) {
        self.query_norm = query_norm;
        for searcher in &mut self.searchers {
            searcher.set_query_norm(query_norm);
        }
    }

    fn count(&self) -> u64 {
        self.searchers.iter().map(|s| s.count()).sum()
    }

    fn document_match_pool_size(&self) -> usize {
        self.currs.len()
            + self
                .searchers
                .iter()
                .map(|s| s.document_match_pool_size())
                .sum::<usize>()
    }
}
