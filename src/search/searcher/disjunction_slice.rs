//! Linear-scan disjunction for small fan-out.

use crate::error::Result;
use crate::search::doc_id::DocId;
use crate::search::document_match::DocumentMatch;
use crate::search::pool::SearchContext;
use crate::search::scorer::DisjunctionScorer;
use crate::search::searcher::{BoxedSearcher, Searcher, SearcherOptions, close_all};

/// Disjunction that finds the minimum id by scanning every child.
#[derive(Debug)]
pub struct DisjunctionSliceSearcher {
    searchers: Vec<BoxedSearcher>,
    currs: Vec<Option<DocumentMatch>>,
    matching_idxs: Vec<usize>,
    constituents: Vec<DocumentMatch>,
    scorer: DisjunctionScorer,
    min: usize,
    query_norm: f64,
    initialized: bool,
}

impl DisjunctionSliceSearcher {
    pub(crate) fn new(searchers: Vec<BoxedSearcher>, min: usize, options: &SearcherOptions) -> Self {
        let n = searchers.len();
        let mut rv = DisjunctionSliceSearcher {
            searchers,
            currs: (0..n).map(|_| None).collect(),
            matching_idxs: Vec::with_capacity(n),
            constituents: Vec::with_capacity(n),
            scorer: DisjunctionScorer::new(options),
            min,
            query_norm: 1.0,
            initialized: false,
        };
        rv.query_norm = super::compute_query_norm(&mut rv.searchers);
        rv
    }

    fn init_searchers(&mut self, ctx: &mut SearchContext) -> Result<()> {
        for (searcher, curr) in self.searchers.iter_mut().zip(self.currs.iter_mut()) {
            if let Some(dm) = curr.take() {
                ctx.pool.put(dm);
            }
            *curr = searcher.next(ctx)?;
        }
        self.update_matches();
        self.initialized = true;
        Ok(())
    }

    /// Recompute which children sit on the smallest current id.
    fn update_matches(&mut self) {
        self.matching_idxs.clear();
        let mut lowest: Option<DocId> = None;
        for (i, curr) in self.currs.iter().enumerate() {
            let Some(dm) = curr else { continue };
            match lowest {
                Some(id) if dm.id > id => continue,
                Some(id) if dm.id < id => self.matching_idxs.clear(),
                _ => {}
            }
            lowest = Some(dm.id);
            self.matching_idxs.push(i);
        }
    }
}

impl Searcher for DisjunctionSliceSearcher {
    fn next(&mut self, ctx: &mut SearchContext) -> Result<Option<DocumentMatch>> {
        if !self.initialized {
            self.init_searchers(ctx)?;
        }

        let total = self.searchers.len();
        while !self.matching_idxs.is_empty() {
            let matching = self.matching_idxs.len();
            let mut rv = None;
            if matching >= self.min {
                self.constituents.clear();
                for &i in &self.matching_idxs {
                    self.constituents.extend(self.currs[i].take());
                }
                rv = self
                    .scorer
                    .score(ctx, &mut self.constituents, matching, total);
            }

            for &i in &self.matching_idxs {
                if let Some(dm) = self.currs[i].take() {
                    ctx.pool.put(dm);
                }
                self.currs[i] = self.searchers[i].next(ctx)?;
            }
            self.update_matches();

            if rv.is_some() {
                return Ok(rv);
            }
        }
        Ok(None)
    }

    fn advance(
        &mut self,
        ctx: &mut SearchContext,
        target: DocId,
    ) -> Result<Option<DocumentMatch>> {
        if !self.initialized {
            self.init_searchers(ctx)?;
        }

        for (searcher, curr) in self.searchers.iter_mut().zip(self.currs.iter_mut()) {
            let behind = curr.as_ref().is_some_and(|dm| dm.id < target);
            if behind {
                if let Some(dm) = curr.take() {
                    ctx.pool.put(dm);
                }
                *curr = searcher.advance(ctx, target)?;
            }
        }
        self.update_matches();
        self.next(ctx)
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

    fn min(&self) -> usize {
        self.min
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
