//! Heap-based disjunction for large fan-out.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::error::Result;
use crate::search::doc_id::DocId;
use crate::search::document_match::DocumentMatch;
use crate::search::pool::SearchContext;
use crate::search::scorer::DisjunctionScorer;
use crate::search::searcher::{BoxedSearcher, Searcher, SearcherOptions, close_all};

/// Current match of one child, ordered so the heap pops the smallest id.
#[derive(Debug)]
struct SearcherCurr {
    curr: DocumentMatch,
    idx: usize,
}

impl PartialEq for SearcherCurr {
    fn eq(&self, other: &Self) -> bool {
        self.curr.id == other.curr.id && self.idx == other.idx
    }
}

impl Eq for SearcherCurr {}

impl PartialOrd for SearcherCurr {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SearcherCurr {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap
        other
            .curr
            .id
            .cmp(&self.curr.id)
            .then_with(|| other.idx.cmp(&self.idx))
    }
}

/// Disjunction that keeps each child's current match in a binary min-heap.
#[derive(Debug)]
pub struct DisjunctionHeapSearcher {
    searchers: Vec<BoxedSearcher>,
    heap: BinaryHeap<SearcherCurr>,
    matching: Vec<SearcherCurr>,
    constituents: Vec<DocumentMatch>,
    scorer: DisjunctionScorer,
    min: usize,
    query_norm: f64,
    initialized: bool,
}

impl DisjunctionHeapSearcher {
    pub(crate) fn new(searchers: Vec<BoxedSearcher>, min: usize, options: &SearcherOptions) -> Self {
        let n = searchers.len();
        let mut rv = DisjunctionHeapSearcher {
            searchers,
            heap: BinaryHeap::with_capacity(n),
            matching: Vec::with_capacity(n),
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
        for (idx, searcher) in self.searchers.iter_mut().enumerate() {
            if let Some(curr) = searcher.next(ctx)? {
                self.heap.push(SearcherCurr { curr, idx });
            }
        }
        self.update_matches();
        self.initialized = true;
        Ok(())
    }

    /// Pop every entry sharing the smallest id into `matching`.
    fn update_matches(&mut self) {
        debug_assert!(self.matching.is_empty());
        let Some(first) = self.heap.pop() else {
            return;
        };
        let id = first.curr.id;
        self.matching.push(first);
        while self.heap.peek().is_some_and(|top| top.curr.id == id) {
            if let Some(next) = self.heap.pop() {
                self.matching.push(next);
            }
        }
    }
}

impl Searcher for DisjunctionHeapSearcher {
    fn next(&mut self, ctx: &mut SearchContext) -> Result<Option<DocumentMatch>> {
        if !self.initialized {
            self.init_searchers(ctx)?;
        }

        let total = self.searchers.len();
        while !self.matching.is_empty() {
            let matching = self.matching.len();
            let score = matching >= self.min;

            self.constituents.clear();
            let mut idxs = Vec::with_capacity(matching);
            for entry in self.matching.drain(..) {
                idxs.push(entry.idx);
                if score {
                    self.constituents.push(entry.curr);
                } else {
                    ctx.pool.put(entry.curr);
                }
            }
            let rv = if score {
                self.scorer
                    .score(ctx, &mut self.constituents, matching, total)
            } else {
                None
            };

            for idx in idxs {
                if let Some(curr) = self.searchers[idx].next(ctx)? {
                    self.heap.push(SearcherCurr { curr, idx });
                }
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

        // put the current matching entries back before skipping
        for entry in self.matching.drain(..) {
            self.heap.push(entry);
        }

        let mut advanced = Vec::new();
        while self.heap.peek().is_some_and(|top| top.curr.id < target) {
            if let Some(entry) = self.heap.pop() {
                ctx.pool.put(entry.curr);
                if let Some(curr) = self.searchers[entry.idx].advance(ctx, target)? {
                    advanced.push(SearcherCurr {
                        curr,
                        idx: entry.idx,
                    });
                }
            }
        }
        self.heap.extend(advanced);

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
        self.searchers.len()
            + self
                .searchers
                .iter()
                .map(|s| s.document_match_pool_size())
                .sum::<usize>()
    }
}
