//! N-way intersection of child searchers.

use log::debug;
use roaring::RoaringTreemap;

use crate::error::Result;
use crate::search::doc_id::DocId;
use crate::search::document_match::DocumentMatch;
use crate::search::pool::SearchContext;
use crate::search::scorer::ConjunctionScorer;
use crate::search::searcher::disjunction::unadorned_allowed;
use crate::search::searcher::docid::DocIdSearcher;
use crate::search::searcher::{
    BoxedSearcher, Searcher, SearcherOptions, close_all, compute_query_norm,
};

/// Build a conjunction, collapsing it into a bitmap leaf when scores and
/// locations are not needed and every child can list its ids in bulk.
pub fn new_conjunction_searcher(
    mut searchers: Vec<BoxedSearcher>,
    options: &SearcherOptions,
) -> Result<BoxedSearcher> {
    searchers.sort_by_key(|s| s.count());

    if searchers.len() > 1 && unadorned_allowed(options) {
        match intersect_doc_sets(&searchers) {
            Ok(Some(set)) => {
                debug!(
                    "collapsed unscored conjunction of {} children into {} ids",
                    searchers.len(),
                    set.len()
                );
                close_all(searchers.iter_mut())?;
                return Ok(Box::new(DocIdSearcher::from_doc_set(&set, 1.0, options)));
            }
            Ok(None) => {}
            Err(e) => {
                let _ = close_all(searchers.iter_mut());
                return Err(e);
            }
        }
    }

    Ok(Box::new(ConjunctionSearcher::new(searchers, options)))
}

fn intersect_doc_sets(searchers: &[BoxedSearcher]) -> Result<Option<RoaringTreemap>> {
    let mut intersection: Option<RoaringTreemap> = None;
    for searcher in searchers {
        let Some(set) = searcher.doc_set()? else {
            return Ok(None);
        };
        intersection = Some(match intersection {
            Some(mut acc) => {
                acc &= set;
                acc
            }
            None => set,
        });
    }
    Ok(intersection)
}

/// Emits a document only when every child is positioned on it.
///
/// Children are advanced towards the largest current id until they agree or
/// one of them is exhausted. The score is the sum of the children's scores.
#[derive(Debug)]
pub struct ConjunctionSearcher {
    searchers: Vec<BoxedSearcher>,
    currs: Vec<Option<DocumentMatch>>,
    constituents: Vec<DocumentMatch>,
    max_id_idx: usize,
    scorer: ConjunctionScorer,
    query_norm: f64,
    initialized: bool,
}

impl ConjunctionSearcher {
    /// Create a conjunction, leading with the child that has the fewest matches.
    pub fn new(mut searchers: Vec<BoxedSearcher>, options: &SearcherOptions) -> Self {
        searchers.sort_by_key(|s| s.count());
        let n = searchers.len();
        let mut rv = ConjunctionSearcher {
            searchers,
            currs: (0..n).map(|_| None).collect(),
            constituents: Vec::with_capacity(n),
            max_id_idx: 0,
            scorer: ConjunctionScorer::new(options),
            query_norm: 1.0,
            initialized: false,
        };
        rv.query_norm = compute_query_norm(&mut rv.searchers);
        rv
    }

    fn init_searchers(&mut self, ctx: &mut SearchContext) -> Result<()> {
        for (searcher, curr) in self.searchers.iter_mut().zip(self.currs.iter_mut()) {
            if let Some(dm) = curr.take() {
                ctx.pool.put(dm);
            }
            *curr = searcher.next(ctx)?;
        }
        self.initialized = true;
        Ok(())
    }

    fn current_id(&self, i: usize) -> Option<DocId> {
        self.currs[i].as_ref().map(|dm| dm.id)
    }

    fn advance_child(&mut self, ctx: &mut SearchContext, i: usize, target: DocId) -> Result<()> {
        if let Some(dm) = self.currs[i].take() {
            ctx.pool.put(dm);
        }
        self.currs[i] = self.searchers[i].advance(ctx, target)?;
        Ok(())
    }
}

impl Searcher for ConjunctionSearcher {
    fn next(&mut self, ctx: &mut SearchContext) -> Result<Option<DocumentMatch>> {
        if !self.initialized {
            self.init_searchers(ctx)?;
        }

        'outer: while self.max_id_idx < self.currs.len() {
            let Some(mut max_id) = self.current_id(self.max_id_idx) else {
                return Ok(None);
            };

            let mut i = 0;
            while i < self.currs.len() {
                let Some(id) = self.current_id(i) else {
                    return Ok(None);
                };
                if i == self.max_id_idx || id == max_id {
                    i += 1;
                    continue;
                }
                if id > max_id {
                    // children before i sat on the old maximum
                    self.max_id_idx = i;
                    max_id = id;
                    for x in 0..i {
                        self.advance_child(ctx, x, max_id)?;
                    }
                    continue 'outer;
                }
                // re-examine the same child after advancing it
                self.advance_child(ctx, i, max_id)?;
            }

            self.constituents.clear();
            for curr in self.currs.iter_mut() {
                self.constituents.extend(curr.take());
            }
            let rv = self.scorer.score(ctx, &mut self.constituents);

            for (searcher, curr) in self.searchers.iter_mut().zip(self.currs.iter_mut()) {
                *curr = searcher.next(ctx)?;
            }
            return Ok(rv);
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
        for i in 0..self.searchers.len() {
            if self.current_id(i).is_some_and(|id| id >= target) {
                continue;
            }
            self.advance_child(ctx, i, target)?;
        }
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
        // worst case
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
