//! Boolean combination of must, should and must-not searchers.

use crate::error::Result;
use crate::search::doc_id::DocId;
use crate::search::document_match::DocumentMatch;
use crate::search::pool::SearchContext;
use crate::search::scorer::ConjunctionScorer;
use crate::search::searcher::{BoxedSearcher, Searcher, SearcherOptions, close_all};

/// Matches `must ∧ (should ∨ ¬must) ∧ ¬must_not`.
///
/// Candidates come from `must`, or from `should` when `must` is absent.
/// A candidate is dropped when `must_not` is positioned on it. It is scored
/// as `must + should` when `should` also matches, and as `must` alone when
/// `should` is absent or its minimum is zero; otherwise it is dropped.
/// With neither `must` nor `should` nothing matches.
#[derive(Debug)]
pub struct BooleanSearcher {
    must: Option<BoxedSearcher>,
    should: Option<BoxedSearcher>,
    must_not: Option<BoxedSearcher>,
    curr_must: Option<DocumentMatch>,
    curr_should: Option<DocumentMatch>,
    curr_must_not: Option<DocumentMatch>,
    current_id: Option<DocId>,
    constituents: Vec<DocumentMatch>,
    scorer: ConjunctionScorer,
    query_norm: f64,
    initialized: bool,
}

impl BooleanSearcher {
    pub fn new(
        must: Option<BoxedSearcher>,
        should: Option<BoxedSearcher>,
        must_not: Option<BoxedSearcher>,
        options: &SearcherOptions,
    ) -> Self {
        let mut rv = BooleanSearcher {
            must,
            should,
            must_not,
            curr_must: None,
            curr_should: None,
            curr_must_not: None,
            current_id: None,
            constituents: Vec::with_capacity(2),
            scorer: ConjunctionScorer::new(options),
            query_norm: 1.0,
            initialized: false,
        };
        rv.compute_query_norm();
        rv
    }

    fn compute_query_norm(&mut self) {
        let sum_of_squared_weights = self.weight();
        self.query_norm = if sum_of_squared_weights > 0.0 {
            1.0 / sum_of_squared_weights.sqrt()
        } else {
            1.0
        };
        let query_norm = self.query_norm;
        self.set_query_norm(query_norm);
    }

    fn init_searchers(&mut self, ctx: &mut SearchContext) -> Result<()> {
        if let Some(must) = &mut self.must {
            self.curr_must = must.next(ctx)?;
        }
        if let Some(should) = &mut self.should {
            self.curr_should = should.next(ctx)?;
        }
        if let Some(must_not) = &mut self.must_not {
            self.curr_must_not = must_not.next(ctx)?;
        }
        self.update_current_id();
        self.initialized = true;
        Ok(())
    }

    fn update_current_id(&mut self) {
        self.current_id = if self.must.is_some() {
            self.curr_must.as_ref().map(|dm| dm.id)
        } else {
            self.curr_should.as_ref().map(|dm| dm.id)
        };
    }

    /// Move the candidate-producing searcher forward.
    fn advance_next_must(&mut self, ctx: &mut SearchContext) -> Result<()> {
        if let Some(must) = &mut self.must {
            if let Some(dm) = self.curr_must.take() {
                ctx.pool.put(dm);
            }
            self.curr_must = must.next(ctx)?;
        } else if let Some(should) = &mut self.should {
            if let Some(dm) = self.curr_should.take() {
                ctx.pool.put(dm);
            }
            self.curr_should = should.next(ctx)?;
        }
        self.update_current_id();
        Ok(())
    }

    fn advance_part(
        ctx: &mut SearchContext,
        searcher: &mut Option<BoxedSearcher>,
        curr: &mut Option<DocumentMatch>,
        target: DocId,
    ) -> Result<()> {
        let Some(searcher) = searcher else {
            return Ok(());
        };
        if curr.as_ref().is_some_and(|dm| dm.id < target) {
            if let Some(dm) = curr.take() {
                ctx.pool.put(dm);
            }
            *curr = searcher.advance(ctx, target)?;
        }
        Ok(())
    }
}

impl Searcher for BooleanSearcher {
    fn next(&mut self, ctx: &mut SearchContext) -> Result<Option<DocumentMatch>> {
        if !self.initialized {
            self.init_searchers(ctx)?;
        }

        while let Some(current) = self.current_id {
            Self::advance_part(ctx, &mut self.must_not, &mut self.curr_must_not, current)?;
            if self
                .curr_must_not
                .as_ref()
                .is_some_and(|dm| dm.id == current)
            {
                // the candidate is excluded
                self.advance_next_must(ctx)?;
                continue;
            }

            Self::advance_part(ctx, &mut self.should, &mut self.curr_should, current)?;
            if self.curr_should.as_ref().is_some_and(|dm| dm.id == current) {
                self.constituents.clear();
                self.constituents.extend(self.curr_must.take());
                self.constituents.extend(self.curr_should.take());
                let rv = self.scorer.score(ctx, &mut self.constituents);

                // the should match was consumed above
                if self.must.is_some() {
                    if let Some(should) = &mut self.should {
                        self.curr_should = should.next(ctx)?;
                    }
                }
                self.advance_next_must(ctx)?;
                return Ok(rv);
            }

            if self.should.as_ref().is_none_or(|s| s.min() == 0) {
                self.constituents.clear();
                self.constituents.extend(self.curr_must.take());
                let rv = self.scorer.score(ctx, &mut self.constituents);
                self.advance_next_must(ctx)?;
                return Ok(rv);
            }

            self.advance_next_must(ctx)?;
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

        Self::advance_part(ctx, &mut self.must, &mut self.curr_must, target)?;
        Self::advance_part(ctx, &mut self.should, &mut self.curr_should, target)?;
        Self::advance_part(ctx, &mut self.must_not, &mut self.curr_must_not, target)?;
        self.update_current_id();

        self.next(ctx)
    }

    fn close(&mut self) -> Result<()> {
        close_all(
            self.must
                .iter_mut()
                .chain(self.should.iter_mut())
                .chain(self.must_not.iter_mut()),
        )
    }

    fn weight(&self) -> f64 {
        self.must.iter().chain(self.should.iter()).map(|s| s.weight()).sum()
    }

    fn set_query_norm(&mut self, query_norm: f64) {
        for searcher in self.must.iter_mut().chain(self.should.iter_mut()) {
            searcher.set_query_norm(query_norm);
        }
    }

    fn count(&self) -> u64 {
        // worst case
        self.must.iter().chain(self.should.iter()).map(|s| s.count()).sum()
    }

    fn document_match_pool_size(&self) -> usize {
        3 + self
            .must
            .iter()
            .chain(self.should.iter())
            .chain(self.must_not.iter())
            .map(|s| s.document_match_pool_size())
            .sum::<usize>()
    }
}
