//! Searcher matching nothing.

use crate::error::Result;
use crate::search::doc_id::DocId;
use crate::search::document_match::DocumentMatch;
use crate::search::pool::SearchContext;
use crate::search::searcher::Searcher;

/// Always exhausted.
#[derive(Debug, Default)]
pub struct MatchNoneSearcher;

impl MatchNoneSearcher {
    pub fn new() -> Self {
        MatchNoneSearcher
    }
}

impl Searcher for MatchNoneSearcher {
    fn next(&mut self, _ctx: &mut SearchContext) -> Result<Option<DocumentMatch>> {
        Ok(None)
    }

    fn advance(
        &mut self,
        _ctx: &mut SearchContext,
        _target: DocId,
    ) -> Result<Option<DocumentMatch>> {
        Ok(None)
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    fn weight(&self) -> f64 {
        0.0
    }

    fn set_query_norm(&mut self, _query_norm: f64) {}

    fn count(&self) -> u64 {
        0
    }

    fn document_match_pool_size(&self) -> usize {
        0
    }
}
