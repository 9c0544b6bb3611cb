//! Searcher over an explicit list of document ids.

use roaring::RoaringTreemap;

use crate::error::Result;
use crate::search::doc_id::DocId;
use crate::search::document_match::DocumentMatch;
use crate::search::pool::SearchContext;
use crate::search::scorer::ConstantScorer;
use crate::search::searcher::{Searcher, SearcherOptions};

/// Matches a fixed, pre-computed set of documents with a constant score.
///
/// Also stands in for disjunctions and conjunctions collapsed into a single
/// bitmap when neither scores nor locations are needed.
#[derive(Debug)]
pub struct DocIdSearcher {
    ids: Vec<DocId>,
    current_index: usize,
    scorer: ConstantScorer,
}

impl DocIdSearcher {
    /// Create a searcher over `ids`, in any order and possibly repeated.
    pub fn new(mut ids: Vec<DocId>, boost: f64, options: &SearcherOptions) -> Self {
        ids.sort_unstable();
        ids.dedup();
        DocIdSearcher {
            ids,
            current_index: 0,
            scorer: ConstantScorer::new(1.0, boost, options),
        }
    }

    /// Create a searcher over the members of a bitmap.
    pub fn from_doc_set(set: &RoaringTreemap, boost: f64, options: &SearcherOptions) -> Self {
        // treemap iteration is already ascending and unique
        DocIdSearcher {
            ids: set.iter().map(DocId::new).collect(),
            current_index: 0,
            scorer: ConstantScorer::new(1.0, boost, options),
        }
    }

    fn emit(&mut self, ctx: &mut SearchContext) -> Option<DocumentMatch> {
        let id = *self.ids.get(self.current_index)?;
        self.current_index += 1;
        Some(self.scorer.score(ctx, id))
    }
}

impl Searcher for DocIdSearcher {
    fn next(&mut self, ctx: &mut SearchContext) -> Result<Option<DocumentMatch>> {
        Ok(self.emit(ctx))
    }

    fn advance(
        &mut self,
        ctx: &mut SearchContext,
        target: DocId,
    ) -> Result<Option<DocumentMatch>> {
        let rest = &self.ids[self.current_index..];
        self.current_index += rest.partition_point(|id| *id < target);
        Ok(self.emit(ctx))
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    fn weight(&self) -> f64 {
        self.scorer.weight()
    }

    fn set_query_norm(&mut self, query_norm: f64) {
        self.scorer.set_query_norm(query_norm);
    }

    fn count(&self) -> u64 {
        self.ids.len() as u64
    }

    fn document_match_pool_size(&self) -> usize {
        1
    }

    fn doc_set(&self) -> Result<Option<RoaringTreemap>> {
        let mut set = RoaringTreemap::new();
        for id in &self.ids[self.current_index..] {
            set.insert(id.value());
        }
        Ok(Some(set))
    }
}
