//! The searcher contract and the searchers implementing it.
//!
//! Every searcher, leaf or composite, is driven through [`Searcher`]:
//! `next` and `advance` yield matches in strictly ascending [`DocId`] order,
//! and `advance(target)` returns exactly what repeated `next` calls would
//! return once matches below `target` are discarded.

pub mod boolean;
pub mod coalesce;
pub mod conjunction;
pub mod disjunction;
pub mod disjunction_heap;
pub mod disjunction_slice;
pub mod docid;
pub mod match_none;
pub mod multi_term;
pub mod nested_conjunction;
pub mod phrase;
pub mod phrase_path;
pub mod term;

use std::fmt::Debug;

use roaring::RoaringTreemap;
use serde::{Deserialize, Serialize};

use crate::config::SearcherConfig;
use crate::error::Result;
use crate::search::doc_id::DocId;
use crate::search::document_match::DocumentMatch;
use crate::search::pool::SearchContext;

/// Trait for searchers.
pub trait Searcher: Send + Debug {
    /// Return the next match, or `None` once exhausted.
    fn next(&mut self, ctx: &mut SearchContext) -> Result<Option<DocumentMatch>>;

    /// Return the first match with an id `>= target`, or `None` once exhausted.
    fn advance(&mut self, ctx: &mut SearchContext, target: DocId)
    -> Result<Option<DocumentMatch>>;

    /// Release resources held by this searcher and its children.
    ///
    /// Composites close every child even when one fails, and report the
    /// first error.
    fn close(&mut self) -> Result<()>;

    /// This subtree's contribution to the query norm.
    fn weight(&self) -> f64;

    /// Push the query norm down to every leaf.
    fn set_query_norm(&mut self, query_norm: f64);

    /// Upper bound on the number of matches.
    fn count(&self) -> u64;

    /// Minimum number of children that must match, where that applies.
    fn min(&self) -> usize {
        0
    }

    /// Maximum number of matches this subtree holds at once.
    fn document_match_pool_size(&self) -> usize;

    /// Every remaining matching id, for searchers that can supply them in bulk.
    ///
    /// Used to collapse disjunctions when no score or location data is needed.
    fn doc_set(&self) -> Result<Option<RoaringTreemap>> {
        Ok(None)
    }
}

/// Owned searcher handle.
pub type BoxedSearcher = Box<dyn Searcher>;

/// Whether searchers compute scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreMode {
    /// Score every match.
    #[default]
    Default,
    /// Skip scoring; every match scores 0.
    None,
}

/// Per-query options handed to every searcher constructor.
#[derive(Debug, Clone, Default)]
pub struct SearcherOptions {
    /// Scoring mode.
    pub score: ScoreMode,
    /// Build explanation trees.
    pub explain: bool,
    /// Populate term locations on matches.
    pub include_term_vectors: bool,
    /// Construction limits.
    pub config: SearcherConfig,
}

impl SearcherOptions {
    pub fn with_score_mode(mut self, score: ScoreMode) -> Self {
        self.score = score;
        self
    }

    pub fn with_explain(mut self, explain: bool) -> Self {
        self.explain = explain;
        self
    }

    pub fn with_term_vectors(mut self, include: bool) -> Self {
        self.include_term_vectors = include;
        self
    }

    pub fn with_config(mut self, config: SearcherConfig) -> Self {
        self.config = config;
        self
    }
}

/// Compute `1 / sqrt(sum of weights)` over `searchers` and push it to each.
///
/// Each child's `weight` is already a squared contribution.
pub fn compute_query_norm(searchers: &mut [BoxedSearcher]) -> f64 {
    let sum_of_squared_weights: f64 = searchers.iter().map(|s| s.weight()).sum();
    let query_norm = if sum_of_squared_weights > 0.0 {
        1.0 / sum_of_squared_weights.sqrt()
    } else {
        1.0
    };
    for searcher in searchers.iter_mut() {
        searcher.set_query_norm(query_norm);
    }
    query_norm
}

/// Close every searcher, returning the first error encountered.
pub fn close_all<'a, I>(searchers: I) -> Result<()>
where
    I: IntoIterator<Item = &'a mut BoxedSearcher>,
{
    let mut rv = Ok(());
    for searcher in searchers {
        if let Err(e) = searcher.close() {
            if rv.is_ok() {
                rv = Err(e);
            }
        }
    }
    rv
}

/// Build a context sized for `searcher`.
pub fn search_context_for(searcher: &dyn Searcher) -> SearchContext {
    SearchContext::new(searcher.document_match_pool_size())
}

/// Drive `searcher` to exhaustion, collecting every match.
pub fn collect_all(
    searcher: &mut dyn Searcher,
    ctx: &mut SearchContext,
) -> Result<Vec<DocumentMatch>> {
    let mut rv = Vec::new();
    while let Some(dm) = searcher.next(ctx)? {
        rv.push(dm);
    }
    Ok(rv)
}
