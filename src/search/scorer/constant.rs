//! Constant scorer.

use crate::search::doc_id::DocId;
use crate::search::document_match::DocumentMatch;
use crate::search::explanation::Explanation;
use crate::search::pool::SearchContext;
use crate::search::searcher::{ScoreMode, SearcherOptions};

/// Gives every matching document the same score.
#[derive(Debug, Clone)]
pub struct ConstantScorer {
    constant: f64,
    boost: f64,
    query_norm: f64,
    query_weight: f64,
    explain: bool,
    score_mode: ScoreMode,
}

impl ConstantScorer {
    pub fn new(constant: f64, boost: f64, options: &SearcherOptions) -> Self {
        ConstantScorer {
            constant,
            boost,
            query_norm: 1.0,
            query_weight: 1.0,
            explain: options.explain,
            score_mode: options.score,
        }
    }

    pub fn weight(&self) -> f64 {
        self.boost * self.boost
    }

    pub fn set_query_norm(&mut self, query_norm: f64) {
        self.query_norm = query_norm;
        self.query_weight = self.boost * query_norm;
    }

    pub fn score(&self, ctx: &mut SearchContext, id: DocId) -> DocumentMatch {
        let mut rv = ctx.pool.get();
        rv.id = id;
        if self.score_mode == ScoreMode::None {
            return rv;
        }

        let mut score = self.constant;
        if self.query_weight != 1.0 {
            score *= self.query_weight;
        }
        rv.score = score;
        if self.explain {
            rv.expl = Some(Explanation::with_children(
                score,
                format!("ConstantScore()^{}", self.boost),
                vec![
                    Explanation::new(self.constant, "constant"),
                    Explanation::new(self.query_weight, "queryWeight"),
                ],
            ));
        }
        rv
    }
}
