//! Coordinated scorer for disjunctions.

use crate::search::document_match::DocumentMatch;
use crate::search::explanation::Explanation;
use crate::search::pool::SearchContext;
use crate::search::scorer::fold_constituents;
use crate::search::searcher::SearcherOptions;

/// Scores a document as the sum of the matching children's scores,
/// multiplied by the fraction of children that matched.
#[derive(Debug, Clone)]
pub struct DisjunctionScorer {
    explain: bool,
}

impl DisjunctionScorer {
    pub fn new(options: &SearcherOptions) -> Self {
        DisjunctionScorer {
            explain: options.explain,
        }
    }

    /// Combine the `matching` constituents of a disjunction over `total` children.
    pub fn score(
        &self,
        ctx: &mut SearchContext,
        constituents: &mut Vec<DocumentMatch>,
        matching: usize,
        total: usize,
    ) -> Option<DocumentMatch> {
        let folded = fold_constituents(ctx, constituents, self.explain)?;
        let coord = if total == 0 {
            0.0
        } else {
            matching as f64 / total as f64
        };
        let score = folded.sum * coord;

        let mut rv = folded.head;
        rv.score = score;
        rv.expl = self.explain.then(|| {
            Explanation::with_children(
                score,
                "product of:",
                vec![
                    Explanation::with_children(folded.sum, "sum of:", folded.explanations),
                    Explanation::new(coord, format!("coord({matching}/{total})")),
                ],
            )
        });
        Some(rv)
    }
}
