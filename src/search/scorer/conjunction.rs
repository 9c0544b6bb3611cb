//! Additive scorer for conjunctions.

use crate::search::document_match::DocumentMatch;
use crate::search::explanation::Explanation;
use crate::search::pool::SearchContext;
use crate::search::scorer::fold_constituents;
use crate::search::searcher::SearcherOptions;

/// Scores a document as the sum of its constituents' scores.
#[derive(Debug, Clone)]
pub struct ConjunctionScorer {
    explain: bool,
}

impl ConjunctionScorer {
    pub fn new(options: &SearcherOptions) -> Self {
        ConjunctionScorer {
            explain: options.explain,
        }
    }

    /// Combine the matches every child produced for one document.
    ///
    /// Drains `constituents`; the returned match reuses the first of them.
    pub fn score(
        &self,
        ctx: &mut SearchContext,
        constituents: &mut Vec<DocumentMatch>,
    ) -> Option<DocumentMatch> {
        let folded = fold_constituents(ctx, constituents, self.explain)?;
        let mut rv = folded.head;
        rv.score = folded.sum;
        rv.expl = self
            .explain
            .then(|| Explanation::with_children(folded.sum, "sum of:", folded.explanations));
        Some(rv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::doc_id::DocId;

    #[test]
    fn test_sum_of_scores() {
        let mut ctx = SearchContext::new(4);
        let scorer = ConjunctionScorer::new(&SearcherOptions::default().with_explain(true));

        let mut constituents = Vec::new();
        for score in [0.5, 0.25, 1.0] {
            let mut dm = ctx.pool.get();
            dm.id = DocId::new(7);
            dm.score = score;
            dm.expl = Some(Explanation::new(score, "leaf"));
            constituents.push(dm);
        }

        let before = ctx.pool.available();
        let rv = scorer.score(&mut ctx, &mut constituents).unwrap();
        assert_eq!(rv.id, DocId::new(7));
        assert!((rv.score - 1.75).abs() < 1e-12);
        assert_eq!(rv.expl.unwrap().children.len(), 3);
        assert!(constituents.is_empty());
        assert_eq!(ctx.pool.available(), before + 2);
    }

    #[test]
    fn test_empty_constituents() {
        let mut ctx = SearchContext::new(0);
        let scorer = ConjunctionScorer::new(&SearcherOptions::default());
        assert!(scorer.score(&mut ctx, &mut Vec::new()).is_none());
    }
}
