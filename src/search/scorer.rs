//! Scorers turning postings and child matches into scored matches.
//!
//! Searchers treat scorers as opaque: any model can be substituted as long as
//! it exposes `weight` / `set_query_norm` and produces a [`DocumentMatch`].

pub mod conjunction;
pub mod constant;
pub mod disjunction;
pub mod term;

pub use conjunction::ConjunctionScorer;
pub use constant::ConstantScorer;
pub use disjunction::DisjunctionScorer;
pub use term::TermScorer;

use crate::search::document_match::{DocumentMatch, merge_field_term_location_maps};
use crate::search::explanation::Explanation;
use crate::search::pool::SearchContext;

/// Summed contribution of several matches for one document.
#[derive(Debug)]
pub(crate) struct Folded {
    pub(crate) head: DocumentMatch,
    pub(crate) sum: f64,
    pub(crate) explanations: Vec<Explanation>,
}

/// Drain `constituents` into its first element.
///
/// Scores are summed, explanations collected when `explain` is set, and the
/// location maps of the other matches merged into the first. Every match but
/// the first goes back to the pool. Returns `None` on an empty input.
pub(crate) fn fold_constituents(
    ctx: &mut SearchContext,
    constituents: &mut Vec<DocumentMatch>,
    explain: bool,
) -> Option<Folded> {
    let mut drain = constituents.drain(..);
    let mut head = drain.next()?;
    let mut sum = head.score;
    let mut explanations = Vec::new();
    if explain {
        explanations.extend(head.expl.take());
    }

    for mut other in drain {
        sum += other.score;
        if explain {
            explanations.extend(other.expl.take());
        }
        let locations = std::mem::take(&mut other.locations);
        merge_field_term_location_maps(&mut head.locations, locations);
        ctx.pool.put(other);
    }

    Some(Folded {
        head,
        sum,
        explanations,
    })
}
