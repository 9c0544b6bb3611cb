//! Disjunction construction.
//!
//! [`new_disjunction_searcher`] validates the clause count, then returns
//! either a collapsed bitmap searcher, a [`DisjunctionSliceSearcher`] or a
//! [`DisjunctionHeapSearcher`] depending on the options and the fan-out.

use log::debug;
use roaring::RoaringTreemap;

use crate::error::Result;
use crate::search::searcher::disjunction_heap::DisjunctionHeapSearcher;
use crate::search::searcher::disjunction_slice::DisjunctionSliceSearcher;
use crate::search::searcher::docid::DocIdSearcher;
use crate::search::searcher::{BoxedSearcher, ScoreMode, SearcherOptions, close_all};

/// Build a disjunction over `searchers` requiring at least `min` of them to match.
///
/// Fails with [`TooManyClauses`](crate::error::PhalanxError::TooManyClauses)
/// when the fan-out exceeds `max_clause_count`; the children are closed in
/// that case.
pub fn new_disjunction_searcher(
    searchers: Vec<BoxedSearcher>,
    min: usize,
    options: &SearcherOptions,
) -> Result<BoxedSearcher> {
    build_disjunction(searchers, min, options, true)
}

pub(crate) fn build_disjunction(
    mut searchers: Vec<BoxedSearcher>,
    min: usize,
    options: &SearcherOptions,
    limit: bool,
) -> Result<BoxedSearcher> {
    if limit {
        if let Err(e) = options.config.check_clause_count(searchers.len()) {
            let _ = close_all(searchers.iter_mut());
            return Err(e);
        }
    }

    if searchers.len() > 1 && min <= 1 && unadorned_allowed(options) {
        match union_doc_sets(&searchers) {
            Ok(Some(set)) => {
                debug!(
                    "collapsed unscored disjunction of {} children into {} ids",
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

    if searchers.len() > options.config.disjunction_heap_takeover {
        debug!(
            "disjunction of {} children uses the heap strategy",
            searchers.len()
        );
        Ok(Box::new(DisjunctionHeapSearcher::new(searchers, min, options)))
    } else {
        Ok(Box::new(DisjunctionSliceSearcher::new(searchers, min, options)))
    }
}

/// Whether composites may be collapsed into a bitmap leaf.
pub(crate) fn unadorned_allowed(options: &SearcherOptions) -> bool {
    options.config.optimize_unadorned
        && options.score == ScoreMode::None
        && !options.include_term_vectors
}

fn union_doc_sets(searchers: &[BoxedSearcher]) -> Result<Option<RoaringTreemap>> {
    let mut union = RoaringTreemap::new();
    for searcher in searchers {
        match searcher.doc_set()? {
            Some(set) => union |= set,
            None => return Ok(None),
        }
    }
    Ok(Some(union))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearcherConfig;
    use crate::error::PhalanxError;
    use crate::search::doc_id::DocId;
    use crate::search::pool::SearchContext;
    use crate::search::searcher::testing::{FailingCloseSearcher, ListSearcher, ids_of};
    use crate::search::searcher::{Searcher, collect_all, search_context_for};

    fn children() -> Vec<BoxedSearcher> {
        vec![
            Box::new(ListSearcher::new(&[(1, 1.0), (3, 1.0), (5, 1.0)])),
            Box::new(ListSearcher::new(&[(2, 1.0), (3, 1.0)])),
            Box::new(ListSearcher::new(&[(3, 1.0), (5, 1.0), (8, 1.0)])),
        ]
    }

    fn heap_options() -> SearcherOptions {
        let config = SearcherConfig {
            disjunction_heap_takeover: 1,
            ..SearcherConfig::default()
        };
        SearcherOptions::default().with_config(config)
    }

    #[test]
    fn test_union_with_coord() {
        let mut searcher =
            new_disjunction_searcher(children(), 0, &SearcherOptions::default()).unwrap();
        let mut ctx = search_context_for(searcher.as_ref());
        let matches = collect_all(searcher.as_mut(), &mut ctx).unwrap();
        assert_eq!(ids_of(&matches), vec![1, 2, 3, 5, 8]);

        // doc 3 matches all three children, doc 5 two of three
        assert!((matches[2].score - 3.0).abs() < 1e-12);
        assert!((matches[3].score - 2.0 * 2.0 / 3.0).abs() < 1e-12);
        assert!((matches[0].score - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_min_should_match() {
        for options in [SearcherOptions::default(), heap_options()] {
            let mut searcher = new_disjunction_searcher(children(), 2, &options).unwrap();
            let mut ctx = search_context_for(searcher.as_ref());
            let matches = collect_all(searcher.as_mut(), &mut ctx).unwrap();
            assert_eq!(ids_of(&matches), vec![3, 5]);
            assert_eq!(searcher.min(), 2);
        }
    }

    #[test]
    fn test_heap_matches_slice() {
        let mut slice =
            new_disjunction_searcher(children(), 1, &SearcherOptions::default()).unwrap();
        let mut heap = new_disjunction_searcher(children(), 1, &heap_options()).unwrap();
        let mut ctx = SearchContext::new(16);

        let a = collect_all(slice.as_mut(), &mut ctx).unwrap();
        let b = collect_all(heap.as_mut(), &mut ctx).unwrap();
        assert_eq!(ids_of(&a), ids_of(&b));
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x.score - y.score).abs() < 1e-12);
        }
    }

    #[test]
    fn test_advance() {
        for options in [SearcherOptions::default(), heap_options()] {
            let mut searcher = new_disjunction_searcher(children(), 0, &options).unwrap();
            let mut ctx = SearchContext::new(16);
            assert_eq!(searcher.next(&mut ctx).unwrap().unwrap().id, DocId::new(1));
            assert_eq!(
                searcher.advance(&mut ctx, DocId::new(4)).unwrap().unwrap().id,
                DocId::new(5)
            );
            assert_eq!(searcher.next(&mut ctx).unwrap().unwrap().id, DocId::new(8));
            assert!(searcher.advance(&mut ctx, DocId::new(9)).unwrap().is_none());
        }
    }

    #[test]
    fn test_empty_disjunction() {
        let mut searcher =
            new_disjunction_searcher(Vec::new(), 0, &SearcherOptions::default()).unwrap();
        let mut ctx = SearchContext::new(0);
        assert!(searcher.next(&mut ctx).unwrap().is_none());
        assert!(searcher.advance(&mut ctx, DocId::new(1)).unwrap().is_none());
    }

    #[test]
    fn test_too_many_clauses() {
        let config = SearcherConfig {
            max_clause_count: 2,
            ..SearcherConfig::default()
        };
        let options = SearcherOptions::default().with_config(config);
        let result = new_disjunction_searcher(children(), 0, &options);
        assert!(matches!(
            result,
            Err(PhalanxError::TooManyClauses { count: 3, max: 2 })
        ));
    }

    #[test]
    fn test_unadorned_collapse() {
        let options = SearcherOptions::default().with_score_mode(ScoreMode::None);
        let mut searcher = new_disjunction_searcher(children(), 1, &options).unwrap();
        // collapsed searchers expose their ids in bulk
        assert!(searcher.doc_set().unwrap().is_some());

        let mut ctx = search_context_for(searcher.as_ref());
        let matches = collect_all(searcher.as_mut(), &mut ctx).unwrap();
        assert_eq!(ids_of(&matches), vec![1, 2, 3, 5, 8]);
        assert!(matches.iter().all(|dm| dm.score == 0.0));
    }

    #[test]
    fn test_unadorned_respects_toggle() {
        let config = SearcherConfig {
            optimize_unadorned: false,
            ..SearcherConfig::default()
        };
        let options = SearcherOptions::default()
            .with_score_mode(ScoreMode::None)
            .with_config(config);
        let searcher = new_disjunction_searcher(children(), 1, &options).unwrap();
        assert!(searcher.doc_set().unwrap().is_none());
    }

    #[test]
    fn test_close_reports_first_error_and_closes_all() {
        let (first, first_closed) = FailingCloseSearcher::new("first");
        let (second, second_closed) = FailingCloseSearcher::new("second");
        let mut searcher = new_disjunction_searcher(
            vec![Box::new(first), Box::new(second)],
            0,
            &SearcherOptions::default(),
        )
        .unwrap();

        let err = searcher.close().unwrap_err();
        assert_eq!(err.to_string(), "Index error: first");
        assert!(first_closed.load(std::sync::atomic::Ordering::SeqCst));
        assert!(second_closed.load(std::sync::atomic::Ordering::SeqCst));
    }
}
