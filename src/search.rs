//! Searcher iterator algebra.
//!
//! Searchers walk sorted posting lists and combine them under boolean,
//! positional and nested-document semantics. A query is one tree of boxed
//! [`Searcher`]s sharing a single [`SearchContext`].

pub mod doc_id;
pub mod document_match;
pub mod explanation;
pub mod pool;
pub mod scorer;
pub mod searcher;

pub use doc_id::{AncestorId, DocId};
pub use document_match::{DocumentMatch, FieldTermLocationMap, Location, TermLocationMap};
pub use explanation::Explanation;
pub use pool::{DocumentMatchPool, SearchContext};
pub use searcher::boolean::BooleanSearcher;
pub use searcher::coalesce::CoalesceBuffer;
pub use searcher::conjunction::{ConjunctionSearcher, new_conjunction_searcher};
pub use searcher::disjunction::new_disjunction_searcher;
pub use searcher::docid::DocIdSearcher;
pub use searcher::match_none::MatchNoneSearcher;
pub use searcher::multi_term::{
    CandidateTerm, new_fuzzy_multi_term_searcher, new_multi_term_searcher,
};
pub use searcher::nested_conjunction::NestedConjunctionSearcher;
pub use searcher::phrase::PhraseSearcher;
pub use searcher::phrase_path::{PhrasePart, PhrasePath, find_phrase_paths};
pub use searcher::term::TermSearcher;
pub use searcher::{
    BoxedSearcher, ScoreMode, Searcher, SearcherOptions, close_all, collect_all,
    compute_query_norm, search_context_for,
};
