//! Disjunctions over externally enumerated term sets.

use crate::error::{PhalanxError, Result};
use crate::index::IndexReader;
use crate::search::searcher::disjunction::build_disjunction;
use crate::search::searcher::term::TermSearcher;
use crate::search::searcher::{BoxedSearcher, SearcherOptions, close_all};

/// A fuzzy expansion candidate and its edit distance from the query term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateTerm {
    pub term: String,
    pub distance: u8,
}

impl CandidateTerm {
    pub fn new<S: Into<String>>(term: S, distance: u8) -> Self {
        CandidateTerm {
            term: term.into(),
            distance,
        }
    }
}

/// Build a disjunction with one term searcher per entry of `terms`.
///
/// With `limit` set the fan-out is checked against `max_clause_count`.
/// Searchers already built are closed when a later one fails.
pub fn new_multi_term_searcher<S: AsRef<str>>(
    index: &dyn IndexReader,
    terms: &[S],
    field: &str,
    boost: f64,
    options: &SearcherOptions,
    limit: bool,
) -> Result<BoxedSearcher> {
    if limit {
        options.config.check_clause_count(terms.len())?;
    }

    let mut searchers: Vec<BoxedSearcher> = Vec::with_capacity(terms.len());
    for term in terms {
        match TermSearcher::new(index, term.as_ref(), field, boost, options) {
            Ok(searcher) => searchers.push(Box::new(searcher)),
            Err(e) => {
                let _ = close_all(searchers.iter_mut());
                return Err(e);
            }
        }
    }
    build_disjunction(searchers, 0, options, limit)
}

/// Build a disjunction over fuzzy candidates.
///
/// Every candidate is scored with the largest document frequency among the
/// candidates, and its boost is scaled by `1 - distance / len(term)`, so
/// closer spellings rank higher. Candidates further than `max_fuzziness`
/// are rejected.
pub fn new_fuzzy_multi_term_searcher(
    index: &dyn IndexReader,
    candidates: &[CandidateTerm],
    field: &str,
    boost: f64,
    options: &SearcherOptions,
    limit: bool,
) -> Result<BoxedSearcher> {
    if let Some(c) = candidates
        .iter()
        .find(|c| c.distance > options.config.max_fuzziness)
    {
        return Err(PhalanxError::query(format!(
            "fuzziness {} of candidate '{}' exceeds the maximum of {}",
            c.distance, c.term, options.config.max_fuzziness
        )));
    }
    if limit {
        options.config.check_clause_count(candidates.len())?;
    }

    let mut readers = Vec::with_capacity(candidates.len());
    let mut doc_term = 0;
    for candidate in candidates {
        match index.term_field_reader(
            candidate.term.as_bytes(),
            field,
            true,
            true,
            options.include_term_vectors,
        ) {
            Ok(reader) => {
                doc_term = doc_term.max(reader.count());
                readers.push(reader);
            }
            Err(e) => {
                for reader in readers.iter_mut() {
                    let _ = reader.close();
                }
                return Err(e);
            }
        }
    }

    let doc_total = match index.doc_count() {
        Ok(count) => count,
        Err(e) => {
            for reader in readers.iter_mut() {
                let _ = reader.close();
            }
            return Err(e);
        }
    };

    let searchers: Vec<BoxedSearcher> = readers
        .into_iter()
        .zip(candidates)
        .map(|(reader, candidate)| {
            let ed_boost = if candidate.distance == 0 {
                1.0
            } else {
                1.0 - f64::from(candidate.distance) / candidate.term.chars().count() as f64
            };
            Box::new(TermSearcher::with_reader(
                reader,
                candidate.term.as_bytes(),
                field,
                boost * ed_boost,
                doc_total,
                doc_term,
                options,
            )) as BoxedSearcher
        })
        .collect();
    build_disjunction(searchers, 0, options, limit)
}
