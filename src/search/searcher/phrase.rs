//! Positional phrase matching on top of a conjunction.

use std::slice;

use log::trace;

use crate::error::{PhalanxError, Result};
use crate::index::IndexReader;
use crate::search::doc_id::DocId;
use crate::search::document_match::{DocumentMatch, FieldTermLocationMap, TermLocationMap};
use crate::search::pool::SearchContext;
use crate::search::searcher::conjunction::ConjunctionSearcher;
use crate::search::searcher::multi_term::new_multi_term_searcher;
use crate::search::searcher::phrase_path::{find_phrase_paths, is_gap};
use crate::search::searcher::term::TermSearcher;
use crate::search::searcher::{BoxedSearcher, Searcher, SearcherOptions, close_all, compute_query_norm};

/// Matches documents where the phrase slots occur in order within `slop`.
///
/// A conjunction over the non-empty slots proposes candidates; each candidate
/// is then checked against its term locations. The match's `locations` are
/// replaced by the locations of the phrase paths found.
#[derive(Debug)]
pub struct PhraseSearcher {
    must: BoxedSearcher,
    slots: Vec<Vec<String>>,
    slop: u32,
    curr: Option<DocumentMatch>,
    query_norm: f64,
    initialized: bool,
}

impl PhraseSearcher {
    /// Exact phrase over `terms`. An empty string marks a positional gap.
    pub fn new(
        index: &dyn IndexReader,
        terms: &[&str],
        field: &str,
        boost: f64,
        options: &SearcherOptions,
    ) -> Result<Self> {
        let slots = terms
            .iter()
            .map(|term| {
                if term.is_empty() {
                    Vec::new()
                } else {
                    vec![term.to_string()]
                }
            })
            .collect();
        Self::new_multi(index, slots, 0, field, boost, options)
    }

    /// Phrase over slots of alternative terms with a positional budget.
    pub fn new_multi(
        index: &dyn IndexReader,
        slots: Vec<Vec<String>>,
        slop: u32,
        field: &str,
        boost: f64,
        options: &SearcherOptions,
    ) -> Result<Self> {
        if slop > options.config.max_phrase_slop {
            return Err(PhalanxError::query(format!(
                "phrase slop {slop} exceeds the maximum of {}",
                options.config.max_phrase_slop
            )));
        }
        if slots.iter().all(|slot| is_gap(slot)) {
            return Err(PhalanxError::query("phrase has no terms"));
        }

        // positions are needed to verify candidates
        let options = options.clone().with_term_vectors(true);
        let mut searchers: Vec<BoxedSearcher> = Vec::with_capacity(slots.len());
        for slot in slots.iter().filter(|slot| !is_gap(slot)) {
            let built = match slot.as_slice() {
                [term] => TermSearcher::new(index, term, field, boost, &options)
                    .map(|s| Box::new(s) as BoxedSearcher),
                terms => new_multi_term_searcher(index, terms, field, boost, &options, true),
            };
            match built {
                Ok(searcher) => searchers.push(searcher),
                Err(e) => {
                    let _ = close_all(searchers.iter_mut());
                    return Err(e);
                }
            }
        }
        trace!(
            "phrase over {} slots on field '{field}' with slop {slop}",
            slots.len()
        );

        let mut rv = PhraseSearcher {
            must: Box::new(ConjunctionSearcher::new(searchers, &options)),
            slots,
            slop,
            curr: None,
            query_norm: 1.0,
            initialized: false,
        };
        rv.query_norm = compute_query_norm(slice::from_mut(&mut rv.must));
        Ok(rv)
    }

    fn init_searchers(&mut self, ctx: &mut SearchContext) -> Result<()> {
        self.curr = self.must.next(ctx)?;
        self.initialized = true;
        Ok(())
    }

    /// Keep `dm` if at least one of its fields holds a phrase path.
    fn check_match(&self, ctx: &mut SearchContext, mut dm: DocumentMatch) -> Option<DocumentMatch> {
        let mut freq = 0;
        let mut locations = FieldTermLocationMap::new();
        for (field, tlm) in &dm.locations {
            let paths = find_phrase_paths(&self.slots, tlm, self.slop);
            if paths.is_empty() {
                continue;
            }
            freq += paths.len();

            let mut path_locations = TermLocationMap::new();
            for part in paths.into_iter().flatten() {
                let existing = path_locations.entry(part.term).or_default();
                if !existing.contains(&part.loc) {
                    existing.push(part.loc);
                }
            }
            locations.insert(field.clone(), path_locations);
        }

        if freq == 0 {
            ctx.pool.put(dm);
            return None;
        }
        dm.locations = locations;
        Some(dm)
    }
}

impl Searcher for PhraseSearcher {
    fn next(&mut self, ctx: &mut SearchContext) -> Result<Option<DocumentMatch>> {
        if !self.initialized {
            self.init_searchers(ctx)?;
        }

        while let Some(candidate) = self.curr.take() {
            let rv = self.check_match(ctx, candidate);
            self.curr = self.must.next(ctx)?;
            if rv.is_some() {
                return Ok(rv);
            }
        }
        Ok(None)
    }

    fn advance(
        &mut self,
        ctx: &mut SearchContext,
        target: DocId,
    ) -> Result<Option<DocumentMatch>> {
        if !self.initialized {
            self.init_searchers(ctx)?;
        }
        if self.curr.as_ref().is_some_and(|dm| dm.id < target) {
            if let Some(dm) = self.curr.take() {
                ctx.pool.put(dm);
            }
            self.curr = self.must.advance(ctx, target)?;
        }
        self.next(ctx)
    }

    fn close(&mut self) -> Result<()> {
        self.must.close()
    }

    fn weight(&self) -> f64 {
        self.must.weight()
    }

    fn set_query_norm(&mut self, query_norm: f64) {
        self.query_norm = query_norm;
        self.must.set_query_norm(query_norm);
    }

    fn count(&self) -> u64 {
        self.must.count()
    }

    fn document_match_pool_size(&self) -> usize {
        self.must.document_match_pool_size() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearcherConfig;
    use crate::index::memory::{MemoryDocument, MemoryIndex};
    use crate::search::searcher::testing::ids_of;
    use crate::search::searcher::{collect_all, search_context_for};

    fn index() -> MemoryIndex {
        MemoryIndex::from_documents(&[
            MemoryDocument::new().field("desc", "the quick brown fox"),
            MemoryDocument::new().field("desc", "brown quick fox"),
            MemoryDocument::new().field("desc", "quick red fox and a brown fox"),
            MemoryDocument::new().field("desc", "slow brown fox"),
        ])
        .unwrap()
    }

    fn run(searcher: &mut PhraseSearcher) -> Vec<DocumentMatch> {
        let mut ctx = search_context_for(&*searcher);
        collect_all(searcher, &mut ctx).unwrap()
    }

    fn slots(terms: &[&[&str]]) -> Vec<Vec<String>> {
        terms
            .iter()
            .map(|slot| slot.iter().map(|t| t.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_exact_phrase() {
        let index = index();
        let mut searcher =
            PhraseSearcher::new(&index, &["brown", "fox"], "desc", 1.0, &SearcherOptions::default())
                .unwrap();
        let matches = run(&mut searcher);
        assert_eq!(ids_of(&matches), vec![1, 3, 4]);

        let tlm = &matches[0].locations["desc"];
        assert_eq!(tlm["brown"][0].pos, 3);
        assert_eq!(tlm["fox"][0].pos, 4);
        // only path locations survive
        assert!(!tlm.contains_key("quick"));
        searcher.close().unwrap();
    }

    #[test]
    fn test_gap() {
        let index = index();
        let mut searcher =
            PhraseSearcher::new(&index, &["quick", "", "fox"], "desc", 1.0, &SearcherOptions::default())
                .unwrap();
        assert_eq!(ids_of(&run(&mut searcher)), vec![1, 3]);
    }

    #[test]
    fn test_slop() {
        let index = index();
        let options = SearcherOptions::default();
        let mut exact =
            PhraseSearcher::new_multi(&index, slots(&[&["quick"], &["fox"]]), 0, "desc", 1.0, &options)
                .unwrap();
        assert_eq!(ids_of(&run(&mut exact)), vec![2]);

        let mut sloppy =
            PhraseSearcher::new_multi(&index, slots(&[&["quick"], &["fox"]]), 1, "desc", 1.0, &options)
                .unwrap();
        assert_eq!(ids_of(&run(&mut sloppy)), vec![1, 2, 3]);
    }

    #[test]
    fn test_alternative_terms() {
        let index = index();
        let mut searcher = PhraseSearcher::new_multi(
            &index,
            slots(&[&["quick", "slow"], &["brown", "red"]]),
            0,
            "desc",
            1.0,
            &SearcherOptions::default(),
        )
        .unwrap();
        assert_eq!(ids_of(&run(&mut searcher)), vec![1, 3, 4]);
    }

    #[test]
    fn test_advance_skips_candidates() {
        let index = index();
        let mut searcher =
            PhraseSearcher::new(&index, &["brown", "fox"], "desc", 1.0, &SearcherOptions::default())
                .unwrap();
        let mut ctx = search_context_for(&searcher);
        let dm = searcher.advance(&mut ctx, DocId::new(2)).unwrap().unwrap();
        assert_eq!(dm.id, DocId::new(3));
        assert_eq!(searcher.next(&mut ctx).unwrap().unwrap().id, DocId::new(4));
        assert!(searcher.next(&mut ctx).unwrap().is_none());
    }

    #[test]
    fn test_construction_errors() {
        let index = index();
        let options = SearcherOptions::default();
        let empty = PhraseSearcher::new(&index, &["", ""], "desc", 1.0, &options);
        assert!(matches!(empty, Err(PhalanxError::Query(_))));

        let config = SearcherConfig {
            max_phrase_slop: 2,
            ..SearcherConfig::default()
        };
        let options = options.with_config(config);
        let result =
            PhraseSearcher::new_multi(&index, slots(&[&["quick"], &["fox"]]), 3, "desc", 1.0, &options);
        assert!(matches!(result, Err(PhalanxError::Query(_))));
    }
}
