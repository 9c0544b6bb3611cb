//! Single-term leaf searcher.

use roaring::RoaringTreemap;

use crate::error::Result;
use crate::index::{IndexReader, TermFieldDoc, TermFieldReader};
use crate::search::doc_id::DocId;
use crate::search::document_match::DocumentMatch;
use crate::search::pool::SearchContext;
use crate::search::scorer::TermScorer;
use crate::search::searcher::{Searcher, SearcherOptions};

/// Walks the postings of one (term, field) pair.
///
/// One [`TermFieldDoc`] is reused across calls.
#[derive(Debug)]
pub struct TermSearcher {
    reader: Box<dyn TermFieldReader>,
    scorer: TermScorer,
    tfd: TermFieldDoc,
}

impl TermSearcher {
    /// Create a searcher for a UTF-8 term.
    pub fn new(
        index: &dyn IndexReader,
        term: &str,
        field: &str,
        boost: f64,
        options: &SearcherOptions,
    ) -> Result<Self> {
        Self::new_bytes(index, term.as_bytes(), field, boost, options)
    }

    /// Create a searcher for a raw term.
    pub fn new_bytes(
        index: &dyn IndexReader,
        term: &[u8],
        field: &str,
        boost: f64,
        options: &SearcherOptions,
    ) -> Result<Self> {
        let mut reader =
            index.term_field_reader(term, field, true, true, options.include_term_vectors)?;
        let doc_count = match index.doc_count() {
            Ok(count) => count,
            Err(e) => {
                let _ = reader.close();
                return Err(e);
            }
        };
        let doc_term = reader.count();
        Ok(Self::with_reader(
            reader, term, field, boost, doc_count, doc_term, options,
        ))
    }

    /// Create a searcher over an already opened reader with explicit statistics.
    pub fn with_reader(
        reader: Box<dyn TermFieldReader>,
        term: &[u8],
        field: &str,
        boost: f64,
        doc_total: u64,
        doc_term: u64,
        options: &SearcherOptions,
    ) -> Self {
        let scorer = TermScorer::new(
            &String::from_utf8_lossy(term),
            field,
            boost,
            doc_total,
            doc_term,
            options,
        );
        TermSearcher {
            reader,
            scorer,
            tfd: TermFieldDoc::default(),
        }
    }
}

impl Searcher for TermSearcher {
    fn next(&mut self, ctx: &mut SearchContext) -> Result<Option<DocumentMatch>> {
        self.tfd.reset();
        if !self.reader.next(&mut self.tfd)? {
            return Ok(None);
        }
        Ok(Some(self.scorer.score(ctx, &self.tfd)))
    }

    fn advance(
        &mut self,
        ctx: &mut SearchContext,
        target: DocId,
    ) -> Result<Option<DocumentMatch>> {
        self.tfd.reset();
        if !self.reader.advance(target, &mut self.tfd)? {
            return Ok(None);
        }
        Ok(Some(self.scorer.score(ctx, &self.tfd)))
    }

    fn close(&mut self) -> Result<()> {
        self.reader.close()
    }

    fn weight(&self) -> f64 {
        self.scorer.weight()
    }

    fn set_query_norm(&mut self, query_norm: f64) {
        self.scorer.set_query_norm(query_norm);
    }

    fn count(&self) -> u64 {
        self.reader.count()
    }

    fn document_match_pool_size(&self) -> usize {
        1
    }

    fn doc_set(&self) -> Result<Option<RoaringTreemap>> {
        self.reader.doc_set()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::memory::{MemoryDocument, MemoryIndex};

    fn index() -> MemoryIndex {
        MemoryIndex::from_documents(&[
            MemoryDocument::new().field("desc", "beer beer beer beer"),
            MemoryDocument::new().field("desc", "water"),
            MemoryDocument::new().field("desc", "apple beer column dank"),
        ])
        .unwrap()
    }

    #[test]
    fn test_term_searcher_next() {
        let index = index();
        let options = SearcherOptions::default();
        let mut searcher = TermSearcher::new(&index, "beer", "desc", 1.0, &options).unwrap();
        let mut ctx = SearchContext::new(searcher.document_match_pool_size());

        assert_eq!(searcher.count(), 2);
        let first = searcher.next(&mut ctx).unwrap().unwrap();
        assert_eq!(first.id, DocId::new(1));
        let second = searcher.next(&mut ctx).unwrap().unwrap();
        assert_eq!(second.id, DocId::new(3));
        assert!(first.score > second.score);
        assert!(searcher.next(&mut ctx).unwrap().is_none());
        searcher.close().unwrap();
    }

    #[test]
    fn test_term_searcher_advance() {
        let index = index();
        let options = SearcherOptions::default();
        let mut searcher = TermSearcher::new(&index, "beer", "desc", 1.0, &options).unwrap();
        let mut ctx = SearchContext::new(1);

        let dm = searcher.advance(&mut ctx, DocId::new(2)).unwrap().unwrap();
        assert_eq!(dm.id, DocId::new(3));
        assert!(searcher.advance(&mut ctx, DocId::new(4)).unwrap().is_none());
    }

    #[test]
    fn test_missing_term_is_empty() {
        let index = index();
        let options = SearcherOptions::default();
        let mut searcher = TermSearcher::new(&index, "wine", "desc", 1.0, &options).unwrap();
        let mut ctx = SearchContext::new(1);
        assert_eq!(searcher.count(), 0);
        assert!(searcher.next(&mut ctx).unwrap().is_none());
    }

    #[test]
    fn test_doc_set() {
        let index = index();
        let searcher =
            TermSearcher::new(&index, "beer", "desc", 1.0, &SearcherOptions::default()).unwrap();
        let set = searcher.doc_set().unwrap().unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![1, 3]);
    }
}
