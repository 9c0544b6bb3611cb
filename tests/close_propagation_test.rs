//! Close and construction failures propagate without leaking readers.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use common::reference_index;
use phalanx::prelude::*;
use roaring::RoaringTreemap;

/// Index whose readers count closes and fail for selected terms.
#[derive(Debug)]
struct FlakyIndex {
    inner: MemoryIndex,
    fail_close: Vec<&'static str>,
    fail_open: Vec<&'static str>,
    opened: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
}

impl FlakyIndex {
    fn new(fail_close: Vec<&'static str>, fail_open: Vec<&'static str>) -> Result<Self> {
        Ok(FlakyIndex {
            inner: reference_index()?,
            fail_close,
            fail_open,
            opened: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicUsize::new(0)),
        })
    }
}

#[derive(Debug)]
struct FlakyReader {
    inner: Box<dyn TermFieldReader>,
    term: String,
    fail_close: bool,
    closed: Arc<AtomicUsize>,
}

impl TermFieldReader for FlakyReader {
    fn next(&mut self, doc: &mut phalanx::index::TermFieldDoc) -> Result<bool> {
        self.inner.next(doc)
    }

    fn advance(&mut self, target: DocId, doc: &mut phalanx::index::TermFieldDoc) -> Result<bool> {
        self.inner.advance(target, doc)
    }

    fn count(&self) -> u64 {
        self.inner.count()
    }

    fn close(&mut self) -> Result<()> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            return Err(PhalanxError::index(format!("cannot close {}", self.term)));
        }
        self.inner.close()
    }

    fn doc_set(&self) -> Result<Option<RoaringTreemap>> {
        self.inner.doc_set()
    }
}

impl IndexReader for FlakyIndex {
    fn term_field_reader(
        &self,
        term: &[u8],
        field: &str,
        include_freq: bool,
        include_norm: bool,
        include_term_vectors: bool,
    ) -> Result<Box<dyn TermFieldReader>> {
        let text = String::from_utf8_lossy(term).to_string();
        if self.fail_open.contains(&text.as_str()) {
            return Err(PhalanxError::index(format!("cannot open {text}")));
        }
        let inner = self.inner.term_field_reader(
            term,
            field,
            include_freq,
            include_norm,
            include_term_vectors,
        )?;
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FlakyReader {
            fail_close: self.fail_close.contains(&text.as_str()),
            inner,
            term: text,
            closed: self.closed.clone(),
        }))
    }

    fn doc_count(&self) -> Result<u64> {
        self.inner.doc_count()
    }

    fn nested_reader(&self) -> Option<Arc<dyn NestedReader>> {
        self.inner.nested_reader()
    }
}

fn term(index: &FlakyIndex, field: &str, text: &str) -> Result<BoxedSearcher> {
    Ok(Box::new(TermSearcher::new(index, text, field, 1.0, &SearcherOptions::default())?))
}

#[test]
fn test_close_reports_first_error_once() -> Result<()> {
    let index = FlakyIndex::new(vec!["marty", "dustin"], Vec::new())?;
    let options = SearcherOptions::default();

    let must = ConjunctionSearcher::new(vec![term(&index, "desc", "beer")?], &options);
    let should = new_disjunction_searcher(
        vec![term(&index, "name", "marty")?, term(&index, "name", "dustin")?],
        0,
        &options,
    )?;
    let must_not = new_disjunction_searcher(vec![term(&index, "name", "steve")?], 0, &options)?;
    let must: BoxedSearcher = Box::new(must);
    let mut searcher = BooleanSearcher::new(Some(must), Some(should), Some(must_not), &options);

    let mut ctx = search_context_for(&searcher);
    assert!(searcher.next(&mut ctx)?.is_some());

    let err = searcher.close().unwrap_err();
    assert_eq!(err.to_string(), "Index error: cannot close marty");
    assert_eq!(index.closed.load(Ordering::SeqCst), 4);
    Ok(())
}

#[test]
fn test_multi_term_failure_closes_built_readers() -> Result<()> {
    let index = FlakyIndex::new(Vec::new(), vec!["ravi"])?;
    let result = new_multi_term_searcher(
        &index,
        &["marty", "steve", "ravi", "dustin"],
        "name",
        1.0,
        &SearcherOptions::default(),
        true,
    );
    assert!(matches!(result, Err(PhalanxError::Index(_))));
    assert_eq!(index.opened.load(Ordering::SeqCst), 2);
    assert_eq!(index.closed.load(Ordering::SeqCst), 2);
    Ok(())
}

#[test]
fn test_phrase_failure_closes_built_readers() -> Result<()> {
    let index = FlakyIndex::new(Vec::new(), vec!["beer"])?;
    let result = PhraseSearcher::new(&index, &["angst", "beer"], "desc", 1.0, &SearcherOptions::default());
    assert!(matches!(result, Err(PhalanxError::Index(_))));
    assert_eq!(index.opened.load(Ordering::SeqCst), 1);
    assert_eq!(index.closed.load(Ordering::SeqCst), 1);
    Ok(())
}

#[test]
fn test_too_many_clauses_closes_children() -> Result<()> {
    let index = FlakyIndex::new(Vec::new(), Vec::new())?;
    let config = SearcherConfig {
        max_clause_count: 1,
        ..SearcherConfig::default()
    };
    let options = SearcherOptions::default().with_config(config);
    let result = new_disjunction_searcher(
        vec![term(&index, "name", "marty")?, term(&index, "name", "steve")?],
        0,
        &options,
    );
    assert!(matches!(
        result,
        Err(PhalanxError::TooManyClauses { count: 2, max: 1 })
    ));
    assert_eq!(index.closed.load(Ordering::SeqCst), 2);
    Ok(())
}

#[test]
fn test_iteration_error_surfaces() -> Result<()> {
    #[derive(Debug)]
    struct BrokenReader;

    impl TermFieldReader for BrokenReader {
        fn next(&mut self, _doc: &mut phalanx::index::TermFieldDoc) -> Result<bool> {
            Err(PhalanxError::index("segment unreadable"))
        }

        fn advance(&mut self, _target: DocId, _doc: &mut phalanx::index::TermFieldDoc) -> Result<bool> {
            Err(PhalanxError::index("segment unreadable"))
        }

        fn count(&self) -> u64 {
            1
        }

        fn close(&mut self) -> Result<()> {
            Ok(())
        }
    }

    let options = SearcherOptions::default();
    let broken = TermSearcher::with_reader(Box::new(BrokenReader), b"beer", "desc", 1.0, 5, 1, &options);
    let index = reference_index()?;
    let healthy = TermSearcher::new(&index, "beer", "desc", 1.0, &options)?;
    let children: Vec<BoxedSearcher> = vec![Box::new(healthy), Box::new(broken)];
    let mut searcher = new_disjunction_searcher(children, 0, &options)?;
    let mut ctx = search_context_for(searcher.as_ref());
    let err = searcher.next(&mut ctx).unwrap_err();
    assert_eq!(err.to_string(), "Index error: segment unreadable");
    searcher.close()?;
    Ok(())
}
