//! Storage-side capabilities consumed by searchers.
//!
//! Searchers never touch an index format directly. They pull postings through
//! [`TermFieldReader`], document counts through [`IndexReader`] and ancestor
//! chains through [`NestedReader`]. [`memory::MemoryIndex`] implements all of
//! them over in-memory posting lists.

pub mod memory;

use std::fmt::Debug;
use std::sync::Arc;

use roaring::RoaringTreemap;

use crate::error::Result;
use crate::search::doc_id::{AncestorId, DocId};

/// One term occurrence recorded in a term vector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermFieldVector {
    pub field: String,
    pub pos: u64,
    pub start: u64,
    pub end: u64,
    pub array_positions: Vec<u64>,
}

/// Reusable record filled by a [`TermFieldReader`].
#[derive(Debug, Clone, Default)]
pub struct TermFieldDoc {
    /// Document the posting belongs to.
    pub id: DocId,
    /// Term frequency, zero unless requested.
    pub freq: u64,
    /// Field length norm, zero unless requested.
    pub norm: f64,
    /// Term vectors, empty unless requested.
    pub vectors: Vec<TermFieldVector>,
}

impl TermFieldDoc {
    /// Clear the record, keeping its vector allocation.
    pub fn reset(&mut self) {
        self.id = DocId::default();
        self.freq = 0;
        self.norm = 0.0;
        self.vectors.clear();
    }
}

/// Sorted posting stream for one (term, field) pair.
pub trait TermFieldReader: Send + Debug {
    /// Fill `doc` with the next posting. Returns `false` at exhaustion.
    fn next(&mut self, doc: &mut TermFieldDoc) -> Result<bool>;

    /// Fill `doc` with the first remaining posting whose id is `>= target`.
    fn advance(&mut self, target: DocId, doc: &mut TermFieldDoc) -> Result<bool>;

    /// Total number of postings in the list.
    fn count(&self) -> u64;

    /// Release the reader.
    fn close(&mut self) -> Result<()>;

    /// Remaining document ids as a bitmap, if the reader can supply them in bulk.
    fn doc_set(&self) -> Result<Option<RoaringTreemap>> {
        Ok(None)
    }
}

/// Access to the hierarchy of nested documents.
pub trait NestedReader: Send + Sync + Debug {
    /// Fill `buf` with the ancestor chain of `id`.
    ///
    /// Index 0 holds `id` itself and the last entry holds its root. Any
    /// previous content of `buf` is discarded. An id the reader does not hold
    /// leaves `buf` empty.
    fn ancestors(&self, id: DocId, buf: &mut Vec<AncestorId>) -> Result<()>;
}

/// Entry point searchers are built against.
pub trait IndexReader: Send + Sync + Debug {
    /// Open a posting stream for `term` in `field`.
    fn term_field_reader(
        &self,
        term: &[u8],
        field: &str,
        include_freq: bool,
        include_norm: bool,
        include_term_vectors: bool,
    ) -> Result<Box<dyn TermFieldReader>>;

    /// Number of documents in the index, nested documents included.
    fn doc_count(&self) -> Result<u64>;

    /// Nested-document capability, if this index supports it.
    fn nested_reader(&self) -> Option<Arc<dyn NestedReader>> {
        None
    }
}
