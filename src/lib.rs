//! # Phalanx
//!
//! Composable searcher iterators for full-text and nested-document queries.
//!
//! ## Features
//!
//! - Term, conjunction, disjunction and boolean searchers
//! - Phrase matching with slop and alternative terms
//! - Conjunctions joined on a shared ancestor of nested documents
//! - Pooled document matches and TF-IDF scoring with query normalization
//!
//! ```
//! use phalanx::prelude::*;
//!
//! let index = MemoryIndex::from_documents(&[
//!     MemoryDocument::new().field("desc", "beer and angst"),
//!     MemoryDocument::new().field("desc", "water"),
//! ])?;
//! let options = SearcherOptions::default();
//! let mut searcher = TermSearcher::new(&index, "beer", "desc", 1.0, &options)?;
//! let mut ctx = search_context_for(&searcher);
//! let hits = collect_all(&mut searcher, &mut ctx)?;
//! assert_eq!(hits.len(), 1);
//! searcher.close()?;
//! # Ok::<(), phalanx::error::PhalanxError>(())
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod index;
pub mod search;

pub mod prelude {
    pub use crate::config::SearcherConfig;
    pub use crate::error::{PhalanxError, Result};
    pub use crate::index::memory::{MemoryDocument, MemoryIndex};
    pub use crate::index::{IndexReader, NestedReader, TermFieldReader};
    pub use crate::search::*;
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
