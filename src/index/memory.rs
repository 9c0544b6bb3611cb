//! In-memory index over tokenized documents.
//!
//! Documents may carry nested child documents. Ids are assigned in pre-order
//! starting at 1: a document receives its id before any of its children, and
//! each subtree occupies one contiguous id range beginning at its root.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use ahash::AHashMap;
use regex::Regex;
use roaring::RoaringTreemap;
use serde::{Deserialize, Serialize};

use crate::error::{PhalanxError, Result};
use crate::index::{IndexReader, NestedReader, TermFieldDoc, TermFieldReader, TermFieldVector};
use crate::search::doc_id::{AncestorId, DocId};

const TOKEN_PATTERN: &str = r"\w+";

/// A field value: a single string or an array of strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Array(Vec<String>),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

/// A document to be indexed, possibly with nested children.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryDocument {
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
    #[serde(default)]
    pub children: Vec<MemoryDocument>,
}

impl MemoryDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text field.
    pub fn field<V: Into<FieldValue>>(mut self, name: &str, value: V) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    /// Add a nested child document.
    pub fn child(mut self, child: MemoryDocument) -> Self {
        self.children.push(child);
        self
    }

    /// Load an array of documents from a JSON file.
    pub fn load_json_file<P: AsRef<Path>>(path: P) -> Result<Vec<MemoryDocument>> {
        let content = fs::read_to_string(path)?;
        let docs: Vec<MemoryDocument> = serde_json::from_str(&content)?;
        Ok(docs)
    }
}

#[derive(Debug, Clone)]
struct MemoryPosting {
    id: DocId,
    freq: u64,
    norm: f64,
    vectors: Vec<TermFieldVector>,
}

type PostingKey = (String, Vec<u8>);

/// Builds a [`MemoryIndex`].
#[derive(Debug)]
pub struct MemoryIndexBuilder {
    tokenizer: Regex,
    postings: AHashMap<PostingKey, Vec<MemoryPosting>>,
    // parents[id] is the parent id, 0 for top-level documents; slot 0 is unused.
    parents: Vec<u64>,
}

impl MemoryIndexBuilder {
    /// Create a builder with the default `\w+` tokenizer.
    pub fn new() -> Result<Self> {
        let tokenizer = Regex::new(TOKEN_PATTERN)
            .map_err(|e| PhalanxError::other(format!("invalid token pattern: {e}")))?;
        Ok(MemoryIndexBuilder {
            tokenizer,
            postings: AHashMap::new(),
            parents: vec![0],
        })
    }

    /// Index a top-level document and its children. Returns the root id.
    pub fn add_document(&mut self, doc: &MemoryDocument) -> DocId {
        self.add_with_parent(doc, 0)
    }

    fn add_with_parent(&mut self, doc: &MemoryDocument, parent: u64) -> DocId {
        let id = self.parents.len() as u64;
        self.parents.push(parent);
        let doc_id = DocId::new(id);

        for (field, value) in &doc.fields {
            self.index_field(doc_id, field, value);
        }
        for child in &doc.children {
            self.add_with_parent(child, id);
        }
        doc_id
    }

    fn index_field(&mut self, id: DocId, field: &str, value: &FieldValue) {
        let elements: Vec<(&str, Vec<u64>)> = match value {
            FieldValue::Text(text) => vec![(text.as_str(), Vec::new())],
            FieldValue::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| (item.as_str(), vec![i as u64]))
                .collect(),
        };

        let mut terms: BTreeMap<String, Vec<TermFieldVector>> = BTreeMap::new();
        let mut token_count = 0u64;
        for (text, array_positions) in elements {
            for (pos, token) in self.tokenizer.find_iter(text).enumerate() {
                token_count += 1;
                terms
                    .entry(token.as_str().to_lowercase())
                    .or_default()
                    .push(TermFieldVector {
                        field: field.to_string(),
                        pos: pos as u64 + 1,
                        start: token.start() as u64,
                        end: token.end() as u64,
                        array_positions: array_positions.clone(),
                    });
            }
        }
        if token_count == 0 {
            return;
        }

        let norm = 1.0 / (token_count as f64).sqrt();
        for (term, vectors) in terms {
            let posting = MemoryPosting {
                id,
                freq: vectors.len() as u64,
                norm,
                vectors,
            };
            self.postings
                .entry((field.to_string(), term.into_bytes()))
                .or_default()
                .push(posting);
        }
    }

    /// Finish building.
    pub fn build(self) -> MemoryIndex {
        let postings = self
            .postings
            .into_iter()
            .map(|(key, list)| (key, Arc::new(list)))
            .collect();
        MemoryIndex {
            postings,
            doc_count: self.parents.len() as u64 - 1,
            nested: Arc::new(MemoryNestedReader {
                parents: Arc::new(self.parents),
            }),
        }
    }
}

/// Immutable in-memory index.
#[derive(Debug, Clone)]
pub struct MemoryIndex {
    postings: AHashMap<PostingKey, Arc<Vec<MemoryPosting>>>,
    doc_count: u64,
    nested: Arc<MemoryNestedReader>,
}

impl MemoryIndex {
    /// Index `docs` in order.
    pub fn from_documents(docs: &[MemoryDocument]) -> Result<Self> {
        let mut builder = MemoryIndexBuilder::new()?;
        for doc in docs {
            builder.add_document(doc);
        }
        Ok(builder.build())
    }

    /// Number of documents containing `term` in `field`.
    pub fn doc_freq(&self, field: &str, term: &str) -> u64 {
        self.postings
            .get(&(field.to_string(), term.as_bytes().to_vec()))
            .map(|list| list.len() as u64)
            .unwrap_or(0)
    }
}

impl IndexReader for MemoryIndex {
    fn term_field_reader(
        &self,
        term: &[u8],
        field: &str,
        include_freq: bool,
        include_norm: bool,
        include_term_vectors: bool,
    ) -> Result<Box<dyn TermFieldReader>> {
        let postings = self
            .postings
            .get(&(field.to_string(), term.to_vec()))
            .cloned()
            .unwrap_or_default();
        Ok(Box::new(MemoryTermFieldReader {
            postings,
            cursor: 0,
            include_freq,
            include_norm,
            include_term_vectors,
        }))
    }

    fn doc_count(&self) -> Result<u64> {
        Ok(self.doc_count)
    }

    fn nested_reader(&self) -> Option<Arc<dyn NestedReader>> {
        Some(self.nested.clone())
    }
}

#[derive(Debug)]
struct MemoryTermFieldReader {
    postings: Arc<Vec<MemoryPosting>>,
    cursor: usize,
    include_freq: bool,
    include_norm: bool,
    include_term_vectors: bool,
}

impl TermFieldReader for MemoryTermFieldReader {
    fn next(&mut self, doc: &mut TermFieldDoc) -> Result<bool> {
        let Some(posting) = self.postings.get(self.cursor) else {
            return Ok(false);
        };
        self.cursor += 1;

        doc.id = posting.id;
        doc.freq = if self.include_freq { posting.freq } else { 0 };
        doc.norm = if self.include_norm { posting.norm } else { 0.0 };
        doc.vectors.clear();
        if self.include_term_vectors {
            doc.vectors.extend(posting.vectors.iter().cloned());
        }
        Ok(true)
    }

    fn advance(&mut self, target: DocId, doc: &mut TermFieldDoc) -> Result<bool> {
        let rest = &self.postings[self.cursor.min(self.postings.len())..];
        self.cursor += rest.partition_point(|p| p.id < target);
        self.next(doc)
    }

    fn count(&self) -> u64 {
        self.postings.len() as u64
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    fn doc_set(&self) -> Result<Option<RoaringTreemap>> {
        let mut set = RoaringTreemap::new();
        for posting in self.postings.iter().skip(self.cursor) {
            set.insert(posting.id.value());
        }
        Ok(Some(set))
    }
}

#[derive(Debug)]
struct MemoryNestedReader {
    parents: Arc<Vec<u64>>,
}

impl NestedReader for MemoryNestedReader {
    fn ancestors(&self, id: DocId, buf: &mut Vec<AncestorId>) -> Result<()> {
        buf.clear();
        let mut current = id.value();
        while current != 0 {
            let Some(&parent) = usize::try_from(current)
                .ok()
                .and_then(|i| self.parents.get(i))
            else {
                break;
            };
            buf.push(AncestorId::new(current));
            current = parent;
        }
        Ok(())
    }
}
