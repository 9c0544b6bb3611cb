//! Internal document identifiers and ancestor keys.

use std::fmt;

use byteorder::{BigEndian, ByteOrder};
use serde::{Deserialize, Serialize};

use crate::error::{PhalanxError, Result};

/// Internal document identifier.
///
/// The universal merge key of every searcher: all searchers emit matches in
/// strictly ascending `DocId` order. The byte encoding is big-endian, so the
/// lexicographic order of [`DocId::to_bytes`] equals the numeric order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct DocId(u64);

impl DocId {
    /// Width of the byte encoding.
    pub const ENCODED_LEN: usize = 8;

    /// Create a new identifier.
    pub const fn new(value: u64) -> Self {
        DocId(value)
    }

    /// Get the numeric value.
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Encode as 8 big-endian bytes.
    pub fn to_bytes(self) -> [u8; Self::ENCODED_LEN] {
        let mut buf = [0u8; Self::ENCODED_LEN];
        BigEndian::write_u64(&mut buf, self.0);
        buf
    }

    /// Decode from the big-endian byte form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::ENCODED_LEN {
            return Err(PhalanxError::index(format!(
                "invalid document id encoding: expected {} bytes, got {}",
                Self::ENCODED_LEN,
                bytes.len()
            )));
        }
        Ok(DocId(BigEndian::read_u64(bytes)))
    }
}

impl From<u64> for DocId {
    fn from(value: u64) -> Self {
        DocId(value)
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One ancestor of a nested document.
///
/// Ancestor ids order exactly like the document ids they point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AncestorId(u64);

impl AncestorId {
    /// Create a new ancestor id.
    pub const fn new(value: u64) -> Self {
        AncestorId(value)
    }

    /// The document this ancestor refers to, used to seek readers.
    pub const fn to_doc_id(self) -> DocId {
        DocId(self.0)
    }
}

impl From<DocId> for AncestorId {
    fn from(id: DocId) -> Self {
        AncestorId(id.0)
    }
}
