//! Per-query arena of reusable document matches.

use log::debug;

use crate::search::document_match::DocumentMatch;

/// Pre-sized free list of [`DocumentMatch`] values.
///
/// Matches are checked out with [`get`](Self::get) and checked back in with
/// [`put`](Self::put). The pool is owned by one query and never shared across
/// threads or searcher trees.
#[derive(Debug)]
pub struct DocumentMatchPool {
    avail: Vec<DocumentMatch>,
    capacity: usize,
    allocated: usize,
    warned: bool,
}

impl DocumentMatchPool {
    /// Create a pool holding `size` ready matches.
    pub fn new(size: usize) -> Self {
        let avail = (0..size).map(|_| DocumentMatch::default()).collect();
        DocumentMatchPool {
            avail,
            capacity: size,
            allocated: size,
            warned: false,
        }
    }

    /// Check out a cleared match.
    pub fn get(&mut self) -> DocumentMatch {
        match self.avail.pop() {
            Some(dm) => dm,
            None => {
                self.allocated += 1;
                if !self.warned {
                    debug!(
                        "document match pool exceeded its pre-sized capacity of {}",
                        self.capacity
                    );
                    self.warned = true;
                }
                DocumentMatch::default()
            }
        }
    }

    /// Return a match to the pool.
    pub fn put(&mut self, mut dm: DocumentMatch) {
        dm.reset();
        self.avail.push(dm);
    }

    /// Number of matches ready to be checked out.
    pub fn available(&self) -> usize {
        self.avail.len()
    }

    /// Total number of matches this pool has ever created.
    pub fn allocated(&self) -> usize {
        self.allocated
    }

    /// Size the pool was created with.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// State shared by every searcher of one query while it iterates.
#[derive(Debug)]
pub struct SearchContext {
    /// Arena all matches are checked out of.
    pub pool: DocumentMatchPool,
}

impl SearchContext {
    /// Create a context whose pool holds `pool_size` matches.
    pub fn new(pool_size: usize) -> Self {
        SearchContext {
            pool: DocumentMatchPool::new(pool_size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::doc_id::DocId;

    #[test]
    fn test_pool_reuse() {
        let mut pool = DocumentMatchPool::new(2);
        assert_eq!(pool.available(), 2);

        let mut a = pool.get();
        a.id = DocId::new(5);
        a.score = 3.0;
        let _b = pool.get();
        assert_eq!(pool.available(), 0);

        pool.put(a);
        let reused = pool.get();
        assert_eq!(reused.id, DocId::default());
        assert_eq!(reused.score, 0.0);
        assert_eq!(pool.allocated(), 2);
    }

    #[test]
    fn test_pool_grows() {
        let mut pool = DocumentMatchPool::new(1);
        let _a = pool.get();
        let _b = pool.get();
        assert_eq!(pool.allocated(), 2);
        assert_eq!(pool.capacity(), 1);
    }
}
