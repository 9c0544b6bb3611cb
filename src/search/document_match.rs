//! Document matches and term location data.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::search::doc_id::DocId;
use crate::search::explanation::Explanation;

/// Position of one term occurrence inside a field value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// 1-based token position.
    pub pos: u64,
    /// Start byte offset.
    pub start: u64,
    /// End byte offset (exclusive).
    pub end: u64,
    /// Array element path the value was indexed from.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub array_positions: Vec<u64>,
}

impl Location {
    /// Create a location outside of any array.
    pub fn new(pos: u64, start: u64, end: u64) -> Self {
        Location {
            pos,
            start,
            end,
            array_positions: Vec::new(),
        }
    }

    /// Whether both locations come from the same array element.
    pub fn same_array_element(&self, other: &Location) -> bool {
        self.array_positions == other.array_positions
    }
}

/// Locations keyed by term.
pub type TermLocationMap = AHashMap<String, Vec<Location>>;

/// Term locations keyed by field.
pub type FieldTermLocationMap = AHashMap<String, TermLocationMap>;

/// Append `location` under `term`.
pub fn add_location(map: &mut TermLocationMap, term: &str, location: Location) {
    match map.get_mut(term) {
        Some(locations) => locations.push(location),
        None => {
            map.insert(term.to_string(), vec![location]);
        }
    }
}

/// Merge `src` into `dst`, skipping locations `dst` already holds.
pub fn merge_term_location_maps(dst: &mut TermLocationMap, src: TermLocationMap) {
    for (term, locations) in src {
        let existing = dst.entry(term).or_default();
        for location in locations {
            if !existing.contains(&location) {
                existing.push(location);
            }
        }
    }
}

/// Merge field-level location maps.
pub fn merge_field_term_location_maps(dst: &mut FieldTermLocationMap, src: FieldTermLocationMap) {
    for (field, terms) in src {
        match dst.get_mut(&field) {
            Some(existing) => merge_term_location_maps(existing, terms),
            None => {
                dst.insert(field, terms);
            }
        }
    }
}

/// The unit a searcher emits.
///
/// Matches are checked out of a [`DocumentMatchPool`](crate::search::pool::DocumentMatchPool)
/// and must be handed back to it by whichever searcher consumes one without
/// forwarding it.
#[derive(Debug, Clone, Default)]
pub struct DocumentMatch {
    /// Matched document.
    pub id: DocId,
    /// Accumulated score.
    pub score: f64,
    /// Score explanation, present only in explain mode.
    pub expl: Option<Explanation>,
    /// Term locations, present only when term vectors were requested.
    pub locations: FieldTermLocationMap,
}

impl DocumentMatch {
    /// Create an empty match for `id`.
    pub fn new(id: DocId) -> Self {
        DocumentMatch {
            id,
            ..Default::default()
        }
    }

    /// Clear all state so the match can be reused.
    pub fn reset(&mut self) {
        self.id = DocId::default();
        self.score = 0.0;
        self.expl = None;
        self.locations.clear();
    }

    /// Fold `other` (a match for the same document) into this one.
    ///
    /// Scores are summed and explanations and locations merged. `other` is
    /// left empty and can be returned to the pool.
    pub fn absorb(&mut self, other: &mut DocumentMatch) {
        debug_assert_eq!(self.id, other.id);
        self.score += other.score;
        self.expl = Explanation::merge_options(self.expl.take(), other.expl.take());
        let locations = std::mem::take(&mut other.locations);
        merge_field_term_location_maps(&mut self.locations, locations);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset() {
        let mut dm = DocumentMatch::new(DocId::new(3));
        dm.score = 2.0;
        dm.expl = Some(Explanation::new(2.0, "x"));
        dm.locations
            .entry("desc".to_string())
            .or_default()
            .insert("beer".to_string(), vec![Location::new(1, 0, 4)]);

        dm.reset();
        assert_eq!(dm.id, DocId::default());
        assert_eq!(dm.score, 0.0);
        assert!(dm.expl.is_none());
        assert!(dm.locations.is_empty());
    }

    #[test]
    fn test_merge_term_location_maps_dedups() {
        let mut dst = TermLocationMap::new();
        add_location(&mut dst, "beer", Location::new(1, 0, 4));

        let mut src = TermLocationMap::new();
        add_location(&mut src, "beer", Location::new(1, 0, 4));
        add_location(&mut src, "beer", Location::new(2, 5, 9));
        add_location(&mut src, "angst", Location::new(3, 10, 15));

        merge_term_location_maps(&mut dst, src);
        assert_eq!(dst["beer"].len(), 2);
        assert_eq!(dst["angst"].len(), 1);
    }

    #[test]
    fn test_absorb() {
        let mut a = DocumentMatch::new(DocId::new(9));
        a.score = 1.0;
        let mut b = DocumentMatch::new(DocId::new(9));
        b.score = 0.5;
        b.locations
            .entry("f".to_string())
            .or_default()
            .insert("t".to_string(), vec![Location::new(4, 0, 1)]);

        a.absorb(&mut b);
        assert!((a.score - 1.5).abs() < 1e-12);
        assert_eq!(a.locations["f"]["t"].len(), 1);
        assert!(b.locations.is_empty());
    }

    #[test]
    fn test_same_array_element() {
        let mut a = Location::new(1, 0, 1);
        let mut b = Location::new(2, 2, 3);
        assert!(a.same_array_element(&b));
        a.array_positions = vec![0];
        b.array_positions = vec![1];
        assert!(!a.same_array_element(&b));
    }
}
