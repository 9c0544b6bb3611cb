//! Shared fixtures for integration tests.
#![allow(dead_code)]

use phalanx::prelude::*;

/// Scores within this distance count as equal.
pub const SCORE_EPSILON: f64 = 0.001;

/// The five-document reference index.
///
/// | id | name   | desc                      | street        | title  |
/// |----|--------|---------------------------|---------------|--------|
/// | 1  | marty  | beer beer beer beer       | couchbase way |        |
/// | 2  | steve  | angst beer couch database | couchbase way | mister |
/// | 3  | dustin | apple beer column dank    |               | mister |
/// | 4  | ravi   | beer x 65                 |               |        |
/// | 5  | bobert | water                     |               | mister |
pub fn reference_index() -> Result<MemoryIndex> {
    let many_beers = vec!["beer"; 65].join(" ");
    MemoryIndex::from_documents(&[
        MemoryDocument::new()
            .field("name", "marty")
            .field("desc", "beer beer beer beer")
            .field("street", "couchbase way"),
        MemoryDocument::new()
            .field("name", "steve")
            .field("desc", "angst beer couch database")
            .field("street", "couchbase way")
            .field("title", "mister"),
        MemoryDocument::new()
            .field("name", "dustin")
            .field("desc", "apple beer column dank")
            .field("title", "mister"),
        MemoryDocument::new()
            .field("name", "ravi")
            .field("desc", many_beers.as_str()),
        MemoryDocument::new()
            .field("name", "bobert")
            .field("desc", "water")
            .field("title", "mister"),
    ])
}

/// Term searcher boxed for composition.
pub fn term(
    index: &MemoryIndex,
    field: &str,
    term: &str,
    boost: f64,
    options: &SearcherOptions,
) -> Result<BoxedSearcher> {
    Ok(Box::new(TermSearcher::new(index, term, field, boost, options)?))
}

/// Run `searcher` to exhaustion in a context sized by its own hint, then close it.
pub fn run(searcher: &mut dyn Searcher) -> Result<Vec<DocumentMatch>> {
    let mut ctx = search_context_for(&*searcher);
    let matches = collect_all(searcher, &mut ctx)?;
    searcher.close()?;
    Ok(matches)
}

/// Ids of `matches`, in order.
pub fn ids(matches: &[DocumentMatch]) -> Vec<u64> {
    matches.iter().map(|dm| dm.id.value()).collect()
}

/// Assert ids and scores of `matches` against `expected` (id, score) pairs.
pub fn assert_scores(matches: &[DocumentMatch], expected: &[(u64, f64)]) {
    assert_eq!(
        ids(matches),
        expected.iter().map(|(id, _)| *id).collect::<Vec<_>>()
    );
    for (dm, (id, score)) in matches.iter().zip(expected) {
        assert!(
            (dm.score - score).abs() < SCORE_EPSILON,
            "doc {id}: expected score {score}, got {}",
            dm.score
        );
    }
}

/// Product catalogue with nested variants and attribute documents.
///
/// Pre-order ids:
/// - 1 shirt
///   - 2 variant "cotton"
///     - 3 attr "color red"
///     - 4 attr "size large"
///   - 5 variant "linen"
///     - 6 attr "color blue"
///     - 7 attr "size large"
/// - 8 jacket
///   - 9 variant "wool"
///     - 10 attr "color red"
///     - 11 attr "color red size small"
///   - 12 variant "leather"
///     - 13 attr "size large"
/// - 14 scarf
///   - 15 variant "silk"
///     - 16 attr "color blue"
pub fn catalogue_index() -> Result<MemoryIndex> {
    MemoryIndex::from_documents(&[
        MemoryDocument::new()
            .field("name", "shirt")
            .child(variant("cotton").child(attr("color red")).child(attr("size large")))
            .child(variant("linen").child(attr("color blue")).child(attr("size large"))),
        MemoryDocument::new()
            .field("name", "jacket")
            .child(
                variant("wool")
                    .child(attr("color red"))
                    .child(attr("color red size small")),
            )
            .child(variant("leather").child(attr("size large"))),
        MemoryDocument::new()
            .field("name", "scarf")
            .child(variant("silk").child(attr("color blue"))),
    ])
}

fn attr(text: &str) -> MemoryDocument {
    MemoryDocument::new().field("attr", text)
}

fn variant(material: &str) -> MemoryDocument {
    MemoryDocument::new().field("material", material)
}
