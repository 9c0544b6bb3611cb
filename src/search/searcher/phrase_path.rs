//! Backtracking search for phrase paths over term locations.

use crate::search::document_match::{Location, TermLocationMap};

/// One chosen occurrence along a phrase path.
#[derive(Debug, Clone, PartialEq)]
pub struct PhrasePart {
    pub term: String,
    pub loc: Location,
}

/// One location per non-empty phrase slot, in phrase order.
pub type PhrasePath = Vec<PhrasePart>;

/// Whether a slot is a positional gap.
pub(crate) fn is_gap(slot: &[String]) -> bool {
    slot.is_empty() || (slot.len() == 1 && slot[0].is_empty())
}

/// Find every path through `phrase` allowed by `tlm` within `slop`.
///
/// Each slot lists the terms acceptable at that position; an empty slot (or
/// a slot holding only `""`) is a gap. Moving from a location at `p` to one
/// at `q` costs `|p + 1 - q|` against the slop budget, so slop 0 requires
/// exact adjacency. Every location of a path comes from the same array
/// element, and no term occurrence is used twice in one path.
pub fn find_phrase_paths(phrase: &[Vec<String>], tlm: &TermLocationMap, slop: u32) -> Vec<PhrasePath> {
    let mut rv = Vec::new();
    let mut path = Vec::with_capacity(phrase.len());
    search(0, &[], phrase, tlm, &mut path, i64::from(slop), &mut rv);
    rv
}

/// A chosen location: term key, index into that term's locations, location.
type PathStep<'a> = (&'a str, usize, &'a Location);

fn search<'a>(
    prev_pos: u64,
    array_positions: &[u64],
    phrase: &[Vec<String>],
    tlm: &'a TermLocationMap,
    path: &mut Vec<PathStep<'a>>,
    remaining_slop: i64,
    rv: &mut Vec<PhrasePath>,
) {
    let Some((slot, rest)) = phrase.split_first() else {
        rv.push(
            path.iter()
                .map(|(term, _, loc)| PhrasePart {
                    term: (*term).to_string(),
                    loc: (*loc).clone(),
                })
                .collect(),
        );
        return;
    };

    if is_gap(slot) {
        // position 0 means no term has been placed yet
        let next_pos = if prev_pos == 0 { 0 } else { prev_pos + 1 };
        search(next_pos, array_positions, rest, tlm, path, remaining_slop, rv);
        return;
    }

    for term in slot {
        let Some((key, locations)) = tlm.get_key_value(term) else {
            continue;
        };
        for (idx, loc) in locations.iter().enumerate() {
            if prev_pos != 0 && loc.array_positions.as_slice() != array_positions {
                continue;
            }

            let dist = if prev_pos == 0 {
                0
            } else {
                (prev_pos + 1).abs_diff(loc.pos) as i64
            };
            if prev_pos != 0 && remaining_slop - dist < 0 {
                continue;
            }
            if path.iter().any(|(t, i, _)| *t == key.as_str() && *i == idx) {
                continue;
            }

            path.push((key.as_str(), idx, loc));
            search(
                loc.pos,
                &loc.array_positions,
                rest,
                tlm,
                path,
                remaining_slop - dist,
                rv,
            );
            path.pop();
        }
    }
}
