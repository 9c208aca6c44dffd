//! Signature scanner: one linear pass over the buffer reporting every
//! anchor-signature match in ascending offset order.

use aho_corasick::AhoCorasick;

/// One anchor-signature hit. `pattern` is the automaton pattern index, which
/// the corpus maps back to an artifact kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SigMatch {
    pub offset: usize,
    pub pattern: usize,
}

/// Finds all signature matches in `buf`.
///
/// Overlapping matches are required: several activity signatures are strict
/// prefixes of the request and SOCKS signatures, and one offset can be a
/// candidate for more than one kind. The result is sorted ascending by
/// offset and deduplicated; an empty result is a valid outcome.
pub fn scan(buf: &[u8], ac: &AhoCorasick) -> Vec<SigMatch> {
    let mut matches: Vec<SigMatch> = ac
        .find_overlapping_iter(buf)
        .map(|m| SigMatch {
            offset: m.start(),
            pattern: m.pattern().as_usize(),
        })
        .collect();

    matches.sort_unstable_by_key(|m| (m.offset, m.pattern));
    matches.dedup();

    matches
}
