//! Carving driver: scan the buffer once, then walk every match in ascending
//! offset order.

use log::{debug, info};

use crate::{
    artifacts::corpus::Corpus,
    record::{Classification, Record},
    scanner::{scan, SigMatch},
    walker::walk,
};

/// Carves every artifact of every corpus kind out of `buf`.
///
/// The returned iterator is lazy, finite and single-pass; records come back
/// in ascending offset order. Rerunning over an unmodified buffer yields
/// identical output.
pub fn carve<'a>(
    buf: &'a [u8],
    corpus: &'a Corpus,
) -> anyhow::Result<impl Iterator<Item = Record> + 'a> {
    let ac = corpus.automaton()?;
    let matches = scan(buf, &ac);

    Ok(matches
        .into_iter()
        .filter_map(move |m| walk_match(buf, corpus, m)))
}

/// Walks one signature match into a record, or nothing when the candidate is
/// discarded. Shared by the lazy driver and the per-thread workers.
pub fn walk_match(buf: &[u8], corpus: &Corpus, m: SigMatch) -> Option<Record> {
    let artifact = corpus.owner(m.pattern)?;

    match walk(buf, m.offset, artifact.plan) {
        Some(walked) => {
            match walked.classification {
                Classification::Complete => {
                    info!("{} identified at offset {}", artifact.kind, m.offset);
                }
                Classification::PartiallyCarved => {
                    info!(
                        "partially carved {} identified at offset {}",
                        artifact.kind, m.offset
                    );
                }
            }
            Some(Record {
                offset: m.offset,
                kind: artifact.kind,
                classification: walked.classification,
                values: walked.values,
            })
        }
        None => {
            debug!(
                "candidate {} at offset {} fully skipped",
                artifact.kind, m.offset
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::record::ArtifactKind;

    use super::*;

    // a SOCKS candidate followed by an activity string
    fn sample_buffer() -> Vec<u8> {
        let mut buf = vec![0x90u8; 16];
        buf.extend_from_slice(crate::artifacts::socks_request::SIGNATURES[0]);
        buf.extend_from_slice(
            b"[tlsflags0x0]https://example.onion(socks:info)[relay:0:privateBrowsingId=0firstPartyDomain=example.onion\x00",
        );
        buf.extend_from_slice(&[0x90u8; 8]);
        buf.extend_from_slice(crate::artifacts::activity::SIGNATURES[9]);
        buf.extend_from_slice(b"search terms here\x00\x0E");
        buf
    }

    #[test]
    fn carves_in_ascending_offset_order() {
        let corpus = Corpus::new();
        let records: Vec<Record> = carve(&sample_buffer(), &corpus).unwrap().collect();

        // the SOCKS anchor also matches an activity signature prefix, but
        // that candidate is dropped by the lead-byte rejection
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, ArtifactKind::SocksRequest);
        assert_eq!(records[1].kind, ArtifactKind::BrowserActivity);
        assert!(records[0].offset < records[1].offset);
        assert_eq!(records[0].value("first_party_domain"), "example.onion");
        assert_eq!(records[1].value("data"), "search terms here");
    }

    #[test]
    fn carve_is_idempotent() {
        let corpus = Corpus::new();
        let buf = sample_buffer();

        let first: Vec<Vec<String>> = carve(&buf, &corpus)
            .unwrap()
            .map(|r| r.csv_row())
            .collect();
        let second: Vec<Vec<String>> = carve(&buf, &corpus)
            .unwrap()
            .map(|r| r.csv_row())
            .collect();

        assert_eq!(first, second);
    }

    #[test]
    fn empty_buffer_carves_nothing() {
        let corpus = Corpus::new();
        assert_eq!(carve(&[], &corpus).unwrap().count(), 0);
    }
}
