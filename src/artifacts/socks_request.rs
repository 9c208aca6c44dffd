//! SOCKS5 browser requests: connection strings the browser hands to its
//! SOCKS proxy, carrying TLS flags, the requested and session connections
//! and the origin attributes.

use hex_literal::hex;

use crate::{
    artifacts::corpus::Artifact,
    record::ArtifactKind,
    walker::{Decode, Extract, FieldSpec, Locate, MissPolicy, WalkPlan, Window},
};

/// Activity allocation headers qualified by the `2E` dot opening a host name.
pub const SIGNATURES: &[&[u8]] = &[
    &hex!("01 00 00 00 F8 00 00 00 2E"),
    &hex!("01 00 00 00 F8 01 00 00 2E"),
    &hex!("02 00 00 00 F8 01 00 00 2E"),
    &hex!("02 00 00 00 F8 00 00 00 2E"),
];

const ANCHOR_LEN: usize = 9;

const TLS_WINDOW: usize = 50;

/// SOCKS info longer than this means the closing bracket belongs to some
/// unrelated region; the walk short-circuits to a partial record instead of
/// scanning on.
const SOCKS_INFO_CAP: usize = 20;

const SESSION_WINDOW: usize = 65;
const PRIVATE_ID_WINDOW: usize = 200;

const FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "tls_flags",
        locate: Locate::Marker {
            seq: b"[tlsflags",
            window: Window::Bytes(TLS_WINDOW),
        },
        extract: Extract::ToTerminator {
            terminators: &[b"]"],
            window: Window::Unbounded,
        },
        decode: Decode::Chain,
        required: true,
        placeholder: "",
    },
    FieldSpec {
        name: "requested_connection",
        locate: Locate::Skip(0),
        extract: Extract::ToTerminator {
            terminators: &[b"(socks"],
            window: Window::Unbounded,
        },
        decode: Decode::Chain,
        required: true,
        placeholder: "",
    },
    FieldSpec {
        // skips the separator after "(socks"
        name: "socks_info",
        locate: Locate::Skip(1),
        extract: Extract::ToTerminator {
            terminators: &[b")"],
            window: Window::Bytes(SOCKS_INFO_CAP),
        },
        decode: Decode::Chain,
        required: false,
        placeholder: "",
    },
    FieldSpec {
        name: "session_connection",
        locate: Locate::Marker {
            seq: b"[",
            window: Window::Unbounded,
        },
        extract: Extract::ToTerminator {
            terminators: &[b":0:"],
            window: Window::Bytes(SESSION_WINDOW),
        },
        decode: Decode::Chain,
        required: false,
        placeholder: "",
    },
    FieldSpec {
        name: "private_browsing_id",
        locate: Locate::Marker {
            seq: b"privateBrowsingId=",
            window: Window::Bytes(PRIVATE_ID_WINDOW),
        },
        extract: Extract::Fixed(1),
        decode: Decode::SingleByte,
        required: true,
        placeholder: "",
    },
    FieldSpec {
        name: "first_party_domain",
        locate: Locate::Marker {
            seq: b"firstPartyDomain=",
            window: Window::Unbounded,
        },
        extract: Extract::ToTerminator {
            terminators: &[&hex!("00")],
            window: Window::Unbounded,
        },
        decode: Decode::Chain,
        required: true,
        placeholder: "",
    },
];

pub static PLAN: WalkPlan = WalkPlan {
    prefix_skip: ANCHOR_LEN,
    reject_lead: &[],
    fields: FIELDS,
    on_optional_miss: MissPolicy::ShortCircuit,
};

pub static ARTIFACT: Artifact = Artifact {
    kind: ArtifactKind::SocksRequest,
    signatures: SIGNATURES,
    plan: &PLAN,
};

#[cfg(test)]
mod tests {
    use crate::{record::Classification, walker::walk};

    use super::*;

    fn candidate(payload: &[u8]) -> Vec<u8> {
        let mut buf = SIGNATURES[3].to_vec();
        buf.extend_from_slice(payload);
        buf
    }

    #[test]
    fn missing_tls_flags_discards() {
        let buf = candidate(
            b"https://example.onion(socks:info)[relay.example:0:privateBrowsingId=0firstPartyDomain=example.onion\x00",
        );
        assert!(walk(&buf, 0, &PLAN).is_none());
    }

    #[test]
    fn carves_complete_request() {
        let buf = candidate(
            b"[tlsflags0x4000]https://example.onion(socks:info)[relay.example:0:privateBrowsingId=0firstPartyDomain=example.onion\x00",
        );
        let walked = walk(&buf, 0, &PLAN).unwrap();
        assert_eq!(walked.classification, Classification::Complete);
        assert_eq!(walked.values[0], ("tls_flags", String::from("0x4000")));
        assert_eq!(walked.values[1].1, "https://example.onion");
        assert_eq!(walked.values[2].1, "info");
        assert_eq!(walked.values[3].1, "relay.example");
        assert_eq!(walked.values[4].1, "0");
        assert_eq!(walked.values[5].1, "example.onion");
    }

    #[test]
    fn oversized_socks_info_short_circuits_to_partial() {
        // the closing bracket sits past the 20-byte cap
        let buf = candidate(
            b"[tlsflags0x0]https://example.onion(socks:this-info-runs-far-too-long)[relay:0:privateBrowsingId=3firstPartyDomain=example.onion\x00",
        );
        let walked = walk(&buf, 0, &PLAN).unwrap();
        assert_eq!(walked.classification, Classification::PartiallyCarved);
        assert_eq!(walked.values[1].1, "https://example.onion");
        // skipped optionals keep their placeholder
        assert_eq!(walked.values[2].1, "");
        assert_eq!(walked.values[3].1, "");
        // required fields behind the short circuit are still resolved
        assert_eq!(walked.values[4].1, "3");
        assert_eq!(walked.values[5].1, "example.onion");
    }

    #[test]
    fn missing_session_bracket_keeps_required_fields() {
        let buf = candidate(
            b"[tlsflags0x0]https://example.onion(socks:info)privateBrowsingId=1firstPartyDomain=example.onion\x00",
        );
        let walked = walk(&buf, 0, &PLAN).unwrap();
        assert_eq!(walked.classification, Classification::PartiallyCarved);
        assert_eq!(walked.values[3].1, "");
        assert_eq!(walked.values[4].1, "1");
        assert_eq!(walked.values[5].1, "example.onion");
    }

    #[test]
    fn missing_private_id_discards() {
        let buf = candidate(b"[tlsflags0x0]https://example.onion(socks:info)[relay:0:nothing");
        assert!(walk(&buf, 0, &PLAN).is_none());
    }
}
