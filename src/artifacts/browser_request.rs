//! Browser requests: origin-attribute strings carrying the private-browsing
//! id and first-party domain, with an optional trailing resource.

use hex_literal::hex;

use crate::{
    artifacts::corpus::Artifact,
    record::ArtifactKind,
    walker::{Decode, Extract, FieldSpec, Locate, MissPolicy, WalkPlan, Window},
};

/// Activity allocation headers qualified by the `4F 5E` request lead-in.
pub const SIGNATURES: &[&[u8]] = &[
    &hex!("02 00 00 00 F8 01 00 00 4F 5E"),
    &hex!("02 00 00 00 F8 00 00 00 4F 5E"),
    &hex!("02 00 00 00 F8 03 00 00 4F 5E"),
];

const ANCHOR_LEN: usize = 10;

/// `privateBrowsingId=` further away than this belongs to another artifact.
const PRIVATE_ID_WINDOW: usize = 100;

const FIELDS: &[FieldSpec] = &[
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
            terminators: &[b","],
            window: Window::Unbounded,
        },
        decode: Decode::Chain,
        required: true,
        placeholder: "",
    },
    FieldSpec {
        name: "request",
        locate: Locate::Marker {
            // "p,:" separates the origin attributes from the resource
            seq: &hex!("70 2C 3A"),
            window: Window::Unbounded,
        },
        extract: Extract::ToTerminator {
            terminators: &[&hex!("00")],
            window: Window::Unbounded,
        },
        decode: Decode::Chain,
        required: false,
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
    kind: ArtifactKind::BrowserRequest,
    signatures: SIGNATURES,
    plan: &PLAN,
};

#[cfg(test)]
mod tests {
    use crate::{record::Classification, walker::walk};

    use super::*;

    fn candidate(payload: &[u8]) -> Vec<u8> {
        let mut buf = SIGNATURES[1].to_vec();
        buf.extend_from_slice(payload);
        buf
    }

    #[test]
    fn carves_complete_request() {
        let buf = candidate(
            b"^privateBrowsingId=1, firstPartyDomain=example.onion,p,:https://example.onion/index\x00",
        );
        let walked = walk(&buf, 0, &PLAN).unwrap();
        assert_eq!(walked.classification, Classification::Complete);
        assert_eq!(walked.values[0].1, "1");
        assert_eq!(walked.values[1].1, "example.onion");
        assert_eq!(walked.values[2].1, "https://example.onion/index");
    }

    #[test]
    fn missing_resource_is_partially_carved() {
        let buf = candidate(b"^privateBrowsingId=0, firstPartyDomain=example.onion,\x00\x00");
        let walked = walk(&buf, 0, &PLAN).unwrap();
        assert_eq!(walked.classification, Classification::PartiallyCarved);
        assert_eq!(walked.values[0].1, "0");
        assert_eq!(walked.values[1].1, "example.onion");
        assert_eq!(walked.values[2].1, "");
    }

    #[test]
    fn private_id_beyond_window_discards() {
        let mut payload = vec![b'^'; PRIVATE_ID_WINDOW + 2];
        payload.extend_from_slice(b"privateBrowsingId=0, firstPartyDomain=x,\x00");
        let buf = candidate(&payload);
        assert!(walk(&buf, 0, &PLAN).is_none());
    }

    #[test]
    fn missing_domain_discards() {
        let buf = candidate(b"^privateBrowsingId=0, somethingElse=1\x00");
        assert!(walk(&buf, 0, &PLAN).is_none());
    }
}
