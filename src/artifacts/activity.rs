//! Potential browser activity: free text left behind by the object store,
//! anchored by a small family of allocation-header signatures.

use hex_literal::hex;

use crate::{
    artifacts::corpus::Artifact,
    record::ArtifactKind,
    walker::{Decode, Extract, FieldSpec, Locate, MissPolicy, WalkPlan, Window},
};

/// Allocation headers observed in front of activity text.
pub const SIGNATURES: &[&[u8]] = &[
    &hex!("01 00 00 00 F8 00 00 00"),
    &hex!("01 00 00 00 F8 01 00 00"),
    &hex!("01 00 00 00 F8 03 00 00"),
    &hex!("02 00 00 00 F8 01 00 00"),
    &hex!("02 00 00 00 F8 00 00 00"),
    &hex!("02 00 00 00 F8 03 00 00"),
    &hex!("03 00 00 00 F8 01 00 00"),
    &hex!("03 00 00 00 F8 00 00 00"),
    &hex!("04 00 00 00 F8 00 00 00"),
    &hex!("05 00 00 00 F8 00 00 00"),
];

const ANCHOR_LEN: usize = 8;

/// Lead bytes that mark the candidate as something other than loose activity
/// text: `2E` and `4F` open the more specific SOCKS and browser-request
/// layouts, the rest are non-text payloads.
const REJECT_LEAD: &[u8] = &hex!("00 08 FF D0 2E 4F");

/// Terminator sequences observed at the end of activity text.
const TERMINATORS: &[&[u8]] = &[&hex!("00 0E"), &hex!("00 E5"), &hex!("00 00")];

const FIELDS: &[FieldSpec] = &[FieldSpec {
    name: "data",
    locate: Locate::Skip(0),
    extract: Extract::ToTerminator {
        terminators: TERMINATORS,
        window: Window::Unbounded,
    },
    decode: Decode::Chain,
    required: true,
    placeholder: "",
}];

/// Activity is present or absent, never partial: the single text field is
/// required and an empty decode discards the candidate.
pub static PLAN: WalkPlan = WalkPlan {
    prefix_skip: ANCHOR_LEN,
    reject_lead: REJECT_LEAD,
    fields: FIELDS,
    on_optional_miss: MissPolicy::ShortCircuit,
};

pub static ARTIFACT: Artifact = Artifact {
    kind: ArtifactKind::BrowserActivity,
    signatures: SIGNATURES,
    plan: &PLAN,
};
