//! HTTP request metadata: five named sub-fields following a `requestId` tag,
//! each independently optional and reported as "Unknown" when absent.

use hex_literal::hex;

use crate::{
    artifacts::corpus::Artifact,
    record::ArtifactKind,
    walker::{Decode, Extract, FieldSpec, Locate, MissPolicy, WalkPlan, Window},
};

/// `FF FF` + "requestId".
pub const SIGNATURES: &[&[u8]] = &[&hex!("FF FF 72 65 71 75 65 73 74 49 64")];

/// Signature length plus the fixed header before the request id bytes.
const PREFIX_SKIP: usize = 26;

const REQUEST_ID_LEN: usize = 8;

/// The url sub-field follows the request id almost immediately.
const URL_DELIM_WINDOW: usize = 8;
const DELIM_WINDOW: usize = 50;
const URL_OPEN_WINDOW: usize = 15;
const OPEN_WINDOW: usize = 50;
const VALUE_WINDOW: usize = 2000;

const VALUE_END: &[&[u8]] = &[&hex!("00 00")];

const UNKNOWN: &str = "Unknown";

const fn named_field(
    name: &'static str,
    label: &'static [u8],
    delim_window: usize,
    open_window: usize,
) -> FieldSpec {
    FieldSpec {
        name,
        locate: Locate::DelimThenLabel {
            label,
            delim_window: Window::Bytes(delim_window),
            open_window: Window::Bytes(open_window),
        },
        extract: Extract::ToTerminator {
            terminators: VALUE_END,
            window: Window::Bytes(VALUE_WINDOW),
        },
        decode: Decode::Chain,
        required: false,
        placeholder: UNKNOWN,
    }
}

const FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "request_id",
        locate: Locate::Skip(0),
        extract: Extract::Fixed(REQUEST_ID_LEN),
        decode: Decode::Chain,
        required: false,
        placeholder: UNKNOWN,
    },
    named_field("url", b"url", URL_DELIM_WINDOW, URL_OPEN_WINDOW),
    named_field("origin_url", b"originUrl", DELIM_WINDOW, OPEN_WINDOW),
    named_field("document_url", b"documentUrl", DELIM_WINDOW, OPEN_WINDOW),
    named_field("method", b"method", DELIM_WINDOW, OPEN_WINDOW),
    named_field("resource_type", b"type", DELIM_WINDOW, OPEN_WINDOW),
];

/// No field is required beyond the anchor itself; a lone anchor still
/// produces a record full of "Unknown".
pub static PLAN: WalkPlan = WalkPlan {
    prefix_skip: PREFIX_SKIP,
    reject_lead: &[],
    fields: FIELDS,
    on_optional_miss: MissPolicy::Independent,
};

pub static ARTIFACT: Artifact = Artifact {
    kind: ArtifactKind::HttpRequest,
    signatures: SIGNATURES,
    plan: &PLAN,
};
