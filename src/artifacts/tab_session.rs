//! Browser tab session data: url, title and favicon of a private-browsing
//! tab, serialized as labelled sub-fields guarded by `FF FF` pairs.

use hex_literal::hex;

use crate::{
    artifacts::corpus::Artifact,
    record::ArtifactKind,
    walker::{Decode, Extract, FieldSpec, Locate, MissPolicy, WalkPlan, Window},
};

/// The session store's `firefox-private` tag.
pub const SIGNATURES: &[&[u8]] =
    &[&hex!("FF FF 66 69 72 65 66 6F 78 2D 70 72 69 76 61 74 65 00")];

/// Signature length plus the fixed header before the first label.
const PREFIX_SKIP: usize = 26;

const URL_LABEL_WINDOW: usize = 15;
const LABEL_WINDOW: usize = 50;
const DELIM_WINDOW: usize = 16;
const FAVICON_DELIM_WINDOW: usize = 24;
const VALUE_WINDOW: usize = 2000;

const VALUE_END: &[&[u8]] = &[&hex!("00 00")];

const FIELDS: &[FieldSpec] = &[
    // a candidate without the url label nearby is not tab data at all
    FieldSpec {
        name: "url_label",
        locate: Locate::Marker {
            seq: b"url",
            window: Window::Bytes(URL_LABEL_WINDOW),
        },
        extract: Extract::None,
        decode: Decode::Chain,
        required: true,
        placeholder: "",
    },
    FieldSpec {
        name: "url",
        locate: Locate::Marker {
            seq: &hex!("FF FF"),
            window: Window::Bytes(DELIM_WINDOW),
        },
        extract: Extract::ToTerminator {
            terminators: VALUE_END,
            window: Window::Bytes(VALUE_WINDOW),
        },
        decode: Decode::Chain,
        required: false,
        placeholder: "",
    },
    FieldSpec {
        name: "title",
        locate: Locate::LabelThenDelim {
            label: b"title",
            label_window: Window::Bytes(LABEL_WINDOW),
            delim_window: Window::Bytes(DELIM_WINDOW),
        },
        extract: Extract::ToTerminator {
            terminators: VALUE_END,
            window: Window::Bytes(VALUE_WINDOW),
        },
        decode: Decode::Chain,
        required: false,
        placeholder: "Title Not Present",
    },
    FieldSpec {
        name: "favicon_url",
        locate: Locate::LabelThenDelim {
            label: b"favIconUrl",
            label_window: Window::Bytes(LABEL_WINDOW),
            delim_window: Window::Bytes(FAVICON_DELIM_WINDOW),
        },
        extract: Extract::AutoText,
        decode: Decode::Auto,
        required: false,
        placeholder: "FavIconURL Not Present",
    },
];

pub static PLAN: WalkPlan = WalkPlan {
    prefix_skip: PREFIX_SKIP,
    reject_lead: &[],
    fields: FIELDS,
    on_optional_miss: MissPolicy::Independent,
};

pub static ARTIFACT: Artifact = Artifact {
    kind: ArtifactKind::TabSession,
    signatures: SIGNATURES,
    plan: &PLAN,
};

#[cfg(test)]
mod tests {
    use crate::{record::Classification, walker::walk};

    use super::*;

    fn candidate(payload: &[u8]) -> Vec<u8> {
        let mut buf = SIGNATURES[0].to_vec();
        // fixed header between the tag and the first label
        buf.extend_from_slice(&[0xAA; PREFIX_SKIP - 18]);
        buf.extend_from_slice(payload);
        buf
    }

    #[test]
    fn carves_full_tab() {
        let buf = candidate(
            b"url\x04\xFF\xFFhttp://site.onion\x00\x00title\x04\xFF\xFFWelcome\x00\x00favIconUrl\x04\xFF\xFFdata:image/png;base64,QUJD\x00",
        );
        let walked = walk(&buf, 0, &PLAN).unwrap();
        assert_eq!(walked.classification, Classification::Complete);
        assert_eq!(walked.values[0], ("url", String::from("http://site.onion")));
        assert_eq!(walked.values[1], ("title", String::from("Welcome")));
        assert_eq!(
            walked.values[2],
            ("favicon_url", String::from("data:image/png;base64,QUJD"))
        );
    }

    #[test]
    fn missing_title_keeps_other_fields() {
        let buf = candidate(
            b"url\x04\xFF\xFFhttp://site.onion\x00\x00favIconUrl\x04\xFF\xFFdata:image/ico\x00",
        );
        let walked = walk(&buf, 0, &PLAN).unwrap();
        assert_eq!(walked.classification, Classification::PartiallyCarved);
        assert_eq!(walked.values[0].1, "http://site.onion");
        assert_eq!(walked.values[1].1, "Title Not Present");
        assert_eq!(walked.values[2].1, "data:image/ico");
    }

    #[test]
    fn utf16_favicon_url() {
        let mut payload = b"url\x04\xFF\xFFhttp://site.onion\x00\x00favIconUrl\x04\xFF\xFF".to_vec();
        for b in b"data:image/png" {
            payload.extend_from_slice(&[*b, 0x00]);
        }
        payload.extend_from_slice(&hex!("02 A0"));
        let buf = candidate(&payload);
        let walked = walk(&buf, 0, &PLAN).unwrap();
        assert_eq!(walked.values[2].1, "data:image/png");
    }

    #[test]
    fn missing_url_label_discards() {
        let buf = candidate(b"nothing to see here at all\x00\x00");
        assert!(walk(&buf, 0, &PLAN).is_none());
    }
}
