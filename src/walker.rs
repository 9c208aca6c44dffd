//! The field walker: a cursor-based heuristic engine which turns a signature
//! match into the ordered field values of one artifact record.
//!
//! Artifacts left behind by the browser's in-memory object store have no
//! documented layout. Each one is walked with a fixed sequence of bounded
//! marker searches and decodes described by a [`WalkPlan`]. Every search is
//! capped so a walk never wanders into unrelated memory regions.

use std::cmp::min;

use crate::record::Classification;

/// How far a forward search may look before the target is treated as absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// A marker starting exactly `n` bytes past the cursor is still a hit,
    /// one byte further is a miss.
    Bytes(usize),

    /// No cap beyond the end of the buffer.
    Unbounded,
}

/// The `FF FF` pair guarding the named sub-fields of session and HTTP data.
pub const DELIM: &[u8] = &[0xFF, 0xFF];

// how to position the cursor at the start of the raw field bytes
#[derive(Debug, Clone, Copy)]
pub enum Locate {
    /// Move a fixed number of bytes forward.
    Skip(usize),

    /// Search for a marker; the field starts right after it.
    Marker { seq: &'static [u8], window: Window },

    /// Search for a label, then for the `FF FF` delimiter behind it; the
    /// field starts after the delimiter (tab session sub-fields).
    LabelThenDelim {
        label: &'static [u8],
        label_window: Window,
        delim_window: Window,
    },

    /// Search for `FF FF`, check the label sits right behind it, then search
    /// for the second `FF FF` opening the value (HTTP request sub-fields).
    DelimThenLabel {
        label: &'static [u8],
        delim_window: Window,
        open_window: Window,
    },
}

// how to delimit the raw field bytes once located
#[derive(Debug, Clone, Copy)]
pub enum Extract {
    /// Nothing to extract, the locate step is only a guard.
    None,

    /// A fixed number of bytes; the cursor always moves past them.
    Fixed(usize),

    /// Everything up to the first terminator of the set, whichever matches
    /// earliest. The cursor moves past the terminator.
    ToTerminator {
        terminators: &'static [&'static [u8]],
        window: Window,
    },

    /// Run of text whose end depends on the detected encoding: UTF-16LE when
    /// the byte after the field start is 0x00 (ends at the first odd-position
    /// byte that is not 0x00), UTF-8 otherwise (ends at the first byte below
    /// 0x20).
    AutoText,
}

#[derive(Debug, Clone, Copy)]
pub enum Decode {
    /// UTF-8, then UTF-16LE, then the hex-dump representation.
    Chain,

    /// One byte as a printable ASCII char, hex-dumped otherwise.
    SingleByte,

    /// Decoding already chosen by [`Extract::AutoText`].
    Auto,
}

/// What to do with the fields behind an optional field that was not found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissPolicy {
    /// Skip all remaining optional fields; required ones are still resolved
    /// from the unmoved cursor (SOCKS / browser requests).
    ShortCircuit,

    /// Emit the placeholder and keep resolving the remaining fields from the
    /// unmoved cursor (session / HTTP sub-fields).
    Independent,
}

/// One step of a walk.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub locate: Locate,
    pub extract: Extract,
    pub decode: Decode,
    pub required: bool,

    /// Value emitted when an optional field is absent.
    pub placeholder: &'static str,
}

/// The full field-walking recipe for one artifact kind.
#[derive(Debug)]
pub struct WalkPlan {
    /// Bytes consumed by the anchor signature before the first field.
    pub prefix_skip: usize,

    /// Candidates whose first payload byte is in this set are dropped
    /// outright: they belong to a more specific artifact kind.
    pub reject_lead: &'static [u8],

    pub fields: &'static [FieldSpec],
    pub on_optional_miss: MissPolicy,
}

/// Field values produced by one successful walk, in walk order.
#[derive(Debug)]
pub struct Walked {
    pub classification: Classification,
    pub values: Vec<(&'static str, String)>,
}

// outcome of a single field resolution
enum FieldOutcome {
    // decoded value (None for guards) and the new cursor position
    Hit(Option<String>, usize),

    // not found / empty after stripping; cursor to resume from
    Miss(usize),
}

/// Walks one candidate at `start` according to `plan`.
///
/// Returns `None` when any required field is absent within its window or the
/// candidate is rejected outright; the record is then discarded entirely.
pub fn walk(buf: &[u8], start: usize, plan: &WalkPlan) -> Option<Walked> {
    let mut cursor = start.checked_add(plan.prefix_skip)?;
    if cursor >= buf.len() {
        return None;
    }

    if !plan.reject_lead.is_empty() && plan.reject_lead.contains(&buf[cursor]) {
        return None;
    }

    let mut classification = Classification::Complete;
    let mut values = Vec::with_capacity(plan.fields.len());
    let mut short_circuited = false;

    for field in plan.fields {
        if short_circuited && !field.required {
            if !matches!(field.extract, Extract::None) {
                values.push((field.name, field.placeholder.to_string()));
            }
            continue;
        }

        match resolve_field(buf, cursor, field) {
            FieldOutcome::Hit(value, next) => {
                if let Some(value) = value {
                    values.push((field.name, value));
                }
                cursor = next;
            }
            FieldOutcome::Miss(resume) => {
                if field.required {
                    return None;
                }
                classification = Classification::PartiallyCarved;
                if !matches!(field.extract, Extract::None) {
                    values.push((field.name, field.placeholder.to_string()));
                }
                if plan.on_optional_miss == MissPolicy::ShortCircuit {
                    short_circuited = true;
                }
                cursor = resume;
            }
        }
    }

    Some(Walked {
        classification,
        values,
    })
}

fn resolve_field(buf: &[u8], pos: usize, spec: &FieldSpec) -> FieldOutcome {
    // locate the start of the raw field bytes
    let field_start = match spec.locate {
        Locate::Skip(n) => match pos.checked_add(n) {
            Some(p) if p <= buf.len() => p,
            _ => return FieldOutcome::Miss(pos),
        },
        Locate::Marker { seq, window } => match find_within(buf, pos, seq, window) {
            Some(hit) => hit + seq.len(),
            None => return FieldOutcome::Miss(pos),
        },
        Locate::LabelThenDelim {
            label,
            label_window,
            delim_window,
        } => {
            let Some(label_hit) = find_within(buf, pos, label, label_window) else {
                return FieldOutcome::Miss(pos);
            };
            let Some(delim_hit) = find_within(buf, label_hit + label.len(), DELIM, delim_window)
            else {
                return FieldOutcome::Miss(pos);
            };
            delim_hit + DELIM.len()
        }
        Locate::DelimThenLabel {
            label,
            delim_window,
            open_window,
        } => {
            let Some(delim_hit) = find_within(buf, pos, DELIM, delim_window) else {
                return FieldOutcome::Miss(pos);
            };
            let name_at = delim_hit + DELIM.len();
            if buf.get(name_at..name_at + label.len()) != Some(label) {
                return FieldOutcome::Miss(pos);
            }
            let Some(open_hit) = find_within(buf, name_at + label.len(), DELIM, open_window) else {
                return FieldOutcome::Miss(pos);
            };
            open_hit + DELIM.len()
        }
    };

    // extract and decode
    match spec.extract {
        Extract::None => FieldOutcome::Hit(None, field_start),
        Extract::Fixed(n) => {
            let Some(raw) = buf.get(field_start..field_start + n) else {
                return FieldOutcome::Miss(pos);
            };
            let next = field_start + n;
            match decode(raw, spec.decode) {
                Some(value) => FieldOutcome::Hit(Some(value), next),
                // the bytes are consumed even when they strip down to nothing
                None => FieldOutcome::Miss(next),
            }
        }
        Extract::ToTerminator {
            terminators,
            window,
        } => {
            // first match over the whole terminator set wins
            let mut end: Option<(usize, usize)> = None;
            for terminator in terminators {
                if let Some(hit) = find_within(buf, field_start, terminator, window) {
                    if end.map_or(true, |(best, _)| hit < best) {
                        end = Some((hit, terminator.len()));
                    }
                }
            }
            let Some((field_end, terminator_len)) = end else {
                return FieldOutcome::Miss(pos);
            };
            let next = field_end + terminator_len;
            match decode(&buf[field_start..field_end], spec.decode) {
                Some(value) => FieldOutcome::Hit(Some(value), next),
                None => FieldOutcome::Miss(pos),
            }
        }
        Extract::AutoText => match auto_text(buf, field_start) {
            Some((value, next)) if !value.is_empty() => FieldOutcome::Hit(Some(value), next),
            _ => FieldOutcome::Miss(pos),
        },
    }
}

/// Bounded forward search. A needle starting exactly `window` bytes past
/// `from` is found; one byte further it is not.
pub fn find_within(buf: &[u8], from: usize, needle: &[u8], window: Window) -> Option<usize> {
    if needle.is_empty() || from >= buf.len() {
        return None;
    }

    let last_start = match window {
        Window::Bytes(n) => from.checked_add(n)?,
        Window::Unbounded => buf.len(),
    };
    let hunt_end = min(buf.len(), last_start.saturating_add(needle.len()));

    buf[from..hunt_end]
        .windows(needle.len())
        .position(|candidate| candidate == needle)
        .map(|i| from + i)
}

fn decode(raw: &[u8], policy: Decode) -> Option<String> {
    let text = match policy {
        Decode::Chain => decode_chain(raw),
        Decode::SingleByte => decode_byte(*raw.first()?),
        // AutoText decodes during extraction
        Decode::Auto => return None,
    };

    (!text.is_empty()).then_some(text)
}

/// The fixed decode fallback chain: UTF-8, then UTF-16LE, then a hex dump.
/// The terminal branch cannot fail, so every byte sequence decodes to
/// something.
pub fn decode_chain(raw: &[u8]) -> String {
    if let Ok(text) = std::str::from_utf8(raw) {
        return printable(text);
    }

    if raw.len() % 2 == 0 {
        let units: Vec<u16> = raw
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        if let Ok(text) = String::from_utf16(&units) {
            return printable(&text);
        }
    }

    hex_dump(raw)
}

/// One-byte fields (e.g. the private-browsing flag) decode as a single
/// printable ASCII char or a hex dump.
pub fn decode_byte(byte: u8) -> String {
    if (0x20..=0x7E).contains(&byte) {
        (byte as char).to_string()
    } else {
        hex_dump(&[byte])
    }
}

fn hex_dump(raw: &[u8]) -> String {
    let hex: String = raw.iter().map(|b| format!("{b:02x}")).collect();
    format!("[Non-printable: {hex}]")
}

// strip surrounding whitespace and drop non-printable chars
fn printable(text: &str) -> String {
    text.trim().chars().filter(|c| !c.is_control()).collect()
}

// UTF-16/UTF-8 auto-detected run, used for favicon URLs whose encoding
// depends on how the session store serialized them
fn auto_text(buf: &[u8], start: usize) -> Option<(String, usize)> {
    // the byte after the field start discriminates the encoding
    let second = *buf.get(start + 1)?;

    if second == 0x00 {
        let mut end = start;
        while end + 1 < buf.len() {
            if (end - start) % 2 == 1 && buf[end] != 0x00 {
                break;
            }
            end += 1;
        }
        let units: Vec<u16> = buf[start..end]
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Some((printable(&String::from_utf16_lossy(&units)), end))
    } else {
        let mut end = start;
        while end < buf.len() && buf[end] >= 0x20 {
            end += 1;
        }
        Some((printable(&String::from_utf8_lossy(&buf[start..end])), end))
    }
}
