//! Guarded identifiers.
//!
//! Barcodes are stored wrapped in a one-letter tag at both ends (`m12345m`), which
//! keeps spreadsheet software from mangling them into numbers. Unguarding strips the
//! tags again and leaves plain values untouched.

/// The kind of identifier a guard tag stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Mouse,
    Rodentity,
    Custom,
    Plate,
}

impl Kind {
    fn tag(self) -> char {
        match self {
            Kind::Mouse => 'm',
            Kind::Rodentity => 'r',
            Kind::Custom => 'c',
            Kind::Plate => 'p',
        }
    }
}

const SAMPLE_TAGS: [char; 3] = ['m', 'r', 'c'];

fn is_guarded(s: &str, tags: &[char]) -> bool {
    let mut chars = s.chars();
    match (chars.next(), chars.next_back()) {
        (Some(first), Some(last)) => first == last && tags.contains(&first) && s.len() > 2,
        _ => false,
    }
}

fn strip(s: &str) -> &str {
    &s[1..s.len() - 1]
}

/// Wrap `id` in the tag for `kind`. Already guarded values are returned as is.
pub fn guard(id: &str, kind: Kind) -> String {
    let tag = kind.tag();
    if is_guarded(id, &[tag]) {
        return id.to_string();
    }
    format!("{}{}{}", tag, id, tag)
}

pub fn guard_pbc(pbc: &str) -> String {
    guard(pbc, Kind::Plate)
}

/// Remove a sample guard (`m`, `r` or `c`) from a barcode or name
pub fn unguard(s: &str) -> String {
    let s = s.trim();
    if is_guarded(s, &SAMPLE_TAGS) {
        strip(s).to_string()
    } else {
        s.to_string()
    }
}

/// Remove a plate guard (`p`) from a plate barcode
pub fn unguard_pbc(s: &str) -> String {
    let s = s.trim();
    if is_guarded(s, &['p']) {
        strip(s).to_string()
    } else {
        s.to_string()
    }
}
