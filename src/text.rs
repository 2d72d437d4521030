//! Turning raw input bytes into lines of text.
//!
//! Reports come out of several lab systems, some of which still save
//! Windows-1252. Files are read completely before anything is parsed.

use std::error::Error;
use std::path::Path;

type Result<T> = std::result::Result<T, Box<dyn Error>>;

/// Windows-1252 code points for bytes 0x80-0x9F. Undefined slots map to the C1 control.
const CP1252_HIGH: [char; 32] = [
    '\u{20AC}', '\u{0081}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{008D}', '\u{017D}', '\u{008F}',
    '\u{0090}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{009D}', '\u{017E}', '\u{0178}',
];

fn decode_utf16(bytes: &[u8], big_endian: bool) -> Result<String> {
    if bytes.len() % 2 != 0 {
        return Err(Box::from("UTF-16 input with an odd number of bytes"));
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| {
            if big_endian {
                u16::from_be_bytes([c[0], c[1]])
            } else {
                u16::from_le_bytes([c[0], c[1]])
            }
        })
        .collect();
    Ok(String::from_utf16(&units)?)
}

fn decode_cp1252(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| match b {
            0x80..=0x9F => CP1252_HIGH[(b - 0x80) as usize],
            _ => b as char,
        })
        .collect()
}

/// Decode raw bytes, guessing the encoding.
///
/// Byte order marks win. Without one, the input is taken as UTF-8 if it is valid
/// UTF-8 and as Windows-1252 otherwise. NUL bytes without a BOM mean the input is
/// either binary or BOM-less UTF-16, and we refuse to guess.
pub fn decode(bytes: &[u8]) -> Result<String> {
    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return Ok(String::from_utf8(rest.to_vec())?);
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        return decode_utf16(rest, false);
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        return decode_utf16(rest, true);
    }
    if bytes.contains(&0) {
        return Err(Box::from("Cannot detect text encoding"));
    }
    match std::str::from_utf8(bytes) {
        Ok(s) => Ok(s.to_string()),
        Err(_) => {
            debug!("Input is not valid UTF-8, reading as Windows-1252");
            Ok(decode_cp1252(bytes))
        }
    }
}

/// Split decoded text into lines, dropping `\r` of CRLF line endings
pub fn lines(text: &str) -> Vec<String> {
    text.lines().map(|l| l.trim_end_matches('\r').to_string()).collect()
}

/// Read and decode a whole file into lines
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let raw = std::fs::read(path)?;
    let text = decode(&raw).map_err(|e| format!("{}: {}", path.display(), e))?;
    Ok(lines(&text))
}
