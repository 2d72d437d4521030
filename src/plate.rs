//! Well positions on 384-well plates and their canonical traversal order.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

pub const ROWS: u8 = 16;
pub const COLS: u8 = 24;

/// A well on a 16x24 plate, zero-based row (A-P) and column (1-24)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WellPosition {
    pub row: u8,
    pub col: u8,
}

impl WellPosition {
    /// Parses well names like `A1`, `a01` or ` P24 `.
    ///
    /// Returns `None` for anything that is not a position on a 384-well plate.
    pub fn parse(well: &str) -> Option<WellPosition> {
        lazy_static! {
            static ref RE_WELL: Regex = Regex::new(r"^(?i)(?P<row>[A-P])0*(?P<col>[1-9]\d?)$").unwrap();
        }
        let captures = RE_WELL.captures(well.trim())?;
        let row = captures.name("row")?.as_str().to_ascii_uppercase().as_bytes()[0] - b'A';
        let col = captures.name("col")?.as_str().parse::<u8>().ok()?;
        if col > COLS {
            return None;
        }
        Some(WellPosition { row, col: col - 1 })
    }

    /// Rank of this position in column-major order
    pub fn index(&self) -> usize {
        self.col as usize * ROWS as usize + self.row as usize
    }

    /// Zero-padded column, e.g. `A01`
    pub fn padded(&self) -> String {
        format!("{}{:02}", (b'A' + self.row) as char, self.col + 1)
    }
}

impl fmt::Display for WellPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'A' + self.row) as char, self.col + 1)
    }
}

/// All 384 positions, A1, B1, ..., P1, A2, ..., P24
pub fn column_major() -> Vec<WellPosition> {
    (0..COLS)
        .flat_map(|col| (0..ROWS).map(move |row| WellPosition { row, col }))
        .collect()
}
