//! Parsing of Stage3 sample tracking exports.
//!
//! Stage3 lists, for every sample and assay, where the sample's DNA sits. Exports
//! come as CSV with optionally quoted fields or as Excel workbooks. Either way the
//! first row is a header starting with `sampleNo`.

use std::error::Error;
use std::path::Path;

use calamine::{open_workbook, Reader, Xlsx};

use crate::guard::unguard;
use crate::models::{Stage3Index, Stage3Record};

type Result<T> = std::result::Result<T, Box<dyn Error>>;

const HEADER_START: &str = "sampleNo";

/// Rows with fewer fields are padding or comments, not samples
const MIN_FIELDS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    barcode: usize,
    allele_symbol: usize,
    allele_key: usize,
    assay_key: usize,
    assay: usize,
    assay_family: usize,
    client_name: usize,
    sample_name: usize,
    dna_plate: usize,
    dna_well: usize,
}

impl Default for Columns {
    fn default() -> Self {
        Columns {
            barcode: 3,
            allele_symbol: 6,
            allele_key: 7,
            assay_key: 8,
            assay: 9,
            assay_family: 10,
            client_name: 11,
            sample_name: 12,
            dna_plate: 13,
            dna_well: 14,
        }
    }
}

impl Columns {
    fn from_header(header: &[String]) -> Self {
        let d = Columns::default();
        let col = |name: &str, fallback: usize| header.iter().position(|c| c == name).unwrap_or(fallback);
        Columns {
            barcode: col("sampleBarcode", d.barcode),
            allele_symbol: col("alleleSymbol", d.allele_symbol),
            allele_key: col("alleleKey", d.allele_key),
            assay_key: col("assayKey", d.assay_key),
            assay: col("assay", d.assay),
            assay_family: col("assayFamily", d.assay_family),
            client_name: col("clientName", d.client_name),
            sample_name: col("sampleName", d.sample_name),
            dna_plate: col("dnaPlate", d.dna_plate),
            dna_well: col("dnaWell", d.dna_well),
        }
    }

    fn min_fields(&self) -> usize {
        [
            self.barcode,
            self.allele_symbol,
            self.allele_key,
            self.assay_key,
            self.assay,
            self.assay_family,
            self.client_name,
            self.sample_name,
            self.dna_plate,
            self.dna_well,
        ]
        .iter()
        .max()
        .map(|m| m + 1)
        .unwrap_or(0)
    }

    /// Returns the unguarded barcode and the record of a row
    fn record(&self, fields: &[String]) -> (String, Stage3Record) {
        let get = |idx: usize| fields[idx].clone();
        (
            unguard(&fields[self.barcode]),
            Stage3Record {
                dna_plate: get(self.dna_plate),
                dna_well: get(self.dna_well),
                allele_symbol: get(self.allele_symbol),
                allele_key: get(self.allele_key),
                assay_key: get(self.assay_key),
                assay: get(self.assay),
                assay_family: get(self.assay_family),
                client_name: get(self.client_name),
                sample_name: get(self.sample_name),
            },
        )
    }
}

/// Split a CSV line into trimmed fields, dropping all quote characters
fn split_line(line: &str) -> Vec<String> {
    line.replace('"', "")
        .split(',')
        .map(|f| f.trim().to_string())
        .collect()
}

/// Build the barcode index from already split rows, header first
fn parse_rows<I>(rows: I, warnings: &mut Vec<String>) -> Stage3Index
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut index = Stage3Index::new();
    let mut rows = rows.into_iter();

    let cols = match rows.next() {
        Some(header) if header.first().map_or(false, |f| f.starts_with(HEADER_START)) => {
            Columns::from_header(&header)
        }
        _ => {
            let msg = format!("Stage3 file does not start with '{}'. Ignoring it.", HEADER_START);
            error!("{}", msg);
            warnings.push(msg);
            return index;
        }
    };
    let min_fields = cols.min_fields();

    // header is row 1
    for (row_idx, fields) in rows.enumerate() {
        if fields.len() < MIN_FIELDS || fields[0].is_empty() {
            continue;
        }
        if fields.len() < min_fields {
            let msg = format!(
                "Stage3 row {}: expected {} columns, got {}. Skipping.",
                row_idx + 2,
                min_fields,
                fields.len()
            );
            warn!("{}", msg);
            warnings.push(msg);
            continue;
        }
        let (barcode, record) = cols.record(&fields);
        index.entry(barcode).or_insert_with(Vec::new).push(record);
    }

    debug!("Stage3 index holds {} barcodes", index.len());
    index
}

/// Index Stage3 CSV lines by sample barcode.
///
/// A file that does not start with the `sampleNo` header yields an empty index.
/// Malformed rows are logged, noted in `warnings` and skipped.
pub fn parse<S: AsRef<str>>(lines: &[S], warnings: &mut Vec<String>) -> Stage3Index {
    parse_rows(lines.iter().map(|l| split_line(l.as_ref())), warnings)
}

/// Index the first worksheet of a Stage3 Excel export
pub fn from_xlsx(path: &Path, warnings: &mut Vec<String>) -> Result<Stage3Index> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let sheetname = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| Box::<dyn Error>::from("Workbook has no sheets"))?;
    let sheet = workbook
        .worksheet_range(&sheetname)
        .ok_or_else(|| Box::<dyn Error>::from(format!("Cannot read sheet '{}'", sheetname)))??;

    let rows = sheet
        .rows()
        .map(|row| row.iter().map(|d| d.to_string().trim().to_string()).collect::<Vec<String>>());
    Ok(parse_rows(rows, warnings))
}

/// Load a Stage3 export, picking the format from the file extension
pub fn load(path: &Path, warnings: &mut Vec<String>) -> Result<Stage3Index> {
    let is_xlsx = path
        .extension()
        .map_or(false, |ext| ext.to_ascii_lowercase() == "xlsx");
    if is_xlsx {
        from_xlsx(path, warnings)
    } else {
        let lines = crate::text::read_lines(path)?;
        Ok(parse(&lines, warnings))
    }
}
