//! Parsing of genotyping result reports.
//!
//! A report has one row per sample and assay. The header looks like this:
//!
//! ```text
//! barcode,code_assays,plate,wellLocation,sex,alleleSymbol,alleleKey,assayKey,passFail,
//! seqName1,...,seqName7,efficiency,alleleRatio,alleleRatioAdjusted,genotype,args,reason
//! ```
//!
//! `code_assays` holds sample barcode and assay name separated by `;`. A genotype call
//! containing `?` marks an assay that has to be rerun.

use std::error::Error;

use crate::models::{FailedAssay, FailedAssayKey, FailedAssays};

type Result<T> = std::result::Result<T, Box<dyn Error>>;

/// Marker for an ambiguous genotype call
const FAILURE_MARKER: char = '?';

/// Positions of the columns we consume
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    code_assays: usize,
    plate: usize,
    well: usize,
    sex: usize,
    allele_symbol: usize,
    pass_fail: usize,
    genotype: usize,
    reason: usize,
}

impl Default for Columns {
    fn default() -> Self {
        Columns {
            code_assays: 1,
            plate: 2,
            well: 3,
            sex: 4,
            allele_symbol: 5,
            pass_fail: 8,
            genotype: 19,
            reason: 21,
        }
    }
}

impl Columns {
    /// Look up columns by name, keeping the default offset for names that are missing
    fn from_header(header: &[&str]) -> Self {
        let d = Columns::default();
        let col = |name: &str, fallback: usize| header.iter().position(|c| *c == name).unwrap_or(fallback);
        Columns {
            code_assays: col("code_assays", d.code_assays),
            plate: col("plate", d.plate),
            well: col("wellLocation", d.well),
            sex: col("sex", d.sex),
            allele_symbol: col("alleleSymbol", d.allele_symbol),
            pass_fail: col("passFail", d.pass_fail),
            genotype: col("genotype", d.genotype),
            reason: col("reason", d.reason),
        }
    }

    /// Rows with fewer fields are not results
    fn min_fields(&self) -> usize {
        [
            self.code_assays,
            self.plate,
            self.well,
            self.sex,
            self.allele_symbol,
            self.pass_fail,
            self.genotype,
            self.reason,
        ]
        .iter()
        .max()
        .map(|m| m + 1)
        .unwrap_or(0)
    }
}

/// The consumed fields of one report row
#[derive(Debug, Clone, PartialEq, Eq)]
struct ReportRow {
    barcode: String,
    assay: String,
    plate: String,
    well: String,
    sex: String,
    allele_symbol: String,
    pass_fail: String,
    genotype: String,
    reason: String,
}

impl ReportRow {
    fn parse(fields: &[&str], cols: &Columns) -> Result<ReportRow> {
        let code_assays = fields[cols.code_assays];
        let parts: Vec<&str> = code_assays.split(';').collect();
        if parts.len() != 2 {
            return Err(Box::from(format!(
                "expected 'barcode;assay', got '{}'",
                code_assays
            )));
        }
        Ok(ReportRow {
            barcode: parts[0].trim().to_string(),
            assay: parts[1].trim().to_string(),
            plate: fields[cols.plate].to_string(),
            well: fields[cols.well].to_string(),
            sex: fields[cols.sex].to_string(),
            allele_symbol: fields[cols.allele_symbol].to_string(),
            pass_fail: fields[cols.pass_fail].to_string(),
            genotype: fields[cols.genotype].to_string(),
            reason: fields[cols.reason].to_string(),
        })
    }

    fn is_failure(&self) -> bool {
        self.genotype.contains(FAILURE_MARKER)
    }
}

/// Collect the failed assays of a results report.
///
/// Never fails. Rows that cannot be interpreted are logged, noted in `warnings` and
/// skipped; short rows are silently ignored.
pub fn parse<S: AsRef<str>>(lines: &[S], warnings: &mut Vec<String>) -> FailedAssays {
    let mut failed = FailedAssays::new();
    let mut cols = Columns::default();
    let mut seen_header = false;

    for (line_idx, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(|f| f.trim()).collect();

        if fields[0] == "barcode" {
            if !seen_header {
                cols = Columns::from_header(&fields);
                seen_header = true;
                debug!("Report columns: {:?}", cols);
            }
            continue;
        }

        if fields.len() < cols.min_fields() {
            continue;
        }

        let row = match ReportRow::parse(&fields, &cols) {
            Ok(row) => row,
            Err(e) => {
                let msg = format!("Report line {}: {}. Skipping.", line_idx + 1, e);
                warn!("{}", msg);
                warnings.push(msg);
                continue;
            }
        };

        if !row.is_failure() {
            continue;
        }
        debug!(
            "Failed: {} {} on {} {} ({}, {})",
            row.barcode, row.assay, row.plate, row.well, row.pass_fail, row.reason
        );

        let key = FailedAssayKey {
            barcode: row.barcode,
            plate: row.plate,
            well: row.well,
            sex: row.sex,
        };
        failed.push(
            key,
            FailedAssay {
                assay: row.assay,
                allele_symbol: row.allele_symbol,
            },
        );
    }

    failed
}
