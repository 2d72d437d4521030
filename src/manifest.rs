//! Writing rerun manifests.
//!
//! One row per DNA plate well to rerun. Plates are listed in lexicographic order,
//! wells in column-major order (A1, B1, ..., P1, A2, ...). Every row carries at least
//! seven assay columns.

use std::collections::HashMap;
use std::error::Error;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::guard::{unguard, unguard_pbc};
use crate::models::{PlateSet, PlateWellEntry};
use crate::plate::{self, WellPosition};

type Result<T> = std::result::Result<T, Box<dyn Error>>;

/// Default file name of the manifest
pub const MANIFEST_NAME: &str = "rerun_manifest_384.csv";

const ASSAY_COLUMNS: usize = 7;

const HEADER: [&str; 14] = [
    "Sample no",
    "plateBarcode",
    "well",
    "sampleBarcode",
    "Assay",
    "Assay",
    "Assay",
    "Assay",
    "Assay",
    "Assay",
    "Assay",
    "clientName",
    "sampleName",
    "alleleSymbol",
];

fn row(sample_no: usize, dna_plate: &str, well: &str, e: &PlateWellEntry) -> String {
    let mut fields = vec![
        sample_no.to_string(),
        unguard_pbc(dna_plate),
        well.to_string(),
        unguard(&e.barcode),
    ];
    fields.extend(e.assays.iter().cloned());
    // pad, never truncate
    for _ in e.assays.len()..ASSAY_COLUMNS {
        fields.push(String::new());
    }
    fields.push(e.client_name.clone());
    fields.push(unguard(&e.sample_name));
    fields.push(e.allele_symbols.join(";"));
    fields.join(",")
}

/// Render the manifest, header included
pub fn render(plates: &PlateSet) -> String {
    let order = plate::column_major();
    let mut csv = HEADER.join(",");
    csv += "\n";

    let mut sample_no = 0;
    for (dna_plate, wells) in plates {
        let mut by_position: HashMap<WellPosition, Vec<(&str, &PlateWellEntry)>> = HashMap::new();
        for (well, entry) in wells {
            match WellPosition::parse(well) {
                Some(pos) => by_position.entry(pos).or_insert_with(Vec::new).push((well.as_str(), entry)),
                None => warn!(
                    "{} {}: not a 384-well position, leaving {} out of the manifest",
                    dna_plate, well, entry.barcode
                ),
            }
        }

        for pos in &order {
            if let Some(entries) = by_position.get(pos) {
                for (well, entry) in entries {
                    sample_no += 1;
                    csv += &row(sample_no, dna_plate, well, entry);
                    csv += "\n";
                }
            }
        }
    }
    csv
}

/// Write the manifest to `outfile`.
///
/// Returns `Ok(false)` without touching the file system if there is nothing to
/// rerun. I/O errors are logged here before being returned. A failed write may
/// leave a partial file behind.
pub fn write(plates: &PlateSet, outfile: &Path) -> Result<bool> {
    if plates.is_empty() {
        warn!("Nothing to rerun, not writing {}", outfile.display());
        return Ok(false);
    }
    let csv = render(plates);
    if let Err(e) = File::create(outfile).and_then(|mut f| f.write_all(csv.as_bytes())) {
        error!("Could not write {}: {}", outfile.display(), e);
        return Err(Box::new(e));
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn entry(barcode: &str, assays: &[&str]) -> PlateWellEntry {
        PlateWellEntry {
            barcode: barcode.to_string(),
            assays: assays.iter().map(|a| a.to_string()).collect(),
            allele_symbols: assays.iter().map(|a| format!("{}-sym", a)).collect(),
            client_name: String::from("Client1"),
            sample_name: String::from("SampleA"),
        }
    }

    fn plate_of(wells: &[(&str, PlateWellEntry)]) -> BTreeMap<String, PlateWellEntry> {
        wells.iter().map(|(w, e)| (w.to_string(), e.clone())).collect()
    }

    #[test]
    fn header_and_padding() {
        let mut plates = PlateSet::new();
        plates.insert(String::from("pDNA01p"), plate_of(&[("A1", entry("mcM0001m", &["AssayX"]))]));
        let csv = render(&plates);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Sample no,plateBarcode,well,sampleBarcode,Assay,Assay,Assay,Assay,Assay,Assay,Assay,clientName,sampleName,alleleSymbol");
        assert_eq!(lines[1], "1,DNA01,A1,cM0001,AssayX,,,,,,,Client1,SampleA,AssayX-sym");
        assert_eq!(lines[1].split(',').count(), 14);
    }

    #[test]
    fn excess_assays_widen_the_row() {
        let assays = ["a1", "a2", "a3", "a4", "a5", "a6", "a7", "a8", "a9"];
        let mut plates = PlateSet::new();
        plates.insert(String::from("DNA01"), plate_of(&[("A1", entry("b1", &assays))]));
        let csv = render(&plates);
        let fields: Vec<&str> = csv.lines().nth(1).unwrap().split(',').collect();

        assert_eq!(fields.len(), 16);
        assert_eq!(&fields[4..13], &assays[..]);
        assert_eq!(fields[13], "Client1");
        assert_eq!(fields[15], assays.iter().map(|a| format!("{}-sym", a)).collect::<Vec<_>>().join(";"));
    }

    #[test]
    fn plates_sorted_and_wells_column_major() {
        let mut plates = PlateSet::new();
        plates.insert(
            String::from("DNA02"),
            plate_of(&[("A1", entry("z", &["X"]))]),
        );
        plates.insert(
            String::from("DNA01"),
            plate_of(&[
                ("A2", entry("c", &["X"])),
                ("B1", entry("b", &["X"])),
                ("A1", entry("a", &["X"])),
                ("P24", entry("e", &["X"])),
                ("C01", entry("d", &["X"])),
                ("Z9", entry("lost", &["X"])),
            ]),
        );
        let csv = render(&plates);
        let rows: Vec<(String, String, String, String)> = csv
            .lines()
            .skip(1)
            .map(|l| {
                let f: Vec<&str> = l.split(',').collect();
                (f[0].to_string(), f[1].to_string(), f[2].to_string(), f[3].to_string())
            })
            .collect();
        let wells: Vec<(&str, &str)> = rows.iter().map(|r| (r.1.as_str(), r.2.as_str())).collect();

        assert_eq!(
            wells,
            vec![
                ("DNA01", "A1"),
                ("DNA01", "B1"),
                ("DNA01", "C01"),
                ("DNA01", "A2"),
                ("DNA01", "P24"),
                ("DNA02", "A1"),
            ]
        );
        let numbers: Vec<&str> = rows.iter().map(|r| r.0.as_str()).collect();
        assert_eq!(numbers, vec!["1", "2", "3", "4", "5", "6"]);
        assert!(rows.iter().all(|r| r.3 != "lost"));
    }

    #[test]
    fn empty_plate_set_writes_nothing() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(MANIFEST_NAME);
        assert!(!write(&PlateSet::new(), &path)?);
        assert!(!path.exists());
        Ok(())
    }

    #[test]
    fn write_to_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(MANIFEST_NAME);
        let mut plates = PlateSet::new();
        plates.insert(String::from("DNA01"), plate_of(&[("A1", entry("b1", &["X"]))]));

        assert!(write(&plates, &path)?);
        assert_eq!(std::fs::read_to_string(&path)?, render(&plates));
        Ok(())
    }

    #[test]
    fn unwritable_destination_is_an_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("missing").join(MANIFEST_NAME);
        let mut plates = PlateSet::new();
        plates.insert(String::from("DNA01"), plate_of(&[("A1", entry("b1", &["X"]))]));
        assert!(write(&plates, &path).is_err());
        Ok(())
    }
}
