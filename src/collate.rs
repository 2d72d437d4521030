//! Joining failed assays with Stage3 plate locations.

use std::collections::btree_map::Entry;

use crate::models::{FailedAssayKey, FailedAssays, PlateSet, PlateWellEntry, Stage3Index};
use crate::plate::WellPosition;

/// What happened to the failed samples during collation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollateSummary {
    /// Samples that ended up on a DNA plate well
    pub resolved: usize,
    /// Barcodes not present in Stage3
    pub unmatched: Vec<String>,
    /// Barcodes present in Stage3, but without DNA plate or well
    pub unplaced: Vec<String>,
    /// Samples whose well was already claimed. Their assays are not in the manifest.
    pub shadowed: Vec<FailedAssayKey>,
}

/// First non-empty value wins
fn first_of<'a>(current: &mut &'a str, candidate: &'a str) {
    if current.is_empty() {
        *current = candidate;
    }
}

/// Assign every failed sample to the DNA plate well Stage3 knows it from.
///
/// Wells are keyed by their normalised position (`A01` becomes `A1`). A well that is
/// already taken keeps its assays from the first sample that claimed it; later
/// samples only end up in the summary, as do samples Stage3 does not know about.
pub fn collate(failed: &FailedAssays, index: &Stage3Index) -> (PlateSet, CollateSummary) {
    let mut plates = PlateSet::new();
    let mut summary = CollateSummary::default();

    for (key, assays) in failed.iter() {
        let records = match index.get(&key.barcode) {
            Some(r) => r,
            None => {
                debug!("{} is not in Stage3", key.barcode);
                summary.unmatched.push(key.barcode.clone());
                continue;
            }
        };

        let (mut dna_plate, mut dna_well, mut client_name, mut sample_name) = ("", "", "", "");
        for r in records {
            first_of(&mut dna_plate, &r.dna_plate);
            first_of(&mut dna_well, &r.dna_well);
            first_of(&mut client_name, &r.client_name);
            first_of(&mut sample_name, &r.sample_name);
        }

        if dna_plate.is_empty() || dna_well.is_empty() {
            debug!("{} has no DNA plate well in Stage3", key.barcode);
            summary.unplaced.push(key.barcode.clone());
            continue;
        }

        // A1 and A01 are the same well
        let well = WellPosition::parse(dna_well)
            .map(|p| p.to_string())
            .unwrap_or_else(|| dna_well.to_string());

        match plates.entry(dna_plate.to_string()).or_default().entry(well) {
            Entry::Vacant(v) => {
                v.insert(PlateWellEntry::from_failed(&key.barcode, assays))
                    .fill_names(client_name, sample_name);
                summary.resolved += 1;
            }
            Entry::Occupied(mut o) => {
                warn!(
                    "{} {} already holds {}, dropping failed assays of {} ({} {})",
                    dna_plate,
                    o.key(),
                    o.get().barcode,
                    key.barcode,
                    key.plate,
                    key.well
                );
                o.get_mut().fill_names(client_name, sample_name);
                summary.shadowed.push(key.clone());
            }
        }
    }

    (plates, summary)
}
