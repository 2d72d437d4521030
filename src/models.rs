use std::collections::{BTreeMap, HashMap};

/// A sample on a genotyping plate with at least one failed assay
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FailedAssayKey {
    pub barcode: String,
    pub plate: String,
    pub well: String,
    pub sex: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FailedAssay {
    pub assay: String,
    pub allele_symbol: String,
}

/// Failed assays grouped by sample.
///
/// Keys keep the order in which the report first mentions them, and so do the
/// assays of each key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FailedAssays {
    entries: Vec<(FailedAssayKey, Vec<FailedAssay>)>,
    index: HashMap<FailedAssayKey, usize>,
}

impl FailedAssays {
    pub fn new() -> Self {
        FailedAssays {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Append a failed assay to the list of `key`, creating it if necessary
    pub fn push(&mut self, key: FailedAssayKey, assay: FailedAssay) {
        match self.index.get(&key) {
            Some(&idx) => self.entries[idx].1.push(assay),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, vec![assay]));
            }
        }
    }

    pub fn get(&self, key: &FailedAssayKey) -> Option<&[FailedAssay]> {
        self.index.get(key).map(|&idx| self.entries[idx].1.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FailedAssayKey, &[FailedAssay])> {
        self.entries.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One row of a Stage3 export, i.e. one assay tested for a sample
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Stage3Record {
    pub dna_plate: String,
    pub dna_well: String,
    pub allele_symbol: String,
    pub allele_key: String,
    pub assay_key: String,
    pub assay: String,
    pub assay_family: String,
    pub client_name: String,
    pub sample_name: String,
}

/// Stage3 records by (unguarded) sample barcode
pub type Stage3Index = HashMap<String, Vec<Stage3Record>>;

/// Everything that needs to be rerun from a single DNA plate well
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlateWellEntry {
    pub barcode: String,
    pub assays: Vec<String>,
    pub allele_symbols: Vec<String>,
    pub client_name: String,
    pub sample_name: String,
}

impl PlateWellEntry {
    pub fn from_failed(barcode: &str, failed: &[FailedAssay]) -> PlateWellEntry {
        PlateWellEntry {
            barcode: barcode.to_string(),
            assays: failed.iter().map(|f| f.assay.clone()).collect(),
            allele_symbols: failed.iter().map(|f| f.allele_symbol.clone()).collect(),
            client_name: String::new(),
            sample_name: String::new(),
        }
    }

    /// Fill in client and sample name. Populated fields are never overwritten.
    pub fn fill_names(&mut self, client_name: &str, sample_name: &str) {
        if self.client_name.is_empty() {
            self.client_name = client_name.to_string();
        }
        if self.sample_name.is_empty() {
            self.sample_name = sample_name.to_string();
        }
    }
}

/// DNA plate -> DNA well -> rerun entry. Plates iterate in lexicographic order.
pub type PlateSet = BTreeMap<String, BTreeMap<String, PlateWellEntry>>;
