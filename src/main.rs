mod config;

use std::error::Error;
use std::path::Path;

use env_logger::Env;
use structopt::StructOpt;

use rerun::models::FailedAssays;
use rerun::{collate, manifest, report, stage3, text, validate};

use crate::config::ListFormat;

#[macro_use]
extern crate log;

type Result<T> = std::result::Result<T, Box<dyn Error>>;

/// Read a genotyping report and collect its failed assays.
///
/// Reports with non-ASCII characters are refused before parsing.
fn load_report(path: &Path) -> Result<FailedAssays> {
    let lines = text::read_lines(path)?;

    let mut issues = validate::IssueLog::new();
    validate::non_ascii(&lines.join("\n"), &mut issues);
    if !issues.is_empty() {
        for issue in &issues.issues {
            error!("{}: {}", path.display(), issue);
        }
        return Err(Box::from(format!(
            "{} contains {} invalid characters",
            path.display(),
            issues.len()
        )));
    }

    let mut warnings = Vec::new();
    let failed = report::parse(&lines, &mut warnings);
    if !warnings.is_empty() {
        warn!("{}: skipped {} malformed rows", path.display(), warnings.len());
    }
    info!("{} samples with failed assays in {}", failed.len(), path.display());
    Ok(failed)
}

fn build_manifest(report: &Path, stage3: &Path, output: &Path) -> Result<()> {
    let failed = load_report(report)?;
    if failed.is_empty() {
        info!("No failed assays, nothing to rerun.");
        return Ok(());
    }

    let mut warnings = Vec::new();
    let index = stage3::load(stage3, &mut warnings)?;
    if index.is_empty() {
        return Err(Box::from(format!("No samples found in {}", stage3.display())));
    }
    info!("{} samples in {}", index.len(), stage3.display());

    let (plates, summary) = collate::collate(&failed, &index);
    if !summary.unmatched.is_empty() {
        warn!(
            "{} samples with failed assays are unknown to Stage3 and will not be rerun: {}",
            summary.unmatched.len(),
            summary.unmatched.join(", ")
        );
    }
    if !summary.unplaced.is_empty() {
        warn!(
            "{} samples have no DNA plate well in Stage3 and will not be rerun: {}",
            summary.unplaced.len(),
            summary.unplaced.join(", ")
        );
    }
    if !summary.shadowed.is_empty() {
        let shadowed: Vec<String> = summary
            .shadowed
            .iter()
            .map(|k| format!("{} ({} {})", k.barcode, k.plate, k.well))
            .collect();
        warn!(
            "{} samples share a DNA plate well with another sample, their failed assays will not be rerun: {}",
            shadowed.len(),
            shadowed.join(", ")
        );
    }

    match manifest::write(&plates, output) {
        Ok(true) => {
            let wells: usize = plates.values().map(|w| w.len()).sum();
            info!("Rerun manifest for {} wells written to {}", wells, output.display());
            Ok(())
        }
        Ok(false) => Err(Box::from("None of the failed samples could be located in Stage3")),
        Err(e) => Err(e),
    }
}

fn list_failures(failed: &FailedAssays, format: &ListFormat) -> String {
    let sep = match format {
        ListFormat::Text => "",
        ListFormat::CSV => ",",
        ListFormat::TSV => "\t",
    };
    let mut out = String::new();
    if *format != ListFormat::Text {
        out += &["barcode", "plate", "well", "sex", "assays", "alleleSymbols"].join(sep);
        out += "\n";
    }
    for (key, assays) in failed.iter() {
        let names = assays
            .iter()
            .map(|a| a.assay.as_str())
            .filter(|a| !a.is_empty())
            .collect::<Vec<&str>>()
            .join("; ");
        let symbols = assays
            .iter()
            .map(|a| a.allele_symbol.as_str())
            .filter(|s| !s.is_empty())
            .collect::<Vec<&str>>()
            .join("; ");
        if *format == ListFormat::Text {
            out += &format!(
                "Barcode: {}  plate: {}  well: {}  assays: {}  alleleSymbols: {}",
                key.barcode, key.plate, key.well, names, symbols
            );
        } else {
            out += &[
                key.barcode.as_str(),
                key.plate.as_str(),
                key.well.as_str(),
                key.sex.as_str(),
                names.as_str(),
                symbols.as_str(),
            ]
            .join(sep);
        }
        out += "\n";
    }
    out
}

fn failures(report: &Path, format: ListFormat) -> Result<()> {
    let failed = load_report(report)?;
    print!("{}", list_failures(&failed, &format));
    Ok(())
}

fn check(fasta: &Path) -> Result<()> {
    let content = text::decode(&std::fs::read(fasta)?)?;
    let log = validate::check_fasta(&content);
    if log.is_empty() {
        info!("{} is valid.", fasta.display());
        return Ok(());
    }
    for issue in &log.issues {
        println!("{}", issue);
    }
    Err(Box::from(format!("{} issues found in {}", log.len(), fasta.display())))
}

fn main() -> Result<()> {
    let config = config::Opt::from_args();

    // set up logging
    let level = if config.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    match config.cmd {
        config::Command::Manifest { report, stage3, output } => build_manifest(&report, &stage3, &output),

        config::Command::Failures { format, report } => failures(&report, format),

        config::Command::Check { fasta } => check(&fasta),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const REPORT_HEADER: &str = "barcode,code_assays,plate,wellLocation,sex,alleleSymbol,alleleKey,assayKey,passFail,seqName1,seqName2,seqName3,seqName4,seqName5,seqName6,seqName7,efficiency,alleleRatio,alleleRatioAdjusted,genotype,args,reason";
    const STAGE3_HEADER: &str = "sampleNo,plateBarcode,well,sampleBarcode,pos,sex,alleleSymbol,alleleKey,assayKey,assay,assayFamily,clientName,sampleName,dnaPlate,dnaWell";

    fn report_row(code_assays: &str, sym: &str, genotype: &str) -> String {
        format!(
            "cM0001,{},plateA,A1,F,{},k1,k2,fail,,,,,,,,0.9,0.5,0.5,{},,low",
            code_assays, sym, genotype
        )
    }

    fn write_inputs(dir: &Path, stage3_rows: &[&str]) -> Result<(PathBuf, PathBuf)> {
        let report = dir.join("report.csv");
        std::fs::write(
            &report,
            [
                REPORT_HEADER.to_string(),
                report_row("cM0001;AssayX", "Sym1", "A?G"),
                report_row("cM0001;AssayY", "Sym2", "AG"),
            ]
            .join("\n"),
        )?;
        let stage3 = dir.join("stage3.csv");
        let mut lines = vec![STAGE3_HEADER];
        lines.extend_from_slice(stage3_rows);
        std::fs::write(&stage3, lines.join("\n"))?;
        Ok((report, stage3))
    }

    #[test]
    fn end_to_end() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let (report, stage3) = write_inputs(
            dir.path(),
            &["1,plateA,A1,cM0001,1,F,Sym1,k1,k2,AssayX,FamX,Client1,SampleA,pDNA01p,A1"],
        )?;
        let output = dir.path().join("rerun_manifest_384.csv");

        build_manifest(&report, &stage3, &output)?;
        let written = std::fs::read_to_string(&output)?;
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "1,DNA01,A1,cM0001,AssayX,,,,,,,Client1,SampleA,Sym1");
        Ok(())
    }

    #[test]
    fn no_matches_means_no_manifest() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let (report, stage3) = write_inputs(
            dir.path(),
            &["1,plateA,A1,cM0999,1,F,Sym1,k1,k2,AssayX,FamX,Client1,SampleA,DNA01,A1"],
        )?;
        let output = dir.path().join("rerun_manifest_384.csv");

        assert!(build_manifest(&report, &stage3, &output).is_err());
        assert!(!output.exists());
        Ok(())
    }

    #[test]
    fn non_ascii_report_is_refused() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let report = dir.path().join("report.csv");
        std::fs::write(&report, format!("{}\n{}", REPORT_HEADER, report_row("cM0001;Assay\u{e9}", "Sym1", "A?G")))?;
        assert!(load_report(&report).is_err());
        Ok(())
    }

    #[test]
    fn failure_listing() {
        let lines = vec![
            REPORT_HEADER.to_string(),
            report_row("cM0001;AssayX", "Sym1", "A?G"),
            report_row("cM0001;AssayZ", "", "?"),
        ];
        let mut warnings = Vec::new();
        let failed = report::parse(&lines, &mut warnings);

        assert_eq!(
            list_failures(&failed, &ListFormat::Text),
            "Barcode: cM0001  plate: plateA  well: A1  assays: AssayX; AssayZ  alleleSymbols: Sym1\n"
        );
        assert_eq!(
            list_failures(&failed, &ListFormat::TSV),
            "barcode\tplate\twell\tsex\tassays\talleleSymbols\ncM0001\tplateA\tA1\tF\tAssayX; AssayZ\tSym1\n"
        );
    }
}
