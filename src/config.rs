use clap::arg_enum;
use std::path::PathBuf;
use structopt::StructOpt;

arg_enum! {
    #[derive(Debug, PartialEq)]
    pub enum ListFormat {
        Text,
        CSV,
        TSV
    }
}

#[derive(StructOpt, Debug)]
pub enum Command {
    /// Build a rerun manifest from a genotyping report and a Stage3 export
    Manifest {
        /// Genotyping results report
        #[structopt(short, long, parse(from_os_str))]
        report: PathBuf,

        /// Stage3 export. Format depends on filename (.xlsx, .csv)
        #[structopt(short, long, parse(from_os_str))]
        stage3: PathBuf,

        /// Where to write the manifest
        #[structopt(default_value = "rerun_manifest_384.csv", short, long, parse(from_os_str))]
        output: PathBuf,
    },

    /// List the failed sample/assay combinations of a genotyping report
    Failures {
        /// Type of output
        #[structopt(possible_values=&ListFormat::variants(), default_value="Text", case_insensitive=true, short, long)]
        format: ListFormat,

        #[structopt(parse(from_os_str))]
        report: PathBuf,
    },

    /// Check a FASTA file for invalid characters, gaps and blank lines
    Check {
        #[structopt(parse(from_os_str))]
        fasta: PathBuf,
    },
}

#[derive(StructOpt, Debug)]
#[structopt(name = "rerun")]
pub struct Opt {
    /// Log debug messages (RUST_LOG takes precedence)
    #[structopt(short, long)]
    pub verbose: bool,

    #[structopt(subcommand)]
    pub cmd: Command,
}
