//! Rerun manifests for failed genotyping assays.
//!
//! The pipeline reads a genotyping results report ([`report`]) and a Stage3 sample
//! tracking export ([`stage3`]), joins failed assays with the DNA plate wells they
//! came from ([`collate`]) and writes the manifest for the rerun ([`manifest`]).

#[macro_use]
extern crate log;

pub mod collate;
pub mod guard;
pub mod manifest;
pub mod models;
pub mod plate;
pub mod report;
pub mod stage3;
pub mod text;
pub mod validate;
