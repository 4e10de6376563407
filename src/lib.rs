//! # Command line interface for gbtools
//! [gbtools command line interface, subcommands, and options.](cli::Commands)
//! # README for gbtools
#![doc = include_str!("../README.md")]
/// Command line interface for gbtools.
pub mod cli;
/// Error types for reading genbank files and skipping features.
pub mod error;
/// Sequences and tables extracted from the CDS features of genbank records.
pub mod extract;
/// Genbank records and features as plain values.
pub mod genbank;
/// Module for automatically reading a writing compressed or uncompressed files.
pub mod myio;
/// Genetic codes for translating CDS sequences.
pub mod translate;

pub use error::{Error, FeatureError};
