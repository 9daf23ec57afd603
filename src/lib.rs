//! Page-level memory compressibility measurement harness.
//!
//! Ported from the NAP64 Memory-Compression-Measurements-Open driver: map
//! an input file, detect whether it's a raw page dump or an ELF image with
//! a page-aligned segment, run a fixed set of compression codecs and
//! layout aggregators over every page in parallel, and print one CSV row
//! of results.

pub mod adapter;
pub mod bitstream;
pub mod cli;
pub mod codecs;
pub mod config;
pub mod driver;
pub mod error;
pub mod layouts;
pub mod model;
pub mod registry;
pub mod threadpool;

pub use driver::measure_file;
pub use error::{MeasurementError, Result};
pub use model::RunConfig;
