//! CLI argument parsing, modeled on the flag table in `original_source/
//! src/driver.c::main`'s `getopt(argc, argv, "hpvf:n:zla")` loop, but
//! using `clap`'s derive macros the way `lz4r::cli::args` does rather
//! than hand-rolled option parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::config::NB_WORKERS_DEFAULT;
use crate::error::{MeasurementError, Result};
use crate::model::RunConfig;

/// Page-level memory compressibility measurement harness.
#[derive(Parser, Debug)]
#[command(name = "memcomp", version, about, long_about = None)]
pub struct Args {
    /// Input file: a raw page dump, or an ELF image with a page-aligned segment.
    #[arg(short = 'f', long = "file")]
    pub file: PathBuf,

    /// Worker thread count.
    #[arg(short = 'n', long = "threads", default_value_t = NB_WORKERS_DEFAULT)]
    pub threads: usize,

    /// Round-trip every codec's output against its decoder.
    #[arg(short = 'v', long = "validate")]
    pub validate: bool,

    /// Disable the zero-page fast path (on by default).
    #[arg(short = 'z', long = "no-zero-page")]
    pub no_zero_page: bool,

    /// Disable clamping compressed size to at most the raw block size.
    #[arg(short = 'p', long = "no-clamp")]
    pub no_clamp: bool,

    /// Suppress the CSV header row.
    #[arg(short = 'h', long = "no-header")]
    pub no_header: bool,

    /// Skip loading layout aggregators.
    #[arg(short = 'l', long = "no-layouts")]
    pub no_layouts: bool,

    /// Emit raw bit totals instead of compression ratios.
    #[arg(short = 'a', long = "raw")]
    pub raw: bool,

    /// Suppress diagnostic output (lowers the display level to errors only).
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,
}

impl Args {
    /// Translates the parsed flags into a [`RunConfig`], rejecting an
    /// invalid thread count the way `driver.c::main`'s `usage(argv[0],
    /// "thread count invalid")` does.
    pub fn into_config(self) -> Result<RunConfig> {
        if self.threads == 0 {
            return Err(MeasurementError::Config("thread count invalid".to_string()));
        }
        Ok(RunConfig {
            threads: self.threads,
            validate: self.validate,
            zero_page_detect: !self.no_zero_page,
            parse_switch: !self.no_clamp,
            header: !self.no_header,
            layouts: !self.no_layouts,
            ratios: !self.raw,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults_match_spec_table() {
        let args = Args::parse_from(["memcomp", "-f", "dump.img"]);
        let config = args.into_config().unwrap();
        assert_eq!(config.threads, NB_WORKERS_DEFAULT);
        assert!(!config.validate);
        assert!(config.zero_page_detect);
        assert!(config.parse_switch);
        assert!(config.header);
        assert!(config.layouts);
        assert!(config.ratios);
    }

    #[test]
    fn zero_threads_is_rejected() {
        let args = Args::parse_from(["memcomp", "-f", "dump.img", "-n", "0"]);
        assert!(args.into_config().is_err());
    }
}
