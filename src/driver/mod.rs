//! Top-level measurement driver: open the input, detect its shape, run the
//! parallel pipeline, and produce one CSV report.
//!
//! Ported from `original_source/src/driver.c::main`, split into the
//! sub-concerns the C source interleaves in one function: [`elf`] (region
//! detection), [`dispatch`] (parallel measurement), [`csv`] (report
//! formatting).

pub mod csv;
pub mod dispatch;
pub mod elf;

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use memmap2::Mmap;

use crate::error::{MeasurementError, Result};
use crate::model::RunConfig;
use crate::registry::MeasurementRun;

/// Runs the full measurement pipeline against `path` and returns the
/// finished report, ready to be printed with [`csv::Report::write`].
pub fn measure_file(path: &Path, config: RunConfig) -> Result<csv::Report> {
    let region = elf::auto_elf_parse(path)?;

    let file = File::open(path).map_err(|e| MeasurementError::Parse {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let mmap = unsafe { Mmap::map(&file) }.map_err(|e| MeasurementError::Parse {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let mmap = Arc::new(mmap);

    let run = MeasurementRun::new(config.clone());
    let layouts = Arc::new(run.layouts);

    let (codec_bits, zero_pages) = dispatch::measure(
        Arc::clone(&mmap),
        region.start as usize,
        region.end as usize,
        &config,
        run.codecs,
        Arc::clone(&layouts),
    )?;

    let mut columns: Vec<(String, u64)> =
        run.codecs.iter().map(|c| c.name.to_string()).zip(codec_bits).collect();

    for layout in layouts.iter() {
        let totals = layout.totals.lock().unwrap();
        for (name, bits) in totals.synthetic_totals() {
            columns.push((format!("{}_{}", layout.entry.name, name), bits));
        }
    }

    for layout in layouts.iter() {
        let totals = layout.totals.lock().unwrap();
        (layout.entry.clean)(&totals);
    }

    Ok(csv::Report {
        file_name: path.display().to_string(),
        size: region.end - region.start,
        is_elf: region.is_elf,
        zero_pages,
        columns,
    })
}
