//! Static, compile-time codec and layout registries, replacing the
//! source's `dlopen`-based plugin loading (`load_initialize_compressions`
//! in `driver.c`). There is nothing to discover at run time — the
//! codec/layout portfolio is fixed — so registration is just two `const`
//! arrays built at compile time, walked once at startup.

use std::sync::Mutex;

use crate::adapter;
use crate::codecs::external;
use crate::layouts::{best_of, binaryization, compresso};
use crate::model::{CodecEntry, LayoutEntry, LayoutTotals, RunConfig};

/// All codecs this build knows about, in registration order. Order matters
/// for two things: it's the order `observe` is called for each page (see
/// `model::LayoutEntry`), and it's the column order of the CSV report.
pub const CODECS: &[CodecEntry] = &[
    CodecEntry { name: "bdi", compress: adapter::bdi_compress_page },
    CodecEntry { name: "bpc", compress: adapter::bpc_compress_page },
    CodecEntry { name: "bpc_compresso", compress: adapter::bpc_compresso_compress_page },
    CodecEntry { name: "cpack", compress: adapter::cpack_compress_page },
    CodecEntry { name: "huffman1", compress: adapter::huffman1_compress_page },
    CodecEntry { name: "lz4", compress: external::lz4::compress_page },
    CodecEntry { name: "deflate", compress: external::deflate::compress_page },
];

/// All layout aggregators this build knows about. `load_initialize_compressions`
/// in the source walks its loaded `.so` list and sorts it by descending
/// `priority`, inserting ties at the head; we keep that ordering explicit
/// here instead of sorting, since the portfolio is fixed.
pub const LAYOUTS: &[LayoutEntry] = &[
    LayoutEntry {
        name: "best-of",
        priority: 0,
        init: best_of::init,
        new_scratch: best_of::new_scratch,
        observe: best_of::observe,
        merge: best_of::merge,
        new_totals: best_of::new_totals,
        clean: best_of::clean,
    },
    LayoutEntry {
        // `binaryization.c:81` — the layout's own name; the CSV column is
        // `binaryization_bz` (layout name + its synthetic "bz" codec name).
        name: "binaryization",
        priority: -2,
        init: binaryization::init,
        new_scratch: binaryization::new_scratch,
        observe: binaryization::observe,
        merge: binaryization::merge,
        new_totals: binaryization::new_totals,
        clean: binaryization::clean,
    },
    LayoutEntry {
        // `compresso.c:194` — the layout's name is the empty string, so its
        // CSV columns are `_compresso` / `_compresso_cache`.
        name: "",
        priority: -10,
        init: compresso::init,
        new_scratch: compresso::new_scratch,
        observe: compresso::observe,
        merge: compresso::merge,
        new_totals: compresso::new_totals,
        clean: compresso::clean,
    },
];

/// One layout entry paired with its live `active` flag and running totals.
/// The Rust replacement for the C source's per-layout globals (`run`,
/// `portion_report`, etc. in each `src/layout/*.c`). `totals` is behind a
/// single mutex rather than the per-bucket mutex arrays best-of/compresso
/// use in the source — coarser-grained, observably equivalent (see
/// `layouts::compresso`'s doc comment for the same tradeoff spelled out).
pub struct ActiveLayout {
    pub entry: &'static LayoutEntry,
    pub active: bool,
    pub totals: Mutex<LayoutTotals>,
}

/// Owns the resolved codec/layout registries plus the run's configuration
/// — the Rust replacement for the process-wide globals `driver.c` keeps
/// in `sh`, `compressionp`, and `layoutp` (spec.md §9's design note).
pub struct MeasurementRun {
    pub config: RunConfig,
    pub codecs: &'static [CodecEntry],
    pub layouts: Vec<ActiveLayout>,
}

impl MeasurementRun {
    /// `load_initialize_compressions` — resolves which layouts are active
    /// for this codec set and seeds their totals. `LAYOUTS` is already in
    /// descending-priority order, so no sort is needed.
    pub fn new(config: RunConfig) -> Self {
        let layouts = if config.layouts {
            LAYOUTS
                .iter()
                .map(|entry| {
                    let active = (entry.init)(CODECS);
                    let mut totals = (entry.new_totals)();
                    if active {
                        if let LayoutTotals::Compresso(t) = &mut totals {
                            t.active = true;
                        }
                    }
                    ActiveLayout { entry, active, totals: Mutex::new(totals) }
                })
                .collect()
        } else {
            Vec::new()
        };

        MeasurementRun { config, codecs: CODECS, layouts }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_codec_name_is_unique() {
        let mut names: Vec<&str> = CODECS.iter().map(|c| c.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), CODECS.len());
    }

    #[test]
    fn best_of_and_compresso_activate_with_full_codec_set() {
        let run = MeasurementRun::new(RunConfig::default());
        let best_of = run.layouts.iter().find(|l| l.entry.name == "best-of").unwrap();
        assert!(best_of.active);
        let compresso = run.layouts.iter().find(|l| l.entry.priority == -10).unwrap();
        assert!(compresso.active);
        let bz = run.layouts.iter().find(|l| l.entry.name == "binaryization").unwrap();
        assert!(bz.active);
    }

    #[test]
    fn layouts_disabled_when_config_says_so() {
        let cfg = RunConfig { layouts: false, ..Default::default() };
        let run = MeasurementRun::new(cfg);
        assert!(run.layouts.is_empty());
    }
}
