//! Core data model shared across codecs, the driver, and layouts.
//!
//! Grounded on `plugin_struct.h`'s `struct compression`, `struct layout`,
//! and `struct shared`, translated from C's process-wide globals into
//! explicit, owned Rust values.

use crate::config::CACHELINES_PER_PAGE;
use crate::layouts::{best_of, binaryization, compresso};

/// One 4096-byte page, borrowed from the memory-mapped input.
pub type Page<'a> = &'a [u8];

/// Per-cacheline bit-size report for one page, in the raw zero-sentinel
/// encoding described by `config::{zero_cacheline, is_zero_cacheline,
/// norm_cacheline}`. `None` entries mean the codec is not cacheline
/// granular (it reports only a whole-page bit count).
pub type CachelineReport = Option<[u16; CACHELINES_PER_PAGE]>;

/// Result of compressing one page with one codec.
#[derive(Debug, Clone)]
pub struct PageResult {
    pub bits: u64,
    pub cachelines: CachelineReport,
}

/// Run-wide configuration, the Rust translation of `struct shared`.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub threads: usize,
    /// `-v`: round-trip every codec output against its decoder.
    pub validate: bool,
    /// `-z`: detect all-zero pages and report `ZERO_SIZE` without running
    /// codecs over them. On by default; `-z` flips it off.
    pub zero_page_detect: bool,
    /// `-p`: clamp every codec's page bit count to at most `PAGE_SIZE*8`.
    /// On by default; `-p` flips it off.
    pub parse_switch: bool,
    /// `-h`: print the CSV header row. On by default; `-h` suppresses it.
    pub header: bool,
    /// `-l`: run the layout aggregators. On by default; `-l` skips them.
    pub layouts: bool,
    /// `-a`: emit compression ratios. Off by default (raw bit totals);
    /// `-a` switches to ratios.
    pub ratios: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            threads: crate::config::NB_WORKERS_DEFAULT,
            validate: false,
            zero_page_detect: true,
            parse_switch: true,
            header: true,
            layouts: true,
            ratios: false,
        }
    }
}

/// A registered codec: a name and a pure page-compression function.
/// Corresponds to `struct compression` minus the mutex/running-total
/// fields, which live in `Totals` instead of on the entry itself.
#[derive(Clone, Copy)]
pub struct CodecEntry {
    pub name: &'static str,
    pub compress: fn(page: Page<'_>, cfg: &RunConfig) -> crate::error::Result<PageResult>,
}

/// Per-worker scratch state for one layout observer. Three concrete
/// variants rather than `dyn Any`, since the layout portfolio is a fixed,
/// compile-time set (replacing the C source's three `__thread` blocks).
pub enum LayoutScratch {
    BestOf(best_of::Scratch),
    Binaryization(binaryization::Scratch),
    Compresso(compresso::Scratch),
}

/// Accumulated, cross-worker totals for one layout. Protected by a mutex
/// (or per-bucket mutexes, for best-of/compresso) inside `Totals`.
pub enum LayoutTotals {
    BestOf(best_of::Totals),
    Binaryization(binaryization::Totals),
    Compresso(compresso::Totals),
}

/// Observer hooks for one layout aggregator. Corresponds to `struct
/// layout`'s `L_init`/`L_page_r`/`L_final_r` members.
///
/// `observe` is called once per `(codec, page)` pair in codec-registration
/// order, with the raw (un-accumulated) per-page result, before the driver
/// folds that result into the codec's running total — matching
/// `run_compress`'s call order in `driver.c`. Layouts run afterwards in
/// descending-priority order; each layout's `merge` folds its page's
/// scratch into its running totals AND returns a synthetic `PageResult`
/// for that page, which the driver feeds to every lower-priority layout's
/// `observe` under this layout's own `name` — replacing the C source's
/// trick of splicing a synthetic `struct compression` node onto the
/// shared linked list so lower-priority layouts can watch a higher one's
/// output (e.g. binaryization watching "best-of").
pub struct LayoutEntry {
    pub name: &'static str,
    pub priority: i32,
    pub init: fn(codecs: &[CodecEntry]) -> bool,
    pub new_scratch: fn() -> LayoutScratch,
    pub observe: fn(scratch: &mut LayoutScratch, codec_name: &str, result: &PageResult, cfg: &RunConfig),
    pub merge: fn(totals: &mut LayoutTotals, scratch: LayoutScratch) -> PageResult,
    pub new_totals: fn() -> LayoutTotals,
    /// `L_clean_r` — runs once after every worker has joined, before the
    /// CSV row is printed. Used by `compresso` to emit its human-readable
    /// bucket summary to stderr; a no-op for best-of/binaryization (their
    /// C counterparts' `L_clean_r` are empty functions too).
    pub clean: fn(totals: &LayoutTotals),
}

impl LayoutTotals {
    /// The synthetic codecs this layout contributes to the CSV output,
    /// and their accumulated bit totals so far — e.g. best-of contributes
    /// one ("best-of", N), compresso contributes two.
    pub fn synthetic_totals(&self) -> Vec<(&'static str, u64)> {
        match self {
            LayoutTotals::BestOf(t) => vec![("best-of", t.total_bits)],
            LayoutTotals::Binaryization(t) => vec![("bz", t.total_bits)],
            LayoutTotals::Compresso(t) => {
                if t.active {
                    vec![("compresso", t.total_bits), ("compresso_cache", t.total_bits_aligned)]
                } else {
                    vec![]
                }
            }
        }
    }
}
