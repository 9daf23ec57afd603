//! Binaryization layout: classifies each page as "large" or "small"
//! relative to a fixed threshold, using best-of's per-page bit count as
//! its input.
//!
//! Ported from `original_source/src/layout/binaryization.c` (`bz_init`/
//! `bz_pr`/`bz_cp`). Depends on the synthetic `"best-of"` codec the
//! best-of layout contributes; the driver feeds best-of's merged
//! [`crate::model::PageResult`] to this layout's `observe` under the name
//! `"best-of"` (the Rust equivalent of the C source's trick of splicing
//! its own compression node onto the shared list right after best-of's).

use crate::config::PAGE_SIZE;
use crate::model::{CodecEntry, LayoutScratch, LayoutTotals, PageResult, RunConfig};

/// `PAGE_B` — threshold in bits above which a page is classified "large".
const PAGE_B: u64 = 3604 * 8;
const INTEREST: &str = "best-of";

fn page_calc(bits: u64) -> u64 {
    if bits > PAGE_B {
        (PAGE_SIZE * 8) as u64
    } else {
        (PAGE_SIZE * 4) as u64
    }
}

pub struct Scratch {
    pgs: u64,
}

pub struct Totals {
    pub total_bits: u64,
}

pub fn new_totals() -> LayoutTotals {
    LayoutTotals::Binaryization(Totals { total_bits: 0 })
}

/// `bz_init` — unconditionally active; a page that never sees a
/// `"best-of"` observation simply reports 0 bits for binaryization,
/// matching the C source's unconditional list-splice.
pub fn init(_codecs: &[CodecEntry]) -> bool {
    true
}

pub fn new_scratch() -> LayoutScratch {
    LayoutScratch::Binaryization(Scratch { pgs: 0 })
}

pub fn observe(scratch: &mut LayoutScratch, codec_name: &str, result: &PageResult, _cfg: &RunConfig) {
    let LayoutScratch::Binaryization(s) = scratch else { return };
    if codec_name == INTEREST {
        s.pgs = page_calc(result.bits);
    }
}

pub fn merge(totals: &mut LayoutTotals, scratch: LayoutScratch) -> PageResult {
    let LayoutScratch::Binaryization(s) = scratch else {
        unreachable!("binaryization merge called with foreign scratch")
    };
    let LayoutTotals::Binaryization(t) = totals else {
        unreachable!("binaryization merge called with foreign totals")
    };
    t.total_bits += s.pgs;
    PageResult { bits: s.pgs, cachelines: None }
}

/// `bz_cr` is a no-op in the source.
pub fn clean(_totals: &LayoutTotals) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_boundary() {
        assert_eq!(page_calc(PAGE_B), (PAGE_SIZE * 4) as u64);
        assert_eq!(page_calc(PAGE_B + 1), (PAGE_SIZE * 8) as u64);
    }
}
