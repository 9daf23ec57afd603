//! Layout aggregators: cross-codec views computed from the per-page
//! results of the codecs registered for a run. Ported from
//! `src/layout/{best-of,binaryization,compresso}.c`.
//!
//! Each layout contributes one or more synthetic "codec" rows to the CSV
//! output (`struct compression` nodes the C sources splice onto the
//! shared list); see [`crate::model::LayoutTotals::synthetic_totals`].

pub mod best_of;
pub mod binaryization;
pub mod compresso;
