//! Page-level wrappers around the two external byte-oriented codecs the
//! measurement harness uses as a reference baseline.
//!
//! spec.md §1 treats these as "external collaborators specified only at
//! their interface" (compress ≤1.2·PAGE_SIZE bytes, decompress bit-exact).
//! Rather than a hand-rolled vendor copy of zlib/lz4, we wrap real crates
//! that provide the same compressors the original C sources linked
//! against: `lz4_flex` for `original_source/src/compression/lz4.c`,
//! `flate2` for `original_source/src/compression/deflate/deflate.c`.
//! Neither is cacheline-granular (both operate over the whole page), so
//! neither produces a cacheline report, matching the C wrappers.

pub mod deflate;
pub mod lz4;
