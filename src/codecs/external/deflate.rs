//! Deflate page codec, wrapping `flate2`'s raw-deflate streams.
//!
//! Grounded on `original_source/src/compression/deflate/deflate.c`'s
//! `compress4k`/`uncompress4k`, a copy of zlib's `compress`/`uncompress`
//! reconfigured via `deflateInit2(..., -12, ...)` for a headerless, raw
//! deflate stream. `flate2::{write::DeflateEncoder, read::DeflateDecoder}`
//! give the same headerless raw-deflate framing (no zlib/gzip wrapper),
//! which is the property the wrapper contract in spec.md §1 actually cares
//! about; `wesleyscholl-squish` uses the same crate for its own deflate path.

use std::io::{Read, Write};

use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;

use crate::config::PAGE_SIZE;
use crate::error::{MeasurementError, Result};
use crate::model::{Page, PageResult, RunConfig};

pub const NAME: &str = "deflate";

/// `deflate_method` — compresses one page and, under `-v`, checks the
/// round-trip. Never cacheline-granular.
pub fn compress_page(page: Page<'_>, cfg: &RunConfig) -> Result<PageResult> {
    debug_assert_eq!(page.len(), PAGE_SIZE);
    let fail = || MeasurementError::CodecFailure { codec: NAME, offset: 0 };

    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(page).map_err(|_| fail())?;
    let compressed = encoder.finish().map_err(|_| fail())?;
    let bits = (compressed.len() * 8) as u64;

    if cfg.validate {
        let mut decoder = DeflateDecoder::new(&compressed[..]);
        let mut decompressed = Vec::with_capacity(PAGE_SIZE);
        decoder.read_to_end(&mut decompressed).map_err(|_| fail())?;
        if decompressed != page {
            let offset = decompressed
                .iter()
                .zip(page.iter())
                .position(|(a, b)| a != b)
                .unwrap_or(0) as u64;
            return Err(MeasurementError::CodecFailure { codec: NAME, offset });
        }
    }

    Ok(PageResult { bits, cachelines: None })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_page_of_text() {
        let mut page = [0u8; PAGE_SIZE];
        for (i, b) in page.iter_mut().enumerate() {
            *b = b"the quick brown fox jumps over the lazy dog "[i % 45];
        }
        let cfg = RunConfig { validate: true, ..Default::default() };
        let result = compress_page(&page, &cfg).unwrap();
        assert!(result.bits > 0);
    }

    #[test]
    fn all_zero_page_compresses_small() {
        let page = [0u8; PAGE_SIZE];
        let cfg = RunConfig::default();
        let result = compress_page(&page, &cfg).unwrap();
        assert!(result.bits < (PAGE_SIZE * 8) as u64);
    }
}
