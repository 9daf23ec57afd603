//! LZ4 page codec, wrapping `lz4_flex::block`.
//!
//! Grounded on `original_source/src/compression/lz4.c`'s `lz4_compression`:
//! compress one page into a scratch buffer sized `1.2·PAGE_SIZE`,
//! optionally round-trip it under `-v`. `lz4_flex` is the same crate
//! `wesleyscholl-squish` reaches for when it needs an LZ4 block codec
//! rather than the bundled-C copy the original program links against.

use crate::config::PAGE_SIZE;
use crate::error::{MeasurementError, Result};
use crate::model::{Page, PageResult, RunConfig};

pub const NAME: &str = "lz4";

/// `lz4_compression` — compresses one page and, under `-v`, checks the
/// round-trip. Never cacheline-granular.
pub fn compress_page(page: Page<'_>, cfg: &RunConfig) -> Result<PageResult> {
    debug_assert_eq!(page.len(), PAGE_SIZE);

    let compressed = lz4_flex::block::compress(page);
    let bits = (compressed.len() * 8) as u64;

    if cfg.validate {
        let decompressed = lz4_flex::block::decompress(&compressed, PAGE_SIZE).map_err(|_| {
            MeasurementError::CodecFailure { codec: NAME, offset: 0 }
        })?;
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
        assert!(result.cachelines.is_none());
    }

    #[test]
    fn all_zero_page_compresses_small() {
        let page = [0u8; PAGE_SIZE];
        let cfg = RunConfig::default();
        let result = compress_page(&page, &cfg).unwrap();
        assert!(result.bits < (PAGE_SIZE * 8) as u64);
    }
}
