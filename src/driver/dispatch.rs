//! Bounded-parallelism page dispatch: walks the measured region in `BLOCK`
//! slices, hands each slice to the `TPool`, and folds every page's result
//! into the run's codec and layout totals.
//!
//! Ported from `original_source/src/driver.c::run_compress` and its
//! `main`'s dispatch loop (`sem_wait`/`pthread_create`/drain). The
//! semaphore is `TPool`'s bounded job-slot channel instead of a raw
//! `sem_t`; per-page work is otherwise the same shape: zero-page fast
//! path, then every codec in registration order, with every active
//! layout observing each codec's result before the layout chain itself
//! merges and cascades its synthetic result to lower-priority layouts.
//!
//! Workers borrow the mapped input and the layout registry through `Arc`
//! rather than a raw pointer + lifetime transmute: `memmap2::Mmap` is
//! `Send + Sync`, so cloning the `Arc` into each spawned job is enough to
//! satisfy `TPool::submit_job`'s `'static` bound without unsafe code.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use memmap2::Mmap;

use crate::config::{CACHELINE_SIZE, PAGE_SIZE};
use crate::error::Result;
use crate::model::{CodecEntry, LayoutScratch, RunConfig};
use crate::registry::ActiveLayout;
use crate::threadpool::TPool;

/// Per-codec running bit total, mutex-guarded to mirror `struct
/// compression`'s `slock`/`size` pair.
struct CodecTotal {
    total: Mutex<u64>,
}

/// Processes every page in `mmap[start..end]`, dispatching `BLOCK`-sized
/// chunks across up to `config.threads` workers. Returns each codec's
/// total bits (registration order) and the zero-page count.
pub fn measure(
    mmap: Arc<Mmap>,
    start: usize,
    end: usize,
    config: &RunConfig,
    codecs: &'static [CodecEntry],
    layouts: Arc<Vec<ActiveLayout>>,
) -> Result<(Vec<u64>, u64)> {
    let codec_totals: Arc<Vec<CodecTotal>> =
        Arc::new(codecs.iter().map(|_| CodecTotal { total: Mutex::new(0) }).collect());
    let zero_count = Arc::new(AtomicU64::new(0));
    let first_error: Arc<Mutex<Option<crate::error::MeasurementError>>> = Arc::new(Mutex::new(None));

    let pool = TPool::new(config.threads, 1)
        .ok_or_else(|| crate::error::MeasurementError::Config("invalid thread count".to_string()))?;

    let mut chunk_start = start;
    while chunk_start < end {
        let chunk_end = (chunk_start + crate::config::BLOCK).min(end);

        let mmap = Arc::clone(&mmap);
        let layouts = Arc::clone(&layouts);
        let codec_totals = Arc::clone(&codec_totals);
        let zero_count = Arc::clone(&zero_count);
        let first_error = Arc::clone(&first_error);
        let config = config.clone();
        let (chunk_start, chunk_end) = (chunk_start, chunk_end);

        pool.submit_job(Box::new(move || {
            let slice = &mmap[chunk_start..chunk_end];
            if let Err(e) = measure_slice(slice, &config, codecs, &layouts, &codec_totals, &zero_count) {
                let mut guard = first_error.lock().unwrap();
                if guard.is_none() {
                    *guard = Some(e);
                }
            }
        }));

        chunk_start = chunk_end;
    }
    pool.jobs_completed();
    drop(pool);

    if let Some(e) = Arc::try_unwrap(first_error).unwrap().into_inner().unwrap() {
        return Err(e);
    }

    // `jobs_completed` (via `TPool`'s `Drop`) has joined every worker, so
    // every per-job `Arc::clone` has already gone out of scope — this is
    // always the sole remaining reference.
    let totals = Arc::try_unwrap(codec_totals)
        .unwrap_or_else(|_| unreachable!("workers still hold a codec_totals reference after join"))
        .into_iter()
        .map(|c| c.total.into_inner().unwrap())
        .collect();
    Ok((totals, zero_count.load(Ordering::Relaxed)))
}

fn measure_slice(
    slice: &[u8],
    config: &RunConfig,
    codecs: &'static [CodecEntry],
    layouts: &[ActiveLayout],
    codec_totals: &[CodecTotal],
    zero_count: &AtomicU64,
) -> Result<()> {
    for page in slice.chunks(PAGE_SIZE) {
        if page.len() < PAGE_SIZE {
            break; // trailing partial page; region is pre-rounded so this shouldn't occur.
        }

        if config.zero_page_detect && page.iter().all(|&b| b == 0) {
            zero_count.fetch_add(1, Ordering::Relaxed);
            continue;
        }

        measure_page(page, config, codecs, layouts, codec_totals)?;
    }
    Ok(())
}

fn measure_page(
    page: &[u8],
    config: &RunConfig,
    codecs: &'static [CodecEntry],
    layouts: &[ActiveLayout],
    codec_totals: &[CodecTotal],
) -> Result<()> {
    let active_layouts: Vec<&ActiveLayout> = layouts.iter().filter(|l| l.active).collect();
    let mut scratches: Vec<Option<LayoutScratch>> =
        active_layouts.iter().map(|l| Some((l.entry.new_scratch)())).collect();

    for (codec, total) in codecs.iter().zip(codec_totals.iter()) {
        let mut result = (codec.compress)(page, config)?;

        // `driver.c:164-165` — a driver-level clamp applied to every
        // codec's page result, on top of whatever block-level clamping the
        // codec's own adapter already did.
        if config.parse_switch && result.bits > (PAGE_SIZE * 8) as u64 {
            result.bits = (PAGE_SIZE * 8) as u64;
        }

        // `driver.c:166-169` — mark every all-zero cacheline of a
        // (non-zero) page with the zero sentinel before layouts observe it.
        if let Some(report) = result.cachelines.as_mut() {
            for (j, cacheline) in page.chunks(CACHELINE_SIZE).enumerate() {
                if cacheline.iter().all(|&b| b == 0) {
                    report[j] = crate::config::zero_cacheline(report[j]);
                }
            }
        }

        *total.total.lock().unwrap() += result.bits;

        for (i, layout) in active_layouts.iter().enumerate() {
            if let Some(scratch) = scratches[i].as_mut() {
                (layout.entry.observe)(scratch, codec.name, &result, config);
            }
        }
    }

    for i in 0..active_layouts.len() {
        let layout = active_layouts[i];
        let scratch_i = scratches[i].take().expect("layout scratch consumed twice");
        let synthetic = {
            let mut totals = layout.totals.lock().unwrap();
            (layout.entry.merge)(&mut totals, scratch_i)
        };
        for j in (i + 1)..active_layouts.len() {
            if let Some(scratch) = scratches[j].as_mut() {
                (active_layouts[j].entry.observe)(scratch, layout.entry.name, &synthetic, config);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LayoutTotals, RunConfig};
    use crate::registry::{CODECS, LAYOUTS};

    fn build_layouts() -> Vec<ActiveLayout> {
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
    }

    fn fresh_codec_totals() -> Vec<CodecTotal> {
        CODECS.iter().map(|_| CodecTotal { total: Mutex::new(0) }).collect()
    }

    /// `driver.c:164-165` — incompressible input must never push a codec's
    /// reported page size past `PAGE_SIZE*8`, even for whole-page codecs
    /// (huffman1/lz4/deflate) that have no internal per-block clamp.
    #[test]
    fn incompressible_page_is_clamped_to_page_size_bits() {
        let config = RunConfig::default();
        let layouts = build_layouts();
        let codec_totals = fresh_codec_totals();

        let mut page = vec![0u8; PAGE_SIZE];
        let mut x: u32 = 0xdead_beef;
        for b in page.iter_mut() {
            x = x.wrapping_mul(1_103_515_245).wrapping_add(12345);
            *b = (x >> 16) as u8;
        }

        measure_page(&page, &config, CODECS, &layouts, &codec_totals).unwrap();

        for (codec, total) in CODECS.iter().zip(codec_totals.iter()) {
            let bits = *total.total.lock().unwrap();
            assert!(bits <= (PAGE_SIZE * 8) as u64, "{} exceeded the page-size clamp: {bits} bits", codec.name);
        }
    }

    /// `driver.c:166-169` — an all-zero cacheline inside an otherwise
    /// non-zero page must be marked with the zero sentinel before compresso
    /// observes it, landing it in the 0-byte bucket regardless of
    /// `bpc_compresso`'s literal bit count for that cacheline.
    #[test]
    fn zero_cachelines_are_marked_before_compresso_observes_them() {
        let config = RunConfig::default();
        let layouts = build_layouts();
        let codec_totals = fresh_codec_totals();

        let mut page = vec![0u8; PAGE_SIZE];
        let mut x: u32 = 0x1234_5678;
        for b in page[CACHELINE_SIZE..].iter_mut() {
            x = x.wrapping_mul(1_103_515_245).wrapping_add(12345);
            *b = ((x >> 16) as u8).max(1);
        }

        measure_page(&page, &config, CODECS, &layouts, &codec_totals).unwrap();

        let compresso = layouts.iter().find(|l| l.entry.priority == -10).unwrap();
        let totals = compresso.totals.lock().unwrap();
        let LayoutTotals::Compresso(t) = &*totals else {
            panic!("expected compresso totals")
        };
        assert!(t.raw_cacheline_count[0] >= 1, "the all-zero cacheline should land in the 0-byte bucket");
    }
}
