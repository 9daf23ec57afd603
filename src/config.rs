// config.rs — compile-time configuration constants.
// Migrated from plugin_struct.h (NAP64 Memory-Compression-Measurements-Open).

/// Size in bytes of one measured page. Corresponds to `PAGE_SIZE` in
/// `plugin_struct.h`.
pub const PAGE_SIZE: usize = 4096;

/// Size in bytes of one cacheline within a page. Corresponds to
/// `CACHELINE_SIZE` in `plugin_struct.h`.
pub const CACHELINE_SIZE: usize = 64;

/// Number of cachelines per page.
pub const CACHELINES_PER_PAGE: usize = PAGE_SIZE / CACHELINE_SIZE;

/// Size in bytes of one worker dispatch slice. Corresponds to the
/// `BLOCK` macro in `driver.c` (1024 pages = 4 MiB).
pub const BLOCK: usize = 1024 * PAGE_SIZE;

/// Default number of worker threads when `-n` is not given.
/// Corresponds to `sh->threads = 4` in `driver.c::main`.
pub const NB_WORKERS_DEFAULT: usize = 4;

/// Sentinel cacheline-report value meaning "cacheline is all zero".
/// Corresponds to `ZERO_SIZE` in `plugin_struct.h`.
pub const ZERO_SIZE: u16 = 65535;

/// Returns the zero-sentinel encoding of a cacheline bit-size.
/// Corresponds to `ZERO_CACHELINE(s)` — the bitwise complement of `s`.
#[inline]
pub const fn zero_cacheline(s: u16) -> u16 {
    !s
}

/// Returns whether a raw cacheline-report value denotes an all-zero
/// cacheline. Corresponds to `IS_ZERO_CACHELINE(s)`.
#[inline]
pub const fn is_zero_cacheline(s: u16) -> bool {
    s > 32768
}

/// Normalizes a raw cacheline-report value back to a true bit count.
/// Corresponds to `NORM_CACHELINE(s)`.
#[inline]
pub const fn norm_cacheline(s: u16) -> u16 {
    if is_zero_cacheline(s) {
        !s
    } else {
        s
    }
}

/// Sentinel for a codec-internal validation failure. Corresponds to
/// `ERROR_SIZE` (`(uint64_t)-1`) in `plugin_struct.h`.
pub const ERROR_SIZE: u64 = u64::MAX;
