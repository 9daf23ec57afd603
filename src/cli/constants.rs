// cli/constants.rs — display-level infrastructure, ported from lz4cli.c's
// DISPLAYOUT/DISPLAY/DISPLAYLEVEL macros and their backing global.

use std::sync::atomic::{AtomicU32, Ordering};

// ── Display level global (lz4cli.c line 85) ───────────────────────────────────
//
// In the C source, `static unsigned displayLevel = 2` is a file-scoped global
// used by the DISPLAYLEVEL macro throughout lz4cli.c. Here it's a crate-level
// atomic so every module can reach it without threading a context argument
// through every call. `-q`/default leaves this at 2 (normal); nothing in this
// crate currently raises it past that, but the mechanism stays general.
//
// 0 = no output; 1 = errors only; 2 = normal (downgradable); 3 = non-downgradable; 4 = verbose
pub static DISPLAY_LEVEL: AtomicU32 = AtomicU32::new(2);

/// Returns the current display level.
#[inline]
pub fn display_level() -> u32 {
    DISPLAY_LEVEL.load(Ordering::Relaxed)
}

/// Sets the display level.
#[inline]
pub fn set_display_level(level: u32) {
    DISPLAY_LEVEL.store(level, Ordering::Relaxed);
}

// ── Display helpers (lz4cli.c lines 82–85) ────────────────────────────────────
//
// The C macros DISPLAYOUT, DISPLAY, and DISPLAYLEVEL are replaced by these
// helper macros:
//
//   DISPLAYOUT(...)      → print!(...) / use `displayout!` macro
//   DISPLAY(...)         → eprint!(...) / use `display!` macro
//   DISPLAYLEVEL(l, ...) → if display_level() >= l { eprint!(...) }

/// Print to stdout — equivalent to C `DISPLAYOUT(...)`.
#[macro_export]
macro_rules! displayout {
    ($($arg:tt)*) => { print!($($arg)*) };
}

/// Print to stderr — equivalent to C `DISPLAY(...)`.
#[macro_export]
macro_rules! display {
    ($($arg:tt)*) => { eprint!($($arg)*) };
}

/// Conditionally print to stderr at or above `level` — equivalent to C `DISPLAYLEVEL(l, ...)`.
#[macro_export]
macro_rules! displaylevel {
    ($level:expr, $($arg:tt)*) => {
        if $crate::cli::constants::display_level() >= $level {
            eprint!($($arg)*);
        }
    };
}

// ── Error / debug macros (lz4cli.c lines 91–102) ─────────────────────────────
//
// `DEBUGOUTPUT` — prints to stderr only when DEBUG is non-zero.
// In Rust this is a no-op in release builds and active in debug builds via `cfg(debug_assertions)`.
//
// `END_PROCESS(error, ...)` — prints location info, an error message, then exits.
// In Rust this becomes the `end_process!` macro below.

/// Print debug output — equivalent to C `DEBUGOUTPUT(...)`.
/// Only active in debug builds (mirrors `#ifndef DEBUG / #define DEBUG 0`).
#[macro_export]
macro_rules! debugoutput {
    ($($arg:tt)*) => {
        #[cfg(debug_assertions)]
        eprint!($($arg)*);
    };
}

/// Terminate the process with an error code after printing a diagnostic.
/// Equivalent to the C `END_PROCESS(error, ...)` macro.
///
/// Usage: `end_process!(exit_code, "message {}", arg)`
#[macro_export]
macro_rules! end_process {
    ($error:expr, $($arg:tt)*) => {{
        // Mirror DEBUGOUTPUT("Error in %s, line %i : \n", __FILE__, __LINE__)
        #[cfg(debug_assertions)]
        eprint!("Error in {}, line {} : \n", file!(), line!());
        // Mirror DISPLAYLEVEL(1, "Error %i : ", error)
        if $crate::cli::constants::display_level() >= 1 {
            eprint!("Error {} : ", $error);
            eprint!($($arg)*);
            eprint!("\n");
        }
        std::process::exit($error as i32);
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_level_default() {
        // Default is 2 (normal, downgradable).
        // Note: other tests may mutate this; reset after checking.
        let prev = display_level();
        assert!(display_level() <= 4);
        set_display_level(3);
        assert_eq!(display_level(), 3);
        set_display_level(prev);
    }
}
