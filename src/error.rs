//! Structured error types for the measurement harness.
//!
//! The teacher crate leans on `anyhow` everywhere and never needed a
//! structured error enum of its own; this enum follows the thiserror
//! pattern used by `oxiarc-core` for the concerns this harness actually has
//! (parse/codec/config failures with recoverable context), while `anyhow`
//! is still used at the CLI boundary to add context and print a single
//! diagnostic line.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MeasurementError {
    #[error("failed to parse input file {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("codec '{codec}' failed round-trip validation at offset {offset:#x}")]
    CodecFailure { codec: &'static str, offset: u64 },

    #[error("decoder for '{codec}' encountered invalid opcode {opcode:#x}")]
    InvalidOpcode { codec: &'static str, opcode: u8 },

    #[error("decoder for '{codec}' encountered a malformed bitstream: {detail}")]
    InvalidBitstream { codec: &'static str, detail: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, MeasurementError>;
