//! Block and page compressors.
//!
//! Four are ported from the project's own bit-exact codecs (bdi, bpc,
//! bpc_compresso, cpack, huffman1); `external` wraps the reference
//! byte-oriented codecs (lz4, deflate) used as a sanity baseline in the
//! layout aggregators.

pub mod bdi;
pub mod bpc;
pub mod bpc_compresso;
pub mod cpack;
pub mod external;
pub mod huffman1;
