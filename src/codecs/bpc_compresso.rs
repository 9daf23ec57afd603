//! Bit-Plane Compression for Compresso: the 64-byte, cacheline-granular
//! variant of [`super::bpc`], ported bit-for-bit from `bpc_compresso.h`.
//!
//! Each 64-byte block is compressed two different ways and the smaller
//! result is kept (ties favor mode 0):
//!
//! - mode 0 ("transformed"): the block read as 16 little-endian `u32`
//!   words, run through the same base+delta transform as `bpc`, yielding
//!   32 planes of 15-bit-wide values (no separate sign plane — the full
//!   32-bit two's-complement delta already carries its own sign across the
//!   32 bit-planes).
//! - mode 1 ("raw"): the block read as 32 little-endian `u16` words, fed
//!   *directly* into the same zero-run-length plane encoder with no
//!   transform and no base field.
//!
//! Both modes reuse [`super::bpc`]'s `write_planes`/`read_planes` grammar
//! with `idx_bits = 4` (16-entry dictionary) and the literal `0x7fff`
//! "all ones" sentinel — reused unchanged from the 15-bit mode even for
//! mode 1's full 16-bit raw values, a quirk carried over from the source
//! rather than corrected (see DESIGN.md).

use crate::bitstream::{BitReader, BitWriter};
use crate::codecs::bpc::{read_base, read_planes, write_base, write_planes};

const WORDS32: usize = 16;
const WORDS16: usize = 32;
pub const BLOCK_BYTES: usize = WORDS32 * 4;
/// Worst case over both modes: mode bit + base (up to 33 bits) + 32 planes
/// at up to 17 bits each.
pub const MAX_ENCODED: usize = 80;

/// `bpctransform` (compresso variant): 16 `u32` words in, base + 32
/// 15-bit-wide planes out.
fn transform(input: &[u32; WORDS32]) -> (u32, [u32; WORDS16]) {
    let base = input[0];
    let mut delta = [0u32; 15];
    for i in 1..16 {
        delta[i - 1] = input[i].wrapping_sub(input[i - 1]);
    }
    let mut plane = [0u32; WORDS16];
    for i in 0..32 {
        let mut v = 0u32;
        for j in 0..15 {
            v |= ((delta[j] >> i) & 1) << j;
        }
        plane[i] = v;
    }
    (base, plane)
}

/// `bpctransform_rev` (compresso variant).
fn transform_rev(base: u32, plane: &[u32; WORDS16]) -> [u32; WORDS32] {
    let mut out = [0u32; WORDS32];
    out[0] = base;
    let mut delta = [0u32; 15];
    for i in 0..15 {
        let mut v = 0u32;
        for j in 0..32 {
            v |= ((plane[j] >> i) & 1) << j;
        }
        delta[i] = v;
    }
    for i in 1..16 {
        out[i] = out[i - 1].wrapping_add(delta[i - 1]);
    }
    out
}

fn read_u32_words(input: &[u8]) -> [u32; WORDS32] {
    let mut words = [0u32; WORDS32];
    for (i, w) in words.iter_mut().enumerate() {
        *w = u32::from_le_bytes(input[i * 4..i * 4 + 4].try_into().unwrap());
    }
    words
}

fn read_u16_words_as_planes(input: &[u8]) -> [u32; WORDS16] {
    let mut words = [0u32; WORDS16];
    for (i, w) in words.iter_mut().enumerate() {
        *w = u16::from_le_bytes(input[i * 2..i * 2 + 2].try_into().unwrap()) as u32;
    }
    words
}

/// Encodes one 64-byte block, trying both modes and keeping the smaller
/// encoding (mode 0 on a tie). Returns the number of bits consumed.
pub fn compress(input: &[u8], out: &mut [u8]) -> usize {
    debug_assert_eq!(input.len(), BLOCK_BYTES);

    let words32 = read_u32_words(input);
    let (base, plane) = transform(&words32);
    let mut w0 = BitWriter::new();
    w0.write(0, 1); // mode 0: transformed
    write_base(&mut w0, base);
    write_planes(&mut w0, &plane, 4, 15, 0x7fff);
    let bits0 = w0.bit_len();
    let bytes0 = w0.finish();

    let raw_plane = read_u16_words_as_planes(input);
    let mut w1 = BitWriter::new();
    w1.write(1, 1); // mode 1: raw
    write_planes(&mut w1, &raw_plane, 4, 16, 0x7fff);
    let bits1 = w1.bit_len();
    let bytes1 = w1.finish();

    if bits1 < bits0 {
        out[..bytes1.len()].copy_from_slice(&bytes1);
        bits1
    } else {
        out[..bytes0.len()].copy_from_slice(&bytes0);
        bits0
    }
}

/// Decodes one 64-byte block. Returns the number of bits consumed.
pub fn decompress(input: &[u8], out: &mut [u8]) -> usize {
    debug_assert_eq!(out.len(), BLOCK_BYTES);
    let mut r = BitReader::new(input);
    if r.read(1) == 1 {
        // mode 1: raw planes decode directly into the 32 u16 output words.
        let plane_vec = read_planes(&mut r, WORDS16, 4, 16, 0x7fff);
        for (i, v) in plane_vec.iter().enumerate() {
            out[i * 2..i * 2 + 2].copy_from_slice(&(*v as u16).to_le_bytes());
        }
    } else {
        let base = read_base(&mut r);
        let plane_vec = read_planes(&mut r, WORDS16, 4, 15, 0x7fff);
        let mut plane = [0u32; WORDS16];
        plane.copy_from_slice(&plane_vec);
        let words = transform_rev(base, &plane);
        for (i, v) in words.iter().enumerate() {
            out[i * 4..i * 4 + 4].copy_from_slice(&v.to_le_bytes());
        }
    }
    r.bit_pos()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(input: &[u8; BLOCK_BYTES]) {
        let mut encoded = [0u8; MAX_ENCODED];
        let bits = compress(input, &mut encoded);
        let nbytes = bits.div_ceil(8);
        let mut decoded = [0u8; BLOCK_BYTES];
        decompress(&encoded[..nbytes.max(1)], &mut decoded);
        assert_eq!(&decoded, input);
    }

    #[test]
    fn all_zero_picks_mode_zero() {
        let input = [0u8; BLOCK_BYTES];
        let mut encoded = [0u8; MAX_ENCODED];
        let bits = compress(&input, &mut encoded);
        assert_eq!(encoded[0] & 0x80, 0, "mode bit should be 0 (transformed) on a tie");
        round_trip(&input);
        let _ = bits;
    }

    #[test]
    fn ascending_u32_words() {
        let mut input = [0u8; BLOCK_BYTES];
        for i in 0..WORDS32 {
            input[i * 4..i * 4 + 4].copy_from_slice(&((i as u32) * 97).to_le_bytes());
        }
        round_trip(&input);
    }

    #[test]
    fn high_entropy_prefers_raw_mode() {
        let mut input = [0u8; BLOCK_BYTES];
        let mut x: u32 = 0xCAFEF00D;
        for chunk in input.chunks_mut(4) {
            x = x.wrapping_mul(1_103_515_245).wrapping_add(12345);
            chunk.copy_from_slice(&x.to_le_bytes());
        }
        round_trip(&input);
    }

    #[test]
    fn single_nonzero_word_each_position() {
        for pos in 0..WORDS32 {
            let mut input = [0u8; BLOCK_BYTES];
            input[pos * 4..pos * 4 + 4].copy_from_slice(&0xDEAD_BEEFu32.to_le_bytes());
            round_trip(&input);
        }
    }

    #[test]
    fn single_nonzero_byte_at_each_position() {
        for pos in 0..BLOCK_BYTES {
            let mut input = [0u8; BLOCK_BYTES];
            input[pos] = 0x5A;
            round_trip(&input);
        }
    }
}
