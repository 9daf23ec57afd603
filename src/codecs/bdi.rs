//! Base-Delta-Immediate codec.
//!
//! Ported bit-for-bit from `bdi.h`, including two historical quirks in the
//! encoder's opcode-selection cascade (recorded as Open Questions 1 and 2
//! in `DESIGN.md`). Operates on fixed 64-byte blocks; a page is 64 such
//! blocks back to back (see `adapter.rs`).

const BLOCK: usize = 64;
/// Worst case encoded size: 1 opcode byte + 64 raw fallback bytes.
pub const MAX_ENCODED: usize = 65;

fn norm(bytes: &[u8]) -> u64 {
    let mut temp: u64 = 0;
    for (i, &b) in bytes.iter().enumerate() {
        temp |= (b as u64) << (i * 8);
    }
    temp
}

fn endian(bytes: &[u8]) -> u64 {
    let mut temp: u64 = 0;
    for &b in bytes {
        temp = (b as u64) | (temp << 8);
    }
    temp
}

/// Mirrors `bdicompress`: `out` receives an optional leading immediate-flag
/// bitmap, then a `bl`-byte base, then `64/bl` deltas of `dl` bytes each.
fn bdicompress(input: &[u8], out: &mut [u8], base: u64, im: bool, bl: usize, dl: usize, en: bool) {
    let offset = if im { 8 / bl } else { 0 };
    let mask: u64 = match dl {
        1 => 0xff,
        2 => 0xffff,
        4 => 0xffff_ffff,
        _ => unreachable!(),
    };
    let mut zero: u64 = 0xffff_ffff;

    let base_bytes = base.to_le_bytes();
    out[offset..offset + bl].copy_from_slice(&base_bytes[..bl]);

    let mut j = bl;
    let mut block_idx: u32 = 0;
    let mut i = 0;
    while i < BLOCK {
        let chunk = &input[i..i + bl];
        let full = if en { endian(chunk) } else { norm(chunk) };
        let temp = if im && full <= mask {
            zero ^= 1u64 << block_idx;
            full
        } else {
            full.wrapping_sub(base)
        };
        let temp_bytes = temp.to_le_bytes();
        out[offset + j..offset + j + dl].copy_from_slice(&temp_bytes[..dl]);
        j += dl;
        i += bl;
        block_idx += 1;
    }
    if offset > 0 {
        let zero_bytes = zero.to_le_bytes();
        out[..offset].copy_from_slice(&zero_bytes[..offset]);
    }
}

/// Mirrors `bdidecompress`.
fn bdidecompress(input: &[u8], out: &mut [u8], im: bool, bl: usize, dl: usize, en: bool) {
    let offset = if im { 8 / bl } else { 0 };
    let mut zero: u64 = 0;
    if offset > 0 {
        let mut zb = [0u8; 8];
        zb[..offset].copy_from_slice(&input[..offset]);
        zero = u64::from_le_bytes(zb);
    }
    let mut bb = [0u8; 8];
    bb[..bl].copy_from_slice(&input[offset..offset + bl]);
    let base = u64::from_le_bytes(bb);

    let mut j = 0usize;
    let mut i = 0usize;
    while j < BLOCK {
        let mut tb = [0u8; 8];
        tb[..dl].copy_from_slice(&input[i + offset + bl..i + offset + bl + dl]);
        let mut temp = u64::from_le_bytes(tb);
        if !im || ((zero >> (i / dl)) & 1) != 0 {
            temp = temp.wrapping_add(base);
        }
        let temp_le = temp.to_le_bytes();
        for n in 0..bl {
            out[j + n] = if en { temp_le[bl - n - 1] } else { temp_le[n] };
        }
        j += bl;
        i += dl;
    }
}

/// Encodes one 64-byte block. `out` must be at least [`MAX_ENCODED`] bytes.
/// Returns the number of bytes written (opcode byte included).
///
/// Ported line-for-line from `bdiCompressData`. Two probes below are
/// intentionally "wrong" relative to the surrounding pattern — see
/// DESIGN.md Open Questions 1 and 2 — and are preserved exactly because the
/// source's actual encoder-selection behavior, not a hypothetical
/// corrected one, is the measurement target.
pub fn compress(input: &[u8], out: &mut [u8]) -> usize {
    debug_assert_eq!(input.len(), BLOCK);

    let r1_first = input[0];
    let mut r0_all_zero = true;
    let mut r1: u8 = r1_first;
    let mut r2: u16 = (norm(&input[0..2]) & 0xffff) as u16;
    let mut r4: u32 = (norm(&input[0..4]) & 0xffff_ffff) as u32;
    let mut r8: u64 = norm(&input[0..8]);

    let mut b8min = r8;
    let mut tb8min = endian(&input[0..8]);
    let mut b4min = r4;
    let mut tb4min = (endian(&input[0..4]) & 0xffff_ffff) as u32;
    let mut b2min = r2;
    let mut tb2min = (endian(&input[0..2]) & 0xffff) as u16;

    let mut b8d1i: u64 = r8;
    let mut b8d2i: u64 = r8;
    let mut b8d4i: u64 = r8;
    let mut tb8d1i: u64 = tb8min;
    let mut tb8d2i: u64 = tb8min;
    let mut tb8d4i: u64 = tb8min;
    let mut b4d1i: u32 = r4;
    let mut b4d2i: u32 = r4;
    let mut tb4d1i: u32 = tb4min;
    let mut tb4d2i: u32 = tb4min;
    let mut b2d1i: u16 = r2;
    let mut tb2d1i: u16 = tb2min;

    let mut b8d1 = true;
    let mut b8d2 = true;
    let mut b8d4 = true;
    let mut tb8d1 = true;
    let mut tb8d2 = true;
    let mut tb8d4 = true;
    let mut b4d1 = true;
    let mut b4d2 = true;
    let mut tb4d1 = true;
    let mut tb4d2 = true;
    let mut b2d1 = true;
    let mut tb2d1 = true;

    // Pass 1 (bdiCompressData lines 117-169): collect candidate bases and
    // the repeated-pattern reductions R0/R1/R2/R4/R8.
    for i in 0..BLOCK {
        if i % 8 == 0 && i != 0 {
            let temp64 = norm(&input[i..i + 8]);
            let ttemp64 = endian(&input[i..i + 8]);
            if r8 != temp64 {
                r8 = 0;
            }
            if temp64 > 0xff {
                b8d1i = if b8d1i < temp64 && b8d1i > 0xff { b8d1i } else { temp64 };
            }
            if temp64 > 0xffff {
                b8d2i = if b8d2i < temp64 && b8d2i > 0xffff { b8d2i } else { temp64 };
            }
            if temp64 > 0xffff_ffff {
                b8d4i = if b8d4i < temp64 && b8d4i > 0xffff_ffff { b8d4i } else { temp64 };
            }
            if ttemp64 > 0xff {
                tb8d1i = if tb8d1i < ttemp64 && tb8d1i > 0xff { tb8d1i } else { ttemp64 };
            }
            if ttemp64 > 0xffff {
                tb8d2i = if tb8d2i < ttemp64 && tb8d2i > 0xffff { tb8d2i } else { ttemp64 };
            }
            if ttemp64 > 0xffff_ffff {
                tb8d4i = if tb8d4i < ttemp64 && tb8d4i > 0xffff_ffff { tb8d4i } else { ttemp64 };
            }
            b8min = b8min.min(temp64);
            tb8min = tb8min.min(ttemp64);
        }
        if i % 4 == 0 && i != 0 {
            let temp32 = (norm(&input[i..i + 4]) & 0xffff_ffff) as u32;
            let ttemp32 = (endian(&input[i..i + 4]) & 0xffff_ffff) as u32;
            if r4 != temp32 {
                r4 = 0;
            }
            if temp32 > 0xff {
                b4d1i = if b4d1i < temp32 && b4d1i > 0xff { b4d1i } else { temp32 };
            }
            if temp32 > 0xffff {
                b4d2i = if b4d2i < temp32 && b4d2i > 0xffff { b4d2i } else { temp32 };
            }
            if ttemp32 > 0xff {
                tb4d1i = if tb4d1i < ttemp32 && tb4d1i > 0xff { tb4d1i } else { ttemp32 };
            }
            // Open Question 2: guard below reads `temp32` (the norm value)
            // while the body operates on `ttemp32` (the endian value) —
            // reproduced exactly from bdi.h lines 150-151.
            if temp32 > 0xffff {
                tb4d2i = if tb4d2i < ttemp32 && tb4d2i > 0xffff { tb4d2i } else { ttemp32 };
            }
            b4min = b4min.min(temp32);
            tb4min = tb4min.min(ttemp32);
        }
        if i % 2 == 0 && i != 0 {
            let temp16 = (norm(&input[i..i + 2]) & 0xffff) as u16;
            let ttemp16 = (endian(&input[i..i + 2]) & 0xffff) as u16;
            if r2 != temp16 {
                r2 = 0;
            }
            if temp16 > 0xff {
                b2d1i = if b2d1i < temp16 && b2d1i > 0xff { b2d1i } else { temp16 };
            }
            if ttemp16 > 0xff {
                tb2d1i = if tb2d1i < ttemp16 && tb2d1i > 0xff { tb2d1i } else { ttemp16 };
            }
            b2min = b2min.min(temp16);
            tb2min = tb2min.min(ttemp16);
        }
        if r1 != input[i] {
            r1 = 0;
        }
        if input[i] != 0 {
            r0_all_zero = false;
        }
    }

    if r0_all_zero {
        out[0] = 0;
        return 1;
    }
    if r1 != 0 {
        out[0] = 1;
        out[1] = r1;
        return 2;
    }
    if r2 != 0 {
        out[0] = 2;
        out[1..3].copy_from_slice(&r2.to_le_bytes());
        return 3;
    }
    if r4 != 0 {
        out[0] = 3;
        out[1..5].copy_from_slice(&r4.to_le_bytes());
        return 5;
    }
    if r8 != 0 {
        out[0] = 4;
        out[1..9].copy_from_slice(&r8.to_le_bytes());
        return 9;
    }

    // Pass 2 (bdiCompressData lines 199-241): demote every candidate whose
    // deltas don't actually fit in the claimed width.
    for i in 0..BLOCK {
        if i % 8 == 0 {
            let temp64 = norm(&input[i..i + 8]);
            let ttemp64 = endian(&input[i..i + 8]);
            if temp64.wrapping_sub(b8min) > 0xff {
                b8d1 = false;
            }
            if temp64.wrapping_sub(b8min) > 0xffff {
                b8d2 = false;
            }
            if temp64.wrapping_sub(b8min) > 0xffff_ffff {
                b8d4 = false;
            }
            if temp64 > 0xff && temp64.wrapping_sub(b8d1i) > 0xff {
                b8d1i = 0;
            }
            if temp64 > 0xffff && temp64.wrapping_sub(b8d2i) > 0xffff {
                b8d2i = 0;
            }
            if temp64 > 0xffff_ffff && temp64.wrapping_sub(b8d4i) > 0xffff_ffff {
                b8d4i = 0;
            }
            if ttemp64.wrapping_sub(tb8min) > 0xff {
                tb8d1 = false;
            }
            if ttemp64.wrapping_sub(tb8min) > 0xffff {
                tb8d2 = false;
            }
            if ttemp64.wrapping_sub(tb8min) > 0xffff_ffff {
                tb8d4 = false;
            }
            if ttemp64 > 0xff && ttemp64.wrapping_sub(tb8d1i) > 0xff {
                tb8d1i = 0;
            }
            if ttemp64 > 0xffff && ttemp64.wrapping_sub(tb8d2i) > 0xffff {
                tb8d2i = 0;
            }
            if ttemp64 > 0xffff_ffff && ttemp64.wrapping_sub(tb8d4i) > 0xffff_ffff {
                tb8d4i = 0;
            }
        }
        if i % 4 == 0 {
            let temp32 = (norm(&input[i..i + 4]) & 0xffff_ffff) as u32;
            let ttemp32 = (endian(&input[i..i + 4]) & 0xffff_ffff) as u32;
            if temp32.wrapping_sub(b4min) > 0xff {
                b4d1 = false;
            }
            if temp32.wrapping_sub(b4min) > 0xffff {
                b4d2 = false;
            }
            if temp32 > 0xff && temp32.wrapping_sub(b4d1i) > 0xff {
                b4d1i = 0;
            }
            if temp32 > 0xffff && temp32.wrapping_sub(b4d2i) > 0xffff {
                b4d2i = 0;
            }
            if ttemp32.wrapping_sub(tb4min) > 0xff {
                tb4d1 = false;
            }
            if ttemp32.wrapping_sub(tb4min) > 0xffff {
                tb4d2 = false;
            }
            if ttemp32 > 0xff && ttemp32.wrapping_sub(tb4d1i) > 0xff {
                tb4d1i = 0;
            }
            if ttemp32 > 0xffff && ttemp32.wrapping_sub(tb4d2i) > 0xffff {
                tb4d2i = 0;
            }
        }
        if i % 2 == 0 {
            let temp16 = (norm(&input[i..i + 2]) & 0xffff) as u16;
            let ttemp16 = (endian(&input[i..i + 2]) & 0xffff) as u16;
            if temp16.wrapping_sub(b2min) > 0xff {
                b2d1 = false;
            }
            if temp16 > 0xff && temp16.wrapping_sub(b2d1i) > 0xff {
                b2d1i = 0;
            }
            if ttemp16.wrapping_sub(tb2min) > 0xff {
                tb2d1 = false;
            }
            if ttemp16 > 0xff && ttemp16.wrapping_sub(tb2d1i) > 0xff {
                tb2d1i = 0;
            }
        }
    }

    if b8d1 {
        bdicompress(input, &mut out[1..], b8min, false, 8, 1, false);
        out[0] = 5;
        return 17;
    }
    if tb8d1 {
        bdicompress(input, &mut out[1..], tb8min, false, 8, 1, true);
        out[0] = 6;
        return 17;
    }
    if b8d1i != 0 {
        bdicompress(input, &mut out[1..], b8d1i, true, 8, 1, false);
        out[0] = 11;
        return 18;
    }
    if tb8d1i != 0 {
        bdicompress(input, &mut out[1..], tb8d1i, true, 8, 1, true);
        out[0] = 12;
        return 18;
    }
    if b4d1 {
        bdicompress(input, &mut out[1..], b4min as u64, false, 4, 1, false);
        out[0] = 17;
        return 21;
    }
    if tb4d1 {
        bdicompress(input, &mut out[1..], tb4min as u64, false, 4, 1, true);
        out[0] = 18;
        return 21;
    }
    if b4d1i != 0 {
        bdicompress(input, &mut out[1..], b4d1i as u64, true, 4, 1, false);
        out[0] = 21;
        return 23;
    }
    if tb4d1i != 0 {
        bdicompress(input, &mut out[1..], tb4d1i as u64, true, 4, 1, true);
        out[0] = 22;
        return 23;
    }
    if b8d2 {
        bdicompress(input, &mut out[1..], b8min, false, 8, 2, false);
        out[0] = 7;
        return 25;
    }
    if tb8d2 {
        bdicompress(input, &mut out[1..], tb8min, false, 8, 2, true);
        out[0] = 8;
        return 25;
    }
    if b8d2i != 0 {
        bdicompress(input, &mut out[1..], b8d2i, true, 8, 2, false);
        out[0] = 13;
        return 27;
    }
    if tb8d2i != 0 {
        bdicompress(input, &mut out[1..], tb8d2i, true, 8, 2, true);
        out[0] = 14;
        return 27;
    }

    if b2d1 {
        bdicompress(input, &mut out[1..], b2min as u64, false, 2, 1, false);
        out[0] = 25;
        return 35;
    }
    // Open Question 1a: guards `tb8d2` (the 8-byte-base candidate) instead
    // of `tb2d1` (the 2-byte-base candidate) — reproduced from bdi.h line
    // 308, which reuses the wrong flag here.
    if tb8d2 {
        bdicompress(input, &mut out[1..], tb2min as u64, false, 2, 1, true);
        out[0] = 26;
        return 35;
    }
    if b4d2 {
        bdicompress(input, &mut out[1..], b4min as u64, false, 4, 2, false);
        out[0] = 19;
        return 37;
    }
    if tb4d2 {
        bdicompress(input, &mut out[1..], tb4min as u64, false, 4, 2, true);
        out[0] = 20;
        return 37;
    }
    if b4d2i != 0 {
        bdicompress(input, &mut out[1..], b4d2i as u64, true, 4, 2, false);
        out[0] = 23;
        return 39;
    }
    if tb4d2i != 0 {
        bdicompress(input, &mut out[1..], tb4d2i as u64, true, 4, 2, true);
        out[0] = 24;
        return 39;
    }
    if b2d1i != 0 {
        bdicompress(input, &mut out[1..], b2d1i as u64, true, 2, 1, false);
        out[0] = 27;
        return 39;
    }
    // Open Question 1b: guards `tb8d2i` instead of `tb2d1i` — reproduced
    // from bdi.h line 338, the same copy-paste as Open Question 1a.
    if tb8d2i != 0 {
        bdicompress(input, &mut out[1..], tb2d1i as u64, true, 2, 1, true);
        out[0] = 28;
        return 39;
    }
    if b8d4 {
        bdicompress(input, &mut out[1..], b8min, false, 8, 4, false);
        out[0] = 9;
        return 41;
    }
    if tb8d4 {
        bdicompress(input, &mut out[1..], tb8min, false, 8, 4, true);
        out[0] = 10;
        return 41;
    }
    if b8d4i != 0 {
        bdicompress(input, &mut out[1..], b8d4i, true, 8, 4, false);
        out[0] = 15;
        return 42;
    }
    if tb8d4i != 0 {
        bdicompress(input, &mut out[1..], tb8d4i, true, 8, 4, true);
        out[0] = 16;
        return 42;
    }

    out[0] = 0xff;
    out[1..65].copy_from_slice(input);
    65
}

/// Decodes one block into exactly 64 bytes. Returns the opcode that was
/// consumed (0xff for the raw fallback), matching `bdiDecompressData`.
pub fn decompress(input: &[u8], out: &mut [u8]) -> u8 {
    debug_assert_eq!(out.len(), BLOCK);
    let opcode = input[0];
    match opcode {
        0 => {
            out.fill(0);
            return 0;
        }
        1 => {
            out.fill(input[1]);
            return 1;
        }
        2 => {
            for i in 0..32 {
                out[2 * i..2 * i + 2].copy_from_slice(&input[1..3]);
            }
            return 2;
        }
        3 => {
            for i in 0..16 {
                out[4 * i..4 * i + 4].copy_from_slice(&input[1..5]);
            }
            return 3;
        }
        4 => {
            for i in 0..8 {
                out[8 * i..8 * i + 8].copy_from_slice(&input[1..9]);
            }
            return 4;
        }
        5 => bdidecompress(&input[1..], out, false, 8, 1, false),
        6 => bdidecompress(&input[1..], out, false, 8, 1, true),
        7 => bdidecompress(&input[1..], out, false, 8, 2, false),
        8 => bdidecompress(&input[1..], out, false, 8, 2, true),
        9 => bdidecompress(&input[1..], out, false, 8, 4, false),
        10 => bdidecompress(&input[1..], out, false, 8, 4, true),
        11 => bdidecompress(&input[1..], out, true, 8, 1, false),
        12 => bdidecompress(&input[1..], out, true, 8, 1, true),
        13 => bdidecompress(&input[1..], out, true, 8, 2, false),
        14 => bdidecompress(&input[1..], out, true, 8, 2, true),
        15 => bdidecompress(&input[1..], out, true, 8, 4, false),
        16 => bdidecompress(&input[1..], out, true, 8, 4, true),
        17 => bdidecompress(&input[1..], out, false, 4, 1, false),
        18 => bdidecompress(&input[1..], out, false, 4, 1, true),
        19 => bdidecompress(&input[1..], out, false, 4, 2, false),
        20 => bdidecompress(&input[1..], out, false, 4, 2, true),
        21 => bdidecompress(&input[1..], out, true, 4, 1, false),
        22 => bdidecompress(&input[1..], out, true, 4, 1, true),
        23 => bdidecompress(&input[1..], out, true, 4, 2, false),
        24 => bdidecompress(&input[1..], out, true, 4, 2, true),
        25 => bdidecompress(&input[1..], out, false, 2, 1, false),
        26 => bdidecompress(&input[1..], out, false, 2, 1, true),
        27 => bdidecompress(&input[1..], out, true, 2, 1, false),
        28 => bdidecompress(&input[1..], out, true, 2, 1, true),
        _ => {
            out.copy_from_slice(&input[1..65]);
            return 0xff;
        }
    }
    opcode
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(input: &[u8]) {
        let mut encoded = [0u8; MAX_ENCODED];
        let n = compress(input, &mut encoded);
        let mut decoded = [0u8; BLOCK];
        decompress(&encoded[..n.max(65)], &mut decoded);
        assert_eq!(&decoded[..], input, "round trip mismatch (encoded {} bytes)", n);
    }

    #[test]
    fn all_zero_block() {
        let input = [0u8; BLOCK];
        let mut encoded = [0u8; MAX_ENCODED];
        let n = compress(&input, &mut encoded);
        assert_eq!(n, 1);
        assert_eq!(encoded[0], 0);
        round_trip(&input);
    }

    #[test]
    fn repeated_nonzero_byte() {
        let input = [0xABu8; BLOCK];
        let mut encoded = [0u8; MAX_ENCODED];
        let n = compress(&input, &mut encoded);
        assert_eq!(n, 2);
        assert_eq!(encoded[0], 1);
        round_trip(&input);
    }

    #[test]
    fn repeated_two_byte_pattern() {
        let mut input = [0u8; BLOCK];
        for chunk in input.chunks_mut(2) {
            chunk.copy_from_slice(&[0x11, 0x22]);
        }
        round_trip(&input);
    }

    #[test]
    fn ascending_bytes_fallback_or_delta() {
        let mut input = [0u8; BLOCK];
        for (i, b) in input.iter_mut().enumerate() {
            *b = i as u8;
        }
        round_trip(&input);
    }

    #[test]
    fn small_deltas_from_base() {
        let mut input = [0u8; BLOCK];
        for i in 0..8 {
            let v: u64 = 1_000_000 + i as u64;
            input[i * 8..i * 8 + 8].copy_from_slice(&v.to_le_bytes());
        }
        round_trip(&input);
    }

    #[test]
    fn pathological_mixed_magnitudes() {
        let mut input = [0u8; BLOCK];
        for i in 0..16 {
            let v: u32 = if i % 3 == 0 { 0xFFFF_FFFF - i as u32 } else { i as u32 * 7 };
            input[i * 4..i * 4 + 4].copy_from_slice(&v.to_le_bytes());
        }
        round_trip(&input);
    }

    #[test]
    fn single_nonzero_byte_at_each_position() {
        for pos in 0..BLOCK {
            let mut input = [0u8; BLOCK];
            input[pos] = 0x7F;
            round_trip(&input);
        }
    }
}
