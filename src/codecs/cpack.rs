//! CPACK dictionary coder for 64-byte blocks, scanned as sixteen 4-byte
//! words. Bit order is **LSB-first** within each byte, distinct from every
//! other codec in this crate — ported from `cpack.h` (itself transplanted
//! from github.com/benschreiber/cpack, MIT licensed). Tokens are emitted as
//! the same variable-length prefix codes as the source (`zzzz`/`xxxx`/
//! `mmmm`/`mmmx`/`mmxx`/`zzzx`), decoded two bits at a time instead of the
//! source's bit-at-a-time branching — an equivalent decomposition of the
//! same prefix-free code.

use crate::bitstream::{LsbBitReader, LsbBitWriter};

const BLOCK: usize = 64;
const WORDS: usize = 16;
/// Worst case: 16 literal words, each 2-bit prefix + 4 bytes.
pub const MAX_ENCODED: usize = 68;

/// Encodes one 64-byte block. `out` must be at least [`MAX_ENCODED`] bytes.
/// Returns the number of bits written.
pub fn compress(input: &[u8], out: &mut [u8]) -> usize {
    debug_assert_eq!(input.len(), BLOCK);
    for b in out.iter_mut() {
        *b = 0;
    }
    let mut w = LsbBitWriter::new(out);
    let mut dict: Vec<[u8; 4]> = Vec::with_capacity(WORDS);

    for i in 0..WORDS {
        let word = [input[4 * i], input[4 * i + 1], input[4 * i + 2], input[4 * i + 3]];
        let (a, b, c, d) = (word[0], word[1], word[2], word[3]);

        if a == 0 && b == 0 && c == 0 {
            if d == 0 {
                w.write_bits(0, 2); // zzzz
            } else {
                w.write_bits(3, 2);
                w.write_bits(1, 2); // zzzx
                w.write_byte(d);
            }
            continue;
        }

        let mut found = false;
        for (j, entry) in dict.iter().enumerate() {
            if a == entry[0] && b == entry[1] {
                if c == entry[2] {
                    if d == entry[3] {
                        w.write_bits(2, 2); // mmmm
                        w.write_bits(j as u32, 4);
                    } else {
                        w.write_bits(3, 2);
                        w.write_bits(2, 2); // mmmx
                        w.write_bits(j as u32, 4);
                        w.write_byte(d);
                    }
                } else {
                    w.write_bits(3, 2);
                    w.write_bits(0, 2); // mmxx
                    w.write_bits(j as u32, 4);
                    w.write_byte(c);
                    w.write_byte(d);
                }
                found = true;
                break;
            }
        }
        if found {
            continue;
        }

        w.write_bits(1, 2); // xxxx
        w.write_byte(a);
        w.write_byte(b);
        w.write_byte(c);
        w.write_byte(d);
        dict.push(word);
    }

    w.bit_index()
}

/// Decodes a 64-byte block from a cpack bitstream. `input` must hold at
/// least [`MAX_ENCODED`] bytes (trailing bytes may be garbage/zero).
pub fn decompress(input: &[u8], out: &mut [u8; BLOCK]) {
    let mut r = LsbBitReader::new(input);
    let mut dict: Vec<[u8; 4]> = Vec::with_capacity(WORDS);
    let mut idx = 0usize;

    while idx < BLOCK {
        match r.read_bits(2) {
            0 => {
                out[idx..idx + 4].copy_from_slice(&[0, 0, 0, 0]);
            }
            1 => {
                let word = [r.read_byte(), r.read_byte(), r.read_byte(), r.read_byte()];
                out[idx..idx + 4].copy_from_slice(&word);
                dict.push(word);
            }
            2 => {
                let j = r.read_bits(4) as usize;
                out[idx..idx + 4].copy_from_slice(&dict[j]);
            }
            _ => match r.read_bits(2) {
                0 => {
                    let j = r.read_bits(4) as usize;
                    let c = r.read_byte();
                    let d = r.read_byte();
                    out[idx] = dict[j][0];
                    out[idx + 1] = dict[j][1];
                    out[idx + 2] = c;
                    out[idx + 3] = d;
                }
                1 => {
                    let d = r.read_byte();
                    out[idx..idx + 4].copy_from_slice(&[0, 0, 0, d]);
                }
                _ => {
                    let j = r.read_bits(4) as usize;
                    let d = r.read_byte();
                    out[idx] = dict[j][0];
                    out[idx + 1] = dict[j][1];
                    out[idx + 2] = dict[j][2];
                    out[idx + 3] = d;
                }
            },
        }
        idx += 4;
    }
}

/// Final dictionary size after encoding `input`, for the dictionary-law
/// property test (§8): equals the number of `xxxx` tokens emitted.
#[cfg(test)]
fn dict_size(input: &[u8]) -> usize {
    let mut dict: Vec<[u8; 4]> = Vec::new();
    for i in 0..WORDS {
        let word = [input[4 * i], input[4 * i + 1], input[4 * i + 2], input[4 * i + 3]];
        if word == [0, 0, 0, 0] {
            continue;
        }
        if !dict.contains(&word) {
            dict.push(word);
        }
    }
    dict.len()
}
