//! Byte packing shared by every window of the accelerator.
//!
//! Four signed samples share one 32-bit word, least-significant byte first.

use alloc::vec::Vec;

/// Samples carried by one packed word.
pub const LANES: usize = 4;

/// Packs four samples into a word; byte `i` holds `bi` reinterpreted as `u8`.
#[inline]
pub const fn pack(b0: i8, b1: i8, b2: i8, b3: i8) -> u32 {
    (b0 as u8 as u32)
        | ((b1 as u8 as u32) << 8)
        | ((b2 as u8 as u32) << 16)
        | ((b3 as u8 as u32) << 24)
}

/// Extracts byte `lane` of `word`, sign-extended.
///
/// # Panics
///
/// Panics if `lane >= 4`.
#[inline]
pub const fn unpack(word: u32, lane: usize) -> i8 {
    assert!(lane < LANES, "lane out of range");
    (word >> (lane * 8)) as u8 as i8
}

/// Words needed to hold `samples` packed samples.
#[inline]
pub const fn word_count(samples: usize) -> usize {
    samples.div_ceil(LANES)
}

/// Packs a flat sample slice, zero-filling the tail of the last word.
pub fn pack_samples(samples: &[i8]) -> Vec<u32> {
    samples
        .chunks(LANES)
        .map(|chunk| {
            let mut lanes = [0i8; LANES];
            lanes[..chunk.len()].copy_from_slice(chunk);
            pack(lanes[0], lanes[1], lanes[2], lanes[3])
        })
        .collect()
}

/// Unpacks the first `len` samples of a packed slice.
pub fn unpack_samples(words: &[u32], len: usize) -> Vec<i8> {
    (0..len)
        .map(|idx| unpack(words[idx / LANES], idx % LANES))
        .collect()
}

/// All four lanes of a word, lane 0 first.
#[inline]
pub const fn lanes(word: u32) -> [i8; LANES] {
    [
        unpack(word, 0),
        unpack(word, 1),
        unpack(word, 2),
        unpack(word, 3),
    ]
}
