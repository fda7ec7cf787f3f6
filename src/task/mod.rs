//! Geometry and weights of a single convolution task.

use core::fmt;

use crate::{
    codec::{pack, unpack, word_count},
    err::Conv2dError,
    registers::consts::KERNEL_WORDS,
};

/// Side of the square kernel.
pub const K_SIZE: usize = 3;

/// Validated input tensor dimensions.
///
/// Both sides are at least [`K_SIZE`] so the output window never underflows,
/// and at most 255 so they fit the 8-bit fields of the dimension register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dims {
    h: u8,
    w: u8,
}

impl Dims {
    pub const fn new(h: usize, w: usize) -> Result<Self, Conv2dError> {
        if h < K_SIZE || w < K_SIZE {
            return Err(Conv2dError::DimensionUnderflow { h, w });
        }
        if h > u8::MAX as usize || w > u8::MAX as usize {
            return Err(Conv2dError::DimensionOverflow { h, w });
        }
        Ok(Self {
            h: h as u8,
            w: w as u8,
        })
    }

    pub const fn h(&self) -> u8 {
        self.h
    }

    pub const fn w(&self) -> u8 {
        self.w
    }

    pub const fn out_h(&self) -> u8 {
        self.h - (K_SIZE as u8 - 1)
    }

    pub const fn out_w(&self) -> u8 {
        self.w - (K_SIZE as u8 - 1)
    }

    /// Samples in the input window.
    pub const fn input_len(&self) -> usize {
        self.h as usize * self.w as usize
    }

    /// Samples in the output window.
    pub const fn output_len(&self) -> usize {
        self.out_h() as usize * self.out_w() as usize
    }

    pub const fn input_words(&self) -> usize {
        word_count(self.input_len())
    }

    pub const fn output_words(&self) -> usize {
        word_count(self.output_len())
    }

    /// `(row, col)` of flat input index `idx`.
    #[inline]
    pub const fn input_coord(&self, idx: usize) -> (u8, u8) {
        let w = self.w as usize;
        ((idx / w) as u8, (idx % w) as u8)
    }
}

impl fmt::Display for Dims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H={}, W={}", self.h, self.w)
    }
}

/// 3x3 convolution weights, `k[ky][kx]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Kernel(pub [[i8; K_SIZE]; K_SIZE]);

impl Kernel {
    /// Center tap only; the output reproduces the input shifted by one.
    pub const IDENTITY: Kernel = Kernel([[0, 0, 0], [0, 1, 0], [0, 0, 0]]);
    pub const ALL_ONES: Kernel = Kernel([[1, 1, 1], [1, 1, 1], [1, 1, 1]]);
    pub const VERTICAL_EDGE: Kernel = Kernel([[1, 0, -1], [1, 0, -1], [1, 0, -1]]);

    #[inline]
    pub const fn tap(&self, ky: usize, kx: usize) -> i8 {
        self.0[ky][kx]
    }

    /// Row-major weights.
    pub fn flatten(&self) -> [i8; K_SIZE * K_SIZE] {
        let mut flat = [0i8; K_SIZE * K_SIZE];
        for (idx, w) in self.0.iter().flatten().enumerate() {
            flat[idx] = *w;
        }
        flat
    }

    /// Kernel window layout: elements 0..3, 4..7, then element 8 alone in
    /// byte 0 of the last word with the padding bytes zeroed.
    pub fn packed(&self) -> [u32; KERNEL_WORDS] {
        let f = self.flatten();
        [
            pack(f[0], f[1], f[2], f[3]),
            pack(f[4], f[5], f[6], f[7]),
            pack(f[8], 0, 0, 0),
        ]
    }

    /// Rebuilds a kernel from its window words; padding bytes are ignored.
    pub fn from_packed(words: [u32; KERNEL_WORDS]) -> Self {
        let mut k = [[0i8; K_SIZE]; K_SIZE];
        for idx in 0..K_SIZE * K_SIZE {
            k[idx / K_SIZE][idx % K_SIZE] = unpack(words[idx / 4], idx % 4);
        }
        Kernel(k)
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (y, row) in self.0.iter().enumerate() {
            if y > 0 {
                f.write_str(" ")?;
            }
            write!(f, "[{} {} {}]", row[0], row[1], row[2])?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dims_reject_windows_smaller_than_the_kernel() {
        assert_eq!(
            Dims::new(2, 28),
            Err(Conv2dError::DimensionUnderflow { h: 2, w: 28 })
        );
        assert_eq!(
            Dims::new(28, 0),
            Err(Conv2dError::DimensionUnderflow { h: 28, w: 0 })
        );
        assert_eq!(
            Dims::new(256, 4),
            Err(Conv2dError::DimensionOverflow { h: 256, w: 4 })
        );
    }

    #[test]
    fn dims_derive_window_sizes() {
        let d = Dims::new(28, 28).unwrap();
        assert_eq!((d.out_h(), d.out_w()), (26, 26));
        assert_eq!(d.input_len(), 784);
        assert_eq!(d.input_words(), 196);
        assert_eq!(d.output_len(), 676);
        assert_eq!(d.output_words(), 169);

        let small = Dims::new(3, 3).unwrap();
        assert_eq!(small.output_len(), 1);
        assert_eq!(small.output_words(), 1);

        let odd = Dims::new(5, 7).unwrap();
        assert_eq!(odd.input_coord(0), (0, 0));
        assert_eq!(odd.input_coord(6), (0, 6));
        assert_eq!(odd.input_coord(7), (1, 0));
        assert_eq!(odd.input_coord(34), (4, 6));
    }

    #[test]
    fn kernel_packs_into_three_words() {
        let k = Kernel([[1, 2, 3], [4, 5, 6], [7, 8, -9]]);
        let words = k.packed();
        assert_eq!(words[0], pack(1, 2, 3, 4));
        assert_eq!(words[1], pack(5, 6, 7, 8));
        assert_eq!(words[2], 0x0000_00F7);
        assert_eq!(Kernel::from_packed(words), k);
    }

    #[test]
    fn kernel_readback_ignores_padding_bytes() {
        let mut words = Kernel::VERTICAL_EDGE.packed();
        words[2] |= 0xABCD_EF00;
        assert_eq!(Kernel::from_packed(words), Kernel::VERTICAL_EDGE);
    }
}
