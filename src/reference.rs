//! Software reference convolution.
//!
//! Accumulates in `i32` and keeps the low 8 bits of the sum, reinterpreted as
//! signed. The accelerator is assumed to truncate the same way; it does not
//! clamp to the `i8` range.

use alloc::vec::Vec;

use crate::{
    pattern::Pattern,
    task::{Dims, K_SIZE, Kernel},
};

/// Row-major (H-2)x(W-2) result of one convolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputWindow {
    dims: Dims,
    data: Vec<i8>,
}

impl OutputWindow {
    pub fn dims(&self) -> Dims {
        self.dims
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, y: usize, x: usize) -> i8 {
        self.data[y * self.dims.out_w() as usize + x]
    }

    pub fn row(&self, y: usize) -> &[i8] {
        let w = self.dims.out_w() as usize;
        &self.data[y * w..(y + 1) * w]
    }

    pub fn as_slice(&self) -> &[i8] {
        &self.data
    }
}

/// Low byte of the accumulator, reinterpreted as `i8`.
#[inline]
pub const fn truncate(acc: i32) -> i8 {
    acc as i8
}

/// One output sample at `(y, x)`, before truncation.
pub fn accumulate(pattern: &Pattern, kernel: &Kernel, y: u8, x: u8) -> i32 {
    let mut acc: i32 = 0;
    for ky in 0..K_SIZE {
        for kx in 0..K_SIZE {
            let a = pattern.eval(y + ky as u8, x + kx as u8) as i32;
            let w = kernel.tap(ky, kx) as i32;
            acc += a * w;
        }
    }
    acc
}

/// Expected accelerator output for `pattern` convolved with `kernel`.
pub fn compute(dims: Dims, pattern: &Pattern, kernel: &Kernel) -> OutputWindow {
    let mut data = Vec::with_capacity(dims.output_len());
    for y in 0..dims.out_h() {
        for x in 0..dims.out_w() {
            data.push(truncate(accumulate(pattern, kernel, y, x)));
        }
    }
    OutputWindow { dims, data }
}
