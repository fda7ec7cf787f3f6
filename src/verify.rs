//! Element-by-element comparison of accelerator output against the reference.

use alloc::vec::Vec;
use core::fmt;

use crate::{err::Conv2dError, task::Dims};

/// Mismatches kept in detail by default.
pub const MAX_REPORTED_MISMATCHES: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch {
    /// Flat row-major output index.
    pub index: usize,
    pub hw: i8,
    pub sw: i8,
}

impl Mismatch {
    pub fn row(&self, dims: Dims) -> usize {
        self.index / dims.out_w() as usize
    }

    pub fn col(&self, dims: Dims) -> usize {
        self.index % dims.out_w() as usize
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MISMATCH idx={}: HW={}, SW={}", self.index, self.hw, self.sw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyReport {
    /// Output elements compared.
    pub total: usize,
    pub matched: usize,
    /// Every mismatch, including those not kept in `mismatches`.
    pub mismatched: usize,
    /// The first mismatches in index order, bounded by the capacity passed to
    /// [`compare_bounded`].
    pub mismatches: Vec<Mismatch>,
}

impl VerifyReport {
    pub fn passed(&self) -> bool {
        self.mismatched == 0
    }

    /// Mismatches counted but not kept in detail.
    pub fn truncated(&self) -> usize {
        self.mismatched - self.mismatches.len()
    }
}

impl fmt::Display for VerifyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.passed() {
            write!(f, "SUCCESS (all {} outputs match)", self.total)
        } else {
            write!(
                f,
                "FAIL ({} mismatches out of {})",
                self.mismatched, self.total
            )
        }
    }
}

/// Compares with the default detail capacity of 16.
pub fn compare<F>(dims: Dims, hw: F, reference: &[i8]) -> Result<VerifyReport, Conv2dError>
where
    F: FnMut(usize) -> i8,
{
    compare_bounded(dims, hw, reference, MAX_REPORTED_MISMATCHES)
}

/// Reads every output element through `hw` in row-major order and compares it
/// with `reference`.
pub fn compare_bounded<F>(
    dims: Dims,
    mut hw: F,
    reference: &[i8],
    capacity: usize,
) -> Result<VerifyReport, Conv2dError>
where
    F: FnMut(usize) -> i8,
{
    let total = dims.output_len();
    if reference.len() != total {
        return Err(Conv2dError::ReferenceLength {
            expected: total,
            actual: reference.len(),
        });
    }

    let mut mismatched = 0;
    let mut mismatches = Vec::with_capacity(capacity.min(total));
    for (index, &sw) in reference.iter().enumerate() {
        let got = hw(index);
        if got != sw {
            if mismatches.len() < capacity {
                mismatches.push(Mismatch { index, hw: got, sw });
            }
            mismatched += 1;
        }
    }

    Ok(VerifyReport {
        total,
        matched: total - mismatched,
        mismatched,
        mismatches,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{pattern::Pattern, reference, task::Kernel};

    #[test]
    fn three_altered_elements_are_all_reported() {
        let dims = Dims::new(28, 28).unwrap();
        let sw = reference::compute(dims, &Pattern::Checkerboard, &Kernel::VERTICAL_EDGE);
        let altered = [3usize, 100, 675];

        let report = compare(
            dims,
            |idx| {
                let v = sw.as_slice()[idx];
                if altered.contains(&idx) { v.wrapping_add(1) } else { v }
            },
            sw.as_slice(),
        )
        .unwrap();

        assert!(!report.passed());
        assert_eq!(report.total, 676);
        assert_eq!(report.mismatched, 3);
        assert_eq!(report.matched, 673);
        assert_eq!(report.truncated(), 0);
        let indices: Vec<_> = report.mismatches.iter().map(|m| m.index).collect();
        assert_eq!(indices, altered);
        for m in &report.mismatches {
            assert_eq!(m.sw, sw.as_slice()[m.index]);
            assert_eq!(m.hw, m.sw.wrapping_add(1));
        }
        assert_eq!(report.mismatches[2].row(dims), 25);
        assert_eq!(report.mismatches[2].col(dims), 25);
    }

    #[test]
    fn detail_is_bounded_but_count_is_not() {
        let dims = Dims::new(10, 10).unwrap();
        let sw = [0i8; 64];
        let report = compare(dims, |_| 1, &sw).unwrap();
        assert_eq!(report.mismatched, 64);
        assert_eq!(report.mismatches.len(), MAX_REPORTED_MISMATCHES);
        assert_eq!(report.truncated(), 48);
        assert_eq!(report.mismatches.last().map(|m| m.index), Some(15));
        assert_eq!(report.to_string(), "FAIL (64 mismatches out of 64)");
    }

    #[test]
    fn matching_output_passes() {
        let dims = Dims::new(4, 6).unwrap();
        let sw = [5i8, -3, 7, 0, 1, 2, 3, 4];
        let report = compare(dims, |idx| sw[idx], &sw).unwrap();
        assert!(report.passed());
        assert!(report.mismatches.is_empty());
        assert_eq!(report.to_string(), "SUCCESS (all 8 outputs match)");
    }

    #[test]
    fn reference_length_must_match_dimensions() {
        let dims = Dims::new(4, 4).unwrap();
        let err = compare(dims, |_| 0, &[0i8; 5]).unwrap_err();
        assert_eq!(
            err,
            Conv2dError::ReferenceLength {
                expected: 4,
                actual: 5
            }
        );
    }

    #[test]
    fn reads_every_index_once_in_order() {
        let dims = Dims::new(5, 6).unwrap();
        let sw = [0i8; 12];
        let mut seen = Vec::new();
        compare(
            dims,
            |idx| {
                seen.push(idx);
                0
            },
            &sw,
        )
        .unwrap();
        assert_eq!(seen, (0..12).collect::<Vec<_>>());
    }
}
