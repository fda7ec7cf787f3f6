//! Named test cases selectable at run time.

use alloc::vec::Vec;

use crate::{
    err::Conv2dError,
    pattern::Pattern,
    task::{Dims, Kernel},
};

#[derive(Debug, Clone, Copy)]
pub struct TestCase {
    pub name: &'static str,
    pub dims: Dims,
    pub pattern: Pattern,
    pub kernel: Kernel,
}

impl TestCase {
    pub fn new(
        name: &'static str,
        h: usize,
        w: usize,
        pattern: Pattern,
        kernel: Kernel,
    ) -> Result<Self, Conv2dError> {
        Ok(Self {
            name,
            dims: Dims::new(h, w)?,
            pattern,
            kernel,
        })
    }
}

/// Ordered list of test cases handed to the runner.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    cases: Vec<TestCase>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The four bring-up cases, all on a 28x28 tensor.
    pub fn builtin() -> Self {
        const DIMS: Dims = match Dims::new(28, 28) {
            Ok(dims) => dims,
            Err(_) => panic!("28x28 is a valid tensor"),
        };
        let dims = DIMS;
        let case = |name, pattern, kernel| TestCase {
            name,
            dims,
            pattern,
            kernel,
        };

        Self {
            cases: alloc::vec![
                case(
                    "All +1 input, all +1 kernel",
                    Pattern::ConstantOne,
                    Kernel::ALL_ONES,
                ),
                case(
                    "Ramp-X input, center kernel",
                    Pattern::RampX,
                    Kernel::IDENTITY,
                ),
                case(
                    "Checkerboard input, all +1 kernel",
                    Pattern::Checkerboard,
                    Kernel::ALL_ONES,
                ),
                case(
                    "Checkerboard input, vertical edge kernel",
                    Pattern::Checkerboard,
                    Kernel::VERTICAL_EDGE,
                ),
            ],
        }
    }

    pub fn push(&mut self, case: TestCase) {
        self.cases.push(case);
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&TestCase, Conv2dError> {
        self.cases
            .get(index)
            .ok_or(Conv2dError::TestIndexOutOfRange {
                index,
                count: self.cases.len(),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &TestCase> {
        self.cases.iter()
    }
}

impl FromIterator<TestCase> for Registry {
    fn from_iter<I: IntoIterator<Item = TestCase>>(iter: I) -> Self {
        Self {
            cases: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_cases_keep_their_order() {
        let reg = Registry::builtin();
        let names: Vec<_> = reg.iter().map(|c| c.name).collect();
        assert_eq!(
            names,
            [
                "All +1 input, all +1 kernel",
                "Ramp-X input, center kernel",
                "Checkerboard input, all +1 kernel",
                "Checkerboard input, vertical edge kernel",
            ]
        );
        assert!(reg.iter().all(|c| c.dims == Dims::new(28, 28).unwrap()));
        assert_eq!(reg.get(3).unwrap().kernel, Kernel::VERTICAL_EDGE);
    }

    #[test]
    fn out_of_range_index_is_a_configuration_error() {
        let reg = Registry::builtin();
        assert_eq!(
            reg.get(4).unwrap_err(),
            Conv2dError::TestIndexOutOfRange { index: 4, count: 4 }
        );
        assert!(Registry::new().get(0).is_err());
    }

    #[test]
    fn cases_validate_their_dimensions() {
        assert_eq!(
            TestCase::new("tiny", 2, 2, Pattern::ConstantOne, Kernel::ALL_ONES).unwrap_err(),
            Conv2dError::DimensionUnderflow { h: 2, w: 2 }
        );
        let case = TestCase::new("ok", 5, 5, Pattern::RampX, Kernel::IDENTITY).unwrap();
        let reg: Registry = [case].into_iter().collect();
        assert_eq!(reg.len(), 1);
    }
}
