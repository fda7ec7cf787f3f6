#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Conv2dError {
    #[error("test index {index} out of range (0..{count})")]
    TestIndexOutOfRange { index: usize, count: usize },
    #[error("tensor {h}x{w} is smaller than the 3x3 kernel")]
    DimensionUnderflow { h: usize, w: usize },
    #[error("tensor {h}x{w} does not fit the 8-bit dimension register")]
    DimensionOverflow { h: usize, w: usize },
    #[error("{region} window needs {words} words but the region holds {capacity}")]
    RegionOverflow {
        region: &'static str,
        words: usize,
        capacity: usize,
    },
    #[error("reference window has {actual} samples, expected {expected}")]
    ReferenceLength { expected: usize, actual: usize },
    #[error("device still busy after {polls} status polls")]
    DeviceUnresponsive { polls: usize },
}
