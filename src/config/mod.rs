//! Accelerator configuration: where the register file and data windows live,
//! how large each window is, and how the driver paces the start handshake.

use crate::registers::consts::*;

/// Returns the number of 32-bit words spanned by `bytes` bytes of address space.
pub const fn words_in(bytes: usize) -> usize {
    bytes / WORD_BYTES
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccelConfig {
    /// Base of the control block (CTRL/STATUS/DIM live at fixed offsets).
    pub ctrl_base: usize,
    /// Base of the input tensor window (A).
    pub input_base: usize,
    /// Base of the kernel window (B).
    pub kernel_base: usize,
    /// Base of the output window (R).
    pub output_base: usize,
    pub input_words: usize,
    pub kernel_words: usize,
    pub output_words: usize,
    /// Operation code placed in CTRL bits 1.. when starting a run.
    pub opcode: u32,
    /// Spin iterations between writing DIM and strobing start.
    pub settle_iterations: u32,
    /// Maximum busy polls before giving up. `None` waits forever. The status
    /// register is always read at least once, so `Some(0)` acts like `Some(1)`.
    pub poll_limit: Option<usize>,
    /// Mismatches recorded in detail per run; the count itself is never capped.
    pub max_reported_mismatches: usize,
    /// Input words logged after loading the tensor.
    pub dump_input_words: usize,
    /// Output rows logged (HW and SW side by side) after a run.
    pub dump_result_rows: usize,
}

impl AccelConfig {
    /// Register map of the NEORV32 SoC the accelerator is attached to.
    pub const fn neorv32() -> Self {
        Self {
            ctrl_base: CTRL_BLOCK_BASE,
            input_base: INPUT_BASE,
            kernel_base: KERNEL_BASE,
            output_base: OUTPUT_BASE,
            input_words: words_in(KERNEL_BASE - INPUT_BASE),
            kernel_words: KERNEL_WORDS,
            output_words: words_in(OUTPUT_WINDOW_BYTES),
            opcode: OP_CONV2D,
            settle_iterations: 1000,
            poll_limit: None,
            max_reported_mismatches: 16,
            dump_input_words: 4,
            dump_result_rows: 5,
        }
    }

    /// Same map, but polling gives up after `polls` busy reads. A limit of
    /// zero is raised to one.
    pub fn with_poll_limit(mut self, polls: usize) -> Self {
        self.poll_limit = Some(polls.max(1));
        self
    }
}

impl Default for AccelConfig {
    fn default() -> Self {
        Self::neorv32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bring_up_map() {
        let cfg = AccelConfig::default();
        assert_eq!(cfg.input_words, 1024);
        assert_eq!(cfg.kernel_words, 3);
        assert_eq!(cfg.poll_limit, None);
    }

    #[test]
    fn zero_poll_limit_is_raised_to_one() {
        assert_eq!(AccelConfig::neorv32().with_poll_limit(0).poll_limit, Some(1));
        assert_eq!(AccelConfig::neorv32().with_poll_limit(7).poll_limit, Some(7));
    }
}
