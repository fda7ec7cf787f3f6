//! Raw addresses and constants of the convolution accelerator.

/// Base of the control block holding CTRL, STATUS and DIM.
pub const CTRL_BLOCK_BASE: usize = 0x9000_0000;
/// Offset of the control register.
pub const OFFSET_CTRL: usize = 0x0008;
/// Offset of the status register.
pub const OFFSET_STATUS: usize = 0x000C;
/// Offset of the dimension register.
pub const OFFSET_DIM: usize = 0x0010;

/// Input tensor window (A).
pub const INPUT_BASE: usize = 0x9000_1000;
/// Kernel window (B).
pub const KERNEL_BASE: usize = 0x9000_2000;
/// Output window (R).
pub const OUTPUT_BASE: usize = 0x9000_4000;
/// Bytes of the output window mapped by the SoC.
pub const OUTPUT_WINDOW_BYTES: usize = 0x1000;

/// Operation code of the 2D convolution.
pub const OP_CONV2D: u32 = 0x09;

/// Bytes per register word.
pub const WORD_BYTES: usize = 4;
/// Words used by a packed 3x3 kernel.
pub const KERNEL_WORDS: usize = 3;
