//! Platform seams used by the driver.
//!
//! [`Conv2dPort`] is the only way the driver touches the accelerator, so the
//! same driver code runs against [`crate::MmioPort`] on the target and against
//! [`crate::SimAccelerator`] on the host. [`Osal`] covers the remaining
//! platform-dependent behavior: delays and the body of the busy-wait loop.

use core::fmt;

/// Data windows of the accelerator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// Input tensor (A).
    Input,
    /// 3x3 kernel (B).
    Kernel,
    /// Convolution result (R), read-only for software.
    Output,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Region {
    pub const fn name(self) -> &'static str {
        match self {
            Region::Input => "input",
            Region::Kernel => "kernel",
            Region::Output => "output",
        }
    }
}

/// Writable control registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlReg {
    Ctrl,
    Dim,
}

/// Word-level access to one accelerator instance.
///
/// Implementations assume `index` is inside the region; the driver checks
/// bounds against [`crate::AccelConfig`] before calling.
pub trait Conv2dPort {
    fn write_word(&mut self, region: Region, index: usize, value: u32);

    fn read_word(&mut self, region: Region, index: usize) -> u32;

    fn write_control(&mut self, reg: ControlReg, value: u32);

    /// Raw STATUS register value.
    fn read_status(&mut self) -> u32;
}

impl<P: Conv2dPort + ?Sized> Conv2dPort for &mut P {
    fn write_word(&mut self, region: Region, index: usize, value: u32) {
        (**self).write_word(region, index, value)
    }

    fn read_word(&mut self, region: Region, index: usize) -> u32 {
        (**self).read_word(region, index)
    }

    fn write_control(&mut self, reg: ControlReg, value: u32) {
        (**self).write_control(reg, value)
    }

    fn read_status(&mut self) -> u32 {
        (**self).read_status()
    }
}

/// OSAL trait for platform-specific timing.
pub trait Osal {
    /// Burn roughly `iterations` loop iterations before touching the device.
    fn settle(&self, iterations: u32) {
        for _ in 0..iterations {
            core::hint::spin_loop();
        }
    }

    /// Called once per busy poll.
    fn relax(&self) {
        core::hint::spin_loop();
    }
}

/// Plain spinning, suitable for bare-metal targets and host tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpinOsal;

impl Osal for SpinOsal {}
