//! Device driver for the convolution accelerator.
//!
//! Owns a [`Conv2dPort`] and implements the load / configure / start / read
//! protocol on top of it. The driver never issues two operations at once:
//! every call returns only after its register traffic is complete, and
//! [`Conv2dDriver::start_and_wait`] blocks until the busy flag clears.

use alloc::vec::Vec;

use crate::{
    codec::{LANES, lanes, pack, unpack},
    config::AccelConfig,
    err::Conv2dError,
    osal::{Conv2dPort, ControlReg, Osal, Region, SpinOsal},
    pattern::Pattern,
    registers::{dim_value, start_command, status_busy},
    task::{Dims, Kernel},
};

const LOG_INTERVAL: usize = 100_000;

/// Execution state reported by the status register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    Idle,
    Busy,
}

pub struct Conv2dDriver<P: Conv2dPort, O: Osal = SpinOsal> {
    port: P,
    osal: O,
    config: AccelConfig,
}

impl<P: Conv2dPort> Conv2dDriver<P> {
    pub fn new(port: P, config: AccelConfig) -> Self {
        Self::with_osal(port, config, SpinOsal)
    }
}

impl<P: Conv2dPort, O: Osal> Conv2dDriver<P, O> {
    pub fn with_osal(port: P, config: AccelConfig, osal: O) -> Self {
        Self { port, osal, config }
    }

    pub fn config(&self) -> &AccelConfig {
        &self.config
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    pub fn into_port(self) -> P {
        self.port
    }

    fn capacity(&self, region: Region) -> usize {
        match region {
            Region::Input => self.config.input_words,
            Region::Kernel => self.config.kernel_words,
            Region::Output => self.config.output_words,
        }
    }

    fn check_fits(&self, region: Region, words: usize) -> Result<(), Conv2dError> {
        let capacity = self.capacity(region);
        if words > capacity {
            return Err(Conv2dError::RegionOverflow {
                region: region.name(),
                words,
                capacity,
            });
        }
        Ok(())
    }

    /// Checks that both windows of `dims` fit the device before anything is
    /// written.
    pub fn check_dims(&self, dims: Dims) -> Result<(), Conv2dError> {
        self.check_fits(Region::Input, dims.input_words())?;
        self.check_fits(Region::Output, dims.output_words())
    }

    /// Writes `(H << 8) | W` to the dimension register.
    pub fn configure_dimensions(&mut self, dims: Dims) {
        let value = dim_value(dims.h(), dims.w());
        trace!("DIM <- {:#06x} ({})", value, dims);
        self.port.write_control(ControlReg::Dim, value);
    }

    /// Fills the input window with `pattern` evaluated over `dims`.
    ///
    /// The window is cleared first so a shorter tensor never leaves stale
    /// samples from a previous run in its last word. Bytes past `H*W` in the
    /// final word stay zero.
    pub fn load_input(&mut self, dims: Dims, pattern: &Pattern) -> Result<(), Conv2dError> {
        let words = dims.input_words();
        self.check_fits(Region::Input, words)?;

        for word in 0..words {
            self.port.write_word(Region::Input, word, 0);
        }

        let total = dims.input_len();
        for word in 0..words {
            let base = word * LANES;
            let mut b = [0i8; LANES];
            for (lane, sample) in b.iter_mut().enumerate() {
                let idx = base + lane;
                if idx < total {
                    let (row, col) = dims.input_coord(idx);
                    *sample = pattern.eval(row, col);
                }
            }
            self.port.write_word(Region::Input, word, pack(b[0], b[1], b[2], b[3]));
        }
        debug!("loaded {} input words ({}, {})", words, dims, pattern);
        Ok(())
    }

    /// Writes the three kernel words.
    pub fn load_kernel(&mut self, kernel: &Kernel) {
        for (idx, word) in kernel.packed().into_iter().enumerate() {
            self.port.write_word(Region::Kernel, idx, word);
        }
        debug!("loaded kernel {}", kernel);
    }

    pub fn state(&mut self) -> DeviceState {
        if status_busy(self.port.read_status()) {
            DeviceState::Busy
        } else {
            DeviceState::Idle
        }
    }

    /// Spins for the configured settle time between programming DIM and
    /// strobing start.
    pub fn settle(&self) {
        self.osal.settle(self.config.settle_iterations);
    }

    /// Strobes start with the configured opcode and polls until the busy
    /// flag clears.
    ///
    /// With `poll_limit == None` this never returns while the device stays
    /// busy. With a limit, a device that is still busy after that many polls
    /// yields [`Conv2dError::DeviceUnresponsive`].
    pub fn start_and_wait(&mut self) -> Result<(), Conv2dError> {
        let command = start_command(self.config.opcode);
        trace!("CTRL <- {:#x}", command);
        self.port.write_control(ControlReg::Ctrl, command);

        let mut polls: usize = 0;
        loop {
            let status = self.port.read_status();
            if !status_busy(status) {
                debug!("device idle after {} polls", polls);
                return Ok(());
            }
            polls += 1;

            if self.config.poll_limit.is_some_and(|limit| polls >= limit) {
                error!(
                    "start_and_wait timeout: opcode={:#x} polls={} status={:#x}",
                    self.config.opcode, polls, status
                );
                return Err(Conv2dError::DeviceUnresponsive { polls });
            }

            if polls % LOG_INTERVAL == 0 {
                debug!("start_and_wait: still busy after {} polls", polls);
            }
            self.osal.relax();
        }
    }

    /// Output sample `idx` of the row-major output window.
    pub fn read_output(&mut self, idx: usize) -> i8 {
        let word = self.port.read_word(Region::Output, idx / LANES);
        unpack(word, idx % LANES)
    }

    /// Reads the whole output window of `dims`.
    pub fn read_output_window(&mut self, dims: Dims) -> Result<Vec<i8>, Conv2dError> {
        self.check_fits(Region::Output, dims.output_words())?;
        Ok((0..dims.output_len()).map(|idx| self.read_output(idx)).collect())
    }

    /// Reads back the first `count` words of the input window.
    pub fn read_input_words(&mut self, count: usize) -> Vec<u32> {
        let count = count.min(self.config.input_words);
        (0..count)
            .map(|idx| self.port.read_word(Region::Input, idx))
            .collect()
    }

    /// Reads back the kernel as the device sees it.
    pub fn read_kernel(&mut self) -> Kernel {
        let mut words = [0u32; 3];
        for (idx, word) in words.iter_mut().enumerate() {
            *word = self.port.read_word(Region::Kernel, idx);
        }
        Kernel::from_packed(words)
    }

    /// Logs the first input words, raw and split into lanes.
    pub fn dump_input(&mut self, dims: Dims) {
        let count = self.config.dump_input_words.min(dims.input_words());
        info!("  First {} A-words ({}) (raw + bytes):", count, dims);
        for (idx, word) in self.read_input_words(count).into_iter().enumerate() {
            let [b0, b1, b2, b3] = lanes(word);
            info!(
                "    A[{}] = {:#x}  bytes = [{}, {}, {}, {}]",
                idx, word, b0, b1, b2, b3
            );
        }
    }

    /// Logs the kernel read back from the kernel window.
    pub fn dump_kernel(&mut self) {
        let k = self.read_kernel();
        info!("  Kernel 3x3 from B-window:");
        for row in k.0 {
            info!("    [{} {} {}]", row[0], row[1], row[2]);
        }
    }
}
