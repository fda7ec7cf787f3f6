//! Software model of the convolution accelerator.
//!
//! [`SimAccelerator`] implements [`Conv2dPort`] over plain word buffers and
//! runs the convolution from the packed contents of its own input and kernel
//! windows when start is strobed, so it exercises the same byte layout the
//! silicon decodes. It stays busy for a configurable number of status polls
//! and can be told to misbehave (corrupt outputs, saturate instead of
//! truncating, never finish) to test the verifier and the wait path.

use alloc::{vec, vec::Vec};

use crate::{
    codec::{LANES, pack, unpack, word_count},
    config::AccelConfig,
    osal::{Conv2dPort, ControlReg, Region},
    reference::truncate,
    registers::{decode_command, decode_dim, status_value},
    task::K_SIZE,
};

/// How the model narrows the 32-bit accumulator to a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Narrowing {
    /// Keep the low 8 bits.
    #[default]
    Truncate,
    /// Clamp to `[-128, 127]`.
    Saturate,
}

impl Narrowing {
    fn apply(self, acc: i32) -> i8 {
        match self {
            Narrowing::Truncate => truncate(acc),
            Narrowing::Saturate => acc.clamp(i8::MIN as i32, i8::MAX as i32) as i8,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimAccelerator {
    opcode: u32,
    ctrl: u32,
    dim: u32,
    input: Vec<u32>,
    kernel: Vec<u32>,
    output: Vec<u32>,
    /// Status polls reporting busy after each start.
    latency: usize,
    busy_polls_left: usize,
    stuck_busy: bool,
    narrowing: Narrowing,
    /// Output samples overwritten after each run: `(flat index, value)`.
    faults: Vec<(usize, i8)>,
    runs: usize,
    status_reads: usize,
    word_writes: usize,
}

impl SimAccelerator {
    /// Model with the window sizes and opcode of `config`, finishing after
    /// `latency` busy polls.
    pub fn new(config: &AccelConfig, latency: usize) -> Self {
        Self {
            opcode: config.opcode,
            ctrl: 0,
            dim: 0,
            input: vec![0; config.input_words],
            kernel: vec![0; config.kernel_words],
            output: vec![0; config.output_words],
            latency,
            busy_polls_left: 0,
            stuck_busy: false,
            narrowing: Narrowing::Truncate,
            faults: Vec::new(),
            runs: 0,
            status_reads: 0,
            word_writes: 0,
        }
    }

    pub fn with_narrowing(mut self, narrowing: Narrowing) -> Self {
        self.narrowing = narrowing;
        self
    }

    /// Busy never clears once started.
    pub fn with_stuck_busy(mut self) -> Self {
        self.stuck_busy = true;
        self
    }

    /// After every run, output sample `index` is replaced with `value`.
    pub fn inject_fault(&mut self, index: usize, value: i8) {
        self.faults.push((index, value));
    }

    /// Completed or in-flight starts observed.
    pub fn runs(&self) -> usize {
        self.runs
    }

    pub fn status_reads(&self) -> usize {
        self.status_reads
    }

    /// Word writes into any data window.
    pub fn word_writes(&self) -> usize {
        self.word_writes
    }

    /// Last value written to the dimension register.
    pub fn dim(&self) -> u32 {
        self.dim
    }

    pub fn ctrl(&self) -> u32 {
        self.ctrl
    }

    pub fn window(&self, region: Region) -> &[u32] {
        match region {
            Region::Input => &self.input,
            Region::Kernel => &self.kernel,
            Region::Output => &self.output,
        }
    }

    fn window_mut(&mut self, region: Region) -> &mut Vec<u32> {
        match region {
            Region::Input => &mut self.input,
            Region::Kernel => &mut self.kernel,
            Region::Output => &mut self.output,
        }
    }

    fn start(&mut self) {
        let (start, opcode) = decode_command(self.ctrl);
        if !start {
            return;
        }
        if opcode != self.opcode {
            warn!("sim: ignoring unknown opcode {:#x}", opcode);
            return;
        }
        self.runs += 1;
        self.execute();
        self.busy_polls_left = self.latency;
    }

    fn execute(&mut self) {
        let (h, w) = decode_dim(self.dim);
        let (h, w) = (h as usize, w as usize);
        if h < K_SIZE || w < K_SIZE {
            warn!("sim: degenerate dimensions {}x{}, nothing computed", h, w);
            return;
        }
        let (out_h, out_w) = (h - K_SIZE + 1, w - K_SIZE + 1);
        let fits = word_count(h * w) <= self.input.len()
            && word_count(out_h * out_w) <= self.output.len();
        if !fits {
            warn!("sim: {}x{} does not fit the device windows, nothing computed", h, w);
            return;
        }

        let sample = |words: &[u32], idx: usize| unpack(words[idx / LANES], idx % LANES) as i32;

        let mut result = Vec::with_capacity(out_h * out_w);
        for y in 0..out_h {
            for x in 0..out_w {
                let mut acc: i32 = 0;
                for ky in 0..K_SIZE {
                    for kx in 0..K_SIZE {
                        let a = sample(&self.input, (y + ky) * w + x + kx);
                        let k = sample(&self.kernel, ky * K_SIZE + kx);
                        acc += a * k;
                    }
                }
                result.push(self.narrowing.apply(acc));
            }
        }
        for &(index, value) in &self.faults {
            if let Some(slot) = result.get_mut(index) {
                *slot = value;
            }
        }

        let words = word_count(result.len()).min(self.output.len());
        for (word, chunk) in result.chunks(LANES).take(words).enumerate() {
            let mut b = [0i8; LANES];
            b[..chunk.len()].copy_from_slice(chunk);
            self.output[word] = pack(b[0], b[1], b[2], b[3]);
        }
        trace!("sim: computed {}x{} output", out_h, out_w);
    }
}

impl Conv2dPort for SimAccelerator {
    fn write_word(&mut self, region: Region, index: usize, value: u32) {
        if region == Region::Output {
            warn!("sim: write to read-only output word {} dropped", index);
            return;
        }
        self.word_writes += 1;
        if let Some(slot) = self.window_mut(region).get_mut(index) {
            *slot = value;
        }
    }

    fn read_word(&mut self, region: Region, index: usize) -> u32 {
        self.window(region).get(index).copied().unwrap_or(0)
    }

    fn write_control(&mut self, reg: ControlReg, value: u32) {
        match reg {
            ControlReg::Ctrl => {
                self.ctrl = value;
                self.start();
            }
            ControlReg::Dim => self.dim = value,
        }
    }

    fn read_status(&mut self) -> u32 {
        self.status_reads += 1;
        if self.stuck_busy && self.runs > 0 {
            return status_value(true);
        }
        if self.busy_polls_left > 0 {
            self.busy_polls_left -= 1;
            return status_value(true);
        }
        status_value(false)
    }
}
