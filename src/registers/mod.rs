//! Memory-mapped register definitions for the convolution accelerator.
//!
//! The control block is described using [`tock_registers`], so the start
//! handshake and the dimension register are composed from named bitfields
//! instead of hand-shifted constants. The three data windows (input, kernel,
//! output) are plain word arrays and are accessed with volatile reads and
//! writes through [`MmioPort`].

use core::ptr::NonNull;

use tock_registers::{
    LocalRegisterCopy,
    interfaces::{Readable, Writeable},
    register_bitfields, register_structs,
    registers::{ReadOnly, ReadWrite},
};

use crate::{
    config::AccelConfig,
    osal::{Conv2dPort, ControlReg, Region},
};

pub mod consts;

register_structs! {
    pub ControlRegs {
        (0x0000 => _reserved0),
        (0x0008 => pub ctrl: ReadWrite<u32, CTRL::Register>),
        (0x000C => pub status: ReadOnly<u32, STATUS::Register>),
        (0x0010 => pub dim: ReadWrite<u32, DIM::Register>),
        (0x0014 => @END),
    }
}

register_bitfields! {u32,
    CTRL [
        START OFFSET(0) NUMBITS(1) [],
        OPCODE OFFSET(1) NUMBITS(31) []
    ],

    STATUS [
        BUSY OFFSET(0) NUMBITS(1) []
    ],

    DIM [
        W OFFSET(0) NUMBITS(8) [],
        H OFFSET(8) NUMBITS(8) []
    ]
}

/// Value written to CTRL to launch `opcode`: `(opcode << 1) | START`.
pub fn start_command(opcode: u32) -> u32 {
    let mut ctrl = LocalRegisterCopy::<u32, CTRL::Register>::new(0);
    ctrl.modify(CTRL::OPCODE.val(opcode) + CTRL::START::SET);
    ctrl.get()
}

/// Splits a raw CTRL value into its start strobe and opcode.
pub fn decode_command(raw: u32) -> (bool, u32) {
    let ctrl = LocalRegisterCopy::<u32, CTRL::Register>::new(raw);
    (ctrl.is_set(CTRL::START), ctrl.read(CTRL::OPCODE))
}

/// Value written to DIM: H in bits 8..15, W in bits 0..7.
pub fn dim_value(h: u8, w: u8) -> u32 {
    let mut dim = LocalRegisterCopy::<u32, DIM::Register>::new(0);
    dim.modify(DIM::H.val(h as u32) + DIM::W.val(w as u32));
    dim.get()
}

/// Splits a raw DIM value into `(h, w)`.
pub fn decode_dim(raw: u32) -> (u8, u8) {
    let dim = LocalRegisterCopy::<u32, DIM::Register>::new(raw);
    (dim.read(DIM::H) as u8, dim.read(DIM::W) as u8)
}

/// Busy flag of a raw STATUS value.
pub fn status_busy(raw: u32) -> bool {
    LocalRegisterCopy::<u32, STATUS::Register>::new(raw).is_set(STATUS::BUSY)
}

/// Raw STATUS value for the given busy state.
pub fn status_value(busy: bool) -> u32 {
    let mut status = LocalRegisterCopy::<u32, STATUS::Register>::new(0);
    if busy {
        status.modify(STATUS::BUSY::SET);
    }
    status.get()
}

/// Port that talks to the real accelerator through its MMIO windows.
pub struct MmioPort {
    regs: NonNull<ControlRegs>,
    input: NonNull<u32>,
    kernel: NonNull<u32>,
    output: NonNull<u32>,
    capacity: [usize; 3],
}
unsafe impl Send for MmioPort {}

impl MmioPort {
    /// Creates a port at the addresses named by `config`.
    ///
    /// # Safety
    ///
    /// Every base address in `config` must be mapped, word aligned, and backed
    /// by the accelerator for the lifetime of the returned port. No other code
    /// may access the device concurrently.
    pub unsafe fn new(config: &AccelConfig) -> Self {
        unsafe {
            Self::from_bases(
                NonNull::new_unchecked(config.ctrl_base as *mut u8),
                NonNull::new_unchecked(config.input_base as *mut u8),
                NonNull::new_unchecked(config.kernel_base as *mut u8),
                NonNull::new_unchecked(config.output_base as *mut u8),
                config,
            )
        }
    }

    /// Creates a port from already mapped window pointers, e.g. from an
    /// `iomap` of the device tree regions. Window sizes come from `config`.
    ///
    /// # Safety
    ///
    /// Each pointer must be valid for the window size `config` gives it, in
    /// addition to the contract of [`MmioPort::new`].
    pub const unsafe fn from_bases(
        ctrl: NonNull<u8>,
        input: NonNull<u8>,
        kernel: NonNull<u8>,
        output: NonNull<u8>,
        config: &AccelConfig,
    ) -> Self {
        Self {
            regs: ctrl.cast(),
            input: input.cast(),
            kernel: kernel.cast(),
            output: output.cast(),
            capacity: [config.input_words, config.kernel_words, config.output_words],
        }
    }

    #[inline]
    fn regs(&self) -> &ControlRegs {
        unsafe { self.regs.as_ref() }
    }

    /// Pointer to word `index` of `region`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is past the end of the window.
    #[inline]
    fn word_ptr(&self, region: Region, index: usize) -> *mut u32 {
        let (base, capacity) = match region {
            Region::Input => (self.input, self.capacity[0]),
            Region::Kernel => (self.kernel, self.capacity[1]),
            Region::Output => (self.output, self.capacity[2]),
        };
        assert!(
            index < capacity,
            "{region} word {index} outside window of {capacity}"
        );
        // SAFETY: in bounds of the mapped window checked above.
        unsafe { base.as_ptr().add(index) }
    }
}

impl Conv2dPort for MmioPort {
    fn write_word(&mut self, region: Region, index: usize, value: u32) {
        unsafe { self.word_ptr(region, index).write_volatile(value) }
    }

    fn read_word(&mut self, region: Region, index: usize) -> u32 {
        unsafe { self.word_ptr(region, index).read_volatile() }
    }

    fn write_control(&mut self, reg: ControlReg, value: u32) {
        match reg {
            ControlReg::Ctrl => self.regs().ctrl.set(value),
            ControlReg::Dim => self.regs().dim.set(value),
        }
    }

    fn read_status(&mut self) -> u32 {
        self.regs().status.get()
    }
}
