//! Driver and verification harness for a memory-mapped 3x3 int8 convolution
//! accelerator.
//!
//! The crate packs deterministic input patterns and a kernel into the device
//! windows, runs the convolution, and checks every output sample against a
//! bit-exact software reference. Register access goes through the
//! [`Conv2dPort`] trait so the same driver runs on the target through
//! [`MmioPort`] and on the host against [`SimAccelerator`].
//!
//! ```no_run
//! use conv2d_verify::{AccelConfig, Conv2dDriver, MmioPort, Registry, Runner, exit_code_for};
//!
//! let config = AccelConfig::neorv32();
//! let port = unsafe { MmioPort::new(&config) };
//! let mut runner = Runner::new(Conv2dDriver::new(port, config), Registry::builtin());
//! let status = exit_code_for(&runner.run(2), false);
//! # let _ = status;
//! ```

#![cfg_attr(not(test), no_std)]

extern crate alloc;
#[macro_use]
extern crate log;

pub mod codec;
mod config;
mod driver;
mod err;
mod osal;
pub mod pattern;
pub mod reference;
mod registers;
mod registry;
mod runner;
mod sim;
mod task;
pub mod verify;

pub use config::*;
pub use driver::*;
pub use err::*;
pub use osal::*;
pub use pattern::Pattern;
pub use reference::OutputWindow;
pub use registers::{MmioPort, consts, dim_value, start_command};
pub use registry::*;
pub use runner::*;
pub use sim::*;
pub use task::*;
pub use verify::{Mismatch, VerifyReport};
