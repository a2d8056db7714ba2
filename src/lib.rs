//! # DAC/DDS Protocol Library
//!
//! A Rust library for driving an Arduino-based board that programs an
//! AD5722/AD5732/AD5752 DAC and an AD9910 DDS over a serial link.
//! Physical quantities (volts, hertz, degrees, amplitude) are converted into
//! fixed-width register words and framed into the `'!'`-terminated ASCII
//! command protocol the firmware parses byte by byte.
//!
//! ## Features
//!
//! - Fixed-point codec with floor semantics matching the chips
//! - DAC setup, write and readback commands
//! - DDS single tone, digital ramp generator, load and reset commands
//! - Text (decimal ASCII) and binary (fixed-width) wire formats
//! - Incremental parser for validating framed commands
//!
//! ## Example
//!
//! ```no_run
//! use dac_dds_protocol::{DeviceAddress, DeviceDriver};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut driver = DeviceDriver::open("/dev/ttyACM0")?;
//!     driver.send_initialization()?;
//!     driver.send_voltage(DeviceAddress::DacA, 1.25)?;
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod command;
pub mod config;
pub mod constants;
pub mod dac;
pub mod dds;
pub mod error;
pub mod parser;
pub mod protocol;
pub mod transport;
pub mod types;

pub use command::{frame, Command, RampWords, ToneWords};
pub use config::{DdsConfig, DriverConfig, SerialConfig};
pub use error::{DriverError, Result};
pub use parser::{parse, parse_all, ParseState, Parser};
pub use protocol::DeviceDriver;
pub use transport::{MemoryTransport, SerialTransport, Transport};
pub use types::*;
