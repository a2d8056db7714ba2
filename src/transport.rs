//! Byte transport to the driver board.

use crate::config::SerialConfig;
use crate::error::{DriverError, Result};
use log::{debug, info};
use serialport::SerialPort;
use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

/// Raw byte link to the firmware. A single owner writes whole frames, so
/// two commands never interleave.
pub trait Transport {
    /// Write every byte of `bytes`.
    fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// Read whatever arrives within `timeout`; an empty vector means nothing did.
    fn read(&mut self, timeout: Duration) -> Result<Vec<u8>>;
}

/// Transport backed by a serial port.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    name: String,
}

impl SerialTransport {
    /// Open `port_name` with the given settings
    pub fn open(port_name: &str, config: &SerialConfig) -> Result<Self> {
        let port = serialport::new(port_name, config.baud_rate)
            .timeout(Duration::from_millis(config.timeout_ms))
            .open()?;
        info!("Opened {} at {} baud", port_name, config.baud_rate);
        Ok(Self {
            port,
            name: port_name.to_string(),
        })
    }

    /// List available serial ports
    pub fn list_ports() -> Result<Vec<serialport::SerialPortInfo>> {
        Ok(serialport::available_ports()?)
    }

    /// Names of the available serial ports
    pub fn list_port_names() -> Result<Vec<String>> {
        Ok(Self::list_ports()?
            .into_iter()
            .map(|p| p.port_name)
            .collect())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Flush pending output and release the port.
    pub fn close(mut self) -> Result<()> {
        self.port.flush()?;
        info!("Closed {}", self.name);
        Ok(())
    }
}

impl Transport for SerialTransport {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.port.write_all(bytes)?;
        Ok(())
    }

    fn read(&mut self, timeout: Duration) -> Result<Vec<u8>> {
        self.port.set_timeout(timeout)?;
        let available = self.port.bytes_to_read()? as usize;
        let mut buffer = vec![0u8; available.max(1)];
        match self.port.read(&mut buffer) {
            Ok(n) => {
                buffer.truncate(n);
                debug!("Received {} bytes from {}", n, self.name);
                Ok(buffer)
            }
            Err(e) if e.kind() == ErrorKind::TimedOut => Ok(Vec::new()),
            Err(e) => Err(DriverError::Io(e)),
        }
    }
}

/// In-memory transport that records writes and replays queued input.
///
/// Useful for exercising the driver without hardware.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    pub written: Vec<u8>,
    pub incoming: Vec<u8>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transport for MemoryTransport {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.written.extend_from_slice(bytes);
        Ok(())
    }

    fn read(&mut self, _timeout: Duration) -> Result<Vec<u8>> {
        Ok(std::mem::take(&mut self.incoming))
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write(bytes)
    }

    fn read(&mut self, timeout: Duration) -> Result<Vec<u8>> {
        (**self).read(timeout)
    }
}
