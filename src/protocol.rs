use crate::command::Command;
use crate::config::{DdsConfig, DriverConfig};
use crate::constants::*;
use crate::dac;
use crate::dds;
use crate::error::Result;
use crate::transport::{SerialTransport, Transport};
use crate::types::*;
use chrono::Utc;
use log::{debug, info, warn};
use std::collections::VecDeque;
use std::time::Duration;

/// Main interface to the DAC/DDS driver board.
///
/// Owns the transport; every command is built, range-checked and framed
/// before a single byte is written, so a rejected request leaves the link
/// untouched.
pub struct DeviceDriver<T: Transport = SerialTransport> {
    transport: T,
    config: DriverConfig,
    history: VecDeque<SentCommand>,
}

impl DeviceDriver<SerialTransport> {
    /// Open a serial port with the default configuration
    pub fn open(port_name: &str) -> Result<Self> {
        Self::open_with_config(port_name, DriverConfig::default())
    }

    pub fn open_with_config(port_name: &str, config: DriverConfig) -> Result<Self> {
        config.dac.validate()?;
        let transport = SerialTransport::open(port_name, &config.serial)?;
        Ok(Self::with_transport(transport, config))
    }

    /// List available serial ports
    pub fn list_ports() -> Result<Vec<serialport::SerialPortInfo>> {
        SerialTransport::list_ports()
    }

    /// Close the current port and open `port_name` with the same settings.
    pub fn set_port(self, port_name: &str) -> Result<Self> {
        let DeviceDriver {
            transport,
            config,
            history,
        } = self;
        info!("Switching from {} to {}", transport.name(), port_name);
        transport.close()?;
        let transport = SerialTransport::open(port_name, &config.serial)?;
        Ok(DeviceDriver {
            transport,
            config,
            history,
        })
    }

    pub fn port_name(&self) -> &str {
        self.transport.name()
    }
}

impl<T: Transport> DeviceDriver<T> {
    pub fn with_transport(transport: T, config: DriverConfig) -> Self {
        Self {
            transport,
            config,
            history: VecDeque::with_capacity(HISTORY_LEN),
        }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn set_wire_format(&mut self, format: WireFormat) {
        self.config.wire_format = format;
    }

    /// Replace the DAC configuration without sending anything.
    pub fn set_dac_config(&mut self, dac: DacConfig) -> Result<()> {
        dac.validate().inspect_err(|e| warn!("Rejected DAC configuration: {}", e))?;
        self.config.dac = dac;
        Ok(())
    }

    pub fn set_dds_config(&mut self, dds: DdsConfig) {
        self.config.dds = dds;
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Most recent frames written, oldest first
    pub fn history(&self) -> impl Iterator<Item = &SentCommand> {
        self.history.iter()
    }

    pub fn last_sent(&self) -> Option<&SentCommand> {
        self.history.back()
    }

    /// Frame `command` in the configured wire format and write it.
    pub fn send(&mut self, command: &Command) -> Result<()> {
        let bytes = command.to_bytes(self.config.wire_format);
        self.write_frame(bytes)
    }

    fn send_all(&mut self, commands: &[Command]) -> Result<()> {
        for command in commands {
            self.send(command)?;
        }
        Ok(())
    }

    fn write_frame(&mut self, bytes: Vec<u8>) -> Result<()> {
        let sent = SentCommand {
            timestamp: Utc::now(),
            bytes,
        };
        debug!("Sending:  {}", sent.display());
        self.transport.write(&sent.bytes)?;

        if self.history.len() == HISTORY_LEN {
            self.history.pop_front();
        }
        self.history.push_back(sent);
        Ok(())
    }

    /// Read any bytes the board sent back.
    pub fn read_response(&mut self, timeout: Duration) -> Result<Vec<u8>> {
        let bytes = self.transport.read(timeout)?;
        if !bytes.is_empty() {
            debug!("Received: {}", String::from_utf8_lossy(&bytes));
        }
        Ok(bytes)
    }

    // DAC

    /// Send the start command for the current DAC configuration
    pub fn send_initialization(&mut self) -> Result<()> {
        let command = dac::build_init_command(&self.config.dac)?;
        self.send(&command)
    }

    /// Set a DAC output to `volts`
    pub fn send_voltage(&mut self, address: DeviceAddress, volts: f64) -> Result<()> {
        let command = dac::build_voltage_command(address, volts, &self.config.dac)
            .inspect_err(|e| warn!("Rejected voltage for {:?}: {}", address, e))?;
        self.send(&command)
    }

    /// Ask the board to report a DAC register
    pub fn request_readback(&mut self, address: DeviceAddress) -> Result<()> {
        self.send(&dac::build_read_command(address))
    }

    /// Switch polarity/gain/reference: initialize, then park both outputs at 0 V.
    pub fn apply_dac_config(&mut self, dac_config: DacConfig) -> Result<()> {
        let init = dac::build_init_command(&dac_config)
            .inspect_err(|e| warn!("Rejected DAC configuration: {}", e))?;
        let zero = dac::build_voltage_command(DeviceAddress::DacBoth, 0.0, &dac_config)?;
        self.send_all(&[init, zero])?;
        self.config.dac = dac_config;
        Ok(())
    }

    // DDS

    /// Tone settings built from the configured sysclk and amplitude reference
    pub fn tone(&self, amplitude: f64, phase_degrees: f64, frequency_hz: f64) -> ToneSettings {
        ToneSettings {
            amplitude,
            amplitude_reference: self.config.dds.amplitude_reference,
            phase_degrees,
            frequency_hz,
            sysclk_hz: self.config.dds.sysclk_hz,
        }
    }

    pub fn load(&mut self) -> Result<()> {
        self.send(&dds::build_load_command())
    }

    pub fn reset(&mut self) -> Result<()> {
        self.send(&dds::build_reset_command())
    }

    pub fn disable_ramp(&mut self) -> Result<()> {
        self.send(&dds::build_disable_ramp_command())
    }

    pub fn send_single_tone(&mut self, tone: &ToneSettings) -> Result<()> {
        let command = dds::build_single_tone_command(tone)
            .inspect_err(|e| warn!("Rejected single tone: {}", e))?;
        self.send(&command)
    }

    pub fn send_ramp_parameters(&mut self, tone: &ToneSettings) -> Result<()> {
        let command = dds::build_ramp_parameters_command(tone)
            .inspect_err(|e| warn!("Rejected ramp parameters: {}", e))?;
        self.send(&command)
    }

    pub fn send_ramp_setup(&mut self, ramp: &RampParameters, reference: f64) -> Result<()> {
        let command = dds::build_ramp_setup_command(ramp, reference, self.config.dds.sysclk_hz)
            .inspect_err(|e| warn!("Rejected ramp setup: {}", e))?;
        self.send(&command)
    }

    /// Leave ramp mode and output a single tone: disable ramp, tone, load.
    pub fn program_single_tone(&mut self, tone: &ToneSettings) -> Result<()> {
        let command = dds::build_single_tone_command(tone)
            .inspect_err(|e| warn!("Rejected single tone: {}", e))?;
        self.send_all(&[
            dds::build_disable_ramp_command(),
            command,
            dds::build_load_command(),
        ])
    }

    /// Program and start a ramp: setup, parameters, load.
    pub fn program_ramp(&mut self, ramp: &RampParameters, tone: &ToneSettings) -> Result<()> {
        let reference = dds::ramp_reference(ramp.parameter, tone);
        let pair = dds::build_ramp_command(ramp, reference, tone)
            .inspect_err(|e| warn!("Rejected ramp: {}", e))?;
        let [setup, parameters] = pair.commands();
        self.send_all(&[setup, parameters, dds::build_load_command()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DriverError;
    use crate::transport::MemoryTransport;
    use std::io;

    struct DisconnectedTransport;

    impl Transport for DisconnectedTransport {
        fn write(&mut self, _bytes: &[u8]) -> Result<()> {
            Err(DriverError::Io(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged")))
        }

        fn read(&mut self, _timeout: Duration) -> Result<Vec<u8>> {
            Ok(Vec::new())
        }
    }

    fn driver() -> DeviceDriver<MemoryTransport> {
        DeviceDriver::with_transport(MemoryTransport::new(), DriverConfig::default())
    }

    #[test]
    fn history_is_bounded() {
        let mut d = driver();
        for _ in 0..HISTORY_LEN + 10 {
            d.load().unwrap();
        }
        assert_eq!(d.history().count(), HISTORY_LEN);
        assert_eq!(d.last_sent().unwrap().bytes, b"dl!".to_vec());
    }

    #[test]
    fn rejected_voltage_writes_nothing() {
        let mut d = driver();
        assert!(d.send_voltage(DeviceAddress::DacA, 50.0).is_err());
        assert!(d.transport().written.is_empty());
        assert!(d.last_sent().is_none());
    }

    #[test]
    fn rejected_dac_config_keeps_previous() {
        let mut d = driver();
        let bad = DacConfig {
            reference_voltage: 5.0,
            ..DacConfig::default()
        };
        assert!(d.apply_dac_config(bad).is_err());
        assert_eq!(d.config().dac, DacConfig::default());
        assert!(d.transport().written.is_empty());
    }

    #[test]
    fn failed_write_keeps_previous_dac_config() {
        let mut d = DeviceDriver::with_transport(DisconnectedTransport, DriverConfig::default());
        let config = DacConfig::new(2.5, GainMode::X4, PolarityMode::Unipolar).unwrap();
        let err = d.apply_dac_config(config).unwrap_err();
        assert!(matches!(err, DriverError::Io(_)));
        assert_eq!(d.config().dac, DacConfig::default());
        assert!(d.last_sent().is_none());
    }
}
