use crate::constants::*;
use crate::error::{DriverError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// DAC output channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceAddress {
    DacA,
    DacB,
    DacBoth,
}

impl DeviceAddress {
    pub fn wire_code(self) -> u8 {
        match self {
            DeviceAddress::DacA => DAC_A,
            DeviceAddress::DacB => DAC_B,
            DeviceAddress::DacBoth => DAC_BOTH,
        }
    }

    pub fn from_wire_code(code: u8) -> Result<Self> {
        match code {
            DAC_A => Ok(DeviceAddress::DacA),
            DAC_B => Ok(DeviceAddress::DacB),
            DAC_BOTH => Ok(DeviceAddress::DacBoth),
            _ => Err(DriverError::UnsupportedAddress(code as char)),
        }
    }
}

/// Zero-offset convention of the voltage mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolarityMode {
    Unipolar,
    Bipolar,
}

impl PolarityMode {
    pub fn wire_code(self) -> u8 {
        match self {
            PolarityMode::Unipolar => DAC_UNIPOLAR,
            PolarityMode::Bipolar => DAC_BIPOLAR,
        }
    }

    pub fn from_wire_code(code: u8) -> Result<Self> {
        match code {
            DAC_UNIPOLAR => Ok(PolarityMode::Unipolar),
            DAC_BIPOLAR => Ok(PolarityMode::Bipolar),
            _ => Err(DriverError::UnsupportedPolarity(code as char)),
        }
    }

    pub fn is_bipolar(self) -> bool {
        self == PolarityMode::Bipolar
    }
}

/// Output amplifier gain applied to the reference voltage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GainMode {
    X2,
    X4,
    X4_32,
}

impl GainMode {
    pub fn multiplier(self) -> f64 {
        match self {
            GainMode::X2 => 2.0,
            GainMode::X4 => 4.0,
            GainMode::X4_32 => 4.32,
        }
    }

    pub fn wire_code(self) -> u8 {
        match self {
            GainMode::X2 => DAC_GAIN_2,
            GainMode::X4 => DAC_GAIN_4,
            GainMode::X4_32 => DAC_GAIN_432,
        }
    }

    pub fn from_wire_code(code: u8) -> Result<Self> {
        match code {
            DAC_GAIN_2 => Ok(GainMode::X2),
            DAC_GAIN_4 => Ok(GainMode::X4),
            DAC_GAIN_432 => Ok(GainMode::X4_32),
            _ => Err(DriverError::UnsupportedGainMode(code as char)),
        }
    }

    /// Look up a gain by its numeric multiplier, as entered in a gain selector.
    pub fn from_multiplier(multiplier: f64) -> Result<Self> {
        [GainMode::X2, GainMode::X4, GainMode::X4_32]
            .into_iter()
            .find(|gain| (gain.multiplier() - multiplier).abs() < 1e-9)
            .ok_or(DriverError::UnsupportedGainMode('?'))
    }
}

/// DAC operating configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DacConfig {
    pub reference_voltage: f64,
    pub gain: GainMode,
    pub polarity: PolarityMode,
}

impl Default for DacConfig {
    fn default() -> Self {
        Self {
            reference_voltage: 2.5,
            gain: GainMode::X2,
            polarity: PolarityMode::Bipolar,
        }
    }
}

impl DacConfig {
    pub fn new(reference_voltage: f64, gain: GainMode, polarity: PolarityMode) -> Result<Self> {
        let config = Self {
            reference_voltage,
            gain,
            polarity,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the reference voltage against the chip's supported range.
    pub fn validate(&self) -> Result<()> {
        let v = self.reference_voltage;
        if !(MIN_REFERENCE_VOLTAGE..=MAX_REFERENCE_VOLTAGE).contains(&v) {
            return Err(DriverError::out_of_range(
                "reference voltage",
                v,
                MIN_REFERENCE_VOLTAGE,
                MAX_REFERENCE_VOLTAGE,
            ));
        }
        Ok(())
    }

    /// Output voltage corresponding to the top of the range.
    pub fn full_scale(&self) -> f64 {
        self.gain.multiplier() * self.reference_voltage
    }

    /// Legal output voltage interval for the configured polarity.
    pub fn voltage_range(&self) -> (f64, f64) {
        let full_scale = self.full_scale();
        match self.polarity {
            PolarityMode::Bipolar => (-full_scale, full_scale),
            PolarityMode::Unipolar => (0.0, full_scale),
        }
    }
}

/// DDS parameter swept by the digital ramp generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RampParameter {
    Frequency,
    Phase,
    Amplitude,
}

impl RampParameter {
    pub fn wire_code(self) -> u8 {
        match self {
            RampParameter::Frequency => DDS_FREQUENCY,
            RampParameter::Phase => DDS_PHASE,
            RampParameter::Amplitude => DDS_AMPLITUDE,
        }
    }

    pub fn from_wire_code(code: u8) -> Result<Self> {
        match code {
            DDS_FREQUENCY => Ok(RampParameter::Frequency),
            DDS_PHASE => Ok(RampParameter::Phase),
            DDS_AMPLITUDE => Ok(RampParameter::Amplitude),
            _ => Err(DriverError::UnsupportedParameter(code as char)),
        }
    }

    /// Register width of the ramped quantity
    pub fn bit_width(self) -> u32 {
        match self {
            RampParameter::Frequency => DDS_FREQUENCY_BITS,
            RampParameter::Phase => DDS_PHASE_BITS,
            RampParameter::Amplitude => DDS_AMPLITUDE_BITS,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RampParameter::Frequency => "ramp frequency",
            RampParameter::Phase => "ramp phase",
            RampParameter::Amplitude => "ramp amplitude",
        }
    }
}

/// Digital ramp generator request in physical units.
///
/// Rates are the time between ramp steps, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RampParameters {
    pub parameter: RampParameter,
    pub start: f64,
    pub stop: f64,
    pub decrement_step: f64,
    pub increment_step: f64,
    pub negative_rate: f64,
    pub positive_rate: f64,
}

impl RampParameters {
    /// Check ordering and step sizes before anything is encoded.
    pub fn validate(&self) -> Result<()> {
        let span = self.stop - self.start;
        let ordered = self.start < self.stop;
        if !ordered || self.increment_step > span || self.decrement_step > span {
            return Err(DriverError::InvalidRampBounds {
                start: self.start,
                stop: self.stop,
                decrement: self.decrement_step,
                increment: self.increment_step,
            });
        }
        Ok(())
    }
}

/// Single tone settings in physical units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToneSettings {
    pub amplitude: f64,
    pub amplitude_reference: f64,
    pub phase_degrees: f64,
    pub frequency_hz: f64,
    pub sysclk_hz: f64,
}

/// Payload encoding used on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WireFormat {
    /// Decimal ASCII words, variable length
    #[default]
    Text,
    /// Fixed-width big-endian words
    Binary,
}

/// A command frame handed to the transport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentCommand {
    pub timestamp: DateTime<Utc>,
    pub bytes: Vec<u8>,
}

impl SentCommand {
    /// Printable form of the frame; binary bytes are shown as hex escapes.
    pub fn display(&self) -> String {
        self.bytes
            .iter()
            .map(|&b| {
                if b.is_ascii_graphic() {
                    (b as char).to_string()
                } else {
                    format!("\\x{:02X}", b)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_voltage_outside_supported_range_is_rejected() {
        assert!(DacConfig::new(2.5, GainMode::X2, PolarityMode::Bipolar).is_ok());
        assert!(DacConfig::new(2.0, GainMode::X4, PolarityMode::Unipolar).is_ok());
        assert!(DacConfig::new(3.0, GainMode::X4_32, PolarityMode::Unipolar).is_ok());
        assert!(matches!(
            DacConfig::new(3.3, GainMode::X2, PolarityMode::Bipolar),
            Err(DriverError::OutOfRange { .. })
        ));
        assert!(DacConfig::new(f64::NAN, GainMode::X2, PolarityMode::Bipolar).is_err());
    }

    #[test]
    fn gain_codes() {
        assert_eq!(GainMode::from_wire_code(b'3').unwrap(), GainMode::X4_32);
        assert_eq!(GainMode::from_multiplier(4.0).unwrap(), GainMode::X4);
        assert!(matches!(
            GainMode::from_wire_code(b'9'),
            Err(DriverError::UnsupportedGainMode('9'))
        ));
        assert!(GainMode::from_multiplier(3.0).is_err());
    }

    #[test]
    fn ramp_bounds() {
        let mut ramp = RampParameters {
            parameter: RampParameter::Frequency,
            start: 10.0,
            stop: 5.0,
            decrement_step: 1.0,
            increment_step: 1.0,
            negative_rate: 1e-6,
            positive_rate: 1e-6,
        };
        assert!(matches!(ramp.validate(), Err(DriverError::InvalidRampBounds { .. })));

        ramp.start = 0.0;
        ramp.stop = 5.0;
        assert!(ramp.validate().is_ok());

        ramp.increment_step = 6.0;
        assert!(ramp.validate().is_err());

        ramp.increment_step = 5.0;
        ramp.decrement_step = 5.5;
        assert!(ramp.validate().is_err());
    }

    #[test]
    fn sent_command_display_escapes_binary() {
        let sent = SentCommand {
            timestamp: Utc::now(),
            bytes: vec![b'D', b'w', b'a', 0x80, 0x00, b'!'],
        };
        assert_eq!(sent.display(), "Dwa\\x80\\x00!");
    }
}
