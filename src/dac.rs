//! Command builders for the AD5722/AD5732/AD5752 DAC.

use crate::codec::{self, check_range, FixedPointWord};
use crate::command::Command;
use crate::constants::*;
use crate::error::Result;
use crate::types::{DacConfig, DeviceAddress};

/// Start command carrying the configured polarity and gain.
pub fn build_init_command(config: &DacConfig) -> Result<Command> {
    config.validate()?;
    Ok(Command::DacInit {
        polarity: config.polarity,
        gain: config.gain,
    })
}

/// Write command setting `address` to `desired_voltage`.
pub fn build_voltage_command(
    address: DeviceAddress,
    desired_voltage: f64,
    config: &DacConfig,
) -> Result<Command> {
    let word = voltage_word(desired_voltage, config)?;
    Ok(Command::DacWrite {
        address,
        word: word.left_justified(DAC_MAX_BITS) as u16,
    })
}

/// Readback request for `address`.
pub fn build_read_command(address: DeviceAddress) -> Command {
    Command::DacRead { address }
}

/// Range-check `desired_voltage` and convert it to the 14 bit DAC code.
pub fn voltage_word(desired_voltage: f64, config: &DacConfig) -> Result<FixedPointWord> {
    config.validate()?;
    let (min, max) = config.voltage_range();
    check_range("voltage", desired_voltage, min, max)?;
    Ok(codec::encode(
        desired_voltage,
        config.full_scale(),
        DAC_BITS,
        config.polarity.is_bipolar(),
    ))
}

/// Output voltage a left-justified register word produces.
pub fn word_voltage(word: u16, config: &DacConfig) -> f64 {
    let word = FixedPointWord::from_left_justified(u64::from(word), DAC_BITS, DAC_MAX_BITS);
    codec::decode(word, config.full_scale(), config.polarity.is_bipolar())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DriverError;
    use crate::types::{GainMode, PolarityMode};
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    fn config(gain: GainMode, polarity: PolarityMode) -> DacConfig {
        DacConfig::new(2.5, gain, polarity).unwrap()
    }

    #[test]
    fn zero_volts_bipolar_is_mid_scale() {
        let cmd = build_voltage_command(
            DeviceAddress::DacA,
            0.0,
            &config(GainMode::X2, PolarityMode::Bipolar),
        )
        .unwrap();
        assert_eq!(
            cmd,
            Command::DacWrite {
                address: DeviceAddress::DacA,
                word: 0x8000
            }
        );
    }

    #[rstest]
    #[case(GainMode::X2, PolarityMode::Bipolar, -5.0, 0x0000)]
    #[case(GainMode::X2, PolarityMode::Bipolar, 5.0, 0xFFFC)]
    #[case(GainMode::X2, PolarityMode::Unipolar, 0.0, 0x0000)]
    #[case(GainMode::X2, PolarityMode::Unipolar, 5.0, 0xFFFC)]
    #[case(GainMode::X4, PolarityMode::Unipolar, 5.0, 0x8000)]
    #[case(GainMode::X2, PolarityMode::Bipolar, 3.0, 0xCCCC)]
    fn register_words(
        #[case] gain: GainMode,
        #[case] polarity: PolarityMode,
        #[case] volts: f64,
        #[case] expected: u16,
    ) {
        let cmd = build_voltage_command(DeviceAddress::DacBoth, volts, &config(gain, polarity)).unwrap();
        match cmd {
            Command::DacWrite { word, .. } => {
                assert_eq!(word, expected);
                assert_eq!(word & 0b11, 0);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[rstest]
    #[case(PolarityMode::Bipolar, 5.01)]
    #[case(PolarityMode::Bipolar, -5.01)]
    #[case(PolarityMode::Unipolar, -0.1)]
    #[case(PolarityMode::Unipolar, f64::INFINITY)]
    fn out_of_range_voltages(#[case] polarity: PolarityMode, #[case] volts: f64) {
        let result = build_voltage_command(DeviceAddress::DacA, volts, &config(GainMode::X2, polarity));
        assert!(matches!(result, Err(DriverError::OutOfRange { .. })));
    }

    #[test]
    fn init_command_carries_codes() {
        let cmd = build_init_command(&config(GainMode::X4_32, PolarityMode::Unipolar)).unwrap();
        assert_eq!(
            cmd,
            Command::DacInit {
                polarity: PolarityMode::Unipolar,
                gain: GainMode::X4_32
            }
        );
        let bad = DacConfig {
            reference_voltage: 1.0,
            ..DacConfig::default()
        };
        assert!(build_init_command(&bad).is_err());
    }

    #[test]
    fn word_voltage_inverts_within_one_step() {
        let cfg = config(GainMode::X4, PolarityMode::Bipolar);
        let step = codec::step_size(cfg.full_scale(), DAC_BITS, true);
        for volts in [-10.0, -3.3, 0.0, 1.234, 9.99] {
            let Command::DacWrite { word, .. } =
                build_voltage_command(DeviceAddress::DacA, volts, &cfg).unwrap()
            else {
                panic!("expected a write");
            };
            assert_abs_diff_eq!(word_voltage(word, &cfg), volts, epsilon = step);
        }
    }
}
