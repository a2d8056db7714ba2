//! Command builders for the AD9910 DDS.
//!
//! Amplitude, phase and frequency are each encoded independently: amplitude
//! as a 14 bit scale factor of a user reference, phase as a 16 bit fraction
//! of a full turn, frequency as a 32 bit fraction of sysclk.

use crate::codec::{self, check_range, check_reference};
use crate::command::{Command, RampWords, ToneWords};
use crate::constants::*;
use crate::error::Result;
use crate::types::{RampParameter, RampParameters, ToneSettings};

/// The two frames that configure a ramp, sent setup first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RampCommand {
    pub setup: Command,
    pub parameters: Command,
}

impl RampCommand {
    pub fn commands(&self) -> [Command; 2] {
        [self.setup, self.parameters]
    }
}

pub fn build_single_tone_command(tone: &ToneSettings) -> Result<Command> {
    Ok(Command::DdsSingleTone(tone_words(tone)?))
}

/// Profile values for the parameters that are not being ramped.
///
/// Same words as a single tone; the firmware ignores the ramped one.
pub fn build_ramp_parameters_command(tone: &ToneSettings) -> Result<Command> {
    Ok(Command::DdsRampParameters(tone_words(tone)?))
}

/// Ramp setup frame for `ramp`, scaled against `reference`.
///
/// `reference` is the full scale of the ramped parameter: sysclk for
/// frequency, 360 for phase, the amplitude reference for amplitude.
pub fn build_ramp_setup_command(ramp: &RampParameters, reference: f64, sysclk_hz: f64) -> Result<Command> {
    ramp.validate()?;
    check_reference("ramp reference", reference)?;
    check_reference("sysclk", sysclk_hz)?;

    let label = ramp.parameter.label();
    check_range(label, ramp.start, 0.0, reference)?;
    check_range(label, ramp.stop, 0.0, reference)?;
    check_range("ramp decrement step", ramp.decrement_step, 0.0, reference)?;
    check_range("ramp increment step", ramp.increment_step, 0.0, reference)?;

    let bits = ramp.parameter.bit_width();
    let word = |value: f64| codec::encode(value, reference, bits, false).value as u32;

    Ok(Command::DdsRampSetup(RampWords {
        parameter: ramp.parameter,
        start: word(ramp.start),
        stop: word(ramp.stop),
        decrement: word(ramp.decrement_step),
        increment: word(ramp.increment_step),
        negative_rate: rate_word("negative ramp rate", ramp.negative_rate, sysclk_hz)?,
        positive_rate: rate_word("positive ramp rate", ramp.positive_rate, sysclk_hz)?,
    }))
}

/// Setup and parameter frames for a ramp; bounds are checked before any
/// value is encoded.
pub fn build_ramp_command(ramp: &RampParameters, reference: f64, tone: &ToneSettings) -> Result<RampCommand> {
    ramp.validate()?;
    Ok(RampCommand {
        setup: build_ramp_setup_command(ramp, reference, tone.sysclk_hz)?,
        parameters: build_ramp_parameters_command(tone)?,
    })
}

/// Transfer the buffered profile and ramp registers to the outputs.
pub fn build_load_command() -> Command {
    Command::DdsLoad
}

/// Return the DDS to its power-on defaults.
pub fn build_reset_command() -> Command {
    Command::DdsReset
}

/// Turn the digital ramp generator off so profile values drive the output.
pub fn build_disable_ramp_command() -> Command {
    Command::DdsRampDisable
}

/// Full scale of `parameter` under the given tone settings.
pub fn ramp_reference(parameter: RampParameter, tone: &ToneSettings) -> f64 {
    match parameter {
        RampParameter::Frequency => tone.sysclk_hz,
        RampParameter::Phase => FULL_CIRCLE_DEGREES,
        RampParameter::Amplitude => tone.amplitude_reference,
    }
}

/// Encode amplitude, phase and frequency words for one profile.
pub fn tone_words(tone: &ToneSettings) -> Result<ToneWords> {
    check_reference("amplitude reference", tone.amplitude_reference)?;
    check_reference("sysclk", tone.sysclk_hz)?;
    check_range("amplitude", tone.amplitude, 0.0, tone.amplitude_reference)?;
    check_range("frequency", tone.frequency_hz, 0.0, tone.sysclk_hz)?;

    Ok(ToneWords {
        amplitude: amplitude_word(tone.amplitude, tone.amplitude_reference),
        phase: phase_word(tone.phase_degrees)?,
        frequency: codec::encode(tone.frequency_hz, tone.sysclk_hz, DDS_FREQUENCY_BITS, false).value as u32,
    })
}

fn amplitude_word(amplitude: f64, reference: f64) -> u16 {
    codec::encode(amplitude, reference, DDS_AMPLITUDE_BITS, false).value as u16
}

/// Phase offset word; phase is circular so any finite angle is accepted.
pub fn phase_word(degrees: f64) -> Result<u16> {
    check_range("phase", degrees, f64::MIN, f64::MAX)?;
    let mut reduced = degrees.rem_euclid(FULL_CIRCLE_DEGREES);
    // rem_euclid can round tiny negative angles up to exactly one turn
    if reduced >= FULL_CIRCLE_DEGREES {
        reduced = 0.0;
    }
    Ok(codec::encode(reduced, FULL_CIRCLE_DEGREES, DDS_PHASE_BITS, false).value as u16)
}

/// DRG step-interval word: the time between steps in units of `4 / sysclk`.
pub fn rate_word(quantity: &'static str, seconds: f64, sysclk_hz: f64) -> Result<u16> {
    check_reference("sysclk", sysclk_hz)?;
    let full_scale = (1u64 << DDS_RATE_BITS) as f64 * DDS_RATE_SYSCLK_DIVIDER / sysclk_hz;
    check_range(quantity, seconds, 0.0, full_scale)?;
    Ok(codec::encode(seconds, full_scale, DDS_RATE_BITS, false).value as u16)
}
