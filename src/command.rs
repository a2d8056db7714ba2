//! Structured commands and their serialization into framed byte sequences.
//!
//! Every frame is `<device><opcode...><payload><'!'>`. In the text format
//! numeric words are written as decimal ASCII separated by `,`; in the
//! binary format they are fixed-width big-endian integers whose sizes are
//! determined by the opcode alone.

use crate::constants::*;
use crate::types::{DeviceAddress, GainMode, PolarityMode, RampParameter, WireFormat};

/// Amplitude, phase and frequency register words for one DDS profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToneWords {
    /// 14 bit amplitude scale factor
    pub amplitude: u16,
    /// Phase offset word
    pub phase: u16,
    /// Frequency tuning word
    pub frequency: u32,
}

/// Digital ramp generator limit, step and rate words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RampWords {
    pub parameter: RampParameter,
    pub start: u32,
    pub stop: u32,
    pub decrement: u32,
    pub increment: u32,
    pub negative_rate: u16,
    pub positive_rate: u16,
}

/// A command understood by the driver board firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Configure DAC polarity and gain
    DacInit {
        polarity: PolarityMode,
        gain: GainMode,
    },
    /// Write a left-justified 16 bit word to a DAC channel
    DacWrite { address: DeviceAddress, word: u16 },
    /// Request readback of a DAC channel
    DacRead { address: DeviceAddress },
    DdsSingleTone(ToneWords),
    DdsRampSetup(RampWords),
    /// Non-ramped profile values while the DRG is active
    DdsRampParameters(ToneWords),
    DdsRampDisable,
    DdsLoad,
    DdsReset,
}

impl Command {
    /// Device indicator byte that starts the frame.
    pub fn device(&self) -> u8 {
        match self {
            Command::DacInit { .. } | Command::DacWrite { .. } | Command::DacRead { .. } => {
                DAC_INDICATOR
            }
            _ => DDS_INDICATOR,
        }
    }

    /// Opcode bytes following the device indicator.
    pub fn opcode(&self) -> &'static [u8] {
        match self {
            Command::DacInit { .. } => &[DAC_START],
            Command::DacWrite { .. } => &[DAC_WRITE],
            Command::DacRead { .. } => &[DAC_READ],
            Command::DdsSingleTone(_) => &[DDS_OUTPUT, DDS_SINGLE_TONE],
            Command::DdsRampSetup(_) => &[DDS_OUTPUT, DDS_RAMP, DDS_RAMP_SETUP],
            Command::DdsRampParameters(_) => &[DDS_OUTPUT, DDS_RAMP, DDS_RAMP_PARAMETERS],
            Command::DdsRampDisable => &[DDS_OUTPUT, DDS_RAMP, DDS_RAMP_DISABLE],
            Command::DdsLoad => &[DDS_LOAD],
            Command::DdsReset => &[DDS_RESET],
        }
    }

    /// Payload bytes in the given wire format, without the terminator.
    pub fn payload(&self, format: WireFormat) -> Vec<u8> {
        let mut payload = Vec::new();
        match *self {
            Command::DacInit { polarity, gain } => {
                payload.push(polarity.wire_code());
                payload.push(gain.wire_code());
            }
            Command::DacWrite { address, word } => {
                payload.push(address.wire_code());
                push_words(&mut payload, format, &[Word::U16(word)]);
            }
            Command::DacRead { address } => payload.push(address.wire_code()),
            Command::DdsSingleTone(tone) | Command::DdsRampParameters(tone) => {
                push_words(&mut payload, format, &tone_words(&tone));
            }
            Command::DdsRampSetup(ramp) => {
                payload.push(ramp.parameter.wire_code());
                push_words(&mut payload, format, &ramp_words(&ramp));
            }
            Command::DdsRampDisable | Command::DdsLoad | Command::DdsReset => {}
        }
        payload
    }

    /// Complete terminated frame ready for the transport.
    pub fn to_bytes(&self, format: WireFormat) -> Vec<u8> {
        frame(self.device(), self.opcode(), &self.payload(format))
    }
}

/// Assemble device indicator, opcode and payload and append the terminator.
///
/// The payload is copied as given. Text payloads must already be free of
/// [`DONE`], which [`Command::payload`] guarantees since it only emits
/// digits, separators and code letters. Binary payloads may contain the
/// terminator byte; their length is fixed by the opcode, and
/// [`parse`](crate::parse) reads them by count.
pub fn frame(device: u8, opcode: &[u8], payload: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(2 + opcode.len() + payload.len());
    bytes.push(device);
    bytes.extend_from_slice(opcode);
    bytes.extend_from_slice(payload);
    bytes.push(DONE);
    bytes
}

#[derive(Debug, Clone, Copy)]
enum Word {
    U16(u16),
    U32(u32),
}

fn tone_words(tone: &ToneWords) -> [Word; 3] {
    [
        Word::U16(tone.amplitude),
        Word::U16(tone.phase),
        Word::U32(tone.frequency),
    ]
}

fn ramp_words(ramp: &RampWords) -> [Word; 6] {
    [
        Word::U32(ramp.start),
        Word::U32(ramp.stop),
        Word::U32(ramp.decrement),
        Word::U32(ramp.increment),
        Word::U16(ramp.negative_rate),
        Word::U16(ramp.positive_rate),
    ]
}

fn push_words(payload: &mut Vec<u8>, format: WireFormat, words: &[Word]) {
    match format {
        WireFormat::Text => {
            let text = words
                .iter()
                .map(|w| match w {
                    Word::U16(v) => v.to_string(),
                    Word::U32(v) => v.to_string(),
                })
                .collect::<Vec<_>>()
                .join(",");
            payload.extend_from_slice(text.as_bytes());
        }
        WireFormat::Binary => {
            for w in words {
                match w {
                    Word::U16(v) => payload.extend_from_slice(&v.to_be_bytes()),
                    Word::U32(v) => payload.extend_from_slice(&v.to_be_bytes()),
                }
            }
        }
    }
}

/// Every opcode the firmware understands, with its binary payload length.
pub(crate) const OPCODES: &[(u8, &[u8], usize)] = &[
    (DAC_INDICATOR, &[DAC_START], 2),
    (DAC_INDICATOR, &[DAC_WRITE], 3),
    (DAC_INDICATOR, &[DAC_READ], 1),
    (DDS_INDICATOR, &[DDS_OUTPUT, DDS_SINGLE_TONE], 8),
    (DDS_INDICATOR, &[DDS_OUTPUT, DDS_RAMP, DDS_RAMP_SETUP], 21),
    (DDS_INDICATOR, &[DDS_OUTPUT, DDS_RAMP, DDS_RAMP_PARAMETERS], 8),
    (DDS_INDICATOR, &[DDS_OUTPUT, DDS_RAMP, DDS_RAMP_DISABLE], 0),
    (DDS_INDICATOR, &[DDS_LOAD], 0),
    (DDS_INDICATOR, &[DDS_RESET], 0),
];

/// Number of binary payload bytes that follow `opcode`, or `None` for an
/// unknown opcode.
pub(crate) fn binary_payload_len(device: u8, opcode: &[u8]) -> Option<usize> {
    OPCODES
        .iter()
        .find(|(d, op, _)| *d == device && *op == opcode)
        .map(|(_, _, len)| *len)
}

/// Whether `opcode` is the beginning of at least one longer known opcode.
pub(crate) fn is_opcode_prefix(device: u8, opcode: &[u8]) -> bool {
    OPCODES
        .iter()
        .any(|(d, op, _)| *d == device && op.len() > opcode.len() && op.starts_with(opcode))
}
