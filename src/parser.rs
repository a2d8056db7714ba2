//! Byte-at-a-time command parser.
//!
//! This mirrors the way the firmware consumes the serial stream and lets the
//! host side check exactly what it framed. Text payloads run up to the
//! terminator; binary payloads are read by a count fixed by the opcode, so a
//! `'!'` byte inside a binary word is taken as data here.

use crate::command::{binary_payload_len, is_opcode_prefix, Command, RampWords, ToneWords};
use crate::constants::*;
use crate::error::{DriverError, Result};
use crate::types::{DeviceAddress, GainMode, PolarityMode, RampParameter, WireFormat};

/// Longest text payload accepted before the frame is declared unterminated.
const MAX_TEXT_PAYLOAD: usize = 96;

/// Parser state between bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    ExpectDevice,
    ExpectOpcode,
    ReadPayload,
    ExpectTerminator,
    Done,
}

/// Incremental parser for one wire format.
#[derive(Debug, Clone)]
pub struct Parser {
    format: WireFormat,
    state: ParseState,
    device: u8,
    opcode: Vec<u8>,
    payload: Vec<u8>,
    expected: usize,
}

impl Parser {
    pub fn new(format: WireFormat) -> Self {
        Self {
            format,
            state: ParseState::ExpectDevice,
            device: 0,
            opcode: Vec::with_capacity(3),
            payload: Vec::new(),
            expected: 0,
        }
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Discard any partial frame.
    pub fn reset(&mut self) {
        self.state = ParseState::ExpectDevice;
        self.device = 0;
        self.opcode.clear();
        self.payload.clear();
        self.expected = 0;
    }

    /// Consume one byte, returning the command once its terminator arrives.
    ///
    /// On error the partial frame is dropped and the parser is ready for the
    /// next device indicator.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Command>> {
        let result = self.step(byte);
        if result.is_err() {
            self.reset();
        }
        result
    }

    fn step(&mut self, byte: u8) -> Result<Option<Command>> {
        if self.state == ParseState::Done {
            self.reset();
        }

        match self.state {
            ParseState::ExpectDevice => {
                if byte != DAC_INDICATOR && byte != DDS_INDICATOR {
                    return Err(DriverError::framing(format!(
                        "unknown device indicator {:?}",
                        byte as char
                    )));
                }
                self.device = byte;
                self.state = ParseState::ExpectOpcode;
                Ok(None)
            }
            ParseState::ExpectOpcode => {
                self.opcode.push(byte);
                if let Some(len) = binary_payload_len(self.device, &self.opcode) {
                    self.expected = len;
                    self.state = if len == 0 {
                        ParseState::ExpectTerminator
                    } else {
                        ParseState::ReadPayload
                    };
                    Ok(None)
                } else if is_opcode_prefix(self.device, &self.opcode) {
                    Ok(None)
                } else {
                    Err(DriverError::framing(format!(
                        "unknown opcode {:?} for device {:?}",
                        String::from_utf8_lossy(&self.opcode),
                        self.device as char
                    )))
                }
            }
            ParseState::ReadPayload => match self.format {
                WireFormat::Text => {
                    if byte == DONE {
                        return self.finish().map(Some);
                    }
                    if self.payload.len() >= MAX_TEXT_PAYLOAD {
                        return Err(DriverError::framing("unterminated text payload"));
                    }
                    self.payload.push(byte);
                    Ok(None)
                }
                WireFormat::Binary => {
                    self.payload.push(byte);
                    if self.payload.len() == self.expected {
                        self.state = ParseState::ExpectTerminator;
                    }
                    Ok(None)
                }
            },
            ParseState::ExpectTerminator => {
                if byte != DONE {
                    return Err(DriverError::framing(format!(
                        "expected terminator, got {:#04x}",
                        byte
                    )));
                }
                self.finish().map(Some)
            }
            ParseState::Done => unreachable!("Done is reset before matching"),
        }
    }

    fn finish(&mut self) -> Result<Command> {
        let command = match self.format {
            WireFormat::Text => decode_text(self.device, &self.opcode, &self.payload)?,
            WireFormat::Binary => decode_binary(self.device, &self.opcode, &self.payload)?,
        };
        self.state = ParseState::Done;
        Ok(command)
    }
}

/// Parse exactly one complete frame.
pub fn parse(bytes: &[u8], format: WireFormat) -> Result<Command> {
    let mut parser = Parser::new(format);
    for (i, &byte) in bytes.iter().enumerate() {
        if let Some(command) = parser.feed(byte)? {
            if i + 1 != bytes.len() {
                return Err(DriverError::framing(format!(
                    "{} trailing bytes after terminator",
                    bytes.len() - i - 1
                )));
            }
            return Ok(command);
        }
    }
    Err(DriverError::framing("missing terminator"))
}

/// Parse a stream of back-to-back frames.
pub fn parse_all(bytes: &[u8], format: WireFormat) -> Result<Vec<Command>> {
    let mut parser = Parser::new(format);
    let mut commands = Vec::new();
    for &byte in bytes {
        if let Some(command) = parser.feed(byte)? {
            commands.push(command);
        }
    }
    match parser.state() {
        ParseState::ExpectDevice | ParseState::Done => Ok(commands),
        _ => Err(DriverError::framing("stream ends inside a frame")),
    }
}

fn decode_text(device: u8, opcode: &[u8], payload: &[u8]) -> Result<Command> {
    match (device, opcode) {
        (DAC_INDICATOR, [DAC_START]) => match payload {
            [polarity, gain] => Ok(Command::DacInit {
                polarity: PolarityMode::from_wire_code(*polarity)?,
                gain: GainMode::from_wire_code(*gain)?,
            }),
            _ => Err(length_error("DAC start", 2, payload.len())),
        },
        (DAC_INDICATOR, [DAC_WRITE]) => match payload.split_first() {
            Some((address, digits)) => Ok(Command::DacWrite {
                address: DeviceAddress::from_wire_code(*address)?,
                word: parse_decimal::<u16>(digits)?,
            }),
            None => Err(DriverError::framing("DAC write without address")),
        },
        (DAC_INDICATOR, [DAC_READ]) => match payload {
            [address] => Ok(Command::DacRead {
                address: DeviceAddress::from_wire_code(*address)?,
            }),
            _ => Err(length_error("DAC read", 1, payload.len())),
        },
        (DDS_INDICATOR, [DDS_OUTPUT, DDS_SINGLE_TONE]) => {
            Ok(Command::DdsSingleTone(text_tone(payload)?))
        }
        (DDS_INDICATOR, [DDS_OUTPUT, DDS_RAMP, DDS_RAMP_PARAMETERS]) => {
            Ok(Command::DdsRampParameters(text_tone(payload)?))
        }
        (DDS_INDICATOR, [DDS_OUTPUT, DDS_RAMP, DDS_RAMP_SETUP]) => {
            let (code, rest) = payload
                .split_first()
                .ok_or_else(|| DriverError::framing("ramp setup without parameter"))?;
            let fields = split_fields(rest, 6)?;
            Ok(Command::DdsRampSetup(RampWords {
                parameter: RampParameter::from_wire_code(*code)?,
                start: parse_decimal(fields[0])?,
                stop: parse_decimal(fields[1])?,
                decrement: parse_decimal(fields[2])?,
                increment: parse_decimal(fields[3])?,
                negative_rate: parse_decimal(fields[4])?,
                positive_rate: parse_decimal(fields[5])?,
            }))
        }
        _ => decode_empty(device, opcode, payload),
    }
}

fn decode_binary(device: u8, opcode: &[u8], payload: &[u8]) -> Result<Command> {
    match (device, opcode) {
        (DAC_INDICATOR, [DAC_WRITE]) => match payload {
            [address, hi, lo] => Ok(Command::DacWrite {
                address: DeviceAddress::from_wire_code(*address)?,
                word: u16::from_be_bytes([*hi, *lo]),
            }),
            _ => Err(length_error("DAC write", 3, payload.len())),
        },
        (DDS_INDICATOR, [DDS_OUTPUT, DDS_SINGLE_TONE]) => {
            Ok(Command::DdsSingleTone(binary_tone(payload)?))
        }
        (DDS_INDICATOR, [DDS_OUTPUT, DDS_RAMP, DDS_RAMP_PARAMETERS]) => {
            Ok(Command::DdsRampParameters(binary_tone(payload)?))
        }
        (DDS_INDICATOR, [DDS_OUTPUT, DDS_RAMP, DDS_RAMP_SETUP]) => {
            if payload.len() != 21 {
                return Err(length_error("ramp setup", 21, payload.len()));
            }
            Ok(Command::DdsRampSetup(RampWords {
                parameter: RampParameter::from_wire_code(payload[0])?,
                start: be_u32(&payload[1..5]),
                stop: be_u32(&payload[5..9]),
                decrement: be_u32(&payload[9..13]),
                increment: be_u32(&payload[13..17]),
                negative_rate: u16::from_be_bytes([payload[17], payload[18]]),
                positive_rate: u16::from_be_bytes([payload[19], payload[20]]),
            }))
        }
        // init and read carry single code bytes in both formats
        _ => decode_text(device, opcode, payload),
    }
}

fn decode_empty(device: u8, opcode: &[u8], payload: &[u8]) -> Result<Command> {
    let command = match (device, opcode) {
        (DDS_INDICATOR, [DDS_OUTPUT, DDS_RAMP, DDS_RAMP_DISABLE]) => Command::DdsRampDisable,
        (DDS_INDICATOR, [DDS_LOAD]) => Command::DdsLoad,
        (DDS_INDICATOR, [DDS_RESET]) => Command::DdsReset,
        _ => {
            return Err(DriverError::framing(format!(
                "unknown opcode {:?}",
                String::from_utf8_lossy(opcode)
            )))
        }
    };
    if !payload.is_empty() {
        return Err(length_error("payload-free command", 0, payload.len()));
    }
    Ok(command)
}

fn text_tone(payload: &[u8]) -> Result<ToneWords> {
    let fields = split_fields(payload, 3)?;
    check_amplitude(ToneWords {
        amplitude: parse_decimal(fields[0])?,
        phase: parse_decimal(fields[1])?,
        frequency: parse_decimal(fields[2])?,
    })
}

fn binary_tone(payload: &[u8]) -> Result<ToneWords> {
    match payload {
        [a0, a1, p0, p1, f0, f1, f2, f3] => check_amplitude(ToneWords {
            amplitude: u16::from_be_bytes([*a0, *a1]),
            phase: u16::from_be_bytes([*p0, *p1]),
            frequency: u32::from_be_bytes([*f0, *f1, *f2, *f3]),
        }),
        _ => Err(length_error("tone", 8, payload.len())),
    }
}

fn check_amplitude(tone: ToneWords) -> Result<ToneWords> {
    if u32::from(tone.amplitude) >> DDS_AMPLITUDE_BITS != 0 {
        return Err(DriverError::framing(format!(
            "amplitude word {} exceeds {} bits",
            tone.amplitude, DDS_AMPLITUDE_BITS
        )));
    }
    Ok(tone)
}

fn split_fields(payload: &[u8], count: usize) -> Result<Vec<&[u8]>> {
    let fields: Vec<&[u8]> = payload.split(|&b| b == SEPARATOR).collect();
    if fields.len() != count {
        return Err(DriverError::framing(format!(
            "expected {} fields, got {}",
            count,
            fields.len()
        )));
    }
    Ok(fields)
}

fn parse_decimal<T: std::str::FromStr>(digits: &[u8]) -> Result<T> {
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return Err(DriverError::framing(format!(
            "invalid decimal word {:?}",
            String::from_utf8_lossy(digits)
        )));
    }
    // ascii digits are valid utf-8
    let text = std::str::from_utf8(digits).map_err(|e| DriverError::framing(e.to_string()))?;
    text.parse::<T>()
        .map_err(|_| DriverError::framing(format!("decimal word {} overflows", text)))
}

fn be_u32(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn length_error(what: &str, expected: usize, actual: usize) -> DriverError {
    DriverError::framing(format!(
        "{} payload must be {} bytes, got {}",
        what, expected, actual
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_text_examples() {
        assert_eq!(
            parse(b"Dsb1!", WireFormat::Text).unwrap(),
            Command::DacInit {
                polarity: PolarityMode::Bipolar,
                gain: GainMode::X2
            }
        );
        assert_eq!(
            parse(b"Dwb12832!", WireFormat::Text).unwrap(),
            Command::DacWrite {
                address: DeviceAddress::DacB,
                word: 12832
            }
        );
        assert_eq!(parse(b"dl!", WireFormat::Text).unwrap(), Command::DdsLoad);
        assert_eq!(parse(b"dorx!", WireFormat::Text).unwrap(), Command::DdsRampDisable);
    }

    #[test]
    fn state_walks_through_a_frame() {
        let mut parser = Parser::new(WireFormat::Binary);
        assert_eq!(parser.state(), ParseState::ExpectDevice);
        parser.feed(b'D').unwrap();
        assert_eq!(parser.state(), ParseState::ExpectOpcode);
        parser.feed(b'w').unwrap();
        assert_eq!(parser.state(), ParseState::ReadPayload);
        parser.feed(b'a').unwrap();
        parser.feed(0x12).unwrap();
        parser.feed(0x34).unwrap();
        assert_eq!(parser.state(), ParseState::ExpectTerminator);
        let cmd = parser.feed(b'!').unwrap();
        assert_eq!(parser.state(), ParseState::Done);
        assert_eq!(
            cmd,
            Some(Command::DacWrite {
                address: DeviceAddress::DacA,
                word: 0x1234
            })
        );
    }

    #[test]
    fn binary_payload_may_contain_terminator_byte() {
        let bytes = [b'D', b'w', b'2', 0x21, 0x21, b'!'];
        assert_eq!(
            parse(&bytes, WireFormat::Binary).unwrap(),
            Command::DacWrite {
                address: DeviceAddress::DacBoth,
                word: 0x2121
            }
        );
    }

    #[test]
    fn binary_terminator_mismatch_is_framing_error() {
        let bytes = [b'D', b'w', b'a', 0x80, 0x00, b'?'];
        assert!(matches!(
            parse(&bytes, WireFormat::Binary),
            Err(DriverError::Framing(_))
        ));
    }

    #[test]
    fn rejects_malformed_text() {
        let framing = |bytes: &[u8]| matches!(parse(bytes, WireFormat::Text), Err(DriverError::Framing(_)));
        assert!(framing(b"Dwa12832"));
        assert!(framing(b"Qwa1!"));
        assert!(framing(b"Dqa1!"));
        assert!(framing(b"Dwa!"));
        assert!(framing(b"Dwa12x3!"));
        assert!(framing(b"Dwa99999!"));
        assert!(framing(b"Dsb1!!"));
        assert!(framing(b"dl5!"));
        assert!(framing(b"dos1,2!"));
        assert!(framing(b"dos20000,0,0!"));
        assert!(framing(b"Dsb!"));
    }

    #[test]
    fn unknown_codes_map_to_specific_errors() {
        assert!(matches!(
            parse(b"Dsb7!", WireFormat::Text),
            Err(DriverError::UnsupportedGainMode('7'))
        ));
        assert!(matches!(
            parse(b"Dsq1!", WireFormat::Text),
            Err(DriverError::UnsupportedPolarity('q'))
        ));
        assert!(matches!(
            parse(b"Dwc5!", WireFormat::Text),
            Err(DriverError::UnsupportedAddress('c'))
        ));
        assert!(matches!(
            parse(b"dorsq1,2,0,0,1,1!", WireFormat::Text),
            Err(DriverError::UnsupportedParameter('q'))
        ));
    }

    #[test]
    fn parser_recovers_after_error() {
        let mut parser = Parser::new(WireFormat::Text);
        assert!(parser.feed(b'x').is_err());
        assert_eq!(parser.state(), ParseState::ExpectDevice);
        for &b in b"dl" {
            assert_eq!(parser.feed(b).unwrap(), None);
        }
        assert_eq!(parser.feed(b'!').unwrap(), Some(Command::DdsLoad));
    }

    #[test]
    fn parse_all_splits_stream() {
        let commands = parse_all(b"dorx!dos1,2,3!dl!", WireFormat::Text).unwrap();
        assert_eq!(commands.len(), 3);
        assert_eq!(commands[2], Command::DdsLoad);
        assert!(parse_all(b"dl!dos1", WireFormat::Text).is_err());
    }
}
