//! Protocol constants for the Arduino DAC/DDS command link.
//!
//! This is the single definition of every wire code used by both the
//! command builders and the parser, together with the codec bit widths and
//! the serial port configuration.

/// Device indicator for the AD5722/AD5732/AD5752 DAC
pub const DAC_INDICATOR: u8 = b'D';

/// Device indicator for the AD9910 DDS
pub const DDS_INDICATOR: u8 = b'd';

/// Terminates every command
pub const DONE: u8 = b'!';

/// Separates decimal words inside a text payload
pub const SEPARATOR: u8 = b',';

// DAC opcodes

/// Start (setup) command
pub const DAC_START: u8 = b's';

/// Write a channel register
pub const DAC_WRITE: u8 = b'w';

/// Read a channel register
pub const DAC_READ: u8 = b'r';

/// Channel A address code
pub const DAC_A: u8 = b'a';

/// Channel B address code
pub const DAC_B: u8 = b'b';

/// Both channels address code
pub const DAC_BOTH: u8 = b'2';

/// Bipolar output range, symmetric around 0 V
pub const DAC_BIPOLAR: u8 = b'b';

/// Unipolar output range, 0 V upwards
pub const DAC_UNIPOLAR: u8 = b'u';

/// Output gain of 2
pub const DAC_GAIN_2: u8 = b'1';

/// Output gain of 4
pub const DAC_GAIN_4: u8 = b'2';

/// Output gain of 4.32
pub const DAC_GAIN_432: u8 = b'3';

// DDS opcodes

/// Prefix for programming an output mode
pub const DDS_OUTPUT: u8 = b'o';

/// Single tone output mode
pub const DDS_SINGLE_TONE: u8 = b's';

/// Digital ramp generator output mode
pub const DDS_RAMP: u8 = b'r';

/// DRG setup sub-command
pub const DDS_RAMP_SETUP: u8 = b's';

/// DRG amplitude/phase/frequency sub-command
pub const DDS_RAMP_PARAMETERS: u8 = b'p';

/// DRG disable sub-command
pub const DDS_RAMP_DISABLE: u8 = b'x';

/// Move buffered registers into the active registers
pub const DDS_LOAD: u8 = b'l';

/// Software reset to the firmware defaults
pub const DDS_RESET: u8 = b'X';

/// Ramp the frequency tuning word
pub const DDS_FREQUENCY: u8 = b'f';

/// Ramp the phase offset word
pub const DDS_PHASE: u8 = b'p';

/// Ramp the amplitude scale factor
pub const DDS_AMPLITUDE: u8 = b'a';

// Codec widths

/// Effective resolution of the DAC
pub const DAC_BITS: u32 = 14;

/// Width of the DAC data register the word is left-justified into
pub const DAC_MAX_BITS: u32 = 16;

/// Amplitude scale factor width
pub const DDS_AMPLITUDE_BITS: u32 = 14;

/// Phase offset word width
pub const DDS_PHASE_BITS: u32 = 16;

/// Frequency tuning word width
pub const DDS_FREQUENCY_BITS: u32 = 32;

/// DRG step-interval word width
pub const DDS_RATE_BITS: u32 = 16;

/// DRG timer ticks once every this many sysclk cycles
pub const DDS_RATE_SYSCLK_DIVIDER: f64 = 4.0;

/// Phase full scale in degrees
pub const FULL_CIRCLE_DEGREES: f64 = 360.0;

/// Lowest supported DAC reference voltage (volts)
pub const MIN_REFERENCE_VOLTAGE: f64 = 2.0;

/// Highest supported DAC reference voltage (volts)
pub const MAX_REFERENCE_VOLTAGE: f64 = 3.0;

// Serial configuration

/// Baud rate the firmware listens at
pub const BAUD_RATE: u32 = 9600;

/// Read timeout in milliseconds
pub const TIMEOUT_MS: u64 = 2000;

/// Number of transmitted commands kept in the driver history
pub const HISTORY_LEN: usize = 64;
