use dac_dds_protocol::{
    parse_all, Command, DacConfig, DeviceAddress, DeviceDriver, DriverConfig, DriverError, GainMode,
    MemoryTransport, PolarityMode, RampParameter, RampParameters, WireFormat,
};

fn driver(format: WireFormat) -> DeviceDriver<MemoryTransport> {
    let config = DriverConfig {
        wire_format: format,
        ..DriverConfig::default()
    };
    DeviceDriver::with_transport(MemoryTransport::new(), config)
}

fn frequency_ramp() -> RampParameters {
    RampParameters {
        parameter: RampParameter::Frequency,
        start: 1e6,
        stop: 2e6,
        decrement_step: 100.0,
        increment_step: 100.0,
        negative_rate: 1e-6,
        positive_rate: 1e-6,
    }
}

#[test]
fn dac_settings_change_reinitializes_and_zeroes_both_outputs() {
    let mut d = driver(WireFormat::Text);
    let config = DacConfig::new(2.5, GainMode::X2, PolarityMode::Bipolar).unwrap();
    d.apply_dac_config(config).unwrap();
    assert_eq!(d.transport().written, b"Dsb1!Dw232768!".to_vec());
}

#[test]
fn unipolar_zero_is_word_zero() {
    let mut d = driver(WireFormat::Text);
    let config = DacConfig::new(2.5, GainMode::X4, PolarityMode::Unipolar).unwrap();
    d.apply_dac_config(config).unwrap();
    assert_eq!(d.transport().written, b"Dsu2!Dw20!".to_vec());
}

#[test]
fn three_volts_on_channel_b() {
    let mut d = driver(WireFormat::Text);
    d.send_voltage(DeviceAddress::DacB, 3.0).unwrap();
    assert_eq!(d.transport().written, b"Dwb52428!".to_vec());
}

#[test]
fn single_tone_sequence() {
    let mut d = driver(WireFormat::Text);
    let tone = d.tone(0.5, 90.0, (1u64 << 28) as f64);
    d.program_single_tone(&tone).unwrap();
    assert_eq!(
        d.transport().written,
        b"dorx!dos8192,16384,1073741824!dl!".to_vec()
    );
}

#[test]
fn ramp_sequence_parses_back() {
    for format in [WireFormat::Text, WireFormat::Binary] {
        let mut d = driver(format);
        let tone = d.tone(0.25, 0.0, 0.0);
        d.program_ramp(&frequency_ramp(), &tone).unwrap();

        let commands = parse_all(&d.transport().written, format).unwrap();
        assert_eq!(commands.len(), 3);
        assert!(matches!(commands[0], Command::DdsRampSetup(w) if w.parameter == RampParameter::Frequency));
        assert!(matches!(commands[1], Command::DdsRampParameters(w) if w.amplitude == 4096));
        assert_eq!(commands[2], Command::DdsLoad);
        assert_eq!(d.history().count(), 3);
    }
}

#[test]
fn invalid_ramp_sends_nothing() {
    let mut d = driver(WireFormat::Text);
    let tone = d.tone(0.25, 0.0, 0.0);
    let mut ramp = frequency_ramp();
    ramp.start = 10.0;
    ramp.stop = 5.0;
    let err = d.program_ramp(&ramp, &tone).unwrap_err();
    assert!(matches!(err, DriverError::InvalidRampBounds { .. }));
    assert!(d.transport().written.is_empty());
}

#[test]
fn every_driver_frame_is_terminated() {
    let mut d = driver(WireFormat::Text);
    d.reset().unwrap();
    d.send_initialization().unwrap();
    d.request_readback(DeviceAddress::DacA).unwrap();
    d.disable_ramp().unwrap();
    for sent in d.history() {
        assert_eq!(sent.bytes.last(), Some(&b'!'));
        assert_eq!(sent.bytes.iter().filter(|&&b| b == b'!').count(), 1);
    }
    assert_eq!(d.transport().written, b"dX!Dsb1!Dra!dorx!".to_vec());
}

#[test]
fn binary_voltage_frame() {
    let mut d = driver(WireFormat::Binary);
    d.send_voltage(DeviceAddress::DacA, 0.0).unwrap();
    assert_eq!(d.transport().written, vec![b'D', b'w', b'a', 0x80, 0x00, b'!']);
    assert_eq!(d.last_sent().unwrap().display(), "Dwa\\x80\\x00!");
}
