//! DDS Tone and Ramp Example
//!
//! Resets the DDS, outputs a single tone, then sweeps frequency with the
//! digital ramp generator.
//!
//! Usage:
//!   cargo run --example dds_tone -- /dev/ttyACM0
//!   cargo run --example dds_tone -- /dev/ttyACM0 binary

use dac_dds_protocol::{DeviceDriver, DriverConfig, RampParameter, RampParameters, Result, WireFormat};
use log::{info, warn};
use std::thread;
use std::time::Duration;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let Some(port_name) = args.next() else {
        eprintln!("usage: dds_tone <port> [text|binary]");
        std::process::exit(2);
    };

    let mut config = DriverConfig::default();
    if args.next().as_deref() == Some("binary") {
        config.wire_format = WireFormat::Binary;
    }

    let mut driver = DeviceDriver::open_with_config(&port_name, config)?;
    thread::sleep(Duration::from_secs(2));

    driver.reset()?;

    let tone = driver.tone(0.8, 0.0, 10e6);
    driver.program_single_tone(&tone)?;
    info!("Single tone at {} Hz", tone.frequency_hz);
    thread::sleep(Duration::from_secs(2));

    let ramp = RampParameters {
        parameter: RampParameter::Frequency,
        start: 5e6,
        stop: 15e6,
        decrement_step: 1e3,
        increment_step: 1e3,
        negative_rate: 1e-6,
        positive_rate: 1e-6,
    };
    match driver.program_ramp(&ramp, &tone) {
        Ok(()) => info!("Ramping {} Hz to {} Hz", ramp.start, ramp.stop),
        Err(e) => warn!("Ramp rejected: {}", e),
    }

    for sent in driver.history() {
        info!("{} {}", sent.timestamp.format("%H:%M:%S%.3f"), sent.display());
    }

    Ok(())
}
