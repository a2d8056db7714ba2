//! DAC Sweep Example
//!
//! Initializes the DAC and steps channel A across its bipolar range,
//! with channel B mirroring it at the opposite sign.
//!
//! Usage:
//!   cargo run --example dac_sweep                  # Interactive mode
//!   cargo run --example dac_sweep -- COM3          # Specify port
//!   cargo run --example dac_sweep -- /dev/ttyACM0
//!
//! Set RUST_LOG=debug to see every frame sent.

use dac_dds_protocol::{DacConfig, DeviceAddress, DeviceDriver, GainMode, PolarityMode, Result};
use inquire::Select;
use log::info;
use std::thread;
use std::time::Duration;

/// Interactive serial port selection using inquire
fn select_port() -> Result<String> {
    let ports = DeviceDriver::list_ports()?;

    if ports.is_empty() {
        eprintln!("No serial ports found!");
        std::process::exit(1);
    }

    let port_names: Vec<String> = ports.into_iter().map(|p| p.port_name).collect();

    let selection = Select::new("Select the driver board port:", port_names)
        .prompt()
        .map_err(|e| std::io::Error::other(format!("Selection cancelled: {}", e)))?;

    Ok(selection)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let port_name = std::env::args()
        .nth(1)
        .map(Ok)
        .unwrap_or_else(select_port)?;

    info!("Connecting to driver board on {}...", port_name);
    let mut driver = DeviceDriver::open(&port_name)?;

    // the board resets when the port opens
    thread::sleep(Duration::from_secs(2));

    let config = DacConfig::new(2.5, GainMode::X2, PolarityMode::Bipolar)?;
    driver.apply_dac_config(config)?;
    let (min, max) = config.voltage_range();

    let steps = 20;
    for i in 0..=steps {
        let volts = min + (max - min) * i as f64 / steps as f64;
        driver.send_voltage(DeviceAddress::DacA, volts)?;
        driver.send_voltage(DeviceAddress::DacB, -volts)?;
        info!("A = {:+.3} V, B = {:+.3} V", volts, -volts);
        thread::sleep(Duration::from_millis(250));
    }

    driver.send_voltage(DeviceAddress::DacBoth, 0.0)?;
    info!("Sent {} frames", driver.history().count());
    Ok(())
}
