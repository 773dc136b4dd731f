//! Hydrajoy - Main Application
//!
//! Creates a virtual joystick fed by the motion controllers of the first
//! connected base station, at 50 Hz, until interrupted with Ctrl+C.

use hydrajoy::device::LinuxUinputBackend;
use hydrajoy::source::SixenseLibrary;
use hydrajoy::{Bridge, Config};
use log::info;
use std::sync::atomic::Ordering;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Start");

    // A missing or broken config file only ever yields the built-in defaults
    let config = Config::load_default();

    let mut bridge = Bridge::new(SixenseLibrary::new(), LinuxUinputBackend::new(), config.settings);

    let running = bridge.running_flag();
    ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))?;

    // Startup failures are already logged and torn down; exit status stays 0
    if bridge.run().is_ok() {
        info!("End");
    }

    Ok(())
}
