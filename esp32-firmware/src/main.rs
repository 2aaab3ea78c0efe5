//! ESP-IDF glue for the BME280-to-MQTT bridge.
//!
//! Bring-up order matches the contract of the core crate: the Wi-Fi station
//! comes up and blocks until the first DHCP lease, the MQTT session starts
//! and blocks until the first connect, then the sampling loop runs forever.
//! Any error before the loop is fatal; the process fails loud and stops
//! rather than running without connectivity.

use std::sync::Arc;

use anyhow::Result;
use esp_idf_hal::peripherals::Peripherals;
use log::info;

use esp32_bme280_mqtt::identity::DeviceIdentity;
use esp32_bme280_mqtt::signal::ReadinessSignal;

mod mqtt;
mod sensor;
mod settings;
mod wifi;

fn main() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    info!("main: esp32-bme280 bridge starting");

    let peripherals = Peripherals::take()?;
    let config = settings::load();
    let signal = Arc::new(ReadinessSignal::new());
    let identity = DeviceIdentity::new();

    let station = wifi::init_station_blocking(peripherals.modem, &config, Arc::clone(&signal))?;

    let device_id = identity.get_or_derive(&config.device_name, &station.mac());
    info!("main: device identity '{}'", device_id);

    let session = mqtt::start_session_blocking(&config, device_id, signal)?;

    sensor::run_sampling_loop(
        peripherals.i2c0,
        peripherals.pins.gpio5,
        peripherals.pins.gpio6,
        &config.state_topic,
        &session,
    )
}
