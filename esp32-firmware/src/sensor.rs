//! BME280 sampling loop.
//!
//! Forced-mode one-shot measurements over I2C (SDA GPIO5, SCL GPIO6,
//! address 0x76), one reading every 5 seconds, published QoS 1 to the state
//! topic. `publish_blocking` absorbs connectivity gaps, so the loop itself
//! never has to care about the link.

use anyhow::{anyhow, Result};
use bme280::i2c::BME280;
use esp_idf_hal::delay::{Delay, FreeRtos};
use esp_idf_hal::gpio::{Gpio5, Gpio6};
use esp_idf_hal::i2c::{I2cConfig, I2cDriver, I2C0};
use esp_idf_hal::units::FromValueType;
use log::{error, info, warn};

use esp32_bme280_mqtt::measurement::Reading;
use esp32_bme280_mqtt::mqtt::QoS;

use crate::mqtt::BridgeSession;

const SAMPLE_INTERVAL_MS: u32 = 5_000;

pub fn run_sampling_loop(
    i2c: I2C0,
    sda: Gpio5,
    scl: Gpio6,
    state_topic: &str,
    session: &BridgeSession,
) -> Result<()> {
    let i2c_config = I2cConfig::new().baudrate(100.kHz().into());
    let i2c = I2cDriver::new(i2c, sda, scl, &i2c_config)?;

    let mut delay = Delay::new_default();
    let mut sensor = BME280::new_primary(i2c);
    sensor
        .init(&mut delay)
        .map_err(|e| anyhow!("BME280 init failed: {:?}", e))?;

    info!("sensor: BME280 initialized, sampling every {}ms", SAMPLE_INTERVAL_MS);

    loop {
        match sensor.measure(&mut delay) {
            Ok(measurements) => {
                let reading = Reading {
                    temperature: measurements.temperature,
                    pressure: measurements.pressure,
                    humidity: measurements.humidity,
                };

                match reading.state_payload() {
                    Ok(payload) => {
                        if let Err(e) = session.publish_blocking(
                            state_topic,
                            payload.as_bytes(),
                            QoS::AtLeastOnce,
                            false,
                        ) {
                            warn!("sensor: publish failed: {}", e);
                        }
                    }
                    Err(_) => error!("sensor: state payload overflows buffer"),
                }
            }
            Err(e) => error!("sensor: read failed: {:?}", e),
        }

        FreeRtos::delay_ms(SAMPLE_INTERVAL_MS);
    }
}
