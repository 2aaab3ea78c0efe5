//! Compile-time configuration.
//!
//! Values come from the build environment (`WIFI_SSID=... cargo build`);
//! anything unset falls back to the library defaults. Credentials left empty
//! disable the corresponding feature rather than failing the build.

use esp32_bme280_mqtt::config::Config;

pub fn load() -> Config {
    let defaults = Config::default();

    Config {
        wifi_ssid: option_env!("WIFI_SSID").unwrap_or("").to_string(),
        wifi_password: option_env!("WIFI_PASS").unwrap_or("").to_string(),
        mqtt_uri: option_env!("MQTT_URI")
            .map(str::to_string)
            .unwrap_or(defaults.mqtt_uri),
        mqtt_username: option_env!("MQTT_USERNAME").unwrap_or("").to_string(),
        mqtt_password: option_env!("MQTT_PASSWORD").unwrap_or("").to_string(),
        state_topic: option_env!("MQTT_STATE_TOPIC")
            .map(str::to_string)
            .unwrap_or(defaults.state_topic),
        discovery_enable: option_env!("HA_DISCOVERY_ENABLE")
            .map(|value| value != "0")
            .unwrap_or(defaults.discovery_enable),
        discovery_prefix: option_env!("HA_DISCOVERY_PREFIX")
            .map(str::to_string)
            .unwrap_or(defaults.discovery_prefix),
        device_name: option_env!("DEVICE_NAME").unwrap_or("").to_string(),
    }
}
