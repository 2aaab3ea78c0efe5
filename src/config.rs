//! Bridge configuration surface.
//!
//! Every recognized option in one struct, filled in by the firmware from its
//! compile-time environment and passed by reference to the components that
//! need it. Defaults mirror a typical home deployment.

/// Configuration for the Wi-Fi link, the MQTT session, and discovery.
#[derive(Clone, Debug)]
pub struct Config {
    /// Wi-Fi network name.
    pub wifi_ssid: String,
    /// Wi-Fi passphrase.
    pub wifi_password: String,
    /// MQTT broker endpoint, e.g. `mqtt://192.168.1.10:1883`.
    pub mqtt_uri: String,
    /// MQTT username; empty means no authentication.
    pub mqtt_username: String,
    /// MQTT password; only used when a username is set.
    pub mqtt_password: String,
    /// Topic the measurement JSON is published to.
    pub state_topic: String,
    /// Publish Home Assistant discovery announcements on every connect.
    pub discovery_enable: bool,
    /// Discovery topic prefix, `homeassistant` unless the broker is set up
    /// with a custom one.
    pub discovery_prefix: String,
    /// Device name override; empty means derive the identity from the
    /// station MAC address.
    pub device_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            wifi_ssid: String::new(),
            wifi_password: String::new(),
            mqtt_uri: "mqtt://localhost:1883".to_string(),
            mqtt_username: String::new(),
            mqtt_password: String::new(),
            state_topic: "esp32-bme280/state".to_string(),
            discovery_enable: true,
            discovery_prefix: "homeassistant".to_string(),
            device_name: String::new(),
        }
    }
}

impl Config {
    /// Credentials are passed through only when both sides are non-empty
    /// enough to matter; an empty username disables authentication entirely.
    pub fn mqtt_credentials(&self) -> Option<(&str, &str)> {
        if self.mqtt_username.is_empty() {
            None
        } else {
            Some((self.mqtt_username.as_str(), self.mqtt_password.as_str()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.discovery_enable);
        assert_eq!(config.discovery_prefix, "homeassistant");
        assert_eq!(config.state_topic, "esp32-bme280/state");
        assert!(config.device_name.is_empty());
    }

    #[test]
    fn test_credentials_passthrough() {
        let mut config = Config::default();
        assert!(config.mqtt_credentials().is_none());

        config.mqtt_username = "sensor".to_string();
        config.mqtt_password = "hunter2".to_string();
        assert_eq!(config.mqtt_credentials(), Some(("sensor", "hunter2")));

        config.mqtt_password.clear();
        assert_eq!(config.mqtt_credentials(), Some(("sensor", "")));
    }
}
