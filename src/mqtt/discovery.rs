//! Home Assistant MQTT discovery announcements.
//!
//! One retained config message per measurement class, published on every
//! successful connect so a restarted broker or Home Assistant instance picks
//! the sensors back up. Payloads are rendered into bounded buffers; a payload
//! that does not fit is skipped, never truncated.
//!
//! Reference: https://www.home-assistant.io/integrations/mqtt/#mqtt-discovery

use core::fmt::Write;

use heapless::String;
use log::{info, warn};

use super::client::{PublishClient, QoS};

pub const DEVICE_MODEL: &str = "BME280";
pub const DEVICE_MANUFACTURER: &str = "Bosch";

/// Buffer sizes for a rendered discovery topic and payload.
pub const DISCOVERY_TOPIC_LEN: usize = 160;
pub const DISCOVERY_PAYLOAD_LEN: usize = 1024;

/// Template for one measurement class announcement.
pub struct Descriptor {
    /// Home Assistant device class, also the key in the state JSON.
    pub class: &'static str,
    /// Title appended to the device name, e.g. "Temperature".
    pub title: &'static str,
    /// Unit of measurement string.
    pub unit: &'static str,
}

pub const DESCRIPTORS: [Descriptor; 3] = [
    Descriptor {
        class: "temperature",
        title: "Temperature",
        unit: "°C",
    },
    Descriptor {
        class: "pressure",
        title: "Pressure",
        unit: "hPa",
    },
    Descriptor {
        class: "humidity",
        title: "Humidity",
        unit: "%",
    },
];

/// Build `<prefix>/sensor/<device_id>_<class>/config`.
pub fn discovery_topic(
    prefix: &str,
    device_id: &str,
    class: &str,
) -> Result<String<DISCOVERY_TOPIC_LEN>, core::fmt::Error> {
    let mut topic: String<DISCOVERY_TOPIC_LEN> = String::new();
    write!(topic, "{}/sensor/{}_{}/config", prefix, device_id, class)?;
    Ok(topic)
}

/// Render the announcement JSON for one class. Field order is fixed; some
/// consumers diff the raw bytes of retained configs.
pub fn render_announcement(
    descriptor: &Descriptor,
    device_id: &str,
    device_name: &str,
    state_topic: &str,
) -> Result<String<DISCOVERY_PAYLOAD_LEN>, core::fmt::Error> {
    let mut payload: String<DISCOVERY_PAYLOAD_LEN> = String::new();
    write!(payload, "{{\"name\":\"{} {}\",", device_name, descriptor.title)?;
    write!(payload, "\"uniq_id\":\"{}_{}\",", device_id, descriptor.class)?;
    write!(payload, "\"stat_t\":\"{}\",", state_topic)?;
    write!(payload, "\"unit_of_meas\":\"{}\",", descriptor.unit)?;
    write!(payload, "\"dev_cla\":\"{}\",", descriptor.class)?;
    write!(
        payload,
        "\"val_tpl\":\"{{{{ value_json.{} }}}}\",",
        descriptor.class
    )?;
    write!(
        payload,
        "\"dev\":{{\"ids\":[\"{}\"],\"name\":\"{}\",\"mdl\":\"{}\",\"mf\":\"{}\"}}}}",
        device_id, device_name, DEVICE_MODEL, DEVICE_MANUFACTURER
    )?;
    Ok(payload)
}

/// Announces all measurement classes for one device. Built once at startup;
/// the session fires it on every connect.
pub struct Announcer {
    device_id: std::string::String,
    device_name: std::string::String,
    prefix: std::string::String,
    state_topic: std::string::String,
}

impl Announcer {
    pub fn new(device_id: &str, prefix: &str, state_topic: &str) -> Self {
        Announcer {
            device_id: device_id.to_string(),
            device_name: format!("sensor {}", device_id),
            prefix: prefix.to_string(),
            state_topic: state_topic.to_string(),
        }
    }

    /// Publish one retained QoS 1 announcement per descriptor. Failures are
    /// logged and skipped; discovery is metadata, not telemetry.
    pub fn announce<C: PublishClient>(&self, client: &C) {
        info!("mqtt: publishing discovery announcements");

        for descriptor in &DESCRIPTORS {
            let topic = match discovery_topic(&self.prefix, &self.device_id, descriptor.class) {
                Ok(topic) => topic,
                Err(_) => {
                    warn!(
                        "mqtt: discovery topic for '{}' overflows buffer, skipping",
                        descriptor.class
                    );
                    continue;
                }
            };

            let payload = match render_announcement(
                descriptor,
                &self.device_id,
                &self.device_name,
                &self.state_topic,
            ) {
                Ok(payload) => payload,
                Err(_) => {
                    warn!(
                        "mqtt: discovery payload for '{}' overflows buffer, skipping",
                        descriptor.class
                    );
                    continue;
                }
            };

            match client.publish(topic.as_str(), payload.as_bytes(), QoS::AtLeastOnce, true) {
                Ok(id) if id >= 0 => {
                    info!("mqtt: discovery for '{}' published", descriptor.class)
                }
                Ok(_) => warn!("mqtt: discovery for '{}' rejected", descriptor.class),
                Err(e) => warn!(
                    "mqtt: discovery publish for '{}' failed: {}",
                    descriptor.class, e
                ),
            }
        }
    }
}
