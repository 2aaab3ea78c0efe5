//! Connectivity and publishing core for the BME280-to-MQTT bridge.
//!
//! This crate is platform-independent: the Wi-Fi and MQTT drivers are reached
//! through the small [`link::StationControl`] and [`mqtt::PublishClient`]
//! traits, and the event reactions are plain methods the platform glue calls
//! from its own event dispatch. The ESP-IDF binary lives in the
//! `esp32-firmware` directory, excluded from the workspace because it needs
//! the ESP toolchain.

pub mod config;
pub mod error;
pub mod identity;
pub mod link;
pub mod measurement;
pub mod mqtt;
pub mod signal;

pub mod prelude {
    pub use crate::{
        config::Config,
        error::{LinkError, SessionError},
        identity::DeviceIdentity,
        link::{LinkMonitor, StationControl},
        measurement::Reading,
        mqtt::{Announcer, LoggerPublisher, PublishClient, QoS, Session},
        signal::ReadinessSignal,
    };
}
