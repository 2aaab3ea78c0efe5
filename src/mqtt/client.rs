//! Publish abstraction decoupling the session logic from a concrete MQTT
//! client crate, so the core runs against the ESP-IDF client on target and
//! mocks on the host.

use core::fmt;

use log::info;

/// MQTT delivery guarantee level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QoS {
    /// QoS 0 — best effort
    AtMostOnce,
    /// QoS 1 — at least once
    AtLeastOnce,
    /// QoS 2 — exactly once
    ExactlyOnce,
}

impl QoS {
    pub fn from_level(level: u8) -> Option<QoS> {
        match level {
            0 => Some(QoS::AtMostOnce),
            1 => Some(QoS::AtLeastOnce),
            2 => Some(QoS::ExactlyOnce),
            _ => None,
        }
    }

    pub fn level(self) -> u8 {
        match self {
            QoS::AtMostOnce => 0,
            QoS::AtLeastOnce => 1,
            QoS::ExactlyOnce => 2,
        }
    }
}

/// Minimal publish interface. A send is accepted when the client assigns a
/// non-negative message identifier; nothing here waits for delivery beyond
/// what the QoS level implies inside the client.
pub trait PublishClient {
    type Error: fmt::Display;

    fn publish(
        &self,
        topic: &str,
        payload: &[u8],
        qos: QoS,
        retain: bool,
    ) -> Result<i32, Self::Error>;
}

/// Log-only publisher for bring-up without a broker.
pub struct LoggerPublisher;

impl PublishClient for LoggerPublisher {
    type Error = core::convert::Infallible;

    fn publish(
        &self,
        topic: &str,
        payload: &[u8],
        qos: QoS,
        retain: bool,
    ) -> Result<i32, Self::Error> {
        info!(
            "mqtt(LOG): topic='{}' len={} qos={} retain={}",
            topic,
            payload.len(),
            qos.level(),
            retain
        );
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qos_level_round_trip() {
        for level in 0..=2 {
            assert_eq!(QoS::from_level(level).unwrap().level(), level);
        }
        assert!(QoS::from_level(3).is_none());
    }

    #[test]
    fn test_logger_publisher_accepts() {
        let publisher = LoggerPublisher;
        let id = publisher
            .publish("t", b"{}", QoS::AtMostOnce, false)
            .unwrap();
        assert!(id >= 0);
    }
}
