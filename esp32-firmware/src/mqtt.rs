//! MQTT session glue: client construction, event dispatch thread, and the
//! `PublishClient` adapter over the ESP-IDF client.

use std::sync::{Arc, Mutex};
use std::thread;

use esp_idf_svc::mqtt::client::{EspMqttClient, EventPayload, MqttClientConfiguration};
use esp_idf_svc::sys::EspError;
use log::{info, warn};

use esp32_bme280_mqtt::config::Config;
use esp32_bme280_mqtt::error::SessionError;
use esp32_bme280_mqtt::mqtt::{PublishClient, QoS, Session};
use esp32_bme280_mqtt::mqtt::discovery::Announcer;
use esp32_bme280_mqtt::signal::ReadinessSignal;

pub type BridgeSession = Session<MqttHandle>;

/// Session handle singleton: written once at startup, shared read-only with
/// the event dispatch thread and the sampling loop.
pub struct MqttHandle(Mutex<EspMqttClient<'static>>);

impl PublishClient for MqttHandle {
    type Error = EspError;

    fn publish(
        &self,
        topic: &str,
        payload: &[u8],
        qos: QoS,
        retain: bool,
    ) -> Result<i32, Self::Error> {
        // enqueue hands the message to the client's own task; it never blocks
        // on the network, so it is safe from the event dispatch thread too.
        let mut client = self.0.lock().unwrap();
        client
            .enqueue(topic, map_qos(qos), retain, payload)
            .map(|id| id as i32)
    }
}

fn map_qos(qos: QoS) -> embedded_svc::mqtt::client::QoS {
    match qos {
        QoS::AtMostOnce => embedded_svc::mqtt::client::QoS::AtMostOnce,
        QoS::AtLeastOnce => embedded_svc::mqtt::client::QoS::AtLeastOnce,
        QoS::ExactlyOnce => embedded_svc::mqtt::client::QoS::ExactlyOnce,
    }
}

/// Build the client, wire its events into the session, and block until the
/// first connect. The client reconnects on its own from then on.
pub fn start_session_blocking(
    config: &Config,
    device_id: &str,
    signal: Arc<ReadinessSignal>,
) -> Result<Arc<BridgeSession>, SessionError> {
    info!("mqtt: connecting to {}", config.mqtt_uri);

    let announcer = if config.discovery_enable {
        Some(Announcer::new(
            device_id,
            &config.discovery_prefix,
            &config.state_topic,
        ))
    } else {
        None
    };
    let session = Arc::new(Session::new(signal, announcer));

    let mut client_config = MqttClientConfiguration {
        client_id: Some(device_id),
        ..Default::default()
    };
    if let Some((username, password)) = config.mqtt_credentials() {
        client_config.username = Some(username);
        client_config.password = Some(password);
    }

    let (client, mut connection) = EspMqttClient::new(&config.mqtt_uri, &client_config)
        .map_err(|e| SessionError::Init(e.to_string()))?;

    // Attach before the dispatch thread runs so the first connected event
    // already finds the handle and can publish discovery.
    session.attach(MqttHandle(Mutex::new(client)))?;

    let dispatch = Arc::clone(&session);
    thread::Builder::new()
        .name("mqtt-events".to_string())
        .spawn(move || {
            while let Ok(event) = connection.next() {
                match event.payload() {
                    EventPayload::Connected(_) => dispatch.on_connected(),
                    EventPayload::Disconnected => dispatch.on_disconnected(),
                    _ => (),
                }
            }
            warn!("mqtt: event stream closed");
        })
        .map_err(|e| SessionError::Init(e.to_string()))?;

    info!("mqtt: waiting for session connect");
    session.wait_connected();
    info!("mqtt: session ready");

    Ok(session)
}
