//! Wi-Fi station bring-up and event glue.
//!
//! One-time initialization (NVS, event loop, driver, STA configuration) is
//! fatal on failure. After `start()`, reconnect handling is entirely the
//! core `LinkMonitor`'s job: the event subscriptions below just route the
//! system events into it, and the ESP-IDF stack paces the actual retries.

use std::sync::Arc;

use esp_idf_svc::eventloop::{EspSubscription, EspSystemEventLoop, System};
use esp_idf_svc::netif::IpEvent;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{ClientConfiguration, Configuration, EspWifi, WifiDeviceId, WifiEvent};
use log::{info, warn};

use esp32_bme280_mqtt::config::Config;
use esp32_bme280_mqtt::error::LinkError;
use esp32_bme280_mqtt::link::{LinkMonitor, StationControl};
use esp32_bme280_mqtt::signal::ReadinessSignal;

/// Fire-and-forget association request straight into the driver. Called from
/// the event dispatch task; a failed call just means the next disconnect
/// event retriggers it.
pub struct EspStationControl;

impl StationControl for EspStationControl {
    fn request_association(&self) {
        let err = unsafe { esp_idf_svc::sys::esp_wifi_connect() };
        if err != esp_idf_svc::sys::ESP_OK {
            warn!("wifi: esp_wifi_connect failed: {}", err);
        }
    }
}

/// The running station. Holds the driver and the event subscriptions alive
/// for the process lifetime; there is no shutdown path.
pub struct Station {
    mac: [u8; 6],
    _wifi: EspWifi<'static>,
    _wifi_events: EspSubscription<'static, System>,
    _ip_events: EspSubscription<'static, System>,
}

impl Station {
    pub fn mac(&self) -> [u8; 6] {
        self.mac
    }
}

fn fatal(e: impl std::fmt::Display) -> LinkError {
    LinkError::Init(e.to_string())
}

/// Initialize the station and block until the first address lease.
pub fn init_station_blocking(
    modem: esp_idf_hal::modem::Modem,
    config: &Config,
    signal: Arc<ReadinessSignal>,
) -> Result<Station, LinkError> {
    info!("wifi: initializing station for SSID '{}'", config.wifi_ssid);

    let sysloop = EspSystemEventLoop::take().map_err(fatal)?;
    let nvs = EspDefaultNvsPartition::take().map_err(fatal)?;
    let mut wifi = EspWifi::new(modem, sysloop.clone(), Some(nvs)).map_err(fatal)?;

    let client_config = ClientConfiguration {
        ssid: config
            .wifi_ssid
            .as_str()
            .try_into()
            .map_err(|_| LinkError::Init("SSID too long".to_string()))?,
        password: config
            .wifi_password
            .as_str()
            .try_into()
            .map_err(|_| LinkError::Init("passphrase too long".to_string()))?,
        ..Default::default()
    };
    wifi.set_configuration(&Configuration::Client(client_config))
        .map_err(fatal)?;

    let mac = wifi.driver().get_mac(WifiDeviceId::Sta).map_err(fatal)?;

    let monitor = Arc::new(LinkMonitor::new(signal, EspStationControl));

    let wifi_monitor = Arc::clone(&monitor);
    let wifi_events = sysloop
        .subscribe::<WifiEvent, _>(move |event| match event {
            WifiEvent::StaStarted => wifi_monitor.on_association_started(),
            WifiEvent::StaDisconnected(_) => wifi_monitor.on_disassociated(),
            _ => (),
        })
        .map_err(fatal)?;

    let ip_monitor = Arc::clone(&monitor);
    let ip_events = sysloop
        .subscribe::<IpEvent, _>(move |event| {
            if matches!(event, IpEvent::DhcpIpAssigned(_)) {
                ip_monitor.on_address_acquired();
            }
        })
        .map_err(fatal)?;

    wifi.start().map_err(fatal)?;

    info!("wifi: started, waiting for address lease");
    monitor.wait_for_address();
    info!("wifi: link up");

    Ok(Station {
        mac,
        _wifi: wifi,
        _wifi_events: wifi_events,
        _ip_events: ip_events,
    })
}
