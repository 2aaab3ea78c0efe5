//! Device identity derivation.
//!
//! The identity names the device in discovery topics and payloads. It is the
//! configured override when one is set, otherwise `esp32-bme280-XXXXXX` built
//! from the last three bytes of the station MAC address.

use once_cell::sync::OnceCell;

/// Derive a device identifier from the configured name or the station MAC.
pub fn derive_device_id(configured: &str, mac: &[u8; 6]) -> String {
    if !configured.is_empty() {
        return configured.to_string();
    }
    format!("esp32-bme280-{:02X}{:02X}{:02X}", mac[3], mac[4], mac[5])
}

/// Set-once holder for the identity: computed on first access, immutable
/// afterwards even if later callers pass different inputs.
pub struct DeviceIdentity {
    id: OnceCell<String>,
}

impl DeviceIdentity {
    pub const fn new() -> Self {
        DeviceIdentity { id: OnceCell::new() }
    }

    pub fn get_or_derive(&self, configured: &str, mac: &[u8; 6]) -> &str {
        self.id.get_or_init(|| derive_device_id(configured, mac))
    }
}

impl Default for DeviceIdentity {
    fn default() -> Self {
        Self::new()
    }
}
