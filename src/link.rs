//! Link manager: event-driven Wi-Fi station supervision.
//!
//! The platform glue routes its station events into [`LinkMonitor`]. The
//! monitor keeps the "address acquired" readiness flag honest and re-requests
//! association whenever the link drops. There is no backoff and no retry cap
//! here: the ESP-IDF Wi-Fi stack paces its own retries, so the reaction is a
//! plain fire-and-forget reconnect.

use std::sync::Arc;

use log::{info, warn};

use crate::signal::ReadinessSignal;

/// Fire-and-forget association request into the station driver.
pub trait StationControl {
    fn request_association(&self);
}

/// Reactions to station lifecycle events plus the blocking wait the
/// initialization path uses.
pub struct LinkMonitor<C: StationControl> {
    signal: Arc<ReadinessSignal>,
    control: C,
}

impl<C: StationControl> LinkMonitor<C> {
    pub fn new(signal: Arc<ReadinessSignal>, control: C) -> Self {
        LinkMonitor { signal, control }
    }

    /// The station interface came up; ask for association right away.
    pub fn on_association_started(&self) {
        info!("link: station started, requesting association");
        self.control.request_association();
    }

    /// The link dropped. The address flag is cleared before the reconnect
    /// request goes out, so a blocked publisher can never observe a stale
    /// lease as ready.
    pub fn on_disassociated(&self) {
        warn!("link: disassociated, reconnecting");
        self.signal.clear_address();
        self.control.request_association();
    }

    /// DHCP handed out a lease; the link is usable.
    pub fn on_address_acquired(&self) {
        info!("link: address lease acquired");
        self.signal.set_address();
    }

    /// Block the caller until an address lease is held.
    pub fn wait_for_address(&self) {
        self.signal.wait_for_address(None);
    }
}
