//! Messaging session layered on the link manager.
//!
//! The session owns the set-once client handle and the "session connected"
//! readiness flag. The underlying client reconnects on its own; this layer
//! only tracks the flag, gates publishes on it, and fires discovery on every
//! connect.

use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use once_cell::sync::OnceCell;

use crate::error::SessionError;
use crate::signal::ReadinessSignal;

use super::client::{PublishClient, QoS};
use super::discovery::Announcer;

pub struct Session<C> {
    signal: Arc<ReadinessSignal>,
    client: OnceCell<C>,
    announcer: Option<Announcer>,
}

impl<C: PublishClient> Session<C> {
    /// `announcer` is `None` when discovery is disabled by configuration.
    pub fn new(signal: Arc<ReadinessSignal>, announcer: Option<Announcer>) -> Self {
        Session {
            signal,
            client: OnceCell::new(),
            announcer,
        }
    }

    /// Store the client handle. Written once at startup, read-only after.
    pub fn attach(&self, client: C) -> Result<(), SessionError> {
        self.client
            .set(client)
            .map_err(|_| SessionError::AlreadyStarted)
    }

    /// Block the caller until the first (or next) successful connect.
    pub fn wait_connected(&self) {
        self.signal.wait_for_session(None);
    }

    /// Attach the client and block until the session handshake completes.
    pub fn start_blocking(&self, client: C) -> Result<(), SessionError> {
        self.attach(client)?;
        info!("mqtt: waiting for session connect");
        self.wait_connected();
        Ok(())
    }

    /// Connected event reaction: raise the flag, then re-announce discovery.
    /// Runs on every connect so a restarted broker gets fresh metadata.
    pub fn on_connected(&self) {
        info!("mqtt: session connected");
        self.signal.set_session();

        if let Some(announcer) = &self.announcer {
            match self.client.get() {
                Some(client) => announcer.announce(client),
                None => warn!("mqtt: connected before client attach, discovery deferred"),
            }
        }
    }

    /// Disconnected event reaction: the flag goes down before the client's
    /// own reconnect can raise it again, so waiters never see stale state.
    pub fn on_disconnected(&self) {
        warn!("mqtt: session disconnected");
        self.signal.clear_session();
    }

    /// Publish one message, waiting out any connectivity gap first. Exactly
    /// one send attempt; a connect racing a drop is accepted best-effort.
    pub fn publish_blocking(
        &self,
        topic: &str,
        payload: &[u8],
        qos: QoS,
        retain: bool,
    ) -> Result<(), SessionError> {
        let client = self.client.get().ok_or(SessionError::NotStarted)?;

        self.signal.wait_for_session(None);

        match client.publish(topic, payload, qos, retain) {
            Ok(id) if id >= 0 => Ok(()),
            Ok(_) => Err(SessionError::Rejected),
            Err(e) => Err(SessionError::Transport(e.to_string())),
        }
    }

    /// Same as [`publish_blocking`](Self::publish_blocking) but gives up
    /// after `timeout`; used by callers that cannot afford an infinite stall.
    pub fn publish_timeout(
        &self,
        topic: &str,
        payload: &[u8],
        qos: QoS,
        retain: bool,
        timeout: Duration,
    ) -> Result<(), SessionError> {
        let client = self.client.get().ok_or(SessionError::NotStarted)?;

        if !self.signal.wait_for_session(Some(timeout)) {
            return Err(SessionError::Transport("connect wait timed out".to_string()));
        }

        match client.publish(topic, payload, qos, retain) {
            Ok(id) if id >= 0 => Ok(()),
            Ok(_) => Err(SessionError::Rejected),
            Err(e) => Err(SessionError::Transport(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Mutex;
    use std::thread;

    /// Client that records publishes and answers with a configurable id.
    struct StubClient {
        next_id: AtomicI32,
        published: Mutex<Vec<(String, Vec<u8>, QoS, bool)>>,
    }

    impl StubClient {
        fn new() -> Self {
            StubClient {
                next_id: AtomicI32::new(1),
                published: Mutex::new(Vec::new()),
            }
        }

        fn with_id(id: i32) -> Self {
            let client = Self::new();
            client.next_id.store(id, Ordering::SeqCst);
            client
        }

        fn count(&self) -> usize {
            self.published.lock().unwrap().len()
        }
    }

    impl PublishClient for StubClient {
        type Error = core::convert::Infallible;

        fn publish(
            &self,
            topic: &str,
            payload: &[u8],
            qos: QoS,
            retain: bool,
        ) -> Result<i32, Self::Error> {
            self.published
                .lock()
                .unwrap()
                .push((topic.to_string(), payload.to_vec(), qos, retain));
            Ok(self.next_id.load(Ordering::SeqCst))
        }
    }

    fn session() -> Session<StubClient> {
        Session::new(Arc::new(ReadinessSignal::new()), None)
    }

    #[test]
    fn test_publish_before_start_is_invalid_state() {
        let session = session();
        assert_eq!(
            session.publish_blocking("t", b"{}", QoS::AtLeastOnce, false),
            Err(SessionError::NotStarted)
        );
    }

    #[test]
    fn test_attach_twice_is_rejected() {
        let session = session();
        session.attach(StubClient::new()).unwrap();
        assert_eq!(
            session.attach(StubClient::new()),
            Err(SessionError::AlreadyStarted)
        );
    }

    #[test]
    fn test_publish_waits_for_connect_then_sends_once() {
        let session = Arc::new(session());
        session.attach(StubClient::new()).unwrap();

        let publisher = Arc::clone(&session);
        let handle = thread::spawn(move || {
            publisher.publish_blocking("home/s1/state", b"{}", QoS::AtLeastOnce, false)
        });

        // Give the publisher time to block on the flag.
        thread::sleep(Duration::from_millis(30));
        assert_eq!(session.client.get().unwrap().count(), 0);

        session.on_connected();
        handle.join().unwrap().unwrap();
        assert_eq!(session.client.get().unwrap().count(), 1);
    }

    #[test]
    fn test_publish_goes_straight_through_when_connected() {
        let session = session();
        session.attach(StubClient::new()).unwrap();
        session.on_connected();

        session
            .publish_blocking("home/s1/state", b"{\"a\":1}", QoS::ExactlyOnce, true)
            .unwrap();

        let published = session.client.get().unwrap().published.lock().unwrap();
        assert_eq!(published.len(), 1);
        let (topic, payload, qos, retain) = &published[0];
        assert_eq!(topic, "home/s1/state");
        assert_eq!(payload, b"{\"a\":1}");
        assert_eq!(*qos, QoS::ExactlyOnce);
        assert!(*retain);
    }

    #[test]
    fn test_negative_message_id_is_rejected() {
        let session = session();
        session.attach(StubClient::with_id(-1)).unwrap();
        session.on_connected();

        assert_eq!(
            session.publish_blocking("t", b"{}", QoS::AtMostOnce, false),
            Err(SessionError::Rejected)
        );
    }

    #[test]
    fn test_disconnect_clears_flag_before_next_connect() {
        let session = session();
        session.attach(StubClient::new()).unwrap();

        session.on_connected();
        assert!(session.signal.session_connected());
        session.on_disconnected();
        assert!(!session.signal.session_connected());
        session.on_connected();
        assert!(session.signal.session_connected());
    }

    #[test]
    fn test_publish_timeout_gives_up_without_connect() {
        let session = session();
        session.attach(StubClient::new()).unwrap();

        let result = session.publish_timeout(
            "t",
            b"{}",
            QoS::AtMostOnce,
            false,
            Duration::from_millis(20),
        );
        assert!(matches!(result, Err(SessionError::Transport(_))));
        assert_eq!(session.client.get().unwrap().count(), 0);
    }

    #[test]
    fn test_discovery_fires_on_every_connect() {
        let signal = Arc::new(ReadinessSignal::new());
        let announcer = Announcer::new("esp32-bme280-AABBCC", "homeassistant", "home/s1/state");
        let session = Session::new(signal, Some(announcer));
        session.attach(StubClient::new()).unwrap();

        session.on_connected();
        session.on_disconnected();
        session.on_connected();

        // Three descriptors, announced twice.
        assert_eq!(session.client.get().unwrap().count(), 6);
    }

    #[test]
    fn test_start_blocking_returns_after_connect() {
        let session = Arc::new(Session::<StubClient>::new(
            Arc::new(ReadinessSignal::new()),
            None,
        ));

        let starter = Arc::clone(&session);
        let handle = thread::spawn(move || starter.start_blocking(StubClient::new()));

        thread::sleep(Duration::from_millis(30));
        session.on_connected();
        handle.join().unwrap().unwrap();
    }
}
