//! MQTT layer: publish abstraction, discovery announcements, and the
//! session state machine layered on the link manager.

pub mod client;
pub mod discovery;
pub mod session;

pub use client::{LoggerPublisher, PublishClient, QoS};
pub use discovery::{Announcer, Descriptor, DESCRIPTORS};
pub use session::Session;
