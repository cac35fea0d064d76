// src/notification/mod.rs

//! Growl notifications.
//!
//! - [`packet`]: wire codec for registration and notification packets.
//! - [`transport`]: one-datagram-per-call UDP delivery.
//! - [`notifier`]: turns transitions into events and sends them.

pub mod notifier;
pub mod packet;
pub mod transport;

pub use notifier::{GrowlNotifier, NotificationEvent, NotificationSink};
pub use packet::{
    GROWL_UDP_PORT, NotificationPacket, Packet, PacketError, PROTOCOL_VERSION, RegistrationPacket,
};
pub use transport::{TransportError, UdpTransport};
