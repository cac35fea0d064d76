// src/notification/transport.rs

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::UdpSocket;
use tracing::trace;

use crate::notification::packet::PacketError;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("cannot resolve {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{host} resolved to no addresses")]
    NoAddress { host: String },

    #[error("cannot bind local UDP socket: {0}")]
    Bind(#[source] std::io::Error),

    #[error("sending to {addr} failed: {source}")]
    Send {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("datagram truncated: sent {sent} of {expected} bytes")]
    ShortWrite { sent: usize, expected: usize },

    #[error(transparent)]
    Packet(#[from] PacketError),
}

/// Fire-and-forget UDP delivery.
///
/// Every `send` resolves the destination, binds a fresh ephemeral socket of
/// the matching address family and sends one datagram. The socket lives only
/// for the duration of the call.
#[derive(Debug, Clone)]
pub struct UdpTransport {
    host: String,
    port: u16,
}

impl UdpTransport {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn send(&self, payload: &[u8]) -> Result<(), TransportError> {
        let addr = self.resolve().await?;
        let local: SocketAddr = if addr.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };

        let socket = UdpSocket::bind(local).await.map_err(TransportError::Bind)?;
        let sent = socket
            .send_to(payload, addr)
            .await
            .map_err(|source| TransportError::Send { addr, source })?;
        if sent != payload.len() {
            return Err(TransportError::ShortWrite {
                sent,
                expected: payload.len(),
            });
        }

        trace!(%addr, bytes = sent, "datagram sent");
        Ok(())
    }

    async fn resolve(&self) -> Result<SocketAddr, TransportError> {
        let mut addrs = tokio::net::lookup_host((self.host.as_str(), self.port))
            .await
            .map_err(|source| TransportError::Resolve {
                host: self.host.clone(),
                source,
            })?;
        addrs.next().ok_or_else(|| TransportError::NoAddress {
            host: self.host.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_one_datagram() {
        let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = receiver.local_addr().unwrap().port();

        UdpTransport::new("127.0.0.1", port).send(b"ping").await.unwrap();

        let mut buf = [0u8; 16];
        let (n, _) = receiver.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"ping");
    }

    #[tokio::test]
    async fn unresolvable_host_is_an_error() {
        let err = UdpTransport::new("host.invalid.", 9887)
            .send(b"x")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TransportError::Resolve { .. } | TransportError::NoAddress { .. }
        ));
    }
}
