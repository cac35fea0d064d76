// src/notification/packet.rs

//! Growl UDP packet codec (netgrowl compatible).
//!
//! Layout, network byte order, both packets ending in a 16-byte MD5 of all
//! preceding bytes followed by the shared password:
//!
//! ```text
//! registration: u8 version | u8 type=0 | u16 app_len | u8 n_all | u8 n_default
//!               | app | (u16 len | name) * n_all | u8 index * n_default | md5
//! notification: u8 version | u8 type=1 | u16 flags | u16 name_len | u16 title_len
//!               | u16 desc_len | u16 app_len | name | title | desc | app | md5
//! ```

use thiserror::Error;

pub const GROWL_UDP_PORT: u16 = 9887;
pub const PROTOCOL_VERSION: u8 = 1;
pub const CHECKSUM_LEN: usize = 16;

const TYPE_REGISTRATION: u8 = 0;
const TYPE_NOTIFICATION: u8 = 1;

const FLAG_PRIORITY_NEGATIVE: u16 = 0x0008;
const FLAG_STICKY: u16 = 0x0100;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PacketError {
    #[error("{field} is {len} bytes long; at most {max} fit in the packet")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("packet registers {0} notifications; at most 255 are allowed")]
    TooManyNotifications(usize),

    #[error("default index {index} is out of range for {count} notifications")]
    DefaultOutOfRange { index: u8, count: usize },

    #[error("priority {0} is outside -2..=2")]
    PriorityOutOfRange(i8),

    #[error("packet truncated")]
    Truncated,

    #[error("unsupported protocol version {0}")]
    UnsupportedVersion(u8),

    #[error("unknown packet type {0}")]
    UnknownType(u8),

    #[error("checksum mismatch")]
    ChecksumMismatch,

    #[error("{0} is not valid UTF-8")]
    InvalidUtf8(&'static str),
}

/// Declares an application and its notification names to the daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationPacket {
    pub application: String,
    pub notifications: Vec<String>,
    /// Indices into `notifications` that are enabled by default.
    pub defaults: Vec<u8>,
}

impl RegistrationPacket {
    pub fn new(application: impl Into<String>) -> Self {
        Self {
            application: application.into(),
            notifications: Vec::new(),
            defaults: Vec::new(),
        }
    }

    /// Register a notification name; `enabled` marks it default-enabled.
    pub fn add_notification(&mut self, name: impl Into<String>, enabled: bool) -> &mut Self {
        let index = self.notifications.len();
        self.notifications.push(name.into());
        if enabled {
            // Out-of-range indices are rejected by `encode`.
            self.defaults.push(u8::try_from(index).unwrap_or(u8::MAX));
        }
        self
    }

    pub fn encode(&self, password: &str) -> Result<Vec<u8>, PacketError> {
        let count = self.notifications.len();
        let n_all = u8::try_from(count).map_err(|_| PacketError::TooManyNotifications(count))?;
        let n_default = u8::try_from(self.defaults.len())
            .map_err(|_| PacketError::TooManyNotifications(self.defaults.len()))?;
        if let Some(&index) = self.defaults.iter().find(|&&i| usize::from(i) >= count) {
            return Err(PacketError::DefaultOutOfRange { index, count });
        }

        let mut buf = Vec::with_capacity(64);
        buf.push(PROTOCOL_VERSION);
        buf.push(TYPE_REGISTRATION);
        buf.extend_from_slice(&field_len("application", &self.application)?.to_be_bytes());
        buf.push(n_all);
        buf.push(n_default);
        buf.extend_from_slice(self.application.as_bytes());
        for name in &self.notifications {
            buf.extend_from_slice(&field_len("notification name", name)?.to_be_bytes());
            buf.extend_from_slice(name.as_bytes());
        }
        buf.extend_from_slice(&self.defaults);
        append_checksum(&mut buf, password);
        Ok(buf)
    }
}

/// One notification shown by the daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationPacket {
    pub application: String,
    pub notification: String,
    pub title: String,
    pub description: String,
    /// -2 (very low) ..= 2 (emergency); 0 is normal.
    pub priority: i8,
    pub sticky: bool,
}

impl NotificationPacket {
    pub fn flags(&self) -> Result<u16, PacketError> {
        if !(-2..=2).contains(&self.priority) {
            return Err(PacketError::PriorityOutOfRange(self.priority));
        }
        // Priority is a 3-bit two's complement value in bits 1..=3.
        let mut flags = ((self.priority as u16) & 0x07) << 1;
        if self.priority < 0 {
            flags |= FLAG_PRIORITY_NEGATIVE;
        }
        if self.sticky {
            flags |= FLAG_STICKY;
        }
        Ok(flags)
    }

    pub fn encode(&self, password: &str) -> Result<Vec<u8>, PacketError> {
        let flags = self.flags()?;
        let lens = [
            field_len("notification name", &self.notification)?,
            field_len("title", &self.title)?,
            field_len("description", &self.description)?,
            field_len("application", &self.application)?,
        ];

        let body_len: usize = lens.iter().map(|&l| usize::from(l)).sum();
        let mut buf = Vec::with_capacity(12 + body_len + CHECKSUM_LEN);
        buf.push(PROTOCOL_VERSION);
        buf.push(TYPE_NOTIFICATION);
        buf.extend_from_slice(&flags.to_be_bytes());
        for len in lens {
            buf.extend_from_slice(&len.to_be_bytes());
        }
        buf.extend_from_slice(self.notification.as_bytes());
        buf.extend_from_slice(self.title.as_bytes());
        buf.extend_from_slice(self.description.as_bytes());
        buf.extend_from_slice(self.application.as_bytes());
        append_checksum(&mut buf, password);
        Ok(buf)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    Registration(RegistrationPacket),
    Notification(NotificationPacket),
}

impl Packet {
    pub fn encode(&self, password: &str) -> Result<Vec<u8>, PacketError> {
        match self {
            Packet::Registration(p) => p.encode(password),
            Packet::Notification(p) => p.encode(password),
        }
    }

    /// Parse a datagram and verify its checksum against `password`.
    pub fn decode(bytes: &[u8], password: &str) -> Result<Packet, PacketError> {
        if bytes.len() < 2 + CHECKSUM_LEN {
            return Err(PacketError::Truncated);
        }
        let (body, checksum) = bytes.split_at(bytes.len() - CHECKSUM_LEN);
        if checksum != compute_checksum(body, password) {
            return Err(PacketError::ChecksumMismatch);
        }

        let mut r = Reader::new(body);
        let version = r.u8()?;
        if version != PROTOCOL_VERSION {
            return Err(PacketError::UnsupportedVersion(version));
        }

        let packet = match r.u8()? {
            TYPE_REGISTRATION => {
                let app_len = r.u16()?;
                let n_all = r.u8()?;
                let n_default = r.u8()?;
                let application = r.string(app_len, "application")?;
                let mut notifications = Vec::with_capacity(usize::from(n_all));
                for _ in 0..n_all {
                    let len = r.u16()?;
                    notifications.push(r.string(len, "notification name")?);
                }
                let defaults = r.bytes(usize::from(n_default))?.to_vec();
                Packet::Registration(RegistrationPacket {
                    application,
                    notifications,
                    defaults,
                })
            }
            TYPE_NOTIFICATION => {
                let flags = r.u16()?;
                let name_len = r.u16()?;
                let title_len = r.u16()?;
                let desc_len = r.u16()?;
                let app_len = r.u16()?;
                let notification = r.string(name_len, "notification name")?;
                let title = r.string(title_len, "title")?;
                let description = r.string(desc_len, "description")?;
                let application = r.string(app_len, "application")?;

                let raw = ((flags >> 1) & 0x07) as i8;
                let priority = if raw & 0x04 != 0 { raw - 8 } else { raw };
                Packet::Notification(NotificationPacket {
                    application,
                    notification,
                    title,
                    description,
                    priority,
                    sticky: flags & FLAG_STICKY != 0,
                })
            }
            other => return Err(PacketError::UnknownType(other)),
        };

        if !r.is_empty() {
            return Err(PacketError::Truncated);
        }
        Ok(packet)
    }
}

/// MD5 over `body ‖ password`.
pub fn compute_checksum(body: &[u8], password: &str) -> [u8; CHECKSUM_LEN] {
    let mut ctx = md5::Context::new();
    ctx.consume(body);
    ctx.consume(password.as_bytes());
    ctx.compute().0
}

fn append_checksum(buf: &mut Vec<u8>, password: &str) {
    let checksum = compute_checksum(buf, password);
    buf.extend_from_slice(&checksum);
}

fn field_len(field: &'static str, value: &str) -> Result<u16, PacketError> {
    u16::try_from(value.len()).map_err(|_| PacketError::FieldTooLong {
        field,
        len: value.len(),
        max: usize::from(u16::MAX),
    })
}

struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    fn bytes(&mut self, n: usize) -> Result<&'a [u8], PacketError> {
        if self.buf.len() < n {
            return Err(PacketError::Truncated);
        }
        let (head, rest) = self.buf.split_at(n);
        self.buf = rest;
        Ok(head)
    }

    fn u8(&mut self) -> Result<u8, PacketError> {
        Ok(self.bytes(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, PacketError> {
        let b = self.bytes(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn string(&mut self, len: u16, field: &'static str) -> Result<String, PacketError> {
        let b = self.bytes(usize::from(len))?;
        String::from_utf8(b.to_vec()).map_err(|_| PacketError::InvalidUtf8(field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification(priority: i8, sticky: bool) -> NotificationPacket {
        NotificationPacket {
            application: "testwatch".into(),
            notification: "failure".into(),
            title: "Test failure".into(),
            description: "adds (calc::tests)".into(),
            priority,
            sticky,
        }
    }

    #[test]
    fn registration_layout_matches_netgrowl() {
        let mut p = RegistrationPacket::new("demo");
        p.add_notification("error", true).add_notification("failure", true);
        let bytes = p.encode("secret").unwrap();

        let mut expected = vec![1, 0, 0, 4, 2, 2];
        expected.extend_from_slice(b"demo");
        expected.extend_from_slice(&[0, 5]);
        expected.extend_from_slice(b"error");
        expected.extend_from_slice(&[0, 7]);
        expected.extend_from_slice(b"failure");
        expected.extend_from_slice(&[0, 1]);
        let digest = md5::compute([expected.as_slice(), b"secret"].concat());
        expected.extend_from_slice(&digest.0);

        assert_eq!(bytes, expected);
    }

    #[test]
    fn notification_layout_matches_netgrowl() {
        let bytes = notification(0, false).encode("pw").unwrap();
        assert_eq!(&bytes[..12], &[1, 1, 0, 0, 0, 7, 0, 12, 0, 18, 0, 9]);
        assert_eq!(bytes.len(), 12 + 7 + 12 + 18 + 9 + CHECKSUM_LEN);
        let body = &bytes[..bytes.len() - CHECKSUM_LEN];
        assert_eq!(&bytes[body.len()..], &compute_checksum(body, "pw"));
    }

    #[test]
    fn flags_encode_priority_and_sticky() {
        assert_eq!(notification(0, false).flags().unwrap(), 0x0000);
        assert_eq!(notification(2, false).flags().unwrap(), 0x0004);
        assert_eq!(notification(-1, false).flags().unwrap(), 0x000E);
        assert_eq!(notification(-2, true).flags().unwrap(), 0x010C);
        assert_eq!(
            notification(5, false).flags(),
            Err(PacketError::PriorityOutOfRange(5))
        );
    }

    #[test]
    fn decode_inverts_encode() {
        for priority in -2..=2 {
            let p = notification(priority, priority == 1);
            let bytes = p.encode("pw").unwrap();
            assert_eq!(Packet::decode(&bytes, "pw").unwrap(), Packet::Notification(p));
        }
    }

    #[test]
    fn decode_rejects_bad_checksum_and_truncation() {
        let bytes = notification(0, false).encode("pw").unwrap();
        assert_eq!(Packet::decode(&bytes, "other"), Err(PacketError::ChecksumMismatch));
        assert_eq!(Packet::decode(&bytes[..10], "pw"), Err(PacketError::Truncated));

        let mut wrong_version = bytes.clone();
        wrong_version[0] = 2;
        let body_len = wrong_version.len() - CHECKSUM_LEN;
        let checksum = compute_checksum(&wrong_version[..body_len], "pw");
        wrong_version[body_len..].copy_from_slice(&checksum);
        assert_eq!(
            Packet::decode(&wrong_version, "pw"),
            Err(PacketError::UnsupportedVersion(2))
        );
    }

    #[test]
    fn oversized_fields_are_rejected() {
        let mut p = notification(0, false);
        p.description = "x".repeat(70_000);
        assert!(matches!(
            p.encode("pw"),
            Err(PacketError::FieldTooLong { field: "description", .. })
        ));

        let mut r = RegistrationPacket::new("demo");
        for i in 0..256 {
            r.add_notification(format!("n{i}"), false);
        }
        assert_eq!(r.encode("pw"), Err(PacketError::TooManyNotifications(256)));
    }
}
