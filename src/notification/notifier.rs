// src/notification/notifier.rs

use std::future::Future;
use std::pin::Pin;

use tracing::{debug, info};

use crate::notification::packet::{NotificationPacket, RegistrationPacket};
use crate::notification::transport::{TransportError, UdpTransport};
use crate::report::{Direction, StatusCategory, Transition};

/// Upper bound for a notification body, in bytes.
pub const MAX_BODY_BYTES: usize = 4096;

/// One user-facing notification, derived from a [`Transition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    pub title: String,
    pub body: String,
    pub category: StatusCategory,
}

impl NotificationEvent {
    pub fn from_transition(transition: &Transition) -> Self {
        let category = transition.category;
        let name = &transition.record.name;
        let (title, body) = match transition.direction {
            Direction::Broke => (
                format!("Test {category}"),
                format!("{name}\n\n{}", transition.record.detail),
            ),
            Direction::Fixed => (format!("Fixed {category}"), name.clone()),
        };
        Self {
            title,
            body: truncate_utf8(body, MAX_BODY_BYTES),
            category,
        }
    }
}

fn truncate_utf8(mut s: String, max: usize) -> String {
    if s.len() > max {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        s.truncate(end);
    }
    s
}

/// Where the control loop delivers notification events.
pub trait NotificationSink: Send {
    fn notify<'a>(
        &'a mut self,
        event: &'a NotificationEvent,
    ) -> Pin<Box<dyn Future<Output = Result<(), TransportError>> + Send + 'a>>;
}

/// Sink that speaks the Growl UDP protocol.
///
/// Registers the application (every [`StatusCategory`] enabled by default)
/// before the first notification; a failed registration is retried on the
/// next event.
#[derive(Debug)]
pub struct GrowlNotifier {
    transport: UdpTransport,
    application: String,
    password: String,
    registered: bool,
}

impl GrowlNotifier {
    pub fn new(
        transport: UdpTransport,
        application: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            application: application.into(),
            password: password.into(),
            registered: false,
        }
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    pub fn registration(&self) -> RegistrationPacket {
        let mut packet = RegistrationPacket::new(self.application.clone());
        for category in StatusCategory::ALL {
            packet.add_notification(category.as_str(), true);
        }
        packet
    }

    pub fn packet_for(&self, event: &NotificationEvent) -> NotificationPacket {
        NotificationPacket {
            application: self.application.clone(),
            notification: event.category.as_str().to_string(),
            title: event.title.clone(),
            description: event.body.clone(),
            priority: 0,
            sticky: false,
        }
    }

    pub async fn register(&mut self) -> Result<(), TransportError> {
        let bytes = self.registration().encode(&self.password)?;
        self.transport.send(&bytes).await?;
        self.registered = true;
        info!(
            host = self.transport.host(),
            port = self.transport.port(),
            application = %self.application,
            "registered with notification daemon"
        );
        Ok(())
    }

    pub async fn send(&mut self, event: &NotificationEvent) -> Result<(), TransportError> {
        if !self.registered {
            self.register().await?;
        }
        let bytes = self.packet_for(event).encode(&self.password)?;
        self.transport.send(&bytes).await?;
        debug!(title = %event.title, category = %event.category, "notification sent");
        Ok(())
    }
}

impl NotificationSink for GrowlNotifier {
    fn notify<'a>(
        &'a mut self,
        event: &'a NotificationEvent,
    ) -> Pin<Box<dyn Future<Output = Result<(), TransportError>> + Send + 'a>> {
        Box::pin(self.send(event))
    }
}
