use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use testwatch::notification::{NotificationEvent, NotificationSink, TransportError};

/// Notification sink that remembers every event instead of sending it.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<NotificationEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<NotificationEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn notify<'a>(
        &'a mut self,
        event: &'a NotificationEvent,
    ) -> Pin<Box<dyn Future<Output = Result<(), TransportError>> + Send + 'a>> {
        self.events.lock().unwrap().push(event.clone());
        Box::pin(async { Ok(()) })
    }
}
