//! Side effects of an interaction, collected for the HTTP response
//!
//! The dashboard core asks an [`ActionService`] to open views and a
//! [`Notifier`] to show toasts. Over HTTP both become data: the browser
//! receives the navigation request and the notifications in the response
//! body and acts on them.

use async_trait::async_trait;
use cashdesk_core::{ActionRequest, ActionService, CoreError, CoreResult, Notification, Notifier};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Mutex;

/// Everything one interaction produced
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OutboxEvents {
    pub navigation: Vec<ActionRequest>,
    pub notifications: Vec<Notification>,
}

/// Action executor and notification area backed by an in-memory queue
#[derive(Debug, Default)]
pub struct Outbox {
    registered: HashSet<String>,
    events: Mutex<OutboxEvents>,
}

impl Outbox {
    /// Named actions succeed only when listed here
    pub fn new<I, S>(registered: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            registered: registered.into_iter().map(Into::into).collect(),
            events: Mutex::new(OutboxEvents::default()),
        }
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.registered.contains(name)
    }

    /// Drain the queue
    pub fn take(&self) -> OutboxEvents {
        let mut events = self.events.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *events)
    }
}

#[async_trait]
impl ActionService for Outbox {
    async fn run(&self, request: &ActionRequest) -> CoreResult<()> {
        match request {
            ActionRequest::Named(name) if !self.is_registered(name) => {
                return Err(CoreError::ActionNotRegistered { name: name.clone() });
            }
            ActionRequest::Descriptor(descriptor) if descriptor.collection.trim().is_empty() => {
                return Err(CoreError::ActionFailed {
                    message: format!("view '{}' has no collection", descriptor.title),
                });
            }
            _ => {}
        }

        log::debug!(target: "cashdesk::outbox", "navigation queued: {:?}", request);
        let mut events = self.events.lock().unwrap_or_else(|e| e.into_inner());
        events.navigation.push(request.clone());
        Ok(())
    }
}

impl Notifier for Outbox {
    fn show(&self, notification: Notification) {
        log::debug!(
            target: "cashdesk::outbox",
            "notification [{}] {}: {}",
            notification.severity,
            notification.title,
            notification.message
        );
        let mut events = self.events.lock().unwrap_or_else(|e| e.into_inner());
        events.notifications.push(notification);
    }
}

// ==================== Tests ====================
