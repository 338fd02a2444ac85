//! Member notifications (overdue reminders and the like).
//!
//! The engine only sees the [`Notifier`] capability. How a message actually
//! reaches a member is up to the implementation.

use std::sync::{Arc, Mutex};

use crate::model::Member;

/// Capability-checked delivery of a message to a member.
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    /// Whether this channel can reach `member` at all.
    fn is_available(&self, member: &Member) -> bool;

    /// Returns `true` if the message was handed off.
    fn notify(&self, member: &Member, message: &str) -> bool;
}

/// Writes notifications to the `tracing` log. Reaches everyone.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    fn is_available(&self, _member: &Member) -> bool {
        true
    }

    fn notify(&self, member: &Member, message: &str) -> bool {
        tracing::info!(member_id = %member.id(), "notification: {}", message);
        true
    }
}

/// Queues e-mails for members with a plausible address.
#[derive(Debug, Default)]
pub struct EmailNotifier {
    outbox: Mutex<Vec<(String, String)>>,
}

impl EmailNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queued `(address, message)` pairs.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.outbox
            .lock()
            .map(|outbox| outbox.clone())
            .unwrap_or_default()
    }
}

impl Notifier for EmailNotifier {
    fn name(&self) -> &str {
        "email"
    }

    fn is_available(&self, member: &Member) -> bool {
        member.email().contains('@')
    }

    fn notify(&self, member: &Member, message: &str) -> bool {
        match self.outbox.lock() {
            Ok(mut outbox) => {
                outbox.push((member.email().to_string(), message.to_string()));
                true
            }
            Err(_) => false,
        }
    }
}

/// Tries each channel in order and stops at the first that delivers; falls
/// back to the default channel when none does.
pub struct NotificationService {
    channels: Vec<Arc<dyn Notifier>>,
    fallback: Arc<dyn Notifier>,
}

impl NotificationService {
    pub fn new(fallback: Arc<dyn Notifier>) -> Self {
        NotificationService {
            channels: Vec::new(),
            fallback,
        }
    }

    pub fn with_channel(mut self, channel: Arc<dyn Notifier>) -> Self {
        if !self.channels.iter().any(|c| c.name() == channel.name()) {
            self.channels.push(channel);
        }
        self
    }

    /// Names of the channels that can reach `member`.
    pub fn available_channels(&self, member: &Member) -> Vec<String> {
        self.channels
            .iter()
            .filter(|c| c.is_available(member))
            .map(|c| c.name().to_string())
            .collect()
    }

    /// Send through one named channel only.
    pub fn notify_via(&self, channel: &str, member: &Member, message: &str) -> bool {
        if message.trim().is_empty() {
            return false;
        }
        self.channels
            .iter()
            .find(|c| c.name() == channel && c.is_available(member))
            .map_or(false, |c| c.notify(member, message))
    }
}

impl Default for NotificationService {
    fn default() -> Self {
        NotificationService::new(Arc::new(LogNotifier))
            .with_channel(Arc::new(EmailNotifier::new()))
    }
}

impl Notifier for NotificationService {
    fn name(&self) -> &str {
        "service"
    }

    fn is_available(&self, member: &Member) -> bool {
        self.fallback.is_available(member) || self.channels.iter().any(|c| c.is_available(member))
    }

    fn notify(&self, member: &Member, message: &str) -> bool {
        if message.trim().is_empty() {
            return false;
        }

        for channel in &self.channels {
            if channel.is_available(member) && channel.notify(member, message) {
                return true;
            }
        }

        self.fallback.is_available(member) && self.fallback.notify(member, message)
    }
}
