//! Notification delivery.

pub mod slack;

use async_trait::async_trait;

use crate::error::ChannelError;
use crate::formatter::NotificationPayload;

/// Something that can deliver a formatted notification.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Get the name of this channel.
    fn name(&self) -> &'static str;

    /// Deliver `payload`. Called at most once per run.
    async fn send(&self, payload: &NotificationPayload) -> Result<(), ChannelError>;
}
