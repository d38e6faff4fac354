//! Notifications
//!
//! Text-message summary of the week's allocation.

mod summary;
mod twilio;

pub use summary::WeeklySummary;
pub use twilio::{TwilioClient, TwilioConfig};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::Result;

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `body`, returning the provider's message id
    async fn send(&self, body: &str) -> Result<String>;

    fn name(&self) -> &str;
}

/// Keeps messages in memory instead of sending them
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<String> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, body: &str) -> Result<String> {
        let mut sent = self.sent.lock().await;
        sent.push(body.to_string());
        Ok(format!("local-{}", sent.len()))
    }

    fn name(&self) -> &str {
        "RecordingNotifier"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recording_notifier() {
        let notifier = RecordingNotifier::new();
        assert_eq!(notifier.send("hello").await.unwrap(), "local-1");
        assert_eq!(notifier.send("again").await.unwrap(), "local-2");
        assert_eq!(notifier.sent().await, vec!["hello", "again"]);
    }
}
