//! Twilio SMS Client

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::Notifier;
use crate::error::{AllocatorError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.twilio.com";

/// Credentials and numbers for the Messages API
#[derive(Clone, Debug)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
    pub to_number: String,
}

pub struct TwilioClient {
    client: reqwest::Client,
    config: TwilioConfig,
    base_url: String,
}

impl TwilioClient {
    pub fn new(client: reqwest::Client, config: TwilioConfig) -> Self {
        Self {
            client,
            config,
            base_url: DEFAULT_BASE_URL.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.config.account_sid
        )
    }
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    sid: String,
}

#[derive(Debug, Deserialize)]
struct TwilioErrorBody {
    message: String,
}

fn parse_message_sid(body: &str) -> Result<String> {
    let response: MessageResponse = serde_json::from_str(body)?;
    Ok(response.sid)
}

#[async_trait]
impl Notifier for TwilioClient {
    async fn send(&self, body: &str) -> Result<String> {
        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[
                ("To", self.config.to_number.as_str()),
                ("From", self.config.from_number.as_str()),
                ("Body", body),
            ])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<TwilioErrorBody>(&text)
                .map(|e| e.message)
                .unwrap_or(text);
            return Err(AllocatorError::Notify(format!("HTTP {status}: {message}")));
        }

        let sid = parse_message_sid(&text)?;
        debug!(%sid, "sms queued");
        Ok(sid)
    }

    fn name(&self) -> &str {
        "Twilio"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TwilioConfig {
        TwilioConfig {
            account_sid: "AC123".into(),
            auth_token: "token".into(),
            from_number: "+15550001111".into(),
            to_number: "+15550002222".into(),
        }
    }

    #[test]
    fn test_messages_url() {
        let client = TwilioClient::new(reqwest::Client::new(), config());
        assert_eq!(
            client.messages_url(),
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Messages.json"
        );
    }

    #[test]
    fn test_parse_message_sid() {
        let body = r#"{"sid": "SM0123456789abcdef", "status": "queued", "to": "+15550002222"}"#;
        assert_eq!(parse_message_sid(body).unwrap(), "SM0123456789abcdef");
        assert!(parse_message_sid("{}").is_err());
    }
}
