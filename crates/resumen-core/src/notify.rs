use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, warn};

use crate::config::Config;

/// A fire-and-forget message channel. Sending never fails the pipeline:
/// transport problems are logged and swallowed.
#[async_trait]
pub trait Notify: Send + Sync {
    async fn send(&self, message: &str);
}

/// Phone push notifications, used by batch runs. Built only when the token
/// pair is configured; otherwise the pipeline gets a [`NullChannel`].
pub struct PushoverChannel {
    client: Client,
    api_base: String,
    token: String,
    user: String,
    timeout: std::time::Duration,
}

impl PushoverChannel {
    pub fn from_config(client: &Client, config: &Config) -> Option<Self> {
        config.pushover.as_ref().map(|pushover| Self {
            client: client.clone(),
            api_base: config.endpoints.pushover_api.clone(),
            token: pushover.token.clone(),
            user: pushover.user.clone(),
            timeout: config.timeouts.notify,
        })
    }
}

#[async_trait]
impl Notify for PushoverChannel {
    async fn send(&self, message: &str) {
        let url = format!("{}/1/messages.json", self.api_base);
        let payload = json!({
            "token": self.token,
            "user": self.user,
            "message": message,
        });

        let result = self
            .client
            .post(&url)
            .json(&payload)
            .timeout(self.timeout)
            .send()
            .await;
        match result {
            Ok(response) if !response.status().is_success() => {
                warn!(status = %response.status(), "push notification rejected");
            }
            Ok(_) => debug!("push notification sent"),
            Err(err) => warn!(error = %err, "push notification failed"),
        }
    }
}

/// Chat replies to the conversation that submitted a single-video request.
pub struct TelegramChannel {
    client: Client,
    api_base: String,
    bot_token: String,
    chat_id: String,
    timeout: std::time::Duration,
}

impl TelegramChannel {
    pub fn from_config(client: &Client, config: &Config, chat_id: &str) -> Option<Self> {
        config.telegram_bot_token.as_ref().map(|bot_token| Self {
            client: client.clone(),
            api_base: config.endpoints.telegram_api.clone(),
            bot_token: bot_token.clone(),
            chat_id: chat_id.to_string(),
            timeout: config.timeouts.notify,
        })
    }
}

#[async_trait]
impl Notify for TelegramChannel {
    async fn send(&self, message: &str) {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.bot_token);
        let payload = json!({
            "chat_id": self.chat_id,
            "text": message,
        });

        let result = self
            .client
            .post(&url)
            .json(&payload)
            .timeout(self.timeout)
            .send()
            .await;
        match result {
            Ok(response) if !response.status().is_success() => {
                warn!(status = %response.status(), "chat notification rejected");
            }
            Ok(_) => debug!("chat notification sent"),
            Err(err) => warn!(error = %err, "chat notification failed"),
        }
    }
}

/// Stand-in for an unconfigured channel.
pub struct NullChannel;

#[async_trait]
impl Notify for NullChannel {
    async fn send(&self, _message: &str) {}
}
