use super::notifier::{format_message, Alerter, MessageKind};
use crate::config::AlertSettings;
use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

const POST_MESSAGE_URL: &str = "https://slack.com/api/chat.postMessage";

#[derive(Debug, Deserialize)]
struct SlackResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Posts alerts to one Slack channel through `chat.postMessage`.
#[derive(Debug, Clone)]
pub struct SlackAlert {
    client: Client,
    token: String,
    channel_id: String,
    script_name: String,
}

impl SlackAlert {
    pub fn new(client: Client, settings: &AlertSettings) -> Self {
        SlackAlert {
            client,
            token: settings.slack_token.clone(),
            channel_id: settings.channel_id.clone(),
            script_name: settings.script_name.clone(),
        }
    }

    async fn send(&self, text: &str) -> Result<(), String> {
        let resp = self
            .client
            .post(POST_MESSAGE_URL)
            .bearer_auth(&self.token)
            .json(&json!({ "channel": self.channel_id, "text": text }))
            .send()
            .await
            .map_err(|e| e.to_string())?;
        let status = resp.status();
        if !status.is_success() {
            return Err(format!("Slack returned {}", status));
        }
        // Slack reports API failures with a 200 and `ok: false`.
        let body: SlackResponse = resp.json().await.map_err(|e| e.to_string())?;
        if body.ok {
            Ok(())
        } else {
            Err(body.error.unwrap_or_else(|| "unknown error".to_string()))
        }
    }
}

#[async_trait]
impl Alerter for SlackAlert {
    async fn post(&self, message: &str, kind: MessageKind) {
        let text = format_message(kind, &self.script_name, message);
        match self.send(&text).await {
            Ok(()) => debug!("Posted {} alert to {}", kind, self.channel_id),
            Err(e) => error!("Slack error: {} (channel: {})", e, self.channel_id),
        }
    }
}
