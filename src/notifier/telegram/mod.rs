pub mod sender;

use crate::config::TelegramConfig;
use crate::model::{Listing, NotifyError};
use crate::notifier::message;
use reqwest::Client;
use tracing::{info, warn};

/// Telegram delivery endpoint. Built once from configuration and threaded
/// into the batcher; when credentials are absent every send degrades to a
/// local log line so the pipeline still completes.
pub struct TelegramNotifier {
    pub(crate) bot_token: String,
    pub(crate) chat_id: String,
    pub(crate) client: Client,
    enabled: bool,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("❗ Failed to create HTTP client");
        Self {
            bot_token: config.bot_token.clone(),
            chat_id: config.chat_id.clone(),
            client,
            enabled: config.is_configured(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Sends one HTML-formatted message, or logs it when disabled.
    pub async fn notify_text(&self, text: &str) -> Result<(), NotifyError> {
        if !self.enabled {
            warn!("Telegram credentials missing, skipping send");
            info!("Message body:\n{}", text);
            return Ok(());
        }
        sender::send_html(self, text).await
    }

    pub async fn notify_listing(&self, listing: &Listing) -> Result<(), NotifyError> {
        self.notify_text(&message::format_listing(listing)).await
    }
}
