// Rate-limited batch delivery with overflow carried to the next run.
use crate::model::Listing;
use crate::notifier::telegram::TelegramNotifier;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Listings delivered per run.
pub const BATCH_SIZE: usize = 10;
/// Minimum spacing between sends, per the bot API rate limit.
const SEND_GAP: Duration = Duration::from_millis(1100);

pub struct DeliveryBatcher {
    batch_size: usize,
    send_gap: Duration,
}

impl DeliveryBatcher {
    pub fn new() -> Self {
        Self { batch_size: BATCH_SIZE, send_gap: SEND_GAP }
    }

    /// Test hook: smaller batches, no inter-send gap.
    pub fn with_limits(batch_size: usize, send_gap: Duration) -> Self {
        Self { batch_size, send_gap }
    }

    /// Sends the head of the ranked queue and returns the overflow to be
    /// persisted as the next run's pending queue. A failed send is logged
    /// and skipped; the listing stays consumed either way.
    pub async fn deliver(
        &self,
        notifier: &TelegramNotifier,
        mut ranked: Vec<Listing>,
    ) -> Vec<Listing> {
        let remainder = if ranked.len() > self.batch_size {
            ranked.split_off(self.batch_size)
        } else {
            Vec::new()
        };

        for (i, listing) in ranked.iter().enumerate() {
            if i > 0 {
                sleep(self.send_gap).await;
            }
            if let Err(e) = notifier.notify_listing(listing).await {
                warn!(id = %listing.id, error = %e, "Listing notification failed");
            }
        }

        if !ranked.is_empty() {
            info!(sent = ranked.len(), remaining = remainder.len(), "Delivery batch done");
        }
        remainder
    }
}

impl Default for DeliveryBatcher {
    fn default() -> Self {
        Self::new()
    }
}
