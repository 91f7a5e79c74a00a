use crate::config::{RegionProfile, SearchFilter};
use crate::normalizer::RawRecord;
use crate::crawler::traits::{SearchQuery, Transport};
use crate::utils::Pacing;
use std::sync::Arc;
use tracing::{info, warn};

pub const PAGE_SIZE: u64 = 30;
/// Safety bound against runaway pagination, not a correctness limit.
pub const MAX_PAGES: u64 = 5;

/// Walks the search result pages of one region profile until the server
/// runs out of items, the reported total is reached, or the page cap hits.
pub struct PaginatedFetcher {
    transport: Arc<dyn Transport>,
    pacing: Pacing,
}

impl PaginatedFetcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport, pacing: Pacing::pages() }
    }

    pub fn with_pacing(transport: Arc<dyn Transport>, pacing: Pacing) -> Self {
        Self { transport, pacing }
    }

    /// A transport failure on any page ends pagination for this region;
    /// records already collected are kept.
    pub async fn fetch(&self, profile: &RegionProfile, filter: &SearchFilter) -> Vec<RawRecord> {
        let mut collected = Vec::new();

        for page in 0..MAX_PAGES {
            let query = SearchQuery {
                region: profile.region,
                sections: &profile.sections,
                filter,
                first_row: page * PAGE_SIZE,
            };
            info!(
                label = %profile.label,
                page = page + 1,
                first_row = query.first_row,
                "Fetching search page"
            );

            let payload = match self.transport.search(&query).await {
                Ok(payload) => payload,
                Err(e) => {
                    warn!(label = %profile.label, error = %e, "Page fetch failed, stopping pagination");
                    break;
                }
            };

            if payload.items.is_empty() {
                info!(label = %profile.label, page = page + 1, "Empty page, done");
                break;
            }

            collected.extend(payload.items);
            info!(
                label = %profile.label,
                got = collected.len(),
                total = payload.total,
                "Accumulated records"
            );

            if payload.total > 0 && collected.len() as u64 >= payload.total {
                break;
            }

            if page + 1 < MAX_PAGES {
                self.pacing.wait().await;
            }
        }

        collected
    }
}
