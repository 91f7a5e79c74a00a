use crate::config::SearchFilter;
use crate::model::TransportError;
use crate::normalizer::RawRecord;

/// One search-results page request: a region, its sections, the shared
/// filter set, and the pagination offset.
#[derive(Debug, Clone)]
pub struct SearchQuery<'a> {
    pub region: u32,
    pub sections: &'a [u32],
    pub filter: &'a SearchFilter,
    pub first_row: u64,
}

/// Decoded result page: raw records plus the server-reported total,
/// which the fetcher uses to stop paginating early.
#[derive(Debug, Default)]
pub struct SearchPayload {
    pub items: Vec<RawRecord>,
    pub total: u64,
}

#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn search(&self, query: &SearchQuery<'_>) -> Result<SearchPayload, TransportError>;
}
