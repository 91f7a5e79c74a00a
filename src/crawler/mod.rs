// Crawler module: transports to the listing site and the paginated fetcher.

pub mod fetcher;
pub mod session;
pub mod traits;

pub use fetcher::PaginatedFetcher;
pub use session::{ApiTransport, RetryPolicy, SsrTransport};
pub use traits::{SearchPayload, SearchQuery, Transport};
