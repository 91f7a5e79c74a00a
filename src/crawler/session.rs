// Concrete transports against rent.591.com.tw.
//
// SsrTransport reads the current server-rendered list pages; ApiTransport
// speaks the legacy JSON list API, kept for when the site serves it again.
// Both bootstrap a browsable session (cookies, and for the API the
// anti-forgery token) before the first search.
use crate::model::TransportError;
use crate::normalizer::{ApiRecord, RawRecord};
use crate::parser::NuxtStateParser;
use crate::crawler::traits::{SearchPayload, SearchQuery, Transport};
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Deserialize;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

const BASE_URL: &str = "https://rent.591.com.tw";
const API_LIST_URL: &str = "https://rent.591.com.tw/home/search/rsList";
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Bounded retry with exponential backoff for the session bootstrap.
/// Tests pass `RetryPolicy::immediate()` to skip the waits.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn bootstrap() -> Self {
        Self { max_attempts: 3, base_delay: Duration::from_secs(1) }
    }

    pub fn immediate() -> Self {
        Self { max_attempts: 3, base_delay: Duration::ZERO }
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

fn build_client() -> Result<Client, TransportError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .cookie_store(true)
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| TransportError::Http(e.to_string()))
}

fn request_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Http(e.to_string())
    }
}

/// Fetches the site root until it answers, filling the cookie jar.
/// Returns the landing page body for token extraction.
async fn bootstrap_session(client: &Client, retry: &RetryPolicy) -> Result<String, TransportError> {
    let mut last_error = String::new();
    for attempt in 1..=retry.max_attempts {
        match client.get(BASE_URL).send().await {
            Ok(response) if response.status().is_success() => {
                info!(attempt, "Session bootstrap succeeded");
                return response.text().await.map_err(request_error);
            }
            Ok(response) => last_error = format!("status {}", response.status()),
            Err(e) => last_error = e.to_string(),
        }
        if attempt < retry.max_attempts {
            let delay = retry.delay_for(attempt);
            warn!(attempt, error = %last_error, "Bootstrap attempt failed, retrying in {:?}", delay);
            sleep(delay).await;
        }
    }
    Err(TransportError::Bootstrap {
        attempts: retry.max_attempts,
        reason: last_error,
    })
}

fn join_nums(values: &[u32]) -> String {
    values
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Shared query-string tail built from the filter profile.
fn filter_params(query: &SearchQuery<'_>) -> String {
    let filter = query.filter;
    let mut params = format!(
        "kind={}&layout={}&rentprice=0,{}&area={},{}&other={}&option={}&order={}&orderType={}&region={}&section={}",
        filter.kind,
        join_nums(&filter.layouts),
        filter.max_price,
        filter.min_area,
        filter.max_area,
        filter.extras.join(","),
        filter.options.join(","),
        filter.order,
        filter.order_type,
        query.region,
        join_nums(query.sections),
    );
    if query.first_row > 0 {
        params.push_str(&format!("&firstRow={}", query.first_row));
    }
    params
}

/// Transport over the server-rendered list pages.
pub struct SsrTransport {
    client: Client,
    parser: NuxtStateParser,
}

impl SsrTransport {
    pub async fn connect(retry: &RetryPolicy) -> Result<Self, TransportError> {
        let client = build_client()?;
        bootstrap_session(&client, retry).await?;
        Ok(Self { client, parser: NuxtStateParser::new() })
    }

    fn list_url(query: &SearchQuery<'_>) -> String {
        format!("{}/list?{}", BASE_URL, filter_params(query))
    }
}

#[async_trait::async_trait]
impl Transport for SsrTransport {
    async fn search(&self, query: &SearchQuery<'_>) -> Result<SearchPayload, TransportError> {
        let url = Self::list_url(query);
        let response = self.client.get(&url).send().await.map_err(request_error)?;
        if !response.status().is_success() {
            return Err(TransportError::InvalidResponse(format!(
                "status {}",
                response.status()
            )));
        }
        let html = response.text().await.map_err(request_error)?;
        self.parser
            .parse(&html)
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))
    }
}

#[derive(Debug, Default, Deserialize)]
struct ApiListResponse {
    #[serde(default)]
    data: ApiListData,
    #[serde(default)]
    records: String,
}

#[derive(Debug, Default, Deserialize)]
struct ApiListData {
    #[serde(default)]
    data: Vec<ApiRecord>,
}

/// Transport over the legacy JSON list API. Bootstrap additionally pulls
/// the anti-forgery token off the landing page.
pub struct ApiTransport {
    client: Client,
    csrf_token: String,
}

impl ApiTransport {
    pub async fn connect(retry: &RetryPolicy) -> Result<Self, TransportError> {
        let client = build_client()?;
        let landing = bootstrap_session(&client, retry).await?;
        let csrf_token = extract_csrf_token(&landing).ok_or_else(|| {
            TransportError::InvalidResponse("csrf token missing from landing page".to_string())
        })?;
        Ok(Self { client, csrf_token })
    }

    fn list_url(query: &SearchQuery<'_>) -> String {
        format!("{}?is_format_data=1&is_new_list=1&{}", API_LIST_URL, filter_params(query))
    }
}

#[async_trait::async_trait]
impl Transport for ApiTransport {
    async fn search(&self, query: &SearchQuery<'_>) -> Result<SearchPayload, TransportError> {
        let url = Self::list_url(query);
        let response = self
            .client
            .get(&url)
            .header("X-CSRF-TOKEN", &self.csrf_token)
            .send()
            .await
            .map_err(request_error)?;
        if !response.status().is_success() {
            return Err(TransportError::InvalidResponse(format!(
                "status {}",
                response.status()
            )));
        }
        let decoded: ApiListResponse = response.json().await.map_err(request_error)?;
        let total = decoded.records.replace(',', "").parse().unwrap_or(0);
        let items = decoded
            .data
            .data
            .into_iter()
            .map(RawRecord::Api)
            .collect();
        Ok(SearchPayload { items, total })
    }
}

pub fn extract_csrf_token(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(r#"meta[name="csrf-token"]"#).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchFilter;

    fn query<'a>(filter: &'a SearchFilter, sections: &'a [u32], first_row: u64) -> SearchQuery<'a> {
        SearchQuery { region: 1, sections, filter, first_row }
    }

    #[test]
    fn list_url_carries_full_filter_profile() {
        let filter = SearchFilter::default();
        let sections = [1, 2, 3];
        let url = SsrTransport::list_url(&query(&filter, &sections, 0));
        assert!(url.starts_with("https://rent.591.com.tw/list?"));
        assert!(url.contains("kind=1"));
        assert!(url.contains("layout=2,3,4"));
        assert!(url.contains("rentprice=0,30000"));
        assert!(url.contains("area=10,50"));
        assert!(url.contains("other=not_cover,near_subway,cook"));
        assert!(url.contains("option=cold,washer,icebox"));
        assert!(url.contains("order=posttime&orderType=desc"));
        assert!(url.contains("region=1&section=1,2,3"));
        assert!(!url.contains("firstRow"));
    }

    #[test]
    fn first_row_only_present_past_page_one() {
        let filter = SearchFilter::default();
        let sections = [37];
        let url = SsrTransport::list_url(&query(&filter, &sections, 30));
        assert!(url.ends_with("&firstRow=30"));
    }

    #[test]
    fn api_url_targets_the_list_endpoint() {
        let filter = SearchFilter::default();
        let sections = [43];
        let url = ApiTransport::list_url(&query(&filter, &sections, 60));
        assert!(url.starts_with("https://rent.591.com.tw/home/search/rsList?is_format_data=1"));
        assert!(url.contains("section=43"));
        assert!(url.contains("firstRow=60"));
    }

    #[test]
    fn csrf_token_extracted_from_meta() {
        let html = r#"<html><head>
            <meta name="viewport" content="width=device-width">
            <meta name="csrf-token" content="tok123abc">
            </head><body></body></html>"#;
        assert_eq!(extract_csrf_token(html).as_deref(), Some("tok123abc"));
        assert_eq!(extract_csrf_token("<html></html>"), None);
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        let retry = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
        };
        assert_eq!(retry.delay_for(1), Duration::from_millis(100));
        assert_eq!(retry.delay_for(2), Duration::from_millis(200));
        assert_eq!(retry.delay_for(3), Duration::from_millis(400));
        assert_eq!(RetryPolicy::immediate().delay_for(3), Duration::ZERO);
    }

    #[test]
    fn api_response_total_strips_separators() {
        let decoded: ApiListResponse = serde_json::from_str(
            r#"{"data":{"data":[{"post_id":1}]},"records":"1,234"}"#,
        )
        .unwrap();
        assert_eq!(decoded.records.replace(',', "").parse::<u64>().unwrap(), 1234);
        assert_eq!(decoded.data.data.len(), 1);
    }
}
