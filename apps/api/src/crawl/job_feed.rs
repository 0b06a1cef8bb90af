//! University job portal JSON feed (`/api/common/ntc-list`).
//!
//! Page 1 carries `response.pagination.totPage`; that count is clamped to the
//! configured cap and pages 2..N are fetched with a fixed pause in between.
//! A page whose body will not decode as JSON is retried a bounded number of
//! times and then treated as empty.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use crate::crawl::fetch::Fetcher;
use crate::crawl::{push_draft, BoardListings, SourceAdapter};
use crate::models::ListingDraft;
use crate::normalize::date::normalize_timestamp;

pub const DEFAULT_BASE: &str = "https://job.kangwon.ac.kr";
pub const DEFAULT_BOARD: &str = "대학일자리플러스";
pub const DEFAULT_AUTH_MID: &str = "0105010000";

const MAX_ATTEMPTS: u32 = 3;
const RETRY_BACKOFF: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
pub struct JobFeedConfig {
    pub base: String,
    pub auth_mid: String,
    pub category_big: String,
    pub category_mid: String,
    pub max_pages: u32,
    pub per_page: u32,
    pub board: String,
    pub page_delay: Duration,
}

impl Default for JobFeedConfig {
    fn default() -> Self {
        Self {
            base: DEFAULT_BASE.to_string(),
            auth_mid: DEFAULT_AUTH_MID.to_string(),
            category_big: "00".to_string(),
            category_mid: "00".to_string(),
            max_pages: 3,
            per_page: 9,
            board: DEFAULT_BOARD.to_string(),
            page_delay: Duration::from_millis(300),
        }
    }
}

pub struct JobFeedAdapter {
    config: JobFeedConfig,
}

impl JobFeedAdapter {
    pub fn new(config: JobFeedConfig) -> Self {
        Self { config }
    }

    fn page_url(&self, page: u32) -> String {
        let c = &self.config;
        format!(
            "{}/api/common/ntc-list/{}/{}/{}?perPage={}&inqSlctn=00&inqVal=",
            c.base.trim_end_matches('/'),
            c.category_big,
            c.category_mid,
            page,
            c.per_page
        )
    }

    /// GETs `url` until the body decodes as JSON, at most `MAX_ATTEMPTS` times.
    async fn fetch_json(&self, fetcher: &dyn Fetcher, url: &str) -> Option<Value> {
        let headers = [
            ("accept", "application/json, text/plain, */*"),
            ("x-auth-mid", self.config.auth_mid.as_str()),
        ];

        for attempt in 1..=MAX_ATTEMPTS {
            match fetcher.get_text(url, &headers).await {
                Ok(body) => match serde_json::from_str::<Value>(&body) {
                    Ok(json) => return Some(json),
                    Err(e) => warn!("Job feed attempt {attempt}/{MAX_ATTEMPTS} for {url}: not JSON ({e})"),
                },
                Err(e) => warn!("Job feed attempt {attempt}/{MAX_ATTEMPTS} for {url}: {e}"),
            }
            if attempt < MAX_ATTEMPTS {
                tokio::time::sleep(RETRY_BACKOFF).await;
            }
        }

        warn!("Giving up on {url} after {MAX_ATTEMPTS} attempts");
        None
    }

    /// Items on one page and the advertised total page count.
    async fn fetch_page(&self, fetcher: &dyn Fetcher, page: u32) -> (Vec<Value>, u32) {
        let url = self.page_url(page);
        let Some(json) = self.fetch_json(fetcher, &url).await else {
            return (Vec::new(), 0);
        };
        parse_page(&json)
    }

    /// Every job record up to the page cap, in feed order.
    pub async fn fetch_all(&self, fetcher: &dyn Fetcher) -> Vec<ListingDraft> {
        let (mut items, total_pages) = self.fetch_page(fetcher, 1).await;
        let last_page = total_pages.min(self.config.max_pages);
        info!("Job feed reports {total_pages} pages, fetching up to {last_page}");

        for page in 2..=last_page {
            tokio::time::sleep(self.config.page_delay).await;
            let (more, _) = self.fetch_page(fetcher, page).await;
            items.extend(more);
        }

        items
            .iter()
            .map(|raw| convert_item(raw, &self.config.board))
            .collect()
    }
}

#[async_trait]
impl SourceAdapter for JobFeedAdapter {
    fn describe(&self) -> String {
        format!("job feed {}", self.config.base)
    }

    async fn collect(&self, fetcher: &dyn Fetcher) -> BoardListings {
        let mut grouped = BoardListings::new();
        for draft in self.fetch_all(fetcher).await {
            push_draft(&mut grouped, draft);
        }
        grouped
    }
}

fn parse_page(json: &Value) -> (Vec<Value>, u32) {
    let Some(response) = json.get("response").filter(|r| r.is_object()) else {
        return (Vec::new(), 0);
    };
    let items = response
        .get("list")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let total_pages = response
        .get("pagination")
        .and_then(|p| p.get("totPage"))
        .and_then(as_count)
        .unwrap_or(0);
    (items, total_pages)
}

fn as_count(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Scalar field as text. Strings pass through, numbers and bools are printed.
fn text_field(raw: &Value, key: &str) -> Option<String> {
    match raw.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn convert_item(raw: &Value, board: &str) -> ListingDraft {
    ListingDraft {
        campus: text_field(raw, "cmpsNm"),
        title: text_field(raw, "ttl"),
        date: text_field(raw, "inptDt").as_deref().and_then(normalize_timestamp),
        content: text_field(raw, "cn"),
        ..ListingDraft::new(board)
    }
}
