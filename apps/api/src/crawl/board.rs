//! Generic university notice board (`selectBbsNttList.do` / `selectBbsNttView.do`).
//!
//! The list page links to detail pages either directly or through a
//! `javascript:` call carrying the article number. Each detail page names its
//! own board, so one list URL can yield several groups.

use async_trait::async_trait;
use reqwest::Url;
use scraper::Html;
use tracing::{debug, info, warn};

use crate::crawl::fetch::Fetcher;
use crate::crawl::html::{select_hrefs, select_text, with_query};
use crate::crawl::{push_draft, BoardListings, SourceAdapter};
use crate::models::listing::{ListingDraft, UNKNOWN_BOARD};
use crate::normalize::date::normalize_korean_datetime;

const LINK_SELECTOR: &str = "a[href*='selectBbsNttView']";
const LIST_MARKER: &str = "selectBbsNttList";
const DETAIL_PATH: &str = "selectBbsNttView.do?nttNo=";

pub struct BoardAdapter {
    list_url: String,
    pages: u32,
}

impl BoardAdapter {
    pub fn new(list_url: impl Into<String>, pages: u32) -> Self {
        Self {
            list_url: list_url.into(),
            pages,
        }
    }

    fn page_url(&self, page: u32) -> String {
        with_query(&self.list_url, &format!("pageIndex={page}"))
    }
}

#[async_trait]
impl SourceAdapter for BoardAdapter {
    fn describe(&self) -> String {
        format!("board {}", self.list_url)
    }

    async fn collect(&self, fetcher: &dyn Fetcher) -> BoardListings {
        let mut grouped = BoardListings::new();

        for page in 1..=self.pages {
            let url = self.page_url(page);
            let body = match fetcher.get_text(&url, &[]).await {
                Ok(body) => body,
                Err(e) => {
                    warn!("Skipping list page {url}: {e}");
                    continue;
                }
            };

            let links: Vec<String> = extract_links(&body)
                .iter()
                .filter_map(|href| resolve_detail_url(&self.list_url, href))
                .collect();
            info!("{url}: {} detail links", links.len());

            for link in links {
                let detail = match fetcher.get_text(&link, &[]).await {
                    Ok(detail) => detail,
                    Err(e) => {
                        warn!("Skipping detail page {link}: {e}");
                        continue;
                    }
                };
                push_draft(&mut grouped, parse_detail(&detail, &link));
            }
        }

        grouped
    }
}

fn extract_links(list_html: &str) -> Vec<String> {
    let document = Html::parse_document(list_html);
    select_hrefs(&document, LINK_SELECTOR)
}

/// Turns a list-page `href` into an absolute detail URL.
///
/// `javascript:fn_selectBbsNttView('123')` becomes `<prefix>selectBbsNttView.do?nttNo=123`,
/// where `<prefix>` is the list URL up to `selectBbsNttList`. Anything else is
/// resolved relative to the list URL.
pub fn resolve_detail_url(list_url: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.to_ascii_lowercase().starts_with("javascript") {
        let article = href.split(['\'', '"']).nth(1)?.trim();
        if article.is_empty() {
            debug!("No article id in {href:?}");
            return None;
        }
        let prefix = list_url.split(LIST_MARKER).next().unwrap_or(list_url);
        return Some(format!("{prefix}{DETAIL_PATH}{article}"));
    }

    match Url::parse(list_url).and_then(|base| base.join(href)) {
        Ok(url) => Some(url.to_string()),
        Err(e) => {
            debug!("Cannot resolve {href:?} against {list_url}: {e}");
            None
        }
    }
}

/// Reads board, title, timestamp and body from a detail page.
pub fn parse_detail(html: &str, url: &str) -> ListingDraft {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let board = select_text(root, ".sub_title h2", "").unwrap_or_else(|| UNKNOWN_BOARD.to_string());

    ListingDraft {
        url: Some(url.to_string()),
        title: select_text(root, "tr.subject td", ""),
        date: select_text(root, "span.write strong", "")
            .as_deref()
            .and_then(normalize_korean_datetime),
        content: select_text(root, "#bbs_ntt_cn_con", "\n"),
        ..ListingDraft::new(board)
    }
}
