//! Department notice board with offset pagination (`article.offset`).
//!
//! Everything lands under one configured board name.

use async_trait::async_trait;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};

use crate::crawl::fetch::Fetcher;
use crate::crawl::html::{select_hrefs, select_text, with_query};
use crate::crawl::{push_draft, BoardListings, SourceAdapter};
use crate::models::ListingDraft;
use crate::normalize::date::normalize_dotted_date;

pub const DEFAULT_BOARD: &str = "관광학과 공지";
const PAGE_SIZE: u32 = 10;
const LINK_SELECTOR: &str = "a[href*='articleNo']";
const CATEGORY_CLASS: &str = "b-cate";

pub struct DepartmentAdapter {
    list_url: String,
    pages: u32,
    board: String,
}

impl DepartmentAdapter {
    pub fn new(list_url: impl Into<String>, pages: u32, board: impl Into<String>) -> Self {
        Self {
            list_url: list_url.into(),
            pages,
            board: board.into(),
        }
    }

    fn page_url(&self, page: u32) -> String {
        let offset = (page - 1) * PAGE_SIZE;
        with_query(
            &self.list_url,
            &format!("article.offset={offset}&articleLimit={PAGE_SIZE}"),
        )
    }
}

#[async_trait]
impl SourceAdapter for DepartmentAdapter {
    fn describe(&self) -> String {
        format!("department {}", self.list_url)
    }

    async fn collect(&self, fetcher: &dyn Fetcher) -> BoardListings {
        let mut grouped = BoardListings::new();
        let Ok(base) = Url::parse(&self.list_url) else {
            warn!("Department list URL {} is not a valid URL", self.list_url);
            return grouped;
        };

        for page in 1..=self.pages {
            let url = self.page_url(page);
            let body = match fetcher.get_text(&url, &[]).await {
                Ok(body) => body,
                Err(e) => {
                    warn!("Skipping list page {url}: {e}");
                    continue;
                }
            };

            let links: Vec<String> = {
                let document = Html::parse_document(&body);
                select_hrefs(&document, LINK_SELECTOR)
                    .iter()
                    .filter_map(|href| base.join(href).ok())
                    .map(|u| u.to_string())
                    .collect()
            };
            info!("{url}: {} detail links", links.len());

            for link in links {
                match fetcher.get_text(&link, &[]).await {
                    Ok(detail) => push_draft(&mut grouped, parse_detail(&detail, &link, &self.board)),
                    Err(e) => warn!("Skipping detail page {link}: {e}"),
                }
            }
        }

        grouped
    }
}

/// Title as shown on the page: the category badge, one space, the rest.
/// The badge may sit anywhere in the title box; its text is used once.
fn parse_title(document: &Html) -> Option<String> {
    let title_box = Selector::parse(".b-title-box").ok()?;
    let title_box = document.select(&title_box).next()?;
    let category = select_text(title_box, &format!(".{CATEGORY_CLASS}"), " ");

    let rest = title_box
        .descendants()
        .filter(|node| {
            !node
                .ancestors()
                .take_while(|ancestor| ancestor.id() != title_box.id())
                .filter_map(ElementRef::wrap)
                .any(|element| element.value().classes().any(|c| c == CATEGORY_CLASS))
        })
        .filter_map(|node| node.value().as_text())
        .map(|text| text.trim())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    match category {
        Some(category) if rest.is_empty() => {
            debug!("Title box holds only a category badge");
            Some(category)
        }
        Some(category) => Some(format!("{category} {rest}")),
        None => (!rest.is_empty()).then_some(rest),
    }
}

pub fn parse_detail(html: &str, url: &str, board: &str) -> ListingDraft {
    let document = Html::parse_document(html);
    let root = document.root_element();

    ListingDraft {
        url: Some(url.to_string()),
        title: parse_title(&document),
        date: select_text(root, ".b-date-box span:nth-child(2)", "")
            .as_deref()
            .and_then(normalize_dotted_date),
        content: select_text(root, ".b-content-box", "\n"),
        ..ListingDraft::new(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::fetch::testing::StubFetcher;

    const LIST_URL: &str = "https://tourism.example.ac.kr/tourism/community/notice.do";

    fn detail(title_box: &str, date: &str) -> String {
        format!(
            r#"<div class="b-title-box">{title_box}</div>
            <div class="b-date-box"><span>작성일</span><span>{date}</span></div>
            <div class="b-content-box"><p>첫 줄</p><p>둘째 줄</p></div>"#
        )
    }

    #[test]
    fn test_title_keeps_category_prefix() {
        let html = detail(r#"<span class="b-cate">장학</span>2025 관광장학금 안내"#, "2024.03.15");
        let draft = parse_detail(&html, "https://x", DEFAULT_BOARD);
        assert_eq!(draft.title.as_deref(), Some("장학 2025 관광장학금 안내"));
        assert_eq!(draft.date.as_deref(), Some("2024-03-15 00:00:00"));
        assert_eq!(draft.content.as_deref(), Some("첫 줄\n둘째 줄"));
        assert_eq!(draft.board, DEFAULT_BOARD);
    }

    #[test]
    fn test_category_badge_after_title_is_not_repeated() {
        let html = detail(
            r#"<strong>2025 장학금 안내</strong><span class="b-cate">장학</span>"#,
            "2024.03.15",
        );
        let draft = parse_detail(&html, "https://x", DEFAULT_BOARD);
        assert_eq!(draft.title.as_deref(), Some("장학 2025 장학금 안내"));

        let html = detail(r#"<span class="b-cate">공지</span>"#, "2024.03.15");
        let draft = parse_detail(&html, "https://x", DEFAULT_BOARD);
        assert_eq!(draft.title.as_deref(), Some("공지"));
    }

    #[test]
    fn test_title_without_category() {
        let html = detail("<strong>학과 행사</strong>", "2024.03.15");
        let draft = parse_detail(&html, "https://x", DEFAULT_BOARD);
        assert_eq!(draft.title.as_deref(), Some("학과 행사"));
    }

    #[test]
    fn test_unparsable_date_is_absent() {
        let html = detail("행사", "곧 공지");
        let draft = parse_detail(&html, "https://x", DEFAULT_BOARD);
        assert_eq!(draft.date, None);
        assert!(draft.has_title());
    }

    #[test]
    fn test_offset_pagination() {
        let adapter = DepartmentAdapter::new(LIST_URL, 3, DEFAULT_BOARD);
        assert_eq!(
            adapter.page_url(1),
            format!("{LIST_URL}?article.offset=0&articleLimit=10")
        );
        assert_eq!(
            adapter.page_url(3),
            format!("{LIST_URL}?article.offset=20&articleLimit=10")
        );
    }

    #[tokio::test]
    async fn test_collect_single_board() {
        let list = r#"<a href="?mode=view&articleNo=11">a</a><a href="?mode=view&articleNo=12">b</a>"#;
        let fetcher = StubFetcher::new()
            .page(&format!("{LIST_URL}?article.offset=0&articleLimit=10"), list)
            .page(&format!("{LIST_URL}?mode=view&articleNo=11"), &detail("공지 A", "2024.01.01"))
            .page(&format!("{LIST_URL}?mode=view&articleNo=12"), &detail("공지 B", "unknown"));

        let grouped = DepartmentAdapter::new(LIST_URL, 1, "관광")
            .collect(&fetcher)
            .await;

        assert_eq!(grouped.len(), 1);
        let drafts = &grouped["관광"];
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].title.as_deref(), Some("공지 A"));
        assert_eq!(drafts[1].date, None);
    }
}
