use std::sync::Arc;

use tracing::info;

use crate::config::CrawlConfig;
use crate::crawl::board::BoardAdapter;
use crate::crawl::department::DepartmentAdapter;
use crate::crawl::fetch::Fetcher;
use crate::crawl::job_feed::JobFeedAdapter;
use crate::crawl::{merge_into, BoardListings, SourceAdapter};

/// Runs every configured source in order and merges the results by board name.
pub struct Aggregator {
    fetcher: Arc<dyn Fetcher>,
    sources: Vec<Box<dyn SourceAdapter>>,
}

impl Aggregator {
    pub fn new(fetcher: Arc<dyn Fetcher>, sources: Vec<Box<dyn SourceAdapter>>) -> Self {
        Self { fetcher, sources }
    }

    /// Board lists first, then the department board, then the job feed.
    pub fn from_config(fetcher: Arc<dyn Fetcher>, config: &CrawlConfig) -> Self {
        let mut sources: Vec<Box<dyn SourceAdapter>> = config
            .board_urls
            .iter()
            .map(|url| Box::new(BoardAdapter::new(url.clone(), config.board_pages)) as Box<dyn SourceAdapter>)
            .collect();

        if let Some(url) = &config.department_url {
            sources.push(Box::new(DepartmentAdapter::new(
                url.clone(),
                config.department_pages,
                config.department_board.clone(),
            )));
        }
        if config.job_feed_enabled {
            sources.push(Box::new(JobFeedAdapter::new(config.job_feed.clone())));
        }

        Self::new(fetcher, sources)
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub async fn run_all(&self) -> BoardListings {
        info!("Crawl started over {} sources", self.sources.len());
        let mut result = BoardListings::new();

        for source in &self.sources {
            let part = source.collect(self.fetcher.as_ref()).await;
            let count: usize = part.values().map(Vec::len).sum();
            info!("{}: {count} records in {} boards", source.describe(), part.len());
            merge_into(&mut result, part);
        }

        let total: usize = result.values().map(Vec::len).sum();
        info!("Crawl finished: {total} records in {} boards", result.len());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::fetch::testing::StubFetcher;
    use crate::crawl::job_feed::{JobFeedConfig, DEFAULT_BOARD as JOB_BOARD};
    use serde_json::json;

    const LIST_A: &str = "https://u.test/www/selectBbsNttList.do?bbsNo=1";
    const LIST_B: &str = "https://u.test/www/selectBbsNttList.do?bbsNo=2";
    const DETAIL: &str = "https://u.test/www/selectBbsNttView.do?nttNo=";

    fn detail(board: &str, title: &str) -> String {
        format!(
            r#"<div class="sub_title"><h2>{board}</h2></div>
            <table><tr class="subject"><td>{title}</td></tr></table>"#
        )
    }

    fn list(ids: &[u32]) -> String {
        ids.iter()
            .map(|id| format!(r#"<a href="javascript:fn_selectBbsNttView('{id}')">{id}</a>"#))
            .collect()
    }

    fn two_boards() -> StubFetcher {
        StubFetcher::new()
            .page(&format!("{LIST_A}&pageIndex=1"), &list(&[1, 2]))
            .page(&format!("{LIST_B}&pageIndex=1"), &list(&[3, 4]))
            .page(&format!("{DETAIL}1"), &detail("장학공지", "A1"))
            .page(&format!("{DETAIL}2"), &detail("학사공지", "A2"))
            .page(&format!("{DETAIL}3"), &detail("장학공지", "B1"))
            .page(&format!("{DETAIL}4"), &detail("장학공지", "B2"))
    }

    fn titles(listings: &BoardListings, board: &str) -> Vec<String> {
        listings[board]
            .iter()
            .map(|d| d.title.clone().unwrap_or_default())
            .collect()
    }

    #[tokio::test]
    async fn test_shared_board_name_merges_in_order() {
        let aggregator = Aggregator::new(
            Arc::new(two_boards()),
            vec![
                Box::new(BoardAdapter::new(LIST_A, 1)),
                Box::new(BoardAdapter::new(LIST_B, 1)),
            ],
        );

        let result = aggregator.run_all().await;

        assert_eq!(titles(&result, "장학공지"), vec!["A1", "B1", "B2"]);
        assert_eq!(titles(&result, "학사공지"), vec!["A2"]);
    }

    #[tokio::test]
    async fn test_from_config_orders_sources() {
        let config = CrawlConfig {
            board_urls: vec![LIST_A.to_string(), LIST_B.to_string()],
            department_url: None,
            job_feed_enabled: false,
            ..CrawlConfig::default()
        };
        let aggregator = Aggregator::from_config(Arc::new(two_boards()), &config);
        assert_eq!(aggregator.source_count(), 2);

        let result = aggregator.run_all().await;
        assert_eq!(titles(&result, "장학공지"), vec!["A1", "B1", "B2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_job_feed_lands_under_synthetic_board() {
        let feed = JobFeedConfig {
            base: "https://jobs.test".to_string(),
            max_pages: 1,
            ..JobFeedConfig::default()
        };
        let feed_url = "https://jobs.test/api/common/ntc-list/00/00/1?perPage=9&inqSlctn=00&inqVal=";
        let fetcher = two_boards().page(
            feed_url,
            &json!({"response": {"list": [{"ttl": "J1"}], "pagination": {"totPage": 1}}}).to_string(),
        );
        let aggregator = Aggregator::new(
            Arc::new(fetcher),
            vec![
                Box::new(BoardAdapter::new(LIST_A, 1)),
                Box::new(JobFeedAdapter::new(feed)),
            ],
        );

        let result = aggregator.run_all().await;

        assert_eq!(titles(&result, JOB_BOARD), vec!["J1"]);
        assert_eq!(titles(&result, "장학공지"), vec!["A1"]);
    }
}
