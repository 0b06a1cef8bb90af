use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::crawl::department::DEFAULT_BOARD as DEPARTMENT_BOARD;
use crate::crawl::job_feed::JobFeedConfig;

pub const DEFAULT_BOARD_URLS: [&str; 4] = [
    "https://wwwk.kangwon.ac.kr/www/selectBbsNttList.do?bbsNo=37&key=1176",
    "https://wwwk.kangwon.ac.kr/www/selectBbsNttList.do?bbsNo=81&key=277",
    "https://wwwk.kangwon.ac.kr/www/selectBbsNttList.do?bbsNo=34&key=232",
    "https://wwwk.kangwon.ac.kr/www/selectBbsNttList.do?bbsNo=117&key=768",
];
pub const DEFAULT_DEPARTMENT_URL: &str = "https://tourism.kangwon.ac.kr/tourism/community/notice.do";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Redis,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            other => bail!("unknown store backend '{other}' (expected postgres, redis or memory)"),
        }
    }
}

/// What the crawl pipeline visits and how it stores the result.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub board_urls: Vec<String>,
    pub board_pages: u32,
    /// `None` disables the department board.
    pub department_url: Option<String>,
    pub department_pages: u32,
    pub department_board: String,
    pub job_feed_enabled: bool,
    pub job_feed: JobFeedConfig,
    pub timeout: Duration,
    pub dedup_by_url: bool,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            board_urls: DEFAULT_BOARD_URLS.iter().map(|u| u.to_string()).collect(),
            board_pages: 3,
            department_url: Some(DEFAULT_DEPARTMENT_URL.to_string()),
            department_pages: 3,
            department_board: DEPARTMENT_BOARD.to_string(),
            job_feed_enabled: true,
            job_feed: JobFeedConfig::default(),
            timeout: Duration::from_secs(20),
            dedup_by_url: false,
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if the selected store backend has no connection URL.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    /// Résumé extraction is disabled without it.
    pub anthropic_api_key: Option<String>,
    pub major_synonyms_path: Option<PathBuf>,
    pub crawl: CrawlConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let store_backend = match get("STORE_BACKEND") {
            Some(raw) => raw.parse().context("STORE_BACKEND is invalid")?,
            None => StoreBackend::Postgres,
        };
        let database_url = get("DATABASE_URL");
        let redis_url = get("REDIS_URL");
        match store_backend {
            StoreBackend::Postgres if database_url.is_none() => {
                bail!("Required environment variable 'DATABASE_URL' is not set")
            }
            StoreBackend::Redis if redis_url.is_none() => {
                bail!("Required environment variable 'REDIS_URL' is not set")
            }
            _ => {}
        }

        let defaults = CrawlConfig::default();
        let job_defaults = defaults.job_feed.clone();

        let crawl = CrawlConfig {
            board_urls: match get("CRAWL_BOARD_URLS") {
                Some(raw) => split_list(&raw),
                None => defaults.board_urls,
            },
            board_pages: parse_or(&get, "CRAWL_BOARD_PAGES", defaults.board_pages)?,
            department_url: match lookup("CRAWL_DEPARTMENT_URL") {
                // explicitly blank turns the department board off
                Some(raw) => Some(raw.trim().to_string()).filter(|u| !u.is_empty()),
                None => defaults.department_url,
            },
            department_pages: parse_or(&get, "CRAWL_DEPARTMENT_PAGES", defaults.department_pages)?,
            department_board: get("CRAWL_DEPARTMENT_BOARD").unwrap_or(defaults.department_board),
            job_feed_enabled: parse_flag(&get, "JOB_FEED_ENABLED", defaults.job_feed_enabled)?,
            job_feed: JobFeedConfig {
                base: get("JOB_FEED_BASE").unwrap_or(job_defaults.base),
                auth_mid: get("JOB_FEED_AUTH_MID").unwrap_or(job_defaults.auth_mid),
                category_big: get("JOB_FEED_CATEGORY_BIG").unwrap_or(job_defaults.category_big),
                category_mid: get("JOB_FEED_CATEGORY_MID").unwrap_or(job_defaults.category_mid),
                max_pages: parse_or(&get, "JOB_FEED_MAX_PAGES", job_defaults.max_pages)?,
                per_page: parse_or(&get, "JOB_FEED_PER_PAGE", job_defaults.per_page)?,
                board: get("JOB_FEED_BOARD").unwrap_or(job_defaults.board),
                page_delay: Duration::from_millis(parse_or(
                    &get,
                    "JOB_FEED_DELAY_MS",
                    job_defaults.page_delay.as_millis() as u64,
                )?),
            },
            timeout: Duration::from_secs(parse_or(
                &get,
                "CRAWL_TIMEOUT_SECS",
                defaults.timeout.as_secs(),
            )?),
            dedup_by_url: parse_flag(&get, "CRAWL_DEDUP_BY_URL", defaults.dedup_by_url)?,
        };

        Ok(Config {
            port: parse_or(&get, "PORT", 8080)?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            store_backend,
            database_url,
            redis_url,
            anthropic_api_key: get("ANTHROPIC_API_KEY"),
            major_synonyms_path: get("MAJOR_SYNONYMS_PATH").map(PathBuf::from),
            crawl,
        })
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match get(key) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}

fn parse_flag(get: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> Result<bool> {
    match get(key).map(|v| v.to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(true),
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => Ok(false),
        Some(v) => bail!("{key} must be true or false, got '{v}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_with_memory_backend() {
        let config = config(&[("STORE_BACKEND", "memory")]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.rust_log, "info");
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert!(config.anthropic_api_key.is_none());
        assert_eq!(config.crawl.board_urls.len(), 4);
        assert_eq!(config.crawl.board_pages, 3);
        assert_eq!(config.crawl.department_url.as_deref(), Some(DEFAULT_DEPARTMENT_URL));
        assert!(config.crawl.job_feed_enabled);
        assert_eq!(config.crawl.job_feed.per_page, 9);
        assert_eq!(config.crawl.job_feed.page_delay, Duration::from_millis(300));
        assert_eq!(config.crawl.timeout, Duration::from_secs(20));
        assert!(!config.crawl.dedup_by_url);
    }

    #[test]
    fn test_postgres_requires_database_url() {
        let err = config(&[]).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
        let config = config(&[("DATABASE_URL", "postgres://localhost/listings")]).unwrap();
        assert_eq!(config.store_backend, StoreBackend::Postgres);
    }

    #[test]
    fn test_redis_requires_redis_url() {
        assert!(config(&[("STORE_BACKEND", "redis")]).is_err());
        assert!(config(&[("STORE_BACKEND", "Redis"), ("REDIS_URL", "redis://127.0.0.1/")]).is_ok());
        assert!(config(&[("STORE_BACKEND", "mongo")]).is_err());
    }

    #[test]
    fn test_crawl_overrides() {
        let config = config(&[
            ("STORE_BACKEND", "memory"),
            ("CRAWL_BOARD_URLS", "https://a.test/list, ,https://b.test/list"),
            ("CRAWL_DEPARTMENT_URL", "  "),
            ("JOB_FEED_ENABLED", "false"),
            ("JOB_FEED_MAX_PAGES", "5"),
            ("JOB_FEED_DELAY_MS", "0"),
            ("CRAWL_DEDUP_BY_URL", "yes"),
            ("ANTHROPIC_API_KEY", "sk-test"),
        ])
        .unwrap();
        assert_eq!(config.crawl.board_urls, vec!["https://a.test/list", "https://b.test/list"]);
        assert_eq!(config.crawl.department_url, None);
        assert!(!config.crawl.job_feed_enabled);
        assert_eq!(config.crawl.job_feed.max_pages, 5);
        assert_eq!(config.crawl.job_feed.page_delay, Duration::ZERO);
        assert!(config.crawl.dedup_by_url);
        assert_eq!(config.anthropic_api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_invalid_numbers_and_flags_are_errors() {
        assert!(config(&[("STORE_BACKEND", "memory"), ("PORT", "eighty")]).is_err());
        assert!(config(&[("STORE_BACKEND", "memory"), ("CRAWL_DEDUP_BY_URL", "maybe")]).is_err());
    }
}
