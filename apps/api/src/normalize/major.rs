//! Major-name canonicalization for résumé matching.
//!
//! Majors are lowercased, trimmed and whitespace-collapsed, then looked up in
//! a synonym table mapping each variant to a canonical label. The built-in
//! table can be extended from a JSON file of the form
//! `{"<canonical>": ["<variant>", ...]}`; file groups are merged over the
//! defaults.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

/// Profile values that match every listing's major.
const WILDCARDS: &[&str] = &["any", "all", "*", "전체", "무관"];

const DEFAULT_SYNONYMS: &[(&str, &[&str])] = &[
    (
        "컴퓨터공학",
        &[
            "컴퓨터공학과",
            "컴퓨터공학부",
            "컴퓨터과학",
            "컴퓨터과학과",
            "컴퓨터정보공학",
            "소프트웨어공학",
            "소프트웨어공학과",
            "소프트웨어학과",
            "computer science",
            "computer engineering",
        ],
    ),
    (
        "전자공학",
        &["전자공학과", "전자공학부", "전자전기공학", "전기전자공학", "electrical engineering"],
    ),
    (
        "경영학",
        &["경영학과", "경영학부", "business administration"],
    ),
    (
        "관광학",
        &["관광경영학과", "관광학과", "관광경영", "tourism"],
    ),
];

/// Lowercase, trim, and collapse runs of whitespace.
pub fn clean(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[derive(Debug, Clone)]
pub struct MajorNormalizer {
    /// cleaned variant → canonical label
    lookup: HashMap<String, String>,
}

impl Default for MajorNormalizer {
    fn default() -> Self {
        let groups = DEFAULT_SYNONYMS
            .iter()
            .map(|(canonical, variants)| {
                (
                    canonical.to_string(),
                    variants.iter().map(|v| v.to_string()).collect(),
                )
            })
            .collect();
        Self::from_groups(groups)
    }
}

impl MajorNormalizer {
    pub fn from_groups(groups: BTreeMap<String, Vec<String>>) -> Self {
        let mut normalizer = Self {
            lookup: HashMap::new(),
        };
        normalizer.extend(groups);
        normalizer
    }

    /// Adds groups to the table. A variant already mapped elsewhere is re-pointed.
    pub fn extend(&mut self, groups: BTreeMap<String, Vec<String>>) {
        for (canonical, variants) in groups {
            let label = clean(&canonical);
            self.lookup.insert(label.clone(), label.clone());
            for variant in variants {
                self.lookup.insert(clean(&variant), label.clone());
            }
        }
    }

    /// Defaults plus the groups from `path`, if one is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut normalizer = Self::default();
        if let Some(path) = path {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read major synonyms from {}", path.display()))?;
            let groups: BTreeMap<String, Vec<String>> = serde_json::from_str(&raw)
                .with_context(|| format!("Malformed major synonyms file {}", path.display()))?;
            info!("Loaded {} major synonym groups from {}", groups.len(), path.display());
            normalizer.extend(groups);
        }
        Ok(normalizer)
    }

    pub fn normalize(&self, raw: &str) -> String {
        let cleaned = clean(raw);
        match self.lookup.get(&cleaned) {
            Some(label) => label.clone(),
            None => cleaned,
        }
    }

    pub fn is_wildcard(&self, raw: &str) -> bool {
        let cleaned = clean(raw);
        WILDCARDS.contains(&cleaned.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_clean_collapses_whitespace_and_case() {
        assert_eq!(clean("  Computer   Science "), "computer science");
    }

    #[test]
    fn test_cs_synonyms_share_a_label() {
        let n = MajorNormalizer::default();
        assert_eq!(n.normalize("컴퓨터과학"), n.normalize("컴퓨터공학과"));
        assert_eq!(n.normalize("소프트웨어공학"), "컴퓨터공학");
        assert_eq!(n.normalize("Computer  Science"), "컴퓨터공학");
    }

    #[test]
    fn test_unknown_major_is_only_cleaned() {
        let n = MajorNormalizer::default();
        assert_eq!(n.normalize(" 정보기술학 "), "정보기술학");
        assert_eq!(n.normalize("IT"), "it");
    }

    #[test]
    fn test_wildcards() {
        let n = MajorNormalizer::default();
        assert!(n.is_wildcard("any"));
        assert!(n.is_wildcard(" ANY "));
        assert!(n.is_wildcard("전체"));
        assert!(!n.is_wildcard("컴퓨터공학"));
        assert!(!n.is_wildcard(""));
    }

    #[test]
    fn test_load_merges_file_over_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"정보기술": ["IT", "정보통신"]}}"#).unwrap();

        let n = MajorNormalizer::load(Some(file.path())).unwrap();
        assert_eq!(n.normalize("it"), "정보기술");
        assert_eq!(n.normalize("정보통신"), "정보기술");
        // defaults survive
        assert_eq!(n.normalize("컴퓨터과학"), "컴퓨터공학");
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(MajorNormalizer::load(Some(file.path())).is_err());
    }

    #[test]
    fn test_load_without_path_is_default() {
        let n = MajorNormalizer::load(None).unwrap();
        assert_eq!(n.normalize("컴퓨터공학부"), "컴퓨터공학");
    }
}
