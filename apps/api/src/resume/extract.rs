//! Résumé document → structured fields.
//!
//! Extraction never fails a request: unreadable documents, LLM errors and
//! malformed replies all produce [`ResumeExtraction::default`], whose profile
//! is empty.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{Datelike, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::llm_client::{extract_json_object, LlmClient};
use crate::models::ResumeProfile;
use crate::resume::prompts::{RESUME_EXTRACT_PROMPT, RESUME_EXTRACT_SYSTEM};

/// Everything the extraction step reports about a résumé.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResumeExtraction {
    pub name: String,
    pub major: String,
    pub grade: String,
    pub graduation_year: String,
    pub certificates: Vec<String>,
    pub field: String,
}

impl ResumeExtraction {
    pub fn profile(&self) -> ResumeProfile {
        ResumeProfile {
            major: self.major.clone(),
            grade: self.grade.clone(),
            certificates: self.certificates.clone(),
        }
    }
}

#[async_trait]
pub trait ProfileExtractor: Send + Sync {
    async fn extract(&self, document: Bytes) -> ResumeExtraction;
}

/// Used when no LLM key is configured.
pub struct DisabledExtractor;

#[async_trait]
impl ProfileExtractor for DisabledExtractor {
    async fn extract(&self, document: Bytes) -> ResumeExtraction {
        debug!("Résumé extraction disabled, ignoring {} byte document", document.len());
        ResumeExtraction::default()
    }
}

pub struct LlmProfileExtractor {
    llm: LlmClient,
}

impl LlmProfileExtractor {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ProfileExtractor for LlmProfileExtractor {
    async fn extract(&self, document: Bytes) -> ResumeExtraction {
        let Some(text) = document_text(document).await else {
            warn!("No text could be extracted from the uploaded résumé");
            return ResumeExtraction::default();
        };
        info!("Extracted {} chars of résumé text", text.chars().count());

        let prompt = RESUME_EXTRACT_PROMPT.replace("{resume_text}", &text);
        match self.llm.call_text(&prompt, RESUME_EXTRACT_SYSTEM).await {
            Ok(reply) => parse_extraction_reply(&reply, Utc::now().year()),
            Err(e) => {
                warn!("Résumé extraction call failed: {e}");
                ResumeExtraction::default()
            }
        }
    }
}

/// Text of a PDF, or of a plain UTF-8 document. `None` when empty or unreadable.
pub async fn document_text(document: Bytes) -> Option<String> {
    let text = if document.starts_with(b"%PDF") {
        // pdf-extract is CPU-bound and may panic on hostile input
        match tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&document)).await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                warn!("PDF text extraction failed: {e}");
                return None;
            }
            Err(e) => {
                warn!("PDF text extraction aborted: {e}");
                return None;
            }
        }
    } else {
        String::from_utf8(document.to_vec()).ok()?
    };

    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Parses the model's reply. Anything unparsable yields the empty extraction.
pub fn parse_extraction_reply(reply: &str, current_year: i32) -> ResumeExtraction {
    let json: Value = match serde_json::from_str(extract_json_object(reply)) {
        Ok(json @ Value::Object(_)) => json,
        Ok(other) => {
            warn!("Résumé extraction reply is not an object: {other}");
            return ResumeExtraction::default();
        }
        Err(e) => {
            warn!("Résumé extraction reply is not JSON ({e}): {reply}");
            return ResumeExtraction::default();
        }
    };

    let text = |key: &str| {
        json.get(key)
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    };

    let mut extraction = ResumeExtraction {
        name: text("name"),
        major: text("major"),
        grade: text("grade"),
        graduation_year: text("graduation_year"),
        certificates: json.get("certificates").map(split_certificates).unwrap_or_default(),
        field: text("field"),
    };

    if let Some(grade) = infer_grade(&extraction.graduation_year, current_year) {
        extraction.grade = grade;
    }
    extraction
}

/// Accepts `"a, b"` or `["a", "b"]`; names are trimmed and blanks dropped.
pub fn split_certificates(value: &Value) -> Vec<String> {
    let names: Vec<&str> = match value {
        Value::String(s) => s.split(',').collect(),
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    };
    names
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Year of study implied by a graduation year, assuming a four-year program.
/// `None` unless the result falls in 1..=4.
pub fn infer_grade(graduation_year: &str, current_year: i32) -> Option<String> {
    let graduation_year: i32 = graduation_year.trim().parse().ok()?;
    let grade = current_year - graduation_year + 5;
    (1..=4).contains(&grade).then(|| format!("{grade}학년"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_infer_grade() {
        assert_eq!(infer_grade("2027", 2025).as_deref(), Some("3학년"));
        assert_eq!(infer_grade("2029", 2025).as_deref(), Some("1학년"));
        assert_eq!(infer_grade("2026", 2025).as_deref(), Some("4학년"));
        assert_eq!(infer_grade("2020", 2025), None);
        assert_eq!(infer_grade("2031", 2025), None);
        assert_eq!(infer_grade("", 2025), None);
        assert_eq!(infer_grade("내년", 2025), None);
    }

    #[test]
    fn test_split_certificates_string_and_array() {
        assert_eq!(
            split_certificates(&json!("정보처리기사, AWS 자격증 ,, ")),
            vec!["정보처리기사", "AWS 자격증"]
        );
        assert_eq!(split_certificates(&json!(["SQLD", " ", 3])), vec!["SQLD"]);
        assert!(split_certificates(&json!(null)).is_empty());
    }

    #[test]
    fn test_parse_reply_with_fence_and_grade_override() {
        let reply = "```json\n{\"name\":\"홍길동\",\"major\":\"컴퓨터공학과\",\"grade\":\"2학년\",\
                     \"graduation_year\":\"2027\",\"certificates\":\"정보처리기사, SQLD\",\"field\":\"백엔드 개발\"}\n```";
        let extraction = parse_extraction_reply(reply, 2025);
        assert_eq!(extraction.name, "홍길동");
        assert_eq!(extraction.grade, "3학년");
        assert_eq!(extraction.certificates, vec!["정보처리기사", "SQLD"]);
        assert_eq!(
            extraction.profile(),
            ResumeProfile {
                major: "컴퓨터공학과".to_string(),
                grade: "3학년".to_string(),
                certificates: vec!["정보처리기사".to_string(), "SQLD".to_string()],
            }
        );
    }

    #[test]
    fn test_parse_reply_keeps_stated_grade_without_year() {
        let extraction = parse_extraction_reply(r#"{"major": "경영학과", "grade": "4학년"}"#, 2025);
        assert_eq!(extraction.grade, "4학년");
        assert_eq!(extraction.graduation_year, "");
    }

    #[test]
    fn test_unparsable_reply_is_empty() {
        assert_eq!(parse_extraction_reply("Sorry, I cannot help.", 2025), ResumeExtraction::default());
        assert_eq!(parse_extraction_reply("[1, 2]", 2025), ResumeExtraction::default());
        assert!(parse_extraction_reply("{oops}", 2025).profile().is_empty());
    }

    #[tokio::test]
    async fn test_document_text_plain_and_garbage() {
        assert_eq!(
            document_text(Bytes::from_static("  전공: 경영학과 \n".as_bytes())).await.as_deref(),
            Some("전공: 경영학과")
        );
        assert_eq!(document_text(Bytes::from_static(&[0xff, 0xfe, 0x00])).await, None);
        assert_eq!(document_text(Bytes::from_static(b"   ")).await, None);
        assert_eq!(document_text(Bytes::from_static(b"%PDF-1.7 truncated")).await, None);
    }

    #[tokio::test]
    async fn test_disabled_extractor_yields_empty_profile() {
        let extraction = DisabledExtractor.extract(Bytes::from_static(b"resume")).await;
        assert!(extraction.profile().is_empty());
    }

    #[tokio::test]
    async fn test_llm_extractor_skips_call_for_unreadable_document() {
        let extractor = LlmProfileExtractor::new(LlmClient::new("test-key".to_string()).unwrap());
        let extraction = extractor.extract(Bytes::from_static(&[0xff, 0xff])).await;
        assert_eq!(extraction, ResumeExtraction::default());
    }
}
