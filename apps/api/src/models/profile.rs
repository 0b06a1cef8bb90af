use serde::{Deserialize, Serialize};

/// Structured résumé fields used to filter listings. Lives for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeProfile {
    #[serde(default)]
    pub major: String,
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub certificates: Vec<String>,
}

impl ResumeProfile {
    pub fn is_empty(&self) -> bool {
        self.major.trim().is_empty() && self.grade.trim().is_empty() && self.certificates.is_empty()
    }
}
