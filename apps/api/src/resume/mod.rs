pub mod extract;
pub mod handlers;
pub mod prompts;

pub use extract::{DisabledExtractor, LlmProfileExtractor, ProfileExtractor, ResumeExtraction};
