//! Field normalization shared by the crawl adapters and the résumé matcher.

pub mod date;
pub mod major;

pub use major::MajorNormalizer;
