pub mod listing;
pub mod profile;

pub use listing::{Listing, ListingDraft};
pub use profile::ResumeProfile;
