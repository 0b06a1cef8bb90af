//! Résumé → listing filter.
//!
//! Three criteria are compared: major (normalized, substring either way),
//! grade (exact) and certificates (any overlap). [`MatchMode::Any`] keeps a
//! listing when one criterion holds; [`MatchMode::All`] is the stricter legacy
//! mode. Input order is kept and nothing is mutated, so running the same
//! profile twice yields the same result.

use serde::{Deserialize, Serialize};

use crate::models::{Listing, ResumeProfile};
use crate::normalize::MajorNormalizer;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// A listing qualifies if any criterion matches.
    #[default]
    Any,
    /// Major and grade must both match; listed certificates must overlap.
    All,
}

pub struct Matcher<'a> {
    majors: &'a MajorNormalizer,
}

impl<'a> Matcher<'a> {
    pub fn new(majors: &'a MajorNormalizer) -> Self {
        Self { majors }
    }

    pub fn major_matches(&self, profile_major: &str, listing_major: Option<&str>) -> bool {
        if self.majors.is_wildcard(profile_major) {
            return true;
        }
        let Some(listing_major) = listing_major else {
            return false;
        };
        let wanted = self.majors.normalize(profile_major);
        let offered = self.majors.normalize(listing_major);
        if wanted.is_empty() || offered.is_empty() {
            return false;
        }
        wanted.contains(&offered) || offered.contains(&wanted)
    }

    pub fn is_match(&self, profile: &ResumeProfile, listing: &Listing, mode: MatchMode) -> bool {
        let draft = &listing.draft;
        let major = self.major_matches(&profile.major, draft.major.as_deref());
        let grade = grade_matches(&profile.grade, draft.grade.as_deref());

        match mode {
            MatchMode::Any => {
                major || grade || certificates_overlap(&profile.certificates, &draft.certificates)
            }
            MatchMode::All => {
                let certificates = draft.certificates.is_empty()
                    || certificates_overlap(&profile.certificates, &draft.certificates);
                major && grade && certificates
            }
        }
    }

    /// Listings that qualify for `profile`, in input order.
    pub fn filter(&self, profile: &ResumeProfile, listings: &[Listing], mode: MatchMode) -> Vec<Listing> {
        listings
            .iter()
            .filter(|listing| self.is_match(profile, listing, mode))
            .cloned()
            .collect()
    }
}

fn grade_matches(profile_grade: &str, listing_grade: Option<&str>) -> bool {
    match listing_grade {
        Some(grade) => !grade.is_empty() && grade == profile_grade,
        None => false,
    }
}

fn certificates_overlap(held: &[String], wanted: &[String]) -> bool {
    held.iter().any(|cert| wanted.contains(cert))
}
