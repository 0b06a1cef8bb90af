//! Crawl pipeline: source adapters feeding one aggregator.
//!
//! Adapters own their pagination and markup quirks and hand back drafts
//! grouped by board name. Fetch and parse failures stay inside the adapter
//! (logged, then skipped) so one bad page never aborts a run.

pub mod aggregator;
pub mod board;
pub mod department;
pub mod fetch;
pub mod handlers;
pub mod html;
pub mod job_feed;

use std::collections::BTreeMap;

use async_trait::async_trait;
use tracing::debug;

use crate::crawl::fetch::Fetcher;
use crate::models::ListingDraft;

/// Board name → drafts in the order the source produced them.
pub type BoardListings = BTreeMap<String, Vec<ListingDraft>>;

#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Short human label for logs.
    fn describe(&self) -> String;

    async fn collect(&self, fetcher: &dyn Fetcher) -> BoardListings;
}

/// Appends `draft` under its board, dropping it if it has no title.
pub(crate) fn push_draft(grouped: &mut BoardListings, draft: ListingDraft) {
    if !draft.has_title() {
        debug!("Dropping untitled record from {:?}", draft.url);
        return;
    }
    grouped.entry(draft.board.clone()).or_default().push(draft);
}

/// Appends every group of `part` onto `into`, keeping order within a board.
pub fn merge_into(into: &mut BoardListings, part: BoardListings) {
    for (board, drafts) in part {
        into.entry(board).or_default().extend(drafts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(board: &str, title: &str) -> ListingDraft {
        ListingDraft {
            title: Some(title.to_string()),
            ..ListingDraft::new(board)
        }
    }

    #[test]
    fn test_push_draft_drops_untitled() {
        let mut grouped = BoardListings::new();
        push_draft(&mut grouped, ListingDraft::new("a"));
        push_draft(&mut grouped, draft("a", " "));
        assert!(grouped.is_empty());
        push_draft(&mut grouped, draft("a", "x"));
        assert_eq!(grouped["a"].len(), 1);
    }

    #[test]
    fn test_merge_appends_in_order() {
        let mut all = BoardListings::new();
        let mut first = BoardListings::new();
        first.insert("a".into(), vec![draft("a", "1"), draft("a", "2")]);
        let mut second = BoardListings::new();
        second.insert("a".into(), vec![draft("a", "3")]);
        second.insert("b".into(), vec![draft("b", "4")]);

        merge_into(&mut all, first);
        merge_into(&mut all, second);

        let titles: Vec<_> = all["a"].iter().map(|d| d.title.clone().unwrap()).collect();
        assert_eq!(titles, vec!["1", "2", "3"]);
        assert_eq!(all["b"].len(), 1);
    }
}
