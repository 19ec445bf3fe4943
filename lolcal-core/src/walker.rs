//! Pagination walker for the schedule feed.
//!
//! The feed pages in two directions from the initial request: `newer`
//! tokens toward upcoming events and `older` tokens toward past ones. The
//! walker follows newer tokens to exhaustion first, then older tokens from
//! the initial page, yielding one event batch per fetch.
//!
//! A direction ends on a missing or empty continuation token, or on a token
//! the walk has already followed. The seen set spans both directions, so a
//! remote replaying tokens (in sequence or ping-ponging between
//! directions) terminates instead of looping.

use std::collections::HashSet;

use crate::client::{EventRecord, ScheduleSource};
use crate::error::Result;

/// A lazy, pull-based walk over the schedule feed. Each walk starts from
/// the initial page; nothing is cached across walks.
pub struct ScheduleWalker<'a, S> {
    source: &'a S,
    state: WalkState,
    older_start: Option<String>,
    seen: HashSet<String>,
}

enum WalkState {
    Start,
    Newer(String),
    OlderStart,
    Older(String),
    Done,
}

impl<'a, S: ScheduleSource> ScheduleWalker<'a, S> {
    pub fn new(source: &'a S) -> Self {
        ScheduleWalker {
            source,
            state: WalkState::Start,
            older_start: None,
            seen: HashSet::new(),
        }
    }

    /// The next event batch, or `None` once both directions are exhausted.
    pub async fn next_page(&mut self) -> Result<Option<Vec<EventRecord>>> {
        loop {
            match std::mem::replace(&mut self.state, WalkState::Done) {
                WalkState::Start => {
                    let page = self.source.fetch_schedule(None).await?;
                    self.older_start = page.older;
                    self.advance_newer(page.newer);
                    return Ok(Some(page.events));
                }
                WalkState::Newer(token) => {
                    let page = self.source.fetch_schedule(Some(&token)).await?;
                    self.advance_newer(page.newer);
                    return Ok(Some(page.events));
                }
                WalkState::OlderStart => {
                    let token = self.older_start.take();
                    self.advance_older(token);
                    // No fetch happened; resolve the new state.
                }
                WalkState::Older(token) => {
                    let page = self.source.fetch_schedule(Some(&token)).await?;
                    self.advance_older(page.older);
                    return Ok(Some(page.events));
                }
                WalkState::Done => return Ok(None),
            }
        }
    }

    fn advance_newer(&mut self, token: Option<String>) {
        self.state = match self.claim(token) {
            Some(token) => WalkState::Newer(token),
            None => WalkState::OlderStart,
        };
    }

    fn advance_older(&mut self, token: Option<String>) {
        self.state = match self.claim(token) {
            Some(token) => WalkState::Older(token),
            None => WalkState::Done,
        };
    }

    /// A token may be followed once: empty, absent, and repeated tokens
    /// all read as exhaustion.
    fn claim(&mut self, token: Option<String>) -> Option<String> {
        token
            .filter(|t| !t.is_empty())
            .filter(|t| self.seen.insert(t.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{LeagueRecord, SchedulePage};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted schedule source: one initial page plus token-addressed
    /// follow-ups, counting every fetch.
    struct FakeSource {
        initial: SchedulePage,
        pages: HashMap<String, SchedulePage>,
        fetches: AtomicUsize,
    }

    impl FakeSource {
        fn new(initial: SchedulePage, pages: Vec<(&str, SchedulePage)>) -> Self {
            FakeSource {
                initial,
                pages: pages
                    .into_iter()
                    .map(|(token, page)| (token.to_string(), page))
                    .collect(),
                fetches: AtomicUsize::new(0),
            }
        }

        fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    impl ScheduleSource for FakeSource {
        async fn fetch_leagues(&self) -> Result<Vec<LeagueRecord>> {
            Ok(Vec::new())
        }

        async fn fetch_schedule(&self, page_token: Option<&str>) -> Result<SchedulePage> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            match page_token {
                None => Ok(self.initial.clone()),
                Some(token) => Ok(self.pages.get(token).cloned().unwrap_or_default()),
            }
        }
    }

    fn match_event(id: &str) -> EventRecord {
        let json = format!(
            r#"{{
                "type": "match",
                "startTime": "2024-01-01T00:00:00Z",
                "league": {{"slug": "lck"}},
                "match": {{"id": "{id}", "strategy": {{"count": 3}}, "teams": []}}
            }}"#
        );
        serde_json::from_str(&json).unwrap()
    }

    fn page(ids: &[&str], newer: Option<&str>, older: Option<&str>) -> SchedulePage {
        SchedulePage {
            events: ids.iter().map(|id| match_event(id)).collect(),
            newer: newer.map(str::to_string),
            older: older.map(str::to_string),
        }
    }

    async fn collect_ids<S: ScheduleSource>(walker: &mut ScheduleWalker<'_, S>) -> Vec<String> {
        let mut ids = Vec::new();
        while let Some(events) = walker.next_page().await.unwrap() {
            for event in events {
                ids.push(event.match_detail.unwrap().id);
            }
        }
        ids
    }

    #[tokio::test]
    async fn walk_terminates_after_last_page() {
        let source = FakeSource::new(
            page(&["m1"], Some("a"), None),
            vec![
                ("a", page(&["m2"], Some("b"), None)),
                ("b", page(&["m3"], None, None)),
            ],
        );

        let mut walker = ScheduleWalker::new(&source);
        let ids = collect_ids(&mut walker).await;

        assert_eq!(ids, vec!["m1", "m2", "m3"]);
        assert_eq!(source.fetch_count(), 3);
    }

    #[tokio::test]
    async fn repeated_token_reads_as_exhaustion() {
        // Token sequence [a, b, a]: the second "a" must end the walk.
        let source = FakeSource::new(
            page(&["m1"], Some("a"), None),
            vec![
                ("a", page(&["m2"], Some("b"), None)),
                ("b", page(&["m3"], Some("a"), None)),
            ],
        );

        let mut walker = ScheduleWalker::new(&source);
        let ids = collect_ids(&mut walker).await;

        assert_eq!(ids, vec!["m1", "m2", "m3"]);
        assert_eq!(source.fetch_count(), 3);
    }

    #[tokio::test]
    async fn walks_newer_then_older_from_initial_page() {
        let source = FakeSource::new(
            page(&["m2"], Some("n1"), Some("o1")),
            vec![
                ("n1", page(&["m3"], None, None)),
                ("o1", page(&["m1"], None, Some("o2"))),
                ("o2", page(&["m0"], None, None)),
            ],
        );

        let mut walker = ScheduleWalker::new(&source);
        let ids = collect_ids(&mut walker).await;

        assert_eq!(ids, vec!["m2", "m3", "m1", "m0"]);
        assert_eq!(source.fetch_count(), 4);
    }

    #[tokio::test]
    async fn empty_token_ends_the_direction() {
        let source = FakeSource::new(page(&["m1"], Some(""), Some("")), vec![]);

        let mut walker = ScheduleWalker::new(&source);
        let ids = collect_ids(&mut walker).await;

        assert_eq!(ids, vec!["m1"]);
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn older_direction_cannot_replay_a_newer_token() {
        // The initial page's older token was already walked as a newer
        // token; the shared seen set must stop the second direction.
        let source = FakeSource::new(
            page(&["m1"], Some("a"), Some("a")),
            vec![("a", page(&["m2"], None, None))],
        );

        let mut walker = ScheduleWalker::new(&source);
        let ids = collect_ids(&mut walker).await;

        assert_eq!(ids, vec!["m1", "m2"]);
        assert_eq!(source.fetch_count(), 2);
    }

    #[tokio::test]
    async fn each_walk_is_independent() {
        let source = FakeSource::new(page(&["m1"], None, None), vec![]);

        let mut first = ScheduleWalker::new(&source);
        assert_eq!(collect_ids(&mut first).await, vec!["m1"]);
        let mut second = ScheduleWalker::new(&source);
        assert_eq!(collect_ids(&mut second).await, vec!["m1"]);
        assert_eq!(source.fetch_count(), 2);
    }
}
