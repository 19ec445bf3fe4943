//! Rendered-calendar cache.
//!
//! A flat key-to-bytes map behind one lock. Keys are the normalized league
//! slug set, so request order and duplicates collapse onto the same entry.
//! The only invalidation is the wholesale clear a sync issues; entries have
//! no TTL.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::error::{Error, Result};
use crate::ics;
use crate::store::Store;

pub struct CalendarCache {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

/// Trim, drop empties, dedupe, and sort the requested slugs. A set that is
/// empty after cleanup (e.g. a single empty string) is a client error.
pub fn normalize_slugs(raw: &[String]) -> Result<Vec<String>> {
    let mut slugs: Vec<String> = raw
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    slugs.sort();
    slugs.dedup();
    if slugs.is_empty() {
        return Err(Error::EmptyLeagueQuery);
    }
    Ok(slugs)
}

impl CalendarCache {
    pub fn new() -> Self {
        CalendarCache {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// The calendar for the given league set: cached bytes on a hit,
    /// rendered from the store on a miss. The lock is held across the
    /// render so a concurrent sync's clear cannot be overwritten by a
    /// stale entry.
    pub fn get_or_render(&self, store: &Store, raw_slugs: &[String]) -> Result<Vec<u8>> {
        let slugs = normalize_slugs(raw_slugs)?;
        let key = slugs.join(",");

        let mut entries = self.lock();
        if let Some(bytes) = entries.get(&key) {
            return Ok(bytes.clone());
        }

        let rows = store.matches_for_slugs(&slugs)?;
        let bytes = ics::build_calendar(&rows);
        entries.insert(key, bytes.clone());
        Ok(bytes)
    }

    /// Wholesale invalidation: drop every entry.
    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for CalendarCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LeaguePatch, MatchPatch};

    fn seeded_store() -> Store {
        let store = Store::open_in_memory().unwrap();
        store
            .upsert_league(
                "1",
                &LeaguePatch {
                    slug: Some("lcs".into()),
                    name: Some("LCS".into()),
                    region: Some("NORTH AMERICA".into()),
                    image_url: Some("https://example.com/lcs.png".into()),
                    priority: Some(1),
                },
            )
            .unwrap();
        store
            .upsert_league(
                "2",
                &LeaguePatch {
                    slug: Some("lck".into()),
                    name: Some("LCK".into()),
                    region: Some("KOREA".into()),
                    image_url: Some("https://example.com/lck.png".into()),
                    priority: Some(3),
                },
            )
            .unwrap();
        store
            .upsert_match(
                "m1",
                &MatchPatch {
                    start_time: Some("2024-01-01T00:00:00Z".parse().unwrap()),
                    best_of: Some(3),
                    team_a: Some("T1".into()),
                    team_b: Some("T2".into()),
                    league_id: Some("1".into()),
                    ..MatchPatch::default()
                },
            )
            .unwrap();
        store
    }

    #[test]
    fn normalization_collapses_order_and_duplicates() {
        let cache = CalendarCache::new();
        let store = seeded_store();

        let first = cache
            .get_or_render(&store, &["lcs".to_string(), "lck".to_string()])
            .unwrap();
        let second = cache
            .get_or_render(
                &store,
                &["lck".to_string(), "lcs".to_string(), "lck".to_string()],
            )
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn empty_league_set_is_a_client_error() {
        let cache = CalendarCache::new();
        let store = seeded_store();

        let err = cache.get_or_render(&store, &["".to_string()]).unwrap_err();
        assert!(matches!(err, Error::EmptyLeagueQuery));
        assert!(cache.is_empty());

        // Empty entries are dropped, not fatal, when real slugs remain.
        let ok = cache.get_or_render(&store, &["lcs".to_string(), " ".to_string()]);
        assert!(ok.is_ok());
    }

    #[test]
    fn end_to_end_single_match_calendar() {
        let cache = CalendarCache::new();
        let store = seeded_store();

        let bytes = cache.get_or_render(&store, &["lcs".to_string()]).unwrap();
        let ics = String::from_utf8(bytes).unwrap();

        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 1);
        assert!(ics.contains("DTSTART:20240101T000000Z"));
        assert!(ics.contains("DTEND:20240101T030000Z"));
        assert!(ics.contains("T1 vs T2"));
    }

    #[test]
    fn unknown_slugs_render_an_empty_calendar() {
        let cache = CalendarCache::new();
        let store = seeded_store();

        let bytes = cache
            .get_or_render(&store, &["not-a-league".to_string()])
            .unwrap();
        let ics = String::from_utf8(bytes).unwrap();
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 0);
        assert!(ics.contains("BEGIN:VCALENDAR"));
    }

    #[test]
    fn clear_drops_every_entry() {
        let cache = CalendarCache::new();
        let store = seeded_store();

        cache.get_or_render(&store, &["lcs".to_string()]).unwrap();
        cache.get_or_render(&store, &["lck".to_string()]).unwrap();
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }
}
