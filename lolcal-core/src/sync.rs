//! Schedule synchronization.
//!
//! Reconciles the remote league/match catalog into the store: leagues
//! first (match resolution joins on league slug), then the paginated
//! schedule feed. All remote pages are collected before the store
//! transaction opens, so no lock is held across network calls and a failed
//! run leaves the store untouched. Every successful sync invalidates the
//! calendar cache wholesale.

use std::sync::Arc;

use tracing::info;

use crate::cache::CalendarCache;
use crate::client::{EventRecord, LeagueRecord, ScheduleSource};
use crate::error::Result;
use crate::model::{LeaguePatch, MatchPatch, MatchUpsert};
use crate::store::Store;
use crate::walker::ScheduleWalker;

/// Outcome of a sync run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SyncStats {
    pub leagues: usize,
    pub matches: usize,
    /// Schedule events that were not matches (shows, recaps) or carried no
    /// match payload.
    pub skipped: usize,
}

pub struct Synchronizer<S> {
    source: S,
    store: Arc<Store>,
    cache: Arc<CalendarCache>,
}

impl<S: ScheduleSource> Synchronizer<S> {
    pub fn new(source: S, store: Arc<Store>, cache: Arc<CalendarCache>) -> Self {
        Synchronizer {
            source,
            store,
            cache,
        }
    }

    /// Fetch the league list (single page) and merge each league by remote
    /// id.
    pub async fn sync_leagues(&self) -> Result<usize> {
        let records = self.source.fetch_leagues().await?;
        let patches: Vec<(String, LeaguePatch)> = records.iter().map(league_patch).collect();
        let leagues = self.store.upsert_leagues(&patches)?;
        self.cache.clear();
        info!(leagues, "league sync complete");
        Ok(leagues)
    }

    /// Walk the schedule feed and merge every match event by remote id,
    /// resolving owning leagues by slug in one store transaction.
    pub async fn sync_matches(&self) -> Result<SyncStats> {
        let mut upserts = Vec::new();
        let mut skipped = 0usize;

        let mut walker = ScheduleWalker::new(&self.source);
        while let Some(events) = walker.next_page().await? {
            for event in &events {
                match match_upsert(event) {
                    Some(upsert) => upserts.push(upsert),
                    None => skipped += 1,
                }
            }
        }

        let matches = self.store.upsert_matches_by_slug(&upserts)?;
        self.cache.clear();
        info!(matches, skipped, "match sync complete");
        Ok(SyncStats {
            leagues: 0,
            matches,
            skipped,
        })
    }

    /// One full reconciliation pass: leagues before matches.
    pub async fn sync_all(&self) -> Result<SyncStats> {
        let leagues = self.sync_leagues().await?;
        let stats = self.sync_matches().await?;
        Ok(SyncStats { leagues, ..stats })
    }
}

fn league_patch(record: &LeagueRecord) -> (String, LeaguePatch) {
    (
        record.id.clone(),
        LeaguePatch {
            slug: Some(record.slug.clone()),
            name: Some(record.name.clone()),
            region: Some(record.region.clone()),
            image_url: Some(record.image_url.clone()),
            priority: Some(record.priority),
        },
    )
}

/// Only events of kind `"match"` with a match payload become rows;
/// everything else is skipped (and counted).
fn match_upsert(event: &EventRecord) -> Option<MatchUpsert> {
    if event.kind != "match" {
        return None;
    }
    let detail = event.match_detail.as_ref()?;
    Some(MatchUpsert {
        id: detail.id.clone(),
        league_slug: event.league.slug.clone(),
        patch: MatchPatch {
            start_time: event.start_time,
            block_name: event.block_name.clone(),
            best_of: Some(detail.strategy.count),
            team_a: detail.teams.first().and_then(|t| t.code.clone()),
            team_b: detail.teams.get(1).and_then(|t| t.code.clone()),
            league_id: None,
        },
    })
}
