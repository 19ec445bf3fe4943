//! Domain rows and their per-entity merge types.
//!
//! The remote API delivers partial field sets (a schedule-only payload has
//! no league metadata, and vice versa), so every write goes through a patch
//! whose fields overwrite only when they carry a non-empty value. The patch
//! types are per-entity and checked at compile time; there is no
//! field-name-to-setter dispatch, so an unknown field is a compile error.

use chrono::{DateTime, Utc};

/// A league as stored. `slug` is the stable join key used by match
/// resolution even when the remote id changes across API versions.
#[derive(Debug, Clone, PartialEq)]
pub struct League {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub region: String,
    pub image_url: String,
    /// Ascending priority defines front-page order.
    pub priority: i64,
}

impl League {
    /// A fresh row seeded with an id and type defaults, the base an
    /// initial patch merges into.
    pub fn with_id(id: &str) -> Self {
        League {
            id: id.to_string(),
            slug: String::new(),
            name: String::new(),
            region: String::new(),
            image_url: String::new(),
            priority: 0,
        }
    }
}

/// Partial league update. `None` fields and empty strings leave the stored
/// value untouched.
#[derive(Debug, Clone, Default)]
pub struct LeaguePatch {
    pub slug: Option<String>,
    pub name: Option<String>,
    pub region: Option<String>,
    pub image_url: Option<String>,
    pub priority: Option<i64>,
}

impl LeaguePatch {
    pub fn apply(&self, league: &mut League) {
        merge_text(&mut league.slug, &self.slug);
        merge_text(&mut league.name, &self.name);
        merge_text(&mut league.region, &self.region);
        merge_text(&mut league.image_url, &self.image_url);
        if let Some(priority) = self.priority {
            league.priority = priority;
        }
    }
}

/// A match as stored. Team codes are absent while the bracket slot is
/// undecided.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub id: String,
    /// Normalized to UTC at ingestion.
    pub start_time: DateTime<Utc>,
    pub block_name: Option<String>,
    /// Best-of count; also drives the derived event duration.
    pub best_of: i64,
    pub team_a: Option<String>,
    pub team_b: Option<String>,
    pub league_id: String,
}

impl Match {
    pub fn with_id(id: &str) -> Self {
        Match {
            id: id.to_string(),
            start_time: DateTime::UNIX_EPOCH,
            block_name: None,
            best_of: 1,
            team_a: None,
            team_b: None,
            league_id: String::new(),
        }
    }
}

/// Partial match update with the same non-destructive rule as
/// [`LeaguePatch`].
#[derive(Debug, Clone, Default)]
pub struct MatchPatch {
    pub start_time: Option<DateTime<Utc>>,
    pub block_name: Option<String>,
    pub best_of: Option<i64>,
    pub team_a: Option<String>,
    pub team_b: Option<String>,
    pub league_id: Option<String>,
}

impl MatchPatch {
    pub fn apply(&self, m: &mut Match) {
        if let Some(start_time) = self.start_time {
            m.start_time = start_time;
        }
        merge_opt_text(&mut m.block_name, &self.block_name);
        if let Some(best_of) = self.best_of {
            m.best_of = best_of;
        }
        merge_opt_text(&mut m.team_a, &self.team_a);
        merge_opt_text(&mut m.team_b, &self.team_b);
        merge_text(&mut m.league_id, &self.league_id);
    }
}

/// A match update keyed by remote id, still carrying the owning league's
/// slug. The store resolves the slug inside the write transaction.
#[derive(Debug, Clone)]
pub struct MatchUpsert {
    pub id: String,
    pub league_slug: String,
    pub patch: MatchPatch,
}

/// A match joined with its league name, the input to calendar
/// materialization.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRow {
    pub id: String,
    pub league_name: String,
    pub block_name: Option<String>,
    pub best_of: i64,
    pub team_a: Option<String>,
    pub team_b: Option<String>,
    pub start_time: DateTime<Utc>,
}

fn merge_text(dst: &mut String, src: &Option<String>) {
    if let Some(value) = src {
        if !value.is_empty() {
            *dst = value.clone();
        }
    }
}

fn merge_opt_text(dst: &mut Option<String>, src: &Option<String>) {
    if let Some(value) = src {
        if !value.is_empty() {
            *dst = Some(value.clone());
        }
    }
}
