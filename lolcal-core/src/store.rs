//! SQLite-backed store for leagues and matches.
//!
//! One connection behind a mutex: every write path is a single transaction,
//! and cache reads never observe a half-applied sync. Rows are only ever
//! created or updated by normal operation; [`Store::reset`] is the sole
//! destructive entry point.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};

use crate::error::{Error, Result};
use crate::model::{League, LeaguePatch, Match, MatchPatch, MatchRow, MatchUpsert};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS leagues (
    id         TEXT PRIMARY KEY,
    slug       TEXT NOT NULL UNIQUE,
    name       TEXT NOT NULL,
    region     TEXT NOT NULL,
    image_url  TEXT NOT NULL,
    priority   INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS matches (
    id          TEXT PRIMARY KEY,
    start_time  TEXT NOT NULL,
    block_name  TEXT,
    best_of     INTEGER NOT NULL,
    team_a      TEXT,
    team_b      TEXT,
    league_id   TEXT NOT NULL REFERENCES leagues(id)
);

CREATE INDEX IF NOT EXISTS idx_matches_league ON matches(league_id);
CREATE INDEX IF NOT EXISTS idx_matches_start ON matches(start_time);
"#;

pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (or create) the database at `path` and ensure the schema.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).ok();
            }
        }
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL").ok();
        conn.pragma_update(None, "synchronous", "NORMAL").ok();
        conn.pragma_update(None, "foreign_keys", "OFF").ok();
        conn.execute_batch(SCHEMA)?;
        Ok(Store {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory store, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "OFF").ok();
        conn.execute_batch(SCHEMA)?;
        Ok(Store {
            conn: Mutex::new(conn),
        })
    }

    /// Drop and recreate all tables in one transaction.
    pub fn reset(&self) -> Result<()> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        tx.execute_batch("DROP TABLE IF EXISTS matches; DROP TABLE IF EXISTS leagues;")?;
        tx.execute_batch(SCHEMA)?;
        tx.commit()?;
        Ok(())
    }

    /// Create-or-update a league keyed by remote id, returning the
    /// post-merge row.
    pub fn upsert_league(&self, id: &str, patch: &LeaguePatch) -> Result<League> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        let league = upsert_league_tx(&tx, id, patch)?;
        tx.commit()?;
        Ok(league)
    }

    /// Merge a batch of league records in one transaction.
    pub fn upsert_leagues(&self, records: &[(String, LeaguePatch)]) -> Result<usize> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        for (id, patch) in records {
            upsert_league_tx(&tx, id, patch)?;
        }
        tx.commit()?;
        Ok(records.len())
    }

    /// Create-or-update a match keyed by remote id, returning the
    /// post-merge row. The patch must already carry a resolved league id;
    /// slug resolution lives in [`Store::upsert_matches_by_slug`].
    pub fn upsert_match(&self, id: &str, patch: &MatchPatch) -> Result<Match> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        let m = upsert_match_tx(&tx, id, patch)?;
        tx.commit()?;
        Ok(m)
    }

    /// Merge a batch of match records in one transaction, resolving each
    /// owning league by slug. An unresolvable slug rolls the whole batch
    /// back and surfaces [`Error::UnknownLeague`].
    pub fn upsert_matches_by_slug(&self, upserts: &[MatchUpsert]) -> Result<usize> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        let mut slug_to_id: HashMap<String, String> = HashMap::new();
        for upsert in upserts {
            let league_id = match slug_to_id.get(&upsert.league_slug) {
                Some(id) => id.clone(),
                None => {
                    let league = league_by_slug_tx(&tx, &upsert.league_slug)?
                        .ok_or_else(|| Error::UnknownLeague(upsert.league_slug.clone()))?;
                    slug_to_id.insert(upsert.league_slug.clone(), league.id.clone());
                    league.id
                }
            };
            let mut patch = upsert.patch.clone();
            patch.league_id = Some(league_id);
            upsert_match_tx(&tx, &upsert.id, &patch)?;
        }
        tx.commit()?;
        Ok(upserts.len())
    }

    pub fn league_by_slug(&self, slug: &str) -> Result<Option<League>> {
        let conn = self.lock();
        league_by_slug_tx(&conn, slug)
    }

    /// All leagues in front-page order (ascending priority).
    pub fn leagues_by_priority(&self) -> Result<Vec<League>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, slug, name, region, image_url, priority
             FROM leagues ORDER BY priority, slug",
        )?;
        let rows = stmt.query_map([], league_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn match_by_id(&self, id: &str) -> Result<Option<Match>> {
        let conn = self.lock();
        match_by_id_tx(&conn, id)
    }

    /// All matches owned by the given league slugs, joined with the league
    /// name and ordered by start time (id as tiebreak, so materialized
    /// calendars are byte-stable).
    pub fn matches_for_slugs(&self, slugs: &[String]) -> Result<Vec<MatchRow>> {
        if slugs.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.lock();
        let placeholders = vec!["?"; slugs.len()].join(",");
        let sql = format!(
            "SELECT m.id, l.name, m.block_name, m.best_of, m.team_a, m.team_b, m.start_time
             FROM matches m JOIN leagues l ON l.id = m.league_id
             WHERE l.slug IN ({placeholders})
             ORDER BY m.start_time, m.id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let raw = stmt
            .query_map(params_from_iter(slugs), |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, Option<String>>(5)?,
                    row.get::<_, String>(6)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        raw.into_iter()
            .map(|(id, league_name, block_name, best_of, team_a, team_b, start)| {
                Ok(MatchRow {
                    id,
                    league_name,
                    block_name,
                    best_of,
                    team_a,
                    team_b,
                    start_time: parse_ts(&start)?,
                })
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn upsert_league_tx(conn: &Connection, id: &str, patch: &LeaguePatch) -> Result<League> {
    let mut league = league_by_id_tx(conn, id)?.unwrap_or_else(|| League::with_id(id));
    patch.apply(&mut league);
    conn.execute(
        "INSERT OR REPLACE INTO leagues (id, slug, name, region, image_url, priority)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            league.id,
            league.slug,
            league.name,
            league.region,
            league.image_url,
            league.priority
        ],
    )?;
    Ok(league)
}

fn upsert_match_tx(conn: &Connection, id: &str, patch: &MatchPatch) -> Result<Match> {
    let mut m = match_by_id_tx(conn, id)?.unwrap_or_else(|| Match::with_id(id));
    patch.apply(&mut m);
    conn.execute(
        "INSERT OR REPLACE INTO matches (id, start_time, block_name, best_of, team_a, team_b, league_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            m.id,
            format_ts(&m.start_time),
            m.block_name,
            m.best_of,
            m.team_a,
            m.team_b,
            m.league_id
        ],
    )?;
    Ok(m)
}

fn league_by_id_tx(conn: &Connection, id: &str) -> Result<Option<League>> {
    Ok(conn
        .query_row(
            "SELECT id, slug, name, region, image_url, priority FROM leagues WHERE id = ?1",
            params![id],
            league_from_row,
        )
        .optional()?)
}

fn league_by_slug_tx(conn: &Connection, slug: &str) -> Result<Option<League>> {
    Ok(conn
        .query_row(
            "SELECT id, slug, name, region, image_url, priority FROM leagues WHERE slug = ?1",
            params![slug],
            league_from_row,
        )
        .optional()?)
}

fn match_by_id_tx(conn: &Connection, id: &str) -> Result<Option<Match>> {
    let raw = conn
        .query_row(
            "SELECT id, start_time, block_name, best_of, team_a, team_b, league_id
             FROM matches WHERE id = ?1",
            params![id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, Option<String>>(5)?,
                    row.get::<_, String>(6)?,
                ))
            },
        )
        .optional()?;

    match raw {
        Some((id, start, block_name, best_of, team_a, team_b, league_id)) => Ok(Some(Match {
            id,
            start_time: parse_ts(&start)?,
            block_name,
            best_of,
            team_a,
            team_b,
            league_id,
        })),
        None => Ok(None),
    }
}

fn league_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<League> {
    Ok(League {
        id: row.get(0)?,
        slug: row.get(1)?,
        name: row.get(2)?,
        region: row.get(3)?,
        image_url: row.get(4)?,
        priority: row.get(5)?,
    })
}

fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_ts(s: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}
