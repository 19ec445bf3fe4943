//! Calendar materialization.
//!
//! Matches become VEVENTs through pure functions of the stored row, so a
//! given store state always renders byte-identical calendar documents (the
//! cache relies on this). DTEND is start + best-of hours: a duration
//! heuristic, not a measured end time.

use chrono::{DateTime, Duration, Utc};
use icalendar::{Calendar, Component, EventLike};

use crate::model::MatchRow;

pub const CALENDAR_NAME: &str = "LoL eSports Calendar";
const PROD_ID: &str = "-//LoL eSports Calendar Generator//EN";

/// Placeholder for a bracket slot that has no team yet.
const UNDECIDED_TEAM: &str = "TBD";

const ICS_UTC: &str = "%Y%m%dT%H%M%SZ";

/// `"{league}{ block}: {team_a} vs {team_b} (bo{N})"`, with "TBD" standing
/// in for an undecided team.
pub fn match_summary(row: &MatchRow) -> String {
    let block = row
        .block_name
        .as_deref()
        .filter(|b| !b.is_empty())
        .map(|b| format!(" {b}"))
        .unwrap_or_default();
    let team_a = row.team_a.as_deref().unwrap_or(UNDECIDED_TEAM);
    let team_b = row.team_b.as_deref().unwrap_or(UNDECIDED_TEAM);
    format!(
        "{}{}: {} vs {} (bo{})",
        row.league_name, block, team_a, team_b, row.best_of
    )
}

/// Derive the VEVENT for a stored match. UID and DTSTAMP are set
/// explicitly; the icalendar crate would otherwise stamp generation time
/// and a random UID, breaking byte determinism.
pub fn to_event(row: &MatchRow) -> icalendar::Event {
    let start = fmt_utc(&row.start_time);
    let end = fmt_utc(&(row.start_time + Duration::hours(row.best_of)));

    let mut event = icalendar::Event::new();
    event.uid(&format!("{}@lolcal", row.id));
    event.summary(&match_summary(row));
    event.add_property("DTSTAMP", &start);
    event.add_property("DTSTART", &start);
    event.add_property("DTEND", &end);
    event.done()
}

/// Assemble the full calendar document for the given rows.
pub fn build_calendar(rows: &[MatchRow]) -> Vec<u8> {
    let mut cal = Calendar::new();
    cal.name(CALENDAR_NAME);
    for row in rows {
        cal.push(to_event(row));
    }
    rewrite_header(&cal.done().to_string()).into_bytes()
}

/// Clean up the icalendar crate's document header:
/// - replace its PRODID with ours
/// - drop CALSCALE:GREGORIAN (it is the default)
fn rewrite_header(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len());
    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:");
            result.push_str(PROD_ID);
            result.push_str("\r\n");
            continue;
        }
        if line == "CALSCALE:GREGORIAN" {
            continue;
        }
        result.push_str(line);
        result.push_str("\r\n");
    }
    result
}

fn fmt_utc(ts: &DateTime<Utc>) -> String {
    ts.format(ICS_UTC).to_string()
}
