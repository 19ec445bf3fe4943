//! Client for the esports schedule API.
//!
//! Two endpoints are consumed: `getLeagues` (single page) and `getSchedule`
//! (paginated through `pages.newer`/`pages.older` continuation tokens).
//! Every request carries the public API key and a descriptive user agent.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::Result;

pub const DEFAULT_BASE_URL: &str = "https://prod-relapi.ewp.gg/persisted/gw";

/// Public API key published by the schedule API for read access.
pub const PUBLIC_API_KEY: &str = "0TvQnueqKa5mxJntVWt0w4LpLfEkrV1Ta8rQBb9Z";

pub const DEFAULT_USER_AGENT: &str = "lolcal/0.1 (league schedule calendar)";

const HL: &str = "en-US";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// The remote schedule capability, injected into the walker and the
/// synchronizer so tests can script responses.
pub trait ScheduleSource {
    fn fetch_leagues(&self) -> impl Future<Output = Result<Vec<LeagueRecord>>> + Send;
    fn fetch_schedule(
        &self,
        page_token: Option<&str>,
    ) -> impl Future<Output = Result<SchedulePage>> + Send;
}

/// A league as delivered by `getLeagues`.
#[derive(Debug, Clone, Deserialize)]
pub struct LeagueRecord {
    pub id: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default, rename = "image")]
    pub image_url: String,
    #[serde(default)]
    pub priority: i64,
}

/// One page of the schedule feed: its event batch plus the continuation
/// tokens in both directions.
#[derive(Debug, Clone, Default)]
pub struct SchedulePage {
    pub events: Vec<EventRecord>,
    pub newer: Option<String>,
    pub older: Option<String>,
}

/// One entry of `data.schedule.events[]`. Only `kind == "match"` entries
/// carry a match payload; other kinds (shows, recaps) are skipped upstream.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub block_name: Option<String>,
    #[serde(default)]
    pub league: LeagueRef,
    #[serde(default, rename = "match")]
    pub match_detail: Option<MatchDetail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeagueRef {
    #[serde(default)]
    pub slug: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchDetail {
    pub id: String,
    #[serde(default)]
    pub strategy: Strategy,
    #[serde(default)]
    pub teams: Vec<TeamRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Strategy {
    #[serde(default = "default_best_of")]
    pub count: i64,
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy {
            count: default_best_of(),
        }
    }
}

fn default_best_of() -> i64 {
    1
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamRef {
    #[serde(default)]
    pub code: Option<String>,
}

// Wire envelopes.

#[derive(Debug, Deserialize)]
struct LeaguesResponse {
    data: LeaguesData,
}

#[derive(Debug, Deserialize)]
struct LeaguesData {
    #[serde(default)]
    leagues: Vec<LeagueRecord>,
}

#[derive(Debug, Deserialize)]
struct ScheduleResponse {
    data: ScheduleData,
}

#[derive(Debug, Deserialize)]
struct ScheduleData {
    schedule: ScheduleBody,
}

#[derive(Debug, Deserialize)]
struct ScheduleBody {
    #[serde(default)]
    pages: Pages,
    #[serde(default)]
    events: Vec<EventRecord>,
}

#[derive(Debug, Default, Deserialize)]
struct Pages {
    older: Option<String>,
    newer: Option<String>,
}

/// HTTP client for the schedule API.
#[derive(Debug, Clone)]
pub struct ScheduleApi {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ScheduleApi {
    pub fn new(base_url: &str, api_key: &str, user_agent: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(ScheduleApi {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .http
            .get(url)
            .header("x-api-key", &self.api_key)
            .send()
            .await?;
        Ok(response.error_for_status()?.json::<T>().await?)
    }
}

impl ScheduleSource for ScheduleApi {
    async fn fetch_leagues(&self) -> Result<Vec<LeagueRecord>> {
        let url = format!("{}/getLeagues?hl={HL}", self.base_url);
        let raw: LeaguesResponse = self.get(&url).await?;
        Ok(raw.data.leagues)
    }

    async fn fetch_schedule(&self, page_token: Option<&str>) -> Result<SchedulePage> {
        let url = match page_token {
            Some(token) => format!(
                "{}/getSchedule?hl={HL}&pageToken={token}",
                self.base_url
            ),
            None => format!("{}/getSchedule?hl={HL}", self.base_url),
        };
        let raw: ScheduleResponse = self.get(&url).await?;
        Ok(SchedulePage {
            events: raw.data.schedule.events,
            newer: raw.data.schedule.pages.newer,
            older: raw.data.schedule.pages.older,
        })
    }
}
