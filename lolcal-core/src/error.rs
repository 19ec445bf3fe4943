//! Error types for the lolcal core.

use thiserror::Error;

/// Errors that can occur while syncing or serving schedule data.
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP failure while talking to the remote schedule API.
    /// Aborts the current sync run; a re-run starts over safely.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A match referenced a league slug that is not in the store. Fatal for
    /// the sync run; the surrounding transaction rolls back.
    #[error("unknown league slug: {0}")]
    UnknownLeague(String),

    /// The requested league set was empty after trimming. A client error,
    /// not a cache miss.
    #[error("league query is empty")]
    EmptyLeagueQuery,

    #[error("storage error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("invalid stored timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
