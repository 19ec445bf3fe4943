//! Core library for lolcal: syncs the LoL esports schedule into a local
//! store and materializes it as iCalendar documents through a cache.

pub mod cache;
pub mod client;
pub mod error;
pub mod ics;
pub mod model;
pub mod store;
pub mod sync;
pub mod walker;

pub use error::{Error, Result};
