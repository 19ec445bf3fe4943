use std::sync::Arc;

use lolcal_core::cache::CalendarCache;
use lolcal_core::store::Store;

/// Shared application state, injected into every route.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub cache: Arc<CalendarCache>,
}

impl AppState {
    pub fn new(store: Arc<Store>, cache: Arc<CalendarCache>) -> Self {
        AppState { store, cache }
    }
}
