//! Application state for the web layer.

use crate::store::SubwayStore;

/// Shared application state.
///
/// Cloned into every request; the store handle is itself shared.
#[derive(Clone)]
pub struct AppState {
    /// Station, line and line sequence records
    pub store: SubwayStore,
}

impl AppState {
    /// Create a new app state.
    pub fn new(store: SubwayStore) -> Self {
        Self { store }
    }
}
