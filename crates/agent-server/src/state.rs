//! Application State

use std::sync::Arc;

use agent_core::Agent;
use legifrance::lookup::LookupService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Research agent (provider, tools and thread store)
    pub agent: Arc<Agent>,

    /// Lookup server backing the tools, probed by `/health`
    pub lookup: Arc<dyn LookupService>,
}
