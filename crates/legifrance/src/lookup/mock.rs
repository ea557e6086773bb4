//! Mock Lookup Service
//!
//! For testing and offline demos. Returns canned Légifrance excerpts.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use agent_core::ToolError;
use async_trait::async_trait;
use serde_json::{Map, Value};

use super::LookupService;

type Canned = Result<String, ToolError>;

/// Mock lookup service with canned responses per tool name
pub struct MockLookupService {
    responses: HashMap<String, Canned>,
    calls: Mutex<Vec<(String, Map<String, Value>)>>,
    healthy: AtomicBool,
    health_checks: AtomicUsize,
}

impl Default for MockLookupService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLookupService {
    /// Empty mock: every tool answers with a remote "unknown tool" error
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            calls: Mutex::new(Vec::new()),
            healthy: AtomicBool::new(true),
            health_checks: AtomicUsize::new(0),
        }
    }

    /// Mock answering the three research tools with realistic excerpts
    pub fn demo() -> Self {
        Self::new()
            .with_response(
                "search_legifrance",
                Ok("1. Code du travail - Article L3141-1 : Tout salarié a droit chaque année \
                    à un congé payé à la charge de l'employeur.\n\
                    2. Code du travail - Article L3141-3 : Le salarié a droit à un congé de \
                    deux jours et demi ouvrables par mois de travail effectif chez le même \
                    employeur. La durée totale du congé exigible ne peut excéder trente jours \
                    ouvrables."
                    .into()),
            )
            .with_response(
                "get_article",
                Ok("Article L3141-1 (LEGIARTI000006902661), en vigueur depuis le 01/05/2008 :\n\
                    Tout salarié a droit chaque année à un congé payé à la charge de \
                    l'employeur."
                    .into()),
            )
            .with_response(
                "browse_code",
                Ok("Code du travail > Partie législative > Troisième partie > Livre Ier > \
                    Titre IV : Congés payés et autres congés\n  \
                    Chapitre Ier : Congés payés (L3141-1 à L3141-33)"
                    .into()),
            )
    }

    #[must_use]
    pub fn with_response(mut self, tool: impl Into<String>, response: Canned) -> Self {
        self.responses.insert(tool.into(), response);
        self
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    /// Every call received so far, in arrival order
    pub fn calls(&self) -> Vec<(String, Map<String, Value>)> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    pub fn health_checks(&self) -> usize {
        self.health_checks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LookupService for MockLookupService {
    async fn call_tool(&self, name: &str, arguments: &Map<String, Value>) -> Result<String, ToolError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((name.to_string(), arguments.clone()));
        }

        self.responses
            .get(name)
            .cloned()
            .unwrap_or_else(|| Err(ToolError::Remote(format!("Unknown tool: {name}"))))
    }

    async fn health_check(&self) -> bool {
        self.health_checks.fetch_add(1, Ordering::SeqCst);
        self.healthy.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "MockLookup"
    }
}
