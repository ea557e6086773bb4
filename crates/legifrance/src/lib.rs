//! # legifrance
//!
//! French legal research on top of the Légifrance lookup server: an HTTP
//! client for its `tools/call` protocol, the three research tools exposed to
//! the agent, and the legal-assistant system prompt.
//!
//! ```text
//! ┌───────────────┐   ToolCall   ┌──────────────────────┐   POST /invoke   ┌──────────────┐
//! │ ToolRegistry  │ ───────────▶ │ search_legifrance    │ ───────────────▶ │   lookup     │
//! │ (agent-core)  │              │ get_article          │                  │   server     │
//! └───────────────┘ ◀─────────── │ browse_code          │ ◀─────────────── └──────────────┘
//!                     text/error └──────────────────────┘   {"result": ..}
//! ```

pub mod lookup;
pub mod svckit;

use std::sync::Arc;

use agent_core::{AgentError, ToolRegistry};

use crate::lookup::LookupService;

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::svckit::{BrowseCodeTool, GetArticleTool, SearchLegifranceTool};
}

/// Results returned by a search when the model does not ask for a count
pub const DEFAULT_MAX_RESULTS: u32 = 10;

/// Largest result count a search may request
pub const MAX_RESULTS_LIMIT: u32 = 50;

/// Register the three research tools, in catalogue order.
pub fn register_tools(
    registry: &mut ToolRegistry,
    service: Arc<dyn LookupService>,
    default_max_results: u32,
) -> agent_core::Result<()> {
    if !(1..=MAX_RESULTS_LIMIT).contains(&default_max_results) {
        return Err(AgentError::Config(format!(
            "default max_results {default_max_results} outside 1..={MAX_RESULTS_LIMIT}"
        )));
    }

    registry.register(tools::SearchLegifranceTool::with_default_max_results(
        service.clone(),
        default_max_results,
    ))?;
    registry.register(tools::GetArticleTool::new(service.clone()))?;
    registry.register(tools::BrowseCodeTool::new(service))?;
    Ok(())
}

/// System prompt for the legal research agent
pub const LEGIFRANCE_SYSTEM_PROMPT: &str = r"Tu es un assistant juridique spécialisé dans le droit français.
Tu peux rechercher et analyser des textes juridiques via la base Légifrance.

## Outils disponibles

- `search_legifrance` - Rechercher des textes juridiques (lois, décrets, codes, jurisprudence)
- `get_article` - Récupérer le texte intégral d'un article à partir de son identifiant
- `browse_code` - Explorer la structure d'un code (livres, titres, chapitres, sections)

## Méthode

1. Commence par une recherche pour identifier les textes pertinents
2. Récupère les articles clés pour en citer le texte exact
3. Si un outil échoue, reformule ou essaie un autre outil plutôt que d'inventer

Réponds toujours en français et cite tes sources (code et numéro d'article).";
