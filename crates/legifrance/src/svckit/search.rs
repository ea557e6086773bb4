//! Search Tool
//!
//! Full-text search over laws, decrees, codes and case law.

use std::sync::Arc;

use agent_core::{ParamType, ParameterSchema, Tool, ToolError, ToolSchema};
use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::lookup::LookupService;
use crate::{DEFAULT_MAX_RESULTS, MAX_RESULTS_LIMIT};

pub const NAME: &str = "search_legifrance";

/// Tool for searching the Légifrance database
pub struct SearchLegifranceTool {
    service: Arc<dyn LookupService>,
    default_max_results: u32,
}

impl SearchLegifranceTool {
    pub fn new(service: Arc<dyn LookupService>) -> Self {
        Self::with_default_max_results(service, DEFAULT_MAX_RESULTS)
    }

    pub fn with_default_max_results(service: Arc<dyn LookupService>, default_max_results: u32) -> Self {
        Self {
            service,
            default_max_results,
        }
    }
}

#[async_trait]
impl Tool for SearchLegifranceTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.into(),
            description: "Recherche des textes juridiques dans la base de données Légifrance. \
                Permet de chercher des lois, décrets, codes, jurisprudence et autres textes \
                juridiques français. Utilisez des termes de recherche en français."
                .into(),
            parameters: vec![
                ParameterSchema::required(
                    "query",
                    ParamType::String,
                    "Requête de recherche en français (ex: 'congés payés', 'licenciement économique')",
                ),
                ParameterSchema::optional(
                    "max_results",
                    ParamType::Integer,
                    format!("Nombre maximum de résultats à retourner (1 à {MAX_RESULTS_LIMIT})"),
                )
                .with_default(Value::from(self.default_max_results)),
            ],
        }
    }

    async fn execute(&self, arguments: &Map<String, Value>) -> Result<String, ToolError> {
        let query = arguments.get("query").and_then(Value::as_str).unwrap_or_default();
        if query.trim().is_empty() {
            return Err(ToolError::InvalidArguments("query must not be empty".into()));
        }

        if let Some(max) = arguments.get("max_results") {
            let in_range = max
                .as_i64()
                .is_some_and(|m| (1..=i64::from(MAX_RESULTS_LIMIT)).contains(&m));
            if !in_range {
                return Err(ToolError::InvalidArguments(format!(
                    "max_results must be between 1 and {MAX_RESULTS_LIMIT}, got {max}"
                )));
            }
        }

        tracing::debug!(query, "Searching Légifrance");
        self.service.call_tool(NAME, arguments).await
    }
}

#[cfg(test)]
mod tests {
    use agent_core::{ToolCall, ToolRegistry};
    use serde_json::json;

    use super::*;
    use crate::lookup::MockLookupService;

    fn registry(service: Arc<MockLookupService>) -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(SearchLegifranceTool::new(service)).unwrap();
        registry
    }

    fn call(arguments: Value) -> ToolCall {
        let Value::Object(arguments) = arguments else { unreachable!() };
        ToolCall::new("1", NAME, arguments)
    }

    #[tokio::test]
    async fn test_default_max_results_is_forwarded() {
        let service = Arc::new(MockLookupService::demo());
        let result = registry(service.clone())
            .execute(&call(json!({"query": "congés payés"})))
            .await;

        assert!(result.is_success());
        let calls = service.calls();
        assert_eq!(calls[0].0, NAME);
        assert_eq!(calls[0].1["query"], "congés payés");
        assert_eq!(calls[0].1["max_results"], 10);
    }

    #[tokio::test]
    async fn test_non_integer_max_results_never_reaches_service() {
        let service = Arc::new(MockLookupService::demo());
        let result = registry(service.clone())
            .execute(&call(json!({"query": "congés payés", "max_results": "ten"})))
            .await;

        assert!(matches!(result.error(), Some(ToolError::InvalidArguments(_))));
        assert!(service.calls().is_empty());
    }

    #[tokio::test]
    async fn test_max_results_range() {
        let service = Arc::new(MockLookupService::demo());
        let registry = registry(service.clone());

        for max in [json!(0), json!(51), json!(u64::MAX)] {
            let result = registry
                .execute(&call(json!({"query": "bail", "max_results": max})))
                .await;
            assert!(matches!(result.error(), Some(ToolError::InvalidArguments(_))));
        }
        assert!(registry
            .execute(&call(json!({"query": "bail", "max_results": 50})))
            .await
            .is_success());
        assert_eq!(service.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_blank_query_rejected() {
        let service = Arc::new(MockLookupService::demo());
        let result = registry(service.clone()).execute(&call(json!({"query": "   "}))).await;

        assert!(matches!(result.error(), Some(ToolError::InvalidArguments(_))));
        assert!(service.calls().is_empty());
    }
}
