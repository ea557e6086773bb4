//! Code Browsing Tool

use std::sync::Arc;

use agent_core::{ParamType, ParameterSchema, Tool, ToolError, ToolSchema};
use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::lookup::LookupService;

pub const NAME: &str = "browse_code";

/// Tool for navigating the hierarchy of a French legal code
pub struct BrowseCodeTool {
    service: Arc<dyn LookupService>,
}

impl BrowseCodeTool {
    pub fn new(service: Arc<dyn LookupService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Tool for BrowseCodeTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.into(),
            description: "Navigue dans la structure hiérarchique d'un code juridique français. \
                Permet d'explorer l'organisation d'un code (livres, titres, chapitres, sections) \
                et d'obtenir la liste des articles dans une section donnée."
                .into(),
            parameters: vec![
                ParameterSchema::required(
                    "code_name",
                    ParamType::String,
                    "Nom du code juridique (ex: 'Code du travail', 'Code civil', 'Code pénal')",
                ),
                ParameterSchema::optional(
                    "section",
                    ParamType::String,
                    "Section spécifique à explorer (ex: 'L3141', 'Livre III')",
                ),
            ],
        }
    }

    async fn execute(&self, arguments: &Map<String, Value>) -> Result<String, ToolError> {
        let code_name = arguments.get("code_name").and_then(Value::as_str).unwrap_or_default();
        if code_name.trim().is_empty() {
            return Err(ToolError::InvalidArguments("code_name must not be empty".into()));
        }

        self.service.call_tool(NAME, arguments).await
    }
}
