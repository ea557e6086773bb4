//! Article Tool

use std::sync::Arc;

use agent_core::{ParamType, ParameterSchema, Tool, ToolError, ToolSchema};
use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::lookup::LookupService;

pub const NAME: &str = "get_article";

/// Tool for fetching the full text of one article
pub struct GetArticleTool {
    service: Arc<dyn LookupService>,
}

impl GetArticleTool {
    pub fn new(service: Arc<dyn LookupService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Tool for GetArticleTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.into(),
            description: "Récupère le contenu complet d'un article juridique spécifique. \
                Permet d'obtenir le texte intégral d'un article de loi, de code ou de décret \
                à partir de son identifiant Légifrance ou de sa référence standard."
                .into(),
            parameters: vec![ParameterSchema::required(
                "article_id",
                ParamType::String,
                "Identifiant de l'article (ex: 'LEGIARTI000006900846', 'L3141-1', 'R1234-5')",
            )],
        }
    }

    async fn execute(&self, arguments: &Map<String, Value>) -> Result<String, ToolError> {
        let article_id = arguments.get("article_id").and_then(Value::as_str).unwrap_or_default();
        if article_id.trim().is_empty() {
            return Err(ToolError::InvalidArguments("article_id must not be empty".into()));
        }

        self.service.call_tool(NAME, arguments).await
    }
}
