//! Service Kit - Agent Tools
//!
//! Légifrance research tools implementing `agent_core::Tool`. Each forwards
//! its validated arguments verbatim to the lookup service under its own name.

mod article;
mod browse;
mod search;

pub use article::GetArticleTool;
pub use browse::BrowseCodeTool;
pub use search::SearchLegifranceTool;
