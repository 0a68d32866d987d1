use std::sync::Arc;

use rmcp::{
    Json, ServerHandler,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_handler, tool_router,
};

use assess_common::api::{CatalogInfoResponse, RecommendParams, RecommendResponse};
use assess_engine::pipeline::Recommender;

#[derive(Clone)]
pub struct RecommenderServer {
    recommender: Arc<Recommender>,
    tool_router: ToolRouter<RecommenderServer>,
}

impl RecommenderServer {
    pub fn new(recommender: Arc<Recommender>) -> Self {
        Self {
            recommender,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl RecommenderServer {
    #[tool(description = "Recommend up to 10 assessments from the catalog for a hiring requirement or job description.")]
    async fn recommend_assessments(
        &self,
        Parameters(params): Parameters<RecommendParams>,
    ) -> Result<Json<RecommendResponse>, String> {
        self.recommender
            .respond(&params)
            .await
            .map(Json)
            .map_err(|e| e.to_string())
    }

    #[tool(description = "Report the loaded catalog size, index mode and ranking strategy.")]
    async fn catalog_info(&self) -> Result<Json<CatalogInfoResponse>, String> {
        Ok(Json(catalog_info(&self.recommender)))
    }
}

pub fn catalog_info(recommender: &Recommender) -> CatalogInfoResponse {
    CatalogInfoResponse {
        record_count: recommender.catalog().len(),
        index_mode: recommender.index_mode().to_string(),
        strategy: recommender.strategy_name().to_string(),
    }
}

#[tool_handler]
impl ServerHandler for RecommenderServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "assess-recommender".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Assessment recommendation MCP server. Use recommend_assessments with a job \
                 description or free-text requirement (optional top_k, 1 to 10) to get catalog \
                 assessments balanced between knowledge and personality tests, and \
                 catalog_info to inspect what is loaded."
                    .to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use assess_engine::catalog::Catalog;
    use assess_engine::index::TextIndex;
    use assess_engine::strategy::HeuristicStrategy;

    use super::*;

    #[test]
    fn tools_publish_output_schemas() {
        let tools = RecommenderServer::tool_router().list_all();
        for name in ["recommend_assessments", "catalog_info"] {
            let tool = tools
                .iter()
                .find(|t| t.name == name)
                .unwrap_or_else(|| panic!("missing tool: {name}"));
            assert!(
                tool.output_schema.is_some(),
                "tool {name} should publish output_schema"
            );
        }
    }

    #[test]
    fn catalog_info_reports_empty_sparse_heuristic() {
        let catalog = Catalog::empty();
        let index = TextIndex::build_sparse(&catalog);
        let recommender = Recommender::new(catalog, index, Arc::new(HeuristicStrategy));
        let info = catalog_info(&recommender);
        assert_eq!(info.record_count, 0);
        assert_eq!(info.index_mode, "sparse");
        assert_eq!(info.strategy, "heuristic");
    }
}
