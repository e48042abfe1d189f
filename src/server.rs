use crate::gateway::ElabClient;
use crate::prompts;
use crate::tools::ToolRegistry;
use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, GetPromptRequestParams, GetPromptResult,
    ListPromptsResult, ListToolsResult, PaginatedRequestParams, Prompt, PromptArgument,
    PromptMessage, PromptMessageRole, ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler};
use std::sync::Arc;
use tracing::debug;

/// MCP server handler for the eLabFTW adapter. Holds only immutable state:
/// the tool registry and the gateway client, both built once at startup.
/// Handlers are stateless, so interleaved invocations are safe.
#[derive(Clone)]
pub struct ElabServer {
    client: Arc<ElabClient>,
    registry: Arc<ToolRegistry>,
}

impl ElabServer {
    pub fn new(client: ElabClient) -> Self {
        Self {
            client: Arc::new(client),
            registry: Arc::new(ToolRegistry::new()),
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }
}

impl ServerHandler for ElabServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "MCP server for eLabFTW, an electronic lab notebook. Exposes experiments, \
                 database items (resources), and equipment bookings as tools."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_prompts()
                .build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _params: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        debug!("listing {} tools", self.registry.len());
        Ok(ListToolsResult {
            meta: None,
            tools: self.registry.descriptors(),
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        params: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let arguments = params.arguments.unwrap_or_default();
        let reply = self
            .registry
            .dispatch(&self.client, &params.name, arguments)
            .await;

        Ok(CallToolResult {
            meta: None,
            content: vec![Content::text(reply.text)],
            structured_content: None,
            is_error: Some(reply.is_error),
        })
    }

    async fn list_prompts(
        &self,
        _params: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, McpError> {
        let prompts = prompts::catalog()
            .iter()
            .map(|def| Prompt {
                name: def.name.into(),
                title: None,
                description: Some(def.description.into()),
                arguments: if def.arguments.is_empty() {
                    None
                } else {
                    Some(
                        def.arguments
                            .iter()
                            .map(|arg| PromptArgument {
                                name: arg.name.into(),
                                title: None,
                                description: Some(arg.description.into()),
                                required: Some(arg.required),
                            })
                            .collect(),
                    )
                },
                icons: None,
                meta: None,
            })
            .collect();

        Ok(ListPromptsResult {
            meta: None,
            prompts,
            next_cursor: None,
        })
    }

    async fn get_prompt(
        &self,
        params: GetPromptRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, McpError> {
        let (description, text) = prompts::render(&params.name, params.arguments.as_ref())
            .ok_or_else(|| {
                McpError::invalid_params(format!("Unknown prompt: {}", params.name), None)
            })?;

        Ok(GetPromptResult {
            description: Some(description),
            messages: vec![PromptMessage::new_text(PromptMessageRole::User, text)],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ElabConfig;

    #[test]
    fn test_server_construction() {
        let client =
            ElabClient::new(ElabConfig::new("https://lab.example.com/api/v2", "key")).unwrap();
        let server = ElabServer::new(client);
        assert!(!server.registry().is_empty());
    }

    #[test]
    fn test_get_info_advertises_tools_and_prompts() {
        let client =
            ElabClient::new(ElabConfig::new("https://lab.example.com/api/v2", "key")).unwrap();
        let info = ElabServer::new(client).get_info();
        assert!(info.instructions.unwrap().contains("eLabFTW"));
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.prompts.is_some());
    }
}
