use elabftw_mcp::config::ElabConfig;
use elabftw_mcp::gateway::ElabClient;
use elabftw_mcp::tools::{ToolRegistry, ToolReply};
use httpmock::MockServer;
use serde_json::Value;

/// Client wired to a mock eLabFTW instance, with an API key configured.
pub fn client_for(server: &MockServer) -> ElabClient {
    ElabClient::new(ElabConfig::new(server.base_url(), "test-key")).unwrap()
}

/// Client wired to a mock instance but with no API key: the credential gate
/// must stop every networked tool before a single request is built.
pub fn unconfigured_client_for(server: &MockServer) -> ElabClient {
    ElabClient::new(ElabConfig::new(server.base_url(), "")).unwrap()
}

/// Client whose base URL points at a port nothing listens on, to exercise
/// transport-level failures.
pub fn unreachable_client() -> ElabClient {
    ElabClient::new(ElabConfig::new("http://127.0.0.1:9", "test-key")).unwrap()
}

/// Dispatch one tool invocation through a fresh registry.
pub async fn call(client: &ElabClient, name: &str, args: Value) -> ToolReply {
    let registry = ToolRegistry::new();
    registry
        .dispatch(client, name, args.as_object().cloned().unwrap_or_default())
        .await
}
