pub mod args;
mod bookings;
mod experiments;
mod guidance;
mod items;

pub use args::ToolArgs;

use crate::error::Result;
use crate::gateway::ElabClient;
use futures::future::BoxFuture;
use rmcp::model::Tool;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error};

pub type HandlerFuture<'a> = BoxFuture<'a, Result<String>>;

/// Every handler conforms to the same shape: argument bag in, text out.
/// Non-capturing closures around free async fns coerce to this.
pub type Handler = for<'a> fn(&'a ElabClient, ToolArgs) -> HandlerFuture<'a>;

pub struct ToolEntry {
    pub tool: Tool,
    /// All tools except the static guidance tool need a configured API key;
    /// the gate runs before any argument extraction or request building.
    pub requires_api_key: bool,
    handler: Handler,
}

impl ToolEntry {
    pub(crate) fn new(
        name: &'static str,
        description: &'static str,
        schema: Value,
        handler: Handler,
    ) -> Self {
        Self {
            tool: Tool {
                name: name.into(),
                title: None,
                description: Some(description.into()),
                input_schema: Arc::new(schema.as_object().cloned().unwrap_or_default()),
                output_schema: None,
                annotations: None,
                icons: None,
                meta: None,
            },
            requires_api_key: true,
            handler,
        }
    }

    pub(crate) fn without_api_key(mut self) -> Self {
        self.requires_api_key = false;
        self
    }
}

/// The single text block handed back for one invocation. Every invocation
/// produces exactly one of these; nothing escapes the dispatcher as a fault.
#[derive(Debug, PartialEq)]
pub struct ToolReply {
    pub text: String,
    pub is_error: bool,
}

impl ToolReply {
    fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }
}

/// Static registry of all tools, built once at startup. Lookup by name
/// replaces the one-big-match dispatch shape: each entry pairs a descriptor
/// (with its JSON input schema) with a handler of uniform signature.
pub struct ToolRegistry {
    entries: Vec<ToolEntry>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            entries: Vec::new(),
            index: HashMap::new(),
        };

        for entry in guidance::entries() {
            registry.register(entry);
        }
        for entry in experiments::entries() {
            registry.register(entry);
        }
        for entry in items::entries() {
            registry.register(entry);
        }
        for entry in bookings::entries() {
            registry.register(entry);
        }

        registry
    }

    fn register(&mut self, entry: ToolEntry) {
        let name = entry.tool.name.to_string();
        debug_assert!(!self.index.contains_key(&name), "duplicate tool: {name}");
        self.index.insert(name, self.entries.len());
        self.entries.push(entry);
    }

    /// Descriptors in registration order, for the protocol listing.
    pub fn descriptors(&self) -> Vec<Tool> {
        self.entries.iter().map(|e| e.tool.clone()).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.tool.name.as_ref()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve and run one invocation. This is the boundary where every
    /// failure kind becomes a reply:
    /// - unknown name: informative text, not an error, so the caller can
    ///   recover by listing tools again
    /// - missing API key: one instructive reply, short-circuited before any
    ///   request is built
    /// - handler errors: logged in full here, surfaced via
    ///   [`crate::ElabError::user_message`]
    pub async fn dispatch(
        &self,
        client: &ElabClient,
        name: &str,
        arguments: serde_json::Map<String, Value>,
    ) -> ToolReply {
        let Some(&idx) = self.index.get(name) else {
            return ToolReply::info(format!("Unknown tool: {name}"));
        };
        let entry = &self.entries[idx];

        if entry.requires_api_key && !client.has_api_key() {
            return ToolReply::info(
                "Error: ELABFTW_API_KEY environment variable is not set. \
                 Please configure your API key.",
            );
        }

        debug!(tool = name, "dispatching tool call");
        match (entry.handler)(client, ToolArgs::new(arguments)).await {
            Ok(text) => ToolReply::info(text),
            Err(e) => {
                error!(tool = name, error = %e, "tool call failed");
                ToolReply {
                    text: e.user_message(),
                    is_error: true,
                }
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Stable 2-space pretty printing for everything surfaced to the caller.
pub(crate) fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ElabConfig;

    fn offline_client() -> ElabClient {
        ElabClient::new(ElabConfig::new("http://127.0.0.1:1", "test-key")).unwrap()
    }

    fn unconfigured_client() -> ElabClient {
        ElabClient::new(ElabConfig::new("http://127.0.0.1:1", "")).unwrap()
    }

    #[test]
    fn test_registry_has_unique_names_and_schemas() {
        let registry = ToolRegistry::new();
        assert!(!registry.is_empty());
        assert_eq!(registry.names().len(), registry.descriptors().len());

        for tool in registry.descriptors() {
            let schema = &tool.input_schema;
            assert_eq!(
                schema.get("type").and_then(|v| v.as_str()),
                Some("object"),
                "schema for {} must be an object schema",
                tool.name
            );
            assert!(
                schema.contains_key("properties"),
                "schema for {} must declare properties",
                tool.name
            );
        }
    }

    #[test]
    fn test_registry_contains_the_full_surface() {
        let registry = ToolRegistry::new();
        for name in [
            "lab_prompt_elabftw",
            "list_experiments",
            "get_experiment",
            "create_experiment",
            "update_experiment",
            "delete_experiment",
            "add_tag",
            "remove_tag",
            "set_experiment_status",
            "link_item",
            "upload_attachment",
            "list_experiment_templates",
            "list_experiment_categories",
            "list_items",
            "get_item",
            "create_item",
            "update_item",
            "delete_item",
            "list_items_types",
            "add_item_tag",
            "remove_item_tag",
            "upload_item_attachment",
            "link_to_item",
            "list_bookings",
            "get_booking",
            "create_booking",
            "update_booking",
            "cancel_booking",
            "get_bookable_items",
        ] {
            assert!(registry.names().contains(&name), "missing tool: {name}");
        }
    }

    #[tokio::test]
    async fn test_unknown_tool_is_informational() {
        let registry = ToolRegistry::new();
        let reply = registry
            .dispatch(&offline_client(), "frobnicate", serde_json::Map::new())
            .await;
        assert_eq!(reply.text, "Unknown tool: frobnicate");
        assert!(!reply.is_error);
    }

    #[tokio::test]
    async fn test_guidance_tool_works_without_api_key() {
        let registry = ToolRegistry::new();
        let reply = registry
            .dispatch(
                &unconfigured_client(),
                "lab_prompt_elabftw",
                serde_json::Map::new(),
            )
            .await;
        assert!(!reply.is_error);
        assert!(reply.text.contains("eLabFTW"));
    }

    #[tokio::test]
    async fn test_credential_gate_short_circuits_everything_else() {
        let registry = ToolRegistry::new();
        let client = unconfigured_client();
        for name in registry.names() {
            if name == "lab_prompt_elabftw" {
                continue;
            }
            let reply = registry
                .dispatch(&client, name, serde_json::Map::new())
                .await;
            assert!(
                reply.text.contains("ELABFTW_API_KEY"),
                "{name} bypassed the credential gate"
            );
        }
    }

    #[tokio::test]
    async fn test_missing_required_argument_fails_before_network() {
        // Base URL points nowhere; a validation failure must win over any
        // transport error because no request is ever built.
        let registry = ToolRegistry::new();
        let reply = registry
            .dispatch(&offline_client(), "get_experiment", serde_json::Map::new())
            .await;
        assert!(reply.is_error);
        assert_eq!(reply.text, "Missing required argument: experiment_id");
    }

    #[tokio::test]
    async fn test_update_with_no_fields_is_a_validation_error() {
        let registry = ToolRegistry::new();
        let mut args = serde_json::Map::new();
        args.insert("experiment_id".to_string(), serde_json::json!(7));
        let reply = registry
            .dispatch(&offline_client(), "update_experiment", args)
            .await;
        assert!(reply.is_error);
        assert!(reply.text.contains("At least one field"));
    }
}
