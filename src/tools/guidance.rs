use super::{ToolArgs, ToolEntry};
use crate::error::Result;
use crate::gateway::ElabClient;
use crate::prompts;
use serde_json::json;

pub(crate) fn entries() -> Vec<ToolEntry> {
    vec![ToolEntry::new(
        "lab_prompt_elabftw",
        "Return the integrated eLabFTW lab prompt content for LLM guidance. This provides the \
         system prompt that defines how the AI assistant should behave when working with eLabFTW \
         data.",
        json!({
            "type": "object",
            "properties": {},
            "required": []
        }),
        |c, a| Box::pin(lab_prompt(c, a)),
    )
    // Answered from in-process static content: must stay reachable even when
    // no API key is configured, so it can explain the configuration itself.
    .without_api_key()]
}

async fn lab_prompt(_client: &ElabClient, _args: ToolArgs) -> Result<String> {
    Ok(prompts::LAB_PROMPT.trim().to_string())
}
