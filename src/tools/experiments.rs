use super::{pretty, ToolArgs, ToolEntry};
use crate::error::{ElabError, Result};
use crate::gateway::{ElabClient, NewExperiment};
use serde_json::{json, Map, Value};

pub(crate) fn entries() -> Vec<ToolEntry> {
    vec![
        ToolEntry::new(
            "list_experiments",
            "List experiments from elabFTW. Returns a list of experiments with their basic info \
             (ID, title, date, etc.). Supports pagination, search, and filtering by owner.",
            json!({
                "type": "object",
                "properties": {
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of experiments to return (default: 15, max: 100)",
                        "default": 15
                    },
                    "offset": {
                        "type": "integer",
                        "description": "Number of experiments to skip for pagination (default: 0)",
                        "default": 0
                    },
                    "search": {
                        "type": "string",
                        "description": "Optional search query to filter experiments by title or content"
                    },
                    "owner": {
                        "type": "string",
                        "description": "Optional user ID(s) to filter experiments by owner. Can be a single ID like '2' or multiple comma-separated IDs like '2,3'"
                    }
                },
                "required": []
            }),
            |c, a| Box::pin(list_experiments(c, a)),
        ),
        ToolEntry::new(
            "get_experiment",
            "Get detailed information about a specific experiment by its ID. Returns full \
             experiment data including title, body, metadata, tags, etc.",
            json!({
                "type": "object",
                "properties": {
                    "experiment_id": {
                        "type": "integer",
                        "description": "The unique ID of the experiment to retrieve"
                    }
                },
                "required": ["experiment_id"]
            }),
            |c, a| Box::pin(get_experiment(c, a)),
        ),
        ToolEntry::new(
            "create_experiment",
            "Create a new experiment in elabFTW. The experiment will be created with the given \
             title and optional body content. HTML formatting is supported in the body.",
            json!({
                "type": "object",
                "properties": {
                    "title": {
                        "type": "string",
                        "description": "Title of the new experiment"
                    },
                    "body": {
                        "type": "string",
                        "description": "Body/content of the experiment. HTML formatting is supported.",
                        "default": ""
                    },
                    "template": {
                        "type": "integer",
                        "description": "Template ID to use for the experiment structure (-1 for empty body, 0 for team template, or specific template ID). Use list_experiment_templates to see available templates. NOTE: This is different from 'category'!"
                    },
                    "category": {
                        "type": "integer",
                        "description": "Category ID to classify the experiment. Use list_experiment_categories to find valid category IDs. NOTE: This is different from 'template'!"
                    },
                    "tags": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Optional list of tags to add to the experiment"
                    }
                },
                "required": ["title"]
            }),
            |c, a| Box::pin(create_experiment(c, a)),
        ),
        ToolEntry::new(
            "update_experiment",
            "Update an existing experiment. You can update the title, body, category, or status. \
             At least one field must be provided.",
            json!({
                "type": "object",
                "properties": {
                    "experiment_id": {
                        "type": "integer",
                        "description": "The unique ID of the experiment to update"
                    },
                    "title": {
                        "type": "string",
                        "description": "New title for the experiment"
                    },
                    "body": {
                        "type": "string",
                        "description": "New body/content for the experiment. HTML formatting is supported."
                    },
                    "category": {
                        "type": "integer",
                        "description": "New category ID for the experiment. Use list_experiment_categories to find valid IDs."
                    },
                    "status": {
                        "type": "integer",
                        "description": "New status ID for the experiment."
                    }
                },
                "required": ["experiment_id"]
            }),
            |c, a| Box::pin(update_experiment(c, a)),
        ),
        ToolEntry::new(
            "delete_experiment",
            "Delete an experiment (soft-delete). The experiment will be marked as deleted but may \
             be recoverable by an administrator. Use with caution!",
            json!({
                "type": "object",
                "properties": {
                    "experiment_id": {
                        "type": "integer",
                        "description": "The unique ID of the experiment to delete"
                    }
                },
                "required": ["experiment_id"]
            }),
            |c, a| Box::pin(delete_experiment(c, a)),
        ),
        ToolEntry::new(
            "add_tag",
            "Add a tag to an existing experiment.",
            json!({
                "type": "object",
                "properties": {
                    "experiment_id": {
                        "type": "integer",
                        "description": "The unique ID of the experiment"
                    },
                    "tag": {
                        "type": "string",
                        "description": "The tag to add to the experiment"
                    }
                },
                "required": ["experiment_id", "tag"]
            }),
            |c, a| Box::pin(add_tag(c, a)),
        ),
        ToolEntry::new(
            "remove_tag",
            "Remove a tag from an existing experiment.",
            json!({
                "type": "object",
                "properties": {
                    "experiment_id": {
                        "type": "integer",
                        "description": "The unique ID of the experiment"
                    },
                    "tag_id": {
                        "type": "integer",
                        "description": "The ID of the tag to remove (can be found in experiment details)"
                    }
                },
                "required": ["experiment_id", "tag_id"]
            }),
            |c, a| Box::pin(remove_tag(c, a)),
        ),
        ToolEntry::new(
            "set_experiment_status",
            "Set the status of an experiment (e.g., Running, Success, Need to be redone). Status \
             IDs depend on your elabFTW configuration.",
            json!({
                "type": "object",
                "properties": {
                    "experiment_id": {
                        "type": "integer",
                        "description": "The unique ID of the experiment"
                    },
                    "status_id": {
                        "type": "integer",
                        "description": "The status ID to set (depends on your elabFTW configuration)"
                    }
                },
                "required": ["experiment_id", "status_id"]
            }),
            |c, a| Box::pin(set_experiment_status(c, a)),
        ),
        ToolEntry::new(
            "link_item",
            "Link another experiment or database item to an experiment. Useful for creating \
             relationships between entries.",
            json!({
                "type": "object",
                "properties": {
                    "experiment_id": {
                        "type": "integer",
                        "description": "The unique ID of the experiment to add the link to"
                    },
                    "link_id": {
                        "type": "integer",
                        "description": "The ID of the experiment or item to link"
                    },
                    "link_type": {
                        "type": "string",
                        "enum": ["experiments", "items"],
                        "description": "Type of link: 'experiments' to link another experiment, 'items' to link a database item",
                        "default": "experiments"
                    }
                },
                "required": ["experiment_id", "link_id"]
            }),
            |c, a| Box::pin(link_item(c, a)),
        ),
        ToolEntry::new(
            "upload_attachment",
            "Upload a file attachment to an experiment. The file must exist on the local \
             filesystem.",
            json!({
                "type": "object",
                "properties": {
                    "experiment_id": {
                        "type": "integer",
                        "description": "The unique ID of the experiment"
                    },
                    "file_path": {
                        "type": "string",
                        "description": "The full path to the file to upload"
                    },
                    "comment": {
                        "type": "string",
                        "description": "Optional comment to attach to the uploaded file"
                    }
                },
                "required": ["experiment_id", "file_path"]
            }),
            |c, a| Box::pin(upload_attachment(c, a)),
        ),
        ToolEntry::new(
            "list_experiment_templates",
            "List available experiment TEMPLATES from elabFTW. Templates define the initial \
             structure/content of experiments. Use the returned 'id' as the 'template' parameter \
             when creating experiments. Note: This is DIFFERENT from categories - use \
             list_experiment_categories for classification categories.",
            json!({
                "type": "object",
                "properties": {
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of templates to return (default: 15)",
                        "default": 15
                    },
                    "offset": {
                        "type": "integer",
                        "description": "Number of templates to skip for pagination (default: 0)",
                        "default": 0
                    }
                },
                "required": []
            }),
            |c, a| Box::pin(list_experiment_templates(c, a)),
        ),
        ToolEntry::new(
            "list_experiment_categories",
            "List available experiment CATEGORIES from elabFTW. Categories are used to \
             classify/organize experiments (e.g., 'PCR', 'Western Blot'). Use the returned 'id' as \
             the 'category' parameter when creating or updating experiments. Note: This is \
             DIFFERENT from templates.",
            json!({
                "type": "object",
                "properties": {
                    "team_id": {
                        "type": "integer",
                        "description": "Team ID to get categories for (default: 1)",
                        "default": 1
                    }
                },
                "required": []
            }),
            |c, a| Box::pin(list_experiment_categories(c, a)),
        ),
    ]
}

/// Reduced projection surfaced for each entry in a listing. Field omission is
/// part of the interface: body and metadata stay out of list views.
fn experiment_summary(exp: &Value) -> Value {
    json!({
        "id": exp["id"],
        "title": exp["title"],
        "created_at": exp["created_at"],
        "modified_at": exp["modified_at"],
        "category": exp["category"],
        "status": exp["status"],
        "owner": exp["userid"],
        "owner_name": exp["fullname"],
    })
}

fn template_summary(tpl: &Value) -> Value {
    json!({
        "id": tpl["id"],
        "title": tpl["title"],
        "created_at": tpl["created_at"],
        "modified_at": tpl["modified_at"],
    })
}

fn category_summary(cat: &Value) -> Value {
    json!({
        "id": cat["id"],
        "title": cat["title"],
        "color": cat["color"],
        "is_default": cat["is_default"],
    })
}

async fn list_experiments(client: &ElabClient, args: ToolArgs) -> Result<String> {
    let limit = args.limit_or(15, 100)?;
    let offset = args.i64_or("offset", 0)?;
    let search = args.opt_str("search")?.map(str::to_string);
    let owner = args.opt_str("owner")?.map(str::to_string);

    let result = client
        .list_experiments(limit, offset, search.as_deref(), owner.as_deref())
        .await?;

    Ok(match result.as_array() {
        Some(list) => {
            let summaries: Vec<Value> = list.iter().map(experiment_summary).collect();
            format!(
                "Found {} experiments:\n\n{}",
                summaries.len(),
                pretty(&Value::Array(summaries))
            )
        }
        None => pretty(&result),
    })
}

async fn get_experiment(client: &ElabClient, args: ToolArgs) -> Result<String> {
    let experiment_id = args.require_i64("experiment_id")?;
    let result = client.get_experiment(experiment_id).await?;
    Ok(format!("Experiment {experiment_id}:\n\n{}", pretty(&result)))
}

async fn create_experiment(client: &ElabClient, args: ToolArgs) -> Result<String> {
    let new = NewExperiment {
        title: args.require_str("title")?.to_string(),
        body: args.str_or("body", "")?.to_string(),
        template: args.opt_i64("template")?,
        category: args.opt_i64("category")?,
        tags: args.string_vec("tags")?,
    };

    let outcome = client.create_experiment(new).await?;
    match outcome.resource {
        Some(resource) => Ok(format!(
            "Successfully created experiment:\n\n{}",
            pretty(&resource)
        )),
        None => Ok(
            "Experiment created, but eLabFTW did not return its id (no Location header). \
             Use list_experiments to find the new entry."
                .to_string(),
        ),
    }
}

async fn update_experiment(client: &ElabClient, args: ToolArgs) -> Result<String> {
    let experiment_id = args.require_i64("experiment_id")?;

    let mut patch = Map::new();
    if let Some(title) = args.opt_str("title")? {
        patch.insert("title".to_string(), Value::String(title.to_string()));
    }
    if let Some(body) = args.opt_str("body")? {
        patch.insert("body".to_string(), Value::String(body.to_string()));
    }
    if let Some(category) = args.opt_i64("category")? {
        patch.insert("category".to_string(), json!(category));
    }
    if let Some(status) = args.opt_i64("status")? {
        patch.insert("status".to_string(), json!(status));
    }
    if patch.is_empty() {
        return Err(ElabError::InvalidArgument(
            "At least one field must be provided for update".to_string(),
        ));
    }

    let result = client.update_experiment(experiment_id, patch).await?;
    Ok(format!(
        "Successfully updated experiment {experiment_id}:\n\n{}",
        pretty(&result)
    ))
}

async fn delete_experiment(client: &ElabClient, args: ToolArgs) -> Result<String> {
    let experiment_id = args.require_i64("experiment_id")?;
    client.delete_experiment(experiment_id).await?;
    Ok(pretty(&json!({
        "status": "success",
        "message": format!("Experiment {experiment_id} has been deleted"),
    })))
}

async fn add_tag(client: &ElabClient, args: ToolArgs) -> Result<String> {
    let experiment_id = args.require_i64("experiment_id")?;
    let tag = args.require_str("tag")?;
    client.add_experiment_tag(experiment_id, tag).await?;
    Ok(pretty(&json!({
        "status": "success",
        "message": format!("Tag '{tag}' added to experiment {experiment_id}"),
    })))
}

async fn remove_tag(client: &ElabClient, args: ToolArgs) -> Result<String> {
    let experiment_id = args.require_i64("experiment_id")?;
    let tag_id = args.require_i64("tag_id")?;
    client.remove_experiment_tag(experiment_id, tag_id).await?;
    Ok(pretty(&json!({
        "status": "success",
        "message": format!("Tag {tag_id} removed from experiment {experiment_id}"),
    })))
}

async fn set_experiment_status(client: &ElabClient, args: ToolArgs) -> Result<String> {
    let experiment_id = args.require_i64("experiment_id")?;
    let status_id = args.require_i64("status_id")?;

    let mut patch = Map::new();
    patch.insert("status".to_string(), json!(status_id));
    let result = client.update_experiment(experiment_id, patch).await?;

    Ok(format!(
        "Successfully updated status for experiment {experiment_id}:\n\n{}",
        pretty(&result)
    ))
}

async fn link_item(client: &ElabClient, args: ToolArgs) -> Result<String> {
    let experiment_id = args.require_i64("experiment_id")?;
    let link_id = args.require_i64("link_id")?;
    let link_type = args.str_or("link_type", "experiments")?;
    if link_type != "experiments" && link_type != "items" {
        return Err(ElabError::InvalidArgument(
            "link_type must be 'experiments' or 'items'".to_string(),
        ));
    }

    client
        .link_to_experiment(experiment_id, link_id, link_type)
        .await?;
    Ok(pretty(&json!({
        "status": "success",
        "message": format!(
            "Linked {} {link_id} to experiment {experiment_id}",
            link_type.trim_end_matches('s')
        ),
    })))
}

async fn upload_attachment(client: &ElabClient, args: ToolArgs) -> Result<String> {
    let experiment_id = args.require_i64("experiment_id")?;
    let file_path = args.require_str("file_path")?;
    let comment = args.opt_str("comment")?;

    let file_name = client
        .upload_experiment_attachment(experiment_id, file_path, comment)
        .await?;
    Ok(pretty(&json!({
        "status": "success",
        "message": format!("File '{file_name}' uploaded to experiment {experiment_id}"),
    })))
}

async fn list_experiment_templates(client: &ElabClient, args: ToolArgs) -> Result<String> {
    let limit = args.limit_or(15, 100)?;
    let offset = args.i64_or("offset", 0)?;

    let result = client.list_experiment_templates(limit, offset).await?;
    Ok(match result.as_array() {
        Some(list) => {
            let summaries: Vec<Value> = list.iter().map(template_summary).collect();
            format!(
                "Found {} experiment TEMPLATES:\n\n{}\n\n\
                 Use the 'id' as the 'template' parameter when creating a new experiment.\n\n\
                 NOTE: Templates define experiment structure. For classification categories, \
                 use list_experiment_categories instead.",
                summaries.len(),
                pretty(&Value::Array(summaries))
            )
        }
        None => pretty(&result),
    })
}

async fn list_experiment_categories(client: &ElabClient, args: ToolArgs) -> Result<String> {
    let team_id = args.i64_or("team_id", 1)?;

    let result = client.list_experiment_categories(team_id).await?;
    Ok(match result.as_array() {
        Some(list) => {
            let summaries: Vec<Value> = list.iter().map(category_summary).collect();
            format!(
                "Found {} experiment CATEGORIES:\n\n{}\n\n\
                 Use the 'id' as the 'category' parameter when creating or updating experiments.\n\n\
                 NOTE: Categories classify experiments. For experiment structure/templates, \
                 use list_experiment_templates instead.",
                summaries.len(),
                pretty(&Value::Array(summaries))
            )
        }
        None => pretty(&result),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_experiment_summary_projects_and_renames() {
        let raw = json!({
            "id": 12,
            "title": "PCR run",
            "created_at": "2024-01-15 09:00:00",
            "modified_at": "2024-01-16 10:00:00",
            "category": 3,
            "status": 1,
            "userid": 2,
            "fullname": "Ada Lovelace",
            "body": "<p>should not appear in listings</p>",
        });

        let summary = experiment_summary(&raw);
        assert_eq!(summary["id"], 12);
        assert_eq!(summary["owner"], 2);
        assert_eq!(summary["owner_name"], "Ada Lovelace");
        assert!(summary.get("body").is_none());
    }

    #[test]
    fn test_summary_tolerates_missing_fields() {
        let summary = experiment_summary(&json!({ "id": 1 }));
        assert_eq!(summary["id"], 1);
        assert!(summary["title"].is_null());
    }

    #[test]
    fn test_category_summary_fields() {
        let summary = category_summary(&json!({
            "id": 4, "title": "Western Blot", "color": "00ff00", "is_default": 0
        }));
        assert_eq!(summary["color"], "00ff00");
        assert_eq!(summary["is_default"], 0);
    }
}
