use super::{pretty, ToolArgs, ToolEntry};
use crate::error::{ElabError, Result};
use crate::gateway::ElabClient;
use serde_json::{json, Map, Value};

pub(crate) fn entries() -> Vec<ToolEntry> {
    vec![
        ToolEntry::new(
            "list_items",
            "List database items (resources) from elabFTW. Items can be equipment, chemicals, \
             cell lines, etc. Returns list with basic info. Supports filtering by owner.",
            json!({
                "type": "object",
                "properties": {
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of items to return (default: 15, max: 100)",
                        "default": 15
                    },
                    "offset": {
                        "type": "integer",
                        "description": "Number of items to skip for pagination (default: 0)",
                        "default": 0
                    },
                    "search": {
                        "type": "string",
                        "description": "Optional search query to filter items by title or content"
                    },
                    "category": {
                        "type": "integer",
                        "description": "Optional category ID to filter items by type/category"
                    },
                    "owner": {
                        "type": "string",
                        "description": "Optional user ID(s) to filter items by owner. Can be a single ID like '2' or multiple comma-separated IDs like '2,3'"
                    }
                },
                "required": []
            }),
            |c, a| Box::pin(list_items(c, a)),
        ),
        ToolEntry::new(
            "get_item",
            "Get detailed information about a specific database item (resource) by its ID. \
             Returns full item data including title, body, metadata, tags, linked items, etc.",
            json!({
                "type": "object",
                "properties": {
                    "item_id": {
                        "type": "integer",
                        "description": "The unique ID of the item to retrieve"
                    }
                },
                "required": ["item_id"]
            }),
            |c, a| Box::pin(get_item(c, a)),
        ),
        ToolEntry::new(
            "create_item",
            "Create a new database item (resource) in elabFTW. Use this to add chemicals, \
             equipment, setups, reagents, etc. to your lab inventory.",
            json!({
                "type": "object",
                "properties": {
                    "category": {
                        "type": "integer",
                        "description": "Category/type ID for the item (REQUIRED). Use list_items_types to find valid IDs (e.g., Chemicals, Equipment, Setups)."
                    },
                    "title": {
                        "type": "string",
                        "description": "Title of the new item (e.g., chemical name, equipment name)"
                    },
                    "body": {
                        "type": "string",
                        "description": "Body/content of the item. HTML formatting is supported. Can include specifications, notes, safety info, etc.",
                        "default": ""
                    },
                    "tags": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Optional list of tags to add to the item"
                    }
                },
                "required": ["category"]
            }),
            |c, a| Box::pin(create_item(c, a)),
        ),
        ToolEntry::new(
            "update_item",
            "Update an existing database item (resource). You can update the title, body, \
             category, or rating.",
            json!({
                "type": "object",
                "properties": {
                    "item_id": {
                        "type": "integer",
                        "description": "The unique ID of the item to update"
                    },
                    "title": {
                        "type": "string",
                        "description": "New title for the item"
                    },
                    "body": {
                        "type": "string",
                        "description": "New body/content for the item. HTML formatting is supported."
                    },
                    "category": {
                        "type": "integer",
                        "description": "New category/type ID for the item. Use list_items_types to find valid IDs."
                    },
                    "rating": {
                        "type": "integer",
                        "description": "Rating for the item (0-5). Useful for rating reagent quality, equipment reliability, etc."
                    }
                },
                "required": ["item_id"]
            }),
            |c, a| Box::pin(update_item(c, a)),
        ),
        ToolEntry::new(
            "delete_item",
            "Delete a database item (soft-delete). The item will be marked as deleted but may be \
             recoverable by an administrator. Use with caution!",
            json!({
                "type": "object",
                "properties": {
                    "item_id": {
                        "type": "integer",
                        "description": "The unique ID of the item to delete"
                    }
                },
                "required": ["item_id"]
            }),
            |c, a| Box::pin(delete_item(c, a)),
        ),
        ToolEntry::new(
            "list_items_types",
            "List available item types/categories for database items. Item types define what \
             kinds of resources you can store (e.g., Chemicals, Equipment, Plasmids, Cell Lines, \
             Setups). Use the returned 'id' as the 'category' parameter when creating or filtering \
             items.",
            json!({
                "type": "object",
                "properties": {
                    "team_id": {
                        "type": "integer",
                        "description": "Team ID to get item types for (default: 1)",
                        "default": 1
                    }
                },
                "required": []
            }),
            |c, a| Box::pin(list_items_types(c, a)),
        ),
        ToolEntry::new(
            "add_item_tag",
            "Add a tag to an existing database item.",
            json!({
                "type": "object",
                "properties": {
                    "item_id": {
                        "type": "integer",
                        "description": "The unique ID of the item"
                    },
                    "tag": {
                        "type": "string",
                        "description": "The tag to add to the item"
                    }
                },
                "required": ["item_id", "tag"]
            }),
            |c, a| Box::pin(add_item_tag(c, a)),
        ),
        ToolEntry::new(
            "remove_item_tag",
            "Remove a tag from an existing database item.",
            json!({
                "type": "object",
                "properties": {
                    "item_id": {
                        "type": "integer",
                        "description": "The unique ID of the item"
                    },
                    "tag_id": {
                        "type": "integer",
                        "description": "The ID of the tag to remove (can be found in item details)"
                    }
                },
                "required": ["item_id", "tag_id"]
            }),
            |c, a| Box::pin(remove_item_tag(c, a)),
        ),
        ToolEntry::new(
            "upload_item_attachment",
            "Upload a file attachment to a database item. Useful for attaching datasheets, \
             manuals, certificates, etc.",
            json!({
                "type": "object",
                "properties": {
                    "item_id": {
                        "type": "integer",
                        "description": "The unique ID of the item"
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
                "required": ["item_id", "file_path"]
            }),
            |c, a| Box::pin(upload_item_attachment(c, a)),
        ),
        ToolEntry::new(
            "link_to_item",
            "Link another item or experiment to a database item. Useful for connecting related \
             resources (e.g., linking a chemical to the equipment it's used with).",
            json!({
                "type": "object",
                "properties": {
                    "item_id": {
                        "type": "integer",
                        "description": "The unique ID of the item to add the link to"
                    },
                    "link_id": {
                        "type": "integer",
                        "description": "The ID of the item or experiment to link"
                    },
                    "link_type": {
                        "type": "string",
                        "enum": ["items", "experiments"],
                        "description": "Type of link: 'items' to link another database item, 'experiments' to link an experiment",
                        "default": "items"
                    }
                },
                "required": ["item_id", "link_id"]
            }),
            |c, a| Box::pin(link_to_item(c, a)),
        ),
    ]
}

/// List-view projection. `category_title` and `rating` are item-specific;
/// body and booking settings stay out of listings.
pub(crate) fn item_summary(item: &Value) -> Value {
    json!({
        "id": item["id"],
        "title": item["title"],
        "category": item["category"],
        "category_title": item["category_title"],
        "created_at": item["created_at"],
        "modified_at": item["modified_at"],
        "rating": item["rating"],
        "owner": item["userid"],
        "owner_name": item["fullname"],
    })
}

fn item_type_summary(item_type: &Value) -> Value {
    let body = item_type["body"].as_str().unwrap_or_default();
    let truncated = if body.chars().count() > 100 {
        format!("{}...", body.chars().take(100).collect::<String>())
    } else {
        body.to_string()
    };

    json!({
        "id": item_type["id"],
        "title": item_type["title"],
        "color": item_type["color"],
        "body": truncated,
    })
}

async fn list_items(client: &ElabClient, args: ToolArgs) -> Result<String> {
    let limit = args.limit_or(15, 100)?;
    let offset = args.i64_or("offset", 0)?;
    let search = args.opt_str("search")?.map(str::to_string);
    let category = args.opt_i64("category")?;
    let owner = args.opt_str("owner")?.map(str::to_string);

    let result = client
        .list_items(limit, offset, search.as_deref(), category, owner.as_deref())
        .await?;

    Ok(match result.as_array() {
        Some(list) => {
            let summaries: Vec<Value> = list.iter().map(item_summary).collect();
            format!(
                "Found {} items (resources):\n\n{}",
                summaries.len(),
                pretty(&Value::Array(summaries))
            )
        }
        None => pretty(&result),
    })
}

async fn get_item(client: &ElabClient, args: ToolArgs) -> Result<String> {
    let item_id = args.require_i64("item_id")?;
    let result = client.get_item(item_id).await?;
    Ok(format!("Item {item_id}:\n\n{}", pretty(&result)))
}

async fn create_item(client: &ElabClient, args: ToolArgs) -> Result<String> {
    let category = args.require_i64("category")?;
    let title = args.opt_str("title")?.map(str::to_string);
    let body = args.str_or("body", "")?.to_string();
    let tags = args.string_vec("tags")?;

    let outcome = client
        .create_item(category, title.as_deref(), &body, &tags)
        .await?;
    match (outcome.id, outcome.resource) {
        (Some(item_id), Some(resource)) => Ok(format!(
            "Successfully created item with ID {item_id}:\n\n{}",
            pretty(&resource)
        )),
        _ => Ok(
            "Item created, but eLabFTW did not return its id (no Location header). \
             Use list_items to find the new entry."
                .to_string(),
        ),
    }
}

async fn update_item(client: &ElabClient, args: ToolArgs) -> Result<String> {
    let item_id = args.require_i64("item_id")?;

    let mut patch = Map::new();
    if let Some(title) = args.opt_str("title")? {
        patch.insert("title".to_string(), Value::String(title.to_string()));
    }
    if let Some(body) = args.opt_str("body")? {
        patch.insert("body".to_string(), Value::String(body.to_string()));
    }
    if let Some(category) = args.opt_i64("category")? {
        patch.insert("category_id".to_string(), json!(category));
    }
    if let Some(rating) = args.opt_i64("rating")? {
        patch.insert("rating".to_string(), json!(rating));
    }
    if patch.is_empty() {
        return Err(ElabError::InvalidArgument(
            "At least one field must be provided for update. \
             Provide at least one of: title, body, category, rating"
                .to_string(),
        ));
    }

    let updated_fields: Vec<String> = patch.keys().cloned().collect();
    client.update_item(item_id, patch).await?;
    Ok(pretty(&json!({
        "status": "success",
        "message": format!("Item {item_id} updated successfully"),
        "updated_fields": updated_fields,
    })))
}

async fn delete_item(client: &ElabClient, args: ToolArgs) -> Result<String> {
    let item_id = args.require_i64("item_id")?;
    client.delete_item(item_id).await?;
    Ok(pretty(&json!({
        "status": "success",
        "message": format!("Item {item_id} has been deleted"),
    })))
}

async fn list_items_types(client: &ElabClient, args: ToolArgs) -> Result<String> {
    let team_id = args.i64_or("team_id", 1)?;

    let result = client.list_items_types(team_id).await?;
    Ok(match result.as_array() {
        Some(list) => {
            let summaries: Vec<Value> = list.iter().map(item_type_summary).collect();
            format!(
                "Found {} item types/categories:\n\n{}\n\n\
                 Use the 'id' as the 'category' parameter when creating items or filtering the \
                 item list.",
                summaries.len(),
                pretty(&Value::Array(summaries))
            )
        }
        None => pretty(&result),
    })
}

async fn add_item_tag(client: &ElabClient, args: ToolArgs) -> Result<String> {
    let item_id = args.require_i64("item_id")?;
    let tag = args.require_str("tag")?;
    client.add_item_tag(item_id, tag).await?;
    Ok(pretty(&json!({
        "status": "success",
        "message": format!("Tag '{tag}' added to item {item_id}"),
    })))
}

async fn remove_item_tag(client: &ElabClient, args: ToolArgs) -> Result<String> {
    let item_id = args.require_i64("item_id")?;
    let tag_id = args.require_i64("tag_id")?;
    client.remove_item_tag(item_id, tag_id).await?;
    Ok(pretty(&json!({
        "status": "success",
        "message": format!("Tag {tag_id} removed from item {item_id}"),
    })))
}

async fn upload_item_attachment(client: &ElabClient, args: ToolArgs) -> Result<String> {
    let item_id = args.require_i64("item_id")?;
    let file_path = args.require_str("file_path")?;
    let comment = args.opt_str("comment")?;

    let file_name = client
        .upload_item_attachment(item_id, file_path, comment)
        .await?;
    Ok(pretty(&json!({
        "status": "success",
        "message": format!("File '{file_name}' uploaded to item {item_id}"),
    })))
}

async fn link_to_item(client: &ElabClient, args: ToolArgs) -> Result<String> {
    let item_id = args.require_i64("item_id")?;
    let link_id = args.require_i64("link_id")?;
    let link_type = args.str_or("link_type", "items")?;
    if link_type != "experiments" && link_type != "items" {
        return Err(ElabError::InvalidArgument(
            "link_type must be 'experiments' or 'items'".to_string(),
        ));
    }

    client.link_to_item(item_id, link_id, link_type).await?;
    Ok(pretty(&json!({
        "status": "success",
        "message": format!(
            "Linked {} {link_id} to item {item_id}",
            link_type.trim_end_matches('s')
        ),
    })))
}
