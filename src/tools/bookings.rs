use super::{pretty, ToolArgs, ToolEntry};
use crate::error::{ElabError, Result};
use crate::gateway::ElabClient;
use serde_json::{json, Map, Value};

pub(crate) fn entries() -> Vec<ToolEntry> {
    vec![
        ToolEntry::new(
            "list_bookings",
            "List booking events/reservations for equipment and setups. Shows scheduled use of \
             bookable items. Returns event details including item, user, time, and duration.",
            json!({
                "type": "object",
                "properties": {
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of bookings to return (default: 50)",
                        "default": 50
                    },
                    "offset": {
                        "type": "integer",
                        "description": "Number of bookings to skip for pagination (default: 0)",
                        "default": 0
                    },
                    "start": {
                        "type": "string",
                        "description": "Filter bookings starting after this datetime (ISO format: 2024-01-15T09:00:00)"
                    },
                    "end": {
                        "type": "string",
                        "description": "Filter bookings ending before this datetime (ISO format: 2024-01-15T17:00:00)"
                    },
                    "item_id": {
                        "type": "integer",
                        "description": "Filter bookings for a specific item/equipment"
                    }
                },
                "required": []
            }),
            |c, a| Box::pin(list_bookings(c, a)),
        ),
        ToolEntry::new(
            "get_booking",
            "Get detailed information about a specific booking by its ID.",
            json!({
                "type": "object",
                "properties": {
                    "event_id": {
                        "type": "integer",
                        "description": "The unique ID of the booking/event"
                    }
                },
                "required": ["event_id"]
            }),
            |c, a| Box::pin(get_booking(c, a)),
        ),
        ToolEntry::new(
            "create_booking",
            "Book/reserve an item (equipment, setup, etc.) for a specific time period. The item \
             must have is_bookable=1. Use list_items to find bookable items.",
            json!({
                "type": "object",
                "properties": {
                    "item_id": {
                        "type": "integer",
                        "description": "The ID of the item to book (must be bookable)"
                    },
                    "start": {
                        "type": "string",
                        "description": "Start datetime in ISO 8601 format (e.g., '2024-01-15T09:00:00' or '2024-01-15T09:00:00+01:00')"
                    },
                    "end": {
                        "type": "string",
                        "description": "End datetime in ISO 8601 format (e.g., '2024-01-15T17:00:00' or '2024-01-15T17:00:00+01:00')"
                    },
                    "title": {
                        "type": "string",
                        "description": "Optional title/description for the booking (e.g., 'Sample preparation experiment')"
                    }
                },
                "required": ["item_id", "start", "end"]
            }),
            |c, a| Box::pin(create_booking(c, a)),
        ),
        ToolEntry::new(
            "update_booking",
            "Update an existing booking (change time or title). Only the booking creator or \
             admins can modify bookings. Subject to cancellation policies.",
            json!({
                "type": "object",
                "properties": {
                    "event_id": {
                        "type": "integer",
                        "description": "The ID of the booking to update"
                    },
                    "start": {
                        "type": "string",
                        "description": "New start datetime in ISO 8601 format"
                    },
                    "end": {
                        "type": "string",
                        "description": "New end datetime in ISO 8601 format"
                    },
                    "title": {
                        "type": "string",
                        "description": "New title for the booking"
                    }
                },
                "required": ["event_id"]
            }),
            |c, a| Box::pin(update_booking(c, a)),
        ),
        ToolEntry::new(
            "cancel_booking",
            "Cancel/delete a booking. Permissions and cancellation policies (book_is_cancellable, \
             book_cancel_minutes) may apply. Only the booking creator or admins can cancel.",
            json!({
                "type": "object",
                "properties": {
                    "event_id": {
                        "type": "integer",
                        "description": "The ID of the booking to cancel"
                    }
                },
                "required": ["event_id"]
            }),
            |c, a| Box::pin(cancel_booking(c, a)),
        ),
        ToolEntry::new(
            "get_bookable_items",
            "List all items that can be booked (is_bookable=1) with their booking settings like \
             max duration, overlap rules, and cancellation policies. Use this to find what \
             equipment/setups are available for booking.",
            json!({
                "type": "object",
                "properties": {
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of items to return (default: 50)",
                        "default": 50
                    }
                },
                "required": []
            }),
            |c, a| Box::pin(get_bookable_items(c, a)),
        ),
    ]
}

fn booking_summary(event: &Value) -> Value {
    json!({
        "id": event["id"],
        "title": event["title"],
        "item_id": event["items_id"],
        "item_title": event["item_title"],
        "start": event["start"],
        "end": event["end"],
        "user": event["fullname"],
        "user_id": event["userid"],
        "duration_minutes": event["event_duration_minutes"],
        "is_cancellable": event["book_is_cancellable"],
    })
}

/// Booking-policy projection for a bookable item. 0 or absent means the
/// instance imposes no limit, surfaced as "unlimited".
fn bookable_summary(item: &Value) -> Value {
    json!({
        "id": item["id"],
        "title": item["title"],
        "category": item["category_title"],
        "max_duration_minutes": or_unlimited(&item["book_max_minutes"]),
        "max_concurrent_slots": or_unlimited(&item["book_max_slots"]),
        "can_overlap": truthy(&item["book_can_overlap"]),
        "is_cancellable": truthy(&item["book_is_cancellable"]),
        "cancel_advance_minutes": item["book_cancel_minutes"],
        "can_book_in_past": truthy(&item["book_users_can_in_past"]),
    })
}

fn or_unlimited(value: &Value) -> Value {
    match value.as_i64() {
        Some(n) if n != 0 => value.clone(),
        _ => json!("unlimited"),
    }
}

fn truthy(value: &Value) -> bool {
    value.as_i64().unwrap_or(0) != 0
}

async fn list_bookings(client: &ElabClient, args: ToolArgs) -> Result<String> {
    let limit = args.i64_or("limit", 50)?;
    let offset = args.i64_or("offset", 0)?;
    let start = args.opt_str("start")?.map(str::to_string);
    let end = args.opt_str("end")?.map(str::to_string);
    let item_id = args.opt_i64("item_id")?;

    let result = client
        .list_events(limit, offset, start.as_deref(), end.as_deref(), item_id)
        .await?;

    Ok(match result.as_array() {
        Some(list) => {
            let summaries: Vec<Value> = list.iter().map(booking_summary).collect();
            format!(
                "Found {} bookings:\n\n{}",
                summaries.len(),
                pretty(&Value::Array(summaries))
            )
        }
        None => pretty(&result),
    })
}

async fn get_booking(client: &ElabClient, args: ToolArgs) -> Result<String> {
    let event_id = args.require_i64("event_id")?;
    let result = client.get_event(event_id).await?;
    Ok(format!("Booking {event_id}:\n\n{}", pretty(&result)))
}

async fn create_booking(client: &ElabClient, args: ToolArgs) -> Result<String> {
    let item_id = args.require_i64("item_id")?;
    let start = args.require_str("start")?.to_string();
    let end = args.require_str("end")?.to_string();
    let title = args.opt_str("title")?.map(str::to_string);

    let outcome = client
        .create_booking(item_id, &start, &end, title.as_deref())
        .await?;
    match outcome.resource {
        Some(resource) => Ok(format!(
            "Successfully created booking:\n\n{}",
            pretty(&resource)
        )),
        None => Ok(pretty(&json!({
            "status": "success",
            "message": "Booking created successfully",
        }))),
    }
}

async fn update_booking(client: &ElabClient, args: ToolArgs) -> Result<String> {
    let event_id = args.require_i64("event_id")?;

    let mut patch = Map::new();
    if let Some(start) = args.opt_str("start")? {
        patch.insert("start".to_string(), Value::String(start.to_string()));
    }
    if let Some(end) = args.opt_str("end")? {
        patch.insert("end".to_string(), Value::String(end.to_string()));
    }
    if let Some(title) = args.opt_str("title")? {
        patch.insert("title".to_string(), Value::String(title.to_string()));
    }
    if patch.is_empty() {
        return Err(ElabError::InvalidArgument(
            "At least one field must be provided for update".to_string(),
        ));
    }

    let result = client.update_booking(event_id, patch).await?;
    Ok(format!(
        "Successfully updated booking:\n\n{}",
        pretty(&result)
    ))
}

async fn cancel_booking(client: &ElabClient, args: ToolArgs) -> Result<String> {
    let event_id = args.require_i64("event_id")?;
    client.delete_booking(event_id).await?;
    Ok(pretty(&json!({
        "status": "success",
        "message": format!("Booking {event_id} has been cancelled"),
    })))
}

/// List items, keep the bookable ones, then fetch each in full to expose its
/// booking policy fields. The per-item fan-out mirrors what the listing
/// endpoint cannot return on its own.
async fn get_bookable_items(client: &ElabClient, args: ToolArgs) -> Result<String> {
    let limit = args.i64_or("limit", 50)?;

    let all_items = client.list_items(limit, 0, None, None, None).await?;
    let mut bookable = Vec::new();
    if let Some(items) = all_items.as_array() {
        for item in items {
            if item["is_bookable"].as_i64() != Some(1) {
                continue;
            }
            if let Some(id) = item["id"].as_i64() {
                let full_item = client.get_item(id).await?;
                bookable.push(bookable_summary(&full_item));
            }
        }
    }

    Ok(format!(
        "Found {} bookable items:\n\n{}",
        bookable.len(),
        pretty(&Value::Array(bookable))
    ))
}
