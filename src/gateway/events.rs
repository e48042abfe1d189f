use super::{CreateOutcome, ElabClient};
use crate::error::Result;
use reqwest::Method;
use serde_json::{json, Map, Value};
use tracing::warn;

impl ElabClient {
    pub async fn list_events(
        &self,
        limit: i64,
        offset: i64,
        start: Option<&str>,
        end: Option<&str>,
        item_id: Option<i64>,
    ) -> Result<Value> {
        let mut query = vec![("limit", limit.to_string()), ("offset", offset.to_string())];
        if let Some(start) = start {
            query.push(("start", start.to_string()));
        }
        if let Some(end) = end {
            query.push(("end", end.to_string()));
        }
        if let Some(item_id) = item_id {
            query.push(("item", item_id.to_string()));
        }

        self.request_json(Method::GET, "events", &query, None).await
    }

    pub async fn get_event(&self, event_id: i64) -> Result<Value> {
        self.request_json(Method::GET, &format!("events/{event_id}"), &[], None)
            .await
    }

    /// Book an item for a time window. Same two-step commit as the other
    /// creates: POST, then GET on the id from the `Location` header. A
    /// missing header is reported as a degraded success.
    pub async fn create_booking(
        &self,
        item_id: i64,
        start: &str,
        end: &str,
        title: Option<&str>,
    ) -> Result<CreateOutcome> {
        let mut body = Map::new();
        body.insert("item".to_string(), json!(item_id));
        body.insert("start".to_string(), Value::String(start.to_string()));
        body.insert("end".to_string(), Value::String(end.to_string()));
        if let Some(title) = title {
            body.insert("title".to_string(), Value::String(title.to_string()));
        }

        let response = self
            .send(Method::POST, "events", &[], Some(&Value::Object(body)))
            .await?;

        let Some(event_id) = Self::created_id(&response) else {
            warn!("booking created but response carried no Location header");
            return Ok(CreateOutcome::default());
        };

        let resource = self.get_event(event_id).await?;
        Ok(CreateOutcome {
            id: Some(event_id),
            resource: Some(resource),
            suppressed: Vec::new(),
        })
    }

    /// PATCH the given fields, then GET to return the full updated booking.
    pub async fn update_booking(&self, event_id: i64, patch: Map<String, Value>) -> Result<Value> {
        self.send(
            Method::PATCH,
            &format!("events/{event_id}"),
            &[],
            Some(&Value::Object(patch)),
        )
        .await?;

        self.get_event(event_id).await
    }

    pub async fn delete_booking(&self, event_id: i64) -> Result<()> {
        self.send(Method::DELETE, &format!("events/{event_id}"), &[], None)
            .await?;
        Ok(())
    }
}
