use super::experiments::attachment_form;
use super::{CreateOutcome, ElabClient};
use crate::error::Result;
use reqwest::Method;
use serde_json::{json, Map, Value};
use tracing::warn;

impl ElabClient {
    pub async fn list_items(
        &self,
        limit: i64,
        offset: i64,
        search: Option<&str>,
        category: Option<i64>,
        owner: Option<&str>,
    ) -> Result<Value> {
        let mut query = vec![("limit", limit.to_string()), ("offset", offset.to_string())];
        if let Some(search) = search {
            query.push(("q", search.to_string()));
        }
        if let Some(category) = category {
            query.push(("cat", category.to_string()));
        }
        if let Some(owner) = owner {
            query.push(("owner", owner.to_string()));
        }

        self.request_json(Method::GET, "items", &query, None).await
    }

    pub async fn get_item(&self, item_id: i64) -> Result<Value> {
        self.request_json(Method::GET, &format!("items/{item_id}"), &[], None)
            .await
    }

    /// Create a database item. eLabFTW only accepts the category on the POST;
    /// title and body land in a follow-up PATCH on the id parsed from the
    /// `Location` header, then a GET materializes the full entry. Tag
    /// attachments are best-effort.
    pub async fn create_item(
        &self,
        category: i64,
        title: Option<&str>,
        body: &str,
        tags: &[String],
    ) -> Result<CreateOutcome> {
        let response = self
            .send(
                Method::POST,
                "items",
                &[],
                Some(&json!({ "category_id": category })),
            )
            .await?;

        let Some(item_id) = Self::created_id(&response) else {
            warn!("item created but response carried no Location header");
            return Ok(CreateOutcome::default());
        };

        let mut patch = Map::new();
        if let Some(title) = title {
            patch.insert("title".to_string(), Value::String(title.to_string()));
        }
        if !body.is_empty() {
            patch.insert("body".to_string(), Value::String(body.to_string()));
        }
        if !patch.is_empty() {
            self.send(
                Method::PATCH,
                &format!("items/{item_id}"),
                &[],
                Some(&Value::Object(patch)),
            )
            .await?;
        }

        let suppressed = self.attach_tags("items", item_id, tags).await;
        let resource = self.get_item(item_id).await?;

        Ok(CreateOutcome {
            id: Some(item_id),
            resource: Some(resource),
            suppressed,
        })
    }

    /// PATCH the given fields. The caller rejects an empty patch and formats
    /// the confirmation from the field names.
    pub async fn update_item(&self, item_id: i64, patch: Map<String, Value>) -> Result<()> {
        self.send(
            Method::PATCH,
            &format!("items/{item_id}"),
            &[],
            Some(&Value::Object(patch)),
        )
        .await?;
        Ok(())
    }

    pub async fn delete_item(&self, item_id: i64) -> Result<()> {
        self.send(Method::DELETE, &format!("items/{item_id}"), &[], None)
            .await?;
        Ok(())
    }

    pub async fn list_items_types(&self, team_id: i64) -> Result<Value> {
        self.request_json(
            Method::GET,
            &format!("teams/{team_id}/items_types"),
            &[],
            None,
        )
        .await
    }

    pub async fn add_item_tag(&self, item_id: i64, tag: &str) -> Result<()> {
        self.send(
            Method::POST,
            &format!("items/{item_id}/tags"),
            &[],
            Some(&json!({ "tag": tag })),
        )
        .await?;
        Ok(())
    }

    pub async fn remove_item_tag(&self, item_id: i64, tag_id: i64) -> Result<()> {
        self.send(
            Method::DELETE,
            &format!("items/{item_id}/tags/{tag_id}"),
            &[],
            None,
        )
        .await?;
        Ok(())
    }

    pub async fn link_to_item(&self, item_id: i64, link_id: i64, link_type: &str) -> Result<()> {
        self.send(
            Method::POST,
            &format!("items/{item_id}/{link_type}_links/{link_id}"),
            &[],
            None,
        )
        .await?;
        Ok(())
    }

    pub async fn upload_item_attachment(
        &self,
        item_id: i64,
        file_path: &str,
        comment: Option<&str>,
    ) -> Result<String> {
        let form = attachment_form(file_path, comment).await?;
        self.post_multipart(&format!("items/{item_id}/uploads"), form.form)
            .await?;
        Ok(form.file_name)
    }
}
