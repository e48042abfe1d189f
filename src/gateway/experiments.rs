use super::{CreateOutcome, ElabClient};
use crate::error::{ElabError, Result};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde_json::{json, Map, Value};
use std::path::Path;
use tracing::warn;

/// Fields for a new experiment. `template` and `category` are distinct
/// concepts in eLabFTW: the template seeds the body structure, the category
/// classifies the entry.
#[derive(Debug, Default)]
pub struct NewExperiment {
    pub title: String,
    pub body: String,
    pub template: Option<i64>,
    pub category: Option<i64>,
    pub tags: Vec<String>,
}

impl ElabClient {
    pub async fn list_experiments(
        &self,
        limit: i64,
        offset: i64,
        search: Option<&str>,
        owner: Option<&str>,
    ) -> Result<Value> {
        let mut query = vec![("limit", limit.to_string()), ("offset", offset.to_string())];
        if let Some(search) = search {
            query.push(("q", search.to_string()));
        }
        if let Some(owner) = owner {
            query.push(("owner", owner.to_string()));
        }

        self.request_json(Method::GET, "experiments", &query, None)
            .await
    }

    pub async fn get_experiment(&self, experiment_id: i64) -> Result<Value> {
        self.request_json(
            Method::GET,
            &format!("experiments/{experiment_id}"),
            &[],
            None,
        )
        .await
    }

    /// Create an experiment. The POST only returns the new id via the
    /// `Location` header, so this commits in two steps: POST, then GET on the
    /// parsed id. Tag attachments in between are best-effort.
    pub async fn create_experiment(&self, new: NewExperiment) -> Result<CreateOutcome> {
        let mut body = Map::new();
        body.insert("title".to_string(), Value::String(new.title));
        body.insert("body".to_string(), Value::String(new.body));
        if let Some(template) = new.template {
            body.insert("template".to_string(), json!(template));
        }
        if let Some(category) = new.category {
            body.insert("category".to_string(), json!(category));
        }

        let response = self
            .send(Method::POST, "experiments", &[], Some(&Value::Object(body)))
            .await?;

        let Some(experiment_id) = Self::created_id(&response) else {
            // The remote mutation already happened; report degraded success.
            warn!("experiment created but response carried no Location header");
            return Ok(CreateOutcome::default());
        };

        let suppressed = self
            .attach_tags("experiments", experiment_id, &new.tags)
            .await;
        let resource = self.get_experiment(experiment_id).await?;

        Ok(CreateOutcome {
            id: Some(experiment_id),
            resource: Some(resource),
            suppressed,
        })
    }

    /// PATCH the given fields, then GET to return the full updated entry.
    /// The caller is responsible for rejecting an empty patch.
    pub async fn update_experiment(
        &self,
        experiment_id: i64,
        patch: Map<String, Value>,
    ) -> Result<Value> {
        self.send(
            Method::PATCH,
            &format!("experiments/{experiment_id}"),
            &[],
            Some(&Value::Object(patch)),
        )
        .await?;

        self.get_experiment(experiment_id).await
    }

    pub async fn delete_experiment(&self, experiment_id: i64) -> Result<()> {
        self.send(
            Method::DELETE,
            &format!("experiments/{experiment_id}"),
            &[],
            None,
        )
        .await?;
        Ok(())
    }

    pub async fn add_experiment_tag(&self, experiment_id: i64, tag: &str) -> Result<()> {
        self.send(
            Method::POST,
            &format!("experiments/{experiment_id}/tags"),
            &[],
            Some(&json!({ "tag": tag })),
        )
        .await?;
        Ok(())
    }

    pub async fn remove_experiment_tag(&self, experiment_id: i64, tag_id: i64) -> Result<()> {
        self.send(
            Method::DELETE,
            &format!("experiments/{experiment_id}/tags/{tag_id}"),
            &[],
            None,
        )
        .await?;
        Ok(())
    }

    /// Link another experiment or a database item to an experiment.
    /// `link_type` must be `experiments` or `items` (validated upstream).
    pub async fn link_to_experiment(
        &self,
        experiment_id: i64,
        link_id: i64,
        link_type: &str,
    ) -> Result<()> {
        self.send(
            Method::POST,
            &format!("experiments/{experiment_id}/{link_type}_links/{link_id}"),
            &[],
            None,
        )
        .await?;
        Ok(())
    }

    /// Upload a local file as an attachment. Returns the uploaded file name.
    pub async fn upload_experiment_attachment(
        &self,
        experiment_id: i64,
        file_path: &str,
        comment: Option<&str>,
    ) -> Result<String> {
        let form = attachment_form(file_path, comment).await?;
        self.post_multipart(&format!("experiments/{experiment_id}/uploads"), form.form)
            .await?;
        Ok(form.file_name)
    }

    pub async fn list_experiment_templates(&self, limit: i64, offset: i64) -> Result<Value> {
        let query = vec![("limit", limit.to_string()), ("offset", offset.to_string())];
        self.request_json(Method::GET, "experiments_templates", &query, None)
            .await
    }

    pub async fn list_experiment_categories(&self, team_id: i64) -> Result<Value> {
        self.request_json(
            Method::GET,
            &format!("teams/{team_id}/experiments_categories"),
            &[],
            None,
        )
        .await
    }

    /// Attach each tag with its own POST. Failures are recorded and
    /// swallowed: a duplicate-tag conflict must not fail an otherwise
    /// successful creation. This is an accepted inconsistency.
    pub(crate) async fn attach_tags(
        &self,
        resource: &str,
        id: i64,
        tags: &[String],
    ) -> Vec<String> {
        let mut suppressed = Vec::new();
        for tag in tags {
            if let Err(e) = self
                .send(
                    Method::POST,
                    &format!("{resource}/{id}/tags"),
                    &[],
                    Some(&json!({ "tag": tag })),
                )
                .await
            {
                warn!(tag, error = %e, "tag attachment failed, continuing");
                suppressed.push(format!("tag '{tag}': {e}"));
            }
        }
        suppressed
    }
}

pub(crate) struct AttachmentForm {
    pub(crate) form: Form,
    pub(crate) file_name: String,
}

pub(crate) async fn attachment_form(
    file_path: &str,
    comment: Option<&str>,
) -> Result<AttachmentForm> {
    let data = tokio::fs::read(file_path)
        .await
        .map_err(|_| ElabError::InvalidArgument(format!("file not found: {file_path}")))?;

    let file_name = Path::new(file_path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());

    let mut form = Form::new().part("file", Part::bytes(data).file_name(file_name.clone()));
    if let Some(comment) = comment {
        form = form.text("comment", comment.to_string());
    }

    Ok(AttachmentForm { form, file_name })
}
