//! Appwrite-compatible document store client.
//!
//! Used for two things only: provisioning a derived user record at login and
//! persisting push state (subscriptions plus scheduled task notifications).
//! The whole integration is optional; when the endpoint or keys are absent
//! the application runs scrape-only and the push routes report themselves
//! unconfigured.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde_json::{Value, json};
use std::hash::{DefaultHasher, Hash, Hasher};
use std::time::Duration;

use crate::config::Config;

/// One server-side filter in the document-store query syntax.
#[derive(Debug, Clone)]
pub struct Query(String);

impl Query {
    pub fn equal(attribute: &str, value: &str) -> Self {
        Self(format!(
            r#"equal("{attribute}", [{}])"#,
            serde_json::to_string(value).unwrap_or_default()
        ))
    }

    pub fn equal_bool(attribute: &str, value: bool) -> Self {
        Self(format!(r#"equal("{attribute}", [{value}])"#))
    }

    pub fn limit(n: u32) -> Self {
        Self(format!("limit({n})"))
    }
}

#[derive(Debug, Deserialize)]
struct DocumentList {
    documents: Vec<Value>,
}

/// Derive a store-safe document id from free-form material (push endpoints,
/// composite keys). Ids must be short and restricted to safe characters, so
/// the material is hashed rather than embedded.
pub fn stable_doc_id(prefix: &str, material: &str) -> String {
    let mut hasher = DefaultHasher::new();
    material.hash(&mut hasher);
    format!("{prefix}_{:016x}", hasher.finish())
}

pub struct DocumentStore {
    http: reqwest::Client,
    endpoint: String,
    project_id: String,
    api_key: String,
    db_id: String,
    pub push_collection: String,
    pub scheduled_collection: String,
}

impl DocumentStore {
    /// Build a store client when the configuration carries all three of
    /// endpoint, project, and key; `None` otherwise.
    pub fn from_config(config: &Config) -> Result<Option<Self>> {
        let (Some(endpoint), Some(project_id), Some(api_key)) = (
            config.appwrite_endpoint.clone(),
            config.appwrite_project_id.clone(),
            config.appwrite_api_key.clone(),
        ) else {
            return Ok(None);
        };

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .context("Failed to build document store HTTP client")?;

        Ok(Some(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            project_id,
            api_key,
            db_id: config.appwrite_db_id.clone(),
            push_collection: config.appwrite_push_collection_id.clone(),
            scheduled_collection: config.appwrite_scheduled_collection_id.clone(),
        }))
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}{path}", self.endpoint))
            .header("x-appwrite-project", &self.project_id)
            .header("x-appwrite-key", &self.api_key)
            .header("content-type", "application/json")
    }

    async fn check(response: reqwest::Response, what: &str) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        bail!("{what} failed with HTTP {status}: {body}");
    }

    // ---- users ----

    /// Ensure a user record exists with the given password, creating or
    /// rotating as needed. Login treats failures here as non-fatal.
    pub async fn upsert_user(&self, user_id: &str, email: &str, password: &str) -> Result<()> {
        let path = format!("/users/{user_id}");
        let existing = self
            .request(reqwest::Method::GET, &path)
            .send()
            .await
            .context("User lookup request failed")?;

        if existing.status() == reqwest::StatusCode::NOT_FOUND {
            let body = json!({
                "userId": user_id,
                "email": email,
                "password": password,
                "name": email.split('@').next().unwrap_or(email),
            });
            let response = self
                .request(reqwest::Method::POST, "/users")
                .json(&body)
                .send()
                .await
                .context("User create request failed")?;
            Self::check(response, "User create").await?;
            return Ok(());
        }
        Self::check(existing, "User lookup").await?;

        // Keep the stored password in step with the credential that just
        // passed SSO, so companion clients can authenticate with it.
        let response = self
            .request(reqwest::Method::PATCH, &format!("{path}/password"))
            .json(&json!({ "password": password }))
            .send()
            .await
            .context("User password update request failed")?;
        Self::check(response, "User password update").await?;
        Ok(())
    }

    // ---- documents ----

    fn documents_path(&self, collection: &str) -> String {
        format!("/databases/{}/collections/{collection}/documents", self.db_id)
    }

    pub async fn list_documents(
        &self,
        collection: &str,
        queries: &[Query],
    ) -> Result<Vec<Value>> {
        let mut request = self.request(reqwest::Method::GET, &self.documents_path(collection));
        for query in queries {
            request = request.query(&[("queries[]", &query.0)]);
        }

        let response = request.send().await.context("Document list request failed")?;
        let response = Self::check(response, "Document list").await?;
        let list: DocumentList = response
            .json()
            .await
            .context("Document list response was not valid JSON")?;
        Ok(list.documents)
    }

    pub async fn create_document(
        &self,
        collection: &str,
        document_id: &str,
        data: Value,
    ) -> Result<()> {
        let body = json!({ "documentId": document_id, "data": data });
        let response = self
            .request(reqwest::Method::POST, &self.documents_path(collection))
            .json(&body)
            .send()
            .await
            .context("Document create request failed")?;
        Self::check(response, "Document create").await?;
        Ok(())
    }

    pub async fn update_document(
        &self,
        collection: &str,
        document_id: &str,
        data: Value,
    ) -> Result<()> {
        let path = format!("{}/{document_id}", self.documents_path(collection));
        let response = self
            .request(reqwest::Method::PATCH, &path)
            .json(&json!({ "data": data }))
            .send()
            .await
            .context("Document update request failed")?;
        Self::check(response, "Document update").await?;
        Ok(())
    }

    pub async fn delete_document(&self, collection: &str, document_id: &str) -> Result<()> {
        let path = format!("{}/{document_id}", self.documents_path(collection));
        let response = self
            .request(reqwest::Method::DELETE, &path)
            .send()
            .await
            .context("Document delete request failed")?;
        Self::check(response, "Document delete").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queries_serialize_to_the_store_syntax() {
        assert_eq!(
            Query::equal("userId", "edu_maria").0,
            r#"equal("userId", ["edu_maria"])"#
        );
        assert_eq!(Query::limit(500).0, "limit(500)");
    }

    #[test]
    fn doc_ids_are_stable_and_bounded() {
        let endpoint = "https://fcm.googleapis.com/fcm/send/averyveryverylongtoken";
        let a = stable_doc_id("sub", endpoint);
        let b = stable_doc_id("sub", endpoint);
        assert_eq!(a, b);
        assert!(a.len() <= 36);
        assert!(a.starts_with("sub_"));
        assert_ne!(a, stable_doc_id("sub", "otro"));
    }
}
