//! Handlers for push subscription management and task-reminder sync.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use crate::state::AppState;
use crate::store::{DocumentStore, Query, stable_doc_id};
use crate::web::error::ApiError;

fn require_store(state: &AppState) -> Result<&Arc<DocumentStore>, ApiError> {
    state
        .store
        .as_ref()
        .ok_or(ApiError::NotConfigured("document store"))
}

#[derive(Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

#[derive(Deserialize)]
pub struct BrowserSubscription {
    pub endpoint: String,
    pub keys: SubscriptionKeys,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeRequest {
    pub user_id: String,
    pub subscription: BrowserSubscription,
}

#[derive(Serialize)]
pub struct AckResponse {
    pub success: bool,
}

/// `POST /api/push/subscribe`
///
/// Subscriptions are keyed by endpoint, so re-subscribing from the same
/// browser updates the stored record instead of accumulating duplicates.
pub async fn subscribe(
    State(state): State<AppState>,
    Json(request): Json<SubscribeRequest>,
) -> Result<Json<AckResponse>, ApiError> {
    let store = require_store(&state)?;
    if request.subscription.endpoint.is_empty() {
        return Err(ApiError::BadRequest("subscription endpoint is required".to_string()));
    }

    let doc_id = stable_doc_id("sub", &request.subscription.endpoint);
    let data = json!({
        "userId": request.user_id,
        "endpoint": request.subscription.endpoint,
        "p256dh": request.subscription.keys.p256dh,
        "auth": request.subscription.keys.auth,
    });

    let existing = store
        .list_documents(
            &store.push_collection,
            &[Query::equal("endpoint", &request.subscription.endpoint)],
        )
        .await?;

    if existing.is_empty() {
        store
            .create_document(&store.push_collection, &doc_id, data)
            .await?;
    } else {
        store
            .update_document(&store.push_collection, &doc_id, data)
            .await?;
    }
    Ok(Json(AckResponse { success: true }))
}

#[derive(Deserialize)]
pub struct UnsubscribeRequest {
    pub endpoint: String,
}

/// `POST /api/push/unsubscribe`
pub async fn unsubscribe(
    State(state): State<AppState>,
    Json(request): Json<UnsubscribeRequest>,
) -> Result<Json<AckResponse>, ApiError> {
    let store = require_store(&state)?;
    let doc_id = stable_doc_id("sub", &request.endpoint);
    // Unsubscribing an unknown endpoint is not an error worth surfacing.
    if let Err(e) = store.delete_document(&store.push_collection, &doc_id).await {
        debug!(error = %e, "Unsubscribe delete failed");
    }
    Ok(Json(AckResponse { success: true }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncTask {
    pub id: String,
    pub title: String,
    /// ISO `YYYY-MM-DD` due date, used as the notify date.
    pub due_date: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncTasksRequest {
    pub user_id: String,
    pub tasks: Vec<SyncTask>,
}

#[derive(Serialize)]
pub struct SyncTasksResponse {
    pub added: usize,
    pub removed: usize,
}

/// `POST /api/push/sync-tasks`
///
/// Reconciles the stored reminder schedule with the client's current task
/// list: new tasks are scheduled, tasks that no longer exist are dropped,
/// and reminders that already fired are left untouched.
pub async fn sync_tasks(
    State(state): State<AppState>,
    Json(request): Json<SyncTasksRequest>,
) -> Result<Json<SyncTasksResponse>, ApiError> {
    let store = require_store(&state)?;

    let stored = store
        .list_documents(
            &store.scheduled_collection,
            &[Query::equal("userId", &request.user_id), Query::limit(500)],
        )
        .await?;

    let stored_task_ids: HashSet<String> = stored
        .iter()
        .filter_map(|doc| doc.get("taskId").and_then(|v| v.as_str()))
        .map(str::to_string)
        .collect();
    let incoming_ids: HashSet<&str> = request.tasks.iter().map(|t| t.id.as_str()).collect();

    let mut added = 0;
    for task in &request.tasks {
        if stored_task_ids.contains(&task.id) {
            continue;
        }
        let doc_id = stable_doc_id("sn", &format!("{}:{}", request.user_id, task.id));
        store
            .create_document(
                &store.scheduled_collection,
                &doc_id,
                json!({
                    "userId": request.user_id,
                    "taskId": task.id,
                    "title": task.title,
                    "notifyDate": task.due_date,
                    "notified": false,
                }),
            )
            .await?;
        added += 1;
    }

    let mut removed = 0;
    for doc in &stored {
        let task_id = doc.get("taskId").and_then(|v| v.as_str()).unwrap_or_default();
        let notified = doc.get("notified").and_then(|v| v.as_bool()).unwrap_or(false);
        if notified || incoming_ids.contains(task_id) {
            continue;
        }
        let doc_id = doc.get("$id").and_then(|v| v.as_str()).unwrap_or_default();
        store
            .delete_document(&store.scheduled_collection, doc_id)
            .await?;
        removed += 1;
    }

    debug!(user = %request.user_id, added, removed, "Reminder schedule synced");
    Ok(Json(SyncTasksResponse { added, removed }))
}
