//! Reminder-batch behavior against a stubbed document store: delivery and
//! bookkeeping have to survive one user's store trouble.

use std::sync::atomic::{AtomicUsize, Ordering};

use axum::extract::RawQuery;
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde_json::{Value, json};

use aula::config::Config;
use aula::notify::{self, PushMessage, PushSender, PushSubscription, SendError};
use aula::store::DocumentStore;

struct CountingSender {
    sent: AtomicUsize,
}

#[async_trait::async_trait]
impl PushSender for CountingSender {
    async fn send(
        &self,
        _subscription: &PushSubscription,
        _message: &PushMessage,
    ) -> Result<(), SendError> {
        self.sent.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

async fn scheduled_list() -> Json<Value> {
    Json(json!({
        "documents": [
            { "$id": "sn_a1", "userId": "edu_ana", "taskId": "t1", "title": "Mates", "notified": false },
            { "$id": "sn_b1", "userId": "edu_bea", "taskId": "t2", "title": "Lengua", "notified": false }
        ]
    }))
}

async fn subscriptions_list(RawQuery(query): RawQuery) -> Result<Json<Value>, StatusCode> {
    // The store misbehaves for one user only.
    if query.unwrap_or_default().contains("edu_ana") {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    Ok(Json(json!({
        "documents": [
            { "$id": "sub_b", "endpoint": "https://push.example.com/b", "p256dh": "k", "auth": "a" }
        ]
    })))
}

async fn mark_notified() -> Json<Value> {
    Json(json!({}))
}

async fn stub_store() -> DocumentStore {
    let router = Router::new()
        .route(
            "/databases/app/collections/scheduled_notifications/documents",
            get(scheduled_list),
        )
        .route(
            "/databases/app/collections/scheduled_notifications/documents/{id}",
            patch(mark_notified),
        )
        .route(
            "/databases/app/collections/push_subscriptions/documents",
            get(subscriptions_list),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let config: Config = serde_json::from_value(json!({
        "educamos_base_url": "https://colegio.example.com",
        "appwrite_endpoint": format!("http://{addr}"),
        "appwrite_project_id": "proj",
        "appwrite_api_key": "key",
    }))
    .unwrap();
    DocumentStore::from_config(&config)
        .expect("store client should build")
        .expect("store should be configured")
}

#[tokio::test]
async fn one_users_store_failure_does_not_abort_the_batch() {
    let store = stub_store().await;
    let sender = CountingSender {
        sent: AtomicUsize::new(0),
    };

    let report = notify::run_batch(&store, &sender).await.unwrap();

    // Both users were due; the one with the broken subscription listing is
    // skipped, the other still gets her push and her task marked.
    assert_eq!(report.users, 2);
    assert_eq!(report.sent, 1);
    assert_eq!(sender.sent.load(Ordering::SeqCst), 1);
    assert_eq!(report.tasks_marked, 1);
    assert_eq!(report.failed_sends, 0);
}
