//! Web Push delivery and the scheduled-notification batch.
//!
//! Subscriptions and scheduled task reminders live in the document store;
//! this module owns the VAPID-signed delivery and the daily batch that turns
//! due reminders into pushes. Delivery failures are isolated per
//! subscription: one dead endpoint never blocks the rest of a user's
//! devices, and endpoints the push service reports gone are pruned.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{info, warn};
use web_push::{
    ContentEncoding, HyperWebPushClient, SubscriptionInfo, URL_SAFE_NO_PAD,
    VapidSignatureBuilder, WebPushClient, WebPushError, WebPushMessageBuilder,
};

use crate::config::Config;
use crate::parse::dates::today_iso;
use crate::store::{DocumentStore, Query};

/// One browser push subscription, as stored.
#[derive(Debug, Clone)]
pub struct PushSubscription {
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
}

/// The notification payload shown by the service worker.
#[derive(Debug, Clone, Serialize)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    pub url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    /// The push service no longer knows this endpoint; the subscription
    /// should be deleted.
    #[error("push endpoint is gone")]
    Gone,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[async_trait]
pub trait PushSender: Send + Sync {
    async fn send(&self, subscription: &PushSubscription, message: &PushMessage)
    -> Result<(), SendError>;
}

/// VAPID-signed sender backed by the hyper client.
pub struct VapidPushSender {
    client: HyperWebPushClient,
    subject: String,
    private_key: String,
}

impl VapidPushSender {
    /// Build a sender when both VAPID keys are configured; `None` otherwise.
    pub fn from_config(config: &Config) -> Option<Self> {
        let private_key = config.vapid_private_key.clone()?;
        config.vapid_public_key.as_ref()?;
        Some(Self {
            client: HyperWebPushClient::new(),
            subject: config.vapid_subject.clone(),
            private_key,
        })
    }
}

#[async_trait]
impl PushSender for VapidPushSender {
    async fn send(
        &self,
        subscription: &PushSubscription,
        message: &PushMessage,
    ) -> Result<(), SendError> {
        let info = SubscriptionInfo::new(
            subscription.endpoint.clone(),
            subscription.p256dh.clone(),
            subscription.auth.clone(),
        );

        let mut signature =
            VapidSignatureBuilder::from_base64(&self.private_key, URL_SAFE_NO_PAD, &info)
                .map_err(|e| anyhow!(e).context("Invalid VAPID private key"))?;
        signature.add_claim("sub", self.subject.as_str());
        let signature = signature
            .build()
            .map_err(|e| anyhow!(e).context("Failed to build VAPID signature"))?;

        let payload = serde_json::to_vec(message).context("Failed to encode push payload")?;
        let mut builder = WebPushMessageBuilder::new(&info);
        builder.set_vapid_signature(signature);
        builder.set_payload(ContentEncoding::Aes128Gcm, &payload);
        let push = builder
            .build()
            .map_err(|e| anyhow!(e).context("Failed to build push message"))?;

        match self.client.send(push).await {
            Ok(()) => Ok(()),
            Err(WebPushError::EndpointNotFound | WebPushError::EndpointNotValid) => {
                Err(SendError::Gone)
            }
            Err(e) => Err(SendError::Other(
                anyhow!(e).context("Push delivery failed"),
            )),
        }
    }
}

/// What one batch run did, reported back to the cron caller.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub users: usize,
    pub sent: usize,
    pub removed_subscriptions: usize,
    pub failed_sends: usize,
    pub tasks_marked: usize,
}

/// Compose the reminder for one user's due tasks.
pub fn reminder_message(task_titles: &[String]) -> PushMessage {
    let count = task_titles.len();
    let title = if count == 1 {
        "📅 Hoy tienes 1 tarea".to_string()
    } else {
        format!("📅 Hoy tienes {count} tareas")
    };

    let mut body = task_titles.iter().take(3).cloned().collect::<Vec<_>>().join(", ");
    if count > 3 {
        body.push_str(&format!(" y {} más", count - 3));
    }

    PushMessage {
        title,
        body,
        url: "/tareas".to_string(),
    }
}

fn doc_str(doc: &Value, field: &str) -> String {
    doc.get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn subscription_from_doc(doc: &Value) -> Option<PushSubscription> {
    let endpoint = doc_str(doc, "endpoint");
    if endpoint.is_empty() {
        return None;
    }
    Some(PushSubscription {
        endpoint,
        p256dh: doc_str(doc, "p256dh"),
        auth: doc_str(doc, "auth"),
    })
}

/// Run the daily reminder batch: find scheduled notifications due today that
/// have not fired, push one summary per user per device, prune dead
/// subscriptions, and mark the tasks notified.
pub async fn run_batch(store: &DocumentStore, sender: &dyn PushSender) -> Result<BatchReport> {
    let today = today_iso();
    let due = store
        .list_documents(
            &store.scheduled_collection,
            &[
                Query::equal("notifyDate", &today),
                Query::equal_bool("notified", false),
                Query::limit(500),
            ],
        )
        .await
        .context("Failed to list due notifications")?;

    let mut by_user: HashMap<String, Vec<&Value>> = HashMap::new();
    for doc in &due {
        let user_id = doc_str(doc, "userId");
        if !user_id.is_empty() {
            by_user.entry(user_id).or_default().push(doc);
        }
    }

    let mut report = BatchReport {
        users: by_user.len(),
        ..Default::default()
    };

    for (user_id, tasks) in &by_user {
        let titles: Vec<String> = tasks.iter().map(|t| doc_str(t, "title")).collect();
        let message = reminder_message(&titles);

        // One user's store trouble must not starve everyone after them.
        let subscriptions = match store
            .list_documents(
                &store.push_collection,
                &[Query::equal("userId", user_id), Query::limit(100)],
            )
            .await
        {
            Ok(docs) => docs,
            Err(e) => {
                warn!(user = %user_id, error = %e, "Failed to list subscriptions, skipping user");
                continue;
            }
        };

        for doc in &subscriptions {
            let Some(subscription) = subscription_from_doc(doc) else {
                continue;
            };
            match sender.send(&subscription, &message).await {
                Ok(()) => report.sent += 1,
                Err(SendError::Gone) => {
                    let doc_id = doc_str(doc, "$id");
                    if let Err(e) = store.delete_document(&store.push_collection, &doc_id).await {
                        warn!(user = %user_id, error = %e, "Failed to prune dead subscription");
                    } else {
                        report.removed_subscriptions += 1;
                    }
                }
                Err(SendError::Other(e)) => {
                    report.failed_sends += 1;
                    warn!(user = %user_id, error = %e, "Push delivery failed");
                }
            }
        }

        for task in tasks {
            let doc_id = doc_str(task, "$id");
            match store
                .update_document(
                    &store.scheduled_collection,
                    &doc_id,
                    serde_json::json!({ "notified": true }),
                )
                .await
            {
                Ok(()) => report.tasks_marked += 1,
                Err(e) => warn!(doc = %doc_id, error = %e, "Failed to mark task notified"),
            }
        }
    }

    info!(
        users = report.users,
        sent = report.sent,
        removed = report.removed_subscriptions,
        "Reminder batch finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_task_reminder_is_singular() {
        let message = reminder_message(&["Ejercicios de mates".to_string()]);
        assert_eq!(message.title, "📅 Hoy tienes 1 tarea");
        assert_eq!(message.body, "Ejercicios de mates");
    }

    #[test]
    fn long_lists_are_truncated_with_a_remainder() {
        let titles: Vec<String> = (1..=5).map(|i| format!("Tarea {i}")).collect();
        let message = reminder_message(&titles);
        assert_eq!(message.title, "📅 Hoy tienes 5 tareas");
        assert_eq!(message.body, "Tarea 1, Tarea 2, Tarea 3 y 2 más");
    }
}
