//! Shared application state.

use std::sync::Arc;

use crate::config::Config;
use crate::educamos::UpstreamApi;
use crate::notify::VapidPushSender;
use crate::store::DocumentStore;

/// Everything the request handlers share. Cheap to clone; all heavy members
/// sit behind `Arc`s.
#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<UpstreamApi>,
    /// `None` when the document store is not configured; push and
    /// provisioning routes degrade accordingly.
    pub store: Option<Arc<DocumentStore>>,
    /// `None` when VAPID keys are not configured.
    pub push: Option<Arc<VapidPushSender>>,
    pub base_url: String,
    pub cron_secret: Option<String>,
}

impl AppState {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let upstream = Arc::new(UpstreamApi::new(config)?);
        let store = DocumentStore::from_config(config)?.map(Arc::new);
        let push = VapidPushSender::from_config(config).map(Arc::new);

        Ok(Self {
            upstream,
            store,
            push,
            base_url: config.educamos_base_url.clone(),
            cron_secret: config.cron_secret.clone(),
        })
    }
}
