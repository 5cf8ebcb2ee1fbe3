//! Application configuration, extracted from the environment with figment.

use serde::Deserialize;

fn default_port() -> u16 {
    3210
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_db_id() -> String {
    "app".to_string()
}

fn default_push_collection() -> String {
    "push_subscriptions".to_string()
}

fn default_scheduled_collection() -> String {
    "scheduled_notifications".to_string()
}

fn default_vapid_subject() -> String {
    "mailto:admin@slackers.tech".to_string()
}

/// Environment-derived configuration.
///
/// The Educamos base URL is the only hard requirement: every scraping
/// endpoint defaults to a path under it, overridable individually for
/// schools on non-standard deployments. The document store and VAPID keys
/// are optional; routes that need them answer 500 when unset.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Root of the school's Educamos deployment, e.g. `https://colegio.educamos.com`.
    pub educamos_base_url: String,

    // Per-resource endpoint overrides. Unset means "derive from the base URL".
    pub get_tasks_url: Option<String>,
    pub change_task_status_url: Option<String>,
    pub get_task_data_url: Option<String>,
    pub get_context_url: Option<String>,
    pub get_user_info_url: Option<String>,
    pub get_course_url: Option<String>,
    pub get_counters_url: Option<String>,
    pub get_unread_marks_url: Option<String>,
    pub announcements_url: Option<String>,
    pub get_announcement_url: Option<String>,
    pub download_announcement_file_url: Option<String>,
    pub download_week_calendar_url: Option<String>,
    pub get_timetable_tasks_url: Option<String>,
    pub birthdays_url: Option<String>,

    // Document store (Appwrite-compatible). All three must be set to enable it.
    pub appwrite_endpoint: Option<String>,
    pub appwrite_project_id: Option<String>,
    pub appwrite_api_key: Option<String>,
    #[serde(default = "default_db_id")]
    pub appwrite_db_id: String,
    #[serde(default = "default_push_collection")]
    pub appwrite_push_collection_id: String,
    #[serde(default = "default_scheduled_collection")]
    pub appwrite_scheduled_collection_id: String,

    // Web Push (VAPID). Both keys must be set to enable the cron sender.
    #[serde(default = "default_vapid_subject")]
    pub vapid_subject: String,
    pub vapid_public_key: Option<String>,
    pub vapid_private_key: Option<String>,

    /// Shared secret for the cron trigger endpoint. Unset disables the check.
    pub cron_secret: Option<String>,
}
