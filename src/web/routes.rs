//! Web API router construction.

use axum::{
    Router,
    routing::{get, post},
};
use std::time::Duration;
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer};

use crate::state::AppState;
use crate::web::middleware::request_id::RequestIdLayer;
use crate::web::{
    announcements, auth, circulars, context, cron, grades, home, incidents, push, schedule,
    status, tasks,
};

/// Creates the web server router
pub fn create_router(app_state: AppState) -> Router {
    let api_router = Router::new()
        .route("/health", get(status::health))
        .route("/auth/login", post(auth::login))
        .route("/classes", get(grades::get_classes))
        .route("/evaluations", get(grades::get_periods))
        .route("/grades", get(grades::get_grades))
        .route("/subjects/{subject_id}/grades", get(grades::get_subject))
        .route("/schedule/week", post(schedule::get_week))
        .route("/schedule/session-tasks", post(schedule::get_session_tasks))
        .route("/tasks", post(tasks::list_tasks))
        .route("/tasks/detail", post(tasks::get_task))
        .route("/tasks/status", post(tasks::set_task_status))
        .route("/incidents", post(incidents::list_incidents))
        .route("/circulars", post(circulars::list_circulars))
        .route("/circulars/download", get(circulars::download_circular))
        .route("/announcements", get(announcements::list_announcements))
        .route("/announcements/{id}", post(announcements::get_announcement))
        .route(
            "/announcements/{id}/attachment",
            get(announcements::download_attachment),
        )
        .route("/counters", get(home::get_counters))
        .route("/unread-marks", get(home::get_unread_marks))
        .route("/birthdays", get(home::get_birthdays))
        .route("/context", get(context::get_context))
        .route("/user-info", get(context::get_user_info))
        .route("/course", get(context::get_course))
        .route("/push/subscribe", post(push::subscribe))
        .route("/push/unsubscribe", post(push::unsubscribe))
        .route("/push/sync-tasks", post(push::sync_tasks))
        .route("/cron/notifications", get(cron::run_notifications))
        .with_state(app_state);

    let router = Router::new().nest("/api", api_router);

    router.layer((
        // Outermost: per-request ID span + severity-proportional response logging.
        RequestIdLayer,
        CompressionLayer::new()
            .zstd(true)
            .br(true)
            .gzip(true)
            .quality(tower_http::CompressionLevel::Fastest),
        // Login drives a whole headless browser flow; give it headroom.
        TimeoutLayer::new(Duration::from_secs(120)),
    ))
}
