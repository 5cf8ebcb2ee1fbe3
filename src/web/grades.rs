//! Handlers for classes, evaluation periods, and grades.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};

use crate::educamos::EvaluationQuery;
use crate::models::{EvaluationPeriod, StudentClass, SubjectDetail, SubjectEvaluation};
use crate::parse::grades;
use crate::state::AppState;
use crate::web::auth::Session;
use crate::web::error::ApiError;

/// Default education-stage id for family accounts.
const DEFAULT_STAGE: &str = "28";
/// Grade-entry type requested when listing evaluation periods.
const DEFAULT_GRADE_ENTRY_TYPE: &str = "6";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassesQuery {
    pub student_id: String,
}

/// `GET /api/classes`
pub async fn get_classes(
    State(state): State<AppState>,
    Session(cookie): Session,
    Query(query): Query<ClassesQuery>,
) -> Result<Json<Vec<StudentClass>>, ApiError> {
    let raw = state.upstream.classes(&cookie, &query.student_id).await?;
    let classes = raw
        .into_iter()
        .map(|c| StudentClass {
            id: c.id,
            name: c.nombre,
            short_name: c.reducido,
            education_level_school_id: c.nivel_educativo_colegio_id,
            education_stage_id: c.nivel_educativo_etapa_id,
        })
        .collect();
    Ok(Json(classes))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodsQuery {
    pub class_id: String,
    pub school_level_id: String,
    pub stage_id: Option<String>,
}

/// `GET /api/evaluations`
pub async fn get_periods(
    State(state): State<AppState>,
    Session(cookie): Session,
    Query(query): Query<PeriodsQuery>,
) -> Result<Json<Vec<EvaluationPeriod>>, ApiError> {
    let raw = state
        .upstream
        .evaluation_periods(
            &cookie,
            &query.class_id,
            &query.school_level_id,
            query.stage_id.as_deref().unwrap_or(DEFAULT_STAGE),
            DEFAULT_GRADE_ENTRY_TYPE,
        )
        .await?;
    Ok(Json(grades::normalize_periods(raw)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradesQuery {
    pub student_id: String,
    pub class_id: String,
    pub school_level_id: String,
    pub stage_id: Option<String>,
    /// When absent, the active evaluation period is resolved and used.
    pub evaluation_id: Option<String>,
    pub group_id: Option<String>,
    pub type_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradesResponse {
    pub evaluation_id: String,
    pub subjects: Vec<SubjectEvaluation>,
}

/// `GET /api/grades`
///
/// Grades for one evaluation period, defaulting to the active one when the
/// caller does not pin a period.
pub async fn get_grades(
    State(state): State<AppState>,
    Session(cookie): Session,
    Query(query): Query<GradesQuery>,
) -> Result<Json<GradesResponse>, ApiError> {
    let evaluation = resolve_evaluation(&state, &cookie, &query).await?;
    let response = state.upstream.evaluation(&cookie, &evaluation).await?;

    Ok(Json(GradesResponse {
        evaluation_id: evaluation.evaluation_id,
        subjects: grades::subject_evaluations(&response),
    }))
}

/// `GET /api/subjects/{subject_id}/grades`
pub async fn get_subject(
    State(state): State<AppState>,
    Session(cookie): Session,
    Path(subject_id): Path<String>,
    Query(query): Query<GradesQuery>,
) -> Result<Json<SubjectDetail>, ApiError> {
    let evaluation = resolve_evaluation(&state, &cookie, &query).await?;
    let response = state.upstream.evaluation(&cookie, &evaluation).await?;

    grades::subject_detail(&response, &subject_id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("no subject with id {subject_id}")))
}

/// Pin down which evaluation period to query, resolving the active one when
/// the caller leaves it open.
async fn resolve_evaluation(
    state: &AppState,
    cookie: &crate::educamos::SessionCookie,
    query: &GradesQuery,
) -> Result<EvaluationQuery, ApiError> {
    let (evaluation_id, group_id) = match &query.evaluation_id {
        Some(id) => (id.clone(), query.group_id.clone()),
        None => {
            let raw = state
                .upstream
                .evaluation_periods(
                    cookie,
                    &query.class_id,
                    &query.school_level_id,
                    query.stage_id.as_deref().unwrap_or(DEFAULT_STAGE),
                    DEFAULT_GRADE_ENTRY_TYPE,
                )
                .await?;
            let periods = grades::normalize_periods(raw);
            let active = grades::active_period(&periods).ok_or_else(|| {
                ApiError::NotFound("no evaluation periods available".to_string())
            })?;
            (active.id.clone(), active.group_id.clone())
        }
    };

    Ok(EvaluationQuery {
        school_level_id: query.school_level_id.clone(),
        class_id: query.class_id.clone(),
        student_id: query.student_id.clone(),
        evaluation_id,
        group_id,
        type_id: query.type_id.clone(),
    })
}
