//! Educamos upstream client.
//!
//! One method per resource category; each issues exactly one HTTP call
//! against a fixed endpoint template using a caller-supplied
//! [`SessionCookie`]. Transport only: no retries, no caching, and non-2xx
//! statuses are surfaced untouched as [`UpstreamError::Status`] for the
//! handler layer to propagate. JSON endpoints deserialize into the raw wire
//! types in [`models`]; HTML endpoints return the body text for the parsers
//! in [`crate::parse`].

pub mod errors;
pub mod json;
pub mod login;
pub mod models;
pub mod session;

pub use errors::UpstreamError;
pub use session::SessionCookie;

use anyhow::Context;
use chrono::Utc;
use serde_json::json;
use std::time::Duration;

use crate::config::Config;
use json::parse_json_with_context;
use models::{
    RawBirthdaysResponse, RawCounter, RawEvaluationPeriod, RawEvaluationResponse, RawSessionTask,
    RawStudentClass, RawUnreadMark, RawWeekResponse,
};

/// Browser identity presented upstream. Educamos serves different markup to
/// unrecognized agents, so this stays pinned to a mainstream Chrome string.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/143.0.0.0 Safari/537.36";

/// Maximum number of grid rows requested from paged list endpoints.
/// i32::MAX mirrors what the Educamos frontend itself sends for "all rows".
const GRID_ALL_ROWS: &str = "2147483647";

/// Resolved endpoint URLs: every template is external configuration, with
/// defaults derived from the base URL for standard deployments.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub base: String,
    pub classes: String,
    pub evaluation_periods: String,
    pub evaluation: String,
    pub tasks: String,
    pub task_status: String,
    pub task_data: String,
    pub incidents: String,
    pub circulars: String,
    pub circular_download: String,
    pub announcements: String,
    pub announcement_detail: String,
    pub announcement_file: String,
    pub counters: String,
    pub unread_marks: String,
    pub context: String,
    pub user_info: String,
    pub course: String,
    pub week_schedule: String,
    pub session_tasks: String,
    pub birthdays: String,
}

impl Endpoints {
    pub fn from_config(config: &Config) -> Self {
        let base = config.educamos_base_url.trim_end_matches('/').to_string();
        let or_default = |override_url: &Option<String>, path: &str| {
            override_url
                .clone()
                .unwrap_or_else(|| format!("{base}{path}"))
        };

        Self {
            classes: format!("{base}/Apis/Evaluacion/EvaluacionFamilia/ObtenerClases"),
            evaluation_periods: format!("{base}/Apis/Evaluacion/PuestaNotas/ObtenerEvaluaciones"),
            evaluation: format!("{base}/Apis/Evaluacion/EvaluacionFamilia/Obtener"),
            tasks: or_default(
                &config.get_tasks_url,
                "/Agenda/Tareas/BuscarListadoTareasHome",
            ),
            task_status: or_default(
                &config.change_task_status_url,
                "/Agenda/Tareas/CambiarVistoTarea",
            ),
            task_data: or_default(&config.get_task_data_url, "/Agenda/Tareas/ObtenerDatosTarea"),
            incidents: format!("{base}/Evaluacion/PasarLista/BuscarListadoIncidenciasHome"),
            circulars: format!("{base}/Comunicacion/Circulares/BuscarListadoCircularesHome"),
            circular_download: format!("{base}/Comunicacion/Circulares/DescargarAdjuntos"),
            announcements: or_default(&config.announcements_url, "/TablonAnuncios/MisAvisos"),
            announcement_detail: or_default(
                &config.get_announcement_url,
                "/TablonAnuncios/DetalleAviso",
            ),
            announcement_file: or_default(
                &config.download_announcement_file_url,
                "/TablonAnuncios/DescargarAdjunto",
            ),
            counters: or_default(
                &config.get_counters_url,
                "/Apis/Comun/Resumen/ObtenerContadores",
            ),
            unread_marks: or_default(
                &config.get_unread_marks_url,
                "/Apis/Evaluacion/Calificaciones/ObtenerNovedades",
            ),
            context: or_default(&config.get_context_url, "/Comun/Contexto"),
            user_info: or_default(&config.get_user_info_url, "/Comun/CabeceraUsuario"),
            course: or_default(&config.get_course_url, "/Apis/Comun/CursoEscolar/Obtener"),
            week_schedule: or_default(
                &config.download_week_calendar_url,
                "/Apis/Agenda/Semanal/ObtenerEventos",
            ),
            session_tasks: or_default(
                &config.get_timetable_tasks_url,
                "/Apis/Agenda/Semanal/ObtenerTareasSesion",
            ),
            birthdays: or_default(&config.birthdays_url, "/Apis/Comun/Cumpleannos/Obtener"),
            base,
        }
    }
}

/// A downloaded attachment: the raw bytes plus the upstream headers the
/// handler must pass through.
pub struct Download {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    pub content_disposition: Option<String>,
}

/// Required parameters for the evaluation/grades lookup.
#[derive(Debug, Clone)]
pub struct EvaluationQuery {
    pub school_level_id: String,
    pub class_id: String,
    pub student_id: String,
    pub evaluation_id: String,
    pub group_id: Option<String>,
    pub type_id: Option<String>,
}

/// Stateless request builders for every Educamos resource.
pub struct UpstreamApi {
    http: reqwest::Client,
    endpoints: Endpoints,
}

impl UpstreamApi {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build upstream HTTP client")?;

        Ok(Self {
            http,
            endpoints: Endpoints::from_config(config),
        })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    fn cache_bust() -> String {
        Utc::now().timestamp_millis().to_string()
    }

    /// XHR-style GET: the header set Educamos' own frontend sends, minus
    /// anything session-identifying beyond the cookie itself.
    async fn get_xhr(
        &self,
        url: &str,
        query: &[(&str, &str)],
        cookie: &SessionCookie,
        referer: &str,
    ) -> Result<reqwest::Response, UpstreamError> {
        let request = self
            .http
            .get(url)
            .query(query)
            .header("accept", "application/json, text/javascript, */*; q=0.01")
            .header("x-requested-with", "XMLHttpRequest")
            .header("referer", referer)
            .header("cookie", cookie.header_value());

        self.execute(url, request).await
    }

    async fn execute(
        &self,
        url: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, UpstreamError> {
        let response = request
            .send()
            .await
            .with_context(|| format!("Request to {url} failed"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }

    async fn body_text(url: &str, response: reqwest::Response) -> Result<String, UpstreamError> {
        let status = response.status().as_u16();
        response
            .text()
            .await
            .map_err(|e| UpstreamError::ParseFailed {
                status,
                url: url.to_string(),
                source: anyhow::Error::from(e).context("Failed to read response body"),
            })
    }

    fn parse_body<T: serde::de::DeserializeOwned>(
        url: &str,
        status: u16,
        body: &str,
    ) -> Result<T, UpstreamError> {
        parse_json_with_context(body).map_err(|source| UpstreamError::ParseFailed {
            status,
            url: url.to_string(),
            source,
        })
    }

    /// The paging fields every Educamos grid POST expects, pinned to
    /// "everything in one page".
    fn grid_fields(order_by: &str, order_mode: &str) -> Vec<(String, String)> {
        vec![
            ("Pagina".into(), "0".into()),
            ("OrdenarPor".into(), order_by.into()),
            ("OrdenarModo".into(), order_mode.into()),
            ("OperacionGrid".into(), String::new()),
            ("NumTotalElemsGrid".into(), GRID_ALL_ROWS.into()),
            ("FilasPorPagina".into(), GRID_ALL_ROWS.into()),
            ("X-Requested-With".into(), "XMLHttpRequest".into()),
        ]
    }

    /// Form-encoded grid POST returning an HTML fragment.
    async fn post_grid(
        &self,
        url: &str,
        fields: Vec<(String, String)>,
        cookie: &SessionCookie,
        referer: &str,
    ) -> Result<String, UpstreamError> {
        let request = self
            .http
            .post(url)
            .form(&fields)
            .header("accept", "*/*")
            .header("accept-language", "es-ES,es;q=0.9")
            .header("origin", &self.endpoints.base)
            .header("referer", referer)
            .header("x-requested-with", "XMLHttpRequest")
            .header("cookie", cookie.header_value());

        let response = self.execute(url, request).await?;
        Self::body_text(url, response).await
    }

    /// JSON-body POST, as the agenda endpoints expect.
    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
        cookie: &SessionCookie,
        referer: &str,
    ) -> Result<reqwest::Response, UpstreamError> {
        let request = self
            .http
            .post(url)
            .json(body)
            .header("accept", "application/json, text/javascript, */*; q=0.01")
            .header("origin", &self.endpoints.base)
            .header("referer", referer)
            .header("x-requested-with", "XMLHttpRequest")
            .header("cookie", cookie.header_value());

        self.execute(url, request).await
    }

    async fn download(
        &self,
        url: &str,
        query: &[(&str, &str)],
        cookie: &SessionCookie,
        referer: &str,
    ) -> Result<Download, UpstreamError> {
        let request = self
            .http
            .get(url)
            .query(query)
            .header("accept", "*/*")
            .header("referer", referer)
            .header("cookie", cookie.header_value());

        let response = self.execute(url, request).await?;
        let status = response.status().as_u16();

        let header_str = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let content_type = header_str("content-type");
        let content_disposition = header_str("content-disposition");

        let bytes = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::ParseFailed {
                status,
                url: url.to_string(),
                source: anyhow::Error::from(e).context("Failed to read download body"),
            })?;

        Ok(Download {
            bytes: bytes.to_vec(),
            content_type,
            content_disposition,
        })
    }

    // ---- resource calls ----

    /// Classes the student is enrolled in.
    pub async fn classes(
        &self,
        cookie: &SessionCookie,
        student_id: &str,
    ) -> Result<Vec<RawStudentClass>, UpstreamError> {
        let url = &self.endpoints.classes;
        let referer = format!("{}/Evaluacion/CalificacionesAlumno", self.endpoints.base);
        let bust = Self::cache_bust();
        let response = self
            .get_xhr(
                url,
                &[("alumnoId", student_id), ("_", &bust)],
                cookie,
                &referer,
            )
            .await?;
        let status = response.status().as_u16();
        let body = Self::body_text(url, response).await?;
        Self::parse_body(url, status, &body)
    }

    /// Evaluation periods available for one class.
    pub async fn evaluation_periods(
        &self,
        cookie: &SessionCookie,
        class_id: &str,
        school_level_id: &str,
        stage_id: &str,
        grade_entry_type: &str,
    ) -> Result<Vec<RawEvaluationPeriod>, UpstreamError> {
        let url = &self.endpoints.evaluation_periods;
        let referer = format!("{}/Evaluacion/CalificacionesAlumno", self.endpoints.base);
        let bust = Self::cache_bust();
        let response = self
            .get_xhr(
                url,
                &[
                    ("claseId", class_id),
                    ("tipoPuestaNota", grade_entry_type),
                    ("nivelEducativoColegioId", school_level_id),
                    ("nivelEducativoEtapa", stage_id),
                    ("_", &bust),
                ],
                cookie,
                &referer,
            )
            .await?;
        let status = response.status().as_u16();
        let body = Self::body_text(url, response).await?;
        Self::parse_body(url, status, &body)
    }

    /// Full grade notebook for one student in one evaluation period.
    pub async fn evaluation(
        &self,
        cookie: &SessionCookie,
        query: &EvaluationQuery,
    ) -> Result<RawEvaluationResponse, UpstreamError> {
        let url = &self.endpoints.evaluation;
        let referer = format!("{}/Evaluacion/CalificacionesAlumno", self.endpoints.base);
        let bust = Self::cache_bust();
        let group_id = query.group_id.as_deref().unwrap_or("");
        let type_id = query.type_id.as_deref().unwrap_or("2");
        let response = self
            .get_xhr(
                url,
                &[
                    ("nivelEducativoColegioId", &query.school_level_id),
                    ("claseId", &query.class_id),
                    ("alumnoId", &query.student_id),
                    ("evaluacionId", &query.evaluation_id),
                    ("evaluacionGrupoId", group_id),
                    ("tipoEvaluacionId", type_id),
                    ("_", &bust),
                ],
                cookie,
                &referer,
            )
            .await?;
        let status = response.status().as_u16();
        let body = Self::body_text(url, response).await?;
        Self::parse_body(url, status, &body)
    }

    /// Task grid HTML for a date range (defaults handled by the caller).
    pub async fn tasks(
        &self,
        cookie: &SessionCookie,
        student_id: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<String, UpstreamError> {
        let mut fields = vec![
            ("alertaValidacion".to_string(), "ValidationSummary".to_string()),
            ("contexto".to_string(), "divListadoTareas".to_string()),
            ("AlumnoId".to_string(), student_id.to_string()),
            ("FechaInicio".to_string(), start_date.to_string()),
            ("FechaFin".to_string(), end_date.to_string()),
        ];
        fields.extend(Self::grid_fields("Fecha", "ASC"));
        // The task grid caps out rather than accepting i32::MAX.
        for (name, value) in &mut fields {
            if name == "NumTotalElemsGrid" || name == "FilasPorPagina" {
                *value = "100".to_string();
            }
        }

        let referer = format!("{}/", self.endpoints.base);
        self.post_grid(&self.endpoints.tasks, fields, cookie, &referer)
            .await
    }

    /// Mark a task seen/unseen. Fire-and-forget: success is the whole contract.
    pub async fn set_task_status(
        &self,
        cookie: &SessionCookie,
        task_id: &str,
        seen: bool,
    ) -> Result<(), UpstreamError> {
        let referer = format!("{}/", self.endpoints.base);
        let body = json!({ "tareaId": task_id, "visto": seen });
        self.post_json(&self.endpoints.task_status, &body, cookie, &referer)
            .await?;
        Ok(())
    }

    /// Task detail popup HTML. Also marks the task read upstream.
    pub async fn task_detail(
        &self,
        cookie: &SessionCookie,
        task_id: &str,
        student_id: &str,
    ) -> Result<String, UpstreamError> {
        let url = format!("{}?nocache={}", self.endpoints.task_data, Self::cache_bust());
        let referer = format!("{}/", self.endpoints.base);
        let body = json!({
            "idSeleccion": task_id,
            "alumnoPersonaId": student_id,
            "leida": "True",
        });
        let response = self.post_json(&url, &body, cookie, &referer).await?;
        Self::body_text(&url, response).await
    }

    /// Incident grid HTML for one student.
    pub async fn incidents(
        &self,
        cookie: &SessionCookie,
        student_id: &str,
    ) -> Result<String, UpstreamError> {
        let mut fields = vec![
            ("PersonaId".to_string(), student_id.to_string()),
            (
                "EvaluacionId".to_string(),
                "00000000-0000-0000-0000-000000000000".to_string(),
            ),
            ("MostrarPendientesVer".to_string(), "false".to_string()),
            ("cmbTiposIncidencia".to_string(), String::new()),
            ("MostrarSoloNoJustificadas".to_string(), "false".to_string()),
        ];
        fields.extend(Self::grid_fields("Fecha", "DESC"));

        let referer = format!("{}/Evaluacion/PasarLista/MisIncidencias", self.endpoints.base);
        self.post_grid(&self.endpoints.incidents, fields, cookie, &referer)
            .await
    }

    /// Circular grid HTML for one student, up to today.
    pub async fn circulars(
        &self,
        cookie: &SessionCookie,
        student_id: &str,
        until: &str,
    ) -> Result<String, UpstreamError> {
        let mut fields = vec![
            ("PersonaId".to_string(), student_id.to_string()),
            ("FechaInicio".to_string(), String::new()),
            ("FechaFin".to_string(), until.to_string()),
        ];
        fields.extend(Self::grid_fields("FechaPublicacion", "DESC"));

        let referer = format!("{}/Comunicacion/Circulares/MisCirculares", self.endpoints.base);
        self.post_grid(&self.endpoints.circulars, fields, cookie, &referer)
            .await
    }

    /// Download a circular's attachment bundle.
    pub async fn download_circular(
        &self,
        cookie: &SessionCookie,
        circular_id: &str,
    ) -> Result<Download, UpstreamError> {
        let referer = format!("{}/Comunicacion/Circulares/MisCirculares", self.endpoints.base);
        self.download(
            &self.endpoints.circular_download,
            &[("CircularId", circular_id)],
            cookie,
            &referer,
        )
        .await
    }

    /// Announcement board HTML.
    pub async fn announcements(&self, cookie: &SessionCookie) -> Result<String, UpstreamError> {
        let url = &self.endpoints.announcements;
        let referer = format!("{}/", self.endpoints.base);
        let request = self
            .http
            .get(url)
            .header("accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header("cache-control", "max-age=0")
            .header("referer", referer)
            .header("cookie", cookie.header_value());
        let response = self.execute(url, request).await?;
        Self::body_text(url, response).await
    }

    /// Announcement detail HTML. The `marcarLeido` field doubles as the
    /// read-state write, mirroring the platform's own behavior.
    pub async fn announcement_detail(
        &self,
        cookie: &SessionCookie,
        announcement_id: &str,
    ) -> Result<String, UpstreamError> {
        let url = &self.endpoints.announcement_detail;
        let referer = format!("{}/", self.endpoints.base);
        let fields = vec![
            ("idSeleccion".to_string(), announcement_id.to_string()),
            ("marcarLeido".to_string(), "true".to_string()),
            ("personaHijoId".to_string(), String::new()),
        ];
        self.post_grid(url, fields, cookie, &referer).await
    }

    /// Download an announcement's attachment.
    pub async fn download_announcement_file(
        &self,
        cookie: &SessionCookie,
        announcement_id: &str,
    ) -> Result<Download, UpstreamError> {
        let referer = format!("{}/", self.endpoints.base);
        self.download(
            &self.endpoints.announcement_file,
            &[("avisoId", announcement_id)],
            cookie,
            &referer,
        )
        .await
    }

    /// Home-screen counters. Educamos answers an expired session with an
    /// HTTP 200 HTML login page here, so a body starting with `<` is an
    /// invalid-session signal, not a parse error.
    pub async fn counters(
        &self,
        cookie: &SessionCookie,
        person_id: &str,
        role_id: &str,
    ) -> Result<Vec<RawCounter>, UpstreamError> {
        let url = &self.endpoints.counters;
        let referer = format!("{}/", self.endpoints.base);
        let bust = Self::cache_bust();
        let response = self
            .get_xhr(
                url,
                &[
                    ("PersonaId", person_id),
                    ("RolBaseId", role_id),
                    ("_", &bust),
                ],
                cookie,
                &referer,
            )
            .await?;
        let status = response.status().as_u16();
        let body = Self::body_text(url, response).await?;

        if crate::parse::counters::body_is_login_page(&body) {
            return Err(UpstreamError::InvalidSession(
                "counters endpoint returned a login page".to_string(),
            ));
        }
        Self::parse_body(url, status, &body)
    }

    /// Recent grade-notification marks for the header bell.
    pub async fn unread_marks(
        &self,
        cookie: &SessionCookie,
        person_id: &str,
        count: &str,
        role_id: &str,
        date: &str,
    ) -> Result<Vec<RawUnreadMark>, UpstreamError> {
        let url = &self.endpoints.unread_marks;
        let referer = format!("{}/", self.endpoints.base);
        let bust = Self::cache_bust();
        let response = self
            .get_xhr(
                url,
                &[
                    ("NumeroElementos", count),
                    ("PersonaId", person_id),
                    ("RolBaseId", role_id),
                    ("Fecha", date),
                    ("_", &bust),
                ],
                cookie,
                &referer,
            )
            .await?;
        let status = response.status().as_u16();
        let body = Self::body_text(url, response).await?;
        Self::parse_body(url, status, &body)
    }

    /// The context bootstrap script (a JS fragment, not JSON).
    pub async fn context_script(&self, cookie: &SessionCookie) -> Result<String, UpstreamError> {
        let url = &self.endpoints.context;
        let referer = format!("{}/", self.endpoints.base);
        let request = self
            .http
            .get(url)
            .header("accept", "*/*")
            .header("referer", referer)
            .header("cookie", cookie.header_value());
        let response = self.execute(url, request).await?;
        Self::body_text(url, response).await
    }

    /// Profile dropdown HTML (name + avatar).
    pub async fn user_info_page(&self, cookie: &SessionCookie) -> Result<String, UpstreamError> {
        let url = &self.endpoints.user_info;
        let referer = format!("{}/", self.endpoints.base);
        let request = self
            .http
            .get(url)
            .header("accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header("referer", referer)
            .header("cookie", cookie.header_value());
        let response = self.execute(url, request).await?;
        Self::body_text(url, response).await
    }

    /// School-year metadata, passed through untyped.
    pub async fn course_info(
        &self,
        cookie: &SessionCookie,
    ) -> Result<serde_json::Value, UpstreamError> {
        let url = &self.endpoints.course;
        let referer = format!("{}/", self.endpoints.base);
        let response = self.get_xhr(url, &[], cookie, &referer).await?;
        let status = response.status().as_u16();
        let body = Self::body_text(url, response).await?;
        Self::parse_body(url, status, &body)
    }

    /// One school week of timetable events around a reference date.
    pub async fn week_schedule(
        &self,
        cookie: &SessionCookie,
        person_id: &str,
        reference_date: &str,
    ) -> Result<RawWeekResponse, UpstreamError> {
        let url = &self.endpoints.week_schedule;
        let referer = format!("{}/Agenda/Semanal", self.endpoints.base);
        let body = json!({
            "fechaHoy": reference_date,
            "diaSemanaInicio": 1,
            "diaSemanaFin": 7,
            "PersonaId": person_id,
            "AlumnoIdCuandoRolBaseEsTutor": "",
        });
        let response = self.post_json(url, &body, cookie, &referer).await?;
        let status = response.status().as_u16();
        let text = Self::body_text(url, response).await?;
        Self::parse_body(url, status, &text)
    }

    /// Tasks attached to one timetable session.
    pub async fn session_tasks(
        &self,
        cookie: &SessionCookie,
        session_id: &str,
        date: &str,
    ) -> Result<Vec<RawSessionTask>, UpstreamError> {
        let url = &self.endpoints.session_tasks;
        let referer = format!("{}/", self.endpoints.base);
        let body = json!({
            "ClaseHorarioSesionId": session_id,
            "Fecha": date,
            "ActualizarCache": false,
        });
        let response = self.post_json(url, &body, cookie, &referer).await?;
        let status = response.status().as_u16();
        let text = Self::body_text(url, response).await?;
        Self::parse_body(url, status, &text)
    }

    /// Birthdays widget data.
    pub async fn birthdays(
        &self,
        cookie: &SessionCookie,
    ) -> Result<RawBirthdaysResponse, UpstreamError> {
        let url = &self.endpoints.birthdays;
        let referer = format!("{}/", self.endpoints.base);
        let response = self.get_xhr(url, &[], cookie, &referer).await?;
        let status = response.status().as_u16();
        let body = Self::body_text(url, response).await?;
        Self::parse_body(url, status, &body)
    }
}
