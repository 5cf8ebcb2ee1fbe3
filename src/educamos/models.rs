//! Raw wire types for Educamos JSON responses.
//!
//! Field names mirror the platform's Spanish JSON keys exactly (via serde
//! renames) so a payload drift shows up as a named-path deserialization
//! error rather than a silently empty struct. Normalization into the
//! English-named domain records happens in [`crate::parse`].

use serde::Deserialize;
use std::collections::HashMap;

/// `Apis/Evaluacion/EvaluacionFamilia/ObtenerClases` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct RawStudentClass {
    pub id: String,
    pub nombre: String,
    pub reducido: String,
    #[serde(rename = "nivelEducativoEtapaId", default)]
    pub nivel_educativo_etapa_id: i64,
    #[serde(rename = "nivelEducativoColegioId", default)]
    pub nivel_educativo_colegio_id: String,
}

/// `Apis/Evaluacion/PuestaNotas/ObtenerEvaluaciones` entry.
///
/// Note the two ids: `Id` is the row id, `EvaluacionId` is what the grade
/// endpoints expect as `evaluacionId`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEvaluationPeriod {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "EvaluacionId")]
    pub evaluacion_id: String,
    #[serde(rename = "EvaluacionNombre")]
    pub nombre: String,
    #[serde(rename = "EvaluacionReducido", default)]
    pub reducido: String,
    #[serde(rename = "ClaseId")]
    pub clase_id: String,
    #[serde(rename = "NivelEducativoColegioId")]
    pub nivel_educativo_colegio_id: String,
    #[serde(rename = "TipoEvaluacionId", default)]
    pub tipo_evaluacion_id: i64,
    #[serde(rename = "EvaluacionActiva", default)]
    pub activa: bool,
    #[serde(rename = "Seleccionada", default)]
    pub seleccionada: bool,
    #[serde(rename = "EvaluacionGrupoId", default)]
    pub grupo_id: Option<String>,
}

/// A gradable entity: a subject (`tipo == 0`) or a sub-item under one.
#[derive(Debug, Clone, Deserialize)]
pub struct RawGradableEntity {
    pub id: String,
    pub nombre: String,
    #[serde(default)]
    pub reducido: String,
    #[serde(default)]
    pub tipo: i64,
    #[serde(rename = "entidadCalificableAlumnoEvaluacionIndice")]
    pub evaluacion_indice: i64,
}

/// One grade entry, pointing at its entity by per-evaluation index.
#[derive(Debug, Clone, Deserialize)]
pub struct RawGradeEntry {
    #[serde(rename = "entidadCalificableAlumnoEvaluacionIndice")]
    pub evaluacion_indice: i64,
    #[serde(rename = "sistemaCalificacionValorIndice", default)]
    pub valor_indice: Option<usize>,
    #[serde(rename = "valorNota", default)]
    pub valor_nota: Option<f64>,
}

/// One value in a grading scale's lookup table.
#[derive(Debug, Clone, Deserialize)]
pub struct RawScaleValue {
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub aprobado: bool,
    #[serde(default)]
    pub color: String,
}

/// A grading scale: an ordered value table indexed by `valor_indice`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawGradingScale {
    #[serde(default)]
    pub valores: Vec<RawScaleValue>,
}

/// A per-subject grade notebook: the sub-items and their grades.
#[derive(Debug, Clone, Deserialize)]
pub struct RawNotebook {
    #[serde(default)]
    pub calificaciones: Vec<RawGradeEntry>,
    #[serde(rename = "entidadesCalificables", default)]
    pub entidades_calificables: Vec<RawGradableEntity>,
    #[serde(rename = "sistemasCalificacion", default)]
    pub sistemas_calificacion: Vec<RawGradingScale>,
}

/// `Apis/Evaluacion/EvaluacionFamilia/Obtener` response.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEvaluationResponse {
    #[serde(rename = "entidadesCalificables", default)]
    pub entidades_calificables: Vec<RawGradableEntity>,
    #[serde(rename = "sistemasCalificacion", default)]
    pub sistemas_calificacion: Vec<RawGradingScale>,
    /// Notebooks keyed by the stringified parent subject index.
    #[serde(
        rename = "puestaNotasCuadernoPorEntidadCalificablePadreIndice",
        default
    )]
    pub cuadernos: HashMap<String, RawNotebook>,
}

/// One slot in the weekly timetable response.
#[derive(Debug, Clone, Deserialize)]
pub struct RawWeekEvent {
    #[serde(rename = "ClaseHorarioSesionId", default)]
    pub sesion_id: Option<String>,
    #[serde(rename = "ClaseMateriaNombre", default)]
    pub materia_nombre: String,
    #[serde(rename = "ClaseMateriaNombreReducido", default)]
    pub materia_reducido: Option<String>,
    #[serde(rename = "ClaseNombre", default)]
    pub clase_nombre: Option<String>,
    #[serde(rename = "ClaseNombreReducido", default)]
    pub clase_reducido: Option<String>,
    #[serde(rename = "DiaSemanaId")]
    pub dia_semana_id: u8,
    #[serde(rename = "HoraInicio")]
    pub hora_inicio: String,
    #[serde(rename = "HoraFin")]
    pub hora_fin: String,
    #[serde(rename = "FechaInicio", default)]
    pub fecha_inicio: String,
    #[serde(rename = "FechaFin", default)]
    pub fecha_fin: String,
    #[serde(rename = "EsActividadNoLectiva", default)]
    pub es_actividad_no_lectiva: bool,
    #[serde(rename = "NumExamenes", default)]
    pub num_examenes: i64,
    #[serde(rename = "NumTareas", default)]
    pub num_tareas: i64,
    #[serde(rename = "NumIncidencias", default)]
    pub num_incidencias: i64,
    #[serde(rename = "RejillaHorariaDiaSesionId", default)]
    pub rejilla_sesion_id: String,
}

/// Weekly timetable envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct RawWeekResponse {
    #[serde(rename = "FechaInicio")]
    pub fecha_inicio: String,
    #[serde(rename = "FechaFin")]
    pub fecha_fin: String,
    #[serde(rename = "EventosEscolares", default)]
    pub eventos: Vec<RawWeekEvent>,
}

/// Home-screen counter entry.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCounter {
    #[serde(rename = "TipoElementoResumen")]
    pub tipo: i64,
    #[serde(rename = "ContadorElementos", default)]
    pub contador: i64,
    #[serde(rename = "MostrarContador", default)]
    pub mostrar: bool,
}

/// Header-bell notification entry.
#[derive(Debug, Clone, Deserialize)]
pub struct RawUnreadMark {
    #[serde(rename = "Id", default)]
    pub id: Option<String>,
    #[serde(rename = "Fecha", default)]
    pub fecha: String,
    #[serde(rename = "Texto", default)]
    pub texto: String,
    #[serde(rename = "Url", default)]
    pub url: Option<String>,
    #[serde(rename = "Activo", default)]
    pub activo: bool,
    #[serde(rename = "Destacado", default)]
    pub destacado: bool,
}

/// Task entry attached to one timetable session.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSessionTask {
    #[serde(rename = "TareaId")]
    pub tarea_id: String,
    #[serde(rename = "Nombre", default)]
    pub nombre: String,
    #[serde(rename = "Fecha", default)]
    pub fecha: String,
    #[serde(rename = "TipoTareaNombre", default)]
    pub tipo: String,
    #[serde(rename = "Visto", default)]
    pub visto: bool,
}

/// One person in the birthdays widget.
#[derive(Debug, Clone, Deserialize)]
pub struct RawBirthdayPerson {
    #[serde(rename = "nombreApellido", default)]
    pub nombre_apellido: String,
    #[serde(rename = "urlFoto", default)]
    pub url_foto: Option<String>,
    #[serde(rename = "alumnoClasesNombres", default)]
    pub clases: Vec<String>,
}

/// Birthdays widget response: today / tomorrow / upcoming buckets.
#[derive(Debug, Clone, Deserialize)]
pub struct RawBirthdaysResponse {
    #[serde(rename = "personaCumpleannosHoy", default)]
    pub hoy: Vec<RawBirthdayPerson>,
    #[serde(rename = "personaCumpleannosMannana", default)]
    pub mannana: Vec<RawBirthdayPerson>,
    #[serde(rename = "personaCumpleannosProximamente", default)]
    pub proximamente: Vec<RawBirthdayPerson>,
}
