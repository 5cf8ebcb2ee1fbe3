//! Normalization of the evaluation payload into subject grades.
//!
//! The wire shape is index-based: every gradable entity carries a
//! per-evaluation index, grade entries point back at entities through that
//! index, and each subject's notebook of sub-items hangs off a map keyed by
//! the stringified subject index. Scale-graded entries additionally index
//! into a grading-scale value table, whose `aprobado`/`color` override the
//! numeric pass rule.

use crate::educamos::models::{
    RawEvaluationPeriod, RawEvaluationResponse, RawGradableEntity, RawGradeEntry, RawGradingScale,
    RawNotebook, RawScaleValue,
};
use crate::models::{EvaluationPeriod, SubGrade, SubjectDetail, SubjectEvaluation};

/// Entities with this type are subjects; everything else is a sub-item.
const ENTITY_TYPE_SUBJECT: i64 = 0;

/// Numeric pass threshold when no grading scale claims the entry.
const PASS_MARK: f64 = 5.0;

const DEFAULT_GRADE_LABEL: &str = "Oficial";

pub fn normalize_periods(raw: Vec<RawEvaluationPeriod>) -> Vec<EvaluationPeriod> {
    raw.into_iter()
        .map(|p| EvaluationPeriod {
            id: p.evaluacion_id,
            name: p.nombre,
            class_id: p.clase_id,
            school_level_id: p.nivel_educativo_colegio_id,
            evaluation_type_id: p.tipo_evaluacion_id,
            group_id: p.grupo_id.filter(|g| !g.is_empty()),
            is_selected: p.seleccionada,
            is_active: p.activa,
        })
        .collect()
}

/// The period grades should default to: the explicitly selected one, else
/// the first active one, else the first listed.
pub fn active_period(periods: &[EvaluationPeriod]) -> Option<&EvaluationPeriod> {
    periods
        .iter()
        .find(|p| p.is_selected)
        .or_else(|| periods.iter().find(|p| p.is_active))
        .or_else(|| periods.first())
}

/// Headline grade per subject, for the grades overview.
pub fn subject_evaluations(response: &RawEvaluationResponse) -> Vec<SubjectEvaluation> {
    subjects(response)
        .map(|subject| {
            let notebook = notebook_for(response, subject);
            let mean = notebook.and_then(|nb| mean_grade(&nb.calificaciones));
            let scale_value = notebook.and_then(|nb| {
                subject_scale_value(nb, subject, &response.sistemas_calificacion)
            });

            let (is_passed, grade_label, color) = match scale_value {
                Some(value) => (
                    value.aprobado,
                    label_or_default(&value.nombre),
                    non_empty(&value.color),
                ),
                None => (
                    mean.is_some_and(|m| m >= PASS_MARK),
                    DEFAULT_GRADE_LABEL.to_string(),
                    None,
                ),
            };

            SubjectEvaluation {
                subject_id: subject.id.clone(),
                subject_name: subject.nombre.clone(),
                short_name: subject.reducido.clone(),
                grade: mean,
                max_grade: 10.0,
                is_passed,
                grade_label,
                color,
            }
        })
        .collect()
}

/// One subject expanded into its sub-grades. `None` when the id matches no
/// subject in the payload.
pub fn subject_detail(response: &RawEvaluationResponse, subject_id: &str) -> Option<SubjectDetail> {
    let subject = subjects(response).find(|s| s.id == subject_id)?;
    let notebook = notebook_for(response, subject);

    let grades: Vec<SubGrade> = notebook
        .map(|nb| {
            nb.entidades_calificables
                .iter()
                .map(|entity| sub_grade(nb, entity, &response.sistemas_calificacion))
                .collect()
        })
        .unwrap_or_default();

    let main_grade = mean_of(grades.iter().filter_map(|g| g.grade));
    let is_passed = notebook
        .and_then(|nb| subject_scale_value(nb, subject, &response.sistemas_calificacion))
        .map(|value| value.aprobado)
        .unwrap_or_else(|| main_grade.is_some_and(|m| m >= PASS_MARK));

    Some(SubjectDetail {
        id: subject.id.clone(),
        name: subject.nombre.clone(),
        short_name: subject.reducido.clone(),
        main_grade,
        is_passed,
        grades,
    })
}

fn subjects(response: &RawEvaluationResponse) -> impl Iterator<Item = &RawGradableEntity> {
    response
        .entidades_calificables
        .iter()
        .filter(|e| e.tipo == ENTITY_TYPE_SUBJECT)
}

fn notebook_for<'a>(
    response: &'a RawEvaluationResponse,
    subject: &RawGradableEntity,
) -> Option<&'a RawNotebook> {
    response.cuadernos.get(&subject.evaluacion_indice.to_string())
}

fn sub_grade(
    notebook: &RawNotebook,
    entity: &RawGradableEntity,
    fallback_scales: &[RawGradingScale],
) -> SubGrade {
    let entry = notebook
        .calificaciones
        .iter()
        .find(|c| c.evaluacion_indice == entity.evaluacion_indice);

    let grade = entry.and_then(|e| e.valor_nota);
    let scale_value = entry
        .and_then(|e| e.valor_indice)
        .and_then(|idx| scale_value_at(&notebook.sistemas_calificacion, fallback_scales, idx));

    let (is_passed, color) = match scale_value {
        Some(value) => (value.aprobado, non_empty(&value.color)),
        None => (grade.is_some_and(|g| g >= PASS_MARK), None),
    };

    SubGrade {
        id: entity.id.clone(),
        name: entity.nombre.clone(),
        short_name: entity.reducido.clone(),
        grade,
        is_passed,
        color,
    }
}

/// The scale value the subject's own grade entry points at, if any.
fn subject_scale_value<'a>(
    notebook: &'a RawNotebook,
    subject: &RawGradableEntity,
    fallback_scales: &'a [RawGradingScale],
) -> Option<&'a RawScaleValue> {
    let entry = notebook
        .calificaciones
        .iter()
        .find(|c| c.evaluacion_indice == subject.evaluacion_indice)?;
    let idx = entry.valor_indice?;
    scale_value_at(&notebook.sistemas_calificacion, fallback_scales, idx)
}

fn scale_value_at<'a>(
    scales: &'a [RawGradingScale],
    fallback: &'a [RawGradingScale],
    idx: usize,
) -> Option<&'a RawScaleValue> {
    scales
        .first()
        .or_else(|| fallback.first())
        .and_then(|scale| scale.valores.get(idx))
}

fn mean_grade(entries: &[RawGradeEntry]) -> Option<f64> {
    mean_of(entries.iter().filter_map(|e| e.valor_nota))
}

fn mean_of(values: impl Iterator<Item = f64>) -> Option<f64> {
    let defined: Vec<f64> = values.collect();
    if defined.is_empty() {
        return None;
    }
    let mean = defined.iter().sum::<f64>() / defined.len() as f64;
    Some((mean * 100.0).round() / 100.0)
}

fn label_or_default(name: &str) -> String {
    if name.trim().is_empty() {
        DEFAULT_GRADE_LABEL.to_string()
    } else {
        name.to_string()
    }
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixture() -> RawEvaluationResponse {
        serde_json::from_value(json!({
            "entidadesCalificables": [
                {
                    "id": "len",
                    "nombre": "Lengua Castellana",
                    "reducido": "LEN",
                    "tipo": 0,
                    "entidadCalificableAlumnoEvaluacionIndice": 1
                },
                {
                    "id": "rel",
                    "nombre": "Religión",
                    "reducido": "REL",
                    "tipo": 0,
                    "entidadCalificableAlumnoEvaluacionIndice": 2
                },
                {
                    "id": "tutoria",
                    "nombre": "Tutoría",
                    "reducido": "TUT",
                    "tipo": 3,
                    "entidadCalificableAlumnoEvaluacionIndice": 3
                }
            ],
            "sistemasCalificacion": [],
            "puestaNotasCuadernoPorEntidadCalificablePadreIndice": {
                "1": {
                    "calificaciones": [
                        { "entidadCalificableAlumnoEvaluacionIndice": 10, "valorNota": 6.0 },
                        { "entidadCalificableAlumnoEvaluacionIndice": 11, "valorNota": 3.0 },
                        { "entidadCalificableAlumnoEvaluacionIndice": 12, "valorNota": null }
                    ],
                    "entidadesCalificables": [
                        {
                            "id": "len-ex1",
                            "nombre": "Examen tema 1",
                            "reducido": "EX1",
                            "tipo": 1,
                            "entidadCalificableAlumnoEvaluacionIndice": 10
                        },
                        {
                            "id": "len-ex2",
                            "nombre": "Examen tema 2",
                            "reducido": "EX2",
                            "tipo": 1,
                            "entidadCalificableAlumnoEvaluacionIndice": 11
                        },
                        {
                            "id": "len-trabajo",
                            "nombre": "Trabajo en grupo",
                            "reducido": "TRA",
                            "tipo": 1,
                            "entidadCalificableAlumnoEvaluacionIndice": 12
                        }
                    ],
                    "sistemasCalificacion": []
                },
                "2": {
                    "calificaciones": [
                        {
                            "entidadCalificableAlumnoEvaluacionIndice": 2,
                            "sistemaCalificacionValorIndice": 1
                        }
                    ],
                    "entidadesCalificables": [],
                    "sistemasCalificacion": [
                        {
                            "valores": [
                                { "nombre": "Insuficiente", "aprobado": false, "color": "#d9534f" },
                                { "nombre": "Notable", "aprobado": true, "color": "#5cb85c" }
                            ]
                        }
                    ]
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn overview_averages_defined_grades_only() {
        let subjects = subject_evaluations(&fixture());
        assert_eq!(subjects.len(), 2);

        let lengua = &subjects[0];
        assert_eq!(lengua.subject_name, "Lengua Castellana");
        assert_eq!(lengua.grade, Some(4.5));
        assert!(!lengua.is_passed);
        assert_eq!(lengua.grade_label, "Oficial");
    }

    #[test]
    fn scale_verdict_overrides_numeric_threshold() {
        let subjects = subject_evaluations(&fixture());
        let religion = &subjects[1];
        assert_eq!(religion.grade, None);
        assert!(religion.is_passed);
        assert_eq!(religion.grade_label, "Notable");
        assert_eq!(religion.color.as_deref(), Some("#5cb85c"));
    }

    #[test]
    fn passing_scale_verdict_survives_a_failing_mean() {
        // A numeric 4.0 is below the pass mark, but the scale entry the
        // grade points at says passed; the scale wins.
        let response: RawEvaluationResponse = serde_json::from_value(json!({
            "entidadesCalificables": [
                {
                    "id": "mus",
                    "nombre": "Música",
                    "reducido": "MUS",
                    "tipo": 0,
                    "entidadCalificableAlumnoEvaluacionIndice": 5
                }
            ],
            "sistemasCalificacion": [],
            "puestaNotasCuadernoPorEntidadCalificablePadreIndice": {
                "5": {
                    "calificaciones": [
                        {
                            "entidadCalificableAlumnoEvaluacionIndice": 5,
                            "sistemaCalificacionValorIndice": 0,
                            "valorNota": 4.0
                        }
                    ],
                    "entidadesCalificables": [],
                    "sistemasCalificacion": [
                        {
                            "valores": [
                                { "nombre": "Progresa adecuadamente", "aprobado": true, "color": "#5cb85c" }
                            ]
                        }
                    ]
                }
            }
        }))
        .unwrap();

        let subjects = subject_evaluations(&response);
        assert_eq!(subjects[0].grade, Some(4.0));
        assert!(subjects[0].is_passed);
        assert_eq!(subjects[0].grade_label, "Progresa adecuadamente");
    }

    #[test]
    fn detail_pairs_sub_items_with_their_grades() {
        let detail = subject_detail(&fixture(), "len").unwrap();
        assert_eq!(detail.grades.len(), 3);
        assert_eq!(detail.grades[0].grade, Some(6.0));
        assert_eq!(detail.grades[1].grade, Some(3.0));
        assert!(!detail.grades[1].is_passed);
        assert_eq!(detail.grades[2].grade, None);
        assert_eq!(detail.main_grade, Some(4.5));
    }

    #[test]
    fn unknown_subject_yields_none() {
        assert!(subject_detail(&fixture(), "missing").is_none());
    }

    #[test]
    fn active_period_prefers_selected_then_active() {
        let raw: Vec<RawEvaluationPeriod> = serde_json::from_value(json!([
            {
                "Id": "row-1", "EvaluacionId": "ev-1", "EvaluacionNombre": "Primera",
                "ClaseId": "c", "NivelEducativoColegioId": "n",
                "EvaluacionActiva": false, "Seleccionada": false
            },
            {
                "Id": "row-2", "EvaluacionId": "ev-2", "EvaluacionNombre": "Segunda",
                "ClaseId": "c", "NivelEducativoColegioId": "n",
                "EvaluacionActiva": true, "Seleccionada": false
            },
            {
                "Id": "row-3", "EvaluacionId": "ev-3", "EvaluacionNombre": "Tercera",
                "ClaseId": "c", "NivelEducativoColegioId": "n",
                "EvaluacionActiva": false, "Seleccionada": true
            }
        ]))
        .unwrap();

        let periods = normalize_periods(raw);
        assert_eq!(active_period(&periods).unwrap().id, "ev-3");

        let without_selection: Vec<EvaluationPeriod> = periods
            .iter()
            .cloned()
            .map(|mut p| {
                p.is_selected = false;
                p
            })
            .collect();
        assert_eq!(active_period(&without_selection).unwrap().id, "ev-2");
    }
}
