//! Weekly timetable normalization.

use crate::educamos::models::{RawSessionTask, RawWeekEvent, RawWeekResponse};
use crate::models::{ScheduleEvent, SessionTask, WeekSchedule};

pub fn normalize_week(raw: RawWeekResponse) -> WeekSchedule {
    let mut events: Vec<ScheduleEvent> = raw.eventos.into_iter().map(normalize_event).collect();
    // Stable order for the UI: Monday first, then by start time within a day.
    events.sort_by(|a, b| {
        a.day_of_week
            .cmp(&b.day_of_week)
            .then_with(|| a.start_time.cmp(&b.start_time))
    });

    WeekSchedule {
        week_start: raw.fecha_inicio,
        week_end: raw.fecha_fin,
        events,
    }
}

fn normalize_event(event: RawWeekEvent) -> ScheduleEvent {
    // Taught sessions carry a session id; grid fillers (breaks, lunch) only
    // carry the grid-slot id.
    let id = event
        .sesion_id
        .clone()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| event.rejilla_sesion_id.clone());

    let subject_name = event.materia_nombre;
    let subject_short_name = event
        .materia_reducido
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| subject_name.clone());
    let class_name = event.clase_nombre.unwrap_or_default();
    let class_short_name = event
        .clase_reducido
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| class_name.clone());

    ScheduleEvent {
        id,
        subject_name,
        subject_short_name,
        class_name,
        class_short_name,
        day_of_week: event.dia_semana_id,
        start_time: clock(&event.hora_inicio),
        end_time: clock(&event.hora_fin),
        start_date: event.fecha_inicio,
        end_date: event.fecha_fin,
        is_break: event.es_actividad_no_lectiva,
        has_exam: event.num_examenes > 0,
        has_tasks: event.num_tareas > 0,
        has_incidences: event.num_incidencias > 0,
        session_id: event.sesion_id.unwrap_or_default(),
    }
}

/// Trim `HH:MM:SS` to `HH:MM`.
fn clock(time: &str) -> String {
    time.chars().take(5).collect()
}

pub fn normalize_session_tasks(raw: Vec<RawSessionTask>) -> Vec<SessionTask> {
    raw.into_iter()
        .map(|t| SessionTask {
            id: t.tarea_id,
            name: t.nombre,
            date: t.fecha,
            kind: t.tipo,
            seen: t.visto,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixture() -> RawWeekResponse {
        serde_json::from_value(json!({
            "FechaInicio": "01/09/2025",
            "FechaFin": "07/09/2025",
            "EventosEscolares": [
                {
                    "ClaseHorarioSesionId": "ses-b",
                    "ClaseMateriaNombre": "Matemáticas",
                    "ClaseMateriaNombreReducido": "MAT",
                    "ClaseNombre": "4º ESO B",
                    "ClaseNombreReducido": "4B",
                    "DiaSemanaId": 2,
                    "HoraInicio": "09:00:00",
                    "HoraFin": "09:55:00",
                    "FechaInicio": "02/09/2025",
                    "FechaFin": "02/09/2025",
                    "NumExamenes": 1,
                    "NumTareas": 0,
                    "RejillaHorariaDiaSesionId": "rej-1"
                },
                {
                    "ClaseHorarioSesionId": null,
                    "ClaseMateriaNombre": "Recreo",
                    "DiaSemanaId": 1,
                    "HoraInicio": "11:00:00",
                    "HoraFin": "11:30:00",
                    "EsActividadNoLectiva": true,
                    "RejillaHorariaDiaSesionId": "rej-2"
                },
                {
                    "ClaseHorarioSesionId": "ses-a",
                    "ClaseMateriaNombre": "Lengua",
                    "DiaSemanaId": 1,
                    "HoraInicio": "08:00:00",
                    "HoraFin": "08:55:00",
                    "RejillaHorariaDiaSesionId": "rej-3"
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn sorts_by_day_then_start_time() {
        let week = normalize_week(fixture());
        let ids: Vec<&str> = week.events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["ses-a", "rej-2", "ses-b"]);
    }

    #[test]
    fn fillers_fall_back_to_the_grid_slot_id() {
        let week = normalize_week(fixture());
        let recreo = &week.events[1];
        assert_eq!(recreo.id, "rej-2");
        assert!(recreo.is_break);
        assert_eq!(recreo.session_id, "");
        assert_eq!(recreo.start_time, "11:00");
    }

    #[test]
    fn short_names_fall_back_to_full_names() {
        let week = normalize_week(fixture());
        let lengua = &week.events[0];
        assert_eq!(lengua.subject_short_name, "Lengua");
        let mates = &week.events[2];
        assert_eq!(mates.subject_short_name, "MAT");
        assert!(mates.has_exam);
    }
}
