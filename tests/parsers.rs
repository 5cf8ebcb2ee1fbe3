//! Parser tests against fuller, noisier fixtures than the unit tests use:
//! grid chrome, entity-encoded text, and partially missing data, the way
//! the live platform actually serves it.

use aula::models::TaskStatus;
use aula::parse::{announcements, context, grades, incidents, schedule, tasks};

#[test]
fn task_grid_with_chrome_and_encoded_text() {
    let html = r#"
        <div id="divListadoTareas">
        <table class="grid">
            <thead><tr><th>Materia</th><th>T&iacute;tulo</th><th>Fecha</th><th></th></tr></thead>
            <tbody>
                <tr class="filaPar" data-id="t-100" data-leido="False">
                    <td class="col-materia"><span title='Educaci&oacute;n F&iacute;sica'>Educaci&oacute;n F&iacute;sica</span></td>
                    <td><span>Traer ropa de deporte ma&ntilde;ana</span></td>
                    <td><span>18/09/2025</span></td>
                    <td class="col-estado"></td>
                </tr>
                <tr class="filaImpar" data-id="t-101" data-leido="True">
                    <td><span>M&uacute;sica</span></td>
                    <td><span>Flauta: escala de Do</span></td>
                    <td><span>19/09/2025</span></td>
                    <td><img src="/Content/images/checkok.png" alt="entregada" /></td>
                </tr>
                <tr><td colspan="4">Mostrando 2 de 2</td></tr>
            </tbody>
        </table>
        </div>
    "#;

    let parsed = tasks::parse_task_grid(html);
    assert_eq!(parsed.len(), 2);

    assert_eq!(parsed[0].subject, "Educación Física");
    assert_eq!(parsed[0].title, "Traer ropa de deporte mañana");
    assert_eq!(parsed[0].due_date, "2025-09-18");
    assert_eq!(parsed[0].status, TaskStatus::Pending);
    assert!(parsed[0].is_unread);

    assert_eq!(parsed[1].status, TaskStatus::Submitted);
    assert!(!parsed[1].is_unread);
}

#[test]
fn incident_grid_mixing_valid_and_filler_rows() {
    let html = r#"
        <table><tbody>
            <tr class="sinResultados"><td colspan="8">No se han encontrado incidencias</td></tr>
            <tr>
                <td data-dataCell="true"><span>22/09/2025</span></td>
                <td data-dataCell="true"><span>08:30</span></td>
                <td data-dataCell="true"><span title='Geograf&iacute;a e Historia'>Geograf&iacute;a...</span></td>
                <td data-dataCell="true"><span>3&ordm; ESO A</span></td>
                <td data-dataCell="true"><span>Falta de asistencia</span></td>
                <td data-dataCell="true"><span></span></td>
                <td data-dataCell="true"><span>Visita m&eacute;dica</span></td>
                <td data-dataCell="true"><span>Justificada</span></td>
            </tr>
        </tbody></table>
    "#;

    let parsed = incidents::parse_incidents(html);
    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed[0].subject_name, "Geografía e Historia");
    assert_eq!(parsed[0].kind, "Falta de asistencia");
    assert_eq!(parsed[0].day_comment, "Visita médica");
    assert_eq!(parsed[0].justification, "Justificada");
}

#[test]
fn context_script_with_numeric_and_nested_values() {
    let script = r#"
        (function () { var x = { otro: '{no cuenta}' }; })();
        SM.Edu.Contexto = SM.Edu.Contexto || {
            CdnUrl: 'https://cdn.educamos.com/v2/',
            NombreColegio: 'IES Valle del Jerte',
            LogoColegio: '/logos/ies.png',
            Variante: 'familias',
            RoleBase: 3,
            RolColegioId: 'rc-77',
            CalendarioEscolar: 'cal-25-26',
            Culture: 'es-ES',
            PersonaId: 'p-1024',
            PersonaIdiomaId: 1,
            Extras: { anidado: [1, 2, { hondo: true }] }
        };
    "#;

    let parsed = context::parse_context(script).unwrap();
    assert_eq!(parsed.school_name, "IES Valle del Jerte");
    assert_eq!(parsed.role_base, "3");
    assert_eq!(parsed.person_language_id, "1");
    assert_eq!(parsed.calendar_id, "cal-25-26");
}

#[test]
fn grades_for_a_subject_with_no_notebook() {
    let response = serde_json::from_value(serde_json::json!({
        "entidadesCalificables": [
            {
                "id": "fr",
                "nombre": "Francés",
                "reducido": "FR",
                "tipo": 0,
                "entidadCalificableAlumnoEvaluacionIndice": 9
            }
        ],
        "sistemasCalificacion": [],
        "puestaNotasCuadernoPorEntidadCalificablePadreIndice": {}
    }))
    .unwrap();

    let subjects = grades::subject_evaluations(&response);
    assert_eq!(subjects.len(), 1);
    assert_eq!(subjects[0].grade, None);
    assert!(!subjects[0].is_passed);

    let detail = grades::subject_detail(&response, "fr").unwrap();
    assert!(detail.grades.is_empty());
    assert_eq!(detail.main_grade, None);
}

#[test]
fn empty_week_normalizes_to_an_empty_schedule() {
    let raw = serde_json::from_value(serde_json::json!({
        "FechaInicio": "06/07/2026",
        "FechaFin": "12/07/2026",
        "EventosEscolares": []
    }))
    .unwrap();

    let week = schedule::normalize_week(raw);
    assert_eq!(week.week_start, "06/07/2026");
    assert!(week.events.is_empty());
}

#[test]
fn announcement_detail_with_decimal_entities() {
    let html = r#"
        <input type="hidden" id="Anuncio" value="Jornada de puertas abiertas" />
        <div id="AvisoDetalleHome">
            <p>S&#225;bado 27, de 10 a 13.</p>
            <p>Entrada por el patio &#xE9;ste a&ntilde;o.</p>
        </div>
    "#;

    let detail = announcements::parse_announcement_detail(html, "av-7");
    assert_eq!(detail.title, "Jornada de puertas abiertas");
    assert_eq!(
        detail.content,
        "Sábado 27, de 10 a 13.\nEntrada por el patio éste año."
    );
    assert!(detail.attachment_url.is_none());
}
