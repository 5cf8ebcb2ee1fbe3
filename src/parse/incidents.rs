//! Parser for the attendance/behavior incident grid.

use html_scraper::{Html, Selector};
use std::collections::HashMap;
use std::sync::LazyLock;

use super::dates::parse_spanish_date;
use super::html::{alphanumeric_only, span_title_or_text};
use crate::models::Incident;

static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tbody tr").unwrap());
static CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"td[data-datacell="true"]"#).unwrap());

/// Parse the incident grid fragment, newest first.
///
/// The grid has no row ids, so one is synthesized from date, time, and
/// subject; same-slot duplicates get a running numeric suffix so ids stay
/// unique within a response.
pub fn parse_incidents(html: &str) -> Vec<Incident> {
    let document = Html::parse_fragment(html);
    let mut incidents = Vec::new();
    let mut seen_ids: HashMap<String, u32> = HashMap::new();

    for row in document.select(&ROW) {
        let cells: Vec<String> = row
            .select(&CELL)
            .map(|cell| span_title_or_text(&cell.html()))
            .collect();
        if cells.len() < 8 {
            continue;
        }

        let date = cells[0].clone();
        let Some(full_date) = parse_spanish_date(&date) else {
            continue;
        };
        let time = cells[1].clone();
        let subject_name = cells[2].clone();

        let base_id = format!(
            "{}{}{}",
            alphanumeric_only(&date),
            alphanumeric_only(&time),
            alphanumeric_only(&subject_name)
        );
        let count = seen_ids.entry(base_id.clone()).or_insert(0);
        let id = if *count == 0 {
            base_id.clone()
        } else {
            format!("{base_id}-{count}")
        };
        *count += 1;

        incidents.push(Incident {
            id,
            date,
            time,
            subject_name,
            class_name: cells[3].clone(),
            kind: cells[4].clone(),
            subject_comment: cells[5].clone(),
            day_comment: cells[6].clone(),
            justification: cells[7].clone(),
            full_date,
        });
    }

    incidents.sort_by(|a, b| b.full_date.cmp(&a.full_date));
    incidents
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(date: &str, time: &str, subject: &str) -> String {
        format!(
            r#"<tr>
                <td data-dataCell="true"><span>{date}</span></td>
                <td data-dataCell="true"><span>{time}</span></td>
                <td data-dataCell="true"><span title='{subject}'>{subject}</span></td>
                <td data-dataCell="true">4º ESO B</td>
                <td data-dataCell="true">Retraso</td>
                <td data-dataCell="true"><span title='Llegó 10 minutos tarde'>Llegó 10...</span></td>
                <td data-dataCell="true"></td>
                <td data-dataCell="true">Sin justificar</td>
            </tr>"#
        )
    }

    fn grid(rows: &[String]) -> String {
        format!("<table><tbody>{}</tbody></table>", rows.join(""))
    }

    #[test]
    fn parses_rows_newest_first() {
        let html = grid(&[
            row("02/09/2025", "09:00", "Matemáticas"),
            row("15/09/2025", "12:30", "Lengua"),
        ]);
        let incidents = parse_incidents(&html);
        assert_eq!(incidents.len(), 2);
        assert_eq!(incidents[0].subject_name, "Lengua");
        assert_eq!(incidents[0].id, "150920251230Lengua");
        assert_eq!(incidents[1].subject_comment, "Llegó 10 minutos tarde");
    }

    #[test]
    fn duplicate_slots_get_distinct_ids() {
        let html = grid(&[
            row("02/09/2025", "09:00", "Lengua"),
            row("02/09/2025", "09:00", "Lengua"),
            row("02/09/2025", "09:00", "Lengua"),
        ]);
        let ids: Vec<String> = parse_incidents(&html).into_iter().map(|i| i.id).collect();
        assert_eq!(
            ids,
            [
                "020920250900Lengua",
                "020920250900Lengua-1",
                "020920250900Lengua-2"
            ]
        );
    }

    #[test]
    fn skips_rows_without_a_parseable_date() {
        let html = grid(&[row("No hay incidencias", "", "")]);
        assert!(parse_incidents(&html).is_empty());
    }

    #[test]
    fn skips_short_rows() {
        let html = r#"<table><tbody><tr><td data-dataCell="true">02/09/2025</td></tr></tbody></table>"#;
        assert!(parse_incidents(html).is_empty());
    }
}
