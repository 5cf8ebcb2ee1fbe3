//! Parser for the school circulars grid.

use html_scraper::{Html, Selector};
use regex::Regex;
use std::sync::LazyLock;

use super::dates::parse_spanish_date;
use super::html::span_title_or_text;
use crate::models::Circular;

static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tbody tr").unwrap());
static CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"td[data-datacell="true"]"#).unwrap());
static CIRCULAR_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"/Comunicacion/Circulares/DescargarAdjuntos\?CircularId=([^'"&]+)"#).unwrap()
});
static FILENAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"filename\*?=(?:UTF-8'')?"?([^";]+)"?"#).unwrap());

/// Parse the circulars grid, newest first. Rows without both a parseable
/// date and a download id are dropped.
pub fn parse_circulars(html: &str) -> Vec<Circular> {
    let document = Html::parse_fragment(html);
    let mut circulars = Vec::new();

    for row in document.select(&ROW) {
        let row_html = row.html();
        let Some(circular_id) = CIRCULAR_ID
            .captures(&row_html)
            .map(|c| c[1].trim().to_string())
            .filter(|id| !id.is_empty())
        else {
            continue;
        };

        let cells: Vec<String> = row
            .select(&CELL)
            .map(|cell| span_title_or_text(&cell.html()))
            .collect();

        let date = cells
            .iter()
            .find(|text| parse_spanish_date(text).is_some())
            .cloned();
        let Some(date) = date else { continue };
        let Some(full_date) = parse_spanish_date(&date) else {
            continue;
        };

        let subject = cells
            .iter()
            .find(|text| !text.is_empty() && **text != date)
            .cloned()
            .unwrap_or_default();

        circulars.push(Circular {
            id: format!("{date}-{circular_id}"),
            circular_id,
            date,
            subject,
            // Unread circulars render bold.
            is_bold: row_html.contains("<b>"),
            full_date,
        });
    }

    circulars.sort_by(|a, b| b.full_date.cmp(&a.full_date));
    circulars
}

/// Filename for a downloaded circular: the upstream Content-Disposition when
/// present, else the subject collapsed into a safe `.pdf` name.
pub fn download_filename(content_disposition: Option<&str>, subject: &str) -> String {
    if let Some(header) = content_disposition
        && let Some(caps) = FILENAME.captures(header)
    {
        let name = caps[1].trim();
        if !name.is_empty() {
            return name.to_string();
        }
    }

    let safe: String = subject
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{safe}.pdf")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(date: &str, subject: &str, circular_id: &str, bold: bool) -> String {
        let subject_cell = if bold {
            format!("<b>{subject}</b>")
        } else {
            subject.to_string()
        };
        format!(
            r#"<tr>
                <td data-dataCell="true"><span>{date}</span></td>
                <td data-dataCell="true"><span>{subject_cell}</span></td>
                <td data-dataCell="true">
                    <a href='/Comunicacion/Circulares/DescargarAdjuntos?CircularId={circular_id}'>PDF</a>
                </td>
            </tr>"#
        )
    }

    fn grid(rows: &[String]) -> String {
        format!("<table><tbody>{}</tbody></table>", rows.join(""))
    }

    #[test]
    fn parses_rows_newest_first_with_bold_flag() {
        let html = grid(&[
            row("01/09/2025", "Inicio de curso", "circ-1", false),
            row("10/09/2025", "Menú de comedor", "circ-2", true),
        ]);
        let circulars = parse_circulars(&html);
        assert_eq!(circulars.len(), 2);
        assert_eq!(circulars[0].subject, "Menú de comedor");
        assert_eq!(circulars[0].circular_id, "circ-2");
        assert_eq!(circulars[0].id, "10/09/2025-circ-2");
        assert!(circulars[0].is_bold);
        assert!(!circulars[1].is_bold);
    }

    #[test]
    fn skips_rows_without_a_download_link_or_date() {
        let no_link = r#"<table><tbody><tr>
            <td data-dataCell="true">01/09/2025</td>
            <td data-dataCell="true">Sin adjunto</td>
        </tr></tbody></table>"#;
        assert!(parse_circulars(no_link).is_empty());

        let no_date = grid(&[row("próximamente", "Algo", "circ-9", false)]);
        assert!(parse_circulars(&no_date).is_empty());
    }

    #[test]
    fn filename_prefers_the_upstream_header() {
        assert_eq!(
            download_filename(Some(r#"attachment; filename="circular_comedor.pdf""#), "X"),
            "circular_comedor.pdf"
        );
        assert_eq!(
            download_filename(None, "Menú de comedor"),
            "Men__de_comedor.pdf"
        );
    }
}
