//! Parsers for the homework grid and the task detail popup.

use html_scraper::{Html, Selector};
use regex::Regex;
use std::sync::LazyLock;

use super::dates::spanish_to_iso;
use super::html::{block_text, decode_entities, inner_text};
use crate::models::{Task, TaskDetail, TaskStatus};

static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr[data-id]").unwrap());
static SPAN: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td span").unwrap());
static DATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{2}/\d{2}/\d{4}").unwrap());

/// Parse the task grid fragment into rows.
///
/// Rows missing any of subject, title, or due date are dropped: those are
/// grid chrome (headers, empty-state banners) that happen to be `<tr>`s.
pub fn parse_task_grid(html: &str) -> Vec<Task> {
    let document = Html::parse_fragment(html);
    let mut tasks = Vec::new();

    for row in document.select(&ROW) {
        let Some(id) = row.value().attr("data-id").map(str::trim) else {
            continue;
        };
        if id.is_empty() {
            continue;
        }

        let texts: Vec<String> = row
            .select(&SPAN)
            .map(|span| inner_text(&span.html()))
            .filter(|text| !text.is_empty())
            .collect();

        let due_date = texts.iter().find(|text| DATE.is_match(text));
        let (Some(subject), Some(title), Some(due_date)) =
            (texts.first(), texts.get(1), due_date)
        else {
            continue;
        };

        let row_html = row.html();
        let status = if row_html.contains("checkok.png") {
            TaskStatus::Submitted
        } else {
            TaskStatus::Pending
        };
        let is_unread = row
            .value()
            .attr("data-leido")
            .is_some_and(|v| v.eq_ignore_ascii_case("false"));

        tasks.push(Task {
            id: id.to_string(),
            subject: subject.clone(),
            title: title.clone(),
            due_date: spanish_to_iso(due_date),
            status,
            is_unread,
        });
    }

    tasks
}

static DUE_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"id=["']fechaEntregaDia["'][^>]*>([^<]*)"#).unwrap());
static STATUS_ICON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<img[^>]*title=['"]([^'"]*ntregad[^'"]*)['"]"#).unwrap());

/// Parse the free-form detail popup. Everything is best-effort: the popup's
/// layout varies by task type, so absent fields stay empty.
pub fn parse_task_detail(html: &str) -> TaskDetail {
    let due_date = DUE_DATE
        .captures(html)
        .map(|c| decode_entities(c[1].trim()))
        .unwrap_or_default();

    TaskDetail {
        title: labeled_value(html, "Título").unwrap_or_default(),
        description: labeled_section(html, "Descripción").unwrap_or_default(),
        due_date: spanish_to_iso(&due_date),
        professor: labeled_value(html, "Profesores de la materia"),
        last_modified: labeled_value(html, "última modificación"),
        status: STATUS_ICON
            .captures(html)
            .map(|c| decode_entities(c[1].trim())),
    }
}

/// The first text chunk following a label, across intervening tags.
/// Matches both `<label>Título</label><span>X</span>` and `<b>Título:</b> X`.
fn labeled_value(html: &str, label: &str) -> Option<String> {
    let pattern = format!(
        r"(?is){}\s*:?\s*(?:</[^>]*>\s*)*(?:<[^>]*>\s*)*([^<]+)",
        label_pattern(label)
    );
    let re = Regex::new(&pattern).ok()?;
    let captured = decode_entities(re.captures(html)?[1].trim());
    (!captured.is_empty()).then_some(captured)
}

/// The block following a label, up to the next label or the fragment end,
/// flattened with paragraph breaks preserved.
fn labeled_section(html: &str, label: &str) -> Option<String> {
    let re = Regex::new(&format!(r"(?i){}", label_pattern(label))).ok()?;
    let found = re.find(html)?;
    let rest = &html[found.end()..];

    let end = Regex::new(r"(?i)<label\b")
        .ok()
        .and_then(|re| re.find(rest))
        .map_or(rest.len(), |m| m.start());
    // Drop the closing tag of the label's own element before flattening.
    let body = rest[..end].trim_start_matches(|c| c == ':' || c == ' ');

    let text = block_text(body);
    (!text.is_empty()).then_some(text)
}

/// Labels appear both literally and entity-encoded; match either spelling.
fn label_pattern(label: &str) -> String {
    regex::escape(label)
        .replace('í', "(?:í|&iacute;|&#237;)")
        .replace('ó', "(?:ó|&oacute;|&#243;)")
        .replace('ú', "(?:ú|&uacute;|&#250;)")
}
