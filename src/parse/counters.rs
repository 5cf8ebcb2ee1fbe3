//! Normalization for home-screen counters and header-bell marks.

use crate::educamos::models::{RawCounter, RawUnreadMark};
use crate::models::{Counter, UnreadMark};

/// Map a counter type code to its category name. Codes are a bitmask-style
/// enumeration on the wire; unknown ones pass through tagged with the code
/// so new categories show up instead of vanishing.
fn counter_name(code: i64) -> String {
    match code {
        1 => "circulares".to_string(),
        2 => "entrevistas".to_string(),
        4 => "reuniones".to_string(),
        32 => "calificaciones".to_string(),
        64 => "incidencias".to_string(),
        1024 => "encuestas".to_string(),
        other => format!("unknown_{other}"),
    }
}

/// An expired session makes the counters endpoint answer HTTP 200 with the
/// HTML login page instead of JSON; a body opening with markup is that
/// signal, not a parse failure.
pub fn body_is_login_page(body: &str) -> bool {
    body.trim_start().starts_with('<')
}

pub fn normalize_counters(raw: Vec<RawCounter>) -> Vec<Counter> {
    raw.into_iter()
        .map(|c| Counter {
            kind: c.tipo,
            count: c.contador,
            name: counter_name(c.tipo),
            show: c.mostrar,
        })
        .collect()
}

pub fn normalize_unread_marks(raw: Vec<RawUnreadMark>) -> Vec<UnreadMark> {
    raw.into_iter()
        .enumerate()
        .map(|(idx, m)| UnreadMark {
            id: m.id.filter(|id| !id.is_empty()).unwrap_or_else(|| format!("mark-{idx}")),
            date: m.fecha,
            text: m.texto,
            url: m.url.filter(|u| !u.is_empty()),
            is_active: m.activo,
            is_featured: m.destacado,
        })
        .collect()
}
