//! Parsers for the bulletin-board announcement list and detail views.

use html_scraper::{Html, Selector};
use regex::Regex;
use std::sync::LazyLock;

use super::html::{block_text, decode_entities, inner_text};
use super::object_literal;
use crate::models::{Announcement, AnnouncementDetail};

static ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr[data-parametrosfila]").unwrap());
static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());
static SPAN: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span").unwrap());

/// Parse the announcement board page.
///
/// Each row carries its request parameters in a `data-parametrosfila`
/// attribute holding a JS array of `{name, value}` pairs; `idSeleccion` is
/// the announcement id and `marcarLeido` tells whether opening it would mark
/// it read, i.e. whether it is still unread.
pub fn parse_announcements(html: &str) -> Vec<Announcement> {
    let document = Html::parse_document(html);
    let mut announcements = Vec::new();

    for row in document.select(&ROW) {
        let Some(params) = row.value().attr("data-parametrosfila") else {
            continue;
        };
        let Some(id) = row_param(params, "idSeleccion") else {
            continue;
        };
        let unread = row_param(params, "marcarLeido")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"));

        let cells: Vec<_> = row.select(&CELL).collect();
        let cell_text = |idx: usize| {
            cells
                .get(idx)
                .and_then(|cell| cell.select(&SPAN).next())
                .map(|span| inner_text(&span.html()))
                .unwrap_or_default()
        };

        let title = cell_text(1);
        if title.is_empty() {
            continue;
        }

        let is_bold = row.html().contains("font-weight: bold");
        announcements.push(Announcement {
            id,
            title,
            date: cell_text(3),
            category: "general".to_string(),
            is_new: unread || is_bold,
        });
    }

    announcements
}

/// Look up one named value in a row's `data-parametrosfila` array.
fn row_param(params: &str, name: &str) -> Option<String> {
    let parsed = object_literal::parse(params.trim()).ok()?;
    parsed.as_array()?.iter().find_map(|entry| {
        (entry.get("name")?.as_str()? == name)
            .then(|| entry.get("value")?.as_str().map(str::to_string))
            .flatten()
    })
}

static TITLE_INPUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<input[^>]*id=["']Anuncio["'][^>]*value=["']([^"']*)["']"#).unwrap()
});
static BODY_DIV: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<div[^>]*id=["']AvisoDetalleHome["'][^>]*>(.*)"#).unwrap()
});
static ATTACHMENT_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<div[^>]*class=["'][^"']*adjunto-aviso-detalle"#).unwrap());
static ATTACHMENT_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a[^>]*href=['"]([^'"]+)['"][^>]*data-enlace=['"]true['"][^>]*>(.*?)</a>"#)
        .unwrap()
});

/// Parse the announcement detail fragment.
pub fn parse_announcement_detail(html: &str, id: &str) -> AnnouncementDetail {
    let title = TITLE_INPUT
        .captures(html)
        .map(|c| decode_entities(c[1].trim()))
        .unwrap_or_default();

    let content = BODY_DIV
        .captures(html)
        .map(|c| {
            let body = c.get(1).map_or("", |m| m.as_str());
            // The attachment box sits inside the detail div; cut before it.
            let end = ATTACHMENT_SECTION
                .find(body)
                .map_or(body.len(), |m| m.start());
            block_text(&body[..end])
        })
        .unwrap_or_default();

    let (attachment_url, attachment_name) = match ATTACHMENT_LINK.captures(html) {
        Some(caps) => {
            let name = inner_text(&caps[2]);
            (
                Some(decode_entities(caps[1].trim())),
                (!name.is_empty()).then_some(name),
            )
        }
        None => (None, None),
    };

    AnnouncementDetail {
        id: id.to_string(),
        title,
        content,
        attachment_url,
        attachment_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOARD: &str = r#"
        <table><tbody>
            <tr data-parametrosfila="[{ name: 'idSeleccion', value: 'av-1' }, { name: 'marcarLeido', value: 'True' }]">
                <td></td>
                <td><span>Reunión de padres</span></td>
                <td><img src="/img/clip.png" /></td>
                <td><span>10/09/2025</span></td>
            </tr>
            <tr data-parametrosfila="[{ name: 'idSeleccion', value: 'av-2' }, { name: 'marcarLeido', value: 'False' }]" style="font-weight: bold">
                <td></td>
                <td><span>Horario de septiembre</span></td>
                <td></td>
                <td><span>02/09/2025</span></td>
            </tr>
            <tr data-parametrosfila="[{ name: 'idSeleccion', value: 'av-3' }, { name: 'marcarLeido', value: 'False' }]">
                <td></td>
                <td><span>Aviso antiguo</span></td>
                <td></td>
                <td><span>01/09/2025</span></td>
            </tr>
            <tr><td>fila sin parámetros</td></tr>
        </tbody></table>
    "#;

    #[test]
    fn parses_rows_with_parameters() {
        let list = parse_announcements(BOARD);
        assert_eq!(list.len(), 3);
        assert_eq!(list[0].id, "av-1");
        assert_eq!(list[0].title, "Reunión de padres");
        assert_eq!(list[0].date, "10/09/2025");
        assert_eq!(list[0].category, "general");
    }

    #[test]
    fn unread_or_bold_rows_are_new() {
        let list = parse_announcements(BOARD);
        assert!(list[0].is_new); // unread
        assert!(list[1].is_new); // read but bold
        assert!(!list[2].is_new);
    }

    const DETAIL: &str = r#"
        <input type="hidden" id="Anuncio" value="Excursi&oacute;n al museo" />
        <div id="AvisoDetalleHome">
            <p>Salida el viernes a las 9:00.</p>
            <p>Traer almuerzo.</p>
            <div class="adjunto-aviso-detalle">
                <a href='/TablonAnuncios/DescargarAdjunto?avisoId=av-1' data-enlace='true'>autorizacion.pdf</a>
            </div>
        </div>
    "#;

    #[test]
    fn detail_extracts_title_body_and_attachment() {
        let detail = parse_announcement_detail(DETAIL, "av-1");
        assert_eq!(detail.id, "av-1");
        assert_eq!(detail.title, "Excursión al museo");
        assert_eq!(detail.content, "Salida el viernes a las 9:00.\nTraer almuerzo.");
        assert_eq!(
            detail.attachment_url.as_deref(),
            Some("/TablonAnuncios/DescargarAdjunto?avisoId=av-1")
        );
        assert_eq!(detail.attachment_name.as_deref(), Some("autorizacion.pdf"));
    }

    #[test]
    fn detail_without_attachment_or_body() {
        let detail = parse_announcement_detail("<div>nada</div>", "av-9");
        assert_eq!(detail.title, "");
        assert_eq!(detail.content, "");
        assert!(detail.attachment_url.is_none());
    }
}
