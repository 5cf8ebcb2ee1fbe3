//! Small helpers shared by the HTML-fragment parsers.

use htmlize::unescape;
use regex::Regex;
use std::sync::LazyLock;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static BLOCK_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>|</p>|</div>").unwrap());
static SPAN_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<span[^>]*\btitle\s*=\s*['"]([^'"]*)['"]"#).unwrap());
static MULTI_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());

/// Decode HTML entities (named, decimal, and hex).
pub fn decode_entities(text: &str) -> String {
    unescape(text).into_owned()
}

/// Flatten a fragment to its visible text: tags dropped, entities decoded,
/// whitespace collapsed.
pub fn inner_text(fragment: &str) -> String {
    let stripped = TAG.replace_all(fragment, " ");
    let decoded = decode_entities(&stripped);
    MULTI_SPACE
        .replace_all(decoded.trim(), " ")
        .replace('\n', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Flatten a fragment preserving paragraph structure: block-level closers and
/// `<br>` become newlines, everything else like [`inner_text`].
pub fn block_text(fragment: &str) -> String {
    let with_breaks = BLOCK_BREAK.replace_all(fragment, "\n");
    let stripped = TAG.replace_all(&with_breaks, " ");
    let decoded = decode_entities(&stripped);

    decoded
        .lines()
        .map(|line| MULTI_SPACE.replace_all(line.trim(), " ").into_owned())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prefer a `<span title='...'>` tooltip over the cell text. Educamos
/// truncates grid cells visually but keeps the full value in the tooltip.
pub fn span_title_or_text(cell: &str) -> String {
    if let Some(caps) = SPAN_TITLE.captures(cell) {
        let title = decode_entities(&caps[1]).trim().to_string();
        if !title.is_empty() {
            return title;
        }
    }
    inner_text(cell)
}

/// Lowercase a name into `Title Case`, the way display names are rendered.
pub fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strip everything but ASCII alphanumerics. Used to build stable synthetic
/// row ids out of display text.
pub fn alphanumeric_only(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_text_flattens_markup() {
        assert_eq!(
            inner_text("<span> Matem&aacute;ticas   <b>I</b></span>"),
            "Matemáticas I"
        );
    }

    #[test]
    fn block_text_keeps_paragraphs() {
        let html = "<div>Primera l&iacute;nea<br>Segunda</div><p>Tercera</p>";
        assert_eq!(block_text(html), "Primera línea\nSegunda\nTercera");
    }

    #[test]
    fn decodes_numeric_and_named_entities() {
        assert_eq!(decode_entities("Espa&ntilde;a &#241; &#xF1;"), "España ñ ñ");
    }

    #[test]
    fn tooltip_beats_truncated_text() {
        let cell = "<td><span title='Comentario completo de la materia'>Comentario co...</span></td>";
        assert_eq!(span_title_or_text(cell), "Comentario completo de la materia");
        assert_eq!(span_title_or_text("<td>sin tooltip</td>"), "sin tooltip");
    }

    #[test]
    fn title_cases_shouted_names() {
        assert_eq!(title_case("MARÍA GARCÍA LÓPEZ"), "María García López");
    }

    #[test]
    fn id_fragments_drop_punctuation() {
        assert_eq!(alphanumeric_only("05/09/2025 10:30"), "050920251030");
    }
}
