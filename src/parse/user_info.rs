//! Parser for the profile dropdown fragment.

use html_scraper::{Html, Selector};
use std::sync::LazyLock;

use super::html::{decode_entities, inner_text, title_case};
use crate::models::UserInfo;

static NAME: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p.drop_nombre").unwrap());
static AVATAR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img.imgperfil").unwrap());

/// Extract display name and avatar URL. The dropdown renders the name in
/// all caps; it is title-cased here so the UI never has to.
pub fn parse_user_info(html: &str) -> UserInfo {
    let document = Html::parse_document(html);

    let name = document
        .select(&NAME)
        .next()
        .map(|p| title_case(&inner_text(&p.html())))
        .unwrap_or_default();

    let avatar = document
        .select(&AVATAR)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(|src| decode_entities(src.trim()))
        .unwrap_or_default();

    UserInfo { name, avatar }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_name_and_avatar() {
        let html = r#"
            <div class="drop">
                <p class="drop_nombre">MAR&Iacute;A GARC&Iacute;A L&Oacute;PEZ</p>
                <img class="imgperfil" src="/Fotos/persona.jpg?v=1&amp;s=64" />
            </div>
        "#;
        let info = parse_user_info(html);
        assert_eq!(info.name, "María García López");
        assert_eq!(info.avatar, "/Fotos/persona.jpg?v=1&s=64");
    }

    #[test]
    fn missing_elements_degrade_to_empty() {
        let info = parse_user_info("<div></div>");
        assert_eq!(info.name, "");
        assert_eq!(info.avatar, "");
    }
}
