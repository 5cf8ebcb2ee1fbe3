//! Parser for the `SM.Edu.Contexto` bootstrap script.
//!
//! Every authenticated Educamos page loads a script assigning a JS object
//! literal with the session's school, role, and person identifiers. The
//! assignment doubles as the session-validity check: an expired session gets
//! a login page instead, with no anchor in sight.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use super::object_literal;
use crate::models::ContextData;

static ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"SM\.Edu\.Contexto\s*=\s*SM\.Edu\.Contexto\s*\|\|\s*\{").unwrap());

#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    /// No `SM.Edu.Contexto` assignment in the body. This is the expired
    /// session answering with a login page, not a parse failure.
    #[error("context anchor not found in response")]
    AnchorMissing,
    #[error("context literal is malformed: {0}")]
    Malformed(#[source] anyhow::Error),
}

pub fn parse_context(script: &str) -> Result<ContextData, ContextError> {
    let anchor = ANCHOR.find(script).ok_or(ContextError::AnchorMissing)?;

    // The match ends on the literal's opening brace.
    let brace_start = anchor.end() - 1;
    let literal = balanced_braces(&script[brace_start..])
        .ok_or_else(|| ContextError::Malformed(anyhow::anyhow!("unbalanced braces")))?;

    let value = object_literal::parse(literal).map_err(ContextError::Malformed)?;

    Ok(ContextData {
        cdn_url: field(&value, "CdnUrl"),
        school_name: field(&value, "NombreColegio"),
        logo: field(&value, "LogoColegio"),
        variant: field(&value, "Variante"),
        role_base: field(&value, "RoleBase"),
        role_school_id: field(&value, "RolColegioId"),
        calendar_id: field(&value, "CalendarioEscolar"),
        culture: field(&value, "Culture"),
        person_id: field(&value, "PersonaId"),
        person_language_id: field(&value, "PersonaIdiomaId"),
    })
}

/// Stringify a literal field regardless of its JS type.
fn field(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Slice out the balanced `{...}` the input starts with, tracking string
/// quoting so braces inside values cannot derail the count.
fn balanced_braces(source: &str) -> Option<&str> {
    let bytes = source.as_bytes();
    if bytes.first() != Some(&b'{') {
        return None;
    }

    let mut depth = 0usize;
    let mut in_string: Option<u8> = None;
    let mut escaped = false;

    for (idx, &b) in bytes.iter().enumerate() {
        if let Some(quote) = in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == quote {
                in_string = None;
            }
            continue;
        }
        match b {
            b'\'' | b'"' => in_string = Some(b),
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&source[..=idx]);
                }
            }
            _ => {}
        }
    }
    None
}
