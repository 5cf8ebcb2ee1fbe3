//! A permissive parser for JavaScript object literals.
//!
//! The context bootstrap script embeds its payload as a JS literal, not
//! JSON: keys are unquoted, strings are single-quoted, and trailing commas
//! appear. Evaluating it is out of the question, so this walks the literal
//! directly into a [`serde_json::Value`].

use anyhow::{Result, bail};
use serde_json::{Map, Number, Value};

pub fn parse(source: &str) -> Result<Value> {
    let mut parser = Parser {
        chars: source.chars().collect(),
        pos: 0,
    };
    parser.skip_whitespace();
    let value = parser.value()?;
    parser.skip_whitespace();
    if parser.pos < parser.chars.len() {
        bail!(
            "trailing content after literal at offset {} of {}",
            parser.pos,
            parser.chars.len()
        );
    }
    Ok(value)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(c) => bail!("expected '{expected}', found '{c}' at offset {}", self.pos - 1),
            None => bail!("expected '{expected}', found end of input"),
        }
    }

    fn value(&mut self) -> Result<Value> {
        self.skip_whitespace();
        match self.peek() {
            Some('{') => self.object(),
            Some('[') => self.array(),
            Some('\'') | Some('"') => Ok(Value::String(self.quoted_string()?)),
            Some(c) if c == '-' || c.is_ascii_digit() => self.number(),
            Some(c) if is_ident_char(c) => Ok(self.ident_value()),
            Some(c) => bail!("unexpected '{c}' at offset {}", self.pos),
            None => bail!("unexpected end of input"),
        }
    }

    fn object(&mut self) -> Result<Value> {
        self.expect('{')?;
        let mut map = Map::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('}') => {
                    self.pos += 1;
                    return Ok(Value::Object(map));
                }
                Some(',') => {
                    self.pos += 1;
                    continue;
                }
                Some(_) => {
                    let key = self.key()?;
                    self.skip_whitespace();
                    self.expect(':')?;
                    let value = self.value()?;
                    map.insert(key, value);
                }
                None => bail!("unterminated object"),
            }
        }
    }

    fn array(&mut self) -> Result<Value> {
        self.expect('[')?;
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(']') => {
                    self.pos += 1;
                    return Ok(Value::Array(items));
                }
                Some(',') => {
                    self.pos += 1;
                    continue;
                }
                Some(_) => items.push(self.value()?),
                None => bail!("unterminated array"),
            }
        }
    }

    fn key(&mut self) -> Result<String> {
        match self.peek() {
            Some('\'') | Some('"') => self.quoted_string(),
            Some(c) if is_ident_char(c) => Ok(self.ident()),
            Some(c) => bail!("invalid object key starting with '{c}'"),
            None => bail!("unexpected end of input in object key"),
        }
    }

    fn quoted_string(&mut self) -> Result<String> {
        let quote = self.bump().unwrap_or_default();
        let mut out = String::new();
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('u') => {
                        let mut code = 0u32;
                        for _ in 0..4 {
                            let digit = self
                                .bump()
                                .and_then(|c| c.to_digit(16))
                                .ok_or_else(|| anyhow::anyhow!("invalid \\u escape"))?;
                            code = code * 16 + digit;
                        }
                        out.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
                    }
                    Some(c) => out.push(c),
                    None => bail!("unterminated escape in string"),
                },
                Some(c) => out.push(c),
                None => bail!("unterminated string"),
            }
        }
    }

    fn number(&mut self) -> Result<Value> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.pos += 1;
        }
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == '.' {
                self.pos += 1;
            } else {
                break;
            }
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        if let Ok(i) = text.parse::<i64>() {
            return Ok(Value::Number(i.into()));
        }
        match text.parse::<f64>().ok().and_then(Number::from_f64) {
            Some(n) => Ok(Value::Number(n)),
            None => bail!("invalid number '{text}'"),
        }
    }

    fn ident(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if is_ident_char(c) {
                self.pos += 1;
            } else {
                break;
            }
        }
        self.chars[start..self.pos].iter().collect()
    }

    /// Bare identifiers as values: the JS keywords map to their JSON
    /// equivalents, anything else degrades to its source text.
    fn ident_value(&mut self) -> Value {
        let word = self.ident();
        match word.as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            "null" | "undefined" => Value::Null,
            _ => Value::String(word),
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || c == '.'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_unquoted_keys_and_single_quotes() {
        let value = parse("{ CdnUrl: 'https://cdn.example.com/', PersonaId: 'abc-123' }").unwrap();
        assert_eq!(value["CdnUrl"], "https://cdn.example.com/");
        assert_eq!(value["PersonaId"], "abc-123");
    }

    #[test]
    fn parses_nested_structures_and_keywords() {
        let value = parse(
            "{ a: { b: [1, 2.5, -3] }, activo: true, nada: null, pendiente: undefined, }",
        )
        .unwrap();
        assert_eq!(value["a"]["b"][1], 2.5);
        assert_eq!(value["activo"], true);
        assert!(value["nada"].is_null());
        assert!(value["pendiente"].is_null());
    }

    #[test]
    fn handles_escapes_inside_strings() {
        let value = parse(r"{ nombre: 'Colegio \'San José\'' }").unwrap();
        assert_eq!(value["nombre"], "Colegio 'San José'");
    }

    #[test]
    fn rejects_trailing_garbage() {
        assert!(parse("{ a: 1 }; window.foo = 2;").is_err());
        assert!(parse("{ a: ").is_err());
    }
}
