//! The session credential: an opaque cookie string captured at login.

use std::fmt;

/// Serialized browser cookies (`name=value; name=value`) proving an
/// authenticated Educamos session.
///
/// The value is pass-through: nothing in this crate inspects individual
/// cookies. `Debug` is redacted so the credential can never leak through
/// error chains or request logs.
#[derive(Clone)]
pub struct SessionCookie(String);

impl SessionCookie {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw `Cookie` header value for upstream requests.
    pub fn header_value(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for SessionCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionCookie(..redacted..)")
    }
}
