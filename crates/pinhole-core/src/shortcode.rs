use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt::Display;

/// The identifier a short link is addressed by.
///
/// A code is either supplied by the user or produced by a generator. The
/// engine never re-interprets it: uniqueness is the only rule enforced on
/// it, and that is the registry's job.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortCode(String);

impl ShortCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Extracts the code from a navigation path of shape `/{shortcode}`.
    ///
    /// Returns `None` when the path carries no code (e.g. `/`).
    pub fn from_path(path: &str) -> Option<Self> {
        let code = path.trim().trim_start_matches('/').trim_end_matches('/');
        if code.is_empty() {
            None
        } else {
            Some(Self::new(code))
        }
    }

    /// Generates the full shortened URL based on the provided base URL.
    pub fn to_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self)
    }

    /// Returns the short code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for ShortCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ShortCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ShortCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ShortCode {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_url_joins_base_and_code() {
        let code = ShortCode::new("abc123");
        assert_eq!(code.to_url("http://localhost:3000"), "http://localhost:3000/abc123");
        assert_eq!(code.to_url("http://localhost:3000/"), "http://localhost:3000/abc123");
    }

    #[test]
    fn from_path_strips_slashes() {
        assert_eq!(ShortCode::from_path("/abc123"), Some(ShortCode::new("abc123")));
        assert_eq!(ShortCode::from_path("abc123/"), Some(ShortCode::new("abc123")));
        assert_eq!(ShortCode::from_path("/"), None);
        assert_eq!(ShortCode::from_path(""), None);
    }

    #[test]
    fn serializes_as_plain_string() {
        let code = ShortCode::new("mycode");
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"mycode\"");
        let back: ShortCode = serde_json::from_str("\"mycode\"").unwrap();
        assert_eq!(back, code);
    }
}
