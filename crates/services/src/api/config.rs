use std::env;
use std::fmt;

use url::Url;

use super::csrf::{CSRF_COOKIE, cookie_value};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/";

/// Where the API lives and which session credentials to present.
#[derive(Clone)]
pub struct ApiConfig {
    base_url: Url,
    cookie: Option<String>,
    player_name: Option<String>,
}

impl ApiConfig {
    /// # Errors
    ///
    /// Returns `url::ParseError` if `base_url` is not an absolute URL.
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        // `Url::join` drops the last segment unless the base ends with a slash.
        let normalized = if base_url.ends_with('/') {
            base_url.to_owned()
        } else {
            format!("{base_url}/")
        };
        Ok(Self {
            base_url: Url::parse(&normalized)?,
            cookie: None,
            player_name: None,
        })
    }

    /// Read `VOCAB_API_URL`, `VOCAB_COOKIE` and `VOCAB_PLAYER_NAME`.
    ///
    /// # Errors
    ///
    /// Returns `url::ParseError` if `VOCAB_API_URL` is set to an invalid URL.
    pub fn from_env() -> Result<Self, url::ParseError> {
        let base_url = env::var("VOCAB_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        let config = Self::new(&base_url)?;
        let cookie = env::var("VOCAB_COOKIE").ok().filter(|v| !v.trim().is_empty());
        let player_name = env::var("VOCAB_PLAYER_NAME")
            .ok()
            .filter(|v| !v.trim().is_empty());
        Ok(Self {
            cookie,
            player_name,
            ..config
        })
    }

    /// Point at another server, keeping the session credentials.
    ///
    /// # Errors
    ///
    /// Returns `url::ParseError` if `base_url` is not an absolute URL.
    pub fn with_base_url(self, base_url: &str) -> Result<Self, url::ParseError> {
        let base = Self::new(base_url)?;
        Ok(Self {
            base_url: base.base_url,
            ..self
        })
    }

    #[must_use]
    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = Some(cookie.into());
        self
    }

    #[must_use]
    pub fn with_player_name(mut self, name: impl Into<String>) -> Self {
        self.player_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    #[must_use]
    pub fn player_name(&self) -> Option<&str> {
        self.player_name.as_deref()
    }

    /// Token from the `csrftoken` cookie; `None` when no cookie is configured.
    #[must_use]
    pub fn csrf_token(&self) -> Option<String> {
        self.cookie
            .as_deref()
            .and_then(|cookies| cookie_value(cookies, CSRF_COOKIE))
    }

    /// # Errors
    ///
    /// Returns `url::ParseError` if `path` cannot be joined onto the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base_url.join(path.trim_start_matches('/'))
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("cookie", &self.cookie.as_ref().map(|_| "<redacted>"))
            .field("player_name", &self.player_name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_keep_base_path() {
        let config = ApiConfig::new("https://example.test/app").unwrap();
        let url = config.endpoint("/api/progress/submit_quiz/").unwrap();
        assert_eq!(url.as_str(), "https://example.test/app/api/progress/submit_quiz/");
    }

    #[test]
    fn csrf_token_comes_from_cookie() {
        let config = ApiConfig::new(DEFAULT_API_URL)
            .unwrap()
            .with_cookie("sessionid=s; csrftoken=abc");
        assert_eq!(config.csrf_token().as_deref(), Some("abc"));
        assert!(ApiConfig::new(DEFAULT_API_URL).unwrap().csrf_token().is_none());
    }

    #[test]
    fn debug_redacts_cookie() {
        let config = ApiConfig::new(DEFAULT_API_URL)
            .unwrap()
            .with_cookie("csrftoken=secret");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn base_url_override_keeps_credentials() {
        let config = ApiConfig::new(DEFAULT_API_URL)
            .unwrap()
            .with_cookie("csrftoken=abc")
            .with_player_name("nok")
            .with_base_url("http://quiz.local:9000")
            .unwrap();
        assert_eq!(config.base_url().as_str(), "http://quiz.local:9000/");
        assert_eq!(config.csrf_token().as_deref(), Some("abc"));
        assert_eq!(config.player_name(), Some("nok"));
    }
}
