use serde::{Deserialize, Serialize};
use url::{form_urlencoded, Url};

use super::CoreError;

/// Where the authorization server puts callback parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    #[default]
    Query,
    Fragment,
}

impl std::str::FromStr for ResponseMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "query" => Ok(Self::Query),
            "fragment" => Ok(Self::Fragment),
            other => Err(CoreError::UnknownResponseMode(other.to_string())),
        }
    }
}

/// Checks whether a URL is an authorization callback.
///
/// A callback carries a non-empty `state` together with a non-empty `code`
/// (success) or `error` (failure).
///
/// # Examples
///
/// ```
/// use authstate_core::auth::{has_auth_params, ResponseMode};
/// use url::Url;
///
/// let callback = Url::parse("https://app.example.com/cb?code=abc&state=xyz").unwrap();
/// assert!(has_auth_params(&callback, ResponseMode::Query));
///
/// let plain = Url::parse("https://app.example.com/cb?code=abc").unwrap();
/// assert!(!has_auth_params(&plain, ResponseMode::Query));
/// ```
pub fn has_auth_params(url: &Url, mode: ResponseMode) -> bool {
    let raw = match mode {
        ResponseMode::Query => url.query(),
        ResponseMode::Fragment => url.fragment(),
    };
    let Some(raw) = raw else {
        return false;
    };

    let mut has_code_or_error = false;
    let mut has_state = false;
    for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
        if value.is_empty() {
            continue;
        }
        match key.as_ref() {
            "code" | "error" => has_code_or_error = true,
            "state" => has_state = true,
            _ => {}
        }
    }

    has_code_or_error && has_state
}

/// Checks whether `url` points at the callback location `expected`.
///
/// Scheme, host, port and path must match; query and fragment are ignored.
pub fn matches_callback_url(url: &Url, expected: &Url) -> bool {
    url.scheme() == expected.scheme()
        && url.host_str() == expected.host_str()
        && url.port_or_known_default() == expected.port_or_known_default()
        && url.path().trim_end_matches('/') == expected.path().trim_end_matches('/')
}
