use authstate_core::auth::{matches_callback_url, ErrorPolicy, ResponseMode};
use url::Url;

use crate::error::ConfigError;

/// Controller configuration.
#[derive(Debug, Clone, Default)]
pub struct ControllerConfig {
    /// When a recorded error is cleared.
    pub error_policy: ErrorPolicy,
    /// Leave auth-callback URLs for the host to process.
    pub skip_signin_callback: bool,
    /// Where the provider puts authorization callback parameters.
    pub response_mode: ResponseMode,
    /// Location the provider returns to after an end-session request.
    pub signout_callback_url: Option<Url>,
}

impl ControllerConfig {
    /// Load from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `AUTH_ERROR_POLICY`: `clear` or `retain` (default: `clear`)
    /// - `AUTH_SKIP_SIGNIN_CALLBACK`: `true`/`1` to skip callback processing (default: false)
    /// - `AUTH_RESPONSE_MODE`: `query` or `fragment` (default: `query`)
    /// - `AUTH_SIGNOUT_CALLBACK_URL`: post-logout redirect URL (optional)
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to a value that does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to a value that does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let error_policy = parse_var(&lookup, "AUTH_ERROR_POLICY", |v| {
            v.parse::<ErrorPolicy>().map_err(|e| e.to_string())
        })?
        .unwrap_or_default();

        let skip_signin_callback = parse_var(&lookup, "AUTH_SKIP_SIGNIN_CALLBACK", parse_flag)?
            .unwrap_or(false);

        let response_mode = parse_var(&lookup, "AUTH_RESPONSE_MODE", |v| {
            v.parse::<ResponseMode>().map_err(|e| e.to_string())
        })?
        .unwrap_or_default();

        let signout_callback_url = parse_var(&lookup, "AUTH_SIGNOUT_CALLBACK_URL", |v| {
            Url::parse(v).map_err(|e| e.to_string())
        })?;

        Ok(Self {
            error_policy,
            skip_signin_callback,
            response_mode,
            signout_callback_url,
        })
    }

    /// Whether `url` is the configured end-session callback location.
    pub fn is_signout_callback(&self, url: &Url) -> bool {
        self.signout_callback_url
            .as_ref()
            .is_some_and(|expected| matches_callback_url(url, expected))
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    parse: impl Fn(&str) -> Result<T, String>,
) -> Result<Option<T>, ConfigError> {
    match lookup(var) {
        Some(value) if !value.trim().is_empty() => parse(value.trim())
            .map(Some)
            .map_err(|reason| ConfigError::Invalid {
                var,
                value,
                reason,
            }),
        _ => Ok(None),
    }
}

fn parse_flag(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(format!("expected true/false, got {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = ControllerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.error_policy, ErrorPolicy::ClearOnBegin);
        assert!(!config.skip_signin_callback);
        assert_eq!(config.response_mode, ResponseMode::Query);
        assert!(config.signout_callback_url.is_none());
    }

    #[test]
    fn reads_every_variable() {
        let config = ControllerConfig::from_lookup(lookup_from(&[
            ("AUTH_ERROR_POLICY", "retain"),
            ("AUTH_SKIP_SIGNIN_CALLBACK", "1"),
            ("AUTH_RESPONSE_MODE", "fragment"),
            ("AUTH_SIGNOUT_CALLBACK_URL", "https://app.example.com/signed-out"),
        ]))
        .unwrap();

        assert_eq!(config.error_policy, ErrorPolicy::Retain);
        assert!(config.skip_signin_callback);
        assert_eq!(config.response_mode, ResponseMode::Fragment);
        assert_eq!(
            config.signout_callback_url.unwrap().as_str(),
            "https://app.example.com/signed-out"
        );
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config =
            ControllerConfig::from_lookup(lookup_from(&[("AUTH_ERROR_POLICY", "  ")])).unwrap();
        assert_eq!(config.error_policy, ErrorPolicy::ClearOnBegin);
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = ControllerConfig::from_lookup(lookup_from(&[("AUTH_SKIP_SIGNIN_CALLBACK", "yes")]))
            .unwrap_err();
        assert!(err.to_string().contains("AUTH_SKIP_SIGNIN_CALLBACK"));

        let err = ControllerConfig::from_lookup(lookup_from(&[(
            "AUTH_SIGNOUT_CALLBACK_URL",
            "not a url",
        )]))
        .unwrap_err();
        assert!(err.to_string().contains("AUTH_SIGNOUT_CALLBACK_URL"));
    }

    #[test]
    fn signout_callback_detection() {
        let config = ControllerConfig {
            signout_callback_url: Some(Url::parse("https://app.example.com/signed-out").unwrap()),
            ..Default::default()
        };
        assert!(config.is_signout_callback(
            &Url::parse("https://app.example.com/signed-out?state=abc").unwrap()
        ));
        assert!(!config.is_signout_callback(&Url::parse("https://app.example.com/").unwrap()));
        assert!(!ControllerConfig::default()
            .is_signout_callback(&Url::parse("https://app.example.com/signed-out").unwrap()));
    }
}
