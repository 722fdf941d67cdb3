//! Printable results for the inspection commands.

use authstate_core::auth::{has_auth_params, ActiveNavigator, ErrorSource, ResponseMode};
use serde::Serialize;
use url::Url;

/// Every tag a state or error context can carry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagList {
    pub navigators: Vec<&'static str>,
    pub error_sources: Vec<SourceTag>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceTag {
    pub tag: &'static str,
    pub carries_args: bool,
}

impl TagList {
    pub fn collect() -> Self {
        let navigators: Vec<&'static str> =
            ActiveNavigator::ALL.iter().map(ActiveNavigator::as_str).collect();
        let error_sources = ErrorSource::TAGS
            .iter()
            .map(|&tag| SourceTag {
                tag,
                carries_args: navigators.contains(&tag),
            })
            .collect();

        Self {
            navigators,
            error_sources,
        }
    }
}

/// Outcome of `check-url`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlCheck {
    pub url: Url,
    pub response_mode: ResponseMode,
    pub has_auth_params: bool,
}

impl UrlCheck {
    pub fn new(url: Url, response_mode: ResponseMode) -> Self {
        let has_auth_params = has_auth_params(&url, response_mode);
        Self {
            url,
            response_mode,
            has_auth_params,
        }
    }
}
