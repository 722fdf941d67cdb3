//! Argument shapes of the seven navigator operations.
//!
//! The state contract stores these verbatim so a failed call can be retried
//! with the same arguments. Well-known fields are typed; anything else the
//! library accepts lands in `extra` and survives a round-trip.

use serde::{Deserialize, Serialize};

type JsonMap = serde_json::Map<String, serde_json::Value>;

/// How a redirect navigation replaces the current location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedirectMethod {
    Replace,
    Assign,
}

/// Which window a redirect navigation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedirectTarget {
    #[serde(rename = "self")]
    Current,
    Top,
}

/// Geometry and behavior of a popup window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupWindowFeatures {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_popup_window_after_in_seconds: Option<u32>,
    #[serde(flatten)]
    pub extra: JsonMap,
}

/// Authorization request parameters shared by the signin navigators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SigninRequestArgs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acr_values: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_locales: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<serde_json::Value>,
    #[serde(
        default,
        rename = "extraQueryParams",
        skip_serializing_if = "Option::is_none"
    )]
    pub extra_query_params: Option<JsonMap>,
    #[serde(
        default,
        rename = "extraTokenParams",
        skip_serializing_if = "Option::is_none"
    )]
    pub extra_token_params: Option<JsonMap>,
}

/// End-session request parameters shared by the signout navigators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignoutRequestArgs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token_hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_logout_redirect_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<serde_json::Value>,
    #[serde(
        default,
        rename = "extraQueryParams",
        skip_serializing_if = "Option::is_none"
    )]
    pub extra_query_params: Option<JsonMap>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigninPopupArgs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popup_window_features: Option<PopupWindowFeatures>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popup_window_target: Option<String>,
    #[serde(flatten)]
    pub request: SigninRequestArgs,
    #[serde(flatten)]
    pub extra: JsonMap,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigninRedirectArgs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_method: Option<RedirectMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_target: Option<RedirectTarget>,
    #[serde(flatten)]
    pub request: SigninRequestArgs,
    #[serde(flatten)]
    pub extra: JsonMap,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigninSilentArgs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub silent_request_timeout_in_seconds: Option<u64>,
    #[serde(flatten)]
    pub request: SigninRequestArgs,
    #[serde(flatten)]
    pub extra: JsonMap,
}

/// Direct username/password grant. Both credentials are required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigninResourceOwnerCredentialsArgs {
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_user_info: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_token_params: Option<JsonMap>,
    #[serde(flatten)]
    pub extra: JsonMap,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignoutPopupArgs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popup_window_features: Option<PopupWindowFeatures>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popup_window_target: Option<String>,
    #[serde(flatten)]
    pub request: SignoutRequestArgs,
    #[serde(flatten)]
    pub extra: JsonMap,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignoutRedirectArgs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_method: Option<RedirectMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_target: Option<RedirectTarget>,
    #[serde(flatten)]
    pub request: SignoutRequestArgs,
    #[serde(flatten)]
    pub extra: JsonMap,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignoutSilentArgs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub silent_request_timeout_in_seconds: Option<u64>,
    #[serde(flatten)]
    pub request: SignoutRequestArgs,
    #[serde(flatten)]
    pub extra: JsonMap,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_args_serialize_to_empty_object() {
        assert_eq!(serde_json::to_value(SigninPopupArgs::default()).unwrap(), json!({}));
        assert_eq!(serde_json::to_value(SignoutSilentArgs::default()).unwrap(), json!({}));
    }

    #[test]
    fn signin_redirect_args_use_library_field_names() {
        let args: SigninRedirectArgs = serde_json::from_value(json!({
            "redirectMethod": "assign",
            "redirectTarget": "self",
            "redirect_uri": "https://app.example.com/callback",
            "extraQueryParams": { "kc_idp_hint": "github" },
        }))
        .unwrap();

        assert_eq!(args.redirect_method, Some(RedirectMethod::Assign));
        assert_eq!(args.redirect_target, Some(RedirectTarget::Current));
        assert_eq!(
            args.request.redirect_uri.as_deref(),
            Some("https://app.example.com/callback")
        );
        assert_eq!(
            args.request.extra_query_params.unwrap()["kc_idp_hint"],
            json!("github")
        );
        assert!(args.extra.is_empty());
    }

    #[test]
    fn unknown_fields_are_preserved() {
        let raw = json!({
            "popupWindowFeatures": { "width": 500, "height": 600, "menubar": "no" },
            "scope": "openid",
            "dpopJkt": "thumbprint",
        });
        let args: SigninPopupArgs = serde_json::from_value(raw.clone()).unwrap();

        let features = args.popup_window_features.as_ref().unwrap();
        assert_eq!(features.width, Some(500));
        assert_eq!(features.extra["menubar"], json!("no"));
        assert_eq!(args.request.scope.as_deref(), Some("openid"));
        assert_eq!(args.extra["dpopJkt"], json!("thumbprint"));

        assert_eq!(serde_json::to_value(&args).unwrap(), raw);
    }

    #[test]
    fn resource_owner_credentials_require_username_and_password() {
        let missing = serde_json::from_value::<SigninResourceOwnerCredentialsArgs>(json!({
            "username": "alice",
        }));
        assert!(missing.is_err());

        let args: SigninResourceOwnerCredentialsArgs = serde_json::from_value(json!({
            "username": "alice",
            "password": "hunter2",
            "skipUserInfo": true,
        }))
        .unwrap();
        assert_eq!(args.skip_user_info, Some(true));
    }

    #[test]
    fn signout_args_keep_post_logout_redirect() {
        let args: SignoutRedirectArgs = serde_json::from_value(json!({
            "post_logout_redirect_uri": "https://app.example.com/",
            "id_token_hint": "eyJ...",
        }))
        .unwrap();
        assert_eq!(
            args.request.post_logout_redirect_uri.as_deref(),
            Some("https://app.example.com/")
        );
        assert_eq!(args.request.id_token_hint.as_deref(), Some("eyJ..."));
    }
}
