//! htmx wire vocabulary: request/response header names and the client configuration object.
//!
//! <https://htmx.org/reference/>

use serde::Serialize;

/// Header names exchanged with htmx.
pub mod headers {
    // Request headers.
    pub const BOOSTED: &str = "HX-Boosted";
    pub const CURRENT_URL: &str = "HX-Current-URL";
    pub const HISTORY_RESTORE_REQUEST: &str = "HX-History-Restore-Request";
    pub const PROMPT: &str = "HX-Prompt";
    pub const REQUEST: &str = "HX-Request";
    pub const TARGET: &str = "HX-Target";
    pub const TRIGGER_NAME: &str = "HX-Trigger-Name";
    pub const TRIGGER: &str = "HX-Trigger";

    // Response headers.
    pub const LOCATION: &str = "HX-Location";
    pub const PUSH_URL: &str = "HX-Push-Url";
    pub const REDIRECT: &str = "HX-Redirect";
    pub const REFRESH: &str = "HX-Refresh";
    pub const REPLACE_URL: &str = "HX-Replace-Url";
    pub const RESWAP: &str = "HX-Reswap";
    pub const RETARGET: &str = "HX-Retarget";
    pub const RESELECT: &str = "HX-Reselect";
    pub const TRIGGER_AFTER_SETTLE: &str = "HX-Trigger-After-Settle";
    pub const TRIGGER_AFTER_SWAP: &str = "HX-Trigger-After-Swap";

    /// All valid htmx request headers.
    ///
    /// <https://htmx.org/reference/#request_headers>
    pub const REQUEST_HEADERS: &[&str] = &[
        BOOSTED,
        CURRENT_URL,
        HISTORY_RESTORE_REQUEST,
        PROMPT,
        REQUEST,
        TARGET,
        TRIGGER_NAME,
        TRIGGER,
    ];

    /// All valid htmx response headers.
    ///
    /// <https://htmx.org/reference/#response_headers>
    pub const RESPONSE_HEADERS: &[&str] = &[
        LOCATION,
        PUSH_URL,
        REDIRECT,
        REFRESH,
        REPLACE_URL,
        RESWAP,
        RETARGET,
        RESELECT,
        TRIGGER_AFTER_SETTLE,
        TRIGGER_AFTER_SWAP,
        TRIGGER,
    ];
}

/// How htmx treats a class of HTTP response codes. htmx walks the list in order and uses the
/// first entry whose `code` regular expression matches the status.
///
/// <https://htmx.org/docs/#response-handling>
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseHandling {
    pub code: String,
    pub swap: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub error: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub ignore_title: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub select: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swap_override: Option<String>,
}

impl ResponseHandling {
    pub fn new(code: impl Into<String>, swap: bool) -> Self {
        Self { code: code.into(), swap, ..Self::default() }
    }

    #[must_use]
    pub const fn error(mut self) -> Self {
        self.error = true;
        self
    }
}

/// The htmx client configuration, delivered through `<meta name="htmx-config">`.
///
/// <https://htmx.org/docs/#config>
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HtmxConfig {
    pub allow_nested_oob_swaps: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_style_nonce: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_script_nonce: Option<String>,
    pub include_indicator_styles: bool,
    /// Must stay off while `HX-Request` selects partial responses, otherwise a history cache
    /// miss would be answered with a fragment.
    pub history_restore_as_hx_request: bool,
    pub global_view_transitions: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub response_handling: Vec<ResponseHandling>,
}

impl Default for HtmxConfig {
    fn default() -> Self {
        Self {
            allow_nested_oob_swaps: false,
            inline_style_nonce: None,
            inline_script_nonce: None,
            include_indicator_styles: false,
            history_restore_as_hx_request: false,
            global_view_transitions: true,
            response_handling: vec![
                ResponseHandling::new("204", false),
                ResponseHandling::new("[23]..", true),
                // Rendered not-found pages are meant to be shown.
                ResponseHandling::new("404", true).error(),
                ResponseHandling::new("[45]..", false).error(),
            ],
        }
    }
}

impl HtmxConfig {
    /// Sets the nonce htmx attaches to the inline scripts and styles it creates.
    #[must_use]
    pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
        let nonce = nonce.into();
        self.inline_style_nonce = Some(nonce.clone());
        self.inline_script_nonce = Some(nonce);
        self
    }
}
