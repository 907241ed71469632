#![forbid(unsafe_code)]

//! Page contract configuration.
//!
//! The defaults reproduce the portal's stylesheet and template contract:
//! element ids, class names, border colors, timings and user-facing texts.
//! A host may override any subset by passing JSON to [`UiConfig::from_json`];
//! missing fields keep their defaults.

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::UiError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// How long a toast stays fully visible.
    pub toast_duration_ms: u64,
    /// Delay between the opacity fade and node removal.
    pub toast_fade_ms: u64,
    /// Viewport widths strictly above this are treated as desktop.
    pub mobile_breakpoint_px: u32,
    pub colors: BorderColors,
    pub ids: ElementIds,
    pub classes: ClassNames,
    pub texts: Texts,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            toast_duration_ms: 5_000,
            toast_fade_ms: 300,
            mobile_breakpoint_px: 768,
            colors: BorderColors::default(),
            ids: ElementIds::default(),
            classes: ClassNames::default(),
            texts: Texts::default(),
        }
    }
}

impl UiConfig {
    /// Parse a (possibly partial) JSON override.
    pub fn from_json(input: &str) -> Result<Self, UiError> {
        serde_json::from_str(input).map_err(|e| UiError::Config(e.to_string()))
    }

    #[must_use]
    pub const fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }

    #[must_use]
    pub const fn toast_fade(&self) -> Duration {
        Duration::from_millis(self.toast_fade_ms)
    }
}

/// Inline `border-color` values used for field feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BorderColors {
    pub error: String,
    pub neutral: String,
    pub success: String,
}

impl Default for BorderColors {
    fn default() -> Self {
        Self {
            error: "#e74c3c".into(),
            neutral: "#ecf0f1".into(),
            success: "#27ae60".into(),
        }
    }
}

/// Element ids the page template is expected to provide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementIds {
    pub menu_button: String,
    pub sidebar: String,
    pub overlay: String,
    pub close_button: String,
    pub join_form: String,
    pub class_code: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            menu_button: "mobileMenuBtn".into(),
            sidebar: "mobileSidebar".into(),
            overlay: "sidebarOverlay".into(),
            close_button: "sidebarClose".into(),
            join_form: "join-class-form".into(),
            class_code: "class_code".into(),
        }
    }
}

/// Class names shared with the stylesheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassNames {
    pub message: String,
    pub sidebar_link: String,
    pub active: String,
    pub sidebar_open: String,
    pub error_message: String,
    pub loading: String,
}

impl Default for ClassNames {
    fn default() -> Self {
        Self {
            message: "message".into(),
            sidebar_link: "sidebar-link".into(),
            active: "active".into(),
            sidebar_open: "sidebar-open".into(),
            error_message: "error-message".into(),
            loading: "loading".into(),
        }
    }
}

/// User-facing strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Texts {
    pub field_required: String,
    pub fill_required_fields: String,
    pub enter_class_code: String,
    pub copied: String,
    pub copy_failed: String,
    pub loading: String,
}

impl Default for Texts {
    fn default() -> Self {
        Self {
            field_required: "This field is required".into(),
            fill_required_fields: "Please fill in all required fields".into(),
            enter_class_code: "Please enter a class code".into(),
            copied: "Copied to clipboard".into(),
            copy_failed: "Copy failed".into(),
            loading: "Loading...".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = UiConfig::from_json(
            r#"{"mobile_breakpoint_px": 1024, "texts": {"copied": "Copied!"}}"#,
        )
        .unwrap();
        assert_eq!(cfg.mobile_breakpoint_px, 1024);
        assert_eq!(cfg.texts.copied, "Copied!");
        assert_eq!(cfg.texts.copy_failed, "Copy failed");
        assert_eq!(cfg.toast_duration(), Duration::from_millis(5_000));
        assert_eq!(cfg.ids, ElementIds::default());
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = UiConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, UiError::Config(_)));
    }
}
