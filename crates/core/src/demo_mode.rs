//! Demo-mode flag resolution.
//!
//! The flag arrives in two shapes: a multipart string at upload time and an
//! optional JSON boolean at processing time. Both are folded into
//! [`DemoMode`] so that "absent" is never confused with "false".

use serde::{Deserialize, Serialize};

/// A demo-mode request as the caller expressed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DemoMode {
    Enabled,
    Disabled,
    #[default]
    Unspecified,
}

impl DemoMode {
    /// Interpret the multipart `demoMode` form value.
    ///
    /// Only the literal `"false"` disables demo mode. Any other value,
    /// including an empty string, enables it.
    pub fn from_form_value(value: Option<&str>) -> Self {
        match value {
            None => DemoMode::Unspecified,
            Some("false") => DemoMode::Disabled,
            Some(_) => DemoMode::Enabled,
        }
    }

    /// Resolve against a fallback used when nothing was specified.
    pub fn resolve(self, fallback: bool) -> bool {
        match self {
            DemoMode::Enabled => true,
            DemoMode::Disabled => false,
            DemoMode::Unspecified => fallback,
        }
    }
}

impl From<Option<bool>> for DemoMode {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => DemoMode::Enabled,
            Some(false) => DemoMode::Disabled,
            None => DemoMode::Unspecified,
        }
    }
}

/// Body of a processing request. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessOptions {
    #[serde(default)]
    pub demo_mode: Option<bool>,
}

impl ProcessOptions {
    pub fn demo_mode(&self) -> DemoMode {
        self.demo_mode.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_value_only_literal_false_disables() {
        assert_eq!(DemoMode::from_form_value(None), DemoMode::Unspecified);
        assert_eq!(DemoMode::from_form_value(Some("false")), DemoMode::Disabled);
        assert_eq!(DemoMode::from_form_value(Some("true")), DemoMode::Enabled);
        assert_eq!(DemoMode::from_form_value(Some("FALSE")), DemoMode::Enabled);
        assert_eq!(DemoMode::from_form_value(Some("0")), DemoMode::Enabled);
        assert_eq!(DemoMode::from_form_value(Some("")), DemoMode::Enabled);
    }

    #[test]
    fn unspecified_takes_the_fallback() {
        assert!(DemoMode::Unspecified.resolve(true));
        assert!(!DemoMode::Unspecified.resolve(false));
        assert!(DemoMode::Enabled.resolve(false));
        assert!(!DemoMode::Disabled.resolve(true));
    }

    #[test]
    fn process_options_parse_from_json() {
        let opts: ProcessOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts.demo_mode(), DemoMode::Unspecified);
        let opts: ProcessOptions = serde_json::from_str(r#"{"demoMode":false}"#).unwrap();
        assert_eq!(opts.demo_mode(), DemoMode::Disabled);
    }
}
