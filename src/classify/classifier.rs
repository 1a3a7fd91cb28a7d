// vscdb-scrub - Credential Key Classifier
//
// Two rules, applied in order:
//   1. Key rule: exact match on the main key, then case-insensitive marker
//      substrings. Decides the initial verdict.
//   2. Value rule: a JSON object value carrying any detection field upgrades
//      the verdict to credential. It never downgrades.
// A value that looks like JSON but does not parse leaves the verdict alone.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::config::TargetProfile;

/// Why an entry was (or was not) classified as credential data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    MainCredential,
    /// Any marker match. Covers UI state such as views and panels as well
    /// as keys under the main key's namespace, e.g.
    /// `Blackboxapp.blackboxagent.cache`.
    ExtensionUi,
    ContainsCredentialFields,
    Unclear,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Reason::MainCredential => "Main credentials",
            Reason::ExtensionUi => "Extension key (UI or namespace marker)",
            Reason::ContainsCredentialFields => "Contains credential data",
            Reason::Unclear => "Not clearly related to credentials",
        };
        f.write_str(label)
    }
}

/// Verdict for one entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub key: String,
    pub is_credential: bool,
    pub reason: Reason,
    /// True when the key rule alone identified the entry.
    pub key_matched: bool,
    /// Allowlisted fields from the value, in profile order. Empty unless
    /// the entry is credential data with a JSON object value.
    pub preview: Vec<(String, Value)>,
}

impl ClassificationResult {
    /// Credential verdict reached only through the value rule.
    pub fn is_value_only(&self) -> bool {
        self.is_credential && !self.key_matched
    }
}

pub struct Classifier {
    profile: TargetProfile,
    markers: Vec<String>,
}

impl Classifier {
    pub fn new(profile: TargetProfile) -> Self {
        let markers = profile.key_markers.iter().map(|m| m.to_lowercase()).collect();
        Self { profile, markers }
    }

    pub fn profile(&self) -> &TargetProfile {
        &self.profile
    }

    /// Key rule only.
    pub fn key_reason(&self, key: &str) -> Reason {
        if !self.profile.main_key.is_empty() && key == self.profile.main_key {
            return Reason::MainCredential;
        }
        let lowered = key.to_lowercase();
        if self.markers.iter().any(|m| lowered.contains(m.as_str())) {
            return Reason::ExtensionUi;
        }
        Reason::Unclear
    }

    /// True if the key rule identifies `key` as the extension's.
    pub fn matches_key(&self, key: &str) -> bool {
        self.key_reason(key) != Reason::Unclear
    }

    pub fn classify(&self, key: &str, value: Option<&str>) -> ClassificationResult {
        let mut reason = self.key_reason(key);
        let key_matched = reason != Reason::Unclear;
        let mut is_credential = key_matched;
        let mut preview = Vec::new();

        if let Some(Value::Object(map)) = value.and_then(parse_json_like) {
            if self
                .profile
                .detection_fields
                .iter()
                .any(|field| map.contains_key(field))
            {
                is_credential = true;
                reason = Reason::ContainsCredentialFields;
            }

            if is_credential {
                preview = self
                    .profile
                    .preview_fields
                    .iter()
                    .filter_map(|field| map.get(field).map(|v| (field.clone(), v.clone())))
                    .collect();
            }
        }

        ClassificationResult {
            key: key.to_string(),
            is_credential,
            reason,
            key_matched,
            preview,
        }
    }

    /// Keys from a live listing that still match the key rule.
    pub fn remaining<'k>(&self, current_keys: &'k [String]) -> Vec<&'k str> {
        current_keys
            .iter()
            .filter(|k| self.matches_key(k))
            .map(String::as_str)
            .collect()
    }

    /// True iff no key in the listing matches the key rule.
    pub fn verify_removal(&self, current_keys: &[String]) -> bool {
        self.remaining(current_keys).is_empty()
    }
}

/// Parse text that starts with `{` or `[` after trimming. Anything else, or
/// a parse failure, yields `None`.
fn parse_json_like(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
        return None;
    }
    serde_json::from_str(trimmed).ok()
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn classifier() -> Classifier {
        Classifier::new(TargetProfile::default())
    }

    #[test]
    fn test_main_key_is_credential() {
        let result = classifier().classify("Blackboxapp.blackboxagent", Some("anything"));
        assert!(result.is_credential);
        assert_eq!(result.reason, Reason::MainCredential);
        assert!(result.key_matched);
        assert!(result.preview.is_empty());
    }

    #[test]
    fn test_main_key_with_null_value() {
        let result = classifier().classify("Blackboxapp.blackboxagent", None);
        assert!(result.is_credential);
        assert_eq!(result.reason, Reason::MainCredential);
    }

    #[test]
    fn test_extension_ui_key_is_credential() {
        let result = classifier().classify(
            "workbench.view.extension.blackboxai-dev-ActivityBar.state.hidden",
            None,
        );
        assert!(result.is_credential);
        assert_eq!(result.reason, Reason::ExtensionUi);
    }

    #[test]
    fn test_main_key_namespace_uses_marker_label() {
        let result = classifier().classify("Blackboxapp.blackboxagent.cache", None);
        assert!(result.is_credential);
        assert!(result.key_matched);
        assert_eq!(result.reason, Reason::ExtensionUi);
        assert_eq!(result.reason.to_string(), "Extension key (UI or namespace marker)");
    }

    #[test]
    fn test_marker_match_ignores_case() {
        let result = classifier().classify("BLACKBOXAI-DEV.sidebar", None);
        assert_eq!(result.reason, Reason::ExtensionUi);
    }

    #[test]
    fn test_value_fields_upgrade_unrelated_key() {
        let result = classifier().classify("unrelated.key", Some(r#"{"userId":"abc"}"#));
        assert!(result.is_credential);
        assert_eq!(result.reason, Reason::ContainsCredentialFields);
        assert_eq!(result.preview, vec![("userId".to_string(), json!("abc"))]);
        assert!(result.is_value_only());
    }

    #[test]
    fn test_plain_text_is_unclear() {
        let result = classifier().classify("unrelated.key", Some("plain text"));
        assert!(!result.is_credential);
        assert_eq!(result.reason, Reason::Unclear);
        assert!(result.preview.is_empty());
    }

    #[test]
    fn test_broken_json_falls_back_to_key_rule() {
        let c = classifier();
        let unrelated = c.classify("unrelated.key", Some("{not valid json"));
        assert!(!unrelated.is_credential);
        assert_eq!(unrelated.reason, Reason::Unclear);

        let main = c.classify("Blackboxapp.blackboxagent", Some("{not valid json"));
        assert!(main.is_credential);
        assert_eq!(main.reason, Reason::MainCredential);
    }

    #[test]
    fn test_value_rule_never_downgrades() {
        let result = classifier().classify(
            "workbench.view.extension.blackboxai-dev",
            Some(r#"{"somethingElse":1}"#),
        );
        assert!(result.is_credential);
        assert_eq!(result.reason, Reason::ExtensionUi);
    }

    #[test]
    fn test_key_match_with_fields_reports_field_reason() {
        let result = classifier().classify("Blackboxapp.blackboxagent", Some(r#"{"userId":"u1"}"#));
        assert!(result.is_credential);
        assert!(result.key_matched);
        assert!(!result.is_value_only());
        assert_eq!(result.reason, Reason::ContainsCredentialFields);
    }

    #[test]
    fn test_preview_follows_profile_order_and_skips_absent() {
        let value = r#"{"installed":true,"other":"x","apiProvider":"bb","userId":"u"}"#;
        let result = classifier().classify("Blackboxapp.blackboxagent", Some(value));
        let fields: Vec<&str> = result.preview.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(fields, vec!["userId", "apiProvider", "installed"]);
    }

    #[test]
    fn test_json_array_does_not_upgrade() {
        let result = classifier().classify("unrelated.key", Some(r#"[{"userId":"abc"}]"#));
        assert!(!result.is_credential);
    }

    #[test]
    fn test_leading_whitespace_is_trimmed() {
        let result = classifier().classify("unrelated.key", Some("  \n{\"apiProvider\":\"x\"}  "));
        assert!(result.is_credential);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let c = classifier();
        let inputs = [
            ("Blackboxapp.blackboxagent", Some(r#"{"userId":"u1","installed":true}"#)),
            ("unrelated.key", Some("plain")),
            ("blackboxai-dev.view", None),
            ("x", Some("{broken")),
        ];
        for (key, value) in inputs {
            assert_eq!(c.classify(key, value), c.classify(key, value));
        }
    }

    #[test]
    fn test_verify_removal_checks_key_rule_only() {
        let c = classifier();
        let clean = vec!["other.setting".to_string(), "unrelated.key".to_string()];
        assert!(c.verify_removal(&clean));

        let dirty = vec!["other.setting".to_string(), "Blackboxapp.blackboxagent".to_string()];
        assert!(!c.verify_removal(&dirty));
        assert_eq!(c.remaining(&dirty), vec!["Blackboxapp.blackboxagent"]);
    }

    #[test]
    fn test_custom_profile_substitutes_literals() {
        let profile = TargetProfile {
            main_key: "acme.session".to_string(),
            key_markers: vec!["acme-dev.".to_string()],
            detection_fields: vec!["token".to_string()],
            preview_fields: vec!["token".to_string()],
            ..TargetProfile::default()
        };
        let c = Classifier::new(profile);

        assert_eq!(c.key_reason("acme.session"), Reason::MainCredential);
        assert_eq!(c.key_reason("Blackboxapp.blackboxagent"), Reason::Unclear);
        assert!(c.classify("x", Some(r#"{"token":"t"}"#)).is_credential);
        assert!(!c.classify("x", Some(r#"{"userId":"u"}"#)).is_credential);
    }
}
