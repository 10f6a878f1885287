// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Card password derivation from subject attributes.

use cardwerk_core::error::{CardwerkError, Result};
use cardwerk_core::node::Node;
use tracing::{instrument, warn};

use crate::classify::{Classified, classify};

/// Derive the card password.
///
/// `field_list` is a pipe-delimited list of subject fields. Each field that
/// resolves contributes exactly `segment_length` characters, in configured
/// order. Fields that are absent, lack a `template_language` entry, or hold
/// no ASCII alphanumerics contribute nothing.
#[instrument(skip_all, fields(template_language = template_language, segment_length = segment_length))]
pub fn derive_password(
    subject: &Node,
    field_list: Option<&str>,
    template_language: &str,
    segment_length: usize,
) -> Result<String> {
    let list = field_list
        .ok_or_else(|| CardwerkError::Configuration("required property missing".into()))?;
    if segment_length == 0 {
        return Err(CardwerkError::Configuration(
            "password segment length must be positive".into(),
        ));
    }

    let mut password = String::new();
    for field in list.split('|').map(str::trim).filter(|f| !f.is_empty()) {
        let Some(classified) = subject.get(field).and_then(classify) else {
            warn!(field, "password field absent from subject");
            continue;
        };

        let raw = match &classified {
            Classified::Localized(_) => classified.for_language(template_language),
            Classified::Embedded(value) => value.as_deref(),
            Classified::Scalar(value) => Some(value.as_str()),
        };
        let Some(raw) = raw else {
            warn!(field, "password field has no usable value");
            continue;
        };

        match password_segment(raw, segment_length) {
            Some(segment) => password.push_str(&segment),
            None => warn!(field, "password field has no alphanumeric characters"),
        }
    }
    Ok(password)
}

/// Reduce one value to exactly `length` ASCII alphanumerics, repeating the
/// value when it is too short. `None` when nothing alphanumeric remains.
pub fn password_segment(value: &str, length: usize) -> Option<String> {
    let cleaned: Vec<char> = value.chars().filter(char::is_ascii_alphanumeric).collect();
    if cleaned.is_empty() {
        return None;
    }
    Some(cleaned.iter().cycle().take(length).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject() -> Node {
        Node::parse(
            r#"{
                "fullName": [{"language":"eng","value":"Ada Lovelace"},{"language":"ara","value":"عدا"}],
                "dateOfBirth": "1990/01/01",
                "postalCode": {"value": "N1 9GU"},
                "initial": "a",
                "punctuation": "--//--"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn segments_concatenate_in_order() {
        let password =
            derive_password(&subject(), Some("fullName|dateOfBirth|postalCode"), "eng", 4)
                .unwrap();
        assert_eq!(password, "AdaL1990N19G");
    }

    #[test]
    fn short_values_repeat_to_segment_length() {
        assert_eq!(password_segment("a", 4).as_deref(), Some("aaaa"));
        assert_eq!(password_segment("ab", 4).as_deref(), Some("abab"));
        assert_eq!(password_segment("a-b-c", 4).as_deref(), Some("abca"));
        assert_eq!(password_segment("x", 1).as_deref(), Some("x"));
    }

    #[test]
    fn length_is_segment_times_resolved_fields() {
        let password = derive_password(
            &subject(),
            Some(" fullName | initial ||dateOfBirth "),
            "eng",
            4,
        )
        .unwrap();
        assert_eq!(password, "AdaLaaaa1990");
        assert_eq!(password.len(), 4 * 3);
    }

    #[test]
    fn unresolvable_fields_contribute_nothing() {
        let password = derive_password(
            &subject(),
            Some("missing|punctuation|fullName"),
            "fra",
            4,
        )
        .unwrap();
        assert!(password.is_empty());
    }

    #[test]
    fn derivation_is_deterministic() {
        let a = derive_password(&subject(), Some("fullName|dateOfBirth"), "eng", 4).unwrap();
        let b = derive_password(&subject(), Some("fullName|dateOfBirth"), "eng", 4).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn missing_fields_property_is_configuration_error() {
        let err = derive_password(&subject(), None, "eng", 4).unwrap_err();
        assert!(matches!(err, CardwerkError::Configuration(ref m) if m == "required property missing"));
    }

    #[test]
    fn zero_segment_length_is_rejected() {
        assert!(matches!(
            derive_password(&subject(), Some("initial"), "eng", 0),
            Err(CardwerkError::Configuration(_))
        ));
    }
}
