// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Field-mapping schemas and the attribute flattening built on them.
//
// A mapping names, per logical key, the subject fields that feed it
// (`"f1,f2"`). Two flatteners consume it: the template attribute mapper,
// which fills the `AttributeMap` bound into the card template, and the print
// text file builder, which writes the same selection as pretty JSON.

use cardwerk_core::error::{CardwerkError, Result};
use cardwerk_core::node::Node;
use cardwerk_core::types::AttributeMap;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::classify::{Classified, classify};

const VALUE: &str = "value";

/// Ordered logical key to source field list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMapping {
    entries: Vec<(String, Vec<String>)>,
}

impl FieldMapping {
    /// Parse an identity mapping and select the object under `section`.
    ///
    /// Expected shape: `{ "<section>": { "<key>": { "value": "f1,f2" } } }`.
    pub fn from_identity_json(json: &str, section: &str) -> Result<Self> {
        let doc = parse_schema(json)?;
        let Some(Node::Object(members)) = doc.get(section) else {
            return Err(CardwerkError::MappingParse(format!(
                "identity mapping has no object under '{section}'"
            )));
        };

        let mut entries = Vec::with_capacity(members.len());
        for (key, entry) in members {
            let fields = entry.get(VALUE).and_then(Node::as_str).ok_or_else(|| {
                CardwerkError::MappingParse(format!("mapping entry '{key}' has no string value"))
            })?;
            entries.push((key.clone(), split_fields(fields)));
        }
        Ok(Self { entries })
    }

    /// Parse a flat print text mapping: `{ "<key>": "f1,f2" }`.
    pub fn from_print_text_json(json: &str) -> Result<Self> {
        let doc = parse_schema(json)?;
        let Node::Object(members) = &doc else {
            return Err(CardwerkError::MappingParse(
                "print text mapping is not an object".into(),
            ));
        };

        let mut entries = Vec::with_capacity(members.len());
        for (key, fields) in members {
            let fields = fields.as_str().ok_or_else(|| {
                CardwerkError::MappingParse(format!("print text entry '{key}' is not a string"))
            })?;
            entries.push((key.clone(), split_fields(fields)));
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every source field, in key order then field order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .flat_map(|(_, fields)| fields.iter().map(String::as_str))
    }
}

fn parse_schema(json: &str) -> Result<Node> {
    Node::parse(json).map_err(|e| CardwerkError::MappingParse(e.to_string()))
}

fn split_fields(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_owned)
        .collect()
}

fn require_subject(subject: &Node) -> Result<()> {
    if subject.is_object() {
        Ok(())
    } else {
        Err(CardwerkError::IdentityNotFound(
            "credential subject is not a document".into(),
        ))
    }
}

fn localized_key(field: &str, language: &str) -> String {
    format!("{field}_{language}")
}

// ---------------------------------------------------------------------------
// Template attributes
// ---------------------------------------------------------------------------

/// Flatten the subject into template attributes.
///
/// Language-tagged fields become `<field>_<lang>` for each supported
/// language; other fields keep their own name. Absent and null fields are
/// skipped.
#[instrument(skip_all, fields(keys = mapping.len()))]
pub fn set_template_attributes(
    subject: &Node,
    mapping: &FieldMapping,
    supported_languages: &[String],
    attributes: &mut AttributeMap,
) -> Result<()> {
    require_subject(subject)?;

    for field in mapping.fields() {
        let Some(classified) = subject.get(field).and_then(classify) else {
            continue;
        };
        match classified {
            Classified::Localized(entries) => {
                for entry in entries {
                    if supported_languages.contains(&entry.language) {
                        attributes.insert(localized_key(field, &entry.language), entry.value);
                    }
                }
            }
            Classified::Embedded(Some(value)) | Classified::Scalar(value) => {
                attributes.insert(field, value);
            }
            Classified::Embedded(None) => {
                debug!(field, "embedded value without a value member skipped");
            }
        }
    }

    debug!(attributes = attributes.len(), "template attributes set");
    Ok(())
}

// ---------------------------------------------------------------------------
// Print text file
// ---------------------------------------------------------------------------

/// Build the print text file: a pretty-printed JSON object of the mapped
/// fields.
///
/// Fields the subject lacks are written as `null` so every mapped field
/// appears in the output.
#[instrument(skip_all, fields(keys = mapping.len()))]
pub fn create_text_file(
    subject: &Node,
    mapping: &FieldMapping,
    supported_languages: &[String],
) -> Result<Vec<u8>> {
    require_subject(subject)?;

    let mut out = Map::new();
    for field in mapping.fields() {
        match subject.get(field).and_then(classify) {
            Some(Classified::Localized(entries)) => {
                for entry in entries {
                    if supported_languages.contains(&entry.language) {
                        out.insert(
                            localized_key(field, &entry.language),
                            Value::String(entry.value),
                        );
                    }
                }
            }
            Some(Classified::Embedded(Some(value)) | Classified::Scalar(value)) => {
                out.insert(field.to_owned(), Value::String(value));
            }
            Some(Classified::Embedded(None)) | None => {
                out.insert(field.to_owned(), Value::Null);
            }
        }
    }

    let bytes = serde_json::to_vec_pretty(&Value::Object(out))?;
    debug!(bytes = bytes.len(), "print text file created");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDENTITY_MAPPING: &str = r#"{
        "identity": {
            "name": {"value": "fullName"},
            "dob": {"value": "dateOfBirth"},
            "address": {"value": "addressLine1, addressLine2,"},
            "phone": {"value": "phone"}
        }
    }"#;

    fn subject() -> Node {
        Node::parse(
            r#"{
                "UIN": "4821",
                "fullName": [
                    {"language": "eng", "value": "Ada Lovelace"},
                    {"language": "ara", "value": "عدا"},
                    {"language": "fra", "value": "Ada"}
                ],
                "dateOfBirth": "1990/01/01",
                "addressLine1": "[{\"language\":\"eng\",\"value\":\"12 Analytical St\"}]",
                "addressLine2": {"value": "Flat 3"},
                "phone": null
            }"#,
        )
        .unwrap()
    }

    fn langs(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|c| (*c).to_owned()).collect()
    }

    #[test]
    fn identity_mapping_keeps_order_and_trims_fields() {
        let mapping = FieldMapping::from_identity_json(IDENTITY_MAPPING, "identity").unwrap();
        assert_eq!(mapping.len(), 4);
        let fields: Vec<&str> = mapping.fields().collect();
        assert_eq!(
            fields,
            ["fullName", "dateOfBirth", "addressLine1", "addressLine2", "phone"]
        );
    }

    #[test]
    fn malformed_or_sectionless_mapping_is_parse_error() {
        for (json, section) in [
            ("{not json", "identity"),
            (r#"{"other": {}}"#, "identity"),
            (r#"{"identity": "flat"}"#, "identity"),
            (r#"{"identity": {"name": {"label": "x"}}}"#, "identity"),
        ] {
            assert!(matches!(
                FieldMapping::from_identity_json(json, section),
                Err(CardwerkError::MappingParse(_))
            ));
        }
    }

    #[test]
    fn custom_demographic_section() {
        let json = r#"{"demographics": {"name": {"value": "fullName"}}}"#;
        let mapping = FieldMapping::from_identity_json(json, "demographics").unwrap();
        assert_eq!(mapping.fields().collect::<Vec<_>>(), ["fullName"]);
    }

    #[test]
    fn flattens_only_supported_languages() {
        let mapping = FieldMapping::from_identity_json(IDENTITY_MAPPING, "identity").unwrap();
        let mut attrs = AttributeMap::new();
        set_template_attributes(&subject(), &mapping, &langs(&["eng", "ara"]), &mut attrs)
            .unwrap();

        assert_eq!(attrs.get("fullName_eng"), Some("Ada Lovelace"));
        assert_eq!(attrs.get("fullName_ara"), Some("عدا"));
        assert!(!attrs.contains_key("fullName_fra"));
        assert_eq!(attrs.get("dateOfBirth"), Some("1990/01/01"));
        assert_eq!(attrs.get("addressLine1_eng"), Some("12 Analytical St"));
        assert_eq!(attrs.get("addressLine2"), Some("Flat 3"));
        assert!(!attrs.contains_key("phone"));
    }

    #[test]
    fn non_object_subject_is_identity_not_found() {
        let mapping = FieldMapping::from_identity_json(IDENTITY_MAPPING, "identity").unwrap();
        let mut attrs = AttributeMap::new();
        for subject in [Node::Null, Node::from("4821")] {
            let err = set_template_attributes(&subject, &mapping, &langs(&["eng"]), &mut attrs)
                .unwrap_err();
            assert!(matches!(err, CardwerkError::IdentityNotFound(_)));
            assert!(create_text_file(&subject, &mapping, &langs(&["eng"])).is_err());
        }
    }

    #[test]
    fn print_text_file_is_pretty_json_in_mapping_order() {
        let mapping = FieldMapping::from_print_text_json(
            r#"{"uin": "UIN", "name": "fullName", "contact": "phone,email"}"#,
        )
        .unwrap();
        let bytes = create_text_file(&subject(), &mapping, &langs(&["eng"])).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.contains('\n'), "output is pretty-printed");
        let parsed: Value = serde_json::from_str(&text).unwrap();
        let keys: Vec<&str> = parsed.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["UIN", "fullName_eng", "phone", "email"]);
        assert_eq!(parsed["fullName_eng"], "Ada Lovelace");
        assert!(parsed["phone"].is_null());
        assert!(parsed["email"].is_null());
    }

    #[test]
    fn print_text_mapping_rejects_non_string_entries() {
        assert!(matches!(
            FieldMapping::from_print_text_json(r#"{"uin": 3}"#),
            Err(CardwerkError::MappingParse(_))
        ));
        assert!(matches!(
            FieldMapping::from_print_text_json("[]"),
            Err(CardwerkError::MappingParse(_))
        ));
    }
}
