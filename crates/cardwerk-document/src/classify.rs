// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Value classification shared by template mapping, the print text file and
// password derivation.
//
// Subject values come in three shapes: language-tagged arrays
// (`[{"language":"eng","value":"Ada"}]`), embedded objects carrying a
// `value` member, and plain scalars. Decrypted attributes arrive as strings,
// so strings are re-parsed as JSON first; a string that does not parse to an
// array or object stays a plain string.

use cardwerk_core::node::Node;

const LANGUAGE: &str = "language";
const VALUE: &str = "value";

/// One entry of a language-tagged array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Localized {
    pub language: String,
    pub value: String,
}

/// The shape of a subject value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    /// Language-tagged array. Entries lacking a language or value are dropped.
    Localized(Vec<Localized>),
    /// Object; carries its `value` member's string form when present.
    Embedded(Option<String>),
    /// Anything else, in its plain string form.
    Scalar(String),
}

impl Classified {
    /// The localized value for exactly `language`, if any.
    pub fn for_language(&self, language: &str) -> Option<&str> {
        match self {
            Self::Localized(entries) => entries
                .iter()
                .find(|e| e.language == language)
                .map(|e| e.value.as_str()),
            _ => None,
        }
    }
}

/// Classify a subject value. `None` for JSON null.
pub fn classify(node: &Node) -> Option<Classified> {
    match node {
        Node::Null => None,
        Node::String(raw) => Some(match Node::parse(raw) {
            Ok(parsed @ (Node::Array(_) | Node::Object(_))) => structured(&parsed),
            _ => Classified::Scalar(raw.clone()),
        }),
        Node::Array(_) | Node::Object(_) => Some(structured(node)),
        Node::Bool(_) | Node::Number(_) => Some(Classified::Scalar(node.display_string())),
    }
}

fn structured(node: &Node) -> Classified {
    match node {
        Node::Array(items) => Classified::Localized(items.iter().filter_map(localized).collect()),
        _ => Classified::Embedded(
            node.get(VALUE)
                .filter(|v| !v.is_null())
                .map(Node::display_string),
        ),
    }
}

fn localized(item: &Node) -> Option<Localized> {
    let language = item.get(LANGUAGE)?.as_str()?;
    let value = item.get(VALUE).filter(|v| !v.is_null())?;
    Some(Localized {
        language: language.to_owned(),
        value: value.display_string(),
    })
}
