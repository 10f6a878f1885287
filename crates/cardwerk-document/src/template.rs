// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `${key}` placeholder renderer, a minimal stand-in for a full template engine.

use std::collections::HashMap;

use cardwerk_core::error::{CardwerkError, Result};
use cardwerk_core::traits::TemplateRenderer;
use cardwerk_core::types::AttributeMap;
use tracing::{debug, instrument};

/// Renders named templates held in memory.
///
/// A template registered as `<name>_<language>` takes precedence over the
/// plain `<name>` when rendering in that language. Placeholders without a
/// matching attribute render as empty text.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderRenderer {
    templates: HashMap<String, String>,
}

impl PlaceholderRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a template body.
    pub fn with_template(mut self, name: impl Into<String>, body: impl Into<String>) -> Self {
        self.templates.insert(name.into(), body.into());
        self
    }

    fn lookup(&self, name: &str, language: &str) -> Option<&str> {
        self.templates
            .get(&format!("{name}_{language}"))
            .or_else(|| self.templates.get(name))
            .map(String::as_str)
    }
}

impl TemplateRenderer for PlaceholderRenderer {
    #[instrument(skip(self, attributes), fields(attributes = attributes.len()))]
    fn render(
        &self,
        template_name: &str,
        attributes: &AttributeMap,
        language: &str,
    ) -> Result<Option<Vec<u8>>> {
        let body = self.lookup(template_name, language).ok_or_else(|| {
            CardwerkError::TemplateRender(format!("unknown template '{template_name}'"))
        })?;

        let rendered = substitute(body, attributes);
        debug!(rendered_len = rendered.len(), "template rendered");
        if rendered.is_empty() {
            return Ok(None);
        }
        Ok(Some(rendered.into_bytes()))
    }
}

/// Replace every `${key}` in `body`. An unterminated `${` is copied through.
fn substitute(body: &str, attributes: &AttributeMap) -> String {
    let mut out = String::with_capacity(body.len());
    let mut rest = body;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let key = after[..end].trim();
                out.push_str(attributes.get(key).unwrap_or_default());
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs() -> AttributeMap {
        let mut attrs = AttributeMap::new();
        attrs.insert("UIN", "4821");
        attrs.insert("fullName_eng", "Ada Lovelace");
        attrs
    }

    fn render(renderer: &PlaceholderRenderer, name: &str, lang: &str) -> Result<Option<String>> {
        renderer
            .render(name, &attrs(), lang)
            .map(|out| out.map(|bytes| String::from_utf8(bytes).unwrap()))
    }

    #[test]
    fn substitutes_known_and_blanks_unknown() {
        let renderer = PlaceholderRenderer::new()
            .with_template("CARD", "UIN: ${UIN}\nName: ${ fullName_eng }\nPhone: ${phone}");
        assert_eq!(
            render(&renderer, "CARD", "eng").unwrap().unwrap(),
            "UIN: 4821\nName: Ada Lovelace\nPhone: "
        );
    }

    #[test]
    fn language_variant_wins() {
        let renderer = PlaceholderRenderer::new()
            .with_template("CARD", "generic ${UIN}")
            .with_template("CARD_ara", "arabic ${UIN}");
        assert_eq!(render(&renderer, "CARD", "ara").unwrap().unwrap(), "arabic 4821");
        assert_eq!(render(&renderer, "CARD", "eng").unwrap().unwrap(), "generic 4821");
    }

    #[test]
    fn unterminated_placeholder_is_kept() {
        let renderer = PlaceholderRenderer::new().with_template("CARD", "${UIN} and ${broken");
        assert_eq!(
            render(&renderer, "CARD", "eng").unwrap().unwrap(),
            "4821 and ${broken"
        );
    }

    #[test]
    fn empty_output_is_none() {
        let renderer = PlaceholderRenderer::new().with_template("CARD", "${missing}");
        assert!(render(&renderer, "CARD", "eng").unwrap().is_none());
    }

    #[test]
    fn unknown_template_is_render_error() {
        let err = render(&PlaceholderRenderer::new(), "NOPE", "eng").unwrap_err();
        assert!(matches!(err, CardwerkError::TemplateRender(_)));
    }
}
