// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print service configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::QrVersion;

/// Settings consumed by one print pipeline run.
///
/// Loaded once and shared read-only between requests; a refreshed copy is
/// swapped in between requests, never during one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintConfig {
    /// Partner id used for the data share upload.
    pub partner_id: String,
    /// Policy id used for the data share upload.
    pub policy_id: String,
    /// Language passed to the template renderer and used for password fields.
    pub template_language: String,
    /// Language codes kept when flattening multilingual fields.
    pub supported_languages: Vec<String>,
    /// Run the verifier gate before printing.
    pub verify_credentials: bool,
    /// Protect generated PDFs with a derived password.
    pub password_protected: bool,
    /// Pipe-delimited subject fields the password is derived from.
    pub password_fields: Option<String>,
    /// Characters contributed by each password field.
    pub password_segment_length: usize,
    /// Topic status events are published on.
    pub status_topic: String,
    /// Template name handed to the renderer.
    pub template_name: String,
    /// QR symbol version.
    pub qr_version: QrVersion,
    /// Key of the demographic section inside the identity mapping.
    pub demographic_identity_key: String,
    /// Location of the identity mapping JSON.
    pub identity_mapping_path: Option<PathBuf>,
    /// Location of the print text file mapping JSON.
    pub print_text_mapping_path: Option<PathBuf>,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            partner_id: String::new(),
            policy_id: String::new(),
            template_language: "eng".to_owned(),
            supported_languages: vec!["eng".to_owned()],
            verify_credentials: true,
            password_protected: false,
            password_fields: None,
            password_segment_length: 4,
            status_topic: "CREDENTIAL_STATUS_UPDATE".to_owned(),
            template_name: "RPR_UIN_CARD_TEMPLATE".to_owned(),
            qr_version: QrVersion::default(),
            demographic_identity_key: "identity".to_owned(),
            identity_mapping_path: None,
            print_text_mapping_path: None,
        }
    }
}

impl PrintConfig {
    /// Parse a configuration from JSON. Absent fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read and parse a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let cfg = PrintConfig::from_json(r#"{"partner_id":"mpartner-print","policy_id":"p1"}"#)
            .unwrap();
        assert_eq!(cfg.partner_id, "mpartner-print");
        assert!(cfg.verify_credentials);
        assert!(!cfg.password_protected);
        assert_eq!(cfg.password_segment_length, 4);
        assert_eq!(cfg.status_topic, "CREDENTIAL_STATUS_UPDATE");
        assert_eq!(cfg.qr_version, QrVersion(30));
    }

    #[test]
    fn malformed_config_is_serialization_error() {
        let err = PrintConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, crate::error::CardwerkError::Serialization(_)));
    }
}
