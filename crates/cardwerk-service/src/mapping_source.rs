// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// File-backed field-mapping source.

use std::path::{Path, PathBuf};

use cardwerk_core::PrintConfig;
use cardwerk_core::error::{CardwerkError, Result};
use cardwerk_core::traits::MappingSource;
use tracing::{debug, instrument};

/// Reads both mapping schemas from disk on every call, so edits take effect
/// on the next request.
#[derive(Debug, Clone)]
pub struct FileMappingSource {
    identity_path: PathBuf,
    print_text_path: PathBuf,
}

impl FileMappingSource {
    pub fn new(identity_path: impl Into<PathBuf>, print_text_path: impl Into<PathBuf>) -> Self {
        Self {
            identity_path: identity_path.into(),
            print_text_path: print_text_path.into(),
        }
    }

    /// Build from the mapping locations in `config`.
    pub fn from_config(config: &PrintConfig) -> Result<Self> {
        let identity = config.identity_mapping_path.clone().ok_or_else(|| {
            CardwerkError::Configuration("identity_mapping_path not configured".into())
        })?;
        let print_text = config.print_text_mapping_path.clone().ok_or_else(|| {
            CardwerkError::Configuration("print_text_mapping_path not configured".into())
        })?;
        Ok(Self::new(identity, print_text))
    }
}

#[instrument(skip_all, fields(path = %path.display()))]
fn read_mapping(path: &Path) -> Result<String> {
    let text = std::fs::read_to_string(path)?;
    debug!(bytes = text.len(), "mapping read");
    Ok(text)
}

impl MappingSource for FileMappingSource {
    fn identity_mapping(&self) -> Result<String> {
        read_mapping(&self.identity_path)
    }

    fn print_text_mapping(&self) -> Result<String> {
        read_mapping(&self.print_text_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_fresh_on_every_call() {
        let dir = tempfile::tempdir().unwrap();
        let identity = dir.path().join("identity.json");
        let print_text = dir.path().join("print-text.json");
        std::fs::write(&identity, r#"{"identity":{}}"#).unwrap();
        std::fs::write(&print_text, r#"{"uin":"UIN"}"#).unwrap();

        let source = FileMappingSource::new(&identity, &print_text);
        assert_eq!(source.identity_mapping().unwrap(), r#"{"identity":{}}"#);
        assert_eq!(source.print_text_mapping().unwrap(), r#"{"uin":"UIN"}"#);

        std::fs::write(&print_text, r#"{"uin":"UIN,VID"}"#).unwrap();
        assert_eq!(source.print_text_mapping().unwrap(), r#"{"uin":"UIN,VID"}"#);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileMappingSource::new(dir.path().join("a"), dir.path().join("b"));
        assert!(matches!(source.identity_mapping(), Err(CardwerkError::Io(_))));
    }

    #[test]
    fn config_must_name_both_paths() {
        let mut config = PrintConfig {
            identity_mapping_path: Some("identity.json".into()),
            ..PrintConfig::default()
        };
        assert!(matches!(
            FileMappingSource::from_config(&config),
            Err(CardwerkError::Configuration(_))
        ));
        config.print_text_mapping_path = Some("print-text.json".into());
        assert!(FileMappingSource::from_config(&config).is_ok());
    }
}
