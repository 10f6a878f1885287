// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Cardwerk.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sub-kind of a pin or credential decryption failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CryptoKind {
    /// Wrong pin or key; the ciphertext was not addressed to us.
    InvalidKey,
    /// Malformed input: bad encoding, missing field, missing pin.
    InvalidParameter,
    /// Ciphertext decoded but failed authentication or produced garbage.
    BadPadding,
}

impl std::fmt::Display for CryptoKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::InvalidKey => "invalid key",
            Self::InvalidParameter => "invalid parameter",
            Self::BadPadding => "bad padding",
        };
        f.write_str(name)
    }
}

/// Why the verifier gate refused to let a credential through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationFailure {
    /// The credential carries no proof block.
    ProofDocumentMissing,
    /// The proof block names a proof type the verifier does not know.
    ProofTypeUnrecognized,
    /// The proof did not verify, or its verification key could not be resolved.
    NotVerified(String),
}

impl std::fmt::Display for VerificationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProofDocumentMissing => f.write_str("proof document missing"),
            Self::ProofTypeUnrecognized => f.write_str("proof type unrecognized"),
            Self::NotVerified(detail) => write!(f, "credential not verified: {detail}"),
        }
    }
}

/// Top-level error type for all Cardwerk operations.
#[derive(Debug, Error)]
pub enum CardwerkError {
    // -- Credential intake --
    #[error("credential source error: {0}")]
    CredentialSource(String),

    #[error("malformed credential: {0}")]
    Credential(String),

    #[error("decryption failed ({kind}): {detail}")]
    Crypto { kind: CryptoKind, detail: String },

    // -- Document assembly --
    #[error("biometric record could not be parsed: {0}")]
    BiometricParse(String),

    #[error("QR code generation failed: {0}")]
    QrGeneration(String),

    #[error("identity not found: {0}")]
    IdentityNotFound(String),

    #[error("field mapping could not be parsed: {0}")]
    MappingParse(String),

    #[error("template processing failed: {0}")]
    TemplateRender(String),

    #[error("PDF generation failed: {0}")]
    PdfGeneration(String),

    #[error("PDF signature failed: {0}")]
    PdfSignature(String),

    // -- Configuration --
    #[error("configuration error: {0}")]
    Configuration(String),

    // -- Hand-off --
    #[error("data share upload failed: {0}")]
    Upload(String),

    #[error("status publish failed: {0}")]
    Publish(String),

    // -- Storage / persistence --
    #[error("database error: {0}")]
    Database(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CardwerkError {
    /// Shorthand for a [`CardwerkError::Crypto`] value.
    pub fn crypto(kind: CryptoKind, detail: impl Into<String>) -> Self {
        Self::Crypto {
            kind,
            detail: detail.into(),
        }
    }

    /// Whether this error belongs to the template-processing class
    /// (template render, identity lookup or mapping parse).
    pub fn is_template_class(&self) -> bool {
        matches!(
            self,
            Self::TemplateRender(_) | Self::IdentityNotFound(_) | Self::MappingParse(_)
        )
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, CardwerkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crypto_display_carries_kind() {
        let err = CardwerkError::crypto(CryptoKind::BadPadding, "mac mismatch");
        assert_eq!(err.to_string(), "decryption failed (bad padding): mac mismatch");
    }

    #[test]
    fn template_class_covers_identity_and_mapping() {
        assert!(CardwerkError::IdentityNotFound("UIN".into()).is_template_class());
        assert!(CardwerkError::MappingParse("eof".into()).is_template_class());
        assert!(CardwerkError::TemplateRender("null".into()).is_template_class());
        assert!(!CardwerkError::Upload("503".into()).is_template_class());
    }
}
