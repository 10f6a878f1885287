// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stable failure codes for the audit trail.
//
// Every error is mapped to a short code and a fixed message. Audit entries
// carry the code as their module id so downstream consumers can group
// failures without parsing free-form detail strings.

use crate::error::{CardwerkError, CryptoKind};

/// A stable code/message pair recorded in audit entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureCode {
    pub code: &'static str,
    pub message: &'static str,
}

/// Code recorded for a successfully printed credential.
pub const PRINT_SUCCESS: FailureCode = FailureCode {
    code: "PRT-SUC-001",
    message: "Print service completed successfully",
};

/// Map a `CardwerkError` to its audit code.
pub fn failure_code(err: &CardwerkError) -> FailureCode {
    match err {
        CardwerkError::CredentialSource(_) => FailureCode {
            code: "PRT-CRD-001",
            message: "Credential could not be retrieved",
        },
        CardwerkError::Credential(_) => FailureCode {
            code: "PRT-CRD-002",
            message: "Credential document is malformed",
        },

        CardwerkError::Crypto { kind, .. } => match kind {
            CryptoKind::InvalidKey => FailureCode {
                code: "PRT-CRY-001",
                message: "Invalid key while decrypting protected data",
            },
            CryptoKind::InvalidParameter => FailureCode {
                code: "PRT-CRY-002",
                message: "Invalid parameter while decrypting protected data",
            },
            CryptoKind::BadPadding => FailureCode {
                code: "PRT-CRY-003",
                message: "Protected data failed integrity checks",
            },
        },

        CardwerkError::BiometricParse(_) => FailureCode {
            code: "PRT-BIO-001",
            message: "Biometric record could not be parsed",
        },

        CardwerkError::QrGeneration(_) => FailureCode {
            code: "PRT-QRC-001",
            message: "QR code generation failed",
        },

        CardwerkError::IdentityNotFound(_) => FailureCode {
            code: "PRT-TEM-001",
            message: "Identity not found in credential subject",
        },
        CardwerkError::MappingParse(_) => FailureCode {
            code: "PRT-TEM-002",
            message: "Identity mapping could not be parsed",
        },
        CardwerkError::TemplateRender(_) => FailureCode {
            code: "PRT-TEM-003",
            message: "Template processing failed",
        },

        CardwerkError::PdfGeneration(_) => FailureCode {
            code: "PRT-PDF-001",
            message: "PDF generation failed",
        },
        CardwerkError::PdfSignature(_) => FailureCode {
            code: "PRT-PDF-002",
            message: "PDF signature failed",
        },

        CardwerkError::Configuration(_) => FailureCode {
            code: "PRT-CFG-001",
            message: "Required configuration property missing",
        },

        CardwerkError::Upload(_) => FailureCode {
            code: "PRT-DSH-001",
            message: "Artifact upload to data share failed",
        },
        CardwerkError::Publish(_) => FailureCode {
            code: "PRT-EVT-001",
            message: "Status event could not be published",
        },

        CardwerkError::Database(_) | CardwerkError::Io(_) | CardwerkError::Serialization(_) => {
            FailureCode {
                code: "PRT-SYS-001",
                message: "Print service internal failure",
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crypto_kinds_have_distinct_codes() {
        let key = failure_code(&CardwerkError::crypto(CryptoKind::InvalidKey, "x"));
        let param = failure_code(&CardwerkError::crypto(CryptoKind::InvalidParameter, "x"));
        let pad = failure_code(&CardwerkError::crypto(CryptoKind::BadPadding, "x"));
        assert_ne!(key.code, param.code);
        assert_ne!(param.code, pad.code);
    }

    #[test]
    fn template_class_shares_prefix() {
        for err in [
            CardwerkError::IdentityNotFound("UIN".into()),
            CardwerkError::MappingParse("eof".into()),
            CardwerkError::TemplateRender("empty".into()),
        ] {
            assert!(failure_code(&err).code.starts_with("PRT-TEM-"));
        }
    }

    #[test]
    fn success_code_is_not_a_failure_code() {
        let biometric = failure_code(&CardwerkError::BiometricParse("short".into()));
        assert_ne!(biometric.code, PRINT_SUCCESS.code);
    }
}
