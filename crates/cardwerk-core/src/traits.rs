// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Collaborator interfaces consumed by the print pipeline.
//
// The pipeline performs no network I/O of its own. Retrieval, proof
// verification, QR drawing, template rendering, PDF encoding, upload and
// event transport are all reached through these traits. Implementations are
// shared between concurrent requests, hence the `Send + Sync` bounds.

use crate::error::Result;
use crate::types::{AttributeMap, AuditRecord, CardKind, CredentialStatusEvent, QrVersion};

// ---------------------------------------------------------------------------
// Credential intake
// ---------------------------------------------------------------------------

/// Fetches a credential referenced by a data share URI.
pub trait CredentialSource: Send + Sync {
    fn fetch(&self, uri: &str) -> Result<String>;
}

/// Decrypts the whole credential payload.
///
/// Fails with `CardwerkError::Crypto` on malformed ciphertext.
pub trait CredentialDecryptor: Send + Sync {
    fn decrypt(&self, ciphertext: &str) -> Result<String>;
}

/// Decrypts a single protected attribute with the requester's pin.
///
/// Fails with `CardwerkError::Crypto` carrying `InvalidKey`,
/// `InvalidParameter` or `BadPadding`.
pub trait PinDecryptor: Send + Sync {
    fn decrypt_with_pin(&self, pin: &str, value: &str) -> Result<String>;
}

/// Failure raised by a proof verifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProofError {
    ProofDocumentMissing,
    ProofTypeUnknown,
    PublicKeyUnresolvable,
    Unknown(String),
}

/// Verifies the proof block of a decrypted credential.
pub trait ProofVerifier: Send + Sync {
    fn verify(&self, credential: &str) -> std::result::Result<bool, ProofError>;
}

// ---------------------------------------------------------------------------
// Document assembly
// ---------------------------------------------------------------------------

/// Looks up one modality inside a CBEFF biometric container.
///
/// Returns `Ok(None)` when the container holds no record for `modality`.
pub trait BiometricContainer: Send + Sync {
    fn extract_modality(&self, container: &str, modality: &str) -> Result<Option<Vec<u8>>>;
}

/// Draws a QR symbol for a JSON payload.
///
/// Returns `Ok(None)` when no symbol could be produced.
pub trait QrEncoder: Send + Sync {
    fn encode(&self, payload: &str, version: QrVersion) -> Result<Option<Vec<u8>>>;
}

/// Binds attributes into a named template.
///
/// Returns `Ok(None)` when the template produced no output.
pub trait TemplateRenderer: Send + Sync {
    fn render(
        &self,
        template_name: &str,
        attributes: &AttributeMap,
        language: &str,
    ) -> Result<Option<Vec<u8>>>;
}

/// Turns a rendered template into the final card bytes.
///
/// Fails with `PdfGeneration`, `PdfSignature` or `TemplateRender`.
pub trait CardGenerator: Send + Sync {
    fn generate(&self, template: &[u8], kind: CardKind, password: Option<&str>)
    -> Result<Vec<u8>>;
}

/// Supplies the field-mapping schemas. Called once per request.
pub trait MappingSource: Send + Sync {
    /// Identity mapping: `{ "<section>": { "<key>": { "value": "f1,f2" } } }`.
    fn identity_mapping(&self) -> Result<String>;

    /// Print text file mapping: `{ "<key>": "f1,f2" }`.
    fn print_text_mapping(&self) -> Result<String>;
}

// ---------------------------------------------------------------------------
// Hand-off and reporting
// ---------------------------------------------------------------------------

/// Stores artifact bytes and returns a retrievable URL.
pub trait DataShareUploader: Send + Sync {
    fn upload(&self, bytes: &[u8], policy_id: &str, partner_id: &str) -> Result<String>;
}

/// Publishes status events on a topic.
pub trait StatusPublisher: Send + Sync {
    fn publish(&self, topic: &str, event: &CredentialStatusEvent) -> Result<()>;
}

/// Appends entries to the audit trail.
pub trait AuditRecorder: Send + Sync {
    fn record(&self, record: &AuditRecord) -> Result<()>;
}
