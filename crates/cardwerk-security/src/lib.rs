// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// cardwerk-security: Trust decisions and secrets handling for the print
// pipeline: credential and pin ciphers (age), selective attribute decryption,
// the verifier gate, the SQLite audit trail, and artifact fingerprints.

pub mod attributes;
pub mod audit;
pub mod cipher;
pub mod integrity;
pub mod verifier;

pub use attributes::{decrypt_protected_attributes, protected_attributes};
pub use audit::AuditLog;
pub use cipher::{AgeCredentialDecryptor, AgePinDecryptor, encrypt_credential, encrypt_with_pin};
pub use integrity::hash_bytes;
pub use verifier::VerifierGate;
