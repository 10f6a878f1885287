// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// age-backed ciphers for credentials and protected attributes.
//
// Credentials are encrypted to the print partner's X25519 recipient; protected
// attributes are encrypted with the requester's pin via `age::scrypt`. Both
// travel as standard base64 of a complete binary age file.

use std::io::{Read, Write};

use age::secrecy::SecretString;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use cardwerk_core::error::{CardwerkError, CryptoKind, Result};
use cardwerk_core::traits::{CredentialDecryptor, PinDecryptor};
use tracing::{debug, instrument};

/// Map an age decryption error onto the crypto sub-kinds.
fn decrypt_err(e: age::DecryptError) -> CardwerkError {
    let kind = match e {
        age::DecryptError::NoMatchingKeys
        | age::DecryptError::DecryptionFailed
        | age::DecryptError::KeyDecryptionFailed => CryptoKind::InvalidKey,
        age::DecryptError::InvalidHeader | age::DecryptError::InvalidMac => CryptoKind::BadPadding,
        _ => CryptoKind::InvalidParameter,
    };
    CardwerkError::crypto(kind, e.to_string())
}

fn encrypt_err(detail: impl std::fmt::Display) -> CardwerkError {
    CardwerkError::crypto(CryptoKind::InvalidParameter, format!("encryption failed: {detail}"))
}

/// Decode base64 transport text into age file bytes.
fn decode_transport(text: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(text.trim())
        .map_err(|e| CardwerkError::crypto(CryptoKind::InvalidParameter, format!("base64: {e}")))
}

/// Run a configured decryptor to completion and return UTF-8 plaintext.
fn read_plaintext(
    decryptor: age::Decryptor<&[u8]>,
    identity: &dyn age::Identity,
) -> Result<String> {
    let mut reader = decryptor
        .decrypt(std::iter::once(identity))
        .map_err(decrypt_err)?;

    let mut plaintext = Vec::new();
    reader
        .read_to_end(&mut plaintext)
        .map_err(|e| CardwerkError::crypto(CryptoKind::BadPadding, e.to_string()))?;

    String::from_utf8(plaintext)
        .map_err(|e| CardwerkError::crypto(CryptoKind::BadPadding, format!("plaintext: {e}")))
}

/// Wrap `plaintext` with a ready encryptor and base64 the age file.
fn write_ciphertext(encryptor: age::Encryptor, plaintext: &str) -> Result<String> {
    let mut ciphertext = Vec::new();
    let mut writer = encryptor.wrap_output(&mut ciphertext).map_err(encrypt_err)?;
    writer.write_all(plaintext.as_bytes()).map_err(encrypt_err)?;
    writer.finish().map_err(encrypt_err)?;
    Ok(STANDARD.encode(ciphertext))
}

// ---------------------------------------------------------------------------
// Credential cipher
// ---------------------------------------------------------------------------

/// Decrypts whole credentials addressed to the print partner's X25519 key.
pub struct AgeCredentialDecryptor {
    identity: age::x25519::Identity,
}

impl AgeCredentialDecryptor {
    pub fn new(identity: age::x25519::Identity) -> Self {
        Self { identity }
    }

    /// Build from an `AGE-SECRET-KEY-1...` string.
    pub fn from_secret_key(secret: &str) -> Result<Self> {
        let identity = secret
            .trim()
            .parse::<age::x25519::Identity>()
            .map_err(|e| CardwerkError::crypto(CryptoKind::InvalidKey, e.to_string()))?;
        Ok(Self::new(identity))
    }

    /// The recipient credentials must be encrypted to.
    pub fn recipient(&self) -> age::x25519::Recipient {
        self.identity.to_public()
    }
}

impl CredentialDecryptor for AgeCredentialDecryptor {
    #[instrument(skip_all, fields(ciphertext_len = ciphertext.len()))]
    fn decrypt(&self, ciphertext: &str) -> Result<String> {
        let bytes = decode_transport(ciphertext)?;
        let decryptor = age::Decryptor::new(&bytes[..]).map_err(decrypt_err)?;
        let plaintext = read_plaintext(decryptor, &self.identity)?;
        debug!(plaintext_len = plaintext.len(), "credential decrypted");
        Ok(plaintext)
    }
}

/// Encrypt a credential for `recipient` (issuer side; used by tests and tooling).
pub fn encrypt_credential(recipient: &age::x25519::Recipient, plaintext: &str) -> Result<String> {
    let encryptor =
        age::Encryptor::with_recipients(std::iter::once(recipient as &dyn age::Recipient))
            .map_err(encrypt_err)?;
    write_ciphertext(encryptor, plaintext)
}

// ---------------------------------------------------------------------------
// Pin cipher
// ---------------------------------------------------------------------------

/// Decrypts protected attributes with a pin-derived scrypt key.
///
/// Stateless: the pin is wrapped in a `SecretString` only for the duration
/// of one call.
#[derive(Debug, Clone, Copy, Default)]
pub struct AgePinDecryptor;

impl PinDecryptor for AgePinDecryptor {
    #[instrument(skip_all, fields(value_len = value.len()))]
    fn decrypt_with_pin(&self, pin: &str, value: &str) -> Result<String> {
        if pin.is_empty() {
            return Err(CardwerkError::crypto(CryptoKind::InvalidParameter, "empty pin"));
        }
        let bytes = decode_transport(value)?;
        let decryptor = age::Decryptor::new(&bytes[..]).map_err(decrypt_err)?;
        let identity = age::scrypt::Identity::new(SecretString::from(pin.to_owned()));
        read_plaintext(decryptor, &identity)
    }
}

/// Encrypt an attribute value with `pin` (issuer side; used by tests and tooling).
pub fn encrypt_with_pin(pin: &str, plaintext: &str) -> Result<String> {
    let encryptor = age::Encryptor::with_user_passphrase(SecretString::from(pin.to_owned()));
    write_ciphertext(encryptor, plaintext)
}
