// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Selective decryption of protected credential-subject attributes.

use cardwerk_core::error::{CardwerkError, CryptoKind, Result};
use cardwerk_core::node::Node;
use cardwerk_core::traits::PinDecryptor;
use tracing::{debug, error, instrument};

/// Credential member listing the subject fields that need pin decryption.
pub const PROTECTED_ATTRIBUTES: &str = "protectedAttributes";

/// Field names the credential declares as protected.
///
/// Absent, empty or non-array declarations all yield an empty list.
/// Non-string entries are ignored.
pub fn protected_attributes(credential: &Node) -> Vec<String> {
    credential
        .get(PROTECTED_ATTRIBUTES)
        .and_then(Node::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Node::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

/// Decrypt every field in `protected` in place.
///
/// Works on a copy of `subject`; the caller's document is replaced only when
/// every field decrypted, so a failure never exposes a half-decrypted
/// subject.
#[instrument(skip_all, fields(protected = protected.len()))]
pub fn decrypt_protected_attributes(
    subject: &mut Node,
    protected: &[String],
    pin: Option<&str>,
    decryptor: &dyn PinDecryptor,
) -> Result<()> {
    if protected.is_empty() {
        debug!("no protected attributes declared");
        return Ok(());
    }

    let pin = pin.ok_or_else(|| {
        CardwerkError::crypto(
            CryptoKind::InvalidParameter,
            "protected attributes declared but no pin supplied",
        )
    })?;

    let mut working = subject.clone();
    for field in protected {
        let ciphertext = working.get(field).and_then(Node::as_str).ok_or_else(|| {
            CardwerkError::crypto(
                CryptoKind::InvalidParameter,
                format!("protected attribute `{field}` is missing or not a string"),
            )
        })?;

        let plaintext = decryptor
            .decrypt_with_pin(pin, ciphertext)
            .inspect_err(|e| {
                error!(field = %field, error = %e, "error while decrypting protected attribute");
            })
            .map_err(as_crypto_failure)?;
        working.insert(field.clone(), Node::String(plaintext));
    }

    *subject = working;
    debug!("protected attributes decrypted");
    Ok(())
}

/// Pin decryption failures always surface as a crypto failure kind.
fn as_crypto_failure(err: CardwerkError) -> CardwerkError {
    match err {
        CardwerkError::Crypto { .. } => err,
        other => CardwerkError::crypto(CryptoKind::InvalidParameter, other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reverses the ciphertext; fails on anything starting with "bad".
    struct ReversingDecryptor;

    impl PinDecryptor for ReversingDecryptor {
        fn decrypt_with_pin(&self, pin: &str, value: &str) -> Result<String> {
            if pin != "1234" {
                return Err(CardwerkError::crypto(CryptoKind::InvalidKey, "wrong pin"));
            }
            if value.starts_with("bad") {
                return Err(CardwerkError::crypto(CryptoKind::BadPadding, "padding"));
            }
            if value.starts_with("io") {
                return Err(CardwerkError::Io(std::io::Error::other("key store offline")));
            }
            Ok(value.chars().rev().collect())
        }
    }

    fn subject() -> Node {
        Node::parse(r#"{"UIN":"9001","email":"gro.elpmaxe@ada","phone":"4321"}"#).unwrap()
    }

    #[test]
    fn declared_fields_are_read_from_credential() {
        let credential =
            Node::parse(r#"{"protectedAttributes":["email",7,"phone"],"proof":{}}"#).unwrap();
        assert_eq!(protected_attributes(&credential), ["email", "phone"]);
        assert!(protected_attributes(&Node::parse("{}").unwrap()).is_empty());
    }

    #[test]
    fn no_declaration_leaves_document_unchanged() {
        let mut doc = subject();
        decrypt_protected_attributes(&mut doc, &[], None, &ReversingDecryptor).unwrap();
        assert_eq!(doc, subject());
    }

    #[test]
    fn declared_fields_are_overwritten() {
        let mut doc = subject();
        let fields = vec!["email".to_owned(), "phone".to_owned()];
        decrypt_protected_attributes(&mut doc, &fields, Some("1234"), &ReversingDecryptor)
            .unwrap();
        assert_eq!(doc.get("email").and_then(Node::as_str), Some("ada@example.org"));
        assert_eq!(doc.get("phone").and_then(Node::as_str), Some("1234"));
        assert_eq!(doc.get("UIN").and_then(Node::as_str), Some("9001"));
    }

    #[test]
    fn failure_leaves_no_partial_decryption() {
        let mut doc = Node::parse(r#"{"email":"gro.elpmaxe@ada","phone":"bad"}"#).unwrap();
        let before = doc.clone();
        let fields = vec!["email".to_owned(), "phone".to_owned()];
        let err = decrypt_protected_attributes(&mut doc, &fields, Some("1234"), &ReversingDecryptor)
            .unwrap_err();

        assert!(matches!(
            err,
            CardwerkError::Crypto {
                kind: CryptoKind::BadPadding,
                ..
            }
        ));
        assert_eq!(doc, before);
    }

    #[test]
    fn wrong_pin_is_invalid_key() {
        let mut doc = subject();
        let err = decrypt_protected_attributes(
            &mut doc,
            &["email".to_owned()],
            Some("9999"),
            &ReversingDecryptor,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CardwerkError::Crypto {
                kind: CryptoKind::InvalidKey,
                ..
            }
        ));
    }

    #[test]
    fn missing_pin_or_field_is_invalid_parameter() {
        let mut doc = subject();
        let no_pin =
            decrypt_protected_attributes(&mut doc, &["email".to_owned()], None, &ReversingDecryptor)
                .unwrap_err();
        let no_field = decrypt_protected_attributes(
            &mut doc,
            &["nickname".to_owned()],
            Some("1234"),
            &ReversingDecryptor,
        )
        .unwrap_err();

        for err in [no_pin, no_field] {
            assert!(matches!(
                err,
                CardwerkError::Crypto {
                    kind: CryptoKind::InvalidParameter,
                    ..
                }
            ));
        }
    }

    #[test]
    fn foreign_decryptor_error_becomes_invalid_parameter() {
        let mut doc = Node::parse(r#"{"email":"io-sealed"}"#).unwrap();
        let err = decrypt_protected_attributes(
            &mut doc,
            &["email".to_owned()],
            Some("1234"),
            &ReversingDecryptor,
        )
        .unwrap_err();
        match err {
            CardwerkError::Crypto { kind, detail } => {
                assert_eq!(kind, CryptoKind::InvalidParameter);
                assert!(detail.contains("key store offline"));
            }
            other => panic!("unexpected error variant: {other}"),
        }
        assert_eq!(doc.get("email").and_then(Node::as_str), Some("io-sealed"));
    }
}
