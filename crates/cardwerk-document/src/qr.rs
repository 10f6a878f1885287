// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// QR payload assembly.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use cardwerk_core::error::{CardwerkError, Result};
use cardwerk_core::node::Node;
use cardwerk_core::traits::QrEncoder;
use cardwerk_core::types::{
    APPLICANT_PHOTO, AttributeMap, BIOMETRICS, PNG_DATA_URI_PREFIX, QR_CODE, QrVersion,
};
use tracing::{debug, instrument};

/// 5x5 PNG embedded in face-QR payloads in place of the real photo.
pub const PLACEHOLDER_PHOTO: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAUAAAAFCAYAAACNbyblAAAAHElEQVQI12P4//8/w38GIAXDIBKE0DHxgljNBAAO9TXL0Y4OHwAAAABJRU5ErkJggg==";

/// How the subject is shaped before encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QrMode {
    /// Subject as-is, minus the biometric container once a photo was taken from it.
    Plain,
    /// Like `Plain`, plus the placeholder photo.
    FaceEmbed,
}

/// Build the JSON payload for the QR symbol. The subject is not modified.
pub fn build_qr_payload(subject: &Node, mode: QrMode, photo_set: bool) -> Node {
    let mut payload = subject.clone();
    if photo_set {
        payload.remove(BIOMETRICS);
        if mode == QrMode::FaceEmbed {
            payload.insert(APPLICANT_PHOTO, Node::from(PLACEHOLDER_PHOTO));
        }
    }
    payload
}

/// Encode the QR payload and store it under `QrCode`.
///
/// Returns whether a symbol was produced. An encoder that yields nothing is
/// not an error; an encoder that fails is.
#[instrument(skip_all, fields(mode = ?mode, photo_set = photo_set, version = version.0))]
pub fn set_qr_code(
    encoder: &dyn QrEncoder,
    subject: &Node,
    mode: QrMode,
    photo_set: bool,
    version: QrVersion,
    attributes: &mut AttributeMap,
) -> Result<bool> {
    let payload = build_qr_payload(subject, mode, photo_set).to_json_string();
    let symbol = encoder
        .encode(&payload, version)
        .map_err(|e| match e {
            CardwerkError::QrGeneration(_) => e,
            other => CardwerkError::QrGeneration(other.to_string()),
        })?;

    match symbol {
        Some(bytes) if !bytes.is_empty() => {
            attributes.insert(
                QR_CODE,
                format!("{PNG_DATA_URI_PREFIX}{}", STANDARD.encode(&bytes)),
            );
            debug!(symbol_len = bytes.len(), "QR code set");
            Ok(true)
        }
        _ => {
            debug!("QR encoder produced no symbol");
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingEncoder {
        output: Option<Vec<u8>>,
        seen: Mutex<Vec<String>>,
    }

    impl RecordingEncoder {
        fn returning(output: Option<Vec<u8>>) -> Self {
            Self {
                output,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl QrEncoder for RecordingEncoder {
        fn encode(&self, payload: &str, version: QrVersion) -> Result<Option<Vec<u8>>> {
            assert_eq!(version, QrVersion(30));
            self.seen.lock().unwrap().push(payload.to_owned());
            Ok(self.output.clone())
        }
    }

    struct FailingEncoder;

    impl QrEncoder for FailingEncoder {
        fn encode(&self, _payload: &str, _version: QrVersion) -> Result<Option<Vec<u8>>> {
            Err(CardwerkError::Io(std::io::Error::other("symbol too large")))
        }
    }

    fn subject() -> Node {
        Node::parse(r#"{"UIN":"4821","fullName":"Ada","biometrics":"cbeff-xml"}"#).unwrap()
    }

    #[test]
    fn photo_set_strips_biometrics_in_both_modes() {
        for mode in [QrMode::Plain, QrMode::FaceEmbed] {
            let payload = build_qr_payload(&subject(), mode, true);
            assert!(payload.get(BIOMETRICS).is_none(), "{mode:?}");
            assert_eq!(payload.get("UIN").and_then(Node::as_str), Some("4821"));
        }
    }

    #[test]
    fn face_embed_adds_placeholder_only_with_photo() {
        let with = build_qr_payload(&subject(), QrMode::FaceEmbed, true);
        assert_eq!(
            with.get(APPLICANT_PHOTO).and_then(Node::as_str),
            Some(PLACEHOLDER_PHOTO)
        );

        let without = build_qr_payload(&subject(), QrMode::FaceEmbed, false);
        assert!(without.get(APPLICANT_PHOTO).is_none());
        assert!(without.get(BIOMETRICS).is_some());
    }

    #[test]
    fn plain_mode_never_adds_photo() {
        let payload = build_qr_payload(&subject(), QrMode::Plain, true);
        assert!(payload.get(APPLICANT_PHOTO).is_none());
    }

    #[test]
    fn symbol_is_stored_as_data_uri() {
        let encoder = RecordingEncoder::returning(Some(b"qr".to_vec()));
        let mut attrs = AttributeMap::new();
        let set = set_qr_code(&encoder, &subject(), QrMode::Plain, true, QrVersion(30), &mut attrs)
            .unwrap();
        assert!(set);
        assert_eq!(attrs.get(QR_CODE), Some("data:image/png;base64,cXI="));

        let seen = encoder.seen.lock().unwrap();
        assert!(!seen[0].contains("biometrics"));
    }

    #[test]
    fn empty_symbol_is_not_an_error() {
        for output in [None, Some(Vec::new())] {
            let encoder = RecordingEncoder::returning(output);
            let mut attrs = AttributeMap::new();
            let set =
                set_qr_code(&encoder, &subject(), QrMode::Plain, false, QrVersion(30), &mut attrs)
                    .unwrap();
            assert!(!set);
            assert!(!attrs.contains_key(QR_CODE));
        }
    }

    #[test]
    fn encoder_failure_is_qr_generation_error() {
        let mut attrs = AttributeMap::new();
        let err = set_qr_code(
            &FailingEncoder,
            &subject(),
            QrMode::Plain,
            false,
            QrVersion(30),
            &mut attrs,
        )
        .unwrap_err();
        assert!(matches!(err, CardwerkError::QrGeneration(_)));
    }
}
