// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Credential intake: locating the payload for an event and splitting a
// decrypted credential into its document and subject.

use cardwerk_core::error::{CardwerkError, Result};
use cardwerk_core::node::Node;
use cardwerk_core::traits::CredentialSource;
use cardwerk_core::types::CredentialEvent;
use tracing::{debug, instrument};

/// Credential member holding the subject's identity fields.
pub const CREDENTIAL_SUBJECT: &str = "credentialSubject";

/// Return the encrypted credential for `event`.
///
/// Inline when the event has no data share URI, fetched otherwise.
#[instrument(skip_all, fields(event_id = %event.id))]
pub fn acquire(event: &CredentialEvent, source: &dyn CredentialSource) -> Result<String> {
    match event.data_share_uri.as_deref().filter(|uri| !uri.is_empty()) {
        Some(uri) => {
            debug!("fetching credential from data share");
            source.fetch(uri)
        }
        None => event
            .data
            .credential
            .clone()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| CardwerkError::Credential("event carries no credential".into())),
    }
}

/// A decrypted credential.
#[derive(Debug, Clone)]
pub struct DecryptedCredential {
    /// The whole credential document.
    pub document: Node,
    /// Its `credentialSubject`, always an object.
    pub subject: Node,
}

impl DecryptedCredential {
    /// Parse a decrypted credential.
    ///
    /// The subject may be embedded as an object or as a string holding a JSON
    /// object.
    pub fn parse(plaintext: &str) -> Result<Self> {
        let document = Node::parse(plaintext)
            .map_err(|e| CardwerkError::Credential(format!("credential is not JSON: {e}")))?;

        let subject = match document.get(CREDENTIAL_SUBJECT) {
            Some(subject @ Node::Object(_)) => subject.clone(),
            Some(Node::String(embedded)) => Node::parse(embedded)
                .ok()
                .filter(Node::is_object)
                .ok_or_else(|| {
                    CardwerkError::Credential("credentialSubject string is not a JSON object".into())
                })?,
            Some(_) => {
                return Err(CardwerkError::Credential(
                    "credentialSubject is not an object".into(),
                ));
            }
            None => {
                return Err(CardwerkError::Credential("credentialSubject missing".into()));
            }
        };

        Ok(Self { document, subject })
    }
}
