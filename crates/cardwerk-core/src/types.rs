// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Cardwerk credential print pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Subject field holding the CBEFF biometric container.
pub const BIOMETRICS: &str = "biometrics";
/// Subject field holding the unique identity number.
pub const UIN: &str = "UIN";
/// Modality name passed to the biometric container utility.
pub const FACE_MODALITY: &str = "Face";

/// Attribute key for the applicant's face image data URI.
pub const APPLICANT_PHOTO: &str = "ApplicantPhoto";
/// Attribute key recording whether a face image was found.
pub const IS_PHOTO_SET: &str = "isPhotoSet";
/// Attribute key for the QR code image data URI.
pub const QR_CODE: &str = "QrCode";

/// Prefix for every image embedded as a data URI.
pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Lifecycle states reported on the status topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrintStatus {
    /// Request accepted, processing about to start.
    Received,
    /// Card generated and uploaded.
    Printed,
    /// Processing failed after verification.
    Error,
}

impl std::fmt::Display for PrintStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Received => "RECEIVED",
            Self::Printed => "PRINTED",
            Self::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// A single status transition for one print request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEvent {
    pub id: Uuid,
    pub request_id: String,
    pub status: PrintStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl StatusEvent {
    pub fn new(request_id: impl Into<String>, status: PrintStatus, url: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            request_id: request_id.into(),
            status,
            url,
            timestamp: Utc::now(),
        }
    }
}

/// Envelope published on the status topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialStatusEvent {
    pub publisher: String,
    pub topic: String,
    pub published_on: DateTime<Utc>,
    pub event: StatusEvent,
}

/// Payload of an incoming credential event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventData {
    /// Inline credential, used when no data share URI is given.
    #[serde(default)]
    pub credential: Option<String>,
    /// Requested artifact variant (`qrcode`, `eUIN_with_faceQR`, ...).
    pub credential_type: String,
    /// Pin for protected attributes.
    #[serde(default)]
    pub protection_key: Option<String>,
}

/// An incoming "credential issued" event, the pipeline's input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialEvent {
    pub id: String,
    pub transaction_id: String,
    #[serde(default)]
    pub data_share_uri: Option<String>,
    pub data: EventData,
}

/// Artifact variant requested by a credential event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialType {
    /// QR-only document: no text file, no template attribute mapping.
    QrCode,
    /// Full card whose QR payload carries a face thumbnail.
    EuinWithFaceQr,
    /// Any other full card variant.
    Card(String),
}

impl CredentialType {
    /// Classify a credential type string (case-insensitive).
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("qrcode") {
            Self::QrCode
        } else if raw.eq_ignore_ascii_case("eUIN_with_faceQR") {
            Self::EuinWithFaceQr
        } else {
            Self::Card(raw.to_owned())
        }
    }
}

/// QR symbol version handed to the QR encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrVersion(pub u8);

impl Default for QrVersion {
    fn default() -> Self {
        Self(30)
    }
}

/// Output kind requested from the card generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardKind {
    Pdf,
}

/// Ordered attribute map bound into card templates.
///
/// Insertion order is preserved; inserting an existing key replaces its
/// value without moving it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeMap {
    entries: Vec<(String, String)>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// One audit trail entry, as handed to the audit recorder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub message: String,
    pub event_id: String,
    pub event_name: String,
    pub event_type: String,
    pub module_id: String,
    pub module_name: String,
    /// The subject's UIN when it was read before the outcome was decided.
    pub subject_id: Option<String>,
}
