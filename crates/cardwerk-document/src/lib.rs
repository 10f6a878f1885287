// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// cardwerk-document: Everything that turns a decrypted credential subject
// into card material.
//
// Provides face image extraction from biometric records, QR payload
// assembly, template attribute flattening and the print text file, password
// derivation, a placeholder template renderer and a printpdf card generator.

pub mod classify;
pub mod face;
pub mod mapping;
pub mod password;
pub mod pdf;
pub mod qr;
pub mod template;

pub use classify::{Classified, Localized, classify};
pub use face::{encode_face_record, extract_applicant_face, extract_face_image, png_data_uri};
pub use mapping::{FieldMapping, create_text_file, set_template_attributes};
pub use password::derive_password;
pub use pdf::PdfCardGenerator;
pub use qr::{PLACEHOLDER_PHOTO, QrMode, build_qr_payload, set_qr_code};
pub use template::PlaceholderRenderer;
