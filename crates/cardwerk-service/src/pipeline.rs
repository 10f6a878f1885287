// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print orchestrator: runs one credential event through intake,
// verification, document assembly and hand-off.
//
// Request lifecycle:
//
//   RECEIVED ──► intake ──► verifier gate ──► processing ──► PRINTED
//                  │              │               │
//                  ▼              ▼               ▼
//               skipped        skipped          ERROR
//
// Intake and gate failures end the request quietly: no further status
// event, no audit entry. Every failure during processing publishes ERROR and
// records a failure audit entry.

use std::sync::{Arc, PoisonError, RwLock};

use cardwerk_core::PrintConfig;
use cardwerk_core::codes::failure_code;
use cardwerk_core::error::{CardwerkError, Result, VerificationFailure};
use cardwerk_core::node::Node;
use cardwerk_core::traits::{
    AuditRecorder, BiometricContainer, CardGenerator, CredentialDecryptor, CredentialSource,
    DataShareUploader, MappingSource, PinDecryptor, ProofVerifier, QrEncoder, StatusPublisher,
    TemplateRenderer,
};
use cardwerk_core::types::{
    APPLICANT_PHOTO, AttributeMap, AuditRecord, BIOMETRICS, CardKind, CredentialEvent,
    CredentialType, IS_PHOTO_SET, PrintStatus, UIN,
};
use cardwerk_document::{
    FieldMapping, QrMode, create_text_file, derive_password, extract_applicant_face,
    png_data_uri, set_qr_code, set_template_attributes,
};
use cardwerk_security::{VerifierGate, decrypt_protected_attributes, hash_bytes, protected_attributes};
use tracing::{debug, error, info, instrument, warn};

use crate::credential::{self, DecryptedCredential};
use crate::status;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// External collaborators the pipeline delegates to.
///
/// Shared between concurrent requests.
#[derive(Clone)]
pub struct Collaborators {
    pub credential_source: Arc<dyn CredentialSource>,
    pub credential_decryptor: Arc<dyn CredentialDecryptor>,
    pub pin_decryptor: Arc<dyn PinDecryptor>,
    pub proof_verifier: Arc<dyn ProofVerifier>,
    pub biometrics: Arc<dyn BiometricContainer>,
    pub qr_encoder: Arc<dyn QrEncoder>,
    pub template_renderer: Arc<dyn TemplateRenderer>,
    pub card_generator: Arc<dyn CardGenerator>,
    pub mapping_source: Arc<dyn MappingSource>,
    pub uploader: Arc<dyn DataShareUploader>,
    pub publisher: Arc<dyn StatusPublisher>,
    pub audit: Arc<dyn AuditRecorder>,
}

/// Everything produced for a printed credential.
#[derive(Debug, Clone)]
pub struct PrintArtifacts {
    pub pdf: Vec<u8>,
    /// Print text file; absent for QR-only documents.
    pub text_file: Option<Vec<u8>>,
    /// Where the uploaded PDF can be retrieved.
    pub url: String,
    pub photo_set: bool,
    pub qr_set: bool,
}

/// Why a request stopped before processing began.
#[derive(Debug)]
pub enum SkipReason {
    /// RECEIVED could not be published, or the credential could not be
    /// acquired or decrypted.
    Intake(CardwerkError),
    /// The verifier gate refused the credential.
    Rejected(VerificationFailure),
}

/// Result of one pipeline run.
#[derive(Debug)]
pub enum PrintOutcome {
    Printed(PrintArtifacts),
    Skipped(SkipReason),
    Failed(CardwerkError),
}

impl PrintOutcome {
    pub fn is_printed(&self) -> bool {
        matches!(self, Self::Printed(_))
    }

    pub fn artifacts(&self) -> Option<&PrintArtifacts> {
        match self {
            Self::Printed(artifacts) => Some(artifacts),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// PrintService
// ---------------------------------------------------------------------------

/// The print orchestrator.
///
/// Each request works on one configuration snapshot taken at entry, so
/// `replace_config` never affects a request already in flight.
pub struct PrintService {
    config: RwLock<Arc<PrintConfig>>,
    collaborators: Collaborators,
}

impl PrintService {
    pub fn new(config: PrintConfig, collaborators: Collaborators) -> Self {
        Self {
            config: RwLock::new(Arc::new(config)),
            collaborators,
        }
    }

    /// The current configuration snapshot.
    pub fn config(&self) -> Arc<PrintConfig> {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Swap in a new configuration for subsequent requests.
    pub fn replace_config(&self, config: PrintConfig) {
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(config);
        info!("print configuration replaced");
    }

    /// Run `event` through the pipeline; `true` only when a card was printed.
    pub fn generate_card(&self, event: &CredentialEvent) -> bool {
        self.process(event).is_printed()
    }

    /// Run `event` through the pipeline.
    #[instrument(skip_all, fields(request_id = %event.transaction_id, event_id = %event.id))]
    pub fn process(&self, event: &CredentialEvent) -> PrintOutcome {
        let config = self.config();
        let request_id = event.transaction_id.as_str();

        if let Err(err) = self.publish(&config, request_id, PrintStatus::Received, None) {
            error!(error = %err, "could not publish RECEIVED status");
            return PrintOutcome::Skipped(SkipReason::Intake(err));
        }

        let plaintext = match self.intake(event) {
            Ok(plaintext) => plaintext,
            Err(err) => {
                error!(error = %err, "credential could not be acquired or decrypted");
                return PrintOutcome::Skipped(SkipReason::Intake(err));
            }
        };

        let gate = VerifierGate::new(config.verify_credentials);
        if let Err(failure) = gate.check(&plaintext, self.collaborators.proof_verifier.as_ref()) {
            error!(
                %failure,
                "credential failed verification and will not be printed"
            );
            return PrintOutcome::Skipped(SkipReason::Rejected(failure));
        }

        let mut subject_id = None;
        match self.print(&config, event, &plaintext, &mut subject_id) {
            Ok(artifacts) => {
                self.record_audit(&status::success_record(subject_id));
                info!(url = %artifacts.url, "credential printed");
                PrintOutcome::Printed(artifacts)
            }
            Err(err) => {
                error!(error = %err, code = failure_code(&err).code, "print processing failed");
                if let Err(publish_err) = self.publish(&config, request_id, PrintStatus::Error, None)
                {
                    error!(error = %publish_err, "could not publish ERROR status");
                }
                self.record_audit(&status::failure_record(&err, subject_id));
                PrintOutcome::Failed(err)
            }
        }
    }

    // -- Stages ---------------------------------------------------------------

    fn intake(&self, event: &CredentialEvent) -> Result<String> {
        let ciphertext = credential::acquire(event, self.collaborators.credential_source.as_ref())?;
        self.collaborators.credential_decryptor.decrypt(&ciphertext)
    }

    /// Processing after the gate. `subject_id` is set as soon as the UIN is
    /// read, so the failure audit entry can name the subject.
    fn print(
        &self,
        config: &PrintConfig,
        event: &CredentialEvent,
        plaintext: &str,
        subject_id: &mut Option<String>,
    ) -> Result<PrintArtifacts> {
        let c = &self.collaborators;

        let DecryptedCredential {
            document,
            mut subject,
        } = DecryptedCredential::parse(plaintext)?;
        let protected = protected_attributes(&document);
        decrypt_protected_attributes(
            &mut subject,
            &protected,
            event.data.protection_key.as_deref(),
            c.pin_decryptor.as_ref(),
        )?;

        let mut attributes = AttributeMap::new();
        let photo_set = self.set_applicant_photo(&subject, &mut attributes)?;

        let uin = subject
            .get(UIN)
            .filter(|v| !v.is_null())
            .map(Node::display_string)
            .ok_or_else(|| CardwerkError::IdentityNotFound("UIN missing from credential subject".into()))?;
        *subject_id = Some(uin.clone());

        let password = if config.password_protected {
            let derived = derive_password(
                &subject,
                config.password_fields.as_deref(),
                &config.template_language,
                config.password_segment_length,
            )?;
            if derived.is_empty() {
                warn!("no password field resolved; card will not be protected");
                None
            } else {
                Some(derived)
            }
        } else {
            None
        };

        let credential_type = CredentialType::parse(&event.data.credential_type);
        let (qr_set, text_file) = match credential_type {
            CredentialType::QrCode => {
                let qr_set = set_qr_code(
                    c.qr_encoder.as_ref(),
                    &subject,
                    QrMode::Plain,
                    photo_set,
                    config.qr_version,
                    &mut attributes,
                )?;
                (qr_set, None)
            }
            other => {
                if !photo_set {
                    debug!("applicant photo not set");
                }
                let identity = FieldMapping::from_identity_json(
                    &c.mapping_source.identity_mapping()?,
                    &config.demographic_identity_key,
                )?;
                set_template_attributes(
                    &subject,
                    &identity,
                    &config.supported_languages,
                    &mut attributes,
                )?;
                attributes.insert(UIN, uin.as_str());

                let print_text =
                    FieldMapping::from_print_text_json(&c.mapping_source.print_text_mapping()?)?;
                let text_file =
                    create_text_file(&subject, &print_text, &config.supported_languages)?;

                let mode = if other == CredentialType::EuinWithFaceQr {
                    QrMode::FaceEmbed
                } else {
                    QrMode::Plain
                };
                let qr_set = set_qr_code(
                    c.qr_encoder.as_ref(),
                    &subject,
                    mode,
                    photo_set,
                    config.qr_version,
                    &mut attributes,
                )?;
                (qr_set, Some(text_file))
            }
        };
        if !qr_set {
            debug!("QR code not set");
        }

        let template = c
            .template_renderer
            .render(&config.template_name, &attributes, &config.template_language)?
            .filter(|bytes| !bytes.is_empty())
            .ok_or_else(|| CardwerkError::TemplateRender("template produced no output".into()))?;

        let pdf = c
            .card_generator
            .generate(&template, CardKind::Pdf, password.as_deref())?;
        debug!(bytes = pdf.len(), sha256 = %hash_bytes(&pdf), "card generated");

        let url = c.uploader.upload(&pdf, &config.policy_id, &config.partner_id)?;
        if url.is_empty() {
            return Err(CardwerkError::Upload("data share returned no URL".into()));
        }
        self.publish(
            config,
            &event.transaction_id,
            PrintStatus::Printed,
            Some(url.clone()),
        )?;

        Ok(PrintArtifacts {
            pdf,
            text_file,
            url,
            photo_set,
            qr_set,
        })
    }

    /// Extract the face image when the subject carries a biometric container.
    ///
    /// Any Face record that parses counts as a set photo, even one with an
    /// empty image, so the QR payload never carries the raw container.
    /// `isPhotoSet` is recorded whenever a container was present.
    fn set_applicant_photo(&self, subject: &Node, attributes: &mut AttributeMap) -> Result<bool> {
        let Some(container) = subject.get(BIOMETRICS).filter(|v| !v.is_null()) else {
            return Ok(false);
        };
        let container = container.as_str().ok_or_else(|| {
            CardwerkError::BiometricParse("biometrics field is not a string".into())
        })?;

        let image = extract_applicant_face(self.collaborators.biometrics.as_ref(), container)?;
        let photo_set = match image {
            Some(image) => {
                if image.is_empty() {
                    debug!("face record holds an empty image");
                }
                attributes.insert(APPLICANT_PHOTO, png_data_uri(&image));
                true
            }
            None => false,
        };
        attributes.insert(IS_PHOTO_SET, photo_set.to_string());
        Ok(photo_set)
    }

    // -- Reporting ------------------------------------------------------------

    fn publish(
        &self,
        config: &PrintConfig,
        request_id: &str,
        status: PrintStatus,
        url: Option<String>,
    ) -> Result<()> {
        let envelope = status::status_event(&config.status_topic, request_id, status, url);
        self.collaborators
            .publisher
            .publish(&config.status_topic, &envelope)?;
        debug!(%status, event_id = %envelope.event.id, "status published");
        Ok(())
    }

    fn record_audit(&self, record: &AuditRecord) {
        if let Err(err) = self.collaborators.audit.record(record) {
            error!(error = %err, event_id = %record.event_id, "could not write audit entry");
        }
    }
}
