// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Credential verifier gate: decides whether a decrypted credential may be
// printed at all.

use cardwerk_core::error::VerificationFailure;
use cardwerk_core::node::Node;
use cardwerk_core::traits::{ProofError, ProofVerifier};
use tracing::{info, instrument, warn};

/// Credential member holding the proof block.
pub const PROOF: &str = "proof";

/// Hard gate in front of the print pipeline.
///
/// Disabled gates always pass. Enabled gates require a proof block and a
/// positive answer from the proof verifier.
#[derive(Debug, Clone, Copy)]
pub struct VerifierGate {
    enabled: bool,
}

impl VerifierGate {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Check a decrypted credential.
    #[instrument(skip_all, fields(enabled = self.enabled))]
    pub fn check(
        &self,
        credential: &str,
        verifier: &dyn ProofVerifier,
    ) -> Result<(), VerificationFailure> {
        if !self.enabled {
            return Ok(());
        }
        info!("received credential is configured to be verified");

        let has_proof = Node::parse(credential)
            .map(|doc| doc.get(PROOF).is_some_and(Node::is_object))
            .unwrap_or(false);
        if !has_proof {
            warn!("proof document is not available in the received credential");
            return Err(VerificationFailure::ProofDocumentMissing);
        }

        match verifier.verify(credential) {
            Ok(true) => Ok(()),
            Ok(false) => Err(VerificationFailure::NotVerified(
                "proof did not verify".into(),
            )),
            Err(ProofError::ProofDocumentMissing) => Err(VerificationFailure::ProofDocumentMissing),
            Err(ProofError::ProofTypeUnknown) => Err(VerificationFailure::ProofTypeUnrecognized),
            Err(ProofError::PublicKeyUnresolvable) => Err(VerificationFailure::NotVerified(
                "verification key could not be resolved".into(),
            )),
            Err(ProofError::Unknown(detail)) => Err(VerificationFailure::NotVerified(detail)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedVerifier(Result<bool, ProofError>);

    impl ProofVerifier for FixedVerifier {
        fn verify(&self, _credential: &str) -> Result<bool, ProofError> {
            self.0.clone()
        }
    }

    const WITH_PROOF: &str = r#"{"credentialSubject":{},"proof":{"type":"RsaSignature2018"}}"#;

    #[test]
    fn disabled_gate_always_passes() {
        let gate = VerifierGate::new(false);
        assert!(gate.check("not even json", &FixedVerifier(Ok(false))).is_ok());
    }

    #[test]
    fn missing_proof_short_circuits() {
        let gate = VerifierGate::new(true);
        let result = gate.check(r#"{"credentialSubject":{}}"#, &FixedVerifier(Ok(true)));
        assert_eq!(result, Err(VerificationFailure::ProofDocumentMissing));
    }

    #[test]
    fn verified_credential_passes() {
        let gate = VerifierGate::new(true);
        assert!(gate.check(WITH_PROOF, &FixedVerifier(Ok(true))).is_ok());
    }

    #[test]
    fn failure_classes_are_distinguished() {
        let gate = VerifierGate::new(true);
        assert_eq!(
            gate.check(WITH_PROOF, &FixedVerifier(Err(ProofError::ProofTypeUnknown))),
            Err(VerificationFailure::ProofTypeUnrecognized)
        );
        assert!(matches!(
            gate.check(WITH_PROOF, &FixedVerifier(Ok(false))),
            Err(VerificationFailure::NotVerified(_))
        ));
        assert!(matches!(
            gate.check(WITH_PROOF, &FixedVerifier(Err(ProofError::PublicKeyUnresolvable))),
            Err(VerificationFailure::NotVerified(_))
        ));
        assert!(matches!(
            gate.check(WITH_PROOF, &FixedVerifier(Err(ProofError::Unknown("boom".into())))),
            Err(VerificationFailure::NotVerified(_))
        ));
    }
}
