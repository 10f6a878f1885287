// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// cardwerk-service: The print orchestrator. Ties credential intake, the
// verifier gate and document assembly together, and reports every outcome
// as status events and audit entries.

pub mod credential;
pub mod mapping_source;
pub mod pipeline;
pub mod status;

pub use credential::DecryptedCredential;
pub use mapping_source::FileMappingSource;
pub use pipeline::{Collaborators, PrintArtifacts, PrintOutcome, PrintService, SkipReason};
pub use status::PRINT_SERVICE;
