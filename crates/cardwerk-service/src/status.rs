// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Status events and audit records emitted by the print service.

use cardwerk_core::codes::{FailureCode, PRINT_SUCCESS, failure_code};
use cardwerk_core::error::CardwerkError;
use cardwerk_core::types::{AuditRecord, CredentialStatusEvent, PrintStatus, StatusEvent};
use chrono::Utc;

/// Publisher name on status events and module name on audit records.
pub const PRINT_SERVICE: &str = "PRINT_SERVICE";

/// Wrap a fresh status event in its topic envelope.
pub fn status_event(
    topic: &str,
    request_id: &str,
    status: PrintStatus,
    url: Option<String>,
) -> CredentialStatusEvent {
    CredentialStatusEvent {
        publisher: PRINT_SERVICE.to_owned(),
        topic: topic.to_owned(),
        published_on: Utc::now(),
        event: StatusEvent::new(request_id, status, url),
    }
}

/// Audit record for a printed credential.
pub fn success_record(subject_id: Option<String>) -> AuditRecord {
    record(PRINT_SUCCESS, "RPR_402", "UPDATE", "BUSINESS", subject_id)
}

/// Audit record for a request that failed after verification.
pub fn failure_record(err: &CardwerkError, subject_id: Option<String>) -> AuditRecord {
    record(failure_code(err), "RPR_405", "EXCEPTION", "SYSTEM", subject_id)
}

fn record(
    code: FailureCode,
    event_id: &str,
    event_name: &str,
    event_type: &str,
    subject_id: Option<String>,
) -> AuditRecord {
    AuditRecord {
        message: code.message.to_owned(),
        event_id: event_id.to_owned(),
        event_name: event_name.to_owned(),
        event_type: event_type.to_owned(),
        module_id: code.code.to_owned(),
        module_name: PRINT_SERVICE.to_owned(),
        subject_id,
    }
}
