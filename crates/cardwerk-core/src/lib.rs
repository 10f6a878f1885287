// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Cardwerk: Core types, error definitions and collaborator traits shared
// across all crates.

pub mod codes;
pub mod config;
pub mod error;
pub mod node;
pub mod traits;
pub mod types;

pub use config::PrintConfig;
pub use error::{CardwerkError, CryptoKind, Result, VerificationFailure};
pub use node::Node;
pub use types::*;
