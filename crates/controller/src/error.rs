// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for provider calls and analytics fetches.

use serde::Serialize;
use thiserror::Error;

/// Errors reported by an external provider.
///
/// Cloneable so one failed shared load can be handed to every waiter.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProviderError {
    /// The request could not be completed.
    #[error("Request failed: {message}")]
    Request { message: String },

    /// The provider has nothing for the requested key.
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// The provider answered with data the controller could not use.
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },
}

/// Errors surfaced for the live analytics fetch.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FetchError {
    /// The analytics provider failed.
    #[error(transparent)]
    Provider { source: ProviderError },

    /// No response arrived within the configured timeout.
    #[error("No response within {after_ms} ms")]
    TimedOut { after_ms: u64 },
}

impl From<ProviderError> for FetchError {
    fn from(source: ProviderError) -> Self {
        Self::Provider { source }
    }
}
