// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::time::Duration;

/// Default time an analytics fetch may take before it is marked abandoned.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Controller configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    /// How long the live fetch may take before a retry is offered.
    pub fetch_timeout: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

impl ControllerConfig {
    /// Returns a copy with a different fetch timeout.
    #[must_use]
    pub const fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }
}
