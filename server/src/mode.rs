//! Process-wide behavioural mode.
//!
//! The controller is built once from configuration and shared read-only. It is
//! also the only place that picks between the vulnerable and secure strategy
//! objects, so no call site ever branches on the mode itself.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::SecurityConfig;
use crate::db::query::{ParameterBound, QueryStrategy, RawInterpolated};
use crate::policy::{SecurePolicy, SecurityPolicy, VulnerablePolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Vulnerable,
    Secure,
}

impl Mode {
    pub fn from_flag(vulnerable: bool) -> Self {
        if vulnerable {
            Mode::Vulnerable
        } else {
            Mode::Secure
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Vulnerable => f.write_str("vulnerable"),
            Mode::Secure => f.write_str("secure"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeController {
    mode: Mode,
    token_ttl: Duration,
}

impl ModeController {
    pub fn new(mode: Mode, token_ttl: Duration) -> Self {
        Self { mode, token_ttl }
    }

    pub fn from_config(security: &SecurityConfig) -> Self {
        Self::new(
            Mode::from_flag(security.vulnerable),
            Duration::from_secs(security.token_ttl_seconds),
        )
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    pub fn is_vulnerable(&self) -> bool {
        self.mode == Mode::Vulnerable
    }

    pub fn query_strategy(&self) -> Arc<dyn QueryStrategy> {
        match self.mode {
            Mode::Vulnerable => Arc::new(RawInterpolated),
            Mode::Secure => Arc::new(ParameterBound),
        }
    }

    pub fn policy(&self) -> Arc<dyn SecurityPolicy> {
        match self.mode {
            Mode::Vulnerable => Arc::new(VulnerablePolicy::new()),
            Mode::Secure => Arc::new(SecurePolicy::new()),
        }
    }
}
