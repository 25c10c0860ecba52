// SPDX-License-Identifier: GPL-3.0-only

//! Camera permission subsystem
//!
//! The orchestrator asks once at mount and then only through the explicit
//! request action. Nothing here caches a grant across mounts.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::info;

/// Camera access grant state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    /// Not asked yet (or the platform would not say)
    #[default]
    Unknown,
    Granted,
    Denied,
}

impl PermissionState {
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionState::Granted)
    }
}

impl std::fmt::Display for PermissionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PermissionState::Unknown => write!(f, "unknown"),
            PermissionState::Granted => write!(f, "granted"),
            PermissionState::Denied => write!(f, "denied"),
        }
    }
}

/// Platform permission API
#[async_trait]
pub trait PermissionProvider: Send + Sync {
    /// Current grant state, without prompting
    async fn query(&self) -> PermissionState;

    /// Prompt for camera access
    ///
    /// Resolves to `Granted` or `Denied`.
    async fn request(&self) -> PermissionState;
}

/// In-memory permission provider
///
/// Starts in a configurable state and answers every prompt with a fixed
/// outcome after an optional delay.
pub struct VirtualPermission {
    state: Mutex<PermissionState>,
    grant_on_request: bool,
    prompt_delay: Duration,
    requests: AtomicU32,
}

impl VirtualPermission {
    pub fn new(initial: PermissionState, grant_on_request: bool) -> Self {
        Self {
            state: Mutex::new(initial),
            grant_on_request,
            prompt_delay: Duration::ZERO,
            requests: AtomicU32::new(0),
        }
    }

    /// Already granted before mount
    pub fn granted() -> Self {
        Self::new(PermissionState::Granted, true)
    }

    /// Simulate the user taking `delay` to answer the prompt
    pub fn with_prompt_delay(mut self, delay: Duration) -> Self {
        self.prompt_delay = delay;
        self
    }

    /// How many times the prompt was shown
    pub fn requests(&self) -> u32 {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PermissionProvider for VirtualPermission {
    async fn query(&self) -> PermissionState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn request(&self) -> PermissionState {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if !self.prompt_delay.is_zero() {
            tokio::time::sleep(self.prompt_delay).await;
        }

        let outcome = if self.grant_on_request {
            PermissionState::Granted
        } else {
            PermissionState::Denied
        };
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = outcome;

        info!(%outcome, "Camera permission prompt answered");
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_request_updates_query() {
        let provider = VirtualPermission::new(PermissionState::Unknown, true);
        assert_eq!(provider.query().await, PermissionState::Unknown);

        assert_eq!(provider.request().await, PermissionState::Granted);
        assert_eq!(provider.query().await, PermissionState::Granted);
        assert_eq!(provider.requests(), 1);
    }

    #[tokio::test]
    async fn test_denial_sticks() {
        let provider = VirtualPermission::new(PermissionState::Unknown, false);
        assert_eq!(provider.request().await, PermissionState::Denied);
        assert_eq!(provider.request().await, PermissionState::Denied);
        assert_eq!(provider.requests(), 2);
    }
}
