// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The transport seam between the client core and the allocation service.
//!
//! [`ServiceConnection`] is the full RPC surface the client consumes. The
//! wire encoding behind it is someone else's problem: a real transport
//! implements this trait over its socket of choice, and tests substitute
//! the scripted `fake::FakeConnection`.
//!
//! Connections are owned by exactly one thread. The [`Job`] holds one for
//! the caller's synchronous calls and hands a second, independent one to
//! its keepalive worker, so the two threads never interleave requests on a
//! shared stream.
//!
//! [`Job`]: crate::job::Job

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use bl_core::{JobId, MachineInfo, Notification, StateSnapshot, Version};

/// Lowest service version this client speaks.
pub const MIN_SUPPORTED_VERSION: Version = Version::new(1, 0, 0);
/// First service version this client no longer speaks (half-open range).
pub const MAX_SUPPORTED_VERSION: Version = Version::new(2, 0, 0);

/// Errors from connection-level operations.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// A bounded wait elapsed before the server said anything. Retryable.
    #[error("operation timed out")]
    Timeout,

    /// The transport dropped. The connection must be re-established with
    /// [`ServiceConnection::connect`] before further use.
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    /// The server answered with something the protocol does not allow.
    /// Not retryable.
    #[error("protocol violation: {0}")]
    Protocol(String),
}

/// Parameters for registering a new job with the service.
///
/// `machine` and `tags` are mutually exclusive allocation hints; the
/// service picks any suitable partition when both are absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateJobRequest {
    pub owner: String,
    /// Heartbeat interval the service should expect; absence disables
    /// server-side reclamation.
    pub keepalive: Option<Duration>,
    pub machine: Option<String>,
    pub tags: Option<Vec<String>>,
    /// Minimum acceptable ratio of a board group the allocation may span.
    pub min_ratio: f64,
    pub max_dead_boards: Option<u32>,
    pub max_dead_links: Option<u32>,
    pub require_torus: bool,
    /// Per-RPC timeout the transport should apply to this request.
    pub timeout: Option<Duration>,
}

/// Request/response + push-notification transport to the allocation
/// service.
///
/// All calls block. Every method other than [`wait_for_notification`]
/// is expected to return promptly, bounded only by the transport's own
/// connect/read behavior.
///
/// [`wait_for_notification`]: ServiceConnection::wait_for_notification
pub trait ServiceConnection {
    /// (Re-)establish the underlying transport.
    fn connect(&mut self) -> Result<(), ConnectionError>;

    fn close(&mut self) -> Result<(), ConnectionError>;

    /// Protocol revision the server reports, as a raw dotted string.
    fn version(&mut self) -> Result<String, ConnectionError>;

    fn create_job(&mut self, request: &CreateJobRequest) -> Result<JobId, ConnectionError>;

    fn get_job_state(&mut self, id: JobId) -> Result<StateSnapshot, ConnectionError>;

    /// Topology of the hardware backing the job; all fields absent while
    /// nothing is allocated.
    fn get_job_machine_info(&mut self, id: JobId) -> Result<MachineInfo, ConnectionError>;

    fn power_on_job_boards(&mut self, id: JobId) -> Result<(), ConnectionError>;

    fn power_off_job_boards(&mut self, id: JobId) -> Result<(), ConnectionError>;

    fn destroy_job(&mut self, id: JobId, reason: Option<&str>) -> Result<(), ConnectionError>;

    /// Heartbeat proving the client still wants its allocation.
    fn job_keepalive(&mut self, id: JobId) -> Result<(), ConnectionError>;

    /// Block until the service pushes an unsolicited state-change event.
    ///
    /// Three outcomes: a notification arrives, the bounded wait elapses
    /// ([`ConnectionError::Timeout`]), or the transport fails. `None`
    /// blocks indefinitely.
    fn wait_for_notification(
        &mut self,
        timeout: Option<Duration>,
    ) -> Result<Notification, ConnectionError>;
}

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub mod fake;
