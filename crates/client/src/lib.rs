// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! bl-client: Client core for leasing board partitions from a boardlease
//! allocation server.
//!
//! A [`Job`] is one exclusive lease over a partition of a multi-board
//! cluster. The client creates (or resumes) the job over a caller-owned
//! [`ServiceConnection`], heartbeats it from a dedicated worker thread with
//! its own connection, blocks until the allocation is ready, and releases
//! the lease on every exit path.
//!
//! The wire encoding is deliberately not part of this crate: any transport
//! that implements [`ServiceConnection`] plugs in, and the scripted
//! `FakeConnection` (behind the `test-support` feature) stands in for one
//! in tests.

pub mod config;
pub mod conn;
pub mod error;
pub mod job;

mod keepalive;
mod timing;

pub use config::{JobConfig, JobConfigBuilder};
pub use conn::{
    ConnectionError, CreateJobRequest, ServiceConnection, MAX_SUPPORTED_VERSION,
    MIN_SUPPORTED_VERSION,
};
pub use error::Error;
pub use job::Job;

#[cfg(any(test, feature = "test-support"))]
pub use conn::fake::{Call, FakeConnection, RpcOutcome, WaitOutcome};

// Re-export the protocol value types so callers rarely need bl-core directly.
pub use bl_core::{
    BoardCoord, Connection, JobId, JobState, MachineInfo, Notification, StateSnapshot, Version,
};
