// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client error taxonomy.
//!
//! Callers branch on these kinds: a timeout from [`Job::wait_until_ready`]
//! means "try again or give up", a destroyed job means "stop, the lease is
//! gone", and a configuration or version error means the request never
//! stood a chance. Keep them distinct.
//!
//! [`Job::wait_until_ready`]: crate::job::Job::wait_until_ready

use bl_core::Version;
use thiserror::Error;

use crate::conn::ConnectionError;

#[derive(Debug, Error)]
pub enum Error {
    /// The construction parameters were rejected before any RPC was issued.
    #[error("configuration error: {0}")]
    Config(String),

    /// The server speaks a protocol revision outside the supported range.
    #[error("server version {found} is unsupported (requires >= {min} and < {max})")]
    Version {
        found: Version,
        min: Version,
        max: Version,
    },

    /// The job no longer exists (or never did), with the server's
    /// explanation when it gave one.
    #[error("job destroyed: {}", reason.as_deref().unwrap_or("no reason given"))]
    Destroyed { reason: Option<String> },

    /// The deadline elapsed before the allocation became ready.
    #[error("timed out waiting for the job to become ready")]
    StateChangeTimeout,

    /// A connection-level failure surfaced from a one-shot call.
    #[error(transparent)]
    Connection(#[from] ConnectionError),
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
