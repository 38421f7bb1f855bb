// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Construction-time configuration for a [`Job`](crate::job::Job).
//!
//! Explicit arguments over defaults, nothing process-wide: the caller
//! builds one [`JobConfig`] and hands it to `Job::create`. Config-file
//! discovery and command-line parsing live with the caller.

use std::time::Duration;

use bl_core::JobId;

use crate::conn::CreateJobRequest;
use crate::error::Error;

pub const DEFAULT_PORT: u16 = 20883;
pub const DEFAULT_KEEPALIVE: Duration = Duration::from_secs(60);
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default minimum acceptable ratio of a board group an allocation spans.
pub const DEFAULT_MIN_RATIO: f64 = 0.333;

/// Configuration for creating (or resuming) a job.
#[derive(Debug, Clone)]
pub struct JobConfig {
    /// Allocation server hostname. Required.
    pub host: String,
    pub port: u16,
    /// Identity the allocation is accounted to. Required.
    pub owner: String,
    /// Pin the allocation to one named machine. Excludes `tags`.
    pub machine: Option<String>,
    /// Restrict the allocation to machines carrying all of these tags.
    /// Excludes `machine`.
    pub tags: Option<Vec<String>>,
    pub min_ratio: f64,
    pub max_dead_boards: Option<u32>,
    pub max_dead_links: Option<u32>,
    pub require_torus: bool,
    /// Heartbeat interval; `None` disables the keepalive worker (and
    /// server-side reclamation).
    pub keepalive: Option<Duration>,
    /// Pause before each reconnection attempt after a transport failure.
    pub reconnect_delay: Duration,
    /// Per-RPC timeout the transport applies.
    pub timeout: Option<Duration>,
    /// Attach to this existing job instead of creating one.
    pub resume_job_id: Option<JobId>,
}

impl JobConfig {
    pub fn builder(host: impl Into<String>, owner: impl Into<String>) -> JobConfigBuilder {
        JobConfigBuilder {
            host: host.into(),
            port: DEFAULT_PORT,
            owner: owner.into(),
            machine: None,
            tags: None,
            min_ratio: DEFAULT_MIN_RATIO,
            max_dead_boards: Some(0),
            max_dead_links: None,
            require_torus: false,
            keepalive: Some(DEFAULT_KEEPALIVE),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            timeout: Some(DEFAULT_TIMEOUT),
            resume_job_id: None,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.host.trim().is_empty() {
            return Err(Error::Config("an allocation server hostname is required".into()));
        }
        if self.owner.trim().is_empty() {
            return Err(Error::Config("an owner identity is required".into()));
        }
        if self.machine.is_some() && self.tags.is_some() {
            return Err(Error::Config(
                "machine and tags are mutually exclusive allocation hints".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn to_create_request(&self) -> CreateJobRequest {
        CreateJobRequest {
            owner: self.owner.clone(),
            keepalive: self.keepalive,
            machine: self.machine.clone(),
            tags: self.tags.clone(),
            min_ratio: self.min_ratio,
            max_dead_boards: self.max_dead_boards,
            max_dead_links: self.max_dead_links,
            require_torus: self.require_torus,
            timeout: self.timeout,
        }
    }
}

pub struct JobConfigBuilder {
    host: String,
    port: u16,
    owner: String,
    machine: Option<String>,
    tags: Option<Vec<String>>,
    min_ratio: f64,
    max_dead_boards: Option<u32>,
    max_dead_links: Option<u32>,
    require_torus: bool,
    keepalive: Option<Duration>,
    reconnect_delay: Duration,
    timeout: Option<Duration>,
    resume_job_id: Option<JobId>,
}

impl JobConfigBuilder {
    bl_core::setters! {
        set {
            port: u16,
            min_ratio: f64,
            require_torus: bool,
            reconnect_delay: Duration,
        }
        option {
            machine: String,
            tags: Vec<String>,
            max_dead_boards: u32,
            max_dead_links: u32,
            keepalive: Duration,
            timeout: Duration,
            resume_job_id: JobId,
        }
    }

    /// Disable the background heartbeat entirely.
    pub fn no_keepalive(mut self) -> Self {
        self.keepalive = None;
        self
    }

    pub fn build(self) -> JobConfig {
        JobConfig {
            host: self.host,
            port: self.port,
            owner: self.owner,
            machine: self.machine,
            tags: self.tags,
            min_ratio: self.min_ratio,
            max_dead_boards: self.max_dead_boards,
            max_dead_links: self.max_dead_links,
            require_torus: self.require_torus,
            keepalive: self.keepalive,
            reconnect_delay: self.reconnect_delay,
            timeout: self.timeout,
            resume_job_id: self.resume_job_id,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
