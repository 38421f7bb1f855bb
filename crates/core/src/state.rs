// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job lifecycle state and machine topology as reported by the service.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::id::JobId;

/// Lifecycle state of a job allocation.
///
/// The service owns all transitions; clients only observe them. The normal
/// forward progression is `Queued` → `Power` → `Ready`; `Power` is re-entered
/// from `Ready` while boards are being (re)powered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// The service has no record of the job (it never existed or has been
    /// forgotten).
    #[default]
    Unknown,
    /// Waiting for a free partition.
    Queued,
    /// Boards allocated, power state in flux.
    Power,
    /// Boards allocated and powered; the allocation is usable.
    Ready,
    /// The allocation has been released.
    Destroyed,
}

impl JobState {
    /// Check whether the allocation is gone for good.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Unknown | JobState::Destroyed)
    }
}

crate::simple_display! {
    JobState {
        Unknown => "unknown",
        Queued => "queued",
        Power => "power",
        Ready => "ready",
        Destroyed => "destroyed",
    }
}

/// Point-in-time status read of a job.
///
/// Always fetched fresh; holding one across other calls means holding stale
/// data.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub state: JobState,
    /// Whether the boards are powered, when the job has boards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<bool>,
    /// Keepalive interval the allocation was registered with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keepalive: Option<Duration>,
    /// Server-supplied explanation for a destroyed job.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Physical location of a board within the machine, as a coordinate triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardCoord {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

/// A network connection into the allocation: the hostname fronting one chip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// `(x, y)` chip coordinate relative to the allocation.
    pub chip: (u32, u32),
    pub hostname: String,
}

/// Topology of the hardware backing a job.
///
/// Every field is `None` until the job has actually been allocated boards
/// (state `Ready` or `Power`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MachineInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connections: Option<Vec<Connection>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boards: Option<Vec<BoardCoord>>,
}

impl MachineInfo {
    /// Check whether the job is backed by actual hardware yet.
    pub fn is_allocated(&self) -> bool {
        self.width.is_some()
    }

    /// Hostname fronting the given chip coordinate.
    pub fn connection_to(&self, chip: (u32, u32)) -> Option<&str> {
        self.connections
            .as_deref()?
            .iter()
            .find(|c| c.chip == chip)
            .map(|c| c.hostname.as_str())
    }

    /// Hostname of the allocation's root chip, the usual entry point.
    pub fn root_hostname(&self) -> Option<&str> {
        self.connection_to((0, 0))
    }
}

/// Unsolicited push event from the service.
///
/// The payloads name what changed; watchers treat any arrival as a cue to
/// re-read the state they care about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Notification {
    JobsChanged(Vec<JobId>),
    MachinesChanged(Vec<String>),
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
