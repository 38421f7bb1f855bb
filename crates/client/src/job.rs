// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The job façade: one exclusive lease over a board partition.
//!
//! A `Job` owns two independent connections — one for the caller's
//! synchronous calls, one handed to the keepalive worker — so the two
//! threads never interleave requests on a shared stream. The service owns
//! all job state; the client re-reads it on demand and caches only the
//! machine topology, which is stable for the life of an allocation.

use std::collections::HashMap;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use bl_core::{BoardCoord, JobId, JobState, MachineInfo, StateSnapshot, Version};

use crate::config::JobConfig;
use crate::conn::{
    ConnectionError, ServiceConnection, MAX_SUPPORTED_VERSION, MIN_SUPPORTED_VERSION,
};
use crate::error::Error;
use crate::keepalive::{self, KeepaliveHandle};
use crate::timing::{deadline_after, expired, notification_wait_slice, time_left};

pub struct Job<C: ServiceConnection + Send + 'static> {
    id: JobId,
    conn: C,
    keepalive_interval: Option<Duration>,
    reconnect_delay: Duration,
    machine_info: Option<MachineInfo>,
    keepalive: Option<KeepaliveHandle>,
    destroyed: bool,
}

impl<C: ServiceConnection + Send + 'static> std::fmt::Debug for Job<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Job")
            .field("id", &self.id)
            .field("keepalive_interval", &self.keepalive_interval)
            .field("reconnect_delay", &self.reconnect_delay)
            .field("machine_info", &self.machine_info)
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}

impl<C: ServiceConnection + Send + 'static> Job<C> {
    /// Create a new allocation, or resume the one named by
    /// `config.resume_job_id`.
    ///
    /// Checks the server's protocol version against the supported range
    /// before any allocation RPC. Resuming a job whose state is already
    /// terminal fails with [`Error::Destroyed`]. On success the keepalive
    /// worker is already heartbeating on `keepalive_conn`.
    pub fn create(config: JobConfig, mut conn: C, keepalive_conn: C) -> Result<Self, Error> {
        config.validate()?;

        let reported = conn.version()?;
        let found: Version = reported
            .parse()
            .map_err(|err: bl_core::ParseVersionError| ConnectionError::Protocol(err.to_string()))?;
        if found < MIN_SUPPORTED_VERSION || found >= MAX_SUPPORTED_VERSION {
            return Err(Error::Version {
                found,
                min: MIN_SUPPORTED_VERSION,
                max: MAX_SUPPORTED_VERSION,
            });
        }

        let mut keepalive_interval = config.keepalive;
        let id = match config.resume_job_id {
            Some(id) => {
                let snapshot = conn.get_job_state(id)?;
                if snapshot.state.is_terminal() {
                    return Err(Error::Destroyed { reason: snapshot.reason });
                }
                // Heartbeat at the cadence the allocation was registered
                // with, not whatever this client happens to be configured
                // for.
                if snapshot.keepalive.is_some() {
                    keepalive_interval = snapshot.keepalive;
                }
                info!(job = %id, state = %snapshot.state, "resumed existing job");
                id
            }
            None => {
                let request = config.to_create_request();
                let id = conn.create_job(&request)?;
                info!(job = %id, owner = %request.owner, "created job");
                id
            }
        };

        let keepalive = match keepalive_interval {
            Some(interval) => Some(
                keepalive::spawn(keepalive_conn, id, interval, config.reconnect_delay)
                    .map_err(ConnectionError::Io)?,
            ),
            None => None,
        };

        Ok(Job {
            id,
            conn,
            keepalive_interval,
            reconnect_delay: config.reconnect_delay,
            machine_info: None,
            keepalive,
            destroyed: false,
        })
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    /// Interval the keepalive worker is heartbeating at, if any.
    pub fn keepalive_interval(&self) -> Option<Duration> {
        self.keepalive_interval
    }

    fn snapshot(&mut self) -> Result<StateSnapshot, Error> {
        Ok(self.conn.get_job_state(self.id)?)
    }

    /// Current lifecycle state. Issues a fresh RPC on every call; state is
    /// volatile and never cached.
    pub fn state(&mut self) -> Result<JobState, Error> {
        Ok(self.snapshot()?.state)
    }

    /// Whether the boards are powered. Fresh RPC per call.
    pub fn power(&mut self) -> Result<Option<bool>, Error> {
        Ok(self.snapshot()?.power)
    }

    /// Server-supplied destruction reason, if any. Fresh RPC per call.
    pub fn reason(&mut self) -> Result<Option<String>, Error> {
        Ok(self.snapshot()?.reason)
    }

    /// Topology of the allocated hardware.
    ///
    /// Fetched once and cached for the life of the Job; call
    /// [`invalidate_machine_info`](Self::invalidate_machine_info) to force
    /// a re-fetch. All fields are absent until boards are allocated.
    pub fn machine_info(&mut self) -> Result<&MachineInfo, Error> {
        let info = match self.machine_info.take() {
            Some(info) => info,
            None => self.conn.get_job_machine_info(self.id)?,
        };
        Ok(self.machine_info.insert(info))
    }

    /// Drop the cached topology so the next accessor re-fetches it.
    pub fn invalidate_machine_info(&mut self) {
        self.machine_info = None;
    }

    /// Hostname of the allocation's root chip, the usual entry point.
    pub fn hostname(&mut self) -> Result<Option<String>, Error> {
        Ok(self.machine_info()?.root_hostname().map(String::from))
    }

    /// Chip-coordinate → hostname map for the allocation.
    pub fn connections(&mut self) -> Result<Option<HashMap<(u32, u32), String>>, Error> {
        Ok(self
            .machine_info()?
            .connections
            .as_ref()
            .map(|list| list.iter().map(|c| (c.chip, c.hostname.clone())).collect()))
    }

    pub fn width(&mut self) -> Result<Option<u32>, Error> {
        Ok(self.machine_info()?.width)
    }

    pub fn height(&mut self) -> Result<Option<u32>, Error> {
        Ok(self.machine_info()?.height)
    }

    pub fn machine_name(&mut self) -> Result<Option<String>, Error> {
        Ok(self.machine_info()?.machine_name.clone())
    }

    pub fn boards(&mut self) -> Result<Option<Vec<BoardCoord>>, Error> {
        Ok(self.machine_info()?.boards.clone())
    }

    /// Power the job's boards on or off.
    ///
    /// No local state changes; re-read [`state`](Self::state) or
    /// [`power`](Self::power) to observe the effect.
    pub fn set_power(&mut self, on: bool) -> Result<(), Error> {
        debug!(job = %self.id, on, "setting board power");
        if on {
            self.conn.power_on_job_boards(self.id)?;
        } else {
            self.conn.power_off_job_boards(self.id)?;
        }
        Ok(())
    }

    /// Power-cycle the allocation; it ends up powered.
    pub fn reset(&mut self) -> Result<(), Error> {
        self.set_power(false)?;
        self.set_power(true)
    }

    /// Block until the job's state is no longer `old_state`, or the
    /// timeout elapses.
    ///
    /// Timing out is a normal outcome here: the last known state comes
    /// back, never an error. The blocking is sliced to at most half the
    /// keepalive interval so the heartbeat cadence is never starved, and a
    /// dropped connection is re-established (after `reconnect_delay`)
    /// within the caller's budget. A zero timeout degenerates to one probe
    /// read with no notification wait at all.
    pub fn wait_for_state_change(
        &mut self,
        old_state: JobState,
        timeout: Option<Duration>,
    ) -> Result<JobState, Error> {
        let deadline = deadline_after(timeout);
        let mut probed = false;
        loop {
            let slice = notification_wait_slice(time_left(deadline), self.keepalive_interval);
            match self.wait_step(old_state, probed, slice) {
                Ok(Some(new_state)) => return Ok(new_state),
                Ok(None) => {}
                Err(ConnectionError::Timeout) => {
                    // One bounded slice elapsed; the loop re-checks the
                    // caller's overall budget.
                }
                Err(ConnectionError::Io(err)) if probed => {
                    warn!(job = %self.id, error = %err, "connection lost while waiting, reconnecting");
                    self.reconnect(deadline);
                }
                Err(err) => return Err(err.into()),
            }
            probed = true;
            if expired(deadline) {
                return Ok(old_state);
            }
        }
    }

    /// One round of the wait loop: block for a notification (skipped on
    /// the initial probe), then re-read the state. `Some` means it moved.
    fn wait_step(
        &mut self,
        old_state: JobState,
        wait_first: bool,
        slice: Option<Duration>,
    ) -> Result<Option<JobState>, ConnectionError> {
        if wait_first {
            // A wake-up only means "something changed somewhere"; the
            // re-read below is authoritative, so spurious wake-ups are
            // harmless.
            self.conn.wait_for_notification(slice)?;
        }
        let state = self.conn.get_job_state(self.id)?.state;
        Ok((state != old_state).then_some(state))
    }

    fn reconnect(&mut self, deadline: Option<Instant>) {
        let pause = match time_left(deadline) {
            Some(left) => left.min(self.reconnect_delay),
            None => self.reconnect_delay,
        };
        if !pause.is_zero() {
            thread::sleep(pause);
        }
        match self.conn.connect() {
            Ok(()) => info!(job = %self.id, "reconnected to the allocation server"),
            Err(err) => warn!(job = %self.id, error = %err, "server unreachable, will retry"),
        }
    }

    /// Block until the allocation is ready for use.
    ///
    /// Walks the forward progression (`queued` → `power` → `ready`) under
    /// one shared deadline. Unlike
    /// [`wait_for_state_change`](Self::wait_for_state_change), exhausting
    /// the deadline here is an error, as is observing a terminal state.
    /// An impossible (zero) timeout fails without any network activity.
    pub fn wait_until_ready(&mut self, timeout: Option<Duration>) -> Result<(), Error> {
        let deadline = deadline_after(timeout);
        let mut state: Option<JobState> = None;
        while !expired(deadline) {
            let current = match state {
                Some(s) => s,
                None => self.state()?,
            };
            match current {
                JobState::Ready => {
                    debug!(job = %self.id, "allocation is ready");
                    return Ok(());
                }
                JobState::Queued | JobState::Power => {
                    state = Some(self.wait_for_state_change(current, time_left(deadline))?);
                }
                JobState::Unknown | JobState::Destroyed => {
                    // Best-effort reason fetch; an unreachable server must
                    // not mask the destroyed error itself.
                    let reason = self.reason().ok().flatten();
                    return Err(Error::Destroyed { reason });
                }
            }
        }
        Err(Error::StateChangeTimeout)
    }

    /// Scoped acquisition: wait for readiness, run `body`, and destroy the
    /// job on every exit path — including an error from the wait or the
    /// body itself.
    pub fn with_ready<R>(
        mut self,
        timeout: Option<Duration>,
        body: impl FnOnce(&mut Self) -> Result<R, Error>,
    ) -> Result<R, Error> {
        let result = match self.wait_until_ready(timeout) {
            Ok(()) => body(&mut self),
            Err(err) => Err(err),
        };
        self.destroy(None);
        result
    }

    /// Release the allocation. Idempotent and infallible: the keepalive
    /// worker is stopped and joined first so no heartbeat races the
    /// destroy RPC, and a transport failure on the RPC itself is
    /// discarded — the server reclaims the lease on keepalive expiry
    /// anyway.
    pub fn destroy(&mut self, reason: Option<&str>) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        if let Some(handle) = self.keepalive.take() {
            handle.stop();
        }
        match self.conn.destroy_job(self.id, reason) {
            Ok(()) => info!(job = %self.id, "destroyed job"),
            Err(err) => {
                warn!(job = %self.id, error = %err, "destroy rpc failed, leaving the lease to expire")
            }
        }
        let _ = self.conn.close();
    }
}

impl<C: ServiceConnection + Send + 'static> Drop for Job<C> {
    fn drop(&mut self) {
        self.destroy(None);
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
