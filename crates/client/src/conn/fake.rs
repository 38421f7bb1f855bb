// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted [`ServiceConnection`] double for tests.
//!
//! A [`FakeConnection`] is a cheap clone over one shared state, so the
//! caller-side and keepalive-side connections of a job can be driven and
//! observed together: every RPC is recorded in arrival order, and the
//! interesting calls (`wait_for_notification`, `job_keepalive`, `connect`,
//! `destroy_job`) take their outcomes from per-call scripts.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use bl_core::{JobId, JobState, MachineInfo, Notification, StateSnapshot};

use super::{ConnectionError, CreateJobRequest, ServiceConnection};

/// One recorded RPC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Connect,
    Close,
    Version,
    CreateJob,
    GetJobState,
    GetJobMachineInfo,
    PowerOn,
    PowerOff,
    DestroyJob { reason: Option<String> },
    Keepalive,
    WaitForNotification,
}

/// Scripted outcome for one `wait_for_notification` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Deliver a jobs-changed notification immediately.
    Notify,
    /// Sleep out the requested slice, then report a bounded-wait timeout.
    TimeOut,
    /// Fail as if the transport dropped, without sleeping.
    Disconnect,
}

/// Scripted outcome for one plain RPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcOutcome {
    Ok,
    TimeOut,
    Disconnect,
}

impl RpcOutcome {
    fn result(self) -> Result<(), ConnectionError> {
        match self {
            RpcOutcome::Ok => Ok(()),
            RpcOutcome::TimeOut => Err(ConnectionError::Timeout),
            RpcOutcome::Disconnect => Err(io_dropped()),
        }
    }
}

fn io_dropped() -> ConnectionError {
    ConnectionError::Io(std::io::Error::new(
        std::io::ErrorKind::ConnectionReset,
        "connection dropped",
    ))
}

struct FakeState {
    calls: Vec<Call>,
    version: String,
    job_id: u64,
    current: StateSnapshot,
    snapshots: VecDeque<StateSnapshot>,
    machine_info: MachineInfo,
    wait_script: VecDeque<WaitOutcome>,
    keepalive_script: VecDeque<RpcOutcome>,
    connect_script: VecDeque<RpcOutcome>,
    destroy_script: VecDeque<RpcOutcome>,
}

/// Scripted stand-in for a real transport.
///
/// Defaults: version `1.2.0`, created jobs get id 42, the job starts
/// `Queued`, machine info is unallocated, unscripted waits time out, and
/// every other unscripted RPC succeeds.
#[derive(Clone)]
pub struct FakeConnection {
    state: Arc<Mutex<FakeState>>,
}

impl FakeConnection {
    pub fn new() -> Self {
        FakeConnection {
            state: Arc::new(Mutex::new(FakeState {
                calls: Vec::new(),
                version: "1.2.0".into(),
                job_id: 42,
                current: StateSnapshot { state: JobState::Queued, ..Default::default() },
                snapshots: VecDeque::new(),
                machine_info: MachineInfo::default(),
                wait_script: VecDeque::new(),
                keepalive_script: VecDeque::new(),
                connect_script: VecDeque::new(),
                destroy_script: VecDeque::new(),
            })),
        }
    }

    /// Two handles over one shared state: one for the caller's connection,
    /// one for the keepalive worker's.
    pub fn pair() -> (Self, Self) {
        let conn = Self::new();
        (conn.clone(), conn)
    }

    pub fn set_version(&self, version: impl Into<String>) {
        self.state.lock().version = version.into();
    }

    pub fn set_job_id(&self, id: u64) {
        self.state.lock().job_id = id;
    }

    /// Replace the snapshot returned once the scripted queue runs dry.
    pub fn set_snapshot(&self, snapshot: StateSnapshot) {
        self.state.lock().current = snapshot;
    }

    pub fn set_state(&self, state: JobState) {
        self.state.lock().current.state = state;
    }

    /// Queue a snapshot for the next `get_job_state`; once served it also
    /// becomes the current one.
    pub fn push_snapshot(&self, snapshot: StateSnapshot) {
        self.state.lock().snapshots.push_back(snapshot);
    }

    pub fn push_state(&self, state: JobState) {
        self.push_snapshot(StateSnapshot { state, ..Default::default() });
    }

    pub fn set_machine_info(&self, info: MachineInfo) {
        self.state.lock().machine_info = info;
    }

    pub fn script_wait(&self, outcomes: impl IntoIterator<Item = WaitOutcome>) {
        self.state.lock().wait_script.extend(outcomes);
    }

    pub fn script_keepalive(&self, outcomes: impl IntoIterator<Item = RpcOutcome>) {
        self.state.lock().keepalive_script.extend(outcomes);
    }

    pub fn script_connect(&self, outcomes: impl IntoIterator<Item = RpcOutcome>) {
        self.state.lock().connect_script.extend(outcomes);
    }

    pub fn script_destroy(&self, outcomes: impl IntoIterator<Item = RpcOutcome>) {
        self.state.lock().destroy_script.extend(outcomes);
    }

    /// Every RPC recorded so far, across both handles, in arrival order.
    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.state.lock().calls.iter().filter(|c| matches(c)).count()
    }

    pub fn connect_calls(&self) -> usize {
        self.count(|c| matches!(c, Call::Connect))
    }

    pub fn create_calls(&self) -> usize {
        self.count(|c| matches!(c, Call::CreateJob))
    }

    pub fn state_calls(&self) -> usize {
        self.count(|c| matches!(c, Call::GetJobState))
    }

    pub fn machine_info_calls(&self) -> usize {
        self.count(|c| matches!(c, Call::GetJobMachineInfo))
    }

    pub fn wait_calls(&self) -> usize {
        self.count(|c| matches!(c, Call::WaitForNotification))
    }

    pub fn keepalive_calls(&self) -> usize {
        self.count(|c| matches!(c, Call::Keepalive))
    }

    pub fn destroy_calls(&self) -> usize {
        self.count(|c| matches!(c, Call::DestroyJob { .. }))
    }

    fn record(&self, call: Call) {
        self.state.lock().calls.push(call);
    }
}

impl Default for FakeConnection {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceConnection for FakeConnection {
    fn connect(&mut self) -> Result<(), ConnectionError> {
        let outcome = {
            let mut state = self.state.lock();
            state.calls.push(Call::Connect);
            state.connect_script.pop_front().unwrap_or(RpcOutcome::Ok)
        };
        outcome.result()
    }

    fn close(&mut self) -> Result<(), ConnectionError> {
        self.record(Call::Close);
        Ok(())
    }

    fn version(&mut self) -> Result<String, ConnectionError> {
        let mut state = self.state.lock();
        state.calls.push(Call::Version);
        Ok(state.version.clone())
    }

    fn create_job(&mut self, _request: &CreateJobRequest) -> Result<JobId, ConnectionError> {
        let mut state = self.state.lock();
        state.calls.push(Call::CreateJob);
        Ok(JobId::new(state.job_id))
    }

    fn get_job_state(&mut self, _id: JobId) -> Result<StateSnapshot, ConnectionError> {
        let mut state = self.state.lock();
        state.calls.push(Call::GetJobState);
        if let Some(snapshot) = state.snapshots.pop_front() {
            state.current = snapshot.clone();
            Ok(snapshot)
        } else {
            Ok(state.current.clone())
        }
    }

    fn get_job_machine_info(&mut self, _id: JobId) -> Result<MachineInfo, ConnectionError> {
        let mut state = self.state.lock();
        state.calls.push(Call::GetJobMachineInfo);
        Ok(state.machine_info.clone())
    }

    fn power_on_job_boards(&mut self, _id: JobId) -> Result<(), ConnectionError> {
        self.record(Call::PowerOn);
        Ok(())
    }

    fn power_off_job_boards(&mut self, _id: JobId) -> Result<(), ConnectionError> {
        self.record(Call::PowerOff);
        Ok(())
    }

    fn destroy_job(&mut self, _id: JobId, reason: Option<&str>) -> Result<(), ConnectionError> {
        let outcome = {
            let mut state = self.state.lock();
            state.calls.push(Call::DestroyJob { reason: reason.map(String::from) });
            state.destroy_script.pop_front().unwrap_or(RpcOutcome::Ok)
        };
        outcome.result()
    }

    fn job_keepalive(&mut self, _id: JobId) -> Result<(), ConnectionError> {
        let outcome = {
            let mut state = self.state.lock();
            state.calls.push(Call::Keepalive);
            state.keepalive_script.pop_front().unwrap_or(RpcOutcome::Ok)
        };
        outcome.result()
    }

    fn wait_for_notification(
        &mut self,
        timeout: Option<Duration>,
    ) -> Result<Notification, ConnectionError> {
        let (outcome, job_id) = {
            let mut state = self.state.lock();
            state.calls.push(Call::WaitForNotification);
            let outcome = state.wait_script.pop_front().unwrap_or(WaitOutcome::TimeOut);
            (outcome, state.job_id)
        };
        match outcome {
            WaitOutcome::Notify => Ok(Notification::JobsChanged(vec![JobId::new(job_id)])),
            WaitOutcome::TimeOut => {
                // Simulate blocking out the requested slice so callers see
                // real time pass; unbounded waits are a scripting mistake,
                // resolved after a token pause instead of hanging the test.
                thread::sleep(timeout.unwrap_or(Duration::from_millis(1)));
                Err(ConnectionError::Timeout)
            }
            WaitOutcome::Disconnect => Err(io_dropped()),
        }
    }
}
