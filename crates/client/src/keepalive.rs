// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Background heartbeat worker.
//!
//! One thread per job, owning its own connection, sending `job_keepalive`
//! every interval until stopped. Transport failures feed a
//! reconnect-and-carry-on path; nothing escapes the worker, and a dead
//! server just means retrying until the job is destroyed.

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use bl_core::JobId;

use crate::conn::{ConnectionError, ServiceConnection};

/// Cross-thread stop flag with interruptible waits.
#[derive(Clone)]
pub(crate) struct StopSignal {
    inner: Arc<SignalInner>,
}

struct SignalInner {
    stopped: Mutex<bool>,
    wake: Condvar,
}

impl StopSignal {
    pub(crate) fn new() -> Self {
        StopSignal {
            inner: Arc::new(SignalInner { stopped: Mutex::new(false), wake: Condvar::new() }),
        }
    }

    pub(crate) fn stop(&self) {
        let mut stopped = self.inner.stopped.lock();
        *stopped = true;
        self.inner.wake.notify_all();
    }

    pub(crate) fn is_stopped(&self) -> bool {
        *self.inner.stopped.lock()
    }

    /// Block up to `timeout`, waking early when stopped. Returns whether
    /// the signal is set.
    pub(crate) fn wait(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut stopped = self.inner.stopped.lock();
        while !*stopped {
            if self.inner.wake.wait_until(&mut stopped, deadline).timed_out() {
                return *stopped;
            }
        }
        true
    }
}

/// Handle to a running keepalive worker.
pub(crate) struct KeepaliveHandle {
    stop: StopSignal,
    thread: JoinHandle<()>,
}

impl KeepaliveHandle {
    /// Signal the worker and wait until it has ceased issuing RPCs.
    pub(crate) fn stop(self) {
        self.stop.stop();
        if self.thread.join().is_err() {
            warn!("keepalive worker panicked before shutdown");
        }
    }
}

/// Start the heartbeat thread for `job_id` on its own connection.
pub(crate) fn spawn<C>(
    conn: C,
    job_id: JobId,
    interval: Duration,
    reconnect_delay: Duration,
) -> std::io::Result<KeepaliveHandle>
where
    C: ServiceConnection + Send + 'static,
{
    let stop = StopSignal::new();
    let signal = stop.clone();
    let thread = thread::Builder::new()
        .name(format!("keepalive-{job_id}"))
        .spawn(move || run(conn, job_id, interval, reconnect_delay, signal))?;
    Ok(KeepaliveHandle { stop, thread })
}

fn run<C: ServiceConnection>(
    mut conn: C,
    job_id: JobId,
    interval: Duration,
    reconnect_delay: Duration,
    stop: StopSignal,
) {
    debug!(job = %job_id, interval_ms = interval.as_millis() as u64, "keepalive worker started");
    while !stop.is_stopped() {
        match conn.job_keepalive(job_id) {
            Ok(()) => {}
            Err(ConnectionError::Timeout) => {
                // Server slow to acknowledge; the next tick covers it.
            }
            Err(err) => {
                warn!(job = %job_id, error = %err, "keepalive failed, reconnecting");
                if stop.wait(reconnect_delay) {
                    break;
                }
                if let Err(err) = conn.connect() {
                    warn!(job = %job_id, error = %err, "server unreachable, will retry");
                }
                // The missed heartbeat is not resent here; the next tick
                // sends the next one on the usual cadence.
            }
        }
        if stop.wait(interval) {
            break;
        }
    }
    let _ = conn.close();
    debug!(job = %job_id, "keepalive worker stopped");
}

#[cfg(test)]
#[path = "keepalive_tests.rs"]
mod tests;
