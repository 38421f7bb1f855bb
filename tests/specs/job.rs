// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job lease lifecycle specs
//!
//! Verify the whole lease flow: create, wait for readiness, use the
//! allocation, and release it on every exit path.

use std::time::Duration;

use bl_client::{
    BoardCoord, Call, Connection, FakeConnection, Job, JobConfig, JobState, MachineInfo,
    StateSnapshot, WaitOutcome,
};

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn config() -> JobConfig {
    JobConfig::builder("alloc.example.com", "alice")
        .tags(vec!["default".to_string()])
        .keepalive(ms(20))
        .reconnect_delay(ms(15))
        .build()
}

fn allocation() -> MachineInfo {
    MachineInfo {
        width: Some(1),
        height: Some(1),
        connections: Some(vec![Connection { chip: (0, 0), hostname: "board-0-0.cluster".into() }]),
        machine_name: Some("cluster".into()),
        boards: Some(vec![BoardCoord { x: 0, y: 0, z: 0 }]),
    }
}

/// Queue the usual forward progression: queued → power → ready, with a
/// notification ahead of each transition.
fn script_progression(conn: &FakeConnection) {
    conn.push_state(JobState::Queued);
    conn.push_state(JobState::Queued);
    conn.push_state(JobState::Power);
    conn.push_state(JobState::Power);
    conn.push_state(JobState::Ready);
    conn.script_wait([WaitOutcome::Notify, WaitOutcome::Notify]);
}

#[test]
fn lease_lifecycle_from_creation_to_release() {
    let (conn, keepalive_conn) = FakeConnection::pair();
    let probe = conn.clone();
    script_progression(&probe);
    probe.set_machine_info(allocation());

    let job = Job::create(config(), conn, keepalive_conn).unwrap();
    let hostname = job
        .with_ready(Some(Duration::from_secs(5)), |job| {
            assert_eq!(job.width()?, Some(1));
            job.hostname()
        })
        .unwrap();

    assert_eq!(hostname.as_deref(), Some("board-0-0.cluster"));
    assert_eq!(probe.destroy_calls(), 1);

    // After release the heartbeat is gone for good.
    let sent = probe.keepalive_calls();
    std::thread::sleep(ms(60));
    assert_eq!(probe.keepalive_calls(), sent);
}

#[test]
fn resuming_an_existing_lease_and_releasing_it() {
    let (conn, keepalive_conn) = FakeConnection::pair();
    let probe = conn.clone();
    probe.set_snapshot(StateSnapshot {
        state: JobState::Ready,
        keepalive: Some(ms(25)),
        ..Default::default()
    });

    let resume = JobConfig::builder("alloc.example.com", "alice")
        .resume_job_id(7u64)
        .build();
    let mut job = Job::create(resume, conn, keepalive_conn).unwrap();

    assert_eq!(job.id().as_u64(), 7);
    assert_eq!(job.keepalive_interval(), Some(ms(25)));
    assert_eq!(probe.create_calls(), 0, "resume never re-registers");

    job.wait_until_ready(Some(Duration::from_secs(1))).unwrap();
    job.destroy(Some("work finished"));
    job.destroy(None);

    let reasons: Vec<_> = probe
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::DestroyJob { reason } => Some(reason),
            _ => None,
        })
        .collect();
    assert_eq!(reasons, vec![Some("work finished".to_string())]);
}

#[test]
fn a_server_outage_during_the_wait_is_ridden_out() {
    let (conn, keepalive_conn) = FakeConnection::pair();
    let probe = conn.clone();
    probe.push_state(JobState::Queued);
    probe.push_state(JobState::Queued);
    probe.push_state(JobState::Ready);
    probe.script_wait([WaitOutcome::Disconnect, WaitOutcome::Notify]);

    let mut job = Job::create(config(), conn, keepalive_conn).unwrap();
    job.wait_until_ready(Some(Duration::from_secs(5))).unwrap();

    assert!(probe.connect_calls() >= 1, "the wait reconnected on its own");
    job.destroy(None);
}
