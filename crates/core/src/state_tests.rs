// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    unknown = { JobState::Unknown, true },
    queued = { JobState::Queued, false },
    power = { JobState::Power, false },
    ready = { JobState::Ready, false },
    destroyed = { JobState::Destroyed, true },
)]
fn terminal_states(state: JobState, terminal: bool) {
    assert_eq!(state.is_terminal(), terminal);
}

#[test]
fn state_display() {
    assert_eq!(JobState::Queued.to_string(), "queued");
    assert_eq!(JobState::Ready.to_string(), "ready");
}

#[test]
fn state_serde_snake_case() {
    let json = serde_json::to_string(&JobState::Power).unwrap();
    assert_eq!(json, "\"power\"");

    let parsed: JobState = serde_json::from_str("\"destroyed\"").unwrap();
    assert_eq!(parsed, JobState::Destroyed);
}

#[test]
fn snapshot_optional_fields_omitted() {
    let snapshot = StateSnapshot { state: JobState::Queued, ..Default::default() };
    let json = serde_json::to_string(&snapshot).unwrap();
    assert_eq!(json, "{\"state\":\"queued\"}");
}

fn allocated_info() -> MachineInfo {
    MachineInfo {
        width: Some(2),
        height: Some(1),
        connections: Some(vec![
            Connection { chip: (0, 0), hostname: "board-0-0.cluster".into() },
            Connection { chip: (8, 4), hostname: "board-8-4.cluster".into() },
        ]),
        machine_name: Some("cluster".into()),
        boards: Some(vec![BoardCoord { x: 0, y: 0, z: 0 }, BoardCoord { x: 0, y: 0, z: 1 }]),
    }
}

#[test]
fn machine_info_root_hostname() {
    let info = allocated_info();
    assert_eq!(info.root_hostname(), Some("board-0-0.cluster"));
    assert_eq!(info.connection_to((8, 4)), Some("board-8-4.cluster"));
    assert_eq!(info.connection_to((1, 1)), None);
}

#[test]
fn machine_info_unallocated() {
    let info = MachineInfo::default();
    assert!(!info.is_allocated());
    assert_eq!(info.root_hostname(), None);
}

#[test]
fn machine_info_allocated() {
    assert!(allocated_info().is_allocated());
}
