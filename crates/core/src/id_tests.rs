// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn job_id_display() {
    let id = JobId::new(42);
    assert_eq!(id.to_string(), "42");
}

#[test]
fn job_id_equality() {
    let id1 = JobId::new(7);
    let id2 = JobId::new(7);
    let id3 = JobId::new(8);

    assert_eq!(id1, id2);
    assert_ne!(id1, id3);
}

#[test]
fn job_id_from_u64() {
    let id: JobId = 123.into();
    assert_eq!(id.as_u64(), 123);
}

#[test]
fn job_id_serde() {
    let id = JobId::new(99);
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "99");

    let parsed: JobId = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, id);
}
