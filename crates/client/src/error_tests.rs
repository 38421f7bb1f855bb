// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn destroyed_with_reason() {
    let err = Error::Destroyed { reason: Some("owner request".into()) };
    assert_eq!(err.to_string(), "job destroyed: owner request");
}

#[test]
fn destroyed_without_reason() {
    let err = Error::Destroyed { reason: None };
    assert_eq!(err.to_string(), "job destroyed: no reason given");
}

#[test]
fn version_error_names_the_range() {
    let err = Error::Version {
        found: Version::new(3, 0, 0),
        min: Version::new(1, 0, 0),
        max: Version::new(2, 0, 0),
    };
    assert_eq!(
        err.to_string(),
        "server version 3.0.0 is unsupported (requires >= 1.0.0 and < 2.0.0)"
    );
}
