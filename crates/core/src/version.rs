// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Service version triple, exchanged at connect time.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Dotted-decimal service version, ordered lexicographically by component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Version { major, minor, patch }
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// A version string the service reported that does not parse as
/// `major.minor[.patch]`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed version string: {0:?}")]
pub struct ParseVersionError(pub String);

impl FromStr for Version {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ParseVersionError(s.to_string());
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() < 2 || parts.len() > 3 {
            return Err(malformed());
        }
        let parse = |part: &str| part.parse::<u32>().map_err(|_| malformed());

        let major = parse(parts[0])?;
        let minor = parse(parts[1])?;
        let patch = match parts.get(2) {
            Some(part) => parse(part)?,
            None => 0,
        };
        Ok(Version { major, minor, patch })
    }
}

#[cfg(test)]
#[path = "version_tests.rs"]
mod tests;
