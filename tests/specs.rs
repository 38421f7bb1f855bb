// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace-level scenario specs.
//!
//! These drive the public `bl-client` API end to end against the scripted
//! `FakeConnection` transport, the way an application embedding the client
//! would use it.

#[path = "specs/job.rs"]
mod job;
