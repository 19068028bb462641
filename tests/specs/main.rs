// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace-level integration specs.
//!
//! Exercise the crates together the way an embedding caller would: build
//! images from uploaded blobs, spawn agents, run streamed turns, and tear
//! everything down through the kernel facade.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod prelude;

mod kernel;
mod packaging;
mod turn;
