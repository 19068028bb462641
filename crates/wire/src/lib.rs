// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Turn protocol for agent server communication.
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod turn;
mod wire;

pub use turn::{Request, Response, TurnChunk, TurnRequest};
pub use wire::{decode, encode, read_message, write_message, ProtocolError};
pub use wire::{read_frame, write_frame};
