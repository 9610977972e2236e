// Copyright (c) 2026 Vela Labs. MIT License.
// See LICENSE for details.

//! # Vela — Consumer Banking Sandbox Core
//!
//! The engine behind the Vela demo bank: an in-memory transfer ledger whose
//! records move through a fixed status sequence on a timer, so the front-end
//! can show money "arriving" without a single byte touching a real payment
//! rail. No settlement, no persistence, no network — just honest fakery.
//!
//! ## Architecture
//!
//! The crate is split into modules that mirror the concerns of the sandbox:
//!
//! - **transfer** — Vocabulary types and the transfer record itself.
//! - **ledger** — The append-only in-memory collection of transfer records.
//! - **progression** — The status state machine and the periodic sweep.
//! - **notify** — Notification and receipt sinks (the outside world's view).
//! - **session** — Per-login lifecycle: owns the ledger and the sweep timer.
//! - **config** — Timing constants and tunables.
//!
//! ## Design Philosophy
//!
//! 1. The fake must be behaviorally exact — thresholds are part of the contract.
//! 2. No floating point anywhere near money, even pretend money.
//! 3. A terminal status is terminal. Sweeps never resurrect a record.
//! 4. The sweep timer dies with the session. Leaked timers are defects.

pub mod config;
pub mod ledger;
pub mod notify;
pub mod progression;
pub mod session;
pub mod transfer;
