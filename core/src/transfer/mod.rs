//! # Transfer Module
//!
//! Vocabulary types and the transfer record for the Vela sandbox. Every
//! money movement the front-end displays is represented as a
//! [`TransferRecord`] living in the session's ledger.
//!
//! ## Architecture
//!
//! ```text
//! types.rs  — Core enums and value types (TransferStatus, Amount, Currency)
//! record.rs — The TransferRecord entity and its append-only status history
//! ```
//!
//! ## Transfer Lifecycle
//!
//! 1. **Submit** — The ledger creates a record in `Submitted` and stamps it.
//! 2. **Sweep** — The session's timer advances the status on fixed elapsed
//!    thresholds (see [`progression`](crate::progression)).
//! 3. **Clearance** — Flagged transfers hold until an explicit authorize.
//! 4. **Arrival** — The terminal edge fires a notification and a receipt.
//!
//! ## Design Decisions
//!
//! - All amounts are `u64` in the smallest denomination. No floating point
//!   anywhere near monetary values, even simulated ones.
//! - The recipient is embedded as a snapshot at submission time. Receipts
//!   must show the recipient as it existed when the money was sent, so later
//!   address-book edits never touch the record.
//! - The status history map is append-only: one timestamp per status
//!   reached, never overwritten.

pub mod record;
pub mod types;

pub use record::{TransferDetails, TransferId, TransferRecord};
pub use types::{Amount, ClearanceMethod, Currency, ExchangeRate, RecipientSnapshot, TransferStatus};
