//! The transfer record: the one entity in the sandbox with a real lifecycle.
//!
//! A [`TransferRecord`] is created by the ledger's submit operation and then
//! mutated only by the periodic sweep and the authorize operation. Records
//! are never deleted — the ledger is append-only — though they can be
//! annotated (support ticket linkage) without a status change.
//!
//! ## Status History
//!
//! `status_timestamps` maps every status the record has reached to the
//! instant it was reached. It is append-only: once a status has a timestamp,
//! that timestamp is never overwritten. It doubles as the audit trail shown
//! in the transfer detail view and as the clock basis for the sweep's
//! elapsed-time computation.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::types::{Amount, ExchangeRate, RecipientSnapshot, TransferStatus};

/// Unique identifier of a transfer (UUIDv4, assigned at submission).
pub type TransferId = Uuid;

// ---------------------------------------------------------------------------
// TransferDetails
// ---------------------------------------------------------------------------

/// Everything the caller supplies when submitting a transfer.
///
/// Balance checks belong to the calling feature (e.g. the split-transfer
/// screen), not here: submission itself never fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferDetails {
    /// Id of the source account the money leaves.
    pub source_account: String,
    /// Recipient details, copied into the record as an immutable snapshot.
    pub recipient: RecipientSnapshot,
    /// Principal in source-currency minor units.
    pub send_amount: Amount,
    /// Our fee, in source-currency minor units.
    pub fee: Amount,
    /// Exchange rate from source to recipient currency.
    pub rate: ExchangeRate,
    /// Whether this transfer must hold for manual clearance.
    pub requires_auth: bool,
    /// Optional free-text reference shown to the recipient.
    pub reference: Option<String>,
}

// ---------------------------------------------------------------------------
// TransferRecord
// ---------------------------------------------------------------------------

/// A single transfer and its full status history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRecord {
    /// Unique id, generated at submission.
    pub id: TransferId,
    /// Source account id (by reference — the account itself lives elsewhere).
    pub source_account: String,
    /// Recipient as it existed at submission time. Never mutated afterwards.
    pub recipient: RecipientSnapshot,
    /// Principal in source-currency minor units.
    pub send_amount: Amount,
    /// Fee in source-currency minor units.
    pub fee: Amount,
    /// What the recipient receives: `(send - fee)` converted at `rate`.
    pub receive_amount: Amount,
    /// Exchange rate locked at submission.
    pub rate: ExchangeRate,
    /// Current lifecycle status. Always has a matching timestamp entry.
    pub status: TransferStatus,
    /// Append-only map from each status reached to when it was reached.
    pub status_timestamps: HashMap<TransferStatus, DateTime<Utc>>,
    /// Set at submission, immutable afterward. Determines whether the
    /// progression forks into the clearance hold.
    pub requires_auth: bool,
    /// Set only when clearance is resolved via the fee path.
    pub clearance_fee_paid: bool,
    /// When the record was submitted. Duplicates the `Submitted` entry in
    /// the history map so elapsed-time math never has to unwrap.
    pub submitted_at: DateTime<Utc>,
    /// Optional free-text reference.
    pub reference: Option<String>,
    /// Support ticket id, attachable at any time without a status change.
    pub support_ticket: Option<String>,
}

impl TransferRecord {
    /// Creates a record in `Submitted` with the clock started at `now`.
    ///
    /// The receive amount is computed here and locked: fee comes off the
    /// principal first, then the remainder converts at the locked rate.
    pub fn submit(details: TransferDetails, now: DateTime<Utc>) -> Self {
        let net_minor = details.send_amount.minor.saturating_sub(details.fee.minor);
        let receive_amount = Amount::new(
            details.rate.convert(net_minor),
            details.recipient.currency.clone(),
        );

        let mut status_timestamps = HashMap::new();
        status_timestamps.insert(TransferStatus::Submitted, now);

        Self {
            id: Uuid::new_v4(),
            source_account: details.source_account,
            recipient: details.recipient,
            send_amount: details.send_amount,
            fee: details.fee,
            receive_amount,
            rate: details.rate,
            status: TransferStatus::Submitted,
            status_timestamps,
            requires_auth: details.requires_auth,
            clearance_fee_paid: false,
            submitted_at: now,
            reference: details.reference,
            support_ticket: None,
        }
    }

    /// Moves the record to `status`, stamping it with `now`.
    ///
    /// The history map is append-only: if the status already has a
    /// timestamp (which would indicate a revisit — something the state
    /// machine never does), the original timestamp is kept.
    pub fn record_status(&mut self, status: TransferStatus, now: DateTime<Utc>) {
        self.status = status;
        self.status_timestamps.entry(status).or_insert(now);
    }

    /// Timestamp at which the record reached `status`, if it ever did.
    pub fn timestamp_for(&self, status: TransferStatus) -> Option<DateTime<Utc>> {
        self.status_timestamps.get(&status).copied()
    }

    /// Wall-clock time elapsed since submission, clamped at zero if the
    /// caller's clock is somehow behind the submission stamp.
    pub fn elapsed_since_submission(&self, now: DateTime<Utc>) -> Duration {
        (now - self.submitted_at).to_std().unwrap_or_default()
    }

    /// Returns `true` once the record has reached its absorbing status.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Attaches a support ticket id. Annotation only — the status and its
    /// history are untouched.
    pub fn attach_ticket(&mut self, ticket_id: &str) {
        self.support_ticket = Some(ticket_id.to_string());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
