//! Append-only in-memory transfer ledger.
//!
//! Thread-safe collection of every transfer submitted during a session.
//! Records are indexed by id for O(1) lookups, with a separate submission
//! order index so dashboards can list transfers in the order they were sent.
//!
//! ## Design
//!
//! - `DashMap` holds the records. Its per-entry locking gives the atomicity
//!   the sweep needs: an authorize arriving mid-sweep is observed either
//!   fully applied or not at all for any given record, never partially.
//! - `parking_lot::RwLock<Vec<_>>` protects the order index. Writers are
//!   rare (one push per submission) compared to readers (every dashboard
//!   refresh and every sweep).
//! - Nothing is ever removed. The ledger lives and dies with its session.

use dashmap::DashMap;
use parking_lot::RwLock;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;

use crate::transfer::{
    ClearanceMethod, TransferDetails, TransferId, TransferRecord, TransferStatus,
};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors the ledger can produce.
///
/// Note that the public session seam swallows these: the product treats
/// authorize as fire-and-forget, so a misdirected call is logged and dropped
/// rather than surfaced to the user. The ledger still reports them so that
/// tests (and the session's debug log) can see what happened.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// No record exists with the given id.
    #[error("unknown transfer: {0}")]
    UnknownTransfer(TransferId),

    /// The operation is not valid for the record's current status.
    #[error("invalid transition for transfer {id}: status is {status}")]
    InvalidTransition {
        /// The transfer the operation targeted.
        id: TransferId,
        /// Its status at the time of the call.
        status: TransferStatus,
    },
}

// ---------------------------------------------------------------------------
// TransferLedger
// ---------------------------------------------------------------------------

/// The ordered, append-only collection of a session's transfers.
///
/// Owns lifecycle creation ([`submit`](Self::submit)) and the one external
/// mutation ([`authorize`](Self::authorize)). The periodic sweep mutates
/// records through [`update`](Self::update), which holds the entry lock for
/// the duration of the closure.
#[derive(Debug, Default)]
pub struct TransferLedger {
    /// Records indexed by transfer id.
    records: DashMap<TransferId, TransferRecord>,
    /// Transfer ids in submission order.
    order: RwLock<Vec<TransferId>>,
}

impl TransferLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Submits a new transfer, stamping it with the current wall clock.
    ///
    /// Never fails: balance and limit checks belong to the calling feature.
    pub fn submit(&self, details: TransferDetails) -> TransferRecord {
        self.submit_at(details, Utc::now())
    }

    /// Submission with an explicit clock, for deterministic tests.
    pub fn submit_at(&self, details: TransferDetails, now: DateTime<Utc>) -> TransferRecord {
        let record = TransferRecord::submit(details, now);

        info!(
            transfer = %record.id,
            amount = %record.send_amount,
            recipient = %record.recipient.name,
            flagged = record.requires_auth,
            "transfer submitted"
        );

        self.order.write().push(record.id);
        self.records.insert(record.id, record.clone());
        record
    }

    /// Resolves the clearance hold on a flagged transfer.
    ///
    /// Moves the record from `FlaggedAwaitingClearance` to
    /// `ClearanceGranted`, stamps the grant, and marks whether the fee path
    /// was used. The transfer resumes transit on a later sweep.
    ///
    /// # Errors
    ///
    /// [`LedgerError::UnknownTransfer`] if no such record exists, or
    /// [`LedgerError::InvalidTransition`] if the record is not currently
    /// holding for clearance.
    pub fn authorize(
        &self,
        id: TransferId,
        method: ClearanceMethod,
    ) -> Result<TransferRecord, LedgerError> {
        self.authorize_at(id, method, Utc::now())
    }

    /// Authorization with an explicit clock, for deterministic tests.
    pub fn authorize_at(
        &self,
        id: TransferId,
        method: ClearanceMethod,
        now: DateTime<Utc>,
    ) -> Result<TransferRecord, LedgerError> {
        let mut entry = self
            .records
            .get_mut(&id)
            .ok_or(LedgerError::UnknownTransfer(id))?;

        if entry.status != TransferStatus::FlaggedAwaitingClearance {
            return Err(LedgerError::InvalidTransition {
                id,
                status: entry.status,
            });
        }

        entry.record_status(TransferStatus::ClearanceGranted, now);
        entry.clearance_fee_paid = method == ClearanceMethod::Fee;

        info!(transfer = %id, method = %method, "clearance granted");
        Ok(entry.clone())
    }

    /// Attaches a support ticket to a transfer. Annotation only — no status
    /// change, no new history entry.
    ///
    /// # Errors
    ///
    /// [`LedgerError::UnknownTransfer`] if no such record exists.
    pub fn attach_ticket(&self, id: TransferId, ticket_id: &str) -> Result<(), LedgerError> {
        let mut entry = self
            .records
            .get_mut(&id)
            .ok_or(LedgerError::UnknownTransfer(id))?;
        entry.attach_ticket(ticket_id);
        Ok(())
    }

    /// Returns a copy of the record, if present.
    pub fn get(&self, id: TransferId) -> Option<TransferRecord> {
        self.records.get(&id).map(|r| r.value().clone())
    }

    /// All records in submission order.
    pub fn all(&self) -> Vec<TransferRecord> {
        let order = self.order.read();
        order
            .iter()
            .filter_map(|id| self.records.get(id).map(|r| r.value().clone()))
            .collect()
    }

    /// Ids of all non-terminal records, in submission order. This is the
    /// sweep's working set.
    pub fn active_ids(&self) -> Vec<TransferId> {
        let order = self.order.read();
        order
            .iter()
            .filter(|id| {
                self.records
                    .get(id)
                    .map(|r| !r.is_terminal())
                    .unwrap_or(false)
            })
            .copied()
            .collect()
    }

    /// Runs `f` against the record under its entry lock, returning the
    /// closure's result. Used by the sweep so that each record's transition
    /// is atomic with respect to a concurrent authorize.
    pub(crate) fn update<F, R>(&self, id: TransferId, f: F) -> Option<R>
    where
        F: FnOnce(&mut TransferRecord) -> R,
    {
        self.records.get_mut(&id).map(|mut entry| f(&mut entry))
    }

    /// Number of records ever submitted.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if nothing has been submitted yet.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer::{Amount, Currency, ExchangeRate, RecipientSnapshot};
    use chrono::TimeZone;
    use uuid::Uuid;

    fn details(requires_auth: bool) -> TransferDetails {
        TransferDetails {
            source_account: "acct-main".to_string(),
            recipient: RecipientSnapshot {
                name: "Kamau Njoroge".to_string(),
                account_number: "5550001111".to_string(),
                bank: "Sandbox Bank of Kenya".to_string(),
                country: "KE".to_string(),
                currency: Currency::KES,
            },
            send_amount: Amount::new(5_000, Currency::USD),
            fee: Amount::new(250, Currency::USD),
            rate: ExchangeRate::from_ppm(129_000_000),
            requires_auth,
            reference: None,
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn submit_appends_in_order() {
        let ledger = TransferLedger::new();
        let a = ledger.submit_at(details(false), t0());
        let b = ledger.submit_at(details(true), t0());

        let all = ledger.all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, a.id);
        assert_eq!(all[1].id, b.id);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn authorize_requires_clearance_hold() {
        let ledger = TransferLedger::new();
        let record = ledger.submit_at(details(true), t0());

        // Still Submitted — the sweep hasn't moved it to the hold yet.
        let result = ledger.authorize_at(record.id, ClearanceMethod::Code, t0());
        assert!(matches!(
            result,
            Err(LedgerError::InvalidTransition {
                status: TransferStatus::Submitted,
                ..
            })
        ));

        // And the record is untouched.
        let unchanged = ledger.get(record.id).unwrap();
        assert_eq!(unchanged.status, TransferStatus::Submitted);
        assert!(!unchanged.clearance_fee_paid);
    }

    #[test]
    fn authorize_unknown_id_errors() {
        let ledger = TransferLedger::new();
        let result = ledger.authorize_at(Uuid::new_v4(), ClearanceMethod::Code, t0());
        assert!(matches!(result, Err(LedgerError::UnknownTransfer(_))));
    }

    #[test]
    fn authorize_code_path_leaves_fee_flag_clear() {
        let ledger = TransferLedger::new();
        let record = ledger.submit_at(details(true), t0());
        ledger
            .update(record.id, |r| {
                r.record_status(
                    TransferStatus::FlaggedAwaitingClearance,
                    t0() + chrono::Duration::seconds(5),
                )
            })
            .unwrap();

        let granted = ledger
            .authorize_at(
                record.id,
                ClearanceMethod::Code,
                t0() + chrono::Duration::seconds(20),
            )
            .unwrap();

        assert_eq!(granted.status, TransferStatus::ClearanceGranted);
        assert!(!granted.clearance_fee_paid);
        assert_eq!(
            granted.timestamp_for(TransferStatus::ClearanceGranted),
            Some(t0() + chrono::Duration::seconds(20))
        );
    }

    #[test]
    fn authorize_fee_path_sets_fee_flag() {
        let ledger = TransferLedger::new();
        let record = ledger.submit_at(details(true), t0());
        ledger
            .update(record.id, |r| {
                r.record_status(
                    TransferStatus::FlaggedAwaitingClearance,
                    t0() + chrono::Duration::seconds(5),
                )
            })
            .unwrap();

        let granted = ledger
            .authorize_at(
                record.id,
                ClearanceMethod::Fee,
                t0() + chrono::Duration::seconds(20),
            )
            .unwrap();
        assert!(granted.clearance_fee_paid);
    }

    #[test]
    fn double_authorize_is_rejected() {
        let ledger = TransferLedger::new();
        let record = ledger.submit_at(details(true), t0());
        ledger
            .update(record.id, |r| {
                r.record_status(
                    TransferStatus::FlaggedAwaitingClearance,
                    t0() + chrono::Duration::seconds(5),
                )
            })
            .unwrap();

        ledger
            .authorize_at(record.id, ClearanceMethod::Code, t0())
            .unwrap();
        let second = ledger.authorize_at(record.id, ClearanceMethod::Fee, t0());

        assert!(matches!(
            second,
            Err(LedgerError::InvalidTransition {
                status: TransferStatus::ClearanceGranted,
                ..
            })
        ));
        // The fee flag from the rejected second call must not stick.
        assert!(!ledger.get(record.id).unwrap().clearance_fee_paid);
    }

    #[test]
    fn active_ids_excludes_terminal_records() {
        let ledger = TransferLedger::new();
        let a = ledger.submit_at(details(false), t0());
        let b = ledger.submit_at(details(false), t0());

        ledger
            .update(a.id, |r| {
                r.record_status(TransferStatus::FundsArrived, t0())
            })
            .unwrap();

        let active = ledger.active_ids();
        assert_eq!(active, vec![b.id]);
    }

    #[test]
    fn attach_ticket_annotates_without_status_change() {
        let ledger = TransferLedger::new();
        let record = ledger.submit_at(details(false), t0());

        ledger.attach_ticket(record.id, "TCK-99").unwrap();

        let annotated = ledger.get(record.id).unwrap();
        assert_eq!(annotated.support_ticket.as_deref(), Some("TCK-99"));
        assert_eq!(annotated.status, TransferStatus::Submitted);
    }

    #[test]
    fn attach_ticket_unknown_id_errors() {
        let ledger = TransferLedger::new();
        assert!(matches!(
            ledger.attach_ticket(Uuid::new_v4(), "TCK-1"),
            Err(LedgerError::UnknownTransfer(_))
        ));
    }
}
