//! # Status Progression — the sweep and its state machine
//!
//! The one piece of the sandbox with actual state-machine structure. Every
//! sweep, each non-terminal transfer is examined independently and advanced
//! at most one step along:
//!
//! ```text
//! Submitted
//!   → (unflagged) Converting                  elapsed > 4s
//!   → (flagged)   FlaggedAwaitingClearance    elapsed > 4s
//! Converting               → InTransit        elapsed > 8s
//! FlaggedAwaitingClearance → ClearanceGranted authorize only
//! ClearanceGranted         → InTransit        elapsed > grant offset + 4s
//! InTransit                → FundsArrived     elapsed > 15s   (terminal)
//! ```
//!
//! `elapsed` is wall-clock time since the `Submitted` timestamp for every
//! rule, including the clearance resume: the hold's exit is expressed as an
//! offset from submission (how long the grant took) plus a fixed delay,
//! rather than a fresh clock started at the grant. The two formulations are
//! behaviorally equivalent, but the shared-basis form is the contract the
//! front-end was built against, so it is what we compute and what the tests
//! pin.
//!
//! There is no failure path here. Either a transition fires this tick or it
//! doesn't; `FundsArrived` absorbs everything forever. Side effects (one
//! notification, one receipt) fire only on the arrival edge.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config;
use crate::ledger::TransferLedger;
use crate::notify::{NotificationKind, NotificationSink, ReceiptSink};
use crate::transfer::{TransferRecord, TransferStatus};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Timing knobs for the progression engine.
///
/// Defaults are the shipped thresholds — they are part of the product
/// contract. Tests compress them to milliseconds so a full lifecycle fits
/// in a fraction of a second.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// How often the session timer invokes the sweep.
    pub sweep_interval: Duration,

    /// Elapsed time after which `Submitted` forks to `Converting` or
    /// `FlaggedAwaitingClearance`.
    pub convert_after: Duration,

    /// Elapsed time after which `Converting` moves to `InTransit`.
    pub transit_after: Duration,

    /// Elapsed time after which `InTransit` arrives.
    pub arrival_after: Duration,

    /// Delay added to the grant's submission offset before a cleared
    /// transfer resumes transit.
    pub clearance_resume_delay: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            sweep_interval: config::SWEEP_INTERVAL,
            convert_after: config::CONVERT_AFTER,
            transit_after: config::TRANSIT_AFTER,
            arrival_after: config::ARRIVAL_AFTER,
            clearance_resume_delay: config::CLEARANCE_RESUME_DELAY,
        }
    }
}

// ---------------------------------------------------------------------------
// Transition Rule
// ---------------------------------------------------------------------------

/// Evaluates the transition rule for one record at one instant.
///
/// Pure: no side effects, no mutation. Returns the status the record should
/// move to, or `None` if no transition fires this tick. The caller applies
/// the transition under the record's entry lock.
pub fn next_transition(
    record: &TransferRecord,
    now: DateTime<Utc>,
    config: &SweepConfig,
) -> Option<TransferStatus> {
    let elapsed = record.elapsed_since_submission(now);

    match record.status {
        TransferStatus::Submitted if elapsed > config.convert_after => {
            Some(if record.requires_auth {
                TransferStatus::FlaggedAwaitingClearance
            } else {
                TransferStatus::Converting
            })
        }
        TransferStatus::Converting if elapsed > config.transit_after => {
            Some(TransferStatus::InTransit)
        }
        TransferStatus::ClearanceGranted => {
            let granted_at = record.timestamp_for(TransferStatus::ClearanceGranted)?;
            // Shared elapsed basis: how long the grant took, measured from
            // submission, plus the fixed resume delay.
            let grant_offset = (granted_at - record.submitted_at).to_std().unwrap_or_default();
            (elapsed > grant_offset + config.clearance_resume_delay)
                .then_some(TransferStatus::InTransit)
        }
        TransferStatus::InTransit if elapsed > config.arrival_after => {
            Some(TransferStatus::FundsArrived)
        }
        // FlaggedAwaitingClearance has no time-based exit, FundsArrived is
        // absorbing, and everything else is simply not due yet.
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Sweeper
// ---------------------------------------------------------------------------

/// Applies the transition rule across the whole ledger.
///
/// One `sweep` is a single pass over the non-terminal records. Each record
/// is advanced under its entry lock so an authorize landing mid-sweep is
/// seen either fully or not at all. Arrival side effects are fired after
/// the lock is released — sinks are fire-and-forget but there is no reason
/// to hold a record lock while they run.
pub struct Sweeper {
    ledger: Arc<TransferLedger>,
    config: SweepConfig,
    notifications: Arc<dyn NotificationSink>,
    receipts: Arc<dyn ReceiptSink>,
}

impl Sweeper {
    /// Wires a sweeper to a ledger and its side-effect sinks.
    pub fn new(
        ledger: Arc<TransferLedger>,
        config: SweepConfig,
        notifications: Arc<dyn NotificationSink>,
        receipts: Arc<dyn ReceiptSink>,
    ) -> Self {
        Self {
            ledger,
            config,
            notifications,
            receipts,
        }
    }

    /// One sweep at the current wall clock. Returns how many transitions
    /// fired.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Utc::now())
    }

    /// One sweep at an explicit instant, for deterministic tests.
    ///
    /// Idempotent between threshold crossings: running it back-to-back with
    /// the same `now` fires nothing the second time, because every rule
    /// moves the record out of the status that made it fire.
    pub fn sweep_at(&self, now: DateTime<Utc>) -> usize {
        let mut transitions = 0;
        let mut arrivals: Vec<TransferRecord> = Vec::new();

        for id in self.ledger.active_ids() {
            // Evaluate and apply under the entry lock so a concurrent
            // authorize is seen either fully or not at all.
            let outcome = self.ledger.update(id, |record| {
                let next = next_transition(record, now, &self.config)?;
                record.record_status(next, now);
                Some((next, record.clone()))
            });

            if let Some(Some((next, record))) = outcome {
                transitions += 1;
                debug!(transfer = %id, status = %next, "transfer advanced");
                if next.is_terminal() {
                    arrivals.push(record);
                }
            }
        }

        for record in &arrivals {
            info!(
                transfer = %record.id,
                amount = %record.receive_amount,
                recipient = %record.recipient.name,
                "funds arrived"
            );
            self.notifications.notify(
                NotificationKind::Success,
                "Funds arrived",
                &format!(
                    "{} received {}",
                    record.recipient.name,
                    record.receive_amount.display_decimal()
                ),
            );
            self.receipts.send_receipt(record);
        }

        transitions
    }

    /// Returns the config this sweeper runs with.
    pub fn config(&self) -> &SweepConfig {
        &self.config
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::MemorySink;
    use crate::transfer::{
        Amount, ClearanceMethod, Currency, ExchangeRate, RecipientSnapshot, TransferDetails,
        TransferId,
    };
    use chrono::TimeZone;

    fn details(requires_auth: bool) -> TransferDetails {
        TransferDetails {
            source_account: "acct-main".to_string(),
            recipient: RecipientSnapshot {
                name: "Adaeze Obi".to_string(),
                account_number: "0123456789".to_string(),
                bank: "First Sandbox Bank".to_string(),
                country: "NG".to_string(),
                currency: Currency::NGN,
            },
            send_amount: Amount::new(10_000, Currency::USD),
            fee: Amount::new(500, Currency::USD),
            rate: ExchangeRate::from_ppm(1_500_000),
            requires_auth,
            reference: None,
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn at(seconds: i64) -> DateTime<Utc> {
        t0() + chrono::Duration::seconds(seconds)
    }

    struct Harness {
        ledger: Arc<TransferLedger>,
        sweeper: Sweeper,
        sink: Arc<MemorySink>,
    }

    fn harness() -> Harness {
        let ledger = Arc::new(TransferLedger::new());
        let sink = Arc::new(MemorySink::new());
        let sweeper = Sweeper::new(
            Arc::clone(&ledger),
            SweepConfig::default(),
            Arc::clone(&sink) as Arc<dyn NotificationSink>,
            Arc::clone(&sink) as Arc<dyn ReceiptSink>,
        );
        Harness {
            ledger,
            sweeper,
            sink,
        }
    }

    fn status_of(h: &Harness, id: TransferId) -> TransferStatus {
        h.ledger.get(id).unwrap().status
    }

    #[test]
    fn unflagged_transfer_full_lifecycle() {
        let h = harness();
        let id = h.ledger.submit_at(details(false), t0()).id;

        // Nothing is due before the first threshold.
        assert_eq!(h.sweeper.sweep_at(at(3)), 0);
        assert_eq!(status_of(&h, id), TransferStatus::Submitted);

        h.sweeper.sweep_at(at(5));
        assert_eq!(status_of(&h, id), TransferStatus::Converting);

        h.sweeper.sweep_at(at(9));
        assert_eq!(status_of(&h, id), TransferStatus::InTransit);

        h.sweeper.sweep_at(at(16));
        assert_eq!(status_of(&h, id), TransferStatus::FundsArrived);

        // Receipt and notification fired exactly once, on the arrival edge.
        assert_eq!(h.sink.receipt_count(), 1);
        assert_eq!(h.sink.notifications().len(), 1);
        assert_eq!(h.sink.notifications()[0].0, NotificationKind::Success);
    }

    #[test]
    fn one_transition_per_sweep_even_when_overdue() {
        let h = harness();
        let id = h.ledger.submit_at(details(false), t0()).id;

        // A single sweep far past every threshold still advances one step.
        h.sweeper.sweep_at(at(60));
        assert_eq!(status_of(&h, id), TransferStatus::Converting);

        h.sweeper.sweep_at(at(60));
        assert_eq!(status_of(&h, id), TransferStatus::InTransit);

        h.sweeper.sweep_at(at(60));
        assert_eq!(status_of(&h, id), TransferStatus::FundsArrived);
    }

    #[test]
    fn funds_arrived_is_absorbing() {
        let h = harness();
        let id = h.ledger.submit_at(details(false), t0()).id;

        for s in [5, 9, 16] {
            h.sweeper.sweep_at(at(s));
        }
        let arrived = h.ledger.get(id).unwrap();
        assert!(arrived.is_terminal());

        // Hammer the sweep; the record must not change and no further
        // side effects may fire.
        for s in 17..40 {
            assert_eq!(h.sweeper.sweep_at(at(s)), 0);
        }
        let after = h.ledger.get(id).unwrap();
        assert_eq!(after.status, TransferStatus::FundsArrived);
        assert_eq!(after.status_timestamps, arrived.status_timestamps);
        assert_eq!(h.sink.receipt_count(), 1);
    }

    #[test]
    fn unflagged_transfer_never_visits_clearance_states() {
        let h = harness();
        let id = h.ledger.submit_at(details(false), t0()).id;

        for s in 0..40 {
            h.sweeper.sweep_at(at(s));
        }

        let record = h.ledger.get(id).unwrap();
        assert!(record
            .timestamp_for(TransferStatus::FlaggedAwaitingClearance)
            .is_none());
        assert!(record
            .timestamp_for(TransferStatus::ClearanceGranted)
            .is_none());
    }

    #[test]
    fn flagged_transfer_holds_until_authorized() {
        let h = harness();
        let id = h.ledger.submit_at(details(true), t0()).id;

        h.sweeper.sweep_at(at(5));
        assert_eq!(status_of(&h, id), TransferStatus::FlaggedAwaitingClearance);

        // Sweep every 2s until t=100s: the hold must not budge.
        let mut s = 7;
        while s <= 100 {
            assert_eq!(h.sweeper.sweep_at(at(s)), 0);
            s += 2;
        }
        assert_eq!(status_of(&h, id), TransferStatus::FlaggedAwaitingClearance);

        // Authorize via code, then resume after the delay.
        let granted = h
            .ledger
            .authorize_at(id, ClearanceMethod::Code, at(100))
            .unwrap();
        assert_eq!(granted.status, TransferStatus::ClearanceGranted);
        assert!(!granted.clearance_fee_paid);

        h.sweeper.sweep_at(at(105));
        assert_eq!(status_of(&h, id), TransferStatus::InTransit);
    }

    #[test]
    fn flagged_transfer_cannot_reach_transit_without_grant() {
        let h = harness();
        let id = h.ledger.submit_at(details(true), t0()).id;

        for s in 0..200 {
            h.sweeper.sweep_at(at(s));
        }

        let record = h.ledger.get(id).unwrap();
        assert_eq!(record.status, TransferStatus::FlaggedAwaitingClearance);
        assert!(record.timestamp_for(TransferStatus::InTransit).is_none());
    }

    #[test]
    fn clearance_resume_formula_is_pinned() {
        // Grant at t=60s: the resume threshold is the grant's offset from
        // submission (60s) plus the 4s delay — strictly greater than 64s
        // of total elapsed time.
        let h = harness();
        let id = h.ledger.submit_at(details(true), t0()).id;

        h.sweeper.sweep_at(at(5));
        h.ledger
            .authorize_at(id, ClearanceMethod::Code, at(60))
            .unwrap();

        assert_eq!(h.sweeper.sweep_at(at(63)), 0);
        assert_eq!(status_of(&h, id), TransferStatus::ClearanceGranted);

        // Exactly at the boundary: strictly-greater semantics, no fire.
        assert_eq!(h.sweeper.sweep_at(at(64)), 0);
        assert_eq!(status_of(&h, id), TransferStatus::ClearanceGranted);

        assert_eq!(h.sweeper.sweep_at(at(65)), 1);
        assert_eq!(status_of(&h, id), TransferStatus::InTransit);
    }

    #[test]
    fn fee_authorization_marks_fee_paid() {
        let h = harness();
        let id = h.ledger.submit_at(details(true), t0()).id;

        h.sweeper.sweep_at(at(5));
        let granted = h
            .ledger
            .authorize_at(id, ClearanceMethod::Fee, at(10))
            .unwrap();
        assert!(granted.clearance_fee_paid);
    }

    #[test]
    fn cleared_transfer_arrives_with_full_history() {
        let h = harness();
        let id = h.ledger.submit_at(details(true), t0()).id;

        h.sweeper.sweep_at(at(5));
        h.ledger
            .authorize_at(id, ClearanceMethod::Code, at(10))
            .unwrap();
        h.sweeper.sweep_at(at(15)); // resumes: 15 > 10 + 4
        h.sweeper.sweep_at(at(16)); // arrives: 16 > 15

        let record = h.ledger.get(id).unwrap();
        assert_eq!(record.status, TransferStatus::FundsArrived);

        // Every status passed through has exactly one timestamp, and the
        // unreached Converting state has none.
        for status in [
            TransferStatus::Submitted,
            TransferStatus::FlaggedAwaitingClearance,
            TransferStatus::ClearanceGranted,
            TransferStatus::InTransit,
            TransferStatus::FundsArrived,
        ] {
            assert!(
                record.timestamp_for(status).is_some(),
                "missing timestamp for {status}"
            );
        }
        assert!(record.timestamp_for(TransferStatus::Converting).is_none());
        assert_eq!(record.status_timestamps.len(), 5);
        assert_eq!(h.sink.receipt_count(), 1);
    }

    #[test]
    fn sweeps_are_independent_per_record() {
        let h = harness();
        let early = h.ledger.submit_at(details(false), t0()).id;
        let late = h.ledger.submit_at(details(false), at(10)).id;

        h.sweeper.sweep_at(at(12));
        // 12s elapsed for the early one, 2s for the late one.
        assert_eq!(status_of(&h, early), TransferStatus::Converting);
        assert_eq!(status_of(&h, late), TransferStatus::Submitted);
    }

    #[test]
    fn back_to_back_sweeps_are_idempotent() {
        let h = harness();
        let id = h.ledger.submit_at(details(false), t0()).id;

        assert_eq!(h.sweeper.sweep_at(at(5)), 1);
        assert_eq!(h.sweeper.sweep_at(at(5)), 0);
        assert_eq!(status_of(&h, id), TransferStatus::Converting);
    }

    #[test]
    fn thresholds_are_strict_inequalities() {
        let h = harness();
        let id = h.ledger.submit_at(details(false), t0()).id;

        // elapsed == 4s exactly: "> 4s" has not been satisfied.
        assert_eq!(h.sweeper.sweep_at(at(4)), 0);
        assert_eq!(status_of(&h, id), TransferStatus::Submitted);
    }
}
