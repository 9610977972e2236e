//! # Session Lifecycle
//!
//! A [`SessionContext`] is created when a user logs in and owns everything
//! scoped to that login: the transfer ledger and the sweep timer driving it.
//! There is no hidden global state — drop the session and the ledger goes
//! with it.
//!
//! ## Sweep Task
//!
//! `login` spawns a single tokio task that ticks on the configured interval
//! and runs one synchronous sweep per tick. Ticks are awaited serially, so
//! sweeps never overlap. The task monitors a `tokio::sync::watch` channel:
//! [`logout`](SessionContext::logout) flips it and awaits the task, which
//! exits after finishing its current tick. A session dropped without logout
//! still signals shutdown and aborts the task — a sweep timer outliving its
//! session is a defect, not a quirk.
//!
//! ## Fire-and-Forget Seams
//!
//! The session-level [`authorize`](SessionContext::authorize) swallows
//! ledger errors after logging them at debug level. That is how the
//! front-end behaves: tapping "authorize" on a transfer that is not
//! actually holding does nothing visible.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::ledger::TransferLedger;
use crate::notify::{NotificationSink, ReceiptSink, TracingNotifier};
use crate::progression::{SweepConfig, Sweeper};
use crate::transfer::{ClearanceMethod, TransferDetails, TransferId, TransferRecord};

// ---------------------------------------------------------------------------
// SessionContext
// ---------------------------------------------------------------------------

/// One logged-in session: its ledger, its sweeper, and the timer task.
pub struct SessionContext {
    ledger: Arc<TransferLedger>,
    sweeper: Arc<Sweeper>,
    shutdown_tx: watch::Sender<bool>,
    sweep_task: Option<JoinHandle<()>>,
}

impl SessionContext {
    /// Opens a session with the default sweep timing and the tracing-backed
    /// sinks.
    pub fn login() -> Self {
        let notifier = Arc::new(TracingNotifier);
        Self::login_with(
            SweepConfig::default(),
            Arc::clone(&notifier) as Arc<dyn NotificationSink>,
            notifier as Arc<dyn ReceiptSink>,
        )
    }

    /// Opens a session with explicit timing and sinks. Tests use this to
    /// compress thresholds to milliseconds and capture side effects.
    pub fn login_with(
        config: SweepConfig,
        notifications: Arc<dyn NotificationSink>,
        receipts: Arc<dyn ReceiptSink>,
    ) -> Self {
        let ledger = Arc::new(TransferLedger::new());
        let sweeper = Arc::new(Sweeper::new(
            Arc::clone(&ledger),
            config.clone(),
            notifications,
            receipts,
        ));

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let sweep_ref = Arc::clone(&sweeper);
        let sweep_task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(config.sweep_interval);
            // No catch-up bursts after a stall: one tick, one sweep.
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        sweep_ref.sweep();
                    }
                    res = shutdown_rx.changed() => {
                        // Sender dropped counts as shutdown too.
                        if res.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            debug!("sweep task stopped");
        });

        info!("session opened, sweep timer running");
        Self {
            ledger,
            sweeper,
            shutdown_tx,
            sweep_task: Some(sweep_task),
        }
    }

    /// Submits a transfer into this session's ledger.
    pub fn submit(&self, details: TransferDetails) -> TransferRecord {
        self.ledger.submit(details)
    }

    /// Resolves a clearance hold. Fire-and-forget: a misdirected call
    /// (unknown id, wrong status) is logged and dropped.
    pub fn authorize(&self, id: TransferId, method: ClearanceMethod) {
        if let Err(e) = self.ledger.authorize(id, method) {
            debug!(transfer = %id, error = %e, "authorize ignored");
        }
    }

    /// The session's ledger, for dashboards and tests.
    pub fn ledger(&self) -> &Arc<TransferLedger> {
        &self.ledger
    }

    /// The session's sweeper. Exposed so callers can force an immediate
    /// sweep (pull-to-refresh) instead of waiting for the next tick.
    pub fn sweeper(&self) -> &Arc<Sweeper> {
        &self.sweeper
    }

    /// Ends the session: signals the sweep task and waits for it to exit.
    /// After this returns, no further status transitions can occur.
    pub async fn logout(mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(task) = self.sweep_task.take() {
            let _ = task.await;
        }
        info!("session closed, sweep timer stopped");
    }
}

impl Drop for SessionContext {
    fn drop(&mut self) {
        // Last-resort cleanup for sessions dropped without logout. The
        // shutdown signal lets an in-flight tick finish; abort covers the
        // case where the runtime never polls the task again.
        let _ = self.shutdown_tx.send(true);
        if let Some(task) = self.sweep_task.take() {
            task.abort();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
