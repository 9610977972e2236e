//! Notification and receipt sinks.
//!
//! The progression engine does not know how the outside world wants to hear
//! about an arrival — toast popup, push notification, transactional email.
//! It only knows the two seams defined here and calls them fire-and-forget
//! on the `InTransit → FundsArrived` edge. Delivery guarantees are the
//! sink's problem, not the sweep's.

use std::fmt;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::transfer::TransferRecord;

// ---------------------------------------------------------------------------
// NotificationKind
// ---------------------------------------------------------------------------

/// Severity/flavor of an in-app notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    /// Good news (funds arrived, clearance granted).
    Success,
    /// Neutral status information.
    Info,
    /// Something needs the user's attention.
    Warning,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sink Traits
// ---------------------------------------------------------------------------

/// Receives in-app notifications. Implementations must be cheap and must
/// not block — the sweep calls this inline.
pub trait NotificationSink: Send + Sync {
    /// Delivers one notification. Fire-and-forget.
    fn notify(&self, kind: NotificationKind, title: &str, message: &str);
}

/// Receives transactional receipts for arrived transfers.
pub trait ReceiptSink: Send + Sync {
    /// Emits the receipt for an arrived transfer. Fire-and-forget.
    fn send_receipt(&self, record: &TransferRecord);
}

// ---------------------------------------------------------------------------
// TracingNotifier
// ---------------------------------------------------------------------------

/// Default sink: routes notifications and receipts to the `tracing`
/// subscriber. In the sandbox the "email" is a log line, which is exactly
/// as real as the money.
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn notify(&self, kind: NotificationKind, title: &str, message: &str) {
        info!(kind = %kind, title, message, "notification");
    }
}

impl ReceiptSink for TracingNotifier {
    fn send_receipt(&self, record: &TransferRecord) {
        match serde_json::to_string(record) {
            Ok(body) => debug!(transfer = %record.id, receipt = %body, "receipt sent"),
            Err(e) => warn!(transfer = %record.id, error = %e, "receipt serialization failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// MemorySink
// ---------------------------------------------------------------------------

/// Buffering sink that records everything it receives. Used by tests to
/// assert side effects fire exactly once, and by the demo harness to print
/// a summary at the end of a run.
#[derive(Debug, Default)]
pub struct MemorySink {
    notifications: Mutex<Vec<(NotificationKind, String, String)>>,
    receipts: Mutex<Vec<TransferRecord>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All notifications received so far.
    pub fn notifications(&self) -> Vec<(NotificationKind, String, String)> {
        self.notifications.lock().clone()
    }

    /// All receipts received so far.
    pub fn receipts(&self) -> Vec<TransferRecord> {
        self.receipts.lock().clone()
    }

    /// Number of receipts received.
    pub fn receipt_count(&self) -> usize {
        self.receipts.lock().len()
    }
}

impl NotificationSink for MemorySink {
    fn notify(&self, kind: NotificationKind, title: &str, message: &str) {
        self.notifications
            .lock()
            .push((kind, title.to_string(), message.to_string()));
    }
}

impl ReceiptSink for MemorySink {
    fn send_receipt(&self, record: &TransferRecord) {
        self.receipts.lock().push(record.clone());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
