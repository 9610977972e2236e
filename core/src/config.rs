//! # Sandbox Configuration & Constants
//!
//! Every magic number in Vela lives here. The status thresholds below are
//! not arbitrary: the front-end's perceived "processing time" is part of the
//! product, and QA scripts assert against these exact values. Change them
//! and every demo recording in the onboarding deck goes stale.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Sweep Timing
// ---------------------------------------------------------------------------

/// How often the session's sweep timer fires. Two seconds keeps the UI
/// feeling live without burning cycles on a collection that rarely changes.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(2);

/// Sweep interval as milliseconds — for APIs that want a u64, not a Duration.
/// Keep this in sync with [`SWEEP_INTERVAL`].
pub const SWEEP_INTERVAL_MS: u64 = 2_000;

// ---------------------------------------------------------------------------
// Status Thresholds
// ---------------------------------------------------------------------------
//
// All thresholds are measured from the Submitted timestamp, not from the
// previous status. A transfer submitted at t=0 converts after 4s, goes in
// transit after 8s, and arrives after 15s of total elapsed time.

/// Elapsed time after which a submitted transfer leaves `Submitted` —
/// either to `Converting` or, when flagged, to `FlaggedAwaitingClearance`.
pub const CONVERT_AFTER: Duration = Duration::from_secs(4);

/// Elapsed time after which a converting transfer moves to `InTransit`.
pub const TRANSIT_AFTER: Duration = Duration::from_secs(8);

/// Elapsed time after which an in-transit transfer arrives. This is the
/// only edge with side effects (notification + receipt).
pub const ARRIVAL_AFTER: Duration = Duration::from_secs(15);

/// Delay between clearance being granted and the transfer resuming transit.
/// Applied on top of the grant's offset from submission — see
/// [`progression`](crate::progression) for the exact formula.
pub const CLEARANCE_RESUME_DELAY: Duration = Duration::from_secs(4);

// ---------------------------------------------------------------------------
// Money
// ---------------------------------------------------------------------------

/// Exchange rates are integers in parts-per-million: a rate of 1_250_000
/// means 1 unit of the source currency buys 1.25 units of the target.
/// Floats near money are how demos become incidents.
pub const RATE_PPM_SCALE: u64 = 1_000_000;

/// Flat clearance fee, in minor units of the source currency, charged when
/// a flagged transfer is authorized via the fee path instead of a code.
pub const CLEARANCE_FEE_MINOR: u64 = 7_000;

/// Maximum length of the free-text reference attached to a transfer.
/// Enough for an invoice number, not enough for your novel.
pub const MAX_REFERENCE_LENGTH: usize = 140;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_strictly_ordered() {
        // If conversion fires after transit, the state machine can never
        // reach the later states. Obvious, but worth pinning.
        assert!(CONVERT_AFTER < TRANSIT_AFTER);
        assert!(TRANSIT_AFTER < ARRIVAL_AFTER);
    }

    #[test]
    fn sweep_is_faster_than_first_threshold() {
        // The sweep must tick at least once before the first transition is
        // due, or status changes would land in visible bursts.
        assert!(SWEEP_INTERVAL < CONVERT_AFTER);
        assert_eq!(SWEEP_INTERVAL.as_millis() as u64, SWEEP_INTERVAL_MS);
    }

    #[test]
    fn rate_scale_is_one_million() {
        assert_eq!(RATE_PPM_SCALE, 1_000_000);
    }
}
