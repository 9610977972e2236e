//! Core type definitions for Vela transfers.
//!
//! These types form the vocabulary of every transfer in the sandbox.
//! They are intentionally kept small and `Copy`-friendly where possible.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::RATE_PPM_SCALE;

// ---------------------------------------------------------------------------
// TransferStatus
// ---------------------------------------------------------------------------

/// Lifecycle state of a transfer.
///
/// Statuses advance monotonically on elapsed-time thresholds, with one fork:
/// a transfer flagged at submission holds in `FlaggedAwaitingClearance` until
/// an explicit authorize moves it to `ClearanceGranted`. `FundsArrived` is
/// absorbing — once there, the sweep treats the record as a no-op forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferStatus {
    /// Just created; the clock starts here.
    Submitted,
    /// Currency conversion in progress (the unflagged path out of Submitted).
    Converting,
    /// Held for manual clearance; no time-based exit.
    FlaggedAwaitingClearance,
    /// Clearance resolved; transit resumes after a short delay.
    ClearanceGranted,
    /// Funds moving to the recipient's bank.
    InTransit,
    /// Terminal. The recipient has the money (in our imagination).
    FundsArrived,
}

impl TransferStatus {
    /// Returns `true` for the absorbing terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::FundsArrived)
    }

    /// All statuses, in canonical progression order. The clearance pair sits
    /// between Submitted and InTransit, where the fork lives.
    pub const ALL: [TransferStatus; 6] = [
        Self::Submitted,
        Self::Converting,
        Self::FlaggedAwaitingClearance,
        Self::ClearanceGranted,
        Self::InTransit,
        Self::FundsArrived,
    ];
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submitted => write!(f, "Submitted"),
            Self::Converting => write!(f, "Converting"),
            Self::FlaggedAwaitingClearance => write!(f, "FlaggedAwaitingClearance"),
            Self::ClearanceGranted => write!(f, "ClearanceGranted"),
            Self::InTransit => write!(f, "InTransit"),
            Self::FundsArrived => write!(f, "FundsArrived"),
        }
    }
}

// ---------------------------------------------------------------------------
// ClearanceMethod
// ---------------------------------------------------------------------------

/// How a flagged transfer was authorized.
///
/// `Code` is the free path (the user typed the code we emailed them).
/// `Fee` skips the code by paying a flat clearance fee, which is recorded
/// on the transfer so the receipt can itemize it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClearanceMethod {
    /// Verification code entered by the user.
    Code,
    /// Flat fee paid in lieu of the code.
    Fee,
}

impl fmt::Display for ClearanceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code => write!(f, "Code"),
            Self::Fee => write!(f, "Fee"),
        }
    }
}

// ---------------------------------------------------------------------------
// Currency
// ---------------------------------------------------------------------------

/// Currencies the sandbox natively understands.
///
/// These cover the demo corridors (US/EU → West and East Africa). Anything
/// else uses [`Currency::Custom`] with an arbitrary ticker string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    /// United States Dollar (smallest unit: cent, 10^-2).
    USD,
    /// Euro (smallest unit: cent, 10^-2).
    EUR,
    /// Pound Sterling (smallest unit: penny, 10^-2).
    GBP,
    /// Nigerian Naira (smallest unit: kobo, 10^-2).
    NGN,
    /// Kenyan Shilling (smallest unit: cent, 10^-2).
    KES,
    /// Arbitrary ticker for anything the demo team dreams up.
    Custom(String),
}

impl Currency {
    /// Number of decimal places for display formatting. Purely cosmetic:
    /// the engine always operates on integer minor units.
    pub fn decimals(&self) -> u8 {
        match self {
            Self::USD | Self::EUR | Self::GBP | Self::NGN | Self::KES => 2,
            Self::Custom(_) => 2, // sensible default for fiat-shaped things
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::USD => write!(f, "USD"),
            Self::EUR => write!(f, "EUR"),
            Self::GBP => write!(f, "GBP"),
            Self::NGN => write!(f, "NGN"),
            Self::KES => write!(f, "KES"),
            Self::Custom(ticker) => write!(f, "{}", ticker),
        }
    }
}

// ---------------------------------------------------------------------------
// Amount
// ---------------------------------------------------------------------------

/// A monetary amount in the smallest indivisible unit of its currency.
///
/// `minor` is always an integer: `Amount::new(1050, Currency::USD)` is
/// $10.50, and `Amount::new(250_000, Currency::NGN)` is ₦2,500.00.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    /// Value in minor units (cents, kobo, ...).
    pub minor: u64,
    /// The currency denomination.
    pub currency: Currency,
}

impl Amount {
    /// Creates a new amount.
    pub fn new(minor: u64, currency: Currency) -> Self {
        Self { minor, currency }
    }

    /// Returns `true` if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.minor == 0
    }

    /// Human-readable decimal rendering, e.g. `"10.50 USD"`.
    pub fn display_decimal(&self) -> String {
        let decimals = self.currency.decimals() as u32;
        let divisor = 10u64.pow(decimals);
        let whole = self.minor / divisor;
        let frac = self.minor % divisor;
        format!(
            "{}.{:0>width$} {}",
            whole,
            frac,
            self.currency,
            width = decimals as usize
        )
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.minor, self.currency)
    }
}

// ---------------------------------------------------------------------------
// ExchangeRate
// ---------------------------------------------------------------------------

/// An exchange rate in integer parts-per-million.
///
/// A rate of `1_250_000` ppm converts 100 source minor units into 125
/// target minor units. Conversion is done in `u128` so that even absurd
/// demo amounts cannot overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate {
    /// Target units per source unit, scaled by [`RATE_PPM_SCALE`].
    pub ppm: u64,
}

impl ExchangeRate {
    /// Creates a rate from a raw ppm value.
    pub fn from_ppm(ppm: u64) -> Self {
        Self { ppm }
    }

    /// The identity rate (1:1).
    pub fn unit() -> Self {
        Self {
            ppm: RATE_PPM_SCALE,
        }
    }

    /// Converts an amount of source minor units into target minor units,
    /// truncating toward zero. The bank always rounds in its own favor.
    /// Results beyond `u64::MAX` saturate rather than wrapping.
    pub fn convert(&self, source_minor: u64) -> u64 {
        let target = (source_minor as u128 * self.ppm as u128) / RATE_PPM_SCALE as u128;
        u64::try_from(target).unwrap_or(u64::MAX)
    }
}

impl fmt::Display for ExchangeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:06}",
            self.ppm / RATE_PPM_SCALE,
            self.ppm % RATE_PPM_SCALE
        )
    }
}

// ---------------------------------------------------------------------------
// RecipientSnapshot
// ---------------------------------------------------------------------------

/// The recipient's details as they existed at submission time.
///
/// This is a copy, not a reference: editing the saved recipient in the
/// address book afterwards must not rewrite history. Receipts and the
/// transfer detail view both render from this snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientSnapshot {
    /// Display name of the recipient.
    pub name: String,
    /// Account number at the receiving bank.
    pub account_number: String,
    /// Name of the receiving bank.
    pub bank: String,
    /// ISO country code of the receiving bank.
    pub country: String,
    /// Currency the recipient is paid in.
    pub currency: Currency,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
