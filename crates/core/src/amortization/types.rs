//! Domain types for the amortization engine.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Tolerance under which a remaining balance counts as fully paid.
///
/// One centavo: a balance whose absolute value is below `0.01` currency
/// units is considered settled. Constant-payment amortization leaves
/// sub-cent residue after the last installment; this is the documented
/// cut-off for calling the loan paid.
pub const SETTLED_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Returns true if a remaining balance is close enough to zero to count
/// as settled (see [`SETTLED_EPSILON`]).
#[must_use]
pub fn is_settled(remaining_balance: Decimal) -> bool {
    remaining_balance.abs() < SETTLED_EPSILON
}

/// How the stated interest rate applies over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatePeriod {
    /// Flat daily rate over a fixed number of days; produces a single
    /// balloon payoff, not a recurring schedule.
    Daily,
    /// Weekly rate, converted to an effective monthly compounding rate.
    Weekly,
    /// Monthly compounding rate, used as-is.
    Monthly,
    /// Flat percentage charged once on the principal, split evenly
    /// across the installments.
    FlatTotal,
}

impl RatePeriod {
    /// Returns true if this period produces a recurring installment
    /// schedule (everything except `Daily`).
    #[must_use]
    pub fn is_recurring(&self) -> bool {
        !matches!(self, Self::Daily)
    }
}

/// Result of an installment computation.
///
/// The daily mode changes the shape of the result (there is no recurring
/// installment value), so the two cases are distinct variants rather
/// than a struct with sometimes-absent fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Quote {
    /// A recurring schedule with a fixed per-installment value.
    Recurring {
        /// Fixed value of each installment.
        installment_value: Decimal,
        /// Total repaid over the life of the loan.
        total_amount: Decimal,
        /// Interest component of `total_amount`.
        total_interest: Decimal,
    },
    /// A single payoff (daily mode).
    Balloon {
        /// The payoff amount.
        total_amount: Decimal,
        /// Interest component of `total_amount`.
        total_interest: Decimal,
    },
}

impl Quote {
    /// An all-zero recurring quote (degenerate-input policy).
    #[must_use]
    pub const fn zero_recurring() -> Self {
        Self::Recurring {
            installment_value: Decimal::ZERO,
            total_amount: Decimal::ZERO,
            total_interest: Decimal::ZERO,
        }
    }

    /// An all-zero balloon quote (degenerate-input policy).
    #[must_use]
    pub const fn zero_balloon() -> Self {
        Self::Balloon {
            total_amount: Decimal::ZERO,
            total_interest: Decimal::ZERO,
        }
    }

    /// Total amount repaid over the life of the loan.
    #[must_use]
    pub const fn total_amount(&self) -> Decimal {
        match self {
            Self::Recurring { total_amount, .. } | Self::Balloon { total_amount, .. } => {
                *total_amount
            }
        }
    }

    /// Interest component of the total amount.
    #[must_use]
    pub const fn total_interest(&self) -> Decimal {
        match self {
            Self::Recurring { total_interest, .. } | Self::Balloon { total_interest, .. } => {
                *total_interest
            }
        }
    }

    /// The recurring installment value, if this quote has one.
    #[must_use]
    pub const fn installment_value(&self) -> Option<Decimal> {
        match self {
            Self::Recurring {
                installment_value, ..
            } => Some(*installment_value),
            Self::Balloon { .. } => None,
        }
    }
}

/// The loan terms a schedule is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Principal amount lent.
    pub principal: Decimal,
    /// Interest rate as a percentage (`2.5` means 2.5%).
    pub rate_percent: Decimal,
    /// How the rate applies over time.
    pub period: RatePeriod,
    /// Number of installments; ignored for `Daily`.
    pub installments: u32,
    /// Number of days the flat daily rate applies over; only read for
    /// `Daily`.
    pub days: u32,
    /// Date the loan starts; due dates are calendar months after it.
    pub start_date: NaiveDate,
}

/// One entry of a payment schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// 1-based installment number.
    pub number: u32,
    /// Date the installment falls due.
    pub due_date: NaiveDate,
    /// Amount due.
    pub amount: Decimal,
    /// Balance remaining after this installment is paid, clamped at zero.
    pub remaining_after: Decimal,
}

/// Status of an installment relative to today and the payment history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallmentStatus {
    /// A payment has been recorded for this installment.
    Paid,
    /// Not yet due.
    Pending,
    /// Due date has passed without a recorded payment.
    Overdue,
}

/// A recorded payment, as the engine needs to see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// 1-based installment number the payment settled.
    pub installment_number: u32,
    /// Amount paid.
    pub amount: Decimal,
    /// Date the payment was recorded.
    pub paid_on: NaiveDate,
    /// Stored status; the engine only counts `Paid` records.
    pub status: InstallmentStatus,
}

/// One classified installment: either a historical paid entry or a
/// derived pending/overdue view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentView {
    /// 1-based installment number.
    pub number: u32,
    /// Due date (for paid entries, the recorded payment date).
    pub due_date: NaiveDate,
    /// Amount due or paid.
    pub amount: Decimal,
    /// Classification.
    pub status: InstallmentStatus,
}
