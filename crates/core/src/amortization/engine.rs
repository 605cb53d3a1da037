//! Installment computation.
//!
//! All non-daily periods convert the stated rate to an effective monthly
//! compounding rate and apply the French (constant-payment) amortization
//! formula: `PMT = P * m(1+m)^n / ((1+m)^n - 1)`.

use rust_decimal::{Decimal, MathematicalOps};

use super::types::{Quote, RatePeriod};

/// Average number of weeks per calendar month, used to compound a weekly
/// rate into its effective monthly equivalent.
const WEEKS_PER_MONTH: Decimal = Decimal::from_parts(433, 0, 0, false, 2);

/// Converts a stated rate percentage to the effective monthly
/// compounding rate for an amortized period.
///
/// - `Monthly`: the rate is already monthly, `m = rate/100`.
/// - `Weekly`: compounded over 4.33 weeks, `m = (1 + rate/100)^4.33 - 1`.
/// - `Daily` / `FlatTotal`: not amortized; returns zero.
#[must_use]
pub fn effective_monthly_rate(rate_percent: Decimal, period: RatePeriod) -> Decimal {
    let fraction = rate_percent / Decimal::ONE_HUNDRED;
    match period {
        RatePeriod::Monthly => fraction,
        RatePeriod::Weekly => (Decimal::ONE + fraction).powd(WEEKS_PER_MONTH) - Decimal::ONE,
        RatePeriod::Daily | RatePeriod::FlatTotal => Decimal::ZERO,
    }
}

/// Computes the installment value and totals for the given loan terms.
///
/// `installments` is ignored for `Daily`; `days` is only read for
/// `Daily`. Degenerate input (non-positive principal, negative rate,
/// zero installments or days) yields an all-zero quote of the matching
/// variant rather than an error.
#[must_use]
pub fn compute_installment(
    principal: Decimal,
    rate_percent: Decimal,
    period: RatePeriod,
    installments: u32,
    days: u32,
) -> Quote {
    if principal <= Decimal::ZERO || rate_percent < Decimal::ZERO {
        return match period {
            RatePeriod::Daily => Quote::zero_balloon(),
            _ => Quote::zero_recurring(),
        };
    }

    match period {
        RatePeriod::Daily => balloon_quote(principal, rate_percent, days),
        RatePeriod::FlatTotal => flat_quote(principal, rate_percent, installments),
        RatePeriod::Weekly | RatePeriod::Monthly => amortized_quote(
            principal,
            effective_monthly_rate(rate_percent, period),
            installments,
        ),
    }
}

/// Single payoff for a flat daily rate: `total = P + P*(rate/100)*days`.
fn balloon_quote(principal: Decimal, rate_percent: Decimal, days: u32) -> Quote {
    if days == 0 {
        return Quote::zero_balloon();
    }
    let total_interest = principal * (rate_percent / Decimal::ONE_HUNDRED) * Decimal::from(days);
    Quote::Balloon {
        total_amount: principal + total_interest,
        total_interest,
    }
}

/// Flat interest on the principal, split evenly across installments.
fn flat_quote(principal: Decimal, rate_percent: Decimal, installments: u32) -> Quote {
    if installments == 0 {
        return Quote::zero_recurring();
    }
    let total_interest = principal * rate_percent / Decimal::ONE_HUNDRED;
    let total_amount = principal + total_interest;
    Quote::Recurring {
        installment_value: total_amount / Decimal::from(installments),
        total_amount,
        total_interest,
    }
}

/// Constant-payment amortization at effective monthly rate `m`.
fn amortized_quote(principal: Decimal, monthly_rate: Decimal, installments: u32) -> Quote {
    if installments == 0 {
        return Quote::zero_recurring();
    }

    let installment_value = if monthly_rate.is_zero() {
        principal / Decimal::from(installments)
    } else {
        // PMT = P * m(1+m)^n / ((1+m)^n - 1)
        let growth = (Decimal::ONE + monthly_rate).powu(u64::from(installments));
        principal * monthly_rate * growth / (growth - Decimal::ONE)
    };

    let total_amount = installment_value * Decimal::from(installments);
    Quote::Recurring {
        installment_value,
        total_amount,
        total_interest: total_amount - principal,
    }
}
