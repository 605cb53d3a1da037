//! Installment math, payment schedules, and installment classification.
//!
//! The engine is pure and synchronous: it performs no I/O and never
//! suspends. All arithmetic is `Decimal`; monetary degeneracies (zero or
//! negative inputs) yield zero-valued quotes instead of errors so that a
//! form being edited can preview values without error spam. Callers gate
//! persistence on input validity independently.

pub mod engine;
pub mod schedule;
pub mod types;

#[cfg(test)]
mod tests;

pub use engine::{compute_installment, effective_monthly_rate};
pub use schedule::{
    PaymentSchedule, ScheduleIter, advance_days, advance_months, classify_installments,
};
pub use types::{
    InstallmentStatus, InstallmentView, LoanTerms, PaymentRecord, Quote, RatePeriod,
    SETTLED_EPSILON, ScheduleEntry, is_settled,
};
