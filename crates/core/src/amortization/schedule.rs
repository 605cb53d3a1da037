//! Payment schedules and installment classification.

use chrono::{Days, Months, NaiveDate};
use rust_decimal::Decimal;

use super::engine::compute_installment;
use super::types::{
    InstallmentStatus, InstallmentView, LoanTerms, PaymentRecord, Quote, ScheduleEntry, is_settled,
};
use crate::loan::LoanSnapshot;

/// Advances a date by whole calendar months (not 30-day increments).
///
/// Saturates at the calendar limit instead of overflowing.
#[must_use]
pub fn advance_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

/// Advances a date by whole days, saturating at the calendar limit.
#[must_use]
pub fn advance_days(date: NaiveDate, days: u32) -> NaiveDate {
    date.checked_add_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MAX)
}

/// A full amortization schedule for one loan.
///
/// Construction precomputes the quote; [`PaymentSchedule::iter`] then
/// yields the entries lazily and can be called any number of times.
#[derive(Debug, Clone)]
pub struct PaymentSchedule {
    terms: LoanTerms,
    quote: Quote,
}

impl PaymentSchedule {
    /// Builds the schedule for the given terms.
    #[must_use]
    pub fn new(terms: LoanTerms) -> Self {
        let quote = compute_installment(
            terms.principal,
            terms.rate_percent,
            terms.period,
            terms.installments,
            terms.days,
        );
        Self { terms, quote }
    }

    /// The quote the schedule was built from.
    #[must_use]
    pub const fn quote(&self) -> &Quote {
        &self.quote
    }

    /// Number of entries the schedule yields.
    ///
    /// Recurring terms yield one entry per installment; balloon terms a
    /// single payoff entry. A degenerate (all-zero) quote yields none.
    #[must_use]
    pub fn entry_count(&self) -> u32 {
        if self.quote.total_amount().is_zero() {
            return 0;
        }
        match self.quote {
            Quote::Recurring { .. } => self.terms.installments,
            Quote::Balloon { .. } => 1,
        }
    }

    /// Iterates the schedule entries in installment order.
    #[must_use]
    pub fn iter(&self) -> ScheduleIter<'_> {
        ScheduleIter {
            schedule: self,
            next_number: 1,
        }
    }
}

impl<'a> IntoIterator for &'a PaymentSchedule {
    type Item = ScheduleEntry;
    type IntoIter = ScheduleIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy iterator over the entries of a [`PaymentSchedule`].
#[derive(Debug)]
pub struct ScheduleIter<'a> {
    schedule: &'a PaymentSchedule,
    next_number: u32,
}

impl Iterator for ScheduleIter<'_> {
    type Item = ScheduleEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let number = self.next_number;
        if number > self.schedule.entry_count() {
            return None;
        }
        self.next_number += 1;

        let terms = &self.schedule.terms;
        match self.schedule.quote {
            Quote::Recurring {
                installment_value,
                total_amount,
                ..
            } => {
                let outstanding = total_amount - installment_value * Decimal::from(number);
                let remaining_after = if is_settled(outstanding) || outstanding < Decimal::ZERO {
                    Decimal::ZERO
                } else {
                    outstanding
                };
                Some(ScheduleEntry {
                    number,
                    due_date: advance_months(terms.start_date, number),
                    amount: installment_value,
                    remaining_after,
                })
            }
            Quote::Balloon { total_amount, .. } => Some(ScheduleEntry {
                number,
                due_date: advance_days(terms.start_date, terms.days),
                amount: total_amount,
                remaining_after: Decimal::ZERO,
            }),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .schedule
            .entry_count()
            .saturating_sub(self.next_number - 1) as usize;
        (remaining, Some(remaining))
    }
}

/// Classifies every installment of a loan as paid, pending, or overdue.
///
/// Produces one `Paid` entry per recorded paid payment (dated at the
/// recorded payment date) and one derived entry per remaining
/// installment: the i-th remaining installment (i = 0, 1, ...) falls due
/// `next_payment_date + i` months and is `Overdue` if that date is
/// strictly before `today` (date-only comparison), else `Pending`.
///
/// Entries are sorted ascending by due date (ties by installment
/// number); paid and derived entries interleave naturally by date.
///
/// A loan that is not open (already `Paid`) contributes no derived
/// entries, and neither does a loan whose paid count has already reached
/// its installment count, even if the stored status has not caught up.
#[must_use]
pub fn classify_installments(
    loan: &LoanSnapshot,
    payments: &[PaymentRecord],
    today: NaiveDate,
) -> Vec<InstallmentView> {
    let mut views: Vec<InstallmentView> = payments
        .iter()
        .filter(|p| p.status == InstallmentStatus::Paid)
        .map(|p| InstallmentView {
            number: p.installment_number,
            due_date: p.paid_on,
            amount: p.amount,
            status: InstallmentStatus::Paid,
        })
        .collect();

    #[allow(clippy::cast_possible_truncation)]
    let count_paid = views.len() as u32;

    if loan.status.is_open() {
        let remaining = loan.installments.saturating_sub(count_paid);
        for i in 0..remaining {
            let due_date = advance_months(loan.next_payment_date, i);
            let status = if due_date < today {
                InstallmentStatus::Overdue
            } else {
                InstallmentStatus::Pending
            };
            views.push(InstallmentView {
                number: count_paid + i + 1,
                due_date,
                amount: loan.installment_value,
                status,
            });
        }
    }

    views.sort_by(|a, b| a.due_date.cmp(&b.due_date).then(a.number.cmp(&b.number)));
    views
}
