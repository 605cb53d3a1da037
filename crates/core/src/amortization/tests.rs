//! Unit and property tests for the amortization engine.

use chrono::NaiveDate;
use proptest::prelude::*;
use rstest::rstest;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

use super::engine::{compute_installment, effective_monthly_rate};
use super::schedule::{PaymentSchedule, advance_months, classify_installments};
use super::types::{
    InstallmentStatus, InstallmentView, LoanTerms, PaymentRecord, Quote, RatePeriod, is_settled,
};
use crate::loan::{LoanSnapshot, LoanStatus};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ========================================================================
// Quote computation
// ========================================================================

#[test]
fn test_monthly_amortization_matches_constant_payment_formula() {
    let quote = compute_installment(dec!(50000), dec!(2.5), RatePeriod::Monthly, 24, 0);

    let Quote::Recurring {
        installment_value,
        total_amount,
        total_interest,
    } = quote
    else {
        panic!("monthly quote must be recurring");
    };

    // PMT = P * m(1+m)^n / ((1+m)^n - 1) with m = 0.025, n = 24
    let m = dec!(0.025);
    let growth = (Decimal::ONE + m).powu(24);
    let expected = dec!(50000) * m * growth / (growth - Decimal::ONE);

    assert!((installment_value - expected).abs() < dec!(0.000001));
    assert!((total_amount - installment_value * dec!(24)).abs() < dec!(0.000001));
    assert_eq!(total_interest, total_amount - dec!(50000));
}

#[test]
fn test_flat_on_total_splits_interest_evenly() {
    let quote = compute_installment(dec!(10000), dec!(20), RatePeriod::FlatTotal, 10, 0);

    assert_eq!(quote.total_interest(), dec!(2000));
    assert_eq!(quote.total_amount(), dec!(12000));
    assert_eq!(quote.installment_value(), Some(dec!(1200)));
}

#[test]
fn test_daily_rate_produces_single_payoff() {
    let quote = compute_installment(dec!(1000), dec!(0.5), RatePeriod::Daily, 0, 30);

    // 1000 * 0.005 * 30 = 150
    assert!(matches!(quote, Quote::Balloon { .. }));
    assert_eq!(quote.total_interest(), dec!(150));
    assert_eq!(quote.total_amount(), dec!(1150));
    assert_eq!(quote.installment_value(), None);
}

#[rstest]
#[case(RatePeriod::Monthly)]
#[case(RatePeriod::Weekly)]
#[case(RatePeriod::FlatTotal)]
fn test_zero_rate_divides_principal_evenly(#[case] period: RatePeriod) {
    let quote = compute_installment(dec!(1200), Decimal::ZERO, period, 12, 0);

    assert_eq!(quote.installment_value(), Some(dec!(100)));
    assert_eq!(quote.total_interest(), Decimal::ZERO);
    assert_eq!(quote.total_amount(), dec!(1200));
}

#[test]
fn test_weekly_rate_compounds_to_monthly() {
    // (1 + 0.01)^4.33 - 1, slightly above 4.33%
    let m = effective_monthly_rate(dec!(1), RatePeriod::Weekly);
    assert!(m > dec!(0.0431) && m < dec!(0.0441));

    let quote = compute_installment(dec!(5000), dec!(1), RatePeriod::Weekly, 10, 0);
    let flat = compute_installment(dec!(5000), dec!(1), RatePeriod::Monthly, 10, 0);
    // Weekly compounding is more expensive than the same nominal monthly rate.
    assert!(quote.total_interest() > flat.total_interest());
}

#[rstest]
#[case(dec!(0), dec!(5), RatePeriod::Monthly, 12, 0)]
#[case(dec!(-100), dec!(5), RatePeriod::FlatTotal, 12, 0)]
#[case(dec!(1000), dec!(-1), RatePeriod::Monthly, 12, 0)]
#[case(dec!(1000), dec!(5), RatePeriod::Monthly, 0, 0)]
fn test_degenerate_input_yields_zero_quote(
    #[case] principal: Decimal,
    #[case] rate: Decimal,
    #[case] period: RatePeriod,
    #[case] installments: u32,
    #[case] days: u32,
) {
    let quote = compute_installment(principal, rate, period, installments, days);
    assert_eq!(quote.total_amount(), Decimal::ZERO);
    assert_eq!(quote.total_interest(), Decimal::ZERO);
}

#[test]
fn test_degenerate_daily_input_yields_zero_balloon() {
    let quote = compute_installment(dec!(0), dec!(5), RatePeriod::Daily, 0, 30);
    assert_eq!(quote, Quote::zero_balloon());

    let quote = compute_installment(dec!(1000), dec!(5), RatePeriod::Daily, 0, 0);
    assert_eq!(quote, Quote::zero_balloon());
}

// ========================================================================
// Payment schedule
// ========================================================================

fn monthly_terms() -> LoanTerms {
    LoanTerms {
        principal: dec!(12000),
        rate_percent: dec!(2),
        period: RatePeriod::Monthly,
        installments: 12,
        days: 0,
        start_date: date(2026, 1, 31),
    }
}

#[test]
fn test_schedule_has_one_entry_per_installment() {
    let schedule = PaymentSchedule::new(monthly_terms());
    let entries: Vec<_> = schedule.iter().collect();

    assert_eq!(entries.len(), 12);
    assert_eq!(entries[0].number, 1);
    assert_eq!(entries[11].number, 12);
}

#[test]
fn test_schedule_due_dates_use_calendar_months() {
    let schedule = PaymentSchedule::new(monthly_terms());
    let entries: Vec<_> = schedule.iter().collect();

    // Jan 31 + 1 month clamps to Feb 28, + 2 months is Mar 31.
    assert_eq!(entries[0].due_date, date(2026, 2, 28));
    assert_eq!(entries[1].due_date, date(2026, 3, 31));
    assert_eq!(entries[11].due_date, date(2027, 1, 31));
}

#[test]
fn test_schedule_is_restartable() {
    let schedule = PaymentSchedule::new(monthly_terms());
    let first: Vec<_> = schedule.iter().collect();
    let second: Vec<_> = schedule.iter().collect();
    assert_eq!(first, second);
}

#[test]
fn test_schedule_balance_decreases_to_zero() {
    let schedule = PaymentSchedule::new(monthly_terms());
    let entries: Vec<_> = schedule.iter().collect();

    for pair in entries.windows(2) {
        assert!(pair[1].remaining_after < pair[0].remaining_after || pair[0].remaining_after.is_zero());
    }
    assert_eq!(entries[11].remaining_after, Decimal::ZERO);
}

#[test]
fn test_schedule_sum_equals_total_amount() {
    let schedule = PaymentSchedule::new(monthly_terms());
    let sum: Decimal = schedule.iter().map(|e| e.amount).sum();
    assert!((sum - schedule.quote().total_amount()).abs() < dec!(0.000001));
}

#[test]
fn test_balloon_schedule_is_single_payoff() {
    let terms = LoanTerms {
        principal: dec!(1000),
        rate_percent: dec!(0.5),
        period: RatePeriod::Daily,
        installments: 0,
        days: 30,
        start_date: date(2026, 1, 1),
    };
    let schedule = PaymentSchedule::new(terms);
    let entries: Vec<_> = schedule.iter().collect();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].amount, dec!(1150));
    assert_eq!(entries[0].due_date, date(2026, 1, 31));
    assert_eq!(entries[0].remaining_after, Decimal::ZERO);
}

#[test]
fn test_degenerate_terms_yield_empty_schedule() {
    let mut terms = monthly_terms();
    terms.principal = Decimal::ZERO;
    let schedule = PaymentSchedule::new(terms);
    assert_eq!(schedule.iter().count(), 0);
}

// ========================================================================
// Installment classification
// ========================================================================

fn paid(number: u32, paid_on: NaiveDate) -> PaymentRecord {
    PaymentRecord {
        installment_number: number,
        amount: dec!(100),
        paid_on,
        status: InstallmentStatus::Paid,
    }
}

fn snapshot(status: LoanStatus, installments: u32, next_due: NaiveDate) -> LoanSnapshot {
    LoanSnapshot {
        status,
        principal: dec!(1000),
        installments,
        installment_value: dec!(100),
        remaining_balance: dec!(700),
        next_payment_date: next_due,
    }
}

#[test]
fn test_classification_completeness() {
    // 12 installments, 5 paid, today past the 6th due date but before
    // the 7th: expect 5 paid + 1 overdue + 6 pending, date-ordered.
    let loan = snapshot(LoanStatus::Active, 12, date(2026, 6, 10));
    let payments: Vec<_> = (1..=5).map(|i| paid(i, date(2026, i, 10))).collect();
    let today = date(2026, 6, 20);

    let views = classify_installments(&loan, &payments, today);

    assert_eq!(views.len(), 12);
    let count = |s: InstallmentStatus| views.iter().filter(|v| v.status == s).count();
    assert_eq!(count(InstallmentStatus::Paid), 5);
    assert_eq!(count(InstallmentStatus::Overdue), 1);
    assert_eq!(count(InstallmentStatus::Pending), 6);

    // The single overdue entry is the 6th installment.
    let overdue: Vec<_> = views
        .iter()
        .filter(|v| v.status == InstallmentStatus::Overdue)
        .collect();
    assert_eq!(overdue[0].number, 6);
    assert_eq!(overdue[0].due_date, date(2026, 6, 10));

    // Ascending by due date.
    for pair in views.windows(2) {
        assert!(pair[0].due_date <= pair[1].due_date);
    }
}

#[test]
fn test_classification_due_date_today_is_pending() {
    // Date-only comparison: an installment due today is not overdue yet.
    let loan = snapshot(LoanStatus::Active, 1, date(2026, 6, 10));
    let views = classify_installments(&loan, &[], date(2026, 6, 10));

    assert_eq!(views.len(), 1);
    assert_eq!(views[0].status, InstallmentStatus::Pending);
}

#[test]
fn test_paid_loan_contributes_no_derived_entries() {
    let loan = snapshot(LoanStatus::Paid, 12, date(2026, 6, 10));
    let payments = vec![paid(1, date(2026, 1, 10))];
    let views = classify_installments(&loan, &payments, date(2026, 7, 1));

    assert_eq!(views.len(), 1);
    assert_eq!(views[0].status, InstallmentStatus::Paid);
}

#[test]
fn test_fully_paid_history_yields_no_derived_entries() {
    // Stored status lagging behind the payment history: all installments
    // paid but status still active.
    let loan = snapshot(LoanStatus::Active, 3, date(2026, 4, 10));
    let payments: Vec<_> = (1..=3).map(|i| paid(i, date(2026, i, 10))).collect();
    let views = classify_installments(&loan, &payments, date(2026, 7, 1));

    assert_eq!(views.len(), 3);
    assert!(views.iter().all(|v| v.status == InstallmentStatus::Paid));
}

#[test]
fn test_paid_and_derived_entries_interleave_by_date() {
    // A late recorded payment dated after the next derived due date must
    // sort after it.
    let loan = snapshot(LoanStatus::Active, 3, date(2026, 2, 1));
    let payments = vec![paid(1, date(2026, 2, 15))];
    let views = classify_installments(&loan, &payments, date(2026, 1, 1));

    let dates: Vec<_> = views.iter().map(|v| v.due_date).collect();
    assert_eq!(
        dates,
        vec![date(2026, 2, 1), date(2026, 2, 15), date(2026, 3, 1)]
    );
}

#[test]
fn test_non_paid_records_are_ignored() {
    let loan = snapshot(LoanStatus::Active, 2, date(2026, 3, 1));
    let mut record = paid(1, date(2026, 2, 1));
    record.status = InstallmentStatus::Pending;
    let views = classify_installments(&loan, &[record], date(2026, 1, 1));

    // Only the two derived entries; the non-paid record contributes
    // nothing.
    assert_eq!(views.len(), 2);
    assert!(views.iter().all(|v| v.status == InstallmentStatus::Pending));
}

// ========================================================================
// Properties
// ========================================================================

/// Strategy for principal amounts in cents (1.00 .. 1,000,000.00).
fn principal_strategy() -> impl Strategy<Value = Decimal> {
    (100i64..100_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for rate percentages with two decimals (0.00 .. 30.00).
fn rate_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..3000i64).prop_map(|n| Decimal::new(n, 2))
}

fn recurring_period_strategy() -> impl Strategy<Value = RatePeriod> {
    prop_oneof![
        Just(RatePeriod::Weekly),
        Just(RatePeriod::Monthly),
        Just(RatePeriod::FlatTotal),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// For any valid recurring terms, the schedule entry amounts sum to
    /// the quoted total.
    #[test]
    fn prop_schedule_sum_equals_total(
        principal in principal_strategy(),
        rate in rate_strategy(),
        period in recurring_period_strategy(),
        installments in 1u32..60,
    ) {
        let terms = LoanTerms {
            principal,
            rate_percent: rate,
            period,
            installments,
            days: 0,
            start_date: date(2026, 1, 15),
        };
        let schedule = PaymentSchedule::new(terms);
        let sum: Decimal = schedule.iter().map(|e| e.amount).sum();
        prop_assert!((sum - schedule.quote().total_amount()).abs() < dec!(0.000001));
    }

    /// Total interest is never negative and totals are consistent.
    #[test]
    fn prop_quote_totals_consistent(
        principal in principal_strategy(),
        rate in rate_strategy(),
        period in recurring_period_strategy(),
        installments in 1u32..60,
    ) {
        let quote = compute_installment(principal, rate, period, installments, 0);
        prop_assert!(quote.total_interest() >= Decimal::ZERO);
        prop_assert!((quote.total_amount() - principal - quote.total_interest()).abs() < dec!(0.000001));
    }

    /// Classification always yields exactly `installments` entries for an
    /// open loan, split between paid history and derived views.
    #[test]
    fn prop_classification_covers_every_installment(
        installments in 1u32..24,
        count_paid_seed in 0u32..24,
    ) {
        let count_paid = count_paid_seed % (installments + 1);
        let loan = snapshot(
            LoanStatus::Active,
            installments,
            date(2026, 1, 10),
        );
        let payments: Vec<_> = (1..=count_paid)
            .map(|i| paid(i, date(2025, (i % 12) + 1, 5)))
            .collect();

        let views = classify_installments(&loan, &payments, date(2026, 1, 1));

        prop_assert_eq!(views.len() as u32, installments);
        let paid_count = views
            .iter()
            .filter(|v| v.status == InstallmentStatus::Paid)
            .count() as u32;
        prop_assert_eq!(paid_count, count_paid);
    }

    /// Derived due dates advance monotonically month over month.
    #[test]
    fn prop_derived_due_dates_monotonic(months in 1u32..48) {
        let start = date(2026, 1, 31);
        prop_assert!(advance_months(start, months) > advance_months(start, months - 1));
    }

    /// The settled tolerance accepts exactly the sub-cent range.
    #[test]
    fn prop_settled_epsilon_boundary(cents in 1i64..1000) {
        let balance = Decimal::new(cents, 2);
        prop_assert!(!is_settled(balance));
        prop_assert!(is_settled(balance - balance));
    }
}

// ========================================================================
// Serde shape
// ========================================================================

#[test]
fn test_quote_serializes_with_kind_tag() {
    let quote = compute_installment(dec!(10000), dec!(20), RatePeriod::FlatTotal, 10, 0);
    let json = serde_json::to_value(quote).unwrap();
    assert_eq!(json["kind"], "recurring");
    assert!(json.get("installment_value").is_some());

    let balloon = compute_installment(dec!(1000), dec!(0.5), RatePeriod::Daily, 0, 30);
    let json = serde_json::to_value(balloon).unwrap();
    assert_eq!(json["kind"], "balloon");
    assert!(json.get("installment_value").is_none());
}

#[test]
fn test_installment_view_is_plain_data() {
    let view = InstallmentView {
        number: 1,
        due_date: date(2026, 2, 1),
        amount: dec!(100),
        status: InstallmentStatus::Pending,
    };
    let json = serde_json::to_string(&view).unwrap();
    assert!(json.contains("\"pending\""));
}
