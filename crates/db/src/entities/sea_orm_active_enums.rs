//! Postgres enum types mapped by `SeaORM`, with conversions to and from
//! the pure domain enums in `prestar-core`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Client activity flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "client_status")]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    /// The client can take new loans.
    #[sea_orm(string_value = "active")]
    Active,
    /// The client is archived from day-to-day use.
    #[sea_orm(string_value = "inactive")]
    Inactive,
}

/// Coarse credit classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "credit_score")]
#[serde(rename_all = "lowercase")]
pub enum CreditScore {
    /// Poor payment history or no income proof.
    #[sea_orm(string_value = "low")]
    Low,
    /// Some risk indicators.
    #[sea_orm(string_value = "fair")]
    Fair,
    /// Reliable payer.
    #[sea_orm(string_value = "good")]
    Good,
    /// Long positive history.
    #[sea_orm(string_value = "excellent")]
    Excellent,
}

/// Loan lifecycle status (stored, authoritative for billing).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "loan_status")]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    /// The loan is being repaid on schedule.
    #[sea_orm(string_value = "active")]
    Active,
    /// At least one installment is past due.
    #[sea_orm(string_value = "overdue")]
    Overdue,
    /// All installments are settled.
    #[sea_orm(string_value = "paid")]
    Paid,
}

/// Payment record status. Only `paid` rows are persisted; pending and
/// overdue installment views are derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_status")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// A settled installment.
    #[sea_orm(string_value = "paid")]
    Paid,
    /// Derived view only.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Derived view only.
    #[sea_orm(string_value = "overdue")]
    Overdue,
}

/// How a loan's stated interest rate applies over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "rate_period")]
#[serde(rename_all = "snake_case")]
pub enum RatePeriod {
    /// Flat daily rate, single balloon payoff.
    #[sea_orm(string_value = "daily")]
    Daily,
    /// Weekly rate, compounded to an effective monthly rate.
    #[sea_orm(string_value = "weekly")]
    Weekly,
    /// Monthly compounding rate.
    #[sea_orm(string_value = "monthly")]
    Monthly,
    /// Flat percentage on the principal.
    #[sea_orm(string_value = "flat_total")]
    FlatTotal,
}

/// Kind of treasury cash event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "cash_event_kind")]
#[serde(rename_all = "snake_case")]
pub enum CashEventKind {
    /// Manual correction of available capital.
    #[sea_orm(string_value = "capital_adjustment")]
    CapitalAdjustment,
    /// Principal handed out on loan creation.
    #[sea_orm(string_value = "loan_disbursed")]
    LoanDisbursed,
    /// Principal returned when an unpaid loan is deleted.
    #[sea_orm(string_value = "loan_written_back")]
    LoanWrittenBack,
    /// Interest portion of a settled installment.
    #[sea_orm(string_value = "interest_collected")]
    InterestCollected,
}

impl From<LoanStatus> for prestar_core::loan::LoanStatus {
    fn from(value: LoanStatus) -> Self {
        match value {
            LoanStatus::Active => Self::Active,
            LoanStatus::Overdue => Self::Overdue,
            LoanStatus::Paid => Self::Paid,
        }
    }
}

impl From<prestar_core::loan::LoanStatus> for LoanStatus {
    fn from(value: prestar_core::loan::LoanStatus) -> Self {
        match value {
            prestar_core::loan::LoanStatus::Active => Self::Active,
            prestar_core::loan::LoanStatus::Overdue => Self::Overdue,
            prestar_core::loan::LoanStatus::Paid => Self::Paid,
        }
    }
}

impl From<RatePeriod> for prestar_core::amortization::RatePeriod {
    fn from(value: RatePeriod) -> Self {
        match value {
            RatePeriod::Daily => Self::Daily,
            RatePeriod::Weekly => Self::Weekly,
            RatePeriod::Monthly => Self::Monthly,
            RatePeriod::FlatTotal => Self::FlatTotal,
        }
    }
}

impl From<prestar_core::amortization::RatePeriod> for RatePeriod {
    fn from(value: prestar_core::amortization::RatePeriod) -> Self {
        use prestar_core::amortization::RatePeriod as Core;
        match value {
            Core::Daily => Self::Daily,
            Core::Weekly => Self::Weekly,
            Core::Monthly => Self::Monthly,
            Core::FlatTotal => Self::FlatTotal,
        }
    }
}

impl From<PaymentStatus> for prestar_core::amortization::InstallmentStatus {
    fn from(value: PaymentStatus) -> Self {
        match value {
            PaymentStatus::Paid => Self::Paid,
            PaymentStatus::Pending => Self::Pending,
            PaymentStatus::Overdue => Self::Overdue,
        }
    }
}

impl From<CashEventKind> for prestar_core::treasury::CashEventKind {
    fn from(value: CashEventKind) -> Self {
        match value {
            CashEventKind::CapitalAdjustment => Self::CapitalAdjustment,
            CashEventKind::LoanDisbursed => Self::LoanDisbursed,
            CashEventKind::LoanWrittenBack => Self::LoanWrittenBack,
            CashEventKind::InterestCollected => Self::InterestCollected,
        }
    }
}

impl From<prestar_core::treasury::CashEventKind> for CashEventKind {
    fn from(value: prestar_core::treasury::CashEventKind) -> Self {
        use prestar_core::treasury::CashEventKind as Core;
        match value {
            Core::CapitalAdjustment => Self::CapitalAdjustment,
            Core::LoanDisbursed => Self::LoanDisbursed,
            Core::LoanWrittenBack => Self::LoanWrittenBack,
            Core::InterestCollected => Self::InterestCollected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loan_status_roundtrip() {
        for status in [LoanStatus::Active, LoanStatus::Overdue, LoanStatus::Paid] {
            let core: prestar_core::loan::LoanStatus = status.into();
            assert_eq!(LoanStatus::from(core), status);
        }
    }

    #[test]
    fn test_rate_period_roundtrip() {
        for period in [
            RatePeriod::Daily,
            RatePeriod::Weekly,
            RatePeriod::Monthly,
            RatePeriod::FlatTotal,
        ] {
            let core: prestar_core::amortization::RatePeriod = period.into();
            assert_eq!(RatePeriod::from(core), period);
        }
    }
}
