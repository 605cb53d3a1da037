//! The in-memory cash ledger.

use rust_decimal::Decimal;

use super::error::TreasuryError;
use super::types::CashEvent;

/// Append-only cash ledger for one company.
///
/// The persistence layer materializes this from the `cash_events` table
/// to validate a disbursement before appending; the balance itself is
/// always derived, never written.
#[derive(Debug, Clone)]
pub struct CashLedger {
    initial_capital: Decimal,
    events: Vec<CashEvent>,
}

impl CashLedger {
    /// Creates a ledger opening with the given capital.
    #[must_use]
    pub const fn new(initial_capital: Decimal) -> Self {
        Self {
            initial_capital,
            events: Vec::new(),
        }
    }

    /// Creates a ledger from previously recorded events.
    #[must_use]
    pub fn from_events(initial_capital: Decimal, events: Vec<CashEvent>) -> Self {
        Self {
            initial_capital,
            events,
        }
    }

    /// The capital the ledger opened with.
    #[must_use]
    pub const fn initial_capital(&self) -> Decimal {
        self.initial_capital
    }

    /// The recorded events, oldest first.
    #[must_use]
    pub fn events(&self) -> &[CashEvent] {
        &self.events
    }

    /// Current balance: initial capital plus the signed sum of all
    /// events.
    #[must_use]
    pub fn balance(&self) -> Decimal {
        self.initial_capital + self.events.iter().map(|e| e.amount).sum::<Decimal>()
    }

    /// Appends a movement.
    ///
    /// # Errors
    ///
    /// Returns [`TreasuryError::ZeroAmount`] for a zero movement.
    pub fn append(&mut self, event: CashEvent) -> Result<(), TreasuryError> {
        if event.amount.is_zero() {
            return Err(TreasuryError::ZeroAmount);
        }
        self.events.push(event);
        Ok(())
    }

    /// Checks that a disbursement of `principal` fits in the balance.
    ///
    /// # Errors
    ///
    /// Returns [`TreasuryError::InsufficientFunds`] when it does not.
    pub fn ensure_can_disburse(&self, principal: Decimal) -> Result<(), TreasuryError> {
        let available = self.balance();
        if principal > available {
            return Err(TreasuryError::InsufficientFunds {
                available,
                requested: principal,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::treasury::types::CashEventKind;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    #[test]
    fn test_balance_is_fold_of_events() {
        let mut ledger = CashLedger::new(dec!(10000));
        ledger.append(CashEvent::disbursement(dec!(3000), day(2))).unwrap();
        ledger
            .append(CashEvent::interest_collected(dec!(150), day(10)))
            .unwrap();
        ledger.append(CashEvent::write_back(dec!(500), day(12))).unwrap();
        assert_eq!(ledger.balance(), dec!(7650));
    }

    #[test]
    fn test_disbursement_is_negative() {
        let event = CashEvent::disbursement(dec!(100), day(1));
        assert_eq!(event.amount, dec!(-100));
        assert_eq!(event.kind, CashEventKind::LoanDisbursed);
    }

    #[test]
    fn test_insufficient_funds_refused() {
        let ledger = CashLedger::new(dec!(100));
        let err = ledger.ensure_can_disburse(dec!(100.01)).unwrap_err();
        assert_eq!(
            err,
            TreasuryError::InsufficientFunds {
                available: dec!(100),
                requested: dec!(100.01),
            }
        );
    }

    #[test]
    fn test_exact_balance_disbursement_allowed() {
        let ledger = CashLedger::new(dec!(100));
        assert!(ledger.ensure_can_disburse(dec!(100)).is_ok());
    }

    #[test]
    fn test_zero_movement_refused() {
        let mut ledger = CashLedger::new(dec!(100));
        let event = CashEvent::capital_adjustment(dec!(0), day(1));
        assert_eq!(ledger.append(event), Err(TreasuryError::ZeroAmount));
        assert!(ledger.events().is_empty());
    }
}
