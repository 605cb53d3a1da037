//! Money type with decimal precision and pt-BR display formatting.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! This type wraps `rust_decimal::Decimal` for arbitrary precision.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Represents a monetary amount with currency.
///
/// Uses `Decimal` internally to avoid floating-point precision errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// The amount in whole currency units (e.g., reais).
    pub amount: Decimal,
    /// ISO 4217 currency code (e.g., "BRL").
    pub currency: Currency,
}

/// ISO 4217 currency codes supported by the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Brazilian Real
    Brl,
    /// US Dollar
    Usd,
    /// Euro
    Eur,
}

impl Currency {
    /// Returns the display symbol for this currency.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Brl => "R$",
            Self::Usd => "US$",
            Self::Eur => "€",
        }
    }
}

impl Money {
    /// Creates a new Money instance.
    #[must_use]
    pub const fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Creates an amount in Brazilian reais.
    #[must_use]
    pub const fn brl(amount: Decimal) -> Self {
        Self::new(amount, Currency::Brl)
    }

    /// Creates a zero amount in the specified currency.
    #[must_use]
    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency,
        }
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Returns true if the amount is negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative()
    }

    /// Formats the amount for display in the pt-BR locale,
    /// e.g. `R$ 1.234,56`.
    ///
    /// Thousands are separated with `.` and the decimal separator is `,`,
    /// always showing two fraction digits (rounded half-even).
    #[must_use]
    pub fn formatted(&self) -> String {
        format!("{} {}", self.currency.symbol(), format_pt_br(self.amount))
    }
}

/// Formats a decimal amount with pt-BR separators and two fraction digits.
#[must_use]
pub fn format_pt_br(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}{grouped},{frac_part}")
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Brl => write!(f, "BRL"),
            Self::Usd => write!(f, "USD"),
            Self::Eur => write!(f, "EUR"),
        }
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BRL" => Ok(Self::Brl),
            "USD" => Ok(Self::Usd),
            "EUR" => Ok(Self::Eur),
            _ => Err(format!("Unknown currency: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    #[test]
    fn test_money_new() {
        let money = Money::brl(dec!(100.00));
        assert_eq!(money.amount, dec!(100.00));
        assert_eq!(money.currency, Currency::Brl);
    }

    #[test]
    fn test_money_zero() {
        let money = Money::zero(Currency::Brl);
        assert!(money.is_zero());
        assert!(!money.is_negative());
    }

    #[rstest]
    #[case(dec!(0), "0,00")]
    #[case(dec!(5), "5,00")]
    #[case(dec!(1234.56), "1.234,56")]
    #[case(dec!(1234567.891), "1.234.567,89")]
    #[case(dec!(-987.5), "-987,50")]
    #[case(dec!(999), "999,00")]
    #[case(dec!(1000), "1.000,00")]
    fn test_format_pt_br(#[case] amount: Decimal, #[case] expected: &str) {
        assert_eq!(format_pt_br(amount), expected);
    }

    #[test]
    fn test_formatted_with_symbol() {
        assert_eq!(Money::brl(dec!(1234.56)).formatted(), "R$ 1.234,56");
        assert_eq!(
            Money::new(dec!(10), Currency::Usd).formatted(),
            "US$ 10,00"
        );
    }

    #[test]
    fn test_currency_roundtrip() {
        assert_eq!(Currency::from_str("brl").unwrap(), Currency::Brl);
        assert_eq!(Currency::Brl.to_string(), "BRL");
        assert!(Currency::from_str("XXX").is_err());
    }
}
