//! Client lifecycle rules.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Client activity flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    /// The client can take new loans.
    Active,
    /// The client is archived from day-to-day use.
    Inactive,
}

/// Coarse credit classification assigned when registering a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreditScore {
    /// Poor payment history or no income proof.
    Low,
    /// Some risk indicators.
    Fair,
    /// Reliable payer.
    Good,
    /// Long positive history.
    Excellent,
}

/// Violations of the client business rules.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClientError {
    /// Clients with open loans cannot be deleted.
    #[error("client has {0} loan(s) still open and cannot be deleted")]
    HasOpenLoans(u32),
}

/// Checks whether a client may be soft-deleted.
///
/// `open_loans` is the number of the client's loans in a non-terminal
/// (`active`/`overdue`) state.
///
/// # Errors
///
/// Returns [`ClientError::HasOpenLoans`] when deletion must be refused.
pub fn can_delete_client(open_loans: u32) -> Result<(), ClientError> {
    if open_loans > 0 {
        return Err(ClientError::HasOpenLoans(open_loans));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_without_open_loans_deletable() {
        assert!(can_delete_client(0).is_ok());
    }

    #[test]
    fn test_client_with_open_loans_refused() {
        assert_eq!(can_delete_client(2), Err(ClientError::HasOpenLoans(2)));
    }

    #[test]
    fn test_credit_score_ordering() {
        assert!(CreditScore::Low < CreditScore::Excellent);
        assert!(CreditScore::Fair < CreditScore::Good);
    }
}
