//! Loan management routes, including quote preview, amortization
//! schedule, and installment classification.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser};
use prestar_core::amortization::{
    LoanTerms, PaymentRecord, Quote, RatePeriod, classify_installments, compute_installment,
    PaymentSchedule,
};
use prestar_db::entities::sea_orm_active_enums::LoanStatus;
use prestar_db::repositories::loan::{
    CreateLoanInput, LoanError, LoanFilter, LoanRepository, display_status, loan_snapshot,
};
use prestar_db::repositories::payment::PaymentRepository;
use prestar_shared::types::{LoanId, format_br_date, money::format_pt_br};

/// Creates the loan routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/loans/quote", post(quote_loan))
        .route("/loans", get(list_loans))
        .route("/loans", post(create_loan))
        .route("/loans/{loan_id}", get(get_loan))
        .route("/loans/{loan_id}", delete(delete_loan))
        .route("/loans/{loan_id}/schedule", get(get_schedule))
        .route("/loans/{loan_id}/installments", get(get_installments))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for a quote preview or loan creation terms.
#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    /// Principal amount.
    pub principal: Decimal,
    /// Interest rate percentage.
    pub rate_percent: Decimal,
    /// Rate period: daily, weekly, monthly, flat_total.
    pub rate_period: String,
    /// Number of installments (recurring periods).
    #[serde(default)]
    pub installments: u32,
    /// Days the daily rate applies over (daily period).
    #[serde(default)]
    pub days: u32,
}

/// Request body for creating a loan.
#[derive(Debug, Deserialize)]
pub struct CreateLoanRequest {
    /// Borrower.
    pub client_id: Uuid,
    /// Principal amount.
    pub principal: Decimal,
    /// Interest rate percentage.
    pub rate_percent: Decimal,
    /// Rate period: daily, weekly, monthly, flat_total.
    pub rate_period: String,
    /// Number of installments (recurring periods).
    #[serde(default)]
    pub installments: u32,
    /// Days the daily rate applies over (daily period).
    #[serde(default)]
    pub days: u32,
    /// Start date; defaults to today.
    pub start_date: Option<NaiveDate>,
}

/// Query parameters for listing loans.
#[derive(Debug, Deserialize)]
pub struct ListLoansQuery {
    /// Filter by borrower.
    pub client_id: Option<Uuid>,
    /// Filter by stored status: active, overdue, paid.
    pub status: Option<String>,
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Converts a rate period string to the engine enum.
fn parse_rate_period(s: &str) -> Option<RatePeriod> {
    match s.to_lowercase().as_str() {
        "daily" => Some(RatePeriod::Daily),
        "weekly" => Some(RatePeriod::Weekly),
        "monthly" => Some(RatePeriod::Monthly),
        "flat_total" => Some(RatePeriod::FlatTotal),
        _ => None,
    }
}

/// Converts a loan status string to the stored enum.
fn parse_loan_status(s: &str) -> Option<LoanStatus> {
    match s.to_lowercase().as_str() {
        "active" => Some(LoanStatus::Active),
        "overdue" => Some(LoanStatus::Overdue),
        "paid" => Some(LoanStatus::Paid),
        _ => None,
    }
}

/// Builds the JSON body for a quote, with pt-BR formatted figures.
fn quote_json(quote: &Quote) -> serde_json::Value {
    match quote {
        Quote::Recurring {
            installment_value,
            total_amount,
            total_interest,
        } => json!({
            "kind": "recurring",
            "installment_value": installment_value.to_string(),
            "installment_value_formatted": format!("R$ {}", format_pt_br(*installment_value)),
            "total_amount": total_amount.to_string(),
            "total_amount_formatted": format!("R$ {}", format_pt_br(*total_amount)),
            "total_interest": total_interest.to_string(),
            "total_interest_formatted": format!("R$ {}", format_pt_br(*total_interest))
        }),
        Quote::Balloon {
            total_amount,
            total_interest,
        } => json!({
            "kind": "balloon",
            "total_amount": total_amount.to_string(),
            "total_amount_formatted": format!("R$ {}", format_pt_br(*total_amount)),
            "total_interest": total_interest.to_string(),
            "total_interest_formatted": format!("R$ {}", format_pt_br(*total_interest))
        }),
    }
}

/// Builds the JSON body for one loan, including the derived display
/// status next to the stored one.
fn loan_json(loan: &prestar_db::entities::loans::Model, today: NaiveDate) -> serde_json::Value {
    json!({
        "id": loan.id,
        "client_id": loan.client_id,
        "principal": loan.principal.to_string(),
        "principal_formatted": format!("R$ {}", format_pt_br(loan.principal)),
        "rate_percent": loan.rate_percent.to_string(),
        "rate_period": loan.rate_period,
        "installments": loan.installments,
        "installment_value": loan.installment_value.to_string(),
        "installment_value_formatted": format!("R$ {}", format_pt_br(loan.installment_value)),
        "total_amount": loan.total_amount.to_string(),
        "remaining_balance": loan.remaining_balance.to_string(),
        "remaining_balance_formatted": format!("R$ {}", format_pt_br(loan.remaining_balance)),
        "start_date": loan.start_date,
        "start_date_formatted": format_br_date(loan.start_date),
        "status": loan.status,
        "display_status": display_status(loan, today),
        "next_payment_date": loan.next_payment_date,
        "next_payment_date_formatted": format_br_date(loan.next_payment_date),
        "created_at": loan.created_at
    })
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/loans/quote` - Compute a quote without persisting anything.
///
/// Degenerate input yields an all-zero quote, mirroring a form preview.
async fn quote_loan(
    State(_state): State<AppState>,
    _auth: AuthUser,
    Json(payload): Json<QuoteRequest>,
) -> impl IntoResponse {
    let Some(period) = parse_rate_period(&payload.rate_period) else {
        return invalid_rate_period();
    };

    let quote = compute_installment(
        payload.principal,
        payload.rate_percent,
        period,
        payload.installments,
        payload.days,
    );

    (StatusCode::OK, Json(quote_json(&quote))).into_response()
}

/// POST `/loans` - Create a loan and disburse its principal.
async fn create_loan(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateLoanRequest>,
) -> impl IntoResponse {
    let Some(period) = parse_rate_period(&payload.rate_period) else {
        return invalid_rate_period();
    };

    let today = Utc::now().date_naive();
    let repo = LoanRepository::new((*state.db).clone());
    let input = CreateLoanInput {
        owner_id: auth.user_id(),
        client_id: payload.client_id,
        principal: payload.principal,
        rate_percent: payload.rate_percent,
        rate_period: period,
        installments: payload.installments,
        days: payload.days,
        start_date: payload.start_date.unwrap_or(today),
    };

    match repo.create_loan(input).await {
        Ok(loan) => {
            info!(
                loan_id = %loan.id,
                client_id = %loan.client_id,
                principal = %loan.principal,
                "Loan created"
            );
            (StatusCode::CREATED, Json(loan_json(&loan, today))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create loan");
            map_loan_error(&e)
        }
    }
}

/// GET `/loans` - List loans.
async fn list_loans(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListLoansQuery>,
) -> impl IntoResponse {
    let repo = LoanRepository::new((*state.db).clone());
    let filter = LoanFilter {
        client_id: query.client_id,
        status: query.status.as_deref().and_then(parse_loan_status),
    };

    let today = Utc::now().date_naive();
    match repo.list_loans(auth.user_id(), filter).await {
        Ok(loans) => {
            let response: Vec<_> = loans.iter().map(|l| loan_json(l, today)).collect();
            (StatusCode::OK, Json(json!({ "loans": response }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list loans");
            map_loan_error(&e)
        }
    }
}

/// GET `/loans/{loan_id}` - Get one loan.
async fn get_loan(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(loan_id): Path<LoanId>,
) -> impl IntoResponse {
    let repo = LoanRepository::new((*state.db).clone());
    let today = Utc::now().date_naive();

    match repo.get_loan(auth.user_id(), loan_id.into_inner()).await {
        Ok(loan) => (StatusCode::OK, Json(loan_json(&loan, today))).into_response(),
        Err(e) => map_loan_error(&e),
    }
}

/// GET `/loans/{loan_id}/schedule` - Full amortization schedule.
async fn get_schedule(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(loan_id): Path<LoanId>,
) -> impl IntoResponse {
    let repo = LoanRepository::new((*state.db).clone());

    let loan = match repo.get_loan(auth.user_id(), loan_id.into_inner()).await {
        Ok(loan) => loan,
        Err(e) => return map_loan_error(&e),
    };

    let terms = LoanTerms {
        principal: loan.principal,
        rate_percent: loan.rate_percent,
        period: loan.rate_period.into(),
        installments: u32::try_from(loan.installments).unwrap_or(0),
        days: u32::try_from(loan.term_days).unwrap_or(0),
        start_date: loan.start_date,
    };
    let schedule = PaymentSchedule::new(terms);

    let entries: Vec<_> = schedule
        .iter()
        .map(|entry| {
            json!({
                "number": entry.number,
                "due_date": entry.due_date,
                "due_date_formatted": format_br_date(entry.due_date),
                "amount": entry.amount.to_string(),
                "amount_formatted": format!("R$ {}", format_pt_br(entry.amount)),
                "remaining_after": entry.remaining_after.to_string()
            })
        })
        .collect();

    (
        StatusCode::OK,
        Json(json!({
            "loan_id": loan_id,
            "quote": quote_json(schedule.quote()),
            "entries": entries
        })),
    )
        .into_response()
}

/// GET `/loans/{loan_id}/installments` - Classified installment views.
///
/// Interleaves recorded paid payments with derived pending/overdue
/// entries, sorted ascending by due date.
async fn get_installments(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(loan_id): Path<LoanId>,
) -> impl IntoResponse {
    let loan_repo = LoanRepository::new((*state.db).clone());
    let payment_repo = PaymentRepository::new((*state.db).clone());

    let loan = match loan_repo.get_loan(auth.user_id(), loan_id.into_inner()).await {
        Ok(loan) => loan,
        Err(e) => return map_loan_error(&e),
    };

    let payments = match payment_repo.list_payments(auth.user_id(), loan_id.into_inner()).await {
        Ok(payments) => payments,
        Err(e) => {
            error!(error = %e, "Failed to list payments");
            return internal_error();
        }
    };

    let records: Vec<PaymentRecord> = payments
        .iter()
        .map(|p| PaymentRecord {
            installment_number: u32::try_from(p.installment_number).unwrap_or(0),
            amount: p.amount,
            paid_on: p.paid_on,
            status: p.status.into(),
        })
        .collect();

    let today = Utc::now().date_naive();
    let views = classify_installments(&loan_snapshot(&loan), &records, today);

    let response: Vec<_> = views
        .iter()
        .map(|v| {
            json!({
                "number": v.number,
                "due_date": v.due_date,
                "due_date_formatted": format_br_date(v.due_date),
                "amount": v.amount.to_string(),
                "amount_formatted": format!("R$ {}", format_pt_br(v.amount)),
                "status": v.status
            })
        })
        .collect();

    (
        StatusCode::OK,
        Json(json!({
            "loan_id": loan_id,
            "display_status": display_status(&loan, today),
            "installments": response
        })),
    )
        .into_response()
}

/// DELETE `/loans/{loan_id}` - Soft-delete a loan.
///
/// Refused once any paid payment exists; the principal is written back
/// to the treasury on success.
async fn delete_loan(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(loan_id): Path<LoanId>,
) -> impl IntoResponse {
    let repo = LoanRepository::new((*state.db).clone());

    match repo.soft_delete_loan(auth.user_id(), loan_id.into_inner()).await {
        Ok(()) => {
            info!(loan_id = %loan_id, "Loan soft-deleted");
            (StatusCode::NO_CONTENT, ()).into_response()
        }
        Err(e) => map_loan_error(&e),
    }
}

// ============================================================================
// Error Mapping
// ============================================================================

fn invalid_rate_period() -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "invalid_rate_period",
            "message": "Rate period must be one of: daily, weekly, monthly, flat_total"
        })),
    )
        .into_response()
}

fn internal_error() -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": "An error occurred"
        })),
    )
        .into_response()
}

/// Maps loan errors to HTTP responses.
fn map_loan_error(e: &LoanError) -> axum::response::Response {
    match e {
        LoanError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": format!("Loan not found: {id}")
            })),
        )
            .into_response(),
        LoanError::ClientNotFound(id) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "client_not_found",
                "message": format!("Client not found: {id}")
            })),
        )
            .into_response(),
        LoanError::CompanyNotConfigured => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": "company_not_configured",
                "message": "Configure company settings before creating loans"
            })),
        )
            .into_response(),
        LoanError::InvalidTerms(reason) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_terms",
                "message": reason
            })),
        )
            .into_response(),
        LoanError::InsufficientFunds {
            available,
            requested,
        } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": "insufficient_funds",
                "message": format!(
                    "Insufficient funds: R$ {} available, R$ {} requested",
                    format_pt_br(*available),
                    format_pt_br(*requested)
                )
            })),
        )
            .into_response(),
        LoanError::HasPaidPayments(count) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": "loan_has_paid_payments",
                "message": format!("Loan has {count} paid payment(s) and cannot be deleted")
            })),
        )
            .into_response(),
        LoanError::Database(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "internal_error",
                "message": "An error occurred"
            })),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("daily", Some(RatePeriod::Daily))]
    #[case("WEEKLY", Some(RatePeriod::Weekly))]
    #[case("monthly", Some(RatePeriod::Monthly))]
    #[case("flat_total", Some(RatePeriod::FlatTotal))]
    #[case("yearly", None)]
    fn test_parse_rate_period(#[case] input: &str, #[case] expected: Option<RatePeriod>) {
        assert_eq!(parse_rate_period(input), expected);
    }

    #[test]
    fn test_parse_loan_status() {
        assert_eq!(parse_loan_status("active"), Some(LoanStatus::Active));
        assert_eq!(parse_loan_status("overdue"), Some(LoanStatus::Overdue));
        assert_eq!(parse_loan_status("paid"), Some(LoanStatus::Paid));
        assert_eq!(parse_loan_status("deleted"), None);
    }
}
