//! Payment routes: history and the atomic settlement.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::{AppState, middleware::AuthUser};
use prestar_core::loan::LoanError as SettlementError;
use prestar_db::repositories::payment::{
    PaymentError, PaymentRepository, ProcessPaymentInput,
};
use prestar_shared::types::{LoanId, format_br_date, money::format_pt_br};

/// Creates the payment routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/loans/{loan_id}/payments", get(list_payments))
        .route("/loans/{loan_id}/payments", post(process_payment))
}

/// Request body for recording a payment.
#[derive(Debug, Deserialize)]
pub struct ProcessPaymentRequest {
    /// Amount paid.
    pub amount: Decimal,
    /// Date the payment was received; defaults to today.
    pub paid_on: Option<NaiveDate>,
}

/// Builds the JSON body for one payment.
fn payment_json(payment: &prestar_db::entities::payments::Model) -> serde_json::Value {
    json!({
        "id": payment.id,
        "loan_id": payment.loan_id,
        "amount": payment.amount.to_string(),
        "amount_formatted": format!("R$ {}", format_pt_br(payment.amount)),
        "paid_on": payment.paid_on,
        "paid_on_formatted": format_br_date(payment.paid_on),
        "installment_number": payment.installment_number,
        "status": payment.status,
        "created_at": payment.created_at
    })
}

/// GET `/loans/{loan_id}/payments` - Recorded payments, in installment
/// order.
async fn list_payments(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(loan_id): Path<LoanId>,
) -> impl IntoResponse {
    let repo = PaymentRepository::new((*state.db).clone());

    match repo.list_payments(auth.user_id(), loan_id.into_inner()).await {
        Ok(payments) => {
            let response: Vec<_> = payments.iter().map(payment_json).collect();
            (StatusCode::OK, Json(json!({ "payments": response }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list payments");
            map_payment_error(&e)
        }
    }
}

/// POST `/loans/{loan_id}/payments` - Settle the next installment.
///
/// The payment insert, balance decrement, due-date advance, status
/// flip, and treasury credit commit atomically; on failure nothing is
/// recorded and the submission must be re-attempted explicitly.
async fn process_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(loan_id): Path<LoanId>,
    Json(payload): Json<ProcessPaymentRequest>,
) -> impl IntoResponse {
    let repo = PaymentRepository::new((*state.db).clone());
    let input = ProcessPaymentInput {
        amount: payload.amount,
        paid_on: payload.paid_on.unwrap_or_else(|| Utc::now().date_naive()),
    };

    match repo.process_payment(auth.user_id(), loan_id.into_inner(), input).await {
        Ok(processed) => {
            info!(
                loan_id = %loan_id,
                installment = processed.payment.installment_number,
                amount = %processed.payment.amount,
                settled = processed.loan.status == prestar_db::entities::sea_orm_active_enums::LoanStatus::Paid,
                "Payment processed"
            );

            (
                StatusCode::CREATED,
                Json(json!({
                    "payment": payment_json(&processed.payment),
                    "loan": {
                        "id": processed.loan.id,
                        "status": processed.loan.status,
                        "remaining_balance": processed.loan.remaining_balance.to_string(),
                        "remaining_balance_formatted":
                            format!("R$ {}", format_pt_br(processed.loan.remaining_balance)),
                        "next_payment_date": processed.loan.next_payment_date,
                        "next_payment_date_formatted":
                            format_br_date(processed.loan.next_payment_date)
                    }
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to process payment");
            map_payment_error(&e)
        }
    }
}

/// Maps payment errors to HTTP responses.
fn map_payment_error(e: &PaymentError) -> axum::response::Response {
    match e {
        PaymentError::LoanNotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": format!("Loan not found: {id}")
            })),
        )
            .into_response(),
        PaymentError::Settlement(SettlementError::AlreadySettled) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": "loan_already_paid",
                "message": "Loan is already fully paid"
            })),
        )
            .into_response(),
        PaymentError::Settlement(SettlementError::NonPositiveAmount) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_amount",
                "message": "Payment amount must be positive"
            })),
        )
            .into_response(),
        PaymentError::Settlement(e) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": "settlement_refused",
                "message": e.to_string()
            })),
        )
            .into_response(),
        PaymentError::Database(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "internal_error",
                "message": "An error occurred"
            })),
        )
            .into_response(),
    }
}
