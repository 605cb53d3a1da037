//! Company settings and treasury routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use validator::Validate;

use crate::{AppState, middleware::AuthUser};
use prestar_db::repositories::company::{
    CompanyError, CompanyRepository, UpsertCompanyInput,
};
use prestar_shared::types::{format_br_date, money::format_pt_br};

/// Creates the company routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/company", get(get_company))
        .route("/company", put(upsert_company))
        .route("/company/cash", get(get_cash_position))
        .route("/company/cash/adjustments", post(record_adjustment))
}

/// Request body for creating or updating company settings.
#[derive(Debug, Deserialize, Validate)]
pub struct UpsertCompanyRequest {
    /// Company display name.
    #[validate(length(min = 1))]
    pub company_name: String,
    /// Company document (CNPJ).
    pub document: Option<String>,
    /// Contact email.
    #[validate(email)]
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Capital the treasury opens with.
    pub initial_capital: Option<Decimal>,
}

/// Request body for a manual capital adjustment.
#[derive(Debug, Deserialize)]
pub struct AdjustmentRequest {
    /// Signed amount: positive credits, negative debits.
    pub amount: Decimal,
    /// Business date; defaults to today.
    pub occurred_on: Option<NaiveDate>,
}

/// Builds the JSON body for the settings row.
fn company_json(settings: &prestar_db::entities::company_settings::Model) -> serde_json::Value {
    json!({
        "id": settings.id,
        "company_name": settings.company_name,
        "document": settings.document,
        "email": settings.email,
        "phone": settings.phone,
        "address": settings.address,
        "initial_capital": settings.initial_capital.to_string(),
        "initial_capital_formatted": format!("R$ {}", format_pt_br(settings.initial_capital)),
        "created_at": settings.created_at,
        "updated_at": settings.updated_at
    })
}

/// GET `/company` - Company settings.
async fn get_company(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let repo = CompanyRepository::new((*state.db).clone());

    match repo.get_settings(auth.user_id()).await {
        Ok(settings) => (StatusCode::OK, Json(company_json(&settings))).into_response(),
        Err(e) => map_company_error(&e),
    }
}

/// PUT `/company` - Create or update company settings.
async fn upsert_company(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<UpsertCompanyRequest>,
) -> impl IntoResponse {
    if let Err(e) = payload.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "validation_error",
                "message": e.to_string()
            })),
        )
            .into_response();
    }

    let repo = CompanyRepository::new((*state.db).clone());
    let input = UpsertCompanyInput {
        company_name: payload.company_name,
        document: payload.document,
        email: payload.email,
        phone: payload.phone,
        address: payload.address,
        initial_capital: payload.initial_capital.unwrap_or_default(),
    };

    match repo.upsert_settings(auth.user_id(), input).await {
        Ok(settings) => {
            info!(company_id = %settings.id, "Company settings saved");
            (StatusCode::OK, Json(company_json(&settings))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to save company settings");
            map_company_error(&e)
        }
    }
}

/// GET `/company/cash` - Derived cash balance and event history.
async fn get_cash_position(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let repo = CompanyRepository::new((*state.db).clone());

    match repo.cash_position(auth.user_id()).await {
        Ok(position) => {
            let events: Vec<_> = position
                .events
                .iter()
                .map(|e| {
                    json!({
                        "id": e.id,
                        "loan_id": e.loan_id,
                        "kind": e.kind,
                        "amount": e.amount.to_string(),
                        "amount_formatted": format!("R$ {}", format_pt_br(e.amount)),
                        "occurred_on": e.occurred_on,
                        "occurred_on_formatted": format_br_date(e.occurred_on)
                    })
                })
                .collect();

            (
                StatusCode::OK,
                Json(json!({
                    "initial_capital": position.initial_capital.to_string(),
                    "balance": position.balance.to_string(),
                    "balance_formatted": format!("R$ {}", format_pt_br(position.balance)),
                    "events": events
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to compute cash position");
            map_company_error(&e)
        }
    }
}

/// POST `/company/cash/adjustments` - Append a manual capital
/// adjustment.
async fn record_adjustment(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<AdjustmentRequest>,
) -> impl IntoResponse {
    let repo = CompanyRepository::new((*state.db).clone());
    let occurred_on = payload.occurred_on.unwrap_or_else(|| Utc::now().date_naive());

    match repo
        .record_adjustment(auth.user_id(), payload.amount, occurred_on)
        .await
    {
        Ok(event) => {
            info!(event_id = %event.id, amount = %event.amount, "Capital adjustment recorded");
            (
                StatusCode::CREATED,
                Json(json!({
                    "id": event.id,
                    "kind": event.kind,
                    "amount": event.amount.to_string(),
                    "occurred_on": event.occurred_on
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to record adjustment");
            map_company_error(&e)
        }
    }
}

/// Maps company errors to HTTP responses.
fn map_company_error(e: &CompanyError) -> axum::response::Response {
    match e {
        CompanyError::NotConfigured => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "company_not_configured",
                "message": "Company settings not configured"
            })),
        )
            .into_response(),
        CompanyError::ZeroAmount => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "zero_amount",
                "message": "Cash movement amount must be non-zero"
            })),
        )
            .into_response(),
        CompanyError::Database(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "internal_error",
                "message": "An error occurred"
            })),
        )
            .into_response(),
    }
}
