//! Client management routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use validator::Validate;

use crate::{AppState, middleware::AuthUser};
use prestar_db::entities::sea_orm_active_enums::{ClientStatus, CreditScore};
use prestar_db::repositories::client::{
    ClientError, ClientFilter, ClientRepository, CreateClientInput, UpdateClientInput,
};
use prestar_shared::types::{ClientId, PageRequest, PageResponse, format_br_date};

/// Creates the client routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/clients", get(list_clients))
        .route("/clients", post(create_client))
        .route("/clients/{client_id}", get(get_client))
        .route("/clients/{client_id}", put(update_client))
        .route("/clients/{client_id}", delete(delete_client))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a client.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateClientRequest {
    /// Full name.
    #[validate(length(min = 1))]
    pub name: String,
    /// National document (CPF).
    #[validate(length(min = 1))]
    pub national_id: String,
    /// Contact email.
    #[validate(email)]
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Declared monthly income.
    pub monthly_income: Option<Decimal>,
    /// Credit score: low, fair, good, excellent.
    pub credit_score: Option<String>,
}

/// Request body for updating a client.
#[derive(Debug, Deserialize)]
pub struct UpdateClientRequest {
    /// Full name.
    pub name: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Declared monthly income.
    pub monthly_income: Option<Decimal>,
    /// Credit score: low, fair, good, excellent.
    pub credit_score: Option<String>,
    /// Status: active, inactive.
    pub status: Option<String>,
}

/// Query parameters for listing clients.
#[derive(Debug, Deserialize)]
pub struct ListClientsQuery {
    /// Filter by status: active, inactive.
    pub status: Option<String>,
    /// Substring match on the name.
    pub search: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Converts a credit score string to the enum value.
fn parse_credit_score(s: &str) -> Option<CreditScore> {
    match s.to_lowercase().as_str() {
        "low" => Some(CreditScore::Low),
        "fair" => Some(CreditScore::Fair),
        "good" => Some(CreditScore::Good),
        "excellent" => Some(CreditScore::Excellent),
        _ => None,
    }
}

/// Converts a client status string to the enum value.
fn parse_client_status(s: &str) -> Option<ClientStatus> {
    match s.to_lowercase().as_str() {
        "active" => Some(ClientStatus::Active),
        "inactive" => Some(ClientStatus::Inactive),
        _ => None,
    }
}

/// Builds the JSON body for one client.
fn client_json(client: &prestar_db::entities::clients::Model) -> serde_json::Value {
    json!({
        "id": client.id,
        "name": client.name,
        "national_id": client.national_id,
        "email": client.email,
        "phone": client.phone,
        "address": client.address,
        "monthly_income": client.monthly_income.to_string(),
        "credit_score": client.credit_score,
        "status": client.status,
        "created_at": client.created_at,
        "registered_on": format_br_date(client.created_at.date_naive())
    })
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/clients` - List clients.
async fn list_clients(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListClientsQuery>,
) -> impl IntoResponse {
    let repo = ClientRepository::new((*state.db).clone());

    let filter = ClientFilter {
        status: query.status.as_deref().and_then(parse_client_status),
        search: query.search,
    };

    let default_page = PageRequest::default();
    let page = PageRequest {
        page: query.page.unwrap_or(default_page.page),
        per_page: query.per_page.unwrap_or(default_page.per_page),
    };

    match repo.list_clients(auth.user_id(), filter, &page).await {
        Ok((clients, total)) => {
            let data: Vec<_> = clients.iter().map(client_json).collect();
            let response = PageResponse::new(data, page.page, page.per_page, total);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list clients");
            map_client_error(&e)
        }
    }
}

/// POST `/clients` - Register a new client.
async fn create_client(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateClientRequest>,
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

    let credit_score = match payload.credit_score.as_deref() {
        None => CreditScore::Fair,
        Some(s) => match parse_credit_score(s) {
            Some(score) => score,
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_credit_score",
                        "message": "Credit score must be one of: low, fair, good, excellent"
                    })),
                )
                    .into_response();
            }
        },
    };

    let repo = ClientRepository::new((*state.db).clone());
    let input = CreateClientInput {
        owner_id: auth.user_id(),
        name: payload.name,
        national_id: payload.national_id,
        email: payload.email,
        phone: payload.phone,
        address: payload.address,
        monthly_income: payload.monthly_income.unwrap_or_default(),
        credit_score,
    };

    match repo.create_client(input).await {
        Ok(client) => {
            info!(client_id = %client.id, "Client created");
            (StatusCode::CREATED, Json(client_json(&client))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create client");
            map_client_error(&e)
        }
    }
}

/// GET `/clients/{client_id}` - Get one client.
async fn get_client(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(client_id): Path<ClientId>,
) -> impl IntoResponse {
    let repo = ClientRepository::new((*state.db).clone());

    match repo.get_client(auth.user_id(), client_id.into_inner()).await {
        Ok(client) => (StatusCode::OK, Json(client_json(&client))).into_response(),
        Err(e) => map_client_error(&e),
    }
}

/// PUT `/clients/{client_id}` - Update a client.
async fn update_client(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(client_id): Path<ClientId>,
    Json(payload): Json<UpdateClientRequest>,
) -> impl IntoResponse {
    let credit_score = match payload.credit_score.as_deref() {
        None => None,
        Some(s) => match parse_credit_score(s) {
            Some(score) => Some(score),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_credit_score",
                        "message": "Credit score must be one of: low, fair, good, excellent"
                    })),
                )
                    .into_response();
            }
        },
    };

    let status = match payload.status.as_deref() {
        None => None,
        Some(s) => match parse_client_status(s) {
            Some(status) => Some(status),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_status",
                        "message": "Status must be one of: active, inactive"
                    })),
                )
                    .into_response();
            }
        },
    };

    let repo = ClientRepository::new((*state.db).clone());
    let input = UpdateClientInput {
        name: payload.name,
        email: payload.email,
        phone: payload.phone,
        address: payload.address,
        monthly_income: payload.monthly_income,
        credit_score,
        status,
    };

    match repo.update_client(auth.user_id(), client_id.into_inner(), input).await {
        Ok(client) => {
            info!(client_id = %client_id, "Client updated");
            (StatusCode::OK, Json(client_json(&client))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to update client");
            map_client_error(&e)
        }
    }
}

/// DELETE `/clients/{client_id}` - Soft-delete a client.
///
/// Refused while the client has any open loan; no state changes on
/// refusal.
async fn delete_client(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(client_id): Path<ClientId>,
) -> impl IntoResponse {
    let repo = ClientRepository::new((*state.db).clone());

    match repo.soft_delete_client(auth.user_id(), client_id.into_inner()).await {
        Ok(()) => {
            info!(client_id = %client_id, "Client soft-deleted");
            (StatusCode::NO_CONTENT, ()).into_response()
        }
        Err(e) => map_client_error(&e),
    }
}

// ============================================================================
// Error Mapping
// ============================================================================

/// Maps client errors to HTTP responses.
fn map_client_error(e: &ClientError) -> axum::response::Response {
    match e {
        ClientError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": format!("Client not found: {id}")
            })),
        )
            .into_response(),
        ClientError::HasOpenLoans(count) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": "client_has_open_loans",
                "message": format!("Client has {count} open loan(s) and cannot be deleted")
            })),
        )
            .into_response(),
        ClientError::Database(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "internal_error",
                "message": "An error occurred"
            })),
        )
            .into_response(),
    }
}
