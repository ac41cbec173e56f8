use crate::{AppState, error::AppError, services};
use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
};
use chrono::Local;
use core_types::{PurchaseStats, PurchaseView, RateWindow, requests};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// The body of a successful `PUT /juros`.
#[derive(Debug, Serialize)]
pub struct RateUpdateResponse {
    #[serde(rename = "novaTaxaJuros", with = "rust_decimal::serde::float")]
    pub new_rate: Decimal,
}

/// Bodies are read raw so that an unparseable one is a 400, not axum's 422.
fn parse_body(body: &Bytes) -> Result<Value, AppError> {
    serde_json::from_slice(body).map_err(|e| AppError::Validation(format!("invalid JSON body: {e}")))
}

/// # POST /produtos
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let product = requests::parse_product(&parse_body(&body)?)?;
    state
        .store
        .insert_product(&product)
        .await
        .map_err(AppError::rejected_write)?;

    tracing::info!(product_id = %product.id, price = %product.price, "Product registered.");
    Ok(StatusCode::CREATED)
}

/// # POST /compras
pub async fn create_purchase(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let purchase = requests::parse_purchase(&parse_body(&body)?)?;
    let record = state
        .store
        .create_purchase(&purchase, &state.policy)
        .await
        .map_err(AppError::rejected_write)?;

    tracing::info!(
        purchase_id = %record.id,
        product_id = %record.product_id,
        installment_amount = %record.installment_amount,
        interest_rate = %record.interest_rate,
        "Purchase registered."
    );
    Ok(StatusCode::CREATED)
}

/// # PUT /juros
pub async fn update_interest_rate(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<RateUpdateResponse>, AppError> {
    let today = Local::now().date_naive();
    let window = RateWindow::from_payload(&parse_body(&body)?, state.rate_floor, today)?;
    let new_rate = services::refresh_interest_rate(&state, &window).await?;
    Ok(Json(RateUpdateResponse { new_rate }))
}

/// # GET /compras
/// An empty listing is a 404 rather than an empty array.
pub async fn list_purchases(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PurchaseView>>, AppError> {
    let purchases = state.store.list_purchases().await?;
    if purchases.is_empty() {
        return Err(AppError::NotFound("no purchases registered".to_string()));
    }
    Ok(Json(purchases))
}

/// # GET /estatistica
pub async fn get_statistics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PurchaseStats>, AppError> {
    let stats = state.store.purchase_stats().await?;
    Ok(Json(stats))
}
