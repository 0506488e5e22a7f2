use crate::catalog;
use crate::config::Config;
use crate::discount::best_payment_options;
use crate::errors::AppError;
use crate::generator::MockQuoteGenerator;
use crate::models::*;
use crate::oracle::PriceOracleClient;
use crate::orchestrator::run_comparison;
use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use moka::future::Cache;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Client for the price oracle (absent when no API key is configured).
    pub oracle_client: Option<PriceOracleClient>,
    /// Sanitized oracle results (10 minute TTL) to reduce oracle calls.
    /// Key: `search:{category}:{product}[:{target}]`, value: validated entry.
    pub quote_cache: Cache<String, String>,
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "price-scout-api",
            "version": "0.1.0"
        })),
    )
}

/// POST /api/v1/price-search
///
/// Compares vendor prices for a product and, when the caller supplies
/// payment instruments, re-ranks vendors by net price. Returns 400 only for
/// missing input fields; oracle or parse failures degrade to mock data and
/// still answer 200.
pub async fn price_search(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PriceSearchRequest>,
) -> Result<Json<PriceSearchResponse>, AppError> {
    let product_name = request
        .product_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let category = request
        .category
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    if product_name.is_none() || category.is_none() {
        return Err(AppError::BadRequest(
            "상품명과 카테고리는 필수입니다.".to_string(),
        ));
    }

    tracing::info!(
        "POST /price-search - product: {:?}, category: {:?}, instruments: {}",
        product_name,
        category,
        request
            .user_payment_methods
            .as_ref()
            .map_or(0, |pms| pms.len())
    );

    let mut generator = MockQuoteGenerator::new();
    let outcome = run_comparison(
        state.oracle_client.as_ref(),
        &state.quote_cache,
        &request,
        &mut generator,
    )
    .await;

    Ok(Json(PriceSearchResponse {
        success: true,
        data: outcome.result,
        message: outcome.message,
        searched_at: Utc::now(),
        degraded: outcome.degraded.then_some(true),
        warning: outcome.warning,
    }))
}

/// GET /api/v1/payment-methods
///
/// Returns the static catalog of popular instrument templates.
pub async fn list_payment_methods() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": catalog::list_all(),
            "message": "인기 결제수단 목록을 성공적으로 조회했습니다."
        })),
    )
}

/// POST /api/v1/payment-methods
///
/// Validates a user-entered instrument against the catalog. A catalog match
/// returns the template instantiated; anything else is registered as a
/// custom instrument with zero rates and the default icon for its kind.
pub async fn validate_payment_method(
    Json(request): Json<ValidateInstrumentRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let (Some(name), Some(kind)) = (
        request.name.as_deref().map(str::trim).filter(|s| !s.is_empty()),
        request.kind,
    ) else {
        return Err(AppError::BadRequest(
            "결제수단 이름과 타입은 필수입니다.".to_string(),
        ));
    };

    if let Some(template) = catalog::lookup_template(name, kind) {
        tracing::debug!("Catalog instrument validated: {}", name);
        return Ok(Json(json!({
            "success": true,
            "data": template.instantiate(),
            "message": "결제수단이 확인되었습니다."
        })));
    }

    tracing::debug!("Custom instrument registered: {}", name);
    let custom = PaymentInstrument {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        kind,
        discount_rate: 0.0,
        cashback_rate: 0.0,
        monthly_limit: 1_000_000,
        affinity_categories: vec![],
        icon: kind.default_icon().to_string(),
        active: true,
    };
    Ok(Json(json!({
        "success": true,
        "data": custom,
        "message": "사용자 정의 결제수단으로 등록되었습니다."
    })))
}

/// POST /api/v1/payment-methods/recommend
///
/// Standalone recommendation calculator: for a given purchase amount and
/// category, ranks the caller's active instruments by final price using the
/// flat-bonus policy (distinct from the per-quote stacking rule used by
/// price search).
pub async fn recommend_payment_options(
    Json(request): Json<RecommendRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let price = request
        .price
        .filter(|p| *p >= 0)
        .ok_or_else(|| AppError::BadRequest("가격은 필수입니다.".to_string()))?;
    let category = request
        .category
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("카테고리는 필수입니다.".to_string()))?;
    let instruments = request.payment_methods.unwrap_or_default();

    let recommendations = best_payment_options(price, &instruments, category);
    tracing::debug!(
        "Computed {} recommendation(s) for price {} in {}",
        recommendations.len(),
        price,
        category
    );

    Ok(Json(json!({
        "success": true,
        "data": recommendations,
        "message": "결제수단 추천이 완료되었습니다."
    })))
}
