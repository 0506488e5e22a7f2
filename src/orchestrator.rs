//! The comparison pipeline.
//!
//! Single pass, no retries beyond the one fallback substitution:
//! request → (oracle call | skip) → sanitize → [apply discounts] → respond.
//! The pipeline has no unrecoverable failure path: any oracle or sanitization
//! failure degrades to generated data, never to an error for the caller.

use crate::cache::{search_cache_key, ValidatedCacheEntry};
use crate::discount::apply_best_instrument;
use crate::errors::AppError;
use crate::generator::MockQuoteGenerator;
use crate::models::{PriceComparisonResult, PriceSearchRequest};
use crate::oracle::PriceOracleClient;
use crate::sanitizer::sanitize_comparison;
use moka::future::Cache;

/// Terminal state of one comparison run.
#[derive(Debug, Clone)]
pub struct ComparisonOutcome {
    pub result: PriceComparisonResult,
    /// True when the result was built by the mock generator (oracle absent
    /// or failed) rather than from genuine oracle data.
    pub degraded: bool,
    pub message: String,
    /// Present only when the oracle path failed mid-flight.
    pub warning: Option<String>,
}

const MESSAGE_OK: &str = "가격 검색이 완료되었습니다.";
const MESSAGE_MOCK: &str = "가격 검색이 완료되었습니다. (목업 데이터)";
const WARNING_FALLBACK: &str = "실제 검색 중 오류가 발생하여 예상 데이터를 제공합니다.";

/// Runs one comparison request to completion. Infallible by design.
///
/// The caller is responsible for input validation (product name and category
/// present); the generator is injected so tests can seed it.
pub async fn run_comparison(
    oracle: Option<&PriceOracleClient>,
    quote_cache: &Cache<String, String>,
    request: &PriceSearchRequest,
    generator: &mut MockQuoteGenerator,
) -> ComparisonOutcome {
    let product_name = request.product_name.as_deref().unwrap_or_default();
    let category = request.category.as_deref().unwrap_or_default();

    let (mut result, degraded, warning) = match oracle {
        None => {
            // SKIP_ORACLE: no credential configured
            tracing::info!("No oracle configured; generating mock quotes");
            let result = generator.generate(product_name, category, request.target_price);
            (result, true, None)
        }
        Some(client) => {
            match oracle_quotes(client, quote_cache, request, product_name, category).await {
                Ok(result) => (result, false, None),
                Err(e) => {
                    tracing::warn!("Oracle path failed, degrading to mock quotes: {}", e);
                    let result = generator.generate(product_name, category, request.target_price);
                    (result, true, Some(WARNING_FALLBACK.to_string()))
                }
            }
        }
    };

    // APPLY_DISCOUNTS only when the caller supplied instruments; the result
    // is re-ranked by effective price afterwards.
    if let Some(instruments) = request
        .user_payment_methods
        .as_deref()
        .filter(|pms| !pms.is_empty())
    {
        result.sources = result
            .sources
            .iter()
            .map(|quote| apply_best_instrument(quote, instruments, category))
            .collect();
        result.reaggregate();
        tracing::debug!(
            "Applied {} instrument(s); new lowest price {}",
            instruments.len(),
            result.lowest_price
        );
    }

    let message = if degraded { MESSAGE_MOCK } else { MESSAGE_OK };
    ComparisonOutcome {
        result,
        degraded,
        message: message.to_string(),
        warning,
    }
}

/// ORACLE_CALL + SANITIZE, with a validated cache in front.
///
/// Cached entries are already canonical; discounts are applied downstream so
/// one cached entry serves users with different instruments.
async fn oracle_quotes(
    client: &PriceOracleClient,
    quote_cache: &Cache<String, String>,
    request: &PriceSearchRequest,
    product_name: &str,
    category: &str,
) -> Result<PriceComparisonResult, AppError> {
    let cache_key = search_cache_key(product_name, category, request.target_price);

    if let Some(cached) = quote_cache.get(&cache_key).await {
        if let Some(valid_data) = ValidatedCacheEntry::deserialize_and_validate(&cached) {
            if let Ok(result) = serde_json::from_str::<PriceComparisonResult>(&valid_data) {
                tracing::debug!("Quote cache HIT (validated) for '{}'", cache_key);
                return Ok(result);
            }
        } else {
            tracing::warn!("Quote cache entry invalid for '{}', refetching", cache_key);
        }
    }

    tracing::info!(
        "Quote cache MISS - querying oracle for '{}' ({})",
        product_name,
        category
    );
    let raw = client.fetch_quotes(request).await?;
    let result = sanitize_comparison(&raw, product_name, category)?;

    // Only genuine sanitized results are cached; mock data never is.
    if let Ok(json_str) = serde_json::to_string(&result) {
        let entry = ValidatedCacheEntry::new(json_str);
        quote_cache.insert(cache_key, entry.serialize()).await;
    }

    Ok(result)
}
