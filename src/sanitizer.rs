//! Validation and repair of raw vendor-quote documents.
//!
//! The price oracle is treated as an unreliable collaborator: its replies are
//! decoded into untyped JSON and pushed through an explicit schema-validating
//! sanitizer that either yields a canonical [`PriceComparisonResult`] or a
//! `ValidationError` the orchestrator recovers from with generated data.

use crate::errors::AppError;
use crate::models::{PriceComparisonResult, VendorQuote};
use serde_json::Value;
use url::Url;

/// Root fields a quote document must carry to be considered at all.
const REQUIRED_FIELDS: &[&str] = &[
    "productName",
    "category",
    "sources",
    "averagePrice",
    "lowestPrice",
    "recommendedPlatform",
];

/// Maximum number of vendor sources retained per comparison.
const MAX_SOURCES: usize = 8;

/// Maximum accepted purchase URL length, in characters.
const MAX_URL_CHARS: usize = 200;

/// Upper bound on any coerced amount, in won. Oracle numbers above this are
/// not plausible prices; clamping keeps downstream arithmetic in range.
const MAX_AMOUNT_WON: i64 = 1_000_000_000_000;

/// Known vendor search endpoints: (platform, base URL, query parameter).
const VENDOR_SEARCH_URLS: &[(&str, &str, &str)] = &[
    (
        "네이버쇼핑",
        "https://search.shopping.naver.com/search/all",
        "query",
    ),
    ("쿠팡", "https://www.coupang.com/np/search", "q"),
    ("11번가", "https://search.11st.co.kr/Search.tmall", "kwd"),
    ("G마켓", "http://search.gmarket.co.kr/search.aspx", "keyword"),
    (
        "옥션",
        "http://search.auction.co.kr/search/search.aspx",
        "keyword",
    ),
    ("인터파크", "http://shopping.interpark.com/search", "q"),
    (
        "롯데온",
        "https://www.lotteon.com/search/search/search.ecn",
        "q",
    ),
];

/// Deterministic per-vendor search URL used when a quote's URL is missing,
/// malformed, or too long. Unknown vendors get the generic search fallback.
pub fn default_search_url(platform: &str, product_name: &str) -> String {
    let (base, param) = VENDOR_SEARCH_URLS
        .iter()
        .find(|(name, _, _)| *name == platform)
        .map(|(_, base, param)| (*base, *param))
        .unwrap_or(("https://search.shopping.naver.com/search/all", "query"));

    Url::parse_with_params(base, &[(param, product_name)])
        .map(|u| u.to_string())
        .unwrap_or_else(|_| base.to_string())
}

/// Validates and repairs an arbitrary decoded JSON value into a canonical
/// [`PriceComparisonResult`].
///
/// Individual malformed sources are dropped; structural failures (wrong root
/// shape, missing fields, no surviving source) fail the whole document with
/// `AppError::ValidationError`, which the orchestrator turns into a mock
/// fallback. Never panics, whatever the input shape.
pub fn sanitize_comparison(
    raw: &Value,
    product_name: &str,
    category: &str,
) -> Result<PriceComparisonResult, AppError> {
    let root = raw
        .as_object()
        .ok_or_else(|| AppError::ValidationError("quote document root is not an object".into()))?;

    for field in REQUIRED_FIELDS {
        if !root.contains_key(*field) {
            return Err(AppError::ValidationError(format!(
                "quote document missing required field '{}'",
                field
            )));
        }
    }

    let raw_sources = root
        .get("sources")
        .and_then(Value::as_array)
        .ok_or_else(|| AppError::ValidationError("'sources' is not an array".into()))?;
    if raw_sources.is_empty() {
        return Err(AppError::ValidationError("'sources' is empty".into()));
    }

    let resolved_product = non_empty_string(root.get("productName")).unwrap_or(product_name);
    let resolved_category = non_empty_string(root.get("category")).unwrap_or(category);

    let mut sources: Vec<VendorQuote> = raw_sources
        .iter()
        .filter_map(|entry| coerce_source(entry, resolved_product))
        .collect();

    if sources.is_empty() {
        return Err(AppError::ValidationError(
            "no source survived coercion".into(),
        ));
    }
    sources.truncate(MAX_SOURCES);

    let dropped = raw_sources.len().saturating_sub(sources.len());
    if dropped > 0 {
        tracing::debug!("Sanitizer dropped {} malformed/excess source(s)", dropped);
    }

    // Aggregates from the caller are never trusted; recompute from the
    // surviving coerced prices.
    let mut result = PriceComparisonResult {
        product_name: resolved_product.to_string(),
        category: resolved_category.to_string(),
        sources,
        average_price: 0,
        lowest_price: 0,
        recommended_platform: String::new(),
    };
    result.reaggregate();

    Ok(result)
}

/// Coerces one raw source entry into a [`VendorQuote`].
///
/// Returns `None` (entry dropped) when the platform or price cannot be
/// coerced; every other field is repaired with a default.
fn coerce_source(entry: &Value, product_name: &str) -> Option<VendorQuote> {
    let obj = entry.as_object()?;

    let platform = coerce_platform(obj.get("platform"))?;
    let price = coerce_amount(obj.get("price"))?;

    // Availability defaults to true unless explicitly false.
    let availability = obj.get("availability") != Some(&Value::Bool(false));
    let shipping = obj
        .get("shipping")
        .and_then(coerce_number)
        .map_or(0, |s| (s.round() as i64).clamp(0, MAX_AMOUNT_WON));
    let rating = obj
        .get("rating")
        .and_then(coerce_number)
        .map(|r| r.clamp(1.0, 5.0));

    let url = match obj.get("url").and_then(Value::as_str) {
        Some(u) if u.chars().count() <= MAX_URL_CHARS && !u.is_empty() => u.to_string(),
        _ => default_search_url(&platform, product_name),
    };

    Some(VendorQuote {
        platform,
        price,
        url,
        availability,
        shipping,
        rating,
        original_price: None,
        net_price: None,
        applied_instrument: None,
        discount_amount: None,
        benefit_notes: None,
    })
}

/// Platform must coerce to a non-empty string. Numeric platforms are
/// stringified; anything else drops the entry.
fn coerce_platform(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Price must coerce to a finite number; negatives are repaired to zero and
/// implausibly large values are capped.
fn coerce_amount(value: Option<&Value>) -> Option<i64> {
    let n = coerce_number(value?)?;
    Some((n.round() as i64).clamp(0, MAX_AMOUNT_WON))
}

/// Accepts JSON numbers and numeric strings; rejects everything else.
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn non_empty_string(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.trim().is_empty())
}
