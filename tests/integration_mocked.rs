/// Integration tests with a mocked price oracle
/// Exercises the full comparison pipeline without hitting a real completion API
use moka::future::Cache;
use price_scout_api::generator::MockQuoteGenerator;
use price_scout_api::models::{InstrumentKind, PaymentInstrument, PriceSearchRequest};
use price_scout_api::oracle::PriceOracleClient;
use price_scout_api::orchestrator::run_comparison;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn oracle_for(server: &MockServer) -> PriceOracleClient {
    PriceOracleClient::new(
        server.uri(),
        "test-key".to_string(),
        "gpt-3.5-turbo".to_string(),
        5,
    )
    .expect("client creation")
}

fn quote_cache() -> Cache<String, String> {
    Cache::builder().max_capacity(100).build()
}

fn search_request(product: &str, category: &str) -> PriceSearchRequest {
    PriceSearchRequest {
        product_name: Some(product.to_string()),
        category: Some(category.to_string()),
        target_price: None,
        location: None,
        user_payment_methods: None,
    }
}

fn instrument(discount_rate: f64, cashback_rate: f64, affinities: &[&str]) -> PaymentInstrument {
    PaymentInstrument {
        id: "pm-test".to_string(),
        name: "현대카드".to_string(),
        kind: InstrumentKind::Card,
        discount_rate,
        cashback_rate,
        monthly_limit: 1_000_000,
        affinity_categories: affinities.iter().map(|s| s.to_string()).collect(),
        icon: "💳".to_string(),
        active: true,
    }
}

/// Wraps a quote document the way a chat-completions API replies.
fn completion_reply(content: String) -> serde_json::Value {
    json!({
        "id": "chatcmpl-test",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": content}}
        ]
    })
}

fn cafe_document() -> serde_json::Value {
    json!({
        "productName": "아메리카노",
        "category": "카페",
        "sources": [
            {"platform": "이디야", "price": 3200, "url": "https://ediya.com", "availability": true, "shipping": 0, "rating": 4.2},
            {"platform": "스타벅스", "price": 4500, "url": "https://www.starbucks.co.kr", "availability": true, "shipping": 0, "rating": 4.6},
            {"platform": "메가커피", "price": 2000, "url": "https://www.mega-mgccoffee.com", "availability": true, "shipping": 0, "rating": 4.0}
        ],
        "averagePrice": 1,
        "lowestPrice": 1,
        "recommendedPlatform": "아무데나"
    })
}

#[tokio::test]
async fn fenced_oracle_reply_is_parsed_and_sanitized() {
    let server = MockServer::start().await;
    let fenced = format!("```json\n{}\n```", cafe_document());

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_reply(fenced)))
        .mount(&server)
        .await;

    let oracle = oracle_for(&server);
    let mut generator = MockQuoteGenerator::with_seed(1);
    let outcome = run_comparison(
        Some(&oracle),
        &quote_cache(),
        &search_request("아메리카노", "카페"),
        &mut generator,
    )
    .await;

    assert!(!outcome.degraded);
    assert!(outcome.warning.is_none());
    assert_eq!(outcome.result.sources.len(), 3);
    // Caller-supplied aggregates were recomputed
    assert_eq!(outcome.result.lowest_price, 2000);
    assert_eq!(outcome.result.recommended_platform, "메가커피");
    assert_eq!(outcome.result.sources[0].platform, "메가커피");
}

#[tokio::test]
async fn garbage_oracle_reply_degrades_to_mock_cafe_quotes() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_reply(
            "죄송합니다, 가격 정보를 찾을 수 없습니다.".to_string(),
        )))
        .mount(&server)
        .await;

    let oracle = oracle_for(&server);
    let mut generator = MockQuoteGenerator::with_seed(2);
    let outcome = run_comparison(
        Some(&oracle),
        &quote_cache(),
        &search_request("아메리카노", "카페"),
        &mut generator,
    )
    .await;

    assert!(outcome.degraded);
    assert!(outcome.warning.is_some());
    assert_eq!(outcome.result.sources.len(), 6);
    let min = outcome
        .result
        .sources
        .iter()
        .map(|s| s.price)
        .min()
        .unwrap();
    assert_eq!(outcome.result.lowest_price, min);
}

#[tokio::test]
async fn oracle_http_error_degrades_once() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(1)
        .mount(&server)
        .await;

    let oracle = oracle_for(&server);
    let mut generator = MockQuoteGenerator::with_seed(3);
    let outcome = run_comparison(
        Some(&oracle),
        &quote_cache(),
        &search_request("갤럭시 버즈", "온라인쇼핑"),
        &mut generator,
    )
    .await;

    assert!(outcome.degraded);
    assert!(!outcome.result.sources.is_empty());
}

#[tokio::test]
async fn empty_sources_document_triggers_fallback() {
    let server = MockServer::start().await;
    let doc = json!({
        "productName": "아메리카노",
        "category": "카페",
        "sources": [],
        "averagePrice": 0,
        "lowestPrice": 0,
        "recommendedPlatform": ""
    });

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion_reply(doc.to_string())),
        )
        .mount(&server)
        .await;

    let oracle = oracle_for(&server);
    let mut generator = MockQuoteGenerator::with_seed(4);
    let outcome = run_comparison(
        Some(&oracle),
        &quote_cache(),
        &search_request("아메리카노", "카페"),
        &mut generator,
    )
    .await;

    assert!(outcome.degraded);
    assert_eq!(outcome.result.sources.len(), 6);
}

#[tokio::test]
async fn second_search_is_served_from_cache() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_reply(
            cafe_document().to_string(),
        )))
        .expect(1) // the second run must not reach the oracle
        .mount(&server)
        .await;

    let oracle = oracle_for(&server);
    let cache = quote_cache();
    let request = search_request("아메리카노", "카페");

    let mut generator = MockQuoteGenerator::with_seed(5);
    let first = run_comparison(Some(&oracle), &cache, &request, &mut generator).await;
    let second = run_comparison(Some(&oracle), &cache, &request, &mut generator).await;

    assert!(!first.degraded);
    assert!(!second.degraded);
    assert_eq!(first.result.lowest_price, second.result.lowest_price);
}

#[tokio::test]
async fn malformed_entries_are_repaired_or_dropped() {
    let server = MockServer::start().await;
    let long_url = format!("https://www.coupang.com/np/search?q={}", "x".repeat(400));
    let doc = json!({
        "productName": "노트북",
        "category": "온라인쇼핑",
        "sources": [
            {"platform": "쿠팡", "price": 899000, "url": long_url, "rating": 9.7},
            {"platform": "11번가", "price": "가격미정"},
            {"platform": "G마켓", "price": 915000, "availability": false}
        ],
        "averagePrice": 0,
        "lowestPrice": 0,
        "recommendedPlatform": ""
    });

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion_reply(doc.to_string())),
        )
        .mount(&server)
        .await;

    let oracle = oracle_for(&server);
    let mut generator = MockQuoteGenerator::with_seed(6);
    let outcome = run_comparison(
        Some(&oracle),
        &quote_cache(),
        &search_request("노트북", "온라인쇼핑"),
        &mut generator,
    )
    .await;

    assert!(!outcome.degraded);
    // 11번가 dropped (non-numeric price); the other two survive repaired
    assert_eq!(outcome.result.sources.len(), 2);
    let coupang = outcome
        .result
        .sources
        .iter()
        .find(|s| s.platform == "쿠팡")
        .unwrap();
    assert!(coupang.url.chars().count() <= 200);
    assert_eq!(coupang.rating, Some(5.0));
    let gmarket = outcome
        .result
        .sources
        .iter()
        .find(|s| s.platform == "G마켓")
        .unwrap();
    assert!(!gmarket.availability);
}

#[tokio::test]
async fn cafe_search_without_oracle_yields_six_sorted_chain_quotes() {
    // End-to-end spec scenario: no oracle configured, no instruments
    let mut generator = MockQuoteGenerator::with_seed(7);
    let outcome = run_comparison(
        None,
        &quote_cache(),
        &search_request("아메리카노", "카페"),
        &mut generator,
    )
    .await;

    assert!(outcome.degraded);
    assert_eq!(outcome.result.sources.len(), 6);
    let prices: Vec<i64> = outcome.result.sources.iter().map(|s| s.price).collect();
    let mut sorted = prices.clone();
    sorted.sort_unstable();
    assert_eq!(prices, sorted);
    assert_eq!(outcome.result.lowest_price, prices[0]);
}

#[tokio::test]
async fn cafe_search_with_affine_instrument_reranks_by_net_price() {
    // End-to-end spec scenario: one active instrument with 카페 affinity
    let mut request = search_request("아메리카노", "카페");
    request.user_payment_methods = Some(vec![instrument(0.02, 0.01, &["카페"])]);

    let mut generator = MockQuoteGenerator::with_seed(7);
    let outcome = run_comparison(None, &quote_cache(), &request, &mut generator).await;

    let top = &outcome.result.sources[0];
    assert!(top.applied_instrument.is_some());
    assert_eq!(
        top.net_price.unwrap(),
        top.original_price.unwrap() - top.discount_amount.unwrap()
    );

    let effectives: Vec<i64> = outcome
        .result
        .sources
        .iter()
        .map(|s| s.effective_price())
        .collect();
    let mut sorted = effectives.clone();
    sorted.sort_unstable();
    assert_eq!(effectives, sorted);
    assert_eq!(outcome.result.lowest_price, effectives[0]);

    // averagePrice tracks effective prices after discounting
    let mean = effectives.iter().sum::<i64>() as f64 / effectives.len() as f64;
    assert_eq!(outcome.result.average_price, mean.round() as i64);
}

#[tokio::test]
async fn cached_entries_stay_instrument_agnostic() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_reply(
            cafe_document().to_string(),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let oracle = oracle_for(&server);
    let cache = quote_cache();

    // First search with no instruments populates the cache
    let plain = search_request("아메리카노", "카페");
    let mut generator = MockQuoteGenerator::with_seed(8);
    let first = run_comparison(Some(&oracle), &cache, &plain, &mut generator).await;
    assert!(first.result.sources.iter().all(|s| s.net_price.is_none()));

    // Second search with an instrument reuses the cached quotes but applies
    // the discount freshly
    let mut with_pm = search_request("아메리카노", "카페");
    with_pm.user_payment_methods = Some(vec![instrument(0.02, 0.01, &["카페"])]);
    let second = run_comparison(Some(&oracle), &cache, &with_pm, &mut generator).await;

    assert!(!second.degraded);
    let top = &second.result.sources[0];
    assert!(top.applied_instrument.is_some());
    // 메가커피 2000원: discount = round(2000*0.02 + 2000*0.01) = 60
    assert_eq!(second.result.lowest_price, 1940);
}
