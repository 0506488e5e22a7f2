use crate::errors::AppError;
use crate::models::PriceSearchRequest;
use crate::prompts;
use regex::Regex;
use serde_json::{json, Value};
use std::time::Duration;

/// Client for the text-completion price oracle (OpenAI-compatible API).
///
/// The oracle is semi-trusted: it is expected to return a JSON quote
/// document, possibly wrapped in markdown code fences, but may return
/// garbage. This client only gets the reply decoded into an untyped value;
/// schema validation happens in the sanitizer.
#[derive(Clone)]
pub struct PriceOracleClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl PriceOracleClient {
    /// Creates a new `PriceOracleClient`.
    ///
    /// The HTTP timeout bounds the single external call of a comparison
    /// request; a timeout is recovered like any malformed response.
    pub fn new(
        base_url: String,
        api_key: String,
        model: String,
        timeout_secs: u64,
    ) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AppError::OracleError(format!("Failed to create oracle client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            api_key,
            model,
        })
    }

    /// Requests raw vendor quotes for a search and returns the decoded
    /// (untyped, unvalidated) JSON document.
    pub async fn fetch_quotes(&self, request: &PriceSearchRequest) -> Result<Value, AppError> {
        let brand = request
            .product_name
            .as_deref()
            .and_then(prompts::detect_brand);
        if let Some(ref b) = brand {
            tracing::info!("Brand-specific query detected: {} ({})", b.brand, b.category);
        }
        let prompt = prompts::build_prompt(request, brand.as_ref());

        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": prompts::SYSTEM_PROMPT},
                {"role": "user", "content": prompt}
            ],
            "max_tokens": 2000,
            "temperature": 0.1
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::OracleError(format!("Oracle request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::OracleError(format!(
                "Oracle returned {}: {}",
                status, error_text
            )));
        }

        let completion: Value = response.json().await.map_err(|e| {
            AppError::OracleError(format!("Failed to parse oracle response: {}", e))
        })?;

        let content = completion
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| AppError::OracleError("Oracle reply carried no content".to_string()))?;

        tracing::debug!("Oracle reply: {} chars", content.len());

        let cleaned = strip_code_fences(content);
        serde_json::from_str(&cleaned)
            .map_err(|e| AppError::OracleError(format!("Oracle reply is not valid JSON: {}", e)))
    }
}

/// Strips markdown ```json fences the oracle sometimes wraps replies in.
pub fn strip_code_fences(text: &str) -> String {
    // Panic-free: the pattern is a compile-time constant.
    match Regex::new(r"```(?:json)?\s*") {
        Ok(re) => re.replace_all(text, "").trim().to_string(),
        Err(_) => text.trim().to_string(),
    }
}
