use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============ Payment Instruments ============

/// Kind of payment instrument, matching the wire values used by clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstrumentKind {
    /// Credit/debit card.
    #[serde(rename = "card")]
    Card,
    /// Mobile-pay wallet.
    #[serde(rename = "pay")]
    Wallet,
    /// Bank account.
    #[serde(rename = "bank")]
    BankAccount,
}

impl InstrumentKind {
    /// Default display icon for a synthesized (non-catalog) instrument.
    pub fn default_icon(&self) -> &'static str {
        match self {
            InstrumentKind::Card => "💳",
            InstrumentKind::Wallet => "📱",
            InstrumentKind::BankAccount => "🏦",
        }
    }
}

/// A user-enrolled payment instrument.
///
/// Owned by the user's local instrument registry; the comparison engine only
/// ever reads a snapshot passed in per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInstrument {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: InstrumentKind,
    /// Base discount rate in `[0, 1]`, applied to every purchase.
    pub discount_rate: f64,
    /// Category cashback rate in `[0, 1]`, applied only in affinity categories.
    #[serde(rename = "cashback")]
    pub cashback_rate: f64,
    /// Monthly benefit cap in won.
    pub monthly_limit: i64,
    /// Categories in which this instrument grants the extra cashback bonus.
    #[serde(rename = "specialCategories", default)]
    pub affinity_categories: Vec<String>,
    #[serde(default)]
    pub icon: String,
    #[serde(rename = "isActive", default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

impl PaymentInstrument {
    /// Whether this instrument grants its cashback bonus in `category`.
    pub fn has_affinity(&self, category: &str) -> bool {
        self.affinity_categories.iter().any(|c| c == category)
    }
}

// ============ Vendor Quotes ============

/// One vendor's price/availability offer for the searched item.
///
/// Immutable once sanitized, except for the enrichment fields set by the
/// discount engine when a user instrument applies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorQuote {
    pub platform: String,
    pub price: i64,
    pub url: String,
    pub availability: bool,
    pub shipping: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,

    // Enrichment fields, present only after a discount was applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_instrument: Option<PaymentInstrument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_amount: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benefit_notes: Option<Vec<BenefitNote>>,
}

impl VendorQuote {
    /// Creates a quote with no enrichment fields set.
    pub fn new(platform: String, price: i64, url: String) -> Self {
        Self {
            platform,
            price,
            url,
            availability: true,
            shipping: 0,
            rating: None,
            original_price: None,
            net_price: None,
            applied_instrument: None,
            discount_amount: None,
            benefit_notes: None,
        }
    }

    /// Net price after the best applicable discount, or the raw price if none.
    pub fn effective_price(&self) -> i64 {
        self.net_price.unwrap_or(self.price)
    }
}

/// One payment benefit attached to an enriched quote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenefitNote {
    /// Instrument name.
    pub method: String,
    /// Discount amount in won.
    pub discount: i64,
    /// Human-readable description of the saving.
    pub description: String,
}

// ============ Comparison Results ============

/// Canonical outcome of one price comparison.
///
/// Invariants: `sources` is non-empty and ordered ascending by effective
/// price; `lowest_price` and `average_price` are recomputed from effective
/// prices; `recommended_platform` names the first source at the minimum.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceComparisonResult {
    pub product_name: String,
    pub category: String,
    pub sources: Vec<VendorQuote>,
    pub average_price: i64,
    pub lowest_price: i64,
    pub recommended_platform: String,
}

impl PriceComparisonResult {
    /// Re-sorts sources by effective price and recomputes the aggregate
    /// fields from the surviving quotes. No-op on an empty source list.
    pub fn reaggregate(&mut self) {
        if self.sources.is_empty() {
            return;
        }
        self.sources.sort_by_key(|s| s.effective_price());

        let prices: Vec<i64> = self.sources.iter().map(|s| s.effective_price()).collect();
        // Summed in i128: a handful of near-i64::MAX prices must not overflow.
        let sum: i128 = prices.iter().map(|&p| p as i128).sum();
        self.average_price = (sum as f64 / prices.len() as f64).round() as i64;
        self.lowest_price = *prices.iter().min().unwrap_or(&0);
        self.recommended_platform = self
            .sources
            .iter()
            .find(|s| s.effective_price() == self.lowest_price)
            .map(|s| s.platform.clone())
            .unwrap_or_else(|| self.sources[0].platform.clone());
    }
}

// ============ Payment Recommendations ============

/// Breakdown of the savings computed by the standalone recommendation
/// calculator (flat category bonus + cashback on the post-discount price).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountBreakdown {
    pub base_discount: i64,
    pub category_bonus: i64,
    pub cashback: i64,
    pub total: i64,
}

/// One instrument's recommendation for a given purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecommendation {
    pub payment_method: PaymentInstrument,
    pub final_price: i64,
    pub savings: i64,
    pub discount_breakdown: DiscountBreakdown,
}

// ============ Request / Response Envelopes ============

/// Body of `POST /api/v1/price-search`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSearchRequest {
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub target_price: Option<f64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub user_payment_methods: Option<Vec<PaymentInstrument>>,
}

/// Success envelope for `POST /api/v1/price-search`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSearchResponse {
    pub success: bool,
    pub data: PriceComparisonResult,
    pub message: String,
    pub searched_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Body of `POST /api/v1/payment-methods`.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidateInstrumentRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<InstrumentKind>,
}

/// Body of `POST /api/v1/payment-methods/recommend`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendRequest {
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub payment_methods: Option<Vec<PaymentInstrument>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(platform: &str, price: i64) -> VendorQuote {
        VendorQuote::new(platform.to_string(), price, "https://example.com".to_string())
    }

    #[test]
    fn effective_price_prefers_net_price() {
        let mut q = quote("쿠팡", 10000);
        assert_eq!(q.effective_price(), 10000);
        q.net_price = Some(9500);
        assert_eq!(q.effective_price(), 9500);
    }

    #[test]
    fn reaggregate_sorts_and_recomputes() {
        let mut result = PriceComparisonResult {
            product_name: "노트북".to_string(),
            category: "온라인쇼핑".to_string(),
            sources: vec![quote("A", 3000), quote("B", 1000), quote("C", 2000)],
            average_price: 0,
            lowest_price: 0,
            recommended_platform: String::new(),
        };
        result.reaggregate();

        assert_eq!(result.lowest_price, 1000);
        assert_eq!(result.average_price, 2000);
        assert_eq!(result.recommended_platform, "B");
        let prices: Vec<i64> = result.sources.iter().map(|s| s.price).collect();
        assert_eq!(prices, vec![1000, 2000, 3000]);
    }

    #[test]
    fn reaggregate_uses_effective_prices() {
        let mut cheap_after_discount = quote("B", 3000);
        cheap_after_discount.net_price = Some(900);
        let mut result = PriceComparisonResult {
            product_name: "아메리카노".to_string(),
            category: "카페".to_string(),
            sources: vec![quote("A", 1000), cheap_after_discount],
            average_price: 0,
            lowest_price: 0,
            recommended_platform: String::new(),
        };
        result.reaggregate();

        assert_eq!(result.lowest_price, 900);
        assert_eq!(result.recommended_platform, "B");
        assert_eq!(result.average_price, 950);
    }

    #[test]
    fn reaggregate_survives_near_max_prices() {
        // 2^62 twice: the raw i64 sum would overflow, the mean must not.
        let huge = 1i64 << 62;
        let mut result = PriceComparisonResult {
            product_name: "상품".to_string(),
            category: "기타".to_string(),
            sources: vec![quote("A", huge), quote("B", huge)],
            average_price: 0,
            lowest_price: 0,
            recommended_platform: String::new(),
        };
        result.reaggregate();

        assert_eq!(result.lowest_price, huge);
        assert_eq!(result.average_price, huge);
    }

    #[test]
    fn instrument_wire_names_round_trip() {
        let json = serde_json::json!({
            "id": "pm-1",
            "name": "현대카드",
            "type": "card",
            "discountRate": 0.02,
            "cashback": 0.01,
            "monthlyLimit": 1000000,
            "specialCategories": ["온라인쇼핑", "카페"],
            "icon": "💳",
            "isActive": true
        });
        let pm: PaymentInstrument = serde_json::from_value(json).unwrap();
        assert_eq!(pm.kind, InstrumentKind::Card);
        assert!(pm.has_affinity("카페"));
        assert!(!pm.has_affinity("마트"));

        let back = serde_json::to_value(&pm).unwrap();
        assert_eq!(back["cashback"], 0.01);
        assert_eq!(back["isActive"], true);
    }
}
