//! Synthetic quote generation, the availability fallback for the oracle path.
//!
//! Deterministic shape, randomized values: the vendor list and source count
//! are fixed per category, prices and ratings are drawn from a seedable RNG
//! so tests can assert exact output. Generation never fails and always yields
//! at least one source, already in canonical form.

use crate::models::{PriceComparisonResult, VendorQuote};
use crate::sanitizer::default_search_url;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Maximum vendors synthesized per comparison.
const MAX_VENDORS: usize = 6;

/// Store chains quoted per category, in preference order.
fn vendors_by_category(category: &str) -> &'static [&'static str] {
    match category {
        "카페" => &[
            "스타벅스",
            "메가커피",
            "이디야",
            "컴포즈커피",
            "탐앤탐스",
            "할리스",
            "투썸플레이스",
            "빽다방",
            "엔젤리너스",
            "폴바셋",
        ],
        "편의점" => &["GS25", "세븐일레븐", "CU", "이마트24", "미니스톱"],
        "마트" => &["이마트", "홈플러스", "롯데마트", "코스트코", "농협하나로마트"],
        "백화점" => &["롯데백화점", "신세계백화점", "현대백화점", "갤러리아"],
        "주유소" => &["SK에너지", "GS칼텍스", "S-Oil", "현대오일뱅크"],
        _ => &[
            "네이버쇼핑",
            "쿠팡",
            "11번가",
            "G마켓",
            "옥션",
            "인터파크",
            "롯데온",
            "위메프",
        ],
    }
}

/// Estimated base price per category, in won. 주유소 is a per-liter price.
fn base_price_by_category(category: &str) -> f64 {
    match category {
        "온라인쇼핑" => 50_000.0,
        "편의점" => 2_000.0,
        "마트" => 15_000.0,
        "백화점" => 100_000.0,
        "카페" => 4_000.0,
        "배달음식" => 20_000.0,
        "서점" => 15_000.0,
        "영화관" => 12_000.0,
        "주유소" => 1_600.0,
        "병원" => 30_000.0,
        "약국" => 8_000.0,
        "헬스장" => 80_000.0,
        _ => 30_000.0,
    }
}

/// Fallback producer of canonical comparison results.
pub struct MockQuoteGenerator {
    rng: StdRng,
}

impl MockQuoteGenerator {
    /// Generator seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Generator with a fixed seed, for reproducible output in tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Synthesizes a comparison result for the given product and category.
    ///
    /// `target_price` anchors the price range when supplied; otherwise the
    /// per-category estimate is used. Output is already canonical: sorted
    /// ascending by price with recomputed aggregates.
    pub fn generate(
        &mut self,
        product_name: &str,
        category: &str,
        target_price: Option<f64>,
    ) -> PriceComparisonResult {
        let base_price = target_price
            .filter(|p| *p > 0.0)
            .unwrap_or_else(|| base_price_by_category(category));
        let vendors = vendors_by_category(category);

        let sources: Vec<VendorQuote> = vendors
            .iter()
            .take(MAX_VENDORS)
            .map(|vendor| {
                // ±15% variation around the base price
                let variation: f64 = self.rng.gen_range(-0.15..=0.15);
                let price = (base_price * (1.0 + variation)).round().max(0.0) as i64;
                let availability = self.rng.gen_bool(0.9);
                let shipping = if self.rng.gen_bool(0.5) { 0 } else { 3000 };
                let rating: f64 = self.rng.gen_range(3.5..=5.0);
                let rating = (rating * 10.0).round() / 10.0;

                VendorQuote {
                    platform: vendor.to_string(),
                    price,
                    url: default_search_url(vendor, product_name),
                    availability,
                    shipping,
                    rating: Some(rating),
                    original_price: None,
                    net_price: None,
                    applied_instrument: None,
                    discount_amount: None,
                    benefit_notes: None,
                }
            })
            .collect();

        let mut result = PriceComparisonResult {
            product_name: product_name.to_string(),
            category: category.to_string(),
            sources,
            average_price: 0,
            lowest_price: 0,
            recommended_platform: String::new(),
        };
        result.reaggregate();
        result
    }
}

impl Default for MockQuoteGenerator {
    fn default() -> Self {
        Self::new()
    }
}
