//! Natural-language prompt construction for the price oracle.
//!
//! Brand-specific queries (e.g. "스타벅스 아메리카노") force the brand's
//! category and a brand-centric offline prompt; offline categories get a
//! store-chain prompt with payment-benefit annotations; everything else gets
//! the e-commerce prompt with a fixed vendor set and short-URL requirements.

use crate::models::PriceSearchRequest;

/// System role content sent with every oracle call.
pub const SYSTEM_PROMPT: &str =
    "당신은 온라인 쇼핑 가격 비교 전문가입니다. 사용자가 요청한 상품의 가격 정보를 정확한 JSON 형태로 제공합니다.";

/// Categories served by physical store chains rather than e-commerce vendors.
const OFFLINE_CATEGORIES: &[&str] = &[
    "편의점",
    "마트",
    "백화점",
    "카페",
    "주유소",
    "병원",
    "약국",
    "미용실",
    "헬스장",
];

/// Known brand aliases and the category each brand belongs to.
const BRAND_PATTERNS: &[(&[&str], &str)] = &[
    // 카페 브랜드
    (&["스타벅스", "스벅"], "카페"),
    (&["메가커피", "메가"], "카페"),
    (&["컴포즈커피", "컴포즈"], "카페"),
    (&["탐앤탐스", "탐탐"], "카페"),
    (&["이디야", "이디야커피"], "카페"),
    (&["할리스", "할리스커피"], "카페"),
    (&["투썸플레이스", "투썸"], "카페"),
    (&["빽다방", "빽"], "카페"),
    (&["엔젤리너스", "엔젤"], "카페"),
    (&["폴바셋", "폴"], "카페"),
    (&["커피빈", "빈"], "카페"),
    (&["파스쿠찌"], "카페"),
    // 편의점 브랜드
    (&["GS25", "GS"], "편의점"),
    (&["세븐일레븐", "7일레븐", "세븐"], "편의점"),
    (&["CU", "씨유"], "편의점"),
    (&["이마트24"], "편의점"),
    // 마트 브랜드
    (&["이마트"], "마트"),
    (&["롯데마트"], "마트"),
    (&["홈플러스"], "마트"),
    (&["코스트코"], "마트"),
];

/// Café chains suggested to the oracle for brand/카페 queries.
const CAFE_CHAINS: &str = "스타벅스, 이디야, 메가커피, 컴포즈커피, 탐앤탐스, 할리스, \
투썸플레이스, 커피빈, 엔젤리너스, 빽다방, 폴바셋, 파스쿠찌, 카페베네, 커피나무, \
그라찌에, 드롭탑, 더벤티, 매머드커피, 커피에반하다, 니코스케이터";

/// E-commerce vendors suggested to the oracle for online queries.
const ONLINE_VENDORS: &str = "네이버쇼핑, 쿠팡, 11번가, G마켓, 옥션, 인터파크, 롯데온";

/// A brand detected in the product query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandMatch {
    pub brand: &'static str,
    pub category: &'static str,
}

/// Detects a known brand mentioned in the product query.
///
/// The first alias match wins; the canonical brand name (first alias of the
/// pattern) is returned so prompts always use the full brand name.
pub fn detect_brand(query: &str) -> Option<BrandMatch> {
    for (aliases, category) in BRAND_PATTERNS.iter().copied() {
        for alias in aliases {
            if query.contains(alias) {
                return Some(BrandMatch {
                    brand: aliases[0],
                    category,
                });
            }
        }
    }
    None
}

/// Whether the query should use the offline store-chain prompt.
pub fn is_offline_query(category: &str, brand: Option<&BrandMatch>) -> bool {
    brand.is_some() || OFFLINE_CATEGORIES.contains(&category)
}

/// Builds the user prompt for one search request.
pub fn build_prompt(request: &PriceSearchRequest, brand: Option<&BrandMatch>) -> String {
    let product_name = request.product_name.as_deref().unwrap_or_default();
    let category = request.category.as_deref().unwrap_or_default();

    if is_offline_query(category, brand) {
        build_offline_prompt(product_name, category, request, brand)
    } else {
        build_online_prompt(product_name, category, request.target_price)
    }
}

fn build_offline_prompt(
    product_name: &str,
    category: &str,
    request: &PriceSearchRequest,
    brand: Option<&BrandMatch>,
) -> String {
    let focus = match brand {
        Some(b) => format!("{} 브랜드 중심의", b.brand),
        None => "오프라인".to_string(),
    };

    let mut prompt = format!(
        "다음 상품/서비스에 대한 {} 매장 정보와 결제수단별 혜택을 정확한 JSON 형태로 제공해주세요.\n\n\
         상품/서비스 정보:\n- 상품명: \"{}\"\n- 카테고리: \"{}\"\n",
        focus, product_name, category
    );
    if let Some(b) = brand {
        prompt.push_str(&format!("- 중심 브랜드: \"{}\"\n", b.brand));
    }
    if let Some(location) = request.location.as_deref() {
        prompt.push_str(&format!("- 지역: {}\n", location));
    }
    if let Some(target) = request.target_price {
        prompt.push_str(&format!("- 목표 가격: {}원\n", target.round() as i64));
    }

    prompt.push_str(
        "\n요구사항:\n\
         1. 반드시 유효한 JSON 형태로만 응답하세요\n\
         2. 가격은 반드시 숫자 타입으로 설정하세요\n\
         3. 결제수단별 혜택을 포함하세요\n\
         4. 실제 매장 체인명을 사용하세요\n",
    );
    if let Some(b) = brand {
        prompt.push_str(&format!(
            "5. {}를 포함하여 같은 카테고리의 경쟁 브랜드들과 비교하세요\n\
             6. 특정 브랜드에서 해당 상품을 가장 싸게 사는 방법을 중점적으로 제공하세요\n",
            b.brand
        ));
    }

    prompt.push_str(&format!(
        "\nJSON 형태:\n{{\n  \"productName\": \"{}\",\n  \"category\": \"{}\",\n  \
         \"sources\": [\n    {{\n      \"platform\": \"매장명\",\n      \"price\": 숫자,\n      \
         \"url\": \"매장 홈페이지 또는 앱 링크\",\n      \"availability\": true,\n      \
         \"shipping\": 0,\n      \"rating\": 소수점포함숫자\n    }}\n  ],\n  \
         \"averagePrice\": 숫자,\n  \"lowestPrice\": 숫자,\n  \"recommendedPlatform\": \"최저가매장명\"\n}}\n",
        product_name, category
    ));

    let is_cafe = category == "카페" || brand.map(|b| b.category) == Some("카페");
    if is_cafe {
        prompt.push_str(&format!("\n카페 브랜드: {}\n", CAFE_CHAINS));
    }
    prompt.push_str(&format!(
        "\n- 결제수단별 할인혜택 포함 (신용카드, 간편결제, 멤버십 등)\n\
         - {} 카테고리에 적합한 합리적인 가격 범위 사용\n\n\
         중요: JSON 형태 외에는 다른 텍스트를 포함하지 마세요.",
        category
    ));

    prompt
}

fn build_online_prompt(product_name: &str, category: &str, target_price: Option<f64>) -> String {
    let mut prompt = format!(
        "다음 상품에 대한 온라인 쇼핑몰별 가격 정보를 정확한 JSON 형태로 제공해주세요.\n\n\
         상품 정보:\n- 상품명: \"{}\"\n- 카테고리: \"{}\"\n",
        product_name, category
    );
    if let Some(target) = target_price {
        prompt.push_str(&format!("- 목표 가격: {}원\n", target.round() as i64));
    }

    prompt.push_str(&format!(
        "\n요구사항:\n\
         1. 반드시 유효한 JSON 형태로만 응답하세요\n\
         2. 가격은 반드시 숫자 타입으로 설정하세요\n\
         3. URL은 간단하고 짧은 형태로 생성하세요 (200자 이내)\n\
         4. 평점은 1.0-5.0 사이의 숫자로 설정하세요\n\
         5. 긴 URL 매개변수를 피하고 기본 검색 URL만 사용하세요\n\n\
         JSON 형태 (이 형태를 정확히 따라주세요):\n{{\n  \"productName\": \"{}\",\n  \
         \"category\": \"{}\",\n  \"sources\": [\n    {{\n      \"platform\": \"쇼핑몰명\",\n      \
         \"price\": 숫자,\n      \"url\": \"https://도메인/search?q=검색어\",\n      \
         \"availability\": true,\n      \"shipping\": 숫자,\n      \"rating\": 소수점포함숫자\n    }}\n  ],\n  \
         \"averagePrice\": 숫자,\n  \"lowestPrice\": 숫자,\n  \"recommendedPlatform\": \"최저가플랫폼명\"\n}}\n\n\
         포함할 쇼핑몰: {}\n\
         - 6-7개 결과 제공\n\
         - {} 카테고리에 적합한 합리적인 가격 범위 사용\n\
         - 배송비는 0원 또는 2500-3000원 중 설정\n\
         - 재고는 대부분 available로 설정 (90% 이상)\n\n\
         중요: JSON 형태 외에는 다른 텍스트를 포함하지 마세요.",
        product_name, category, ONLINE_VENDORS, category
    ));

    prompt
}
