//! Static reference catalog of popular payment instrument templates.
//!
//! Read-only data: each template carries fixed discount/cashback rates,
//! a monthly benefit cap, and the categories it is affine to. Users enroll
//! instruments by instantiating a template (or entering a custom one).

use crate::models::{InstrumentKind, PaymentInstrument};
use serde::Serialize;
use uuid::Uuid;

/// A named instrument template from the static catalog.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentTemplate {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: InstrumentKind,
    pub icon: &'static str,
    pub discount_rate: f64,
    #[serde(rename = "cashback")]
    pub cashback_rate: f64,
    pub monthly_limit: i64,
    #[serde(rename = "specialCategories")]
    pub affinity_categories: &'static [&'static str],
}

impl InstrumentTemplate {
    /// Instantiates this template as a user-owned instrument with a fresh id.
    pub fn instantiate(&self) -> PaymentInstrument {
        PaymentInstrument {
            id: Uuid::new_v4().to_string(),
            name: self.name.to_string(),
            kind: self.kind,
            discount_rate: self.discount_rate,
            cashback_rate: self.cashback_rate,
            monthly_limit: self.monthly_limit,
            affinity_categories: self
                .affinity_categories
                .iter()
                .map(|c| c.to_string())
                .collect(),
            icon: self.icon.to_string(),
            active: true,
        }
    }
}

/// The popular instrument catalog: 4 cards, 4 wallets, 2 bank accounts.
pub const POPULAR_INSTRUMENTS: &[InstrumentTemplate] = &[
    // 신용카드
    InstrumentTemplate {
        name: "신한카드",
        kind: InstrumentKind::Card,
        icon: "💳",
        discount_rate: 0.01,
        cashback_rate: 0.005,
        monthly_limit: 500_000,
        affinity_categories: &["온라인쇼핑", "편의점"],
    },
    InstrumentTemplate {
        name: "삼성카드",
        kind: InstrumentKind::Card,
        icon: "💳",
        discount_rate: 0.015,
        cashback_rate: 0.01,
        monthly_limit: 800_000,
        affinity_categories: &["백화점", "마트"],
    },
    InstrumentTemplate {
        name: "KB국민카드",
        kind: InstrumentKind::Card,
        icon: "💳",
        discount_rate: 0.01,
        cashback_rate: 0.005,
        monthly_limit: 600_000,
        affinity_categories: &["주유소", "대중교통"],
    },
    InstrumentTemplate {
        name: "현대카드",
        kind: InstrumentKind::Card,
        icon: "💳",
        discount_rate: 0.02,
        cashback_rate: 0.01,
        monthly_limit: 1_000_000,
        affinity_categories: &["온라인쇼핑", "카페"],
    },
    // 간편결제
    InstrumentTemplate {
        name: "네이버페이",
        kind: InstrumentKind::Wallet,
        icon: "📱",
        discount_rate: 0.01,
        cashback_rate: 0.01,
        monthly_limit: 300_000,
        affinity_categories: &["온라인쇼핑", "배달음식"],
    },
    InstrumentTemplate {
        name: "카카오페이",
        kind: InstrumentKind::Wallet,
        icon: "📱",
        discount_rate: 0.01,
        cashback_rate: 0.005,
        monthly_limit: 300_000,
        affinity_categories: &["택시", "편의점"],
    },
    InstrumentTemplate {
        name: "토스페이",
        kind: InstrumentKind::Wallet,
        icon: "📱",
        discount_rate: 0.005,
        cashback_rate: 0.02,
        monthly_limit: 500_000,
        affinity_categories: &["송금", "투자"],
    },
    InstrumentTemplate {
        name: "페이코",
        kind: InstrumentKind::Wallet,
        icon: "📱",
        discount_rate: 0.008,
        cashback_rate: 0.01,
        monthly_limit: 200_000,
        affinity_categories: &["온라인쇼핑"],
    },
    // 은행
    InstrumentTemplate {
        name: "신한은행",
        kind: InstrumentKind::BankAccount,
        icon: "🏦",
        discount_rate: 0.003,
        cashback_rate: 0.001,
        monthly_limit: 1_000_000,
        affinity_categories: &["ATM"],
    },
    InstrumentTemplate {
        name: "KB국민은행",
        kind: InstrumentKind::BankAccount,
        icon: "🏦",
        discount_rate: 0.003,
        cashback_rate: 0.001,
        monthly_limit: 1_000_000,
        affinity_categories: &["인터넷뱅킹"],
    },
];

/// Categories a search request may carry.
pub const CATEGORIES: &[&str] = &[
    "온라인쇼핑",
    "편의점",
    "마트",
    "백화점",
    "주유소",
    "카페",
    "배달음식",
    "택시",
    "대중교통",
    "병원",
    "약국",
    "서점",
    "영화관",
    "헬스장",
    "미용실",
    "기타",
];

/// Looks up a catalog template by name and kind.
pub fn lookup_template(name: &str, kind: InstrumentKind) -> Option<&'static InstrumentTemplate> {
    POPULAR_INSTRUMENTS
        .iter()
        .find(|t| t.name == name && t.kind == kind)
}

/// All catalog templates, in display order.
pub fn list_all() -> &'static [InstrumentTemplate] {
    POPULAR_INSTRUMENTS
}
