//! Payment-instrument discount computation.
//!
//! Two independently-evolved policies live here and must stay separate:
//!
//! 1. [`apply_best_instrument`] — the per-quote stacking rule used by the
//!    comparison pipeline. Cashback is treated as an additional point-of-sale
//!    discount on the original price when the category matches.
//! 2. [`discounted_price_recommendation`] — the standalone recommendation
//!    calculator. It adds a flat 5% category bonus and computes cashback on
//!    the post-discount amount, so the two policies disagree on purpose.

use crate::models::{
    BenefitNote, DiscountBreakdown, PaymentInstrument, PaymentRecommendation, VendorQuote,
};

/// Flat category bonus rate used by the recommendation calculator.
const CATEGORY_BONUS_RATE: f64 = 0.05;

/// Discount one instrument grants on a quote under the stacking policy:
/// `price × discountRate`, plus `price × cashbackRate` in affinity categories.
fn stacked_discount(price: i64, instrument: &PaymentInstrument, category: &str) -> i64 {
    let mut discount = price as f64 * instrument.discount_rate;
    if instrument.has_affinity(category) {
        discount += price as f64 * instrument.cashback_rate;
    }
    discount.round() as i64
}

/// Computes the best active instrument for one vendor quote and returns the
/// quote enriched with net price and benefit details.
///
/// The instrument with the strictly greatest discount wins; ties keep the
/// first-seen instrument in input order. When no instrument yields a positive
/// discount the quote is returned unmodified.
pub fn apply_best_instrument(
    quote: &VendorQuote,
    instruments: &[PaymentInstrument],
    category: &str,
) -> VendorQuote {
    let mut best: Option<(&PaymentInstrument, i64)> = None;

    for instrument in instruments.iter().filter(|pm| pm.active) {
        let discount = stacked_discount(quote.price, instrument, category);
        if discount > best.map_or(0, |(_, d)| d) {
            best = Some((instrument, discount));
        }
    }

    let Some((winner, discount)) = best else {
        return quote.clone();
    };

    let mut enriched = quote.clone();
    enriched.original_price = Some(quote.price);
    enriched.net_price = Some(quote.price - discount);
    enriched.discount_amount = Some(discount);
    enriched.benefit_notes = Some(vec![BenefitNote {
        method: winner.name.clone(),
        discount,
        description: format!("{}로 결제시 {}원 할인", winner.name, discount),
    }]);
    enriched.applied_instrument = Some(winner.clone());
    enriched
}

/// Standalone recommendation calculator (flat-bonus policy).
///
/// Base discount off the original price, then a flat 5% bonus in affinity
/// categories, then cashback computed on the post-discount amount. Cashback
/// counts toward savings but not toward the final price.
pub fn discounted_price_recommendation(
    original_price: i64,
    instrument: &PaymentInstrument,
    category: &str,
) -> PaymentRecommendation {
    let mut final_price = original_price as f64;
    let mut base_discount = 0.0;
    let mut category_bonus = 0.0;
    let mut cashback = 0.0;

    if instrument.discount_rate > 0.0 {
        base_discount = original_price as f64 * instrument.discount_rate;
        final_price -= base_discount;
    }

    if instrument.has_affinity(category) {
        category_bonus = original_price as f64 * CATEGORY_BONUS_RATE;
        final_price -= category_bonus;
    }

    if instrument.cashback_rate > 0.0 {
        cashback = final_price * instrument.cashback_rate;
    }

    let savings = base_discount + category_bonus + cashback;

    PaymentRecommendation {
        payment_method: instrument.clone(),
        final_price: final_price.round() as i64,
        savings: savings.round() as i64,
        discount_breakdown: DiscountBreakdown {
            base_discount: base_discount.round() as i64,
            category_bonus: category_bonus.round() as i64,
            cashback: cashback.round() as i64,
            total: savings.round() as i64,
        },
    }
}

/// Recommendations for every active instrument, cheapest final price first.
pub fn best_payment_options(
    original_price: i64,
    instruments: &[PaymentInstrument],
    category: &str,
) -> Vec<PaymentRecommendation> {
    let mut options: Vec<PaymentRecommendation> = instruments
        .iter()
        .filter(|pm| pm.active)
        .map(|pm| discounted_price_recommendation(original_price, pm, category))
        .collect();
    options.sort_by_key(|o| o.final_price);
    options
}
