//! Retail price formula.
//!
//! The storefront price is the supplier's B2B price times a fixed markup,
//! rounded **up** to the next multiple of ten and then reduced by one so
//! every price ends in 9 (`159`, `249`, `1299`).

use rust_decimal::Decimal;

use crate::records::{FeedRecord, PricedRecord};
use crate::PricingError;

/// 60% markup over the B2B price.
pub const DEFAULT_MARKUP: Decimal = Decimal::from_parts(160, 0, 0, false, 2);

const TEN: Decimal = Decimal::TEN;

/// Computes `10 * ceil(markup * b2b_price / 10) - 1`.
///
/// Non-positive inputs price to zero rather than `-1`. Returns `None` when
/// the result does not fit in a `Decimal`.
#[must_use]
pub fn retail_price(b2b_price: Decimal, markup: Decimal) -> Option<Decimal> {
    let raw = b2b_price.checked_mul(markup)?;
    if raw <= Decimal::ZERO {
        return Some(Decimal::ZERO);
    }
    let rounded = raw.checked_div(TEN)?.ceil().checked_mul(TEN)?;
    Some(rounded.checked_sub(Decimal::ONE)?.normalize())
}

/// Markup policy applied to every feed row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pricing {
    markup: Decimal,
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            markup: DEFAULT_MARKUP,
        }
    }
}

impl Pricing {
    #[must_use]
    pub fn new(markup: Decimal) -> Self {
        Self { markup }
    }

    #[must_use]
    pub fn markup(&self) -> Decimal {
        self.markup
    }

    /// Attaches the computed retail price to a feed row. The B2B price is
    /// carried over unchanged as the variant's unit cost.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] when the marked-up price is out of
    /// range for a `Decimal`.
    pub fn price(&self, record: &FeedRecord) -> Result<PricedRecord, PricingError> {
        let retail = retail_price(record.b2b_price, self.markup).ok_or_else(|| {
            PricingError::Overflow {
                sku: record.sku.clone(),
                b2b_price: record.b2b_price,
                markup: self.markup,
            }
        })?;
        Ok(PricedRecord {
            sku: record.sku.clone(),
            retail_price: retail,
            cost: record.b2b_price,
            stock: record.stock,
        })
    }

    /// Prices every row; the first row that overflows aborts the run.
    ///
    /// # Errors
    ///
    /// See [`Pricing::price`].
    pub fn price_all(&self, records: &[FeedRecord]) -> Result<Vec<PricedRecord>, PricingError> {
        records.iter().map(|r| self.price(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn price(b2b: Decimal, markup: Decimal) -> Decimal {
        retail_price(b2b, markup).unwrap()
    }

    #[test]
    fn default_markup_is_one_point_six() {
        assert_eq!(DEFAULT_MARKUP, dec("1.60"));
    }

    #[test]
    fn rounds_up_to_next_ten_minus_one() {
        // 99.95 * 1.6 = 159.92 -> 160 -> 159
        assert_eq!(price(dec("99.95"), DEFAULT_MARKUP), dec("159"));
        // 10 * 1.6 = 16 -> 20 -> 19
        assert_eq!(price(dec("10"), DEFAULT_MARKUP), dec("19"));
    }

    #[test]
    fn exact_multiple_of_ten_is_not_bumped() {
        // 50 * 1.6 = 80 exactly -> ceil(8) = 8 -> 79
        assert_eq!(price(dec("50"), DEFAULT_MARKUP), dec("79"));
        // 25 * 1.6 = 40 exactly, no float drift into 49
        assert_eq!(price(dec("25"), DEFAULT_MARKUP), dec("39"));
    }

    #[test]
    fn tiny_prices_land_on_nine() {
        assert_eq!(price(dec("0.01"), DEFAULT_MARKUP), dec("9"));
    }

    #[test]
    fn non_positive_prices_price_to_zero() {
        assert_eq!(price(Decimal::ZERO, DEFAULT_MARKUP), Decimal::ZERO);
        assert_eq!(price(dec("-5"), DEFAULT_MARKUP), Decimal::ZERO);
    }

    #[test]
    fn every_positive_price_ends_in_nine_and_covers_the_markup() {
        for cents in (1..200_000).step_by(137) {
            let b2b = Decimal::new(cents, 2);
            let retail = price(b2b, DEFAULT_MARKUP);
            assert_eq!(retail % TEN, dec("9"), "b2b={b2b} retail={retail}");
            assert!(
                retail + Decimal::ONE >= b2b * DEFAULT_MARKUP,
                "b2b={b2b} retail={retail}"
            );
            assert!(
                retail + Decimal::ONE - b2b * DEFAULT_MARKUP < TEN,
                "b2b={b2b} retail={retail}"
            );
        }
    }

    #[test]
    fn formula_is_deterministic() {
        let b2b = dec("123.45");
        assert_eq!(price(b2b, DEFAULT_MARKUP), price(b2b, DEFAULT_MARKUP));
    }

    #[test]
    fn custom_markup_is_applied() {
        // 100 * 2 = 200 -> 199
        assert_eq!(price(dec("100"), dec("2")), dec("199"));
    }

    #[test]
    fn pricing_carries_b2b_price_as_cost() {
        let record = FeedRecord {
            sku: "V-100".to_string(),
            b2b_price: dec("99.95"),
            stock: 4,
        };
        let priced = Pricing::default().price(&record).unwrap();
        assert_eq!(priced.sku, "V-100");
        assert_eq!(priced.retail_price, dec("159"));
        assert_eq!(priced.cost, dec("99.95"));
        assert_eq!(priced.stock, 4);
    }

    #[test]
    fn oversized_price_does_not_panic() {
        assert_eq!(retail_price(Decimal::MAX, DEFAULT_MARKUP), None);
        assert_eq!(retail_price(dec("1"), Decimal::MAX), None);
        // Just under MAX, the multiply fits but rounding up to the next ten does not.
        assert_eq!(retail_price(Decimal::MAX - dec("3"), Decimal::ONE), None);
    }

    #[test]
    fn overflowing_row_is_reported_with_its_sku() {
        let records = vec![
            FeedRecord {
                sku: "V-1".to_string(),
                b2b_price: dec("10"),
                stock: 1,
            },
            FeedRecord {
                sku: "V-HUGE".to_string(),
                b2b_price: Decimal::MAX,
                stock: 1,
            },
        ];
        let err = Pricing::default().price_all(&records).unwrap_err();
        match err {
            PricingError::Overflow { sku, b2b_price, .. } => {
                assert_eq!(sku, "V-HUGE");
                assert_eq!(b2b_price, Decimal::MAX);
            }
        }
    }
}
