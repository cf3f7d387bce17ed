//! Stay pricing.
//!
//! The same functions quote a stay in the client before submission and
//! compute the amounts the service records on the reservation, so both sides
//! agree on the charge for the same inputs.

use std::fmt;

use bigdecimal::{BigDecimal, RoundingMode};
use chrono::NaiveDate;

/// Platform commission, as a percentage of the nightly subtotal.
pub const SERVICE_FEE_PERCENT: u32 = 5;

/// Decimal places kept for every stored amount.
pub const AMOUNT_SCALE: i64 = 2;

/// Amounts are stored as `NUMERIC(12, 2)`, so they must stay below 10^10.
const AMOUNT_INTEGER_DIGITS: u32 = 10;

/// Whether `value` can be stored without rounding or overflow.
pub fn fits_amount(value: &BigDecimal) -> bool {
    let limit = BigDecimal::from(10u64.pow(AMOUNT_INTEGER_DIGITS));
    value.with_scale(AMOUNT_SCALE) == *value && value.abs() < limit
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceQuote {
    pub nights: i64,
    pub nights_price: BigDecimal,
    pub cleaning_fee: BigDecimal,
    pub service_fee: BigDecimal,
    pub total_price: BigDecimal,
}

/// A locally computed quote that disagrees with the total the server recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteMismatch {
    pub quoted: BigDecimal,
    pub recorded: BigDecimal,
}

impl fmt::Display for QuoteMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "quoted total {} differs from recorded total {}",
            self.quoted, self.recorded
        )
    }
}

impl PriceQuote {
    /// Compare against the server-recorded total. The recorded value wins;
    /// a mismatch is reported so the caller can surface it.
    pub fn check_against(&self, recorded_total: &BigDecimal) -> Option<QuoteMismatch> {
        if &self.total_price == recorded_total {
            None
        } else {
            Some(QuoteMismatch {
                quoted: self.total_price.clone(),
                recorded: recorded_total.clone(),
            })
        }
    }
}

/// Whole nights between check-in and check-out, or `None` when the range is
/// empty or reversed.
pub fn nights_between(check_in: NaiveDate, check_out: NaiveDate) -> Option<i64> {
    let days = (check_out - check_in).num_days();
    (days > 0).then_some(days)
}

/// `round(nights_price * 5%)` to a whole currency unit, ties away from zero.
pub fn service_fee(nights_price: &BigDecimal) -> BigDecimal {
    let raw = nights_price * BigDecimal::from(SERVICE_FEE_PERCENT) / BigDecimal::from(100u32);
    raw.with_scale_round(0, RoundingMode::HalfUp)
}

pub fn quote(
    price_per_night: &BigDecimal,
    cleaning_fee: &BigDecimal,
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> Option<PriceQuote> {
    let nights = nights_between(check_in, check_out)?;
    let nights_price = price_per_night * BigDecimal::from(nights);
    let service_fee = service_fee(&nights_price);
    let total_price = &nights_price + cleaning_fee + &service_fee;

    Some(PriceQuote {
        nights,
        nights_price,
        cleaning_fee: cleaning_fee.clone(),
        service_fee,
        total_price,
    })
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use proptest::prelude::*;

    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::from_str(s).expect("valid date")
    }

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).expect("valid decimal")
    }

    #[test]
    fn storable_amounts() {
        assert!(fits_amount(&dec("0.01")));
        assert!(fits_amount(&dec("120.50")));
        assert!(fits_amount(&dec("9999999999.99")));
        assert!(!fits_amount(&dec("0.001")));
        assert!(!fits_amount(&dec("10000000000")));
    }

    #[test]
    fn three_nights_at_two_hundred() {
        let q = quote(&dec("200"), &dec("50"), date("2026-07-01"), date("2026-07-04"))
            .expect("valid range");

        assert_eq!(q.nights, 3);
        assert_eq!(q.nights_price, dec("600"));
        assert_eq!(q.service_fee, dec("30"));
        assert_eq!(q.cleaning_fee, dec("50"));
        assert_eq!(q.total_price, dec("680"));
    }

    #[test]
    fn same_day_checkout_has_no_quote() {
        assert!(quote(&dec("100"), &dec("0"), date("2026-07-01"), date("2026-07-01")).is_none());
    }

    #[test]
    fn reversed_range_has_no_quote() {
        assert!(quote(&dec("100"), &dec("0"), date("2026-07-05"), date("2026-07-01")).is_none());
    }

    #[test]
    fn service_fee_rounds_half_away_from_zero() {
        // 5% of 10 = 0.5
        assert_eq!(service_fee(&dec("10")), dec("1"));
        // 5% of 49 = 2.45
        assert_eq!(service_fee(&dec("49")), dec("2"));
        // 5% of 51 = 2.55
        assert_eq!(service_fee(&dec("51")), dec("3"));
    }

    #[test]
    fn fractional_nightly_rate() {
        let q = quote(&dec("99.99"), &dec("0"), date("2026-01-30"), date("2026-02-02"))
            .expect("valid range");

        assert_eq!(q.nights, 3);
        assert_eq!(q.nights_price, dec("299.97"));
        // 14.9985 rounds to 15
        assert_eq!(q.service_fee, dec("15"));
        assert_eq!(q.total_price, dec("314.97"));
    }

    #[test]
    fn nights_cross_month_and_year_boundaries() {
        assert_eq!(nights_between(date("2026-12-30"), date("2027-01-02")), Some(3));
        assert_eq!(nights_between(date("2028-02-28"), date("2028-03-01")), Some(2));
    }

    #[test]
    fn matching_recorded_total_is_not_a_mismatch() {
        let q = quote(&dec("200"), &dec("50"), date("2026-07-01"), date("2026-07-04")).unwrap();
        assert!(q.check_against(&dec("680.00")).is_none());
    }

    #[test]
    fn differing_recorded_total_is_flagged() {
        let q = quote(&dec("200"), &dec("50"), date("2026-07-01"), date("2026-07-04")).unwrap();
        let mismatch = q.check_against(&dec("680.50")).expect("mismatch");
        assert_eq!(mismatch.quoted, dec("680"));
        assert_eq!(mismatch.recorded, dec("680.50"));
    }

    proptest! {
        #[test]
        fn total_is_subtotal_plus_fees(
            cents in 1i64..10_000_000,
            cleaning_cents in 0i64..100_000,
            nights in 1i64..400,
        ) {
            let per_night = BigDecimal::from(cents) / BigDecimal::from(100);
            let cleaning = BigDecimal::from(cleaning_cents) / BigDecimal::from(100);
            let check_in = date("2026-01-01");
            let check_out = check_in + chrono::Duration::days(nights);

            let q = quote(&per_night, &cleaning, check_in, check_out).unwrap();
            let subtotal = &per_night * BigDecimal::from(nights);
            let exact_fee = &subtotal * BigDecimal::from(5) / BigDecimal::from(100);

            prop_assert_eq!(q.nights, nights);
            prop_assert_eq!(&q.nights_price, &subtotal);
            prop_assert_eq!(&q.service_fee, &q.service_fee.with_scale(0));
            prop_assert!((&q.service_fee - &exact_fee).abs() <= dec("0.5"));
            prop_assert_eq!(q.total_price, subtotal + cleaning + q.service_fee);
        }
    }
}
