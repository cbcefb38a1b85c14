//! Decimal precision helpers for monetary amounts and share quantities
//!
//! All balance arithmetic in the system uses rust_decimal so that cent-level
//! drift cannot creep in through binary floating point. Balances are carried
//! at 2 decimal places, share quantities at 6.

use rust_decimal::Decimal;

/// Standard balance precision (2 decimal places)
pub const BALANCE_PRECISION: u32 = 2;

/// Standard share-quantity precision (6 decimal places)
pub const SHARE_PRECISION: u32 = 6;

/// Rounds a monetary amount to standard balance precision
///
/// Uses banker's rounding (round half to even) to avoid systematic bias
/// when aggregating many amounts.
pub fn round_balance(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(
        BALANCE_PRECISION,
        rust_decimal::RoundingStrategy::MidpointNearestEven,
    )
}

/// Rounds a share quantity to standard share precision
pub fn round_shares(value: Decimal) -> Decimal {
    value.round_dp(SHARE_PRECISION)
}

/// Calculates the market value of a share quantity at a given price
///
/// # Example
///
/// ```rust
/// use core_kernel::money::market_value;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(market_value(dec!(2), dec!(5.00)), dec!(10.00));
/// ```
pub fn market_value(shares: Decimal, price: Decimal) -> Decimal {
    round_balance(shares * price)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn market_value_is_commutative_in_sign(
            shares in -1_000_000i64..1_000_000i64,
            price in 0i64..100_000i64
        ) {
            let shares = Decimal::new(shares, 6);
            let price = Decimal::new(price, 2);
            prop_assert_eq!(market_value(shares, price), -market_value(-shares, price));
        }

        #[test]
        fn round_balance_is_idempotent(minor in -1_000_000_000i64..1_000_000_000i64) {
            let value = Decimal::new(minor, 4);
            let once = round_balance(value);
            prop_assert_eq!(once, round_balance(once));
        }
    }
}
