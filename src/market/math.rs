//! Wide-intermediate integer arithmetic for 18-decimal market math.
//!
//! Reserves and amounts are `u128` raw units, but products of two of them
//! (`amount × total_lp`, `sy × pt`) routinely exceed `u128`. Every such
//! product is formed as a [`U256`] before dividing back down.

use ethereum_types::U256;

/// Fixed-point scale used by exchange rates and the yield index (`1e18`).
pub const ONE: u128 = 1_000_000_000_000_000_000;

/// Exact product of two `u128` values; `(2^128 - 1)^2` fits 256 bits.
fn product(a: u128, b: u128) -> U256 {
    U256::from(a).overflowing_mul(U256::from(b)).0
}

fn narrow(value: U256) -> Option<u128> {
    (value.bits() <= 128).then(|| value.low_u128())
}

/// `floor(a × b / denominator)`, or `None` on a zero denominator or a
/// quotient that does not fit `u128`.
#[must_use]
pub fn mul_div_floor(a: u128, b: u128, denominator: u128) -> Option<u128> {
    let quotient = product(a, b).checked_div(U256::from(denominator))?;
    narrow(quotient)
}

/// `ceil(a × b / denominator)`, or `None` on a zero denominator or overflow.
#[must_use]
pub fn mul_div_ceil(a: u128, b: u128, denominator: u128) -> Option<u128> {
    if denominator == 0 {
        return None;
    }
    let (quotient, remainder) = product(a, b).div_mod(U256::from(denominator));
    let quotient = narrow(quotient)?;
    if remainder.is_zero() {
        Some(quotient)
    } else {
        quotient.checked_add(1)
    }
}

/// `floor(sqrt(a × b))` without overflowing the product.
#[must_use]
pub fn sqrt_of_product(a: u128, b: u128) -> u128 {
    // The root of a 256-bit value always fits 128 bits.
    product(a, b).integer_sqrt().low_u128()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn product_of_max_values_is_exact() {
        // (2^128 - 1)^2 = 2^256 - 2^129 + 1
        let expected = U256::MAX - (U256::one() << 129usize) + U256::from(2u8);
        assert_eq!(product(u128::MAX, u128::MAX), expected);
    }

    #[test]
    fn narrow_rejects_wide_values() {
        assert_eq!(narrow(U256::from(u128::MAX)), Some(u128::MAX));
        assert_eq!(narrow(U256::from(u128::MAX) + U256::one()), None);
    }

    #[test]
    fn mul_div_floor_at_u128_max() {
        assert_eq!(mul_div_floor(u128::MAX, u128::MAX, u128::MAX), Some(u128::MAX));
    }

    #[test]
    fn mul_div_floor_with_wide_intermediate() {
        // 1e19 * 1.05e24 overflows u128 before the division.
        let a = 10 * ONE;
        let b = 1_050_000 * ONE;
        let d = 1_000_000 * ONE;
        assert_eq!(mul_div_floor(a, b, d), Some(10_500_000_000_000_000_000));
    }

    #[test]
    fn mul_div_floor_rejects_zero_denominator() {
        assert_eq!(mul_div_floor(1, 1, 0), None);
    }

    #[test]
    fn mul_div_floor_rejects_oversized_quotient() {
        assert_eq!(mul_div_floor(u128::MAX, 2, 1), None);
    }

    #[test]
    fn mul_div_ceil_rounds_up_only_with_remainder() {
        assert_eq!(mul_div_ceil(10, 1, 3), Some(4));
        assert_eq!(mul_div_ceil(9, 1, 3), Some(3));
        assert_eq!(mul_div_floor(10, 1, 3), Some(3));
    }

    #[test]
    fn sqrt_of_product_matches_known_roots() {
        assert_eq!(sqrt_of_product(0, 5), 0);
        assert_eq!(sqrt_of_product(2, 2), 2);
        assert_eq!(sqrt_of_product(1000, 2000), 1414);
        assert_eq!(sqrt_of_product(ONE * 100, ONE * 100), ONE * 100);
    }

    #[test]
    fn sqrt_of_max_product() {
        assert_eq!(sqrt_of_product(u128::MAX, u128::MAX), u128::MAX);
        assert_eq!(sqrt_of_product(u128::MAX, u128::MAX - 1), u128::MAX - 1);
    }

    proptest::proptest! {
        #[test]
        fn mul_div_matches_u128_when_product_fits(
            a in 0u128..=u128::from(u64::MAX),
            b in 0u128..=u128::from(u64::MAX),
            d in 1u128..=u128::from(u64::MAX),
        ) {
            let exact = a * b;
            proptest::prop_assert_eq!(mul_div_floor(a, b, d), Some(exact / d));
            proptest::prop_assert_eq!(mul_div_ceil(a, b, d), Some(exact.div_ceil(d)));
        }

        #[test]
        fn sqrt_of_product_is_floor_root(a in 0u128..=u128::from(u64::MAX), b in 0u128..=u128::from(u64::MAX)) {
            let root = sqrt_of_product(a, b);
            let exact = product(a, b);
            proptest::prop_assert!(product(root, root) <= exact);
            proptest::prop_assert!(product(root + 1, root + 1) > exact);
        }
    }
}
