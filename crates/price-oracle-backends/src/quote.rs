// Copyright 2022 Webb Technologies Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::str::FromStr;

use ethers::types::U256;
use oracle_relayer_utils::{Error, Result};

/// The largest scale a quote can be converted at, `10^78` does not fit a `uint256`.
pub const MAX_PRICE_SCALE: u32 = 77;

/// A price as quoted by a price source: a plain decimal string such as `"1234.56"`.
///
/// The shape is checked on construction, digits with at most one decimal point and
/// at least one digit. No sign, exponent, or whitespace is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PriceQuote(String);

impl PriceQuote {
    /// The quote as it came from the source.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts the quote into the fixed-point integer stored on-chain,
    /// `round_half_up(quote * 10^scale)`.
    ///
    /// Computed digit by digit on [`U256`], so no precision is lost on the way.
    /// Digits beyond `scale` are rounded half up. Fails if the result does not
    /// fit a `uint256`.
    ///
    /// ```
    /// # use oracle_price_oracle_backends::PriceQuote;
    /// let quote: PriceQuote = "1234.56".parse()?;
    /// assert_eq!(quote.to_fixed_point(10)?, 12_345_600_000_000u64.into());
    /// # Ok::<(), oracle_relayer_utils::Error>(())
    /// ```
    pub fn to_fixed_point(&self, scale: u32) -> Result<U256> {
        if scale > MAX_PRICE_SCALE {
            return Err(Error::source_unavailable(format!(
                "price scale {scale} is above {MAX_PRICE_SCALE}"
            )));
        }
        let (int_part, frac_part) = self.parts();
        let scale = scale as usize;
        let (kept, dropped) = if frac_part.len() > scale {
            frac_part.split_at(scale)
        } else {
            (frac_part, "")
        };
        let padding = scale - kept.len();
        let ten = U256::from(10u8);
        let overflow =
            || Error::source_unavailable(format!("quote {} overflows uint256", self.0));

        let mut value = U256::zero();
        let digits = int_part
            .bytes()
            .chain(kept.bytes())
            .chain(std::iter::repeat(b'0').take(padding));
        for digit in digits {
            value = value
                .checked_mul(ten)
                .and_then(|v| v.checked_add(U256::from(digit - b'0')))
                .ok_or_else(overflow)?;
        }
        let round_up = dropped.bytes().next().map_or(false, |d| d >= b'5');
        if round_up {
            value = value.checked_add(U256::one()).ok_or_else(overflow)?;
        }
        Ok(value)
    }

    fn parts(&self) -> (&str, &str) {
        self.0.split_once('.').unwrap_or((self.0.as_str(), ""))
    }
}

impl FromStr for PriceQuote {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let malformed =
            || Error::source_unavailable(format!("malformed price quote {s:?}"));
        let (int_part, frac_part) = s.split_once('.').unwrap_or((s, ""));
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(malformed());
        }
        if !all_digits(int_part) || !all_digits(frac_part) {
            return Err(malformed());
        }
        Ok(Self(s.to_owned()))
    }
}

impl std::fmt::Display for PriceQuote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(quote: &str, scale: u32) -> U256 {
        quote.parse::<PriceQuote>().unwrap().to_fixed_point(scale).unwrap()
    }

    #[test]
    fn converts_two_decimals() {
        assert_eq!(fixed("1234.56", 10), U256::from(12_345_600_000_000u64));
        assert_eq!(
            fixed("1234.56", 10),
            U256::from(123_456u64) * U256::exp10(8)
        );
    }

    #[test]
    fn trailing_zeros_do_not_change_the_value() {
        // the ticker quotes with 8 decimals.
        assert_eq!(fixed("1234.56000000", 10), fixed("1234.56", 10));
    }

    #[test]
    fn integers_and_partial_forms() {
        assert_eq!(fixed("12", 10), U256::from(12u64) * U256::exp10(10));
        assert_eq!(fixed("12.", 10), U256::from(12u64) * U256::exp10(10));
        assert_eq!(fixed(".5", 10), U256::from(5u64) * U256::exp10(9));
        assert_eq!(fixed("0", 10), U256::zero());
        assert_eq!(fixed("0007.25", 2), U256::from(725u64));
    }

    #[test]
    fn rounds_half_up_beyond_the_scale() {
        assert_eq!(fixed("0.123456789049", 10), U256::from(1_234_567_890u64));
        assert_eq!(fixed("0.123456789050", 10), U256::from(1_234_567_891u64));
        assert_eq!(fixed("2.5", 0), U256::from(3u64));
        assert_eq!(fixed("2.4999", 0), U256::from(2u64));
    }

    #[test]
    fn large_quotes_stay_exact() {
        // well past the 53 bits an f64 can hold exactly.
        let quote = "123456789012345678901234567890.123456789";
        let expected =
            U256::from_dec_str("1234567890123456789012345678901234567890")
                .unwrap();
        assert_eq!(fixed(quote, 10), expected);
    }

    #[test]
    fn rejects_malformed_quotes() {
        for bad in ["", ".", "-1", "+1", "1.2.3", "1e5", " 1", "1,5", "abc"] {
            let result = bad.parse::<PriceQuote>();
            assert!(
                matches!(result, Err(Error::SourceUnavailable { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn oversized_scales_are_rejected_even_for_zero() {
        let zero: PriceQuote = "0".parse().unwrap();
        assert_eq!(zero.to_fixed_point(MAX_PRICE_SCALE).unwrap(), U256::zero());
        assert!(matches!(
            zero.to_fixed_point(u32::MAX),
            Err(Error::SourceUnavailable { .. })
        ));
    }

    #[test]
    fn overflow_is_an_error() {
        let quote: PriceQuote = "9".repeat(78).parse().unwrap();
        assert!(matches!(
            quote.to_fixed_point(10),
            Err(Error::SourceUnavailable { .. })
        ));
    }
}
