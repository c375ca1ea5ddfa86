//! Money type for representing monetary values.
//!
//! Amounts are integer cents end to end. Catalog and tenant payloads carry
//! decimal numbers, which are converted exactly once at deserialization; all
//! pricing arithmetic then happens on integers and only the display and wire
//! boundaries see decimals again.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Currency symbol used for display.
pub const CURRENCY_SYMBOL: &str = "R$";

/// A monetary value in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money {
    /// Amount in cents.
    pub amount_cents: i64,
}

impl Money {
    /// Create a new Money value from cents.
    pub const fn new(amount_cents: i64) -> Self {
        Self { amount_cents }
    }

    /// Zero.
    pub const fn zero() -> Self {
        Self::new(0)
    }

    /// Create a Money value from a decimal amount, rounding to the nearest cent.
    ///
    /// Returns `None` for NaN, infinities and values outside the `i64` cent range.
    ///
    /// ```
    /// use menuflow_commerce::money::Money;
    /// let price = Money::from_decimal(49.99).unwrap();
    /// assert_eq!(price.amount_cents, 4999);
    /// ```
    pub fn from_decimal(amount: f64) -> Option<Self> {
        if !amount.is_finite() {
            return None;
        }
        let cents = (amount * 100.0).round();
        if cents < i64::MIN as f64 || cents > i64::MAX as f64 {
            return None;
        }
        Some(Self::new(cents as i64))
    }

    /// Parse a user-entered amount such as `"50"`, `"50.5"`, `"50,50"`,
    /// `"R$ 1.250,00"`.
    ///
    /// Accepts at most two fraction digits and no sign. When both separators
    /// appear, the last one is the decimal separator.
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        let trimmed = trimmed
            .strip_prefix(CURRENCY_SYMBOL)
            .unwrap_or(trimmed)
            .trim();
        if trimmed.is_empty() {
            return None;
        }

        let decimal_sep = match (trimmed.rfind(','), trimmed.rfind('.')) {
            (Some(c), Some(d)) => Some(if c > d { ',' } else { '.' }),
            (Some(_), None) => Some(','),
            (None, Some(_)) => Some('.'),
            (None, None) => None,
        };

        let (int_part, frac_part) = match decimal_sep {
            Some(sep) => {
                let idx = trimmed.rfind(sep)?;
                (&trimmed[..idx], &trimmed[idx + 1..])
            }
            None => (trimmed, ""),
        };

        let thousands_sep = match decimal_sep {
            Some(',') => '.',
            _ => ',',
        };
        let int_digits: String = int_part.chars().filter(|c| *c != thousands_sep).collect();

        if int_digits.is_empty() && frac_part.is_empty() {
            return None;
        }
        if !int_digits.chars().all(|c| c.is_ascii_digit())
            || !frac_part.chars().all(|c| c.is_ascii_digit())
            || frac_part.len() > 2
        {
            return None;
        }

        let units: i64 = if int_digits.is_empty() {
            0
        } else {
            int_digits.parse().ok()?
        };
        let cents: i64 = match frac_part.len() {
            0 => 0,
            1 => frac_part.parse::<i64>().ok()? * 10,
            _ => frac_part.parse().ok()?,
        };

        units.checked_mul(100)?.checked_add(cents).map(Self::new)
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.amount_cents == 0
    }

    /// Check if this is positive.
    pub fn is_positive(&self) -> bool {
        self.amount_cents > 0
    }

    /// Check if this is negative.
    pub fn is_negative(&self) -> bool {
        self.amount_cents < 0
    }

    /// Convert to a decimal value.
    pub fn to_decimal(&self) -> f64 {
        self.amount_cents as f64 / 100.0
    }

    /// Format for display (e.g., "R$ 49,99").
    pub fn display(&self) -> String {
        format!("{} {}", CURRENCY_SYMBOL, self.display_amount())
    }

    /// Format without symbol, comma as decimal separator (e.g., "49,99").
    pub fn display_amount(&self) -> String {
        let sign = if self.amount_cents < 0 { "-" } else { "" };
        let abs = self.amount_cents.unsigned_abs();
        format!("{}{},{:02}", sign, abs / 100, abs % 100)
    }

    /// Add another Money value, returning None on overflow.
    pub fn try_add(&self, other: &Money) -> Option<Money> {
        self.amount_cents.checked_add(other.amount_cents).map(Money::new)
    }

    /// Subtract another Money value, returning None on overflow.
    pub fn try_subtract(&self, other: &Money) -> Option<Money> {
        self.amount_cents.checked_sub(other.amount_cents).map(Money::new)
    }

    /// Multiply by a quantity, returning None on overflow.
    pub fn try_multiply(&self, factor: i64) -> Option<Money> {
        self.amount_cents.checked_mul(factor).map(Money::new)
    }

    /// Divide by `divisor`, rounding half away from zero to the cent.
    ///
    /// Returns `None` when `divisor` is zero.
    pub fn divide_rounded(&self, divisor: i64) -> Option<Money> {
        if divisor == 0 {
            return None;
        }
        let quotient = self.amount_cents / divisor;
        let remainder = self.amount_cents % divisor;
        let rounded = if remainder.unsigned_abs() * 2 >= divisor.unsigned_abs() {
            if (self.amount_cents < 0) == (divisor < 0) {
                quotient + 1
            } else {
                quotient - 1
            }
        } else {
            quotient
        };
        Some(Money::new(rounded))
    }

    /// Sum an iterator of Money values, returning None on overflow.
    pub fn try_sum<'a>(mut iter: impl Iterator<Item = &'a Money>) -> Option<Money> {
        iter.try_fold(Money::zero(), |acc, m| acc.try_add(m))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_decimal())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

struct MoneyVisitor;

impl<'de> Visitor<'de> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal amount as a number or numeric string")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        Money::from_decimal(v).ok_or_else(|| E::custom(format!("invalid amount: {}", v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        v.checked_mul(100)
            .map(Money::new)
            .ok_or_else(|| E::custom(format!("amount out of range: {}", v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        i64::try_from(v)
            .ok()
            .and_then(|v| v.checked_mul(100))
            .map(Money::new)
            .ok_or_else(|| E::custom(format!("amount out of range: {}", v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
        let trimmed = v.trim();
        if let Some(rest) = trimmed.strip_prefix('-') {
            return Money::parse(rest)
                .map(|m| Money::new(-m.amount_cents))
                .ok_or_else(|| E::custom(format!("invalid amount: {:?}", v)));
        }
        Money::parse(trimmed).ok_or_else(|| E::custom(format!("invalid amount: {:?}", v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_from_decimal() {
        assert_eq!(Money::from_decimal(49.99).unwrap().amount_cents, 4999);
        assert_eq!(Money::from_decimal(0.1 + 0.2).unwrap().amount_cents, 30);
        assert!(Money::from_decimal(f64::NAN).is_none());
        assert!(Money::from_decimal(f64::INFINITY).is_none());
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::new(4999).display(), "R$ 49,99");
        assert_eq!(Money::new(5).display_amount(), "0,05");
        assert_eq!(Money::new(-150).display_amount(), "-1,50");
    }

    #[test]
    fn test_money_parse_formats() {
        assert_eq!(Money::parse("50"), Some(Money::new(5000)));
        assert_eq!(Money::parse("50.5"), Some(Money::new(5050)));
        assert_eq!(Money::parse("50,50"), Some(Money::new(5050)));
        assert_eq!(Money::parse(" R$ 100,00 "), Some(Money::new(10000)));
        assert_eq!(Money::parse("1.250,75"), Some(Money::new(125075)));
        assert_eq!(Money::parse("1,250.75"), Some(Money::new(125075)));
        assert_eq!(Money::parse(",5"), Some(Money::new(50)));
    }

    #[test]
    fn test_money_parse_rejects_garbage() {
        assert_eq!(Money::parse(""), None);
        assert_eq!(Money::parse("R$"), None);
        assert_eq!(Money::parse("abc"), None);
        assert_eq!(Money::parse("-10"), None);
        assert_eq!(Money::parse("10.555"), None);
        assert_eq!(Money::parse("1 0"), None);
    }

    #[test]
    fn test_divide_rounded() {
        assert_eq!(Money::new(2500).divide_rounded(2), Some(Money::new(1250)));
        assert_eq!(Money::new(1000).divide_rounded(3), Some(Money::new(333)));
        assert_eq!(Money::new(2000).divide_rounded(3), Some(Money::new(667)));
        assert_eq!(Money::new(5).divide_rounded(2), Some(Money::new(3)));
        assert_eq!(Money::new(100).divide_rounded(0), None);
    }

    #[test]
    fn test_checked_arithmetic() {
        let a = Money::new(1000);
        let b = Money::new(250);
        assert_eq!(a.try_add(&b), Some(Money::new(1250)));
        assert_eq!(a.try_subtract(&b), Some(Money::new(750)));
        assert_eq!(b.try_multiply(3), Some(Money::new(750)));
        assert_eq!(Money::new(i64::MAX).try_add(&Money::new(1)), None);
    }

    #[test]
    fn test_try_sum() {
        let values = [Money::new(100), Money::new(250), Money::new(5)];
        assert_eq!(Money::try_sum(values.iter()), Some(Money::new(355)));
        assert_eq!(Money::try_sum([].iter()), Some(Money::zero()));
    }

    #[test]
    fn test_serde_decimal_wire_format() {
        let json = serde_json::to_string(&Money::new(1250)).unwrap();
        assert_eq!(json, "12.5");

        let m: Money = serde_json::from_str("12.5").unwrap();
        assert_eq!(m, Money::new(1250));
        let m: Money = serde_json::from_str("7").unwrap();
        assert_eq!(m, Money::new(700));
        let m: Money = serde_json::from_str("\"3,90\"").unwrap();
        assert_eq!(m, Money::new(390));
        assert!(serde_json::from_str::<Money>("\"cheap\"").is_err());
        assert!(serde_json::from_str::<Money>("null").is_err());
    }
}
