//! Money amounts and price range tags.
//!
//! Prices use decimal arithmetic so cart totals never pick up float drift.
//! The catalogue feed encodes prices as plain JSON numbers, so serialization
//! goes through `rust_decimal::serde::float` rather than the string default.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An amount with its currency code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Amount in the currency's standard unit (e.g., rupees, not paise).
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Currency code as the catalogue reports it (e.g., "INR").
    pub currency: String,
}

impl Money {
    /// Create a new amount.
    #[must_use]
    pub fn new(amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.currency, self.amount.normalize())
    }
}

/// Errors that can occur when parsing a [`PriceRange`] tag.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceRangeError {
    /// The tag is empty.
    #[error("price range cannot be empty")]
    Empty,
    /// A bound is not a number.
    #[error("invalid price bound: {0}")]
    InvalidBound(String),
    /// The lower bound exceeds the upper bound.
    #[error("price range min {min} exceeds max {max}")]
    Inverted {
        /// Lower bound.
        min: Decimal,
        /// Upper bound.
        max: Decimal,
    },
}

/// An inclusive price range parsed from a filter tag.
///
/// ## Tag format
///
/// - `"min-max"` - both bounds inclusive
/// - `"min"` - open-ended, matches every price `>= min`
///
/// ## Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use teerex_core::PriceRange;
///
/// let range: PriceRange = "0-250".parse().unwrap();
/// assert!(range.contains(Decimal::from(250)));
/// assert!(!range.contains(Decimal::from(251)));
///
/// let open: PriceRange = "450".parse().unwrap();
/// assert!(open.contains(Decimal::from(10_000)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceRange {
    min: Decimal,
    max: Option<Decimal>,
}

impl PriceRange {
    /// Create a range. `max = None` means unbounded above.
    #[must_use]
    pub const fn new(min: Decimal, max: Option<Decimal>) -> Self {
        Self { min, max }
    }

    /// Parse a range tag.
    ///
    /// # Errors
    ///
    /// Returns an error if the tag is empty, a bound is not a decimal number,
    /// or `min > max`.
    pub fn parse(tag: &str) -> Result<Self, PriceRangeError> {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(PriceRangeError::Empty);
        }

        let (min, max) = match tag.split_once('-') {
            Some((min, max)) => (min.trim(), Some(max.trim())),
            None => (tag, None),
        };

        let min = parse_bound(min)?;
        let max = match max {
            // "450-" reads the same as "450"
            Some("") | None => None,
            Some(max) => Some(parse_bound(max)?),
        };

        if let Some(max) = max
            && min > max
        {
            return Err(PriceRangeError::Inverted { min, max });
        }

        Ok(Self { min, max })
    }

    /// Lower bound (inclusive).
    #[must_use]
    pub const fn min(&self) -> Decimal {
        self.min
    }

    /// Upper bound (inclusive), if any.
    #[must_use]
    pub const fn max(&self) -> Option<Decimal> {
        self.max
    }

    /// Whether `price` lies within this range, bounds inclusive.
    #[must_use]
    pub fn contains(&self, price: Decimal) -> bool {
        price >= self.min && self.max.is_none_or(|max| price <= max)
    }
}

fn parse_bound(s: &str) -> Result<Decimal, PriceRangeError> {
    Decimal::from_str(s).map_err(|_| PriceRangeError::InvalidBound(s.to_owned()))
}

impl FromStr for PriceRange {
    type Err = PriceRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{}-{}", self.min, max),
            None => write!(f, "{}", self.min),
        }
    }
}
