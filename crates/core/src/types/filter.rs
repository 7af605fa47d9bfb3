//! Filter dimensions and the checked values per dimension.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// A product attribute the catalogue can be narrowed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterDimension {
    Gender,
    Color,
    Type,
    /// Matches by range tags (`"min-max"`) rather than exact values.
    Price,
}

impl FilterDimension {
    /// All dimensions, in the order narrowing is applied.
    pub const ALL: [Self; 4] = [Self::Gender, Self::Color, Self::Type, Self::Price];

    /// Key used in the stored selection object.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gender => "gender",
            Self::Color => "color",
            Self::Type => "type",
            Self::Price => "price",
        }
    }

    /// Heading shown above the dimension's checkboxes.
    #[must_use]
    pub const fn heading(self) -> &'static str {
        match self {
            Self::Gender => "Gender",
            Self::Color => "Color",
            Self::Type => "Type",
            Self::Price => "Price Range",
        }
    }
}

impl fmt::Display for FilterDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no filter dimension.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown filter dimension: {0}")]
pub struct ParseDimensionError(pub String);

impl FromStr for FilterDimension {
    type Err = ParseDimensionError;

    /// Accepts both keys (`gender`) and headings (`Price Range`), ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gender" => Ok(Self::Gender),
            "color" | "colour" => Ok(Self::Color),
            "type" => Ok(Self::Type),
            "price" | "price range" => Ok(Self::Price),
            _ => Err(ParseDimensionError(s.to_owned())),
        }
    }
}

/// The currently checked values for every filter dimension.
///
/// An empty list means "no filtering on this dimension". Keys missing from
/// stored JSON decode as empty lists, so older or partial selections load
/// cleanly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSelection {
    pub gender: Vec<String>,
    pub color: Vec<String>,
    #[serde(rename = "type")]
    pub kind: Vec<String>,
    /// Range tags such as `"0-250"` or `"450"`.
    pub price: Vec<String>,
}

impl FilterSelection {
    /// Selected values for `dimension`.
    #[must_use]
    pub fn values(&self, dimension: FilterDimension) -> &[String] {
        match dimension {
            FilterDimension::Gender => &self.gender,
            FilterDimension::Color => &self.color,
            FilterDimension::Type => &self.kind,
            FilterDimension::Price => &self.price,
        }
    }

    fn values_mut(&mut self, dimension: FilterDimension) -> &mut Vec<String> {
        match dimension {
            FilterDimension::Gender => &mut self.gender,
            FilterDimension::Color => &mut self.color,
            FilterDimension::Type => &mut self.kind,
            FilterDimension::Price => &mut self.price,
        }
    }

    /// Check `value` if unchecked, uncheck it if checked.
    ///
    /// Returns `true` when the value is checked afterwards.
    pub fn toggle(&mut self, dimension: FilterDimension, value: &str) -> bool {
        let values = self.values_mut(dimension);
        if let Some(pos) = values.iter().position(|v| v == value) {
            values.remove(pos);
            false
        } else {
            values.push(value.to_owned());
            true
        }
    }

    /// Whether `value` is currently checked for `dimension`.
    #[must_use]
    pub fn is_checked(&self, dimension: FilterDimension, value: &str) -> bool {
        self.values(dimension).iter().any(|v| v == value)
    }

    /// Whether no dimension has a checked value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        FilterDimension::ALL
            .iter()
            .all(|d| self.values(*d).is_empty())
    }
}
