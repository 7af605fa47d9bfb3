//! Search and filter narrowing over a product list.
//!
//! Dimensions combine conjunctively; the checked values within one dimension
//! combine disjunctively. A dimension with nothing checked does not narrow.

use teerex_core::{FilterDimension, FilterSelection, PriceRange, Product};
use tracing::warn;

/// Price tags offered as checkboxes. The last one is open-ended.
pub const PRICE_TAGS: [&str; 3] = ["0-250", "250-450", "450"];

/// Keep the products matching every dimension of `selection`.
///
/// Narrowing runs in [`FilterDimension::ALL`] order. Values no product
/// carries simply match nothing; unparseable price tags are logged and
/// skipped.
#[must_use]
pub fn apply(products: &[Product], selection: &FilterSelection) -> Vec<Product> {
    let mut candidates: Vec<&Product> = products.iter().collect();

    for dimension in FilterDimension::ALL {
        let values = selection.values(dimension);
        if values.is_empty() {
            continue;
        }

        if dimension == FilterDimension::Price {
            let ranges = parse_ranges(values);
            candidates.retain(|product| ranges.iter().any(|range| range.contains(product.price)));
        } else {
            candidates.retain(|product| {
                product
                    .attribute(dimension)
                    .is_some_and(|attr| values.iter().any(|v| v == attr))
            });
        }
    }

    candidates.into_iter().cloned().collect()
}

fn parse_ranges(tags: &[String]) -> Vec<PriceRange> {
    tags.iter()
        .filter_map(|tag| {
            PriceRange::parse(tag)
                .inspect_err(|e| warn!(tag = %tag, error = %e, "Ignoring invalid price tag"))
                .ok()
        })
        .collect()
}

/// Keep the products whose name contains `text`, ignoring case.
///
/// Surrounding whitespace is ignored; empty text matches everything.
#[must_use]
pub fn search(products: &[Product], text: &str) -> Vec<Product> {
    let needle = text.trim().to_lowercase();
    if needle.is_empty() {
        return products.to_vec();
    }

    products
        .iter()
        .filter(|product| product.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// The checkbox values offered for each dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Facets {
    pub gender: Vec<String>,
    pub kind: Vec<String>,
    pub color: Vec<String>,
    pub price: Vec<String>,
}

impl Facets {
    /// Distinct attribute values of `products`, in first-seen order, plus
    /// the fixed price tags.
    #[must_use]
    pub fn from_products(products: &[Product]) -> Self {
        Self {
            gender: distinct(products, FilterDimension::Gender),
            kind: distinct(products, FilterDimension::Type),
            color: distinct(products, FilterDimension::Color),
            price: PRICE_TAGS.iter().map(|tag| (*tag).to_owned()).collect(),
        }
    }

    /// Values for `dimension`.
    #[must_use]
    pub fn values(&self, dimension: FilterDimension) -> &[String] {
        match dimension {
            FilterDimension::Gender => &self.gender,
            FilterDimension::Color => &self.color,
            FilterDimension::Type => &self.kind,
            FilterDimension::Price => &self.price,
        }
    }

    /// `(dimension, values)` pairs in display order: gender, type, color, price.
    pub fn groups(&self) -> impl Iterator<Item = (FilterDimension, &[String])> {
        [
            FilterDimension::Gender,
            FilterDimension::Type,
            FilterDimension::Color,
            FilterDimension::Price,
        ]
        .into_iter()
        .map(|dimension| (dimension, self.values(dimension)))
    }
}

fn distinct(products: &[Product], dimension: FilterDimension) -> Vec<String> {
    let mut values: Vec<String> = Vec::new();
    for value in products.iter().filter_map(|p| p.attribute(dimension)) {
        if !values.iter().any(|v| v == value) {
            values.push(value.to_owned());
        }
    }
    values
}
