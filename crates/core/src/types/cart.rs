//! Cart line item.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Money;
use super::product::Product;

/// One line in the cart: a denormalized copy of the product fields the cart
/// page shows, plus the selected quantity.
///
/// A cart holds at most one entry per [`ProductId`]. `qty` stays within
/// `1..=Product::quantity`; an entry that would drop below 1 is removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    pub id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub currency: String,
    #[serde(rename = "imageURL")]
    pub image_url: String,
    pub qty: u32,
}

impl CartEntry {
    /// Create a fresh entry for `product` with quantity 1.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            currency: product.currency.clone(),
            image_url: product.image_url.clone(),
            qty: 1,
        }
    }

    /// `price * qty`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.qty)
    }

    /// Unit price with currency.
    #[must_use]
    pub fn unit_price(&self) -> Money {
        Money::new(self.price, self.currency.clone())
    }
}
