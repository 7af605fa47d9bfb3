//! Catalogue product record.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::filter::FilterDimension;
use super::id::ProductId;
use super::price::Money;

/// A purchasable product as the catalogue feed describes it.
///
/// Field names follow the feed's JSON (`imageURL` in particular), so the
/// same type decodes the HTTP body and the stored catalogue snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub currency: String,
    #[serde(rename = "imageURL")]
    pub image_url: String,
    /// Stock on hand. Also the upper bound for a cart entry's quantity.
    pub quantity: u32,
    pub gender: String,
    pub color: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Product {
    /// The product's price with its currency.
    #[must_use]
    pub fn money(&self) -> Money {
        Money::new(self.price, self.currency.clone())
    }

    /// The attribute value a string-valued filter dimension compares against.
    ///
    /// Returns `None` for [`FilterDimension::Price`], which matches by range.
    #[must_use]
    pub fn attribute(&self, dimension: FilterDimension) -> Option<&str> {
        match dimension {
            FilterDimension::Gender => Some(&self.gender),
            FilterDimension::Color => Some(&self.color),
            FilterDimension::Type => Some(&self.kind),
            FilterDimension::Price => None,
        }
    }

    /// Whether at least one unit is in stock.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.quantity > 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const FEED_ITEM: &str = r#"{
        "id": 1,
        "imageURL": "https://example.test/polo-tshirts.png",
        "name": "Black Polo",
        "type": "Polo",
        "price": 250,
        "currency": "INR",
        "color": "Black",
        "gender": "Men",
        "quantity": 3
    }"#;

    #[test]
    fn test_decodes_feed_item() {
        let product: Product = serde_json::from_str(FEED_ITEM).unwrap();
        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.kind, "Polo");
        assert_eq!(product.price, Decimal::from(250));
        assert_eq!(product.image_url, "https://example.test/polo-tshirts.png");
        assert_eq!(product.quantity, 3);
    }

    #[test]
    fn test_encodes_feed_field_names() {
        let product: Product = serde_json::from_str(FEED_ITEM).unwrap();
        let json = serde_json::to_value(&product).unwrap();
        assert!(json.get("imageURL").is_some());
        assert!(json.get("type").is_some());
        assert!(json["price"].is_number());
    }

    #[test]
    fn test_attribute_per_dimension() {
        let product: Product = serde_json::from_str(FEED_ITEM).unwrap();
        assert_eq!(product.attribute(FilterDimension::Gender), Some("Men"));
        assert_eq!(product.attribute(FilterDimension::Color), Some("Black"));
        assert_eq!(product.attribute(FilterDimension::Type), Some("Polo"));
        assert_eq!(product.attribute(FilterDimension::Price), None);
    }

    #[test]
    fn test_money_carries_currency() {
        let product: Product = serde_json::from_str(FEED_ITEM).unwrap();
        assert_eq!(product.money().to_string(), "INR 250");
    }
}
