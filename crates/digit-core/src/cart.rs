//! # Cart
//!
//! A buyer's pending selection: an ordered set of product ids.
//!
//! The cart stores ids only. Names and prices are always read live from the
//! catalog, so a price change is visible in the cart until checkout freezes
//! it (see [`checkout`](crate::checkout)).

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Product;
use crate::vip::VipRule;

/// Ordered product ids without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart(Vec<String>);

/// One cart row as the storefront shows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: String,
    pub name: String,
    pub category: String,
    pub list_price: Money,
    /// Price after the VIP discount, or the list price.
    pub price: Money,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ids(ids: Vec<String>) -> Self {
        let mut cart = Cart::new();
        for id in ids {
            if !cart.contains(&id) {
                cart.0.push(id);
            }
        }
        cart
    }

    /// Adds an approved product. Returns false if it was already present.
    ///
    /// ## Errors
    /// `NotFound` if the product is not an approved catalog entry.
    pub fn add(&mut self, product: &Product) -> CoreResult<bool> {
        if !product.is_approved() {
            return Err(CoreError::not_found("Product", &product.id));
        }
        if self.contains(&product.id) {
            return Ok(false);
        }
        self.0.push(product.id.clone());
        Ok(true)
    }

    /// Returns true if the id was in the cart.
    pub fn remove(&mut self, product_id: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|id| id != product_id);
        self.0.len() != before
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.0.iter().any(|id| id == product_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ids(&self) -> &[String] {
        &self.0
    }

    /// Products still present in the catalog, in cart order.
    ///
    /// Ids whose product has since been deleted are skipped.
    pub fn resolve<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        self.0
            .iter()
            .filter_map(|id| products.iter().find(|p| &p.id == id))
            .collect()
    }

    /// Live cart rows.
    pub fn lines(&self, products: &[Product], rule: &VipRule, vip_discount: bool) -> Vec<CartLine> {
        self.resolve(products)
            .into_iter()
            .map(|p| CartLine {
                product_id: p.id.clone(),
                name: p.name.clone(),
                category: p.category.clone(),
                list_price: p.price(),
                price: rule.display_price(p.price(), vip_discount),
            })
            .collect()
    }

    /// Sum of live prices, with the per-item VIP reduction when requested.
    pub fn total(&self, products: &[Product], rule: &VipRule, vip_discount: bool) -> Money {
        self.lines(products, rule, vip_discount)
            .iter()
            .map(|line| line.price)
            .sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProductStatus;
    use chrono::Utc;

    fn product(id: &str, price_cents: i64, status: ProductStatus) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            description: String::new(),
            price_cents,
            category: "dizayn".to_string(),
            file: "data:text/plain,x".to_string(),
            image: None,
            seller_id: "s1".to_string(),
            status,
            reject_reason: None,
            created_at: Utc::now(),
            approved_at: None,
        }
    }

    #[test]
    fn test_add_is_set_like() {
        let p = product("p1", 1500, ProductStatus::Approved);
        let mut cart = Cart::new();
        assert!(cart.add(&p).unwrap());
        assert!(!cart.add(&p).unwrap());
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_add_rejects_unapproved() {
        let p = product("p1", 1500, ProductStatus::Pending);
        let mut cart = Cart::new();
        assert!(matches!(cart.add(&p), Err(CoreError::NotFound { .. })));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = Cart::from_ids(vec!["a".into(), "b".into(), "a".into()]);
        assert_eq!(cart.ids(), &["a".to_string(), "b".to_string()]);
        assert!(cart.remove("a"));
        assert!(!cart.remove("a"));
        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_total_uses_live_prices_and_skips_vanished() {
        let mut catalog = vec![
            product("web", 1500, ProductStatus::Approved),
            product("logo", 3500, ProductStatus::Approved),
        ];
        let cart = Cart::from_ids(vec!["web".into(), "gone".into(), "logo".into()]);
        let rule = VipRule::default();

        assert_eq!(cart.total(&catalog, &rule, false).cents(), 5000);

        catalog[1].price_cents = 4000;
        assert_eq!(cart.total(&catalog, &rule, false).cents(), 5500);
        assert_eq!(cart.lines(&catalog, &rule, false).len(), 2);
    }

    #[test]
    fn test_vip_discount_per_item() {
        let catalog = vec![
            product("web", 1500, ProductStatus::Approved),
            product("logo", 3500, ProductStatus::Approved),
        ];
        let cart = Cart::from_ids(vec!["web".into(), "logo".into()]);
        let rule = VipRule::default();

        // 13.50 + 31.50
        assert_eq!(cart.total(&catalog, &rule, true).cents(), 4500);

        let lines = cart.lines(&catalog, &rule, true);
        assert_eq!(lines[0].list_price.cents(), 1500);
        assert_eq!(lines[0].price.cents(), 1350);
    }

    #[test]
    fn test_serializes_as_plain_id_list() {
        let cart = Cart::from_ids(vec!["a".into(), "b".into()]);
        assert_eq!(serde_json::to_string(&cart).unwrap(), r#"["a","b"]"#);
    }
}
