//! # Catalog
//!
//! Product submission, moderation and storefront filtering.
//!
//! ## Product Lifecycle
//! ```text
//!   seller submits          admin approves
//!  ───────────────► Pending ───────────────► Approved (visible, buyable)
//!                      │
//!                      │ admin rejects (reason required)
//!                      ▼
//!                   Rejected (seller sees the reason)
//! ```
//!
//! Approved and Rejected are terminal. Only the owning seller may remove a
//! product, in any state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Product, ProductStatus, User};
use crate::validation::{require, require_present, validate_positive_amount};

/// Products shown in the "trending" strip.
pub const TRENDING_LIMIT: usize = 3;

// =============================================================================
// Submission
// =============================================================================

/// Fields of the seller's "add product" form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price_cents: i64,
    #[serde(default)]
    pub category: String,
    pub file: String,
    pub image: Option<String>,
}

/// Builds a pending product from a seller's submission.
///
/// ## Errors
/// - `Forbidden` if the submitter is not a seller
/// - `InvalidInput` if name, file or image is missing, or price ≤ 0
pub fn submit(seller: &User, input: NewProduct, id: String, now: DateTime<Utc>) -> CoreResult<Product> {
    if !seller.role.can_sell() {
        return Err(CoreError::forbidden("only sellers can add products"));
    }

    let name = require("name", &input.name)?.to_string();
    let file = require("file", &input.file)?.to_string();
    let price = validate_positive_amount("price", Money::from_cents(input.price_cents))?;
    let image = require_present("image", input.image.as_deref())?.to_string();

    Ok(Product {
        id,
        name,
        description: input.description.trim().to_string(),
        price_cents: price.cents(),
        category: input.category.trim().to_string(),
        file,
        image: Some(image),
        seller_id: seller.id.clone(),
        status: ProductStatus::Pending,
        reject_reason: None,
        created_at: now,
        approved_at: None,
    })
}

// =============================================================================
// Moderation
// =============================================================================

fn ensure_pending(product: &Product, action: &str) -> CoreResult<()> {
    if product.status != ProductStatus::Pending {
        return Err(CoreError::invalid_state(
            "Product",
            &product.id,
            product.status.as_str(),
            action,
        ));
    }
    Ok(())
}

/// Pending → Approved.
pub fn approve(product: &mut Product, now: DateTime<Utc>) -> CoreResult<()> {
    ensure_pending(product, "approve")?;
    product.status = ProductStatus::Approved;
    product.approved_at = Some(now);
    Ok(())
}

/// Pending → Rejected, keeping the reason for the seller.
pub fn reject(product: &mut Product, reason: &str) -> CoreResult<()> {
    let reason = require("reason", reason)?.to_string();
    ensure_pending(product, "reject")?;
    product.status = ProductStatus::Rejected;
    product.reject_reason = Some(reason);
    Ok(())
}

/// Only the owning seller may delete a product.
pub fn ensure_owner(product: &Product, requester_id: &str) -> CoreResult<()> {
    if product.seller_id != requester_id {
        return Err(CoreError::forbidden("only the owning seller can remove this product"));
    }
    Ok(())
}

// =============================================================================
// Filtering
// =============================================================================

/// Storefront price ranges. Bounds are in whole manat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PriceBucket {
    /// price ≤ 5.00
    #[serde(rename = "0-5")]
    UpTo5,
    /// 5.00 < price ≤ 15.00
    #[serde(rename = "5-15")]
    From5To15,
    /// 15.00 < price ≤ 50.00
    #[serde(rename = "15-50")]
    From15To50,
    /// price > 50.00
    #[serde(rename = "50+")]
    Over50,
}

impl PriceBucket {
    pub fn contains(&self, price: Money) -> bool {
        let cents = price.cents();
        match self {
            PriceBucket::UpTo5 => cents <= 500,
            PriceBucket::From5To15 => cents > 500 && cents <= 1500,
            PriceBucket::From15To50 => cents > 1500 && cents <= 5000,
            PriceBucket::Over50 => cents > 5000,
        }
    }
}

impl FromStr for PriceBucket {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0-5" => Ok(PriceBucket::UpTo5),
            "5-15" => Ok(PriceBucket::From5To15),
            "15-50" => Ok(PriceBucket::From15To50),
            "50+" => Ok(PriceBucket::Over50),
            _ => Err(ValidationError::NotAllowed {
                field: "price".to_string(),
                allowed: ["0-5", "5-15", "15-50", "50+"].map(String::from).to_vec(),
            }),
        }
    }
}

/// Catalog search form. Empty fields match everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CatalogFilter {
    /// Case-insensitive substring over name, description and category.
    pub query: Option<String>,
    /// Exact category match.
    pub category: Option<String>,
    pub price: Option<PriceBucket>,
}

impl CatalogFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(query) = self.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let needle = query.to_lowercase();
            let haystack = [
                product.name.as_str(),
                product.description.as_str(),
                product.category.as_str(),
            ]
            .join(" ")
            .to_lowercase();
            if !haystack.contains(&needle) {
                return false;
            }
        }

        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            if product.category != category {
                return false;
            }
        }

        self.price.map_or(true, |bucket| bucket.contains(product.price()))
    }
}

/// Approved products matching the filter, in stored order.
pub fn list_approved(products: &[Product], filter: &CatalogFilter) -> Vec<Product> {
    products
        .iter()
        .filter(|p| p.is_approved() && filter.matches(p))
        .cloned()
        .collect()
}

/// Newest approved products.
pub fn trending(products: &[Product], limit: usize) -> Vec<Product> {
    let mut approved: Vec<Product> = products.iter().filter(|p| p.is_approved()).cloned().collect();
    approved.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    approved.truncate(limit);
    approved
}

/// Products awaiting moderation, oldest first.
pub fn list_pending(products: &[Product]) -> Vec<Product> {
    let mut pending: Vec<Product> = products
        .iter()
        .filter(|p| p.status == ProductStatus::Pending)
        .cloned()
        .collect();
    pending.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    pending
}

/// A seller's own products in any state, newest first.
pub fn list_by_seller(products: &[Product], seller_id: &str) -> Vec<Product> {
    let mut mine: Vec<Product> = products
        .iter()
        .filter(|p| p.seller_id == seller_id)
        .cloned()
        .collect();
    mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    mine
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 10, 9, 0, 0).unwrap()
    }

    fn seller() -> User {
        User {
            id: "s1".to_string(),
            email: "s@example.com".to_string(),
            password: "x".to_string(),
            role: Role::Seller,
            seller_approved: true,
            is_vip: false,
            created_at: now(),
        }
    }

    fn form(name: &str, price_cents: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: "Demo".to_string(),
            price_cents,
            category: "dizayn".to_string(),
            file: "https://files.example/logo.zip".to_string(),
            image: Some("data:image/png;base64,AA".to_string()),
        }
    }

    fn product(id: &str, status: ProductStatus, price_cents: i64, minutes: i64) -> Product {
        let mut p = submit(&seller(), form(id, price_cents), id.to_string(), now()).unwrap();
        p.created_at = now() + Duration::minutes(minutes);
        p.status = status;
        p
    }

    #[test]
    fn test_submit_creates_pending() {
        let p = submit(&seller(), form("Logo", 3500), "p1".into(), now()).unwrap();
        assert_eq!(p.status, ProductStatus::Pending);
        assert_eq!(p.seller_id, "s1");
        assert_eq!(p.price().cents(), 3500);
        assert!(p.approved_at.is_none());
    }

    #[test]
    fn test_submit_validation() {
        let s = seller();
        assert!(matches!(
            submit(&s, form("", 100), "p".into(), now()),
            Err(CoreError::InvalidInput(_))
        ));
        assert!(matches!(
            submit(&s, form("X", 0), "p".into(), now()),
            Err(CoreError::InvalidInput(ValidationError::MustBePositive { .. }))
        ));

        let mut no_image = form("X", 100);
        no_image.image = None;
        assert!(submit(&s, no_image, "p".into(), now()).is_err());

        let mut no_file = form("X", 100);
        no_file.file = "  ".to_string();
        assert!(submit(&s, no_file, "p".into(), now()).is_err());
    }

    #[test]
    fn test_submit_requires_seller() {
        let mut buyer = seller();
        buyer.role = Role::User;
        assert!(matches!(
            submit(&buyer, form("X", 100), "p".into(), now()),
            Err(CoreError::Forbidden { .. })
        ));
    }

    #[test]
    fn test_approve_twice_fails() {
        let mut p = product("p1", ProductStatus::Pending, 100, 0);
        approve(&mut p, now()).unwrap();
        assert_eq!(p.status, ProductStatus::Approved);
        assert_eq!(p.approved_at, Some(now()));

        let err = approve(&mut p, now()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidState { .. }));
    }

    #[test]
    fn test_reject_needs_reason_and_pending() {
        let mut p = product("p1", ProductStatus::Pending, 100, 0);
        assert!(matches!(reject(&mut p, " "), Err(CoreError::InvalidInput(_))));
        assert_eq!(p.status, ProductStatus::Pending);

        reject(&mut p, "Blurry image").unwrap();
        assert_eq!(p.status, ProductStatus::Rejected);
        assert_eq!(p.reject_reason.as_deref(), Some("Blurry image"));

        assert!(matches!(
            reject(&mut p, "again"),
            Err(CoreError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_ensure_owner() {
        let p = product("p1", ProductStatus::Approved, 100, 0);
        assert!(ensure_owner(&p, "s1").is_ok());
        assert!(matches!(ensure_owner(&p, "s2"), Err(CoreError::Forbidden { .. })));
    }

    #[test]
    fn test_price_buckets() {
        assert!(PriceBucket::UpTo5.contains(Money::from_cents(500)));
        assert!(!PriceBucket::From5To15.contains(Money::from_cents(500)));
        assert!(PriceBucket::From5To15.contains(Money::from_cents(1500)));
        assert!(PriceBucket::From15To50.contains(Money::from_cents(3500)));
        assert!(PriceBucket::Over50.contains(Money::from_cents(5001)));
        assert_eq!("15-50".parse::<PriceBucket>().unwrap(), PriceBucket::From15To50);
        assert!("100+".parse::<PriceBucket>().is_err());
    }

    #[test]
    fn test_list_approved_filters() {
        let mut web = product("web", ProductStatus::Approved, 1500, 0);
        web.name = "E-kitab: Web Dizayn Əsasları".to_string();
        web.category = "e-kitab".to_string();
        let logo = product("logo", ProductStatus::Approved, 3500, 1);
        let hidden = product("hidden", ProductStatus::Pending, 3500, 2);
        let all = vec![web, logo, hidden];

        assert_eq!(list_approved(&all, &CatalogFilter::default()).len(), 2);

        let by_text = CatalogFilter {
            query: Some("WEB dizayn".to_string()),
            ..Default::default()
        };
        let found = list_approved(&all, &by_text);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "web");

        let by_category = CatalogFilter {
            category: Some("dizayn".to_string()),
            ..Default::default()
        };
        assert_eq!(list_approved(&all, &by_category)[0].id, "logo");

        let by_price = CatalogFilter {
            price: Some(PriceBucket::From5To15),
            ..Default::default()
        };
        assert_eq!(list_approved(&all, &by_price)[0].id, "web");
    }

    #[test]
    fn test_trending_and_seller_listing() {
        let all = vec![
            product("a", ProductStatus::Approved, 100, 0),
            product("b", ProductStatus::Approved, 100, 3),
            product("c", ProductStatus::Pending, 100, 5),
            product("d", ProductStatus::Approved, 100, 2),
            product("e", ProductStatus::Approved, 100, 1),
        ];

        let ids: Vec<String> = trending(&all, TRENDING_LIMIT).into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["b", "d", "e"]);

        let ids: Vec<String> = list_by_seller(&all, "s1").into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["c", "b", "d", "e", "a"]);

        assert_eq!(list_pending(&all).len(), 1);
    }
}
