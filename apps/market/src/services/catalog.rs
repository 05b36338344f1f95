//! # Catalog Services
//!
//! Product submission, moderation and browsing.
//!
//! ## Product Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  submit_product ──► ┌─────────┐  approve_product  ┌──────────┐          │
//! │  (seller)           │ Pending │──────────────────►│ Approved │──► shop  │
//! │                     └────┬────┘                   └──────────┘          │
//! │                          │ reject_product(reason)                       │
//! │                          ▼                                              │
//! │                     ┌──────────┐                                        │
//! │                     │ Rejected │  (reason shown to the seller)          │
//! │                     └──────────┘                                        │
//! │                                                                         │
//! │  remove_product: the owning seller, any state                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use ts_rs::TS;
use uuid::Uuid;

use digit_core::catalog::{self, CatalogFilter, NewProduct, TRENDING_LIMIT};
use digit_core::vip::VipRule;
use digit_core::{CoreError, Money, Product};
use digit_db::repository::collection::{position, PRODUCTS};

use crate::error::ApiError;
use crate::services::identity::shops_as_vip;
use crate::state::{Market, Session};

/// A product as shoppers see it. The download file is withheld until
/// purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub image: Option<String>,
    pub seller_id: String,
    pub list_price: Money,
    /// What this shopper pays: the VIP price for VIP buyers.
    pub price: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Listing {
    fn new(product: &Product, rule: &VipRule, is_vip: bool) -> Self {
        Listing {
            id: product.id.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            image: product.image.clone(),
            seller_id: product.seller_id.clone(),
            list_price: product.price(),
            price: rule.display_price(product.price(), is_vip),
            created_at: product.created_at,
        }
    }
}

fn listings(market: &Market, is_vip: bool, products: &[Product]) -> Vec<Listing> {
    let rule = market.config().vip_rule();
    products.iter().map(|p| Listing::new(p, &rule, is_vip)).collect()
}

fn product_index(products: &[Product], product_id: &str) -> Result<usize, ApiError> {
    position(products, product_id).ok_or_else(|| CoreError::not_found("Product", product_id).into())
}

// =============================================================================
// Seller
// =============================================================================

/// Submits a product for moderation.
///
/// ## Errors
/// - `AuthRequired` / `Forbidden`: not a signed-in seller
/// - `InvalidInput`: name, file or image missing, or price ≤ 0
pub async fn submit_product(
    market: &Market,
    session: &Session,
    input: NewProduct,
) -> Result<Product, ApiError> {
    let seller = session.require_user()?;
    debug!(seller_id = %seller.id, name = %input.name, "submit_product");

    let product = catalog::submit(seller, input, Uuid::new_v4().to_string(), Utc::now())?;

    let mut tx = market.db().begin_write().await?;
    let mut products: Vec<Product> = tx.load(&PRODUCTS).await?;
    products.push(product.clone());
    tx.save(&PRODUCTS, &products).await?;
    tx.commit().await?;

    info!(product_id = %product.id, seller_id = %product.seller_id, price = %product.price(), "Product submitted");
    Ok(product)
}

/// Deletes one of the signed-in seller's products.
///
/// Carts still holding the id skip it from then on.
///
/// ## Errors
/// - `NotFound`: no such product
/// - `Forbidden`: the product belongs to someone else
pub async fn remove_product(
    market: &Market,
    session: &Session,
    product_id: &str,
) -> Result<(), ApiError> {
    let requester = session.require_user()?;
    debug!(requester_id = %requester.id, product_id = %product_id, "remove_product");

    let mut tx = market.db().begin_write().await?;
    let mut products: Vec<Product> = tx.load(&PRODUCTS).await?;
    let idx = product_index(&products, product_id)?;

    if let Err(e) = catalog::ensure_owner(&products[idx], &requester.id) {
        warn!(requester_id = %requester.id, product_id = %product_id, "Removal of another seller's product");
        return Err(e.into());
    }

    products.remove(idx);
    tx.save(&PRODUCTS, &products).await?;
    tx.commit().await?;

    info!(product_id = %product_id, "Product removed");
    Ok(())
}

/// The signed-in seller's products in every state, newest first.
pub async fn list_by_seller(market: &Market, session: &Session) -> Result<Vec<Product>, ApiError> {
    let seller = session.require_seller()?;
    debug!(seller_id = %seller.id, "list_by_seller");

    let products = market.db().products().all().await?;
    Ok(catalog::list_by_seller(&products, &seller.id))
}

// =============================================================================
// Admin
// =============================================================================

/// Pending → Approved. Admin only.
///
/// ## Errors
/// - `NotFound`: no such product
/// - `InvalidState`: not pending
pub async fn approve_product(
    market: &Market,
    session: &Session,
    product_id: &str,
) -> Result<Product, ApiError> {
    let admin = session.require_admin()?;
    debug!(admin_id = %admin.id, product_id = %product_id, "approve_product");

    let mut tx = market.db().begin_write().await?;
    let mut products: Vec<Product> = tx.load(&PRODUCTS).await?;
    let idx = product_index(&products, product_id)?;

    catalog::approve(&mut products[idx], Utc::now())?;
    let product = products[idx].clone();
    tx.save(&PRODUCTS, &products).await?;
    tx.commit().await?;

    info!(product_id = %product_id, "Product approved");
    Ok(product)
}

/// Pending → Rejected with a reason. Admin only.
///
/// ## Errors
/// - `InvalidInput`: blank reason
/// - `NotFound` / `InvalidState` as for approval
pub async fn reject_product(
    market: &Market,
    session: &Session,
    product_id: &str,
    reason: &str,
) -> Result<Product, ApiError> {
    let admin = session.require_admin()?;
    debug!(admin_id = %admin.id, product_id = %product_id, "reject_product");

    let mut tx = market.db().begin_write().await?;
    let mut products: Vec<Product> = tx.load(&PRODUCTS).await?;
    let idx = product_index(&products, product_id)?;

    catalog::reject(&mut products[idx], reason)?;
    let product = products[idx].clone();
    tx.save(&PRODUCTS, &products).await?;
    tx.commit().await?;

    info!(product_id = %product_id, "Product rejected");
    Ok(product)
}

/// Products awaiting moderation, oldest first. Admin only.
pub async fn list_pending(market: &Market, session: &Session) -> Result<Vec<Product>, ApiError> {
    session.require_admin()?;
    debug!("list_pending products");

    let products = market.db().products().all().await?;
    Ok(catalog::list_pending(&products))
}

// =============================================================================
// Storefront
// =============================================================================

/// Approved products matching the filter.
pub async fn list_approved(
    market: &Market,
    session: &Session,
    filter: &CatalogFilter,
) -> Result<Vec<Listing>, ApiError> {
    debug!(?filter, "list_approved");

    let products = market.db().products().all().await?;
    let is_vip = shops_as_vip(market, session).await?;
    Ok(listings(market, is_vip, &catalog::list_approved(&products, filter)))
}

/// The newest approved products for the home page.
pub async fn trending(market: &Market, session: &Session) -> Result<Vec<Listing>, ApiError> {
    debug!("trending");

    let products = market.db().products().all().await?;
    let is_vip = shops_as_vip(market, session).await?;
    Ok(listings(market, is_vip, &catalog::trending(&products, TRENDING_LIMIT)))
}

/// One product's detail view.
///
/// Only approved products are visible to shoppers; the owner and admins
/// also see their pending or rejected ones.
pub async fn get_product(
    market: &Market,
    session: &Session,
    product_id: &str,
) -> Result<Listing, ApiError> {
    debug!(product_id = %product_id, "get_product");

    let product = market
        .db()
        .products()
        .get_by_id(product_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", product_id))?;

    let privileged = session
        .user()
        .map_or(false, |u| u.role.can_moderate() || u.id == product.seller_id);
    if !product.is_approved() && !privileged {
        return Err(ApiError::not_found("Product", product_id));
    }

    let rule = market.config().vip_rule();
    let is_vip = shops_as_vip(market, session).await?;
    Ok(Listing::new(&product, &rule, is_vip))
}

// =============================================================================
// Unit Tests
// =============================================================================
