//! # Cart Services
//!
//! Each signed-in user has one cart stored under `dm_cart_<userId>` as a
//! list of product ids. Prices are always read live from the catalog, so a
//! cart never goes stale; products deleted since are skipped.
//!
//! Two tabs writing the same cart resolve as last-write-wins.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use ts_rs::TS;

use digit_core::cart::{Cart, CartLine};
use digit_core::{CoreError, Money, Product, User};
use digit_db::repository::collection::{self, PRODUCTS};

use crate::error::ApiError;
use crate::services::identity::shops_as_vip;
use crate::state::{Market, Session};

/// The cart page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub lines: Vec<CartLine>,
    /// Stored entries, including any whose product has since vanished.
    pub count: usize,
    pub total: Money,
    /// True when the prices include the VIP discount.
    pub vip_discount: bool,
}

fn buyer(session: &Session) -> Result<&User, ApiError> {
    Ok(session.require_user()?)
}

async fn load_cart(market: &Market, user_id: &str) -> Result<Cart, ApiError> {
    Ok(market.db().carts().get(user_id).await?)
}

/// Adds an approved product. Adding a product already in the cart is a
/// no-op and returns `false`.
///
/// ## Errors
/// - `AuthRequired`: not signed in
/// - `NotFound`: no approved product with that id
pub async fn add_to_cart(market: &Market, session: &Session, product_id: &str) -> Result<bool, ApiError> {
    let user = buyer(session)?;
    debug!(user_id = %user.id, product_id = %product_id, "add_to_cart");

    let key = collection::cart(&user.id);
    let mut tx = market.db().begin_write().await?;
    let products: Vec<Product> = tx.load(&PRODUCTS).await?;
    let product = products
        .iter()
        .find(|p| p.id == product_id)
        .ok_or_else(|| CoreError::not_found("Product", product_id))?;

    let mut cart: Cart = tx.load(&key).await?;
    let added = cart.add(product)?;
    if added {
        tx.save(&key, &cart).await?;
        tx.commit().await?;
        info!(user_id = %user.id, product_id = %product_id, items = cart.len(), "Added to cart");
    }

    Ok(added)
}

/// Removes a product. Returns `false` if it wasn't in the cart.
pub async fn remove_from_cart(
    market: &Market,
    session: &Session,
    product_id: &str,
) -> Result<bool, ApiError> {
    let user = buyer(session)?;
    debug!(user_id = %user.id, product_id = %product_id, "remove_from_cart");

    let key = collection::cart(&user.id);
    let mut tx = market.db().begin_write().await?;
    let mut cart: Cart = tx.load(&key).await?;
    let removed = cart.remove(product_id);
    if removed {
        tx.save(&key, &cart).await?;
        tx.commit().await?;
    }

    Ok(removed)
}

pub async fn clear_cart(market: &Market, session: &Session) -> Result<(), ApiError> {
    let user = buyer(session)?;
    debug!(user_id = %user.id, "clear_cart");

    let key = collection::cart(&user.id);
    let mut tx = market.db().begin_write().await?;
    tx.save(&key, &Cart::new()).await?;
    tx.commit().await?;

    info!(user_id = %user.id, "Cart cleared");
    Ok(())
}

/// Sum of live catalog prices, with the per-item VIP reduction when the
/// signed-in user is VIP.
pub async fn cart_total(market: &Market, session: &Session) -> Result<Money, ApiError> {
    Ok(view_cart(market, session).await?.total)
}

/// Number of stored cart entries (the header badge).
pub async fn cart_count(market: &Market, session: &Session) -> Result<usize, ApiError> {
    let user = buyer(session)?;
    Ok(load_cart(market, &user.id).await?.len())
}

/// Live rows of the cart.
pub async fn cart_lines(market: &Market, session: &Session) -> Result<Vec<CartLine>, ApiError> {
    Ok(view_cart(market, session).await?.lines)
}

/// Rows, count and total in one read.
pub async fn view_cart(market: &Market, session: &Session) -> Result<CartView, ApiError> {
    let user = buyer(session)?;
    debug!(user_id = %user.id, "view_cart");

    let cart = load_cart(market, &user.id).await?;
    let products = market.db().products().all().await?;
    let rule = market.config().vip_rule();
    let is_vip = shops_as_vip(market, session).await?;

    let lines = cart.lines(&products, &rule, is_vip);
    let total = lines.iter().map(|line| line.price).sum();

    Ok(CartView {
        lines,
        count: cart.len(),
        total,
        vip_discount: is_vip,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::services::identity::{authenticate, register, Registration};
    use crate::state::MarketConfig;
    use digit_core::Role;
    use digit_db::seed::seed_defaults;
    use digit_db::{Database, DbConfig};

    async fn setup() -> (Market, Session, Vec<Product>) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_defaults(&db).await.unwrap();
        let market = Market::new(db, MarketConfig::default());

        register(
            &market,
            Registration {
                email: "buyer@example.com".into(),
                password: "secret1".into(),
                role: Role::User,
            },
        )
        .await
        .unwrap();
        let mut session = Session::guest();
        authenticate(&market, &mut session, "buyer@example.com", "secret1")
            .await
            .unwrap();

        let products = market.db().products().all().await.unwrap();
        (market, session, products)
    }

    #[tokio::test]
    async fn test_add_is_idempotent() {
        let (market, session, products) = setup().await;

        assert!(add_to_cart(&market, &session, &products[0].id).await.unwrap());
        assert!(!add_to_cart(&market, &session, &products[0].id).await.unwrap());
        assert!(add_to_cart(&market, &session, &products[1].id).await.unwrap());

        assert_eq!(cart_count(&market, &session).await.unwrap(), 2);
        assert_eq!(cart_total(&market, &session).await.unwrap(), Money::from_cents(5000));
    }

    #[tokio::test]
    async fn test_guest_and_unknown_product() {
        let (market, session, _) = setup().await;

        let err = add_to_cart(&market, &Session::guest(), "x").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthRequired);

        let err = add_to_cart(&market, &session, "missing").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let (market, session, products) = setup().await;
        add_to_cart(&market, &session, &products[0].id).await.unwrap();
        add_to_cart(&market, &session, &products[1].id).await.unwrap();

        assert!(remove_from_cart(&market, &session, &products[0].id).await.unwrap());
        assert!(!remove_from_cart(&market, &session, &products[0].id).await.unwrap());

        let lines = cart_lines(&market, &session).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].product_id, products[1].id);

        clear_cart(&market, &session).await.unwrap();
        assert_eq!(cart_count(&market, &session).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_total_uses_live_prices() {
        let (market, session, products) = setup().await;
        add_to_cart(&market, &session, &products[0].id).await.unwrap();

        let mut tx = market.db().begin_write().await.unwrap();
        let mut stored: Vec<Product> = tx.load(&PRODUCTS).await.unwrap();
        stored[0].price_cents = 2000;
        tx.save(&PRODUCTS, &stored).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(cart_total(&market, &session).await.unwrap(), Money::from_cents(2000));
    }
}
