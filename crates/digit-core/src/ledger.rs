//! # Revenue Ledger
//!
//! Aggregation over completed orders and approved withdrawals.
//!
//! ## Sources of Truth
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Orders (immutable) ──┬──► platform totals  (total / 15% / 85%)        │
//! │                        ├──► seller gross     (items with seller_id)     │
//! │                        └──► monthly chart    (by completion month)      │
//! │                                                                         │
//! │   seller balance = 85% × seller gross − approved withdrawals            │
//! │                                                                         │
//! │   RevenueStats (dm_stats) is a running cache of the platform totals.    │
//! │   rebuild_stats() recomputes it; reconcile() reports any drift.         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Order, Product, ProductStatus, RevenueStats, Role, User, Withdrawal, WithdrawalStatus};
use crate::withdrawal::total_with_status;

// =============================================================================
// Platform Totals
// =============================================================================

/// Adds one completed order to the running totals.
pub fn record_sale(stats: &mut RevenueStats, total: Money, commission_bps: u32) {
    let split = total.split_commission(commission_bps);
    stats.total_revenue_cents += total.cents();
    stats.company_revenue_cents += split.company.cents();
    stats.seller_revenue_cents += split.seller.cents();
    stats.total_orders += 1;
}

/// Accounts counted in `total_users`: buyers and sellers, never admins.
pub fn counted_users(users: &[User]) -> usize {
    users.iter().filter(|u| u.role != Role::Admin).count()
}

/// Recomputes the stats cache from the orders collection.
pub fn rebuild_stats(
    orders: &[Order],
    total_products: usize,
    total_users: usize,
    commission_bps: u32,
) -> RevenueStats {
    let mut stats = RevenueStats {
        total_products: total_products as u64,
        total_users: total_users as u64,
        ..RevenueStats::default()
    };
    for order in orders {
        record_sale(&mut stats, order.total(), commission_bps);
    }
    stats
}

/// Outcome of comparing the stats cache with the orders it summarises.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Reconciliation {
    pub cached: RevenueStats,
    pub rebuilt: RevenueStats,
    /// Revenue or order count differed.
    pub drifted: bool,
}

/// Compares the order-derived figures. Product and user counts are
/// informational and ignored.
pub fn reconcile(cached: RevenueStats, rebuilt: RevenueStats) -> Reconciliation {
    let drifted = cached.total_revenue_cents != rebuilt.total_revenue_cents
        || cached.company_revenue_cents != rebuilt.company_revenue_cents
        || cached.seller_revenue_cents != rebuilt.seller_revenue_cents
        || cached.total_orders != rebuilt.total_orders;

    Reconciliation {
        cached,
        rebuilt,
        drifted,
    }
}

// =============================================================================
// Seller Accounting
// =============================================================================

/// Sum of item prices attributed to the seller across all orders.
pub fn seller_gross(orders: &[Order], seller_id: &str) -> Money {
    orders.iter().map(|o| o.seller_gross(seller_id)).sum()
}

/// Number of sold items attributed to the seller.
pub fn seller_items_sold(orders: &[Order], seller_id: &str) -> usize {
    orders
        .iter()
        .flat_map(|o| o.items.iter())
        .filter(|item| item.seller_id == seller_id)
        .count()
}

/// Seller share of sales minus approved withdrawals.
pub fn seller_balance(
    orders: &[Order],
    withdrawals: &[Withdrawal],
    seller_id: &str,
    commission_bps: u32,
) -> Money {
    let earned = seller_gross(orders, seller_id).split_commission(commission_bps).seller;
    earned - total_with_status(withdrawals, seller_id, WithdrawalStatus::Approved)
}

/// Balance still free for a new request: pending requests are reserved.
pub fn withdrawable(
    orders: &[Order],
    withdrawals: &[Withdrawal],
    seller_id: &str,
    commission_bps: u32,
) -> Money {
    seller_balance(orders, withdrawals, seller_id, commission_bps)
        - total_with_status(withdrawals, seller_id, WithdrawalStatus::Pending)
}

/// Figures for the seller dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SellerStats {
    pub gross_sales: Money,
    pub items_sold: usize,
    pub product_count: usize,
    /// Platform share of the seller's sales.
    pub commission: Money,
    pub balance: Money,
    /// Balance minus pending requests.
    pub withdrawable: Money,
    pub approved: bool,
}

pub fn seller_stats(
    seller: &User,
    orders: &[Order],
    products: &[Product],
    withdrawals: &[Withdrawal],
    commission_bps: u32,
) -> SellerStats {
    let gross_sales = seller_gross(orders, &seller.id);
    let split = gross_sales.split_commission(commission_bps);

    SellerStats {
        gross_sales,
        items_sold: seller_items_sold(orders, &seller.id),
        product_count: products.iter().filter(|p| p.seller_id == seller.id).count(),
        commission: split.company,
        balance: seller_balance(orders, withdrawals, &seller.id, commission_bps),
        withdrawable: withdrawable(orders, withdrawals, &seller.id, commission_bps),
        approved: seller.seller_approved,
    }
}

// =============================================================================
// Monthly Breakdown
// =============================================================================

/// One bar of a revenue chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyAmount {
    /// `YYYY-MM` of the completion date.
    pub month: String,
    pub amount: Money,
}

/// Groups orders by completion month and keeps the latest `months` that
/// have any amount, oldest first.
///
/// `amount_of` picks what each order contributes; orders contributing
/// nothing do not create a month.
pub fn monthly_breakdown<F>(orders: &[Order], months: usize, amount_of: F) -> Vec<MonthlyAmount>
where
    F: Fn(&Order) -> Option<Money>,
{
    let mut by_month: BTreeMap<String, Money> = BTreeMap::new();
    for order in orders {
        if let Some(amount) = amount_of(order) {
            *by_month.entry(order.completed_at.format("%Y-%m").to_string()).or_default() += amount;
        }
    }

    let skip = by_month.len().saturating_sub(months);
    by_month
        .into_iter()
        .skip(skip)
        .map(|(month, amount)| MonthlyAmount { month, amount })
        .collect()
}

/// Platform chart: order totals per month.
pub fn platform_chart(orders: &[Order], months: usize) -> Vec<MonthlyAmount> {
    monthly_breakdown(orders, months, |o| Some(o.total()))
}

/// Seller chart: the seller's share of their items per month.
pub fn seller_chart(orders: &[Order], seller_id: &str, months: usize, commission_bps: u32) -> Vec<MonthlyAmount> {
    monthly_breakdown(orders, months, |o| {
        let gross = o.seller_gross(seller_id);
        o.items
            .iter()
            .any(|item| item.seller_id == seller_id)
            .then(|| gross.split_commission(commission_bps).seller)
    })
}

// =============================================================================
// Public Figures
// =============================================================================

/// Counters shown on the "about" page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AboutStats {
    pub approved_products: usize,
    pub approved_sellers: usize,
    pub completed_orders: usize,
}

pub fn about_stats(products: &[Product], users: &[User], orders: &[Order]) -> AboutStats {
    AboutStats {
        approved_products: products
            .iter()
            .filter(|p| p.status == ProductStatus::Approved)
            .count(),
        approved_sellers: users
            .iter()
            .filter(|u| u.role == Role::Seller && u.seller_approved)
            .count(),
        completed_orders: orders.len(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OrderItem, OrderStatus};
    use crate::COMMISSION_BPS;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(month: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, month, 15, 12, 0, 0).unwrap()
    }

    fn item(seller: &str, cents: i64) -> OrderItem {
        OrderItem {
            product_id: format!("{}-{}", seller, cents),
            name: "Item".to_string(),
            list_price_cents: cents,
            price_cents: cents,
            file: "data:text/plain,x".to_string(),
            seller_id: seller.to_string(),
        }
    }

    fn order(id: &str, items: Vec<OrderItem>, month: u32) -> Order {
        let total_cents = items.iter().map(|i| i.price_cents).sum();
        Order {
            id: id.to_string(),
            user_id: "buyer".to_string(),
            items,
            total_cents,
            status: OrderStatus::Completed,
            receipt_data: String::new(),
            receipt_file_name: "r.png".to_string(),
            created_at: at(month),
            submitted_at: at(month),
            confirmed_at: at(month),
            completed_at: at(month),
        }
    }

    fn withdrawal(id: &str, seller: &str, cents: i64, status: WithdrawalStatus) -> Withdrawal {
        Withdrawal {
            id: id.to_string(),
            seller_id: seller.to_string(),
            name: "Payee".to_string(),
            card: "4169".to_string(),
            phone: "+994501234567".to_string(),
            amount_cents: cents,
            status,
            reason: None,
            created_at: at(1),
            approved_at: None,
            rejected_at: None,
        }
    }

    #[test]
    fn test_record_sale_reference_order() {
        let mut stats = RevenueStats::default();
        record_sale(&mut stats, Money::from_cents(3500), COMMISSION_BPS);

        assert_eq!(stats.total_revenue_cents, 3500);
        assert_eq!(stats.company_revenue_cents, 525);
        assert_eq!(stats.seller_revenue_cents, 2975);
        assert_eq!(stats.total_orders, 1);
    }

    #[test]
    fn test_rebuild_and_reconcile() {
        let orders = vec![
            order("o1", vec![item("s1", 3500)], 1),
            order("o2", vec![item("s1", 1500), item("s2", 999)], 2),
        ];
        let rebuilt = rebuild_stats(&orders, 4, 3, COMMISSION_BPS);
        assert_eq!(rebuilt.total_revenue_cents, 5999);
        assert_eq!(
            rebuilt.company_revenue_cents + rebuilt.seller_revenue_cents,
            rebuilt.total_revenue_cents
        );
        assert_eq!(rebuilt.total_orders, 2);
        assert_eq!(rebuilt.total_products, 4);

        let same = reconcile(rebuilt.clone(), rebuilt.clone());
        assert!(!same.drifted);

        let mut stale = rebuilt.clone();
        stale.total_orders = 1;
        stale.total_users = 99;
        assert!(reconcile(stale, rebuilt.clone()).drifted);

        let mut counts_only = rebuilt.clone();
        counts_only.total_users = 99;
        assert!(!reconcile(counts_only, rebuilt).drifted);
    }

    #[test]
    fn test_seller_balance() {
        let orders = vec![
            order("o1", vec![item("s1", 3500), item("s2", 1000)], 1),
            order("o2", vec![item("s1", 1500)], 2),
        ];
        // s1 gross 50.00 → 42.50
        assert_eq!(seller_gross(&orders, "s1").cents(), 5000);
        assert_eq!(seller_balance(&orders, &[], "s1", COMMISSION_BPS).cents(), 4250);

        let withdrawals = vec![
            withdrawal("w1", "s1", 1000, WithdrawalStatus::Approved),
            withdrawal("w2", "s1", 500, WithdrawalStatus::Pending),
            withdrawal("w3", "s1", 700, WithdrawalStatus::Rejected),
            withdrawal("w4", "s2", 200, WithdrawalStatus::Approved),
        ];
        assert_eq!(seller_balance(&orders, &withdrawals, "s1", COMMISSION_BPS).cents(), 3250);
        assert_eq!(withdrawable(&orders, &withdrawals, "s1", COMMISSION_BPS).cents(), 2750);
        assert_eq!(seller_balance(&orders, &withdrawals, "s2", COMMISSION_BPS).cents(), 650);
    }

    #[test]
    fn test_monthly_breakdown_keeps_latest_months() {
        let orders: Vec<Order> = (1..=8)
            .map(|m| order(&format!("o{}", m), vec![item("s1", 1000 * m as i64)], m))
            .collect();

        let chart = platform_chart(&orders, 6);
        assert_eq!(chart.len(), 6);
        assert_eq!(chart[0].month, "2025-03");
        assert_eq!(chart[5].month, "2025-08");
        assert_eq!(chart[5].amount.cents(), 8000);
    }

    #[test]
    fn test_monthly_breakdown_groups_and_attributes() {
        let orders = vec![
            order("o1", vec![item("s1", 3500)], 3),
            order("o2", vec![item("s1", 1500), item("s2", 1000)], 3),
            order("o3", vec![item("s2", 2000)], 4),
        ];

        let platform = platform_chart(&orders, 6);
        assert_eq!(platform.len(), 2);
        assert_eq!(platform[0].amount.cents(), 6000);
        assert_eq!(platform[1].amount.cents(), 2000);

        // s1 has nothing in April, so April is absent
        let chart = seller_chart(&orders, "s1", 6, COMMISSION_BPS);
        assert_eq!(chart.len(), 1);
        assert_eq!(chart[0].month, "2025-03");
        assert_eq!(chart[0].amount.cents(), 2975 + 1275);
    }

    #[test]
    fn test_seller_stats_and_about() {
        let seller = User {
            id: "s1".to_string(),
            email: "s@example.com".to_string(),
            password: "x".to_string(),
            role: Role::Seller,
            seller_approved: true,
            is_vip: false,
            created_at: at(1),
        };
        let orders = vec![order("o1", vec![item("s1", 3500), item("s1", 1500)], 1)];
        let withdrawals = vec![withdrawal("w1", "s1", 1000, WithdrawalStatus::Pending)];

        let stats = seller_stats(&seller, &orders, &[], &withdrawals, COMMISSION_BPS);
        assert_eq!(stats.gross_sales.cents(), 5000);
        assert_eq!(stats.items_sold, 2);
        assert_eq!(stats.commission.cents(), 750);
        assert_eq!(stats.balance.cents(), 4250);
        assert_eq!(stats.withdrawable.cents(), 3250);
        assert!(stats.approved);

        let about = about_stats(&[], &[seller], &orders);
        assert_eq!(about.approved_sellers, 1);
        assert_eq!(about.completed_orders, 1);
        assert_eq!(about.approved_products, 0);
    }

    #[test]
    fn test_counted_users_skip_admins() {
        let user = |id: &str, role: Role| User {
            id: id.to_string(),
            email: format!("{id}@example.com"),
            password: "x".to_string(),
            role,
            seller_approved: role == Role::Seller,
            is_vip: false,
            created_at: at(1),
        };
        let users = vec![
            user("a", Role::Admin),
            user("s", Role::Seller),
            user("u", Role::User),
        ];

        assert_eq!(counted_users(&users), 2);
        assert_eq!(counted_users(&users[..1]), 0);
    }
}
