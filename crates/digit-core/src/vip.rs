//! # VIP Rule
//!
//! A buyer becomes VIP after enough completed purchases. VIP buyers see a
//! flat per-item discount across the whole catalog.
//!
//! ```text
//! completed orders of user ──► items bought, total spent ──► VipProgress
//!                                                             │
//!                        items ≥ 20 AND spent ≥ 200.00 ◄──────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::Order;
use crate::{VIP_DISCOUNT_BPS, VIP_MIN_ITEMS, VIP_MIN_SPEND_CENTS};

/// Thresholds and discount for VIP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VipRule {
    pub min_items: usize,
    pub min_spend: Money,
    pub discount_bps: u32,
}

impl Default for VipRule {
    fn default() -> Self {
        Self {
            min_items: VIP_MIN_ITEMS,
            min_spend: Money::from_cents(VIP_MIN_SPEND_CENTS),
            discount_bps: VIP_DISCOUNT_BPS,
        }
    }
}

/// Where a buyer stands against the VIP thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct VipProgress {
    pub items_bought: usize,
    pub items_required: usize,
    pub spent: Money,
    pub spend_required: Money,
    pub order_count: usize,
    #[ts(as = "Option<String>")]
    pub last_order_at: Option<DateTime<Utc>>,
    pub is_vip: bool,
}

impl VipProgress {
    /// Item progress as a whole percentage, capped at 100.
    pub fn items_percent(&self) -> u8 {
        percent(self.items_bought as i64, self.items_required as i64)
    }

    /// Spend progress as a whole percentage, capped at 100.
    pub fn spend_percent(&self) -> u8 {
        percent(self.spent.cents(), self.spend_required.cents())
    }
}

fn percent(value: i64, required: i64) -> u8 {
    if required <= 0 {
        return 100;
    }
    (value.max(0).saturating_mul(100) / required).min(100) as u8
}

impl VipRule {
    /// Evaluates a buyer's completed orders.
    ///
    /// Orders belonging to other users are ignored, so callers can pass the
    /// whole collection.
    pub fn evaluate(&self, user_id: &str, orders: &[Order]) -> VipProgress {
        let mine: Vec<&Order> = orders.iter().filter(|o| o.user_id == user_id).collect();

        let items_bought = mine.iter().map(|o| o.items.len()).sum();
        let spent: Money = mine.iter().map(|o| o.total()).sum();
        let last_order_at = mine.iter().map(|o| o.completed_at).max();

        VipProgress {
            items_bought,
            items_required: self.min_items,
            spent,
            spend_required: self.min_spend,
            order_count: mine.len(),
            last_order_at,
            is_vip: items_bought >= self.min_items && spent >= self.min_spend,
        }
    }

    /// Price a VIP buyer sees for a catalog price.
    pub fn discounted(&self, price: Money) -> Money {
        price.apply_percentage_discount(self.discount_bps)
    }

    /// Price shown to a buyer with the given VIP flag.
    pub fn display_price(&self, price: Money, is_vip: bool) -> Money {
        if is_vip {
            self.discounted(price)
        } else {
            price
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
