//! # Configuration State
//!
//! Marketplace configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`DIGIT_*`)
//! 2. Defaults (this file)
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

use digit_core::checkout::FreezeOptions;
use digit_core::money::CURRENCY_CODE;
use digit_core::vip::VipRule;
use digit_core::{
    Money, CHECKOUT_WINDOW_SECS, VIP_DISCOUNT_BPS, VIP_MIN_ITEMS, VIP_MIN_SPEND_CENTS,
};

/// Marketplace configuration.
///
/// The 15% commission and the 6-character password minimum are platform
/// rules, not settings: see [`digit_core::COMMISSION_BPS`] and
/// [`digit_core::MIN_PASSWORD_LENGTH`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketConfig {
    /// Store name (page titles, seed output)
    pub store_name: String,

    /// Currency code (ISO 4217)
    pub currency_code: String,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// VIP price reduction in basis points.
    pub vip_discount_bps: u32,

    /// Completed items a buyer needs for VIP.
    pub vip_min_items: usize,

    /// Completed spend a buyer needs for VIP, in qəpik.
    pub vip_min_spend_cents: i64,

    /// Seconds a frozen checkout waits for the receipt.
    pub checkout_window_secs: i64,

    /// Charge VIP buyers the discounted price at checkout.
    pub vip_discount_at_checkout: bool,
}

impl Default for MarketConfig {
    /// ## Default Values
    /// - Store: "Digit Store"
    /// - Currency: AZN (₼)
    /// - VIP: 10% off after 20 items and 200.00 spent
    /// - Checkout window: 3 minutes
    fn default() -> Self {
        MarketConfig {
            store_name: "Digit Store".to_string(),
            currency_code: CURRENCY_CODE.to_string(),
            currency_symbol: "₼".to_string(),
            vip_discount_bps: VIP_DISCOUNT_BPS,
            vip_min_items: VIP_MIN_ITEMS,
            vip_min_spend_cents: VIP_MIN_SPEND_CENTS,
            checkout_window_secs: CHECKOUT_WINDOW_SECS,
            vip_discount_at_checkout: true,
        }
    }
}

impl MarketConfig {
    /// Creates a MarketConfig from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `DIGIT_STORE_NAME`, `DIGIT_CURRENCY_CODE`, `DIGIT_CURRENCY_SYMBOL`
    /// - `DIGIT_VIP_DISCOUNT_BPS` (0..=10000)
    /// - `DIGIT_VIP_MIN_ITEMS`, `DIGIT_VIP_MIN_SPEND_CENTS`
    /// - `DIGIT_CHECKOUT_WINDOW_SECS` (> 0)
    /// - `DIGIT_VIP_AT_CHECKOUT` (true/false)
    ///
    /// Values that don't parse or are out of range are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = MarketConfig::default();

        if let Some(name) = lookup("DIGIT_STORE_NAME").filter(|v| !v.trim().is_empty()) {
            config.store_name = name;
        }
        if let Some(code) = lookup("DIGIT_CURRENCY_CODE").filter(|v| !v.trim().is_empty()) {
            config.currency_code = code;
        }
        if let Some(symbol) = lookup("DIGIT_CURRENCY_SYMBOL").filter(|v| !v.trim().is_empty()) {
            config.currency_symbol = symbol;
        }

        if let Some(bps) = parse_var(&lookup, "DIGIT_VIP_DISCOUNT_BPS", |v: &u32| *v <= 10_000) {
            config.vip_discount_bps = bps;
        }
        if let Some(items) = parse_var(&lookup, "DIGIT_VIP_MIN_ITEMS", |_: &usize| true) {
            config.vip_min_items = items;
        }
        if let Some(cents) = parse_var(&lookup, "DIGIT_VIP_MIN_SPEND_CENTS", |v: &i64| *v >= 0) {
            config.vip_min_spend_cents = cents;
        }
        if let Some(secs) = parse_var(&lookup, "DIGIT_CHECKOUT_WINDOW_SECS", |v: &i64| *v > 0) {
            config.checkout_window_secs = secs;
        }
        if let Some(flag) = parse_var(&lookup, "DIGIT_VIP_AT_CHECKOUT", |_: &bool| true) {
            config.vip_discount_at_checkout = flag;
        }

        config
    }

    /// VIP thresholds and discount.
    pub fn vip_rule(&self) -> VipRule {
        VipRule {
            min_items: self.vip_min_items,
            min_spend: Money::from_cents(self.vip_min_spend_cents),
            discount_bps: self.vip_discount_bps,
        }
    }

    pub fn checkout_window(&self) -> Duration {
        Duration::seconds(self.checkout_window_secs)
    }

    /// How carts are frozen for a buyer with the given VIP flag.
    pub fn freeze_options(&self, buyer_is_vip: bool) -> FreezeOptions {
        FreezeOptions {
            window: self.checkout_window(),
            vip_discount: buyer_is_vip && self.vip_discount_at_checkout,
            rule: self.vip_rule(),
        }
    }

    /// Formats an amount with the configured symbol.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = MarketConfig::default();
    /// assert_eq!(config.format_money(Money::from_cents(2975)), "29.75 ₼");
    /// ```
    pub fn format_money(&self, amount: Money) -> String {
        let sign = if amount.is_negative() { "-" } else { "" };
        format!(
            "{}{}.{:02} {}",
            sign,
            amount.major().abs(),
            amount.minor().abs(),
            self.currency_symbol
        )
    }
}

fn parse_var<T, F, V>(lookup: &F, name: &str, valid: V) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
    V: Fn(&T) -> bool,
{
    let raw = lookup(name)?;
    match raw.trim().parse::<T>() {
        Ok(value) if valid(&value) => Some(value),
        _ => {
            warn!(variable = name, value = %raw, "Ignoring invalid configuration value");
            None
        }
    }
}
