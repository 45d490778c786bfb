//! Shopify platform detection.
//!
//! Detection is a best-effort signal only: heavily customized storefronts
//! routinely hide every signature, so callers treat a negative as a warning,
//! never a hard stop.

use std::sync::LazyLock;

use regex::Regex;

/// Signature substrings that mark a page as Shopify-rendered. Matched
/// case-insensitively against the whole body.
const SHOPIFY_SIGNATURES: [&str; 7] = [
    "shopify.theme",
    "shopify.com",
    "cdn.shopify.com",
    "shopify.shop",
    "shopify-features",
    "shopify-section",
    "myshopify.com",
];

static SHOP_DOMAIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"Shopify\.shop\s*=\s*"([^"]+)""#).expect("valid regex"));
/// Object form: `Shopify.currency = {"active":"USD","rate":"1.0"}`.
static CURRENCY_ACTIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"Shopify\.currency\s*=\s*\{[^}]*"active"\s*:\s*"([^"]+)""#).expect("valid regex")
});
/// Legacy string form: `Shopify.currency = "USD"`.
static CURRENCY_PLAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"Shopify\.currency\s*=\s*["']([A-Za-z]{3})["']"#).expect("valid regex")
});

/// Returns `true` if the URL carries the hosted-subdomain marker or the body
/// contains any platform signature.
#[must_use]
pub fn is_shopify(content: &str, url: &str) -> bool {
    if url.contains("myshopify.com") {
        return true;
    }
    if content.is_empty() {
        return false;
    }
    let lower = content.to_lowercase();
    SHOPIFY_SIGNATURES.iter().any(|sig| lower.contains(sig))
}

/// Runtime values Shopify themes expose via inline script globals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShopifyRuntimeData {
    /// `Shopify.shop`, the canonical `*.myshopify.com` domain.
    pub shop_domain: Option<String>,
    /// `Shopify.currency.active`, the store's active ISO 4217 code.
    pub currency: Option<String>,
}

/// Probes inline scripts for `Shopify.shop` and `Shopify.currency` globals.
#[must_use]
pub fn extract_runtime_data(html: &str) -> ShopifyRuntimeData {
    ShopifyRuntimeData {
        shop_domain: SHOP_DOMAIN_RE
            .captures(html)
            .map(|c| c[1].to_owned()),
        currency: CURRENCY_ACTIVE_RE
            .captures(html)
            .or_else(|| CURRENCY_PLAIN_RE.captures(html))
            .map(|c| c[1].to_owned()),
    }
}
