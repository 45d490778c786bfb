//! Wire types for the public `products.json` endpoint and their conversion
//! into catalog records.
//!
//! Observed shape notes from live stores:
//!
//! - `tags` is a JSON array of strings; the legacy comma-separated form does
//!   not appear on this endpoint. `#[serde(default)]` covers the empty case.
//! - `compare_at_price` is explicitly `null` when the variant is not on sale,
//!   and a decimal string like `"162.00"` when it is.
//! - `available` on variants may be absent on older stores; absent means
//!   available.

use serde::Deserialize;
use shopsight_core::{Availability, ProductRecord};

use crate::text::{clean_text, resolve_url};

/// Tags beyond this count carry no ranking signal and are dropped.
const MAX_TAGS: usize = 10;
/// Description excerpt length in the converted record.
const MAX_DESCRIPTION: usize = 200;

/// Top-level response from `GET /products.json`.
#[derive(Debug, Deserialize)]
pub struct VendorProductsResponse {
    pub products: Vec<VendorProduct>,
}

/// A single product as served by the vendor JSON endpoint.
#[derive(Debug, Deserialize)]
pub struct VendorProduct {
    /// Display name; a product without one is unusable and skipped.
    #[serde(default)]
    pub title: String,

    /// URL slug for the product page.
    #[serde(default)]
    pub handle: String,

    /// Raw HTML description. May be `null` or absent.
    #[serde(default)]
    pub body_html: Option<String>,

    /// Tags as a JSON array of strings; `[]` when the store has none.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Full image gallery; the first entry is the storefront-primary image.
    #[serde(default)]
    pub images: Vec<VendorImage>,

    /// All purchasable variants, storefront order.
    #[serde(default)]
    pub variants: Vec<VendorVariant>,
}

/// A purchasable variant of a [`VendorProduct`].
#[derive(Debug, Deserialize)]
pub struct VendorVariant {
    /// Display title, e.g. a size string or `"Default Title"`.
    #[serde(default)]
    pub title: String,

    /// Current price as a decimal string, e.g. `"30.00"`.
    #[serde(default)]
    pub price: Option<String>,

    /// Pre-sale price as a decimal string, or `null` when not on sale.
    #[serde(default)]
    pub compare_at_price: Option<String>,

    /// Defaults to `true` when absent (optimistic assumption).
    #[serde(default = "default_available")]
    pub available: bool,
}

/// A product image from the vendor JSON.
#[derive(Debug, Deserialize)]
pub struct VendorImage {
    pub src: String,
}

/// Serde calls this for a missing `available`; it cannot be a `const`.
fn default_available() -> bool {
    true
}

/// Vendor catalog URL for one page, always rooted at the store origin.
#[must_use]
pub fn products_page_url(origin: &str, limit: u32, page: u32) -> String {
    format!(
        "{}/products.json?limit={limit}&page={page}",
        origin.trim_end_matches('/')
    )
}

/// Converts a vendor JSON product into a catalog record.
///
/// Returns `None` for an unnamed product. Pricing comes from the first
/// variant: the display price is `$`-prefixed, and `original_price` is only
/// set when `compare_at_price` numerically exceeds the current price.
#[must_use]
pub fn convert_product(base_url: &str, product: &VendorProduct) -> Option<ProductRecord> {
    let name = clean_text(&product.title);
    if name.is_empty() {
        return None;
    }

    let mut record = ProductRecord::named(name);

    if !product.handle.is_empty() {
        record.product_url = Some(format!(
            "{}/products/{}",
            base_url.trim_end_matches('/'),
            product.handle
        ));
    }

    if let Some(first) = product.variants.first() {
        if let Some(price) = first.price.as_deref().filter(|p| !p.is_empty()) {
            record.price = Some(format!("${price}"));
            if let Some(compare) = first.compare_at_price.as_deref() {
                let current: f64 = price.parse().unwrap_or(0.0);
                let original: f64 = compare.parse().unwrap_or(0.0);
                if original > current {
                    record.original_price = Some(format!("${compare}"));
                }
            }
        }
        record.availability = if first.available {
            Availability::InStock
        } else {
            Availability::OutOfStock
        };
    }
    record.variants = product
        .variants
        .iter()
        .map(|v| v.title.clone())
        .filter(|t| !t.is_empty())
        .collect();

    record.image_url = product
        .images
        .first()
        .and_then(|img| resolve_url(&img.src, base_url));

    record.description = product
        .body_html
        .as_deref()
        .map(clean_text)
        .filter(|d| !d.is_empty())
        .map(|d| d.chars().take(MAX_DESCRIPTION).collect());

    record.tags = product
        .tags
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .take(MAX_TAGS)
        .collect();

    Some(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> VendorProduct {
        serde_json::from_value(serde_json::json!({
            "title": "Hero Widget",
            "handle": "hero-widget",
            "body_html": "<p>A  very   nice widget</p>",
            "tags": ["Homepage", "  Featured "],
            "images": [{"src": "https://cdn.example/widget.png"}],
            "variants": [
                {"title": "Small", "price": "29.99", "compare_at_price": "39.99", "available": true},
                {"title": "Large", "price": "34.99", "compare_at_price": null}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn converts_full_product() {
        let record = convert_product("https://shop.example", &sample()).unwrap();
        assert_eq!(record.name, "Hero Widget");
        assert_eq!(record.price.as_deref(), Some("$29.99"));
        assert_eq!(record.original_price.as_deref(), Some("$39.99"));
        assert_eq!(
            record.product_url.as_deref(),
            Some("https://shop.example/products/hero-widget")
        );
        assert_eq!(record.availability, Availability::InStock);
        assert_eq!(record.tags, vec!["homepage", "featured"]);
        assert_eq!(record.variants, vec!["Small", "Large"]);
        assert_eq!(
            record.image_url.as_deref(),
            Some("https://cdn.example/widget.png")
        );
    }

    #[test]
    fn skips_unnamed_product() {
        let mut product = sample();
        product.title = "  ".to_owned();
        assert!(convert_product("https://shop.example", &product).is_none());
    }

    #[test]
    fn original_price_requires_higher_compare_price() {
        let mut product = sample();
        product.variants[0].compare_at_price = Some("29.99".to_owned());
        let record = convert_product("https://shop.example", &product).unwrap();
        assert!(record.original_price.is_none());
    }

    #[test]
    fn unavailable_first_variant_marks_out_of_stock() {
        let mut product = sample();
        product.variants[0].available = false;
        let record = convert_product("https://shop.example", &product).unwrap();
        assert_eq!(record.availability, Availability::OutOfStock);
    }

    #[test]
    fn description_is_cleaned_and_truncated() {
        let mut product = sample();
        product.body_html = Some("x".repeat(500));
        let record = convert_product("https://shop.example", &product).unwrap();
        assert_eq!(record.description.as_deref().map(str::len), Some(200));
    }

    #[test]
    fn products_page_url_shape() {
        assert_eq!(
            products_page_url("https://shop.example/", 250, 2),
            "https://shop.example/products.json?limit=250&page=2"
        );
    }

    #[test]
    fn deserializes_minimal_product() {
        let product: VendorProduct =
            serde_json::from_value(serde_json::json!({"title": "Bare", "handle": "bare"})).unwrap();
        let record = convert_product("https://shop.example", &product).unwrap();
        assert!(record.price.is_none());
        assert_eq!(record.availability, Availability::InStock);
    }
}
