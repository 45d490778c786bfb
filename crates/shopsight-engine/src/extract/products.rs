//! Product extraction from page markup and JSON-LD.
//!
//! JSON-LD blocks are harvested first: structured data is authoritative, and
//! identity-key dedup keeps the first-seen record, so a product present both
//! as JSON-LD and as a card keeps its structured fields.

use scraper::{ElementRef, Html};
use serde_json::Value;
use shopsight_core::{dedup_products, Availability, ProductRecord};

use crate::dom::{select_all, select_first, text_of};
use crate::text::{clean_text, extract_price, resolve_url};

const GRID_SELECTORS: [&str; 7] = [
    ".product-grid .product-item",
    ".products-grid .product",
    ".collection-grid .product-card",
    ".product-list .product-item",
    "[data-product-item]",
    ".product-card",
    ".product-tile",
];
const COLLECTION_SELECTORS: [&str; 4] = [
    ".collection .product",
    ".collection-products .product-item",
    ".products .product-card",
    "#CollectionProductGrid .product",
];
const SECTION_ITEM_SELECTORS: [&str; 4] =
    [".product-item", ".product-card", ".product", "[data-product]"];

const NAME_SELECTORS: [&str; 8] = [
    ".product-title",
    ".product-name",
    "h2",
    "h3",
    "h4",
    ".title",
    "[data-product-title]",
    r#"a[href*="/products/"]"#,
];
const PRICE_SELECTORS: [&str; 6] = [
    ".price",
    ".product-price",
    ".money",
    "[data-price]",
    ".price-current",
    ".sale-price",
];
const ORIGINAL_PRICE_SELECTORS: [&str; 5] = [
    ".price-compare",
    ".original-price",
    ".was-price",
    ".compare-price",
    ".price-old",
];
const AVAILABILITY_SELECTORS: [&str; 3] = [".availability", ".stock-status", "[data-availability]"];
const DESCRIPTION_SELECTORS: [&str; 4] =
    [".product-description", ".product-summary", ".description", "p"];
const TAG_SELECTORS: [&str; 3] = [".product-tags .tag", ".tags .tag", ".categories .category"];

/// Description snippet limit for card-level records.
const MAX_DESCRIPTION: usize = 200;

/// Extracts every product the page exposes, deduplicated by identity key.
#[must_use]
pub fn extract_page_products(doc: &Html, base_url: &str) -> Vec<ProductRecord> {
    let root = doc.root_element();
    let mut products = extract_json_ld_products(doc, base_url);

    for selector in GRID_SELECTORS {
        for item in select_all(root, selector) {
            products.extend(product_from_element(item, base_url));
        }
    }

    // Broad class sweep; the name gate discards non-product containers.
    for item in select_all(root, r#"[class*="product"]"#) {
        products.extend(product_from_element(item, base_url));
    }

    for section in select_all(root, "[data-section-type]") {
        let kind = section
            .value()
            .attr("data-section-type")
            .unwrap_or_default()
            .to_lowercase();
        if kind.contains("product") || kind.contains("collection") {
            products.extend(products_from_section(section, base_url));
        }
    }

    for selector in COLLECTION_SELECTORS {
        for item in select_all(root, selector) {
            products.extend(product_from_element(item, base_url));
        }
    }

    dedup_products(&products)
}

/// Product elements within one themed section.
pub(crate) fn products_from_section(section: ElementRef<'_>, base_url: &str) -> Vec<ProductRecord> {
    let mut products = Vec::new();
    for selector in SECTION_ITEM_SELECTORS {
        for item in select_all(section, selector) {
            products.extend(product_from_element(item, base_url));
        }
    }
    products
}

/// Builds a record from one product card. A card without a usable name is
/// not a product.
pub(crate) fn product_from_element(el: ElementRef<'_>, base_url: &str) -> Option<ProductRecord> {
    let name = probe_name(el)?;
    let mut record = ProductRecord::named(name);

    record.price = probe_price(el, &PRICE_SELECTORS);
    record.original_price = probe_price(el, &ORIGINAL_PRICE_SELECTORS);
    record.image_url = probe_image(el, base_url);
    record.product_url = probe_product_url(el, base_url);
    record.availability = probe_availability(el);
    record.description = probe_description(el);
    record.tags = probe_tags(el);

    Some(record)
}

/// Builds a minimal record from a bare `/products/` anchor, falling back to
/// the URL handle for a display name.
pub(crate) fn product_from_link(anchor: ElementRef<'_>, base_url: &str) -> Option<ProductRecord> {
    let href = anchor.value().attr("href")?;
    if !href.contains("/products/") {
        return None;
    }

    let mut name = text_of(anchor);
    if name.is_empty() {
        name = anchor
            .value()
            .attr("title")
            .map(str::to_owned)
            .unwrap_or_default();
    }
    if name.is_empty() {
        let handle = href
            .split("/products/")
            .nth(1)?
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        name = handle
            .split('-')
            .filter(|w| !w.is_empty())
            .map(capitalize)
            .collect::<Vec<_>>()
            .join(" ");
    }
    if name.is_empty() {
        return None;
    }

    let mut record = ProductRecord::named(clean_text(&name));
    record.product_url = resolve_url(href, base_url);
    record.image_url = probe_image(anchor, base_url);
    Some(record)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().collect::<String>() + chars.as_str()
    })
}

fn probe_name(el: ElementRef<'_>) -> Option<String> {
    for selector in NAME_SELECTORS {
        if let Some(found) = select_first(el, &[selector]) {
            let name = text_of(found);
            if name.len() > 2 {
                return Some(name);
            }
        }
    }
    None
}

fn probe_price(el: ElementRef<'_>, selectors: &[&str]) -> Option<String> {
    for selector in selectors.iter().copied() {
        if let Some(found) = select_first(el, &[selector]) {
            // Price matching needs the raw text: cleaning strips the
            // currency symbols the patterns anchor on.
            let raw: String = found.text().collect::<Vec<_>>().join(" ");
            if let Some(price) = extract_price(&raw) {
                return Some(price);
            }
        }
    }
    None
}

fn probe_image(el: ElementRef<'_>, base_url: &str) -> Option<String> {
    let img = select_first(el, &["img"])?;
    ["data-src", "src", "data-original"]
        .iter()
        .find_map(|attr| img.value().attr(attr))
        .and_then(|src| resolve_url(src, base_url))
}

fn probe_product_url(el: ElementRef<'_>, base_url: &str) -> Option<String> {
    for anchor in select_all(el, "a[href]") {
        if let Some(href) = anchor.value().attr("href") {
            if href.contains("/products/") {
                return resolve_url(href, base_url);
            }
        }
    }
    el.value()
        .attr("data-product-url")
        .and_then(|href| resolve_url(href, base_url))
}

fn probe_availability(el: ElementRef<'_>) -> Availability {
    for selector in AVAILABILITY_SELECTORS {
        if let Some(found) = select_first(el, &[selector]) {
            let text = text_of(found).to_lowercase();
            if text.contains("out") || text.contains("sold") {
                return Availability::OutOfStock;
            }
            if text.contains("in stock") || text.contains("available") {
                return Availability::InStock;
            }
        }
    }
    if select_first(el, &[r#"button[class*="cart"][disabled]"#]).is_some() {
        return Availability::OutOfStock;
    }
    Availability::InStock
}

fn probe_description(el: ElementRef<'_>) -> Option<String> {
    for selector in DESCRIPTION_SELECTORS {
        if let Some(found) = select_first(el, &[selector]) {
            let text = text_of(found);
            if text.len() > 10 {
                return Some(text.chars().take(MAX_DESCRIPTION).collect());
            }
        }
    }
    None
}

fn probe_tags(el: ElementRef<'_>) -> Vec<String> {
    let mut tags = Vec::new();
    for selector in TAG_SELECTORS {
        for tag_el in select_all(el, selector) {
            let tag = text_of(tag_el).to_lowercase();
            if !tag.is_empty() {
                tags.push(tag);
            }
        }
    }
    tags
}

fn extract_json_ld_products(doc: &Html, base_url: &str) -> Vec<ProductRecord> {
    let mut products = Vec::new();
    for script in select_all(doc.root_element(), r#"script[type="application/ld+json"]"#) {
        let raw: String = script.text().collect();
        let Ok(value) = serde_json::from_str::<Value>(&raw) else {
            continue;
        };
        match value {
            Value::Array(items) => {
                for item in &items {
                    products.extend(product_from_json_ld(item, base_url));
                }
            }
            item => products.extend(product_from_json_ld(&item, base_url)),
        }
    }
    products
}

fn product_from_json_ld(data: &Value, base_url: &str) -> Option<ProductRecord> {
    if data["@type"].as_str() != Some("Product") {
        return None;
    }
    let name = data["name"].as_str().map(clean_text).filter(|n| !n.is_empty())?;
    let mut record = ProductRecord::named(name);

    let offers = match &data["offers"] {
        Value::Array(list) => list.first().cloned().unwrap_or(Value::Null),
        other => other.clone(),
    };

    let price_raw = match &offers["price"] {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    };
    if let Some(price_raw) = price_raw {
        let currency = offers["priceCurrency"].as_str().unwrap_or("USD");
        record.price = Some(price_raw.parse::<f64>().map_or_else(
            |_| price_raw.clone(),
            |amount| {
                if currency == "USD" {
                    format!("${amount:.2}")
                } else {
                    format!("{amount:.2} {currency}")
                }
            },
        ));
        record.currency = Some(currency.to_owned());
    }

    if let Some(availability) = offers["availability"].as_str() {
        if availability.to_lowercase().contains("outofstock") {
            record.availability = Availability::OutOfStock;
        }
    }

    record.image_url = match &data["image"] {
        Value::String(url) => Some(url.clone()),
        Value::Array(list) => list.first().and_then(Value::as_str).map(str::to_owned),
        Value::Object(_) => data["image"]["url"].as_str().map(str::to_owned),
        _ => None,
    }
    .and_then(|url| resolve_url(&url, base_url));

    record.description = data["description"]
        .as_str()
        .map(clean_text)
        .filter(|d| !d.is_empty());
    record.product_url = data["url"]
        .as_str()
        .and_then(|url| resolve_url(url, base_url));

    Some(record)
}
