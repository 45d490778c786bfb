//! Brand identity extraction: name, description, logo, currencies and
//! payment methods.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;

use crate::detect::ShopifyRuntimeData;
use crate::dom::{probe_attr, select_all, select_first, text_of};
use crate::text::{clean_text, resolve_url};

/// `"Acme - Official Store"` → `"Acme"`.
static TITLE_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*[-–|]\s*(Shop|Store|Online|Official).*$").expect("valid regex")
});
static CURRENCY_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z]{3})\b").expect("valid regex"));

const LOGO_SELECTORS: [&str; 5] = [
    ".logo img",
    ".site-logo img",
    ".brand img",
    r#"img[alt*="logo" i]"#,
    ".header img",
];
const LOGO_ALT_SELECTORS: [&str; 4] = [
    r#"img[alt*="logo"]"#,
    ".logo img",
    ".brand img",
    ".site-logo img",
];

/// Display name for each indicator substring found in page text or payment
/// icon src/alt attributes.
const PAYMENT_INDICATORS: [(&str, &str); 11] = [
    ("visa", "Visa"),
    ("mastercard", "Mastercard"),
    ("amex", "American Express"),
    ("paypal", "PayPal"),
    ("stripe", "Stripe"),
    ("apple pay", "Apple Pay"),
    ("google pay", "Google Pay"),
    ("shopify pay", "Shopify Pay"),
    ("klarna", "Klarna"),
    ("afterpay", "Afterpay"),
    ("cash on delivery", "Cash on Delivery"),
];

/// Brand-level facts pulled from the homepage.
#[derive(Debug, Default)]
pub struct BrandFacts {
    pub name: Option<String>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub currencies: Vec<String>,
    pub payment_methods: Vec<String>,
}

#[must_use]
pub fn extract_brand(doc: &Html, base_url: &str, runtime: &ShopifyRuntimeData) -> BrandFacts {
    BrandFacts {
        name: extract_name(doc),
        description: extract_description(doc),
        logo_url: extract_logo(doc, base_url),
        currencies: extract_currencies(doc, runtime),
        payment_methods: extract_payment_methods(doc),
    }
}

fn extract_name(doc: &Html) -> Option<String> {
    let root = doc.root_element();

    if let Some(title) = select_first(root, &["title"]) {
        // Suffix stripping must run on the raw title: clean_text would eat
        // the "|" / "–" separators first.
        let raw: String = title.text().collect();
        let stripped = TITLE_SUFFIX_RE.replace(raw.trim(), "").trim().to_owned();
        if !stripped.is_empty() && stripped.len() < 100 {
            return Some(clean_text(&stripped));
        }
    }

    if let Some(name) = probe_attr(root, &[r#"meta[property="og:site_name"]"#], &["content"]) {
        return Some(clean_text(&name));
    }

    // Logo alt text, unless the alt is literally just branding for the logo.
    for selector in LOGO_ALT_SELECTORS {
        if let Some(alt) = probe_attr(root, &[selector], &["alt"]) {
            if !alt.to_lowercase().contains("logo") {
                return Some(clean_text(&alt));
            }
        }
    }

    None
}

fn extract_description(doc: &Html) -> Option<String> {
    let root = doc.root_element();
    for selector in [
        r#"meta[name="description"]"#,
        r#"meta[property="og:description"]"#,
    ] {
        if let Some(content) = probe_attr(root, &[selector], &["content"]) {
            if content.len() > 20 {
                return Some(clean_text(&content));
            }
        }
    }
    None
}

fn extract_logo(doc: &Html, base_url: &str) -> Option<String> {
    probe_attr(doc.root_element(), &LOGO_SELECTORS, &["src", "data-src"])
        .and_then(|src| resolve_url(&src, base_url))
}

fn extract_currencies(doc: &Html, runtime: &ShopifyRuntimeData) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut currencies = Vec::new();
    let mut push = |code: String| {
        if seen.insert(code.clone()) {
            currencies.push(code);
        }
    };

    if let Some(active) = &runtime.currency {
        push(active.clone());
    }

    for container in select_all(
        doc.root_element(),
        r#"select[class*="currency" i], div[class*="currency" i]"#,
    ) {
        for option in select_all(container, "option, a, span") {
            let text = text_of(option);
            if let Some(cap) = CURRENCY_CODE_RE.captures(&text) {
                push(cap[1].to_owned());
            }
        }
    }

    currencies
}

fn extract_payment_methods(doc: &Html) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut methods = Vec::new();
    let mut push = |method: &str| {
        if seen.insert(method.to_owned()) {
            methods.push(method.to_owned());
        }
    };

    let text: String = doc
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    for (indicator, method) in PAYMENT_INDICATORS {
        if text.contains(indicator) {
            push(method);
        }
    }

    for img in select_all(doc.root_element(), "img") {
        let src = img.value().attr("src").unwrap_or_default().to_lowercase();
        let alt = img.value().attr("alt").unwrap_or_default().to_lowercase();
        for (indicator, method) in PAYMENT_INDICATORS {
            if src.contains(indicator) || alt.contains(indicator) {
                push(method);
            }
        }
    }

    methods
}
