//! Text and URL normalization shared by every extractor.
//!
//! All functions are pure and infallible: bad input degrades to an empty
//! result, never an error.

use std::sync::LazyLock;

use regex::Regex;

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static PUNCT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s.,!?\-()]").expect("valid regex"));

/// Ordered price patterns: currency-symbol prefix, symbol suffix, then the
/// textual `Rs.` / `USD` prefixes. First match wins.
static PRICE_RES: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        Regex::new(r"[$₹€£¥][\d,]+\.?\d*").expect("valid price regex"),
        Regex::new(r"[\d,]+\.?\d*\s*[$₹€£¥]").expect("valid price regex"),
        Regex::new(r"(?i)Rs\.?\s*[\d,]+\.?\d*").expect("valid price regex"),
        Regex::new(r"(?i)USD\s*[\d,]+\.?\d*").expect("valid price regex"),
    ]
});

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("valid email regex")
});

static PHONE_RES: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        Regex::new(r"\+\d{1,3}[-.\s]?\d{3,4}[-.\s]?\d{3,4}[-.\s]?\d{3,4}")
            .expect("valid phone regex"),
        Regex::new(r"\(\d{3}\)\s*\d{3}[-.\s]?\d{4}").expect("valid phone regex"),
        Regex::new(r"\d{3}[-.\s]?\d{3}[-.\s]?\d{4}").expect("valid phone regex"),
        Regex::new(r"\+\d{10,15}").expect("valid phone regex"),
    ]
});

/// Collapses whitespace and strips everything outside word characters and
/// basic punctuation.
#[must_use]
pub fn clean_text(text: &str) -> String {
    let collapsed = WHITESPACE_RE.replace_all(text, " ");
    PUNCT_RE.replace_all(&collapsed, "").trim().to_owned()
}

/// Extracts the first price-looking substring from free text.
///
/// `extract_price("Rs. 1,299.00 only")` → `Some("Rs. 1,299.00")`;
/// text with no recognizable price yields `None`.
#[must_use]
pub fn extract_price(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    PRICE_RES
        .iter()
        .find_map(|re| re.find(text))
        .map(|m| m.as_str().trim().to_owned())
}

/// Harvests email addresses from free text, deduped in first-seen order.
#[must_use]
pub fn extract_emails(text: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    EMAIL_RE
        .find_iter(text)
        .map(|m| m.as_str().to_owned())
        .filter(|email| seen.insert(email.clone()))
        .collect()
}

/// Harvests phone numbers from free text, deduped in first-seen order.
#[must_use]
pub fn extract_phone_numbers(text: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut phones = Vec::new();
    for re in PHONE_RES.iter() {
        for m in re.find_iter(text) {
            let phone = m.as_str().to_owned();
            if seen.insert(phone.clone()) {
                phones.push(phone);
            }
        }
    }
    phones
}

/// Resolves `href` against `base`: absolute URLs pass through, relative ones
/// are joined. Returns `None` when neither interpretation parses.
#[must_use]
pub fn resolve_url(href: &str, base: &str) -> Option<String> {
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_owned());
    }
    let base = reqwest::Url::parse(base).ok()?;
    base.join(href).ok().map(|u| u.to_string())
}

/// Hostname of a URL, empty string when unparseable.
#[must_use]
pub fn domain_of(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .unwrap_or_default()
}

/// `true` for a parseable http(s) URL with a host.
#[must_use]
pub fn is_valid_http_url(url: &str) -> bool {
    match reqwest::Url::parse(url) {
        Ok(u) => matches!(u.scheme(), "http" | "https") && u.host_str().is_some(),
        Err(_) => false,
    }
}

/// Normalizes caller input: defaults the scheme to https and strips any
/// trailing slash.
#[must_use]
pub fn normalize_shop_url(url: &str) -> String {
    let with_scheme = if url.starts_with("http://") || url.starts_with("https://") {
        url.to_owned()
    } else {
        format!("https://{url}")
    };
    with_scheme.trim_end_matches('/').to_owned()
}

/// Extracts the scheme+host origin from a shop URL.
///
/// Given `"https://shop.example/collections/all"`, returns
/// `"https://shop.example"` so vendor endpoints are always hit at the store
/// root regardless of what path the caller supplied.
#[must_use]
pub fn store_origin(shop_url: &str) -> String {
    reqwest::Url::parse(shop_url).map_or_else(
        |_| {
            // fallback: take "https://host" by splitting on '/' and taking first 3 parts
            shop_url
                .trim_end_matches('/')
                .splitn(4, '/')
                .take(3)
                .collect::<Vec<_>>()
                .join("/")
        },
        |u| u.origin().ascii_serialization(),
    )
}
