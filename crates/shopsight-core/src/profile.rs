//! Value records produced by one extraction run.
//!
//! Everything here is an immutable snapshot: records are built fresh per run,
//! serialized for the caller, and never read back by the engine. Collection
//! fields keep first-seen order so that ranked output (hero products) and
//! dedup results are deterministic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stock state of a product at extraction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Availability {
    InStock,
    OutOfStock,
}

impl Default for Availability {
    fn default() -> Self {
        Self::InStock
    }
}

/// A single product scraped from a storefront, from either the vendor JSON
/// catalog or an HTML product element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    /// Display price string including currency marker, e.g. `"$29.99"`.
    pub price: Option<String>,
    /// Pre-discount price, only set when it exceeds the current price.
    pub original_price: Option<String>,
    /// ISO 4217 code when the source exposes one.
    pub currency: Option<String>,
    #[serde(default)]
    pub availability: Availability,
    pub image_url: Option<String>,
    pub product_url: Option<String>,
    pub description: Option<String>,
    /// Variant display titles in storefront order.
    #[serde(default)]
    pub variants: Vec<String>,
    /// Lowercased tags; drives hero selection.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ProductRecord {
    /// A record carrying only a name; every other field starts empty.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price: None,
            original_price: None,
            currency: None,
            availability: Availability::InStock,
            image_url: None,
            product_url: None,
            description: None,
            variants: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Identity key for dedup: lowercased name plus product URL.
    #[must_use]
    pub fn identity_key(&self) -> (String, String) {
        (
            self.name.to_lowercase(),
            self.product_url.clone().unwrap_or_default(),
        )
    }

    /// Returns `true` if any tag equals `tag`.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Removes duplicate products by identity key, keeping the first-seen record.
///
/// Idempotent: `dedup_products(&dedup_products(x))` yields the same list.
#[must_use]
pub fn dedup_products(products: &[ProductRecord]) -> Vec<ProductRecord> {
    let mut seen = std::collections::HashSet::new();
    let mut unique = Vec::new();
    for product in products {
        if product.name.is_empty() {
            continue;
        }
        if seen.insert(product.identity_key()) {
            unique.push(product.clone());
        }
    }
    unique
}

/// At most one URL per social platform; the extractor keeps the first match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SocialHandles {
    pub instagram: Option<String>,
    pub facebook: Option<String>,
    pub twitter: Option<String>,
    pub tiktok: Option<String>,
    pub youtube: Option<String>,
    pub linkedin: Option<String>,
    pub pinterest: Option<String>,
}

impl SocialHandles {
    /// Platform names with a handle set, in declaration order.
    #[must_use]
    pub fn present_platforms(&self) -> Vec<&'static str> {
        let slots: [(&'static str, &Option<String>); 7] = [
            ("instagram", &self.instagram),
            ("facebook", &self.facebook),
            ("twitter", &self.twitter),
            ("tiktok", &self.tiktok),
            ("youtube", &self.youtube),
            ("linkedin", &self.linkedin),
            ("pinterest", &self.pinterest),
        ];
        slots
            .into_iter()
            .filter_map(|(name, value)| value.as_ref().map(|_| name))
            .collect()
    }
}

/// Contact data harvested from page text and contact forms.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactDetails {
    pub emails: Vec<String>,
    pub phone_numbers: Vec<String>,
    pub address: Option<String>,
    pub contact_form_url: Option<String>,
}

/// A policy document (privacy, return, refund, terms) discovered via links.
///
/// `content` is either the fetched body or a reference note pointing at the
/// policy URL when the body was not fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyRecord {
    pub title: String,
    pub content: String,
    pub url: Option<String>,
}

/// A question/answer pair with a category from a fixed vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqRecord {
    pub question: String,
    pub answer: String,
    /// One of the fixed FAQ categories; `"General"` when nothing matches.
    pub category: String,
}

/// Well-known storefront pages; at most one URL per slot, first match wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportantLinks {
    pub order_tracking: Option<String>,
    pub contact_us: Option<String>,
    pub blogs: Option<String>,
    pub about_us: Option<String>,
    pub shipping_info: Option<String>,
    pub size_guide: Option<String>,
    pub careers: Option<String>,
}

/// Complete profile of one storefront, assembled by the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandProfile {
    /// Normalized storefront URL; unique key for the persistence collaborator.
    pub storefront_url: String,
    pub brand_name: Option<String>,
    pub brand_description: Option<String>,
    pub logo_url: Option<String>,
    /// Ranked homepage-featured subset of the catalog.
    pub hero_products: Vec<ProductRecord>,
    /// Deduplicated full catalog.
    pub product_catalog: Vec<ProductRecord>,
    pub social_handles: SocialHandles,
    pub contact_details: ContactDetails,
    pub privacy_policy: Option<PolicyRecord>,
    pub return_policy: Option<PolicyRecord>,
    pub refund_policy: Option<PolicyRecord>,
    pub terms_of_service: Option<PolicyRecord>,
    pub faqs: Vec<FaqRecord>,
    pub important_links: ImportantLinks,
    pub currencies_supported: Vec<String>,
    pub payment_methods: Vec<String>,
    pub total_products: usize,
    pub extracted_at: DateTime<Utc>,
}

impl BrandProfile {
    /// Empty profile shell for `storefront_url`, timestamped now.
    #[must_use]
    pub fn new(storefront_url: String) -> Self {
        Self {
            storefront_url,
            brand_name: None,
            brand_description: None,
            logo_url: None,
            hero_products: Vec::new(),
            product_catalog: Vec::new(),
            social_handles: SocialHandles::default(),
            contact_details: ContactDetails::default(),
            privacy_policy: None,
            return_policy: None,
            refund_policy: None,
            terms_of_service: None,
            faqs: Vec::new(),
            important_links: ImportantLinks::default(),
            currencies_supported: Vec::new(),
            payment_methods: Vec::new(),
            total_products: 0,
            extracted_at: Utc::now(),
        }
    }
}

/// An unverified competitor discovered via search, pending validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitorCandidate {
    pub name: String,
    pub url: String,
    /// Which discovery path produced the candidate, e.g. `"search_duckduckgo"`
    /// or `"fallback"` for the static category list.
    pub source: String,
}
