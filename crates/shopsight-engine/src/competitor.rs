//! Competitor discovery and analysis types.
//!
//! Discovery categorizes the storefront, runs category-aware queries against
//! public search frontends, validates and deduplicates the results, and
//! falls back to a static category list when search yields nothing usable.
//! The per-candidate profile extraction lives with the orchestrator; this
//! module owns discovery and the aggregate summary.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use rand::Rng;
use scraper::Html;
use serde::{Deserialize, Serialize};
use shopsight_core::{BrandProfile, CompetitorCandidate};

use crate::detect::is_shopify;
use crate::dom::{select_all, select_first, text_of};
use crate::fetch::Fetcher;
use crate::text::{domain_of, is_valid_http_url};

/// Stop collecting search candidates once this many have been gathered.
const ENOUGH_CANDIDATES: usize = 20;

/// Category keyword table; first matching set wins, `"ecommerce"` otherwise.
const CATEGORY_KEYWORDS: [(&str, &[&str]); 10] = [
    ("fashion", &["fashion", "clothing", "apparel", "style", "wear", "dress", "shirt"]),
    ("beauty", &["beauty", "cosmetics", "skincare", "makeup", "fragrance", "perfume"]),
    ("fitness", &["fitness", "gym", "workout", "supplement", "protein", "nutrition"]),
    ("gaming", &["gaming", "gamer", "esports", "energy drink"]),
    ("electronics", &["electronics", "tech", "gadget", "device", "smartphone"]),
    ("home", &["home", "furniture", "decor", "kitchen", "living"]),
    ("jewelry", &["jewelry", "watch", "ring", "necklace", "bracelet"]),
    ("sports", &["sports", "athletic", "outdoor", "running", "basketball"]),
    ("food", &["food", "snack", "drink", "beverage", "organic"]),
    ("pet", &["pet", "dog", "cat", "animal", "puppy"]),
];

/// Non-commercial domains that search results are littered with.
const EXCLUDED_DOMAINS: [&str; 11] = [
    "google.com",
    "facebook.com",
    "instagram.com",
    "twitter.com",
    "youtube.com",
    "wikipedia.org",
    "amazon.com",
    "ebay.com",
    "linkedin.com",
    "reddit.com",
    "pinterest.com",
];

/// Known direct-to-consumer stores per category, used when search finds
/// nothing.
const FALLBACK_STORES: [(&str, &[(&str, &str)]); 5] = [
    (
        "gaming",
        &[
            ("Razer", "https://www.razer.com"),
            ("SteelSeries", "https://steelseries.com"),
            ("HyperX", "https://www.hyperxgaming.com"),
            ("Corsair", "https://www.corsair.com"),
        ],
    ),
    (
        "fashion",
        &[
            ("Allbirds", "https://www.allbirds.com"),
            ("Everlane", "https://www.everlane.com"),
            ("Bombas", "https://bombas.com"),
            ("Outdoor Voices", "https://outdoorvoices.com"),
        ],
    ),
    (
        "beauty",
        &[
            ("Glossier", "https://www.glossier.com"),
            ("ColourPop", "https://colourpop.com"),
            ("Fenty Beauty", "https://fentybeauty.com"),
            ("Kylie Cosmetics", "https://kyliecosmetics.com"),
        ],
    ),
    (
        "fitness",
        &[
            ("Gymshark", "https://www.gymshark.com"),
            ("Lululemon", "https://shop.lululemon.com"),
            ("Alo Yoga", "https://www.aloyoga.com"),
            ("Athletic Greens", "https://athleticgreens.com"),
        ],
    ),
    (
        "default",
        &[
            ("Allbirds", "https://www.allbirds.com"),
            ("ColourPop", "https://colourpop.com"),
            ("Gymshark", "https://www.gymshark.com"),
            ("Bombas", "https://bombas.com"),
        ],
    ),
];

/// One analyzed competitor with its full profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitorInsight {
    pub competitor_name: String,
    pub competitor_url: String,
    pub profile: BrandProfile,
}

/// Aggregates over the analyzed competitor profiles. Frequency lists are
/// sorted by count descending, name ascending on ties, top five entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total_competitors: usize,
    pub avg_products_per_store: usize,
    pub common_social_platforms: Vec<(String, usize)>,
    pub common_payment_methods: Vec<(String, usize)>,
    pub common_faq_categories: Vec<(String, usize)>,
}

/// Full competitor analysis result for one storefront.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitorAnalysis {
    pub original_brand: String,
    pub original_url: String,
    pub competitors_found: usize,
    pub competitors_analyzed: usize,
    pub competitor_insights: Vec<CompetitorInsight>,
    pub analysis_summary: AnalysisSummary,
}

/// Discovers likely competitors for a storefront.
///
/// Search backends are best-effort: every failure is absorbed, and an empty
/// result set falls back to the static category list.
pub async fn find_competitors(
    fetcher: &Fetcher,
    brand_name: &str,
    storefront_url: &str,
    max_results: usize,
) -> Vec<CompetitorCandidate> {
    if max_results == 0 {
        return Vec::new();
    }
    let category = categorize_storefront(fetcher, storefront_url).await;
    tracing::info!(category, "storefront categorized");

    let mut candidates = Vec::new();
    for query in build_queries(brand_name, &category, storefront_url) {
        candidates.extend(search_query(fetcher, &query, storefront_url).await);
        if candidates.len() >= ENOUGH_CANDIDATES {
            break;
        }
        politeness_delay().await;
    }

    let mut unique = dedup_candidates(candidates, storefront_url);
    if unique.is_empty() {
        tracing::info!("search found no competitors, using category fallback");
        unique = fallback_candidates(&category, storefront_url);
    }
    unique.truncate(max_results);
    unique
}

/// Fetches the storefront and classifies it by title, meta description and
/// leading paragraph text.
async fn categorize_storefront(fetcher: &Fetcher, url: &str) -> String {
    let Some(body) = fetcher.fetch(url).await else {
        return "ecommerce".to_owned();
    };
    let doc = Html::parse_document(&body);
    let root = doc.root_element();

    let mut text = String::new();
    if let Some(title) = select_first(root, &["title"]) {
        text.push_str(&text_of(title));
        text.push(' ');
    }
    if let Some(desc) = select_first(root, &[r#"meta[name="description"]"#]) {
        text.push_str(desc.value().attr("content").unwrap_or_default());
        text.push(' ');
    }
    for paragraph in select_all(root, "p").into_iter().take(3) {
        text.push_str(&text_of(paragraph));
        text.push(' ');
    }

    categorize_brand(&text).to_owned()
}

/// Keyword classification of free brand text.
#[must_use]
pub fn categorize_brand(text: &str) -> &'static str {
    let lower = text.to_lowercase();
    for (category, keywords) in CATEGORY_KEYWORDS {
        if keywords.iter().any(|k| lower.contains(k)) {
            return category;
        }
    }
    "ecommerce"
}

fn build_queries(brand_name: &str, category: &str, storefront_url: &str) -> Vec<String> {
    let domain = domain_of(storefront_url);
    let mut queries = vec![
        format!("{category} brands like {brand_name}"),
        format!("best {category} websites"),
        format!("{category} alternatives to {brand_name}"),
        format!("top {category} stores online"),
        format!("{brand_name} competitors"),
        format!("{category} ecommerce sites"),
        format!("similar to {brand_name}"),
        format!("{category} online shopping"),
    ];
    if !domain.is_empty() {
        queries.push(format!("sites like {domain}"));
        queries.push(format!("websites similar to {domain}"));
        queries.push(format!("alternatives to {domain}"));
    }
    queries.extend(industry_queries(category));
    queries
}

fn industry_queries(category: &str) -> Vec<String> {
    let curated: &[&str] = match category {
        "gaming" => &[
            "gaming supplement brands",
            "esports energy drinks",
            "gamer nutrition companies",
            "gaming lifestyle brands",
        ],
        "fashion" => &[
            "fashion ecommerce brands",
            "clothing online stores",
            "fashion retailers",
            "apparel brands",
        ],
        "beauty" => &[
            "beauty ecommerce sites",
            "cosmetics brands online",
            "skincare companies",
            "makeup retailers",
        ],
        "fitness" => &[
            "fitness supplement brands",
            "workout nutrition companies",
            "fitness apparel stores",
            "health supplement retailers",
        ],
        _ => {
            return vec![
                format!("{category} online brands"),
                format!("{category} ecommerce companies"),
                format!("{category} retail stores"),
                format!("{category} direct to consumer brands"),
            ]
        }
    };
    curated.iter().map(|q| (*q).to_owned()).collect()
}

/// Runs one query through the search backends in order; the first backend
/// that produces validated candidates wins.
async fn search_query(
    fetcher: &Fetcher,
    query: &str,
    original_url: &str,
) -> Vec<CompetitorCandidate> {
    let backends: [(&str, fn(&str) -> String, fn(&Html) -> Vec<String>); 3] = [
        ("duckduckgo", duckduckgo_url, parse_duckduckgo),
        ("bing", bing_url, parse_bing),
        ("startpage", startpage_url, parse_startpage),
    ];

    let timeout = Duration::from_secs(fetcher.config().platform_check_timeout_secs);
    for (backend, make_url, parse) in backends {
        let search_url = make_url(query);
        let Some(body) = fetcher.fetch_with_timeout(&search_url, timeout).await else {
            tracing::debug!(backend, query, "search backend unreachable");
            continue;
        };
        let urls = {
            let doc = Html::parse_document(&body);
            parse(&doc)
        };

        let mut candidates = Vec::new();
        for url in urls {
            if !is_valid_competitor_url(&url, original_url) {
                continue;
            }
            if verify_shopify(fetcher, &url, timeout).await {
                let name = display_name_from_url(&url);
                tracing::info!(name, url, "found storefront competitor");
                candidates.push(CompetitorCandidate {
                    name,
                    url,
                    source: format!("search_{backend}"),
                });
            }
        }
        if !candidates.is_empty() {
            return candidates;
        }
    }
    Vec::new()
}

fn encode_query(query: &str) -> String {
    utf8_percent_encode(query, NON_ALPHANUMERIC).to_string()
}

fn duckduckgo_url(query: &str) -> String {
    format!("https://duckduckgo.com/html/?q={}", encode_query(query))
}

fn bing_url(query: &str) -> String {
    format!("https://www.bing.com/search?q={}", encode_query(query))
}

fn startpage_url(query: &str) -> String {
    format!(
        "https://www.startpage.com/sp/search?query={}",
        encode_query(query)
    )
}

fn parse_duckduckgo(doc: &Html) -> Vec<String> {
    outbound_links(doc, "a.result__a", 15)
}

fn parse_bing(doc: &Html) -> Vec<String> {
    select_all(doc.root_element(), "a[href]")
        .into_iter()
        .filter_map(|a| a.value().attr("href").map(str::to_owned))
        .filter(|href| href.starts_with("http") && !href.contains("bing.com"))
        .take(20)
        .collect()
}

fn parse_startpage(doc: &Html) -> Vec<String> {
    outbound_links(doc, "a.w-gl__result-title", 15)
}

fn outbound_links(doc: &Html, selector: &str, limit: usize) -> Vec<String> {
    select_all(doc.root_element(), selector)
        .into_iter()
        .filter_map(|a| a.value().attr("href").map(str::to_owned))
        .filter(|href| href.starts_with("http"))
        .take(limit)
        .collect()
}

/// Re-fetches the candidate with a short timeout and confirms the platform
/// signatures.
async fn verify_shopify(fetcher: &Fetcher, url: &str, timeout: Duration) -> bool {
    match fetcher.fetch_with_timeout(url, timeout).await {
        Some(body) => is_shopify(&body, url),
        None => false,
    }
}

/// A candidate must live on a different domain, off the non-commercial
/// blocklist, and speak http(s).
#[must_use]
pub fn is_valid_competitor_url(url: &str, original_url: &str) -> bool {
    if !is_valid_http_url(url) {
        return false;
    }
    let domain = domain_of(url);
    if domain.is_empty() || domain == domain_of(original_url) {
        return false;
    }
    !EXCLUDED_DOMAINS.iter().any(|excluded| domain.contains(excluded))
}

/// `https://www.blue-widgets.com` → `"Blue Widgets"`.
#[must_use]
pub fn display_name_from_url(url: &str) -> String {
    let domain = domain_of(url);
    let stripped = domain.strip_prefix("www.").unwrap_or(&domain);
    let label = stripped.split('.').next().unwrap_or(stripped);
    label
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().collect::<String>() + chars.as_str()
    })
}

/// Dedup by normalized domain and display name; invalid candidates are
/// dropped here as well since fallback entries flow through the same path.
#[must_use]
pub fn dedup_candidates(
    candidates: Vec<CompetitorCandidate>,
    original_url: &str,
) -> Vec<CompetitorCandidate> {
    let mut seen_domains = HashSet::new();
    let mut seen_names = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| is_valid_competitor_url(&c.url, original_url))
        .filter(|c| {
            seen_domains.insert(domain_of(&c.url).to_lowercase())
                && seen_names.insert(c.name.to_lowercase())
        })
        .collect()
}

/// Static category-keyed fallback, validated against the original URL.
#[must_use]
pub fn fallback_candidates(category: &str, original_url: &str) -> Vec<CompetitorCandidate> {
    let stores = FALLBACK_STORES
        .iter()
        .find(|(cat, _)| *cat == category)
        .or_else(|| FALLBACK_STORES.iter().find(|(cat, _)| *cat == "default"))
        .map(|(_, stores)| *stores)
        .unwrap_or_default();

    stores
        .iter()
        .filter(|(_, url)| is_valid_competitor_url(url, original_url))
        .map(|(name, url)| CompetitorCandidate {
            name: (*name).to_owned(),
            url: (*url).to_owned(),
            source: "fallback".to_owned(),
        })
        .collect()
}

/// Aggregate summary over analyzed competitors.
#[must_use]
pub fn summarize(insights: &[CompetitorInsight]) -> AnalysisSummary {
    if insights.is_empty() {
        return AnalysisSummary::default();
    }

    let total_products: usize = insights
        .iter()
        .map(|c| c.profile.product_catalog.len())
        .sum();

    let mut social = Vec::new();
    let mut payments = Vec::new();
    let mut faq_categories = Vec::new();
    for insight in insights {
        social.extend(
            insight
                .profile
                .social_handles
                .present_platforms()
                .into_iter()
                .map(str::to_owned),
        );
        payments.extend(insight.profile.payment_methods.iter().cloned());
        faq_categories.extend(insight.profile.faqs.iter().map(|f| f.category.clone()));
    }

    AnalysisSummary {
        total_competitors: insights.len(),
        avg_products_per_store: total_products / insights.len(),
        common_social_platforms: top_five(social),
        common_payment_methods: top_five(payments),
        common_faq_categories: top_five(faq_categories),
    }
}

fn top_five(values: Vec<String>) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }
    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(5);
    ranked
}

/// Random 500-1000ms pause between search queries.
async fn politeness_delay() {
    let millis = rand::rng().random_range(500..=1000);
    tokio::time::sleep(Duration::from_millis(millis)).await;
}
