//! Hero product selection.
//!
//! Primary path ranks the already-loaded catalog by merchandising tags;
//! products tagged `homepage` always precede the rest of the hero vocabulary.
//! When no product carries a qualifying tag at all, prominent homepage
//! regions are scanned in document order instead.

use scraper::Html;
use shopsight_core::{dedup_products, ProductRecord};

use crate::dom::select_all;
use crate::extract::products::{product_from_element, product_from_link, products_from_section};

/// Merchandising tags that qualify a product for hero selection.
const HERO_TAGS: [&str; 31] = [
    "homepage",
    "hero",
    "featured",
    "main",
    "highlight",
    "spotlight",
    "bestseller",
    "best seller",
    "best-seller",
    "top seller",
    "top-seller",
    "trending",
    "popular",
    "most popular",
    "staff pick",
    "staff-pick",
    "editor choice",
    "editor-choice",
    "recommended",
    "must have",
    "must-have",
    "signature",
    "flagship",
    "star product",
    "star-product",
    "front page",
    "front-page",
    "home",
    "banner",
    "promo",
    "promotional",
];

const BESTSELLER_TAGS: [&str; 3] = ["bestseller", "best seller", "best-seller"];

/// With a `homepage`-tagged product present the cap is generous; otherwise
/// hero output stays tight.
const MAX_WITH_HOMEPAGE: usize = 10;
const MAX_WITHOUT_HOMEPAGE: usize = 6;
const MAX_BY_POSITION: usize = 6;

const HERO_SECTION_SELECTORS: [&str; 8] = [
    ".hero",
    ".hero-section",
    ".banner-hero",
    ".main-hero",
    ".homepage-hero",
    r#"[data-section-type="hero"]"#,
    ".slideshow",
    ".hero-banner",
];
const FEATURED_SECTION_SELECTORS: [&str; 8] = [
    ".featured-products",
    ".featured-collection",
    ".homepage-featured",
    r#"[data-section-type="featured-products"]"#,
    r#"[data-section-type="featured-collection"]"#,
    ".featured",
    ".best-sellers",
    ".trending-products",
];
const BANNER_SELECTORS: [&str; 6] = [
    ".banner",
    ".promo-banner",
    ".product-banner",
    ".promotional-banner",
    ".homepage-banner",
    ".collection-banner",
];
const CAROUSEL_SELECTORS: [&str; 8] = [
    ".carousel",
    ".slider",
    ".slideshow",
    ".product-slider",
    ".featured-slider",
    "[data-slick]",
    "[data-carousel]",
    ".swiper-container",
];
const HOMEPAGE_COLLECTION_SELECTORS: [&str; 5] = [
    ".homepage-collections",
    ".collection-list",
    ".featured-collections",
    ".collection-grid",
    ".collections-showcase",
];

/// Ranks the catalog's tag-qualifying products.
///
/// `homepage`-tagged products come first (up to 10 total); without any, the
/// remaining hero vocabulary yields up to 6. Products with no qualifying tag
/// are dropped. Sort is stable, so catalog order breaks score ties.
#[must_use]
pub fn rank_hero_products(catalog: &[ProductRecord]) -> Vec<ProductRecord> {
    let mut homepage: Vec<&ProductRecord> = Vec::new();
    let mut featured: Vec<&ProductRecord> = Vec::new();

    for product in catalog {
        if product.has_tag("homepage") {
            homepage.push(product);
        } else if product
            .tags
            .iter()
            .any(|t| HERO_TAGS.contains(&t.as_str()))
        {
            featured.push(product);
        }
    }

    homepage.sort_by_key(|p| std::cmp::Reverse(hero_score(p)));
    featured.sort_by_key(|p| std::cmp::Reverse(hero_score(p)));

    let cap = if homepage.is_empty() {
        MAX_WITHOUT_HOMEPAGE
    } else {
        MAX_WITH_HOMEPAGE
    };
    homepage
        .into_iter()
        .chain(featured)
        .take(cap)
        .cloned()
        .collect()
}

/// Tag-relevance plus completeness score.
fn hero_score(product: &ProductRecord) -> i32 {
    let mut score = 0i32;

    let matching = product
        .tags
        .iter()
        .filter(|t| HERO_TAGS.contains(&t.as_str()))
        .count();
    score += i32::try_from(matching).unwrap_or(i32::MAX) * 10;

    if product.has_tag("homepage") {
        score += 50;
    } else if product.has_tag("hero") {
        score += 30;
    } else if product.has_tag("featured") {
        score += 20;
    } else if BESTSELLER_TAGS.iter().any(|t| product.has_tag(t)) {
        score += 15;
    }

    if product.image_url.is_some() {
        score += 10;
    }
    if product.price.is_some() {
        score += 5;
    }
    if product.description.is_some() {
        score += 5;
    }

    score
}

/// Position fallback: pulls products from prominent homepage regions in
/// document order and scores by position and completeness.
#[must_use]
pub fn hero_products_by_position(doc: &Html, base_url: &str) -> Vec<ProductRecord> {
    let root = doc.root_element();
    let mut products = Vec::new();

    for selector in HERO_SECTION_SELECTORS {
        for section in select_all(root, selector) {
            products.extend(products_from_section(section, base_url));
            for anchor in select_all(section, r#"a[href*="/products/"]"#) {
                products.extend(product_from_link(anchor, base_url));
            }
        }
    }

    for selector in FEATURED_SECTION_SELECTORS {
        for section in select_all(root, selector) {
            products.extend(products_from_section(section, base_url));
        }
    }

    for selector in BANNER_SELECTORS {
        for banner in select_all(root, selector) {
            for anchor in select_all(banner, r#"a[href*="/products/"]"#) {
                products.extend(product_from_link(anchor, base_url));
            }
        }
    }

    for selector in CAROUSEL_SELECTORS {
        for carousel in select_all(root, selector) {
            products.extend(products_from_section(carousel, base_url));
        }
    }

    for selector in HOMEPAGE_COLLECTION_SELECTORS {
        for showcase in select_all(root, selector) {
            for item in select_all(showcase, r#"[class*="collection"]"#) {
                for product_el in select_all(item, r#"[class*="product"]"#) {
                    products.extend(product_from_element(product_el, base_url));
                }
            }
        }
    }

    let unique = dedup_products(&products);
    let mut scored: Vec<(i32, ProductRecord)> = unique
        .into_iter()
        .enumerate()
        .map(|(index, product)| {
            let mut score = 100 - i32::try_from(index).unwrap_or(i32::MAX);
            if product.image_url.is_some() {
                score += 20;
            }
            if product.price.is_some() {
                score += 15;
            }
            if product.description.is_some() {
                score += 10;
            }
            (score, product)
        })
        .collect();
    scored.sort_by_key(|(score, _)| std::cmp::Reverse(*score));
    scored
        .into_iter()
        .take(MAX_BY_POSITION)
        .map(|(_, product)| product)
        .collect()
}
