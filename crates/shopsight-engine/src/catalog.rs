//! Catalog discovery.
//!
//! The vendor JSON endpoint is the primary path; when it is missing or empty
//! the discovery degrades to harvesting product URLs from collection pages,
//! the homepage, and the sitemap, then scraping each product page. Failures
//! of individual sources are logged and skipped, never propagated.

use std::collections::HashSet;

use futures::future::join_all;
use futures::stream::{self, StreamExt};
use quick_xml::events::Event;
use quick_xml::Reader;
use scraper::{ElementRef, Html};
use shopsight_core::{dedup_products, ProductRecord};

use crate::dom::select_all;
use crate::extract::extract_page_products;
use crate::fetch::Fetcher;
use crate::shopify::{convert_product, products_page_url, VendorProductsResponse};
use crate::text::{resolve_url, store_origin};

const PAGE_LIMIT: u32 = 250;
/// Guard against stores that serve the same page forever.
const MAX_VENDOR_PAGES: u32 = 40;

const COLLECTION_PATHS: [&str; 3] = ["/collections/all", "/collections", "/products"];
const MAX_LINKS_PER_COLLECTION: usize = 10;
/// Hard cap on fallback product-page fetches.
const MAX_FALLBACK_URLS: usize = 100;

/// Discovers the full product catalog for a storefront.
///
/// `homepage_html` is the already-fetched homepage body; the fallback path
/// mines it for product links without refetching.
pub async fn discover_catalog(
    fetcher: &Fetcher,
    base_url: &str,
    homepage_html: &str,
) -> Vec<ProductRecord> {
    let primary = fetch_vendor_catalog(fetcher, base_url).await;
    if !primary.is_empty() {
        tracing::info!(count = primary.len(), "catalog loaded from vendor JSON");
        return primary;
    }

    tracing::warn!(base_url, "vendor catalog unavailable, falling back to page scraping");
    fallback_catalog(fetcher, base_url, homepage_html).await
}

/// Pages through `products.json` in concurrent batches of
/// `catalog_concurrency` pages, stopping at the first failed, empty, or
/// short page.
async fn fetch_vendor_catalog(fetcher: &Fetcher, base_url: &str) -> Vec<ProductRecord> {
    let origin = store_origin(base_url);
    let batch_size =
        u32::try_from(fetcher.config().catalog_concurrency.max(1)).unwrap_or(MAX_VENDOR_PAGES);
    let mut all = Vec::new();

    let mut first_page = 1u32;
    'pages: while first_page <= MAX_VENDOR_PAGES {
        let last_page = first_page.saturating_add(batch_size - 1).min(MAX_VENDOR_PAGES);
        let batch = join_all((first_page..=last_page).map(|page| {
            let url = products_page_url(&origin, PAGE_LIMIT, page);
            async move { fetcher.fetch_json::<VendorProductsResponse>(&url).await }
        }))
        .await;

        // Responses are walked in page order so dedup stays first-seen.
        for response in batch {
            let Some(response) = response else {
                break 'pages;
            };
            if response.products.is_empty() {
                break 'pages;
            }
            let page_count = response.products.len();
            all.extend(
                response
                    .products
                    .iter()
                    .filter_map(|p| convert_product(base_url, p)),
            );
            if page_count < PAGE_LIMIT as usize {
                break 'pages;
            }
        }
        first_page = last_page + 1;
    }

    dedup_products(&all)
}

/// Scrapes discovered product pages with bounded concurrency.
async fn fallback_catalog(
    fetcher: &Fetcher,
    base_url: &str,
    homepage_html: &str,
) -> Vec<ProductRecord> {
    let urls = discover_product_urls(fetcher, base_url, homepage_html).await;
    if urls.is_empty() {
        return Vec::new();
    }
    tracing::info!(count = urls.len(), "scraping product pages");

    let pages: Vec<Vec<ProductRecord>> = stream::iter(urls)
        .map(|url| async move {
            match fetcher.fetch(&url).await {
                Some(body) => {
                    let doc = Html::parse_document(&body);
                    extract_page_products(&doc, &url)
                }
                None => {
                    tracing::debug!(url, "product page unreachable, skipping");
                    Vec::new()
                }
            }
        })
        .buffer_unordered(fetcher.config().fallback_concurrency)
        .collect()
        .await;

    let all: Vec<ProductRecord> = pages.into_iter().flatten().collect();
    dedup_products(&all)
}

/// Union of product URLs from collection pages, homepage anchors, and the
/// sitemap, first-seen order, capped at [`MAX_FALLBACK_URLS`].
async fn discover_product_urls(
    fetcher: &Fetcher,
    base_url: &str,
    homepage_html: &str,
) -> Vec<String> {
    let base = base_url.trim_end_matches('/');
    let mut seen = HashSet::new();
    let mut urls = Vec::new();
    let mut push = |url: String| {
        if seen.insert(url.clone()) {
            urls.push(url);
        }
    };

    for path in COLLECTION_PATHS {
        let page_url = format!("{base}{path}");
        let Some(body) = fetcher.fetch(&page_url).await else {
            tracing::debug!(url = page_url, "collection page unreachable, skipping");
            continue;
        };
        let links = {
            let doc = Html::parse_document(&body);
            product_links(doc.root_element(), base_url, MAX_LINKS_PER_COLLECTION)
        };
        for link in links {
            push(link);
        }
    }

    let homepage_links = {
        let doc = Html::parse_document(homepage_html);
        product_links(doc.root_element(), base_url, usize::MAX)
    };
    for link in homepage_links {
        push(link);
    }

    match fetcher.fetch(&format!("{base}/sitemap.xml")).await {
        Some(xml) => {
            for link in sitemap_product_urls(&xml) {
                push(link);
            }
        }
        None => tracing::debug!("sitemap unreachable, skipping"),
    }

    urls.truncate(MAX_FALLBACK_URLS);
    urls
}

/// Resolved `/products/` anchor targets, up to `limit`.
fn product_links(root: ElementRef<'_>, base_url: &str, limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for anchor in select_all(root, r#"a[href*="/products/"]"#) {
        if links.len() >= limit {
            break;
        }
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if let Some(url) = resolve_url(href, base_url) {
            if seen.insert(url.clone()) {
                links.push(url);
            }
        }
    }
    links
}

/// `url/loc` entries from a sitemap, filtered to product pages. Handles
/// namespace-qualified element names.
fn sitemap_product_urls(xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut urls = Vec::new();
    let mut in_loc = false;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"loc" => in_loc = true,
            Ok(Event::End(e)) if e.local_name().as_ref() == b"loc" => in_loc = false,
            Ok(Event::Text(t)) if in_loc => {
                if let Ok(text) = t.unescape() {
                    let url = text.trim().to_owned();
                    if url.contains("/products/") {
                        urls.push(url);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                tracing::debug!(error = %err, "sitemap parse error");
                break;
            }
            _ => {}
        }
    }
    urls
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sitemap_filters_to_product_urls() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
            <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
              <url><loc>https://shop.example/products/widget</loc></url>
              <url><loc>https://shop.example/pages/about</loc></url>
              <url><loc>https://shop.example/products/gadget</loc></url>
            </urlset>"#;
        assert_eq!(
            sitemap_product_urls(xml),
            vec![
                "https://shop.example/products/widget",
                "https://shop.example/products/gadget"
            ]
        );
    }

    #[test]
    fn sitemap_garbage_yields_empty() {
        assert!(sitemap_product_urls("<urlset><url>").is_empty());
        assert!(sitemap_product_urls("not xml at all").is_empty());
    }

    #[test]
    fn product_links_respects_limit_and_dedups() {
        let html = r#"
            <a href="/products/a">A</a>
            <a href="/products/a">A again</a>
            <a href="/products/b">B</a>
            <a href="/products/c">C</a>
            <a href="/pages/about">About</a>
        "#;
        let doc = Html::parse_document(html);
        let links = product_links(doc.root_element(), "https://shop.example", 2);
        assert_eq!(
            links,
            vec![
                "https://shop.example/products/a",
                "https://shop.example/products/b"
            ]
        );
    }
}
