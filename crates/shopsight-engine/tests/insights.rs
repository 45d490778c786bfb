//! End-to-end tests for `InsightsEngine`.
//!
//! Each test stands up a `wiremock` storefront; anything not explicitly
//! mocked returns 404, which the engine must absorb. Covers the vendor JSON
//! happy path, vendor page batching, the page-scraping fallback, FAQ page
//! discovery, competitor analysis inputs, and both fatal error variants.

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shopsight_core::EngineConfig;
use shopsight_engine::{EngineError, InsightsEngine};

/// Engine with no throttle and no retries, so unmocked 404s return fast.
fn test_engine() -> InsightsEngine {
    let config = EngineConfig {
        max_retries: 0,
        rate_limit_delay_ms: 0,
        competitor_delay_ms: 0,
        user_agents: vec!["shopsight-test/0.1".to_owned()],
        ..EngineConfig::default()
    };
    InsightsEngine::new(&config).expect("failed to build test InsightsEngine")
}

const HOMEPAGE: &str = r#"<html>
  <head>
    <title>Acme Threads | Shop</title>
    <meta name="description" content="Premium organic cotton basics for everyday wear, made to last.">
    <script src="https://cdn.shopify.com/s/files/1/0001/theme.js"></script>
    <script>
      Shopify.shop = "acme-threads.myshopify.com";
      Shopify.currency = {"active":"USD","rate":"1.0"};
    </script>
  </head>
  <body>
    <a href="https://www.instagram.com/acmethreads">Instagram</a>
    <a href="https://www.facebook.com/acmethreads">Facebook</a>
    <footer>
      <a href="/pages/contact">Contact Us</a>
      <a href="/policies/privacy-policy">Privacy Policy</a>
      <p>Questions? Email support@acmethreads.com</p>
    </footer>
  </body>
</html>"#;

fn vendor_catalog() -> serde_json::Value {
    serde_json::json!({
        "products": [
            {
                "title": "Hero Product",
                "handle": "hero-product",
                "body_html": "<p>Our signature tee.</p>",
                "tags": ["Homepage"],
                "images": [{"src": "https://cdn.example/hero-product.png"}],
                "variants": [{"title": "Default Title", "price": "29.99", "compare_at_price": null}]
            },
            {
                "title": "Plain Tee",
                "handle": "plain-tee",
                "body_html": null,
                "tags": [],
                "images": [],
                "variants": [{"title": "Default Title", "price": "19.99", "compare_at_price": null}]
            }
        ]
    })
}

#[tokio::test]
async fn extracts_full_profile_from_vendor_catalog() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(HOMEPAGE))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&vendor_catalog()))
        .mount(&server)
        .await;

    let profile = test_engine()
        .extract_insights(&server.uri())
        .await
        .expect("extraction should succeed");

    assert_eq!(profile.brand_name.as_deref(), Some("Acme Threads"));
    assert!(profile
        .brand_description
        .as_deref()
        .is_some_and(|d| d.contains("organic cotton")));
    assert_eq!(profile.currencies_supported, vec!["USD"]);

    assert_eq!(profile.total_products, 2);
    assert_eq!(profile.product_catalog.len(), 2);
    assert_eq!(profile.hero_products.len(), 1);
    assert_eq!(profile.hero_products[0].name, "Hero Product");
    assert_eq!(profile.hero_products[0].price.as_deref(), Some("$29.99"));

    assert!(profile.social_handles.instagram.is_some());
    assert!(profile.social_handles.facebook.is_some());
    assert!(profile
        .contact_details
        .emails
        .contains(&"support@acmethreads.com".to_owned()));
    assert!(profile
        .privacy_policy
        .as_ref()
        .and_then(|p| p.url.as_deref())
        .is_some_and(|u| u.ends_with("/policies/privacy-policy")));
    assert!(profile.important_links.contact_us.is_some());
    assert!(profile.faqs.is_empty());
}

#[tokio::test]
async fn falls_back_to_page_scraping_without_vendor_catalog() {
    let server = MockServer::start().await;

    let homepage = r#"<html>
      <head><script src="https://cdn.shopify.com/theme.js"></script></head>
      <body><a href="/products/canvas-tote">Canvas Tote</a></body>
    </html>"#;
    let product_page = r#"<html><body>
      <script type="application/ld+json">
        {"@context":"https://schema.org","@type":"Product","name":"Canvas Tote",
         "offers":{"@type":"Offer","price":"45.00","priceCurrency":"USD"}}
      </script>
    </body></html>"#;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(homepage))
        .mount(&server)
        .await;
    // products.json stays unmocked (404), forcing the fallback path.
    Mock::given(method("GET"))
        .and(path("/products/canvas-tote"))
        .respond_with(ResponseTemplate::new(200).set_body_string(product_page))
        .mount(&server)
        .await;

    let profile = test_engine()
        .extract_insights(&server.uri())
        .await
        .expect("extraction should succeed");

    assert_eq!(profile.total_products, 1);
    assert_eq!(profile.product_catalog[0].name, "Canvas Tote");
    assert_eq!(profile.product_catalog[0].price.as_deref(), Some("$45.00"));
}

/// Vendor page with `count` generated products starting at index `start`.
fn vendor_page(start: usize, count: usize) -> serde_json::Value {
    serde_json::json!({
        "products": (start..start + count).map(|i| serde_json::json!({
            "title": format!("Item {i}"),
            "handle": format!("item-{i}"),
            "variants": [{"title": "Default Title", "price": "10.00"}]
        })).collect::<Vec<_>>()
    })
}

#[tokio::test]
async fn pages_through_vendor_catalog_until_short_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><head><script src="https://cdn.shopify.com/theme.js"></script></head></html>"#,
        ))
        .mount(&server)
        .await;
    // Page 1 is full (250 entries), page 2 is short and ends pagination.
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&vendor_page(0, 250)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&vendor_page(250, 1)))
        .mount(&server)
        .await;

    let profile = test_engine()
        .extract_insights(&server.uri())
        .await
        .expect("extraction should succeed");

    assert_eq!(profile.total_products, 251);
    assert_eq!(profile.product_catalog.len(), 251);
}

#[tokio::test]
async fn vendor_paging_fetches_bounded_batches_of_five() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><head><script src="https://cdn.shopify.com/theme.js"></script></head></html>"#,
        ))
        .mount(&server)
        .await;
    // Pages 1 through 5 are full, so paging must continue into a second
    // batch. Page 6 is short; 7 through 10 stay unmocked and 404.
    for page in 1..=5usize {
        Mock::given(method("GET"))
            .and(path("/products.json"))
            .and(query_param("page", page.to_string()))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(&vendor_page((page - 1) * 250, 250)),
            )
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("page", "6"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&vendor_page(1250, 1)))
        .mount(&server)
        .await;

    let profile = test_engine()
        .extract_insights(&server.uri())
        .await
        .expect("extraction should succeed");

    assert_eq!(profile.total_products, 1251);
    // First product must come from page 1: batches are collected in page
    // order even though fetches within a batch run concurrently.
    assert_eq!(profile.product_catalog[0].name, "Item 0");

    let vendor_hits = server
        .received_requests()
        .await
        .expect("request recording enabled")
        .iter()
        .filter(|r| r.url.path() == "/products.json")
        .count();
    assert_eq!(
        vendor_hits, 10,
        "expected exactly two batches of five vendor page fetches"
    );
}

#[tokio::test]
async fn fallback_scraping_is_capped_at_one_hundred_pages() {
    let server = MockServer::start().await;

    let anchors: String = (0..120)
        .map(|i| format!(r#"<a href="/products/item-{i}">Item {i}</a>"#))
        .collect();
    let homepage = format!(
        r#"<html><head><script src="https://cdn.shopify.com/theme.js"></script></head>
        <body>{anchors}</body></html>"#
    );

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(homepage))
        .mount(&server)
        .await;
    // products.json stays unmocked (404), forcing the fallback path.
    Mock::given(method("GET"))
        .and(wiremock::matchers::path_regex("^/products/item-"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    test_engine()
        .extract_insights(&server.uri())
        .await
        .expect("extraction should succeed");

    let product_page_hits = server
        .received_requests()
        .await
        .expect("request recording enabled")
        .iter()
        .filter(|r| r.url.path().starts_with("/products/item-"))
        .count();
    assert_eq!(product_page_hits, 100, "expected the fallback URL cap to hold");
}

#[tokio::test]
async fn discovers_faqs_from_well_known_page() {
    let server = MockServer::start().await;

    let homepage = r#"<html>
      <head><script src="https://cdn.shopify.com/theme.js"></script></head>
      <body>Welcome</body>
    </html>"#;
    let faq_page = r#"<html><body>
      <div class="faq-section">
        <h3>How long does shipping take?</h3>
        <p>Orders ship within 2 business days and arrive in 3 to 5 days.</p>
        <h3>What is your return policy?</h3>
        <p>Returns are accepted within 30 days of delivery.</p>
      </div>
    </body></html>"#;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(homepage))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pages/faq"))
        .respond_with(ResponseTemplate::new(200).set_body_string(faq_page))
        .mount(&server)
        .await;

    let profile = test_engine()
        .extract_insights(&server.uri())
        .await
        .expect("extraction should succeed");

    assert_eq!(profile.faqs.len(), 2);
    assert_eq!(profile.faqs[0].question, "How long does shipping take?");
    assert_eq!(profile.faqs[0].category, "Shipping & Orders");
    assert_eq!(profile.faqs[1].category, "Returns & Refunds");
}

#[tokio::test]
async fn competitor_analysis_carries_caller_brand_without_refetching() {
    let server = MockServer::start().await;

    let analysis = test_engine()
        .analyze_competitors("Acme Threads", &server.uri(), 0)
        .await
        .expect("analysis should succeed");

    assert_eq!(analysis.original_brand, "Acme Threads");
    assert_eq!(analysis.competitors_found, 0);
    assert!(analysis.competitor_insights.is_empty());

    let requests = server
        .received_requests()
        .await
        .expect("request recording enabled");
    assert!(
        requests.is_empty(),
        "the caller-supplied brand name must not trigger a storefront fetch"
    );
}

#[tokio::test]
async fn rejects_malformed_storefront_url() {
    let result = test_engine().extract_insights("not a url").await;
    assert!(
        matches!(result, Err(EngineError::InvalidUrl { .. })),
        "expected InvalidUrl, got: {result:?}"
    );
}

#[tokio::test]
async fn unreachable_homepage_is_fatal() {
    // No mocks mounted: every request 404s, including the homepage.
    let server = MockServer::start().await;

    let result = test_engine().extract_insights(&server.uri()).await;
    assert!(
        matches!(result, Err(EngineError::Unreachable { .. })),
        "expected Unreachable, got: {result:?}"
    );
}
