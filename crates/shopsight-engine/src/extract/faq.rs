//! FAQ extraction: in-page parsing plus discovery of dedicated FAQ pages.
//!
//! Storefronts publish FAQs in three recurring shapes: header-plus-flow
//! (a heading followed by paragraphs), accordion items, and definition
//! lists. Each block is tried in that order and the first shape that yields
//! pairs wins for that container.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html};
use serde::Deserialize;
use shopsight_core::FaqRecord;

use crate::dom::{select_all, select_first, text_of};
use crate::fetch::Fetcher;

const PAGE_CONTAINER_SELECTORS: &str = concat!(
    r#"div[class*="faq" i], section[class*="faq" i], "#,
    r#"div[class*="question" i], section[class*="question" i], "#,
    r#"div[class*="help" i], section[class*="help" i]"#
);
const PAGE_CONTAINER_ID_SELECTORS: &str = concat!(
    r#"div[id*="faq" i], section[id*="faq" i], "#,
    r#"div[id*="question" i], section[id*="question" i], "#,
    r#"div[id*="help" i], section[id*="help" i]"#
);
const ACCORDION_SELECTORS: &str = concat!(
    r#"div[class*="accordion" i], section[class*="accordion" i], "#,
    r#"div[class*="toggle" i], section[class*="toggle" i], "#,
    r#"div[class*="collaps" i], section[class*="collaps" i], "#,
    r#"div[class*="expand" i], section[class*="expand" i]"#
);
const ACCORDION_ANSWER_SELECTORS: &str = concat!(
    r#"div[class*="content" i], div[class*="answer" i], div[class*="body" i], "#,
    r#"p[class*="content" i], p[class*="answer" i], p[class*="body" i]"#
);

/// Conventional FAQ page paths, tried in order.
const FAQ_PATHS: [&str; 8] = [
    "/pages/faq",
    "/pages/frequently-asked-questions",
    "/pages/help",
    "/pages/support",
    "/pages/customer-service",
    "/faq",
    "/help",
    "/support",
];

const MIN_QUESTION_LEN: usize = 5;
const MIN_ANSWER_LEN: usize = 10;

/// Headers matching these are section labels, not questions.
static CATEGORY_HEADER_RES: LazyLock<[Regex; 5]> = LazyLock::new(|| {
    [
        Regex::new(r"^(general|shipping|payment|product|account|subscription|support).*info.*$")
            .expect("valid regex"),
        Regex::new(r"^(faq|faqs)$").expect("valid regex"),
        Regex::new(r"^.*information$").expect("valid regex"),
        Regex::new(r"^additional.*$").expect("valid regex"),
        Regex::new(r"^.*program.*faq.*$").expect("valid regex"),
    ]
});

/// Keyword sets per category, checked in order; first hit wins.
const CATEGORY_KEYWORDS: [(&[&str], &str); 7] = [
    (&["ship", "deliver", "order", "track"], "Shipping & Orders"),
    (&["return", "refund", "exchange", "warranty"], "Returns & Refunds"),
    (
        &["payment", "billing", "credit", "paypal", "price"],
        "Payment & Billing",
    ),
    (
        &["account", "login", "password", "profile"],
        "Account & Profile",
    ),
    (
        &["product", "size", "ingredient", "material", "specification"],
        "Product Information",
    ),
    (
        &["subscription", "recurring", "auto", "membership"],
        "Subscription",
    ),
    (
        &["contact", "support", "help", "phone", "email"],
        "Customer Support",
    ),
];

/// Vendor page envelope from `GET /pages/{handle}.json`.
#[derive(Debug, Deserialize)]
struct PageEnvelope {
    #[serde(default)]
    page: Option<PageBody>,
}

#[derive(Debug, Deserialize)]
struct PageBody {
    #[serde(default)]
    body_html: Option<String>,
}

/// FAQs present on the already-fetched page, deduplicated by question.
#[must_use]
pub fn extract_page_faqs(doc: &Html) -> Vec<FaqRecord> {
    let root = doc.root_element();
    let mut containers = select_all(root, PAGE_CONTAINER_SELECTORS);
    if containers.is_empty() {
        containers = select_all(root, PAGE_CONTAINER_ID_SELECTORS);
    }

    let mut faqs = Vec::new();
    for container in containers {
        faqs.extend(parse_faq_block(container));
    }
    dedup_faqs(faqs)
}

/// Fetches conventional FAQ pages, preferring each page's vendor JSON body
/// over raw HTML. Unreachable paths are skipped silently.
pub async fn discover_faqs(fetcher: &Fetcher, base_url: &str) -> Vec<FaqRecord> {
    let base = base_url.trim_end_matches('/');
    let mut faqs = Vec::new();

    for path in FAQ_PATHS {
        let url = format!("{base}{path}");

        if let Some(envelope) = fetcher.fetch_json::<PageEnvelope>(&format!("{url}.json")).await {
            if let Some(body) = envelope
                .page
                .and_then(|p| p.body_html)
                .filter(|b| !b.is_empty())
            {
                let fragment = Html::parse_fragment(&body);
                let found = parse_faq_block(fragment.root_element());
                if !found.is_empty() {
                    tracing::debug!(url, count = found.len(), "FAQs from vendor page JSON");
                    faqs.extend(found);
                    continue;
                }
            }
        }

        if let Some(body) = fetcher.fetch(&url).await {
            let doc = Html::parse_document(&body);
            let mut found = extract_page_faqs(&doc);
            if found.is_empty() {
                // Whole-page fallback for FAQ pages without marked containers.
                if let Some(main) = select_first(doc.root_element(), &["main", "article", ".content"])
                {
                    found = parse_faq_block(main);
                }
            }
            if !found.is_empty() {
                tracing::debug!(url, count = found.len(), "FAQs from dedicated page");
            }
            faqs.extend(found);
        }
    }

    dedup_faqs(faqs)
}

/// Removes duplicate entries by lowercased question, keeping the first.
#[must_use]
pub fn dedup_faqs(faqs: Vec<FaqRecord>) -> Vec<FaqRecord> {
    let mut seen = HashSet::new();
    faqs.into_iter()
        .filter(|faq| seen.insert(faq.question.trim().to_lowercase()))
        .collect()
}

/// Parses question/answer pairs out of one container element.
#[must_use]
pub fn parse_faq_block(el: ElementRef<'_>) -> Vec<FaqRecord> {
    let mut faqs = parse_header_flow(el);
    if faqs.is_empty() {
        faqs = parse_accordions(el);
    }
    if faqs.is_empty() {
        faqs = parse_definition_lists(el);
    }
    faqs
}

fn is_header(name: &str) -> bool {
    matches!(name, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

/// Header followed by sibling flow content until the next header.
fn parse_header_flow(el: ElementRef<'_>) -> Vec<FaqRecord> {
    let mut faqs = Vec::new();
    for header in select_all(el, "h1, h2, h3, h4, h5, h6") {
        let question = text_of(header);
        if question.len() < MIN_QUESTION_LEN || is_category_header(&question) {
            continue;
        }

        let mut answer_parts = Vec::new();
        for sibling in header.next_siblings() {
            let Some(sib) = ElementRef::wrap(sibling) else {
                continue;
            };
            let name = sib.value().name();
            if is_header(name) {
                break;
            }
            if matches!(name, "p" | "div" | "ul" | "ol" | "li") {
                let text = text_of(sib);
                if !text.is_empty() {
                    answer_parts.push(text);
                }
            }
        }

        let answer = answer_parts.join(" ");
        if answer.len() > MIN_ANSWER_LEN {
            faqs.push(make_faq(question, answer));
        }
    }
    faqs
}

fn parse_accordions(el: ElementRef<'_>) -> Vec<FaqRecord> {
    let mut faqs = Vec::new();
    for item in select_all(el, ACCORDION_SELECTORS) {
        let question = select_first(item, &["h1, h2, h3, h4, h5, h6, button, summary"])
            .map(text_of)
            .unwrap_or_default();
        let answer = select_first(item, &[ACCORDION_ANSWER_SELECTORS])
            .map(text_of)
            .unwrap_or_default();
        if question.len() > MIN_QUESTION_LEN && answer.len() > MIN_ANSWER_LEN {
            faqs.push(make_faq(question, answer));
        }
    }
    faqs
}

fn parse_definition_lists(el: ElementRef<'_>) -> Vec<FaqRecord> {
    let mut faqs = Vec::new();
    for dl in select_all(el, "dl") {
        let terms = select_all(dl, "dt");
        let definitions = select_all(dl, "dd");
        for (dt, dd) in terms.into_iter().zip(definitions) {
            let question = text_of(dt);
            let answer = text_of(dd);
            if question.len() > MIN_QUESTION_LEN && answer.len() > MIN_ANSWER_LEN {
                faqs.push(make_faq(question, answer));
            }
        }
    }
    faqs
}

fn make_faq(question: String, answer: String) -> FaqRecord {
    let category = categorize_question(&question).to_owned();
    FaqRecord {
        question,
        answer,
        category,
    }
}

/// Maps a question to the fixed category vocabulary; `"General"` when no
/// keyword set matches.
#[must_use]
pub fn categorize_question(question: &str) -> &'static str {
    let lower = question.to_lowercase();
    for (keywords, category) in CATEGORY_KEYWORDS {
        if keywords.iter().any(|k| lower.contains(k)) {
            return category;
        }
    }
    "General"
}

fn is_category_header(text: &str) -> bool {
    let lower = text.trim().to_lowercase();
    CATEGORY_HEADER_RES.iter().any(|re| re.is_match(&lower))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_header_flow_pairs() {
        let doc = Html::parse_document(
            r#"
            <div class="faq-section">
              <h3>FAQs</h3>
              <h3>How long does shipping take?</h3>
              <p>Orders ship within 2 business days.</p>
              <p>International orders take longer.</p>
              <h3>Can I return an item?</h3>
              <p>Yes, within 30 days of delivery.</p>
            </div>
        "#,
        );
        let faqs = extract_page_faqs(&doc);
        assert_eq!(faqs.len(), 2);
        assert_eq!(faqs[0].question, "How long does shipping take?");
        assert_eq!(
            faqs[0].answer,
            "Orders ship within 2 business days. International orders take longer."
        );
        assert_eq!(faqs[0].category, "Shipping & Orders");
        assert_eq!(faqs[1].category, "Returns & Refunds");
    }

    #[test]
    fn parses_accordion_pairs() {
        let doc = Html::parse_document(
            r#"
            <section class="faq">
              <div class="accordion-item">
                <button>Do you accept PayPal?</button>
                <div class="accordion-content">Yes, PayPal and all major cards.</div>
              </div>
            </section>
        "#,
        );
        let faqs = extract_page_faqs(&doc);
        assert_eq!(faqs.len(), 1);
        assert_eq!(faqs[0].category, "Payment & Billing");
    }

    #[test]
    fn parses_definition_lists() {
        let doc = Html::parse_document(
            r#"
            <div class="help-center">
              <dl>
                <dt>How do I reset my password?</dt>
                <dd>Use the reset link on the login page.</dd>
              </dl>
            </div>
        "#,
        );
        let faqs = extract_page_faqs(&doc);
        assert_eq!(faqs.len(), 1);
        assert_eq!(faqs[0].category, "Account & Profile");
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let faqs = vec![
            FaqRecord {
                question: "How long does shipping take?".to_owned(),
                answer: "Two days.".to_owned(),
                category: "Shipping & Orders".to_owned(),
            },
            FaqRecord {
                question: "HOW LONG DOES SHIPPING TAKE?".to_owned(),
                answer: "Different answer.".to_owned(),
                category: "Shipping & Orders".to_owned(),
            },
        ];
        let unique = dedup_faqs(faqs);
        assert_eq!(unique.len(), 1);
        assert_eq!(unique[0].answer, "Two days.");
    }

    #[test]
    fn category_headers_are_not_questions() {
        assert!(is_category_header("Shipping Information"));
        assert!(is_category_header("FAQs"));
        assert!(!is_category_header("How do I track my order?"));
    }

    #[test]
    fn uncategorized_question_is_general() {
        assert_eq!(categorize_question("What is your favorite color?"), "General");
    }
}
