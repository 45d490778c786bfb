//! Well-known storefront link extraction (order tracking, contact, blog...).

use scraper::Html;
use shopsight_core::ImportantLinks;

use crate::dom::{select_all, text_of};
use crate::text::resolve_url;

const ORDER_TRACKING_TERMS: [&str; 4] = ["track", "tracking", "order-status", "track-order"];
const CONTACT_TERMS: [&str; 3] = ["contact", "contact-us", "get-in-touch"];
const BLOG_TERMS: [&str; 4] = ["blog", "blogs", "news", "articles"];
const ABOUT_TERMS: [&str; 3] = ["about", "about-us", "our-story"];
const SHIPPING_TERMS: [&str; 3] = ["shipping", "delivery", "shipping-info"];
const SIZE_GUIDE_TERMS: [&str; 4] = ["size", "size-guide", "sizing", "fit-guide"];
const CAREER_TERMS: [&str; 4] = ["career", "careers", "jobs", "join-us"];

/// One pass over all anchors; slots are tried in a fixed order per link and
/// each slot keeps its first match.
#[must_use]
pub fn extract_important_links(doc: &Html, base_url: &str) -> ImportantLinks {
    let mut links = ImportantLinks::default();
    for anchor in select_all(doc.root_element(), "a[href]") {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let href_lower = href.to_lowercase();
        let text_lower = text_of(anchor).to_lowercase();
        let matches = |terms: &[&str]| {
            terms
                .iter()
                .any(|t| href_lower.contains(t) || text_lower.contains(t))
        };

        let slot = if matches(&ORDER_TRACKING_TERMS) {
            &mut links.order_tracking
        } else if matches(&CONTACT_TERMS) {
            &mut links.contact_us
        } else if matches(&BLOG_TERMS) {
            &mut links.blogs
        } else if matches(&ABOUT_TERMS) {
            &mut links.about_us
        } else if matches(&SHIPPING_TERMS) {
            &mut links.shipping_info
        } else if matches(&SIZE_GUIDE_TERMS) {
            &mut links.size_guide
        } else if matches(&CAREER_TERMS) {
            &mut links.careers
        } else {
            continue;
        };

        if slot.is_none() {
            *slot = resolve_url(href, base_url);
        }
    }
    links
}
