//! Policy link extraction.
//!
//! Keyword sets are checked in a fixed order per anchor, so a link mentioning
//! both "returns" and "refunds" lands in the return slot only. Policy bodies
//! are not fetched; the record carries a reference note with the resolved URL.

use scraper::Html;
use shopsight_core::PolicyRecord;

use crate::dom::{select_all, text_of};
use crate::text::resolve_url;

const PRIVACY_TERMS: [&str; 2] = ["privacy", "privacy-policy"];
const RETURN_TERMS: [&str; 3] = ["return", "returns", "return-policy"];
const REFUND_TERMS: [&str; 3] = ["refund", "refunds", "refund-policy"];
const TERMS_TERMS: [&str; 4] = ["terms", "tos", "terms-of-service", "terms-conditions"];

/// Policy slots discovered on one page. A record occupies at most one slot,
/// and each slot keeps its first match.
#[derive(Debug, Default)]
pub struct PolicySet {
    pub privacy_policy: Option<PolicyRecord>,
    pub return_policy: Option<PolicyRecord>,
    pub refund_policy: Option<PolicyRecord>,
    pub terms_of_service: Option<PolicyRecord>,
}

#[must_use]
pub fn extract_policies(doc: &Html, base_url: &str) -> PolicySet {
    let mut set = PolicySet::default();
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

        let (slot, title) = if matches(&PRIVACY_TERMS) {
            (&mut set.privacy_policy, "Privacy Policy")
        } else if matches(&RETURN_TERMS) {
            (&mut set.return_policy, "Return Policy")
        } else if matches(&REFUND_TERMS) {
            (&mut set.refund_policy, "Refund Policy")
        } else if matches(&TERMS_TERMS) {
            (&mut set.terms_of_service, "Terms of Service")
        } else {
            continue;
        };

        if slot.is_none() {
            if let Some(url) = resolve_url(href, base_url) {
                *slot = Some(PolicyRecord {
                    title: title.to_owned(),
                    content: format!("Policy available at: {url}"),
                    url: Some(url),
                });
            }
        }
    }
    set
}
