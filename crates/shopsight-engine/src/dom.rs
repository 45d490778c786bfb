//! Selector-probe helpers over a parsed document.
//!
//! Extraction strategies are expressed as ordered selector lists; these
//! helpers walk such a list and return the first usable hit. Invalid
//! selectors are skipped rather than surfaced, so a bad entry in a cascade
//! degrades to the next strategy.

use scraper::{ElementRef, Selector};

use crate::text::clean_text;

/// Cleaned text content of an element and its descendants.
#[must_use]
pub fn text_of(el: ElementRef<'_>) -> String {
    clean_text(&el.text().collect::<Vec<_>>().join(" "))
}

/// First element matched by any selector in the list, in list order.
#[must_use]
pub fn select_first<'a>(root: ElementRef<'a>, selectors: &[&str]) -> Option<ElementRef<'a>> {
    selectors.iter().find_map(|s| {
        let sel = Selector::parse(s).ok()?;
        root.select(&sel).next()
    })
}

/// All elements matched by one selector; empty when the selector is invalid.
#[must_use]
pub fn select_all<'a>(root: ElementRef<'a>, selector: &str) -> Vec<ElementRef<'a>> {
    Selector::parse(selector)
        .map(|sel| root.select(&sel).collect())
        .unwrap_or_default()
}

/// Probes selectors in order and returns the first non-empty cleaned text.
///
/// A selector that matches an element with only whitespace does not stop the
/// cascade; the next selector is tried.
#[must_use]
pub fn probe_text(root: ElementRef<'_>, selectors: &[&str]) -> Option<String> {
    selectors.iter().find_map(|s| {
        let sel = Selector::parse(s).ok()?;
        root.select(&sel).find_map(|el| {
            let text = text_of(el);
            (!text.is_empty()).then_some(text)
        })
    })
}

/// Probes selectors in order and returns the first non-empty value among the
/// given attributes, tried per element in `attrs` order.
#[must_use]
pub fn probe_attr(root: ElementRef<'_>, selectors: &[&str], attrs: &[&str]) -> Option<String> {
    selectors.iter().find_map(|s| {
        let sel = Selector::parse(s).ok()?;
        root.select(&sel).find_map(|el| {
            attrs.iter().find_map(|attr| {
                el.value()
                    .attr(attr)
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_owned)
            })
        })
    })
}

#[cfg(test)]
mod tests {
    use scraper::Html;

    use super::*;

    #[test]
    fn probe_text_honors_selector_order() {
        let doc = Html::parse_document(
            r#"<div class="subtitle">Second</div><h1 class="title">First</h1>"#,
        );
        let text = probe_text(doc.root_element(), &[".title", ".subtitle"]);
        assert_eq!(text.as_deref(), Some("First"));
    }

    #[test]
    fn probe_text_skips_empty_matches() {
        let doc = Html::parse_document(r#"<h1>   </h1><div class="name">Acme</div>"#);
        let text = probe_text(doc.root_element(), &["h1", ".name"]);
        assert_eq!(text.as_deref(), Some("Acme"));
    }

    #[test]
    fn probe_attr_falls_through_attribute_list() {
        let doc = Html::parse_document(r#"<img class="logo" data-src="/logo.png">"#);
        let src = probe_attr(doc.root_element(), &["img.logo"], &["src", "data-src"]);
        assert_eq!(src.as_deref(), Some("/logo.png"));
    }

    #[test]
    fn probe_attr_none_when_nothing_matches() {
        let doc = Html::parse_document("<p>text only</p>");
        assert!(probe_attr(doc.root_element(), &["img"], &["src"]).is_none());
    }

    #[test]
    fn invalid_selector_is_skipped() {
        let doc = Html::parse_document(r#"<span class="ok">hit</span>"#);
        let text = probe_text(doc.root_element(), &["[[[", ".ok"]);
        assert_eq!(text.as_deref(), Some("hit"));
    }

    #[test]
    fn select_all_collects_every_match() {
        let doc = Html::parse_document("<li>a</li><li>b</li><li>c</li>");
        assert_eq!(select_all(doc.root_element(), "li").len(), 3);
    }
}
