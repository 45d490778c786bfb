//! Contact data extraction: emails and phones from the page text, contact
//! forms and addresses from the markup.

use scraper::Html;
use shopsight_core::ContactDetails;

use crate::dom::{select_first, text_of};
use crate::text::{extract_emails, extract_phone_numbers};

const ADDRESS_SELECTORS: [&str; 3] = [".address", ".contact-address", r#"[class*="address"]"#];

/// Address candidates shorter than this are navigation labels, not addresses.
const MIN_ADDRESS_LEN: usize = 20;

#[must_use]
pub fn extract_contact_details(doc: &Html, base_url: &str) -> ContactDetails {
    let text: String = doc.root_element().text().collect::<Vec<_>>().join(" ");

    let mut details = ContactDetails {
        emails: extract_emails(&text),
        phone_numbers: extract_phone_numbers(&text),
        address: None,
        contact_form_url: None,
    };

    if select_first(doc.root_element(), &[r#"form[action*="contact" i]"#]).is_some() {
        details.contact_form_url = Some(base_url.to_owned());
    }

    for selector in ADDRESS_SELECTORS {
        if let Some(el) = select_first(doc.root_element(), &[selector]) {
            let candidate = text_of(el);
            if candidate.len() > MIN_ADDRESS_LEN {
                details.address = Some(candidate);
                break;
            }
        }
    }

    details
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn harvests_emails_and_phones_from_page_text() {
        let doc = Html::parse_document(
            r#"<footer>Reach us at support@acme.example or call (555) 123-4567</footer>"#,
        );
        let details = extract_contact_details(&doc, "https://shop.example");
        assert_eq!(details.emails, vec!["support@acme.example"]);
        assert_eq!(details.phone_numbers, vec!["(555) 123-4567"]);
    }

    #[test]
    fn contact_form_points_at_base_url() {
        let doc = Html::parse_document(r#"<form action="/pages/contact-us"><input></form>"#);
        let details = extract_contact_details(&doc, "https://shop.example");
        assert_eq!(details.contact_form_url.as_deref(), Some("https://shop.example"));
    }

    #[test]
    fn address_requires_minimum_length() {
        let doc = Html::parse_document(r#"<div class="address">Map</div>"#);
        assert!(extract_contact_details(&doc, "https://shop.example").address.is_none());

        let doc = Html::parse_document(
            r#"<div class="address">42 Commerce Street, Springfield, IL 62704</div>"#,
        );
        let details = extract_contact_details(&doc, "https://shop.example");
        assert_eq!(
            details.address.as_deref(),
            Some("42 Commerce Street, Springfield, IL 62704")
        );
    }
}
