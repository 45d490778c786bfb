//! Social handle extraction from homepage anchors.

use scraper::Html;
use shopsight_core::SocialHandles;

use crate::dom::select_all;

/// One pass over all anchors; the first URL per platform wins. Query strings
/// carry tracking parameters and are stripped.
#[must_use]
pub fn extract_social_handles(doc: &Html) -> SocialHandles {
    let mut handles = SocialHandles::default();
    for anchor in select_all(doc.root_element(), "a[href]") {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let lower = href.to_lowercase();
        let slot = if lower.contains("instagram.com") {
            &mut handles.instagram
        } else if lower.contains("facebook.com") {
            &mut handles.facebook
        } else if lower.contains("twitter.com")
            || lower.contains("//x.com")
            || lower.contains("www.x.com")
        {
            &mut handles.twitter
        } else if lower.contains("tiktok.com") {
            &mut handles.tiktok
        } else if lower.contains("youtube.com") {
            &mut handles.youtube
        } else if lower.contains("linkedin.com") {
            &mut handles.linkedin
        } else if lower.contains("pinterest.com") {
            &mut handles.pinterest
        } else {
            continue;
        };
        if slot.is_none() {
            *slot = Some(strip_query(href));
        }
    }
    handles
}

fn strip_query(url: &str) -> String {
    url.split('?').next().unwrap_or(url).trim().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_match_per_platform_wins() {
        let doc = Html::parse_document(
            r#"
            <a href="https://instagram.com/acme?utm_source=footer">ig</a>
            <a href="https://instagram.com/acme-alt">ig2</a>
            <a href="https://www.youtube.com/@acme">yt</a>
        "#,
        );
        let handles = extract_social_handles(&doc);
        assert_eq!(handles.instagram.as_deref(), Some("https://instagram.com/acme"));
        assert_eq!(handles.youtube.as_deref(), Some("https://www.youtube.com/@acme"));
        assert!(handles.facebook.is_none());
    }

    #[test]
    fn x_dot_com_maps_to_twitter() {
        let doc = Html::parse_document(r#"<a href="https://x.com/acme">x</a>"#);
        let handles = extract_social_handles(&doc);
        assert_eq!(handles.twitter.as_deref(), Some("https://x.com/acme"));
    }

    #[test]
    fn unrelated_anchors_are_ignored() {
        let doc = Html::parse_document(r#"<a href="/pages/about">about</a>"#);
        let handles = extract_social_handles(&doc);
        assert!(handles.present_platforms().is_empty());
    }
}
