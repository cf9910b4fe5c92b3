//! OpenGraph and `<title>` extraction, plus platform suffix cleaning.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{Html, Selector};

lazy_static! {
    static ref PLATFORM_SUFFIX_RE: Regex =
        Regex::new(r"(?i)\s*[|\-]\s*(?:vrbo|airbnb|booking\.com)\s*$").unwrap();
}

/// Meta-level page identity: OpenGraph tags plus the document title.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageMeta {
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub og_image: Option<String>,
    pub title: Option<String>,
}

impl PageMeta {
    /// og:title when present, else the document title.
    pub fn best_title(&self) -> Option<&str> {
        self.og_title.as_deref().or(self.title.as_deref())
    }
}

/// Pull OpenGraph tags and the `<title>` out of a page.
pub fn parse_meta(html: &str) -> PageMeta {
    let document = Html::parse_document(html);
    PageMeta {
        og_title: meta_content(&document, "og:title"),
        og_description: meta_content(&document, "og:description")
            .or_else(|| named_meta_content(&document, "description")),
        og_image: meta_content(&document, "og:image"),
        title: document_title(&document),
    }
}

/// Strip a trailing `| VRBO` / `- Airbnb` style platform suffix.
pub fn clean_listing_title(title: &str) -> String {
    PLATFORM_SUFFIX_RE.replace(title.trim(), "").trim().to_string()
}

fn meta_content(document: &Html, property: &str) -> Option<String> {
    // Sites set og tags via property= or (less correctly) name=.
    let by_property = Selector::parse(&format!(r#"meta[property="{}"]"#, property)).ok()?;
    let by_name = Selector::parse(&format!(r#"meta[name="{}"]"#, property)).ok()?;
    document
        .select(&by_property)
        .chain(document.select(&by_name))
        .filter_map(|el| el.value().attr("content"))
        .map(|content| content.trim().to_string())
        .find(|content| !content.is_empty())
}

fn named_meta_content(document: &Html, name: &str) -> Option<String> {
    let selector = Selector::parse(&format!(r#"meta[name="{}"]"#, name)).ok()?;
    document
        .select(&selector)
        .filter_map(|el| el.value().attr("content"))
        .map(|content| content.trim().to_string())
        .find(|content| !content.is_empty())
}

fn document_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_og_tags_and_title() {
        let html = r#"
            <html><head>
                <title>Cozy Beach House - Airbnb</title>
                <meta property="og:title" content="Cozy Beach House - Airbnb">
                <meta property="og:description" content="Steps from the sand">
                <meta property="og:image" content="https://a0.muscache.com/x.jpg">
            </head><body></body></html>
        "#;
        let meta = parse_meta(html);
        assert_eq!(meta.og_title.as_deref(), Some("Cozy Beach House - Airbnb"));
        assert_eq!(meta.og_description.as_deref(), Some("Steps from the sand"));
        assert_eq!(meta.og_image.as_deref(), Some("https://a0.muscache.com/x.jpg"));
        assert_eq!(meta.best_title(), Some("Cozy Beach House - Airbnb"));
    }

    #[test]
    fn name_attribute_and_description_fallbacks() {
        let html = r#"
            <html><head>
                <meta name="og:title" content="Lakeside Cabin">
                <meta name="description" content="A quiet getaway">
            </head><body></body></html>
        "#;
        let meta = parse_meta(html);
        assert_eq!(meta.og_title.as_deref(), Some("Lakeside Cabin"));
        assert_eq!(meta.og_description.as_deref(), Some("A quiet getaway"));
        assert_eq!(meta.og_image, None);
    }

    #[test]
    fn document_title_backs_up_missing_og() {
        let html = "<html><head><title>Dune Cottage | VRBO</title></head><body></body></html>";
        let meta = parse_meta(html);
        assert_eq!(meta.og_title, None);
        assert_eq!(meta.best_title(), Some("Dune Cottage | VRBO"));
    }

    #[test]
    fn suffix_cleaning() {
        assert_eq!(clean_listing_title("Cozy Beach House - Airbnb"), "Cozy Beach House");
        assert_eq!(clean_listing_title("Dune Cottage | VRBO"), "Dune Cottage");
        assert_eq!(clean_listing_title("Dune Cottage - VRBO"), "Dune Cottage");
        assert_eq!(clean_listing_title("Sea-Esta - Airbnb"), "Sea-Esta");
        assert_eq!(clean_listing_title("Plain Name"), "Plain Name");
    }

    #[test]
    fn empty_tags_are_ignored() {
        let html = r#"<html><head><meta property="og:title" content="  "><title></title></head></html>"#;
        let meta = parse_meta(html);
        assert_eq!(meta.og_title, None);
        assert_eq!(meta.title, None);
    }
}
