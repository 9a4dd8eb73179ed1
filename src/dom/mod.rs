//! HTML parsing into an arena DOM.

mod arena;
mod element_ref;
mod tag;
mod tree_sink;

pub use arena::{ArenaDom, Attribute, Node, NodeData, NodeId, Siblings};
pub use element_ref::{DomSelectors, ElementRef};
pub use tag::TagKind;
pub use tree_sink::DomSink;

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;

/// Parse an HTML (or XHTML served as HTML) document.
///
/// Parsing never fails: malformed markup is repaired the way browsers do.
pub fn parse_html(html: &str) -> ArenaDom {
    parse_document(DomSink::new(), ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes())
        .into_dom()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_synthesizes_body() {
        let dom = parse_html("<p>Hello</p>");
        let body = dom.find_by_tag("body").expect("body");
        let p = dom.element_children(body).next().expect("p");
        assert_eq!(dom.element_name(p).unwrap().as_ref(), "p");
        assert_eq!(dom.leading_text(p).as_deref(), Some("Hello"));
    }

    #[test]
    fn test_xhtml_self_closing_br() {
        let dom = parse_html(
            r#"<html xmlns="http://www.w3.org/1999/xhtml"><body><p>a<br/>b</p></body></html>"#,
        );
        let br = dom.find_by_tag("br").expect("br");
        assert_eq!(dom.trailing_text(br).as_deref(), Some("b"));
        assert!(dom.is_last_element_child(br));
    }

    #[test]
    fn test_comments_are_kept_as_other_nodes() {
        let dom = parse_html("<p>one<!-- note -->two</p>");
        let p = dom.find_by_tag("p").unwrap();
        assert_eq!(dom.children(p).count(), 3);
        assert_eq!(dom.leading_text(p).as_deref(), Some("one"));
    }
}
