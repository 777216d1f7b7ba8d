//! Tolerant markup parsing using html5ever
//!
//! Note content is an HTML fragment, not a document, so it is parsed as the
//! body of a standards-mode document. html5ever implements the WHATWG
//! parsing algorithm, which means every input string produces *some* tree:
//! unclosed tags are closed, misnested formatting is repaired, stray end
//! tags are ignored. This module never returns an error.
//!
//! # Examples
//!
//! ```rust
//! use hashnote::parser::{collect_text, parse_markup};
//!
//! let dom = parse_markup("<p>Hello <b>world");
//! let mut text = String::new();
//! collect_text(&dom.document, &mut text);
//! assert_eq!(text, "Hello world");
//! ```
//!
//! # Configuration
//!
//! - **Scripting**: Enabled, as in a browser (`<noscript>` content is raw text, never executed)
//! - **Tree Builder**: Uses RcDom for reference-counted DOM nodes
//! - **Document mode**: No-quirks, via a leading doctype

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Prefix that places the caller's markup directly in body insertion mode.
///
/// Without it, leading whitespace is discarded and elements such as
/// `<title>` or `<style>` are moved into `<head>` ahead of the body content.
const BODY_PREFIX: &str = "<!DOCTYPE html><body>";

/// Parse a markup fragment into a DOM tree
///
/// The returned tree always has the `html`/`head`/`body` skeleton; the
/// caller's nodes are the children of `body`.
pub fn parse_markup(markup: &str) -> RcDom {
    let mut input = String::with_capacity(BODY_PREFIX.len() + markup.len());
    input.push_str(BODY_PREFIX);
    input.push_str(markup);

    parse_document(RcDom::default(), Default::default()).one(input)
}

/// Append the text content of `node` and all its descendants to `out`
///
/// Walks the subtree with an explicit stack so that pathological nesting
/// depth cannot exhaust the call stack.
pub fn collect_text(node: &Handle, out: &mut String) {
    let mut stack = vec![node.clone()];
    while let Some(current) = stack.pop() {
        if let NodeData::Text { ref contents } = current.data {
            out.push_str(&contents.borrow());
        }
        // Reverse so children pop in document order
        for child in current.children.borrow().iter().rev() {
            stack.push(child.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn text_of(markup: &str) -> String {
        let dom = parse_markup(markup);
        let mut text = String::new();
        collect_text(&dom.document, &mut text);
        text
    }

    fn body_children(dom: &RcDom) -> Vec<Handle> {
        let html = dom
            .document
            .children
            .borrow()
            .iter()
            .find(|n| matches!(n.data, NodeData::Element { .. }))
            .cloned()
            .expect("document element");
        let body = html
            .children
            .borrow()
            .iter()
            .find(|n| match n.data {
                NodeData::Element { ref name, .. } => name.local.as_ref() == "body",
                _ => false,
            })
            .cloned()
            .expect("body element");
        body.children.borrow().clone()
    }

    #[test]
    fn test_parse_malformed_markup() {
        assert_eq!(text_of("<p>Hello <b>world"), "Hello world");
    }

    #[test]
    fn test_parse_empty_input() {
        let dom = parse_markup("");
        assert!(body_children(&dom).is_empty());
    }

    #[test]
    fn test_leading_whitespace_is_kept() {
        assert_eq!(text_of("  indented"), "  indented");
    }

    #[test]
    fn test_head_elements_stay_in_body() {
        let dom = parse_markup("<title>T</title><p>x</p>");
        let children = body_children(&dom);
        assert_eq!(children.len(), 2);
        match children[0].data {
            NodeData::Element { ref name, .. } => assert_eq!(name.local.as_ref(), "title"),
            _ => panic!("expected title element in body"),
        }
    }

    #[test]
    fn test_entities_are_decoded() {
        assert_eq!(text_of("&lt;tag&gt; &amp; &quot;q&quot;"), "<tag> & \"q\"");
    }

    #[test]
    fn test_noscript_content_is_raw_text() {
        let dom = parse_markup("<noscript><p>n</p></noscript>");
        let children = body_children(&dom);
        assert_eq!(children.len(), 1);
        let inner = children[0].children.borrow();
        assert_eq!(inner.len(), 1);
        match inner[0].data {
            NodeData::Text { ref contents } => assert_eq!(&**contents.borrow(), "<p>n</p>"),
            _ => panic!("expected raw text inside noscript"),
        }
    }

    #[test]
    fn test_stray_end_tags_are_ignored() {
        assert_eq!(text_of("</div></p>text</span>"), "text");
    }

    #[test]
    fn test_collect_text_deep_nesting() {
        let depth = 20_000;
        let mut markup = "<span>".repeat(depth);
        markup.push_str("deep");
        assert_eq!(text_of(&markup), "deep");
    }

    proptest! {
        #[test]
        fn prop_parser_never_panics(input in ".{0,200}") {
            let _ = parse_markup(&input);
        }

        #[test]
        fn prop_plain_text_survives(content in "[a-zA-Z0-9 .,]{0,80}") {
            prop_assert_eq!(text_of(&content), content);
        }
    }
}
