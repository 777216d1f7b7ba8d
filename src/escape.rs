//! Plain-text helpers for literal display
//!
//! These are independent of [`crate::sanitizer`]: `escape_html` turns text
//! into markup that displays it literally, `unescape_html` recovers the text
//! content of markup.

use crate::parser::{collect_text, parse_markup};

/// Encode text so that it displays literally when injected as markup
///
/// CR is written as a character reference because the parser would
/// otherwise normalise it to LF.
///
/// # Examples
///
/// ```
/// use hashnote::escape::escape_html;
///
/// assert_eq!(escape_html("<b>\"Tom\" & 'Jerry'</b>"),
///            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;");
/// ```
pub fn escape_html(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#39;"),
            '\r' => output.push_str("&#13;"),
            _ => output.push(ch),
        }
    }
    output
}

/// Strip tags and decode entities, returning the text content of `markup`
///
/// # Examples
///
/// ```
/// use hashnote::escape::unescape_html;
///
/// assert_eq!(unescape_html("<p>Fish &amp; <b>chips</b></p>"), "Fish & chips");
/// ```
pub fn unescape_html(markup: &str) -> String {
    if markup.is_empty() {
        return String::new();
    }
    let dom = parse_markup(markup);
    let mut text = String::with_capacity(markup.len());
    collect_text(&dom.document, &mut text);
    text
}
