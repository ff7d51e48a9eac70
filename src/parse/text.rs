//! Visible text extraction.

use scraper::{ElementRef, Html, Node};

/// Elements whose content is never rendered as page text.
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Elements that start a new line when rendered; their boundaries separate words.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "caption", "dd", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "li", "main", "nav", "ol", "option", "p", "pre", "section", "table",
    "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

/// Returns the visible text of the document body.
///
/// Parsing is permissive and never fails. Script, style and template content
/// is dropped, block element boundaries become word breaks, and runs of
/// whitespace collapse into single spaces. A document without a `<body>`
/// (a frameset, for instance) yields an empty string.
///
/// # Examples
///
/// ```
/// use web_smoke::parse::strip_to_text;
///
/// let html = "<html><body><h1>Welcome</h1><p>Home<script>x()</script></p></body></html>";
/// assert_eq!(strip_to_text(html), "Welcome Home");
/// ```
pub fn strip_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let Some(body) = document
        .root_element()
        .children()
        .filter_map(ElementRef::wrap)
        .find(|element| element.value().name() == "body")
    else {
        log::debug!("Document has no <body>, no text to match");
        return String::new();
    };

    let mut raw = String::new();
    collect_text(body, &mut raw);
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if SKIPPED_ELEMENTS.contains(&name) {
                    continue;
                }
                let is_block = BLOCK_ELEMENTS.contains(&name);
                if is_block {
                    out.push(' ');
                }
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, out);
                }
                if is_block {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}
