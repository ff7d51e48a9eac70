// Parse module tests.

use super::*;
use crate::error_handling::ExtractError;

#[test]
fn test_strip_to_text_basic() {
    let html = "<html><body>Welcome Home</body></html>";
    assert_eq!(strip_to_text(html), "Welcome Home");
}

#[test]
fn test_strip_to_text_plain_text_unchanged() {
    assert_eq!(strip_to_text("Just some words"), "Just some words");
}

#[test]
fn test_strip_to_text_excludes_head_script_and_style() {
    let html = r#"<html>
        <head><title>Title Text</title><style>body { color: red; }</style></head>
        <body>
            <script>var hidden = "secret";</script>
            <p>Visible</p>
            <style>.x { display: none; }</style>
            <noscript>Enable JavaScript</noscript>
        </body>
    </html>"#;
    assert_eq!(strip_to_text(html), "Visible");
}

#[test]
fn test_strip_to_text_block_boundaries_separate_words() {
    let html = "<body><div>Order</div><div>Status</div><p>Shipped</p><ul><li>a</li><li>b</li></ul></body>";
    assert_eq!(strip_to_text(html), "Order Status Shipped a b");
}

#[test]
fn test_strip_to_text_inline_elements_do_not_split_words() {
    let html = "<body><p>Wel<b>come</b> <i>home</i></p></body>";
    assert_eq!(strip_to_text(html), "Welcome home");
}

#[test]
fn test_strip_to_text_decodes_entities_and_collapses_whitespace() {
    let html = "<body>\n   Fish   &amp;\n\tChips  </body>";
    assert_eq!(strip_to_text(html), "Fish & Chips");
}

#[test]
fn test_strip_to_text_empty_inputs() {
    assert_eq!(strip_to_text(""), "");
    assert_eq!(strip_to_text("<html><body>   </body></html>"), "");
    assert_eq!(strip_to_text("<html><head><title>Only</title></head></html>"), "");
}

#[test]
fn test_strip_to_text_malformed_markup() {
    let html = "<body><div><p>Unclosed <b>bold<div>Next";
    assert_eq!(strip_to_text(html), "Unclosed bold Next");
}

#[test]
fn test_extract_title_basic() {
    let html = "<html><head><title>Test Page</title></head><body></body></html>";
    assert_eq!(extract_title(html), Some("Test Page".to_string()));
}

#[test]
fn test_extract_title_multiline_and_case() {
    let html = "<HTML><HEAD lang=\"en\">\n<meta charset=\"utf-8\">\n<TITLE id=\"t\">\n   Quarterly Report\n</TITLE>\n</HEAD></HTML>";
    assert_eq!(extract_title(html), Some("Quarterly Report".to_string()));
}

#[test]
fn test_extract_title_missing() {
    assert_eq!(extract_title("<html><head></head><body>x</body></html>"), None);
    assert_eq!(extract_title("no markup at all"), None);
}

#[test]
fn test_extract_title_outside_head_is_ignored() {
    let html = "<html><head></head><body><title>Body Title</title></body></html>";
    assert_eq!(extract_title(html), None);
}

#[test]
fn test_extract_title_first_wins() {
    let html = "<head><title>First</title><title>Second</title></head>";
    assert_eq!(extract_title(html), Some("First".to_string()));
}

#[test]
fn test_extract_title_empty() {
    let html = "<head><title>   </title></head>";
    assert_eq!(extract_title(html), Some(String::new()));
}

#[test]
fn test_xpath_matches_element_by_attribute() {
    let html = r#"<html><body><div id="main">x</div></body></html>"#;
    assert!(evaluate_xpath(html, "//div[@id='main']").unwrap());
}

#[test]
fn test_xpath_no_match() {
    let html = r#"<html><body><div id="other">x</div></body></html>"#;
    assert!(!evaluate_xpath(html, "//div[@id='main']").unwrap());
}

#[test]
fn test_xpath_on_tolerantly_parsed_html() {
    let html = "<table><tr><td>cell<td>next</table><p>para";
    assert!(evaluate_xpath(html, "/html/body/table//td[2]").unwrap());
    assert!(evaluate_xpath(html, "//p[text()='para']").unwrap());
}

#[test]
fn test_xpath_text_predicate() {
    let html = "<body><a href='/login'>Sign in</a></body>";
    assert!(evaluate_xpath(html, "//a[contains(., 'Sign')]").unwrap());
    assert!(evaluate_xpath(html, "//a[@href='/login']").unwrap());
}

#[test]
fn test_xpath_invalid_expression() {
    let err = compile_xpath("//div[@id='main'").unwrap_err();
    assert!(matches!(err, ExtractError::InvalidExpression { .. }));
    assert!(compile_xpath("").is_err());
}

#[test]
fn test_xpath_non_nodeset_result() {
    let err = evaluate_xpath("<body><a>1</a></body>", "count(//a)").unwrap_err();
    assert!(matches!(err, ExtractError::NotANodeSet(_)));
}

#[test]
fn test_compiled_xpath_is_reusable() {
    let xpath = compile_xpath("//h1").unwrap();
    assert_eq!(xpath.expression(), "//h1");
    assert!(xpath.matches("<h1>a</h1>").unwrap());
    assert!(!xpath.matches("<h2>b</h2>").unwrap());
}
