//! XPath element lookup on HTML pages.
//!
//! HTML is parsed tolerantly with `scraper`, then copied into an
//! `sxd_document` tree (element local names, attributes and text only, no
//! namespaces) so `sxd_xpath` can evaluate XPath 1.0 expressions against it.

use std::fmt;

use scraper::{ElementRef, Html, Node};
use sxd_document::{dom, Package};
use sxd_xpath::{Context, Factory, Value, XPath};

use crate::error_handling::ExtractError;

/// A compiled XPath expression together with its source text.
pub struct CompiledXPath {
    expression: String,
    xpath: XPath,
}

impl CompiledXPath {
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Evaluates the expression against `html`; true when at least one node matched.
    ///
    /// # Errors
    ///
    /// `ExtractError::NotANodeSet` for expressions such as `count(//a)`, and
    /// `ExtractError::Evaluation` for runtime failures (unknown functions,
    /// unbound variables).
    pub fn matches(&self, html: &str) -> Result<bool, ExtractError> {
        let package = html_to_xml(html);
        let document = package.as_document();
        let context = Context::new();
        match self.xpath.evaluate(&context, document.root()) {
            Ok(Value::Nodeset(nodes)) => {
                log::debug!(
                    "XPath '{}' matched {} node(s)",
                    self.expression,
                    nodes.size()
                );
                Ok(nodes.size() > 0)
            }
            Ok(_) => Err(ExtractError::NotANodeSet(self.expression.clone())),
            Err(e) => Err(ExtractError::Evaluation(e.to_string())),
        }
    }
}

impl fmt::Debug for CompiledXPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CompiledXPath")
            .field(&self.expression)
            .finish()
    }
}

/// Compiles an XPath expression, without touching any document.
pub fn compile_xpath(expression: &str) -> Result<CompiledXPath, ExtractError> {
    let invalid = |reason: String| ExtractError::InvalidExpression {
        expression: expression.to_string(),
        reason,
    };
    match Factory::new().build(expression) {
        Ok(Some(xpath)) => Ok(CompiledXPath {
            expression: expression.to_string(),
            xpath,
        }),
        Ok(None) => Err(invalid("empty expression".to_string())),
        Err(e) => Err(invalid(e.to_string())),
    }
}

/// Compiles `expression` and evaluates it against `html` in one step.
pub fn evaluate_xpath(html: &str, expression: &str) -> Result<bool, ExtractError> {
    compile_xpath(expression)?.matches(html)
}

/// Copies a tolerantly parsed HTML document into an XML DOM package.
fn html_to_xml(html: &str) -> Package {
    let parsed = Html::parse_document(html);
    let package = Package::new();
    {
        let document = package.as_document();
        let source_root = parsed.root_element();
        let root = copy_element(&document, source_root);
        document.root().append_child(root);
        copy_children(&document, source_root, root);
    }
    package
}

fn copy_element<'d>(document: &dom::Document<'d>, source: ElementRef<'_>) -> dom::Element<'d> {
    let element = document.create_element(source.value().name());
    for (name, value) in source.value().attrs() {
        element.set_attribute_value(name, value);
    }
    element
}

fn copy_children<'d>(document: &dom::Document<'d>, source: ElementRef<'_>, target: dom::Element<'d>) {
    for child in source.children() {
        match child.value() {
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    let copied = copy_element(document, child_element);
                    target.append_child(copied);
                    copy_children(document, child_element, copied);
                }
            }
            Node::Text(text) => {
                let text: &str = text;
                target.append_child(document.create_text(text));
            }
            _ => {}
        }
    }
}
