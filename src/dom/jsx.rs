//! Turns one parsed JSX tree (an `oxc_ast` `JSXElement`/`JSXFragment`) into a
//! `DomFragment`. The companion action stream (inline `onClick={...}`
//! handlers) is collected by the caller from the `inline_handlers` output
//! and merged into the owning file's `ActionLanguageModel`, prepending any
//! companion JSX action streams whose JSX root belongs to that file.

use std::sync::Arc;

use oxc_ast::ast::{
    JSXAttributeItem, JSXAttributeValue, JSXChild, JSXElement, JSXElementName, JSXExpression,
    JSXFragment,
};
use oxc_span::{GetSpan, Span};

use super::builder::DomFragmentBuilder;
use super::{AttributeValue, DomFragment, ElementMeta, NodeId};
use crate::location::SourceLocation;

/// One inline event-handler registration discovered while building a JSX
/// fragment (`onClick={...}` and friends). The element it targets lives in
/// the fragment being built here, so it is addressed by plain `NodeId`; the
/// caller (the JS/TS extractor, which owns the `ActionLanguageModel` for
/// this file) wraps it into a `TargetDescriptor::JsxInline` once it knows
/// which global fragment index this tree ends up at.
pub struct InlineHandler {
    pub element: NodeId,
    pub event_type: String,
    pub body_text: String,
    pub location: SourceLocation,
}

pub struct JsxFragmentOutput {
    pub fragment: DomFragment,
    pub inline_handlers: Vec<InlineHandler>,
}

struct LineIndex {
    // Byte offset of the start of each line, for turning an oxc `Span`
    // (byte offsets) back into 1-based line / 0-based column pairs.
    starts: Vec<u32>,
}

impl LineIndex {
    fn build(source: &str) -> Self {
        let mut starts = vec![0u32];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                starts.push((i + 1) as u32);
            }
        }
        LineIndex { starts }
    }

    fn location(&self, file: &Arc<str>, span: Span) -> SourceLocation {
        let offset = span.start;
        let line_idx = match self.starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        let column = offset - self.starts[line_idx];
        SourceLocation::new(file.clone(), (line_idx + 1) as u32, column)
            .with_length(span.end.saturating_sub(span.start))
    }
}

/// Slices the original source by an oxc byte-offset `Span`. Used only for
/// the literal text of unrecognized expression-bound attributes, which is
/// kept verbatim so a rule can at least show it to a human.
fn span_text<'a>(source: &'a str, span: Span) -> &'a str {
    source
        .get(span.start as usize..span.end as usize)
        .unwrap_or_default()
}

/// Builds one `DomFragment` for a top-level returned JSX tree.
pub fn build_fragment(file: &str, source: &str, root: &JSXElement) -> JsxFragmentOutput {
    let file: Arc<str> = Arc::from(file);
    let lines = LineIndex::build(source);
    let mut builder = DomFragmentBuilder::new(file.clone());
    let mut inline_handlers = Vec::new();

    let frag_root = builder.root();
    build_element(
        &mut builder,
        &lines,
        &file,
        source,
        frag_root,
        root,
        &mut inline_handlers,
    );

    JsxFragmentOutput {
        fragment: builder.finish(),
        inline_handlers,
    }
}

fn element_name(name: &JSXElementName) -> (String, bool) {
    match name {
        JSXElementName::Identifier(ident) => {
            let is_component = ident
                .name
                .chars()
                .next()
                .map(|c| c.is_uppercase())
                .unwrap_or(false);
            (ident.name.to_string(), is_component)
        }
        JSXElementName::NamespacedName(ns) => (format!("{}:{}", ns.namespace.name, ns.property.name), true),
        JSXElementName::MemberExpression(_) => ("member-expression-component".to_string(), true),
    }
}

fn build_element(
    builder: &mut DomFragmentBuilder,
    lines: &LineIndex,
    file: &Arc<str>,
    source: &str,
    parent: NodeId,
    el: &JSXElement,
    inline_handlers: &mut Vec<InlineHandler>,
) -> NodeId {
    let (tag, is_component) = element_name(&el.opening_element.name);
    let location = lines.location(file, el.span());
    let node = builder.push_element_with_meta(
        parent,
        &tag,
        ElementMeta { is_component },
        location.clone(),
    );

    for attr_item in &el.opening_element.attributes {
        if let JSXAttributeItem::Attribute(attr) = attr_item {
            let attr_name = attr.name.to_string();
            let attr_loc = lines.location(file, attr.span());

            match &attr.value {
                None => {
                    builder.set_attr(node, &attr_name, AttributeValue::Static(String::new()));
                }
                Some(JSXAttributeValue::StringLiteral(s)) => {
                    builder.set_attr(node, &attr_name, AttributeValue::Static(s.value.to_string()));
                }
                Some(JSXAttributeValue::ExpressionContainer(expr_container)) => {
                    if let Some(handler) = recognize_inline_handler(
                        source,
                        &attr_name,
                        expr_container,
                        node,
                        attr_loc.clone(),
                    ) {
                        inline_handlers.push(handler);
                    } else {
                        let expr_text = span_text(source, expr_container.span());
                        builder.set_attr(
                            node,
                            &attr_name,
                            AttributeValue::Dynamic {
                                expression: expr_text.to_string(),
                            },
                        );
                    }
                }
                Some(_) => {
                    // Fragment/element-valued attributes are treated as
                    // dynamic with no recoverable text.
                    builder.set_attr(
                        node,
                        &attr_name,
                        AttributeValue::Dynamic {
                            expression: String::new(),
                        },
                    );
                }
            }
        }
    }

    for child in &el.children {
        build_child(builder, lines, file, source, node, child, inline_handlers);
    }

    node
}

fn build_child(
    builder: &mut DomFragmentBuilder,
    lines: &LineIndex,
    file: &Arc<str>,
    source: &str,
    parent: NodeId,
    child: &JSXChild,
    inline_handlers: &mut Vec<InlineHandler>,
) {
    match child {
        JSXChild::Element(el) => {
            build_element(builder, lines, file, source, parent, el, inline_handlers);
        }
        JSXChild::Text(text) => {
            let location = lines.location(file, text.span());
            builder.push_text(parent, text.value.as_str(), location);
        }
        JSXChild::Fragment(frag) => {
            build_fragment_children(builder, lines, file, source, parent, frag, inline_handlers);
        }
        JSXChild::ExpressionContainer(_) | JSXChild::Spread(_) => {
            // Expression-valued children (`{items.map(...)}`) are not
            // statically enumerable; the analyzer only sees the elements
            // that are syntactically present.
        }
    }
}

fn build_fragment_children(
    builder: &mut DomFragmentBuilder,
    lines: &LineIndex,
    file: &Arc<str>,
    source: &str,
    parent: NodeId,
    frag: &JSXFragment,
    inline_handlers: &mut Vec<InlineHandler>,
) {
    for child in &frag.children {
        build_child(builder, lines, file, source, parent, child, inline_handlers);
    }
}

/// `onClick={handler}` and friends become `eventHandlerRegistration`
/// `ActionNode`s with a `JSX-inline` target. Only attribute names
/// matching `on[A-Z]...` are treated as event bindings.
fn recognize_inline_handler(
    source: &str,
    attr_name: &str,
    expr_container: &oxc_ast::ast::JSXExpressionContainer,
    element: NodeId,
    location: SourceLocation,
) -> Option<InlineHandler> {
    if !attr_name.starts_with("on") || attr_name.len() < 3 {
        return None;
    }
    let event_char = attr_name.as_bytes().get(2)?;
    if !event_char.is_ascii_uppercase() {
        return None;
    }
    let event_type = attr_name[2..].to_ascii_lowercase();

    let body_text = match &expr_container.expression {
        JSXExpression::Expression(expr) => span_text(source, expr.span()).to_string(),
        _ => String::new(),
    };

    Some(InlineHandler {
        element,
        event_type,
        body_text,
        location,
    })
}
