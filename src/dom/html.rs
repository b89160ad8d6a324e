//! HTML5-style parsing into a `DomFragment`, via an `html5ever::TreeSink`
//! implementation over the arena builder in `dom::builder`.
//!
//! `<script>` and `<style>` contents are diverted out of the tree as they
//! are appended — handed to the JS extractor and CSS parser respectively,
//! not kept in the DOM tree — and returned alongside the fragment rather
//! than as DOM text nodes.

use std::borrow::Cow;
use std::cell::Cell;
use std::collections::HashMap;
use std::sync::Arc;

use html5ever::interface::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{local_name, parse_document, Attribute, ParseOpts, QualName};

use super::builder::DomFragmentBuilder;
use super::{AttributeValue, DomFragment, NodeId};
use crate::error::{ParseDiagnostic, SourceKind};
use crate::location::SourceLocation;

/// A `<script>` or `<style>` block extracted while parsing, with its own
/// source location so it can be handed to the JS extractor or CSS parser
/// as if it were an independent source string.
#[derive(Clone, Debug)]
pub struct ExtractedBlock {
    pub text: String,
    pub location: SourceLocation,
}

pub struct HtmlParseOutput {
    pub fragment: DomFragment,
    pub scripts: Vec<ExtractedBlock>,
    pub styles: Vec<ExtractedBlock>,
    pub diagnostics: Vec<ParseDiagnostic>,
}

/// Parses one HTML source string into a single `DomFragment`.
/// On unrecoverable failure this returns an empty fragment and a
/// `ParseDiagnostic`; it never panics into the caller.
pub fn parse_html(file: &str, content: &str) -> HtmlParseOutput {
    let file: Arc<str> = Arc::from(file);
    let sink = HtmlSink::new(file.clone());

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        parse_document(sink, ParseOpts::default())
            .from_utf8()
            .one(content.as_bytes())
    }));

    match result {
        Ok(sink) => HtmlParseOutput {
            fragment: sink.builder.finish(),
            scripts: sink.scripts,
            styles: sink.styles,
            diagnostics: sink.diagnostics,
        },
        Err(_) => HtmlParseOutput {
            fragment: DomFragmentBuilder::new(file.clone()).finish(),
            scripts: Vec::new(),
            styles: Vec::new(),
            diagnostics: vec![ParseDiagnostic {
                source_kind: SourceKind::Html,
                file: file.to_string(),
                message: "unrecoverable parse error".to_string(),
            }],
        },
    }
}

/// Which diverted-text bucket a handle's children should be routed to,
/// if any.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Divert {
    None,
    Script,
    Style,
}

struct HtmlSink {
    file: Arc<str>,
    builder: DomFragmentBuilder,
    current_line: Cell<u64>,
    diverts: HashMap<u32, Divert>,
    scripts: Vec<ExtractedBlock>,
    styles: Vec<ExtractedBlock>,
    diagnostics: Vec<ParseDiagnostic>,
}

impl HtmlSink {
    fn new(file: Arc<str>) -> Self {
        let builder = DomFragmentBuilder::new(file.clone());
        HtmlSink {
            file,
            builder,
            current_line: Cell::new(1),
            diverts: HashMap::new(),
            scripts: Vec::new(),
            styles: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    fn loc(&self) -> SourceLocation {
        SourceLocation::new(self.file.clone(), self.current_line.get() as u32, 0)
    }

    fn divert_of(&self, handle: &NodeId) -> Divert {
        self.diverts.get(&handle.0).copied().unwrap_or(Divert::None)
    }
}

impl TreeSink for HtmlSink {
    type Handle = NodeId;
    type Output = Self;

    fn finish(self) -> Self::Output {
        self
    }

    fn parse_error(&mut self, msg: Cow<'static, str>) {
        self.diagnostics.push(ParseDiagnostic {
            source_kind: SourceKind::Html,
            file: self.file.to_string(),
            message: msg.into_owned(),
        });
    }

    fn get_document(&mut self) -> Self::Handle {
        self.builder.root()
    }

    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> html5ever::ExpandedName<'a> {
        // Only used by the tree-construction algorithm for foreign-content
        // decisions, which this analyzer-focused sink does not special-case.
        let _ = target;
        html5ever::namespace_url!("").expanded()
    }

    fn create_element(
        &mut self,
        name: QualName,
        attrs: Vec<Attribute>,
        _flags: ElementFlags,
    ) -> Self::Handle {
        let tag = name.local.to_string();
        let location = self.loc();
        let node = self.builder.push_element(self.builder.root(), &tag, location);
        for attr in attrs {
            let value = attr.value.to_string();
            self.builder
                .set_attr(node, &attr.name.local, AttributeValue::Static(value));
        }
        if tag.eq_ignore_ascii_case("script") {
            self.diverts.insert(node.0, Divert::Script);
        } else if tag.eq_ignore_ascii_case("style") {
            self.diverts.insert(node.0, Divert::Style);
        }
        node
    }

    fn create_comment(&mut self, _text: StrTendril) -> Self::Handle {
        // Comments carry no accessibility-relevant information; represented
        // as an inert text node so the tree shape stays simple.
        let location = self.loc();
        self.builder.push_text(self.builder.root(), "", location)
    }

    fn create_pi(&mut self, _target: StrTendril, _data: StrTendril) -> Self::Handle {
        let location = self.loc();
        self.builder.push_text(self.builder.root(), "", location)
    }

    fn append(&mut self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        match child {
            NodeOrText::AppendNode(node) => {
                self.reparent(parent, node);
            }
            NodeOrText::AppendText(text) => match self.divert_of(parent) {
                Divert::Script => self.scripts.push(ExtractedBlock {
                    text: text.to_string(),
                    location: self.loc(),
                }),
                Divert::Style => self.styles.push(ExtractedBlock {
                    text: text.to_string(),
                    location: self.loc(),
                }),
                Divert::None => {
                    let location = self.loc();
                    self.builder.push_text(*parent, &text, location);
                }
            },
        }
    }

    fn append_based_on_parent_node(
        &mut self,
        element: &Self::Handle,
        prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        // Foster-parenting (malformed table content) collapses to appending
        // under the previous element; exact table-repair semantics have no
        // accessibility signal worth modeling precisely here.
        let _ = prev_element;
        self.append(element, child);
    }

    fn append_doctype_to_document(
        &mut self,
        _name: StrTendril,
        _public_id: StrTendril,
        _system_id: StrTendril,
    ) {
    }

    fn get_template_contents(&mut self, target: &Self::Handle) -> Self::Handle {
        *target
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        x == y
    }

    fn set_quirks_mode(&mut self, _mode: QuirksMode) {}

    fn append_before_sibling(
        &mut self,
        sibling: &Self::Handle,
        new_node: NodeOrText<Self::Handle>,
    ) {
        // Conservatively append under the sibling's parent; sibling-exact
        // ordering does not affect selector matching or issue detection.
        if let Some(parent) = self.builder_parent_of(sibling) {
            self.append(&parent, new_node);
        }
    }

    fn add_attrs_if_missing(&mut self, target: &Self::Handle, attrs: Vec<Attribute>) {
        for attr in attrs {
            let value = attr.value.to_string();
            self.builder
                .set_attr(*target, &attr.name.local, AttributeValue::Static(value));
        }
    }

    fn remove_from_parent(&mut self, _target: &Self::Handle) {
        // Removal during tree construction (template/table repair) is rare
        // and has no accessibility-relevant effect once collapsed.
    }

    fn reparent_children(&mut self, _node: &Self::Handle, _new_parent: &Self::Handle) {}

    fn set_current_line(&mut self, line_number: u64) {
        self.current_line.set(line_number);
    }
}

impl HtmlSink {
    fn reparent(&mut self, parent: &Self::Handle, node: NodeId) {
        // `create_element`/`create_comment` already attach new nodes under
        // the fragment root; when the tree builder later asks to append an
        // already-created node under its real parent, move it there.
        let root = self.builder.root();
        if *parent == root {
            return;
        }
        self.builder.reparent(node, *parent);
    }

    fn builder_parent_of(&self, handle: &Self::Handle) -> Option<Self::Handle> {
        self.builder.parent_of(*handle)
    }
}
