//! The document model builder: turns the raw sources in
//! one `AnalysisScope` into a single cross-file `DocumentModel` — every DOM
//! fragment (HTML documents, diverted `<style>`/`<script>` blocks, and the
//! JSX trees extracted from JS/TS sources) addressed uniformly by
//! `ElementRef`, every `ActionLanguageModel`, every `CssModel`, a
//! document-wide id index (first occurrence wins, duplicates recorded as
//! `ModelDiagnostic`s), and a handler-attachment table resolving every
//! `eventHandlerRegistration`'s `TargetDescriptor` against the merged DOM.

use std::collections::HashMap;

use crate::css::{self, CssModel, CssRule};
use crate::dom::{html, DomFragment, NodeId};
use crate::error::{ModelDiagnostic, ModelDiagnosticKind, ParseDiagnostic};
use crate::js::extractor;
use crate::js::{ActionLanguageModel, ActionNode, FrameworkTag, HandlerRef, TargetDescriptor};
use crate::location::SourceLocation;

/// Which of the three source languages one entry in an `AnalysisScope` is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Html,
    JsTs,
    Css,
}

/// How much of the surrounding world an analysis run was given: a lone
/// file, a full page's worth of
/// sources, or an entire workspace. Recorded onto every emitted issue so a
/// caller can tell a LOW confidence that stems from "this is one file in
/// isolation" apart from one that stems from an unsupported selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum AnalysisUnitScope {
    File,
    Page,
    Workspace,
}

impl Default for AnalysisUnitScope {
    fn default() -> Self {
        AnalysisUnitScope::File
    }
}

impl std::fmt::Display for AnalysisUnitScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AnalysisUnitScope::File => "file",
            AnalysisUnitScope::Page => "page",
            AnalysisUnitScope::Workspace => "workspace",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug)]
pub struct Source {
    pub file: String,
    pub kind: SourceKind,
    pub content: String,
}

/// The set of sources fed into one analysis run. A scope missing the
/// HTML host document for a set of JS/CSS sources is still valid — rules
/// that need full-page context simply report lower confidence, per the
/// `ContextRequirement` table in `issue.rs`.
#[derive(Clone, Debug, Default)]
pub struct AnalysisScope {
    pub sources: Vec<Source>,
    pub unit_scope: AnalysisUnitScope,
}

impl AnalysisScope {
    pub fn new() -> Self {
        AnalysisScope::default()
    }

    pub fn add(mut self, file: impl Into<String>, kind: SourceKind, content: impl Into<String>) -> Self {
        self.sources.push(Source {
            file: file.into(),
            kind,
            content: content.into(),
        });
        self
    }

    /// Declares how much of the surrounding world these sources represent
    /// Defaults to `File` when unset, matching the "just these
    /// sources, nothing assumed about the rest of the page" reading a caller
    /// gets by only calling `add`.
    pub fn with_unit_scope(mut self, scope: AnalysisUnitScope) -> Self {
        self.unit_scope = scope;
        self
    }

    pub fn has_html_source(&self) -> bool {
        self.sources.iter().any(|s| s.kind == SourceKind::Html)
    }
}

/// A stable reference to one element: which fragment it lives in (index into
/// `DocumentModel::fragments`, in the order fragments were registered) and
/// its `NodeId` within that fragment. Never valid across a `DocumentModel`
/// rebuild.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementRef {
    pub fragment: usize,
    pub node: NodeId,
}

#[derive(Clone, Debug)]
pub struct HandlerAttachment {
    pub event_type: String,
    pub handler: HandlerRef,
    pub action_model: usize,
    pub framework_tag: Option<FrameworkTag>,
    pub location: SourceLocation,
}

/// An `eventHandlerRegistration` whose target resolved to no element at all
/// in the merged DOM — the raw signal the orphaned-handler rule
/// reports on, computed once here rather than re-derived per pass.
#[derive(Clone, Debug)]
pub struct OrphanedRegistration {
    pub target: TargetDescriptor,
    pub event_type: String,
    pub location: SourceLocation,
}

pub struct DocumentModel {
    fragments: Vec<DomFragment>,
    action_models: Vec<ActionLanguageModel>,
    css_models: Vec<CssModel>,
    ids: HashMap<String, ElementRef>,
    handlers: HashMap<ElementRef, Vec<HandlerAttachment>>,
    orphaned_registrations: Vec<OrphanedRegistration>,
    diagnostics: Vec<ModelDiagnostic>,
    parse_diagnostics: Vec<ParseDiagnostic>,
    scope_has_html: bool,
}

impl DocumentModel {
    pub fn fragment(&self, index: usize) -> &DomFragment {
        &self.fragments[index]
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    /// Every element in the document, in fragment-registration order and
    /// document order within each fragment.
    pub fn elements(&self) -> impl Iterator<Item = ElementRef> + '_ {
        self.fragments.iter().enumerate().flat_map(|(fragment, frag)| {
            frag.elements().map(move |node| ElementRef { fragment, node })
        })
    }

    pub fn node_by_id(&self, id: &str) -> Option<ElementRef> {
        self.ids.get(id).copied()
    }

    pub fn action_models(&self) -> &[ActionLanguageModel] {
        &self.action_models
    }

    pub fn css_models(&self) -> &[CssModel] {
        &self.css_models
    }

    pub fn handlers_for(&self, element: ElementRef) -> &[HandlerAttachment] {
        self.handlers.get(&element).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn orphaned_registrations(&self) -> &[OrphanedRegistration] {
        &self.orphaned_registrations
    }

    pub fn diagnostics(&self) -> &[ModelDiagnostic] {
        &self.diagnostics
    }

    pub fn parse_diagnostics(&self) -> &[ParseDiagnostic] {
        &self.parse_diagnostics
    }

    pub fn scope_has_html(&self) -> bool {
        self.scope_has_html
    }

    /// All CSS rules, across every stylesheet and `<style>` block in the
    /// document, whose selector matches `element`. The analyzer has
    /// no cascade, so every match is returned rather than a single winner.
    pub fn css_rules_for(&self, element: ElementRef) -> Vec<&CssRule> {
        let fragment = &self.fragments[element.fragment];
        self.css_models
            .iter()
            .flat_map(|model| model.rules_matching(fragment, element.node))
            .collect()
    }

    /// Resolves a `TargetDescriptor` to every element it refers to in the
    /// merged document. `jsx_bases` maps a `JsxInline` target's per-file
    /// fragment index to this model's global fragment index; pass the empty
    /// slice when resolving a target that cannot carry `JsxInline` (e.g. a
    /// CSS selector never does).
    fn resolve_target(&self, target: &TargetDescriptor, jsx_bases: &[usize]) -> Vec<ElementRef> {
        match target {
            TargetDescriptor::ById(id) => self.node_by_id(id).into_iter().collect(),
            TargetDescriptor::ByClass(class) => self
                .fragments
                .iter()
                .enumerate()
                .flat_map(|(fragment, frag)| {
                    frag.nodes_by_class(class)
                        .iter()
                        .map(move |&node| ElementRef { fragment, node })
                })
                .collect(),
            TargetDescriptor::ByTag(tag) => self
                .elements()
                .filter(|e| {
                    self.fragments[e.fragment]
                        .element(e.node)
                        .map(|el| el.tag == *tag)
                        .unwrap_or(false)
                })
                .collect(),
            TargetDescriptor::ByAttribute(name, value) => self
                .elements()
                .filter(|e| {
                    self.fragments[e.fragment]
                        .element(e.node)
                        .map(|el| match value {
                            Some(v) => el.attr_str(name) == Some(v.as_str()),
                            None => el.attr(name).is_some(),
                        })
                        .unwrap_or(false)
                })
                .collect(),
            TargetDescriptor::Compound(parts) => {
                let mut sets = parts.iter().map(|p| self.resolve_target(p, jsx_bases));
                let Some(first) = sets.next() else {
                    return Vec::new();
                };
                let mut result: Vec<ElementRef> = first;
                for set in sets {
                    result.retain(|r| set.contains(r));
                }
                result
            }
            TargetDescriptor::JsxInline(jsx_ref) => {
                match jsx_bases.get(jsx_ref.fragment_index_in_file) {
                    Some(&fragment) => vec![ElementRef {
                        fragment,
                        node: jsx_ref.node,
                    }],
                    None => Vec::new(),
                }
            }
            TargetDescriptor::Unknown => Vec::new(),
        }
    }
}

/// Builds the `DocumentModel` for one `AnalysisScope`, following a
/// six-step algorithm:
///
/// 1. Parse every source by kind.
/// 2. Register the resulting DOM fragments (the HTML document itself, and
///    one fragment per JSX-returning function).
/// 3. Recursively parse diverted `<script>`/`<style>` blocks as if they were
///    independent sources.
/// 4. Merge id indices (first occurrence wins; later duplicates recorded).
/// 5. Resolve every `eventHandlerRegistration`'s target against the merged
///    DOM, building the handler-attachment table and the orphaned list.
/// 6. Collect every diagnostic raised along the way.
pub fn build(scope: &AnalysisScope) -> DocumentModel {
    let mut fragments: Vec<DomFragment> = Vec::new();
    let mut action_models: Vec<ActionLanguageModel> = Vec::new();
    let mut action_model_jsx_bases: Vec<Vec<usize>> = Vec::new();
    let mut css_models: Vec<CssModel> = Vec::new();
    let mut ids: HashMap<String, ElementRef> = HashMap::new();
    let mut diagnostics: Vec<ModelDiagnostic> = Vec::new();
    let mut parse_diagnostics: Vec<ParseDiagnostic> = Vec::new();

    let mut pending_js: Vec<(String, String)> = Vec::new();
    let mut pending_css: Vec<(String, String, u32)> = Vec::new();

    fn register_fragment(
        fragments: &mut Vec<DomFragment>,
        ids: &mut HashMap<String, ElementRef>,
        diagnostics: &mut Vec<ModelDiagnostic>,
        fragment: DomFragment,
    ) -> usize {
        let index = fragments.len();
        for (id, first, dup) in fragment.duplicate_ids() {
            diagnostics.push(ModelDiagnostic {
                kind: ModelDiagnosticKind::DuplicateId {
                    id: id.to_string(),
                    first: fragment.node(first).location.clone(),
                },
                location: fragment.node(dup).location.clone(),
            });
        }
        for (id, node) in fragment.ids() {
            let location = fragment.node(node).location.clone();
            match ids.get(id) {
                None => {
                    ids.insert(id.to_string(), ElementRef { fragment: index, node });
                }
                Some(first) => diagnostics.push(ModelDiagnostic {
                    kind: ModelDiagnosticKind::DuplicateId {
                        id: id.to_string(),
                        first: fragments[first.fragment].node(first.node).location.clone(),
                    },
                    location,
                }),
            }
        }
        fragments.push(fragment);
        index
    }

    for source in &scope.sources {
        match source.kind {
            SourceKind::Html => {
                let output = html::parse_html(&source.file, &source.content);
                parse_diagnostics.extend(output.diagnostics);
                register_fragment(&mut fragments, &mut ids, &mut diagnostics, output.fragment);
                for script in output.scripts {
                    pending_js.push((source.file.clone(), script.text));
                }
                for style in output.styles {
                    pending_css.push((source.file.clone(), style.text, style.location.line));
                }
            }
            SourceKind::JsTs => {
                pending_js.push((source.file.clone(), source.content.clone()));
            }
            SourceKind::Css => {
                pending_css.push((source.file.clone(), source.content.clone(), 1));
            }
        }
    }

    for (file, content) in pending_js {
        let output = extractor::analyze_source(&file, &content);
        parse_diagnostics.extend(output.diagnostics);
        diagnostics.extend(output.model_diagnostics);

        let mut bases = Vec::with_capacity(output.jsx_fragments.len());
        for fragment in output.jsx_fragments {
            let index = register_fragment(&mut fragments, &mut ids, &mut diagnostics, fragment);
            bases.push(index);
        }

        action_models.push(output.model);
        action_model_jsx_bases.push(bases);
    }

    for (file, content, line_offset) in pending_css {
        let (model, diags, model_diags) = css::parse_css(&file, &content, line_offset);
        parse_diagnostics.extend(diags);
        diagnostics.extend(model_diags);
        css_models.push(model);
    }

    let scope_has_html = scope.has_html_source();

    let mut document = DocumentModel {
        fragments,
        action_models,
        css_models,
        ids,
        handlers: HashMap::new(),
        orphaned_registrations: Vec::new(),
        diagnostics,
        parse_diagnostics,
        scope_has_html,
    };

    let mut handlers: HashMap<ElementRef, Vec<HandlerAttachment>> = HashMap::new();
    let mut orphaned = Vec::new();

    for (model_index, model) in document.action_models.iter().enumerate() {
        let jsx_bases = &action_model_jsx_bases[model_index];
        for action in model.actions() {
            if let ActionNode::EventHandlerRegistration {
                target,
                event_type,
                handler,
                framework_tag,
                location,
            } = action
            {
                if matches!(target, TargetDescriptor::Unknown) {
                    continue;
                }
                let refs = document.resolve_target(target, jsx_bases);
                if refs.is_empty() {
                    orphaned.push(OrphanedRegistration {
                        target: target.clone(),
                        event_type: event_type.clone(),
                        location: location.clone(),
                    });
                }
                for element in refs {
                    handlers.entry(element).or_default().push(HandlerAttachment {
                        event_type: event_type.clone(),
                        handler: *handler,
                        action_model: model_index,
                        framework_tag: *framework_tag,
                        location: location.clone(),
                    });
                }
            }
        }
    }

    document.handlers = handlers;
    document.orphaned_registrations = orphaned;
    document
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_id_across_html_and_jsx_fragments() {
        let scope = AnalysisScope::new().add(
            "index.html",
            SourceKind::Html,
            r#"<!DOCTYPE html><html><body><button id="go">Go</button></body></html>"#,
        );
        let document = build(&scope);
        assert!(document.node_by_id("go").is_some());
    }

    #[test]
    fn duplicate_ids_are_recorded_as_diagnostics() {
        let scope = AnalysisScope::new().add(
            "index.html",
            SourceKind::Html,
            r#"<!DOCTYPE html><html><body><div id="x"></div><div id="x"></div></body></html>"#,
        );
        let document = build(&scope);
        assert_eq!(document.diagnostics().len(), 1);
        assert!(matches!(
            document.diagnostics()[0].kind,
            ModelDiagnosticKind::DuplicateId { .. }
        ));
    }

    #[test]
    fn inline_script_event_handler_attaches_to_html_element() {
        let scope = AnalysisScope::new().add(
            "index.html",
            SourceKind::Html,
            r#"<!DOCTYPE html><html><body>
                <button id="go">Go</button>
                <script>document.getElementById('go').addEventListener('click', function() {});</script>
            </body></html>"#,
        );
        let document = build(&scope);
        let go = document.node_by_id("go").unwrap();
        assert_eq!(document.handlers_for(go).len(), 1);
        assert_eq!(document.handlers_for(go)[0].event_type, "click");
    }

    #[test]
    fn registration_against_missing_id_is_orphaned() {
        let scope = AnalysisScope::new().add(
            "app.js",
            SourceKind::JsTs,
            "document.getElementById('missing').addEventListener('click', function() {});",
        );
        let document = build(&scope);
        assert_eq!(document.orphaned_registrations().len(), 1);
        assert_eq!(document.orphaned_registrations()[0].event_type, "click");
    }
}
