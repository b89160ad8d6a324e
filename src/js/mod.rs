//! Behavioral primitives extracted from JavaScript/TypeScript/JSX sources
//! and the structured selector abstraction (`TargetDescriptor`) they are
//! resolved against at document-build time.

pub mod extractor;

use std::fmt;

use crate::dom::NodeId;
use crate::location::SourceLocation;

/// A structured form of a selector, resolved against the DOM by the
/// document builder rather than matched as a raw string.
///
/// `JsxInline` is special: it does not need matching at all, since the JSX
/// extractor already knows exactly which element an inline handler
/// attribute belongs to. It carries the index, among the `DomFragment`s
/// produced from the owning file, of the fragment the element lives in
/// (assigned by the document builder once all fragments are collected),
/// plus the element's `NodeId` within that fragment.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TargetDescriptor {
    ById(String),
    ByClass(String),
    ByTag(String),
    ByAttribute(String, Option<String>),
    Compound(Vec<TargetDescriptor>),
    JsxInline(JsxElementRef),
    /// The receiver could not be resolved (unknown variable binding, or a
    /// call shape through a member expression this extractor does not
    /// attempt to follow). Included in the stream but skipped by matching.
    Unknown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct JsxElementRef {
    /// Index into the list of `DomFragment`s extracted from the same file,
    /// in extraction order (the order top-level JSX-returning functions
    /// appear in the source).
    pub fragment_index_in_file: usize,
    pub node: NodeId,
}

/// The small whitelist of global DOM roots a selector may additionally
/// reference (document, window).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GlobalRoot {
    Document,
    Window,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FocusMethod {
    Focus,
    Blur,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Timing {
    Immediate,
    Deferred,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DomOperation {
    Remove,
    Hide,
    Show,
    ClassListAdd(String),
    ClassListRemove(String),
    ClassListToggle(String),
    StyleProperty(String, String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimedApi {
    SetTimeout,
    SetInterval,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NavigationMechanism {
    LocationAssign,
    LocationReplace,
    HistoryPushState,
    HistoryReplaceState,
}

/// Opaque reference to a handler body, resolved through
/// `ActionLanguageModel::handler_body`. The body view is a stable, textual
/// slice of the source — never re-executed, never mutated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HandlerRef(pub usize);

#[derive(Clone, Debug)]
pub struct HandlerBody {
    pub text: String,
}

/// One behavioral primitive, tagged by construct kind per the design note
/// on sum types (dispatch on the tag, not dynamic-typing machinery).
#[derive(Clone, Debug)]
pub enum ActionNode {
    EventHandlerRegistration {
        target: TargetDescriptor,
        event_type: String,
        handler: HandlerRef,
        framework_tag: Option<FrameworkTag>,
        location: SourceLocation,
    },
    AriaMutation {
        target: TargetDescriptor,
        attribute: String,
        new_value: Option<String>,
        location: SourceLocation,
    },
    FocusChange {
        target: TargetDescriptor,
        method: FocusMethod,
        timing: Timing,
        location: SourceLocation,
    },
    DomMutation {
        target: TargetDescriptor,
        operation: DomOperation,
        location: SourceLocation,
    },
    TimedCall {
        api: TimedApi,
        duration_ms: Option<f64>,
        handler: HandlerRef,
        location: SourceLocation,
    },
    Navigation {
        mechanism: NavigationMechanism,
        location: SourceLocation,
    },
}

impl ActionNode {
    pub fn location(&self) -> &SourceLocation {
        match self {
            ActionNode::EventHandlerRegistration { location, .. }
            | ActionNode::AriaMutation { location, .. }
            | ActionNode::FocusChange { location, .. }
            | ActionNode::DomMutation { location, .. }
            | ActionNode::TimedCall { location, .. }
            | ActionNode::Navigation { location, .. } => location,
        }
    }

    pub fn target(&self) -> Option<&TargetDescriptor> {
        match self {
            ActionNode::EventHandlerRegistration { target, .. }
            | ActionNode::AriaMutation { target, .. }
            | ActionNode::FocusChange { target, .. }
            | ActionNode::DomMutation { target, .. } => Some(target),
            ActionNode::TimedCall { .. } | ActionNode::Navigation { .. } => None,
        }
    }
}

/// A UI-framework tag attached to a recognizer hit, when the call shape is
/// framework-specific (JSX inline handlers are tagged `React`; the closed
/// recognizer list otherwise produces framework-agnostic nodes).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameworkTag {
    React,
    Angular,
    Vue,
    Svelte,
}

impl fmt::Display for FrameworkTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FrameworkTag::React => "react",
            FrameworkTag::Angular => "angular",
            FrameworkTag::Vue => "vue",
            FrameworkTag::Svelte => "svelte",
        };
        f.write_str(s)
    }
}

/// Ordered sequence of `ActionNode`s extracted from one JS/TS source file,
/// plus a secondary index keyed by target descriptor and the side
/// table of handler bodies referenced by `HandlerRef`.
#[derive(Clone, Debug, Default)]
pub struct ActionLanguageModel {
    pub source_file: String,
    actions: Vec<ActionNode>,
    handler_bodies: Vec<HandlerBody>,
}

impl ActionLanguageModel {
    pub fn new(source_file: impl Into<String>) -> Self {
        ActionLanguageModel {
            source_file: source_file.into(),
            actions: Vec::new(),
            handler_bodies: Vec::new(),
        }
    }

    pub fn push(&mut self, action: ActionNode) {
        self.actions.push(action);
    }

    pub fn intern_handler_body(&mut self, text: String) -> HandlerRef {
        let idx = self.handler_bodies.len();
        self.handler_bodies.push(HandlerBody { text });
        HandlerRef(idx)
    }

    pub fn handler_body(&self, handler: HandlerRef) -> Option<&HandlerBody> {
        self.handler_bodies.get(handler.0)
    }

    pub fn actions(&self) -> &[ActionNode] {
        &self.actions
    }

    /// All `eventHandlerRegistration` actions with the given target
    /// descriptor and event type in this file, used by the file-scope
    /// variant of the mouse-only-click rule.
    pub fn has_registration(&self, target: &TargetDescriptor, event_type: &str) -> bool {
        self.actions.iter().any(|a| match a {
            ActionNode::EventHandlerRegistration {
                target: t,
                event_type: e,
                ..
            } => t == target && e.eq_ignore_ascii_case(event_type),
            _ => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handler_bodies_round_trip_through_handler_ref() {
        let mut model = ActionLanguageModel::new("x.js");
        let r = model.intern_handler_body("e => e.key === 'Escape'".to_string());
        assert_eq!(model.handler_body(r).unwrap().text, "e => e.key === 'Escape'");
    }

    #[test]
    fn has_registration_matches_same_target_and_event() {
        let mut model = ActionLanguageModel::new("x.js");
        let target = TargetDescriptor::ById("submit".to_string());
        let handler = model.intern_handler_body("h1".to_string());
        model.push(ActionNode::EventHandlerRegistration {
            target: target.clone(),
            event_type: "click".to_string(),
            handler,
            framework_tag: None,
            location: SourceLocation::new(std::sync::Arc::from("x.js"), 1, 0),
        });
        assert!(model.has_registration(&target, "click"));
        assert!(!model.has_registration(&target, "keydown"));
    }
}
