//! Flags an element with a click handler that has no keyboard
//! equivalent and is not itself keyboard-operable by default — a click
//! target a mouse user can activate but a keyboard-only user cannot,
//! WCAG 2.1.1 (Keyboard).
//!
//! Two code paths: when a full DOM is in scope, iterate actual
//! elements and consult the handler-attachment table (high confidence, the
//! document has every file's handlers merged already). Without one — a
//! bare JS/TS file — fall back to comparing click and keyboard
//! registrations that share a `TargetDescriptor` within the *same*
//! `ActionLanguageModel`, since there is no DOM to resolve them against; a
//! companion keyboard handler could still be sitting in another,
//! unanalyzed file, so this path always reports LOW confidence.

use crate::analyzer::{AnalyzerPass, PassContext};
use crate::context::ElementContext;
use crate::issue::{create_issue, ContextRequirement, Issue, Severity};
use crate::js::ActionNode;

const KEYBOARD_EVENTS: &[&str] = &["keydown", "keyup", "keypress"];

/// Tags (and, for `<a>`, the attribute shape) that already come with native
/// keyboard activation, so a click handler on them needs no separate
/// keyboard handler to be operable.
fn natively_keyboard_operable(ec: &ElementContext) -> bool {
    match ec.tag() {
        "button" | "summary" => true,
        "a" => ec.attr("href").is_some(),
        _ => false,
    }
}

pub struct MouseOnlyClickPass;

impl AnalyzerPass for MouseOnlyClickPass {
    fn name(&self) -> &'static str {
        "mouse-only-click"
    }

    fn run(&self, ctx: &PassContext) -> Vec<Issue> {
        if ctx.scope.has_html_source() {
            document_scope_issues(ctx)
        } else {
            file_scope_issues(ctx)
        }
    }
}

fn document_scope_issues(ctx: &PassContext) -> Vec<Issue> {
    let mut issues = Vec::new();

    for element in ctx.document.elements() {
        let ec = ElementContext::new(ctx.document, element);
        if natively_keyboard_operable(&ec) {
            continue;
        }
        if !ec.has_click_handler() || ec.has_keyboard_handler() {
            continue;
        }

        let location = ctx
            .document
            .handlers_for(element)
            .iter()
            .find(|h| h.event_type.eq_ignore_ascii_case("click"))
            .map(|h| h.location.clone())
            .unwrap_or_else(|| ctx.document.fragment(element.fragment).node(element.node).location.clone());

        issues.push(create_issue(
            ctx.scope,
            "mouse-only-click",
            format!(
                "<{}> has a click handler but no keyboard equivalent (keydown/keyup/keypress) and is not natively keyboard-operable",
                ec.tag()
            ),
            Severity::Error,
            &["2.1.1"],
            location,
            ContextRequirement::None,
            Some(&ec),
            Vec::new(),
            None,
        ));
    }

    issues
}

/// No DOM to resolve targets against: compare click and keyboard
/// registrations within one file's `ActionLanguageModel` purely by target
/// descriptor equality.
fn file_scope_issues(ctx: &PassContext) -> Vec<Issue> {
    let mut issues = Vec::new();

    for model in ctx.document.action_models() {
        for action in model.actions() {
            let ActionNode::EventHandlerRegistration {
                target,
                event_type,
                location,
                ..
            } = action
            else {
                continue;
            };
            if !event_type.eq_ignore_ascii_case("click") {
                continue;
            }

            let has_companion_keyboard_handler =
                KEYBOARD_EVENTS.iter().any(|event| model.has_registration(target, event));
            if has_companion_keyboard_handler {
                continue;
            }

            issues.push(create_issue(
                ctx.scope,
                "mouse-only-click",
                "click handler has no keyboard equivalent (keydown/keyup/keypress) registered in this file; a companion handler may exist in another, unanalyzed file".to_string(),
                Severity::Warning,
                &["2.1.1"],
                location.clone(),
                ContextRequirement::FullPage,
                None,
                Vec::new(),
                None,
            ));
        }
    }

    issues
}
