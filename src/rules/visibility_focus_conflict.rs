//! Flags a focusable element that is hidden from the user while
//! still reachable by keyboard — a focus trap on invisible content. Two
//! distinct checks, each its own issue kind since they point at different
//! source locations and different WCAG criteria:
//!
//! - `aria-hidden="true"` (or the `hidden` attribute) on the element itself
//!   removes it from the accessibility tree entirely: "aria-hidden-focusable",
//!   WCAG 4.1.2 (Name, Role, Value).
//! - A matching CSS rule that visually hides it (`display: none`,
//!   `visibility: hidden`, `opacity: 0`, a zero clip rect, `clip-path:
//!   inset(50%)`, or absolute/fixed positioning pushed far off screen), on
//!   the element or an ancestor: "css-hidden-focusable", WCAG 2.4.7 (Focus
//!   Visible), with the hiding rule's own location in `related-locations`.

use crate::analyzer::{AnalyzerPass, PassContext, PassRequirements};
use crate::context::ElementContext;
use crate::issue::{create_issue, ContextRequirement, Issue, Severity};

pub struct VisibilityFocusConflictPass;

impl AnalyzerPass for VisibilityFocusConflictPass {
    fn name(&self) -> &'static str {
        "visibility-focus-conflict"
    }

    fn requirements(&self) -> PassRequirements {
        PassRequirements {
            requires_document: true,
            tolerates_partial_scope: false,
        }
    }

    fn run(&self, ctx: &PassContext) -> Vec<Issue> {
        let mut issues = Vec::new();

        for element in ctx.document.elements() {
            let ec = ElementContext::new(ctx.document, element);
            if ec.is_removed_from_tab_order() || !ec.is_focusable() {
                continue;
            }

            let location = ctx.document.fragment(element.fragment).node(element.node).location.clone();

            if ec.aria_hides() {
                issues.push(create_issue(
                    ctx.scope,
                    "aria-hidden-focusable",
                    format!(
                        "<{}> is hidden from the accessibility tree (aria-hidden or hidden) but remains reachable by keyboard focus",
                        ec.tag()
                    ),
                    Severity::Error,
                    &["4.1.2"],
                    location,
                    ContextRequirement::None,
                    Some(&ec),
                    Vec::new(),
                    Some(crate::issue::Fix {
                        description: "add tabindex=\"-1\" while hidden, or remove the element from the tab order by another means, so focus cannot land on invisible content".to_string(),
                        replacement: None,
                    }),
                ));
                continue;
            }

            if let Some(rule) = ec.hiding_css_rule() {
                issues.push(create_issue(
                    ctx.scope,
                    "css-hidden-focusable",
                    format!(
                        "<{}> is visually hidden by a matching CSS rule but remains reachable by keyboard focus",
                        ec.tag()
                    ),
                    Severity::Error,
                    &["2.4.7"],
                    location,
                    ContextRequirement::FullPage,
                    Some(&ec),
                    vec![rule.location.clone()],
                    Some(crate::issue::Fix {
                        description: "add tabindex=\"-1\" while hidden, or remove the element from the tab order by another means, so focus cannot land on invisible content".to_string(),
                        replacement: None,
                    }),
                ));
            }
        }

        issues
    }
}
