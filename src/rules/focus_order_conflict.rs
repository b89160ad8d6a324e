//! A positive `tabindex` pulls an element out of the natural
//! DOM-order tab sequence and into an author-defined one — a well-known
//! WCAG 2.4.3 (Focus Order) anti-pattern, since it is easy for the custom
//! order to drift out of sync with the visual layout as a page evolves.
//! Every element with one gets a "positive-tabindex" warning; any two
//! elements that land on the *same* positive value additionally get a
//! "duplicate-tabindex" error each, cross-referencing the other's location,
//! since the two elements now race for the same slot in the tab order.

use std::collections::HashMap;

use crate::analyzer::{AnalyzerPass, PassContext, PassRequirements};
use crate::context::ElementContext;
use crate::document::ElementRef;
use crate::issue::{create_issue, ContextRequirement, Issue, Severity};

pub struct FocusOrderConflictPass;

impl AnalyzerPass for FocusOrderConflictPass {
    fn name(&self) -> &'static str {
        "focus-order-conflict"
    }

    fn requirements(&self) -> PassRequirements {
        PassRequirements {
            requires_document: true,
            tolerates_partial_scope: false,
        }
    }

    fn run(&self, ctx: &PassContext) -> Vec<Issue> {
        let mut issues = Vec::new();
        let mut by_value: HashMap<i32, Vec<ElementRef>> = HashMap::new();

        for element in ctx.document.elements() {
            let ec = ElementContext::new(ctx.document, element);
            let Some(tabindex) = ec.tabindex() else { continue };
            if tabindex <= 0 {
                continue;
            }

            let location = ctx.document.fragment(element.fragment).node(element.node).location.clone();
            issues.push(create_issue(
                ctx.scope,
                "positive-tabindex",
                format!(
                    "<{}> has tabindex=\"{}\", overriding the natural DOM tab order",
                    ec.tag(),
                    tabindex
                ),
                Severity::Warning,
                &["2.4.3"],
                location,
                ContextRequirement::None,
                Some(&ec),
                Vec::new(),
                Some(crate::issue::Fix {
                    description: "remove the explicit tabindex and rely on DOM order, or restructure the markup so DOM order matches the intended focus order".to_string(),
                    replacement: None,
                }),
            ));

            by_value.entry(tabindex).or_default().push(element);
        }

        for elements in by_value.into_values().filter(|els| els.len() > 1) {
            let locations: Vec<_> = elements
                .iter()
                .map(|&e| ctx.document.fragment(e.fragment).node(e.node).location.clone())
                .collect();

            for (i, &element) in elements.iter().enumerate() {
                let ec = ElementContext::new(ctx.document, element);
                let tabindex = ec.tabindex().unwrap_or_default();
                let related: Vec<_> = locations
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| j != i)
                    .map(|(_, loc)| loc.clone())
                    .collect();

                issues.push(create_issue(
                    ctx.scope,
                    "duplicate-tabindex",
                    format!(
                        "<{}> shares tabindex=\"{}\" with {} other element(s), creating an ambiguous tab order",
                        ec.tag(),
                        tabindex,
                        elements.len() - 1
                    ),
                    Severity::Error,
                    &["2.4.3"],
                    locations[i].clone(),
                    ContextRequirement::None,
                    Some(&ec),
                    related,
                    None,
                ));
            }
        }

        issues
    }
}
