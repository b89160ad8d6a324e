//! Flags an `aria-*` attribute that references one or more element
//! ids by value (`aria-labelledby`, `aria-describedby`, `aria-controls`,
//! `aria-owns`, `aria-activedescendant`) where one of the referenced ids
//! does not exist anywhere in the document — WCAG 4.1.2 (Name, Role,
//! Value): the relationship the author intended is silently broken.

use crate::analyzer::{AnalyzerPass, PassContext, PassRequirements};
use crate::context::ElementContext;
use crate::issue::{create_issue, ContextRequirement, Issue, Severity};

const ID_REFERENCE_ATTRIBUTES: &[&str] = &[
    "aria-labelledby",
    "aria-describedby",
    "aria-controls",
    "aria-owns",
    "aria-activedescendant",
    "aria-flowto",
    "aria-details",
    "aria-errormessage",
];

pub struct MissingAriaConnectionPass;

impl AnalyzerPass for MissingAriaConnectionPass {
    fn name(&self) -> &'static str {
        "missing-aria-connection"
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
            let location = ctx.document.fragment(element.fragment).node(element.node).location.clone();

            for &attr_name in ID_REFERENCE_ATTRIBUTES {
                let Some(value) = ec.attr(attr_name) else { continue };
                for referenced_id in value.split_ascii_whitespace() {
                    if ctx.document.node_by_id(referenced_id).is_none() {
                        issues.push(create_issue(
                            ctx.scope,
                            "missing-aria-connection",
                            format!(
                                "<{}> has {}=\"{}\", but no element with id=\"{}\" exists in the document",
                                ec.tag(),
                                attr_name,
                                value,
                                referenced_id
                            ),
                            Severity::Error,
                            &["1.3.1", "4.1.2"],
                            location.clone(),
                            ContextRequirement::FullPage,
                            Some(&ec),
                            Vec::new(),
                            None,
                        ));
                    }
                }
            }
        }

        issues
    }
}
