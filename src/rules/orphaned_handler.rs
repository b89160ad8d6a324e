//! Flags an `eventHandlerRegistration` whose `TargetDescriptor`
//! resolved to no element anywhere in the merged document — a handler wired
//! up against an id, class, or tag that no longer (or never did) exist in
//! the DOM, evidence of behavior the author believed was reaching an
//! element and is not (WCAG 4.1.2, Name, Role, Value).

use crate::analyzer::{AnalyzerPass, PassContext, PassRequirements};
use crate::document::OrphanedRegistration;
use crate::issue::{create_issue, ContextRequirement, Issue, Severity};
use crate::js::TargetDescriptor;

fn describe_target(target: &TargetDescriptor) -> String {
    match target {
        TargetDescriptor::ById(id) => format!("#{id}"),
        TargetDescriptor::ByClass(class) => format!(".{class}"),
        TargetDescriptor::ByTag(tag) => tag.clone(),
        TargetDescriptor::ByAttribute(name, Some(value)) => format!("[{name}=\"{value}\"]"),
        TargetDescriptor::ByAttribute(name, None) => format!("[{name}]"),
        TargetDescriptor::Compound(parts) => parts.iter().map(describe_target).collect::<Vec<_>>().join(""),
        TargetDescriptor::JsxInline(_) => "<jsx element>".to_string(),
        TargetDescriptor::Unknown => "<unresolved>".to_string(),
    }
}

pub struct OrphanedHandlerPass;

impl AnalyzerPass for OrphanedHandlerPass {
    fn name(&self) -> &'static str {
        "orphaned-handler"
    }

    fn requirements(&self) -> PassRequirements {
        PassRequirements {
            requires_document: true,
            tolerates_partial_scope: false,
        }
    }

    fn run(&self, ctx: &PassContext) -> Vec<Issue> {
        ctx.document
            .orphaned_registrations()
            .iter()
            .map(|registration: &OrphanedRegistration| {
                create_issue(
                    ctx.scope,
                    "orphaned-event-handler",
                    format!(
                        "{} event handler targets \"{}\", which matches no element in the analyzed document",
                        registration.event_type,
                        describe_target(&registration.target)
                    ),
                    Severity::Error,
                    &["4.1.2"],
                    registration.location.clone(),
                    ContextRequirement::FullPage,
                    None,
                    Vec::new(),
                    None,
                )
            })
            .collect()
    }
}
