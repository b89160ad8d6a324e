//! The analyzer framework's orchestrator: builds the
//! `DocumentModel` once, runs every registered pass — in parallel by
//! default, over a work-stealing `rayon` pool — catches any panic at the
//! pass boundary rather than letting it escape, and produces one
//! deterministically ordered, deduplicated issue list.

use std::panic::{catch_unwind, AssertUnwindSafe};

use itertools::Itertools;
use rayon::prelude::*;

use super::pass::{AnalyzerPass, PassContext};
use crate::document::{self, AnalysisScope, DocumentModel};
use crate::error::{AnalyzerInternalError, ModelDiagnostic, ParseDiagnostic};
use crate::issue::{create_issue, ContextRequirement, Issue, Severity};
use crate::location::SourceLocation;
use crate::a11y_log;

/// The full result of one analysis run: the deduplicated, sorted issue list
/// plus every diagnostic raised while building the document model.
pub struct AnalysisReport {
    pub issues: Vec<Issue>,
    pub model_diagnostics: Vec<ModelDiagnostic>,
    pub parse_diagnostics: Vec<ParseDiagnostic>,
    pub internal_errors: Vec<AnalyzerInternalError>,
}

#[derive(Default)]
pub struct Orchestrator {
    passes: Vec<Box<dyn AnalyzerPass>>,
}

impl Orchestrator {
    pub fn new() -> Self {
        Orchestrator::default()
    }

    pub fn register(mut self, pass: Box<dyn AnalyzerPass>) -> Self {
        self.passes.push(pass);
        self
    }

    /// Runs every registered pass over `scope`'s document model, in
    /// parallel — data-parallel over sources during parsing, and over
    /// passes during analysis.
    pub fn analyze(&self, scope: &AnalysisScope) -> AnalysisReport {
        let document = document::build(scope);
        self.analyze_document(scope, &document)
    }

    /// Same as `analyze`, but sequentially — kept available so a
    /// sequential execution path always exists (useful for debugging a
    /// pass in isolation, or running under a single-threaded embedder).
    pub fn analyze_sequential(&self, scope: &AnalysisScope) -> AnalysisReport {
        let document = document::build(scope);
        let ctx = PassContext {
            document: &document,
            scope,
        };
        let outcomes: Vec<PassOutcome> = self
            .passes
            .iter()
            .filter(|pass| applies_to(pass.as_ref(), &ctx))
            .map(|pass| run_pass(pass.as_ref(), &ctx))
            .collect();
        finish(scope, &document, outcomes)
    }

    fn analyze_document(&self, scope: &AnalysisScope, document: &DocumentModel) -> AnalysisReport {
        let ctx = PassContext { document, scope };
        let outcomes: Vec<PassOutcome> = self
            .passes
            .par_iter()
            .filter(|pass| applies_to(pass.as_ref(), &ctx))
            .map(|pass| run_pass(pass.as_ref(), &ctx))
            .collect();
        finish(scope, document, outcomes)
    }
}

/// A pass declaring `requires_document` is skipped outright when the scope
/// has no HTML/JSX source to build a DOM from, rather than being invoked
/// only to discover it has nothing to say.
fn applies_to(pass: &dyn AnalyzerPass, ctx: &PassContext) -> bool {
    let requirements = pass.requirements();
    if requirements.requires_document && !ctx.scope.has_html_source() {
        return false;
    }
    true
}

enum PassOutcome {
    Issues(Vec<Issue>),
    Panicked(AnalyzerInternalError),
}

fn run_pass(pass: &dyn AnalyzerPass, ctx: &PassContext) -> PassOutcome {
    let name = pass.name();
    let result = catch_unwind(AssertUnwindSafe(|| pass.run(ctx)));
    match result {
        Ok(issues) => PassOutcome::Issues(issues),
        Err(payload) => {
            let message = panic_message(&payload);
            a11y_log!("analyzer pass \"{}\" panicked: {}", name, message);
            PassOutcome::Panicked(AnalyzerInternalError {
                pass_name: name.to_string(),
                message,
            })
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Turns a caught pass panic into a visible `analyzer-internal-error` issue
/// in the returned stream, rather than silently dropping the pass's
/// contribution for this run. Not anchored to any parsed construct, so it
/// gets a synthetic location naming the pass that panicked.
fn internal_error_issue(scope: &AnalysisScope, err: &AnalyzerInternalError) -> Issue {
    let location = SourceLocation::unknown(std::sync::Arc::from(err.pass_name.as_str()));
    create_issue(
        scope,
        "analyzer-internal-error",
        format!("analyzer pass \"{}\" panicked: {}", err.pass_name, err.message),
        Severity::Info,
        &[],
        location,
        ContextRequirement::None,
        None,
        Vec::new(),
        None,
    )
}

/// Deduplicates by `(kind, primary location, message)` and sorts by
/// `(file, line, column, kind)` for a deterministic final ordering,
/// independent of which pass ran first or which rayon worker produced which
/// issue.
fn finish(scope: &AnalysisScope, document: &DocumentModel, outcomes: Vec<PassOutcome>) -> AnalysisReport {
    let mut issues = Vec::new();
    let mut internal_errors = Vec::new();

    for outcome in outcomes {
        match outcome {
            PassOutcome::Issues(found) => issues.extend(found),
            PassOutcome::Panicked(err) => {
                issues.push(internal_error_issue(scope, &err));
                internal_errors.push(err);
            }
        }
    }

    issues.sort_by(|a, b| {
        a.location
            .cmp(&b.location)
            .then_with(|| a.kind.cmp(b.kind))
    });
    let issues = issues
        .into_iter()
        .unique_by(|issue| (issue.kind, issue.location.clone(), issue.message.clone()))
        .collect();

    AnalysisReport {
        issues,
        model_diagnostics: document.diagnostics().to_vec(),
        parse_diagnostics: document.parse_diagnostics().to_vec(),
        internal_errors,
    }
}
