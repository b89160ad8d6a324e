//! Issue reporting: the `Issue`/`Severity`/`Confidence`/`Fix` types every
//! analyzer pass emits, and the `create_issue` helper that applies
//! the confidence policy centrally rather than letting each pass
//! invent its own number.

use std::collections::BTreeMap;
use std::fmt;

use crate::context::ElementContext;
use crate::document::{AnalysisScope, AnalysisUnitScope};
use crate::location::SourceLocation;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

/// The authoritative signal is the numeric score; `level()` is a derived
/// coarse bucket for callers that just want a quick filter.
#[derive(Clone, Debug, PartialEq)]
pub struct Confidence {
    score: f32,
    reason: String,
    scope: AnalysisUnitScope,
}

impl Confidence {
    pub fn score(&self) -> f32 {
        self.score
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn scope(&self) -> AnalysisUnitScope {
        self.scope
    }

    pub fn level(&self) -> ConfidenceLevel {
        if self.score >= 0.8 {
            ConfidenceLevel::High
        } else if self.score >= 0.5 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}

/// A minimal, serializable snapshot of the element an issue is about,
/// cloned out of a borrowed `ElementContext` so an `Issue` can outlive the
/// `DocumentModel` it was produced from.
#[derive(Clone, Debug)]
pub struct ElementContextSummary {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub focusable: bool,
    pub interactive: bool,
}

impl ElementContextSummary {
    pub fn capture(ec: &ElementContext<'_>) -> Self {
        ElementContextSummary {
            tag: ec.tag().to_string(),
            attributes: ec.attributes_owned(),
            focusable: ec.is_focusable(),
            interactive: ec.is_interactive(),
        }
    }
}

/// A suggested textual change a human reviewer can apply, when the pass that
/// found the issue can propose one mechanically. Fixes are optional
/// and never applied automatically.
#[derive(Clone, Debug)]
pub struct Fix {
    pub description: String,
    pub replacement: Option<String>,
}

#[derive(Clone, Debug)]
pub struct Issue {
    pub kind: &'static str,
    pub message: String,
    pub severity: Severity,
    pub wcag_criteria: Vec<&'static str>,
    pub location: SourceLocation,
    pub related_locations: Vec<SourceLocation>,
    pub confidence: Confidence,
    pub element_context: Option<ElementContextSummary>,
    pub fix: Option<Fix>,
}

/// Which context an issue kind relies on to be fully confident; used by
/// `create_issue` to discount confidence when that context is missing from
/// the scope the analysis ran over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContextRequirement {
    /// No extra context needed beyond the element itself.
    None,
    /// Needs the surrounding page (other elements, CSS, scripts) to be
    /// confident — e.g. a rule that checks whether *some other* element
    /// supplies an accessible name.
    FullPage,
    /// Needs computed color information the analyzer does not compute.
    Color,
    /// Needs rendered element dimensions the analyzer does not compute.
    Dimension,
}

impl ContextRequirement {
    fn penalty_and_reason(&self, scope: &AnalysisScope) -> (f32, Option<&'static str>) {
        match self {
            ContextRequirement::None => (0.0, None),
            ContextRequirement::FullPage => {
                if scope.has_html_source() {
                    (0.0, None)
                } else {
                    (0.25, Some("no HTML document is in scope, so cross-element relationships cannot be fully checked"))
                }
            }
            ContextRequirement::Color => (
                0.3,
                Some("computed color values are not available to a static analyzer"),
            ),
            ContextRequirement::Dimension => (
                0.3,
                Some("rendered element dimensions are not available to a static analyzer"),
            ),
        }
    }
}

/// The four-tier confidence table, keyed on how much of the model
/// was actually observable: a full `DocumentModel` with or without a
/// specific element's context, or a bare file-scope analysis with or
/// without some local context to go on.
fn base_confidence(unit_scope: AnalysisUnitScope, has_document: bool, has_element_context: bool) -> (f32, &'static str) {
    match unit_scope {
        AnalysisUnitScope::File => {
            if has_element_context {
                (
                    0.7,
                    "file-scope analysis; local context is available but handlers or styles in other files cannot be seen",
                )
            } else {
                (
                    0.4,
                    "file-scope analysis with no cross-file context available",
                )
            }
        }
        AnalysisUnitScope::Page | AnalysisUnitScope::Workspace => {
            if has_document && has_element_context {
                (1.0, "full document model available with element context")
            } else if has_document {
                (0.9, "full document model available")
            } else {
                (
                    0.6,
                    "page-scope analysis without a fully resolved document model",
                )
            }
        }
    }
}

/// Builds an `Issue`, applying the centralized confidence policy to
/// `scope` and `element_context` rather than letting each rule invent its
/// own number. Every rule in `rules/` goes through this rather than
/// constructing `Issue` directly.
#[allow(clippy::too_many_arguments)]
pub fn create_issue(
    scope: &AnalysisScope,
    kind: &'static str,
    message: String,
    severity: Severity,
    wcag_criteria: &[&'static str],
    location: SourceLocation,
    context_requirement: ContextRequirement,
    element_context: Option<&ElementContext<'_>>,
    related_locations: Vec<SourceLocation>,
    fix: Option<Fix>,
) -> Issue {
    let (base, base_reason) = base_confidence(scope.unit_scope, scope.has_html_source(), element_context.is_some());
    let (penalty, penalty_reason) = context_requirement.penalty_and_reason(scope);

    let mut reason = base_reason.to_string();
    if let Some(extra) = penalty_reason {
        reason.push_str("; ");
        reason.push_str(extra);
    }

    let confidence = Confidence {
        score: (base - penalty).clamp(0.0, 1.0),
        reason,
        scope: scope.unit_scope,
    };

    Issue {
        kind,
        message,
        severity,
        wcag_criteria: wcag_criteria.to_vec(),
        location,
        related_locations,
        confidence,
        element_context: element_context.map(ElementContextSummary::capture),
        fix,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{AnalysisUnitScope, SourceKind};
    use std::sync::Arc;

    fn loc() -> SourceLocation {
        SourceLocation::new(Arc::from("x.html"), 1, 0)
    }

    #[test]
    fn full_page_requirement_is_penalized_without_html_source() {
        let js_only = AnalysisScope::new()
            .add("a.js", SourceKind::JsTs, "")
            .with_unit_scope(AnalysisUnitScope::Page);
        let issue = create_issue(
            &js_only,
            "test-kind",
            "msg".to_string(),
            Severity::Warning,
            &[],
            loc(),
            ContextRequirement::FullPage,
            None,
            Vec::new(),
            None,
        );
        assert!(issue.confidence.score() < 0.9);
        assert!(issue.confidence.reason().contains("no HTML document"));
    }

    #[test]
    fn full_page_requirement_is_unpenalized_with_html_source() {
        let with_html = AnalysisScope::new()
            .add("a.html", SourceKind::Html, "<html></html>")
            .with_unit_scope(AnalysisUnitScope::Page);
        let issue = create_issue(
            &with_html,
            "test-kind",
            "msg".to_string(),
            Severity::Warning,
            &[],
            loc(),
            ContextRequirement::FullPage,
            None,
            Vec::new(),
            None,
        );
        assert!((issue.confidence.score() - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn level_buckets_match_score_thresholds() {
        let scope = AnalysisScope::new().with_unit_scope(AnalysisUnitScope::Page);
        let high = create_issue(
            &scope,
            "k",
            "m".into(),
            Severity::Error,
            &[],
            loc(),
            ContextRequirement::None,
            None,
            Vec::new(),
            None,
        );
        assert_eq!(high.confidence.level(), ConfidenceLevel::High);

        let file_scope = AnalysisScope::new();
        let low = create_issue(
            &file_scope,
            "k",
            "m".into(),
            Severity::Warning,
            &[],
            loc(),
            ContextRequirement::None,
            None,
            Vec::new(),
            None,
        );
        assert_eq!(low.confidence.level(), ConfidenceLevel::Low);
    }

    #[test]
    fn confidence_is_monotonic_across_scopes() {
        let file = AnalysisScope::new()
            .add("a.html", SourceKind::Html, "")
            .with_unit_scope(AnalysisUnitScope::File);
        let page = AnalysisScope::new()
            .add("a.html", SourceKind::Html, "")
            .with_unit_scope(AnalysisUnitScope::Page);
        let workspace = AnalysisScope::new()
            .add("a.html", SourceKind::Html, "")
            .with_unit_scope(AnalysisUnitScope::Workspace);

        let mk = |s: &AnalysisScope| {
            create_issue(
                s,
                "k",
                "m".into(),
                Severity::Warning,
                &[],
                loc(),
                ContextRequirement::None,
                None,
                Vec::new(),
                None,
            )
            .confidence
            .score()
        };

        assert!(mk(&file) <= mk(&page));
        assert!(mk(&page) <= mk(&workspace));
    }
}
