//! End-to-end accessibility scenarios, exercised through the public API
//! exactly as an embedder would: build an `AnalysisScope`, register the
//! representative passes, run the orchestrator, and check the returned
//! issue list.

use a11y_analyzer::document::{AnalysisScope, AnalysisUnitScope, SourceKind};
use a11y_analyzer::{rules, ConfidenceLevel, Orchestrator, Severity};

fn orchestrator() -> Orchestrator {
    let mut orchestrator = Orchestrator::new();
    for pass in rules::default_passes() {
        orchestrator = orchestrator.register(pass);
    }
    orchestrator
}

#[test]
fn split_handlers_across_files_produce_no_false_positive() {
    let scope = AnalysisScope::new()
        .add(
            "index.html",
            SourceKind::Html,
            r#"<!DOCTYPE html><html><body><button id="submit">Go</button></body></html>"#,
        )
        .add(
            "a.js",
            SourceKind::JsTs,
            "document.getElementById('submit').addEventListener('click', function h1() {});",
        )
        .add(
            "b.js",
            SourceKind::JsTs,
            "document.getElementById('submit').addEventListener('keydown', function h2() {});",
        )
        .with_unit_scope(AnalysisUnitScope::Page);

    let report = orchestrator().analyze(&scope);

    assert!(
        report.issues.iter().all(|i| i.kind != "mouse-only-click"),
        "expected no mouse-only-click issue, got: {:?}",
        report.issues.iter().map(|i| i.kind).collect::<Vec<_>>()
    );
}

#[test]
fn typo_in_selector_produces_orphaned_event_handler() {
    let scope = AnalysisScope::new()
        .add(
            "index.html",
            SourceKind::Html,
            r#"<!DOCTYPE html><html><body><button id="submit">Go</button></body></html>"#,
        )
        .add(
            "app.js",
            SourceKind::JsTs,
            "document.getElementById('sumbit').addEventListener('click', function h() {});",
        )
        .with_unit_scope(AnalysisUnitScope::Page);

    let report = orchestrator().analyze(&scope);

    let orphans: Vec<_> = report.issues.iter().filter(|i| i.kind == "orphaned-event-handler").collect();
    assert_eq!(orphans.len(), 1);
    assert_eq!(orphans[0].severity, Severity::Error);
    assert!(orphans[0].wcag_criteria.contains(&"4.1.2"));
    assert_eq!(orphans[0].location.file.as_ref(), "app.js");
}

#[test]
fn dangling_aria_labelledby_is_flagged() {
    let scope = AnalysisScope::new()
        .add(
            "index.html",
            SourceKind::Html,
            r#"<!DOCTYPE html><html><body><div aria-labelledby="lbl"></div></body></html>"#,
        )
        .with_unit_scope(AnalysisUnitScope::Page);

    let report = orchestrator().analyze(&scope);

    let found: Vec<_> = report.issues.iter().filter(|i| i.kind == "missing-aria-connection").collect();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].severity, Severity::Error);
    assert!(found[0].wcag_criteria.contains(&"1.3.1"));
    assert!(found[0].wcag_criteria.contains(&"4.1.2"));
}

#[test]
fn duplicate_positive_tabindex_produces_warnings_and_cross_referenced_errors() {
    let scope = AnalysisScope::new()
        .add(
            "index.html",
            SourceKind::Html,
            r#"<!DOCTYPE html><html><body>
                <a tabindex="2" href="/x">X</a>
                <a tabindex="2" href="/y">Y</a>
            </body></html>"#,
        )
        .with_unit_scope(AnalysisUnitScope::Page);

    let report = orchestrator().analyze(&scope);

    let positive: Vec<_> = report.issues.iter().filter(|i| i.kind == "positive-tabindex").collect();
    assert_eq!(positive.len(), 2);
    assert!(positive.iter().all(|i| i.severity == Severity::Warning));

    let duplicates: Vec<_> = report.issues.iter().filter(|i| i.kind == "duplicate-tabindex").collect();
    assert_eq!(duplicates.len(), 2);
    for issue in &duplicates {
        assert_eq!(issue.severity, Severity::Error);
        assert_eq!(issue.related_locations.len(), 1);
    }
    assert_ne!(duplicates[0].related_locations[0], duplicates[0].location);
}

#[test]
fn css_hidden_focusable_button_is_flagged_with_css_rule_location() {
    let scope = AnalysisScope::new()
        .add(
            "index.html",
            SourceKind::Html,
            r#"<!DOCTYPE html><html><body><button id="b" class="hid">X</button></body></html>"#,
        )
        .add("style.css", SourceKind::Css, ".hid { display: none; }")
        .with_unit_scope(AnalysisUnitScope::Page);

    let report = orchestrator().analyze(&scope);

    let found: Vec<_> = report.issues.iter().filter(|i| i.kind == "css-hidden-focusable").collect();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].severity, Severity::Error);
    assert_eq!(found[0].related_locations.len(), 1);
    assert_eq!(found[0].related_locations[0].file.as_ref(), "style.css");
}

#[test]
fn aria_hidden_focusable_button_is_its_own_issue_kind() {
    let scope = AnalysisScope::new()
        .add(
            "index.html",
            SourceKind::Html,
            r#"<!DOCTYPE html><html><body><button aria-hidden="true">X</button></body></html>"#,
        )
        .with_unit_scope(AnalysisUnitScope::Page);

    let report = orchestrator().analyze(&scope);

    assert!(report.issues.iter().any(|i| i.kind == "aria-hidden-focusable"));
    assert!(!report.issues.iter().any(|i| i.kind == "css-hidden-focusable"));
}

#[test]
fn file_scope_click_handler_without_html_is_low_confidence() {
    let scope = AnalysisScope::new()
        .add(
            "app.js",
            SourceKind::JsTs,
            "document.getElementById('submit').addEventListener('click', function h() {});",
        )
        .with_unit_scope(AnalysisUnitScope::File);

    let report = orchestrator().analyze(&scope);

    let found: Vec<_> = report.issues.iter().filter(|i| i.kind == "mouse-only-click").collect();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].confidence.level(), ConfidenceLevel::Low);
    assert!(found[0].confidence.reason().contains("another"));
}

#[test]
fn confidence_is_monotonic_non_decreasing_across_scopes() {
    let html = r#"<!DOCTYPE html><html><body><div aria-labelledby="lbl"></div></body></html>"#;

    let file_scope = AnalysisScope::new()
        .add("index.html", SourceKind::Html, html)
        .with_unit_scope(AnalysisUnitScope::File);
    let page_scope = AnalysisScope::new()
        .add("index.html", SourceKind::Html, html)
        .with_unit_scope(AnalysisUnitScope::Page);
    let workspace_scope = AnalysisScope::new()
        .add("index.html", SourceKind::Html, html)
        .with_unit_scope(AnalysisUnitScope::Workspace);

    let score_for = |scope: &AnalysisScope| {
        orchestrator()
            .analyze(scope)
            .issues
            .into_iter()
            .find(|i| i.kind == "missing-aria-connection")
            .unwrap()
            .confidence
            .score()
    };

    let file_score = score_for(&file_scope);
    let page_score = score_for(&page_scope);
    let workspace_score = score_for(&workspace_scope);

    assert!(file_score <= page_score);
    assert!(page_score <= workspace_score);
}

#[test]
fn issues_are_deterministically_sorted_and_deduplicated() {
    let scope = AnalysisScope::new()
        .add(
            "index.html",
            SourceKind::Html,
            r#"<!DOCTYPE html><html><body>
                <div aria-labelledby="a"></div>
                <div aria-describedby="b"></div>
            </body></html>"#,
        )
        .with_unit_scope(AnalysisUnitScope::Page);

    let sequential = orchestrator().analyze_sequential(&scope);
    let parallel = orchestrator().analyze(&scope);

    let seq_keys: Vec<_> = sequential
        .issues
        .iter()
        .map(|i| (i.location.file.to_string(), i.location.line, i.location.column, i.kind))
        .collect();
    let par_keys: Vec<_> = parallel
        .issues
        .iter()
        .map(|i| (i.location.file.to_string(), i.location.line, i.location.column, i.kind))
        .collect();

    assert_eq!(seq_keys, par_keys, "pass order should not affect the final issue set");

    let mut sorted = seq_keys.clone();
    sorted.sort();
    assert_eq!(seq_keys, sorted, "issues must come back in file/line/column/kind order");
}
