//! Static accessibility analysis for web source code.
//!
//! This crate reads HTML/JSX, JavaScript/TypeScript, and CSS source text —
//! never a rendered page, never a running browser — and reports
//! accessibility issues: click handlers with no keyboard equivalent,
//! `aria-*` attributes pointing at ids that do not exist, explicit
//! `tabindex` values that fight the natural tab order, and elements that are
//! hidden yet still reachable by keyboard focus.
//!
//! # Basic usage
//!
//! * Build an [`AnalysisScope`] from the sources you want analyzed.
//! * Build an [`Orchestrator`], registering [`rules::default_passes`] (or
//!   your own [`AnalyzerPass`] implementations).
//! * Call [`Orchestrator::analyze`] to get an [`AnalysisReport`].
//!
//! ```
//! use a11y_analyzer::{document::{AnalysisScope, SourceKind}, analyzer::Orchestrator, rules};
//!
//! let scope = AnalysisScope::new().add(
//!     "index.html",
//!     SourceKind::Html,
//!     r#"<!DOCTYPE html><html><body>
//!         <div aria-labelledby="missing-label">Click me</div>
//!     </body></html>"#,
//! );
//!
//! let mut orchestrator = Orchestrator::new();
//! for pass in rules::default_passes() {
//!     orchestrator = orchestrator.register(pass);
//! }
//! let report = orchestrator.analyze(&scope);
//! assert!(!report.issues.is_empty());
//! ```
//!
//! # What this crate does not do
//!
//! There is no rendering, no layout, no color computation, and no CSS
//! cascade — only the narrow, closed selector grammar and flat declaration
//! model the element-context projection actually needs. Findings are
//! heuristic signals for a human reviewer, not a certification that a page
//! is or is not accessible.

#![warn(rust_2018_idioms)]
#![allow(clippy::too_many_arguments)]

#[macro_use]
pub mod log;

pub mod analyzer;
pub mod context;
pub mod css;
pub mod document;
pub mod dom;
pub mod error;
pub mod issue;
pub mod js;
pub mod location;
pub mod rules;
pub mod session;

pub use analyzer::{AnalysisReport, AnalyzerPass, Orchestrator, PassContext};
pub use context::ElementContext;
pub use document::{AnalysisScope, AnalysisUnitScope, DocumentModel};
pub use issue::{Confidence, ConfidenceLevel, ElementContextSummary, Fix, Issue, Severity};
pub use location::SourceLocation;
pub use session::Session;
