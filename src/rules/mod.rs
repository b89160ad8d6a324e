//! The five representative analyzer rules.

mod focus_order_conflict;
mod missing_aria_connection;
mod mouse_only_click;
mod orphaned_handler;
mod visibility_focus_conflict;

pub use focus_order_conflict::FocusOrderConflictPass;
pub use missing_aria_connection::MissingAriaConnectionPass;
pub use mouse_only_click::MouseOnlyClickPass;
pub use orphaned_handler::OrphanedHandlerPass;
pub use visibility_focus_conflict::VisibilityFocusConflictPass;

use crate::analyzer::AnalyzerPass;

/// Registers one instance of each of the five representative rules, in a
/// stable order. Embedders that want a different rule set construct their
/// own `Orchestrator` and register passes individually instead.
pub fn default_passes() -> Vec<Box<dyn AnalyzerPass>> {
    vec![
        Box::new(MouseOnlyClickPass),
        Box::new(OrphanedHandlerPass),
        Box::new(MissingAriaConnectionPass),
        Box::new(FocusOrderConflictPass),
        Box::new(VisibilityFocusConflictPass),
    ]
}
