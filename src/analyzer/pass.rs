//! The analyzer pass trait: one self-contained accessibility check over a
//! `DocumentModel`, run independently of every other pass and free to run
//! in parallel with them.

use crate::document::{AnalysisScope, DocumentModel};
use crate::issue::Issue;

/// The read-only view a pass receives. Intentionally thin: everything a
/// pass needs either lives on `document` directly or is derived per-element
/// via `ElementContext`.
pub struct PassContext<'a> {
    pub document: &'a DocumentModel,
    pub scope: &'a AnalysisScope,
}

/// Declares what kind of source material a pass can act on, used by the
/// orchestrator to skip passes that would have nothing to say.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PassRequirements {
    /// True if the pass needs a full HTML document in scope (DOM structure,
    /// not just a bare JS/CSS file) to produce anything meaningful.
    pub requires_document: bool,
    /// True if the pass can still run, at reduced confidence, over a scope
    /// that is missing some of the context it would prefer. Passes
    /// that cannot tolerate a partial scope at all should leave this false
    /// and rely on `requires_document` instead.
    pub tolerates_partial_scope: bool,
}

impl Default for PassRequirements {
    fn default() -> Self {
        PassRequirements {
            requires_document: false,
            tolerates_partial_scope: true,
        }
    }
}

/// One accessibility check. Implementations must not mutate
/// `document` and must not panic for expected inputs — a panic is still
/// caught at the orchestrator boundary, but it discards every issue
/// the pass would otherwise have reported for this run.
pub trait AnalyzerPass: Send + Sync {
    fn name(&self) -> &'static str;

    fn requirements(&self) -> PassRequirements {
        PassRequirements::default()
    }

    fn run(&self, ctx: &PassContext) -> Vec<Issue>;
}
