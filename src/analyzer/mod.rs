//! The analyzer framework: the pass trait every accessibility check
//! implements, and the orchestrator that runs the registered set of them
//! over one `DocumentModel`.

pub mod orchestrator;
pub mod pass;

pub use orchestrator::{AnalysisReport, Orchestrator};
pub use pass::{AnalyzerPass, PassContext, PassRequirements};
