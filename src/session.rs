//! Tracks metadata for one analysis session.

use crate::log;

/// Ambient handle through which the logging switch is consulted.
///
/// When an embedder first builds a `DocumentModel` there is no context yet where
/// this crate's code may start to track things. This struct provides that context,
/// the same way a loading session would for a stateful library; here it carries
/// nothing but the log-enabled flag since the analyzer itself is otherwise
/// context-free — no ambient state, everything flows through `PassContext`.
#[derive(Clone, Copy, Debug)]
pub struct Session {
    log_enabled: bool,
}

impl Session {
    pub fn new() -> Self {
        Self {
            log_enabled: log::log_enabled(),
        }
    }

    pub fn log_enabled(&self) -> bool {
        self.log_enabled
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
