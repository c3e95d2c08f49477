//! Diagnostic context for one unit of analysis
//!
//! The name of the method being analysed travels with the analysis state
//! instead of living in a global; every event the crate emits while replaying
//! that method carries it as the `unit` field.

use tracing::{Level, Span};

/// Target used for all events emitted by this crate
pub const TRACE_TARGET: &str = "copyprop";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceContext {
    unit: String,
}

impl TraceContext {
    pub fn new(unit: impl Into<String>) -> Self {
        Self { unit: unit.into() }
    }

    /// Name of the method being analysed
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// A span covering the analysis of this unit
    ///
    /// The fixpoint driver enters it around its iteration so nested events
    /// (joins, meets) are attributed to the unit as well.
    pub fn span(&self) -> Span {
        tracing::span!(target: TRACE_TARGET, Level::DEBUG, "alias_analysis", unit = %self.unit)
    }

    /// Is an event at `level` for this crate's target going to be recorded?
    pub fn enabled(level: Level) -> bool {
        match level {
            Level::ERROR => tracing::enabled!(target: TRACE_TARGET, Level::ERROR),
            Level::WARN => tracing::enabled!(target: TRACE_TARGET, Level::WARN),
            Level::INFO => tracing::enabled!(target: TRACE_TARGET, Level::INFO),
            Level::DEBUG => tracing::enabled!(target: TRACE_TARGET, Level::DEBUG),
            _ => tracing::enabled!(target: TRACE_TARGET, Level::TRACE),
        }
    }
}

impl Default for TraceContext {
    fn default() -> Self {
        Self::new("<unknown>")
    }
}
