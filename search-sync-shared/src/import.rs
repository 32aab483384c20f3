//! Import accounting.

use serde::Serialize;

/// Outcome of a bulk operation: how many elements were handled, how many
/// made it into the index, and why the others did not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportResult {
    /// Elements considered by the operation.
    pub submitted: usize,
    /// Elements accepted by the engine.
    pub succeeded: usize,
    /// One message per rejected element, in processing order.
    pub failures: Vec<String>,
}

impl ImportResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self) {
        self.submitted += 1;
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.submitted += 1;
        self.failures.push(message.into());
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Fold another result into this one, keeping failure order.
    pub fn merge(&mut self, other: ImportResult) {
        self.submitted += other.submitted;
        self.succeeded += other.succeeded;
        self.failures.extend(other.failures);
    }
}
