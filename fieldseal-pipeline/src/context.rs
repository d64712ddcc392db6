//! Per-invocation state.

use fieldseal_types::{Operation, OperationParams, Record};
use std::fmt;
use tracing::trace;

/// Where an invocation is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Pending,
    BeforeHooksRunning,
    OperationExecuting,
    AfterHooksRunning,
    Completed,
    ErrorHooksRunning,
    Failed,
}

impl Stage {
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Stage::Completed | Stage::Failed)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Pending => "pending",
            Stage::BeforeHooksRunning => "before_hooks",
            Stage::OperationExecuting => "executing",
            Stage::AfterHooksRunning => "after_hooks",
            Stage::Completed => "completed",
            Stage::ErrorHooksRunning => "error_hooks",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// One in-flight operation. Created at dispatch entry and dropped at exit;
/// never shared between invocations.
#[derive(Debug)]
pub struct OperationContext {
    pub resource: String,
    pub operation: Operation,
    /// Parameters as rewritten by the before-hooks.
    pub params: OperationParams,
    /// Records a delete matched, as stored, captured before they are removed.
    pub matched: Vec<Record>,
    stage: Stage,
}

impl OperationContext {
    pub fn new(resource: &str, operation: Operation, params: OperationParams) -> Self {
        Self {
            resource: resource.to_string(),
            operation,
            params,
            matched: Vec::new(),
            stage: Stage::Pending,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub(crate) fn advance(&mut self, stage: Stage) {
        trace!(
            resource = %self.resource,
            operation = %self.operation,
            from = %self.stage,
            to = %stage,
            "stage transition"
        );
        self.stage = stage;
    }
}
