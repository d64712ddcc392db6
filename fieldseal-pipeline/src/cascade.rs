//! Deleting dependent records before their parent.

use crate::error::PipelineResult;
use async_trait::async_trait;
use fieldseal_model::ForeignKeyConstraint;
use fieldseal_types::{Operation, OperationParams};
use serde_json::Value;
use tracing::debug;

/// Routes an operation to a resource's own pipeline.
///
/// Cascades go through this so that child deletes run the child's hooks
/// (its own cascades, cache eviction and events included).
#[async_trait]
pub trait ResourceInvoker: Send + Sync {
    async fn call(
        &self,
        resource: &str,
        operation: Operation,
        params: OperationParams,
    ) -> PipelineResult<Value>;
}

/// Issues the dependent `deleteMany` calls for one parent resource.
///
/// Relations are processed sequentially in declaration order. Nothing is
/// rolled back: if one relation fails, earlier relations stay deleted and
/// the error is returned.
#[derive(Debug, Clone, Copy)]
pub struct CascadeCoordinator<'a> {
    parent: &'a str,
    constraints: &'a [ForeignKeyConstraint],
}

impl<'a> CascadeCoordinator<'a> {
    pub fn new(parent: &'a str, constraints: &'a [ForeignKeyConstraint]) -> Self {
        Self {
            parent,
            constraints,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Deletes every dependent of `parent_id`.
    pub async fn cascade_delete(
        &self,
        invoker: &dyn ResourceInvoker,
        parent_id: &str,
    ) -> PipelineResult<()> {
        for constraint in self.constraints {
            let field = constraint.field_for(self.parent);
            let removed = invoker
                .call(
                    &constraint.resource,
                    Operation::DeleteMany,
                    OperationParams::where_eq(&field, parent_id),
                )
                .await?;
            let count = removed.get("count").and_then(Value::as_u64).unwrap_or(0);
            debug!(
                parent = self.parent,
                child = %constraint.resource,
                field = %field,
                count,
                "cascade delete"
            );
        }
        Ok(())
    }

    /// [`Self::cascade_delete`] for each id in turn.
    pub async fn cascade_delete_many(
        &self,
        invoker: &dyn ResourceInvoker,
        parent_ids: &[String],
    ) -> PipelineResult<()> {
        if self.is_empty() {
            return Ok(());
        }
        for id in parent_ids {
            self.cascade_delete(invoker, id).await?;
        }
        Ok(())
    }
}
