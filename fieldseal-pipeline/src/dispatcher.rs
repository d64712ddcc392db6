//! The hook pipeline wrapped around every store operation.
//!
//! ```text
//! Pending -> BeforeHooksRunning -> OperationExecuting -> AfterHooksRunning -> Completed
//!     \______________________________________________________________/
//!                               |
//!                      ErrorHooksRunning -> Failed
//! ```
//!
//! Hooks run strictly one after another in [`HookPlan`] order. The first
//! failure skips the rest of the chain and is normalized before it is
//! returned.

use crate::cascade::{CascadeCoordinator, ResourceInvoker};
use crate::context::{OperationContext, Stage};
use crate::error::PipelineResult;
use crate::events::{EventEmitter, NoopEmitter};
use crate::fields::FieldTransformer;
use crate::hooks::{AfterHook, BeforeHook, HookPlan};
use crate::normalize::{normalize, HookError};
use fieldseal_cache::{cache_key, CacheClient, CacheInvalidator};
use fieldseal_crypto::FieldCrypto;
use fieldseal_model::ResourceConfig;
use fieldseal_storage::RecordStore;
use fieldseal_types::{DataPayload, Operation, OperationParams, Record, RecordExt, ResourceEvent};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

type HookResult<T> = Result<T, HookError>;

/// Dependencies shared by every resource's dispatcher.
#[derive(Clone)]
pub struct Services {
    pub store: Arc<dyn RecordStore>,
    pub crypto: Arc<FieldCrypto>,
    /// Read-through cache and its eviction; disabled when no backend is set.
    pub cache: CacheInvalidator,
    pub emitter: Arc<dyn EventEmitter>,
    /// TTL for cached reads of resources without their own.
    pub default_ttl: Option<Duration>,
}

impl Services {
    /// A store and crypto engine with no cache and no event channel.
    pub fn new(store: Arc<dyn RecordStore>, crypto: Arc<FieldCrypto>) -> Self {
        Self {
            store,
            crypto,
            cache: CacheInvalidator::disabled(),
            emitter: Arc::new(NoopEmitter),
            default_ttl: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn CacheClient>, default_ttl: Option<Duration>) -> Self {
        self.cache = CacheInvalidator::new(cache);
        self.default_ttl = default_ttl;
        self
    }

    pub fn with_emitter(mut self, emitter: Arc<dyn EventEmitter>) -> Self {
        self.emitter = emitter;
        self
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("store", &self.store.backend_name())
            .field("crypto", &self.crypto)
            .field("cache", &self.cache.is_enabled())
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

/// Runs one resource's operations through its hooks.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    config: Arc<ResourceConfig>,
    services: Services,
}

impl Dispatcher {
    pub fn new(config: Arc<ResourceConfig>, services: Services) -> Self {
        Self { config, services }
    }

    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    fn fields(&self) -> FieldTransformer<'_> {
        FieldTransformer::new(&self.config, &self.services.crypto)
    }

    fn cascade(&self) -> CascadeCoordinator<'_> {
        CascadeCoordinator::new(&self.config.name, &self.config.foreign_key_constraints)
    }

    /// Runs `operation` with `params`. `invoker` reaches other resources for
    /// cascades.
    pub async fn dispatch(
        &self,
        invoker: &dyn ResourceInvoker,
        operation: Operation,
        params: OperationParams,
    ) -> PipelineResult<Value> {
        let mut ctx = OperationContext::new(&self.config.name, operation, params);
        match self.run(invoker, &mut ctx).await {
            Ok(value) => {
                ctx.advance(Stage::Completed);
                Ok(value)
            }
            Err(err) => {
                ctx.advance(Stage::ErrorHooksRunning);
                let err = normalize(err);
                warn!(
                    resource = %ctx.resource,
                    operation = %operation,
                    code = err.code(),
                    status = err.status(),
                    error = %err,
                    "operation failed"
                );
                ctx.advance(Stage::Failed);
                Err(err)
            }
        }
    }

    async fn run(
        &self,
        invoker: &dyn ResourceInvoker,
        ctx: &mut OperationContext,
    ) -> HookResult<Value> {
        ctx.params.validate(ctx.operation)?;
        let plan = HookPlan::for_operation(ctx.operation);

        ctx.advance(Stage::BeforeHooksRunning);
        for hook in &plan.before {
            self.before(*hook, &mut ctx.params)?;
        }

        ctx.advance(Stage::OperationExecuting);
        let mut result = self.execute(invoker, ctx).await?;

        ctx.advance(Stage::AfterHooksRunning);
        for hook in &plan.after {
            self.after(*hook, ctx, &mut result).await?;
        }
        Ok(result)
    }

    fn before(&self, hook: BeforeHook, params: &mut OperationParams) -> HookResult<()> {
        let fields = self.fields();
        match hook {
            BeforeHook::EncryptData => data_records(params)
                .into_iter()
                .try_for_each(|record| fields.encrypt_record(record)),
            BeforeHook::HashData => data_records(params)
                .into_iter()
                .try_for_each(|record| fields.hash_record(record)),
            BeforeHook::EncryptWhere => match params.filter.as_mut() {
                Some(filter) => fields.encrypt_where(filter),
                None => Ok(()),
            },
        }
    }

    async fn after(
        &self,
        hook: AfterHook,
        ctx: &OperationContext,
        result: &mut Value,
    ) -> HookResult<()> {
        match hook {
            AfterHook::DecryptResult => self.fields().decrypt_result(result),
            AfterHook::BreakCache => {
                self.services.cache.break_cache(&ctx.resource).await?;
                Ok(())
            }
            AfterHook::NotifyDeleted => {
                if ctx.matched.is_empty() {
                    return Ok(());
                }
                let event = ResourceEvent::deleted(&ctx.resource, ctx.matched.clone());
                self.services.emitter.emit(event).await?;
                Ok(())
            }
        }
    }

    // ── Execution ────────────────────────────────────────────────

    async fn execute(
        &self,
        invoker: &dyn ResourceInvoker,
        ctx: &mut OperationContext,
    ) -> HookResult<Value> {
        match ctx.operation {
            Operation::Delete => self.delete(invoker, ctx).await,
            Operation::DeleteMany => self.delete_many(invoker, ctx).await,
            op if op.is_read() => self.cached_read(ctx).await,
            op => Ok(self.services.store.execute(&ctx.resource, op, &ctx.params).await?),
        }
    }

    fn match_params(ctx: &OperationContext) -> OperationParams {
        OperationParams {
            filter: ctx.params.filter.clone(),
            ..OperationParams::default()
        }
    }

    /// Cascades to the first match's dependents, then deletes it.
    async fn delete(
        &self,
        invoker: &dyn ResourceInvoker,
        ctx: &mut OperationContext,
    ) -> HookResult<Value> {
        let store = &self.services.store;
        let found = store
            .execute(&ctx.resource, Operation::FindFirst, &Self::match_params(ctx))
            .await?;
        if let Value::Object(record) = found {
            if let Some(id) = record.id() {
                self.cascade().cascade_delete(invoker, id).await?;
            }
            ctx.matched.push(record);
        }
        Ok(store.execute(&ctx.resource, Operation::Delete, &ctx.params).await?)
    }

    /// Cascades to the dependents of every match, then deletes them all.
    async fn delete_many(
        &self,
        invoker: &dyn ResourceInvoker,
        ctx: &mut OperationContext,
    ) -> HookResult<Value> {
        let store = &self.services.store;
        let found = store
            .execute(&ctx.resource, Operation::FindMany, &Self::match_params(ctx))
            .await?;
        let records: Vec<Record> = match found {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(record) => Some(record),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };
        let ids: Vec<String> = records
            .iter()
            .filter_map(|r| r.id().map(String::from))
            .collect();
        self.cascade().cascade_delete_many(invoker, &ids).await?;
        ctx.matched = records;
        Ok(store.execute(&ctx.resource, Operation::DeleteMany, &ctx.params).await?)
    }

    /// Serves a read from the cache when possible. Entries hold the store's
    /// result as stored; decryption happens afterwards either way.
    ///
    /// Filters on random-mode fields bypass the cache: their encrypted form
    /// differs on every call, so the key could never hit again.
    async fn cached_read(&self, ctx: &OperationContext) -> HookResult<Value> {
        let store = &self.services.store;
        let invalidator = &self.services.cache;
        let Some(cache) = invalidator.client() else {
            return Ok(store.execute(&ctx.resource, ctx.operation, &ctx.params).await?);
        };
        if let Some(filter) = &ctx.params.filter
            && self.fields().filters_on_random_field(filter)
        {
            debug!(resource = %ctx.resource, operation = %ctx.operation, "random-mode filter, cache bypassed");
            return Ok(store.execute(&ctx.resource, ctx.operation, &ctx.params).await?);
        }

        let key = cache_key(&ctx.resource, ctx.operation, &ctx.params)?;
        if let Some(hit) = cache.get(&key).await? {
            debug!(resource = %ctx.resource, operation = %ctx.operation, "cache hit");
            return Ok(hit);
        }

        let generation = invalidator.generation(&ctx.resource).await;
        let value = store.execute(&ctx.resource, ctx.operation, &ctx.params).await?;
        let ttl = self.config.ttl().or(self.services.default_ttl);
        let stored = invalidator
            .fill(&ctx.resource, generation, &key, value.clone(), ttl)
            .await?;
        debug!(resource = %ctx.resource, operation = %ctx.operation, stored, "cache miss");
        Ok(value)
    }
}

fn data_records(params: &mut OperationParams) -> Vec<&mut Record> {
    params
        .data
        .as_mut()
        .map(DataPayload::records_mut)
        .unwrap_or_default()
}
