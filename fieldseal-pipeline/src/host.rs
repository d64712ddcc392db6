//! Resource registry and call routing.

use crate::cascade::ResourceInvoker;
use crate::config::PipelineConfig;
use crate::dispatcher::{Dispatcher, Services};
use crate::error::{PipelineError, PipelineResult};
use async_trait::async_trait;
use fieldseal_cache::MemoryCache;
use fieldseal_model::{ModelError, ResourceConfig};
use fieldseal_storage::RecordStore;
use fieldseal_types::{Operation, OperationParams};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::info;

/// Owns the shared services and one [`Dispatcher`] per registered resource.
///
/// Cascades re-enter the host through [`ResourceInvoker`], so a child
/// delete runs the child's full pipeline.
#[derive(Debug)]
pub struct PipelineHost {
    services: Services,
    dispatchers: HashMap<String, Dispatcher>,
}

impl PipelineHost {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            dispatchers: HashMap::new(),
        }
    }

    /// Builds a host and registers every configured resource.
    ///
    /// An in-memory cache is attached when caching is enabled.
    pub fn from_config(config: &PipelineConfig, store: Arc<dyn RecordStore>) -> PipelineResult<Self> {
        let mut services = Services::new(store, Arc::new(config.crypto()?));
        if config.cache.enabled {
            services = services.with_cache(Arc::new(MemoryCache::new()), config.default_ttl());
        }

        let mut host = Self::new(services);
        for resource in &config.resources {
            host.register(resource.clone())?;
        }
        host.check_relations()?;
        Ok(host)
    }

    /// Validates and registers a resource.
    pub fn register(&mut self, config: ResourceConfig) -> PipelineResult<()> {
        config.validate().map_err(configuration)?;
        if self.dispatchers.contains_key(&config.name) {
            return Err(configuration(ModelError::DuplicateResource(config.name)));
        }
        if config.has_encrypted_fields() && !self.services.crypto.has_key() {
            return Err(PipelineError::Configuration(format!(
                "resource '{}' declares encrypted fields but no encryption key is configured",
                config.name
            )));
        }

        info!(
            resource = %config.name,
            encrypted = config.encrypted_fields.len(),
            deterministic = config.deterministic_encrypted_fields.len(),
            hashed = config.hashed_fields.len(),
            relations = config.foreign_key_constraints.len(),
            store = self.services.store.backend_name(),
            "resource registered"
        );
        let name = config.name.clone();
        let dispatcher = Dispatcher::new(Arc::new(config), self.services.clone());
        self.dispatchers.insert(name.clone(), dispatcher);
        if let Err(err) = self.check_acyclic() {
            self.dispatchers.remove(&name);
            return Err(err);
        }
        Ok(())
    }

    /// Checks that every cascade target is registered and that cascades
    /// never lead back to a resource already being deleted.
    pub fn check_relations(&self) -> PipelineResult<()> {
        for dispatcher in self.dispatchers.values() {
            let parent = dispatcher.config();
            for constraint in &parent.foreign_key_constraints {
                if !self.dispatchers.contains_key(&constraint.resource) {
                    return Err(configuration(ModelError::InvalidConstraint {
                        resource: parent.name.clone(),
                        reason: format!("related resource '{}' is not registered", constraint.resource),
                    }));
                }
            }
        }
        self.check_acyclic()
    }

    /// Rejects a cycle among registered resources' cascades. Relations to
    /// resources not yet registered are skipped.
    fn check_acyclic(&self) -> PipelineResult<()> {
        let mut names: Vec<&str> = self.resources().collect();
        names.sort_unstable();

        let mut done: HashSet<&str> = HashSet::new();
        for name in names {
            let mut path = Vec::new();
            if let Some(cycle) = self.cycle_from(name, &mut path, &mut done) {
                return Err(PipelineError::Configuration(format!(
                    "cascade cycle: {}",
                    cycle.join(" -> ")
                )));
            }
        }
        Ok(())
    }

    /// Depth-first walk; returns the cycle as a closed path of names.
    fn cycle_from<'a>(
        &'a self,
        name: &'a str,
        path: &mut Vec<&'a str>,
        done: &mut HashSet<&'a str>,
    ) -> Option<Vec<&'a str>> {
        if let Some(start) = path.iter().position(|n| *n == name) {
            let mut cycle = path[start..].to_vec();
            cycle.push(name);
            return Some(cycle);
        }
        if done.contains(name) {
            return None;
        }
        let dispatcher = self.dispatchers.get(name)?;

        path.push(name);
        for constraint in &dispatcher.config().foreign_key_constraints {
            if let Some(cycle) = self.cycle_from(&constraint.resource, path, done) {
                return Some(cycle);
            }
        }
        path.pop();
        done.insert(name);
        None
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn resource(&self, name: &str) -> Option<&ResourceConfig> {
        self.dispatchers.get(name).map(Dispatcher::config)
    }

    pub fn resources(&self) -> impl Iterator<Item = &str> {
        self.dispatchers.keys().map(String::as_str)
    }

    fn dispatcher(&self, resource: &str) -> PipelineResult<&Dispatcher> {
        self.dispatchers
            .get(resource)
            .ok_or_else(|| PipelineError::Configuration(format!("unknown resource '{resource}'")))
    }

    /// Calls `operation` on `resource` with JSON parameters, as a transport
    /// would: the operation is named, the parameters untyped.
    pub async fn call_json(&self, resource: &str, operation: &str, params: Value) -> PipelineResult<Value> {
        let operation: Operation = operation
            .parse()
            .map_err(|e: fieldseal_types::Error| PipelineError::Validation(e.to_string()))?;
        let params = if params.is_null() {
            OperationParams::default()
        } else {
            OperationParams::from_value(params).map_err(|e| PipelineError::Validation(e.to_string()))?
        };
        self.call(resource, operation, params).await
    }
}

#[async_trait]
impl ResourceInvoker for PipelineHost {
    async fn call(
        &self,
        resource: &str,
        operation: Operation,
        params: OperationParams,
    ) -> PipelineResult<Value> {
        self.dispatcher(resource)?
            .dispatch(self, operation, params)
            .await
    }
}

fn configuration(err: ModelError) -> PipelineError {
    PipelineError::Configuration(err.to_string())
}
