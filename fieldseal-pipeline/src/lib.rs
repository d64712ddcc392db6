//! The fieldseal data-access pipeline.
//!
//! Every operation on a resource passes through a [`Dispatcher`]:
//!
//! 1. parameters are validated
//! 2. before-hooks encrypt `where` operands and `data` fields, then hash
//!    hashed fields
//! 3. the [`RecordStore`](fieldseal_storage::RecordStore) executes (reads
//!    through the cache, deletes cascade to dependents first)
//! 4. after-hooks decrypt the result, evict the resource's cache namespace
//!    and publish deletion events
//! 5. any failure is normalized into [`PipelineError`]
//!
//! [`PipelineHost`] registers resources and routes calls, including the
//! cascade calls dispatchers make to each other.

mod cascade;
mod config;
mod context;
mod dispatcher;
mod error;
mod events;
mod fields;
mod hooks;
mod host;
mod normalize;

pub use cascade::{CascadeCoordinator, ResourceInvoker};
pub use config::{CacheConfig, HashConfig, PipelineConfig, ENV_CACHE_TTL_SECS, ENV_ENCRYPTION_KEY};
pub use context::{OperationContext, Stage};
pub use dispatcher::{Dispatcher, Services};
pub use error::{PipelineError, PipelineResult};
pub use events::{BroadcastEmitter, EventEmitter, NoopEmitter};
pub use fields::FieldTransformer;
pub use hooks::{AfterHook, BeforeHook, HookPlan};
pub use host::PipelineHost;
pub use normalize::{normalize, HookError};
