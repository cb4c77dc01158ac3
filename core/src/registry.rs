// core/src/registry.rs

//! `Tollgate<E>`: a registry of pipelines keyed by their context type.
//!
//! Each context type has at most one pipeline, so running a context selects
//! its pipeline without any string lookup. Registration happens once at
//! startup; runs only take a short lock to clone the pipeline handle.

use crate::core::context_data::ContextData;
use crate::core::control::PipelineResult;
use crate::error::TollgateError;
use crate::pipeline::definition::Pipeline;

use async_trait::async_trait;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{event, Level};

/// Type-erased runner stored in the registry.
#[async_trait]
trait ErasedPipeline<AppErr>: Send + Sync
where
  AppErr: std::error::Error + Send + Sync + 'static,
{
  /// `ctx_obj` holds a `ContextData<TData>` for the wrapped pipeline's `TData`.
  async fn run_erased(&self, ctx_obj: Box<dyn Any + Send>) -> Result<PipelineResult, AppErr>;

  fn step_names(&self) -> Vec<String>;
}

struct PipelineRunner<TData, HandlerErr, AppErr>
where
  TData: 'static + Send + Sync,
  HandlerErr: std::error::Error + From<TollgateError> + Send + Sync + 'static,
  AppErr: std::error::Error + From<HandlerErr> + From<TollgateError> + Send + Sync + 'static,
{
  pipeline: Pipeline<TData, HandlerErr>,
  _phantom_app_err: PhantomData<fn() -> AppErr>,
}

#[async_trait]
impl<TData, HandlerErr, AppErr> ErasedPipeline<AppErr> for PipelineRunner<TData, HandlerErr, AppErr>
where
  TData: 'static + Send + Sync,
  HandlerErr: std::error::Error + From<TollgateError> + Send + Sync + 'static,
  AppErr: std::error::Error + From<HandlerErr> + From<TollgateError> + Send + Sync + 'static,
{
  async fn run_erased(&self, ctx_obj: Box<dyn Any + Send>) -> Result<PipelineResult, AppErr> {
    let ctx_data = match ctx_obj.downcast::<ContextData<TData>>() {
      Ok(boxed) => *boxed,
      Err(_) => {
        let expected_type = std::any::type_name::<ContextData<TData>>();
        event!(Level::ERROR, expected_type, "Context object type mismatch.");
        return Err(AppErr::from(TollgateError::TypeMismatch {
          step_name: "registry_dispatch".to_string(),
          expected_type: expected_type.to_string(),
        }));
      }
    };
    self.pipeline.run(ctx_data).await.map_err(AppErr::from)
  }

  fn step_names(&self) -> Vec<String> {
    self.pipeline.step_names().into_iter().map(str::to_string).collect()
  }
}

/// Registry of pipelines. `AppErr` is what [`Tollgate::run`] returns.
pub struct Tollgate<AppErr = TollgateError>
where
  AppErr: std::error::Error + From<TollgateError> + Send + Sync + 'static,
{
  registry: RwLock<HashMap<TypeId, Arc<dyn ErasedPipeline<AppErr>>>>,
}

impl<AppErr> Default for Tollgate<AppErr>
where
  AppErr: std::error::Error + From<TollgateError> + Send + Sync + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}

impl<AppErr> Tollgate<AppErr>
where
  AppErr: std::error::Error + From<TollgateError> + Send + Sync + 'static,
{
  pub fn new() -> Self {
    Self {
      registry: RwLock::new(HashMap::new()),
    }
  }

  /// Registers `pipeline` for its context type, replacing any earlier registration.
  pub fn register_pipeline<TData, HandlerErr>(&self, pipeline: Pipeline<TData, HandlerErr>)
  where
    TData: 'static + Send + Sync,
    HandlerErr: std::error::Error + From<TollgateError> + Send + Sync + 'static,
    AppErr: From<HandlerErr>,
  {
    event!(Level::DEBUG, context_type = %std::any::type_name::<TData>(), "Registering pipeline.");
    let runner = PipelineRunner::<TData, HandlerErr, AppErr> {
      pipeline,
      _phantom_app_err: PhantomData,
    };
    let previous = self.registry.write().insert(TypeId::of::<TData>(), Arc::new(runner));
    if previous.is_some() {
      event!(Level::WARN, context_type = %std::any::type_name::<TData>(), "Replaced an existing pipeline registration.");
    }
  }

  pub fn has_pipeline<TData: 'static + Send + Sync>(&self) -> bool {
    self.registry.read().contains_key(&TypeId::of::<TData>())
  }

  /// Step names of the pipeline registered for `TData`, if any.
  pub fn step_names<TData: 'static + Send + Sync>(&self) -> Option<Vec<String>> {
    self.registry.read().get(&TypeId::of::<TData>()).map(|runner| runner.step_names())
  }

  /// Runs the pipeline registered for `TData` against `ctx_data`.
  pub async fn run<TData>(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, AppErr>
  where
    TData: 'static + Send + Sync,
  {
    let runner = self.registry.read().get(&TypeId::of::<TData>()).cloned();
    let Some(runner) = runner else {
      let type_name = std::any::type_name::<TData>();
      event!(Level::ERROR, context_type = type_name, "No pipeline registered.");
      return Err(AppErr::from(TollgateError::ConfigurationError {
        step_name: "Tollgate::run".to_string(),
        message: format!("No pipeline registered for context type {}", type_name),
      }));
    };
    runner.run_erased(Box::new(ctx_data)).await
  }
}
