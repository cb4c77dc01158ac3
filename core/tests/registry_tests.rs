// tests/registry_tests.rs
mod common;

use common::*;
use tollgate::{ContextData, Pipeline, PipelineControl, PipelineResult, Tollgate, TollgateError};

#[derive(Clone, Debug, Default)]
struct LoginCtx {
  issued: Option<String>,
}

#[derive(Clone, Debug, Default)]
struct VerifyCtx {
  activated: bool,
}

#[tokio::test]
async fn test_registry_dispatches_on_context_type() {
  setup_tracing();
  let registry = Tollgate::<TestError>::new();

  let mut login = Pipeline::<LoginCtx, TestError>::new(&[("issue", false, None)]);
  login.on_root("issue", |ctx: ContextData<LoginCtx>| async move {
    ctx.write().issued = Some("credential".to_string());
    Ok::<_, TollgateError>(PipelineControl::Continue)
  });
  registry.register_pipeline(login);

  let mut verify = Pipeline::<VerifyCtx, TestError>::new(&[("activate", false, None)]);
  verify.on_root("activate", |ctx: ContextData<VerifyCtx>| async move {
    ctx.write().activated = true;
    Ok::<_, TollgateError>(PipelineControl::Continue)
  });
  registry.register_pipeline(verify);

  let login_ctx = ContextData::new(LoginCtx::default());
  assert_eq!(registry.run(login_ctx.clone()).await.unwrap(), PipelineResult::Completed);
  assert_eq!(login_ctx.read().issued.as_deref(), Some("credential"));

  let verify_ctx = ContextData::new(VerifyCtx::default());
  assert_eq!(registry.run(verify_ctx.clone()).await.unwrap(), PipelineResult::Completed);
  assert!(verify_ctx.read().activated);

  assert!(registry.has_pipeline::<LoginCtx>());
  assert_eq!(registry.step_names::<VerifyCtx>(), Some(vec!["activate".to_string()]));
}

#[tokio::test]
async fn test_registry_unregistered_context_is_a_configuration_error() {
  setup_tracing();
  let registry = Tollgate::<TestError>::new();

  #[derive(Clone, Debug, Default)]
  struct UnregisteredContext;

  let result = registry.run(ContextData::new(UnregisteredContext)).await;
  match result {
    Err(TestError::Engine(s)) => {
      assert!(s.contains("ConfigurationError"));
      assert!(s.contains("UnregisteredContext"));
    }
    other => panic!("Expected ConfigurationError, got {:?}", other),
  }
}

#[tokio::test]
async fn test_registry_propagates_handler_error() {
  setup_tracing();
  let registry = Tollgate::<TestError>::new();

  let mut pipeline = Pipeline::<LoginCtx, TestError>::new(&[("issue", false, None)]);
  pipeline.on_root("issue", |_ctx: ContextData<LoginCtx>| async move {
    Err::<PipelineControl, _>(TestError::Rejected("bad password".to_string()))
  });
  registry.register_pipeline(pipeline);

  let result = registry.run(ContextData::new(LoginCtx::default())).await;
  assert_eq!(result.unwrap_err(), TestError::Rejected("bad password".to_string()));
}

#[tokio::test]
async fn test_registering_twice_replaces_pipeline() {
  setup_tracing();
  let registry = Tollgate::<TollgateError>::default();

  let mut first = Pipeline::<VerifyCtx, TollgateError>::new(&[("noop", true, None)]);
  first.on_root("noop", |_ctx: ContextData<VerifyCtx>| async move {
    Ok::<_, TollgateError>(PipelineControl::Continue)
  });
  registry.register_pipeline(first);

  let mut second = Pipeline::<VerifyCtx, TollgateError>::new(&[("activate", false, None)]);
  second.on_root("activate", |ctx: ContextData<VerifyCtx>| async move {
    ctx.write().activated = true;
    Ok::<_, TollgateError>(PipelineControl::Continue)
  });
  registry.register_pipeline(second);

  let ctx = ContextData::new(VerifyCtx::default());
  registry.run(ctx.clone()).await.unwrap();
  assert!(ctx.read().activated);
}
