// tests/pipeline_execution_tests.rs
mod common;

use common::*;
use serial_test::serial;
use std::sync::Arc;
use tollgate::{ContextData, Pipeline, PipelineControl, PipelineResult, TollgateError};

#[tokio::test]
#[serial]
async fn test_gates_run_in_declared_order() {
  setup_tracing();
  let mut pipeline = Pipeline::<GateContext, TestError>::new(&[
    ("authenticate", false, None),
    ("check_ownership", false, None),
    ("handler", false, None),
  ]);
  pipeline.on_root_boxed("authenticate", passing_gate("authenticate"));
  pipeline.on_root_boxed("check_ownership", passing_gate("check_ownership"));
  pipeline.on_root_boxed("handler", passing_gate("handler"));

  let ctx = ContextData::new(GateContext::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap(), PipelineResult::Completed);
  assert_eq!(ctx.read().gates_passed, vec!["authenticate", "check_ownership", "handler"]);
}

#[tokio::test]
#[serial]
async fn test_rejecting_gate_prevents_every_later_step() {
  setup_tracing();
  let mut pipeline = Pipeline::<GateContext, TestError>::new(&[
    ("authenticate", false, None),
    ("check_ownership", false, None),
    ("handler", false, None),
  ]);
  pipeline.on_root_boxed("authenticate", rejecting_gate("authenticate", "no credential"));
  pipeline.on_root_boxed("check_ownership", passing_gate("check_ownership"));
  pipeline.on_root_boxed("handler", passing_gate("handler"));

  let ctx = ContextData::new(GateContext::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap_err(), TestError::Rejected("no credential".to_string()));
  assert_eq!(ctx.read().gates_passed, vec!["authenticate"]);
}

#[tokio::test]
#[serial]
async fn test_stop_halts_without_error() {
  setup_tracing();
  let mut pipeline = Pipeline::<GateContext, TestError>::new(&[("first", false, None), ("second", false, None)]);
  pipeline.on_root_boxed("first", passing_gate("first"));
  pipeline.on_root_boxed("second", passing_gate("second"));

  let ctx = ContextData::new(GateContext {
    stop_at: Some("first".to_string()),
    ..Default::default()
  });
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap(), PipelineResult::Stopped);
  assert_eq!(ctx.read().gates_passed, vec!["first"]);
}

#[tokio::test]
#[serial]
async fn test_skip_condition_makes_gates_mutually_exclusive() {
  setup_tracing();
  let mut pipeline = Pipeline::<GateContext, TestError>::new(&[
    (
      "authenticate",
      false,
      Some(Arc::new(|ctx: &GateContext| ctx.public_route)),
    ),
    (
      "resolve_capability",
      false,
      Some(Arc::new(|ctx: &GateContext| !ctx.public_route)),
    ),
  ]);
  pipeline.on_root_boxed("authenticate", passing_gate("authenticate"));
  pipeline.on_root_boxed("resolve_capability", passing_gate("resolve_capability"));

  let private_ctx = ContextData::new(GateContext::default());
  pipeline.run(private_ctx.clone()).await.unwrap();
  assert_eq!(private_ctx.read().gates_passed, vec!["authenticate"]);

  let public_ctx = ContextData::new(GateContext {
    public_route: true,
    ..Default::default()
  });
  pipeline.run(public_ctx.clone()).await.unwrap();
  assert_eq!(public_ctx.read().gates_passed, vec!["resolve_capability"]);
}

#[tokio::test]
#[serial]
async fn test_skip_condition_sees_state_written_by_earlier_step() {
  setup_tracing();
  let mut pipeline = Pipeline::<GateContext, TestError>::new(&[
    ("authenticate", false, None),
    (
      "fallback",
      false,
      Some(Arc::new(|ctx: &GateContext| ctx.principal.is_some())),
    ),
  ]);
  pipeline.on_root("authenticate", |ctx: ContextData<GateContext>| async move {
    ctx.write().principal = Some(7);
    Ok::<_, TestError>(PipelineControl::Continue)
  });
  pipeline.on_root_boxed("fallback", passing_gate("fallback"));

  let ctx = ContextData::new(GateContext::default());
  pipeline.run(ctx.clone()).await.unwrap();
  assert!(ctx.read().gates_passed.is_empty());
}

#[tokio::test]
#[serial]
async fn test_non_optional_step_missing_handler_fails() {
  setup_tracing();
  let pipeline = Pipeline::<GateContext, TestError>::new(&[("unwired_gate", false, None)]);

  let result = pipeline.run(ContextData::new(GateContext::default())).await;

  match result {
    Err(TestError::Engine(s)) => {
      assert!(s.contains("HandlerMissing"));
      assert!(s.contains("unwired_gate"));
    }
    other => panic!("Expected HandlerMissing, got {:?}", other),
  }
}

#[tokio::test]
#[serial]
async fn test_optional_step_missing_handler_is_skipped() {
  setup_tracing();
  let pipeline = Pipeline::<GateContext, TestError>::new(&[("optional_audit", true, None)]);

  let result = pipeline.run(ContextData::new(GateContext::default())).await;
  assert_eq!(result.unwrap(), PipelineResult::Completed);
}

#[tokio::test]
#[serial]
async fn test_before_on_after_order_within_a_step() {
  setup_tracing();
  let mut pipeline = Pipeline::<GateContext, TestError>::new(&[("gate", false, None)]);
  pipeline.after_root("gate", passing_gate("after"));
  pipeline.on_root("gate", passing_gate("on"));
  pipeline.before_root("gate", passing_gate("before"));

  let ctx = ContextData::new(GateContext::default());
  pipeline.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().gates_passed, vec!["before", "on", "after"]);
}

#[tokio::test]
#[serial]
async fn test_failing_before_handler_skips_on_and_after() {
  setup_tracing();
  let mut pipeline = Pipeline::<GateContext, TestError>::new(&[("gate", false, None)]);
  pipeline.before_root("gate", rejecting_gate("before", "denied"));
  pipeline.on_root("gate", passing_gate("on"));
  pipeline.after_root("gate", passing_gate("after"));

  let ctx = ContextData::new(GateContext::default());
  assert!(pipeline.run(ctx.clone()).await.is_err());
  assert_eq!(ctx.read().gates_passed, vec!["before"]);
}

#[tokio::test]
#[serial]
async fn test_structural_edits_keep_order() {
  setup_tracing();
  let mut pipeline = Pipeline::<GateContext, TollgateError>::new(&[("a", false, None), ("c", false, None)]);
  pipeline.insert_before_step("c", "b", false, None);
  pipeline.insert_after_step("c", "d", true, None);
  assert_eq!(pipeline.step_names(), vec!["a", "b", "c", "d"]);

  pipeline.remove_step("b");
  pipeline.remove_step("does_not_exist");
  assert_eq!(pipeline.step_names(), vec!["a", "c", "d"]);
}

#[test]
#[should_panic(expected = "not found in pipeline definition")]
fn test_registering_handler_on_unknown_step_panics() {
  let mut pipeline = Pipeline::<GateContext, TestError>::new(&[("known", false, None)]);
  pipeline.on_root_boxed("unknown", passing_gate("unknown"));
}

#[test]
#[should_panic(expected = "already exists")]
fn test_inserting_duplicate_step_panics() {
  let mut pipeline = Pipeline::<GateContext, TestError>::new(&[("known", false, None)]);
  pipeline.insert_after_step("known", "known", false, None);
}

#[tokio::test]
#[serial]
async fn test_set_optional_toggles_missing_handler_behaviour() {
  setup_tracing();
  let mut pipeline = Pipeline::<GateContext, TestError>::new(&[("audit", false, None), ("handler", false, None)]);
  pipeline.on_root_boxed("handler", passing_gate("handler"));

  let err = pipeline.run(ContextData::new(GateContext::default())).await.unwrap_err();
  assert!(matches!(err, TestError::Engine(ref s) if s.contains("HandlerMissing")));

  pipeline.set_optional("audit", true);
  let ctx = ContextData::new(GateContext::default());
  assert_eq!(pipeline.run(ctx.clone()).await.unwrap(), PipelineResult::Completed);
  assert_eq!(ctx.read().gates_passed, vec!["handler"]);

  pipeline.set_optional("audit", false);
  assert!(pipeline.run(ContextData::new(GateContext::default())).await.is_err());
}

#[tokio::test]
#[serial]
async fn test_set_skip_condition_replaces_and_clears_predicate() {
  setup_tracing();
  let mut pipeline = Pipeline::<GateContext, TestError>::new(&[("authenticate", false, None), ("handler", false, None)]);
  pipeline.on_root_boxed("authenticate", rejecting_gate("authenticate", "no credential"));
  pipeline.on_root_boxed("handler", passing_gate("handler"));

  let public_ctx = || {
    ContextData::new(GateContext {
      public_route: true,
      ..Default::default()
    })
  };
  assert!(pipeline.run(public_ctx()).await.is_err());

  let skip_on_public: tollgate::SkipCondition<GateContext> = Arc::new(|ctx: &GateContext| ctx.public_route);
  pipeline.set_skip_condition("authenticate", Some(skip_on_public));
  let ctx = public_ctx();
  pipeline.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().gates_passed, vec!["handler"]);

  // Private routes still hit the gate.
  assert!(pipeline.run(ContextData::new(GateContext::default())).await.is_err());

  pipeline.set_skip_condition("authenticate", None);
  let ctx = public_ctx();
  assert_eq!(
    pipeline.run(ctx.clone()).await.unwrap_err(),
    TestError::Rejected("no credential".to_string())
  );
  assert_eq!(ctx.read().gates_passed, vec!["authenticate"]);
}

#[test]
#[should_panic(expected = "not found in pipeline definition")]
fn test_toggling_unknown_step_panics() {
  let mut pipeline = Pipeline::<GateContext, TestError>::new(&[("known", false, None)]);
  pipeline.set_optional("unknown", true);
}
