// tests/common/mod.rs
#![allow(dead_code)]

use once_cell::sync::Lazy;
use tollgate::{ContextData, PipelineControl, TollgateError};
use tracing::Level;

/// A request-like context: which gates ran, and what they decided.
#[derive(Clone, Debug, Default)]
pub struct GateContext {
  pub credential: Option<String>,
  pub principal: Option<u32>,
  pub public_route: bool,
  pub gates_passed: Vec<String>,
  pub stop_at: Option<String>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("Tollgate framework error: {0}")]
  Engine(String),

  #[error("Gate rejected: {0}")]
  Rejected(String),
}

impl From<TollgateError> for TestError {
  fn from(err: TollgateError) -> Self {
    TestError::Engine(format!("{:?}", err))
  }
}

/// A gate that records its name and lets the run continue (or stop, if told to).
pub fn passing_gate(gate_name: &'static str) -> tollgate::Handler<GateContext, TestError> {
  Box::new(move |ctx: ContextData<GateContext>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.gates_passed.push(gate_name.to_string());
      if guard.stop_at.as_deref() == Some(gate_name) {
        return Ok(PipelineControl::Stop);
      }
      Ok(PipelineControl::Continue)
    })
  })
}

/// A gate that records its name and rejects.
pub fn rejecting_gate(gate_name: &'static str, reason: &'static str) -> tollgate::Handler<GateContext, TestError> {
  Box::new(move |ctx: ContextData<GateContext>| {
    Box::pin(async move {
      ctx.write().gates_passed.push(gate_name.to_string());
      Err(TestError::Rejected(reason.to_string()))
    })
  })
}

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
