// tests/workflow_tests.rs
mod common;

use autoparts_core::flow::{ContextData, FlowError, FlowOutcome, SkipCondition, StepControl, Workflow, Workflows};
use common::*;
use serial_test::serial;
use std::sync::Arc;

#[derive(Debug, Default)]
struct TraceCtx {
  visited: Vec<String>,
  stop_at: Option<&'static str>,
  skip_audit: bool,
}

#[derive(Debug, thiserror::Error)]
enum TraceError {
  #[error("flow: {0}")]
  Flow(#[from] FlowError),
  #[error("step failed: {0}")]
  Step(String),
}

fn recorder(label: &'static str) -> impl Fn(ContextData<TraceCtx>) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<StepControl, TraceError>> + Send>> + Send + Sync + 'static {
  move |ctx: ContextData<TraceCtx>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.visited.push(label.to_string());
      if guard.stop_at == Some(label) {
        return Ok(StepControl::Stop);
      }
      Ok(StepControl::Continue)
    })
  }
}

#[tokio::test]
#[serial]
async fn test_runs_phases_in_order() {
  setup_tracing();
  let mut w = Workflow::<TraceCtx, TraceError>::new("trace", &[("load", false, None), ("save", false, None)]);
  w.after_root("load", recorder("load:after"));
  w.on_root("load", recorder("load:on"));
  w.before_root("load", recorder("load:before"));
  w.on_root("save", recorder("save:on"));

  let ctx = ContextData::new(TraceCtx::default());
  let outcome = w.run(ctx.clone()).await.unwrap();

  assert_eq!(outcome, FlowOutcome::Completed);
  assert_eq!(ctx.read().visited, vec!["load:before", "load:on", "load:after", "save:on"]);
}

#[tokio::test]
#[serial]
async fn test_stop_halts_remaining_steps() {
  setup_tracing();
  let mut w = Workflow::<TraceCtx, TraceError>::new("trace", &[("a", false, None), ("b", false, None)]);
  w.on_root("a", recorder("a"));
  w.after_root("a", recorder("a:after"));
  w.on_root("b", recorder("b"));

  let ctx = ContextData::new(TraceCtx {
    stop_at: Some("a"),
    ..TraceCtx::default()
  });
  let outcome = w.run(ctx.clone()).await.unwrap();

  assert_eq!(outcome, FlowOutcome::Stopped);
  assert_eq!(ctx.read().visited, vec!["a"]);
}

#[tokio::test]
#[serial]
async fn test_handler_error_aborts_run() {
  setup_tracing();
  let mut w = Workflow::<TraceCtx, TraceError>::new("trace", &[("a", false, None), ("b", false, None)]);
  w.on_root("a", |_ctx: ContextData<TraceCtx>| {
    Box::pin(async move { Err::<StepControl, _>(TraceError::Step("disk full".to_string())) })
  });
  w.on_root("b", recorder("b"));

  let ctx = ContextData::new(TraceCtx::default());
  let err = w.run(ctx.clone()).await.unwrap_err();

  assert_eq!(err.to_string(), "step failed: disk full");
  assert!(ctx.read().visited.is_empty());
}

#[tokio::test]
#[serial]
async fn test_required_step_without_handlers_fails_but_optional_is_passed_over() {
  setup_tracing();
  let mut w = Workflow::<TraceCtx, TraceError>::new("trace", &[("notify", true, None), ("persist", false, None)]);
  w.on_root("notify", recorder("unused"));
  let bare = Workflow::<TraceCtx, TraceError>::new("bare", &[("notify", true, None), ("persist", false, None)]);

  let err = bare.run(ContextData::new(TraceCtx::default())).await.unwrap_err();
  assert!(matches!(err, TraceError::Flow(FlowError::HandlerMissing { ref step_name }) if step_name == "persist"));

  w.on_root("persist", recorder("persist"));
  let ctx = ContextData::new(TraceCtx::default());
  assert_eq!(w.run(ctx.clone()).await.unwrap(), FlowOutcome::Completed);
}

#[tokio::test]
#[serial]
async fn test_skip_condition_reads_context() {
  setup_tracing();
  let skip_audit: SkipCondition<TraceCtx> = Arc::new(|ctx: ContextData<TraceCtx>| ctx.read().skip_audit);
  let mut w = Workflow::<TraceCtx, TraceError>::new("trace", &[("audit", false, Some(skip_audit)), ("done", false, None)]);
  w.on_root("audit", recorder("audit"));
  w.on_root("done", recorder("done"));

  let skipped = ContextData::new(TraceCtx {
    skip_audit: true,
    ..TraceCtx::default()
  });
  w.run(skipped.clone()).await.unwrap();
  assert_eq!(skipped.read().visited, vec!["done"]);

  let audited = ContextData::new(TraceCtx::default());
  w.run(audited.clone()).await.unwrap();
  assert_eq!(audited.read().visited, vec!["audit", "done"]);
}

#[derive(Debug, Default)]
struct OtherCtx;

#[tokio::test]
#[serial]
async fn test_registry_dispatches_by_context_type() {
  setup_tracing();
  let registry = Workflows::<TraceError>::new();
  let mut w = Workflow::<TraceCtx, TraceError>::new("trace", &[("only", false, None)]);
  w.on_root("only", recorder("only"));
  registry.register(w);

  assert!(registry.is_registered::<TraceCtx>());
  let ctx = ContextData::new(TraceCtx::default());
  assert_eq!(registry.run(ctx.clone()).await.unwrap(), FlowOutcome::Completed);
  assert_eq!(ctx.read().visited, vec!["only"]);

  let err = registry.run(ContextData::new(OtherCtx)).await.unwrap_err();
  assert!(matches!(err, TraceError::Flow(FlowError::NotRegistered { .. })));
}
