// core/src/flow/execution.rs

use super::control::{FlowOutcome, StepControl};
use super::error::FlowError;
use super::workflow::{Handler, Workflow};
use super::ContextData;
use tracing::{event, instrument, Instrument, Level};

impl<TData, Err> Workflow<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Runs every step in order against `ctx_data`.
  ///
  /// A skipped step (its `skip_if` returned true) or an optional step with no
  /// handlers is passed over. A required step with no handlers fails the run
  /// with `FlowError::HandlerMissing`. The first handler error aborts the run.
  #[instrument(
    name = "Workflow::run",
    skip_all,
    fields(workflow = self.name, num_steps = self.steps.len()),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<FlowOutcome, Err> {
    event!(Level::DEBUG, "Workflow starting.");

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();
      let step_span = tracing::info_span!("workflow_step", step = step_name, index = step_idx);

      if let Some(skip_if) = &step_def.skip_if {
        if skip_if(ctx_data.clone()) {
          event!(parent: &step_span, Level::INFO, "Step skipped by condition.");
          continue;
        }
      }

      let phases = [
        ("before", self.before.get(step_name)),
        ("on", self.on.get(step_name)),
        ("after", self.after.get(step_name)),
      ];

      if phases.iter().all(|(_, handlers)| handlers.map_or(true, |h| h.is_empty())) {
        if step_def.optional {
          event!(parent: &step_span, Level::DEBUG, "Optional step has no handlers.");
          continue;
        }
        event!(parent: &step_span, Level::ERROR, "Required step has no handlers.");
        return Err(Err::from(FlowError::HandlerMissing {
          step_name: step_def.name.clone(),
        }));
      }

      for (phase, handlers) in phases {
        let Some(handlers) = handlers else { continue };
        let control = run_phase(handlers, &ctx_data, phase).instrument(step_span.clone()).await?;
        if control == StepControl::Stop {
          event!(parent: &step_span, Level::INFO, phase, "Workflow stopped by handler.");
          return Ok(FlowOutcome::Stopped);
        }
      }
    }

    event!(Level::DEBUG, "Workflow completed.");
    Ok(FlowOutcome::Completed)
  }
}

async fn run_phase<TData, Err>(
  handlers: &[Handler<TData, Err>],
  ctx_data: &ContextData<TData>,
  phase: &'static str,
) -> Result<StepControl, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + Send + Sync + 'static,
{
  for handler in handlers {
    match handler(ctx_data.clone()).await {
      Ok(StepControl::Continue) => {}
      Ok(StepControl::Stop) => return Ok(StepControl::Stop),
      Err(e) => {
        event!(Level::WARN, phase, error = %e, "Step handler failed.");
        return Err(e);
      }
    }
  }
  Ok(StepControl::Continue)
}
