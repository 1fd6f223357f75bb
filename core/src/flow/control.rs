// core/src/flow/control.rs

/// Returned by a step handler to continue the run or halt it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepControl {
  Continue,
  /// Halts the run; no further handlers or steps execute.
  Stop,
}

/// How a workflow run ended when no handler failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOutcome {
  Completed,
  Stopped,
}
