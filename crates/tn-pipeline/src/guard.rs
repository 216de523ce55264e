//! Stage wall-clock budgets and cooperative cancellation.
//!
//! The pipeline is cancellable *between* stages, never inside a noding
//! pass; budgets are likewise enforced at stage boundaries.  A stage that
//! overruns marks the workspace non-viable — callers may inspect or
//! destroy it, but not resume.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tn_workspace::{Stage, Workspace, WorkspaceError, WorkspaceResult};

/// Shared cancellation flag.  Clone freely; any holder may cancel.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Times one stage against its budget.
pub(crate) struct StageGuard {
    stage:   Stage,
    started: Instant,
    budget:  Duration,
}

impl StageGuard {
    pub fn begin(stage: Stage, budget_s: u64) -> Self {
        log::info!("stage `{stage}` starting");
        Self {
            stage,
            started: Instant::now(),
            budget: Duration::from_secs(budget_s),
        }
    }

    /// Close the stage: enforce the budget, then the cancellation flag.
    ///
    /// Returns elapsed seconds for the counters.
    pub fn finish(self, ws: &mut Workspace, cancel: &CancelToken) -> WorkspaceResult<f64> {
        let elapsed = self.started.elapsed();
        if elapsed > self.budget {
            ws.mark_non_viable();
            return Err(WorkspaceError::StageTimeout {
                stage:    self.stage,
                budget_s: self.budget.as_secs(),
            });
        }
        if cancel.is_cancelled() {
            return Err(WorkspaceError::Cancelled(self.stage));
        }
        let secs = elapsed.as_secs_f64();
        log::info!("stage `{}` finished in {:.3} s", self.stage, secs);
        Ok(secs)
    }
}
