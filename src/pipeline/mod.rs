use crate::error::*;
use crate::stage::*;
use log::*;

/// CPU budget for planning.
pub struct CpuBudget {
    /// Function that returns true if the planner should continue working.
    should_continue: Box<dyn Fn() -> bool>,
}

impl CpuBudget {
    pub fn new<F: Fn() -> bool + 'static>(should_continue: F) -> Self {
        CpuBudget {
            should_continue: Box::new(should_continue),
        }
    }

    /// Returns true if there is budget remaining to continue work.
    pub fn has_budget(&self) -> bool {
        (self.should_continue)()
    }

    /// Unlimited budget (for offline/bench use).
    pub fn unlimited() -> Self {
        CpuBudget {
            should_continue: Box::new(|| true),
        }
    }
}

impl Default for CpuBudget {
    fn default() -> Self {
        CpuBudget::unlimited()
    }
}

/// Run every applicable stage in order, polling the budget before each.
pub fn run_stages(
    stages: &[Box<dyn RoutingStage>],
    state: &mut RoutingState,
    ctx: &RoutingContext,
) -> Result<()> {
    for stage in stages {
        ctx.check_budget(stage.name())?;

        if !stage.is_applicable(state) {
            trace!("skipping stage {}", stage.name());
            continue;
        }

        debug!("running stage {}", stage.name());
        stage.run(state, ctx)?;
    }

    Ok(())
}
