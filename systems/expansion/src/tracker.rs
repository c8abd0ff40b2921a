use garden_planner_core::{Event, ExpansionPlan, ExpansionStep};

/// Holds the most recent expansion plan until the unlocked set changes.
///
/// Plan gains depend on the exact unlocked set they were computed from, so
/// any unlock or lock observed through [`PlanTracker::handle`] discards the
/// plan. Placement events leave it untouched.
#[derive(Debug, Default)]
pub struct PlanTracker {
    plan: Option<ExpansionPlan>,
}

impl PlanTracker {
    /// Creates a tracker without a plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a freshly computed plan, replacing any previous one.
    pub fn replace(&mut self, plan: ExpansionPlan) {
        self.plan = Some(plan);
    }

    /// Discards the current plan on explicit user request.
    pub fn clear(&mut self) {
        self.plan = None;
    }

    /// Current plan, if one is still valid.
    #[must_use]
    pub fn plan(&self) -> Option<&ExpansionPlan> {
        self.plan.as_ref()
    }

    /// Next recommended unlock of the current plan.
    #[must_use]
    pub fn next_step(&self) -> Option<&ExpansionStep> {
        self.plan.as_ref().and_then(ExpansionPlan::next_step)
    }

    /// Consumes world events, discarding the plan once it became stale.
    ///
    /// Returns `true` when a plan was discarded by this call.
    pub fn handle(&mut self, events: &[Event]) -> bool {
        if self.plan.is_none() {
            return false;
        }

        if events.iter().any(Event::changes_unlocked_cells) {
            log::debug!("unlocked cells changed, discarding expansion plan");
            self.plan = None;
            return true;
        }

        false
    }
}
