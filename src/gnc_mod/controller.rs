use crate::dynamics::state::{Deflections, State};

/// Trait for flight control laws.
///
/// The runner calls [`check_controls`](Controller::check_controls) once per
/// integration step, before the RK4 stages, and holds
/// [`deflections`](Controller::deflections) constant over the whole step.
pub trait Controller {
    /// Sample the control law at the start of a step.
    fn check_controls(&mut self, state: &State);

    /// Current actuator command.
    fn deflections(&self) -> Deflections;

    /// Prepare for a run starting at `state` (clock and difference memory).
    fn reset(&mut self, _state: &State) {}

    /// Human-readable name for logging/display.
    fn name(&self) -> &str {
        "unnamed"
    }
}
