use crate::dynamics::glide::{derivatives, Degeneracy};
use crate::dynamics::state::{Deflections, PhysicalConstants, State};
use crate::physics::aerodynamics::AeroModel;
use crate::vehicle::{Airframe, ThrustSample};

// ---------------------------------------------------------------------------
// RK4 with commands and thrust held over the step
// ---------------------------------------------------------------------------

/// Single RK4 step.
///
/// `cmd` and `thrust` were sampled at the start of the step and stay fixed
/// for all four evaluations. Every evaluation sees the step's start time;
/// only the state is displaced. The aerodynamic tables re-resolve inside
/// each evaluation.
pub fn rk4_step(
    state: &State,
    airframe: &Airframe,
    aero: &mut AeroModel,
    cmd: &Deflections,
    thrust: &ThrustSample,
    constants: &PhysicalConstants,
    dt: f64,
) -> Result<State, Degeneracy> {
    let mut f = |s: &State| derivatives(s, airframe, aero, cmd, thrust, constants);

    let k1 = f(state)?;
    let k2 = f(&state.displaced(&k1, dt * 0.5))?;
    let k3 = f(&state.displaced(&k2, dt * 0.5))?;
    let k4 = f(&state.displaced(&k3, dt))?;

    Ok(State {
        time: state.time + dt,
        x: state.x + (k1 + 2.0 * k2 + 2.0 * k3 + k4) * (dt / 6.0),
    })
}
