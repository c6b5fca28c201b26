use thiserror::Error;

use crate::dynamics::state::{idx, Deflections, PhysicalConstants, State, StateVector};
use crate::physics::aerodynamics::{dynamic_pressure, AeroModel};
use crate::vehicle::{Airframe, ThrustSample};

/// Why the derivative is undefined at a state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Degeneracy {
    #[error("velocity {0} m/s is not positive")]
    NonPositiveVelocity(f64),
    #[error("mass {0} kg is not positive")]
    NonPositiveMass(f64),
    #[error("state component {index} is not finite")]
    NonFiniteState { index: usize },
    #[error("derivative component {index} is not finite")]
    NonFiniteDerivative { index: usize },
}

/// A state the equations of motion are defined at: all components finite,
/// positive speed and mass.
pub fn check_state(state: &State) -> Result<(), Degeneracy> {
    if let Some(index) = state.x.iter().position(|v| !v.is_finite()) {
        return Err(Degeneracy::NonFiniteState { index });
    }
    let v = state.velocity();
    if v <= 0.0 {
        return Err(Degeneracy::NonPositiveVelocity(v));
    }
    let mass = state.mass();
    if mass <= 0.0 {
        return Err(Degeneracy::NonPositiveMass(mass));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Longitudinal + lateral equations of motion
// ---------------------------------------------------------------------------

/// Compute the state derivative.
///
/// Resolves the aerodynamic tables at this (possibly displaced) state, then
/// evaluates:
///   1. Aerodynamic lift/drag along the flight path, scaled by `Q*S/m`
///   2. Gravity projected on the flight path
///   3. Pitch and roll moments, scaled by `Q*S*b`
///   4. Thrust split into axial and normal parts by angle of attack
///   5. Kinematics of position and attitude angles
///
/// `cmd` and `thrust` are sampled once per step by the caller.
pub fn derivatives(
    state: &State,
    airframe: &Airframe,
    aero: &mut AeroModel,
    cmd: &Deflections,
    thrust: &ThrustSample,
    constants: &PhysicalConstants,
) -> Result<StateVector, Degeneracy> {
    check_state(state)?;
    let v = state.velocity();
    let mass = state.mass();

    let theta = state.path_angle();
    let psi = state.heading();
    let alpha = state.alpha();
    let gamma = state.bank();
    let altitude = state.altitude();
    let alpha_deg = alpha * constants.deg_per_rad;

    // --- Flight condition ---
    let atm = &constants.atmosphere;
    let mach = atm.mach(v, altitude);
    let qs = dynamic_pressure(atm.density(altitude), v) * airframe.wing_area;
    let qsb = qs * airframe.chord;

    // --- Coefficients ---
    aero.resolve(mach, alpha_deg, cmd);
    let c = aero.coefficients(mach, alpha_deg, cmd);

    // --- Accelerations along and normal to the path ---
    let (sin_a, cos_a) = alpha.sin_cos();
    let normal = c.lift * qs / mass + thrust.force * sin_a / mass;
    let axial = c.drag * qs / mass;
    let propulsive = thrust.force * cos_a / mass;

    let (sin_th, cos_th) = theta.sin_cos();
    let (sin_psi, cos_psi) = psi.sin_cos();
    let (sin_g, cos_g) = gamma.sin_cos();
    let g = constants.g0;

    let mut d = StateVector::zeros();
    d[idx::VELOCITY] = -axial - g * sin_th + propulsive;
    d[idx::PATH_ANGLE] = (normal * cos_g - g * cos_th) / v;
    d[idx::HEADING] = normal * sin_g / v;
    d[idx::PITCH_RATE] = c.total_pitch() * qsb / airframe.jz;
    d[idx::ROLL_RATE] = c.roll_control * qsb / airframe.jx;
    d[idx::DOWNRANGE] = v * cos_th * cos_psi;
    d[idx::ALTITUDE] = v * sin_th;
    d[idx::CROSSRANGE] = v * cos_th * sin_psi;
    d[idx::ALPHA] = state.pitch_rate();
    d[idx::BANK] = state.roll_rate();
    d[idx::MASS] = -thrust.mass_flow;

    match d.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(Degeneracy::NonFiniteDerivative { index }),
        None => Ok(d),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Table1D, Table2D};
    use approx::assert_relative_eq;

    // Constant coefficients: lift 0.5, drag 0.05, no moments.
    fn constant_aero() -> AeroModel {
        let mach = vec![0.0, 2.0];
        let alpha = vec![-90.0, 90.0];
        let grid = |v: f64| vec![vec![v, v], vec![v, v]];
        let defl = vec![-30.0, 30.0];
        AeroModel::new(
            Table2D::new(mach.clone(), alpha.clone(), grid(0.5), (0.0, 0.0)).unwrap(),
            Table2D::new(mach.clone(), alpha.clone(), grid(0.05), (0.0, 0.0)).unwrap(),
            Table2D::new(mach, alpha, grid(0.0), (0.0, 0.0)).unwrap(),
            Table1D::new(defl.clone(), vec![0.0, 0.0], 0.0).unwrap(),
            Table1D::new(defl, vec![-0.1, 0.1], 0.0).unwrap(),
        )
    }

    fn airframe() -> Airframe {
        Airframe {
            name: "Test".into(),
            mass: 2.0,
            wing_area: 0.1,
            chord: 0.1,
            jx: 0.4,
            jz: 0.25,
        }
    }

    fn level_state(v: f64) -> State {
        let mut x = StateVector::zeros();
        x[idx::VELOCITY] = v;
        x[idx::ALTITUDE] = 0.0;
        x[idx::MASS] = 2.0;
        State::new(0.0, x)
    }

    #[test]
    fn kinematics_of_level_flight() {
        let constants = PhysicalConstants::default();
        let d = derivatives(
            &level_state(50.0),
            &airframe(),
            &mut constant_aero(),
            &Deflections::default(),
            &ThrustSample::default(),
            &constants,
        )
        .unwrap();
        let qs = 0.5 * 1.2 * 50.0 * 50.0 * 0.1;
        assert_relative_eq!(d[idx::DOWNRANGE], 50.0);
        assert_relative_eq!(d[idx::ALTITUDE], 0.0);
        assert_relative_eq!(d[idx::VELOCITY], -0.05 * qs / 2.0, epsilon = 1e-12);
        assert_relative_eq!(
            d[idx::PATH_ANGLE],
            (0.5 * qs / 2.0 - constants.g0) / 50.0,
            epsilon = 1e-12
        );
        assert_eq!(d[idx::MASS], 0.0);
    }

    #[test]
    fn thrust_adds_axial_acceleration_and_burns_mass() {
        let constants = PhysicalConstants::default();
        let base = derivatives(
            &level_state(50.0),
            &airframe(),
            &mut constant_aero(),
            &Deflections::default(),
            &ThrustSample::default(),
            &constants,
        )
        .unwrap();
        let powered = derivatives(
            &level_state(50.0),
            &airframe(),
            &mut constant_aero(),
            &Deflections::default(),
            &ThrustSample { mass_flow: 0.1, force: 40.0 },
            &constants,
        )
        .unwrap();
        // alpha = 0: all thrust is axial
        assert_relative_eq!(powered[idx::VELOCITY] - base[idx::VELOCITY], 20.0, epsilon = 1e-9);
        assert_relative_eq!(powered[idx::PATH_ANGLE], base[idx::PATH_ANGLE], epsilon = 1e-12);
        assert_relative_eq!(powered[idx::MASS], -0.1);
    }

    #[test]
    fn aileron_produces_roll_acceleration() {
        let constants = PhysicalConstants::default();
        let cmd = Deflections { elevator: 0.0, aileron: 15.0 };
        let d = derivatives(
            &level_state(50.0),
            &airframe(),
            &mut constant_aero(),
            &cmd,
            &ThrustSample::default(),
            &constants,
        )
        .unwrap();
        let qsb = 0.5 * 1.2 * 50.0 * 50.0 * 0.1 * 0.1;
        assert_relative_eq!(d[idx::ROLL_RATE], 0.05 * qsb / 0.4, epsilon = 1e-12);
    }

    #[test]
    fn zero_velocity_is_degenerate() {
        let err = derivatives(
            &level_state(0.0),
            &airframe(),
            &mut constant_aero(),
            &Deflections::default(),
            &ThrustSample::default(),
            &PhysicalConstants::default(),
        )
        .unwrap_err();
        assert_eq!(err, Degeneracy::NonPositiveVelocity(0.0));
    }

    #[test]
    fn nan_state_is_degenerate() {
        let mut s = level_state(50.0);
        s.x[idx::ALPHA] = f64::NAN;
        let err = derivatives(
            &s,
            &airframe(),
            &mut constant_aero(),
            &Deflections::default(),
            &ThrustSample::default(),
            &PhysicalConstants::default(),
        )
        .unwrap_err();
        assert_eq!(err, Degeneracy::NonFiniteState { index: idx::ALPHA });
    }

    #[test]
    fn state_check_covers_mass_and_speed() {
        assert_eq!(check_state(&level_state(50.0)), Ok(()));
        assert_eq!(
            check_state(&level_state(-0.5)),
            Err(Degeneracy::NonPositiveVelocity(-0.5))
        );
        let mut s = level_state(50.0);
        s.x[idx::MASS] = 0.0;
        assert_eq!(check_state(&s), Err(Degeneracy::NonPositiveMass(0.0)));
    }
}
