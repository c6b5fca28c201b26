use log::{info, warn};

use super::event::{default_detectors, detect_events, EventDetector, EventKind, SimEvent};
use super::integrator::rk4_step;
use crate::dynamics::glide::check_state;
use crate::dynamics::state::{SimConfig, State};
use crate::error::SimError;
use crate::gnc::Controller;
use crate::table::ExtrapolationWarning;
use crate::vehicle::Scenario;

// ---------------------------------------------------------------------------
// Simulation output
// ---------------------------------------------------------------------------

/// Committed states (initial state first, one per step), flight events in
/// time order and the tables that left their domain.
#[derive(Debug, Clone, Default)]
pub struct Trajectory {
    pub states: Vec<State>,
    pub events: Vec<SimEvent>,
    pub extrapolations: Vec<ExtrapolationWarning>,
}

impl Trajectory {
    pub fn initial(&self) -> Option<&State> {
        self.states.first()
    }

    pub fn last(&self) -> Option<&State> {
        self.states.last()
    }

    pub fn first_event(&self, kind: &EventKind) -> Option<&SimEvent> {
        self.events.iter().find(|e| &e.kind == kind)
    }

    /// Run extra detectors over the committed states and merge what they
    /// find into `events`, keeping time order.
    pub fn detect(&mut self, detectors: &mut [Box<dyn EventDetector>]) {
        self.events.extend(detect_events(&self.states, detectors));
        self.events.sort_by(|a, b| a.time.total_cmp(&b.time));
    }
}

fn check_config(config: &SimConfig) -> Result<(), SimError> {
    if !(config.dt.is_finite() && config.dt > 0.0) {
        return Err(SimError::InvalidConfig(format!(
            "step must be positive, got {}",
            config.dt
        )));
    }
    if !(config.max_time.is_finite() && config.max_time > 0.0) {
        return Err(SimError::InvalidConfig(format!(
            "horizon must be positive, got {}",
            config.max_time
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Fixed-step flight simulation
// ---------------------------------------------------------------------------

/// Simulate a scenario with a custom controller.
///
/// Each step:
///   1. The controller samples the current state
///   2. Deflections and propulsion output are frozen for the step
///   3. One RK4 step is taken and the new state is checked
///   4. Propulsion consumes fuel or charge for the step
///
/// Tables and propulsion are cloned from the scenario, so the scenario can
/// be run again and gives the same result.
pub fn simulate_with(
    scenario: &Scenario,
    config: &SimConfig,
    controller: &mut dyn Controller,
) -> Result<Trajectory, SimError> {
    check_config(config)?;
    scenario
        .airframe
        .validate()
        .map_err(SimError::InvalidConfig)?;

    let mut aero = scenario.aero.clone();
    let mut propulsion = scenario.propulsion.clone();
    let constants = &config.constants;
    let dt = config.dt;

    let mut state = scenario.initial_state();
    controller.reset(&state);

    info!(
        "simulating '{}' with {} ({}, {}): dt = {} s, horizon = {} s",
        scenario.name,
        controller.name(),
        propulsion.kind(),
        scenario.airframe.name,
        dt,
        config.max_time
    );

    let capacity = (config.max_time / dt) as usize + 2;
    let mut states = Vec::with_capacity(capacity.min(1_000_000));
    let mut events = Vec::new();
    states.push(state.clone());

    let mut step = 0;
    while state.time < config.max_time {
        controller.check_controls(&state);
        let cmd = controller.deflections();
        let thrust = propulsion.sample(state.time, dt);

        let next = rk4_step(
            &state,
            &scenario.airframe,
            &mut aero,
            &cmd,
            &thrust,
            constants,
            dt,
        )
        .and_then(|next| check_state(&next).map(|()| next))
        .map_err(|reason| SimError::DegenerateState {
            step,
            time: state.time,
            reason,
        })?;

        let was_active = propulsion.is_active();
        propulsion.advance(state.time, dt);
        if was_active && !propulsion.is_active() {
            events.push(SimEvent::new(EventKind::PropulsionCutoff, &next));
        }

        state = next;
        states.push(state.clone());
        step += 1;
    }

    events.extend(detect_events(&states, &mut default_detectors()));
    events.sort_by(|a, b| a.time.total_cmp(&b.time));

    let mut extrapolations = aero.extrapolation_report();
    extrapolations.extend(propulsion.extrapolation_warning());
    for w in &extrapolations {
        warn!("{w}");
    }

    info!(
        "'{}' finished: {} steps, t = {:.3} s, altitude {:.1} m",
        scenario.name,
        step,
        state.time,
        state.altitude()
    );

    Ok(Trajectory {
        states,
        events,
        extrapolations,
    })
}

/// Simulate with the scenario's own flight control system.
pub fn simulate(scenario: &Scenario, config: &SimConfig) -> Result<Trajectory, SimError> {
    let mut controls = scenario.controls.clone();
    simulate_with(scenario, config, &mut controls)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::glide::Degeneracy;
    use crate::dynamics::state::Deflections;
    use crate::vehicle::presets;

    fn short(max_time: f64) -> SimConfig {
        SimConfig {
            max_time,
            ..SimConfig::default()
        }
    }

    #[test]
    fn records_initial_state_plus_one_per_step() {
        let s = presets::gliding_descent().unwrap();
        let traj = simulate(&s, &short(1.0)).unwrap();
        assert!((500..=502).contains(&traj.states.len()), "{}", traj.states.len());
        assert_eq!(traj.initial().unwrap(), &s.initial_state());
        for pair in traj.states.windows(2) {
            assert!(pair[1].time > pair[0].time);
        }
    }

    #[test]
    fn rejects_non_positive_step() {
        let s = presets::gliding_descent().unwrap();
        let config = SimConfig { dt: 0.0, ..SimConfig::default() };
        assert!(matches!(simulate(&s, &config), Err(SimError::InvalidConfig(_))));
        let config = SimConfig { max_time: -1.0, ..SimConfig::default() };
        assert!(matches!(simulate(&s, &config), Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn zero_speed_halts_at_first_step() {
        let mut s = presets::gliding_descent().unwrap();
        s.initial.velocity = 0.0;
        match simulate(&s, &short(1.0)) {
            Err(SimError::DegenerateState { step, time, reason }) => {
                assert_eq!(step, 0);
                assert_eq!(time, 0.0);
                assert_eq!(reason, Degeneracy::NonPositiveVelocity(0.0));
            }
            other => panic!("expected degenerate state, got {other:?}"),
        }
    }

    // Thrown straight up at walking pace: the glider stalls within a second.
    fn vertical_toss(velocity: f64) -> Scenario {
        let mut s = presets::gliding_descent().unwrap();
        s.initial.velocity = velocity;
        s.initial.path_angle = 90f64.to_radians();
        s.initial.altitude = 0.0;
        s
    }

    #[test]
    fn last_step_into_stall_is_an_error() {
        let s = vertical_toss(5.0);
        let mut failures = 0;
        for k in 0..200 {
            let dt = 0.40 + f64::from(k) * 0.001;
            let config = SimConfig { dt, max_time: dt / 2.0, ..SimConfig::default() };
            match simulate(&s, &config) {
                Ok(traj) => {
                    assert_eq!(traj.states.len(), 2);
                    let v = traj.last().unwrap().velocity();
                    assert!(v > 0.0, "dt = {dt}: committed speed {v}");
                }
                Err(SimError::DegenerateState { step, time, .. }) => {
                    assert_eq!(step, 0);
                    assert_eq!(time, 0.0);
                    failures += 1;
                }
                Err(e) => panic!("dt = {dt}: {e}"),
            }
        }
        assert!(failures > 0);
    }

    #[test]
    fn stall_is_reported_at_the_step_that_caused_it() {
        let s = vertical_toss(10.0);
        for k in 0..26 {
            let dt = 0.05 + f64::from(k) * 0.01;
            let config = SimConfig { dt, max_time: 5.0, ..SimConfig::default() };
            let Err(SimError::DegenerateState { step, time, .. }) = simulate(&s, &config) else {
                panic!("dt = {dt}: vertical toss did not stall");
            };
            assert!(step > 0, "dt = {dt}");

            // Everything up to the failing step is a valid flight.
            let before = SimConfig { max_time: time - dt / 2.0, ..config };
            let traj = simulate(&s, &before).unwrap();
            assert_eq!(traj.states.len(), step + 1, "dt = {dt}");
            assert!(traj.states.iter().all(|st| st.velocity() > 0.0), "dt = {dt}");
        }
    }

    #[test]
    fn extra_detectors_merge_in_time_order() {
        use crate::dynamics::state::{idx, StateVector};
        use crate::sim::event::AltitudeDetector;

        // Up to 1000 m and back down, one state per second.
        let states: Vec<State> = (0..11)
            .map(|i| {
                let mut x = StateVector::zeros();
                x[idx::VELOCITY] = 50.0;
                x[idx::ALTITUDE] = 1000.0 - 40.0 * (f64::from(i) - 5.0).powi(2);
                State::new(f64::from(i), x)
            })
            .collect();
        let cutoff = SimEvent::new(EventKind::PropulsionCutoff, &states[2]);
        let mut traj = Trajectory { states, events: vec![cutoff], ..Trajectory::default() };

        let mut extra: Vec<Box<dyn EventDetector>> = vec![
            Box::new(AltitudeDetector::new(900.0, true)),
            Box::new(AltitudeDetector::new(900.0, false)),
        ];
        traj.detect(&mut extra);

        let times: Vec<f64> = traj.events.iter().map(|e| e.time).collect();
        assert_eq!(times, vec![2.0, 4.0, 7.0]);
        assert_eq!(
            traj.events[2].kind,
            EventKind::AltitudeCrossing { altitude: 900.0, ascending: false }
        );
    }

    #[test]
    fn runs_are_independent() {
        let s = presets::pitch_hold_glide().unwrap();
        let a = simulate(&s, &short(2.0)).unwrap();
        let b = simulate(&s, &short(2.0)).unwrap();
        assert_eq!(a.last(), b.last());
        assert_eq!(a.states.len(), b.states.len());
    }

    // Holds a fixed elevator and counts how often it was consulted.
    struct Fixed {
        elevator: f64,
        checks: usize,
    }

    impl Controller for Fixed {
        fn check_controls(&mut self, _state: &State) {
            self.checks += 1;
        }

        fn deflections(&self) -> Deflections {
            Deflections { elevator: self.elevator, aileron: 0.0 }
        }
    }

    #[test]
    fn controller_is_sampled_once_per_step() {
        let s = presets::gliding_descent().unwrap();
        let mut c = Fixed { elevator: 0.0, checks: 0 };
        let traj = simulate_with(&s, &short(0.5), &mut c).unwrap();
        assert_eq!(c.checks, traj.states.len() - 1);
    }

    #[test]
    fn elevator_changes_the_flight_path() {
        let s = presets::gliding_descent().unwrap();
        let neutral = simulate_with(&s, &short(2.0), &mut Fixed { elevator: 0.0, checks: 0 })
            .unwrap();
        let nose_down = simulate_with(&s, &short(2.0), &mut Fixed { elevator: 10.0, checks: 0 })
            .unwrap();
        let alpha = |t: &Trajectory| t.last().unwrap().alpha();
        assert!(alpha(&nose_down) < alpha(&neutral));
    }
}
