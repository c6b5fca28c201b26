use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::dynamics::state::{idx, State, N_STATE};

/// Quantity a channel regulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Flight-path angle, commands the elevator.
    Pitch,
    /// Bank angle, commands the ailerons.
    Roll,
}

impl Axis {
    pub fn component(self) -> usize {
        match self {
            Axis::Pitch => idx::PATH_ANGLE,
            Axis::Roll => idx::BANK,
        }
    }

    /// State component differenced for the derivative term by default.
    pub fn default_rate_source(self) -> DerivativeSource {
        match self {
            Axis::Pitch => DerivativeSource::Component(idx::ALPHA),
            Axis::Roll => DerivativeSource::Component(idx::BANK),
        }
    }
}

/// What the derivative term differentiates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivativeSource {
    /// The regulated quantity itself.
    Measured,
    /// Another state component, e.g. the angle whose rate is measured
    /// directly.
    Component(usize),
}

/// Integrator behaviour while the actuator sits on a travel limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AntiWindup {
    /// Accumulate regardless of saturation.
    None,
    /// Freeze the integral while the output is clamped and the error keeps
    /// pushing into the limit.
    #[default]
    Conditional,
}

// ---------------------------------------------------------------------------
// Sampled PID channel with slew-rate and travel limits
// ---------------------------------------------------------------------------

/// One control axis.
///
/// Inactive channels hold their deflection (which can be set as a trim
/// bias). Active channels sample at most once per `sparsity` seconds and
/// hold the output in between.
#[derive(Debug, Clone)]
pub struct ControlChannel {
    axis: Axis,
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    min_deflection: f64, // deg
    max_deflection: f64, // deg
    slew_rate: f64,      // deg/s
    sparsity: f64,       // s
    target: f64,
    derivative: DerivativeSource,
    anti_windup: AntiWindup,

    integral: f64,
    last_time: f64,
    last_measured: f64,
    last_rate_source: f64,
    deflection: f64,
    active: bool,
    saturated: bool,
}

// Sample times come from an accumulated clock; without slack a channel with
// sparsity == dt would skip every other step.
const SAMPLE_SLACK: f64 = 1e-9;

impl ControlChannel {
    pub fn new(axis: Axis) -> Self {
        Self {
            axis,
            kp: 0.0,
            ki: 0.0,
            kd: 0.0,
            min_deflection: -25.0,
            max_deflection: 25.0,
            slew_rate: f64::INFINITY,
            sparsity: 0.0,
            target: 0.0,
            derivative: axis.default_rate_source(),
            anti_windup: AntiWindup::default(),
            integral: 0.0,
            last_time: 0.0,
            last_measured: 0.0,
            last_rate_source: 0.0,
            deflection: 0.0,
            active: false,
            saturated: false,
        }
    }

    pub fn gains(mut self, kp: f64, ki: f64, kd: f64) -> Self {
        self.kp = kp;
        self.ki = ki;
        self.kd = kd;
        self
    }

    /// Actuator travel limits in degrees. Swapped if given reversed.
    pub fn limits(mut self, min: f64, max: f64) -> Self {
        self.min_deflection = min.min(max);
        self.max_deflection = max.max(min);
        self
    }

    /// Maximum deflection rate in degrees per second.
    pub fn slew_rate(mut self, rate: f64) -> Self {
        self.slew_rate = rate.abs();
        self
    }

    /// Minimum interval between samples in seconds.
    pub fn sparsity(mut self, interval: f64) -> Self {
        self.sparsity = interval.max(0.0);
        self
    }

    pub fn target(mut self, target: f64) -> Self {
        self.set_target(target);
        self
    }

    /// Source of the derivative term. A component index outside the state
    /// falls back to the regulated quantity.
    pub fn derivative(mut self, source: DerivativeSource) -> Self {
        self.derivative = match source {
            DerivativeSource::Component(i) if i >= N_STATE => {
                warn!(
                    "{:?} channel: no state component {i}, using the measured value",
                    self.axis
                );
                DerivativeSource::Measured
            }
            other => other,
        };
        self
    }

    pub fn derivative_source(&self) -> DerivativeSource {
        self.derivative
    }

    pub fn anti_windup(mut self, policy: AntiWindup) -> Self {
        self.anti_windup = policy;
        self
    }

    pub fn enabled(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// New set point; clears the integral.
    pub fn set_target(&mut self, target: f64) {
        self.target = target;
        self.integral = 0.0;
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Overwrite the current deflection, e.g. to trim an open-loop run.
    pub fn set_bias(&mut self, deflection: f64) {
        self.deflection = deflection;
    }

    /// Seed the sample clock and finite-difference memory from `state`.
    pub fn prime(&mut self, state: &State) {
        self.last_time = state.time;
        self.last_measured = state.x[self.axis.component()];
        self.last_rate_source = self.rate_source(state);
    }

    /// Run one control sample if the channel is active and due.
    /// Returns whether a sample was taken.
    pub fn check(&mut self, state: &State) -> bool {
        if !self.active {
            return false;
        }
        let elapsed = state.time - self.last_time;
        if elapsed <= 0.0 || elapsed + SAMPLE_SLACK < self.sparsity {
            return false;
        }
        self.last_time = state.time;

        let measured = state.x[self.axis.component()];
        let error = measured - self.target;
        let rate_source = self.rate_source(state);
        let derivative = (rate_source - self.last_rate_source) / elapsed;
        self.last_measured = measured;
        self.last_rate_source = rate_source;

        let increment = error * self.ki * elapsed;
        let integral = self.integral + increment;
        let command = error * self.kp + derivative * self.kd + integral;

        let max_change = self.slew_rate * elapsed;
        let change = (command - self.deflection).max(-max_change).min(max_change);
        let deflection = (self.deflection + change)
            .max(self.min_deflection)
            .min(self.max_deflection);

        let pinned_high = deflection >= self.max_deflection && command > self.max_deflection;
        let pinned_low = deflection <= self.min_deflection && command < self.min_deflection;
        let winding = (pinned_high && increment > 0.0) || (pinned_low && increment < 0.0);
        self.integral = match self.anti_windup {
            AntiWindup::Conditional if winding => self.integral,
            _ => integral,
        };

        let saturated = pinned_high || pinned_low;
        if saturated && !self.saturated {
            debug!(
                "{:?} channel saturated at {:.2} deg (t = {:.3} s)",
                self.axis, deflection, state.time
            );
        }
        self.saturated = saturated;
        self.deflection = deflection;
        true
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn deflection(&self) -> f64 {
        self.deflection
    }

    pub fn integral(&self) -> f64 {
        self.integral
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_saturated(&self) -> bool {
        self.saturated
    }

    pub fn last_sample_time(&self) -> f64 {
        self.last_time
    }

    pub fn last_measured(&self) -> f64 {
        self.last_measured
    }

    fn rate_source(&self, state: &State) -> f64 {
        match self.derivative {
            DerivativeSource::Measured => state.x[self.axis.component()],
            DerivativeSource::Component(i) => state.x[i],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::state::StateVector;
    use approx::assert_relative_eq;

    fn state(time: f64, theta: f64) -> State {
        let mut x = StateVector::zeros();
        x[idx::VELOCITY] = 100.0;
        x[idx::PATH_ANGLE] = theta;
        State::new(time, x)
    }

    fn pitch(kp: f64, ki: f64) -> ControlChannel {
        ControlChannel::new(Axis::Pitch)
            .gains(kp, ki, 0.0)
            .limits(-20.0, 20.0)
            .sparsity(0.01)
            .enabled(true)
    }

    #[test]
    fn proportional_response() {
        let mut ch = pitch(10.0, 0.0);
        ch.prime(&state(0.0, 0.0));
        assert!(ch.check(&state(0.01, 0.1)));
        assert_relative_eq!(ch.deflection(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn slew_rate_limits_change() {
        let mut ch = pitch(10.0, 0.0).slew_rate(5.0);
        ch.prime(&state(0.0, 0.0));
        ch.check(&state(0.1, 0.5));
        assert_relative_eq!(ch.deflection(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn travel_limit_clamps_output() {
        let mut ch = pitch(1000.0, 0.0);
        ch.prime(&state(0.0, 0.0));
        ch.check(&state(0.01, 0.5));
        assert_eq!(ch.deflection(), 20.0);
        assert!(ch.is_saturated());
        ch.check(&state(0.02, -0.5));
        assert_eq!(ch.deflection(), -20.0);
    }

    #[test]
    fn holds_output_between_samples() {
        let mut ch = pitch(10.0, 1.0);
        ch.prime(&state(0.0, 0.0));
        assert!(ch.check(&state(0.01, 0.1)));
        let held = ch.deflection();
        assert!(!ch.check(&state(0.015, 0.9)));
        assert_eq!(ch.deflection(), held);
        assert_eq!(ch.last_sample_time(), 0.01);
    }

    #[test]
    fn inactive_channel_keeps_bias() {
        let mut ch = ControlChannel::new(Axis::Pitch).gains(10.0, 0.0, 0.0);
        ch.set_bias(-3.0);
        assert!(!ch.check(&state(1.0, 0.5)));
        assert_eq!(ch.deflection(), -3.0);
    }

    #[test]
    fn integral_accumulates_when_unsaturated() {
        let mut ch = pitch(0.0, 2.0);
        ch.prime(&state(0.0, 0.0));
        ch.check(&state(0.5, 1.0));
        ch.check(&state(1.0, 1.0));
        assert_relative_eq!(ch.integral(), 2.0, epsilon = 1e-12);
        assert_relative_eq!(ch.deflection(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn conditional_integration_freezes_when_saturated() {
        let mut ch = pitch(100.0, 5.0);
        ch.prime(&state(0.0, 0.0));
        for k in 1..=100 {
            ch.check(&state(f64::from(k) * 0.01, 1.0));
        }
        assert_eq!(ch.deflection(), 20.0);
        assert_relative_eq!(ch.integral(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn unclamped_integration_winds_up() {
        let mut ch = pitch(100.0, 5.0).anti_windup(AntiWindup::None);
        ch.prime(&state(0.0, 0.0));
        for k in 1..=100 {
            ch.check(&state(f64::from(k) * 0.01, 1.0));
        }
        assert_eq!(ch.deflection(), 20.0);
        assert_relative_eq!(ch.integral(), 5.0, epsilon = 1e-9);
    }

    #[test]
    fn derivative_uses_rate_component() {
        let mut ch = ControlChannel::new(Axis::Pitch)
            .gains(0.0, 0.0, 2.0)
            .sparsity(0.1)
            .enabled(true);
        let s0 = state(0.0, 0.0);
        ch.prime(&s0);
        let mut s1 = state(0.1, 0.3);
        s1.x[idx::ALPHA] = 0.05;
        ch.check(&s1);
        // d(alpha)/dt = 0.5 rad/s, theta change ignored
        assert_relative_eq!(ch.deflection(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn set_target_clears_integral() {
        let mut ch = pitch(0.0, 1.0);
        ch.prime(&state(0.0, 0.0));
        ch.check(&state(1.0, 1.0));
        assert!(ch.integral() > 0.0);
        ch.set_target(1.0);
        assert_eq!(ch.integral(), 0.0);
    }

    #[test]
    fn out_of_range_rate_component_falls_back_to_measured() {
        let mut ch = ControlChannel::new(Axis::Pitch)
            .gains(0.0, 0.0, 1.0)
            .sparsity(0.1)
            .derivative(DerivativeSource::Component(N_STATE))
            .enabled(true);
        assert_eq!(ch.derivative_source(), DerivativeSource::Measured);

        ch.prime(&state(0.0, 0.0));
        assert!(ch.check(&state(0.1, 0.02)));
        // d(theta)/dt = 0.2 rad/s
        assert_relative_eq!(ch.deflection(), 0.2, epsilon = 1e-12);

        let kept = ControlChannel::new(Axis::Roll)
            .derivative(DerivativeSource::Component(idx::ROLL_RATE));
        assert_eq!(kept.derivative_source(), DerivativeSource::Component(idx::ROLL_RATE));
    }
}
