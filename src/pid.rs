// FarmWatch — PID Controller
//
// Setpoint tracking on soil moisture. The integral accumulator carries the Ki
// factor already (accumulator += Ki * e * dt) and is clamped to a symmetric
// band so a long dry spell cannot wind it up.

use crate::config::PidGains;

/// Per-cycle breakdown of the controller output.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PidTerms {
    pub proportional: f32,
    pub integral: f32,
    pub derivative: f32,
    pub output: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct PidController {
    gains: PidGains,
    integral_limit: f32,
    integral: f32,
    previous_error: f32,
    last: PidTerms,
}

impl PidController {
    pub fn new(gains: PidGains, integral_limit: f32) -> Self {
        Self {
            gains,
            integral_limit: integral_limit.abs(),
            integral: 0.0,
            previous_error: 0.0,
            last: PidTerms::default(),
        }
    }

    /// Run one control step for `error = setpoint - measurement` over `dt`
    /// seconds. `previous_error` is updated whether or not the output is
    /// acted upon.
    pub fn update(&mut self, error: f32, dt: f32) -> PidTerms {
        let proportional = self.gains.kp * error;

        self.integral = (self.integral + self.gains.ki * error * dt)
            .clamp(-self.integral_limit, self.integral_limit);

        let derivative = if dt > 0.0 {
            self.gains.kd * (error - self.previous_error) / dt
        } else {
            0.0
        };
        self.previous_error = error;

        self.last = PidTerms {
            proportional,
            integral: self.integral,
            derivative,
            output: proportional + self.integral + derivative,
        };
        self.last
    }

    /// Zero integral and derivative memory. Gains are untouched.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.previous_error = 0.0;
        self.last = PidTerms::default();
    }

    /// Swap gains at runtime. Memory is zeroed so old accumulation scaled by
    /// the previous Ki does not leak into the new loop.
    pub fn set_gains(&mut self, gains: PidGains) {
        self.gains = gains;
        self.reset();
    }

    pub fn gains(&self) -> PidGains {
        self.gains
    }

    pub fn integral(&self) -> f32 {
        self.integral
    }

    pub fn previous_error(&self) -> f32 {
        self.previous_error
    }

    /// Terms from the most recent `update`.
    pub fn last(&self) -> PidTerms {
        self.last
    }
}
