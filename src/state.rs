//! Client-side session state: last config/telemetry, the bounded angle
//! history behind the strip chart, and the transient kick overlay.

use crate::protocol::{Config, Telemetry};

/// Chart history capacity in samples.
pub const MAX_POINTS: usize = 200;

/// Fixed UI multiplier applied to tilt angles before drawing.
pub const UI_ANGLE_SCALE: f64 = 6.0;

/// How long a kick overlay plays out.
pub const KICK_DURATION_MS: f64 = 2200.0;

const KICK_MIN_DEG: f64 = 10.0;
const KICK_MAX_DEG: f64 = 80.0;

/// A rolling history buffer of past angle samples. FIFO; oldest dropped when
/// full.
#[derive(Debug, Clone)]
pub struct AngleHistory {
    data: Vec<f64>,
    capacity: usize,
}

impl AngleHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, value: f64) {
        if self.data.len() >= self.capacity {
            self.data.remove(0);
        }
        self.data.push(value);
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Largest-magnitude sample, or 0 when empty.
    pub fn max_abs(&self) -> f64 {
        self.data.iter().fold(0.0, |acc, v| acc.max(v.abs()))
    }
}

/// Visual disturbance played after a kick command. Affects only the
/// wireframe's display angle, never the numeric readouts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KickOverlay {
    pub magnitude: f64,
    pub sign: f64,
    pub start_ms: f64,
    pub duration_ms: f64,
}

impl KickOverlay {
    /// Build an overlay from the operator's requested kick angle. Magnitude
    /// is clamped into [10, 80] degrees; sign follows the request.
    pub fn from_request(angle: f64, now_ms: f64) -> Self {
        let angle = if angle.is_finite() { angle } else { 0.0 };
        Self {
            magnitude: angle.abs().clamp(KICK_MIN_DEG, KICK_MAX_DEG),
            sign: if angle >= 0.0 { 1.0 } else { -1.0 },
            start_ms: now_ms,
            duration_ms: KICK_DURATION_MS,
        }
    }

    /// Current angular offset, or `None` once expired. Negative elapsed time
    /// (clock skew) also reads as expired.
    pub fn offset_at(&self, now_ms: f64) -> Option<f64> {
        if self.duration_ms <= 0.0 {
            return None;
        }
        let elapsed = now_ms - self.start_ms;
        if elapsed < 0.0 || elapsed >= self.duration_ms {
            return None;
        }
        let t = elapsed / self.duration_ms;
        let decay = (-3.2 * t).exp();
        let wobble = (t * 10.0 + 0.8).sin();
        Some(self.sign * self.magnitude * decay * wobble)
    }
}

/// Everything the dashboard remembers between transport events. Owned by the
/// UI session; renderers and the dispatcher read from it rather than from
/// ambient globals.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub config: Option<Config>,
    pub telemetry: Option<Telemetry>,
    pub history: AngleHistory,
    kick: Option<KickOverlay>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardState {
    pub fn new() -> Self {
        Self {
            config: None,
            telemetry: None,
            history: AngleHistory::new(MAX_POINTS),
            kick: None,
        }
    }

    /// Overwrite the configuration wholesale.
    pub fn apply_config(&mut self, cfg: Config) {
        self.config = Some(cfg);
    }

    /// Replace the telemetry snapshot and append its angle to the history.
    pub fn apply_telemetry(&mut self, t: Telemetry) {
        self.history.push(t.angle_deg);
        self.telemetry = Some(t);
    }

    /// Start (or restart) the kick overlay. At most one is active; a new kick
    /// replaces the prior one unconditionally.
    pub fn start_kick(&mut self, angle: f64, now_ms: f64) {
        self.kick = Some(KickOverlay::from_request(angle, now_ms));
    }

    /// Current overlay offset. Expired overlays are cleared as a side effect.
    pub fn kick_offset(&mut self, now_ms: f64) -> Option<f64> {
        let offset = self.kick.as_ref().and_then(|k| k.offset_at(now_ms));
        if offset.is_none() {
            self.kick = None;
        }
        offset
    }

    /// Angle the wireframe should draw: telemetry angle plus any active
    /// overlay offset.
    pub fn display_angle(&mut self, now_ms: f64) -> f64 {
        let base = self.telemetry.as_ref().map_or(0.0, |t| t.angle_deg);
        base + self.kick_offset(now_ms).unwrap_or(0.0)
    }

    /// Optimistic feedback snapshot for a kick: a copy of the last known
    /// telemetry with the angle and gyro rate replaced. `None` until the
    /// first real telemetry arrives.
    pub fn kick_feedback(&self, angle: f64) -> Option<Telemetry> {
        let last = self.telemetry.as_ref()?;
        let angle = if angle.is_finite() { angle } else { 0.0 };
        let mut fake = last.clone();
        fake.angle_deg = angle;
        fake.gyro_dps = if angle >= 0.0 { 12.0 } else { -12.0 };
        Some(fake)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::SidePair;

    fn telemetry(angle: f64) -> Telemetry {
        Telemetry {
            angle_deg: angle,
            gyro_dps: 0.5,
            accel_g: 1.0,
            motor_pwm: SidePair { left: 10, right: 12 },
            encoders: SidePair { left: 3, right: 4 },
            mode: "sim".to_string(),
            imu_model: "mpu6050".to_string(),
        }
    }

    #[test]
    fn history_is_bounded_fifo() {
        let mut state = DashboardState::new();
        for i in 0..(MAX_POINTS + 25) {
            state.apply_telemetry(telemetry(i as f64));
        }
        assert_eq!(state.history.len(), MAX_POINTS);
        // Oldest evicted first: the buffer now starts at sample 25.
        assert_eq!(state.history.data()[0], 25.0);
        assert_eq!(*state.history.data().last().unwrap(), (MAX_POINTS + 24) as f64);
    }

    #[test]
    fn telemetry_replaces_snapshot_and_keeps_angle() {
        let mut state = DashboardState::new();
        state.apply_telemetry(telemetry(12.34));
        assert_eq!(state.history.data(), &[12.34]);
        assert_eq!(state.telemetry.as_ref().unwrap().angle_deg, 12.34);
    }

    #[test]
    fn kick_clamps_magnitude_and_keeps_sign() {
        let k = KickOverlay::from_request(50.0, 0.0);
        assert_eq!(k.sign, 1.0);
        assert_eq!(k.magnitude, 50.0);

        let k = KickOverlay::from_request(-5.0, 0.0);
        assert_eq!(k.sign, -1.0);
        assert_eq!(k.magnitude, 10.0);

        let k = KickOverlay::from_request(200.0, 0.0);
        assert_eq!(k.magnitude, 80.0);

        // Unparseable input reads as 0: minimum magnitude, positive sign.
        let k = KickOverlay::from_request(f64::NAN, 0.0);
        assert_eq!(k.sign, 1.0);
        assert_eq!(k.magnitude, 10.0);
    }

    #[test]
    fn overlay_expires_on_duration_and_clock_skew() {
        let k = KickOverlay::from_request(50.0, 1000.0);
        assert!(k.offset_at(1100.0).is_some());
        assert!(k.offset_at(1000.0 + KICK_DURATION_MS).is_none());
        // Clock went backwards.
        assert!(k.offset_at(900.0).is_none());

        let zero = KickOverlay {
            duration_ms: 0.0,
            ..KickOverlay::from_request(50.0, 0.0)
        };
        assert!(zero.offset_at(0.0).is_none());
    }

    #[test]
    fn overlay_decays_with_wobble() {
        let k = KickOverlay::from_request(50.0, 0.0);
        let t = 0.25;
        let expected = 50.0 * (-3.2f64 * t).exp() * (t * 10.0 + 0.8).sin();
        let got = k.offset_at(t * KICK_DURATION_MS).unwrap();
        assert!((got - expected).abs() < 1e-9);
    }

    #[test]
    fn expired_overlay_is_cleared_and_new_kick_replaces_old() {
        let mut state = DashboardState::new();
        state.apply_telemetry(telemetry(1.0));

        state.start_kick(30.0, 0.0);
        assert!(state.kick_offset(100.0).is_some());

        // Replaced unconditionally.
        state.start_kick(-60.0, 200.0);
        let offset = state.kick_offset(300.0).unwrap();
        assert!(offset < 0.0);

        // Expired: cleared, display angle falls back to telemetry.
        assert!(state.kick_offset(200.0 + KICK_DURATION_MS).is_none());
        assert_eq!(state.display_angle(10_000.0), 1.0);
    }

    #[test]
    fn kick_feedback_copies_last_telemetry() {
        let mut state = DashboardState::new();
        assert!(state.kick_feedback(20.0).is_none());

        state.apply_telemetry(telemetry(2.0));
        let fake = state.kick_feedback(-20.0).unwrap();
        assert_eq!(fake.angle_deg, -20.0);
        assert_eq!(fake.gyro_dps, -12.0);
        assert_eq!(fake.motor_pwm, SidePair { left: 10, right: 12 });
        // Readout state is untouched until the fake goes through the normal
        // update path.
        assert_eq!(state.telemetry.as_ref().unwrap().angle_deg, 2.0);
    }
}
