//! Wire types shared with the robot backend.
//!
//! The backend serves a JSON `GET /status` snapshot plus one `GET` endpoint
//! per command, and mirrors the same vocabulary over a push channel carrying
//! `{"event": ..., "data": ...}` envelopes. These types are the single place
//! where both transports agree on payload shapes.

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};

/// PID gains as served by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    pub p: f64,
    pub i: f64,
    pub d: f64,
}

/// A left/right pair (motor PWM, encoder counts).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidePair<T> {
    pub left: T,
    pub right: T,
}

/// Per-side inversion flags; each side defaults to `+1` when absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvertFlags {
    #[serde(default = "plus_one")]
    pub left: i8,
    #[serde(default = "plus_one")]
    pub right: i8,
}

impl Default for InvertFlags {
    fn default() -> Self {
        Self { left: 1, right: 1 }
    }
}

fn plus_one() -> i8 {
    1
}

fn default_pid_hz() -> u32 {
    50
}

fn default_axis_sign() -> i8 {
    1
}

/// Which IMU axis the balance controller reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisMode {
    #[default]
    Pitch,
    Roll,
}

impl AxisMode {
    pub fn as_str(self) -> &'static str {
        match self {
            AxisMode::Pitch => "pitch",
            AxisMode::Roll => "roll",
        }
    }

    /// Anything that is not exactly `"roll"` reads as pitch, matching the
    /// backend's own fallback.
    pub fn parse(s: &str) -> Self {
        if s == "roll" {
            AxisMode::Roll
        } else {
            AxisMode::Pitch
        }
    }
}

impl<'de> Deserialize<'de> for AxisMode {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        Ok(AxisMode::parse(&s))
    }
}

/// Simulated vs. real hardware loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Sim,
    Real,
}

impl RunMode {
    pub fn as_str(self) -> &'static str {
        match self {
            RunMode::Sim => "sim",
            RunMode::Real => "real",
        }
    }

    /// Anything that is not exactly `"real"` reads as sim.
    pub fn parse(s: &str) -> Self {
        if s == "real" {
            RunMode::Real
        } else {
            RunMode::Sim
        }
    }
}

impl<'de> Deserialize<'de> for RunMode {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        Ok(RunMode::parse(&s))
    }
}

/// Robot configuration, received wholesale and replaced atomically on every
/// `config` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub pid: PidGains,
    #[serde(default = "default_pid_hz")]
    pub pid_hz: u32,
    pub setpoint: f64,
    pub imu_model: String,
    #[serde(default)]
    pub axis_mode: AxisMode,
    #[serde(default = "default_axis_sign")]
    pub axis_sign: i8,
    #[serde(default)]
    pub motor_invert: InvertFlags,
    #[serde(default)]
    pub encoder_invert: InvertFlags,
    #[serde(default)]
    pub mode: RunMode,
}

/// One telemetry snapshot. Replaced on every `telemetry` event; only the
/// angle survives, appended to the chart history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    pub angle_deg: f64,
    pub gyro_dps: f64,
    pub accel_g: f64,
    pub motor_pwm: SidePair<i64>,
    pub encoders: SidePair<i64>,
    pub mode: String,
    pub imu_model: String,
}

/// `GET /status` response; both halves are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusSnapshot {
    #[serde(default)]
    pub config: Option<Config>,
    #[serde(default)]
    pub telemetry: Option<Telemetry>,
}

/// An event pushed by the backend over the live channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    Config(Config),
    Telemetry(Telemetry),
}

#[derive(Deserialize)]
struct RawEnvelope {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
}

impl ServerEvent {
    /// Parse one push-channel frame. `Ok(None)` for event names this client
    /// does not subscribe to; `Err` only for malformed payloads.
    pub fn parse(frame: &str) -> Result<Option<ServerEvent>, String> {
        let raw: RawEnvelope =
            serde_json::from_str(frame).map_err(|e| format!("bad envelope: {e}"))?;
        match raw.event.as_str() {
            "config" => serde_json::from_value(raw.data)
                .map(|c| Some(ServerEvent::Config(c)))
                .map_err(|e| format!("bad config: {e}")),
            "telemetry" => serde_json::from_value(raw.data)
                .map(|t| Some(ServerEvent::Telemetry(t)))
                .map_err(|e| format!("bad telemetry: {e}")),
            _ => Ok(None),
        }
    }
}

/// A query/envelope parameter value. Numeric inputs that fail to parse are
/// carried as NaN so the send path can drop them uniformly.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    F64(f64),
    I64(i64),
    Str(String),
}

impl Param {
    /// Defined, non-empty, and numerically valid.
    fn is_sendable(&self) -> bool {
        match self {
            Param::F64(v) => !v.is_nan(),
            Param::I64(_) => true,
            Param::Str(s) => !s.is_empty(),
        }
    }

    fn to_query_value(&self) -> String {
        match self {
            Param::F64(v) => format!("{v}"),
            Param::I64(v) => v.to_string(),
            Param::Str(s) => s.clone(),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            // NaN has no JSON representation; the original stack serialized
            // it as null.
            Param::F64(v) => serde_json::Number::from_f64(*v)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Param::I64(v) => serde_json::Value::from(*v),
            Param::Str(s) => serde_json::Value::from(s.clone()),
        }
    }
}

/// One operator command. Every UI control maps to exactly one variant; the
/// transport decides whether it travels as a push event or an HTTP GET.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    GetInitialState,
    SetPid { p: f64, i: f64, d: f64 },
    SetPidHz { pid_hz: f64 },
    SetSetpoint { setpoint: f64 },
    SetImuModel { imu_model: String },
    SetAxisMode { axis_mode: AxisMode },
    SetAxisSign { axis_sign: i8 },
    SetMotorInvert { left: i8, right: i8 },
    SetEncoderInvert { left: i8, right: i8 },
    SetMode { mode: RunMode },
    Kick { angle: f64 },
    MotorTest { left: f64, right: f64, duration_ms: u32 },
    StopMotorTest,
}

impl Command {
    /// Push-channel event name.
    pub fn event(&self) -> &'static str {
        match self {
            Command::GetInitialState => "get_initial_state",
            Command::SetPid { .. } => "set_pid",
            Command::SetPidHz { .. } => "set_pid_hz",
            Command::SetSetpoint { .. } => "set_setpoint",
            Command::SetImuModel { .. } => "set_imu_model",
            Command::SetAxisMode { .. } => "set_axis_mode",
            Command::SetAxisSign { .. } => "set_axis_sign",
            Command::SetMotorInvert { .. } => "set_motor_invert",
            Command::SetEncoderInvert { .. } => "set_encoder_invert",
            Command::SetMode { .. } => "set_mode",
            Command::Kick { .. } => "kick",
            Command::MotorTest { .. } => "motor_test",
            Command::StopMotorTest => "stop_motor_test",
        }
    }

    /// HTTP fallback path. `GetInitialState` has no GET form; the polling
    /// loop already covers it.
    pub fn http_path(&self) -> Option<&'static str> {
        Some(match self {
            Command::GetInitialState => return None,
            Command::SetPid { .. } => "/set_pid",
            Command::SetPidHz { .. } => "/set_pid_hz",
            Command::SetSetpoint { .. } => "/set_setpoint",
            Command::SetImuModel { .. } => "/set_imu_model",
            Command::SetAxisMode { .. } => "/set_axis_mode",
            Command::SetAxisSign { .. } => "/set_axis_sign",
            Command::SetMotorInvert { .. } => "/set_motor_invert",
            Command::SetEncoderInvert { .. } => "/set_encoder_invert",
            Command::SetMode { .. } => "/set_mode",
            Command::Kick { .. } => "/kick",
            Command::MotorTest { .. } => "/motor_test",
            Command::StopMotorTest => "/stop_motor_test",
        })
    }

    /// Payload fields, in wire order.
    pub fn params(&self) -> Vec<(&'static str, Param)> {
        match self {
            Command::GetInitialState | Command::StopMotorTest => Vec::new(),
            Command::SetPid { p, i, d } => vec![
                ("p", Param::F64(*p)),
                ("i", Param::F64(*i)),
                ("d", Param::F64(*d)),
            ],
            Command::SetPidHz { pid_hz } => vec![("pid_hz", Param::F64(*pid_hz))],
            Command::SetSetpoint { setpoint } => vec![("setpoint", Param::F64(*setpoint))],
            Command::SetImuModel { imu_model } => {
                vec![("imu_model", Param::Str(imu_model.clone()))]
            }
            Command::SetAxisMode { axis_mode } => {
                vec![("axis_mode", Param::Str(axis_mode.as_str().to_string()))]
            }
            Command::SetAxisSign { axis_sign } => {
                vec![("axis_sign", Param::I64(i64::from(*axis_sign)))]
            }
            Command::SetMotorInvert { left, right } => vec![
                ("left", Param::I64(i64::from(*left))),
                ("right", Param::I64(i64::from(*right))),
            ],
            Command::SetEncoderInvert { left, right } => vec![
                ("left", Param::I64(i64::from(*left))),
                ("right", Param::I64(i64::from(*right))),
            ],
            Command::SetMode { mode } => vec![("mode", Param::Str(mode.as_str().to_string()))],
            Command::Kick { angle } => vec![("angle", Param::F64(*angle))],
            Command::MotorTest {
                left,
                right,
                duration_ms,
            } => vec![
                ("left", Param::F64(*left)),
                ("right", Param::F64(*right)),
                ("duration_ms", Param::I64(i64::from(*duration_ms))),
            ],
        }
    }

    /// Query string for the HTTP fallback. Parameters that are absent, empty,
    /// or NaN are omitted.
    pub fn query_string(&self) -> String {
        let mut out = String::new();
        for (key, value) in self.params() {
            if !value.is_sendable() {
                continue;
            }
            if !out.is_empty() {
                out.push('&');
            }
            out.push_str(key);
            out.push('=');
            out.push_str(&value.to_query_value());
        }
        out
    }

    /// Full push-channel frame: `{"event": ..., "data": {...}}`.
    pub fn envelope(&self) -> String {
        let mut data = serde_json::Map::new();
        for (key, value) in self.params() {
            data.insert(key.to_string(), value.to_json());
        }
        serde_json::json!({ "event": self.event(), "data": data }).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_string_drops_undefined_params() {
        let cmd = Command::SetPid {
            p: 1.5,
            i: f64::NAN,
            d: 0.2,
        };
        assert_eq!(cmd.query_string(), "p=1.5&d=0.2");

        let cmd = Command::SetImuModel {
            imu_model: String::new(),
        };
        assert_eq!(cmd.query_string(), "");

        let cmd = Command::StopMotorTest;
        assert_eq!(cmd.query_string(), "");
    }

    #[test]
    fn query_string_formats_whole_floats_without_fraction() {
        let cmd = Command::MotorTest {
            left: 120.0,
            right: 0.0,
            duration_ms: 1200,
        };
        assert_eq!(cmd.query_string(), "left=120&right=0&duration_ms=1200");
    }

    #[test]
    fn envelope_serializes_nan_as_null() {
        let cmd = Command::SetPidHz { pid_hz: f64::NAN };
        let v: serde_json::Value = serde_json::from_str(&cmd.envelope()).unwrap();
        assert_eq!(v["event"], "set_pid_hz");
        assert!(v["data"]["pid_hz"].is_null());
    }

    #[test]
    fn config_defaults_fill_missing_fields() {
        let cfg: Config = serde_json::from_str(
            r#"{"pid":{"p":12.0,"i":0.0,"d":0.4},"setpoint":0.0,"imu_model":"mpu6050"}"#,
        )
        .unwrap();
        assert_eq!(cfg.pid_hz, 50);
        assert_eq!(cfg.axis_mode, AxisMode::Pitch);
        assert_eq!(cfg.axis_sign, 1);
        assert_eq!(cfg.motor_invert, InvertFlags { left: 1, right: 1 });
        assert_eq!(cfg.encoder_invert, InvertFlags { left: 1, right: 1 });
        assert_eq!(cfg.mode, RunMode::Sim);
    }

    #[test]
    fn invert_flags_default_per_side() {
        let flags: InvertFlags = serde_json::from_str(r#"{"right":-1}"#).unwrap();
        assert_eq!(flags, InvertFlags { left: 1, right: -1 });
    }

    #[test]
    fn run_mode_parse_is_lenient() {
        assert_eq!(RunMode::parse("real"), RunMode::Real);
        assert_eq!(RunMode::parse("sim"), RunMode::Sim);
        assert_eq!(RunMode::parse("garbage"), RunMode::Sim);
        assert_eq!(AxisMode::parse("roll"), AxisMode::Roll);
        assert_eq!(AxisMode::parse(""), AxisMode::Pitch);
    }

    #[test]
    fn server_event_parses_telemetry_envelope() {
        let frame = r#"{"event":"telemetry","data":{
            "angle_deg":12.34,"gyro_dps":1.1,"accel_g":0.98,
            "motor_pwm":{"left":100,"right":100},
            "encoders":{"left":5,"right":7},
            "mode":"sim","imu_model":"mpu6050"}}"#;
        let ev = ServerEvent::parse(frame).unwrap().unwrap();
        match ev {
            ServerEvent::Telemetry(t) => {
                assert_eq!(t.angle_deg, 12.34);
                assert_eq!(t.motor_pwm, SidePair { left: 100, right: 100 });
                assert_eq!(t.encoders, SidePair { left: 5, right: 7 });
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn server_event_ignores_unknown_events() {
        let ev = ServerEvent::parse(r#"{"event":"heartbeat","data":{}}"#).unwrap();
        assert!(ev.is_none());

        // Telemetry snapshots carry extra backend fields; they are ignored.
        let frame = r#"{"event":"config","data":{
            "pid":{"p":1.0,"i":0.0,"d":0.1},"setpoint":0.0,"imu_model":"mpu6050",
            "mode":"real","extra_field":42}}"#;
        let ev = ServerEvent::parse(frame).unwrap().unwrap();
        assert!(matches!(ev, ServerEvent::Config(c) if c.mode == RunMode::Real));
    }

    #[test]
    fn malformed_payload_is_an_error_not_a_panic() {
        assert!(ServerEvent::parse("not json").is_err());
        assert!(ServerEvent::parse(r#"{"event":"telemetry","data":{"angle_deg":"x"}}"#).is_err());
    }

    #[test]
    fn status_snapshot_halves_are_optional() {
        let s: StatusSnapshot = serde_json::from_str("{}").unwrap();
        assert!(s.config.is_none());
        assert!(s.telemetry.is_none());
    }
}
