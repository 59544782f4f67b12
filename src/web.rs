//! The dashboard app: readouts, charts, and the control panel, wired to the
//! push/poll transport.

mod canvas;
mod shell;
mod storage;
mod transport;

use std::rc::Rc;

use leptos::prelude::*;

use crate::chart;
use crate::float_fmt::fmt_f64_fixed;
use crate::protocol::{AxisMode, Command, Config, RunMode, ServerEvent, Telemetry};
use crate::state::DashboardState;
use crate::ui_model::{ConnectionEvent, ConnectionModel};
use crate::wireframe;

use shell::{Readout, SystemErrorBanner, Topbar};
use transport::{Handlers, Transport};

const MOTOR_TEST_DURATION_MS: u32 = 1200;

pub(crate) fn console_log(msg: &str) {
    web_sys::console::log_1(&msg.into());
}

pub fn start() {
    mount_to_body(|| view! { <App /> });
}

#[component]
fn App() -> impl IntoView {
    let state = StoredValue::new(DashboardState::new());
    let conn = StoredValue::new(ConnectionModel::new());

    let (status, set_status) = signal(ConnectionModel::initial_status().text);
    let (status_is_error, set_status_is_error) = signal(false);
    let (system_error, set_system_error) = signal::<Option<String>>(None);
    let (theme, set_theme) = signal(storage::load_theme());

    // Telemetry readouts.
    let (angle_text, set_angle_text) = signal("--".to_string());
    let (gyro_text, set_gyro_text) = signal("--".to_string());
    let (accel_text, set_accel_text) = signal("--".to_string());
    let (motor_text, set_motor_text) = signal("--".to_string());
    let (encoder_text, set_encoder_text) = signal("--".to_string());
    let (mode_text, set_mode_text) = signal("--".to_string());
    let (imu_text, set_imu_text) = signal("--".to_string());

    // Control inputs, mirrored from every config event.
    let (pid_p, set_pid_p) = signal(String::new());
    let (pid_i, set_pid_i) = signal(String::new());
    let (pid_d, set_pid_d) = signal(String::new());
    let (pid_hz, set_pid_hz) = signal(String::new());
    let (setpoint, set_setpoint) = signal(String::new());
    let (imu_model, set_imu_model) = signal(String::new());
    let (axis_mode, set_axis_mode) = signal("pitch".to_string());
    let (axis_sign, set_axis_sign) = signal("1".to_string());
    let (motor_left, set_motor_left) = signal("1".to_string());
    let (motor_right, set_motor_right) = signal("1".to_string());
    let (enc_left, set_enc_left) = signal("1".to_string());
    let (enc_right, set_enc_right) = signal("1".to_string());
    let (run_mode, set_run_mode) = signal("sim".to_string());
    let (kick_angle, set_kick_angle) = signal("30".to_string());
    let (motor_speed, set_motor_speed) = signal("100".to_string());

    let chart_ref = NodeRef::<leptos::html::Canvas>::new();
    let wire_ref = NodeRef::<leptos::html::Canvas>::new();

    let redraw = move || {
        let now = js_sys::Date::now();
        let mut samples: Vec<f64> = Vec::new();
        let mut display_angle = 0.0;
        state.update_value(|s| {
            samples = s.history.data().to_vec();
            display_angle = s.display_angle(now);
        });
        let theme_now = theme.get();

        if let Some(el) = chart_ref.get() {
            let scene = chart::layout(&samples, el.width() as f64, el.height() as f64);
            if let Err(err) = canvas::paint_chart(&el, &scene, theme_now) {
                set_system_error.set(Some(err));
            }
        }
        if let Some(el) = wire_ref.get() {
            let scene = wireframe::layout(display_angle, el.width() as f64, el.height() as f64);
            if let Err(err) = canvas::paint_wireframe(&el, &scene) {
                set_system_error.set(Some(err));
            }
        }
    };

    Effect::new(move |_| {
        let t = theme.get();
        storage::apply_theme_to_document(t);
        storage::save_theme(t);
        redraw();
    });

    let apply_config = move |cfg: Config| {
        set_pid_p.set(format!("{}", cfg.pid.p));
        set_pid_i.set(format!("{}", cfg.pid.i));
        set_pid_d.set(format!("{}", cfg.pid.d));
        set_pid_hz.set(cfg.pid_hz.to_string());
        set_setpoint.set(format!("{}", cfg.setpoint));
        set_imu_model.set(cfg.imu_model.clone());
        set_axis_mode.set(cfg.axis_mode.as_str().to_string());
        set_axis_sign.set(cfg.axis_sign.to_string());
        set_motor_left.set(cfg.motor_invert.left.to_string());
        set_motor_right.set(cfg.motor_invert.right.to_string());
        set_enc_left.set(cfg.encoder_invert.left.to_string());
        set_enc_right.set(cfg.encoder_invert.right.to_string());
        set_run_mode.set(cfg.mode.as_str().to_string());
        set_mode_text.set(cfg.mode.as_str().to_string());
        set_imu_text.set(cfg.imu_model.clone());
        state.update_value(|s| s.apply_config(cfg));
    };

    let apply_telemetry = move |t: Telemetry| {
        set_angle_text.set(fmt_f64_fixed(t.angle_deg, 2));
        set_gyro_text.set(fmt_f64_fixed(t.gyro_dps, 2));
        set_accel_text.set(fmt_f64_fixed(t.accel_g, 2));
        set_motor_text.set(format!("{}/{}", t.motor_pwm.left, t.motor_pwm.right));
        set_encoder_text.set(format!("{}/{}", t.encoders.left, t.encoders.right));
        set_mode_text.set(t.mode.clone());
        set_imu_text.set(t.imu_model.clone());
        state.update_value(|s| s.apply_telemetry(t));
        redraw();
    };

    let on_event: Rc<dyn Fn(ServerEvent)> = Rc::new(move |event| match event {
        ServerEvent::Config(cfg) => apply_config(cfg),
        ServerEvent::Telemetry(t) => apply_telemetry(t),
    });

    let on_conn: Rc<dyn Fn(ConnectionEvent)> = Rc::new(move |event| {
        let mut line = None;
        conn.update_value(|m| line = Some(m.apply(event)));
        if let Some(line) = line {
            set_status.set(line.text);
            set_status_is_error.set(line.is_error);
        }
    });

    let on_protocol_error: Rc<dyn Fn(String)> =
        Rc::new(move |err| set_system_error.set(Some(err)));

    let transport = Transport::new(Handlers {
        on_event,
        on_conn,
        on_protocol_error,
    });
    transport.start();
    let transport = StoredValue::new_local(transport);

    on_cleanup(move || transport.with_value(|t| t.stop()));

    let send = move |cmd: Command| transport.with_value(|t| t.send(&cmd));

    let parse_f64 = |s: String| s.trim().parse::<f64>().unwrap_or(f64::NAN);
    let parse_int = |s: String| s.trim().parse::<f64>().map_or(f64::NAN, f64::trunc);
    let parse_sign = |s: String| s.trim().parse::<i8>().unwrap_or(1);

    let do_kick = move || {
        let angle = parse_f64(kick_angle.get());
        console_log(&format!("[tiltbot] kick requested: {angle} deg"));
        let now = js_sys::Date::now();
        // Optimistic feedback: the wireframe lurches and a fake telemetry
        // sample goes through the normal update path before the backend
        // answers.
        let mut fake = None;
        state.update_value(|s| {
            s.start_kick(angle, now);
            fake = s.kick_feedback(angle);
        });
        match fake {
            Some(t) => apply_telemetry(t),
            None => redraw(),
        }
        send(Command::Kick { angle });
    };

    let send_motor_test = move |left_dir: i8, right_dir: i8| {
        let speed = parse_int(motor_speed.get());
        // The idle side is always an explicit 0, even when the speed input
        // fails to parse.
        let side = |dir: i8| if dir == 0 { 0.0 } else { speed * f64::from(dir) };
        send(Command::MotorTest {
            left: side(left_dir),
            right: side(right_dir),
            duration_ms: MOTOR_TEST_DURATION_MS,
        });
    };

    view! {
        <Topbar status=status status_is_error=status_is_error theme=theme set_theme=set_theme />

        <main class="app-main">
            <SystemErrorBanner system_error=system_error set_system_error=set_system_error />

            <section class="readouts">
                <Readout label="Angle (deg)" value=move || angle_text.get() />
                <Readout label="Gyro (dps)" value=move || gyro_text.get() />
                <Readout label="Accel (g)" value=move || accel_text.get() />
                <Readout label="Motor PWM L/R" value=move || motor_text.get() />
                <Readout label="Encoders L/R" value=move || encoder_text.get() />
                <Readout label="Mode" value=move || mode_text.get() />
                <Readout label="IMU" value=move || imu_text.get() />
            </section>

            <section class="panels">
                <div class="panel">
                    <h2>"Angle history"</h2>
                    <canvas node_ref=chart_ref width="640" height="300"></canvas>
                </div>
                <div class="panel">
                    <h2>"Robot"</h2>
                    <canvas node_ref=wire_ref width="360" height="300"></canvas>
                </div>
            </section>

            <section class="controls">
                <div class="control-group">
                    <h3>"PID gains"</h3>
                    <label>
                        <span>"P"</span>
                        <input
                            type="number"
                            step="0.1"
                            prop:value=move || pid_p.get()
                            on:input=move |ev| set_pid_p.set(event_target_value(&ev))
                        />
                    </label>
                    <label>
                        <span>"I"</span>
                        <input
                            type="number"
                            step="0.01"
                            prop:value=move || pid_i.get()
                            on:input=move |ev| set_pid_i.set(event_target_value(&ev))
                        />
                    </label>
                    <label>
                        <span>"D"</span>
                        <input
                            type="number"
                            step="0.01"
                            prop:value=move || pid_d.get()
                            on:input=move |ev| set_pid_d.set(event_target_value(&ev))
                        />
                    </label>
                    <button on:click=move |_| send(Command::SetPid {
                        p: parse_f64(pid_p.get()),
                        i: parse_f64(pid_i.get()),
                        d: parse_f64(pid_d.get()),
                    })>
                        "Apply"
                    </button>
                </div>

                <div class="control-group">
                    <h3>"Loop rate"</h3>
                    <label>
                        <span>"Hz"</span>
                        <input
                            type="number"
                            min="1"
                            max="400"
                            prop:value=move || pid_hz.get()
                            on:input=move |ev| set_pid_hz.set(event_target_value(&ev))
                        />
                    </label>
                    <button on:click=move |_| send(Command::SetPidHz {
                        pid_hz: parse_int(pid_hz.get()),
                    })>
                        "Apply"
                    </button>
                </div>

                <div class="control-group">
                    <h3>"Setpoint"</h3>
                    <label>
                        <span>"deg"</span>
                        <input
                            type="number"
                            step="0.1"
                            prop:value=move || setpoint.get()
                            on:input=move |ev| set_setpoint.set(event_target_value(&ev))
                        />
                    </label>
                    <button on:click=move |_| send(Command::SetSetpoint {
                        setpoint: parse_f64(setpoint.get()),
                    })>
                        "Apply"
                    </button>
                </div>

                <div class="control-group">
                    <h3>"IMU model"</h3>
                    <label>
                        <span>"Model"</span>
                        <input
                            type="text"
                            prop:value=move || imu_model.get()
                            on:input=move |ev| set_imu_model.set(event_target_value(&ev))
                        />
                    </label>
                    <button on:click=move |_| send(Command::SetImuModel {
                        imu_model: imu_model.get(),
                    })>
                        "Apply"
                    </button>
                </div>

                <div class="control-group">
                    <h3>"Balance axis"</h3>
                    <label>
                        <span>"Axis"</span>
                        <select
                            prop:value=move || axis_mode.get()
                            on:change=move |ev| set_axis_mode.set(event_target_value(&ev))
                        >
                            <option value="pitch">"pitch"</option>
                            <option value="roll">"roll"</option>
                        </select>
                    </label>
                    <button on:click=move |_| send(Command::SetAxisMode {
                        axis_mode: AxisMode::parse(&axis_mode.get()),
                    })>
                        "Apply"
                    </button>
                    <label>
                        <span>"Sign"</span>
                        <select
                            prop:value=move || axis_sign.get()
                            on:change=move |ev| set_axis_sign.set(event_target_value(&ev))
                        >
                            <option value="1">"+1"</option>
                            <option value="-1">"-1"</option>
                        </select>
                    </label>
                    <button on:click=move |_| send(Command::SetAxisSign {
                        axis_sign: parse_sign(axis_sign.get()),
                    })>
                        "Apply"
                    </button>
                </div>

                <div class="control-group">
                    <h3>"Motor invert"</h3>
                    <label>
                        <span>"Left"</span>
                        <select
                            prop:value=move || motor_left.get()
                            on:change=move |ev| set_motor_left.set(event_target_value(&ev))
                        >
                            <option value="1">"+1"</option>
                            <option value="-1">"-1"</option>
                        </select>
                    </label>
                    <label>
                        <span>"Right"</span>
                        <select
                            prop:value=move || motor_right.get()
                            on:change=move |ev| set_motor_right.set(event_target_value(&ev))
                        >
                            <option value="1">"+1"</option>
                            <option value="-1">"-1"</option>
                        </select>
                    </label>
                    <button on:click=move |_| send(Command::SetMotorInvert {
                        left: parse_sign(motor_left.get()),
                        right: parse_sign(motor_right.get()),
                    })>
                        "Apply"
                    </button>
                </div>

                <div class="control-group">
                    <h3>"Encoder invert"</h3>
                    <label>
                        <span>"Left"</span>
                        <select
                            prop:value=move || enc_left.get()
                            on:change=move |ev| set_enc_left.set(event_target_value(&ev))
                        >
                            <option value="1">"+1"</option>
                            <option value="-1">"-1"</option>
                        </select>
                    </label>
                    <label>
                        <span>"Right"</span>
                        <select
                            prop:value=move || enc_right.get()
                            on:change=move |ev| set_enc_right.set(event_target_value(&ev))
                        >
                            <option value="1">"+1"</option>
                            <option value="-1">"-1"</option>
                        </select>
                    </label>
                    <button on:click=move |_| send(Command::SetEncoderInvert {
                        left: parse_sign(enc_left.get()),
                        right: parse_sign(enc_right.get()),
                    })>
                        "Apply"
                    </button>
                </div>

                <div class="control-group">
                    <h3>"Run mode"</h3>
                    <label>
                        <span>"Mode"</span>
                        <select
                            prop:value=move || run_mode.get()
                            on:change=move |ev| set_run_mode.set(event_target_value(&ev))
                        >
                            <option value="sim">"sim"</option>
                            <option value="real">"real"</option>
                        </select>
                    </label>
                    <button on:click=move |_| send(Command::SetMode {
                        mode: RunMode::parse(&run_mode.get()),
                    })>
                        "Apply"
                    </button>
                </div>

                <div class="control-group">
                    <h3>"Kick"</h3>
                    <label>
                        <span>"deg"</span>
                        <input
                            type="number"
                            step="1"
                            prop:value=move || kick_angle.get()
                            on:input=move |ev| set_kick_angle.set(event_target_value(&ev))
                        />
                    </label>
                    <button on:click=move |_| do_kick()>"Face-plant"</button>
                </div>

                <div class="control-group">
                    <h3>"Motor test"</h3>
                    <label>
                        <span>"Speed"</span>
                        <input
                            type="number"
                            min="0"
                            max="255"
                            prop:value=move || motor_speed.get()
                            on:input=move |ev| set_motor_speed.set(event_target_value(&ev))
                        />
                    </label>
                    <button on:click=move |_| send_motor_test(1, 0)>"L fwd"</button>
                    <button on:click=move |_| send_motor_test(-1, 0)>"L rev"</button>
                    <button on:click=move |_| send_motor_test(0, 1)>"R fwd"</button>
                    <button on:click=move |_| send_motor_test(0, -1)>"R rev"</button>
                    <button on:click=move |_| send(Command::StopMotorTest)>"Stop"</button>
                </div>
            </section>
        </main>
    }
}
