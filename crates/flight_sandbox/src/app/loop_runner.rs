use std::process::ExitCode;
use std::time::Duration;

use noclip::{NoclipController, ToggleOutcome};
use tracing::{info, warn};

use super::bootstrap::AppWiring;
use super::console_commands::{ConsoleCommandProcessor, SessionCommand};
use super::script::{InputScript, StepAction};
use super::sim_avatar::SimulatedAvatar;

#[derive(Debug, Clone)]
pub(crate) struct LoopConfig {
    pub(crate) target_tps: u32,
    pub(crate) max_ticks: u64,
    pub(crate) status_log_interval: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            target_tps: 60,
            max_ticks: 60 * 60 * 10,
            status_log_interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct RunSummary {
    pub(crate) ticks: u64,
    pub(crate) steps_applied: usize,
    pub(crate) activations: u32,
    pub(crate) deactivations: u32,
    pub(crate) denied: u32,
    pub(crate) console_lines: Vec<String>,
    pub(crate) left_session: bool,
}

impl RunSummary {
    fn record(&mut self, outcome: ToggleOutcome) {
        match outcome {
            ToggleOutcome::Activated => self.activations += 1,
            ToggleOutcome::Deactivated => self.deactivations += 1,
            ToggleOutcome::Denied => self.denied += 1,
            ToggleOutcome::Unchanged => {}
        }
    }
}

enum Flow {
    Continue,
    Stop,
}

pub(crate) fn run(app: AppWiring) -> ExitCode {
    let AppWiring {
        config,
        script,
        avatar,
        loop_config,
    } = app;

    let mut controller = NoclipController::new(config, avatar);
    let summary = run_script(&loop_config, &script, &mut controller);
    let snapshot = controller.snapshot();
    let avatar = controller.into_host();

    if summary.steps_applied < script.steps.len() && !summary.left_session {
        warn!(
            applied = summary.steps_applied,
            total = script.steps.len(),
            "script_truncated"
        );
    }

    info!(
        identity = avatar.identity(),
        ticks = summary.ticks,
        steps_applied = summary.steps_applied,
        activations = summary.activations,
        deactivations = summary.deactivations,
        denied = summary.denied,
        console_errors = summary
            .console_lines
            .iter()
            .filter(|line| line.starts_with("error:"))
            .count(),
        left_session = summary.left_session,
        active = snapshot.active,
        final_position = ?snapshot.position,
        final_velocity = ?avatar.velocity(),
        immobilized = avatar.is_immobilized(),
        teleports = avatar.teleport_count(),
        immobilize_calls = avatar.immobilize_count(),
        "run_summary"
    );

    ExitCode::SUCCESS
}

/// Drives `controller` at a fixed tick rate until the script's duration elapses
/// or the avatar leaves. Steps due at the current time are applied before the
/// tick that follows them.
pub(crate) fn run_script(
    config: &LoopConfig,
    script: &InputScript,
    controller: &mut NoclipController<SimulatedAvatar>,
) -> RunSummary {
    let target_tps = config.target_tps.max(1);
    let fixed_dt = 1.0 / target_tps as f32;
    let scripted_ticks =
        (f64::from(script.duration_seconds) * f64::from(target_tps)).ceil() as u64;
    let total_ticks = scripted_ticks.min(config.max_ticks);
    let status_every_ticks =
        ((config.status_log_interval.as_secs_f64() * f64::from(target_tps)).round() as u64).max(1);

    info!(
        target_tps,
        total_ticks,
        steps = script.steps.len(),
        status_log_interval_ms = config.status_log_interval.as_millis() as u64,
        "loop_config"
    );

    let mut console = ConsoleCommandProcessor::new();
    let mut summary = RunSummary::default();
    let mut next_step = 0;
    let mut sim_seconds = 0.0_f64;

    'ticks: for tick in 0..total_ticks {
        while let Some(step) = script.steps.get(next_step) {
            if f64::from(step.at) > sim_seconds {
                break;
            }
            next_step += 1;
            summary.steps_applied += 1;

            let flow = match step.action() {
                Some(StepAction::Input(event)) => {
                    summary.record(controller.on_input_event(event));
                    Flow::Continue
                }
                Some(StepAction::Command(line)) => {
                    run_console_line(&mut console, &line, controller, &mut summary)
                }
                None => Flow::Continue,
            };
            if let Flow::Stop = flow {
                break 'ticks;
            }
        }

        controller.host_mut().step_physics(fixed_dt);
        controller.on_tick(fixed_dt);
        sim_seconds += f64::from(fixed_dt);
        summary.ticks = tick + 1;

        if summary.ticks % status_every_ticks == 0 {
            log_status(controller);
        }
    }

    summary
}

fn run_console_line(
    console: &mut ConsoleCommandProcessor,
    line: &str,
    controller: &mut NoclipController<SimulatedAvatar>,
    summary: &mut RunSummary,
) -> Flow {
    info!(line, "console_command");
    let flow = match console.process_line(line) {
        Some(command) => apply_command(command, controller, summary),
        None => Flow::Continue,
    };

    let mut output = Vec::new();
    console.drain_output_into(&mut output);
    for line in &output {
        if line.starts_with("error:") {
            warn!(line = line.as_str(), "console_output");
        } else {
            info!(line = line.as_str(), "console_output");
        }
    }
    summary.console_lines.extend(output);
    flow
}

fn apply_command(
    command: SessionCommand,
    controller: &mut NoclipController<SimulatedAvatar>,
    summary: &mut RunSummary,
) -> Flow {
    match command {
        SessionCommand::Noclip { enabled } => {
            let enabled = enabled.unwrap_or(!controller.is_active());
            summary.record(controller.set_enabled(enabled));
        }
        SessionCommand::Speed { max_speed } => controller.set_max_speed(max_speed),
        SessionCommand::AllowAdd { identity } => {
            let added = controller.add_allowed_identity(&identity);
            info!(identity = identity.as_str(), added, "allowlist_add");
        }
        SessionCommand::AllowRemove { identity } => {
            let removed = controller.remove_allowed_identity(&identity);
            info!(identity = identity.as_str(), removed, "allowlist_remove");
        }
        SessionCommand::AllowClear => controller.clear_allowed_identities(),
        SessionCommand::AllowSelf => {
            let added = controller.add_current_identity_to_allowed_list();
            info!(added, "allowlist_add_self");
        }
        SessionCommand::Restrict { restricted } => controller.set_access_restricted(restricted),
        SessionCommand::Look {
            yaw_degrees,
            pitch_degrees,
        } => controller
            .host_mut()
            .set_look(yaw_degrees.to_radians(), pitch_degrees.to_radians()),
        SessionCommand::Sit => controller.host_mut().sit(),
        SessionCommand::Stand => controller.host_mut().stand(),
        SessionCommand::Respawn => {
            controller.host_mut().respawn();
            summary.record(controller.on_avatar_respawned());
        }
        SessionCommand::Leave => {
            summary.record(controller.on_avatar_left());
            summary.left_session = true;
            return Flow::Stop;
        }
        SessionCommand::Status => log_status(controller),
    }
    Flow::Continue
}

fn log_status(controller: &NoclipController<SimulatedAvatar>) {
    let snapshot = controller.snapshot();
    let avatar = controller.host();
    info!(
        active = snapshot.active,
        primed = snapshot.primed,
        consecutive = snapshot.consecutive_count,
        trigger = ?snapshot.trigger_method,
        device = ?snapshot.device_mode,
        speed = snapshot.speed,
        policy = ?snapshot.access_policy,
        local_allowed = snapshot.local_identity_allowed,
        position = ?snapshot.position,
        velocity = ?avatar.velocity(),
        seated = avatar.is_seated(),
        clock_seconds = snapshot.clock_seconds,
        "noclip_status"
    );
}
