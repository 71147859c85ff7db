use std::path::PathBuf;

use glam::Vec3;
use noclip::NoclipConfig;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::loading::{load_json_file, LoadError};
use super::loop_runner::LoopConfig;
use super::script::InputScript;
use super::sim_avatar::SimulatedAvatar;

const CONFIG_PATH_ENV_VAR: &str = "NOCLIP_CONFIG";
const SCRIPT_PATH_ENV_VAR: &str = "NOCLIP_SCRIPT";
const DEBUG_BYPASS_ENV_VAR: &str = "NOCLIP_DEBUG_BYPASS";
const IDENTITY_ENV_VAR: &str = "NOCLIP_IDENTITY";
const VR_ENV_VAR: &str = "NOCLIP_VR";

const DEFAULT_IDENTITY: &str = "local-pilot";
const SPAWN_POINT: Vec3 = Vec3::new(0.0, 2.0, 0.0);
const VR_PLAY_SPACE_OFFSET: Vec3 = Vec3::new(0.3, 0.0, -0.2);

#[derive(Debug, Error)]
pub(crate) enum SandboxError {
    #[error("failed to load noclip config: {0}")]
    Config(#[source] LoadError),
    #[error("failed to load input script: {0}")]
    Script(#[source] LoadError),
    #[error("invalid value '{value}' for {var} (expected 1|0|true|false)")]
    InvalidFlag { var: &'static str, value: String },
}

pub(crate) struct AppWiring {
    pub(crate) config: NoclipConfig,
    pub(crate) script: InputScript,
    pub(crate) avatar: SimulatedAvatar,
    pub(crate) loop_config: LoopConfig,
}

pub(crate) fn build_app() -> Result<AppWiring, SandboxError> {
    init_tracing();
    info!("=== Noclip Flight Sandbox ===");
    wire_from(|var| std::env::var(var).ok())
}

fn wire_from(env: impl Fn(&str) -> Option<String>) -> Result<AppWiring, SandboxError> {
    let mut config = match non_empty(env(CONFIG_PATH_ENV_VAR)) {
        Some(path) => {
            let path = PathBuf::from(path);
            info!(path = %path.display(), "loading_config");
            load_json_file::<NoclipConfig>(&path).map_err(SandboxError::Config)?
        }
        None => NoclipConfig::default(),
    };
    if parse_flag(DEBUG_BYPASS_ENV_VAR, env(DEBUG_BYPASS_ENV_VAR))? {
        config.debug_bypass_access_control = true;
    }

    let script = match non_empty(env(SCRIPT_PATH_ENV_VAR)) {
        Some(path) => {
            let path = PathBuf::from(path);
            info!(path = %path.display(), "loading_script");
            InputScript::load(&path).map_err(SandboxError::Script)?
        }
        None => {
            info!("using_demo_script");
            InputScript::demo()
        }
    };

    let identity =
        non_empty(env(IDENTITY_ENV_VAR)).unwrap_or_else(|| DEFAULT_IDENTITY.to_string());
    let in_vr = parse_flag(VR_ENV_VAR, env(VR_ENV_VAR))?;
    let mut avatar = SimulatedAvatar::new(identity, in_vr, SPAWN_POINT);
    if in_vr {
        avatar = avatar.with_play_space_offset(VR_PLAY_SPACE_OFFSET);
    }

    info!(
        identity = avatar.identity(),
        in_vr,
        trigger = ?config.trigger_method,
        restrict_to_allowlist = config.restrict_to_allowlist,
        debug_bypass = config.debug_bypass_access_control,
        "sandbox_wired"
    );

    Ok(AppWiring {
        config,
        script,
        avatar,
        loop_config: LoopConfig::default(),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_flag(var: &'static str, raw: Option<String>) -> Result<bool, SandboxError> {
    let Some(value) = non_empty(raw) else {
        return Ok(false);
    };
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(SandboxError::InvalidFlag { var, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use noclip::{AvatarHost, TriggerMethod};
    use std::collections::HashMap;
    use std::io::Write;

    fn wire(vars: &[(&str, &str)]) -> Result<AppWiring, SandboxError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        wire_from(|var| vars.get(var).cloned())
    }

    #[test]
    fn defaults_use_demo_script_and_desktop_avatar() {
        let app = wire(&[]).expect("wiring");

        assert_eq!(app.config, NoclipConfig::default());
        assert_eq!(app.script, InputScript::demo());
        assert_eq!(app.avatar.identity(), DEFAULT_IDENTITY);
        assert!(!app.avatar.is_in_vr());
        assert_eq!(app.avatar.position(), SPAWN_POINT);
    }

    #[test]
    fn env_overrides_identity_vr_and_bypass() {
        let app = wire(&[
            (IDENTITY_ENV_VAR, " ace "),
            (VR_ENV_VAR, "TRUE"),
            (DEBUG_BYPASS_ENV_VAR, "1"),
        ])
        .expect("wiring");

        assert_eq!(app.avatar.identity(), "ace");
        assert!(app.avatar.is_in_vr());
        assert!(app.config.debug_bypass_access_control);
    }

    #[test]
    fn config_file_is_loaded_from_env_path() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{ "trigger_method": "quintuple_activation" }}"#).expect("write");
        let path = file.path().to_string_lossy().to_string();

        let app = wire(&[(CONFIG_PATH_ENV_VAR, path.as_str())]).expect("wiring");
        assert_eq!(app.config.trigger_method, TriggerMethod::QuintupleActivation);
    }

    #[test]
    fn bad_script_path_is_a_script_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("missing.json").to_string_lossy().to_string();

        let result = wire(&[(SCRIPT_PATH_ENV_VAR, path.as_str())]);
        assert!(matches!(result, Err(SandboxError::Script(LoadError::ReadFile { .. }))));
    }

    #[test]
    fn unparseable_flag_is_rejected() {
        let result = wire(&[(VR_ENV_VAR, "sometimes")]);
        assert!(matches!(
            result,
            Err(SandboxError::InvalidFlag { var: VR_ENV_VAR, .. })
        ));
    }
}
