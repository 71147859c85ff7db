use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SessionCommand {
    /// `None` toggles.
    Noclip { enabled: Option<bool> },
    Speed { max_speed: f32 },
    AllowAdd { identity: String },
    AllowRemove { identity: String },
    AllowClear,
    AllowSelf,
    Restrict { restricted: bool },
    /// Degrees; positive pitch looks down.
    Look { yaw_degrees: f32, pitch_degrees: f32 },
    Sit,
    Stand,
    Respawn,
    Leave,
    Status,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ParsedCommand {
    Help,
    Session(SessionCommand),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CommandParseError {
    reason: String,
    usage: String,
}

type ParseFn = fn(&[String]) -> Result<ParsedCommand, CommandParseError>;

pub(crate) struct CommandSpec {
    name: String,
    help: String,
    arg_schema: String,
    parse: ParseFn,
}

pub(crate) struct ConsoleCommandRegistry {
    specs: Vec<CommandSpec>,
    lookup_by_lower_name: HashMap<String, usize>,
}

impl ConsoleCommandRegistry {
    pub(crate) fn new() -> Self {
        Self {
            specs: Vec::new(),
            lookup_by_lower_name: HashMap::new(),
        }
    }

    pub(crate) fn with_sandbox_builtins() -> Self {
        let builtins: [(&str, &str, &str, ParseFn); 14] = [
            ("help", "List commands", "", parse_help_command),
            ("noclip", "Toggle or set noclip", "[on|off]", parse_noclip_command),
            ("noclip_speed", "Set max noclip speed", "<speed:f32>", parse_speed_command),
            ("allow_add", "Add identity to allowlist", "<identity:string>", parse_allow_add_command),
            (
                "allow_remove",
                "Remove identity from allowlist",
                "<identity:string>",
                parse_allow_remove_command,
            ),
            ("allow_clear", "Clear allowlist", "", parse_allow_clear_command),
            ("allow_self", "Add local identity to allowlist", "", parse_allow_self_command),
            ("restrict", "Restrict noclip to allowlist", "<on|off>", parse_restrict_command),
            (
                "look",
                "Set avatar yaw and head pitch",
                "<yaw_deg:f32> <pitch_deg:f32>",
                parse_look_command,
            ),
            ("sit", "Seat the avatar", "", parse_sit_command),
            ("stand", "Unseat the avatar", "", parse_stand_command),
            ("respawn", "Respawn the avatar", "", parse_respawn_command),
            ("leave", "Disconnect the avatar and stop", "", parse_leave_command),
            ("status", "Print noclip session state", "", parse_status_command),
        ];

        let mut registry = Self::new();
        for (name, help, arg_schema, parse) in builtins {
            registry
                .register(name, help, arg_schema, parse)
                .expect("built-in command registration should not fail");
        }
        registry
    }

    pub(crate) fn register(
        &mut self,
        name: impl Into<String>,
        help: impl Into<String>,
        arg_schema: impl Into<String>,
        parse: ParseFn,
    ) -> Result<(), String> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err("command name cannot be empty".to_string());
        }
        let lower = name.to_ascii_lowercase();
        if self.lookup_by_lower_name.contains_key(&lower) {
            return Err(format!("duplicate command registration: {name}"));
        }

        self.specs.push(CommandSpec {
            name,
            help: help.into(),
            arg_schema: arg_schema.into(),
            parse,
        });
        self.lookup_by_lower_name
            .insert(lower, self.specs.len() - 1);
        Ok(())
    }

    pub(crate) fn lookup(&self, input_name: &str) -> Option<&CommandSpec> {
        let lower = input_name.to_ascii_lowercase();
        let index = self.lookup_by_lower_name.get(&lower)?;
        self.specs.get(*index)
    }

    pub(crate) fn iter_specs_in_order(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.specs.iter().map(|spec| {
            (
                spec.name.as_str(),
                spec.help.as_str(),
                spec.arg_schema.as_str(),
            )
        })
    }
}

/// Parses console lines into session commands; help and errors become output lines.
pub(crate) struct ConsoleCommandProcessor {
    registry: ConsoleCommandRegistry,
    output_lines: Vec<String>,
}

impl Default for ConsoleCommandProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleCommandProcessor {
    pub(crate) fn new() -> Self {
        Self {
            registry: ConsoleCommandRegistry::with_sandbox_builtins(),
            output_lines: Vec::new(),
        }
    }

    pub(crate) fn process_line(&mut self, raw_line: &str) -> Option<SessionCommand> {
        let trimmed = raw_line.trim();
        if trimmed.is_empty() {
            return None;
        }

        let tokens = match tokenize_line(trimmed) {
            Ok(tokens) => tokens,
            Err(reason) => {
                self.output_lines
                    .push(format!("error: {reason}. usage: help"));
                return None;
            }
        };
        let (command_name, args) = tokens.split_first()?;
        let Some(spec) = self.registry.lookup(command_name) else {
            self.output_lines.push(format!(
                "error: unknown command '{}'. try: help",
                command_name
            ));
            return None;
        };

        match (spec.parse)(args) {
            Ok(ParsedCommand::Help) => {
                let lines: Vec<String> = self
                    .registry
                    .iter_specs_in_order()
                    .map(|(name, help, arg_schema)| {
                        if arg_schema.is_empty() {
                            format!("{name} - {help}")
                        } else {
                            format!("{name} {arg_schema} - {help}")
                        }
                    })
                    .collect();
                self.output_lines.extend(lines);
                None
            }
            Ok(ParsedCommand::Session(command)) => Some(command),
            Err(error) => {
                self.output_lines
                    .push(format!("error: {}. usage: {}", error.reason, error.usage));
                None
            }
        }
    }

    pub(crate) fn drain_output_into(&mut self, out: &mut Vec<String>) {
        out.append(&mut self.output_lines);
    }
}

fn tokenize_line(line: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut seen_token_content = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                seen_token_content = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if seen_token_content {
                    tokens.push(std::mem::take(&mut current));
                    seen_token_content = false;
                }
            }
            _ => {
                current.push(ch);
                seen_token_content = true;
            }
        }
    }

    if in_quotes {
        return Err("unterminated quoted string".to_string());
    }
    if seen_token_content {
        tokens.push(current);
    }

    Ok(tokens)
}

fn parse_help_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "help")?;
    Ok(ParsedCommand::Help)
}

fn parse_noclip_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    let enabled = match args {
        [] => None,
        [state] => Some(parse_on_off(state, "noclip [on|off]")?),
        _ => {
            return Err(CommandParseError {
                reason: "expected at most one argument [on|off]".to_string(),
                usage: "noclip [on|off]".to_string(),
            });
        }
    };
    Ok(ParsedCommand::Session(SessionCommand::Noclip { enabled }))
}

fn parse_speed_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    let [raw] = args else {
        return Err(CommandParseError {
            reason: "expected exactly one argument <speed>".to_string(),
            usage: "noclip_speed <speed>".to_string(),
        });
    };
    let max_speed = raw
        .parse::<f32>()
        .ok()
        .filter(|speed| speed.is_finite() && *speed >= 0.0)
        .ok_or_else(|| CommandParseError {
            reason: format!("invalid speed '{raw}' (expected non-negative f32)"),
            usage: "noclip_speed <speed>".to_string(),
        })?;
    Ok(ParsedCommand::Session(SessionCommand::Speed { max_speed }))
}

fn parse_allow_add_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    let identity = require_identity(args, "allow_add <identity>")?;
    Ok(ParsedCommand::Session(SessionCommand::AllowAdd { identity }))
}

fn parse_allow_remove_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    let identity = require_identity(args, "allow_remove <identity>")?;
    Ok(ParsedCommand::Session(SessionCommand::AllowRemove {
        identity,
    }))
}

fn parse_allow_clear_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "allow_clear")?;
    Ok(ParsedCommand::Session(SessionCommand::AllowClear))
}

fn parse_allow_self_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "allow_self")?;
    Ok(ParsedCommand::Session(SessionCommand::AllowSelf))
}

fn parse_restrict_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    let [state] = args else {
        return Err(CommandParseError {
            reason: "expected exactly one argument <on|off>".to_string(),
            usage: "restrict <on|off>".to_string(),
        });
    };
    let restricted = parse_on_off(state, "restrict <on|off>")?;
    Ok(ParsedCommand::Session(SessionCommand::Restrict {
        restricted,
    }))
}

fn parse_look_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    const USAGE: &str = "look <yaw_deg> <pitch_deg>";
    let [yaw, pitch] = args else {
        return Err(CommandParseError {
            reason: "expected exactly two arguments <yaw_deg> <pitch_deg>".to_string(),
            usage: USAGE.to_string(),
        });
    };
    let parse_angle = |raw: &String| {
        raw.parse::<f32>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| CommandParseError {
                reason: format!("invalid angle '{raw}' (expected f32 degrees)"),
                usage: USAGE.to_string(),
            })
    };
    Ok(ParsedCommand::Session(SessionCommand::Look {
        yaw_degrees: parse_angle(yaw)?,
        pitch_degrees: parse_angle(pitch)?,
    }))
}

fn parse_sit_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "sit")?;
    Ok(ParsedCommand::Session(SessionCommand::Sit))
}

fn parse_stand_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "stand")?;
    Ok(ParsedCommand::Session(SessionCommand::Stand))
}

fn parse_respawn_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "respawn")?;
    Ok(ParsedCommand::Session(SessionCommand::Respawn))
}

fn parse_leave_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "leave")?;
    Ok(ParsedCommand::Session(SessionCommand::Leave))
}

fn parse_status_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "status")?;
    Ok(ParsedCommand::Session(SessionCommand::Status))
}

fn parse_on_off(raw: &str, usage: &str) -> Result<bool, CommandParseError> {
    match raw.to_ascii_lowercase().as_str() {
        "on" | "true" | "1" => Ok(true),
        "off" | "false" | "0" => Ok(false),
        _ => Err(CommandParseError {
            reason: format!("invalid state '{raw}' (expected on|off)"),
            usage: usage.to_string(),
        }),
    }
}

fn require_identity(args: &[String], usage: &str) -> Result<String, CommandParseError> {
    match args {
        [identity] if !identity.is_empty() => Ok(identity.clone()),
        _ => Err(CommandParseError {
            reason: "expected exactly one non-empty argument <identity>".to_string(),
            usage: usage.to_string(),
        }),
    }
}

fn require_no_args(args: &[String], usage: &str) -> Result<(), CommandParseError> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(CommandParseError {
            reason: "unexpected extra arguments".to_string(),
            usage: usage.to_string(),
        })
    }
}
