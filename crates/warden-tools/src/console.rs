//! Line-oriented developer console.
//!
//! Each submitted line is echoed to the output log, remembered in a bounded
//! history and either answered by a built-in (`help`, `history`) or handed
//! to a [`CommandHandler`].

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use tracing::{debug, warn};

/// Default maximum history entries.
pub const DEFAULT_HISTORY_SIZE: usize = 100;

/// Default maximum output lines.
pub const DEFAULT_OUTPUT_SIZE: usize = 1000;

/// Severity of an output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputLevel {
    /// Plain output
    #[default]
    Info,
    /// The command did what was asked
    Success,
    /// Worth a look, not a failure
    Warning,
    /// The command failed
    Error,
    /// Echo of the submitted line
    Command,
}

impl OutputLevel {
    fn marker(self) -> &'static str {
        match self {
            OutputLevel::Info | OutputLevel::Command => "",
            OutputLevel::Success => "[ok] ",
            OutputLevel::Warning => "[warn] ",
            OutputLevel::Error => "[error] ",
        }
    }
}

/// One line in the output log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    /// Text without marker or stamp
    pub text: String,
    /// Severity
    pub level: OutputLevel,
    /// Simulation clock when the line was logged, if stamping is on
    pub timestamp: Option<String>,
}

impl OutputLine {
    fn new(text: impl Into<String>, level: OutputLevel) -> Self {
        Self {
            text: text.into(),
            level,
            timestamp: None,
        }
    }

    /// Info line.
    #[must_use]
    pub fn info(text: impl Into<String>) -> Self {
        Self::new(text, OutputLevel::Info)
    }

    /// Success line.
    #[must_use]
    pub fn success(text: impl Into<String>) -> Self {
        Self::new(text, OutputLevel::Success)
    }

    /// Warning line.
    #[must_use]
    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(text, OutputLevel::Warning)
    }

    /// Error line.
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self::new(text, OutputLevel::Error)
    }
}

impl fmt::Display for OutputLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(stamp) = &self.timestamp {
            write!(f, "[{stamp}] ")?;
        }
        write!(f, "{}{}", self.level.marker(), self.text)
    }
}

/// A command the console can describe in `help`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDef {
    /// Name typed at the prompt
    pub name: String,
    /// One-line summary
    pub description: String,
    /// Argument syntax
    pub usage: String,
}

impl CommandDef {
    /// Describes a command.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        usage: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            usage: usage.into(),
        }
    }
}

/// Outcome of one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Lines appended to the log
    pub output: Vec<OutputLine>,
    /// False when the command failed
    pub success: bool,
}

impl CommandResult {
    /// Successful result.
    #[must_use]
    pub fn ok(output: Vec<OutputLine>) -> Self {
        Self {
            output,
            success: true,
        }
    }

    /// Failed result with a single error line.
    #[must_use]
    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            output: vec![OutputLine::error(msg)],
            success: false,
        }
    }

    /// Result whose success is decided by the absence of error lines.
    #[must_use]
    pub fn with_lines(lines: Vec<OutputLine>) -> Self {
        let success = lines.iter().all(|line| line.level != OutputLevel::Error);
        Self {
            output: lines,
            success,
        }
    }
}

/// Executes commands the console does not handle itself.
pub trait CommandHandler {
    /// Runs `command` with `args`, or returns `None` if it is not recognized.
    fn handle(&mut self, command: &str, args: &[&str]) -> Option<CommandResult>;
}

/// Console settings, read from the `[console]` table of a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Maximum remembered command lines
    pub max_history: usize,
    /// Maximum output lines kept
    pub max_output: usize,
    /// Stamp lines with the simulation clock
    pub show_timestamps: bool,
    /// Prefix of echoed command lines
    pub command_prefix: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_HISTORY_SIZE,
            max_output: DEFAULT_OUTPUT_SIZE,
            show_timestamps: false,
            command_prefix: "> ".to_string(),
        }
    }
}

/// Developer console state.
#[derive(Debug)]
pub struct DevConsole {
    config: ConsoleConfig,
    /// Newest first
    history: VecDeque<String>,
    output: VecDeque<OutputLine>,
    commands: Vec<CommandDef>,
    clock: Option<String>,
}

impl Default for DevConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl DevConsole {
    /// Console with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ConsoleConfig::default())
    }

    /// Console with the given settings. `help` and `history` are always known.
    #[must_use]
    pub fn with_config(config: ConsoleConfig) -> Self {
        let mut console = Self {
            config,
            history: VecDeque::new(),
            output: VecDeque::new(),
            commands: Vec::new(),
            clock: None,
        };
        console.register_commands([
            CommandDef::new("help", "List commands or describe one", "help [command]"),
            CommandDef::new("history", "Show submitted commands", "history"),
        ]);
        console
    }

    /// Registers commands for `help`. Names already known are ignored.
    pub fn register_commands(&mut self, defs: impl IntoIterator<Item = CommandDef>) {
        for def in defs {
            if self.commands.iter().all(|known| known.name != def.name) {
                self.commands.push(def);
            }
        }
    }

    /// Sets the stamp put on subsequent lines when timestamps are shown.
    pub fn set_clock(&mut self, stamp: impl Into<String>) {
        self.clock = Some(stamp.into());
    }

    /// Runs one command line and appends the echo and its output to the log.
    pub fn submit(&mut self, line: &str, handler: &mut impl CommandHandler) -> CommandResult {
        let line = line.trim();
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return CommandResult::ok(Vec::new());
        };
        let args: Vec<&str> = words.collect();

        let echo = format!("{}{line}", self.config.command_prefix);
        self.push(OutputLine::new(echo, OutputLevel::Command));
        self.remember(line);

        let result = match command {
            "help" => self.help(&args),
            "history" => self.list_history(),
            _ => match handler.handle(command, &args) {
                Some(result) => {
                    debug!(command, success = result.success, "console command executed");
                    result
                },
                None => {
                    warn!(command, "unknown console command");
                    CommandResult::err(format!(
                        "Unknown command: {command}. Type 'help' for commands."
                    ))
                },
            },
        };

        for output in &result.output {
            self.push(output.clone());
        }
        result
    }

    fn help(&self, args: &[&str]) -> CommandResult {
        match args {
            [] => CommandResult::ok(
                self.commands
                    .iter()
                    .map(|def| OutputLine::info(format!("{} - {}", def.name, def.description)))
                    .collect(),
            ),
            [name] => match self.commands.iter().find(|def| def.name == *name) {
                Some(def) => CommandResult::ok(vec![
                    OutputLine::info(format!("{}: {}", def.name, def.description)),
                    OutputLine::info(format!("Usage: {}", def.usage)),
                ]),
                None => CommandResult::err(format!("Unknown command: {name}")),
            },
            _ => CommandResult::err("Usage: help [command]"),
        }
    }

    fn list_history(&self) -> CommandResult {
        // Oldest first, the way it was typed
        CommandResult::ok(
            self.history
                .iter()
                .rev()
                .enumerate()
                .map(|(i, line)| OutputLine::info(format!("{}: {line}", i + 1)))
                .collect(),
        )
    }

    fn remember(&mut self, line: &str) {
        if self.history.front().is_some_and(|last| last == line) {
            return;
        }
        self.history.push_front(line.to_string());
        self.history.truncate(self.config.max_history);
    }

    fn push(&mut self, mut line: OutputLine) {
        if self.config.show_timestamps {
            line.timestamp.clone_from(&self.clock);
        }
        self.output.push_back(line);
        while self.output.len() > self.config.max_output {
            self.output.pop_front();
        }
    }

    /// Submitted lines, newest first.
    #[must_use]
    pub fn history(&self) -> &VecDeque<String> {
        &self.history
    }

    /// Output log, oldest first.
    #[must_use]
    pub fn output(&self) -> &VecDeque<OutputLine> {
        &self.output
    }
}
