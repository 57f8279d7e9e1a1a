//! Command Registry Module
//!
//! Maps command names to their description and accepted argument count, and
//! turns a whitespace-separated command line into a [`Command`] the daemon can
//! run. Slots are numbered from 1 on the wire and from 0 inside the daemon.

use dispmodes::DisplayModesError;
use dispmodes::config::NUM_SLOTS;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, warn};

/// Result type for command execution
pub type CommandResult = Result<String, CommandError>;

/// Error type for command handling
#[derive(Debug)]
pub enum CommandError {
    InvalidArguments(String),
    UnknownCommand(String),
    ExecutionError(DisplayModesError),
    EmptyCommand,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::InvalidArguments(msg) => write!(f, "Invalid arguments: {}", msg),
            CommandError::UnknownCommand(cmd) => write!(f, "Unknown command: {}", cmd),
            CommandError::ExecutionError(err) => write!(f, "Execution error: {}", err),
            CommandError::EmptyCommand => write!(f, "Empty command"),
        }
    }
}

impl std::error::Error for CommandError {}

impl From<DisplayModesError> for CommandError {
    fn from(err: DisplayModesError) -> Self {
        match err {
            DisplayModesError::InvalidArguments(msg) => CommandError::InvalidArguments(msg),
            other => CommandError::ExecutionError(other),
        }
    }
}

/// A parsed request
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    ListCommands,
    ListLayouts,
    Menu,
    ActiveLayout,
    Summary { slot: usize },
    SaveLayout { slot: usize, name: Option<String> },
    DeleteLayout { slot: usize },
    RenameLayout { slot: usize, name: String },
    ApplyLayout { slot: usize, persistent: Option<bool> },
}

type Builder = fn(&[&str]) -> Result<Command, CommandError>;

/// Registration record of one command
pub struct CommandSpec {
    pub description: String,
    pub min_args: usize,
    /// `None` = any number of trailing arguments
    pub max_args: Option<usize>,
    build: Builder,
}

impl CommandSpec {
    pub fn new(description: &str, min_args: usize, max_args: Option<usize>, build: Builder) -> Self {
        Self {
            description: description.to_string(),
            min_args,
            max_args,
            build,
        }
    }

    fn accepts(&self, count: usize) -> bool {
        count >= self.min_args && self.max_args.is_none_or(|max| count <= max)
    }

    fn usage(&self) -> String {
        match self.max_args {
            Some(max) if max == self.min_args => format!("{}", max),
            Some(max) => format!("{} to {}", self.min_args, max),
            None => format!("at least {}", self.min_args),
        }
    }
}

/// Parses a user-facing 1-based slot number into a 0-based index
///
/// # Arguments
/// * `arg` - The slot argument as typed by the user
///
/// # Returns
/// * `Result<usize, CommandError>` - The 0-based slot, or `InvalidArguments`
pub fn parse_slot(arg: &str) -> Result<usize, CommandError> {
    match arg.parse::<usize>() {
        Ok(n) if (1..=NUM_SLOTS).contains(&n) => Ok(n - 1),
        _ => Err(CommandError::InvalidArguments(format!(
            "slot must be a number from 1 to {}, got '{}'",
            NUM_SLOTS, arg
        ))),
    }
}

/// Joins trailing arguments back into a name
pub fn join_name(args: &[&str]) -> Option<String> {
    if args.is_empty() { None } else { Some(args.join(" ")) }
}

#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, CommandSpec>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command
    ///
    /// # Arguments
    /// * `name` - The name clients send
    /// * `spec` - Description, accepted argument count and parser
    pub fn register<S: Into<String>>(&mut self, name: S, spec: CommandSpec) {
        let name = name.into();
        info!("Registering command: {}", name);
        self.commands.insert(name, spec);
    }

    /// Parses a command line, validating the command name and argument count
    ///
    /// # Arguments
    /// * `cmdline` - Whitespace-separated command and arguments
    ///
    /// # Returns
    /// * `Result<Command, CommandError>` - The command to execute
    pub fn parse(&self, cmdline: &str) -> Result<Command, CommandError> {
        debug!("Handling command: '{}'", cmdline);

        let parts: Vec<&str> = cmdline.split_whitespace().collect();
        let Some((cmd, args)) = parts.split_first() else {
            warn!("Received empty command");
            return Err(CommandError::EmptyCommand);
        };

        let Some(spec) = self.commands.get(*cmd) else {
            warn!("Unknown command: {}", cmd);
            return Err(CommandError::UnknownCommand(cmd.to_string()));
        };

        if !spec.accepts(args.len()) {
            return Err(CommandError::InvalidArguments(format!(
                "{} expects {} arguments, got {}",
                cmd,
                spec.usage(),
                args.len()
            )));
        }

        (spec.build)(args)
    }

    /// All registered commands with their descriptions, sorted by name
    pub fn list_commands(&self) -> String {
        let mut commands: Vec<_> = self.commands.iter().collect();
        commands.sort_by_key(|(name, _)| *name);

        commands
            .iter()
            .map(|(name, spec)| format!("{}: {}", name, spec.description))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
