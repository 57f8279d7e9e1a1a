//! Commands Module
//!
//! Registers every command the daemon understands and runs parsed commands
//! against the layout service.

use super::command_registry::{
    Command, CommandError, CommandRegistry, CommandResult, CommandSpec, join_name, parse_slot,
};
use dispmodes::LayoutService;
use dispmodes::display::dbus::DisplayConfigService;
use dispmodes::layout::summarize;
use dispmodes::menu::UNSAVED_LABEL;

/// Initialize all available commands in the registry
pub fn init_commands() -> CommandRegistry {
    let mut registry = CommandRegistry::new();

    // Query commands
    registry.register(
        "listCommands",
        CommandSpec::new("List the commands the daemon accepts", 0, Some(0), |_| {
            Ok(Command::ListCommands)
        }),
    );

    registry.register(
        "listLayouts",
        CommandSpec::new("List the saved layouts with their slot numbers", 0, Some(0), |_| {
            Ok(Command::ListLayouts)
        }),
    );

    registry.register(
        "menu",
        CommandSpec::new("Describe the layout menu as JSON", 0, Some(0), |_| Ok(Command::Menu)),
    );

    registry.register(
        "activeLayout",
        CommandSpec::new("Show which saved layout is currently applied", 0, Some(0), |_| {
            Ok(Command::ActiveLayout)
        }),
    );

    registry.register(
        "summary",
        CommandSpec::new("Summarize the layout in <slot>", 1, Some(1), |args| {
            Ok(Command::Summary {
                slot: parse_slot(args[0])?,
            })
        }),
    );

    // Commands that change the store or the displays
    registry.register(
        "saveLayout",
        CommandSpec::new(
            "Save the current displays to <slot> [name]",
            1,
            None,
            |args| {
                Ok(Command::SaveLayout {
                    slot: parse_slot(args[0])?,
                    name: join_name(&args[1..]),
                })
            },
        ),
    );

    registry.register(
        "deleteLayout",
        CommandSpec::new("Delete the layout in <slot>", 1, Some(1), |args| {
            Ok(Command::DeleteLayout {
                slot: parse_slot(args[0])?,
            })
        }),
    );

    registry.register(
        "renameLayout",
        CommandSpec::new("Rename the layout in <slot> to <name>", 2, None, |args| {
            Ok(Command::RenameLayout {
                slot: parse_slot(args[0])?,
                name: args[1..].join(" "),
            })
        }),
    );

    registry.register(
        "applyLayout",
        CommandSpec::new(
            "Apply the layout in <slot> [persistent|temporary]",
            1,
            Some(2),
            |args| {
                let persistent = match args.get(1).copied() {
                    None => None,
                    Some("persistent") => Some(true),
                    Some("temporary") => Some(false),
                    Some(other) => {
                        return Err(CommandError::InvalidArguments(format!(
                            "Invalid apply method '{}'. Must be one of: persistent, temporary",
                            other
                        )));
                    }
                };
                Ok(Command::ApplyLayout {
                    slot: parse_slot(args[0])?,
                    persistent,
                })
            },
        ),
    );

    registry
}

/// Runs `command` against `service`
pub async fn execute<S: DisplayConfigService>(
    service: &LayoutService<S>,
    registry: &CommandRegistry,
    command: Command,
) -> CommandResult {
    match command {
        Command::ListCommands => Ok(registry.list_commands()),
        Command::ListLayouts => {
            let entries = service.list()?;
            if entries.is_empty() {
                return Ok(dispmodes::menu::EMPTY_LABEL.to_string());
            }
            Ok(entries
                .iter()
                .map(|e| {
                    format!(
                        "{}: {} [{}]",
                        e.slot + 1,
                        e.layout.display_name(),
                        summarize(&e.layout)
                    )
                })
                .collect::<Vec<_>>()
                .join("\n"))
        }
        Command::Menu => {
            let menu = service.menu().await?;
            serde_json::to_string_pretty(&menu)
                .map_err(|e| CommandError::ExecutionError(e.into()))
        }
        Command::ActiveLayout => Ok(match service.active().await? {
            Some(e) => format!("{}: {}", e.slot + 1, e.layout.display_name()),
            None => UNSAVED_LABEL.to_string(),
        }),
        Command::Summary { slot } => Ok(service.summary(slot)?),
        Command::SaveLayout { slot, name } => {
            let layout = service.save_current(slot, name.as_deref()).await?;
            Ok(format!("Saved '{}' to slot {}", layout.display_name(), slot + 1))
        }
        Command::DeleteLayout { slot } => {
            service.delete(slot).await?;
            Ok(format!("Deleted slot {}", slot + 1))
        }
        Command::RenameLayout { slot, name } => {
            service.rename(slot, &name)?;
            Ok(format!("Renaming slot {} to '{}'", slot + 1, name))
        }
        Command::ApplyLayout { slot, persistent } => {
            let layout = service.apply(slot, persistent).await?;
            Ok(format!("Applied '{}'", layout.display_name()))
        }
    }
}
