#![cfg(feature = "cli")]

use clap::{Parser, Subcommand, ValueEnum};
use dispmodes::config::DEFAULT_SOCKET_PATH;
use dispmodes::utils::tracing::setup_console_tracing;
use tracing::debug;
use zeromq::prelude::*;
use zeromq::{ReqSocket, ZmqMessage};

/// Global CLI arguments
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Daemon socket path
    #[arg(long, default_value = DEFAULT_SOCKET_PATH)]
    socket: String,

    /// Enable terminal logging
    #[arg(short, long)]
    log: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Method {
    /// Apply and keep without asking
    Persistent,
    /// Apply with the compositor's confirmation prompt
    Temporary,
}

/// List of available subcommands; slots are numbered 1 to 5
#[derive(Subcommand, Debug)]
#[command(rename_all = "camelCase")]
enum Commands {
    ListCommands,
    ListLayouts,
    Menu,
    ActiveLayout,
    Summary {
        slot: u8,
    },
    SaveLayout {
        slot: u8,
        /// Layout name; keeps the existing name when omitted
        name: Vec<String>,
    },
    DeleteLayout {
        slot: u8,
    },
    RenameLayout {
        slot: u8,
        #[arg(required = true)]
        name: Vec<String>,
    },
    ApplyLayout {
        slot: u8,
        #[arg(value_enum)]
        method: Option<Method>,
    },
}

impl Commands {
    /// The command line understood by the daemon
    fn to_request(&self) -> String {
        match self {
            Commands::ListCommands => "listCommands".to_string(),
            Commands::ListLayouts => "listLayouts".to_string(),
            Commands::Menu => "menu".to_string(),
            Commands::ActiveLayout => "activeLayout".to_string(),
            Commands::Summary { slot } => format!("summary {}", slot),
            Commands::SaveLayout { slot, name } if name.is_empty() => format!("saveLayout {}", slot),
            Commands::SaveLayout { slot, name } => format!("saveLayout {} {}", slot, name.join(" ")),
            Commands::DeleteLayout { slot } => format!("deleteLayout {}", slot),
            Commands::RenameLayout { slot, name } => format!("renameLayout {} {}", slot, name.join(" ")),
            Commands::ApplyLayout { slot, method: None } => format!("applyLayout {}", slot),
            Commands::ApplyLayout { slot, method: Some(Method::Persistent) } => {
                format!("applyLayout {} persistent", slot)
            }
            Commands::ApplyLayout { slot, method: Some(Method::Temporary) } => {
                format!("applyLayout {} temporary", slot)
            }
        }
    }
}

/// Entry point
#[async_std::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    if cli.log {
        setup_console_tracing();
    }

    if let Err(e) = handle_command(&cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    Ok(())
}

/// Sends the selected subcommand to the daemon and prints the reply
async fn handle_command(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let endpoint = format!("ipc://{}", cli.socket);
    let mut socket = ReqSocket::new();
    socket.connect(&endpoint).await?;

    let request = cli.command.to_request();
    debug!("Sending '{}' to {}", request, endpoint);
    socket.send(ZmqMessage::from(request)).await?;

    let reply = socket.recv().await?;
    let reply = match reply.get(0) {
        Some(frame) => String::from_utf8(frame.to_vec())?,
        None => String::new(),
    };

    println!("{}", reply);
    if reply.starts_with("Error: ") {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(args: &[&str]) -> String {
        let cli = Cli::try_parse_from(std::iter::once("dispmodes").chain(args.iter().copied())).unwrap();
        cli.command.to_request()
    }

    /// Test that subcommands map onto daemon command lines
    #[test]
    fn test_requests() {
        assert_eq!(request(&["listLayouts"]), "listLayouts");
        assert_eq!(request(&["saveLayout", "2"]), "saveLayout 2");
        assert_eq!(request(&["saveLayout", "2", "Home", "desk"]), "saveLayout 2 Home desk");
        assert_eq!(request(&["renameLayout", "1", "Office"]), "renameLayout 1 Office");
        assert_eq!(request(&["applyLayout", "4", "temporary"]), "applyLayout 4 temporary");
        assert_eq!(request(&["applyLayout", "4"]), "applyLayout 4");
    }

    #[test]
    fn test_socket_flag() {
        let cli = Cli::try_parse_from(["dispmodes", "--socket", "/run/d.sock", "menu"]).unwrap();
        assert_eq!(cli.socket, "/run/d.sock");
        assert!(Cli::try_parse_from(["dispmodes", "renameLayout", "1"]).is_err());
    }
}
