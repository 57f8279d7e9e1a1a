use super::command_registry::CommandRegistry;
use super::{commands, response_handler};
use async_std::channel::Receiver;
use dispmodes::LayoutService;
use dispmodes::display::dbus::DisplayConfigService;
use futures::FutureExt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn};
use zeromq::prelude::*;
use zeromq::{RepSocket, ZmqMessage};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Maximum message size (1MB)
pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;
/// Maximum retry attempts for sending replies
const MAX_SEND_RETRIES: usize = 3;

/// Main daemon server structure that handles ZeroMQ communication
pub struct DaemonServer {
    socket: RepSocket,
    socket_path: PathBuf,
    registry: CommandRegistry,
}

/// Extract command string from ZeroMQ message with validation
///
/// # Arguments
/// * `message` - The ZeroMQ message to extract from
///
/// # Returns
/// * `Result<String, String>` - The command line, or the reason it was rejected
pub fn extract_command(message: &ZmqMessage) -> Result<String, String> {
    let frame = message
        .get(0)
        .ok_or_else(|| "Received empty message".to_string())?;

    if frame.len() > MAX_MESSAGE_SIZE {
        warn!("Message too large: {} bytes", frame.len());
        return Err(format!(
            "Message too large: {} bytes (max: {})",
            frame.len(),
            MAX_MESSAGE_SIZE
        ));
    }

    String::from_utf8(frame.to_vec()).map_err(|e| format!("Invalid UTF-8 message: {}", e))
}

impl DaemonServer {
    /// Create a new daemon server bound at `ipc://<socket_path>`
    ///
    /// A socket file left behind by an earlier run is removed first.
    ///
    /// # Arguments
    /// * `socket_path` - Filesystem path of the IPC socket
    /// * `registry` - Commands the server accepts
    ///
    /// # Returns
    /// * `Result<DaemonServer, Box<dyn std::error::Error>>` - The bound server or an error
    pub async fn bind(socket_path: &Path, registry: CommandRegistry) -> Result<Self, Box<dyn std::error::Error>> {
        let _ = fs::remove_file(socket_path);
        if let Some(parent) = socket_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut socket = RepSocket::new();
        let endpoint = format!("ipc://{}", socket_path.display());
        socket.bind(&endpoint).await?;

        #[cfg(unix)]
        {
            if let Ok(metadata) = fs::metadata(socket_path) {
                let mut perms = metadata.permissions();
                perms.set_mode(0o660); // rw-rw----
                let _ = fs::set_permissions(socket_path, perms);
            }
        }

        info!("Daemon running on {}", endpoint);

        Ok(DaemonServer {
            socket,
            socket_path: socket_path.to_path_buf(),
            registry,
        })
    }

    /// Removes the socket file
    pub async fn shutdown(self) -> Result<(), Box<dyn std::error::Error>> {
        info!("Shutting down daemon server");
        let _ = fs::remove_file(&self.socket_path);
        Ok(())
    }

    /// Run the daemon server loop, processing incoming commands
    ///
    /// # Arguments
    /// * `service` - Layout service the commands run against
    /// * `shutdown_rx` - Receiver for shutdown signal
    ///
    /// # Returns
    /// * `Result<(), Box<dyn std::error::Error>>` - Ok once shutdown was requested
    pub async fn run<S: DisplayConfigService>(
        &mut self,
        service: &LayoutService<S>,
        shutdown_rx: Receiver<()>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        loop {
            futures::select! {
                msg = self.socket.recv().fuse() => {
                    match msg {
                        Ok(cmdline) => {
                            if let Err(e) = self.process_message(cmdline, service).await {
                                error!("Error processing message: {:?}", e);
                            }
                        }
                        Err(e) => {
                            error!("Error receiving message: {:?}", e);
                        }
                    }
                }
                _ = shutdown_rx.recv().fuse() => {
                    info!("Shutdown signal received, stopping server loop");
                    break;
                }
            }
        }
        Ok(())
    }

    /// Parse, execute and answer one received message
    async fn process_message<S: DisplayConfigService>(
        &mut self,
        cmdline: ZmqMessage,
        service: &LayoutService<S>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let cmdline = match extract_command(&cmdline) {
            Ok(s) => s,
            Err(e) => {
                self.send_reply(format!("Error: {}", e)).await?;
                return Ok(());
            }
        };

        let result = match self.registry.parse(&cmdline) {
            Ok(command) => commands::execute(service, &self.registry, command).await,
            Err(e) => Err(e),
        };

        let reply = response_handler::format_response(result);
        self.send_reply(reply).await
    }

    /// Send a reply to the client with retry logic
    ///
    /// # Arguments
    /// * `reply` - The reply string to send
    ///
    /// # Returns
    /// * `Result<(), Box<dyn std::error::Error>>` - Ok if send succeeds within
    ///   `MAX_SEND_RETRIES` attempts
    async fn send_reply(&mut self, reply: String) -> Result<(), Box<dyn std::error::Error>> {
        let mut attempt = 0;
        loop {
            match self.socket.send(ZmqMessage::from(reply.clone())).await {
                Ok(_) => {
                    if attempt > 0 {
                        info!("Reply sent successfully on attempt {}", attempt + 1);
                    }
                    return Ok(());
                }
                Err(e) if attempt + 1 < MAX_SEND_RETRIES => {
                    warn!("Failed to send reply (attempt {}): {:?}", attempt + 1, e);
                    async_std::task::sleep(Duration::from_millis(100 * (attempt as u64 + 1))).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!("Failed to send reply after {} attempts: {:?}", MAX_SEND_RETRIES, e);
                    return Err(Box::new(e));
                }
            }
        }
    }
}
