use super::command_registry::CommandResult;

/// Format a command result into the reply sent back to the client
///
/// # Arguments
/// * `result` - The command result to format
///
/// # Returns
/// * `String` - The success message, or the error prefixed with `"Error: "`
pub fn format_response(result: CommandResult) -> String {
    match result {
        Ok(msg) => msg,
        Err(err) => format!("Error: {}", err),
    }
}
