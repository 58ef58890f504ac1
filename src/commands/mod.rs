//! Command dispatch and handlers.

pub mod check;
pub mod publish;

use crate::cli::Command;

/// Dispatch a parsed command to its handler.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch(command: &Command) -> Result<(), String> {
    match command {
        Command::Publish(args) => publish::run(args),
        Command::Check(args) => check::run(&args.posts_directory),
    }
}
