mod args;
mod commands;

pub use args::{Cli, Commands, ConfigSubcommands};
pub use commands::execute;
