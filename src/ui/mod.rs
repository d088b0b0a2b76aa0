pub mod commands;
mod terminal;

pub use commands::Command;
pub use terminal::TerminalUI;
