pub mod args;
pub mod types;

pub use args::{BatchArgs, Cli, Commands};
pub use types::{CaseArg, OutputFormat};
