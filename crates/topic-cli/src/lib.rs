//! Topic extraction CLI library exports.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations
//! - `settings`: Layered configuration loading

pub mod cli;
pub mod commands;
pub mod settings;

pub use cli::{Cli, Commands, ExtractArgs};
pub use commands::{build_engine, init_logging, read_documents, run, save_snapshot};
pub use settings::Settings;
