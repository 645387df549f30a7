//! CLI command implementations

pub mod devices;
pub mod error;
pub mod export;
pub mod validate;

pub use devices::DevicesCommand;
pub use error::CliError;
pub use export::{run_pipeline, Cli, Commands, ExportCommand, ExportReport};
pub use validate::ValidateCommand;
