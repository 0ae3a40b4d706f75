pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{
    CleanArgs, CliArgs, Commands, DetectArgs, DiagnoseArgs, MonitorArgs, RebuildArgs, ValidateArgs,
};
pub use output::{OutputFormat, OutputFormatter};
