pub mod assignments;
pub mod demand;
pub mod import;
pub mod optimize;
pub mod select;

/// Output format shared by the reporting commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    Text,
    Json,
}
