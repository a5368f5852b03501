pub mod config;
pub mod types;

pub use config::SeatgridConfig;
pub use types::*;
