pub mod error;
pub mod probe;
pub mod sample;

pub use error::{CliError, Result};
pub use probe::{ProbeConfig, ProbeServer};
