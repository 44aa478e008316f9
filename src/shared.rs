pub mod types;
pub mod settings;
pub mod error;

pub use error::{AppError, AppResult};

/// Display text every engine falls back to on a recovered failure.
pub const ERROR_DISPLAY: &str = "Error";
