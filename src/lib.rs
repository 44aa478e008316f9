//! Calculator, unit converter and currency converter engines.
//!
//! Each engine is a plain state struct driven by intents; [`core::features::Session`]
//! owns one of each and routes [`core::input::InputEvent`]s to them.

pub mod core;
pub mod logging;
pub mod shared;

pub use crate::core::features::{AppFeature, FeatureSnapshot, FeatureSync, Intent, Mode, Session};
pub use crate::shared::{AppError, AppResult};
