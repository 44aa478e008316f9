pub mod features;
pub mod input;
