//! Schema module - Decode options and metadata types for PPM containers.

mod config;
mod metadata;

pub use config::*;
pub use metadata::*;
