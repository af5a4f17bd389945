//! Utility functions shared across the crate

pub mod file;
pub mod otlp;
pub mod time;
