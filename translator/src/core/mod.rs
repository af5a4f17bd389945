//! Core application infrastructure

pub mod cli;
pub mod config;
pub mod constants;

pub use crate::app::CoreApp;
pub use cli::{CliConfig, Commands, TranslateArgs};
pub use config::{AppConfig, DatasetConfig, OutputConfig};
