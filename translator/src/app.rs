//! Core application

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::io::AsyncReadExt;

use crate::core::cli::{self, Commands, TranslateArgs};
use crate::core::config::{AppConfig, OutputConfig};
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG, GZIP_EXTENSION, JSON_EXTENSION, STDIN_INPUT};
use crate::domain::traces::TranslationResult;
use crate::ingest::{
    OtlpContentEncoding, OtlpContentType, RequestInfo, translate_trace_request_from_bytes,
};
use crate::utils::file::expand_path;

pub struct CoreApp {
    pub config: AppConfig,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        let app = Self {
            config: AppConfig::load(&cli_config)?,
        };

        match command {
            Commands::Translate(args) => app.translate(&args).await,
        }
    }

    fn init_logging() {
        let default_filter = format!("warn,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        // stdout carries the translated JSON
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn translate(&self, args: &TranslateArgs) -> Result<()> {
        let body = read_input(&args.input).await?;
        let info = self.request_info(args);
        let policy = self.config.dataset_policy();

        let result = translate_trace_request_from_bytes(&body, &info, &policy)
            .with_context(|| format!("Failed to translate {}", input_label(&args.input)))?;

        tracing::info!(
            batches = result.batches.len(),
            events = result.event_count(),
            request_size = result.request_size,
            "Translated trace request"
        );

        println!("{}", render(&result, self.config.output)?);
        Ok(())
    }

    fn request_info(&self, args: &TranslateArgs) -> RequestInfo {
        let content_type = match &args.content_type {
            Some(value) => value.clone(),
            None => content_type_for(&args.input).as_header_value().into(),
        };
        let content_encoding = match &args.content_encoding {
            Some(value) => value.clone(),
            None => content_encoding_for(&args.input).as_header_value().into(),
        };

        RequestInfo {
            api_key: args.api_key.clone().unwrap_or_default(),
            dataset: self.config.dataset.default.clone().unwrap_or_default(),
            user_agent: format!("{}/{}", APP_NAME_LOWER, env!("CARGO_PKG_VERSION")),
            content_type,
            content_encoding,
        }
    }
}

async fn read_input(input: &str) -> Result<Vec<u8>> {
    let body = if input == STDIN_INPUT {
        let mut buf = Vec::new();
        tokio::io::stdin()
            .read_to_end(&mut buf)
            .await
            .context("Failed to read request body from stdin")?;
        buf
    } else {
        let path = expand_path(input);
        tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read request body: {}", path.display()))?
    };
    tracing::debug!(input, bytes = body.len(), "Read request body");
    Ok(body)
}

fn input_label(input: &str) -> &str {
    if input == STDIN_INPUT { "stdin" } else { input }
}

/// Extension of the payload itself, ignoring a trailing `.gz`.
fn payload_extension(input: &str) -> Option<String> {
    let path = Path::new(input);
    let path = match extension_of(path).as_deref() {
        Some(GZIP_EXTENSION) => Path::new(path.file_stem()?),
        _ => path,
    };
    extension_of(path)
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

fn content_type_for(input: &str) -> OtlpContentType {
    match payload_extension(input).as_deref() {
        Some(JSON_EXTENSION) => OtlpContentType::Json,
        _ => OtlpContentType::Protobuf,
    }
}

fn content_encoding_for(input: &str) -> OtlpContentEncoding {
    match extension_of(Path::new(input)).as_deref() {
        Some(GZIP_EXTENSION) => OtlpContentEncoding::Gzip,
        _ => OtlpContentEncoding::Identity,
    }
}

#[derive(Debug, Serialize)]
struct BatchSummary<'a> {
    dataset: &'a str,
    size_bytes: usize,
    events: usize,
}

#[derive(Debug, Serialize)]
struct ResultSummary<'a> {
    request_size: usize,
    event_count: usize,
    batches: Vec<BatchSummary<'a>>,
}

impl<'a> From<&'a TranslationResult> for ResultSummary<'a> {
    fn from(result: &'a TranslationResult) -> Self {
        Self {
            request_size: result.request_size,
            event_count: result.event_count(),
            batches: result
                .batches
                .iter()
                .map(|b| BatchSummary {
                    dataset: &b.dataset,
                    size_bytes: b.size_bytes,
                    events: b.events.len(),
                })
                .collect(),
        }
    }
}

fn render(result: &TranslationResult, output: OutputConfig) -> Result<String> {
    let rendered = match (output.events, output.pretty) {
        (true, true) => serde_json::to_string_pretty(result),
        (true, false) => serde_json::to_string(result),
        (false, true) => serde_json::to_string_pretty(&ResultSummary::from(result)),
        (false, false) => serde_json::to_string(&ResultSummary::from(result)),
    };
    rendered.context("Failed to serialize translation result")
}
