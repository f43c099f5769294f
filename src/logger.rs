use chrono::{DateTime, Utc};
use colored::*;
use log::{Level, Metadata, Record};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::{File, OpenOptions};
use std::future::Future;
use std::io::{self, Write};
use std::str::FromStr;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::config::{Config, ReasoningKind};

static POSTER_LOGGER: Lazy<PosterLogger> = Lazy::new(PosterLogger::new);

tokio::task_local! {
    static REQUEST_ID: String;
}

pub fn init() -> Result<(), String> {
    init_with_config(LoggerConfig::default())
}

pub fn init_with_config(config: LoggerConfig) -> Result<(), String> {
    let filter = Level::from(config.level).to_level_filter();
    POSTER_LOGGER.configure(config);

    log::set_logger(&*POSTER_LOGGER).map_err(|e| format!("Failed to set logger: {:?}", e))?;
    log::set_max_level(filter);
    Ok(())
}

/// Runs `future` with `request_id` attached to every log line it emits.
pub async fn in_request<F: Future>(request_id: impl Into<String>, future: F) -> F::Output {
    REQUEST_ID.scope(request_id.into(), future).await
}

/// Request id of the enclosing `in_request` scope, if any.
pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(|id| id.clone()).ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Label, emoji and console color.
    fn badge(self) -> (&'static str, &'static str, Color) {
        match self {
            LogLevel::Trace => ("TRACE", "🔍", Color::Cyan),
            LogLevel::Debug => ("DEBUG", "🐛", Color::Blue),
            LogLevel::Info => ("INFO", "💡", Color::Green),
            LogLevel::Warn => ("WARN", "⚠️", Color::Yellow),
            LogLevel::Error => ("ERROR", "❌", Color::Red),
        }
    }

    pub fn label(self) -> &'static str {
        self.badge().0
    }
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::Trace,
            LogLevel::Debug => Level::Debug,
            LogLevel::Info => Level::Info,
            LogLevel::Warn => Level::Warn,
            LogLevel::Error => Level::Error,
        }
    }
}

impl From<Level> for LogLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::Trace => LogLevel::Trace,
            Level::Debug => LogLevel::Debug,
            Level::Info => LogLevel::Info,
            Level::Warn => LogLevel::Warn,
            Level::Error => LogLevel::Error,
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

/// One emitted log line, as written in JSON mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub target: String,
    pub message: String,
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl LogEntry {
    fn from_record(record: &Record) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            level: record.level().into(),
            target: record.module_path().unwrap_or(record.target()).to_string(),
            message: record.args().to_string(),
            location: record
                .file()
                .zip(record.line())
                .map(|(file, line)| format!("{}:{}", file, line)),
            request_id: current_request_id(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines; colors and emojis are optional.
    Pretty { colors: bool, emojis: bool },
    /// One JSON object per line.
    Json,
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    pub timestamp_format: Option<String>,
    pub show_target: bool,
    pub show_location: bool,
    pub prefix: Option<String>,
    /// Lines are also appended here, never colored.
    pub file: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Pretty {
                colors: true,
                emojis: true,
            },
            timestamp_format: Some("%Y-%m-%d %H:%M:%S%.3f".to_string()),
            show_target: true,
            show_location: false,
            prefix: None,
            file: None,
        }
    }
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn development() -> Self {
        Self {
            level: LogLevel::Debug,
            show_location: true,
            ..Default::default()
        }
    }

    pub fn production() -> Self {
        Self {
            format: LogFormat::Json,
            file: Some("postergen.log".to_string()),
            ..Default::default()
        }
    }

    /// `LOG_PROFILE=production` selects the JSON preset; `LOG_LEVEL` and
    /// `LOG_FILE` override either preset.
    pub fn from_env() -> Self {
        let mut config = match env::var("LOG_PROFILE").as_deref() {
            Ok("production") => Self::production(),
            _ => Self::development(),
        };
        if let Some(level) = env::var("LOG_LEVEL").ok().and_then(|l| l.parse().ok()) {
            config.level = level;
        }
        if let Ok(path) = env::var("LOG_FILE") {
            config.file = Some(path);
        }
        config
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_file(mut self, path: impl Into<String>) -> Self {
        self.file = Some(path.into());
        self
    }

    pub fn without_timestamp(mut self) -> Self {
        self.timestamp_format = None;
        self
    }

    fn render(&self, entry: &LogEntry, colors: bool) -> String {
        match self.format {
            LogFormat::Json => serde_json::to_string(entry).unwrap_or_default(),
            LogFormat::Pretty {
                colors: wanted,
                emojis,
            } => self.render_pretty(entry, colors && wanted, emojis),
        }
    }

    fn render_pretty(&self, entry: &LogEntry, colors: bool, emojis: bool) -> String {
        let paint = |text: &str, style: fn(&str) -> ColoredString| -> String {
            if colors {
                style(text).to_string()
            } else {
                text.to_string()
            }
        };
        let (label, emoji, color) = entry.level.badge();
        let mut parts: Vec<String> = Vec::new();

        if let Some(prefix) = &self.prefix {
            parts.push(format!("[{}]", paint(prefix, |s| s.bright_white().bold())));
        }
        if let Some(format) = &self.timestamp_format {
            let timestamp = entry.timestamp.format(format).to_string();
            parts.push(paint(&timestamp, |s| s.bright_black()));
        }

        let badge = if emojis {
            format!("{} {}", emoji, label)
        } else {
            label.to_string()
        };
        parts.push(if colors {
            format!("[{}]", badge.color(color).bold())
        } else {
            format!("[{}]", badge)
        });

        let message = paint(&entry.message, |s| s.white().bold());
        if self.show_target {
            parts.push(format!("{}: {}", paint(&entry.target, |s| s.bright_blue()), message));
        } else {
            parts.push(message);
        }

        if let Some(request_id) = &entry.request_id {
            parts.push(format!("[req:{}]", paint(request_id, |s| s.bright_yellow())));
        }
        if let (true, Some(location)) = (self.show_location, &entry.location) {
            parts.push(format!("({})", paint(location, |s| s.bright_black())));
        }

        parts.join(" ")
    }
}

pub struct PosterLogger {
    config: Mutex<LoggerConfig>,
    file: Mutex<Option<File>>,
}

impl PosterLogger {
    pub fn new() -> Self {
        Self {
            config: Mutex::new(LoggerConfig::default()),
            file: Mutex::new(None),
        }
    }

    pub fn configure(&self, config: LoggerConfig) {
        let file = config.file.as_deref().and_then(|path| {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| eprintln!("Failed to open log file {}: {}", path, e))
                .ok()
        });

        if let Ok(mut slot) = self.file.lock() {
            *slot = file;
        }
        if let Ok(mut slot) = self.config.lock() {
            *slot = config;
        }
    }
}

impl Default for PosterLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl log::Log for PosterLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.config
            .lock()
            .map(|config| metadata.level() <= Level::from(config.level))
            .unwrap_or(true)
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let entry = LogEntry::from_record(record);
        let Ok(config) = self.config.lock() else {
            return;
        };

        println!("{}", config.render(&entry, true));
        if let Ok(mut file) = self.file.lock() {
            if let Some(file) = file.as_mut() {
                let _ = writeln!(file, "{}", config.render(&entry, false));
            }
        }
    }

    fn flush(&self) {
        let _ = io::stdout().flush();
        if let Ok(mut file) = self.file.lock() {
            if let Some(file) = file.as_mut() {
                let _ = file.flush();
            }
        }
    }
}

/// Logs how long an operation took when dropped.
pub struct Timer {
    started: Instant,
    operation: &'static str,
}

impl Timer {
    pub fn new(operation: &'static str) -> Self {
        log::debug!("⏱️  {} started", operation);
        Self {
            started: Instant::now(),
            operation,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        log::info!(
            "⏱️  {} finished in {}ms",
            self.operation,
            self.elapsed().as_millis()
        );
    }
}

pub fn log_startup_info(app_name: &str, version: &str, port: u16) {
    log::info!("🚀 Starting {} v{}", app_name, version);
    log::info!("🌐 Server will run on http://0.0.0.0:{}", port);
}

/// Startup summary of the effective configuration. Keys are reported as present or missing only.
pub fn log_config_info(config: &Config) {
    let present = |value: &Option<String>| if value.is_some() { "✅" } else { "❌" };

    log::info!("⚙️  Configuration loaded:");
    log::info!("   Port: {}", config.port());
    log::info!(
        "   Image API: {} (key {})",
        config.image_api.api_url,
        present(&config.image_api.api_key)
    );
    match config.reasoning.kind {
        ReasoningKind::Chat => log::info!(
            "   Reasoning: chat {} at {} (key {})",
            config.reasoning.model_id,
            config.reasoning.base_url,
            present(&config.reasoning.api_key)
        ),
        ReasoningKind::Bedrock => log::info!(
            "   Reasoning: bedrock {} in {}",
            config.reasoning.model_id,
            config
                .bedrock
                .as_ref()
                .and_then(|b| b.region.as_deref())
                .unwrap_or("default region")
        ),
    }
    log::info!(
        "   Tier delay: {}ms, request timeout: {}s",
        config.tier_delay_ms,
        config.request_timeout_secs
    );
}
