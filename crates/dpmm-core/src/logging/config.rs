//! Logging configuration.
//!
//! Resolved from `DPMM_LOG` (a bare level), `RUST_LOG` (filter directives,
//! of which only the `dpmm_core` or default directive is read) and
//! `DPMM_LOG_FORMAT`, then overridden by the embedding application.

use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::LevelFilter;

/// Output encoding for log records on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Human,
    /// One JSON object per event, fields flattened.
    Jsonl,
}

impl LogFormat {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "human" | "text" => Some(LogFormat::Human),
            "jsonl" | "json" => Some(LogFormat::Jsonl),
            _ => None,
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogFormat::parse(s).ok_or_else(|| format!("unknown log format: {}", s))
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            LogFormat::Human => "human",
            LogFormat::Jsonl => "jsonl",
        })
    }
}

/// Verbosity of sampler events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Per-point cluster births and prunes.
    Trace,
    /// Per-sweep summaries.
    Debug,
    /// Run start and finish.
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    const NAMES: [(LogLevel, &'static str); 6] = [
        (LogLevel::Trace, "trace"),
        (LogLevel::Debug, "debug"),
        (LogLevel::Info, "info"),
        (LogLevel::Warn, "warn"),
        (LogLevel::Error, "error"),
        (LogLevel::Off, "off"),
    ];

    pub fn as_str(self) -> &'static str {
        Self::NAMES
            .iter()
            .find(|(level, _)| *level == self)
            .map_or("info", |(_, name)| *name)
    }

    fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_ascii_lowercase();
        let s = if s == "warning" { "warn" } else { s.as_str() };
        Self::NAMES
            .iter()
            .find(|(_, name)| *name == s)
            .map(|(level, _)| *level)
    }

    /// Level for `dpmm_core` from a `RUST_LOG` directive list such as
    /// `info,dpmm_core=trace`. A target-specific directive beats the
    /// default one; unknown directives are ignored.
    fn from_directives(directives: &str) -> Option<Self> {
        let mut default = None;
        for directive in directives.split(',') {
            match directive.split_once('=') {
                Some((target, level)) if target.trim() == "dpmm_core" => {
                    if let Some(level) = Self::parse(level) {
                        return Some(level);
                    }
                }
                Some(_) => {}
                None => default = Self::parse(directive).or(default),
            }
        }
        default
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogLevel::parse(s).ok_or_else(|| format!("unknown log level: {}", s))
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Off => LevelFilter::OFF,
        }
    }
}

/// Resolved logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: LogLevel,
    /// Prefix human-readable lines with a timestamp.
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            format: LogFormat::Human,
            level: LogLevel::Info,
            timestamps: true,
        }
    }
}

impl LogConfig {
    /// Resolve from the process environment, then apply `level` / `format`
    /// when given.
    pub fn from_env(level: Option<LogLevel>, format: Option<LogFormat>) -> Self {
        let var = |name: &str| std::env::var(name).ok();
        Self::resolve(
            var("DPMM_LOG").as_deref(),
            var("RUST_LOG").as_deref(),
            var("DPMM_LOG_FORMAT").as_deref(),
        )
        .with_overrides(level, format)
    }

    fn resolve(dpmm_log: Option<&str>, rust_log: Option<&str>, format: Option<&str>) -> Self {
        let level = dpmm_log
            .and_then(LogLevel::parse)
            .or_else(|| rust_log.and_then(LogLevel::from_directives))
            .unwrap_or_default();
        let format = format.and_then(LogFormat::parse).unwrap_or_default();
        LogConfig {
            level,
            format,
            ..LogConfig::default()
        }
    }

    fn with_overrides(self, level: Option<LogLevel>, format: Option<LogFormat>) -> Self {
        LogConfig {
            level: level.unwrap_or(self.level),
            format: format.unwrap_or(self.format),
            ..self
        }
    }

    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub fn filter_directive(&self) -> String {
        format!("dpmm_core={}", self.level)
    }

    pub fn with_format(self, format: LogFormat) -> Self {
        LogConfig { format, ..self }
    }

    pub fn with_level(self, level: LogLevel) -> Self {
        LogConfig { level, ..self }
    }

    pub fn with_timestamps(self, timestamps: bool) -> Self {
        LogConfig { timestamps, ..self }
    }
}
