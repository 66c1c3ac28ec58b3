// RUNTIME PREFERENCES (User Experience)

use crate::config::compile_time::{evaluation, lexical};
use serde::{Deserialize, Serialize};
use std::env;

/// Flags carried by a parsed expression and consumed during evaluation.
///
/// Only `maximum_expression_length` is read by the parser itself. Defaults
/// come from the compile-time profile, never from the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpelParserConfiguration {
    /// Create an empty map/list when navigating through a null property
    pub auto_grow_null_references: bool,

    /// Grow lists with nulls when indexing past their end
    pub auto_grow_collections: bool,

    /// Upper bound on the size a list may be grown to
    pub maximum_auto_grow_size: usize,

    /// Expressions longer than this (in chars) are rejected before tokenizing
    pub maximum_expression_length: usize,
}

impl Default for SpelParserConfiguration {
    fn default() -> Self {
        Self {
            auto_grow_null_references: false,
            auto_grow_collections: false,
            maximum_auto_grow_size: evaluation::MAX_AUTO_GROW_SIZE,
            maximum_expression_length: lexical::MAX_EXPRESSION_LENGTH,
        }
    }
}

impl SpelParserConfiguration {
    pub fn new(auto_grow_null_references: bool, auto_grow_collections: bool) -> Self {
        Self {
            auto_grow_null_references,
            auto_grow_collections,
            ..Self::default()
        }
    }

    pub fn with_maximum_auto_grow_size(mut self, size: usize) -> Self {
        self.maximum_auto_grow_size = size;
        self
    }

    pub fn with_maximum_expression_length(mut self, length: usize) -> Self {
        self.maximum_expression_length = length;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging (user preference)
    pub use_structured_logging: bool,

    /// Whether to enable console output (user preference)
    pub enable_console_logging: bool,

    /// User preferred minimum log level
    pub min_log_level: LogLevel,

    /// Whether to attach the expression under evaluation to log events
    pub include_expression_context: bool,

    /// Whether to print the per-expression summary at exit
    pub enable_cargo_style_output: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var(env_vars::LOGGING_USE_STRUCTURED)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_console_logging: env::var(env_vars::LOGGING_ENABLE_CONSOLE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
            include_expression_context: env::var(env_vars::LOGGING_INCLUDE_EXPRESSION_CONTEXT)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            enable_cargo_style_output: env::var(env_vars::LOGGING_CARGO_STYLE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

/// Parse log level from string (used for environment variables)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    pub const LOGGING_USE_STRUCTURED: &str = "SPEL_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "SPEL_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "SPEL_LOGGING_MIN_LEVEL";
    pub const LOGGING_INCLUDE_EXPRESSION_CONTEXT: &str = "SPEL_LOGGING_INCLUDE_EXPRESSION_CONTEXT";
    pub const LOGGING_CARGO_STYLE: &str = "SPEL_LOGGING_CARGO_STYLE";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse_log_level("error"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("ERROR"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("0"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("warn"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("warning"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("info"), Some(LogLevel::Info));
        assert_eq!(parse_log_level("debug"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("3"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("invalid"), None);
    }

    #[test]
    fn parser_configuration_defaults_follow_profile() {
        let config = SpelParserConfiguration::default();
        assert!(!config.auto_grow_collections);
        assert!(!config.auto_grow_null_references);
        assert_eq!(config.maximum_expression_length, lexical::MAX_EXPRESSION_LENGTH);
        assert_eq!(config.maximum_auto_grow_size, evaluation::MAX_AUTO_GROW_SIZE);
    }

    #[test]
    fn parser_configuration_builders() {
        let config = SpelParserConfiguration::new(true, true)
            .with_maximum_auto_grow_size(10)
            .with_maximum_expression_length(50);
        assert!(config.auto_grow_collections);
        assert!(config.auto_grow_null_references);
        assert_eq!(config.maximum_auto_grow_size, 10);
        assert_eq!(config.maximum_expression_length, 50);
    }

    #[test]
    fn parser_configuration_serializes() {
        let json = serde_json::to_string(&SpelParserConfiguration::new(false, true)).unwrap();
        assert!(json.contains("\"auto_grow_collections\":true"));
    }
}
