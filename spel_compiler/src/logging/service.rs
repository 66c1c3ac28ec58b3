//! Sinks for log events and the service that filters and routes them
//!
//! Every sink writes to stderr or memory; stdout belongs to whatever the host
//! prints as an expression result.

use super::codes::Code;
use super::events::{LogEvent, LogLevel};
use crate::config::compile_time::logging::LOG_BUFFER_SIZE;
use crate::config::runtime::LoggingPreferences;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

pub trait Logger: Send + Sync {
    fn log(&self, event: &LogEvent);
}

/// One human-readable line per event
pub struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, event: &LogEvent) {
        eprintln!("{}", event.format());
    }
}

/// One JSON object per event
pub struct StructuredLogger;

impl Logger for StructuredLogger {
    fn log(&self, event: &LogEvent) {
        match event.format_json() {
            Ok(json) => eprintln!("{}", json),
            Err(_) => eprintln!("{}", event.format()),
        }
    }
}

/// Keeps the most recent events, up to `LOG_BUFFER_SIZE`
#[derive(Default)]
pub struct MemoryLogger {
    events: Mutex<VecDeque<LogEvent>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    fn buffer(&self) -> MutexGuard<'_, VecDeque<LogEvent>> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn events(&self) -> Vec<LogEvent> {
        self.buffer().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.buffer().len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer().is_empty()
    }

    pub fn clear(&self) {
        self.buffer().clear();
    }

    pub fn contains_code(&self, code: Code) -> bool {
        self.buffer().iter().any(|e| e.has_code(code))
    }

    /// Events raised while `expression` was the current expression
    pub fn events_for(&self, expression: &str) -> Vec<LogEvent> {
        self.buffer()
            .iter()
            .filter(|e| e.expression.as_ref().is_some_and(|tag| tag.text == expression))
            .cloned()
            .collect()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, event: &LogEvent) {
        let mut events = self.buffer();
        if events.len() >= LOG_BUFFER_SIZE {
            events.pop_front();
        }
        events.push_back(event.clone());
    }
}

/// Sends each event to every attached sink
#[derive(Default)]
pub struct MultiLogger {
    sinks: Vec<Arc<dyn Logger>>,
}

impl MultiLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn Logger>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl Logger for MultiLogger {
    fn log(&self, event: &LogEvent) {
        for sink in &self.sinks {
            sink.log(event);
        }
    }
}

/// Level filter in front of a sink
pub struct LoggingService {
    sink: Arc<dyn Logger>,
    min_level: LogLevel,
}

impl LoggingService {
    pub fn new(sink: Arc<dyn Logger>, min_level: LogLevel) -> Self {
        Self { sink, min_level }
    }

    /// Console or JSON output as the preferences ask; silent when console
    /// logging is off
    pub fn from_preferences(preferences: &LoggingPreferences) -> Self {
        let mut sinks = MultiLogger::new();
        if preferences.enable_console_logging {
            sinks = if preferences.use_structured_logging {
                sinks.with(Arc::new(StructuredLogger))
            } else {
                sinks.with(Arc::new(ConsoleLogger))
            };
        }
        Self::new(Arc::new(sinks), preferences.min_log_level)
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level <= self.min_level
    }

    pub fn log(&self, event: &LogEvent) {
        if self.enabled(event.level) {
            self.sink.log(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    #[test]
    fn service_filters_by_level() {
        let memory = Arc::new(MemoryLogger::new());
        let service = LoggingService::new(memory.clone(), LogLevel::Info);

        service.log(&LogEvent::debug("token stream created"));
        service.log(&LogEvent::success(codes::success::EVALUATION_COMPLETE, "Evaluated"));
        service.log(&LogEvent::error(codes::evaluation::DIVISION_BY_ZERO, "Divide by zero"));

        assert_eq!(memory.len(), 2);
        assert!(memory.contains_code(codes::success::EVALUATION_COMPLETE));
        assert!(memory.contains_code(codes::evaluation::DIVISION_BY_ZERO));
        assert!(!service.enabled(LogLevel::Debug));
    }

    #[test]
    fn memory_logger_groups_by_expression() {
        let memory = MemoryLogger::new();
        memory.log(&LogEvent::info("a").for_expression(1, "1 + 2"));
        memory.log(&LogEvent::info("b").for_expression(2, "#x"));
        memory.log(&LogEvent::info("c"));

        assert_eq!(memory.events_for("#x").len(), 1);
        assert_eq!(memory.events_for("1 + 2")[0].message, "a");

        memory.clear();
        assert!(memory.is_empty());
    }

    #[test]
    fn memory_logger_drops_the_oldest_events() {
        let memory = MemoryLogger::new();
        for i in 0..LOG_BUFFER_SIZE + 2 {
            memory.log(&LogEvent::debug(&i.to_string()));
        }
        assert_eq!(memory.len(), LOG_BUFFER_SIZE);
        assert_eq!(memory.events()[0].message, "2");
    }

    #[test]
    fn multi_logger_fans_out() {
        let (first, second) = (Arc::new(MemoryLogger::new()), Arc::new(MemoryLogger::new()));
        let multi = MultiLogger::new().with(first.clone()).with(second.clone());
        multi.log(&LogEvent::warning("deprecated alias"));
        assert_eq!((first.len(), second.len()), (1, 1));
    }

    #[test]
    fn preferences_without_console_build_a_silent_service() {
        let preferences = LoggingPreferences {
            use_structured_logging: false,
            enable_console_logging: false,
            min_log_level: LogLevel::Warning,
            include_expression_context: true,
            enable_cargo_style_output: true,
        };
        let service = LoggingService::from_preferences(&preferences);
        assert_eq!(service.min_level(), LogLevel::Warning);
        assert!(service.enabled(LogLevel::Error));
        assert!(!service.enabled(LogLevel::Info));
    }
}
