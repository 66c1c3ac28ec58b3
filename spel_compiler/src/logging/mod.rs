//! Global logging for the SpEL engine
//!
//! Library code raises events through the `log_*!` macros. They go nowhere
//! until the host calls [`init_global_logging`]; after that every event is
//! filtered by the installed [`LoggingService`], and errors and warnings are
//! also grouped under the expression being processed on the current thread
//! so the host can print a summary at the end.

pub mod codes;
pub mod collector;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use std::cell::RefCell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

pub use codes::Code;
pub use collector::{ErrorCollector, ExpressionContext, ProcessingSummary};
pub use events::{ExpressionTag, LogEvent, LogLevel};
pub use service::{ConsoleLogger, Logger, LoggingService, MemoryLogger, MultiLogger, StructuredLogger};

static GLOBAL_LOGGER: OnceLock<LoggingService> = OnceLock::new();
static GLOBAL_ERROR_COLLECTOR: OnceLock<ErrorCollector> = OnceLock::new();
static NEXT_EXPRESSION_ID: AtomicUsize = AtomicUsize::new(1);

thread_local! {
    static EXPRESSION_CONTEXT: RefCell<Option<ExpressionContext>> = const { RefCell::new(None) };
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Install the service described by the logging preferences
pub fn init_global_logging() -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;

    for code in [codes::system::INTERNAL_ERROR, codes::syntax::OOD, codes::success::EVALUATION_COMPLETE] {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!("Missing metadata for code: {}", code));
        }
    }

    init_global_logging_with_service(LoggingService::from_preferences(config::preferences()))?;
    emit(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    ));
    Ok(())
}

/// Install a caller-built service, e.g. one writing to a `MemoryLogger`
pub fn init_global_logging_with_service(service: LoggingService) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized".to_string())?;
    GLOBAL_ERROR_COLLECTOR
        .set(ErrorCollector::new())
        .map_err(|_| "Global error collector already initialized".to_string())
}

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get()
}

pub fn try_get_global_error_collector() -> Option<&'static ErrorCollector> {
    GLOBAL_ERROR_COLLECTOR.get()
}

// ============================================================================
// EMISSION
// ============================================================================

/// Whether an event of `level` would be kept by anything installed
pub fn enabled(level: LogLevel) -> bool {
    try_get_global_logger().is_some_and(|service| service.enabled(level) || level <= LogLevel::Warning)
}

/// Tag `event` with the current expression, log it, and collect it if it is
/// an error or warning
pub fn emit(event: LogEvent) {
    let Some(service) = try_get_global_logger() else {
        return;
    };

    let context = get_current_expression_context();
    let event = match &context {
        Some(ctx) if config::include_expression_context() => {
            event.for_expression(ctx.expression_id, &ctx.expression)
        }
        _ => event,
    };

    service.log(&event);

    if event.level <= LogLevel::Warning {
        if let (Some(ctx), Some(collector)) = (context, try_get_global_error_collector()) {
            collector.record_event(&ctx, event);
        }
    }
}

// ============================================================================
// EXPRESSION CONTEXT
// ============================================================================

/// Mark `expression` as the one being processed on this thread; returns its id
pub fn set_expression_context(expression: &str) -> usize {
    let expression_id = NEXT_EXPRESSION_ID.fetch_add(1, Ordering::Relaxed);
    let context = ExpressionContext::new(expression, expression_id);

    if let Some(collector) = try_get_global_error_collector() {
        collector.record_expression_context(&context);
    }
    EXPRESSION_CONTEXT.with(|ctx| *ctx.borrow_mut() = Some(context));
    expression_id
}

pub fn clear_expression_context() {
    let finished = EXPRESSION_CONTEXT.with(|ctx| ctx.borrow_mut().take());
    if let (Some(context), Some(collector)) = (finished, try_get_global_error_collector()) {
        collector.finish_expression(&context);
    }
}

/// Run `f` with `expression` as the thread's context, restoring any outer one
pub fn with_expression_context<R>(expression: &str, f: impl FnOnce() -> R) -> R {
    let outer = get_current_expression_context();
    set_expression_context(expression);
    let result = f();
    clear_expression_context();

    if outer.is_some() {
        EXPRESSION_CONTEXT.with(|ctx| *ctx.borrow_mut() = outer);
    }
    result
}

pub fn get_current_expression_context() -> Option<ExpressionContext> {
    EXPRESSION_CONTEXT.with(|ctx| ctx.borrow().clone())
}

/// Cargo-style report of collected errors and warnings, on stderr
pub fn print_cargo_style_summary() {
    if !config::use_cargo_style_output() {
        return;
    }
    if let Some(collector) = try_get_global_error_collector() {
        let report = collector::format_cargo_style_errors(collector);
        if !report.is_empty() {
            eprint!("{}", report);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Span;
    use std::sync::Arc;

    #[test]
    fn expression_context_is_per_call() {
        assert!(get_current_expression_context().is_none());

        let id = set_expression_context("1 + 2");
        let context = get_current_expression_context().unwrap();
        assert_eq!(context.expression, "1 + 2");
        assert_eq!(context.expression_id, id);

        clear_expression_context();
        assert!(get_current_expression_context().is_none());
    }

    #[test]
    fn nested_context_restores_the_outer_expression() {
        set_expression_context("outer");

        let inner = with_expression_context("inner", || {
            get_current_expression_context().map(|c| c.expression).unwrap_or_default()
        });

        assert_eq!(inner, "inner");
        assert_eq!(
            get_current_expression_context().map(|c| c.expression),
            Some("outer".to_string())
        );
        clear_expression_context();
    }

    #[test]
    fn installed_service_sees_events_tagged_with_their_expression() {
        let memory = Arc::new(MemoryLogger::new());
        let service = LoggingService::new(memory.clone(), LogLevel::Debug);
        if init_global_logging_with_service(service).is_err() {
            return;
        }
        assert!(enabled(LogLevel::Debug));

        with_expression_context("1 + ~2", || {
            crate::log_error!(codes::lexical::UNSUPPORTED_CHARACTER, "Unsupported character",
                span = Span::single(4),
                "character" => '~'
            );
            crate::log_debug!("scanned");
        });

        let events = memory.events_for("1 + ~2");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].excerpt().as_deref(), Some("~"));
        assert_eq!(events[0].field("character"), Some("~"));

        let id = events[0].expression.as_ref().map(|tag| tag.id).unwrap();
        let collector = try_get_global_error_collector().unwrap();
        assert!(collector.expression_has_errors(id));
        assert_eq!(collector.get_expression_events(id).len(), 1);
    }
}
