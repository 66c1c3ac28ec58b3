//! Error collector for expression processing with cargo-style output
//!
//! Events are grouped by expression id so a CLI run or a batch of
//! evaluations can report every failure at the end.

use super::events::LogEvent;
use crate::config::compile_time::logging::*;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

// ============================================================================
// EXPRESSION CONTEXT
// ============================================================================

/// Expression currently being parsed or evaluated on a thread
#[derive(Debug, Clone)]
pub struct ExpressionContext {
    pub expression: String,
    pub expression_id: usize,
    pub start_time: Instant,
}

impl ExpressionContext {
    pub fn new(expression: impl Into<String>, expression_id: usize) -> Self {
        Self {
            expression: expression.into(),
            expression_id,
            start_time: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

// ============================================================================
// PROCESSING SUMMARY
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct ProcessingSummary {
    pub total_expressions: usize,
    pub successful_expressions: usize,
    pub failed_expressions: usize,
    pub expressions_with_warnings: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub total_processing_time: Duration,
    pub average_expression_time: Duration,
}

impl ProcessingSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_expressions == 0 {
            0.0
        } else {
            self.successful_expressions as f64 / self.total_expressions as f64
        }
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.total_warnings > 0
    }
}

// ============================================================================
// ERROR COLLECTOR
// ============================================================================

#[derive(Debug, Clone)]
struct ExpressionRecord {
    expression: String,
    events: Vec<LogEvent>,
    elapsed: Option<Duration>,
}

/// Thread-safe collector of events keyed by expression id
pub struct ErrorCollector {
    records: Mutex<BTreeMap<usize, ExpressionRecord>>,
    processing_start: Instant,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(BTreeMap::new()),
            processing_start: Instant::now(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<usize, ExpressionRecord>> {
        // A poisoned collector still holds usable diagnostics
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register an expression so it counts in the summary even without events
    pub fn record_expression_context(&self, context: &ExpressionContext) {
        let mut records = self.lock();
        records
            .entry(context.expression_id)
            .or_insert_with(|| ExpressionRecord {
                expression: context.expression.clone(),
                events: Vec::new(),
                elapsed: None,
            });
    }

    /// Store the time spent on an expression once it is finished
    pub fn finish_expression(&self, context: &ExpressionContext) {
        let mut records = self.lock();
        if let Some(record) = records.get_mut(&context.expression_id) {
            record.elapsed = Some(context.elapsed());
        }
    }

    /// Record an event against an expression
    pub fn record_event(&self, context: &ExpressionContext, event: LogEvent) {
        let total: usize = self.total_event_count();
        if total >= LOG_BUFFER_SIZE {
            return;
        }

        let mut records = self.lock();
        let record = records
            .entry(context.expression_id)
            .or_insert_with(|| ExpressionRecord {
                expression: context.expression.clone(),
                events: Vec::new(),
                elapsed: None,
            });

        let limit = MAX_LOG_EVENTS_PER_EXPRESSION;
        if record.events.len() < limit {
            record.events.push(event);
        } else if record.events.len() == limit {
            record.events.push(LogEvent::warning(&format!(
                "Too many events for expression (limit: {})",
                limit
            )));
        }
    }

    pub fn get_expression_events(&self, expression_id: usize) -> Vec<LogEvent> {
        self.lock()
            .get(&expression_id)
            .map(|record| record.events.clone())
            .unwrap_or_default()
    }

    pub fn get_expression_errors(&self, expression_id: usize) -> Vec<LogEvent> {
        self.lock()
            .get(&expression_id)
            .map(|record| record.events.iter().filter(|e| e.is_error()).cloned().collect())
            .unwrap_or_default()
    }

    pub fn expression_has_errors(&self, expression_id: usize) -> bool {
        !self.get_expression_errors(expression_id).is_empty()
    }

    pub fn get_summary(&self) -> ProcessingSummary {
        let records = self.lock();

        let mut summary = ProcessingSummary::new();
        summary.total_expressions = records.len();
        summary.total_processing_time = self.processing_start.elapsed();

        let mut timed = Duration::ZERO;
        let mut timed_count = 0u32;

        for record in records.values() {
            let errors = record.events.iter().filter(|e| e.is_error()).count();
            let warnings = record.events.iter().filter(|e| e.is_warning()).count();

            if errors > 0 {
                summary.failed_expressions += 1;
            } else if warnings > 0 {
                summary.expressions_with_warnings += 1;
            } else {
                summary.successful_expressions += 1;
            }

            summary.total_errors += errors;
            summary.total_warnings += warnings;

            if let Some(elapsed) = record.elapsed {
                timed += elapsed;
                timed_count += 1;
            }
        }

        if timed_count > 0 {
            summary.average_expression_time = timed / timed_count;
        }

        summary
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn total_event_count(&self) -> usize {
        self.lock().values().map(|r| r.events.len()).sum()
    }
}

impl Default for ErrorCollector {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// CARGO-STYLE FORMATTING
// ============================================================================

/// Format collected errors and warnings per expression
pub fn format_cargo_style_errors(collector: &ErrorCollector) -> String {
    let mut output = String::new();

    {
        let records = collector.lock();
        for (id, record) in records.iter() {
            let issues: Vec<&LogEvent> = record
                .events
                .iter()
                .filter(|e| e.is_error() || e.is_warning())
                .take(MAX_ERROR_COLLECTION)
                .collect();

            if issues.is_empty() {
                continue;
            }

            output.push_str(&format!("Checking expression #{}: {}\n", id, record.expression));

            for event in issues {
                let label = if event.is_error() { "error" } else { "warning" };
                let span_info = event
                    .span
                    .as_ref()
                    .map(|s| format!(" --> {}:{}", id, s.start))
                    .unwrap_or_default();

                let code = event.code.map(|c| format!("[{}]", c)).unwrap_or_default();
                output.push_str(&format!("{}{}: {}{}\n", label, code, event.message, span_info));

                if let Some(excerpt) = event.excerpt() {
                    output.push_str(&format!("  = at: `{}`\n", excerpt));
                }

                if event.is_error() {
                    output.push_str(&format!(
                        "  = severity: {}, category: {}\n",
                        event.severity(),
                        event.category()
                    ));
                }

                for (key, value) in &event.fields {
                    output.push_str(&format!("  = {}: {}\n", key, value));
                }

                if let Some(help) = event.help().filter(|_| event.is_error()) {
                    output.push_str(&format!("  = help: {}\n", help));
                }
            }

            output.push('\n');
        }
    }

    let summary = collector.get_summary();
    if summary.total_errors > 0 {
        output.push_str(&format!("Total errors: {}\n", summary.total_errors));
    }
    if summary.total_warnings > 0 {
        output.push_str(&format!("Total warnings: {}\n", summary.total_warnings));
    }

    output
}
