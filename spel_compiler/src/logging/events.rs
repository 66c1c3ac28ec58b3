//! Log events raised while an expression is tokenized, parsed or evaluated
//!
//! An event optionally points into the expression text with a character
//! [`Span`] and carries the expression it belongs to, so a sink can show the
//! offending slice without knowing anything about the caller.

use super::codes::{self, Code};
use crate::config::compile_time::logging::MAX_LOG_MESSAGE_LENGTH;
use crate::utils::{SourceMap, Span};
use chrono::{DateTime, Utc};
use std::fmt;

pub use crate::config::runtime::LogLevel;

/// Expression an event was raised for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionTag {
    pub id: usize,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    /// Registry code; plain progress messages have none
    pub code: Option<Code>,
    pub message: String,
    pub span: Option<Span>,
    pub expression: Option<ExpressionTag>,
    /// Key/value details in the order they were attached
    pub fields: Vec<(String, String)>,
}

impl LogEvent {
    pub fn new(level: LogLevel, code: Option<Code>, message: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            code,
            message: truncate(message, MAX_LOG_MESSAGE_LENGTH),
            span: None,
            expression: None,
            fields: Vec::new(),
        }
    }

    pub fn error(code: Code, message: &str) -> Self {
        Self::new(LogLevel::Error, Some(code), message)
    }

    pub fn warning(message: &str) -> Self {
        Self::new(LogLevel::Warning, None, message)
    }

    pub fn info(message: &str) -> Self {
        Self::new(LogLevel::Info, None, message)
    }

    /// Info-level milestone such as I020 or I050
    pub fn success(code: Code, message: &str) -> Self {
        Self::new(LogLevel::Info, Some(code), message)
    }

    pub fn debug(message: &str) -> Self {
        Self::new(LogLevel::Debug, None, message)
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_field(mut self, key: &str, value: impl fmt::Display) -> Self {
        self.fields.push((key.to_string(), value.to_string()));
        self
    }

    pub fn for_expression(mut self, id: usize, text: &str) -> Self {
        self.expression = Some(ExpressionTag {
            id,
            text: text.to_string(),
        });
        self
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }

    pub fn is_warning(&self) -> bool {
        self.level == LogLevel::Warning
    }

    pub fn has_code(&self, code: Code) -> bool {
        self.code == Some(code)
    }

    pub fn category(&self) -> &'static str {
        self.code.map_or("General", |c| codes::get_category(c.as_str()))
    }

    pub fn severity(&self) -> &'static str {
        self.code
            .map_or("Low", |c| codes::get_severity(c.as_str()).as_str())
    }

    /// Recommended action from the code registry, if the code has one
    pub fn help(&self) -> Option<&'static str> {
        let code = self.code?;
        codes::get_error_metadata(code.as_str()).map(|m| m.recommended_action)
    }

    /// Slice of the expression the span covers
    pub fn excerpt(&self) -> Option<String> {
        let (span, tag) = (self.span.as_ref()?, self.expression.as_ref()?);
        Some(SourceMap::new(&tag.text).span_text(span))
    }

    /// `[ERROR] EL1044E: message (offset 3 in "1 +")`
    pub fn format(&self) -> String {
        let mut line = format!("[{}]", self.level.as_str());
        if let Some(code) = self.code {
            line.push_str(&format!(" {}:", code));
        }
        line.push(' ');
        line.push_str(&self.message);

        match (&self.span, &self.expression) {
            (Some(span), Some(tag)) => {
                line.push_str(&format!(" (offset {} in \"{}\")", span.start, tag.text))
            }
            (Some(span), None) => line.push_str(&format!(" (offset {})", span.start)),
            (None, Some(tag)) => line.push_str(&format!(" (in \"{}\")", tag.text)),
            (None, None) => {}
        }

        for (key, value) in &self.fields {
            line.push_str(&format!(" {}={}", key, value));
        }
        line
    }

    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        let mut json = serde_json::json!({
            "timestamp": self.timestamp.to_rfc3339(),
            "level": self.level.as_str(),
            "message": self.message,
        });

        if let Some(code) = self.code {
            json["code"] = code.as_str().into();
            json["category"] = self.category().into();
        }
        if let Some(span) = &self.span {
            json["span"] = serde_json::json!({ "start": span.start, "end": span.end });
        }
        if let Some(tag) = &self.expression {
            json["expression"] = serde_json::json!({ "id": tag.id, "text": tag.text });
        }
        if !self.fields.is_empty() {
            json["fields"] = self
                .fields
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                .collect::<serde_json::Map<_, _>>()
                .into();
        }

        serde_json::to_string(&json)
    }
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

fn truncate(message: &str, limit: usize) -> String {
    match message.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &message[..cut]),
        None => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_events_carry_registry_metadata() {
        let event = LogEvent::error(codes::syntax::MORE_INPUT, "Trailing input");
        assert!(event.is_error());
        assert!(event.has_code(codes::syntax::MORE_INPUT));
        assert_eq!(event.category(), "Syntax");
        assert!(event.help().is_some());

        let plain = LogEvent::debug("scanning");
        assert_eq!(plain.code, None);
        assert_eq!(plain.category(), "General");
        assert_eq!(plain.help(), None);
    }

    #[test]
    fn excerpt_reads_the_span_out_of_the_expression() {
        let event = LogEvent::error(codes::lexical::UNSUPPORTED_CHARACTER, "Unsupported character")
            .with_span(Span::single(4))
            .for_expression(1, "1 + ~2");
        assert_eq!(event.excerpt().as_deref(), Some("~"));
        assert_eq!(
            event.format(),
            "[ERROR] EL1069E: Unsupported character (offset 4 in \"1 + ~2\")"
        );
    }

    #[test]
    fn fields_keep_insertion_order() {
        let event = LogEvent::success(codes::success::TOKENIZATION_COMPLETE, "Tokenized")
            .with_field("tokens", 3)
            .with_field("chars", 5);
        assert_eq!(event.field("chars"), Some("5"));
        assert!(event.format().ends_with("Tokenized tokens=3 chars=5"));
    }

    #[test]
    fn json_lines_nest_expression_and_span() {
        let event = LogEvent::error(codes::syntax::OOD, "Ran out of input")
            .with_span(Span::new(3, 3))
            .for_expression(7, "1 +");

        let json: serde_json::Value = serde_json::from_str(&event.format_json().unwrap()).unwrap();
        assert_eq!(json["code"], "EL1044E");
        assert_eq!(json["span"]["start"], 3);
        assert_eq!(json["expression"]["id"], 7);
        assert_eq!(json["expression"]["text"], "1 +");
    }

    #[test]
    fn long_messages_are_truncated() {
        let message = "x".repeat(MAX_LOG_MESSAGE_LENGTH + 10);
        let event = LogEvent::info(&message);
        assert_eq!(event.message.chars().count(), MAX_LOG_MESSAGE_LENGTH + 3);
    }
}
