//! `log_*!` macros
//!
//! Context values are any `Display` type, borrowed. Nothing is formatted
//! unless an installed service or the error collector would keep the event.

#[doc(hidden)]
#[macro_export]
macro_rules! __spel_emit {
    ($event:expr, span = $span:expr $(, $key:expr => $value:expr)*) => {{
        let event: $crate::logging::LogEvent = $event;
        if $crate::logging::enabled(event.level) {
            let event = event.with_span($span);
            $( let event = event.with_field($key, &$value); )*
            $crate::logging::emit(event);
        }
    }};
    ($event:expr $(, $key:expr => $value:expr)*) => {{
        let event: $crate::logging::LogEvent = $event;
        if $crate::logging::enabled(event.level) {
            $( let event = event.with_field($key, &$value); )*
            $crate::logging::emit(event);
        }
    }};
}

/// `log_error!(code, message [, span = span] [, "key" => value]*)`
#[macro_export]
macro_rules! log_error {
    ($code:expr, $message:expr, span = $span:expr $(, $key:expr => $value:expr)*) => {
        $crate::__spel_emit!($crate::logging::LogEvent::error($code, $message), span = $span $(, $key => $value)*)
    };
    ($code:expr, $message:expr $(, $key:expr => $value:expr)*) => {
        $crate::__spel_emit!($crate::logging::LogEvent::error($code, $message) $(, $key => $value)*)
    };
}

/// Milestone with an `Innn` code
#[macro_export]
macro_rules! log_success {
    ($code:expr, $message:expr $(, $key:expr => $value:expr)*) => {
        $crate::__spel_emit!($crate::logging::LogEvent::success($code, $message) $(, $key => $value)*)
    };
}

#[macro_export]
macro_rules! log_info {
    ($message:expr $(, $key:expr => $value:expr)*) => {
        $crate::__spel_emit!($crate::logging::LogEvent::info($message) $(, $key => $value)*)
    };
}

#[macro_export]
macro_rules! log_warning {
    ($message:expr $(, $key:expr => $value:expr)*) => {
        $crate::__spel_emit!($crate::logging::LogEvent::warning($message) $(, $key => $value)*)
    };
}

#[macro_export]
macro_rules! log_debug {
    ($message:expr $(, $key:expr => $value:expr)*) => {
        $crate::__spel_emit!($crate::logging::LogEvent::debug($message) $(, $key => $value)*)
    };
}

#[cfg(test)]
mod tests {
    use crate::logging::codes;
    use crate::utils::Span;

    #[test]
    fn every_form_expands_without_a_logger() {
        let token_count: usize = 12;

        log_error!(codes::lexical::UNSUPPORTED_CHARACTER, "Unsupported character",
            span = Span::single(4),
            "character" => '~'
        );
        log_error!(codes::syntax::OOD, "Ran out of input", span = Span::new(3, 3));
        log_error!(codes::syntax::MORE_INPUT, &format!("{} failed", "Parse"), "next" => "<");
        log_success!(codes::success::TOKENIZATION_COMPLETE, "Tokenized", "tokens" => token_count);
        log_info!("Expression evaluated");
        log_warning!("Alias used as a property", "alias" => "lt");
        log_debug!("Parse session started", "expression" => "1 + 2", "tokens" => 3);
    }

    #[test]
    fn values_are_borrowed_not_moved() {
        let source = String::from("kept");
        log_info!("Borrowing", "source" => source);
        assert_eq!(source, "kept");
    }
}
