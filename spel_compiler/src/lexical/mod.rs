//! Lexical analysis for SpEL expressions
//!
//! Turns one expression string into the eager token list the parser walks.

pub mod analyzer;

use crate::config::compile_time::lexical::*;
use crate::logging::codes;
use crate::tokens::{SpannedToken, TokenStream};

pub use analyzer::{LexerError, LexicalMetrics, Tokenizer};

/// Tokenize with the compile-time expression length limit
pub fn tokenize(expression: &str) -> Result<Vec<SpannedToken>, LexerError> {
    Tokenizer::new(expression).tokenize()
}

/// Tokenize with a caller-supplied expression length limit
pub fn tokenize_with_max_length(
    expression: &str,
    max_expression_length: usize,
) -> Result<Vec<SpannedToken>, LexerError> {
    Tokenizer::with_max_length(expression, max_expression_length).tokenize()
}

/// Tokenize straight into a parser cursor
pub fn tokenize_to_stream(expression: &str) -> Result<TokenStream, LexerError> {
    tokenize(expression).map(TokenStream::new)
}

/// Check every lexical code is registered and log the active limits
pub fn init_lexical_analysis_logging() -> Result<(), String> {
    let lexical_codes = [
        codes::lexical::NON_TERMINATING_DOUBLE_QUOTED_STRING,
        codes::lexical::NON_TERMINATING_QUOTED_STRING,
        codes::lexical::MISSING_LEADING_ZERO_FOR_NUMBER,
        codes::lexical::REAL_CANNOT_BE_LONG,
        codes::lexical::UNEXPECTED_ESCAPE_CHAR,
        codes::lexical::MISSING_CHARACTER,
        codes::lexical::UNSUPPORTED_CHARACTER,
        codes::lexical::MAX_EXPRESSION_LENGTH_EXCEEDED,
        codes::lexical::MAX_TOKEN_COUNT_EXCEEDED,
        codes::lexical::STRING_LITERAL_TOO_LARGE,
        codes::lexical::IDENTIFIER_TOO_LONG,
    ];

    for code in &lexical_codes {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Lexical error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    crate::log_debug!("Lexical limits initialized",
        "max_expression_length" => MAX_EXPRESSION_LENGTH,
        "max_string_size" => MAX_STRING_SIZE,
        "max_identifier_length" => MAX_IDENTIFIER_LENGTH,
        "max_token_count" => MAX_TOKEN_COUNT
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::TokenKind;

    #[test]
    fn stream_walks_tokens_in_order() {
        let mut stream = tokenize_to_stream("a ?: b").unwrap();
        assert_eq!(stream.len(), 3);
        assert!(stream.consume_if(TokenKind::Identifier).is_some());
        assert!(stream.check(TokenKind::Elvis));
    }

    #[test]
    fn custom_length_limit() {
        assert!(tokenize_with_max_length("abc", 3).is_ok());
        assert!(matches!(
            tokenize_with_max_length("abcd", 3),
            Err(LexerError::ExpressionTooLong { .. })
        ));
    }

    #[test]
    fn lexical_codes_are_registered() {
        assert!(init_lexical_analysis_logging().is_ok());
    }
}
