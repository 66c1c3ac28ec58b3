//! Syntax analysis - expression text to AST
//!
//! [`SpelParser`] does the work; the functions here wrap it with the
//! structured success and failure events every caller gets for free.

mod error;
mod parser;

pub use error::{ParseResult, SpelParseError};
pub use parser::{ParseSession, SpelParser};

use crate::config::SpelParserConfiguration;
use crate::grammar::SpelNode;
use crate::logging::codes;
use crate::{log_debug, log_error, log_info, log_success};

/// Parse with the default configuration
pub fn parse_expression(expression: &str) -> ParseResult<SpelNode> {
    parse_expression_with_configuration(expression, &SpelParserConfiguration::default())
}

/// Parse with an explicit configuration, logging the outcome
pub fn parse_expression_with_configuration(
    expression: &str,
    configuration: &SpelParserConfiguration,
) -> ParseResult<SpelNode> {
    log_debug!("Starting syntax analysis", "length" => expression.chars().count());

    let result = SpelParser::with_configuration(*configuration).parse(expression);

    match &result {
        Ok(ast) => {
            log_success!(
                codes::success::AST_CONSTRUCTION_COMPLETE,
                "Syntax analysis completed successfully",
                "nodes" => ast.node_count(),
                "root" => ast.node_type()
            );
        }
        // the tokenizer already reported its own failures
        Err(error) if !error.is_lexical() => {
            log_error!(error.error_code(), "Syntax analysis failed",
                span = error.span(),
                "error" => error.message(),
                "position" => error.position
            );
        }
        Err(_) => {}
    }

    result
}

/// Check every syntax code is registered
pub fn init_syntax_logging() -> Result<(), String> {
    let syntax_codes = [
        codes::syntax::MORE_INPUT,
        codes::syntax::RIGHT_OPERAND_PROBLEM,
        codes::syntax::NOT_EXPECTED_TOKEN,
        codes::syntax::OOD,
        codes::syntax::UNEXPECTED_DATA_AFTER_DOT,
        codes::syntax::MISSING_CONSTRUCTOR_ARGS,
        codes::syntax::RUN_OUT_OF_ARGUMENTS,
        codes::syntax::LEFT_OPERAND_PROBLEM,
        codes::syntax::INVALID_BEAN_REFERENCE,
        codes::syntax::MISSING_SELECTION_EXPRESSION,
        codes::syntax::MAX_PARSE_DEPTH_EXCEEDED,
        codes::syntax::TOO_MANY_ARGUMENTS,
    ];

    for code in &syntax_codes {
        if codes::get_description(code.as_str()) == "Unknown error" {
            return Err(format!(
                "Syntax error code {} has no description",
                code.as_str()
            ));
        }
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Syntax error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    log_info!("Syntax module logging validation completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_codes_are_registered() {
        assert!(init_syntax_logging().is_ok());
    }

    #[test]
    fn default_configuration_parses() {
        let ast = parse_expression("'a' + 'b'").unwrap();
        assert_eq!(ast.to_expression_string(), "('a' + 'b')");
    }

    #[test]
    fn configured_length_limit_applies() {
        let configuration = SpelParserConfiguration::default().with_maximum_expression_length(3);
        let error = parse_expression_with_configuration("1 + 1", &configuration).unwrap_err();
        assert_eq!(error.code, codes::lexical::MAX_EXPRESSION_LENGTH_EXCEEDED);
        assert!(error.is_lexical());
    }

    #[test]
    fn syntax_failures_carry_category() {
        let error = parse_expression("1 +").unwrap_err();
        assert_eq!(error.category(), "Syntax");
        assert_eq!(error.position, 2);
    }
}
