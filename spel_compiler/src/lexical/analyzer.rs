//! Expression tokenizer
//!
//! Scans the whole expression eagerly into a `Vec<SpannedToken>`. Positions
//! are character offsets. Any lexical failure stops the scan and is reported
//! as a [`LexerError`] carrying the offending offset.

use crate::config::compile_time::lexical::*;
use crate::grammar::keywords::alias_operator;
use crate::logging::codes::{self, Code};
use crate::tokens::{SpannedToken, Token, TokenClass, TokenKind};
use crate::utils::Span;
use crate::{log_debug, log_error, log_success};
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexerError {
    #[error("Cannot find terminating \" for string at position {position}")]
    UnterminatedDoubleQuotedString { position: usize },

    #[error("Cannot find terminating ' for string at position {position}")]
    UnterminatedQuotedString { position: usize },

    #[error("Real number at position {position} must be prefixed by zero")]
    MissingLeadingZero { position: usize },

    #[error("Real number at position {position} cannot be suffixed with a long suffix")]
    RealCannotBeLong { position: usize },

    #[error("Unexpected escape character at position {position}")]
    UnexpectedEscapeChar { position: usize },

    #[error("Missing expected character '{expected}' at position {position}")]
    MissingCharacter { position: usize, expected: char },

    #[error("Unsupported character '{character}' at position {position}")]
    UnsupportedCharacter { position: usize, character: char },

    #[error("Expression length {length} exceeds the maximum of {max} characters")]
    ExpressionTooLong { length: usize, max: usize },

    #[error("Expression produces more than {max} tokens")]
    TooManyTokens { position: usize, max: usize },

    #[error("String literal at position {position} is {size} characters, maximum is {max}")]
    StringLiteralTooLarge {
        position: usize,
        size: usize,
        max: usize,
    },

    #[error("Identifier at position {position} is {length} characters, maximum is {max}")]
    IdentifierTooLong {
        position: usize,
        length: usize,
        max: usize,
    },
}

impl LexerError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::UnterminatedDoubleQuotedString { .. } => {
                codes::lexical::NON_TERMINATING_DOUBLE_QUOTED_STRING
            }
            Self::UnterminatedQuotedString { .. } => codes::lexical::NON_TERMINATING_QUOTED_STRING,
            Self::MissingLeadingZero { .. } => codes::lexical::MISSING_LEADING_ZERO_FOR_NUMBER,
            Self::RealCannotBeLong { .. } => codes::lexical::REAL_CANNOT_BE_LONG,
            Self::UnexpectedEscapeChar { .. } => codes::lexical::UNEXPECTED_ESCAPE_CHAR,
            Self::MissingCharacter { .. } => codes::lexical::MISSING_CHARACTER,
            Self::UnsupportedCharacter { .. } => codes::lexical::UNSUPPORTED_CHARACTER,
            Self::ExpressionTooLong { .. } => codes::lexical::MAX_EXPRESSION_LENGTH_EXCEEDED,
            Self::TooManyTokens { .. } => codes::lexical::MAX_TOKEN_COUNT_EXCEEDED,
            Self::StringLiteralTooLarge { .. } => codes::lexical::STRING_LITERAL_TOO_LARGE,
            Self::IdentifierTooLong { .. } => codes::lexical::IDENTIFIER_TOO_LONG,
        }
    }

    /// Character offset the error points at
    pub fn position(&self) -> usize {
        match self {
            Self::UnterminatedDoubleQuotedString { position }
            | Self::UnterminatedQuotedString { position }
            | Self::MissingLeadingZero { position }
            | Self::RealCannotBeLong { position }
            | Self::UnexpectedEscapeChar { position }
            | Self::MissingCharacter { position, .. }
            | Self::UnsupportedCharacter { position, .. }
            | Self::TooManyTokens { position, .. }
            | Self::StringLiteralTooLarge { position, .. }
            | Self::IdentifierTooLong { position, .. } => *position,
            Self::ExpressionTooLong { .. } => 0,
        }
    }

    /// Arguments for the message template of [`Self::error_code`]
    pub fn inserts(&self) -> Vec<String> {
        match self {
            Self::MissingCharacter { expected, .. } => vec![expected.to_string()],
            Self::UnsupportedCharacter { character, .. } => {
                vec![character.to_string(), u32::from(*character).to_string()]
            }
            Self::ExpressionTooLong { max, .. }
            | Self::TooManyTokens { max, .. }
            | Self::StringLiteralTooLarge { max, .. }
            | Self::IdentifierTooLong { max, .. } => vec![max.to_string()],
            _ => Vec::new(),
        }
    }
}

/// Counters gathered during one tokenizer run
#[derive(Debug, Default, Clone)]
pub struct LexicalMetrics {
    pub total_tokens: usize,
    pub literal_tokens: usize,
    pub identifier_tokens: usize,
    pub operator_tokens: usize,
    pub punctuation_tokens: usize,
    pub navigation_tokens: usize,
    pub reference_tokens: usize,
    pub alias_operators: usize,
    pub whitespace_skipped: usize,
    pub max_string_length: usize,
    pub max_identifier_length: usize,
}

impl LexicalMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_token(&mut self, kind: TokenKind) {
        self.total_tokens += 1;
        match kind.token_class() {
            TokenClass::Literal => self.literal_tokens += 1,
            TokenClass::Identifier => self.identifier_tokens += 1,
            TokenClass::Operator => self.operator_tokens += 1,
            TokenClass::Punctuation => self.punctuation_tokens += 1,
            TokenClass::Navigation => self.navigation_tokens += 1,
            TokenClass::Reference => self.reference_tokens += 1,
        }
    }

    pub fn record_string_length(&mut self, length: usize) {
        self.max_string_length = self.max_string_length.max(length);
    }

    pub fn record_identifier_length(&mut self, length: usize) {
        self.max_identifier_length = self.max_identifier_length.max(length);
    }
}

pub struct Tokenizer {
    chars: Vec<char>,
    pos: usize,
    tokens: Vec<SpannedToken>,
    metrics: LexicalMetrics,
    max_expression_length: usize,
}

impl Tokenizer {
    pub fn new(expression: &str) -> Self {
        Self::with_max_length(expression, MAX_EXPRESSION_LENGTH)
    }

    /// Tokenizer enforcing a caller-supplied expression length limit
    pub fn with_max_length(expression: &str, max_expression_length: usize) -> Self {
        Self {
            chars: expression.chars().collect(),
            pos: 0,
            tokens: Vec::new(),
            metrics: LexicalMetrics::new(),
            max_expression_length,
        }
    }

    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    /// Scan the whole expression
    pub fn tokenize(mut self) -> Result<Vec<SpannedToken>, LexerError> {
        let start_time = Instant::now();

        match self.process() {
            Ok(()) => {
                log_success!(codes::success::TOKENIZATION_COMPLETE,
                    "Tokenization completed",
                    "tokens" => self.tokens.len(),
                    "chars" => self.chars.len(),
                    "literals" => self.metrics.literal_tokens,
                    "identifiers" => self.metrics.identifier_tokens,
                    "operators" => self.metrics.operator_tokens,
                    "aliases" => self.metrics.alias_operators,
                    "max_string_length" => self.metrics.max_string_length,
                    "duration_ms" => start_time.elapsed().as_secs_f64() * 1000.0
                );
                Ok(self.tokens)
            }
            Err(err) => {
                log_error!(err.error_code(), &err.to_string(),
                    span = Span::single(err.position()),
                    "position" => err.position(),
                    "tokens_before_error" => self.tokens.len()
                );
                Err(err)
            }
        }
    }

    fn process(&mut self) -> Result<(), LexerError> {
        if self.chars.len() > self.max_expression_length {
            return Err(LexerError::ExpressionTooLong {
                length: self.chars.len(),
                max: self.max_expression_length,
            });
        }

        while let Some(ch) = self.current() {
            match ch {
                'a'..='z' | 'A'..='Z' | '_' => self.lex_identifier()?,
                '+' => self.push_one_or_two('+', TokenKind::Plus, TokenKind::Inc)?,
                '-' => self.push_one_or_two('-', TokenKind::Minus, TokenKind::Dec)?,
                ':' => self.push_symbol(TokenKind::Colon)?,
                '.' => {
                    if self.peek_is_digit() && !self.previous_ends_operand() {
                        return Err(LexerError::MissingLeadingZero { position: self.pos });
                    }
                    self.push_symbol(TokenKind::Dot)?
                }
                ',' => self.push_symbol(TokenKind::Comma)?,
                '*' => self.push_symbol(TokenKind::Star)?,
                '/' => self.push_symbol(TokenKind::Div)?,
                '%' => self.push_symbol(TokenKind::Mod)?,
                '(' => self.push_symbol(TokenKind::LParen)?,
                ')' => self.push_symbol(TokenKind::RParen)?,
                '[' => self.push_symbol(TokenKind::LSquare)?,
                ']' => self.push_symbol(TokenKind::RSquare)?,
                '{' => self.push_symbol(TokenKind::LCurly)?,
                '}' => self.push_symbol(TokenKind::RCurly)?,
                '#' => self.push_symbol(TokenKind::Hash)?,
                '@' => self.push_symbol(TokenKind::BeanRef)?,
                '^' => self.push_one_or_two('[', TokenKind::Power, TokenKind::SelectFirst)?,
                '!' => match self.peek() {
                    Some('=') => self.push_symbol(TokenKind::Ne)?,
                    Some('[') => self.push_symbol(TokenKind::Project)?,
                    _ => self.push_symbol(TokenKind::Not)?,
                },
                '=' => self.push_one_or_two('=', TokenKind::Assign, TokenKind::Eq)?,
                '&' => {
                    self.push_one_or_two('&', TokenKind::FactoryBeanRef, TokenKind::SymbolicAnd)?
                }
                '|' => {
                    if self.peek() != Some('|') {
                        return Err(LexerError::MissingCharacter {
                            position: self.pos,
                            expected: '|',
                        });
                    }
                    self.push_symbol(TokenKind::SymbolicOr)?
                }
                '?' => match self.peek() {
                    Some('[') => self.push_symbol(TokenKind::Select)?,
                    Some(':') => self.push_symbol(TokenKind::Elvis)?,
                    Some('.') => self.push_symbol(TokenKind::SafeNavi)?,
                    _ => self.push_symbol(TokenKind::QMark)?,
                },
                '$' => {
                    if self.peek() == Some('[') {
                        self.push_symbol(TokenKind::SelectLast)?
                    } else {
                        self.lex_identifier()?
                    }
                }
                '>' => self.push_one_or_two('=', TokenKind::Gt, TokenKind::Ge)?,
                '<' => self.push_one_or_two('=', TokenKind::Lt, TokenKind::Le)?,
                '0'..='9' => self.lex_numeric_literal(ch == '0')?,
                ' ' | '\t' | '\r' | '\n' => {
                    self.metrics.whitespace_skipped += 1;
                    self.pos += 1;
                }
                '\'' => self.lex_quoted_string_literal('\'')?,
                '"' => self.lex_quoted_string_literal('"')?,
                '\\' => {
                    return Err(LexerError::UnexpectedEscapeChar { position: self.pos });
                }
                other => {
                    return Err(LexerError::UnsupportedCharacter {
                        position: self.pos,
                        character: other,
                    });
                }
            }
        }

        log_debug!("Expression scanned",
            "chars" => self.chars.len(),
            "tokens" => self.tokens.len(),
            "whitespace" => self.metrics.whitespace_skipped
        );

        Ok(())
    }

    // ========================================================================
    // Lexeme scanners
    // ========================================================================

    fn lex_identifier(&mut self) -> Result<(), LexerError> {
        let start = self.pos;
        self.pos += 1;
        while self.current().is_some_and(is_identifier_char) {
            self.pos += 1;
        }

        let length = self.pos - start;
        if length > MAX_IDENTIFIER_LENGTH {
            return Err(LexerError::IdentifierTooLong {
                position: start,
                length,
                max: MAX_IDENTIFIER_LENGTH,
            });
        }
        self.metrics.record_identifier_length(length);

        let word = self.text(start, self.pos);
        match alias_operator(&word) {
            Some(kind) => {
                self.metrics.alias_operators += 1;
                self.push(Token::with_data(kind, word), start, self.pos)
            }
            None => self.push(Token::with_data(TokenKind::Identifier, word), start, self.pos),
        }
    }

    fn lex_numeric_literal(&mut self, first_char_is_zero: bool) -> Result<(), LexerError> {
        let start = self.pos;

        if first_char_is_zero && matches!(self.peek(), Some('x' | 'X')) {
            self.pos += 2;
            while self.current().is_some_and(|c| c.is_ascii_hexdigit()) {
                self.pos += 1;
            }
            let digits = self.text(start + 2, self.pos);
            let end = self.pos;
            if self.is_char('L', 'l') {
                self.pos += 1;
                return self.push(Token::with_data(TokenKind::LiteralHexLong, digits), start, end + 1);
            }
            return self.push(Token::with_data(TokenKind::LiteralHexInt, digits), start, end);
        }

        self.consume_digits();

        let mut is_real = false;
        if self.current() == Some('.') {
            let dot = self.pos;
            self.pos += 1;
            self.consume_digits();
            if self.pos == dot + 1 {
                // `3.foo`: an int followed by navigation
                self.pos = dot;
                let digits = self.text(start, dot);
                return self.push(Token::with_data(TokenKind::LiteralInt, digits), start, dot);
            }
            is_real = true;
        }

        let end_of_number = self.pos;

        if self.is_char('L', 'l') {
            if is_real {
                return Err(LexerError::RealCannotBeLong { position: start });
            }
            let digits = self.text(start, end_of_number);
            self.pos += 1;
            return self.push(
                Token::with_data(TokenKind::LiteralLong, digits),
                start,
                end_of_number + 1,
            );
        }

        if self.is_char('e', 'E') {
            self.pos += 1;
            if self.is_char('+', '-') {
                self.pos += 1;
            }
            self.consume_digits();
            let is_float = self.is_char('f', 'F');
            if is_float || self.is_char('d', 'D') {
                self.pos += 1;
            }
            return self.push_real(start, is_float);
        }

        let is_float = self.is_char('f', 'F');
        if is_float || self.is_char('d', 'D') {
            self.pos += 1;
            return self.push_real(start, is_float);
        }

        if is_real {
            self.push_real(start, false)
        } else {
            let digits = self.text(start, end_of_number);
            self.push(Token::with_data(TokenKind::LiteralInt, digits), start, end_of_number)
        }
    }

    /// Quoted literal; a doubled quote char stands for one literal quote
    fn lex_quoted_string_literal(&mut self, quote: char) -> Result<(), LexerError> {
        let start = self.pos;
        self.pos += 1;

        loop {
            match self.current() {
                None => {
                    return Err(if quote == '"' {
                        LexerError::UnterminatedDoubleQuotedString { position: start }
                    } else {
                        LexerError::UnterminatedQuotedString { position: start }
                    });
                }
                Some(c) if c == quote => {
                    if self.peek() == Some(quote) {
                        self.pos += 2;
                    } else {
                        self.pos += 1;
                        break;
                    }
                }
                Some(_) => self.pos += 1,
            }
        }

        let size = self.pos - start;
        if size > MAX_STRING_SIZE {
            return Err(LexerError::StringLiteralTooLarge {
                position: start,
                size,
                max: MAX_STRING_SIZE,
            });
        }
        self.metrics.record_string_length(size);

        let raw = self.text(start, self.pos);
        self.push(Token::with_data(TokenKind::LiteralString, raw), start, self.pos)
    }

    // ========================================================================
    // Token emission
    // ========================================================================

    fn push_real(&mut self, start: usize, is_float: bool) -> Result<(), LexerError> {
        let kind = if is_float {
            TokenKind::LiteralRealFloat
        } else {
            TokenKind::LiteralReal
        };
        let text = self.text(start, self.pos);
        self.push(Token::with_data(kind, text), start, self.pos)
    }

    /// Emit `two` when the next char is `second`, else `one`
    fn push_one_or_two(
        &mut self,
        second: char,
        one: TokenKind,
        two: TokenKind,
    ) -> Result<(), LexerError> {
        if self.peek() == Some(second) {
            self.push_symbol(two)
        } else {
            self.push_symbol(one)
        }
    }

    fn push_symbol(&mut self, kind: TokenKind) -> Result<(), LexerError> {
        let start = self.pos;
        self.pos += kind.symbol_len();
        self.push(Token::new(kind), start, self.pos)
    }

    fn push(&mut self, token: Token, start: usize, end: usize) -> Result<(), LexerError> {
        if self.tokens.len() >= MAX_TOKEN_COUNT {
            return Err(LexerError::TooManyTokens {
                position: start,
                max: MAX_TOKEN_COUNT,
            });
        }
        self.metrics.record_token(token.kind);
        self.tokens.push(SpannedToken::new(token, Span::new(start, end)));
        Ok(())
    }

    // ========================================================================
    // Cursor helpers
    // ========================================================================

    fn current(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn peek_is_digit(&self) -> bool {
        self.peek().is_some_and(|c| c.is_ascii_digit())
    }

    fn is_char(&self, a: char, b: char) -> bool {
        self.current().is_some_and(|c| c == a || c == b)
    }

    fn consume_digits(&mut self) {
        while self.current().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
    }

    fn text(&self, start: usize, end: usize) -> String {
        self.chars[start..end].iter().collect()
    }

    /// True when the last token can be followed by navigation
    fn previous_ends_operand(&self) -> bool {
        self.tokens.last().is_some_and(|t| {
            t.value.kind.is_literal()
                || matches!(
                    t.value.kind,
                    TokenKind::Identifier | TokenKind::RParen | TokenKind::RSquare | TokenKind::RCurly
                )
        })
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}
