//! Cursor over the eager token stream used by the parser
//!
//! The stream only moves forward, apart from explicit checkpoints taken
//! and restored inside a single grammar rule.

use crate::{
    tokens::token::{Token, TokenKind},
    utils::{Span, Spanned},
};

/// A token with span information
pub type SpannedToken = Spanned<Token>;

#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<SpannedToken>,
    position: usize,
}

impl TokenStream {
    pub fn new(tokens: Vec<SpannedToken>) -> Self {
        crate::log_debug!("Token stream created", "tokens" => tokens.len());
        Self {
            tokens,
            position: 0,
        }
    }

    // === CORE NAVIGATION ===

    /// The token under the cursor
    pub fn peek(&self) -> Option<&SpannedToken> {
        self.tokens.get(self.position)
    }

    /// The token `n` places after the cursor (`peek_ahead(0) == peek()`)
    pub fn peek_ahead(&self, n: usize) -> Option<&SpannedToken> {
        self.tokens.get(self.position + n)
    }

    pub fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.value.kind)
    }

    /// True when the current token has the given kind
    pub fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    /// True when the current token has any of the given kinds
    pub fn check_any(&self, kinds: &[TokenKind]) -> bool {
        self.peek_kind().is_some_and(|k| kinds.contains(&k))
    }

    /// Consume the current token if it has the given kind
    pub fn consume_if(&mut self, kind: TokenKind) -> Option<SpannedToken> {
        if self.check(kind) {
            self.next_token()
        } else {
            None
        }
    }

    /// Take the current token and advance
    pub fn next_token(&mut self) -> Option<SpannedToken> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    /// Span of the most recently consumed token
    pub fn previous_span(&self) -> Option<Span> {
        self.position
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.span)
    }

    pub fn has_more(&self) -> bool {
        self.position < self.tokens.len()
    }

    pub fn is_at_end(&self) -> bool {
        !self.has_more()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    // === CHECKPOINTS ===

    pub fn save_position(&self) -> usize {
        self.position
    }

    pub fn restore_position(&mut self, saved_position: usize) {
        self.position = saved_position.min(self.tokens.len());
    }

    // === ITERATION ===

    pub fn all_tokens(&self) -> &[SpannedToken] {
        &self.tokens
    }

    pub fn remaining_tokens(&self) -> impl Iterator<Item = &SpannedToken> {
        self.tokens[self.position.min(self.tokens.len())..].iter()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining_count(&self) -> usize {
        self.tokens.len().saturating_sub(self.position)
    }

    /// One-line description of the cursor for debug output
    pub fn diagnostic(&self) -> String {
        let current = self
            .peek()
            .map(|t| format!("{} at {}", t.value, t.span))
            .unwrap_or_else(|| "<end>".to_string());

        format!(
            "TokenStream(pos: {}/{}, current: {})",
            self.position,
            self.tokens.len(),
            current
        )
    }
}

impl From<Vec<SpannedToken>> for TokenStream {
    fn from(tokens: Vec<SpannedToken>) -> Self {
        Self::new(tokens)
    }
}

/// Validation functions for span accuracy
pub mod validation {
    use super::*;

    /// Spans never overlap and never go backwards
    pub fn validate_span_order(tokens: &[SpannedToken]) -> Result<(), String> {
        for window in tokens.windows(2) {
            let current = window[0].span;
            let next = window[1].span;

            if current.end > next.start {
                return Err(format!(
                    "Span order violation: token ending at {} overlaps next token at {}",
                    current.end, next.start
                ));
            }
        }
        Ok(())
    }

    /// Every span lies inside an expression of `length` chars
    pub fn validate_span_bounds(tokens: &[SpannedToken], length: usize) -> Result<(), String> {
        match tokens.iter().find(|t| t.span.end > length) {
            Some(t) => Err(format!(
                "Token {} ends at {} beyond expression length {}",
                t.value, t.span.end, length
            )),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(kind: TokenKind, start: usize, end: usize) -> SpannedToken {
        SpannedToken::new(Token::new(kind), Span::new(start, end))
    }

    #[test]
    fn navigation_and_consumption() {
        let mut stream = TokenStream::new(vec![
            tok(TokenKind::LParen, 0, 1),
            tok(TokenKind::RParen, 1, 2),
        ]);

        assert!(stream.check(TokenKind::LParen));
        assert!(stream.consume_if(TokenKind::RParen).is_none());
        assert!(stream.consume_if(TokenKind::LParen).is_some());
        assert_eq!(stream.previous_span(), Some(Span::new(0, 1)));
        assert_eq!(stream.peek_ahead(0).map(|t| t.value.kind), Some(TokenKind::RParen));
        assert!(stream.next_token().is_some());
        assert!(stream.is_at_end());
        assert!(stream.next_token().is_none());
    }

    #[test]
    fn checkpoints_restore_cursor() {
        let mut stream = TokenStream::new(vec![
            tok(TokenKind::LCurly, 0, 1),
            tok(TokenKind::Colon, 1, 2),
            tok(TokenKind::RCurly, 2, 3),
        ]);

        let mark = stream.save_position();
        stream.next_token();
        stream.next_token();
        assert_eq!(stream.remaining_count(), 1);
        stream.restore_position(mark);
        assert!(stream.check_any(&[TokenKind::LCurly, TokenKind::LSquare]));
    }

    #[test]
    fn span_validation() {
        let ordered = vec![tok(TokenKind::Plus, 0, 1), tok(TokenKind::Plus, 2, 3)];
        assert!(validation::validate_span_order(&ordered).is_ok());
        assert!(validation::validate_span_bounds(&ordered, 3).is_ok());
        assert!(validation::validate_span_bounds(&ordered, 2).is_err());

        let overlapping = vec![tok(TokenKind::Ge, 0, 2), tok(TokenKind::Plus, 1, 2)];
        assert!(validation::validate_span_order(&overlapping).is_err());
    }
}
