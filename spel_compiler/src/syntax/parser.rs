//! Recursive-descent parser for SpEL expressions
//!
//! [`SpelParser`] is stateless: each call builds a fresh [`ParseSession`]
//! holding the token cursor and nesting depth, so one parser can be shared
//! across threads. Every grammar rule returns the node it built, or `None`
//! when the construct is absent at the cursor, and callers decide whether an
//! absent construct is an error.

use crate::config::compile_time::syntax::{MAX_ARGUMENT_COUNT, MAX_PARSE_DEPTH};
use crate::config::SpelParserConfiguration;
use crate::grammar::keywords::{identifier_operator, is_keyword_identifier, Keyword};
use crate::grammar::{BinaryOp, Literal, NodeKind, SelectionVariant, SpelNode, UnaryOp};
use crate::lexical::Tokenizer;
use crate::logging::{codes, Code};
use crate::syntax::error::{ParseResult, SpelParseError};
use crate::tokens::{SpannedToken, Token, TokenKind, TokenStream};
use crate::utils::Span;

const RELATIONAL_OPERATORS: &[TokenKind] = &[
    TokenKind::Gt,
    TokenKind::Ge,
    TokenKind::Lt,
    TokenKind::Le,
    TokenKind::Eq,
    TokenKind::Ne,
    TokenKind::InstanceOf,
    TokenKind::Matches,
    TokenKind::Between,
];

/// Reusable, thread-safe expression parser
#[derive(Debug, Clone, Copy, Default)]
pub struct SpelParser {
    configuration: SpelParserConfiguration,
}

impl SpelParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_configuration(configuration: SpelParserConfiguration) -> Self {
        Self { configuration }
    }

    pub fn configuration(&self) -> &SpelParserConfiguration {
        &self.configuration
    }

    /// Tokens of `expression` under this parser's length limit
    pub fn tokenize(&self, expression: &str) -> ParseResult<Vec<SpannedToken>> {
        Tokenizer::with_max_length(expression, self.configuration.maximum_expression_length)
            .tokenize()
            .map_err(|err| SpelParseError::from_lexer(expression, err))
    }

    /// Parse `expression` into exactly one AST root
    pub fn parse(&self, expression: &str) -> ParseResult<SpelNode> {
        let tokens = self.tokenize(expression)?;
        ParseSession::new(expression, TokenStream::new(tokens)).parse_root()
    }
}

/// All state of one parse call
pub struct ParseSession<'a> {
    expression: &'a str,
    expression_length: usize,
    tokens: TokenStream,
    depth: usize,
}

impl<'a> ParseSession<'a> {
    pub fn new(expression: &'a str, tokens: TokenStream) -> Self {
        Self {
            expression,
            expression_length: expression.chars().count(),
            tokens,
            depth: 0,
        }
    }

    /// Parse the whole stream; leftover tokens are an error
    pub fn parse_root(mut self) -> ParseResult<SpelNode> {
        crate::log_debug!("Parse session started",
            "expression_length" => self.expression_length,
            "tokens" => self.tokens.len()
        );

        let Some(ast) = self.eat_expression()? else {
            return Err(self.error(0, codes::syntax::OOD, vec![]));
        };

        if let Some(extra) = self.tokens.peek() {
            return Err(self.error(
                extra.span.start,
                codes::syntax::MORE_INPUT,
                vec![extra.value.describe()],
            ));
        }

        Ok(ast)
    }

    // ========================================================================
    // Expression levels
    // ========================================================================

    // expression: logicalOr ((ASSIGN | ELVIS) expression | QMARK expression COLON expression)?
    fn eat_expression(&mut self) -> ParseResult<Option<SpelNode>> {
        self.enter()?;
        let result = self.eat_expression_body();
        self.depth -= 1;
        result
    }

    fn eat_expression_body(&mut self) -> ParseResult<Option<SpelNode>> {
        let expr = self.eat_logical_or()?;

        let Some(t) = self.tokens.peek().cloned() else {
            return Ok(expr);
        };

        match t.value.kind {
            TokenKind::Assign => {
                let target = expr.unwrap_or_else(|| SpelNode::null_literal(Span::shifted(t.span, -1, -1)));
                self.tokens.next_token();
                let value = self.eat_expression()?;
                let value = self.check_right_operand(&t, value)?;
                Ok(Some(SpelNode::new(
                    NodeKind::Assign {
                        target: Box::new(target),
                        value: Box::new(value),
                    },
                    t.span,
                )))
            }
            TokenKind::Elvis => {
                let value = expr.unwrap_or_else(|| SpelNode::null_literal(Span::shifted(t.span, -1, -2)));
                self.tokens.next_token();
                let fallback = self
                    .eat_expression()?
                    .unwrap_or_else(|| SpelNode::null_literal(Span::shifted(t.span, 1, 1)));
                Ok(Some(SpelNode::new(
                    NodeKind::Elvis {
                        value: Box::new(value),
                        fallback: Box::new(fallback),
                    },
                    t.span,
                )))
            }
            TokenKind::QMark => {
                let condition = expr.unwrap_or_else(|| SpelNode::null_literal(Span::shifted(t.span, -1, -1)));
                self.tokens.next_token();
                let if_true = self.eat_expression()?;
                let if_true = self.check_right_operand(&t, if_true)?;
                self.eat_token(TokenKind::Colon)?;
                let if_false = self.eat_expression()?;
                let if_false = self.check_right_operand(&t, if_false)?;
                Ok(Some(SpelNode::new(
                    NodeKind::Ternary {
                        condition: Box::new(condition),
                        if_true: Box::new(if_true),
                        if_false: Box::new(if_false),
                    },
                    t.span,
                )))
            }
            _ => Ok(expr),
        }
    }

    // logicalOr: logicalAnd ((OR | 'or') logicalAnd)*
    fn eat_logical_or(&mut self) -> ParseResult<Option<SpelNode>> {
        let mut expr = self.eat_logical_and()?;
        while let Some((_, t)) = self.take_operator(&[TokenKind::SymbolicOr]) {
            let rhs = self.eat_logical_and()?;
            expr = Some(self.binary(BinaryOp::Or, &t, expr, rhs)?);
        }
        Ok(expr)
    }

    // logicalAnd: relational ((AND | 'and') relational)*
    fn eat_logical_and(&mut self) -> ParseResult<Option<SpelNode>> {
        let mut expr = self.eat_relational()?;
        while let Some((_, t)) = self.take_operator(&[TokenKind::SymbolicAnd]) {
            let rhs = self.eat_relational()?;
            expr = Some(self.binary(BinaryOp::And, &t, expr, rhs)?);
        }
        Ok(expr)
    }

    // relational: sum (relationalOperator sum)?
    fn eat_relational(&mut self) -> ParseResult<Option<SpelNode>> {
        let expr = self.eat_sum()?;
        let Some((kind, t)) = self.take_operator(RELATIONAL_OPERATORS) else {
            return Ok(expr);
        };

        let rhs = self.eat_sum()?;
        let op = self.operator_for(kind, &t)?;
        self.binary(op, &t, expr, rhs).map(Some)
    }

    // sum: product ((PLUS | MINUS) product)*
    fn eat_sum(&mut self) -> ParseResult<Option<SpelNode>> {
        let mut expr = self.eat_product()?;
        while let Some((kind, t)) = self.take_operator(&[TokenKind::Plus, TokenKind::Minus]) {
            let rhs = self.eat_product()?;
            let op = self.operator_for(kind, &t)?;
            expr = Some(self.binary(op, &t, expr, rhs)?);
        }
        Ok(expr)
    }

    // product: powerUnary ((STAR | DIV | MOD) powerUnary)*
    fn eat_product(&mut self) -> ParseResult<Option<SpelNode>> {
        let mut expr = self.eat_power_unary()?;
        while let Some((kind, t)) =
            self.take_operator(&[TokenKind::Star, TokenKind::Div, TokenKind::Mod])
        {
            let rhs = self.eat_power_unary()?;
            let op = self.operator_for(kind, &t)?;
            expr = Some(self.binary(op, &t, expr, rhs)?);
        }
        Ok(expr)
    }

    // powerUnary: unary (POWER unary | INC | DEC)?
    fn eat_power_unary(&mut self) -> ParseResult<Option<SpelNode>> {
        let expr = self.eat_unary()?;

        if let Some(t) = self.tokens.consume_if(TokenKind::Power) {
            let rhs = self.eat_unary()?;
            return self.binary(BinaryOp::Power, &t, expr, rhs).map(Some);
        }

        let Some(operand) = expr else {
            return Ok(None);
        };

        if let Some(t) = self.tokens.consume_if(TokenKind::Inc) {
            return Ok(Some(SpelNode::new(
                NodeKind::Increment {
                    operand: Box::new(operand),
                    postfix: true,
                },
                t.span,
            )));
        }
        if let Some(t) = self.tokens.consume_if(TokenKind::Dec) {
            return Ok(Some(SpelNode::new(
                NodeKind::Decrement {
                    operand: Box::new(operand),
                    postfix: true,
                },
                t.span,
            )));
        }

        Ok(Some(operand))
    }

    // unary: (PLUS | MINUS | NOT | INC | DEC) unary | primary
    fn eat_unary(&mut self) -> ParseResult<Option<SpelNode>> {
        let is_prefix = self.tokens.check_any(&[
            TokenKind::Not,
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Inc,
            TokenKind::Dec,
        ]);
        if !is_prefix {
            return self.eat_primary();
        }

        let t = self.take_token()?;
        self.enter()?;
        let operand = self.eat_unary();
        self.depth -= 1;
        let operand = Box::new(self.check_right_operand(&t, operand?)?);

        let kind = match t.value.kind {
            TokenKind::Not => NodeKind::Unary {
                op: UnaryOp::Not,
                operand,
            },
            TokenKind::Plus => NodeKind::Unary {
                op: UnaryOp::Plus,
                operand,
            },
            TokenKind::Minus => NodeKind::Unary {
                op: UnaryOp::Minus,
                operand,
            },
            TokenKind::Inc => NodeKind::Increment {
                operand,
                postfix: false,
            },
            _ => NodeKind::Decrement {
                operand,
                postfix: false,
            },
        };
        Ok(Some(SpelNode::new(kind, t.span)))
    }

    // primary: startNode node*
    fn eat_primary(&mut self) -> ParseResult<Option<SpelNode>> {
        let Some(start) = self.eat_start_node()? else {
            return Ok(None);
        };

        let mut steps = Vec::new();
        while let Some(step) = self.eat_node()? {
            steps.push(step);
        }

        let Some(last) = steps.last() else {
            return Ok(Some(start));
        };

        let span = start.span.merge(last.span);
        steps.insert(0, start);
        Ok(Some(SpelNode::new(NodeKind::Compound(steps), span)))
    }

    // node: ('.' | '?.') dottedNode | indexer
    fn eat_node(&mut self) -> ParseResult<Option<SpelNode>> {
        if self.tokens.check_any(&[TokenKind::Dot, TokenKind::SafeNavi]) {
            return self.eat_dotted_node().map(Some);
        }
        if self.tokens.check(TokenKind::LSquare) {
            return self.maybe_eat_indexer(false);
        }
        Ok(None)
    }

    // dottedNode: methodOrProperty | functionOrVar | projection | selection | indexer
    fn eat_dotted_node(&mut self) -> ParseResult<SpelNode> {
        let t = self.take_token()?;
        let null_safe = t.value.kind == TokenKind::SafeNavi;

        if let Some(node) = self.maybe_eat_method_or_property(null_safe)? {
            return Ok(node);
        }
        if let Some(node) = self.maybe_eat_function_or_var()? {
            return Ok(node);
        }
        if let Some(node) = self.maybe_eat_projection(null_safe)? {
            return Ok(node);
        }
        if let Some(node) = self.maybe_eat_selection(null_safe)? {
            return Ok(node);
        }
        if let Some(node) = self.maybe_eat_indexer(null_safe)? {
            return Ok(node);
        }

        match self.tokens.peek() {
            None => Err(self.error(t.span.start, codes::syntax::OOD, vec![])),
            Some(next) => Err(self.error(
                t.span.start,
                codes::syntax::UNEXPECTED_DATA_AFTER_DOT,
                vec![next.value.describe()],
            )),
        }
    }

    fn eat_start_node(&mut self) -> ParseResult<Option<SpelNode>> {
        if let Some(node) = self.maybe_eat_literal()? {
            return Ok(Some(node));
        }
        if let Some(node) = self.maybe_eat_paren_expression()? {
            return Ok(Some(node));
        }
        if let Some(node) = self.maybe_eat_type_reference()? {
            return Ok(Some(node));
        }
        if let Some(node) = self.maybe_eat_null_reference() {
            return Ok(Some(node));
        }
        if let Some(node) = self.maybe_eat_constructor_reference()? {
            return Ok(Some(node));
        }
        if let Some(node) = self.maybe_eat_method_or_property(false)? {
            return Ok(Some(node));
        }
        if let Some(node) = self.maybe_eat_function_or_var()? {
            return Ok(Some(node));
        }
        if let Some(node) = self.maybe_eat_bean_reference()? {
            return Ok(Some(node));
        }
        if let Some(node) = self.maybe_eat_projection(false)? {
            return Ok(Some(node));
        }
        if let Some(node) = self.maybe_eat_selection(false)? {
            return Ok(Some(node));
        }
        if let Some(node) = self.maybe_eat_indexer(false)? {
            return Ok(Some(node));
        }
        if let Some(node) = self.maybe_eat_inline_list_or_map()? {
            return Ok(Some(node));
        }
        // `.prop` / `?.[0]` navigate from the active object
        if self.tokens.check_any(&[TokenKind::Dot, TokenKind::SafeNavi]) {
            return self.eat_dotted_node().map(Some);
        }
        Ok(None)
    }

    // ========================================================================
    // Start node rules
    // ========================================================================

    fn maybe_eat_literal(&mut self) -> ParseResult<Option<SpelNode>> {
        let Some(t) = self.tokens.peek().cloned() else {
            return Ok(None);
        };

        let literal = match t.value.kind {
            TokenKind::LiteralInt => Literal::Int(self.int_literal(&t, 10)?),
            TokenKind::LiteralHexInt => Literal::Int(self.int_literal(&t, 16)?),
            TokenKind::LiteralLong => Literal::Long(self.long_literal(&t, 10)?),
            TokenKind::LiteralHexLong => Literal::Long(self.long_literal(&t, 16)?),
            TokenKind::LiteralReal => Literal::Real(self.real_literal(&t)?),
            TokenKind::LiteralRealFloat => Literal::Float(self.float_literal(&t)?),
            TokenKind::LiteralString => Literal::String(unquote(t.value.string_value())),
            TokenKind::Identifier if is_keyword_identifier(&t.value, Keyword::True) => {
                Literal::Boolean(true)
            }
            TokenKind::Identifier if is_keyword_identifier(&t.value, Keyword::False) => {
                Literal::Boolean(false)
            }
            _ => return Ok(None),
        };

        self.tokens.next_token();
        Ok(Some(SpelNode::literal(literal, t.span)))
    }

    // parenExpr: LPAREN expression RPAREN
    fn maybe_eat_paren_expression(&mut self) -> ParseResult<Option<SpelNode>> {
        if self.tokens.consume_if(TokenKind::LParen).is_none() {
            return Ok(None);
        }
        let expr = self.eat_expression()?;
        let expr = self.expect_expression(expr)?;
        self.eat_token(TokenKind::RParen)?;
        Ok(Some(expr))
    }

    // typeRef: 'T' LPAREN qualifiedId (LSQUARE RSQUARE)* RPAREN
    fn maybe_eat_type_reference(&mut self) -> ParseResult<Option<SpelNode>> {
        let Some(t) = self
            .tokens
            .peek()
            .filter(|t| is_keyword_identifier(&t.value, Keyword::T))
            .cloned()
        else {
            return Ok(None);
        };
        self.tokens.next_token();

        // `T]` is a map key
        if self.tokens.check(TokenKind::RSquare) {
            return Ok(Some(property(&t, false)));
        }

        self.eat_token(TokenKind::LParen)?;
        let type_name = self.eat_possibly_qualified_id()?;
        let mut dimensions = 0;
        while self.tokens.consume_if(TokenKind::LSquare).is_some() {
            self.eat_token(TokenKind::RSquare)?;
            dimensions += 1;
        }
        self.eat_token(TokenKind::RParen)?;

        Ok(Some(SpelNode::new(
            NodeKind::TypeReference {
                type_name: Box::new(type_name),
                dimensions,
            },
            t.span,
        )))
    }

    fn maybe_eat_null_reference(&mut self) -> Option<SpelNode> {
        let t = self
            .tokens
            .peek()
            .filter(|t| is_keyword_identifier(&t.value, Keyword::Null))
            .cloned()?;
        self.tokens.next_token();
        Some(SpelNode::null_literal(t.span))
    }

    // constructor: 'new' qualifiedId (ctorArgs | (LSQUARE expression? RSQUARE)+ inlineList?)
    fn maybe_eat_constructor_reference(&mut self) -> ParseResult<Option<SpelNode>> {
        let Some(new_token) = self
            .tokens
            .peek()
            .filter(|t| is_keyword_identifier(&t.value, Keyword::New))
            .cloned()
        else {
            return Ok(None);
        };
        self.tokens.next_token();

        // `new]` is a map key
        if self.tokens.check(TokenKind::RSquare) {
            return Ok(Some(property(&new_token, false)));
        }

        let type_name = Box::new(self.eat_possibly_qualified_id()?);

        if self.tokens.check(TokenKind::LSquare) {
            let mut dimensions = Vec::new();
            while self.tokens.consume_if(TokenKind::LSquare).is_some() {
                if self.tokens.check(TokenKind::RSquare) {
                    dimensions.push(None);
                } else {
                    let size = self.eat_expression()?;
                    dimensions.push(Some(self.expect_expression(size)?));
                }
                self.eat_token(TokenKind::RSquare)?;
            }
            let initializer = self.maybe_eat_inline_list_or_map()?.map(Box::new);

            return Ok(Some(SpelNode::new(
                NodeKind::ArrayConstructor {
                    type_name,
                    dimensions,
                    initializer,
                },
                new_token.span,
            )));
        }

        if !self.tokens.check(TokenKind::LParen) {
            let position = self.position_of_next();
            return Err(self.error(position, codes::syntax::MISSING_CONSTRUCTOR_ARGS, vec![]));
        }
        let args = self.eat_arguments()?;

        Ok(Some(SpelNode::new(
            NodeKind::Constructor { type_name, args },
            new_token.span,
        )))
    }

    fn maybe_eat_method_or_property(&mut self, null_safe: bool) -> ParseResult<Option<SpelNode>> {
        let Some(name) = self.tokens.consume_if(TokenKind::Identifier) else {
            return Ok(None);
        };

        if !self.tokens.check(TokenKind::LParen) {
            return Ok(Some(property(&name, null_safe)));
        }

        let args = self.eat_arguments()?;
        Ok(Some(SpelNode::new(
            NodeKind::MethodReference {
                name: name.value.string_value().to_string(),
                args,
                null_safe,
            },
            name.span,
        )))
    }

    // functionOrVar: '#' IDENTIFIER methodArgs?
    fn maybe_eat_function_or_var(&mut self) -> ParseResult<Option<SpelNode>> {
        let Some(hash) = self.tokens.consume_if(TokenKind::Hash) else {
            return Ok(None);
        };
        let name_token = self.eat_token(TokenKind::Identifier)?;
        let name = name_token.value.string_value().to_string();
        let span = hash.span.merge(name_token.span);

        if !self.tokens.check(TokenKind::LParen) {
            return Ok(Some(SpelNode::new(NodeKind::VariableReference { name }, span)));
        }

        let args = self.eat_arguments()?;
        Ok(Some(SpelNode::new(
            NodeKind::FunctionReference { name, args },
            span,
        )))
    }

    // beanRef: ('@' | '&') (IDENTIFIER | STRING)
    fn maybe_eat_bean_reference(&mut self) -> ParseResult<Option<SpelNode>> {
        let Some(t) = self
            .tokens
            .peek()
            .filter(|t| matches!(t.value.kind, TokenKind::BeanRef | TokenKind::FactoryBeanRef))
            .cloned()
        else {
            return Ok(None);
        };
        self.tokens.next_token();

        let (name, name_span) = if let Some(id) = self.tokens.consume_if(TokenKind::Identifier) {
            (id.value.string_value().to_string(), id.span)
        } else if let Some(quoted) = self.tokens.consume_if(TokenKind::LiteralString) {
            (strip_quotes(quoted.value.string_value()), quoted.span)
        } else {
            return Err(self.error(t.span.start, codes::syntax::INVALID_BEAN_REFERENCE, vec![]));
        };

        let node = if t.value.kind == TokenKind::FactoryBeanRef {
            SpelNode::new(
                NodeKind::BeanReference {
                    name: format!("{}{}", TokenKind::FactoryBeanRef.symbol(), name),
                },
                t.span.merge(name_span),
            )
        } else {
            SpelNode::new(NodeKind::BeanReference { name }, name_span)
        };
        Ok(Some(node))
    }

    // projection: '![' expression ']'
    fn maybe_eat_projection(&mut self, null_safe: bool) -> ParseResult<Option<SpelNode>> {
        let Some(t) = self.tokens.consume_if(TokenKind::Project) else {
            return Ok(None);
        };
        let expression = self.eat_bracketed_body(&t)?;
        Ok(Some(SpelNode::new(
            NodeKind::Projection {
                expression: Box::new(expression),
                null_safe,
            },
            t.span,
        )))
    }

    // selection: ('?[' | '^[' | '$[') expression ']'
    fn maybe_eat_selection(&mut self, null_safe: bool) -> ParseResult<Option<SpelNode>> {
        let variant = match self.tokens.peek_kind() {
            Some(TokenKind::Select) => SelectionVariant::All,
            Some(TokenKind::SelectFirst) => SelectionVariant::First,
            Some(TokenKind::SelectLast) => SelectionVariant::Last,
            _ => return Ok(None),
        };
        let t = self.take_token()?;
        let criteria = self.eat_bracketed_body(&t)?;
        Ok(Some(SpelNode::new(
            NodeKind::Selection {
                variant,
                criteria: Box::new(criteria),
                null_safe,
            },
            t.span,
        )))
    }

    // indexer: '[' expression ']'
    fn maybe_eat_indexer(&mut self, null_safe: bool) -> ParseResult<Option<SpelNode>> {
        let Some(t) = self.tokens.consume_if(TokenKind::LSquare) else {
            return Ok(None);
        };
        let index = self.eat_bracketed_body(&t)?;
        Ok(Some(SpelNode::new(
            NodeKind::Indexer {
                index: Box::new(index),
                null_safe,
            },
            t.span,
        )))
    }

    // {} | {:} | {e (, e)*} | {k:v (, k:v)*}
    fn maybe_eat_inline_list_or_map(&mut self) -> ParseResult<Option<SpelNode>> {
        let Some(open) = self.tokens.consume_if(TokenKind::LCurly) else {
            return Ok(None);
        };

        if let Some(close) = self.tokens.consume_if(TokenKind::RCurly) {
            return Ok(Some(SpelNode::new(
                NodeKind::InlineList(Vec::new()),
                open.span.merge(close.span),
            )));
        }

        if self.tokens.consume_if(TokenKind::Colon).is_some() {
            let close = self.eat_token(TokenKind::RCurly)?;
            return Ok(Some(SpelNode::new(
                NodeKind::InlineMap(Vec::new()),
                open.span.merge(close.span),
            )));
        }

        let first = self.eat_expression()?;

        if self.tokens.check(TokenKind::RCurly) {
            let first = self.expect_expression(first)?;
            let close = self.eat_token(TokenKind::RCurly)?;
            return Ok(Some(SpelNode::new(
                NodeKind::InlineList(vec![first]),
                open.span.merge(close.span),
            )));
        }

        if self.tokens.consume_if(TokenKind::Comma).is_some() {
            let mut items = vec![self.expect_expression(first)?];
            loop {
                let item = self.eat_expression()?;
                items.push(self.expect_expression(item)?);
                if self.tokens.consume_if(TokenKind::Comma).is_none() {
                    break;
                }
            }
            let close = self.eat_token(TokenKind::RCurly)?;
            return Ok(Some(SpelNode::new(
                NodeKind::InlineList(items),
                open.span.merge(close.span),
            )));
        }

        if self.tokens.consume_if(TokenKind::Colon).is_some() {
            let key = self.expect_expression(first)?;
            let value = self.eat_expression()?;
            let mut entries = vec![(key, self.expect_expression(value)?)];
            while self.tokens.consume_if(TokenKind::Comma).is_some() {
                let key = self.eat_expression()?;
                let key = self.expect_expression(key)?;
                self.eat_token(TokenKind::Colon)?;
                let value = self.eat_expression()?;
                entries.push((key, self.expect_expression(value)?));
            }
            let close = self.eat_token(TokenKind::RCurly)?;
            return Ok(Some(SpelNode::new(
                NodeKind::InlineMap(entries),
                open.span.merge(close.span),
            )));
        }

        Err(self.error(open.span.start, codes::syntax::OOD, vec![]))
    }

    // ========================================================================
    // Shared pieces
    // ========================================================================

    /// Body of `?[`, `![` or `[` up to and including the closing `]`
    fn eat_bracketed_body(&mut self, open: &SpannedToken) -> ParseResult<SpelNode> {
        let Some(body) = self.eat_expression()? else {
            return Err(self.error(
                open.span.start,
                codes::syntax::MISSING_SELECTION_EXPRESSION,
                vec![],
            ));
        };
        self.eat_token(TokenKind::RSquare)?;
        Ok(body)
    }

    /// Dotted name made of identifier-shaped lexemes
    fn eat_possibly_qualified_id(&mut self) -> ParseResult<SpelNode> {
        let mut parts = Vec::new();
        let mut span: Option<Span> = None;

        while let Some(t) = self
            .tokens
            .peek()
            .filter(|t| is_valid_qualified_id(&t.value))
            .cloned()
        {
            self.tokens.next_token();
            if t.value.kind != TokenKind::Dot {
                parts.push(t.value.string_value().to_string());
                span = Some(span.map_or(t.span, |s| s.merge(t.span)));
            }
        }

        match span {
            Some(span) => Ok(SpelNode::new(NodeKind::QualifiedIdentifier { parts }, span)),
            None => match self.tokens.peek() {
                None => Err(self.error(self.expression_length, codes::syntax::OOD, vec![])),
                Some(t) => Err(self.error(
                    t.span.start,
                    codes::syntax::NOT_EXPECTED_TOKEN,
                    vec!["qualified ID".to_string(), t.value.kind.display_name()],
                )),
            },
        }
    }

    /// `( arg (, arg)* )` for methods, functions and constructors
    fn eat_arguments(&mut self) -> ParseResult<Vec<SpelNode>> {
        let open = self.eat_token(TokenKind::LParen)?;
        let position = open.span.start;
        let mut args = Vec::new();

        if self.tokens.is_at_end() {
            return Err(self.error(position, codes::syntax::RUN_OUT_OF_ARGUMENTS, vec![]));
        }

        if !self.tokens.check(TokenKind::RParen) {
            loop {
                let arg_position = self.position_of_next();
                let arg = self.eat_expression()?;
                let arg = self.expect_expression(arg)?;
                if args.len() >= MAX_ARGUMENT_COUNT {
                    return Err(self.error(
                        arg_position,
                        codes::syntax::TOO_MANY_ARGUMENTS,
                        vec![MAX_ARGUMENT_COUNT.to_string()],
                    ));
                }
                args.push(arg);

                if self.tokens.consume_if(TokenKind::Comma).is_none() {
                    break;
                }
                if self.tokens.is_at_end() {
                    return Err(self.error(position, codes::syntax::RUN_OUT_OF_ARGUMENTS, vec![]));
                }
            }

            if self.tokens.is_at_end() {
                return Err(self.error(position, codes::syntax::RUN_OUT_OF_ARGUMENTS, vec![]));
            }
        }

        self.eat_token(TokenKind::RParen)?;
        Ok(args)
    }

    /// Consume a binary operator token, reading textual aliases on identifiers
    fn take_operator(&mut self, kinds: &[TokenKind]) -> Option<(TokenKind, SpannedToken)> {
        let token = self.tokens.peek()?;
        let kind = if kinds.contains(&token.value.kind) {
            token.value.kind
        } else {
            identifier_operator(&token.value).filter(|k| kinds.contains(k))?
        };
        let token = self.tokens.next_token()?;
        Some((kind, token))
    }

    fn operator_for(&self, kind: TokenKind, t: &SpannedToken) -> ParseResult<BinaryOp> {
        BinaryOp::from_token_kind(kind).ok_or_else(|| {
            self.error(
                t.span.start,
                codes::system::INTERNAL_ERROR,
                vec![format!("no binary operator for {}", kind)],
            )
        })
    }

    fn binary(
        &self,
        op: BinaryOp,
        t: &SpannedToken,
        left: Option<SpelNode>,
        right: Option<SpelNode>,
    ) -> ParseResult<SpelNode> {
        let Some(left) = left else {
            return Err(self.error(t.span.start, codes::syntax::LEFT_OPERAND_PROBLEM, vec![]));
        };
        let right = self.check_right_operand(t, right)?;

        Ok(SpelNode::new(
            NodeKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            t.span,
        ))
    }

    fn check_right_operand(
        &self,
        t: &SpannedToken,
        operand: Option<SpelNode>,
    ) -> ParseResult<SpelNode> {
        operand.ok_or_else(|| self.error(t.span.start, codes::syntax::RIGHT_OPERAND_PROBLEM, vec![]))
    }

    /// A required sub-expression that turned out to be absent
    fn expect_expression(&self, node: Option<SpelNode>) -> ParseResult<SpelNode> {
        if let Some(node) = node {
            return Ok(node);
        }
        match self.tokens.peek() {
            None => Err(self.error(self.expression_length, codes::syntax::OOD, vec![])),
            Some(t) => Err(self.error(
                t.span.start,
                codes::syntax::NOT_EXPECTED_TOKEN,
                vec!["expression".to_string(), t.value.kind.display_name()],
            )),
        }
    }

    fn eat_token(&mut self, expected: TokenKind) -> ParseResult<SpannedToken> {
        let Some(t) = self.tokens.next_token() else {
            return Err(self.error(self.expression_length, codes::syntax::OOD, vec![]));
        };
        if t.value.kind != expected {
            return Err(self.error(
                t.span.start,
                codes::syntax::NOT_EXPECTED_TOKEN,
                vec![expected.display_name(), t.value.kind.display_name()],
            ));
        }
        Ok(t)
    }

    /// Take a token the caller has already peeked
    fn take_token(&mut self) -> ParseResult<SpannedToken> {
        match self.tokens.next_token() {
            Some(t) => Ok(t),
            None => Err(self.error(self.expression_length, codes::syntax::OOD, vec![])),
        }
    }

    fn position_of_next(&self) -> usize {
        self.tokens
            .peek()
            .map(|t| t.span.start)
            .unwrap_or(self.expression_length)
    }

    fn enter(&mut self) -> ParseResult<()> {
        if self.depth >= MAX_PARSE_DEPTH {
            return Err(self.error(
                self.position_of_next(),
                codes::syntax::MAX_PARSE_DEPTH_EXCEEDED,
                vec![MAX_PARSE_DEPTH.to_string()],
            ));
        }
        self.depth += 1;
        Ok(())
    }

    fn int_literal(&self, t: &SpannedToken, radix: u32) -> ParseResult<i32> {
        let digits = t.value.string_value();
        i32::from_str_radix(digits, radix)
            .map_err(|_| self.error(t.span.start, codes::lexical::NOT_AN_INTEGER, vec![digits.to_string()]))
    }

    fn long_literal(&self, t: &SpannedToken, radix: u32) -> ParseResult<i64> {
        let digits = t.value.string_value();
        i64::from_str_radix(digits, radix)
            .map_err(|_| self.error(t.span.start, codes::lexical::NOT_A_LONG, vec![digits.to_string()]))
    }

    fn real_literal(&self, t: &SpannedToken) -> ParseResult<f64> {
        let text = t.value.string_value();
        strip_real_suffix(text)
            .parse::<f64>()
            .map_err(|_| self.error(t.span.start, codes::lexical::NOT_A_REAL, vec![text.to_string()]))
    }

    fn float_literal(&self, t: &SpannedToken) -> ParseResult<f32> {
        let text = t.value.string_value();
        strip_real_suffix(text)
            .parse::<f32>()
            .map_err(|_| self.error(t.span.start, codes::lexical::NOT_A_REAL, vec![text.to_string()]))
    }

    fn error(&self, position: usize, code: Code, inserts: Vec<String>) -> SpelParseError {
        SpelParseError::new(self.expression, position, code, inserts)
    }
}

fn property(t: &SpannedToken, null_safe: bool) -> SpelNode {
    SpelNode::new(
        NodeKind::PropertyOrField {
            name: t.value.string_value().to_string(),
            null_safe,
        },
        t.span,
    )
}

/// Identifiers, dots and any identifier-shaped lexeme except strings
fn is_valid_qualified_id(token: &Token) -> bool {
    match token.kind {
        TokenKind::LiteralString => false,
        TokenKind::Dot | TokenKind::Identifier => true,
        _ => {
            let value = token.string_value();
            !value.is_empty() && value.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        }
    }
}

fn strip_real_suffix(text: &str) -> &str {
    text.strip_suffix(|c: char| matches!(c, 'f' | 'F' | 'd' | 'D'))
        .unwrap_or(text)
}

/// Text between the enclosing quotes, without unescaping
fn strip_quotes(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    if chars.len() < 2 {
        return String::new();
    }
    chars[1..chars.len() - 1].iter().collect()
}

/// String literal value: quotes removed, doubled quote chars collapsed
fn unquote(raw: &str) -> String {
    let inner = strip_quotes(raw);
    if raw.starts_with('"') {
        inner.replace("\"\"", "\"")
    } else {
        inner.replace("''", "'")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn parse(expression: &str) -> SpelNode {
        SpelParser::new()
            .parse(expression)
            .unwrap_or_else(|e| panic!("{expression}: {}", e.detailed_message()))
    }

    fn render(expression: &str) -> String {
        parse(expression).to_expression_string()
    }

    fn fail(expression: &str) -> SpelParseError {
        match SpelParser::new().parse(expression) {
            Ok(ast) => panic!("{expression} parsed as {ast}"),
            Err(err) => err,
        }
    }

    fn literal(expression: &str) -> Literal {
        match parse(expression).kind {
            NodeKind::Literal(literal) => literal,
            other => panic!("{expression} is not a literal: {other:?}"),
        }
    }

    #[test]
    fn literal_forms() {
        assert_eq!(literal("42"), Literal::Int(42));
        assert_eq!(literal("0x1F"), Literal::Int(31));
        assert_eq!(literal("10L"), Literal::Long(10));
        assert_eq!(literal("0x7FFFFFFFFFL"), Literal::Long(0x7F_FFFF_FFFF));
        assert_eq!(literal("3.25"), Literal::Real(3.25));
        assert_eq!(literal("1.5f"), Literal::Float(1.5));
        assert_eq!(literal("1e3"), Literal::Real(1000.0));
        assert_eq!(literal("2.5E-1d"), Literal::Real(0.25));
        assert_eq!(literal("'it''s'"), Literal::String("it's".into()));
        assert_eq!(literal("\"say \"\"hi\"\"\""), Literal::String("say \"hi\"".into()));
        assert_eq!(literal("true"), Literal::Boolean(true));
        assert_eq!(literal("FALSE"), Literal::Boolean(false));
        assert_eq!(literal("null"), Literal::Null);
        assert_eq!(literal("NULL"), Literal::Null);
    }

    #[test]
    fn number_overflow_is_categorized() {
        let err = fail("2147483648");
        assert_eq!(err.code, codes::lexical::NOT_AN_INTEGER);
        assert_eq!(err.inserts, vec!["2147483648".to_string()]);

        assert_eq!(fail("0xFFFFFFFFFFFFFFFFFL").code, codes::lexical::NOT_A_LONG);
        assert_eq!(fail("1e").code, codes::lexical::NOT_A_REAL);
        assert_eq!(fail("3.4L").code, codes::lexical::REAL_CANNOT_BE_LONG);
    }

    #[test]
    fn precedence() {
        assert_eq!(render("1 + 2 * 3"), "(1 + (2 * 3))");
        assert_eq!(render("2 + 3 > 4"), "((2 + 3) > 4)");
        assert_eq!(render("1 < 2 and 3 < 4"), "((1 < 2) and (3 < 4))");
        assert_eq!(render("a or b and c"), "(a or (b and c))");
        assert_eq!(render("1 - 2 - 3"), "((1 - 2) - 3)");
        assert_eq!(render("2 ^ 3 * 2"), "((2 ^ 3) * 2)");
        assert_eq!(render("-2 ^ 2"), "(-2 ^ 2)");
        assert_eq!(render("!a || b"), "(!a or b)");
    }

    #[test]
    fn binary_node_sits_on_operator() {
        let ast = parse("1 + 2");
        assert_matches!(ast.kind, NodeKind::Binary { op: BinaryOp::Plus, .. });
        assert_eq!((ast.start_position(), ast.end_position()), (2, 3));
    }

    #[test]
    fn textual_aliases() {
        assert_eq!(render("1 LT 2 And 3 gt 2"), "((1 < 2) and (3 > 2))");
        assert_eq!(render("a OR b"), "(a or b)");
        assert_eq!(render("10 div 2 mod 3"), "((10 / 2) % 3)");
        assert_eq!(render("not true"), "!true");
        assert_eq!(render("x instanceof T(String)"), "(x instanceof T(String))");
        assert_eq!(render("'a' MATCHES '[a-z]'"), "('a' matches '[a-z]')");
        assert_eq!(render("1 between {0, 2}"), "(1 between {0,2})");
        // a lone long alias is just a property
        assert_eq!(render("and"), "and");
    }

    #[test]
    fn alias_named_variables_do_not_parse() {
        let err = fail("#div");
        assert_eq!(err.code, codes::syntax::NOT_EXPECTED_TOKEN);
        assert_eq!(err.position, 1);
        assert_eq!(err.inserts, vec!["identifier".to_string(), "div(/)".to_string()]);
    }

    #[test]
    fn relational_operators_do_not_chain() {
        let err = fail("1 < 2 < 3");
        assert_eq!(err.code, codes::syntax::MORE_INPUT);
        assert_eq!(err.position, 6);
        assert_eq!(err.inserts, vec!["lt(<)".to_string()]);
    }

    #[test]
    fn dangling_operator_points_at_operator() {
        let err = fail("1 +");
        assert_eq!(err.code, codes::syntax::RIGHT_OPERAND_PROBLEM);
        assert_eq!(err.position, 2);

        let err = fail("* 2");
        assert_eq!(err.code, codes::syntax::LEFT_OPERAND_PROBLEM);
        assert_eq!(err.position, 0);

        assert_eq!(fail("-").code, codes::syntax::RIGHT_OPERAND_PROBLEM);
        assert_eq!(fail("a and").code, codes::syntax::RIGHT_OPERAND_PROBLEM);
    }

    #[test]
    fn ternary_elvis_assign() {
        assert_eq!(render("true ? 1 : 2"), "(true ? 1 : 2)");
        assert_eq!(render("null ?: 5"), "(null ?: 5)");
        assert_eq!(render("x = 10"), "x=10");
        assert_eq!(render("a = b = 3"), "a=b=3");
        assert_eq!(render("a ?: b ?: c"), "(a ?: (b ?: c))");

        let err = fail("a ? b");
        assert_eq!(err.code, codes::syntax::OOD);
        assert_eq!(err.position, 5);

        assert_eq!(fail("a = ").code, codes::syntax::RIGHT_OPERAND_PROBLEM);
    }

    #[test]
    fn absent_operands_become_null_literals() {
        let ast = parse("?:b");
        let NodeKind::Elvis { value, .. } = ast.kind else {
            panic!("expected elvis");
        };
        assert_eq!(value.kind, NodeKind::Literal(Literal::Null));
        assert_eq!(value.span, Span::new(0, 0));

        let ast = parse("a ?:");
        let NodeKind::Elvis { fallback, .. } = ast.kind else {
            panic!("expected elvis");
        };
        assert_eq!(fallback.kind, NodeKind::Literal(Literal::Null));
        assert_eq!(fallback.span, Span::new(3, 5));

        let ast = parse("=1");
        assert_matches!(ast.kind, NodeKind::Assign { ref target, .. } if target.kind == NodeKind::Literal(Literal::Null));

        assert_eq!(render("?1:2"), "(null ? 1 : 2)");
    }

    #[test]
    fn inline_list_and_map() {
        assert_matches!(parse("{}").kind, NodeKind::InlineList(ref items) if items.is_empty());
        assert_matches!(parse("{:}").kind, NodeKind::InlineMap(ref entries) if entries.is_empty());
        assert_matches!(parse("{1}").kind, NodeKind::InlineList(ref items) if items.len() == 1);
        assert_matches!(parse("{1,2,3}").kind, NodeKind::InlineList(ref items) if items.len() == 3);
        assert_matches!(parse("{1:2,3:4}").kind, NodeKind::InlineMap(ref entries) if entries.len() == 2);
        assert_eq!(render("{a:{1,2}, b:{:}}"), "{a:{1,2},b:{:}}");

        let err = fail("{1 2}");
        assert_eq!(err.code, codes::syntax::OOD);
        assert_eq!(err.position, 0);

        assert_eq!(fail("{1,}").code, codes::syntax::NOT_EXPECTED_TOKEN);
        assert_eq!(fail("{1:2,3}").code, codes::syntax::NOT_EXPECTED_TOKEN);
    }

    #[test]
    fn selection_and_projection() {
        assert_matches!(
            parse("?[#this>2]").kind,
            NodeKind::Selection { variant: SelectionVariant::All, null_safe: false, .. }
        );
        assert_matches!(
            parse("^[#this>2]").kind,
            NodeKind::Selection { variant: SelectionVariant::First, .. }
        );
        assert_matches!(
            parse("$[#this>2]").kind,
            NodeKind::Selection { variant: SelectionVariant::Last, .. }
        );
        assert_matches!(parse("![#this*2]").kind, NodeKind::Projection { .. });
        assert_matches!(
            parse(".?[#this>2]").kind,
            NodeKind::Selection { variant: SelectionVariant::All, .. }
        );

        assert_eq!(render("list.?[age > 3].![name]"), "list.?[(age > 3)].![name]");
        assert_eq!(render("list?.^[x]"), "list?.^[x]");
    }

    #[test]
    fn empty_selection_body() {
        let err = fail("list.?[]");
        assert_eq!(err.code, codes::syntax::MISSING_SELECTION_EXPRESSION);
        assert_eq!(err.position, 5);

        assert_eq!(fail("![]").code, codes::syntax::MISSING_SELECTION_EXPRESSION);
        assert_eq!(fail("a[]").code, codes::syntax::MISSING_SELECTION_EXPRESSION);
    }

    #[test]
    fn navigation_chains() {
        let ast = parse("a.b(1, 'x')?.c[0]");
        assert_eq!(ast.span, Span::new(0, 15));
        let NodeKind::Compound(steps) = &ast.kind else {
            panic!("expected compound");
        };
        assert_eq!(steps.len(), 4);
        assert_matches!(steps[1].kind, NodeKind::MethodReference { ref args, null_safe: false, .. } if args.len() == 2);
        assert_matches!(steps[2].kind, NodeKind::PropertyOrField { null_safe: true, .. });
        assert_matches!(steps[3].kind, NodeKind::Indexer { null_safe: false, .. });
        assert_eq!(ast.to_expression_string(), "a.b(1,'x')?.c[0]");
        assert!(ast.is_assignable());
    }

    #[test]
    fn int_followed_by_method_call() {
        assert_eq!(render("3.toString()"), "3.toString()");
    }

    #[test]
    fn variables_and_functions() {
        assert_matches!(parse("#x").kind, NodeKind::VariableReference { ref name } if name == "x");
        assert_matches!(
            parse("#max(1, 2)").kind,
            NodeKind::FunctionReference { ref name, ref args } if name == "max" && args.len() == 2
        );
        assert_eq!(render("#this.size()"), "#this.size()");
        assert_eq!(render("#fn()"), "#fn()");
    }

    #[test]
    fn argument_errors() {
        let err = fail("f(");
        assert_eq!(err.code, codes::syntax::RUN_OUT_OF_ARGUMENTS);
        assert_eq!(err.position, 1);

        assert_eq!(fail("f(1,").code, codes::syntax::RUN_OUT_OF_ARGUMENTS);
        assert_eq!(fail("f(1").code, codes::syntax::RUN_OUT_OF_ARGUMENTS);

        let err = fail("f(,1)");
        assert_eq!(err.code, codes::syntax::NOT_EXPECTED_TOKEN);
        assert_eq!(err.inserts, vec!["expression".to_string(), "comma(,)".to_string()]);

        let err = fail("f(1 2)");
        assert_eq!(err.inserts, vec!["rparen())".to_string(), "literal_int".to_string()]);
    }

    #[test]
    fn argument_count_is_bounded() {
        let args = vec!["1"; MAX_ARGUMENT_COUNT + 1].join(",");
        let err = fail(&format!("f({args})"));
        assert_eq!(err.code, codes::syntax::TOO_MANY_ARGUMENTS);

        let args = vec!["1"; MAX_ARGUMENT_COUNT].join(",");
        assert!(SpelParser::new().parse(&format!("f({args})")).is_ok());
    }

    #[test]
    fn type_references() {
        let ast = parse("T(java.lang.String[][])");
        let NodeKind::TypeReference { type_name, dimensions } = ast.kind else {
            panic!("expected type reference");
        };
        assert_eq!(dimensions, 2);
        assert_eq!(type_name.qualified_name().as_deref(), Some("java.lang.String"));

        assert_eq!(render("T(Math).max(1, 2)"), "T(Math).max(1,2)");

        let err = fail("T()");
        assert_eq!(err.code, codes::syntax::NOT_EXPECTED_TOKEN);
        assert_eq!(err.inserts[0], "qualified ID");
    }

    #[test]
    fn constructors() {
        assert_matches!(
            parse("new java.util.ArrayList()").kind,
            NodeKind::Constructor { ref args, .. } if args.is_empty()
        );
        assert_eq!(render("new Foo(1, 'a')"), "new Foo(1,'a')");
        assert_eq!(render("new int[3]"), "new int[3]");
        assert_eq!(render("new int[]{1,2}"), "new int[]{1,2}");
        assert_eq!(render("new int[2][]"), "new int[2][]");

        let err = fail("new Foo");
        assert_eq!(err.code, codes::syntax::MISSING_CONSTRUCTOR_ARGS);
        assert_eq!(err.position, 7);
    }

    #[test]
    fn keywords_as_map_keys() {
        assert_eq!(render("map[new]"), "map[new]");
        assert_eq!(render("map[T]"), "map[T]");
        assert_matches!(
            parse("[new]").kind,
            NodeKind::Indexer { ref index, .. } if matches!(index.kind, NodeKind::PropertyOrField { .. })
        );
    }

    #[test]
    fn bean_references() {
        assert_matches!(parse("@svc").kind, NodeKind::BeanReference { ref name } if name == "svc");
        assert_matches!(parse("&svc").kind, NodeKind::BeanReference { ref name } if name == "&svc");
        assert_matches!(parse("@'my.bean'").kind, NodeKind::BeanReference { ref name } if name == "my.bean");
        assert_eq!(render("@svc.run()"), "@svc.run()");

        let err = fail("@1");
        assert_eq!(err.code, codes::syntax::INVALID_BEAN_REFERENCE);
        assert_eq!(err.position, 0);
    }

    #[test]
    fn increments() {
        assert_matches!(parse("a++").kind, NodeKind::Increment { postfix: true, .. });
        assert_matches!(parse("--a").kind, NodeKind::Decrement { postfix: false, .. });
        assert_eq!(render("a.b--"), "a.b--");
        // a-- binds before the trailing identifier
        assert_eq!(fail("a--b").code, codes::syntax::MORE_INPUT);
    }

    #[test]
    fn dotted_node_errors() {
        let err = fail("a.");
        assert_eq!(err.code, codes::syntax::OOD);
        assert_eq!(err.position, 1);

        let err = fail("a.1");
        assert_eq!(err.code, codes::syntax::UNEXPECTED_DATA_AFTER_DOT);
        assert_eq!(err.inserts, vec!["1".to_string()]);
    }

    #[test]
    fn structural_errors() {
        let err = fail("");
        assert_eq!((err.code, err.position), (codes::syntax::OOD, 0));
        assert_eq!(fail("   ").code, codes::syntax::OOD);

        let err = fail("(1 + 2");
        assert_eq!((err.code, err.position), (codes::syntax::OOD, 6));

        let err = fail("1 + 2)");
        assert_eq!((err.code, err.position), (codes::syntax::MORE_INPUT, 5));
        assert_eq!(err.inserts, vec!["rparen())".to_string()]);

        let err = fail("(1 + 2]");
        assert_eq!(err.code, codes::syntax::NOT_EXPECTED_TOKEN);
        assert_eq!(err.inserts, vec!["rparen())".to_string(), "rsquare(])".to_string()]);

        assert_eq!(fail("()").code, codes::syntax::NOT_EXPECTED_TOKEN);
    }

    #[test]
    fn lexical_errors_surface_as_parse_errors() {
        let err = fail("'abc");
        assert_eq!((err.code, err.position), (codes::lexical::NON_TERMINATING_QUOTED_STRING, 0));
        assert_eq!(fail("1 ~ 2").code, codes::lexical::UNSUPPORTED_CHARACTER);
        assert_eq!(fail("a | b").code, codes::lexical::MISSING_CHARACTER);
    }

    #[test]
    fn nesting_depth_is_bounded() {
        let deep = format!("{}1{}", "(".repeat(MAX_PARSE_DEPTH + 5), ")".repeat(MAX_PARSE_DEPTH + 5));
        assert_eq!(fail(&deep).code, codes::syntax::MAX_PARSE_DEPTH_EXCEEDED);

        let negations = format!("{}true", "!".repeat(MAX_PARSE_DEPTH * 2));
        assert_eq!(fail(&negations).code, codes::syntax::MAX_PARSE_DEPTH_EXCEEDED);

        assert!(SpelParser::new().parse("((((1))))").is_ok());
    }

    #[test]
    fn expression_length_follows_configuration() {
        let parser = SpelParser::with_configuration(
            SpelParserConfiguration::default().with_maximum_expression_length(4),
        );
        assert!(parser.parse("1+2").is_ok());
        assert_eq!(
            parser.parse("1 + 2").unwrap_err().code,
            codes::lexical::MAX_EXPRESSION_LENGTH_EXCEEDED
        );
    }

    #[test]
    fn rendered_text_reparses_to_same_tree_shape() {
        for expression in [
            "a.b?.c[1] + #x * -2",
            "{1:'a', 2:{3,4}}.get(1)",
            "list.![#this ^ 2].?[#this > 10]",
            "x ?: (y ? 1L : 2.5f)",
            "T(Integer).MAX_VALUE != 0x10",
        ] {
            let once = render(expression);
            let twice = render(&once);
            assert_eq!(once, twice, "{expression}");
        }
    }

    #[test]
    fn parser_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SpelParser>();
        assert_send_sync::<SpelNode>();

        let parser = SpelParser::new();
        let first = parser.parse("1 + 1").unwrap();
        let second = parser.parse("2 * 2").unwrap();
        assert_ne!(first, second);
    }
}
