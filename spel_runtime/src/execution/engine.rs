//! AST evaluation
//!
//! [`ExecutionEngine`] walks a parsed tree against one evaluation context.
//! Each node evaluates with the current active object as `#this`; compound
//! chains push every intermediate result as the active object for the next
//! step. Errors carry the start offset of the innermost node that failed.

use crate::api::context::EvaluationContext;
use crate::execution::reference::ValueRef;
use crate::execution::state::ExpressionState;
use crate::execution::{comparisons, methods, operators};
use crate::types::{EvaluationError, EvaluationResult, FunctionRef, MapKey, TypeDescriptor, Value};
use spel_compiler::logging::codes;
use spel_compiler::{BinaryOp, Literal, NodeKind, SpelNode, SpelParserConfiguration, UnaryOp};

pub struct ExecutionEngine<'a> {
    state: ExpressionState<'a>,
}

/// Boolean view of an operand or condition
pub fn to_boolean(value: &Value) -> EvaluationResult<bool> {
    value.to_boolean().ok_or_else(|| {
        EvaluationError::new(
            codes::evaluation::TYPE_CONVERSION_ERROR,
            vec![value.type_name(), "boolean".to_string()],
        )
    })
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Int(i) => Value::Int(*i),
        Literal::Long(l) => Value::Long(*l),
        Literal::Float(f) => Value::Float(*f),
        Literal::Real(r) => Value::Double(*r),
        Literal::String(s) => Value::String(s.clone()),
        Literal::Boolean(b) => Value::Boolean(*b),
        Literal::Null => Value::Null,
    }
}

impl<'a> ExecutionEngine<'a> {
    pub fn new(context: &'a mut dyn EvaluationContext, configuration: SpelParserConfiguration) -> Self {
        Self {
            state: ExpressionState::new(context, configuration),
        }
    }

    pub fn state(&self) -> &ExpressionState<'a> {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ExpressionState<'a> {
        &mut self.state
    }

    /// Evaluate `node` against the current active object
    pub fn evaluate(&mut self, node: &SpelNode) -> EvaluationResult<Value> {
        self.state
            .enter()
            .map_err(|e| e.with_position(node.start_position()))?;
        let result = self.evaluate_node(node);
        self.state.exit();
        result.map_err(|e| e.with_position(node.start_position()))
    }

    /// Resolve `node` to a location that can be read and written
    pub fn reference(&mut self, node: &SpelNode) -> EvaluationResult<ValueRef> {
        self.state
            .enter()
            .map_err(|e| e.with_position(node.start_position()))?;
        let result = self.reference_node(node);
        self.state.exit();
        result.map_err(|e| e.with_position(node.start_position()))
    }

    pub fn set_value(&mut self, node: &SpelNode, value: Value) -> EvaluationResult<()> {
        let reference = self.reference(node)?;
        self.write(&reference, value)
            .map_err(|e| e.with_position(node.start_position()))
    }

    pub fn is_writable(&mut self, node: &SpelNode) -> EvaluationResult<bool> {
        let reference = self.reference(node)?;
        Ok(self.is_writable_reference(&reference))
    }

    fn evaluate_node(&mut self, node: &SpelNode) -> EvaluationResult<Value> {
        match &node.kind {
            NodeKind::Literal(literal) => Ok(literal_value(literal)),
            NodeKind::Binary { .. } => self.evaluate_binary(node),
            NodeKind::Unary { op, operand } => {
                let value = self.evaluate(operand)?;
                match op {
                    UnaryOp::Not => Ok(Value::Boolean(!to_boolean(&value)?)),
                    UnaryOp::Minus => operators::negate(&value),
                    UnaryOp::Plus => operators::identity(&value),
                }
            }
            NodeKind::Increment { operand, postfix } => self.step(operand, 1, *postfix),
            NodeKind::Decrement { operand, postfix } => self.step(operand, -1, *postfix),
            NodeKind::Ternary {
                condition,
                if_true,
                if_false,
            } => {
                if self.condition(condition)? {
                    self.evaluate(if_true)
                } else {
                    self.evaluate(if_false)
                }
            }
            NodeKind::Elvis { value, fallback } => {
                let value = self.evaluate(value)?;
                match &value {
                    Value::Null => self.evaluate(fallback),
                    Value::String(s) if s.is_empty() => self.evaluate(fallback),
                    _ => Ok(value),
                }
            }
            NodeKind::Assign { target, value } => {
                let reference = self.reference(target)?;
                let value = self.evaluate(value)?;
                self.write(&reference, value.clone())
                    .map_err(|e| e.with_position(target.start_position()))?;
                Ok(value)
            }
            NodeKind::PropertyOrField { name, null_safe } => {
                let target = self.state.active_object();
                self.read_property(&target, name, *null_safe)
            }
            NodeKind::MethodReference {
                name,
                args,
                null_safe,
            } => {
                let target = self.state.active_object();
                self.invoke_method(&target, name, args, *null_safe)
            }
            NodeKind::FunctionReference { name, args } => self.invoke_function(name, args),
            NodeKind::VariableReference { name } => Ok(match name.as_str() {
                "this" => self.state.active_object(),
                "root" => self.state.root(),
                _ => self.state.lookup_variable(name),
            }),
            NodeKind::BeanReference { name } => self.resolve_bean(name),
            NodeKind::TypeReference {
                type_name,
                dimensions,
            } => {
                let descriptor = self.find_type(type_name)?;
                Ok(Value::Type(descriptor.with_dimensions(*dimensions)))
            }
            NodeKind::QualifiedIdentifier { parts } => Ok(Value::String(parts.join("."))),
            NodeKind::Constructor { type_name, args } => self.construct(type_name, args),
            NodeKind::ArrayConstructor {
                type_name,
                dimensions,
                initializer,
            } => self.construct_array(type_name, dimensions, initializer.as_deref()),
            NodeKind::Indexer { index, null_safe } => {
                let target = self.state.active_object();
                let reference = self.index_reference(target, index, *null_safe)?;
                self.read(&reference)
            }
            NodeKind::Selection {
                variant,
                criteria,
                null_safe,
            } => {
                let target = self.state.active_object();
                self.select(&target, *variant, criteria, *null_safe)
            }
            NodeKind::Projection {
                expression,
                null_safe,
            } => {
                let target = self.state.active_object();
                self.project(&target, expression, *null_safe)
            }
            NodeKind::InlineList(items) => self.inline_list(items),
            NodeKind::InlineMap(entries) => self.inline_map(entries),
            NodeKind::Compound(steps) => self.evaluate_compound(steps),
        }
    }

    fn reference_node(&mut self, node: &SpelNode) -> EvaluationResult<ValueRef> {
        match &node.kind {
            NodeKind::VariableReference { name } if name != "this" && name != "root" => {
                Ok(ValueRef::Variable(name.clone()))
            }
            NodeKind::PropertyOrField { name, null_safe } => {
                let target = self.state.active_object();
                if target.is_null() && *null_safe {
                    return Ok(ValueRef::NullSafe);
                }
                Ok(ValueRef::Property {
                    target,
                    name: name.clone(),
                })
            }
            NodeKind::Indexer { index, null_safe } => {
                let target = self.state.active_object();
                self.index_reference(target, index, *null_safe)
            }
            NodeKind::Compound(steps) => self.compound_reference(steps),
            _ => Ok(ValueRef::Computed {
                value: self.evaluate_node(node)?,
                text: node.to_expression_string(),
            }),
        }
    }

    // ========================================================================
    // OPERATORS
    // ========================================================================

    fn condition(&mut self, node: &SpelNode) -> EvaluationResult<bool> {
        let value = self.evaluate(node)?;
        to_boolean(&value).map_err(|e| e.with_position(node.start_position()))
    }

    /// Folds the left spine of an operator chain in a loop, so `1 + 1 + ... + 1`
    /// costs one level of evaluation depth however long it is
    fn evaluate_binary(&mut self, node: &SpelNode) -> EvaluationResult<Value> {
        let mut chain = Vec::new();
        let mut leftmost = node;
        while let NodeKind::Binary { op, left, right } = &leftmost.kind {
            chain.push((*op, right.as_ref(), leftmost));
            leftmost = left.as_ref();
        }

        let mut accumulated = self.evaluate(leftmost)?;
        let mut accumulated_node = leftmost;
        for (op, right, at) in chain.into_iter().rev() {
            accumulated = self
                .apply_binary(op, accumulated, accumulated_node, right)
                .map_err(|e| e.with_position(at.start_position()))?;
            accumulated_node = at;
        }
        Ok(accumulated)
    }

    fn apply_binary(
        &mut self,
        op: BinaryOp,
        left: Value,
        left_node: &SpelNode,
        right: &SpelNode,
    ) -> EvaluationResult<Value> {
        match op {
            BinaryOp::And | BinaryOp::Or => {
                let left = to_boolean(&left).map_err(|e| e.with_position(left_node.start_position()))?;
                let result = match op {
                    BinaryOp::And => left && self.condition(right)?,
                    _ => left || self.condition(right)?,
                };
                return Ok(Value::Boolean(result));
            }
            _ => {}
        }

        let right = self.evaluate(right)?;

        let value = match op {
            BinaryOp::Eq => Value::Boolean(comparisons::equal(&left, &right)),
            BinaryOp::Ne => Value::Boolean(!comparisons::equal(&left, &right)),
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                Value::Boolean(comparisons::relational(op, &left, &right)?)
            }
            BinaryOp::InstanceOf => Value::Boolean(comparisons::instance_of(&left, &right)?),
            BinaryOp::Matches => Value::Boolean(comparisons::matches(&mut self.state, &left, &right)?),
            BinaryOp::Between => Value::Boolean(comparisons::between(&left, &right)?),
            BinaryOp::Plus => operators::add(&left, &right)?,
            BinaryOp::Minus => operators::subtract(&left, &right)?,
            BinaryOp::Multiply => operators::multiply(&left, &right)?,
            BinaryOp::Divide => operators::divide(&left, &right)?,
            BinaryOp::Modulus => operators::modulus(&left, &right)?,
            BinaryOp::Power => operators::power(&left, &right)?,
            BinaryOp::And | BinaryOp::Or => {
                return Err(EvaluationError::internal("logical operator reached arithmetic"))
            }
        };
        Ok(value)
    }

    /// `++`/`--`; postfix forms answer the value before the update
    fn step(&mut self, operand: &SpelNode, delta: i32, postfix: bool) -> EvaluationResult<Value> {
        let reference = self.reference(operand)?;
        let current = self.read(&reference)?;

        let Some(updated) = operators::step(&current, delta) else {
            let code = if delta > 0 {
                codes::evaluation::OPERAND_NOT_INCREMENTABLE
            } else {
                codes::evaluation::OPERAND_NOT_DECREMENTABLE
            };
            return Err(EvaluationError::new(code, vec![operand.to_expression_string()]));
        };

        self.write(&reference, updated.clone())
            .map_err(|e| e.with_position(operand.start_position()))?;
        Ok(if postfix { current } else { updated })
    }

    // ========================================================================
    // NAVIGATION
    // ========================================================================

    fn evaluate_compound(&mut self, steps: &[SpelNode]) -> EvaluationResult<Value> {
        let Some((last, leading)) = steps.split_last() else {
            return Ok(self.state.active_object());
        };

        match self.navigate(leading, last)? {
            Some(target) if target.is_null() && last.is_null_safe() => Ok(Value::Null),
            Some(target) => self.with_active(target, |engine| engine.evaluate(last)),
            None => Ok(Value::Null),
        }
    }

    fn compound_reference(&mut self, steps: &[SpelNode]) -> EvaluationResult<ValueRef> {
        let Some((last, leading)) = steps.split_last() else {
            return Err(EvaluationError::internal("empty navigation chain"));
        };

        match self.navigate(leading, last)? {
            Some(target) if target.is_null() && last.is_null_safe() => Ok(ValueRef::NullSafe),
            Some(target) => self.with_active(target, |engine| engine.reference(last)),
            None => Ok(ValueRef::NullSafe),
        }
    }

    /// Run the leading steps of a chain; `None` when a `?.` step met null
    fn navigate(&mut self, steps: &[SpelNode], last: &SpelNode) -> EvaluationResult<Option<Value>> {
        let mut current: Option<Value> = None;

        for (i, step) in steps.iter().enumerate() {
            let next = steps.get(i + 1).unwrap_or(last);
            let value = match current.take() {
                None => self.navigate_step(step, next)?,
                Some(target) if target.is_null() && step.is_null_safe() => return Ok(None),
                Some(target) => self.with_active(target, |engine| engine.navigate_step(step, next))?,
            };
            current = Some(value);
        }

        Ok(current.or_else(|| Some(self.state.active_object())))
    }

    /// One intermediate step; fills null map properties when auto-grow is on
    fn navigate_step(&mut self, step: &SpelNode, next: &SpelNode) -> EvaluationResult<Value> {
        let NodeKind::PropertyOrField { name, null_safe: false } = &step.kind else {
            return self.evaluate(step);
        };
        if !self.state.configuration().auto_grow_null_references {
            return self.evaluate(step);
        }

        let Value::Map(map) = self.state.active_object() else {
            return self.evaluate(step);
        };

        let key = MapKey::from(name.as_str());
        if let Some(existing) = map.borrow().get(&key).filter(|v| !v.is_null()) {
            return Ok(existing.clone());
        }

        let grown = if matches!(next.kind, NodeKind::Indexer { .. }) {
            Value::list(Vec::new())
        } else {
            Value::empty_map()
        };
        map.borrow_mut().insert(key, grown.clone());
        Ok(grown)
    }

    pub(crate) fn with_active<T>(
        &mut self,
        target: Value,
        f: impl FnOnce(&mut Self) -> EvaluationResult<T>,
    ) -> EvaluationResult<T> {
        self.state.push_active(target);
        let result = f(self);
        self.state.pop_active();
        result
    }

    fn index_reference(&mut self, target: Value, index: &SpelNode, null_safe: bool) -> EvaluationResult<ValueRef> {
        if target.is_null() {
            if null_safe {
                return Ok(ValueRef::NullSafe);
            }
            return Err(EvaluationError::new(
                codes::evaluation::CANNOT_INDEX_INTO_NULL_VALUE,
                vec![],
            ));
        }

        // bare names index maps by key instead of being read as properties
        let index = match (&target, &index.kind) {
            (Value::Map(_), NodeKind::PropertyOrField { name, .. }) => Value::String(name.clone()),
            _ => {
                let scope = self.state.scope_root();
                self.with_active(scope, |engine| engine.evaluate(index))?
            }
        };

        Ok(ValueRef::Indexed { target, index })
    }

    // ========================================================================
    // INVOCATION
    // ========================================================================

    /// Arguments see the scope root as `#this`, not the call target
    fn evaluate_arguments(&mut self, args: &[SpelNode]) -> EvaluationResult<Vec<Value>> {
        let scope = self.state.scope_root();
        self.with_active(scope, |engine| {
            args.iter().map(|arg| engine.evaluate(arg)).collect()
        })
    }

    fn invoke_method(
        &mut self,
        target: &Value,
        name: &str,
        args: &[SpelNode],
        null_safe: bool,
    ) -> EvaluationResult<Value> {
        let values = self.evaluate_arguments(args)?;

        if target.is_null() {
            if null_safe {
                return Ok(Value::Null);
            }
            return Err(EvaluationError::new(
                codes::evaluation::METHOD_CALL_ON_NULL_OBJECT_NOT_ALLOWED,
                vec![methods::format_signature(name, &values)],
            ));
        }

        let invocation_failed = |message: String| {
            EvaluationError::new(
                codes::evaluation::EXCEPTION_DURING_METHOD_INVOCATION,
                vec![name.to_string(), target.type_name(), message],
            )
        };

        for resolver in self.state.context().method_resolvers() {
            if let Some(result) = resolver.invoke(target, name, &values) {
                return result.map_err(invocation_failed);
            }
        }

        match methods::invoke(target, name, &values) {
            Some(result) => result.map_err(invocation_failed),
            None => Err(EvaluationError::new(
                codes::evaluation::METHOD_NOT_FOUND,
                vec![methods::format_signature(name, &values), target.type_name()],
            )),
        }
    }

    fn invoke_function(&mut self, name: &str, args: &[SpelNode]) -> EvaluationResult<Value> {
        let function: FunctionRef = match self.state.lookup_variable(name) {
            Value::Function(function) => function,
            Value::Null => {
                return Err(EvaluationError::new(
                    codes::evaluation::FUNCTION_NOT_DEFINED,
                    vec![name.to_string()],
                ))
            }
            _ => {
                return Err(EvaluationError::new(
                    codes::evaluation::FUNCTION_REFERENCE_CANNOT_BE_INVOKED,
                    vec![name.to_string()],
                ))
            }
        };

        let values = self.evaluate_arguments(args)?;
        if let Some(arity) = function.arity() {
            if arity != values.len() {
                return Err(EvaluationError::new(
                    codes::evaluation::INCORRECT_NUMBER_OF_ARGUMENTS_TO_FUNCTION,
                    vec![name.to_string(), values.len().to_string(), arity.to_string()],
                ));
            }
        }

        function.call(&values).map_err(|message| {
            EvaluationError::new(
                codes::evaluation::EXCEPTION_DURING_METHOD_INVOCATION,
                vec![
                    name.to_string(),
                    "java.lang.reflect.Method".to_string(),
                    message,
                ],
            )
        })
    }

    fn resolve_bean(&mut self, name: &str) -> EvaluationResult<Value> {
        let Some(resolver) = self.state.context().bean_resolver() else {
            return Err(EvaluationError::new(
                codes::evaluation::NO_BEAN_RESOLVER_REGISTERED,
                vec![name.to_string()],
            ));
        };

        resolver.resolve(name).map_err(|message| {
            EvaluationError::new(
                codes::evaluation::EXCEPTION_DURING_BEAN_RESOLUTION,
                vec![name.to_string(), message],
            )
        })
    }

    // ========================================================================
    // TYPES
    // ========================================================================

    pub(crate) fn find_type(&mut self, type_name: &SpelNode) -> EvaluationResult<TypeDescriptor> {
        let name = type_name
            .qualified_name()
            .unwrap_or_else(|| type_name.to_expression_string());

        self.state
            .context()
            .type_locator()
            .find_type(&name)
            .ok_or_else(|| EvaluationError::new(codes::evaluation::TYPE_NOT_FOUND, vec![name]))
    }

    fn construct(&mut self, type_name: &SpelNode, args: &[SpelNode]) -> EvaluationResult<Value> {
        let descriptor = self.find_type(type_name)?;
        let values = self.evaluate_arguments(args)?;

        match methods::construct(&descriptor, &values) {
            Some(Ok(value)) => Ok(value),
            Some(Err(message)) => Err(EvaluationError::new(
                codes::evaluation::EXCEPTION_DURING_METHOD_INVOCATION,
                vec!["<init>".to_string(), descriptor.name(), message],
            )),
            None => {
                let types: Vec<String> = values.iter().map(Value::type_name).collect();
                Err(EvaluationError::new(
                    codes::evaluation::CONSTRUCTOR_NOT_FOUND,
                    vec![descriptor.name(), format!("({})", types.join(","))],
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::context::StandardEvaluationContext;
    use crate::strategies::{MethodResolver, StaticBeanResolver};
    use assert_matches::assert_matches;
    use spel_compiler::parse_expression;

    fn eval_in(context: &mut StandardEvaluationContext, expression: &str) -> EvaluationResult<Value> {
        let ast = parse_expression(expression).unwrap();
        ExecutionEngine::new(context, SpelParserConfiguration::default()).evaluate(&ast)
    }

    fn eval(expression: &str) -> EvaluationResult<Value> {
        eval_in(&mut StandardEvaluationContext::new(), expression)
    }

    fn value(expression: &str) -> Value {
        eval(expression).unwrap()
    }

    fn code_of(expression: &str) -> &'static str {
        eval(expression).unwrap_err().code.as_str()
    }

    #[test]
    fn literals() {
        assert_eq!(value("42"), Value::Int(42));
        assert_eq!(value("0x7FFFFFFF"), Value::Int(i32::MAX));
        assert_eq!(value("3L"), Value::Long(3));
        assert_eq!(value("2.5f"), Value::Float(2.5));
        assert_eq!(value("1e3"), Value::Double(1000.0));
        assert_eq!(value("'it''s'"), Value::string("it's"));
        assert_eq!(value("\"a\"\"b\""), Value::string("a\"b"));
        assert_eq!(value("null"), Value::Null);
        assert_eq!(value("TRUE"), Value::Boolean(true));
    }

    #[test]
    fn precedence() {
        assert_eq!(value("1 + 2 * 3"), Value::Int(7));
        assert_eq!(value("2 + 3 > 4"), Value::Boolean(true));
        assert_eq!(value("1 < 2 and 3 < 4"), Value::Boolean(true));
        assert_eq!(value("2 ^ 10"), Value::Int(1024));
        assert_eq!(value("-2 ^ 2"), Value::Int(4));
        assert_eq!(value("10 div 3 + 10 mod 3"), Value::Int(4));
    }

    #[test]
    fn logical_operators_short_circuit() {
        assert_eq!(value("false and 1/0 == 1"), Value::Boolean(false));
        assert_eq!(value("true or 1/0 == 1"), Value::Boolean(true));
        assert_eq!(value("!false"), Value::Boolean(true));
        assert_eq!(value("'TRUE' and 'false'"), Value::Boolean(false));
        assert_eq!(code_of("1 and true"), "EL1001E");
        assert_eq!(code_of("null or true"), "EL1001E");
    }

    #[test]
    fn errors_point_at_the_innermost_node() {
        let error = eval("1 + 10 / 0").unwrap_err();
        assert_eq!(error.code, codes::evaluation::DIVISION_BY_ZERO);
        assert_eq!(error.position, Some(7));
    }

    #[test]
    fn ternary_and_elvis() {
        assert_eq!(value("true ? 1 : 2"), Value::Int(1));
        assert_eq!(value("false ? 1 : 2"), Value::Int(2));
        assert_eq!(value("null ?: 'x'"), Value::string("x"));
        assert_eq!(value("'' ?: 'x'"), Value::string("x"));
        assert_eq!(value("'a' ?: 'x'"), Value::string("a"));
        assert_eq!(code_of("null ? 1 : 2"), "EL1001E");
    }

    #[test]
    fn assignment_writes_variables_and_properties() {
        let root = Value::map([("x", Value::Int(1))]);
        let mut context = StandardEvaluationContext::with_root(root.clone());

        assert_eq!(eval_in(&mut context, "x = 10").unwrap(), Value::Int(10));
        assert_eq!(eval_in(&mut context, "x").unwrap(), Value::Int(10));
        assert_eq!(root.to_string(), "{x=10}");

        assert_eq!(eval_in(&mut context, "#count = 3").unwrap(), Value::Int(3));
        assert_eq!(eval_in(&mut context, "#count").unwrap(), Value::Int(3));

        let error = eval_in(&mut context, "1 = 2").unwrap_err();
        assert_eq!(error.code, codes::evaluation::NOT_ASSIGNABLE);
        let error = eval_in(&mut context, "#this = 2").unwrap_err();
        assert_eq!(error.code, codes::evaluation::NOT_ASSIGNABLE);
    }

    #[test]
    fn increments() {
        let root = Value::map([("n", Value::Int(1))]);
        let mut context = StandardEvaluationContext::with_root(root.clone());

        assert_eq!(eval_in(&mut context, "n++").unwrap(), Value::Int(1));
        assert_eq!(eval_in(&mut context, "++n").unwrap(), Value::Int(3));
        assert_eq!(eval_in(&mut context, "n--").unwrap(), Value::Int(3));
        assert_eq!(root.to_string(), "{n=2}");

        context.set_root_object(Value::map([("s", Value::string("a"))]));
        let error = eval_in(&mut context, "s++").unwrap_err();
        assert_eq!(error.code, codes::evaluation::OPERAND_NOT_INCREMENTABLE);
        let error = eval_in(&mut context, "--s").unwrap_err();
        assert_eq!(error.code, codes::evaluation::OPERAND_NOT_DECREMENTABLE);
        assert_eq!(code_of("5++"), "EL1055E");
    }

    #[test]
    fn property_navigation() {
        let root = Value::from_json(&serde_json::json!({
            "person": {"name": "Ada", "address": null},
            "tags": ["a", "b"]
        }));
        let mut context = StandardEvaluationContext::with_root(root);

        assert_eq!(eval_in(&mut context, "person.name").unwrap(), Value::string("Ada"));
        assert_eq!(eval_in(&mut context, "person.name.length()").unwrap(), Value::Int(3));
        assert_eq!(eval_in(&mut context, "person.address?.city").unwrap(), Value::Null);
        assert_eq!(eval_in(&mut context, "person.address?.city.length()").unwrap(), Value::Null);
        assert_eq!(eval_in(&mut context, "tags[1]").unwrap(), Value::string("b"));
        assert_eq!(eval_in(&mut context, "tags.size()").unwrap(), Value::Int(2));
        assert_eq!(eval_in(&mut context, "person['name']").unwrap(), Value::string("Ada"));
        assert_eq!(eval_in(&mut context, "person[name]").unwrap(), Value::string("Ada"));

        let error = eval_in(&mut context, "person.address.city").unwrap_err();
        assert_eq!(error.code, codes::evaluation::PROPERTY_OR_FIELD_NOT_READABLE_ON_NULL);
        assert_eq!(error.position, Some(15));

        let error = eval_in(&mut context, "person.age").unwrap_err();
        assert_eq!(error.code, codes::evaluation::PROPERTY_OR_FIELD_NOT_READABLE);
    }

    #[test]
    fn auto_grow_fills_null_references() {
        let root = Value::map([("a", Value::Null)]);
        let mut context = StandardEvaluationContext::with_root(root.clone());
        let configuration = SpelParserConfiguration::new(true, true);

        let ast = parse_expression("a.b = 1").unwrap();
        ExecutionEngine::new(&mut context, configuration).evaluate(&ast).unwrap();
        assert_eq!(root.to_string(), "{a={b=1}}");

        let ast = parse_expression("list[2] = 'x'").unwrap();
        ExecutionEngine::new(&mut context, configuration).evaluate(&ast).unwrap();
        assert_eq!(root.to_json()["list"], serde_json::json!([null, null, "x"]));
    }

    #[test]
    fn indexing() {
        assert_eq!(value("'abc'[1]"), Value::string("b"));
        assert_eq!(value("{1,2,3}[0]"), Value::Int(1));
        assert_eq!(value("{a:1}['a']"), Value::Int(1));
        assert_eq!(value("{a:1}['z']"), Value::Null);
        assert_eq!(code_of("{1,2}[5]"), "EL1025E");
        assert_eq!(code_of("null[0]"), "EL1012E");
        assert_eq!(code_of("true[0]"), "EL1027E");
    }

    #[test]
    fn variables_this_and_root() {
        let mut context = StandardEvaluationContext::with_root(Value::Int(5));
        assert_eq!(eval_in(&mut context, "#root + #this").unwrap(), Value::Int(10));
        assert_eq!(eval_in(&mut context, "#undefined").unwrap(), Value::Null);
    }

    #[test]
    fn functions() {
        let mut context = StandardEvaluationContext::new();
        context.register_function(FunctionRef::new("twice", 1, |args| {
            operators::multiply(&args[0], &Value::Int(2)).map_err(|e| e.to_string())
        }));
        context.register_function(FunctionRef::variadic("count", |args| {
            Ok(Value::Int(args.len() as i32))
        }));
        context.register_function(FunctionRef::new("fail", 0, |_| Err("boom".to_string())));
        context.set_variable("plain", Value::Int(1));

        assert_eq!(eval_in(&mut context, "#twice(21)").unwrap(), Value::Int(42));
        assert_eq!(eval_in(&mut context, "#count(1, 2, 3)").unwrap(), Value::Int(3));

        let error = eval_in(&mut context, "#twice(1, 2)").unwrap_err();
        assert_eq!(error.code, codes::evaluation::INCORRECT_NUMBER_OF_ARGUMENTS_TO_FUNCTION);
        assert_eq!(error.inserts, vec!["twice", "2", "1"]);

        assert_eq!(eval_in(&mut context, "#nope()").unwrap_err().code.as_str(), "EL1006E");
        assert_eq!(eval_in(&mut context, "#plain()").unwrap_err().code.as_str(), "EL1016E");
        assert_eq!(eval_in(&mut context, "#fail()").unwrap_err().code.as_str(), "EL1029E");
    }

    struct Greeter;

    impl MethodResolver for Greeter {
        fn invoke(&self, target: &Value, name: &str, args: &[Value]) -> Option<Result<Value, String>> {
            match (target, name, args) {
                (Value::String(s), "greet", []) => Some(Ok(Value::String(format!("hello {}", s)))),
                _ => None,
            }
        }
    }

    #[test]
    fn methods_try_resolvers_then_builtins() {
        let mut context = StandardEvaluationContext::new();
        context.add_method_resolver(Greeter);

        assert_eq!(eval_in(&mut context, "'bob'.greet()").unwrap(), Value::string("hello bob"));
        assert_eq!(eval_in(&mut context, "'bob'.toUpperCase()").unwrap(), Value::string("BOB"));

        let error = eval_in(&mut context, "'bob'.fly(1)").unwrap_err();
        assert_eq!(error.code, codes::evaluation::METHOD_NOT_FOUND);
        assert_eq!(error.inserts, vec!["fly(java.lang.Integer)", "java.lang.String"]);

        let error = eval_in(&mut context, "null.toString()").unwrap_err();
        assert_eq!(error.code, codes::evaluation::METHOD_CALL_ON_NULL_OBJECT_NOT_ALLOWED);
    }

    #[test]
    fn method_arguments_see_the_scope_root() {
        let root = Value::map([("n", Value::Int(1)), ("s", Value::string("abc"))]);
        let mut context = StandardEvaluationContext::with_root(root);
        assert_eq!(eval_in(&mut context, "s.substring(n)").unwrap(), Value::string("bc"));
    }

    #[test]
    fn beans() {
        assert_eq!(code_of("@config"), "EL1057E");

        let mut context = StandardEvaluationContext::new();
        context.set_bean_resolver(StaticBeanResolver::new().with_bean("config", Value::Int(7)));
        assert_eq!(eval_in(&mut context, "@config").unwrap(), Value::Int(7));
        assert_eq!(eval_in(&mut context, "@missing").unwrap_err().code.as_str(), "EL1058E");
    }

    #[test]
    fn types_and_constructors() {
        assert_matches!(value("T(String)"), Value::Type(t) if t.name() == "java.lang.String");
        assert_matches!(value("T(int[])"), Value::Type(t) if t.name() == "int[]");
        assert_eq!(value("T(Integer).MAX_VALUE"), Value::Int(i32::MAX));
        assert_eq!(value("T(Math).max(2, 5)"), Value::Int(5));
        assert_eq!(value("'x' instanceof T(String)"), Value::Boolean(true));
        assert_eq!(value("new String('hi')"), Value::string("hi"));
        assert_eq!(value("new java.util.ArrayList().size()"), Value::Int(0));
        assert_eq!(code_of("T(Thread)"), "EL1005E");
        assert_eq!(code_of("new Integer(true)"), "EL1002E");
    }

    #[test]
    fn relational_keywords() {
        assert_eq!(value("'abc' matches '[a-c]+'"), Value::Boolean(true));
        assert_eq!(value("3 between {1, 5}"), Value::Boolean(true));
        assert_eq!(value("1 == 1L"), Value::Boolean(true));
        assert_eq!(value("'a' != 'b'"), Value::Boolean(true));
        assert_eq!(code_of("'a' matches '('"), "EL1073E");
        assert_eq!(code_of("1 between {1}"), "EL1074E");
        assert_eq!(code_of("'a' < 1"), "EL1013E");
    }

    #[test]
    fn string_operators() {
        assert_eq!(value("'a' + 'b'"), Value::string("ab"));
        assert_eq!(value("'n=' + 1"), Value::string("n=1"));
        assert_eq!(value("'ab' * 2"), Value::string("abab"));
        assert_eq!(code_of("'a' - 1"), "EL1030E");
    }

    #[test]
    fn collections_used_as_their_own_keys() {
        let root = Value::empty_map();
        let mut context = StandardEvaluationContext::with_root(root.clone());
        assert_eq!(eval_in(&mut context, "put(#root, 1)").unwrap(), Value::Null);
        assert_eq!(root.to_string(), "{{}=1}");

        let root = Value::empty_map();
        let mut context = StandardEvaluationContext::with_root(root.clone());
        assert_eq!(eval_in(&mut context, "#root[#root] = 1").unwrap(), Value::Int(1));
        assert_eq!(root.to_string(), "{{}=1}");
    }

    #[test]
    fn list_removes_itself_as_a_value() {
        let root = Value::map([("x", Value::list(vec![Value::Int(1), Value::Int(2)]))]);
        let mut context = StandardEvaluationContext::with_root(root.clone());
        assert_eq!(eval_in(&mut context, "x.remove(x)").unwrap(), Value::Boolean(false));
        assert_eq!(eval_in(&mut context, "x.remove(1)").unwrap(), Value::Int(2));
        assert_eq!(eval_in(&mut context, "x.remove('1')").unwrap(), Value::Boolean(false));
        assert_eq!(root.to_string(), "{x=[1]}");
    }

    #[test]
    fn self_assignment_stays_printable() {
        let root = Value::empty_map();
        let mut context = StandardEvaluationContext::with_root(root.clone());
        let result = eval_in(&mut context, "self = #root").unwrap();
        assert_eq!(result.to_string(), "{self=(this Map)}");
        assert_eq!(result.to_json(), serde_json::json!({"self": "(this Map)"}));
        assert_eq!(result, root);
    }

    #[test]
    fn long_operator_chains_are_not_nested_evaluation() {
        let terms = vec!["1"; 1000].join(" + ");
        assert_eq!(value(&terms), Value::Int(1000));

        let conjunction = vec!["true"; 400].join(" and ");
        assert_eq!(value(&conjunction), Value::Boolean(true));
        assert_eq!(value(&format!("false and {}", conjunction)), Value::Boolean(false));

        let error = eval(&format!("{} + 'a' - 1", terms)).unwrap_err();
        assert_eq!(error.code.as_str(), "EL1030E");
    }
}
