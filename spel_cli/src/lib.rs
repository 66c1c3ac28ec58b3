//! # SpEL CLI
//!
//! Argument model and the evaluate-and-render step behind the `spel`
//! binary. Kept out of `main.rs` so it can be exercised without a process.

use clap::Parser;
use spel_compiler::lexical::tokenize_with_max_length;
use spel_compiler::logging::codes;
use spel_compiler::{log_error, log_info};
use spel_compiler::{SpelParseError, SpelParserConfiguration};
use spel_runtime::prelude::*;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "spel", author, version, about = "Evaluate a SpEL expression", long_about = None)]
pub struct Cli {
    /// Expression to evaluate
    pub expression: String,

    /// Root object as inline JSON
    #[arg(long, value_name = "JSON", conflicts_with = "root_file")]
    pub root: Option<String>,

    /// Read the root object from a JSON file
    #[arg(long, value_name = "PATH")]
    pub root_file: Option<PathBuf>,

    /// Bind `#name` to a JSON value (repeatable)
    #[arg(long = "var", value_name = "NAME=JSON", value_parser = parse_variable)]
    pub variables: Vec<(String, serde_json::Value)>,

    /// Print the parsed tree before the result
    #[arg(long)]
    pub ast: bool,

    /// Print the token stream before the result
    #[arg(long)]
    pub tokens: bool,

    /// Grow null references and collections on write
    #[arg(long)]
    pub auto_grow: bool,

    /// Emit log events as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Suppress log output and the summary
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("cannot read {path}: {source}")]
    RootFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid JSON for {what}: {source}")]
    InvalidJson {
        what: String,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Expression(#[from] ExpressionError),
}

impl CliError {
    /// Process exit status: 2 for bad input, 1 for a failing expression
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::RootFile { .. } | CliError::InvalidJson { .. } => 2,
            CliError::Expression(_) => 1,
        }
    }

    pub fn render(&self, expression: &str) -> String {
        match self {
            CliError::Expression(e) => e.format_diagnostic(expression),
            other => format!("error: {}\n", other),
        }
    }
}

/// `name=JSON`; a value that is not JSON is taken as a plain string
pub fn parse_variable(binding: &str) -> Result<(String, serde_json::Value), String> {
    let (name, raw) = binding
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=JSON, got '{}'", binding))?;

    let name = name.trim();
    if name.is_empty() {
        return Err("variable name is empty".to_string());
    }

    let value = serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()));
    Ok((name.to_string(), value))
}

impl Cli {
    pub fn configuration(&self) -> SpelParserConfiguration {
        if self.auto_grow {
            SpelParserConfiguration::new(true, true)
        } else {
            SpelParserConfiguration::default()
        }
    }

    fn root_value(&self) -> Result<Value, CliError> {
        let (what, text) = match (&self.root, &self.root_file) {
            (Some(inline), _) => ("--root".to_string(), inline.clone()),
            (None, Some(path)) => {
                let text = std::fs::read_to_string(path).map_err(|source| CliError::RootFile {
                    path: path.clone(),
                    source,
                })?;
                (path.display().to_string(), text)
            }
            (None, None) => return Ok(Value::Null),
        };

        let json: serde_json::Value =
            serde_json::from_str(&text).map_err(|source| CliError::InvalidJson { what, source })?;
        Ok(Value::from_json(&json))
    }

    fn context(&self) -> Result<StandardEvaluationContext, CliError> {
        let mut context = StandardEvaluationContext::with_root(self.root_value()?);
        for (name, json) in &self.variables {
            context.set_variable(name, Value::from_json(json));
        }
        Ok(context)
    }
}

fn render_tokens(expression: &str, configuration: &SpelParserConfiguration) -> Result<String, CliError> {
    let tokens = tokenize_with_max_length(expression, configuration.maximum_expression_length)
        .map_err(|e| ExpressionError::Parse(SpelParseError::from_lexer(expression, e)))?;

    let mut rendered = String::new();
    for token in &tokens {
        rendered.push_str(&format!("{:>4}..{:<4} {}\n", token.span.start, token.span.end, token.value));
    }
    Ok(rendered)
}

fn render_ast(expression: &SpelExpression) -> String {
    let tree = serde_json::to_string_pretty(expression.ast()).unwrap_or_default();
    format!("{}\n{}\n", expression.to_string_ast(), tree)
}

/// Evaluate the expression and render everything that was asked for
pub fn run(cli: &Cli) -> Result<String, CliError> {
    let configuration = cli.configuration();
    let mut output = String::new();

    if cli.tokens {
        output.push_str(&render_tokens(&cli.expression, &configuration)?);
    }

    let parser = SpelExpressionParser::with_configuration(configuration);
    let expression = parser
        .parse_expression(&cli.expression)
        .map_err(ExpressionError::from)?;

    if cli.ast {
        output.push_str(&render_ast(&expression));
    }

    let mut context = cli.context()?;
    let value = expression
        .get_value_with_context(&mut context)
        .map_err(ExpressionError::from)?;

    log_info!("Expression evaluated", "type" => value.type_name());

    let json = serde_json::to_string_pretty(&value.to_json()).map_err(|source| {
        log_error!(codes::system::INTERNAL_ERROR, "Result serialization failed", "error" => source);
        CliError::InvalidJson {
            what: "result".to_string(),
            source,
        }
    })?;
    output.push_str(&json);
    output.push('\n');
    Ok(output)
}
