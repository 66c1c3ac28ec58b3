// build.rs - TOML-driven compile-time limit generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    lexical: LexicalLimits,
    syntax: SyntaxLimits,
    evaluation: EvaluationLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct LexicalLimits {
    max_expression_length: usize,
    max_string_size: usize,
    max_identifier_length: usize,
    max_token_count: usize,
}

#[derive(serde::Deserialize)]
struct SyntaxLimits {
    max_parse_depth: usize,
    max_argument_count: usize,
}

#[derive(serde::Deserialize)]
struct EvaluationLimits {
    max_evaluation_depth: usize,
    max_auto_grow_size: usize,
    max_repeated_text_size: usize,
    max_regex_length: usize,
    max_array_elements: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    max_error_collection: usize,
    log_buffer_size: usize,
    max_log_message_length: usize,
    max_log_events_per_expression: usize,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=SPEL_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=SPEL_CONFIG_DIR");

    let profile = env::var("SPEL_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("SPEL_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Workspace root is the parent of spel_compiler
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nWorkspace root: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_limits(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_limits(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_EXPRESSION_LENGTH: usize = 1_000_000;
    const ABSOLUTE_MAX_PARSE_DEPTH: usize = 1024;
    const ABSOLUTE_MAX_EVALUATION_DEPTH: usize = 4096;

    if config.lexical.max_expression_length == 0
        || config.lexical.max_expression_length > ABSOLUTE_MAX_EXPRESSION_LENGTH
    {
        panic!("LIMITS: max_expression_length must be in 1..={ABSOLUTE_MAX_EXPRESSION_LENGTH}");
    }

    if config.lexical.max_token_count == 0 {
        panic!("LIMITS: max_token_count must be positive");
    }

    if config.syntax.max_parse_depth == 0 || config.syntax.max_parse_depth > ABSOLUTE_MAX_PARSE_DEPTH
    {
        panic!("LIMITS: max_parse_depth must be in 1..={ABSOLUTE_MAX_PARSE_DEPTH}");
    }

    if config.evaluation.max_evaluation_depth == 0
        || config.evaluation.max_evaluation_depth > ABSOLUTE_MAX_EVALUATION_DEPTH
    {
        panic!("LIMITS: max_evaluation_depth must be in 1..={ABSOLUTE_MAX_EVALUATION_DEPTH}");
    }

    if config.logging.log_buffer_size < 100 {
        panic!("LIMITS: log_buffer_size must be at least 100");
    }

    if profile == "production" && config.syntax.max_parse_depth > 256 {
        panic!("PRODUCTION: max_parse_depth too high for production");
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod lexical {{
        pub const MAX_EXPRESSION_LENGTH: usize = {};
        pub const MAX_STRING_SIZE: usize = {};
        pub const MAX_IDENTIFIER_LENGTH: usize = {};
        pub const MAX_TOKEN_COUNT: usize = {};
    }}

    pub mod syntax {{
        pub const MAX_PARSE_DEPTH: usize = {};
        pub const MAX_ARGUMENT_COUNT: usize = {};
    }}

    pub mod evaluation {{
        pub const MAX_EVALUATION_DEPTH: usize = {};
        pub const MAX_AUTO_GROW_SIZE: usize = {};
        pub const MAX_REPEATED_TEXT_SIZE: usize = {};
        pub const MAX_REGEX_LENGTH: usize = {};
        pub const MAX_ARRAY_ELEMENTS: usize = {};
    }}

    pub mod logging {{
        pub const MAX_ERROR_COLLECTION: usize = {};
        pub const LOG_BUFFER_SIZE: usize = {};
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
        pub const MAX_LOG_EVENTS_PER_EXPRESSION: usize = {};
    }}
}}
"#,
        profile,
        // Lexical
        config.lexical.max_expression_length,
        config.lexical.max_string_size,
        config.lexical.max_identifier_length,
        config.lexical.max_token_count,
        // Syntax
        config.syntax.max_parse_depth,
        config.syntax.max_argument_count,
        // Evaluation
        config.evaluation.max_evaluation_depth,
        config.evaluation.max_auto_grow_size,
        config.evaluation.max_repeated_text_size,
        config.evaluation.max_regex_length,
        config.evaluation.max_array_elements,
        // Logging
        config.logging.max_error_collection,
        config.logging.log_buffer_size,
        config.logging.max_log_message_length,
        config.logging.max_log_events_per_expression,
    );

    fs::write(output_path, constants_code).unwrap();
}
