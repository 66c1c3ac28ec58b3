//! # SpEL CLI
//!

use clap::Parser;
use spel_cli::{run, Cli};
use spel_compiler::config::LoggingPreferences;
use spel_compiler::logging;

fn init_logging(cli: &Cli) -> Result<(), String> {
    let mut preferences = LoggingPreferences::default();
    if cli.json_logs {
        preferences.use_structured_logging = true;
        preferences.enable_console_logging = true;
    }
    logging::config::init_runtime_preferences(preferences)?;
    logging::init_global_logging()
}

fn main() {
    let cli = Cli::parse();

    // without a global logger the library stays silent
    if !cli.quiet {
        if let Err(e) = init_logging(&cli) {
            eprintln!("warning: logging disabled: {}", e);
        }
    }

    let result = logging::with_expression_context(&cli.expression, || run(&cli));

    if !cli.quiet {
        logging::print_cargo_style_summary();
    }

    match result {
        Ok(output) => print!("{}", output),
        Err(e) => {
            eprint!("{}", e.render(&cli.expression));
            std::process::exit(e.exit_code());
        }
    }
}
