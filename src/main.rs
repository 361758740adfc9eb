use std::{fs::read_to_string, path::PathBuf, process};

use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use interpreter::{
    analyze,
    config::{InterpreterConfig, DEFAULT_MAX_CALL_DEPTH},
    errors::errors::Diagnostics,
    interpreter::StdoutSink,
    parse_source, render_error, run,
    symbols::table::SymbolTable,
};

#[derive(Parser)]
#[command(name = "interpreter", about = "Checks and runs a program", version)]
struct Cli {
    /// Source file to run
    file: PathBuf,

    /// Stop after semantic analysis
    #[arg(long)]
    analyze_only: bool,

    /// Print the symbol table after the last pass
    #[arg(long)]
    symbols: bool,

    /// Nested calls allowed before a call is refused
    #[arg(long, env = "INTERPRETER_MAX_CALL_DEPTH", default_value_t = DEFAULT_MAX_CALL_DEPTH)]
    max_call_depth: usize,

    /// More logging, repeat for debug output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let file_name = cli.file.to_string_lossy().to_string();
    let source = match read_to_string(&cli.file) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("Failed to read {}: {}", file_name, error);
            process::exit(2);
        }
    };

    let (diagnostics, symbols) = if cli.analyze_only {
        match parse_source(&source) {
            Ok(program) => {
                let analysis = analyze(&program);
                (analysis.diagnostics, analysis.symbols)
            }
            Err(error) => {
                let mut diagnostics = Diagnostics::new();
                diagnostics.push(error);
                (diagnostics, SymbolTable::new())
            }
        }
    } else {
        let config = InterpreterConfig::default().with_max_call_depth(cli.max_call_depth);
        let outcome = run(&source, &mut StdoutSink, config);
        info!(ran = outcome.ran, "run finished");
        let symbols = if outcome.ran {
            outcome.execution_symbols
        } else {
            outcome.analysis_symbols
        };
        (outcome.diagnostics, symbols)
    };

    if cli.symbols {
        print_symbols(&symbols);
    }

    for error in diagnostics.sorted() {
        eprint!("{}", render_error(error, &file_name, &source));
    }

    if !diagnostics.is_empty() {
        process::exit(1);
    }
}

fn print_symbols(symbols: &SymbolTable) {
    println!("{:<16} {:<14} {:<10} {:<8} {:<16} scope", "name", "type", "category", "at", "value");
    for row in symbols.rows() {
        let value = row
            .value
            .as_ref()
            .map_or_else(|| String::from("-"), |value| value.to_string());
        println!(
            "{:<16} {:<14} {:<10} {:<8} {:<16} {}",
            row.name,
            row.ty.to_string(),
            row.category.to_string(),
            row.position.to_string(),
            value,
            row.scope
        );
    }
}
