//! # coinc
//!
//! The Coins compiler driver. Runs the full lex/parse/analyze/generate
//! pipeline over a single source file and writes its artifacts next to it.

use std::{fs, path::PathBuf, process::ExitCode};

use clap::{Parser, ValueEnum};
use coins::compile;
use log::{error, info, warn};

/// Compile a Coins source file.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Path to the `.coins` source file.
    file: PathBuf,

    /// Specify the log level of the compiler.
    #[arg(value_enum, short, long, default_value_t = LogLevel::default())]
    verbosity: LogLevel,

    /// Dump the generated symbol table as JSON alongside the source.
    #[arg(long)]
    dump_symbols: bool,
}

#[derive(ValueEnum, Clone, Default, Debug)]
enum LogLevel {
    #[default]
    #[value(alias("0"))]
    Error,
    #[value(alias("1"))]
    Warn,
    #[value(alias("2"))]
    Info,
    #[value(alias("3"))]
    Debug,
    #[value(alias("4"))]
    Trace,
}

impl From<&LogLevel> for log::Level {
    fn from(value: &LogLevel) -> Self {
        match value {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

fn main() -> ExitCode {
    let args = Cli::parse();
    simple_logger::init_with_level((&args.verbosity).into()).unwrap();

    let source = match fs::read_to_string(&args.file) {
        Ok(source) => source,
        Err(err) => {
            error!("failed to read {}: {err}", args.file.display());
            return ExitCode::FAILURE;
        }
    };

    info!("compiling {}", args.file.display());
    let result = compile(&source);

    for err in &result.lex_errors {
        error!("{err}");
    }
    for err in &result.syntax_errors {
        error!("{err}");
    }
    for err in &result.semantic_errors {
        error!("{err}");
    }
    for warning in &result.semantic_warnings {
        warn!("{warning}");
    }

    if args.dump_symbols {
        match serde_json::to_string_pretty(&result.symbols) {
            Ok(json) => {
                let path = args.file.with_extension("symbols.json");
                if let Err(err) = fs::write(&path, json) {
                    error!("failed to write {}: {err}", path.display());
                }
            }
            Err(err) => error!("failed to serialize symbol table: {err}"),
        }
    }

    match result.generated {
        Some(generated) => {
            let out_path = args.file.with_extension("py");
            if let Err(err) = fs::write(&out_path, generated) {
                error!("failed to write {}: {err}", out_path.display());
                return ExitCode::FAILURE;
            }
            info!("wrote {}", out_path.display());
            ExitCode::SUCCESS
        }
        None => {
            error!("compilation failed, no output generated");
            ExitCode::FAILURE
        }
    }
}
