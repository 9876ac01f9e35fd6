use std::{fs::read_to_string, path::PathBuf, process};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use zenith::{check_source, config::Flags, dump_symbols};

/// Checks a zenith source file and reports its diagnostics.
#[derive(Debug, Parser)]
#[command(name = "zenith", version)]
struct Args {
    /// Source file to check
    input: PathBuf,

    /// Whether control-flow bodies must be blocks
    #[arg(long, value_enum, default_value = "required")]
    braces: Braces,

    /// Print the syntax tree
    #[arg(long)]
    dump_ast: bool,

    /// Print the global scope after analysis
    #[arg(long)]
    dump_symbols: bool,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum Braces {
    Optional,
    Required,
}

impl From<Braces> for Flags {
    fn from(braces: Braces) -> Self {
        match braces {
            Braces::Optional => Flags::braces_optional(),
            Braces::Required => Flags::default(),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let source = read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let file_name = args
        .input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.input.display().to_string());

    debug!("checking {} ({} bytes)", file_name, source.len());
    let result = check_source(&source, &file_name, args.braces.into());

    for diagnostic in &result.diagnostics {
        eprintln!("{}", diagnostic.render(&source));
    }

    if args.dump_ast {
        print!("{}", result.program.to_tree_string());
    }
    if args.dump_symbols {
        print!("{}", dump_symbols(&result.program));
    }

    info!("{} diagnostics", result.diagnostics.len());

    if result.has_errors() {
        process::exit(1);
    }

    Ok(())
}
