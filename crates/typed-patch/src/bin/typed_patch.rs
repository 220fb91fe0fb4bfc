//! `typed-patch` - apply a JSON Patch (RFC 6902) or merge patch (RFC 7386)
//! to a document of a declared shape.
//!
//! Usage:
//!   typed-patch <shape-file> '<patch-json>' [--merge] [--verbose]
//!
//! The document is read from stdin, the patched document written to stdout.

use std::io::{self, Read, Write};
use std::process;

use tracing_subscriber::EnvFilter;
use typed_patch::cli::{apply_json_patch, apply_merge_patch, CliArgs, CliError};

fn run(args: &CliArgs) -> Result<String, CliError> {
    let shape = std::fs::read_to_string(&args.shape_file)?;
    let mut doc = String::new();
    io::stdin().read_to_string(&mut doc)?;
    tracing::debug!(shape_file = %args.shape_file, merge = args.merge, "patching stdin");
    if args.merge {
        apply_merge_patch(doc.trim(), &shape, &args.patch)
    } else {
        apply_json_patch(doc.trim(), &shape, &args.patch)
    }
}

fn main() {
    let args = match CliArgs::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match run(&args) {
        Ok(result) => {
            let mut stdout = io::stdout().lock();
            if let Err(e) = writeln!(stdout, "{result}") {
                eprintln!("{e}");
                process::exit(1);
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "patch failed");
            eprintln!("{e}");
            process::exit(1);
        }
    }
}
