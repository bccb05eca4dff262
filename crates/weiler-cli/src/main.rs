//! weiler - intersect polygons with holes from the command line
//!
//! Usage:
//!   weiler clip <input> [options]     Intersect subject with clipper
//!   weiler benchmark [options]        Time clipping on random polygons
//!   weiler help                       Show usage

use std::env;

mod cli;

use cli::{cmd_benchmark, cmd_clip, CliError};

fn main() {
    let args: Vec<String> = env::args().collect();
    let prog = args.first().map(String::as_str).unwrap_or("weiler");

    let verbose = args.iter().skip(1).any(|a| a == "-v" || a == "--verbose");
    init_logging(verbose);

    let Some(command) = args.get(1) else {
        print_usage(prog);
        std::process::exit(1);
    };

    let result: Result<(), CliError> = match command.as_str() {
        "clip" => cmd_clip(&args[2..]),
        "benchmark" => cmd_benchmark(&args[2..]),
        "help" | "--help" | "-h" => {
            print_usage(prog);
            Ok(())
        }
        other => Err(CliError::usage(format!("Unknown command: {} (try '{} help')", other, prog))),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Install env_logger: `info` by default, `RUST_LOG` honored, `-v` forces debug.
fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

fn print_usage(prog: &str) {
    eprintln!("weiler - Weiler-Atherton intersection of polygons with holes");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {} clip <input> [options]", prog);
    eprintln!("  {} benchmark [-n <iterations>] [--vertices <n>] [--seed <s>] [--json]", prog);
    eprintln!("  {} help", prog);
    eprintln!();
    eprintln!("Clip options:");
    eprintln!("  -o, --output <file>   Output file (- for stdout, default: stdout)");
    eprintln!("  -f, --format <fmt>    Output format: svg, json (default: svg)");
    eprintln!("  --png <file>          Also render the drawing to PNG");
    eprintln!("  --scale <n>           PNG scale factor (default: 1)");
    eprintln!("  --eps <n>             Point comparison tolerance (default: 1e-8)");
    eprintln!("  --no-normalize        Keep ring winding as given");
    eprintln!("  --example             Print an example job file");
    eprintln!();
    eprintln!("Global options:");
    eprintln!("  -v, --verbose         Debug logging (RUST_LOG also works)");
    eprintln!();
    eprintln!("Stdin support:");
    eprintln!("  Use '-' as input to read an SVG or job file from stdin:");
    eprintln!("  cat job.yaml | {} clip - -f json", prog);
}
