//! Clip command implementation.

use std::fs;
use std::time::Instant;

use weiler::{clip_with, ClipOptions};

use super::common::{parse_flag, flag_value, rings_to_svg, ClipReport, OutputFormat};
use super::error::CliError;
use super::job::{load_job, EXAMPLE_JOB};
use super::render::render_png;

/// Parsed `clip` arguments.
#[derive(Debug, Clone, PartialEq)]
struct ClipArgs {
    input: String,
    output: Option<String>,
    format: OutputFormat,
    png: Option<String>,
    scale: f64,
    epsilon: Option<f64>,
    no_normalize: bool,
}

/// Execute the clip command.
pub fn cmd_clip(args: &[String]) -> Result<(), CliError> {
    if args.iter().any(|a| a == "-h" || a == "--help") {
        print_usage();
        return Ok(());
    }
    if args.iter().any(|a| a == "--example") {
        print!("{}", EXAMPLE_JOB);
        return Ok(());
    }

    let opts = parse_args(args)?;

    let mut job = load_job(&opts.input)?;
    if let Some(eps) = opts.epsilon {
        job.epsilon = eps;
    }
    if opts.no_normalize {
        job.normalize = false;
    }

    let (subject, clipper) = if job.normalize {
        (job.subject.normalized(), job.clipper.normalized())
    } else {
        (job.subject, job.clipper)
    };

    log::info!(
        "Clipping '{}': subject {} rings / {} points, clipper {} rings / {} points",
        job.name,
        subject.ring_count(),
        subject.rings().map(<[_]>::len).sum::<usize>(),
        clipper.ring_count(),
        clipper.rings().map(<[_]>::len).sum::<usize>(),
    );

    let start = Instant::now();
    let rings = clip_with(&subject, &clipper, &ClipOptions::with_epsilon(job.epsilon));
    let elapsed = start.elapsed();

    log::info!("{} result rings in {:.3}ms", rings.len(), elapsed.as_secs_f64() * 1000.0);

    let svg = rings_to_svg(&subject, &clipper, &rings);

    let output = match opts.format {
        OutputFormat::Svg => svg.clone(),
        OutputFormat::Json => serde_json::to_string_pretty(&ClipReport::new(&job.name, &rings))?,
    };

    // Write output
    match opts.output.as_deref() {
        Some("-") | None => {
            println!("{}", output);
        }
        Some(path) => {
            fs::write(path, &output).map_err(|e| CliError::io(path, e))?;
            log::info!("Wrote: {}", path);
        }
    }

    if let Some(png_path) = &opts.png {
        let (w, h) = render_png(&svg, png_path, opts.scale)?;
        log::info!("Wrote: {} ({}x{})", png_path, w, h);
    }

    Ok(())
}

fn parse_args(args: &[String]) -> Result<ClipArgs, CliError> {
    let mut input: Option<String> = None;
    let mut opts = ClipArgs {
        input: String::new(),
        output: None,
        format: OutputFormat::Svg,
        png: None,
        scale: 1.0,
        epsilon: None,
        no_normalize: false,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-o" | "--output" => {
                opts.output = Some(flag_value(args, i)?.to_string());
                i += 1;
            }
            "-f" | "--format" => {
                let name = flag_value(args, i)?;
                opts.format = OutputFormat::from_name(name).ok_or_else(|| {
                    CliError::usage(format!("Unknown format: {}. Use 'svg' or 'json'.", name))
                })?;
                i += 1;
            }
            "--json" => {
                opts.format = OutputFormat::Json;
            }
            "--png" => {
                opts.png = Some(flag_value(args, i)?.to_string());
                i += 1;
            }
            "--scale" => {
                opts.scale = parse_flag(args, i)?;
                i += 1;
            }
            "--eps" | "--epsilon" => {
                let eps: f64 = parse_flag(args, i)?;
                if !(eps.is_finite() && eps > 0.0) {
                    return Err(CliError::usage(format!("--eps must be positive, got {}", eps)));
                }
                opts.epsilon = Some(eps);
                i += 1;
            }
            "--no-normalize" => {
                opts.no_normalize = true;
            }
            // Handled by main
            "-v" | "--verbose" => {}
            "-" => {
                if input.is_none() {
                    input = Some("-".to_string());
                }
            }
            path if !path.starts_with('-') => {
                if input.is_none() {
                    input = Some(path.to_string());
                }
            }
            unknown => {
                return Err(CliError::usage(format!("Unknown option: {}", unknown)));
            }
        }
        i += 1;
    }

    opts.input = input.ok_or_else(|| CliError::usage("Input file required (use '-' for stdin)"))?;
    Ok(opts)
}

fn print_usage() {
    eprintln!("Usage: weiler clip <input> [options]");
    eprintln!();
    eprintln!("Input is an SVG drawing (.svg) or a job file (.yaml, .yml, .json).");
    eprintln!("In SVG, operands are picked by id or data-role (subject/main, clipper/clip),");
    eprintln!("otherwise the first two shapes are used.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -o, --output <file>     Output file (default: stdout)");
    eprintln!("  -f, --format <fmt>      Output format: svg, json (default: svg)");
    eprintln!("  --json                  Same as --format json");
    eprintln!("  --png <file>            Also render the result drawing to PNG");
    eprintln!("  --scale <n>             PNG scale factor (default: 1)");
    eprintln!("  --eps <n>               Point comparison tolerance (default: 1e-8)");
    eprintln!("  --no-normalize          Keep ring winding as given");
    eprintln!("  --example               Print an example job file");
    eprintln!("  -v, --verbose           Debug logging");
    eprintln!();
    eprintln!("Use '-' as input to read from stdin");
}

// ============================================================================
// TESTS
// ============================================================================
