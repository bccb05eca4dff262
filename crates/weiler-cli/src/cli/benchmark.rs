//! Benchmark command implementation.
//!
//! Clips random star-shaped polygon pairs and reports timings. Star shapes
//! (every vertex visible from the centre) keep the random polygons simple.

use std::time::Instant;

use rand::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use weiler::{clip, Point, Polygon};

use super::common::{parse_flag, rings_area};
use super::error::CliError;

const DEFAULT_ITERATIONS: usize = 100;
const DEFAULT_VERTICES: usize = 64;
const DEFAULT_SEED: u64 = 42;

/// JSON benchmark report.
#[derive(Debug, Serialize)]
pub struct BenchmarkReport {
    pub timestamp: String,
    pub iterations: usize,
    pub vertices: usize,
    pub seed: u64,
    pub total_ms: f64,
    pub avg_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub total_rings: usize,
    pub total_area: f64,
}

/// Execute the benchmark command.
pub fn cmd_benchmark(args: &[String]) -> Result<(), CliError> {
    let mut iterations = DEFAULT_ITERATIONS;
    let mut vertices = DEFAULT_VERTICES;
    let mut seed = DEFAULT_SEED;
    let mut json = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-n" | "--iterations" => {
                iterations = parse_flag(args, i)?;
                i += 1;
            }
            "--vertices" => {
                vertices = parse_flag(args, i)?;
                i += 1;
            }
            "--seed" => {
                seed = parse_flag(args, i)?;
                i += 1;
            }
            "--json" => {
                json = true;
            }
            "-v" | "--verbose" => {}
            "-h" | "--help" => {
                print_usage();
                return Ok(());
            }
            unknown => {
                return Err(CliError::usage(format!("Unknown option: {}", unknown)));
            }
        }
        i += 1;
    }

    if iterations == 0 {
        return Err(CliError::usage("--iterations must be at least 1"));
    }
    if vertices < 3 {
        return Err(CliError::usage("--vertices must be at least 3"));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let pairs: Vec<(Polygon, Polygon)> = (0..iterations)
        .map(|_| {
            let subject = random_star(&mut rng, Point::new(0.0, 0.0), vertices);
            let offset = Point::new(rng.random_range(-40.0..40.0), rng.random_range(-40.0..40.0));
            let clipper = random_star(&mut rng, offset, vertices);
            (subject, clipper)
        })
        .collect();

    log::info!("Clipping {} random pairs of {}-vertex stars (seed {})", iterations, vertices, seed);

    let mut times_ms = Vec::with_capacity(iterations);
    let mut total_rings = 0;
    let mut total_area = 0.0;

    for (subject, clipper) in &pairs {
        let start = Instant::now();
        let rings = clip(subject, clipper);
        times_ms.push(start.elapsed().as_secs_f64() * 1000.0);

        total_rings += rings.len();
        total_area += rings_area(&rings);
    }

    let total_ms: f64 = times_ms.iter().sum();
    let report = BenchmarkReport {
        timestamp: chrono::Utc::now().to_rfc3339(),
        iterations,
        vertices,
        seed,
        total_ms,
        avg_ms: total_ms / iterations as f64,
        min_ms: times_ms.iter().copied().fold(f64::INFINITY, f64::min),
        max_ms: times_ms.iter().copied().fold(0.0, f64::max),
        total_rings,
        total_area,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    println!("═══════════════════════════════════════════════");
    println!("  WEILER BENCHMARK: {} x {}-VERTEX STARS", report.iterations, report.vertices);
    println!("═══════════════════════════════════════════════");
    println!("  Seed: {}", report.seed);
    println!("  Result rings: {}", report.total_rings);
    println!("  Result area: {:.2}", report.total_area);
    println!("  Time (ms): {:.2}", report.total_ms);
    println!("  Avg per clip: {:.3}ms", report.avg_ms);
    println!("  Min / max: {:.3}ms / {:.3}ms", report.min_ms, report.max_ms);
    println!("═══════════════════════════════════════════════");

    Ok(())
}

/// Star-shaped polygon around `centre`: evenly spaced angles, random radii.
///
/// Angles increase, so the ring is counter-clockwise.
fn random_star(rng: &mut StdRng, centre: Point, vertices: usize) -> Polygon {
    let points = (0..vertices)
        .map(|i| {
            let angle = i as f64 / vertices as f64 * std::f64::consts::TAU;
            let r = rng.random_range(40.0..100.0);
            Point::new(centre.x + r * angle.cos(), centre.y + r * angle.sin())
        })
        .collect();
    Polygon::new(points)
}

fn print_usage() {
    eprintln!("Usage: weiler benchmark [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -n, --iterations <n>    Polygon pairs to clip (default: {})", DEFAULT_ITERATIONS);
    eprintln!("  --vertices <n>          Vertices per polygon (default: {})", DEFAULT_VERTICES);
    eprintln!("  --seed <n>              Random seed (default: {})", DEFAULT_SEED);
    eprintln!("  --json                  Output report as JSON");
    eprintln!();
    eprintln!("Benchmarks clipping on random star-shaped polygons.");
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use weiler::is_ccw;

    #[test]
    fn stars_are_ccw_and_seeded() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        let s1 = random_star(&mut a, Point::new(0.0, 0.0), 12);
        let s2 = random_star(&mut b, Point::new(0.0, 0.0), 12);

        assert_eq!(s1, s2);
        assert_eq!(s1.outer.len(), 12);
        assert!(is_ccw(&s1.outer));
    }
}
