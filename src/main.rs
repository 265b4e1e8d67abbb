//! recalc - evaluate spreadsheet formulas against CSV files, with caching.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, bail};
use recalc::{CacheConfig, Calculator, CsvSource};
use tracing_subscriber::EnvFilter;

fn print_usage() {
    eprintln!("Usage: recalc [OPTIONS] <FILE> <FORMULA>...");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <FILE>                    CSV file to evaluate against");
    eprintln!("  <FORMULA>...              Formulas, e.g. \"=SUM(A1:A10)\" (can be repeated)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -s, --sheet <NAME>        Sheet name (ignored for CSV, kept in the cache key)");
    eprintln!("  -h, --help                Print help");
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();

    let mut file_path: Option<PathBuf> = None;
    let mut formulas: Vec<String> = Vec::new();
    let mut sheet: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                return Ok(());
            }
            "-s" | "--sheet" => {
                i += 1;
                if i >= args.len() {
                    bail!("--sheet requires a value");
                }
                sheet = Some(args[i].clone());
            }
            arg if arg.starts_with('-') && arg != "-" => {
                print_usage();
                bail!("unknown option: {}", arg);
            }
            arg => {
                if file_path.is_none() {
                    file_path = Some(PathBuf::from(arg));
                } else {
                    formulas.push(arg.to_string());
                }
            }
        }
        i += 1;
    }

    let Some(file_path) = file_path else {
        print_usage();
        bail!("missing <FILE>");
    };
    if formulas.is_empty() {
        print_usage();
        bail!("missing <FORMULA>");
    }

    let source = CsvSource::new(&file_path);
    let calc = Calculator::new(CacheConfig::default());

    for formula in &formulas {
        let result = calc
            .evaluate(&source, formula, sheet.as_deref())
            .with_context(|| format!("evaluating {}", formula))?;
        println!(
            "{} = {}  [{} in {:.2}ms]",
            formula,
            result.value,
            if result.cached { "cached" } else { "computed" },
            result.execution_time_ms,
        );
    }

    let stats = calc.stats();
    eprintln!(
        "cache: {} entries, {} hits, {} misses, {:.0}% hit rate",
        stats.entries,
        stats.hits,
        stats.misses,
        stats.hit_rate() * 100.0
    );
    Ok(())
}
