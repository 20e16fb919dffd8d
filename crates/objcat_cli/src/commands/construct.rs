//! Construct command implementation.

use super::millis;
use objcat_core::{Catalog, CatalogConfig, Custody};
use objcat_testkit::{performance, shared};
use serde::Serialize;
use std::time::Instant;
use tracing::info;

/// Construction comparison result.
#[derive(Debug, Serialize)]
pub struct ConstructReport {
    /// Number of generated items.
    pub quantity: usize,
    /// One entry per custody mode.
    pub runs: Vec<ConstructRun>,
}

/// Timings for one custody mode.
#[derive(Debug, Serialize)]
pub struct ConstructRun {
    /// Custody mode.
    pub custody: String,
    /// Time to build the catalog.
    pub construct_ms: f64,
    /// Time to materialize every slot.
    pub materialize_ms: f64,
    /// Time to dispose the catalog.
    pub dispose_ms: f64,
    /// Objects that materialized.
    pub live: usize,
}

fn measure(quantity: usize, custody: Custody) -> ConstructRun {
    let items = shared(performance(quantity));

    let started = Instant::now();
    let catalog = Catalog::with_config(items.iter().cloned(), CatalogConfig::new().custody(custody));
    let construct_ms = millis(started.elapsed());

    let started = Instant::now();
    let live = catalog.items_non_null().len();
    let materialize_ms = millis(started.elapsed());

    let started = Instant::now();
    catalog.dispose();
    let dispose_ms = millis(started.elapsed());

    info!(%custody, construct_ms, materialize_ms, "construction measured");
    ConstructRun {
        custody: custody.to_string(),
        construct_ms,
        materialize_ms,
        dispose_ms,
        live,
    }
}

/// Runs the construct command.
pub fn run(quantity: usize, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let report = ConstructReport {
        quantity,
        runs: vec![
            measure(quantity, Custody::Strong),
            measure(quantity, Custody::Weak),
        ],
    };

    // Output
    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            print_text_output(&report);
        }
    }

    Ok(())
}

fn print_text_output(report: &ConstructReport) {
    println!("objcat Construction Comparison");
    println!("==============================");
    println!();
    println!("Items: {}", report.quantity);
    println!();
    for run in &report.runs {
        println!("{}:", run.custody);
        println!("  Construct:   {:.3} ms", run.construct_ms);
        println!("  Materialize: {:.3} ms ({} live)", run.materialize_ms, run.live);
        println!("  Dispose:     {:.3} ms", run.dispose_ms);
    }
}
