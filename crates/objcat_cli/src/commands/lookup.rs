//! Lookup command implementation.

use super::millis;
use objcat_core::{Catalog, CatalogConfig, CatalogResult, Custody};
use objcat_testkit::{
    chaotic_performance, shared, ParentItem, CHILD_DESCRIPTION, CHILD_TYPE_NAME, DESCRIPTION,
    NAME,
};
use serde::Serialize;
use std::rc::Rc;
use std::time::Instant;
use tracing::info;

const OPERATIONAL: &str = "operational";
const CHILD: &str = "child";

/// Lookup comparison result.
#[derive(Debug, Serialize)]
pub struct LookupReport {
    /// Number of generated items.
    pub quantity: usize,
    /// Custody of the direct catalog.
    pub custody: String,
    /// Time to build the direct catalog and its indices.
    pub direct_build_ms: f64,
    /// Time to build the normalized catalog and its indices.
    pub normalized_build_ms: f64,
    /// One entry per lookup scenario.
    pub scenarios: Vec<ScenarioReport>,
}

/// Timings for one lookup scenario.
#[derive(Debug, Serialize)]
pub struct ScenarioReport {
    /// Scenario name.
    pub name: String,
    /// Catalog lookup time, materialization included.
    pub catalog_ms: f64,
    /// Linear scan time.
    pub scan_ms: f64,
    /// Objects the catalog returned.
    pub catalog_count: usize,
    /// Objects the scan returned.
    pub scan_count: usize,
    /// Whether both sides found the same number of objects.
    pub agree: bool,
}

fn upper(value: Option<String>) -> Option<String> {
    value.map(|v| v.to_uppercase())
}

fn direct_catalog(
    items: &[Rc<ParentItem>],
    custody: Custody,
    threshold: i64,
) -> CatalogResult<Catalog<ParentItem>> {
    let catalog = Catalog::with_config(items.iter().cloned(), CatalogConfig::new().custody(custody));
    catalog
        .add_index(OPERATIONAL, move |p: &ParentItem| Some(p.unique_id < threshold))?
        .add_index(NAME, ParentItem::name)?
        .add_index(DESCRIPTION, ParentItem::description)?
        .add_index(CHILD, |p: &ParentItem| p.child.clone())?
        .add_index(CHILD_TYPE_NAME, ParentItem::child_type_name)?
        .add_index(CHILD_DESCRIPTION, ParentItem::child_description)?;
    Ok(catalog)
}

fn normalized_catalog(items: &[Rc<ParentItem>]) -> CatalogResult<Catalog<ParentItem>> {
    let catalog = Catalog::with_config(items.iter().cloned(), CatalogConfig::new().strong());
    catalog
        .add_normalized_index(NAME, ParentItem::name, upper)?
        .add_normalized_index(DESCRIPTION, ParentItem::description, upper)?
        .add_normalized_index(CHILD_TYPE_NAME, ParentItem::child_type_name, upper)?
        .add_normalized_index(CHILD_DESCRIPTION, ParentItem::child_description, upper)?;
    Ok(catalog)
}

fn measure<C, S>(name: &str, catalog_side: C, scan_side: S) -> CatalogResult<ScenarioReport>
where
    C: FnOnce() -> CatalogResult<Vec<Rc<ParentItem>>>,
    S: FnOnce() -> Vec<Rc<ParentItem>>,
{
    let started = Instant::now();
    let found = catalog_side()?;
    let catalog_ms = millis(started.elapsed());

    let started = Instant::now();
    let scanned = scan_side();
    let scan_ms = millis(started.elapsed());

    info!(
        scenario = name,
        catalog_ms,
        scan_ms,
        found = found.len(),
        "scenario measured"
    );
    Ok(ScenarioReport {
        name: name.to_string(),
        catalog_ms,
        scan_ms,
        catalog_count: found.len(),
        scan_count: scanned.len(),
        agree: found.len() == scanned.len(),
    })
}

fn scan<F>(items: &[Rc<ParentItem>], predicate: F) -> Vec<Rc<ParentItem>>
where
    F: Fn(&ParentItem) -> bool,
{
    items.iter().filter(|p| predicate(p)).cloned().collect()
}

/// Runs the lookup command.
pub fn run(quantity: usize, custody: Custody, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    info!(quantity, %custody, "generating data set");
    let items = shared(chaotic_performance(quantity));
    let threshold = (quantity / 100) as i64;

    let started = Instant::now();
    let direct = direct_catalog(&items, custody, threshold)?;
    let direct_build_ms = millis(started.elapsed());

    let started = Instant::now();
    let normalized = normalized_catalog(&items)?;
    let normalized_build_ms = millis(started.elapsed());

    let mut scenarios = vec![
        measure(
            "bool operational",
            || Ok(direct.find(OPERATIONAL, Some(&true))?.get_non_null()),
            || scan(&items, |p| p.unique_id < threshold),
        )?,
        measure(
            "uniform",
            || Ok(direct.find(NAME, Some(&"Uniform"))?.get_non_null()),
            || scan(&items, |p| p.name.as_deref() == Some("Uniform")),
        )?,
        measure(
            "semi-uniform",
            || Ok(direct.find(DESCRIPTION, Some(&"SemiUniform:Even"))?.get_non_null()),
            || scan(&items, |p| p.description.as_deref() == Some("SemiUniform:Even")),
        )?,
        measure(
            "uniform normalized",
            || Ok(normalized.find(NAME, Some(&"UNIFORM"))?.get_non_null()),
            || scan(&items, |p| upper(p.name()).as_deref() == Some("UNIFORM")),
        )?,
        measure(
            "semi-uniform normalized",
            || Ok(normalized.find(DESCRIPTION, Some(&"SEMIUNIFORM:EVEN"))?.get_non_null()),
            || scan(&items, |p| upper(p.description()).as_deref() == Some("SEMIUNIFORM:EVEN")),
        )?,
        measure(
            "absent value",
            || Ok(direct.find(DESCRIPTION, Some(&"DoesNotExist"))?.get_non_null()),
            || scan(&items, |p| p.description.as_deref() == Some("DoesNotExist")),
        )?,
    ];

    if let Some(last) = items.last() {
        if let Some(type_name) = last.child_type_name() {
            scenarios.push(measure(
                "unique child type name",
                || Ok(direct.find(CHILD_TYPE_NAME, Some(&type_name))?.get_non_null()),
                || scan(&items, |p| p.child_type_name().as_deref() == Some(type_name.as_str())),
            )?);
        }
        if let Some(child) = last.child.as_ref() {
            scenarios.push(measure(
                "child object",
                || Ok(direct.find(CHILD, Some(child))?.get_non_null()),
                || scan(&items, |p| p.child.as_ref() == Some(child)),
            )?);
        }
    }

    let report = LookupReport {
        quantity,
        custody: custody.to_string(),
        direct_build_ms,
        normalized_build_ms,
        scenarios,
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

fn print_text_output(report: &LookupReport) {
    println!("objcat Lookup Comparison");
    println!("========================");
    println!();
    println!("Items:   {}", report.quantity);
    println!("Custody: {}", report.custody);
    println!();
    println!("Build:");
    println!("  Direct catalog:     {:.3} ms", report.direct_build_ms);
    println!("  Normalized catalog: {:.3} ms", report.normalized_build_ms);
    println!();
    println!(
        "{:<26} {:>12} {:>12} {:>10} {:>10}  {}",
        "Scenario", "Catalog ms", "Scan ms", "Catalog", "Scan", "Agree"
    );
    for s in &report.scenarios {
        println!(
            "{:<26} {:>12.3} {:>12.3} {:>10} {:>10}  {}",
            s.name,
            s.catalog_ms,
            s.scan_ms,
            s.catalog_count,
            s.scan_count,
            if s.agree { "yes" } else { "NO" }
        );
    }
}
