//! `seatgrid optimize` — run the assignment engine for one term.

use anyhow::bail;
use serde::Serialize;
use tracing::info;

use seatgrid_alloc::{
    ProcessingOrder, RunOutcome, RunStatistics, assignments_to_records, courses_to_capacities,
    format_report, selections_to_records, validate_records,
};
use seatgrid_core::Assignment;
use seatgrid_state::{TermStore, now_epoch_secs};

use super::Format;

pub struct OptimizeOptions {
    pub seed: Option<u64>,
    pub strict: bool,
    pub dry_run: bool,
    pub format: Format,
}

#[derive(Serialize)]
struct JsonSummary<'a> {
    term: &'a str,
    seed: Option<u64>,
    persisted: bool,
    statistics: &'a RunStatistics,
    assignments: Vec<&'a Assignment>,
    unassigned: &'a [String],
    unknown_resources: Vec<&'a String>,
}

/// Load the term, allocate, and persist unless `dry_run`.
/// Returns `None` when the term has no selections.
pub fn run(store: &TermStore, term: &str, opts: &OptimizeOptions) -> anyhow::Result<Option<RunOutcome>> {
    if store.get_term(term)?.is_none() {
        bail!("term {term} not found");
    }

    let selections = store.list_selections(term)?;
    if selections.is_empty() {
        info!(term, "no student preferences found");
        return Ok(None);
    }
    let courses = store.list_courses(term)?;
    info!(
        term,
        selections = selections.len(),
        courses = courses.len(),
        "loaded term"
    );

    let records = selections_to_records(&selections, &courses);
    if opts.strict {
        validate_records(&records)?;
    }
    let capacities = courses_to_capacities(&courses);
    let order = match opts.seed {
        Some(seed) => ProcessingOrder::Seeded(seed),
        None => ProcessingOrder::from_entropy(),
    };

    let outcome = seatgrid_alloc::optimize(&records, &capacities, &order);

    if !opts.dry_run {
        let rows = assignments_to_records(term, &outcome.allocation.assignments, now_epoch_secs());
        store.replace_assignments(term, &rows)?;
    }
    Ok(Some(outcome))
}

pub fn optimize(store: &TermStore, term: &str, opts: &OptimizeOptions) -> anyhow::Result<()> {
    if opts.format == Format::Text {
        println!("Starting optimization for term {term}...");
    }

    let Some(outcome) = run(store, term, opts)? else {
        match opts.format {
            Format::Text => println!("No student preferences found for this term."),
            Format::Json => println!(
                "{}",
                serde_json::to_string_pretty(&JsonSummary {
                    term,
                    seed: opts.seed,
                    persisted: false,
                    statistics: &RunStatistics::default(),
                    assignments: Vec::new(),
                    unassigned: &[],
                    unknown_resources: Vec::new(),
                })?
            ),
        }
        return Ok(());
    };

    let alloc = &outcome.allocation;
    match opts.format {
        Format::Json => {
            let summary = JsonSummary {
                term,
                seed: alloc.seed,
                persisted: !opts.dry_run,
                statistics: &outcome.statistics,
                assignments: alloc.assignments.iter().collect(),
                unassigned: &alloc.unassigned,
                unknown_resources: alloc.unknown_resources.iter().collect(),
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Format::Text => {
            if let Some(seed) = alloc.seed {
                println!("Shuffle seed: {seed}");
            }
            if !alloc.unknown_resources.is_empty() {
                let names: Vec<&str> = alloc.unknown_resources.iter().map(String::as_str).collect();
                println!("⚠️  Courses with selections but no capacity: {}", names.join(", "));
            }
            print!("{}", format_report(&outcome.statistics));
            if opts.dry_run {
                println!("Dry run: stored assignments left unchanged.");
            } else {
                println!("✓ Saved {} assignments for term {term}", alloc.assignments.len());
            }
        }
    }
    Ok(())
}
