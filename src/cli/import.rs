use std::path::Path;

use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};
use statement_import::fmt::money;
use statement_import::models::{ImportOutcome, ImportReport};
use statement_import::{ImportOrchestrator, ImportSource, JsonLinesSink, Settings, TransactionSink};

pub fn run(
    settings: &Settings,
    file: &Path,
    output: Option<&Path>,
    show_diagnostics: bool,
    json: bool,
) -> anyhow::Result<()> {
    let orchestrator = ImportOrchestrator::from_settings(settings)?;
    let source = ImportSource::from_path(file)?.with_sniff_limit(settings.sniff_bytes);
    let report = orchestrator.import(&source)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
        if report.result.succeeded() == 0 {
            println!("No transactions found");
        } else {
            println!("{}", transactions_table(&report));
        }
        if show_diagnostics && !report.result.diagnostics().is_empty() {
            println!("{}", diagnostics_table(&report));
        }
    }

    if let Some(path) = output {
        let mut sink = JsonLinesSink::open(path)?;
        let written = sink.accept(report.result.transactions())?;
        if !json {
            println!("{written} written to {}", path.display());
        }
    }
    Ok(())
}

fn print_summary(report: &ImportReport) {
    let result = &report.result;
    println!(
        "{} {} ({}, {})",
        "Imported".bold(),
        report.file_name,
        report.handler,
        report.format
    );
    let skipped = format!("{} skipped", result.skipped());
    let skipped = if result.skipped() > 0 {
        skipped.yellow()
    } else {
        skipped.normal()
    };
    println!(
        "{} attempted, {} parsed, {skipped}",
        result.attempted(),
        result.succeeded()
    );
    let outcome = match result.outcome() {
        ImportOutcome::Complete => "complete".green(),
        ImportOutcome::Partial => "partial".yellow(),
        ImportOutcome::NothingParsed => "nothing parsed".red(),
        ImportOutcome::Empty => "empty".dimmed(),
    };
    println!("Outcome: {outcome}");
    println!("Checksum: {}", report.checksum.dimmed());
}

fn transactions_table(report: &ImportReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Row", "Date", "Description", "Category", "Amount", "Note"]);
    for txn in report.result.transactions() {
        table.add_row(vec![
            Cell::new(txn.source_row),
            Cell::new(txn.date.format("%Y-%m-%d")),
            Cell::new(txn.description.as_deref().unwrap_or_default()),
            Cell::new(txn.category.as_deref().unwrap_or_default()),
            Cell::new(money(txn.money.amount, &txn.money.currency))
                .set_alignment(CellAlignment::Right),
            Cell::new(txn.note.as_deref().unwrap_or_default()),
        ]);
    }
    table
}

fn diagnostics_table(report: &ImportReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Row", "Reason", "Detail"]);
    for diag in report.result.diagnostics() {
        table.add_row(vec![
            Cell::new(diag.row),
            Cell::new(diag.reason),
            Cell::new(diag.detail.as_deref().unwrap_or_default()),
        ]);
    }
    table
}
