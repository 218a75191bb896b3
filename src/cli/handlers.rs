use comfy_table::{Cell, Table};
use statement_import::{ImportOrchestrator, Settings};

pub fn list(settings: &Settings) -> anyhow::Result<()> {
    let orchestrator = ImportOrchestrator::from_settings(settings)?;
    let mut table = Table::new();
    table.set_header(vec!["#", "ID", "Name", "Bank", "Formats", "Fallback"]);
    for (i, handler) in orchestrator.handlers().iter().enumerate() {
        let formats: Vec<&str> = handler.formats().iter().map(|f| f.key()).collect();
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(handler.id()),
            Cell::new(handler.display_name()),
            Cell::new(handler.bank()),
            Cell::new(formats.join(", ")),
            Cell::new(if handler.is_fallback() { "yes" } else { "" }),
        ]);
    }
    println!("Handlers\n{table}");
    Ok(())
}
