use std::path::Path;

use colored::Colorize;
use statement_import::{ImportError, ImportOrchestrator, ImportSource, Settings};

pub fn run(settings: &Settings, file: &Path) -> anyhow::Result<()> {
    let orchestrator = ImportOrchestrator::from_settings(settings)?;
    let source = ImportSource::from_path(file)?.with_sniff_limit(settings.sniff_bytes);

    let format = orchestrator.resolve_format(&source)?;
    println!("Format:  {format}");
    match orchestrator.resolve_parser(&source, format) {
        Ok(resolved) => {
            let handler = resolved.handler;
            let fallback = if handler.is_fallback() { " (fallback)" } else { "" };
            println!(
                "Handler: {} {}{fallback}",
                handler.id().bold(),
                handler.display_name()
            );
            println!("Bank:    {}", handler.bank());
            Ok(())
        }
        Err(e @ ImportError::NoHandlerMatched { .. }) => {
            println!("Handler: {}", "none".red());
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}
