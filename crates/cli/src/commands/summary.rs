use std::path::Path;
use std::process;

use evolve_compare::MigrationGuide;

use crate::{report_error, OutputFormat};

pub(crate) fn cmd_summary(guide_path: &Path, output: OutputFormat, quiet: bool) {
    let guide = match MigrationGuide::load(guide_path) {
        Ok(g) => g,
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(1);
        }
    };
    if quiet {
        return;
    }
    match output {
        OutputFormat::Json => {
            let summary = serde_json::json!({
                "summary": guide.summary,
                "id": guide.id,
                "from": guide.from.to_string(),
                "to": guide.to.to_string(),
                "changes": guide.changes.len(),
                "breaking": guide.breaking_count(),
                "unsupported": guide.unsupported_count(),
            });
            println!("{}", summary);
        }
        OutputFormat::Text => println!("{}", guide.to_text()),
    }
}
