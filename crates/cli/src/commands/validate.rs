use std::path::Path;

use super::load_or_exit;
use crate::OutputFormat;

pub(crate) fn cmd_validate(document_path: &Path, output: OutputFormat, quiet: bool) {
    let doc = load_or_exit(document_path, output, quiet);
    if quiet {
        return;
    }
    match output {
        OutputFormat::Json => {
            let result = serde_json::json!({
                "valid": true,
                "id": doc.id,
                "version": doc.version().to_string(),
                "endpoints": doc.endpoints.len(),
                "models": doc.models.len(),
            });
            println!("{}", result);
        }
        OutputFormat::Text => {
            println!(
                "{} {} is valid: {} endpoint(s), {} model(s)",
                doc.id,
                doc.version(),
                doc.endpoints.len(),
                doc.models.len()
            );
        }
    }
}
