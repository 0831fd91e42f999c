pub(crate) mod compare;
pub(crate) mod summary;
pub(crate) mod validate;

use std::path::Path;
use std::process;

use evolve_model::{load_document, Document};

use crate::{report_error, OutputFormat};

/// Load a document or exit with status 1.
pub(crate) fn load_or_exit(path: &Path, output: OutputFormat, quiet: bool) -> Document {
    match load_document(path) {
        Ok(doc) => doc,
        Err(e) => {
            report_error(&format!("{}: {}", path.display(), e), output, quiet);
            process::exit(1);
        }
    }
}
