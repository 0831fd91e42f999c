use std::path::PathBuf;

use evolve_model::DocumentError;

/// Errors that abort a comparison run or guide I/O.
///
/// Divergence between the documents is never an error; it is reported as
/// changes in the guide.
#[derive(Debug, thiserror::Error)]
pub enum CompareError {
    /// The baseline guide was produced from a different document than the
    /// old document of this run.
    #[error("incompatible migration guide: expected document '{expected}', guide was built from '{found}'")]
    IncompatibleGuide { expected: String, found: String },

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("could not access '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid migration guide JSON: {0}")]
    Json(#[from] serde_json::Error),
}
