use std::path::{Path, PathBuf};
use std::process;

use evolve_compare::{compare_with_baseline, CompareConfig, MigrationGuide};

use super::load_or_exit;
use crate::{report_error, OutputFormat};

/// Flags of the `compare` subcommand.
pub(crate) struct CompareOptions {
    pub guide: Option<PathBuf>,
    pub baseline: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub relaxed: bool,
    pub relaxed_models: bool,
    pub threshold: Option<f64>,
    pub breaking: bool,
}

/// Read comparison settings from a TOML file.
pub(crate) fn read_config(path: &Path) -> Result<CompareConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("could not read '{}': {}", path.display(), e))?;

    toml::from_str(&content).map_err(|e| format!("could not parse '{}': {}", path.display(), e))
}

/// Apply command-line overrides on top of the file settings.
fn resolve_config(options: &CompareOptions) -> Result<CompareConfig, String> {
    let mut config = match &options.config {
        Some(path) => read_config(path)?,
        None => CompareConfig::default(),
    };
    if options.relaxed {
        config.relaxed_matching = true;
    }
    if options.relaxed_models {
        config.relaxed_model_matching = true;
    }
    if let Some(threshold) = options.threshold {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(format!(
                "similarity threshold must be between 0 and 1, got {}",
                threshold
            ));
        }
        config.similarity_threshold = threshold;
    }
    Ok(config)
}

pub(crate) fn cmd_compare(
    old_path: &Path,
    new_path: &Path,
    options: &CompareOptions,
    output: OutputFormat,
    quiet: bool,
) {
    let config = match resolve_config(options) {
        Ok(c) => c,
        Err(msg) => {
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    let baseline = match &options.baseline {
        Some(path) => match MigrationGuide::load(path) {
            Ok(g) => Some(g),
            Err(e) => {
                report_error(&e.to_string(), output, quiet);
                process::exit(1);
            }
        },
        None => None,
    };

    let old = load_or_exit(old_path, output, quiet);
    let new = load_or_exit(new_path, output, quiet);

    let guide = match compare_with_baseline(&old, &new, &config, baseline.as_ref()) {
        Ok(g) => g,
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(1);
        }
    };

    if let Some(path) = &options.guide {
        if let Err(e) = guide.write(path) {
            report_error(&e.to_string(), output, quiet);
            process::exit(1);
        }
        tracing::debug!(path = %path.display(), "wrote migration guide");
    }

    if !quiet {
        match output {
            OutputFormat::Json => match guide.to_json_pretty() {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    report_error(&e.to_string(), output, quiet);
                    process::exit(1);
                }
            },
            OutputFormat::Text => println!("{}", guide.to_text()),
        }
    }

    if options.breaking && guide.has_breaking() {
        process::exit(1);
    }
}
