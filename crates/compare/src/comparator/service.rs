use std::collections::BTreeMap;

use serde_json::Value;

use evolve_model::{DeltaIdentifier, Identifiable};

use super::{log_matches, Session};
use crate::change::{ExporterChange, ExporterUpdate, ServiceChange, ServiceUpdate, SERVICE_IDENTIFIER};
use crate::matching::match_exact;

/// Changes of the service metadata. None of them affect clients.
pub(crate) fn compare_service(session: &Session<'_>) -> Vec<ServiceChange> {
    let lhs = &session.lhs.service;
    let rhs = &session.rhs.service;
    let id = DeltaIdentifier::new(SERVICE_IDENTIFIER);
    let mut changes = Vec::new();

    if lhs.version != rhs.version {
        changes.push(ServiceChange::update(
            id.clone(),
            ServiceUpdate::Version {
                from: lhs.version,
                to: rhs.version,
            },
            false,
            true,
        ));
    }

    if lhs.http != rhs.http {
        changes.push(ServiceChange::update(
            id.clone(),
            ServiceUpdate::Http {
                from: lhs.http.clone(),
                to: rhs.http.clone(),
            },
            false,
            true,
        ));
    }

    let matches = match_exact(&lhs.exporters, &rhs.exporters);
    log_matches("exporter", SERVICE_IDENTIFIER, &matches);

    let mut exporters = Vec::new();
    for pair in &matches.matched {
        if pair.lhs.settings != pair.rhs.settings {
            exporters.push(ExporterChange::update(
                pair.lhs.delta_identifier(),
                ExporterUpdate::Settings {
                    from: settings_json(&pair.lhs.settings),
                    to: settings_json(&pair.rhs.settings),
                },
                false,
                true,
            ));
        }
    }
    for removed in matches.removed {
        exporters.push(ExporterChange::removal(removed.delta_identifier(), None, false, true));
    }
    for added in matches.added {
        exporters.push(ExporterChange::addition(added.clone(), None, false));
    }

    for exporter in exporters {
        changes.push(ServiceChange::update(
            id.clone(),
            ServiceUpdate::Exporter { exporter },
            false,
            true,
        ));
    }
    changes
}

fn settings_json(settings: &BTreeMap<String, Value>) -> Value {
    Value::Object(
        settings
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    )
}
