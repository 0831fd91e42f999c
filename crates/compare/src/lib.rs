//! evolve-compare: structural comparison of two API document versions.
//!
//! [`compare`] walks both documents (service metadata, then models, then
//! endpoints), pairs entities by identifier with optional similarity based
//! rename detection, and records every difference as a typed [`Change`]
//! classified as breaking and/or solvable. Conversion scripts and default
//! values referenced by changes are deduplicated into the guide's
//! `scripts` and `jsonValues` maps.
//!
//! The comparison is synchronous, deterministic and never fails on data
//! divergence. The only error of a run is an incompatible baseline guide
//! (see [`compare_with_baseline`]).

pub mod change;
pub mod config;
pub mod context;
pub mod defaults;
pub mod error;
pub mod guide;
pub mod matching;
pub mod script;

mod comparator;

pub use change::{
    Change, ElementIdentifier, EndpointChange, EndpointUpdate, EnumCaseChange, EnumCaseUpdate,
    ExporterChange, ExporterUpdate, GuideChange, IdentifierChange, IdentifierUpdate, ModelChange,
    ModelUpdate, NecessityChange, ParameterChange, ParameterUpdate, PropertyChange,
    PropertyUpdate, ScriptId, ServiceChange, ServiceUpdate, TypeChange, UpdatePayload, ValueId,
};
pub use config::{CompareConfig, MatchPolicy, SimilarityWeights};
pub use context::{ComparisonContext, Script};
pub use error::CompareError;
pub use guide::{compare, compare_with_baseline, MigrationGuide};
