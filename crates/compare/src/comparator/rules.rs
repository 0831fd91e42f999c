//! Necessity and type change rules shared by parameters, properties and
//! endpoint responses.

use evolve_model::{Necessity, TypeInformation};

use super::Session;
use crate::change::{NecessityChange, TypeChange, ValueId};
use crate::defaults::default_value;
use crate::script::ScriptBuilder;

/// Optional when either the flag says so or the type is `Optional` wrapped.
pub(super) fn effective_necessity(necessity: Necessity, ty: &TypeInformation) -> Necessity {
    if necessity == Necessity::Optional || ty.is_optional() {
        Necessity::Optional
    } else {
        Necessity::Required
    }
}

impl Session<'_> {
    /// Store the default of a shape from the new document.
    pub(super) fn store_default(&mut self, ty: &TypeInformation) -> ValueId {
        let value = default_value(ty.unwrapped(), &self.rhs.models);
        self.context.store_value(value)
    }

    /// Store the fallback of a shape from the old document.
    pub(super) fn store_fallback(&mut self, ty: &TypeInformation) -> ValueId {
        let value = default_value(ty.unwrapped(), &self.lhs.models);
        self.context.store_value(value)
    }

    /// A necessity flip, with a default when the element became required.
    pub(super) fn necessity_change(
        &mut self,
        from: (Necessity, &TypeInformation),
        to: (Necessity, &TypeInformation),
    ) -> Option<NecessityChange> {
        let before = effective_necessity(from.0, from.1);
        let after = effective_necessity(to.0, to.1);
        if before == after {
            return None;
        }
        let necessity_migration = match after {
            Necessity::Required => Some(self.store_default(to.1)),
            Necessity::Optional => None,
        };
        Some(NecessityChange {
            from: before,
            to: after,
            necessity_migration,
        })
    }

    /// A change of shape identity, with conversion scripts both ways.
    ///
    /// Optional wrappers are ignored; they are reported as necessity changes.
    pub(super) fn type_change(
        &mut self,
        from: &TypeInformation,
        to: &TypeInformation,
    ) -> Option<TypeChange> {
        let from = from.unwrapped();
        let to = to.unwrapped();
        if from.type_name() == to.type_name() {
            return None;
        }

        let forward = ScriptBuilder::new(&self.lhs.models, &self.rhs.models).conversion(from, to);
        let backward = ScriptBuilder::new(&self.rhs.models, &self.lhs.models).conversion(to, from);
        let warning = match (forward.warning, backward.warning) {
            (None, None) => None,
            (Some(f), None) => Some(f),
            (None, Some(b)) => Some(format!("backward: {}", b)),
            (Some(f), Some(b)) => Some(format!("{}; backward: {}", f, b)),
        };

        Some(TypeChange {
            from: from.clone(),
            to: to.clone(),
            forward_migration: self.context.store_script(forward.script),
            backward_migration: self.context.store_script(backward.script),
            warning,
        })
    }
}
