use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::emit::{FailureProvider, ResultFailure};
use crate::errors::StructuralError;
use crate::member::{DefaultNamer, Namer, StructureMember};
use crate::model::{Model, Shape, ShapeId, ShapeKind};

/// Run-scoped state for one generation pass.
///
/// Holds the model, the pluggable naming and failure policies, and every
/// per-run cache: resolved structure members and memoized default constants.
/// Nothing here is global or shared across runs; the context is created for
/// a run, passed down the call tree, and dropped at run end.
pub struct RunContext<'m> {
    model: &'m Model,
    namer: Box<dyn Namer>,
    failures: Box<dyn FailureProvider>,
    members: RefCell<HashMap<ShapeId, Rc<Vec<StructureMember<'m>>>>>,
    default_consts: RefCell<HashMap<String, String>>,
}

impl<'m> RunContext<'m> {
    pub fn new(model: &'m Model) -> Self {
        RunContext::with(model, Box::new(DefaultNamer), Box::new(ResultFailure))
    }

    pub fn with(
        model: &'m Model,
        namer: Box<dyn Namer>,
        failures: Box<dyn FailureProvider>,
    ) -> Self {
        RunContext {
            model,
            namer,
            failures,
            members: RefCell::new(HashMap::new()),
            default_consts: RefCell::new(HashMap::new()),
        }
    }

    pub fn model(&self) -> &'m Model {
        self.model
    }

    pub fn namer(&self) -> &dyn Namer {
        self.namer.as_ref()
    }

    pub fn failures(&self) -> &dyn FailureProvider {
        self.failures.as_ref()
    }

    /// The resolved member list for a structure, built lazily and cached for
    /// the rest of the run.
    pub fn members_of(
        &self,
        structure: &'m Shape,
    ) -> Result<Rc<Vec<StructureMember<'m>>>, StructuralError> {
        if let Some(cached) = self.members.borrow().get(&structure.id) {
            return Ok(Rc::clone(cached));
        }
        let raw = match &structure.kind {
            ShapeKind::Structure { members } => members.as_slice(),
            _ => &[],
        };
        let built = raw
            .iter()
            .map(|m| StructureMember::build(self.model, self.namer.as_ref(), m))
            .collect::<Result<Vec<_>, _>>()?;
        let rc = Rc::new(built);
        self.members
            .borrow_mut()
            .insert(structure.id.clone(), Rc::clone(&rc));
        Ok(rc)
    }

    /// The memoized shared-constant name for a defaulted member. One name per
    /// member per run; every constructor that needs the default refers to it.
    pub fn default_const_name(&self, structure: &Shape, member_field: &str) -> String {
        let key = format!("{}${member_field}", structure.id);
        if let Some(existing) = self.default_consts.borrow().get(&key) {
            return existing.clone();
        }
        let name = format!(
            "DEFAULT_{}",
            member_field.trim_start_matches("r#").to_ascii_uppercase()
        );
        self.default_consts.borrow_mut().insert(key, name.clone());
        name
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::model::{Member, Model, Shape, ShapeId, ShapeKind, TraitSet};

    fn pet_model() -> Model {
        Model::from_shapes([Shape::new(
            ShapeId::new("example#Pet"),
            ShapeKind::Structure {
                members: vec![
                    {
                        let mut m = Member::new("name", ShapeId::prelude("String"));
                        m.traits = TraitSet::required();
                        m
                    },
                    Member::new("age", ShapeId::prelude("Integer")),
                ],
            },
        )])
    }

    #[test]
    fn member_lists_are_cached_per_structure() {
        let model = pet_model();
        let ctx = RunContext::new(&model);
        let shape = model.get(&"example#Pet".into()).unwrap();
        let first = ctx.members_of(shape).unwrap();
        let second = ctx.members_of(shape).unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn default_const_names_are_stable_within_a_run() {
        let model = pet_model();
        let ctx = RunContext::new(&model);
        let shape = model.get(&"example#Pet".into()).unwrap();
        let a = ctx.default_const_name(shape, "age");
        let b = ctx.default_const_name(shape, "age");
        assert_eq!(a, "DEFAULT_AGE");
        assert_eq!(a, b);
    }
}
