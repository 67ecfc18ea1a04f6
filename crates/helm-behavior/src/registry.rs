//! `BehaviorRegistry` — behavior type name → factory.

use std::collections::BTreeMap;

use crate::kinds::{AvoidObstacle, BehaviorKind, ConstantHeading, ConstantSpeed, Shadow};
use crate::{Behavior, BehaviorError, BehaviorResult, BehaviorTemplate};

/// Creates an empty kind ready for configuration.
pub type KindFactory = fn() -> Box<dyn BehaviorKind>;

/// Explicit table of the behavior types a host understands.
///
/// [`BehaviorRegistry::with_builtins`] is pre-populated with the built-in
/// kinds; hosts add their own with [`register`][Self::register].
#[derive(Clone, Debug, Default)]
pub struct BehaviorRegistry {
    factories: BTreeMap<String, KindFactory>,
}

impl BehaviorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut r = Self::new();
        r.register("BHV_ConstantHeading", || Box::new(ConstantHeading::default()));
        r.register("BHV_ConstantSpeed", || Box::new(ConstantSpeed::default()));
        r.register("BHV_Shadow", || Box::new(Shadow::default()));
        r.register("BHV_AvoidObstacle", || Box::new(AvoidObstacle::default()));
        r
    }

    /// Add or replace the factory for `type_name`.
    pub fn register(&mut self, type_name: &str, factory: KindFactory) {
        self.factories.insert(type_name.to_string(), factory);
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn create(&self, type_name: &str) -> BehaviorResult<Box<dyn BehaviorKind>> {
        self.factories
            .get(type_name)
            .map(|f| f())
            .ok_or_else(|| BehaviorError::UnknownType(type_name.to_string()))
    }

    /// Build a behavior from a template's static configuration.
    pub fn instantiate(&self, template: &BehaviorTemplate) -> BehaviorResult<Behavior> {
        template.validate()?;
        let mut behavior = Behavior::new(self.create(&template.kind)?);
        behavior.set_params(&template.params)?;
        behavior.finish_config()?;
        Ok(behavior)
    }
}
