//! Registry of countries and regions the bridge can serve.
//!
//! The registry ships inside the binary (`data/countries.json`). Codes are
//! matched exactly; `name` is the entity name Ember expects.

use serde::{Deserialize, Serialize};

const EMBEDDED: &str = include_str!("../data/countries.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    pub iso: String,
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    entities: Vec<Entity>,
}

impl Registry {
    // ---
    /// Load the registry compiled into the binary.
    pub fn embedded() -> serde_json::Result<Self> {
        Ok(Self::new(serde_json::from_str(EMBEDDED)?))
    }

    pub fn new(entities: Vec<Entity>) -> Self {
        Self { entities }
    }

    pub fn find_by_code(&self, code: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.iso == code)
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }
}
